//! Box types in image row/column coordinates.

/// An axis-aligned box given by its upper-left (`row1`, `col1`) and
/// lower-right (`row2`, `col2`) corners.
///
/// Like every geometry type in this crate, the constructor does not enforce
/// `row1 <= row2`; malformed boxes can be represented and inspected.
#[derive(Clone, Copy, Default, PartialEq)]
pub struct AxisBox {
    pub row1: f64,
    pub col1: f64,
    pub row2: f64,
    pub col2: f64,
}

impl AxisBox {
    /// Creates a new box from explicit corners.
    #[inline]
    pub fn new(row1: f64, col1: f64, row2: f64, col2: f64) -> Self {
        Self {
            row1,
            col1,
            row2,
            col2,
        }
    }

    /// Returns the width of the box.
    ///
    /// May be negative if the box is malformed (col2 < col1).
    #[inline]
    pub fn width(&self) -> f64 {
        self.col2 - self.col1
    }

    /// Returns the height of the box.
    ///
    /// May be negative if the box is malformed (row2 < row1).
    #[inline]
    pub fn height(&self) -> f64 {
        self.row2 - self.row1
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Returns true if all coordinates are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.row1.is_finite()
            && self.col1.is_finite()
            && self.row2.is_finite()
            && self.col2.is_finite()
    }

    /// Returns true if the box is properly ordered on both axes.
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.row1 <= self.row2 && self.col1 <= self.col2
    }
}

impl std::fmt::Debug for AxisBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AxisBox")
            .field("row1", &self.row1)
            .field("col1", &self.col1)
            .field("row2", &self.row2)
            .field("col2", &self.col2)
            .finish()
    }
}

/// A rotated rectangle: center (`row`, `col`), orientation `phi` in radians
/// (counter-clockwise from the column axis) and half edge lengths.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrientedBox {
    pub row: f64,
    pub col: f64,
    pub phi: f64,
    pub length1: f64,
    pub length2: f64,
}

impl OrientedBox {
    #[inline]
    pub fn new(row: f64, col: f64, phi: f64, length1: f64, length2: f64) -> Self {
        Self {
            row,
            col,
            phi,
            length1,
            length2,
        }
    }

    /// Full-size area (the lengths are half edges).
    #[inline]
    pub fn area(&self) -> f64 {
        4.0 * self.length1 * self.length2
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.row.is_finite()
            && self.col.is_finite()
            && self.phi.is_finite()
            && self.length1.is_finite()
            && self.length2.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_box_dimensions() {
        let bbox = AxisBox::new(20.0, 10.0, 80.0, 100.0);
        assert_eq!(bbox.width(), 90.0);
        assert_eq!(bbox.height(), 60.0);
        assert_eq!(bbox.area(), 5400.0);
    }

    #[test]
    fn test_axis_box_ordering() {
        assert!(AxisBox::new(20.0, 10.0, 80.0, 100.0).is_ordered());
        assert!(!AxisBox::new(80.0, 100.0, 20.0, 10.0).is_ordered());
    }

    #[test]
    fn test_axis_box_not_finite() {
        assert!(!AxisBox::new(f64::NAN, 0.0, 1.0, 1.0).is_finite());
    }

    #[test]
    fn test_oriented_box_area() {
        let obox = OrientedBox::new(50.0, 50.0, 0.3, 10.0, 5.0);
        assert_eq!(obox.area(), 200.0);
        assert!(obox.is_finite());
    }
}
