//! Mirroring of sample geometry alongside its image.

use super::bbox::{AxisBox, OrientedBox};
use super::region::Region;

/// An image mirroring operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flip {
    /// Mirror left/right.
    Horizontal,
    /// Mirror top/bottom.
    Vertical,
    /// Both axes, equivalent to a 180 degree rotation.
    Both,
}

impl Flip {
    fn mirrors_cols(self) -> bool {
        matches!(self, Flip::Horizontal | Flip::Both)
    }

    fn mirrors_rows(self) -> bool {
        matches!(self, Flip::Vertical | Flip::Both)
    }
}

/// Geometry that can follow its image through a [`Flip`].
///
/// `width` and `height` are the dimensions of the image the geometry lives in.
pub trait Mirror {
    fn mirrored(&self, flip: Flip, width: u32, height: u32) -> Self;
}

impl Mirror for AxisBox {
    fn mirrored(&self, flip: Flip, width: u32, height: u32) -> Self {
        let mut out = *self;
        if flip.mirrors_cols() {
            let last = width as f64 - 1.0;
            out.col1 = last - self.col2;
            out.col2 = last - self.col1;
        }
        if flip.mirrors_rows() {
            let last = height as f64 - 1.0;
            out.row1 = last - self.row2;
            out.row2 = last - self.row1;
        }
        out
    }
}

impl Mirror for OrientedBox {
    fn mirrored(&self, flip: Flip, width: u32, height: u32) -> Self {
        let mut out = *self;
        if flip.mirrors_cols() {
            out.col = width as f64 - 1.0 - self.col;
        }
        if flip.mirrors_rows() {
            out.row = height as f64 - 1.0 - self.row;
        }
        // A single-axis mirror negates the orientation; the rectangle is
        // symmetric under a half turn so Both leaves phi unchanged.
        if flip != Flip::Both {
            out.phi = -self.phi;
        }
        out
    }
}

impl Mirror for Region {
    fn mirrored(&self, flip: Flip, width: u32, height: u32) -> Self {
        let mut out = self.clone();
        if flip.mirrors_cols() {
            out = out.mirror_cols(width as i32);
        }
        if flip.mirrors_rows() {
            out = out.mirror_rows(height as i32);
        }
        out
    }
}

impl<T: Mirror> Mirror for Vec<T> {
    fn mirrored(&self, flip: Flip, width: u32, height: u32) -> Self {
        self.iter().map(|g| g.mirrored(flip, width, height)).collect()
    }
}

// Whole-image labels and image-level masks carry no coordinates.
impl Mirror for i64 {
    fn mirrored(&self, _flip: Flip, _width: u32, _height: u32) -> Self {
        *self
    }
}

impl Mirror for () {
    fn mirrored(&self, _flip: Flip, _width: u32, _height: u32) -> Self {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_box_horizontal() {
        let bbox = AxisBox::new(10.0, 0.0, 20.0, 9.0);
        let out = bbox.mirrored(Flip::Horizontal, 100, 50);
        assert_eq!(out, AxisBox::new(10.0, 90.0, 20.0, 99.0));
    }

    #[test]
    fn test_axis_box_both_is_involution() {
        let bbox = AxisBox::new(3.5, 7.0, 12.0, 40.25);
        let twice = bbox
            .mirrored(Flip::Both, 64, 48)
            .mirrored(Flip::Both, 64, 48);
        assert_eq!(twice, bbox);
    }

    #[test]
    fn test_oriented_box_phi() {
        let obox = OrientedBox::new(10.0, 10.0, 0.5, 4.0, 2.0);
        assert_eq!(obox.mirrored(Flip::Vertical, 100, 100).phi, -0.5);
        assert_eq!(obox.mirrored(Flip::Both, 100, 100).phi, 0.5);
        assert_eq!(obox.mirrored(Flip::Both, 100, 100).row, 89.0);
    }

    #[test]
    fn test_region_follows_box() {
        let region = Region::rectangle(1, 2, 3, 4);
        let flipped = region.mirrored(Flip::Both, 10, 8);
        let expected = region
            .bounding_box()
            .map(|b| b.mirrored(Flip::Both, 10, 8));
        assert_eq!(flipped.bounding_box(), expected);
    }
}
