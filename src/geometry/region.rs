//! Run-length encoded pixel regions.
//!
//! A [`Region`] is a set of pixels stored as horizontal runs. A
//! [`RegionSet`] is the concatenated multi-region object that instance
//! segmentation samples store under their `mask` key: regions keep their
//! identity and order inside the set, they are never merged.

use serde::{Deserialize, Serialize};

use super::bbox::AxisBox;

/// One horizontal run of pixels: `row`, columns `col_begin..=col_end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 3]", into = "[i32; 3]")]
pub struct Run {
    pub row: i32,
    pub col_begin: i32,
    pub col_end: i32,
}

impl Run {
    #[inline]
    pub fn new(row: i32, col_begin: i32, col_end: i32) -> Self {
        Self {
            row,
            col_begin,
            col_end,
        }
    }

    /// Number of pixels covered by this run.
    #[inline]
    pub fn len(&self) -> u64 {
        if self.col_end < self.col_begin {
            0
        } else {
            (self.col_end as i64 - self.col_begin as i64 + 1) as u64
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<[i32; 3]> for Run {
    fn from([row, col_begin, col_end]: [i32; 3]) -> Self {
        Run::new(row, col_begin, col_end)
    }
}

impl From<Run> for [i32; 3] {
    fn from(run: Run) -> Self {
        [run.row, run.col_begin, run.col_end]
    }
}

/// A pixel region in canonical form: runs sorted by (row, col_begin),
/// non-empty, and non-overlapping within a row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Run>", into = "Vec<Run>")]
pub struct Region {
    runs: Vec<Run>,
}

impl Region {
    /// Creates an empty region.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a region from arbitrary runs, normalizing them.
    pub fn from_runs(runs: impl IntoIterator<Item = Run>) -> Self {
        let mut runs: Vec<Run> = runs.into_iter().filter(|r| !r.is_empty()).collect();
        runs.sort_unstable();

        let mut merged: Vec<Run> = Vec::with_capacity(runs.len());
        for run in runs {
            match merged.last_mut() {
                // adjacent or overlapping runs on the same row collapse
                Some(last)
                    if last.row == run.row && run.col_begin <= last.col_end.saturating_add(1) =>
                {
                    last.col_end = last.col_end.max(run.col_end);
                }
                _ => merged.push(run),
            }
        }

        Self { runs: merged }
    }

    /// Creates a filled rectangle with inclusive corners.
    pub fn rectangle(row1: i32, col1: i32, row2: i32, col2: i32) -> Self {
        Self::from_runs((row1..=row2).map(|row| Run::new(row, col1, col2)))
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Number of pixels in the region.
    pub fn area(&self) -> u64 {
        self.runs.iter().map(Run::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Smallest axis-aligned box (pixel-center coordinates) enclosing the region.
    pub fn bounding_box(&self) -> Option<AxisBox> {
        let first = self.runs.first()?;
        let last = self.runs.last()?;
        let col1 = self.runs.iter().map(|r| r.col_begin).min()?;
        let col2 = self.runs.iter().map(|r| r.col_end).max()?;

        Some(AxisBox::new(
            first.row as f64,
            col1 as f64,
            last.row as f64,
            col2 as f64,
        ))
    }

    /// Pixel-wise union with another region.
    pub fn union(&self, other: &Region) -> Region {
        Region::from_runs(self.runs.iter().chain(other.runs.iter()).copied())
    }

    /// Mirrors the region about the vertical center line of an image `width` wide.
    pub fn mirror_cols(&self, width: i32) -> Region {
        let last = width.saturating_sub(1);
        Region::from_runs(self.runs.iter().map(|r| {
            Run::new(
                r.row,
                last.saturating_sub(r.col_end),
                last.saturating_sub(r.col_begin),
            )
        }))
    }

    /// Mirrors the region about the horizontal center line of an image `height` high.
    pub fn mirror_rows(&self, height: i32) -> Region {
        let last = height.saturating_sub(1);
        Region::from_runs(
            self.runs
                .iter()
                .map(|r| Run::new(last.saturating_sub(r.row), r.col_begin, r.col_end)),
        )
    }
}

impl From<Vec<Run>> for Region {
    fn from(runs: Vec<Run>) -> Self {
        Region::from_runs(runs)
    }
}

impl From<Region> for Vec<Run> {
    fn from(region: Region) -> Self {
        region.runs
    }
}

/// An ordered container of regions, the object form of a `mask` field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionSet {
    regions: Vec<Region>,
}

impl RegionSet {
    /// Creates an object holding no regions.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Appends `region` as a new member, keeping it distinct from the others.
    pub fn concat(mut self, region: Region) -> Self {
        self.regions.push(region);
        self
    }

    /// Number of member regions.
    pub fn count(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Returns the member at `index` (0-based).
    pub fn get(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.regions.iter()
    }

    pub fn into_regions(self) -> Vec<Region> {
        self.regions
    }
}

impl FromIterator<Region> for RegionSet {
    fn from_iter<T: IntoIterator<Item = Region>>(iter: T) -> Self {
        iter.into_iter().fold(RegionSet::empty(), RegionSet::concat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_area_and_bbox() {
        let region = Region::rectangle(2, 3, 4, 7);
        assert_eq!(region.area(), 15);
        assert_eq!(region.bounding_box(), Some(AxisBox::new(2.0, 3.0, 4.0, 7.0)));
    }

    #[test]
    fn test_from_runs_merges_overlaps() {
        let region = Region::from_runs(vec![
            Run::new(1, 5, 8),
            Run::new(0, 0, 2),
            Run::new(1, 0, 4),
            Run::new(1, 9, 9),
        ]);
        assert_eq!(region.runs(), &[Run::new(0, 0, 2), Run::new(1, 0, 9)]);
        assert_eq!(region.area(), 13);
    }

    #[test]
    fn test_empty_runs_are_dropped() {
        let region = Region::from_runs(vec![Run::new(0, 5, 4)]);
        assert!(region.is_empty());
        assert_eq!(region.bounding_box(), None);
    }

    #[test]
    fn test_union() {
        let a = Region::rectangle(0, 0, 1, 1);
        let b = Region::rectangle(1, 1, 2, 2);
        assert_eq!(a.union(&b).area(), 7);
    }

    #[test]
    fn test_mirror_cols_and_rows() {
        let region = Region::rectangle(0, 0, 0, 2);
        assert_eq!(region.mirror_cols(10).runs(), &[Run::new(0, 7, 9)]);
        assert_eq!(region.mirror_rows(5).runs(), &[Run::new(4, 0, 2)]);
    }

    #[test]
    fn test_from_runs_at_column_limit() {
        let region = Region::from_runs(vec![Run::new(0, 0, i32::MAX), Run::new(0, 5, 6)]);
        assert_eq!(region.runs(), &[Run::new(0, 0, i32::MAX)]);

        let parsed: Region = serde_json::from_str("[[0,0,2147483647],[0,5,6]]").expect("parse");
        assert_eq!(parsed, region);
    }

    #[test]
    fn test_mirror_saturates_at_limits() {
        let region = Region::from_runs(vec![Run::new(i32::MIN, i32::MIN, i32::MIN + 1)]);
        assert_eq!(
            region.mirror_cols(10).runs(),
            &[Run::new(i32::MIN, i32::MAX, i32::MAX)]
        );
        assert_eq!(
            region.mirror_rows(10).runs(),
            &[Run::new(i32::MAX, i32::MIN, i32::MIN + 1)]
        );
    }

    #[test]
    fn test_region_set_keeps_member_order() {
        let a = Region::rectangle(0, 0, 0, 0);
        let b = Region::rectangle(5, 5, 5, 5);
        let set: RegionSet = vec![b.clone(), a.clone()].into_iter().collect();
        assert_eq!(set.count(), 2);
        assert_eq!(set.get(0), Some(&b));
        assert_eq!(set.get(1), Some(&a));
        assert_eq!(set.into_regions(), vec![b, a]);
    }

    #[test]
    fn test_run_serializes_as_triple() {
        let json = serde_json::to_string(&Region::rectangle(1, 2, 1, 3)).expect("serialize");
        assert_eq!(json, "[[1,2,3]]");
    }
}
