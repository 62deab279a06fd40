//! Geometry carried by dataset samples.
//!
//! Boxes and regions are plain values; none of the constructors reject
//! malformed input, so validation can report problems instead of parsing
//! failing on them.

mod bbox;
mod flip;
mod region;

pub use bbox::{AxisBox, OrientedBox};
pub use flip::{Flip, Mirror};
pub use region::{Region, RegionSet, Run};
