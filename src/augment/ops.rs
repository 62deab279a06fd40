//! Built-in geometric augmentations.
//!
//! Each [`Op`] turns one source sample into one derived sample, moving the
//! image, the label image and the geometry view together.

use std::fmt;

use image::DynamicImage;

use super::transform::Derived;
use crate::geometry::{Flip, Mirror};

/// A built-in augmentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// Re-emit the sample unchanged.
    Copy,
    FlipHorizontal,
    FlipVertical,
    Rotate180,
}

impl Op {
    pub fn name(&self) -> &'static str {
        match self {
            Op::Copy => "copy",
            Op::FlipHorizontal => "flip-horizontal",
            Op::FlipVertical => "flip-vertical",
            Op::Rotate180 => "rotate180",
        }
    }

    fn flip(self) -> Option<Flip> {
        match self {
            Op::Copy => None,
            Op::FlipHorizontal => Some(Flip::Horizontal),
            Op::FlipVertical => Some(Flip::Vertical),
            Op::Rotate180 => Some(Flip::Both),
        }
    }

    /// Applies the operation to one sample.
    pub fn apply<G: Mirror + Clone>(
        self,
        image: &DynamicImage,
        segmentation_image: Option<&DynamicImage>,
        geometry: &G,
    ) -> Derived<DynamicImage, G> {
        let Some(flip) = self.flip() else {
            return Derived {
                image: image.clone(),
                segmentation_image: segmentation_image.cloned(),
                geometry: geometry.clone(),
            };
        };

        Derived {
            image: flip_image(image, flip),
            segmentation_image: segmentation_image.map(|seg| flip_image(seg, flip)),
            geometry: geometry.mirrored(flip, image.width(), image.height()),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn flip_image(image: &DynamicImage, flip: Flip) -> DynamicImage {
    match flip {
        Flip::Horizontal => image.fliph(),
        Flip::Vertical => image.flipv(),
        Flip::Both => image.rotate180(),
    }
}

/// A simple transform emitting one derived sample per op, in op order.
pub fn apply_ops<G: Mirror + Clone>(
    ops: &[Op],
) -> impl FnMut(&DynamicImage, Option<&DynamicImage>, &G) -> Vec<Derived<DynamicImage, G>> + '_ {
    move |image, segmentation_image, geometry| {
        ops.iter()
            .map(|op| op.apply(image, segmentation_image, geometry))
            .collect()
    }
}
