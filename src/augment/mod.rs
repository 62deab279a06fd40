//! Dataset augmentation.
//!
//! A [`Pipeline`] loads one manifest of a fixed task kind together with its
//! images, runs a caller-supplied transform over every sample and writes the
//! augmented images plus a new manifest describing them.
//!
//! # Example
//!
//! ```no_run
//! use dictaug::augment::{apply_ops, CancellationToken, FsImageStore, Op, Pipeline, SaveOptions};
//! use dictaug::manifest::ObjectDetectionManifest;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), dictaug::DictaugError> {
//! let mut pipeline: Pipeline<ObjectDetectionManifest, _> = Pipeline::new(FsImageStore);
//! pipeline.load_source_from_path(Path::new("dataset.json"))?;
//! pipeline.simple_augment(apply_ops(&[Op::FlipHorizontal, Op::Rotate180]))?;
//!
//! let task = pipeline.spawn_save(SaveOptions::under(Path::new("out")), CancellationToken::new())?;
//! let (_pipeline, summary) = task.join();
//! println!("wrote {} images", summary?.images_written);
//! # Ok(())
//! # }
//! ```

mod cancel;
mod ops;
mod pipeline;
mod store;
mod transform;

pub use cancel::CancellationToken;
pub use ops::{apply_ops, Op};
pub use pipeline::{Pipeline, PipelineState, SaveOptions, SaveSummary, SaveTask};
pub use store::{FsImageStore, ImageStore};
pub use transform::{AugmentedSample, Derived, SimpleTransform, SourceSample, Transform};
