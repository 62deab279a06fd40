//! Reading and writing sample images.

use std::path::Path;

use image::{DynamicImage, ImageFormat};

use crate::error::DictaugError;

/// Where the pipeline reads source images from and writes augmented ones to.
pub trait ImageStore {
    /// The in-memory image handle.
    type Image;

    fn read_image(&self, path: &Path) -> Result<Self::Image, DictaugError>;

    /// Writes `image` to `path` encoded as `format`, a file extension such
    /// as `"png"`.
    fn write_image(
        &self,
        image: &Self::Image,
        format: &str,
        path: &Path,
    ) -> Result<(), DictaugError>;
}

/// Images on the local filesystem, decoded with the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsImageStore;

impl ImageStore for FsImageStore {
    type Image = DynamicImage;

    fn read_image(&self, path: &Path) -> Result<DynamicImage, DictaugError> {
        image::open(path).map_err(|source| DictaugError::Image {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_image(
        &self,
        image: &DynamicImage,
        format: &str,
        path: &Path,
    ) -> Result<(), DictaugError> {
        let format = ImageFormat::from_extension(format).ok_or_else(|| {
            DictaugError::UnsupportedFormat(format!(
                "'{}' is not a known image file extension",
                format
            ))
        })?;

        image
            .save_with_format(path, format)
            .map_err(|source| DictaugError::Image {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// The extension of `path`, which names the format to write it in.
pub(crate) fn format_of(path: &Path) -> Result<&str, DictaugError> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| {
            DictaugError::UnsupportedFormat(format!(
                "cannot infer an image format for {} without a file extension",
                path.display()
            ))
        })
}
