#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use dictaug::augment::{CancellationToken, ImageStore};
use dictaug::dict::Dict;
use dictaug::DictaugError;
use image::{Rgb, RgbImage};

pub fn write_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    let mut img = RgbImage::new(width, height);
    img.put_pixel(0, 0, Rgb([255, 0, 0]));
    img.save(path).expect("write png file");
}

/// An image store whose images are their file names.
///
/// Reads never touch the filesystem (files named `missing*` fail). Writes
/// create a file holding the image text and are recorded in order.
#[derive(Clone, Default)]
pub struct RecordingStore {
    pub written: Arc<Mutex<Vec<PathBuf>>>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels `token` as soon as `writes` images have been written.
    pub fn cancelling_after(writes: usize, token: CancellationToken) -> Self {
        Self {
            written: Arc::default(),
            cancel_after: Some((writes, token)),
        }
    }

    pub fn written(&self) -> Vec<PathBuf> {
        self.written.lock().expect("lock written").clone()
    }
}

impl ImageStore for RecordingStore {
    type Image = String;

    fn read_image(&self, path: &Path) -> Result<String, DictaugError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if name.starts_with("missing") {
            return Err(DictaugError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )));
        }
        Ok(name)
    }

    fn write_image(&self, image: &String, format: &str, path: &Path) -> Result<(), DictaugError> {
        assert_eq!(format, "png");
        fs::write(path, image)?;

        let mut written = self.written.lock().expect("lock written");
        written.push(path.to_path_buf());
        if let Some((writes, token)) = &self.cancel_after {
            if written.len() >= *writes {
                token.cancel();
            }
        }
        Ok(())
    }
}

pub fn detection_dict(image_dir: &str) -> Dict {
    Dict::new()
        .with("class_ids", vec![1i64, 2])
        .with("class_names", vec!["person".to_string(), "car".into()])
        .with("image_dir", image_dir)
        .with(
            "samples",
            vec![
                Dict::new()
                    .with("image_id", 10i64)
                    .with("image_file_name", "street.jpg")
                    .with("bbox_label_id", vec![1i64, 2])
                    .with("bbox_row1", vec![1.0, 2.0])
                    .with("bbox_col1", vec![1.0, 0.0])
                    .with("bbox_row2", vec![3.0, 4.0])
                    .with("bbox_col2", vec![2.0, 3.0]),
                Dict::new()
                    .with("image_id", 20i64)
                    .with("image_file_name", "park.png")
                    .with("bbox_label_id", 2i64)
                    .with("bbox_row1", 0.0)
                    .with("bbox_col1", 0.0)
                    .with("bbox_row2", 1.0)
                    .with("bbox_col2", 1.0),
            ],
        )
}

pub fn classification_dict(image_dir: &str, file_names: &[&str]) -> Dict {
    let samples: Vec<Dict> = file_names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            Dict::new()
                .with("image_id", i as i64 + 1)
                .with("image_file_name", *name)
                .with("image_label_id", (i % 2) as i64)
        })
        .collect();

    Dict::new()
        .with("class_ids", vec![0i64, 1])
        .with("class_names", vec!["ok".to_string(), "defect".into()])
        .with("image_dir", image_dir)
        .with("samples", samples)
}

pub fn semantic_dict(image_dir: &str, segmentation_dir: &str) -> Dict {
    Dict::new()
        .with("class_ids", vec![0i64, 1])
        .with("class_names", vec!["background".to_string(), "road".into()])
        .with("image_dir", image_dir)
        .with("segmentation_dir", segmentation_dir)
        .with(
            "samples",
            vec![Dict::new()
                .with("image_id", 1i64)
                .with("image_file_name", "scene.png")
                .with("segmentation_file_name", "scene_label.png")],
        )
}
