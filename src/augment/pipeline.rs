use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use super::cancel::CancellationToken;
use super::store::{format_of, ImageStore};
use super::transform::{AugmentedSample, SimpleTransform, SourceSample, Transform};
use crate::dict::io_json::{read_dict, write_dict};
use crate::dict::Dict;
use crate::error::DictaugError;
use crate::manifest::{Manifest, SampleName, SampleRecord};
use crate::validation::{Severity, ValidationReport};

/// Where a pipeline is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Empty,
    Loaded,
    Transformed,
    Saved,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Empty => "empty",
            PipelineState::Loaded => "loaded",
            PipelineState::Transformed => "transformed",
            PipelineState::Saved => "saved",
        };
        f.write_str(name)
    }
}

/// Output locations for [`Pipeline::save`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveOptions {
    /// Directory augmented images are written to.
    pub image_dir: PathBuf,
    /// Path of the written manifest.
    pub manifest_path: PathBuf,
    /// Directory augmented label images are written to. Defaults to a
    /// `segmentation` directory inside `image_dir`.
    pub segmentation_dir: Option<PathBuf>,
}

impl SaveOptions {
    pub fn new(image_dir: impl Into<PathBuf>, manifest_path: impl Into<PathBuf>) -> Self {
        Self {
            image_dir: image_dir.into(),
            manifest_path: manifest_path.into(),
            segmentation_dir: None,
        }
    }

    /// Options that place every output under `base`.
    pub fn under(base: &Path) -> Self {
        Self::new(
            base.join("augmented_images"),
            base.join("augmented_manifest.json"),
        )
    }

    pub fn resolved_segmentation_dir(&self) -> PathBuf {
        self.segmentation_dir
            .clone()
            .unwrap_or_else(|| self.image_dir.join("segmentation"))
    }
}

impl Default for SaveOptions {
    /// Outputs next to the running executable, or in the working directory
    /// if its location is unknown.
    fn default() -> Self {
        let base = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::under(&base)
    }
}

/// What a completed save wrote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveSummary {
    /// Number of augmented samples whose images were written.
    pub images_written: usize,
    pub manifest_path: PathBuf,
    pub image_dir: PathBuf,
}

/// Loads a manifest with its images, runs a transform over every sample and
/// writes the augmented set.
///
/// The lifecycle is `Empty -> Loaded -> Transformed -> Saved`. Each step
/// checks the current state and fails with [`DictaugError::InvalidState`]
/// when called out of order. A transform may be re-run after loading; it
/// replaces the previous augmented set. A save may be repeated.
pub struct Pipeline<M: Manifest, St: ImageStore> {
    store: St,
    state: PipelineState,
    manifest: Option<M>,
    sources: Vec<SourceSample<M::Sample, St::Image>>,
    augmented: Vec<AugmentedSample<M::Sample, St::Image>>,
}

impl<M: Manifest, St: ImageStore> Pipeline<M, St> {
    pub fn new(store: St) -> Self {
        Self {
            store,
            state: PipelineState::Empty,
            manifest: None,
            sources: Vec::new(),
            augmented: Vec::new(),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    /// The loaded source manifest.
    pub fn manifest(&self) -> Option<&M> {
        self.manifest.as_ref()
    }

    pub fn sources(&self) -> &[SourceSample<M::Sample, St::Image>] {
        &self.sources
    }

    /// The current augmented set, empty until a transform has run.
    pub fn augmented(&self) -> &[AugmentedSample<M::Sample, St::Image>] {
        &self.augmented
    }

    /// Decodes and validates `dict`, then reads every sample's images.
    ///
    /// # Errors
    /// - [`DictaugError::InvalidState`] unless the pipeline is empty.
    /// - [`DictaugError::ValidationFailed`] listing every violated invariant.
    /// - Any error of the image store. The pipeline stays empty.
    pub fn load_source(&mut self, dict: &Dict) -> Result<(), DictaugError> {
        self.expect_state("load a source", &[PipelineState::Empty])?;

        let manifest = M::decode(dict);
        let report = manifest.validate();
        for issue in report.issues.iter() {
            if issue.severity == Severity::Warning {
                log::warn!("{}: {}", issue.context, issue.message);
            }
        }
        require_valid(report)?;

        let sources = self.read_sources(&manifest)?;
        log::info!("loaded {} {} sample(s)", sources.len(), M::KIND);

        self.manifest = Some(manifest);
        self.sources = sources;
        self.state = PipelineState::Loaded;
        Ok(())
    }

    /// Reads the manifest at `path` and loads it with [`Self::load_source`].
    pub fn load_source_from_path(&mut self, path: &Path) -> Result<(), DictaugError> {
        self.expect_state("load a source", &[PipelineState::Empty])?;
        let dict = read_dict(path)?;
        self.load_source(&dict)
    }

    fn read_sources(
        &self,
        manifest: &M,
    ) -> Result<Vec<SourceSample<M::Sample, St::Image>>, DictaugError> {
        let image_dir = Path::new(manifest.header().image_dir.as_deref().unwrap_or_default());
        let segmentation_dir = manifest.segmentation_dir().map(Path::new);
        let records = manifest.samples().unwrap_or_default();

        let mut sources = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let file_name = record.file_name().ok_or(DictaugError::IncompleteSample {
                index,
                field: "image_file_name",
            })?;
            let image = self.store.read_image(&image_dir.join(file_name))?;

            let segmentation_image = match record.segmentation_file_name() {
                Some(name) => {
                    let dir = segmentation_dir.unwrap_or(image_dir);
                    Some(self.store.read_image(&dir.join(name))?)
                }
                None => None,
            };

            sources.push(SourceSample {
                record: record.clone(),
                image,
                segmentation_image,
            });
        }
        Ok(sources)
    }

    /// Runs `transform` over every source sample in manifest order and keeps
    /// everything it returns as the augmented set.
    ///
    /// Returns the number of augmented samples.
    pub fn augment<T>(&mut self, mut transform: T) -> Result<usize, DictaugError>
    where
        T: Transform<M::Sample, St::Image>,
    {
        self.expect_loaded("run a transform")?;

        let augmented: Vec<_> = self
            .sources
            .iter()
            .flat_map(|source| transform.apply(source))
            .collect();

        Ok(self.finish_transform(augmented))
    }

    /// Runs a simple transform over every source sample in manifest order.
    ///
    /// Results get consecutive ids starting at 1 across the whole pass, and
    /// file names `{stem}_{id}.png` derived from their source sample. A
    /// result that carries a label image has its label file name derived
    /// from the source's segmentation file name the same way.
    pub fn simple_augment<T>(&mut self, mut transform: T) -> Result<usize, DictaugError>
    where
        T: SimpleTransform<St::Image, <M::Sample as SampleRecord>::Geometry>,
    {
        self.expect_loaded("run a transform")?;

        let mut next_id: i64 = 1;
        let mut augmented = Vec::new();
        for (index, source) in self.sources.iter().enumerate() {
            let record = &source.record;
            let geometry = record.geometry().ok_or(DictaugError::IncompleteSample {
                index,
                field: "geometry",
            })?;
            let file_name = record.file_name().ok_or(DictaugError::IncompleteSample {
                index,
                field: "image_file_name",
            })?;

            for derived in transform.apply(
                &source.image,
                source.segmentation_image.as_ref(),
                &geometry,
            ) {
                let id = next_id;
                next_id += 1;

                let segmentation_file_name = derived
                    .segmentation_image
                    .as_ref()
                    .and(record.segmentation_file_name())
                    .map(|seg| derived_file_name(seg, id));
                let name = SampleName {
                    id,
                    file_name: derived_file_name(file_name, id),
                    segmentation_file_name,
                };
                augmented.push(AugmentedSample {
                    record: M::Sample::assemble(name, derived.geometry),
                    image: derived.image,
                    segmentation_image: derived.segmentation_image,
                });
            }
        }

        Ok(self.finish_transform(augmented))
    }

    fn finish_transform(
        &mut self,
        augmented: Vec<AugmentedSample<M::Sample, St::Image>>,
    ) -> usize {
        log::info!(
            "transform produced {} sample(s) from {} source(s)",
            augmented.len(),
            self.sources.len()
        );
        self.augmented = augmented;
        self.state = PipelineState::Transformed;
        self.augmented.len()
    }

    /// Writes every augmented image and the augmented manifest.
    ///
    /// `token` is checked before each image and before the manifest. On
    /// cancellation the images written so far are left in place and no
    /// manifest is written.
    ///
    /// # Errors
    /// - [`DictaugError::InvalidState`] if no transform has run.
    /// - [`DictaugError::IncompleteSample`] if a sample lacks a file name,
    ///   or names a label image it does not carry (or the reverse).
    /// - [`DictaugError::InvalidFileName`] if a file name is not a bare
    ///   file name.
    /// - [`DictaugError::ValidationFailed`] if the augmented manifest would
    ///   not pass validation.
    ///
    /// Nothing is written when any of these checks fail.
    /// - [`DictaugError::Cancelled`] if `token` was cancelled.
    /// - Any filesystem, image store or encoding error.
    pub fn save(
        &mut self,
        options: &SaveOptions,
        token: &CancellationToken,
    ) -> Result<SaveSummary, DictaugError> {
        self.expect_state(
            "save",
            &[PipelineState::Transformed, PipelineState::Saved],
        )?;
        let manifest = self.manifest.as_ref().ok_or(DictaugError::InvalidState {
            operation: "save",
            state: self.state,
        })?;

        let segmentation_dir = options.resolved_segmentation_dir();
        let targets = self.output_paths(&options.image_dir, &segmentation_dir)?;
        let has_segmentation = targets.iter().any(|(_, label)| label.is_some());

        let output = manifest.with_samples(
            options.image_dir.to_string_lossy().into_owned(),
            has_segmentation.then(|| segmentation_dir.to_string_lossy().into_owned()),
            self.augmented.iter().map(|s| s.record.clone()).collect(),
        );
        require_valid(output.validate())?;
        let dict = output.encode()?;

        fs::create_dir_all(&options.image_dir)?;
        if has_segmentation {
            fs::create_dir_all(&segmentation_dir)?;
        }

        log::info!(
            "saving {} augmented sample(s) to {}",
            self.augmented.len(),
            options.image_dir.display()
        );

        let mut images_written = 0;
        for (sample, (path, label_path)) in self.augmented.iter().zip(&targets) {
            if token.is_cancelled() {
                log::info!("save cancelled after {} image(s)", images_written);
                return Err(DictaugError::Cancelled);
            }

            self.store.write_image(&sample.image, format_of(path)?, path)?;
            log::debug!("wrote {}", path.display());

            if let (Some(label), Some(path)) = (&sample.segmentation_image, label_path) {
                self.store
                    .write_image(label, format_of(path)?, path)?;
                log::debug!("wrote {}", path.display());
            }

            images_written += 1;
        }

        if token.is_cancelled() {
            log::info!("save cancelled before writing the manifest");
            return Err(DictaugError::Cancelled);
        }
        write_dict(&options.manifest_path, &dict)?;
        log::info!("wrote manifest {}", options.manifest_path.display());

        self.state = PipelineState::Saved;
        Ok(SaveSummary {
            images_written,
            manifest_path: options.manifest_path.clone(),
            image_dir: options.image_dir.clone(),
        })
    }

    /// Resolves where each augmented sample and its label image go.
    fn output_paths(
        &self,
        image_dir: &Path,
        segmentation_dir: &Path,
    ) -> Result<Vec<(PathBuf, Option<PathBuf>)>, DictaugError> {
        let mut targets = Vec::with_capacity(self.augmented.len());
        for (index, sample) in self.augmented.iter().enumerate() {
            let file_name = sample.record.file_name().ok_or(DictaugError::IncompleteSample {
                index,
                field: "image_file_name",
            })?;
            let image_path = output_path(image_dir, file_name, index)?;

            let label_path = match (
                &sample.segmentation_image,
                sample.record.segmentation_file_name(),
            ) {
                (Some(_), Some(name)) => Some(output_path(segmentation_dir, name, index)?),
                (Some(_), None) => {
                    return Err(DictaugError::IncompleteSample {
                        index,
                        field: "segmentation_file_name",
                    })
                }
                (None, Some(_)) => {
                    return Err(DictaugError::IncompleteSample {
                        index,
                        field: "segmentation_image",
                    })
                }
                (None, None) => None,
            };
            targets.push((image_path, label_path));
        }
        Ok(targets)
    }

    /// Runs [`Self::save`] on a dedicated thread.
    ///
    /// The pipeline moves onto the thread and comes back from
    /// [`SaveTask::join`].
    pub fn spawn_save(
        self,
        options: SaveOptions,
        token: CancellationToken,
    ) -> Result<SaveTask<M, St>, DictaugError>
    where
        Self: Send + 'static,
    {
        let mut pipeline = self;
        let handle = thread::Builder::new()
            .name("dictaug-save".to_string())
            .spawn(move || {
                let result = pipeline.save(&options, &token);
                (pipeline, result)
            })?;
        Ok(SaveTask { handle })
    }

    fn expect_loaded(&self, operation: &'static str) -> Result<(), DictaugError> {
        self.expect_state(
            operation,
            &[
                PipelineState::Loaded,
                PipelineState::Transformed,
                PipelineState::Saved,
            ],
        )
    }

    fn expect_state(
        &self,
        operation: &'static str,
        allowed: &[PipelineState],
    ) -> Result<(), DictaugError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(DictaugError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}

/// A save running on a background thread.
pub struct SaveTask<M: Manifest, St: ImageStore> {
    handle: thread::JoinHandle<(Pipeline<M, St>, Result<SaveSummary, DictaugError>)>,
}

impl<M: Manifest, St: ImageStore> SaveTask<M, St> {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the save, returning the pipeline and the save's result.
    ///
    /// A panic on the save thread is resumed on the caller's thread.
    pub fn join(self) -> (Pipeline<M, St>, Result<SaveSummary, DictaugError>) {
        match self.handle.join() {
            Ok(outcome) => outcome,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// `{stem}_{id}.png` for a source file name.
fn require_valid(report: ValidationReport) -> Result<(), DictaugError> {
    if report.is_ok() {
        return Ok(());
    }
    Err(DictaugError::ValidationFailed {
        error_count: report.error_count(),
        warning_count: report.warning_count(),
        report,
    })
}

/// Joins `name` onto `dir`. Only bare file names are accepted, so output
/// never lands outside `dir`.
fn output_path(dir: &Path, name: &str, index: usize) -> Result<PathBuf, DictaugError> {
    match Path::new(name).file_name() {
        Some(plain) if plain == name => Ok(dir.join(name)),
        _ => Err(DictaugError::InvalidFileName {
            index,
            name: name.to_string(),
        }),
    }
}

fn derived_file_name(file_name: &str, id: i64) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    format!("{}_{}.png", stem, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_file_name() {
        assert_eq!(derived_file_name("cat.jpg", 3), "cat_3.png");
        assert_eq!(derived_file_name("sub/dir/a.b.tif", 12), "a.b_12.png");
        assert_eq!(derived_file_name("noext", 1), "noext_1.png");
    }

    #[test]
    fn test_output_path_requires_bare_name() {
        let dir = Path::new("/out");
        assert_eq!(
            output_path(dir, "a_1.png", 0).expect("bare name"),
            PathBuf::from("/out/a_1.png")
        );
        for name in ["sub/x.png", "/etc/x.png", "..", "x.png/", ""] {
            let err = output_path(dir, name, 4).expect_err(name);
            assert!(
                matches!(err, DictaugError::InvalidFileName { index: 4, .. }),
                "{name}: {err:?}"
            );
        }
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PipelineState::Transformed.to_string(), "transformed");
    }

    #[test]
    fn test_save_options_under() {
        let options = SaveOptions::under(Path::new("/out"));
        assert_eq!(options.image_dir, PathBuf::from("/out/augmented_images"));
        assert_eq!(
            options.manifest_path,
            PathBuf::from("/out/augmented_manifest.json")
        );
        assert_eq!(
            options.resolved_segmentation_dir(),
            PathBuf::from("/out/augmented_images/segmentation")
        );
    }
}
