//! The transform contract between the pipeline and caller-supplied
//! augmentation code.
//!
//! There are two forms, both generic over the task's sample record:
//!
//! - [`Transform`] sees the full source sample and returns fully formed
//!   augmented samples. The caller chooses ids and file names.
//! - [`SimpleTransform`] sees only the image(s) and the typed geometry view,
//!   and returns [`Derived`] results. The pipeline assigns ids and file names.
//!
//! Closures of the right shape implement both traits.

/// A loaded sample together with its images.
#[derive(Clone, Debug)]
pub struct SourceSample<S, I> {
    pub record: S,
    pub image: I,
    /// The paired label image, for semantic segmentation.
    pub segmentation_image: Option<I>,
}

/// A sample produced by a transform, ready to be written.
#[derive(Clone, Debug)]
pub struct AugmentedSample<S, I> {
    pub record: S,
    pub image: I,
    pub segmentation_image: Option<I>,
}

impl<S, I> AugmentedSample<S, I> {
    pub fn new(record: S, image: I) -> Self {
        Self {
            record,
            image,
            segmentation_image: None,
        }
    }

    pub fn with_segmentation_image(mut self, image: I) -> Self {
        self.segmentation_image = Some(image);
        self
    }
}

/// One result of a [`SimpleTransform`].
#[derive(Clone, Debug)]
pub struct Derived<I, G> {
    pub image: I,
    pub segmentation_image: Option<I>,
    pub geometry: G,
}

impl<I, G> Derived<I, G> {
    pub fn new(image: I, geometry: G) -> Self {
        Self {
            image,
            segmentation_image: None,
            geometry,
        }
    }
}

/// Maps one source sample to zero or more augmented samples.
pub trait Transform<S, I> {
    fn apply(&mut self, source: &SourceSample<S, I>) -> Vec<AugmentedSample<S, I>>;
}

impl<S, I, F> Transform<S, I> for F
where
    F: FnMut(&SourceSample<S, I>) -> Vec<AugmentedSample<S, I>>,
{
    fn apply(&mut self, source: &SourceSample<S, I>) -> Vec<AugmentedSample<S, I>> {
        self(source)
    }
}

/// Maps an image, its optional label image and its geometry view to zero or
/// more derived results.
pub trait SimpleTransform<I, G> {
    fn apply(
        &mut self,
        image: &I,
        segmentation_image: Option<&I>,
        geometry: &G,
    ) -> Vec<Derived<I, G>>;
}

impl<I, G, F> SimpleTransform<I, G> for F
where
    F: FnMut(&I, Option<&I>, &G) -> Vec<Derived<I, G>>,
{
    fn apply(
        &mut self,
        image: &I,
        segmentation_image: Option<&I>,
        geometry: &G,
    ) -> Vec<Derived<I, G>> {
        self(image, segmentation_image, geometry)
    }
}
