use crate::camera::CameraDevice;
use crate::catalog::{self, FilterDescriptor};
use crate::collage::{CollageComposer, CollageScene, CollageTheme};
use crate::error::{BoothError, BoothResult, CameraError};
use crate::gallery::{Photo, PhotoCollection, StyledPhoto};
use crate::raster::{CollageArtifact, SceneRasterizer};
use crate::session::{CaptureSession, LiveFrames, SessionStatus};
use crate::snapshot;

/// Booth-level knobs. `style_seed: None` seeds the collage styling from the
/// clock, as the fresh-look-per-render behavior wants.
#[derive(Clone, Debug)]
pub struct BoothOptions {
    pub theme: CollageTheme,
    pub style_seed: Option<u64>,
}

impl Default for BoothOptions {
    fn default() -> Self {
        Self {
            theme: CollageTheme::default(),
            style_seed: None,
        }
    }
}

/// The whole booth: one capture session, the photo roll, the active filter
/// and the collage composer, driven by a host UI.
pub struct PhotoBooth<D: CameraDevice> {
    session: CaptureSession<D>,
    gallery: PhotoCollection,
    composer: CollageComposer,
    filter: &'static FilterDescriptor,
}

impl<D: CameraDevice> PhotoBooth<D> {
    pub fn new(device: D) -> BoothResult<Self> {
        Self::with_options(device, BoothOptions::default())
    }

    pub fn with_options(device: D, options: BoothOptions) -> BoothResult<Self> {
        let composer = match options.style_seed {
            Some(seed) => CollageComposer::with_seed(options.theme, seed)?,
            None => CollageComposer::new(options.theme)?,
        };
        Ok(Self {
            session: CaptureSession::new(device),
            gallery: PhotoCollection::new(),
            composer,
            filter: catalog::default_filter(),
        })
    }

    pub async fn start(&mut self) -> Result<LiveFrames, CameraError> {
        self.session.start().await
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    /// Stops the stream. The photo roll is kept.
    pub fn stop(&mut self) {
        self.session.stop();
    }

    pub fn filters(&self) -> &'static [FilterDescriptor] {
        catalog::filters()
    }

    pub fn selected_filter(&self) -> &'static FilterDescriptor {
        self.filter
    }

    pub fn select_filter(&mut self, name: &str) -> BoothResult<&'static FilterDescriptor> {
        let descriptor = catalog::resolve(name)
            .ok_or_else(|| BoothError::validation(format!("unknown filter '{name}'")))?;
        self.filter = descriptor;
        tracing::debug!(filter = descriptor.name, "filter selected");
        Ok(descriptor)
    }

    /// Captures the latest live frame through the active filter and appends
    /// it to the roll.
    pub fn take_photo(&mut self) -> BoothResult<&Photo> {
        let snapshot = snapshot::capture(&self.session, self.filter)?;
        let index = self.gallery.append(snapshot);
        Ok(&self.gallery.all()[index as usize])
    }

    pub fn gallery(&self) -> &PhotoCollection {
        &self.gallery
    }

    /// The roll dressed for display. Styling rolls fresh on every call;
    /// the same photo can come back wearing a different look.
    pub fn styled_gallery(&mut self) -> Vec<StyledPhoto<'_>> {
        let pass = self.composer.styler().next_pass();
        self.gallery.styled_view(pass)
    }

    pub fn reset_gallery(&mut self) {
        self.gallery.reset();
    }

    /// Lays out the current roll as a film strip scene. Styling re-rolls on
    /// every call.
    pub fn compose(&mut self) -> BoothResult<CollageScene> {
        self.composer.compose(self.gallery.all())
    }

    /// Composes and rasterizes in one step, at the theme's oversampling
    /// factor.
    pub async fn render_collage<R: SceneRasterizer>(
        &mut self,
        raster: &mut R,
    ) -> BoothResult<CollageArtifact> {
        let oversample = self.composer.theme().oversample;
        let scene = self.compose()?;
        raster.rasterize(&scene, oversample).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::SyntheticCamera;

    fn booth() -> PhotoBooth<SyntheticCamera> {
        let camera = SyntheticCamera::new(8, 8).unwrap();
        PhotoBooth::with_options(
            camera,
            BoothOptions {
                style_seed: Some(11),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn flow_from_grant_to_strip_and_reset() {
        let mut booth = booth();
        pollster::block_on(booth.start()).unwrap();
        assert_eq!(booth.status(), SessionStatus::Active);

        booth.select_filter("grayscale").unwrap();
        booth.take_photo().unwrap();
        booth.select_filter("none").unwrap();
        booth.take_photo().unwrap();
        assert_eq!(booth.gallery().len(), 2);

        let scene = booth.compose().unwrap();
        assert_eq!(scene.frame_count(), 2);
        assert_eq!(scene.frames[0].badge_text, "1");
        assert_eq!(scene.frames[1].badge_text, "2");

        booth.reset_gallery();
        assert!(booth.gallery().is_empty());
        booth.stop();
        assert_eq!(booth.status(), SessionStatus::Stopped);
    }

    #[test]
    fn unknown_filter_name_is_rejected() {
        let mut booth = booth();
        let err = booth.select_filter("x-ray").unwrap_err();
        assert!(matches!(err, BoothError::Validation(_)));
        assert_eq!(booth.selected_filter().name, "none");
    }

    #[test]
    fn capture_before_start_is_frame_unavailable() {
        let mut booth = booth();
        let err = booth.take_photo().unwrap_err();
        assert!(matches!(err, BoothError::FrameUnavailable(_)));
    }

    #[test]
    fn filter_listing_is_the_full_catalog() {
        let booth = booth();
        assert_eq!(booth.filters().len(), 12);
        assert_eq!(booth.filters()[0].name, booth.selected_filter().name);
    }

    #[test]
    fn styled_gallery_rerolls_between_calls() {
        let mut booth = booth();
        pollster::block_on(booth.start()).unwrap();
        for _ in 0..8 {
            booth.take_photo().unwrap();
        }
        let first: Vec<&str> = booth.styled_gallery().iter().map(|s| s.style.name).collect();
        let second: Vec<&str> = booth.styled_gallery().iter().map(|s| s.style.name).collect();
        assert_eq!(first.len(), 8);
        assert_ne!(first, second);
    }
}
