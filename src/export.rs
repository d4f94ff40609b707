use std::path::{Path, PathBuf};

use crate::error::{BoothError, BoothResult, ShareError};
use crate::snapshot::EncodedBitmap;

pub const COLLAGE_FILE_NAME: &str = "film-reel-collage.png";
pub const SHARE_TITLE: &str = "Check out my selfie!";

/// File name for an individual photo export, numbered from 1.
pub fn photo_file_name(sequence_index: u32) -> String {
    format!("selfie-{}.png", u64::from(sequence_index) + 1)
}

pub fn ensure_parent_dir(path: &Path) -> BoothResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Outgoing handoff: the encoded bitmap plus the metadata share targets want.
#[derive(Clone, Debug)]
pub struct SharePayload {
    pub title: &'static str,
    pub file_name: String,
    pub bitmap: EncodedBitmap,
}

/// What the host surface can do with a [`SharePayload`]. Capability probes
/// decide the branch; a probe saying yes followed by a failed handoff is
/// `TransferFailed`, never a silent fallthrough.
#[allow(async_fn_in_trait)]
pub trait ShareSurface {
    fn offers_share_sheet(&self) -> bool;
    fn offers_clipboard(&self) -> bool;
    async fn present_share_sheet(&mut self, payload: &SharePayload) -> Result<(), ShareError>;
    async fn copy_to_clipboard(&mut self, payload: &SharePayload) -> Result<(), ShareError>;
}

/// How a share resolved, for the host to report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    CopiedToClipboard,
}

/// Writes encoded bitmaps under a fixed save directory and hands them to
/// share surfaces.
#[derive(Clone, Debug)]
pub struct Exporter {
    save_dir: PathBuf,
}

impl Exporter {
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
        }
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Saves the bitmap as `<save_dir>/<suggested_name>`, creating missing
    /// directories, and returns the written path.
    #[tracing::instrument(skip(self, bitmap))]
    pub fn to_file(&self, bitmap: &EncodedBitmap, suggested_name: &str) -> BoothResult<PathBuf> {
        use anyhow::Context as _;
        if suggested_name.is_empty() || suggested_name.contains(['/', '\\']) {
            return Err(BoothError::validation(format!(
                "invalid export file name '{suggested_name}'"
            )));
        }
        let path = self.save_dir.join(suggested_name);
        ensure_parent_dir(&path)?;
        std::fs::write(&path, bitmap.bytes())
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = bitmap.bytes().len(), "export written");
        Ok(path)
    }

    /// Hands the bitmap to the surface's share sheet when one is offered,
    /// else to its clipboard, else fails with `Unsupported`. The bitmap is
    /// borrowed and stays reusable whatever the outcome.
    #[tracing::instrument(skip(self, surface, bitmap))]
    pub async fn share<S: ShareSurface>(
        &self,
        surface: &mut S,
        bitmap: &EncodedBitmap,
        file_name: &str,
    ) -> Result<ShareOutcome, ShareError> {
        let payload = SharePayload {
            title: SHARE_TITLE,
            file_name: file_name.to_string(),
            bitmap: bitmap.clone(),
        };
        if surface.offers_share_sheet() {
            surface.present_share_sheet(&payload).await?;
            return Ok(ShareOutcome::Shared);
        }
        if surface.offers_clipboard() {
            surface.copy_to_clipboard(&payload).await?;
            return Ok(ShareOutcome::CopiedToClipboard);
        }
        Err(ShareError::unsupported(
            "surface offers neither a share sheet nor a clipboard",
        ))
    }
}
