use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Local};

use crate::camera::FrameSource;
use crate::catalog::FilterDescriptor;
use crate::error::{BoothError, BoothResult};
use crate::filter::apply_ops_in_place;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum ImageMime {
    Png,
}

impl ImageMime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
        }
    }
}

/// Opaque encoded payload plus its mime descriptor. Cheap to clone.
#[derive(Clone, Debug)]
pub struct EncodedBitmap {
    mime: ImageMime,
    bytes: Arc<Vec<u8>>,
}

impl EncodedBitmap {
    /// PNG-encodes a straight-alpha rgba8 buffer at its native size.
    pub fn png_from_rgba8(width: u32, height: u32, px: &[u8]) -> BoothResult<Self> {
        let img = image::RgbaImage::from_raw(width, height, px.to_vec())
            .ok_or_else(|| BoothError::validation("rgba8 buffer does not match dimensions"))?;
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .context("encoding png")?;
        Ok(Self {
            mime: ImageMime::Png,
            bytes: Arc::new(bytes),
        })
    }

    pub fn mime(&self) -> ImageMime {
        self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn shared_bytes(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.bytes)
    }

    pub fn decode(&self) -> BoothResult<DecodedBitmap> {
        let img = image::load_from_memory(self.bytes()).context("decoding bitmap")?;
        let rgba = img.to_rgba8();
        Ok(DecodedBitmap {
            width: rgba.width(),
            height: rgba.height(),
            rgba8: rgba.into_raw(),
        })
    }
}

/// Decoded straight-alpha pixels of an [`EncodedBitmap`].
#[derive(Clone, Debug)]
pub struct DecodedBitmap {
    pub width: u32,
    pub height: u32,
    pub rgba8: Vec<u8>,
}

/// One captured still: the filtered bitmap and when it was taken.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub bitmap: EncodedBitmap,
    pub taken_at: DateTime<Local>,
    pub filter: String,
}

/// Grabs the latest decoded frame and bakes the filter's ops into it, in
/// declared order, at native resolution. Stored pixels are never mirrored.
#[tracing::instrument(skip(frames))]
pub fn capture(frames: &dyn FrameSource, filter: &FilterDescriptor) -> BoothResult<Snapshot> {
    let Some(frame) = frames.latest_frame() else {
        return Err(BoothError::frame_unavailable(
            "live feed has not produced a frame",
        ));
    };
    let mut px = frame.to_vec();
    apply_ops_in_place(&mut px, filter.ops)?;
    let bitmap = EncodedBitmap::png_from_rgba8(frame.width(), frame.height(), &px)?;
    Ok(Snapshot {
        bitmap,
        taken_at: Local::now(),
        filter: filter.name.to_string(),
    })
}
