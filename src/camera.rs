use std::cell::Cell;
use std::sync::{Arc, Weak};

use crate::error::{BoothError, BoothResult, CameraError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LensFacing {
    #[default]
    Front,
    Rear,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StreamRequest {
    pub facing: LensFacing,
}

impl StreamRequest {
    /// The booth always asks for the user-facing lens.
    pub fn front() -> Self {
        Self {
            facing: LensFacing::Front,
        }
    }
}

/// One decoded frame at the device's native resolution, straight-alpha
/// rgba8. Pixels are unmirrored; preview mirroring is the host's concern.
#[derive(Clone, Debug)]
pub struct CameraFrame {
    width: u32,
    height: u32,
    rgba8: Arc<[u8]>,
}

impl CameraFrame {
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> BoothResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| BoothError::validation("frame dimensions overflow"))?;
        if width == 0 || height == 0 {
            return Err(BoothError::validation("frame dimensions must be non-zero"));
        }
        if rgba8.len() != expected {
            return Err(BoothError::validation(format!(
                "frame buffer length {} does not match {}x{} rgba8",
                rgba8.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8: rgba8.into(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba8(&self) -> &[u8] {
        &self.rgba8
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.rgba8.to_vec()
    }
}

/// Live provider of decoded frames. `None` until the first frame has
/// arrived, and forever after the owning session stops.
pub trait FrameSource {
    fn latest_frame(&self) -> Option<CameraFrame>;
}

/// Platform camera seam. Opening acquires the device exclusively; the
/// returned feed owns the underlying stream and dropping it releases the
/// device.
#[allow(async_fn_in_trait)]
pub trait CameraDevice {
    type Feed: FrameSource + 'static;

    async fn open(&mut self, request: StreamRequest) -> Result<Self::Feed, CameraError>;
}

/// Deterministic in-process device: a fixed gradient test pattern at a
/// configured size. Hosts integrate real hardware behind [`CameraDevice`];
/// this one backs demos and tests.
#[derive(Debug)]
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    warmup_frames: u64,
    lease: Weak<()>,
}

impl SyntheticCamera {
    pub fn new(width: u32, height: u32) -> BoothResult<Self> {
        if width == 0 || height == 0 {
            return Err(BoothError::validation(
                "synthetic camera dimensions must be non-zero",
            ));
        }
        Ok(Self {
            width,
            height,
            warmup_frames: 0,
            lease: Weak::new(),
        })
    }

    /// First `frames` polls after open report no frame, like a real sensor
    /// warming up.
    pub fn with_warmup(mut self, frames: u64) -> Self {
        self.warmup_frames = frames;
        self
    }
}

impl CameraDevice for SyntheticCamera {
    type Feed = SyntheticFeed;

    async fn open(&mut self, _request: StreamRequest) -> Result<SyntheticFeed, CameraError> {
        if self.lease.strong_count() > 0 {
            return Err(CameraError::hardware_failure("device is busy"));
        }
        let token = Arc::new(());
        self.lease = Arc::downgrade(&token);
        Ok(SyntheticFeed {
            width: self.width,
            height: self.height,
            pattern: test_pattern(self.width, self.height).into(),
            warmup_frames: self.warmup_frames,
            polls: Cell::new(0),
            _lease: token,
        })
    }
}

#[derive(Debug)]
pub struct SyntheticFeed {
    width: u32,
    height: u32,
    pattern: Arc<[u8]>,
    warmup_frames: u64,
    polls: Cell<u64>,
    _lease: Arc<()>,
}

impl FrameSource for SyntheticFeed {
    fn latest_frame(&self) -> Option<CameraFrame> {
        let n = self.polls.get();
        self.polls.set(n + 1);
        if n < self.warmup_frames {
            return None;
        }
        Some(CameraFrame {
            width: self.width,
            height: self.height,
            rgba8: Arc::clone(&self.pattern),
        })
    }
}

// Red ramps left to right, green top to bottom, blue diagonally.
fn test_pattern(width: u32, height: u32) -> Vec<u8> {
    let wspan = u64::from(width.max(2) - 1);
    let hspan = u64::from(height.max(2) - 1);
    let mut px = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..u64::from(height) {
        for x in 0..u64::from(width) {
            px.push((x * 255 / wspan) as u8);
            px.push((y * 255 / hspan) as u8);
            px.push(((x + y) * 255 / (wspan + hspan)) as u8);
            px.push(255);
        }
    }
    px
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_buffer_length_is_checked() {
        assert!(CameraFrame::from_rgba8(2, 2, vec![0u8; 16]).is_ok());
        assert!(CameraFrame::from_rgba8(2, 2, vec![0u8; 15]).is_err());
        assert!(CameraFrame::from_rgba8(0, 2, vec![]).is_err());
    }

    #[test]
    fn synthetic_frames_are_deterministic() {
        let mut cam = SyntheticCamera::new(8, 4).unwrap();
        let feed = pollster::block_on(cam.open(StreamRequest::front())).unwrap();
        let a = feed.latest_frame().unwrap();
        let b = feed.latest_frame().unwrap();
        assert_eq!(a.rgba8(), b.rgba8());
        assert_eq!((a.width(), a.height()), (8, 4));
        // left edge darker than right edge in the red channel
        assert!(a.rgba8()[0] < a.rgba8()[(8 - 1) * 4]);
    }

    #[test]
    fn open_while_leased_reports_busy() {
        let mut cam = SyntheticCamera::new(4, 4).unwrap();
        let feed = pollster::block_on(cam.open(StreamRequest::front())).unwrap();
        let err = pollster::block_on(cam.open(StreamRequest::front())).unwrap_err();
        assert!(matches!(err, CameraError::HardwareFailure(_)));
        drop(feed);
        assert!(pollster::block_on(cam.open(StreamRequest::front())).is_ok());
    }

    #[test]
    fn warmup_delays_the_first_frame() {
        let mut cam = SyntheticCamera::new(4, 4).unwrap().with_warmup(2);
        let feed = pollster::block_on(cam.open(StreamRequest::front())).unwrap();
        assert!(feed.latest_frame().is_none());
        assert!(feed.latest_frame().is_none());
        assert!(feed.latest_frame().is_some());
    }
}
