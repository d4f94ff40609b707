use std::sync::{Arc, Weak};

use crate::camera::{CameraDevice, CameraFrame, FrameSource, StreamRequest};
use crate::error::CameraError;

/// Lifecycle of one camera acquisition. `Denied` covers every acquisition
/// failure; `Denied` and `Stopped` are terminal, retry means constructing
/// a new session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum SessionStatus {
    Uninitialized,
    Requesting,
    Active,
    Denied,
    Stopped,
}

/// Cloneable handle onto a session's live feed. The session keeps sole
/// ownership of the stream, so handles go dead the moment it stops.
#[derive(Clone, Debug)]
pub struct LiveFrames {
    feed: Option<Weak<dyn FrameSource>>,
}

impl LiveFrames {
    fn dead() -> Self {
        Self { feed: None }
    }

    fn of(feed: &Arc<dyn FrameSource>) -> Self {
        Self {
            feed: Some(Arc::downgrade(feed)),
        }
    }
}

impl FrameSource for LiveFrames {
    fn latest_frame(&self) -> Option<CameraFrame> {
        self.feed.as_ref()?.upgrade()?.latest_frame()
    }
}

/// Exclusive owner of one camera device handle.
///
/// The device is held from a successful [`start`](Self::start) until
/// [`stop`](Self::stop) or drop, whichever comes first.
pub struct CaptureSession<D: CameraDevice> {
    device: Option<D>,
    feed: Option<Arc<dyn FrameSource>>,
    status: SessionStatus,
}

impl<D: CameraDevice> CaptureSession<D> {
    pub fn new(device: D) -> Self {
        Self {
            device: Some(device),
            feed: None,
            status: SessionStatus::Uninitialized,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Acquire the front camera. Suspends while the platform prompts and
    /// warms up. On failure the device is released and the session is
    /// spent; while already Active this returns another handle to the
    /// running feed.
    pub async fn start(&mut self) -> Result<LiveFrames, CameraError> {
        if self.status == SessionStatus::Active {
            if let Some(feed) = &self.feed {
                return Ok(LiveFrames::of(feed));
            }
        }
        let Some(device) = self.device.as_mut() else {
            return Err(CameraError::no_device(
                "session is spent, construct a new one to retry",
            ));
        };
        self.status = SessionStatus::Requesting;
        match device.open(StreamRequest::front()).await {
            Ok(feed) => {
                let feed: Arc<dyn FrameSource> = Arc::new(feed);
                let handle = LiveFrames::of(&feed);
                self.feed = Some(feed);
                self.status = SessionStatus::Active;
                tracing::debug!("camera stream active");
                Ok(handle)
            }
            Err(err) => {
                self.status = SessionStatus::Denied;
                self.device = None;
                tracing::debug!(error = %err, "camera acquisition failed");
                Err(err)
            }
        }
    }

    /// Release the device and every outstanding frame handle. Idempotent,
    /// always safe; the session ends Stopped no matter the path here.
    pub fn stop(&mut self) {
        if self.feed.take().is_some() {
            tracing::debug!("camera stream released");
        }
        self.device = None;
        self.status = SessionStatus::Stopped;
    }

    /// A frame handle for the current state: live while Active, dead
    /// otherwise.
    pub fn frames(&self) -> LiveFrames {
        match &self.feed {
            Some(feed) => LiveFrames::of(feed),
            None => LiveFrames::dead(),
        }
    }
}

impl<D: CameraDevice> FrameSource for CaptureSession<D> {
    fn latest_frame(&self) -> Option<CameraFrame> {
        self.feed.as_ref().and_then(|f| f.latest_frame())
    }
}

impl<D: CameraDevice> Drop for CaptureSession<D> {
    fn drop(&mut self) {
        self.stop();
    }
}
