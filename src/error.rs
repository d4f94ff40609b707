pub type BoothResult<T> = Result<T, BoothError>;

/// Camera acquisition failures. Any of these is terminal for the session
/// that observed it.
#[derive(thiserror::Error, Debug)]
pub enum CameraError {
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),

    #[error("no camera device: {0}")]
    NoDevice(String),

    #[error("camera hardware failure: {0}")]
    HardwareFailure(String),
}

impl CameraError {
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    pub fn no_device(msg: impl Into<String>) -> Self {
        Self::NoDevice(msg.into())
    }

    pub fn hardware_failure(msg: impl Into<String>) -> Self {
        Self::HardwareFailure(msg.into())
    }
}

/// Export handoff failures. The artifact being shared stays intact.
#[derive(thiserror::Error, Debug)]
pub enum ShareError {
    #[error("sharing unsupported: {0}")]
    Unsupported(String),

    #[error("share transfer failed: {0}")]
    TransferFailed(String),
}

impl ShareError {
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    pub fn transfer_failed(msg: impl Into<String>) -> Self {
        Self::TransferFailed(msg.into())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum BoothError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("no frame available: {0}")]
    FrameUnavailable(String),

    #[error("composition unavailable: {0}")]
    CompositionUnavailable(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error(transparent)]
    Share(#[from] ShareError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BoothError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn frame_unavailable(msg: impl Into<String>) -> Self {
        Self::FrameUnavailable(msg.into())
    }

    pub fn composition(msg: impl Into<String>) -> Self {
        Self::CompositionUnavailable(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            BoothError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            BoothError::frame_unavailable("x")
                .to_string()
                .contains("no frame available:")
        );
        assert!(
            BoothError::composition("x")
                .to_string()
                .contains("composition unavailable:")
        );
        assert!(BoothError::serde("x").to_string().contains("serialization error:"));
    }

    #[test]
    fn camera_kind_survives_wrapping() {
        let err = BoothError::from(CameraError::permission_denied("user said no"));
        assert!(matches!(
            err,
            BoothError::Camera(CameraError::PermissionDenied(_))
        ));
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn share_kind_survives_wrapping() {
        let err = BoothError::from(ShareError::unsupported("no surface"));
        assert!(matches!(err, BoothError::Share(ShareError::Unsupported(_))));
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = BoothError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
