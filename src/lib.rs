#![forbid(unsafe_code)]

pub mod booth;
pub mod camera;
pub mod catalog;
pub mod collage;
pub mod decor;
pub mod error;
pub mod export;
pub mod filter;
pub mod gallery;
pub mod raster;
pub mod session;
pub mod snapshot;

pub use booth::{BoothOptions, PhotoBooth};
pub use camera::{
    CameraDevice, CameraFrame, FrameSource, LensFacing, StreamRequest, SyntheticCamera,
};
pub use catalog::{FilterDescriptor, default_filter, filters, resolve};
pub use collage::{CollageComposer, CollageScene, CollageTheme, FilmFrame};
pub use decor::{PresentationStyle, StylePass, Styler};
pub use error::{BoothError, BoothResult, CameraError, ShareError};
pub use export::{Exporter, ShareOutcome, SharePayload, ShareSurface};
pub use filter::FilterOp;
pub use gallery::{Photo, PhotoCollection, StyledPhoto};
pub use raster::{CollageArtifact, SceneRasterizer, SvgRasterizer};
pub use session::{CaptureSession, LiveFrames, SessionStatus};
pub use snapshot::{EncodedBitmap, Snapshot, capture};
