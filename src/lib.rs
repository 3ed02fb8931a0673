//! # radar-sdk - Rust bindings for the Infineon radar sensor SDK
//!
//! Loads the vendor's shared library at runtime and wraps it in owned,
//! typed sessions. Provides:
//! - Device discovery for Avian (FMCW) and LTR11 (Doppler) boards
//! - Configuration, metrics and diagnostics queries
//! - Frame acquisition into `ndarray` arrays, blocking or on a reader thread
//! - Playback of recorded sessions through the Avian API
//!
//! The library is searched in `RADAR_SDK_LIB_DIR`, then next to the running
//! executable, then in the current directory.
//!
//! ## Quick Start
//! ```no_run
//! use radar_sdk::{AvianDevice, StreamConfig};
//! use std::time::Duration;
//!
//! println!("SDK {}", radar_sdk::sdk_version().unwrap());
//! for info in radar_sdk::list(None).unwrap() {
//!     println!("{:?} {}", info.sensor, info.uuid);
//! }
//!
//! let mut device = AvianDevice::open_first().unwrap();
//! let mut config = device.config_defaults().unwrap();
//! config.num_chirps_per_frame = 32;
//! device.set_config(&config).unwrap();
//!
//! let stream = device.into_stream(StreamConfig::default()).unwrap();
//! for _ in 0..100 {
//!     let frame = stream.recv_timeout(Duration::from_secs(1)).unwrap();
//!     println!("frame {:?}", frame.dim());
//! }
//! ```

pub mod error;
pub mod sys;
pub mod loader;
pub mod buffer;
pub mod record;
pub mod types;
pub mod owned;
pub mod enumerate;
pub mod session;
pub mod recording;
pub mod avian;
pub mod ltr11;
pub mod stream;

#[cfg(test)]
mod testing;

pub use avian::{AvianDevice, Selector};
pub use enumerate::{list, list_ltr11, list_uuids};
pub use error::{ErrorCode, ErrorKind, RadarError};
pub use loader::{library, library_with, sdk_version, sdk_version_full, LoaderConfig, RadarLibrary, SdkVersion};
pub use ltr11::{FrameBuffer, Ltr11Device, Ltr11Frame};
pub use record::{ByteString, FieldValue, Mapping, Record};
pub use recording::{Recording, RecordingKind, RecordingMode};
pub use session::SessionState;
pub use stream::{FrameSource, FrameStream, StreamConfig};
pub use types::*;

/// Result type alias for radar SDK operations.
pub type Result<T> = std::result::Result<T, RadarError>;
