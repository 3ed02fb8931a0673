//! Recorded sessions that can stand in for a live Avian board.

use crate::error::{ErrorCode, RadarError};
use crate::loader::{library, RadarLibrary};
use crate::session::NativeHandle;
use crate::Result;
use std::ffi::{c_int, CString};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// How a recording is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingMode {
    Read,
    Write,
    ReadWrite,
}

impl RecordingMode {
    fn raw(self) -> c_int {
        match self {
            Self::Read => 0,
            Self::Write => 1,
            Self::ReadWrite => 2,
        }
    }
}

/// Device family a recording belongs to. Only Avian recordings can be replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingKind {
    Avian,
    Unknown,
}

impl RecordingKind {
    fn raw(self) -> c_int {
        match self {
            Self::Avian => 0,
            Self::Unknown => 1,
        }
    }
}

/// An open recording. Destroyed on drop.
///
/// Playback devices keep an `Arc` to the recording they read from.
pub struct Recording {
    handle: NativeHandle,
    path: PathBuf,
}

// Only the handle value and path are read through a shared reference.
unsafe impl Sync for Recording {}

impl Recording {
    /// Open the recording at `path`; `index` picks one of several sessions in it.
    pub fn open(path: impl AsRef<Path>, mode: RecordingMode, kind: RecordingKind, index: i32) -> Result<Self> {
        Self::open_with(library()?, path.as_ref(), mode, kind, index)
    }

    pub(crate) fn open_with(
        lib: Arc<RadarLibrary>,
        path: &Path,
        mode: RecordingMode,
        kind: RecordingKind,
        index: i32,
    ) -> Result<Self> {
        let c_path = CString::new(path.to_string_lossy().into_owned()).map_err(|_| RadarError::InvalidArgument {
            code: ErrorCode::ArgumentInvalid.raw(),
            description: format!("recording path {} contains a NUL byte", path.display()),
        })?;
        let ptr = lib.checked_ptr("ifx_recording_create", |api| unsafe {
            (api.ifx_recording_create)(c_path.as_ptr(), mode.raw(), kind.raw(), index)
        })?;
        log::info!("Opened recording {} ({:?}, {:?})", path.display(), mode, kind);
        let destroy = lib.api().ifx_recording_destroy;
        Ok(Self {
            handle: NativeHandle::new(lib, ptr, destroy, "recording"),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn handle(&self) -> Result<*mut std::ffi::c_void> {
        self.handle.as_ptr().ok_or(RadarError::NullReturn {
            function: "ifx_recording_create",
        })
    }
}

impl std::fmt::Debug for Recording {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recording").field("path", &self.path).finish()
    }
}
