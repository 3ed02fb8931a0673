//! Lifecycle shared by every device session.
//!
//! A session is `Open` as soon as it exists, moves to `Acquiring` between
//! start and stop, and ends `Closed`. The native handle is destroyed exactly
//! once, either by an explicit close or on drop.

use crate::error::RadarError;
use crate::loader::{RadarApi, RadarLibrary};
use crate::Result;
use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::Arc;
use std::time::Duration;

/// Lifecycle state of a device session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Acquiring,
    Closed,
}

/// Millisecond timeout for the native frame calls, clamped to `1..=u16::MAX`.
pub(crate) fn timeout_ms(timeout: Duration) -> u16 {
    let ms = u16::try_from(timeout.as_millis()).unwrap_or(u16::MAX).max(1);
    if u128::from(ms) != timeout.as_millis() {
        log::debug!("Frame timeout {:?} clamped to {} ms", timeout, ms);
    }
    ms
}

/// An opaque native handle plus the call that destroys it.
pub(crate) struct NativeHandle {
    ptr: Option<NonNull<c_void>>,
    destroy: unsafe extern "C" fn(*mut c_void),
    kind: &'static str,
    lib: Arc<RadarLibrary>,
}

// The handle is exclusively owned; the SDK accepts calls on it from any
// thread as long as they are not concurrent.
unsafe impl Send for NativeHandle {}

impl NativeHandle {
    pub(crate) fn new(
        lib: Arc<RadarLibrary>,
        ptr: NonNull<c_void>,
        destroy: unsafe extern "C" fn(*mut c_void),
        kind: &'static str,
    ) -> Self {
        Self {
            ptr: Some(ptr),
            destroy,
            kind,
            lib,
        }
    }

    pub(crate) fn as_ptr(&self) -> Option<*mut c_void> {
        self.ptr.map(NonNull::as_ptr)
    }

    pub(crate) fn library(&self) -> &Arc<RadarLibrary> {
        &self.lib
    }

    /// Destroy the native object. Returns `false` if it was already released.
    ///
    /// Errors raised by the destroy call are logged and discarded.
    pub(crate) fn release(&mut self) -> bool {
        let Some(ptr) = self.ptr.take() else {
            return false;
        };
        unsafe { (self.destroy)(ptr.as_ptr()) };
        if let Some(code) = self.lib.take_error() {
            log::warn!(
                "Ignoring error while destroying {}: {} (0x{:05x})",
                self.kind,
                self.lib.describe(code),
                code
            );
        }
        true
    }
}

impl Drop for NativeHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// State machine around a [`NativeHandle`].
pub(crate) struct Session {
    handle: NativeHandle,
    state: SessionState,
}

impl Session {
    pub(crate) fn new(handle: NativeHandle) -> Self {
        Self {
            handle,
            state: SessionState::Open,
        }
    }

    pub(crate) fn state(&self) -> SessionState {
        self.state
    }

    pub(crate) fn library(&self) -> &Arc<RadarLibrary> {
        self.handle.library()
    }

    pub(crate) fn api(&self) -> &RadarApi {
        self.handle.library().api()
    }

    /// Native handle of a session that is not closed.
    pub(crate) fn handle(&self) -> Result<*mut c_void> {
        match (self.state, self.handle.as_ptr()) {
            (SessionState::Open | SessionState::Acquiring, Some(ptr)) => Ok(ptr),
            _ => Err(RadarError::InvalidState {
                expected: SessionState::Open,
                actual: self.state,
            }),
        }
    }

    /// Native handle of a session that is currently acquiring.
    pub(crate) fn acquiring_handle(&self) -> Result<*mut c_void> {
        match self.state {
            SessionState::Acquiring => self.handle(),
            actual => Err(RadarError::InvalidState {
                expected: SessionState::Acquiring,
                actual,
            }),
        }
    }

    /// Run `call` with the handle, then check the error slot.
    pub(crate) fn checked<T>(&self, call: impl FnOnce(&RadarApi, *mut c_void) -> T) -> Result<T> {
        let handle = self.handle()?;
        self.library().checked(|api| call(api, handle))
    }

    /// Start streaming. A no-op while already acquiring.
    pub(crate) fn start(&mut self, start: unsafe extern "C" fn(*mut c_void) -> bool) -> Result<()> {
        if self.state == SessionState::Acquiring {
            return Ok(());
        }
        let started = self.checked(|_, h| unsafe { start(h) })?;
        log::debug!("Started {} acquisition (status {})", self.handle.kind, started);
        self.state = SessionState::Acquiring;
        Ok(())
    }

    /// Issue `start` again on a session that is already acquiring, for devices
    /// that stop streaming by themselves. Falls back to `Open` if that fails.
    pub(crate) fn rearm(&mut self, start: unsafe extern "C" fn(*mut c_void) -> bool) -> Result<()> {
        if self.state != SessionState::Acquiring {
            return Ok(());
        }
        match self.checked(|_, h| unsafe { start(h) }) {
            Ok(_) => {
                log::debug!("Restarted {} acquisition", self.handle.kind);
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Open;
                Err(e)
            }
        }
    }

    /// Stop streaming. A no-op unless acquiring.
    pub(crate) fn stop(&mut self, stop: unsafe extern "C" fn(*mut c_void) -> bool) -> Result<()> {
        match self.state {
            SessionState::Acquiring => {}
            SessionState::Open => return Ok(()),
            actual => {
                return Err(RadarError::InvalidState {
                    expected: SessionState::Acquiring,
                    actual,
                })
            }
        }
        let stopped = self.checked(|_, h| unsafe { stop(h) })?;
        log::debug!("Stopped {} acquisition (status {})", self.handle.kind, stopped);
        self.state = SessionState::Open;
        Ok(())
    }

    /// Release the handle. Idempotent.
    pub(crate) fn close(&mut self) {
        if self.handle.release() {
            log::info!("Closed {}", self.handle.kind);
        }
        self.state = SessionState::Closed;
    }
}
