//! LTR11 Doppler radar sessions.
//!
//! Frames are complex vectors of `num_of_samples` IQ samples plus the
//! detector metadata the chip computes for the same frame. Two read modes
//! exist: [`Ltr11Device::next_frame`] copies every frame into a fresh array,
//! while [`Ltr11Device::next_frame_into`] lets the SDK write straight into a
//! caller-owned [`FrameBuffer`] that is reused across calls.

use crate::buffer::{HostView, NativeOwned};
use crate::enumerate::{list_ltr11_with, normalize_uuid};
use crate::error::{ErrorCode, RadarError};
use crate::loader::{library, RadarLibrary};
use crate::session::{timeout_ms, NativeHandle, Session, SessionState};
use crate::stream::{FrameSource, FrameStream, StreamConfig};
use crate::sys::VectorC;
use crate::types::{DeviceInfo, FirmwareInfo, Ltr11Config, Ltr11ConfigLimits, Ltr11Metadata, SensorInfo};
use crate::Result;
use ndarray::Array1;
use num_complex::Complex32;
use std::ffi::{c_int, CString};
use std::path::Path;
use std::ptr;
use std::sync::Arc;
use std::time::Duration;

/// Host-owned sample buffer the SDK writes frames into.
pub type FrameBuffer = HostView<VectorC>;

impl HostView<VectorC> {
    /// Zeroed buffer for frames of `num_samples` samples.
    pub fn with_len(num_samples: usize) -> Result<Self> {
        Self::new(Array1::from_elem(num_samples, Complex32::new(0.0, 0.0)))
    }
}

/// One LTR11 frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Ltr11Frame {
    pub samples: Array1<Complex32>,
    pub metadata: Ltr11Metadata,
}

/// All connected LTR11 boards.
pub fn list() -> Result<Vec<DeviceInfo>> {
    list_ltr11_with(&*library()?)
}

/// An open BGT60LTR11AIP board.
pub struct Ltr11Device {
    session: Session,
}

impl Ltr11Device {
    /// Open the first available board.
    pub fn open_first() -> Result<Ltr11Device> {
        Self::open_with(library()?, None)
    }

    /// Open the board with this uuid (32 hex digits, dashes allowed).
    pub fn open_by_uuid(uuid: &str) -> Result<Ltr11Device> {
        Self::open_with(library()?, Some(uuid))
    }

    pub(crate) fn open_with(lib: Arc<RadarLibrary>, uuid: Option<&str>) -> Result<Ltr11Device> {
        let ptr = match uuid {
            None => lib.checked_ptr("ifx_ltr11_create", |api| unsafe { (api.ifx_ltr11_create)() })?,
            Some(uuid) => {
                let canonical = normalize_uuid(uuid)?;
                let c_uuid = CString::new(canonical.as_str())
                    .map_err(|_| RadarError::InvalidUuid(uuid.to_string()))?;
                lib.checked_ptr("ifx_ltr11_create_by_uuid", |api| unsafe {
                    (api.ifx_ltr11_create_by_uuid)(c_uuid.as_ptr())
                })
                .map_err(|e| match e {
                    RadarError::InvalidArgument { .. } => RadarError::InvalidUuid(uuid.to_string()),
                    other => other,
                })?
            }
        };

        let destroy = lib.api().ifx_ltr11_destroy;
        let device = Ltr11Device {
            session: Session::new(NativeHandle::new(lib, ptr, destroy, "LTR11 device")),
        };
        match uuid {
            Some(uuid) => log::info!("Opened LTR11 device: UUID={}", uuid),
            None => log::info!("Opened LTR11 device"),
        }
        Ok(device)
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn config(&self) -> Result<Ltr11Config> {
        let mut config = Ltr11Config::default();
        self.session
            .checked(|api, h| unsafe { (api.ifx_ltr11_get_config)(h, &mut config) })?;
        Ok(config)
    }

    /// Apply a configuration. Out-of-range values fail with `InvalidConfig`.
    pub fn set_config(&mut self, config: &Ltr11Config) -> Result<()> {
        self.session
            .checked(|api, h| unsafe { (api.ifx_ltr11_set_config)(h, config) })?;
        log::debug!(
            "Applied LTR11 config: {} Hz, {} samples",
            config.rf_frequency_hz,
            config.num_of_samples
        );
        Ok(())
    }

    pub fn config_defaults(&self) -> Result<Ltr11Config> {
        let mut config = Ltr11Config::default();
        self.session
            .checked(|api, h| unsafe { (api.ifx_ltr11_get_config_defaults)(h, &mut config) })?;
        Ok(config)
    }

    /// Valid ranges for the ranged config fields.
    pub fn limits(&self) -> Result<Ltr11ConfigLimits> {
        let mut limits = Ltr11ConfigLimits::default();
        self.session
            .checked(|api, h| unsafe { (api.ifx_ltr11_get_limits)(h, &mut limits) })?;
        Ok(limits)
    }

    /// Ask the device whether `config` would be accepted, without applying it.
    pub fn check_config(&self, config: &Ltr11Config) -> Result<bool> {
        self.session
            .checked(|api, h| unsafe { (api.ifx_ltr11_check_config)(h, config) })
    }

    /// Estimated power draw in active mode, in milliwatts.
    pub fn active_mode_power(&self, config: &Ltr11Config) -> Result<f32> {
        self.session
            .checked(|api, h| unsafe { (api.ifx_ltr11_get_active_mode_power)(h, config) })
    }

    /// Sampling frequency in Hz for a pulse repetition time (`LTR11_PRT_*`).
    pub fn sampling_frequency(&self, prt: u32) -> Result<u32> {
        let raw = c_int::try_from(prt).map_err(|_| RadarError::InvalidArgument {
            code: ErrorCode::ArgumentInvalid.raw(),
            description: format!("pulse repetition time {} out of range", prt),
        })?;
        self.session
            .checked(|api, h| unsafe { (api.ifx_ltr11_get_sampling_frequency)(h, raw) })
    }

    /// Write the chip registers to a text file.
    pub fn register_dump_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let c_path = CString::new(path.to_string_lossy().into_owned()).map_err(|_| RadarError::InvalidArgument {
            code: ErrorCode::ArgumentInvalid.raw(),
            description: format!("dump path {} contains a NUL byte", path.display()),
        })?;
        self.session
            .checked(|api, h| unsafe { (api.ifx_ltr11_register_dump_to_file)(h, c_path.as_ptr()) })?;
        log::debug!("Dumped LTR11 registers to {}", path.display());
        Ok(())
    }

    pub fn firmware_info(&self) -> Result<FirmwareInfo> {
        let handle = self.session.handle()?;
        let raw = self
            .session
            .library()
            .checked_ptr("ifx_ltr11_get_firmware_information", |api| unsafe {
                (api.ifx_ltr11_get_firmware_information)(handle).cast_mut()
            })?;
        Ok(unsafe { FirmwareInfo::from_raw(raw.as_ref()) })
    }

    pub fn sensor_info(&self) -> Result<SensorInfo> {
        let handle = self.session.handle()?;
        let raw = self
            .session
            .library()
            .checked_ptr("ifx_ltr11_get_sensor_information", |api| unsafe {
                (api.ifx_ltr11_get_sensor_information)(handle).cast_mut()
            })?;
        Ok(unsafe { SensorInfo::from_raw(raw.as_ref()) })
    }

    pub fn start_acquisition(&mut self) -> Result<()> {
        let start = self.session.api().ifx_ltr11_start_acquisition;
        self.session.start(start)
    }

    pub fn stop_acquisition(&mut self) -> Result<()> {
        let stop = self.session.api().ifx_ltr11_stop_acquisition;
        self.session.stop(stop)
    }

    /// Fetch the next frame into freshly allocated host memory.
    ///
    /// `None` waits with the SDK default timeout. A failed read leaves the
    /// session `Acquiring`, so a timeout can simply be retried.
    pub fn next_frame(&mut self, timeout: Option<Duration>) -> Result<Ltr11Frame> {
        let handle = self.session.acquiring_handle()?;
        let lib = Arc::clone(self.session.library());
        let mut metadata = Ltr11Metadata::default();
        let raw = unsafe { read_frame(&lib, handle, ptr::null_mut(), &mut metadata, timeout) };
        let frame = unsafe { NativeOwned::<VectorC>::from_raw(raw, lib.api()) };
        self.after_read(lib.check_error())?;
        let samples = frame
            .ok_or(RadarError::NullReturn {
                function: "ifx_ltr11_get_next_frame",
            })?
            .into_array()?;
        Ok(Ltr11Frame { samples, metadata })
    }

    /// Fetch the next frame into `buffer`, reusing its memory.
    ///
    /// The SDK only fills buffers of exactly `num_of_samples` samples. A buffer
    /// of another length is resized to the current config and the read is
    /// issued once more.
    pub fn next_frame_into(&mut self, buffer: &mut FrameBuffer, timeout: Option<Duration>) -> Result<Ltr11Metadata> {
        match self.read_into(buffer, timeout) {
            Err(RadarError::InvalidArgument { code, description }) if code == ErrorCode::DimensionMismatch.raw() => {
                let num_samples = usize::from(self.config()?.num_of_samples);
                if num_samples == buffer.array().len() {
                    return Err(RadarError::InvalidArgument { code, description });
                }
                log::debug!(
                    "Resizing LTR11 frame buffer from {} to {} samples",
                    buffer.array().len(),
                    num_samples
                );
                *buffer = FrameBuffer::with_len(num_samples)?;
                self.read_into(buffer, timeout)
            }
            result => result,
        }
    }

    fn read_into(&mut self, buffer: &mut FrameBuffer, timeout: Option<Duration>) -> Result<Ltr11Metadata> {
        let handle = self.session.acquiring_handle()?;
        let lib = Arc::clone(self.session.library());
        let mut metadata = Ltr11Metadata::default();
        let raw = unsafe { read_frame(&lib, handle, buffer.as_mut_ptr(), &mut metadata, timeout) };
        self.after_read(lib.check_error())?;
        if raw.is_null() {
            return Err(RadarError::NullReturn {
                function: "ifx_ltr11_get_next_frame",
            });
        }
        Ok(metadata)
    }

    /// The firmware stops streaming on every failed read, timeouts included.
    /// Start it again so the host state stays accurate.
    fn after_read(&mut self, result: Result<()>) -> Result<()> {
        let Err(err) = result else {
            return Ok(());
        };
        let start = self.session.api().ifx_ltr11_start_acquisition;
        if let Err(restart) = self.session.rearm(start) {
            log::warn!("LTR11 acquisition not restarted after '{}': {}", err, restart);
        }
        Err(err)
    }

    /// Release the device. Idempotent; also done on drop.
    pub fn close(&mut self) {
        self.session.close();
    }

    /// Start acquisition and move the device onto a reader thread.
    pub fn into_stream(self, config: StreamConfig) -> Result<FrameStream<Ltr11Frame>> {
        FrameStream::start(self, config)
    }
}

unsafe fn read_frame(
    lib: &RadarLibrary,
    handle: *mut std::ffi::c_void,
    frame: *mut VectorC,
    metadata: &mut Ltr11Metadata,
    timeout: Option<Duration>,
) -> *mut VectorC {
    match timeout {
        Some(t) => (lib.api().ifx_ltr11_get_next_frame_timeout)(handle, frame, metadata, timeout_ms(t)),
        None => (lib.api().ifx_ltr11_get_next_frame)(handle, frame, metadata),
    }
}

impl FrameSource for Ltr11Device {
    type Frame = Ltr11Frame;

    fn start_acquisition(&mut self) -> Result<()> {
        Ltr11Device::start_acquisition(self)
    }

    fn next_frame(&mut self, timeout: Option<Duration>) -> Result<Ltr11Frame> {
        Ltr11Device::next_frame(self, timeout)
    }

    fn close(&mut self) {
        Ltr11Device::close(self)
    }
}
