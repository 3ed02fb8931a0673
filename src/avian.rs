use crate::buffer::NativeOwned;
use crate::enumerate::normalize_uuid;
use crate::error::{ErrorCode, RadarError};
use crate::loader::{library, RadarLibrary};
use crate::owned::{NativeList, NativeString};
use crate::recording::Recording;
use crate::session::{timeout_ms, NativeHandle, Session, SessionState};
use crate::stream::{FrameSource, FrameStream, StreamConfig};
use crate::sys::{c_str_to_string, CubeR};
use crate::types::{DeviceConfig, DeviceMetrics, FirmwareInfo, SensorInfo, ShieldInfo};
use crate::Result;
use ndarray::Array3;
use std::ffi::{c_void, CString};
use std::ptr;
use std::sync::Arc;
use std::time::Duration;

/// Which Avian board to open.
#[derive(Debug, Clone)]
pub enum Selector {
    /// First board found.
    First,
    /// Board on a serial port, e.g. `COM5` or `/dev/ttyACM0`.
    Port(String),
    /// Board with this uuid (32 hex digits, dashes allowed).
    Uuid(String),
    /// Replay a recording instead of talking to hardware.
    Playback {
        recording: Arc<Recording>,
        correct_timing: bool,
    },
}

/// An open Avian FMCW radar (BGT60TR13C and relatives).
///
/// Frames are `(rx antennas, chirps, samples per chirp)` cubes of real samples.
pub struct AvianDevice {
    session: Session,
    // Declared after `session` so the device is destroyed before its recording.
    recording: Option<Arc<Recording>>,
}

impl AvianDevice {
    /// Open a board with the process-wide SDK.
    pub fn open(selector: Selector) -> Result<AvianDevice> {
        Self::open_with(library()?, selector)
    }

    /// Open the first available board.
    pub fn open_first() -> Result<AvianDevice> {
        Self::open(Selector::First)
    }

    pub(crate) fn open_with(lib: Arc<RadarLibrary>, selector: Selector) -> Result<AvianDevice> {
        let mut recording = None;
        let ptr = match selector {
            Selector::First => lib.checked_ptr("ifx_avian_create", |api| unsafe {
                (api.ifx_avian_create)()
            })?,
            Selector::Port(port) => {
                let c_port = CString::new(port.as_str()).map_err(|_| RadarError::PortUnavailable {
                    port: port.clone(),
                    code: 0,
                    description: "port name contains a NUL byte".into(),
                })?;
                lib.checked_ptr("ifx_avian_create_by_port", |api| unsafe {
                    (api.ifx_avian_create_by_port)(c_port.as_ptr())
                })
                .map_err(|e| port_unavailable(&port, e))?
            }
            Selector::Uuid(uuid) => {
                let canonical = normalize_uuid(&uuid)?;
                let c_uuid = CString::new(canonical.as_str())
                    .map_err(|_| RadarError::InvalidUuid(uuid.clone()))?;
                lib.checked_ptr("ifx_avian_create_by_uuid", |api| unsafe {
                    (api.ifx_avian_create_by_uuid)(c_uuid.as_ptr())
                })
                .map_err(|e| match e {
                    RadarError::InvalidArgument { .. } => RadarError::InvalidUuid(uuid.clone()),
                    other => other,
                })?
            }
            Selector::Playback {
                recording: rec,
                correct_timing,
            } => {
                let rec_handle = rec.handle()?;
                let ptr = lib.checked_ptr("ifx_avian_create_dummy_from_recording", |api| unsafe {
                    (api.ifx_avian_create_dummy_from_recording)(rec_handle, correct_timing)
                })?;
                recording = Some(rec);
                ptr
            }
        };

        let destroy = lib.api().ifx_avian_destroy;
        let device = AvianDevice {
            session: Session::new(NativeHandle::new(lib, ptr, destroy, "Avian device")),
            recording,
        };
        match device.board_uuid() {
            Ok(uuid) => log::info!("Opened Avian device: UUID={}", uuid),
            Err(e) => log::info!("Opened Avian device (uuid unavailable: {})", e),
        }
        Ok(device)
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// The recording this device replays, if any.
    pub fn recording(&self) -> Option<&Arc<Recording>> {
        self.recording.as_ref()
    }

    /// Current acquisition parameters.
    pub fn config(&self) -> Result<DeviceConfig> {
        let mut config = DeviceConfig::default();
        self.session
            .checked(|api, h| unsafe { (api.ifx_avian_get_config)(h, &mut config) })?;
        Ok(config)
    }

    /// Apply acquisition parameters. Rejected configurations fail with `InvalidConfig`.
    pub fn set_config(&mut self, config: &DeviceConfig) -> Result<()> {
        self.session
            .checked(|api, h| unsafe { (api.ifx_avian_set_config)(h, config) })?;
        log::debug!(
            "Applied Avian config: {} Hz, frame shape {:?}",
            config.sample_rate_hz,
            config.frame_shape()
        );
        Ok(())
    }

    /// Parameters recommended for the connected sensor.
    pub fn config_defaults(&self) -> Result<DeviceConfig> {
        let mut config = DeviceConfig::default();
        self.session
            .checked(|api, h| unsafe { (api.ifx_avian_get_config_defaults)(h, &mut config) })?;
        Ok(config)
    }

    pub fn metrics_defaults(&self) -> Result<DeviceMetrics> {
        let mut metrics = DeviceMetrics::default();
        self.session
            .checked(|api, h| unsafe { (api.ifx_avian_metrics_get_defaults)(h, &mut metrics) })?;
        Ok(metrics)
    }

    /// Translate high-level metrics into a device config.
    pub fn metrics_to_config(&self, metrics: &DeviceMetrics, round_to_power_of_two: bool) -> Result<DeviceConfig> {
        let mut config = DeviceConfig::default();
        self.session.checked(|api, h| unsafe {
            (api.ifx_avian_metrics_to_config)(h, metrics, &mut config, round_to_power_of_two)
        })?;
        Ok(config)
    }

    pub fn metrics_from_config(&self, config: &DeviceConfig) -> Result<DeviceMetrics> {
        let mut metrics = DeviceMetrics::default();
        self.session
            .checked(|api, h| unsafe { (api.ifx_avian_metrics_from_config)(h, config, &mut metrics) })?;
        Ok(metrics)
    }

    /// Start streaming frames. No-op while already acquiring.
    pub fn start_acquisition(&mut self) -> Result<()> {
        let start = self.session.api().ifx_avian_start_acquisition;
        self.session.start(start)
    }

    /// Stop streaming frames. No-op unless acquiring.
    pub fn stop_acquisition(&mut self) -> Result<()> {
        let stop = self.session.api().ifx_avian_stop_acquisition;
        self.session.stop(stop)
    }

    /// Fetch the next frame as an owned `(rx, chirps, samples)` array.
    ///
    /// `None` waits with the SDK default timeout. Retryable failures
    /// (`Timeout`, `FifoOverflow`) leave the session acquiring.
    pub fn next_frame(&mut self, timeout: Option<Duration>) -> Result<Array3<f32>> {
        let handle = self.session.acquiring_handle()?;
        let lib = self.session.library();
        let raw = unsafe {
            match timeout {
                Some(t) => (lib.api().ifx_avian_get_next_frame_timeout)(handle, ptr::null_mut(), timeout_ms(t)),
                None => (lib.api().ifx_avian_get_next_frame)(handle, ptr::null_mut()),
            }
        };
        let frame = unsafe { NativeOwned::<CubeR>::from_raw(raw, lib.api()) };
        lib.check_error()?;
        frame
            .ok_or(RadarError::NullReturn {
                function: "ifx_avian_get_next_frame",
            })?
            .into_array()
    }

    /// Chip temperature in degrees Celsius.
    pub fn temperature(&self) -> Result<f32> {
        let mut celsius = 0.0f32;
        self.session
            .checked(|api, h| unsafe { (api.ifx_avian_get_temperature)(h, &mut celsius) })?;
        Ok(celsius)
    }

    pub fn firmware_info(&self) -> Result<FirmwareInfo> {
        let handle = self.session.handle()?;
        let raw = self
            .session
            .library()
            .checked_ptr("ifx_avian_get_firmware_information", |api| unsafe {
                (api.ifx_avian_get_firmware_information)(handle).cast_mut()
            })?;
        Ok(unsafe { FirmwareInfo::from_raw(raw.as_ref()) })
    }

    pub fn sensor_info(&self) -> Result<SensorInfo> {
        let handle = self.session.handle()?;
        let raw = self
            .session
            .library()
            .checked_ptr("ifx_avian_get_sensor_information", |api| unsafe {
                (api.ifx_avian_get_sensor_information)(handle).cast_mut()
            })?;
        Ok(unsafe { SensorInfo::from_raw(raw.as_ref()) })
    }

    pub fn shield_info(&self) -> Result<ShieldInfo> {
        let mut info = ShieldInfo::default();
        self.session
            .checked(|api, h| unsafe { (api.ifx_avian_get_shield_information)(h, &mut info) })?;
        Ok(info)
    }

    /// Uuid of the connected board.
    pub fn board_uuid(&self) -> Result<String> {
        let handle = self.session.handle()?;
        let raw = self
            .session
            .library()
            .checked_ptr("ifx_avian_get_board_uuid", |api| unsafe {
                (api.ifx_avian_get_board_uuid)(handle).cast_mut()
            })?;
        unsafe { c_str_to_string(raw.as_ptr()) }.ok_or(RadarError::NullReturn {
            function: "ifx_avian_get_board_uuid",
        })
    }

    /// Register dump of the current configuration as text.
    pub fn register_list_string(&self, set_trigger_bit: bool) -> Result<String> {
        let handle = self.session.handle()?;
        let lib = self.session.library();
        let raw = unsafe { (lib.api().ifx_avian_get_register_list_string)(handle, set_trigger_bit) };
        let text = unsafe { NativeString::from_raw(raw, lib.api()) };
        lib.check_error()?;
        text.map(|s| s.to_string_lossy())
            .ok_or(RadarError::NullReturn {
                function: "ifx_avian_get_register_list_string",
            })
    }

    /// Supported high-pass cutoff frequencies in Hz.
    pub fn hp_cutoff_list(&self) -> Result<Vec<u32>> {
        let list = self.session.api().ifx_avian_get_hp_cutoff_list;
        self.cutoff_list(list, "ifx_avian_get_hp_cutoff_list")
    }

    /// Supported anti-aliasing filter cutoff frequencies in Hz.
    pub fn aaf_cutoff_list(&self) -> Result<Vec<u32>> {
        let list = self.session.api().ifx_avian_get_aaf_cutoff_list;
        self.cutoff_list(list, "ifx_avian_get_aaf_cutoff_list")
    }

    fn cutoff_list(
        &self,
        get: unsafe extern "C" fn(*mut c_void) -> *mut c_void,
        function: &'static str,
    ) -> Result<Vec<u32>> {
        let handle = self.session.handle()?;
        let lib = self.session.library();
        let list = unsafe { NativeList::from_raw(get(handle), lib.api()) };
        lib.check_error()?;
        let list = list.ok_or(RadarError::NullReturn { function })?;
        unsafe { list.copy_items::<u32>() }.ok_or(RadarError::NullReturn { function: "ifx_list_get" })
    }

    /// Release the device. Idempotent; also done on drop.
    pub fn close(&mut self) {
        self.session.close();
    }

    /// Start acquisition and move the device onto a reader thread.
    pub fn into_stream(self, config: StreamConfig) -> Result<FrameStream<Array3<f32>>> {
        FrameStream::start(self, config)
    }
}

impl FrameSource for AvianDevice {
    type Frame = Array3<f32>;

    fn start_acquisition(&mut self) -> Result<()> {
        AvianDevice::start_acquisition(self)
    }

    fn next_frame(&mut self, timeout: Option<Duration>) -> Result<Array3<f32>> {
        AvianDevice::next_frame(self, timeout)
    }

    fn close(&mut self) {
        AvianDevice::close(self)
    }
}

/// Port-level failures are reported against the requested port.
fn port_unavailable(port: &str, err: RadarError) -> RadarError {
    match err {
        RadarError::DeviceNotFound { code, description } => RadarError::PortUnavailable {
            port: port.to_string(),
            code,
            description,
        },
        RadarError::GenericDeviceError { code, description }
            if matches!(
                ErrorCode::from_raw(code),
                ErrorCode::DeviceBusy | ErrorCode::CommunicationError
            ) =>
        {
            RadarError::PortUnavailable {
                port: port.to_string(),
                code,
                description,
            }
        }
        other => other,
    }
}
