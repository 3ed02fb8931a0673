//! Records exchanged with the radar SDK.
//!
//! The `#[repr(C)]` structs here are passed to native calls as-is. Info
//! records that carry native strings are copied into owned host structs.

use crate::record::{impl_record, nested_record, ByteString};
use crate::sys::{DeviceListEntry, RawFirmwareInfo, RawSensorInfo};
use std::ffi::c_int;

/// Radar sensor family (`ifx_Radar_Sensor_t`). Unrecognised values are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RadarSensor {
    Bgt60Tr13c,
    Bgt60Atr24c,
    Bgt60Utr13d,
    Bgt60Tr12e,
    Bgt60Utr11,
    Bgt120Utr13e,
    Bgt24Ltr24,
    Bgt120Utr24,
    UnknownAvian,
    Bgt24Atr22,
    Bgt60Ltr11Aip,
    Unknown,
    Other(c_int),
}

impl RadarSensor {
    pub fn from_raw(raw: c_int) -> Self {
        match raw {
            0 => Self::Bgt60Tr13c,
            1 => Self::Bgt60Atr24c,
            2 => Self::Bgt60Utr13d,
            3 => Self::Bgt60Tr12e,
            4 => Self::Bgt60Utr11,
            5 => Self::Bgt120Utr13e,
            6 => Self::Bgt24Ltr24,
            7 => Self::Bgt120Utr24,
            8 => Self::UnknownAvian,
            128 => Self::Bgt24Atr22,
            256 => Self::Bgt60Ltr11Aip,
            4095 => Self::Unknown,
            other => Self::Other(other),
        }
    }

    pub fn raw(self) -> c_int {
        match self {
            Self::Bgt60Tr13c => 0,
            Self::Bgt60Atr24c => 1,
            Self::Bgt60Utr13d => 2,
            Self::Bgt60Tr12e => 3,
            Self::Bgt60Utr11 => 4,
            Self::Bgt120Utr13e => 5,
            Self::Bgt24Ltr24 => 6,
            Self::Bgt120Utr24 => 7,
            Self::UnknownAvian => 8,
            Self::Bgt24Atr22 => 128,
            Self::Bgt60Ltr11Aip => 256,
            Self::Unknown => 4095,
            Self::Other(raw) => raw,
        }
    }

    /// Sensors driven through the Avian API.
    pub fn is_avian(self) -> bool {
        matches!(self.raw(), 0..=8)
    }
}

/// Shield (RF board) type reported by the connected board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShieldType {
    Missing,
    Unknown,
    Bgt60Tr13Aip,
    Bgt60Atr24Aip,
    Bgt60Utr11,
    Bgt60Utr13d,
    Bgt60Ltr11,
    Bgt60Ltr11Monostat,
    Bgt60Ltr11B11,
    Bgt24Atr22Es,
    Bgt24Atr22Prod,
    Other(u16),
}

impl ShieldType {
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0x0000 => Self::Missing,
            0x0001 => Self::Unknown,
            0x0200 => Self::Bgt60Tr13Aip,
            0x0201 => Self::Bgt60Atr24Aip,
            0x0202 => Self::Bgt60Utr11,
            0x0203 => Self::Bgt60Utr13d,
            0x0300 => Self::Bgt60Ltr11,
            0x0301 => Self::Bgt60Ltr11Monostat,
            0x0302 => Self::Bgt60Ltr11B11,
            0x0400 => Self::Bgt24Atr22Es,
            0x0401 => Self::Bgt24Atr22Prod,
            other => Self::Other(other),
        }
    }

    pub fn raw(self) -> u16 {
        match self {
            Self::Missing => 0x0000,
            Self::Unknown => 0x0001,
            Self::Bgt60Tr13Aip => 0x0200,
            Self::Bgt60Atr24Aip => 0x0201,
            Self::Bgt60Utr11 => 0x0202,
            Self::Bgt60Utr13d => 0x0203,
            Self::Bgt60Ltr11 => 0x0300,
            Self::Bgt60Ltr11Monostat => 0x0301,
            Self::Bgt60Ltr11B11 => 0x0302,
            Self::Bgt24Atr22Es => 0x0400,
            Self::Bgt24Atr22Prod => 0x0401,
            Self::Other(raw) => raw,
        }
    }
}

/// Avian acquisition parameters (`ifx_Avian_Config_t`).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeviceConfig {
    pub sample_rate_hz: u32,
    pub rx_mask: u32,
    pub tx_mask: u32,
    pub tx_power_level: u32,
    pub if_gain_db: u32,
    pub start_frequency_hz: u64,
    pub end_frequency_hz: u64,
    pub num_samples_per_chirp: u32,
    pub num_chirps_per_frame: u32,
    pub chirp_repetition_time_s: f32,
    pub frame_repetition_time_s: f32,
    pub hp_cutoff_hz: u32,
    pub aaf_cutoff_hz: u32,
    /// `0` = off, `1` = TDM.
    pub mimo_mode: u32,
}

impl_record!(DeviceConfig {
    sample_rate_hz => "sample_rate_Hz",
    rx_mask => "rx_mask",
    tx_mask => "tx_mask",
    tx_power_level => "tx_power_level",
    if_gain_db => "if_gain_dB",
    start_frequency_hz => "start_frequency_Hz",
    end_frequency_hz => "end_frequency_Hz",
    num_samples_per_chirp => "num_samples_per_chirp",
    num_chirps_per_frame => "num_chirps_per_frame",
    chirp_repetition_time_s => "chirp_repetition_time_s",
    frame_repetition_time_s => "frame_repetition_time_s",
    hp_cutoff_hz => "hp_cutoff_Hz",
    aaf_cutoff_hz => "aaf_cutoff_Hz",
    mimo_mode => "mimo_mode",
});

impl DeviceConfig {
    /// Number of enabled receive antennas.
    pub fn num_rx_antennas(&self) -> usize {
        self.rx_mask.count_ones() as usize
    }

    /// Shape of the frames this config produces: `(rx antennas, chirps, samples)`.
    pub fn frame_shape(&self) -> (usize, usize, usize) {
        (
            self.num_rx_antennas(),
            self.num_chirps_per_frame as usize,
            self.num_samples_per_chirp as usize,
        )
    }
}

/// High-level Avian parameters (`ifx_Avian_Metrics_t`).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeviceMetrics {
    pub sample_rate_hz: u32,
    pub rx_mask: u32,
    pub tx_mask: u32,
    pub tx_power_level: u32,
    pub if_gain_db: u32,
    pub range_resolution_m: f32,
    pub max_range_m: f32,
    pub max_speed_m_s: f32,
    pub speed_resolution_m_s: f32,
    pub frame_repetition_time_s: f32,
    pub center_frequency_hz: f32,
}

impl_record!(DeviceMetrics {
    sample_rate_hz => "sample_rate_Hz",
    rx_mask => "rx_mask",
    tx_mask => "tx_mask",
    tx_power_level => "tx_power_level",
    if_gain_db => "if_gain_dB",
    range_resolution_m => "range_resolution_m",
    max_range_m => "max_range_m",
    max_speed_m_s => "max_speed_m_s",
    speed_resolution_m_s => "speed_resolution_m_s",
    frame_repetition_time_s => "frame_repetition_time_s",
    center_frequency_hz => "center_frequency_Hz",
});

/// LTR11 Doppler parameters (`ifx_LTR11_Config_t`).
///
/// Enum-typed fields hold the raw native values (see the `LTR11_*` constants).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ltr11Config {
    pub mode: u32,
    pub rf_frequency_hz: u64,
    pub num_of_samples: u16,
    pub internal_detector_threshold: u16,
    pub prt: u32,
    pub pulse_width: u32,
    pub tx_power_level: u32,
    pub rx_if_gain: u32,
    pub aprt_factor: u32,
    pub hold_time: u32,
    pub disable_internal_detector: bool,
}

impl_record!(Ltr11Config {
    mode => "mode",
    rf_frequency_hz => "rf_frequency_Hz",
    num_of_samples => "num_of_samples",
    internal_detector_threshold => "internal_detector_threshold",
    prt => "prt",
    pulse_width => "pulse_width",
    tx_power_level => "tx_power_level",
    rx_if_gain => "rx_if_gain",
    aprt_factor => "aprt_factor",
    hold_time => "hold_time",
    disable_internal_detector => "disable_internal_detector",
});

pub const LTR11_MODE_SPI_CONTINUOUS: u32 = 0;
pub const LTR11_MODE_SPI_PULSE: u32 = 1;

pub const LTR11_PRT_250US: u32 = 0;
pub const LTR11_PRT_500US: u32 = 1;
pub const LTR11_PRT_1000US: u32 = 2;
pub const LTR11_PRT_2000US: u32 = 3;

pub const LTR11_APRT_FACTOR_4: u32 = 0;
pub const LTR11_APRT_FACTOR_8: u32 = 1;
pub const LTR11_APRT_FACTOR_16: u32 = 2;
pub const LTR11_APRT_FACTOR_2: u32 = 3;
pub const LTR11_APRT_DISABLED: u32 = 4;

/// Per-frame detector output of the LTR11 (`ifx_LTR11_Metadata_t`).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ltr11Metadata {
    pub avg_power: f32,
    pub active: bool,
    pub motion: bool,
    pub direction: bool,
}

impl_record!(Ltr11Metadata {
    avg_power => "avg_power",
    active => "active",
    motion => "motion",
    direction => "direction",
});

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepLimits {
    pub min: u64,
    pub max: u64,
    pub step: u64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeLimits {
    pub min: u16,
    pub max: u16,
}

/// Valid ranges for [`Ltr11Config`] (`ifx_LTR11_Config_Limits_t`).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ltr11ConfigLimits {
    pub rf_frequency_hz: StepLimits,
    pub num_of_samples: RangeLimits,
    pub internal_detector_threshold: RangeLimits,
}

impl_record!(StepLimits {
    min => "min",
    max => "max",
    step => "step",
});

impl_record!(RangeLimits {
    min => "min",
    max => "max",
});

nested_record!(StepLimits, RangeLimits);

impl_record!(Ltr11ConfigLimits {
    rf_frequency_hz => "rf_frequency_Hz",
    num_of_samples => "num_of_samples",
    internal_detector_threshold => "internal_detector_threshold",
});

impl Ltr11ConfigLimits {
    /// Host-side pre-check of the ranged fields. The device has the final word.
    pub fn contains(&self, config: &Ltr11Config) -> bool {
        let rf = &self.rf_frequency_hz;
        let in_rf = (rf.min..=rf.max).contains(&config.rf_frequency_hz)
            && (rf.step == 0 || config.rf_frequency_hz % rf.step == 0);
        let n = &self.num_of_samples;
        let th = &self.internal_detector_threshold;
        in_rf
            && (n.min..=n.max).contains(&config.num_of_samples)
            && (th.min..=th.max).contains(&config.internal_detector_threshold)
    }
}

/// `ifx_Radar_Sensor_Shield_Info_t`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShieldInfo {
    pub shield_type: u16,
}

impl_record!(ShieldInfo {
    shield_type => "type",
});

impl ShieldInfo {
    pub fn kind(&self) -> ShieldType {
        ShieldType::from_raw(self.shield_type)
    }
}

/// Firmware details, copied out of device-owned memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FirmwareInfo {
    pub description: ByteString,
    pub version_major: u16,
    pub version_minor: u16,
    pub version_build: u16,
    pub extended_version: ByteString,
}

impl_record!(FirmwareInfo {
    description => "description",
    version_major => "version_major",
    version_minor => "version_minor",
    version_build => "version_build",
    extended_version => "extended_version",
});

impl FirmwareInfo {
    /// # Safety
    /// The string pointers in `raw` must be NULL or valid NUL-terminated strings.
    pub(crate) unsafe fn from_raw(raw: &RawFirmwareInfo) -> Self {
        use crate::sys::c_str_bytes;
        Self {
            description: ByteString(c_str_bytes(raw.description).unwrap_or_default()),
            version_major: raw.version_major,
            version_minor: raw.version_minor,
            version_build: raw.version_build,
            extended_version: ByteString(c_str_bytes(raw.extended_version).unwrap_or_default()),
        }
    }

    pub fn version(&self) -> String {
        format!("{}.{}.{}", self.version_major, self.version_minor, self.version_build)
    }
}

/// Sensor capabilities, copied out of device-owned memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorInfo {
    pub description: ByteString,
    pub min_rf_frequency_hz: u64,
    pub max_rf_frequency_hz: u64,
    pub num_tx_antennas: u8,
    pub num_rx_antennas: u8,
    pub max_tx_power: u8,
    pub num_temp_sensors: u8,
    pub interleaved_rx: u8,
    pub device_id: u64,
}

impl_record!(SensorInfo {
    description => "description",
    min_rf_frequency_hz => "min_rf_frequency_Hz",
    max_rf_frequency_hz => "max_rf_frequency_Hz",
    num_tx_antennas => "num_tx_antennas",
    num_rx_antennas => "num_rx_antennas",
    max_tx_power => "max_tx_power",
    num_temp_sensors => "num_temp_sensors",
    interleaved_rx => "interleaved_rx",
    device_id => "device_id",
});

impl SensorInfo {
    /// # Safety
    /// `raw.description` must be NULL or a valid NUL-terminated string.
    pub(crate) unsafe fn from_raw(raw: &RawSensorInfo) -> Self {
        Self {
            description: ByteString(crate::sys::c_str_bytes(raw.description).unwrap_or_default()),
            min_rf_frequency_hz: raw.min_rf_frequency_hz,
            max_rf_frequency_hz: raw.max_rf_frequency_hz,
            num_tx_antennas: raw.num_tx_antennas,
            num_rx_antennas: raw.num_rx_antennas,
            max_tx_power: raw.max_tx_power,
            num_temp_sensors: raw.num_temp_sensors,
            interleaved_rx: raw.interleaved_rx,
            device_id: raw.device_id,
        }
    }
}

/// One entry of a device enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceInfo {
    pub sensor: RadarSensor,
    pub board_type: i32,
    /// 32 lowercase hex characters.
    pub uuid: String,
}

impl DeviceInfo {
    pub(crate) fn from_entry(entry: &DeviceListEntry) -> Self {
        Self {
            sensor: RadarSensor::from_raw(entry.sensor_type),
            board_type: entry.board_type,
            uuid: hex::encode(entry.uuid),
        }
    }
}
