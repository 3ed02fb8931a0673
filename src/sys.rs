//! Raw C layouts shared byte-for-byte with the radar SDK.
//!
//! Everything in here mirrors a struct from the SDK headers. Field order,
//! widths and padding must not change; the layout tests at the bottom pin
//! the offsets the native side expects (LP64 / LLP64, little-endian).

use std::ffi::{c_char, c_int, CStr};

/// Interleaved complex sample as stored natively (`ifx_Complex_t`): `[re, im]`.
pub type RawComplex = [f32; 2];

bitflags::bitflags! {
    /// Flag byte trailing matrix and cube descriptors (`uint8_t owns_d:1`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[repr(transparent)]
    pub struct BufferFlags: u8 {
        /// Memory was allocated by the SDK and is freed by the matching destroy call.
        const OWNS_DATA = 1 << 0;
    }
}

/// `uint32_t stride:31; uint32_t owns_d:1;` as packed by the native compilers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct PackedStride(u32);

impl PackedStride {
    pub const MAX_STRIDE: u32 = (1 << 31) - 1;
    const OWNS_BIT: u32 = 1 << 31;

    /// Pack a stride and ownership flag. `None` if the stride needs more than 31 bits.
    pub fn new(stride: u32, owns_data: bool) -> Option<Self> {
        if stride > Self::MAX_STRIDE {
            return None;
        }
        Some(Self(stride | if owns_data { Self::OWNS_BIT } else { 0 }))
    }

    pub fn stride(self) -> u32 {
        self.0 & Self::MAX_STRIDE
    }

    pub fn owns_data(self) -> bool {
        self.0 & Self::OWNS_BIT != 0
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }
}

/// `ifx_Vector_R_t`
#[repr(C)]
#[derive(Debug)]
pub struct VectorR {
    pub d: *mut f32,
    pub len: u32,
    pub packed: PackedStride,
}

/// `ifx_Vector_C_t`
#[repr(C)]
#[derive(Debug)]
pub struct VectorC {
    pub d: *mut RawComplex,
    pub len: u32,
    pub packed: PackedStride,
}

/// `ifx_Matrix_R_t`. `stride[0]` steps columns, `stride[1]` steps rows.
#[repr(C)]
#[derive(Debug)]
pub struct MatrixR {
    pub d: *mut f32,
    pub rows: u32,
    pub cols: u32,
    pub stride: [u32; 2],
    pub flags: BufferFlags,
}

/// `ifx_Matrix_C_t`
#[repr(C)]
#[derive(Debug)]
pub struct MatrixC {
    pub d: *mut RawComplex,
    pub rows: u32,
    pub cols: u32,
    pub stride: [u32; 2],
    pub flags: BufferFlags,
}

/// `ifx_Cube_R_t`. `stride[0]` steps slices, `stride[1]` columns, `stride[2]` rows.
#[repr(C)]
#[derive(Debug)]
pub struct CubeR {
    pub d: *mut f32,
    pub rows: u32,
    pub cols: u32,
    pub slices: u32,
    pub stride: [u32; 3],
    pub flags: BufferFlags,
}

/// `ifx_Cube_C_t`
#[repr(C)]
#[derive(Debug)]
pub struct CubeC {
    pub d: *mut RawComplex,
    pub rows: u32,
    pub cols: u32,
    pub slices: u32,
    pub stride: [u32; 3],
    pub flags: BufferFlags,
}

/// `ifx_Radar_Sensor_List_Entry_t`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DeviceListEntry {
    pub sensor_type: c_int,
    pub board_type: c_int,
    pub uuid: [u8; 16],
}

/// `ifx_Firmware_Info_t`. Strings are owned by the device.
#[repr(C)]
#[derive(Debug)]
pub struct RawFirmwareInfo {
    pub description: *const c_char,
    pub version_major: u16,
    pub version_minor: u16,
    pub version_build: u16,
    pub extended_version: *const c_char,
}

/// `ifx_Radar_Sensor_Info_t`. Strings are owned by the device.
#[repr(C)]
#[derive(Debug)]
pub struct RawSensorInfo {
    pub description: *const c_char,
    pub min_rf_frequency_hz: u64,
    pub max_rf_frequency_hz: u64,
    pub num_tx_antennas: u8,
    pub num_rx_antennas: u8,
    pub max_tx_power: u8,
    pub num_temp_sensors: u8,
    pub interleaved_rx: u8,
    pub device_id: u64,
}

/// Copy the bytes of a NUL-terminated native string. `None` for NULL.
///
/// # Safety
/// `ptr` must be NULL or point to a NUL-terminated string that stays valid
/// for the duration of the call.
pub unsafe fn c_str_bytes(ptr: *const c_char) -> Option<Vec<u8>> {
    if ptr.is_null() {
        return None;
    }
    Some(CStr::from_ptr(ptr).to_bytes().to_vec())
}

/// Like [`c_str_bytes`] but decoded lossily as text.
///
/// # Safety
/// Same contract as [`c_str_bytes`].
pub unsafe fn c_str_to_string(ptr: *const c_char) -> Option<String> {
    c_str_bytes(ptr).map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}
