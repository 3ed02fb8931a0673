//! Discovering connected radar boards.

use crate::error::RadarError;
use crate::loader::{library, RadarLibrary};
use crate::owned::NativeList;
use crate::sys::DeviceListEntry;
use crate::types::{DeviceInfo, RadarSensor};
use crate::Result;
use std::ffi::c_void;

/// All connected Avian boards, optionally restricted to one sensor type.
pub fn list(filter: Option<RadarSensor>) -> Result<Vec<DeviceInfo>> {
    list_with(&*library()?, filter)
}

/// Uuids of the connected Avian boards, in enumeration order.
pub fn list_uuids(filter: Option<RadarSensor>) -> Result<Vec<String>> {
    Ok(list(filter)?.into_iter().map(|d| d.uuid).collect())
}

/// All connected LTR11 boards.
pub fn list_ltr11() -> Result<Vec<DeviceInfo>> {
    list_ltr11_with(&*library()?)
}

pub(crate) fn list_with(lib: &RadarLibrary, filter: Option<RadarSensor>) -> Result<Vec<DeviceInfo>> {
    let raw = unsafe {
        match filter {
            None => (lib.api().ifx_avian_get_list)(),
            Some(sensor) => (lib.api().ifx_avian_get_list_by_sensor_type)(sensor.raw()),
        }
    };
    let devices = decode_list(lib, raw, "ifx_avian_get_list")?;
    log::debug!("Found {} Avian device(s)", devices.len());
    Ok(devices)
}

pub(crate) fn list_ltr11_with(lib: &RadarLibrary) -> Result<Vec<DeviceInfo>> {
    let raw = unsafe { (lib.api().ifx_ltr11_get_list)() };
    let devices = decode_list(lib, raw, "ifx_ltr11_get_list")?;
    log::debug!("Found {} LTR11 device(s)", devices.len());
    Ok(devices)
}

fn decode_list(lib: &RadarLibrary, raw: *mut c_void, function: &'static str) -> Result<Vec<DeviceInfo>> {
    // Guard first so the list is released on every path below.
    let list = unsafe { NativeList::from_raw(raw, lib.api()) };
    lib.check_error()?;
    let list = list.ok_or(RadarError::NullReturn { function })?;
    let entries = unsafe { list.copy_items::<DeviceListEntry>() }
        .ok_or(RadarError::NullReturn { function: "ifx_list_get" })?;
    Ok(entries.iter().map(DeviceInfo::from_entry).collect())
}

/// Canonical form of a user-supplied uuid: 32 lowercase hex digits.
///
/// Dashes are accepted and dropped (`0123abcd-...` style).
pub fn normalize_uuid(uuid: &str) -> Result<String> {
    let compact: String = uuid.trim().chars().filter(|c| *c != '-').collect();
    if compact.len() != 32 || hex::decode(&compact).is_err() {
        return Err(RadarError::InvalidUuid(uuid.to_string()));
    }
    Ok(compact.to_ascii_lowercase())
}
