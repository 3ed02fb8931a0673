//! In-process stand-in for the radar SDK.
//!
//! Every entry point of [`RadarApi`] is backed by an `extern "C"` function
//! here. Call logs, queued failures and the error slot live in thread-local
//! state, the same way the real SDK keeps its error slot per thread. Device
//! state lives behind the opaque handle so it survives a move to another
//! thread.

use crate::error::ErrorCode;
use crate::loader::{RadarApi, RadarLibrary};
use crate::sys::{
    BufferFlags, CubeC, CubeR, DeviceListEntry, MatrixC, MatrixR, PackedStride, RawComplex, RawFirmwareInfo,
    RawSensorInfo, VectorC, VectorR,
};
use crate::types::{
    DeviceConfig, DeviceMetrics, Ltr11Config, Ltr11ConfigLimits, Ltr11Metadata, RadarSensor, RangeLimits,
    ShieldInfo, StepLimits, LTR11_APRT_DISABLED, LTR11_MODE_SPI_PULSE, LTR11_PRT_500US,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::ptr;
use std::sync::Arc;

pub const VERSION: &str = "3.3.1";
pub const BOARD_UUID: &str = "00112233445566778899aabbccddeeff";

#[derive(Default)]
pub struct FakeState {
    pub error: i32,
    pub calls: Vec<&'static str>,
    pub devices: Vec<DeviceListEntry>,
    pub open_error: Option<i32>,
    pub list_error: Option<i32>,
    pub frame_error: Option<i32>,
    pub destroy_error: Option<i32>,
    pub start_error: Option<i32>,
    pub last_timeout_ms: Option<u16>,
    pub last_uuid: Option<String>,
    pub dumped_path: Option<String>,
    /// `(mode, kind, index)` of the last recording opened.
    pub last_recording: Option<(c_int, c_int, i32)>,
}

thread_local! {
    static STATE: RefCell<FakeState> = RefCell::new(FakeState::default());
}

pub fn with<R>(f: impl FnOnce(&mut FakeState) -> R) -> R {
    STATE.with(|s| f(&mut s.borrow_mut()))
}

pub fn reset() {
    with(|s| *s = FakeState::default());
}

pub fn set_error(code: i32) {
    with(|s| s.error = code);
}

pub fn count(name: &str) -> usize {
    with(|s| s.calls.iter().filter(|c| **c == name).count())
}

/// The calls among `names`, in the order they were made.
pub fn calls_matching(names: &[&str]) -> Vec<&'static str> {
    with(|s| s.calls.iter().copied().filter(|c| names.contains(c)).collect())
}

pub fn last_uuid() -> Option<String> {
    with(|s| s.last_uuid.clone())
}

pub fn add_device(sensor: RadarSensor, uuid: [u8; 16]) {
    with(|s| {
        s.devices.push(DeviceListEntry {
            sensor_type: sensor.raw(),
            board_type: 0,
            uuid,
        })
    });
}

fn record(name: &'static str) {
    with(|s| s.calls.push(name));
}

fn raise(code: Option<i32>) {
    if let Some(code) = code {
        set_error(code);
    }
}

// Buffers

fn alloc<T>(items: Vec<T>) -> *mut T {
    Box::into_raw(items.into_boxed_slice()).cast()
}

/// # Safety
/// `data` must be NULL or come from [`alloc`] with exactly `len` items.
unsafe fn free<T>(data: *mut T, len: usize) {
    if !data.is_null() {
        drop(Box::from_raw(ptr::slice_from_raw_parts_mut(data, len)));
    }
}

/// Release sample memory detached from a buffer made by [`native_cube`].
///
/// # Safety
/// `data` must be the data pointer of such a cube and `len` its element count.
pub unsafe fn free_samples(data: *mut f32, len: usize) {
    free(data, len);
}

/// An SDK-owned real cube filled from `f(row, col, slice)`.
pub fn native_cube(rows: usize, cols: usize, slices: usize, f: impl Fn(usize, usize, usize) -> f32) -> *mut CubeR {
    let mut data = Vec::with_capacity(rows * cols * slices);
    for r in 0..rows {
        for c in 0..cols {
            for s in 0..slices {
                data.push(f(r, c, s));
            }
        }
    }
    Box::into_raw(Box::new(CubeR {
        d: alloc(data),
        rows: rows as u32,
        cols: cols as u32,
        slices: slices as u32,
        stride: [1, slices as u32, (cols * slices) as u32],
        flags: BufferFlags::OWNS_DATA,
    }))
}

fn native_vector_c(len: usize, f: impl Fn(usize) -> RawComplex) -> *mut VectorC {
    Box::into_raw(Box::new(VectorC {
        d: alloc((0..len).map(f).collect()),
        len: len as u32,
        packed: PackedStride::new(1, true).unwrap_or_default(),
    }))
}

unsafe extern "C" fn vec_destroy_r(v: *mut VectorR) {
    record("ifx_vec_destroy_r");
    let v = Box::from_raw(v);
    if v.packed.owns_data() {
        free(v.d, v.len as usize);
    }
}

unsafe extern "C" fn vec_destroy_c(v: *mut VectorC) {
    record("ifx_vec_destroy_c");
    let v = Box::from_raw(v);
    if v.packed.owns_data() {
        free(v.d, v.len as usize);
    }
}

unsafe extern "C" fn mat_destroy_r(m: *mut MatrixR) {
    record("ifx_mat_destroy_r");
    let m = Box::from_raw(m);
    if m.flags.contains(BufferFlags::OWNS_DATA) {
        free(m.d, (m.rows * m.cols) as usize);
    }
}

unsafe extern "C" fn mat_destroy_c(m: *mut MatrixC) {
    record("ifx_mat_destroy_c");
    let m = Box::from_raw(m);
    if m.flags.contains(BufferFlags::OWNS_DATA) {
        free(m.d, (m.rows * m.cols) as usize);
    }
}

unsafe extern "C" fn cube_destroy_r(c: *mut CubeR) {
    record("ifx_cube_destroy_r");
    let c = Box::from_raw(c);
    if c.flags.contains(BufferFlags::OWNS_DATA) {
        free(c.d, (c.rows * c.cols * c.slices) as usize);
    }
}

unsafe extern "C" fn cube_destroy_c(c: *mut CubeC) {
    record("ifx_cube_destroy_c");
    let c = Box::from_raw(c);
    if c.flags.contains(BufferFlags::OWNS_DATA) {
        free(c.d, (c.rows * c.cols * c.slices) as usize);
    }
}

// Lists and strings

enum FakeList {
    Entries(Vec<DeviceListEntry>),
    Values(Vec<u32>),
}

fn into_list(list: FakeList) -> *mut c_void {
    Box::into_raw(Box::new(list)).cast()
}

pub fn value_list(values: &[u32]) -> *mut c_void {
    into_list(FakeList::Values(values.to_vec()))
}

pub fn native_string(text: &str) -> *mut c_char {
    CString::new(text).unwrap().into_raw()
}

unsafe extern "C" fn list_destroy(list: *mut c_void) {
    record("ifx_list_destroy");
    drop(Box::from_raw(list.cast::<FakeList>()));
}

unsafe extern "C" fn list_size(list: *const c_void) -> usize {
    match &*list.cast::<FakeList>() {
        FakeList::Entries(e) => e.len(),
        FakeList::Values(v) => v.len(),
    }
}

unsafe extern "C" fn list_get(list: *const c_void, index: usize) -> *mut c_void {
    let item: *const c_void = match &*list.cast::<FakeList>() {
        FakeList::Entries(e) => e.get(index).map_or(ptr::null(), |x| (x as *const DeviceListEntry).cast()),
        FakeList::Values(v) => v.get(index).map_or(ptr::null(), |x| (x as *const u32).cast()),
    };
    item.cast_mut()
}

unsafe extern "C" fn mem_free(p: *mut c_void) {
    record("ifx_mem_free");
    drop(CString::from_raw(p.cast()));
}

fn device_list(name: &'static str, keep: impl Fn(RadarSensor) -> bool) -> *mut c_void {
    record(name);
    let (entries, failure) = with(|s| {
        let entries: Vec<DeviceListEntry> = s
            .devices
            .iter()
            .copied()
            .filter(|e| keep(RadarSensor::from_raw(e.sensor_type)))
            .collect();
        (entries, s.list_error)
    });
    raise(failure);
    into_list(FakeList::Entries(entries))
}

// Library-wide

unsafe extern "C" fn version_string() -> *const c_char {
    c"3.3.1".as_ptr()
}

unsafe extern "C" fn version_string_full() -> *const c_char {
    c"3.3.1+sha.0a1b2c3d".as_ptr()
}

unsafe extern "C" fn error_to_string(code: c_int) -> *const c_char {
    let text = match ErrorCode::from_raw(code) {
        ErrorCode::Ok => c"no error",
        ErrorCode::Timeout => c"timeout occurred",
        ErrorCode::FifoOverflow => c"FIFO overflow",
        ErrorCode::NoDevice => c"no compatible device found",
        ErrorCode::DeviceBusy => c"device is busy",
        ErrorCode::CommunicationError => c"communication error",
        ErrorCode::ArgumentInvalid => c"argument invalid",
        ErrorCode::NumSamplesOutOfRange => c"number of samples out of range",
        ErrorCode::OpeningFile => c"cannot open file",
        ErrorCode::Eeprom => c"EEPROM error",
        _ => c"unknown error",
    };
    text.as_ptr()
}

unsafe extern "C" fn error_get_and_clear() -> c_int {
    with(|s| std::mem::take(&mut s.error))
}

// Devices

struct FakeDevice {
    config: DeviceConfig,
    ltr11: Ltr11Config,
    frames: u32,
    started: bool,
    /// Failures for the next frame reads, checked before `FakeState::frame_error`.
    frame_errors: VecDeque<i32>,
    uuid: CString,
    firmware: RawFirmwareInfo,
    avian_sensor: RawSensorInfo,
    ltr11_sensor: RawSensorInfo,
}

impl FakeDevice {
    fn new() -> Self {
        Self {
            config: avian_defaults(),
            ltr11: ltr11_defaults(),
            frames: 0,
            started: false,
            frame_errors: VecDeque::new(),
            uuid: CString::new(BOARD_UUID).unwrap(),
            firmware: RawFirmwareInfo {
                description: c"Radar Baseboard MCU7".as_ptr(),
                version_major: 2,
                version_minor: 5,
                version_build: 1,
                extended_version: c"2.5.1-fake".as_ptr(),
            },
            avian_sensor: RawSensorInfo {
                description: c"BGT60TR13C".as_ptr(),
                min_rf_frequency_hz: 58_000_000_000,
                max_rf_frequency_hz: 63_500_000_000,
                num_tx_antennas: 1,
                num_rx_antennas: 3,
                max_tx_power: 31,
                num_temp_sensors: 1,
                interleaved_rx: 0,
                device_id: 0x1234,
            },
            ltr11_sensor: RawSensorInfo {
                description: c"BGT60LTR11AIP".as_ptr(),
                min_rf_frequency_hz: 61_044_000_000,
                max_rf_frequency_hz: 61_452_000_000,
                num_tx_antennas: 1,
                num_rx_antennas: 1,
                max_tx_power: 7,
                num_temp_sensors: 0,
                interleaved_rx: 0,
                device_id: 0x5678,
            },
        }
    }
}

fn avian_defaults() -> DeviceConfig {
    DeviceConfig {
        sample_rate_hz: 1_000_000,
        rx_mask: 0b11,
        tx_mask: 1,
        tx_power_level: 31,
        if_gain_db: 33,
        start_frequency_hz: 60_000_000_000,
        end_frequency_hz: 61_500_000_000,
        num_samples_per_chirp: 4,
        num_chirps_per_frame: 3,
        chirp_repetition_time_s: 0.000_5,
        frame_repetition_time_s: 0.1,
        hp_cutoff_hz: 80_000,
        aaf_cutoff_hz: 500_000,
        mimo_mode: 0,
    }
}

fn ltr11_defaults() -> Ltr11Config {
    Ltr11Config {
        mode: LTR11_MODE_SPI_PULSE,
        rf_frequency_hz: 61_044_000_000,
        num_of_samples: 256,
        internal_detector_threshold: 80,
        prt: LTR11_PRT_500US,
        pulse_width: 0,
        tx_power_level: 7,
        rx_if_gain: 8,
        aprt_factor: LTR11_APRT_DISABLED,
        hold_time: 0,
        disable_internal_detector: false,
    }
}

const LTR11_LIMITS: Ltr11ConfigLimits = Ltr11ConfigLimits {
    rf_frequency_hz: StepLimits {
        min: 61_044_000_000,
        max: 61_452_000_000,
        step: 1_000_000,
    },
    num_of_samples: RangeLimits { min: 16, max: 1024 },
    internal_detector_threshold: RangeLimits { min: 20, max: 2560 },
};

/// # Safety
/// `h` must come from [`open_device`] and not be destroyed yet.
unsafe fn device<'a>(h: *mut c_void) -> &'a mut FakeDevice {
    &mut *h.cast::<FakeDevice>()
}

/// Make the next frame reads on device `h` fail with `codes`, in order.
/// Unlike `FakeState::frame_error` this follows the device across threads.
///
/// # Safety
/// `h` must be a live handle created by this fake.
pub unsafe fn queue_frame_errors(h: *mut c_void, codes: &[i32]) {
    device(h).frame_errors.extend(codes);
}

fn open_device(name: &'static str) -> *mut c_void {
    record(name);
    if let Some(code) = with(|s| s.open_error) {
        set_error(code);
        return ptr::null_mut();
    }
    Box::into_raw(Box::new(FakeDevice::new())).cast()
}

unsafe fn open_device_by_uuid(name: &'static str, uuid: *const c_char) -> *mut c_void {
    let uuid = CStr::from_ptr(uuid).to_string_lossy().into_owned();
    with(|s| s.last_uuid = Some(uuid));
    open_device(name)
}

unsafe fn destroy_device(name: &'static str, h: *mut c_void) {
    record(name);
    drop(Box::from_raw(h.cast::<FakeDevice>()));
    raise(with(|s| s.destroy_error));
}

fn start(name: &'static str) -> bool {
    record(name);
    match with(|s| s.start_error) {
        Some(code) => {
            set_error(code);
            false
        }
        None => true,
    }
}

// Avian

unsafe extern "C" fn avian_create() -> *mut c_void {
    open_device("ifx_avian_create")
}

unsafe extern "C" fn avian_create_by_port(_port: *const c_char) -> *mut c_void {
    open_device("ifx_avian_create_by_port")
}

unsafe extern "C" fn avian_create_by_uuid(uuid: *const c_char) -> *mut c_void {
    open_device_by_uuid("ifx_avian_create_by_uuid", uuid)
}

unsafe extern "C" fn avian_create_dummy(_recording: *mut c_void, _correct_timing: bool) -> *mut c_void {
    open_device("ifx_avian_create_dummy_from_recording")
}

unsafe extern "C" fn avian_destroy(h: *mut c_void) {
    destroy_device("ifx_avian_destroy", h);
}

unsafe extern "C" fn avian_get_list() -> *mut c_void {
    device_list("ifx_avian_get_list", RadarSensor::is_avian)
}

unsafe extern "C" fn avian_get_list_by_sensor_type(sensor: c_int) -> *mut c_void {
    device_list("ifx_avian_get_list_by_sensor_type", |s| s.raw() == sensor)
}

unsafe extern "C" fn avian_get_board_uuid(h: *mut c_void) -> *const c_char {
    device(h).uuid.as_ptr()
}

unsafe extern "C" fn avian_get_register_list_string(_h: *mut c_void, trigger: bool) -> *mut c_char {
    if trigger {
        native_string("reg 0x00 0x1e8271 trigger")
    } else {
        native_string("reg 0x00 0x1e8270")
    }
}

unsafe extern "C" fn avian_set_config(h: *mut c_void, config: *const DeviceConfig) {
    if (*config).num_samples_per_chirp == 0 {
        set_error(ErrorCode::NumSamplesOutOfRange.raw());
        return;
    }
    device(h).config = *config;
}

unsafe extern "C" fn avian_get_config(h: *mut c_void, config: *mut DeviceConfig) {
    *config = device(h).config;
}

unsafe extern "C" fn avian_get_config_defaults(_h: *mut c_void, config: *mut DeviceConfig) {
    *config = avian_defaults();
}

unsafe extern "C" fn avian_metrics_get_defaults(_h: *mut c_void, metrics: *mut DeviceMetrics) {
    *metrics = DeviceMetrics {
        sample_rate_hz: 1_000_000,
        rx_mask: 0b11,
        tx_mask: 1,
        tx_power_level: 31,
        if_gain_db: 33,
        range_resolution_m: 0.15,
        max_range_m: 4.5,
        max_speed_m_s: 2.45,
        speed_resolution_m_s: 0.08,
        frame_repetition_time_s: 0.1,
        center_frequency_hz: 60_750_000_000.0,
    };
}

unsafe extern "C" fn avian_metrics_to_config(
    _h: *mut c_void,
    metrics: *const DeviceMetrics,
    config: *mut DeviceConfig,
    round_to_power_of_two: bool,
) {
    let m = &*metrics;
    let mut samples = (m.max_range_m / m.range_resolution_m).ceil() as u32;
    if round_to_power_of_two {
        samples = samples.next_power_of_two();
    }
    *config = DeviceConfig {
        sample_rate_hz: m.sample_rate_hz,
        rx_mask: m.rx_mask,
        tx_mask: m.tx_mask,
        tx_power_level: m.tx_power_level,
        if_gain_db: m.if_gain_db,
        num_samples_per_chirp: samples,
        frame_repetition_time_s: m.frame_repetition_time_s,
        ..avian_defaults()
    };
}

unsafe extern "C" fn avian_metrics_from_config(_h: *mut c_void, config: *const DeviceConfig, metrics: *mut DeviceMetrics) {
    let c = &*config;
    *metrics = DeviceMetrics {
        sample_rate_hz: c.sample_rate_hz,
        rx_mask: c.rx_mask,
        tx_mask: c.tx_mask,
        tx_power_level: c.tx_power_level,
        if_gain_db: c.if_gain_db,
        frame_repetition_time_s: c.frame_repetition_time_s,
        ..DeviceMetrics::default()
    };
}

unsafe extern "C" fn avian_start_acquisition(_h: *mut c_void) -> bool {
    start("ifx_avian_start_acquisition")
}

unsafe extern "C" fn avian_stop_acquisition(_h: *mut c_void) -> bool {
    record("ifx_avian_stop_acquisition");
    true
}

/// Frame `k` holds `k * 1000 + r * 100 + c * 10 + s` at `[r, c, s]`.
unsafe fn avian_frame(h: *mut c_void) -> *mut CubeR {
    let dev = device(h);
    let (rx, chirps, samples) = dev.config.frame_shape();
    let k = dev.frames as f32;
    dev.frames += 1;
    let cube = native_cube(rx, chirps, samples, |r, c, s| k * 1000.0 + (r * 100 + c * 10 + s) as f32);
    raise(with(|s| s.frame_error));
    cube
}

unsafe extern "C" fn avian_get_next_frame(h: *mut c_void, _frame: *mut CubeR) -> *mut CubeR {
    record("ifx_avian_get_next_frame");
    avian_frame(h)
}

unsafe extern "C" fn avian_get_next_frame_timeout(h: *mut c_void, _frame: *mut CubeR, timeout_ms: u16) -> *mut CubeR {
    record("ifx_avian_get_next_frame_timeout");
    with(|s| s.last_timeout_ms = Some(timeout_ms));
    avian_frame(h)
}

unsafe extern "C" fn avian_get_temperature(_h: *mut c_void, celsius: *mut f32) {
    *celsius = 42.5;
}

unsafe extern "C" fn avian_get_firmware_information(h: *mut c_void) -> *const RawFirmwareInfo {
    &device(h).firmware
}

unsafe extern "C" fn avian_get_shield_information(_h: *mut c_void, info: *mut ShieldInfo) {
    *info = ShieldInfo { shield_type: 0x0200 };
}

unsafe extern "C" fn avian_get_sensor_information(h: *mut c_void) -> *const RawSensorInfo {
    &device(h).avian_sensor
}

unsafe extern "C" fn avian_get_hp_cutoff_list(_h: *mut c_void) -> *mut c_void {
    value_list(&[20_000, 45_000, 70_000, 80_000])
}

unsafe extern "C" fn avian_get_aaf_cutoff_list(_h: *mut c_void) -> *mut c_void {
    value_list(&[500_000, 1_000_000])
}

// Recordings

unsafe extern "C" fn recording_create(path: *const c_char, mode: c_int, kind: c_int, index: i32) -> *mut c_void {
    record("ifx_recording_create");
    with(|s| s.last_recording = Some((mode, kind, index)));
    if CStr::from_ptr(path).to_bytes().is_empty() {
        set_error(ErrorCode::OpeningFile.raw());
        return ptr::null_mut();
    }
    Box::into_raw(Box::new(index)).cast()
}

unsafe extern "C" fn recording_destroy(rec: *mut c_void) {
    record("ifx_recording_destroy");
    drop(Box::from_raw(rec.cast::<i32>()));
}

// LTR11

unsafe extern "C" fn ltr11_create() -> *mut c_void {
    open_device("ifx_ltr11_create")
}

unsafe extern "C" fn ltr11_create_by_uuid(uuid: *const c_char) -> *mut c_void {
    open_device_by_uuid("ifx_ltr11_create_by_uuid", uuid)
}

unsafe extern "C" fn ltr11_destroy(h: *mut c_void) {
    destroy_device("ifx_ltr11_destroy", h);
}

unsafe extern "C" fn ltr11_get_list() -> *mut c_void {
    device_list("ifx_ltr11_get_list", |s| s == RadarSensor::Bgt60Ltr11Aip)
}

unsafe extern "C" fn ltr11_get_config_defaults(_h: *mut c_void, config: *mut Ltr11Config) {
    *config = ltr11_defaults();
}

unsafe extern "C" fn ltr11_get_config(h: *mut c_void, config: *mut Ltr11Config) {
    *config = device(h).ltr11;
}

unsafe extern "C" fn ltr11_set_config(h: *mut c_void, config: *const Ltr11Config) {
    if !LTR11_LIMITS.contains(&*config) {
        set_error(ErrorCode::NumSamplesOutOfRange.raw());
        return;
    }
    device(h).ltr11 = *config;
}

unsafe extern "C" fn ltr11_start_acquisition(h: *mut c_void) -> bool {
    let started = start("ifx_ltr11_start_acquisition");
    if started {
        device(h).started = true;
    }
    started
}

unsafe extern "C" fn ltr11_stop_acquisition(h: *mut c_void) -> bool {
    record("ifx_ltr11_stop_acquisition");
    device(h).started = false;
    true
}

/// Sample `i` of frame `k` is `(k * 1000 + i, -i)`.
///
/// Mirrors the firmware: a caller frame must have exactly the configured
/// length, a read while stopped fails, and a failed read stops acquisition.
/// Failing reads return NULL and free anything they allocated.
unsafe fn ltr11_frame(h: *mut c_void, frame: *mut VectorC, metadata: *mut Ltr11Metadata) -> *mut VectorC {
    let dev = device(h);
    if !dev.started {
        set_error(ErrorCode::Error.raw());
        return ptr::null_mut();
    }
    let n = dev.ltr11.num_of_samples as usize;
    if !frame.is_null() && (*frame).len as usize != n {
        set_error(ErrorCode::DimensionMismatch.raw());
        return ptr::null_mut();
    }
    if let Some(code) = dev.frame_errors.pop_front().or_else(|| with(|s| s.frame_error)) {
        dev.started = false;
        set_error(code);
        return ptr::null_mut();
    }

    let k = dev.frames as f32;
    dev.frames += 1;
    let sample = |i: usize| [k * 1000.0 + i as f32, -(i as f32)];
    let out = if frame.is_null() {
        native_vector_c(n, sample)
    } else {
        let stride = (*frame).packed.stride() as usize;
        for i in 0..n {
            *(*frame).d.add(i * stride) = sample(i);
        }
        frame
    };
    if !metadata.is_null() {
        *metadata = Ltr11Metadata {
            avg_power: 0.5,
            active: true,
            motion: true,
            direction: false,
        };
    }
    out
}

unsafe extern "C" fn ltr11_get_next_frame(h: *mut c_void, frame: *mut VectorC, metadata: *mut Ltr11Metadata) -> *mut VectorC {
    record("ifx_ltr11_get_next_frame");
    ltr11_frame(h, frame, metadata)
}

unsafe extern "C" fn ltr11_get_next_frame_timeout(
    h: *mut c_void,
    frame: *mut VectorC,
    metadata: *mut Ltr11Metadata,
    timeout_ms: u16,
) -> *mut VectorC {
    record("ifx_ltr11_get_next_frame_timeout");
    with(|s| s.last_timeout_ms = Some(timeout_ms));
    ltr11_frame(h, frame, metadata)
}

unsafe extern "C" fn ltr11_get_sensor_information(h: *mut c_void) -> *const RawSensorInfo {
    &device(h).ltr11_sensor
}

unsafe extern "C" fn ltr11_get_firmware_information(h: *mut c_void) -> *const RawFirmwareInfo {
    &device(h).firmware
}

unsafe extern "C" fn ltr11_get_active_mode_power(_h: *mut c_void, config: *const Ltr11Config) -> f32 {
    1.5 + 0.25 * (*config).tx_power_level as f32
}

unsafe extern "C" fn ltr11_get_sampling_frequency(_h: *mut c_void, prt: c_int) -> u32 {
    match prt {
        0 => 4000,
        1 => 2000,
        2 => 1000,
        3 => 500,
        _ => {
            set_error(ErrorCode::ArgumentInvalid.raw());
            0
        }
    }
}

unsafe extern "C" fn ltr11_check_config(_h: *mut c_void, config: *const Ltr11Config) -> bool {
    LTR11_LIMITS.contains(&*config)
}

unsafe extern "C" fn ltr11_register_dump_to_file(_h: *mut c_void, path: *const c_char) {
    let path = CStr::from_ptr(path).to_string_lossy().into_owned();
    with(|s| s.dumped_path = Some(path));
}

unsafe extern "C" fn ltr11_get_limits(_h: *mut c_void, limits: *mut Ltr11ConfigLimits) {
    *limits = LTR11_LIMITS;
}

/// The fake prototype table.
pub fn api() -> RadarApi {
    RadarApi {
        ifx_sdk_get_version_string: version_string,
        ifx_sdk_get_version_string_full: version_string_full,
        ifx_error_to_string: error_to_string,
        ifx_error_get_and_clear: error_get_and_clear,
        ifx_list_destroy: list_destroy,
        ifx_list_size: list_size,
        ifx_list_get: list_get,
        ifx_mem_free: mem_free,
        ifx_vec_destroy_r: vec_destroy_r,
        ifx_vec_destroy_c: vec_destroy_c,
        ifx_mat_destroy_r: mat_destroy_r,
        ifx_mat_destroy_c: mat_destroy_c,
        ifx_cube_destroy_r: cube_destroy_r,
        ifx_cube_destroy_c: cube_destroy_c,

        ifx_avian_create: avian_create,
        ifx_avian_create_by_port: avian_create_by_port,
        ifx_avian_create_by_uuid: avian_create_by_uuid,
        ifx_avian_create_dummy_from_recording: avian_create_dummy,
        ifx_avian_destroy: avian_destroy,
        ifx_avian_get_list: avian_get_list,
        ifx_avian_get_list_by_sensor_type: avian_get_list_by_sensor_type,
        ifx_avian_get_board_uuid: avian_get_board_uuid,
        ifx_avian_get_register_list_string: avian_get_register_list_string,
        ifx_avian_set_config: avian_set_config,
        ifx_avian_get_config: avian_get_config,
        ifx_avian_get_config_defaults: avian_get_config_defaults,
        ifx_avian_metrics_get_defaults: avian_metrics_get_defaults,
        ifx_avian_metrics_to_config: avian_metrics_to_config,
        ifx_avian_metrics_from_config: avian_metrics_from_config,
        ifx_avian_start_acquisition: avian_start_acquisition,
        ifx_avian_stop_acquisition: avian_stop_acquisition,
        ifx_avian_get_next_frame: avian_get_next_frame,
        ifx_avian_get_next_frame_timeout: avian_get_next_frame_timeout,
        ifx_avian_get_temperature: avian_get_temperature,
        ifx_avian_get_firmware_information: avian_get_firmware_information,
        ifx_avian_get_shield_information: avian_get_shield_information,
        ifx_avian_get_sensor_information: avian_get_sensor_information,
        ifx_avian_get_hp_cutoff_list: avian_get_hp_cutoff_list,
        ifx_avian_get_aaf_cutoff_list: avian_get_aaf_cutoff_list,

        ifx_recording_create: recording_create,
        ifx_recording_destroy: recording_destroy,

        ifx_ltr11_create: ltr11_create,
        ifx_ltr11_create_by_uuid: ltr11_create_by_uuid,
        ifx_ltr11_destroy: ltr11_destroy,
        ifx_ltr11_get_list: ltr11_get_list,
        ifx_ltr11_get_config_defaults: ltr11_get_config_defaults,
        ifx_ltr11_get_config: ltr11_get_config,
        ifx_ltr11_set_config: ltr11_set_config,
        ifx_ltr11_start_acquisition: ltr11_start_acquisition,
        ifx_ltr11_stop_acquisition: ltr11_stop_acquisition,
        ifx_ltr11_get_next_frame: ltr11_get_next_frame,
        ifx_ltr11_get_next_frame_timeout: ltr11_get_next_frame_timeout,
        ifx_ltr11_get_sensor_information: ltr11_get_sensor_information,
        ifx_ltr11_get_firmware_information: ltr11_get_firmware_information,
        ifx_ltr11_get_active_mode_power: ltr11_get_active_mode_power,
        ifx_ltr11_get_sampling_frequency: ltr11_get_sampling_frequency,
        ifx_ltr11_check_config: ltr11_check_config,
        ifx_ltr11_register_dump_to_file: ltr11_register_dump_to_file,
        ifx_ltr11_get_limits: ltr11_get_limits,
    }
}

/// A library handle over the fake table.
pub fn library() -> Arc<RadarLibrary> {
    Arc::new(RadarLibrary::from_api(api()))
}
