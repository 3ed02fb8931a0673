//! Locating, loading and binding the native radar SDK.
//!
//! The library is resolved once per process. [`library`] hands out a shared
//! [`RadarLibrary`] whose [`RadarApi`] holds every entry point the crate uses,
//! bound with its exact C prototype at load time.

use crate::error::RadarError;
use crate::sys::{c_str_to_string, CubeC, CubeR, MatrixC, MatrixR, RawFirmwareInfo, RawSensorInfo, VectorC, VectorR};
use crate::types::{DeviceConfig, DeviceMetrics, Ltr11Config, Ltr11ConfigLimits, Ltr11Metadata, ShieldInfo};
use crate::Result;
use libloading::Library;
use once_cell::sync::OnceCell;
use std::ffi::{c_char, c_int, c_void, OsString};
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use std::sync::Arc;

/// Environment variable holding extra directories to search first (path-list syntax).
pub const LIB_DIR_ENV: &str = "RADAR_SDK_LIB_DIR";

/// Base name of the SDK library, without platform prefix or extension.
pub const DEFAULT_LIBRARY_NAME: &str = "radar_sdk";

macro_rules! radar_api {
    ($( $name:ident : fn($($arg:ty),*) $(-> $ret:ty)?; )*) => {
        /// Entry points of the radar SDK, bound with their C prototypes.
        #[derive(Clone, Copy)]
        pub struct RadarApi {
            $( pub $name: unsafe extern "C" fn($($arg),*) $(-> $ret)?, )*
        }

        impl RadarApi {
            /// Every symbol that must be exported by the library.
            pub const SYMBOLS: &'static [&'static str] = &[$(stringify!($name)),*];

            /// # Safety
            /// The library must export each symbol with exactly the prototype listed here.
            unsafe fn bind(library: &Library) -> Result<Self> {
                Ok(Self {
                    $( $name: bind_symbol(library, stringify!($name))?, )*
                })
            }
        }
    };
}

radar_api! {
    // Library-wide
    ifx_sdk_get_version_string: fn() -> *const c_char;
    ifx_sdk_get_version_string_full: fn() -> *const c_char;
    ifx_error_to_string: fn(c_int) -> *const c_char;
    ifx_error_get_and_clear: fn() -> c_int;
    ifx_list_destroy: fn(*mut c_void);
    ifx_list_size: fn(*const c_void) -> usize;
    ifx_list_get: fn(*const c_void, usize) -> *mut c_void;
    ifx_mem_free: fn(*mut c_void);
    ifx_vec_destroy_r: fn(*mut VectorR);
    ifx_vec_destroy_c: fn(*mut VectorC);
    ifx_mat_destroy_r: fn(*mut MatrixR);
    ifx_mat_destroy_c: fn(*mut MatrixC);
    ifx_cube_destroy_r: fn(*mut CubeR);
    ifx_cube_destroy_c: fn(*mut CubeC);

    // Avian
    ifx_avian_create: fn() -> *mut c_void;
    ifx_avian_create_by_port: fn(*const c_char) -> *mut c_void;
    ifx_avian_create_by_uuid: fn(*const c_char) -> *mut c_void;
    ifx_avian_create_dummy_from_recording: fn(*mut c_void, bool) -> *mut c_void;
    ifx_avian_destroy: fn(*mut c_void);
    ifx_avian_get_list: fn() -> *mut c_void;
    ifx_avian_get_list_by_sensor_type: fn(c_int) -> *mut c_void;
    ifx_avian_get_board_uuid: fn(*mut c_void) -> *const c_char;
    ifx_avian_get_register_list_string: fn(*mut c_void, bool) -> *mut c_char;
    ifx_avian_set_config: fn(*mut c_void, *const DeviceConfig);
    ifx_avian_get_config: fn(*mut c_void, *mut DeviceConfig);
    ifx_avian_get_config_defaults: fn(*mut c_void, *mut DeviceConfig);
    ifx_avian_metrics_get_defaults: fn(*mut c_void, *mut DeviceMetrics);
    ifx_avian_metrics_to_config: fn(*mut c_void, *const DeviceMetrics, *mut DeviceConfig, bool);
    ifx_avian_metrics_from_config: fn(*mut c_void, *const DeviceConfig, *mut DeviceMetrics);
    ifx_avian_start_acquisition: fn(*mut c_void) -> bool;
    ifx_avian_stop_acquisition: fn(*mut c_void) -> bool;
    ifx_avian_get_next_frame: fn(*mut c_void, *mut CubeR) -> *mut CubeR;
    ifx_avian_get_next_frame_timeout: fn(*mut c_void, *mut CubeR, u16) -> *mut CubeR;
    ifx_avian_get_temperature: fn(*mut c_void, *mut f32);
    ifx_avian_get_firmware_information: fn(*mut c_void) -> *const RawFirmwareInfo;
    ifx_avian_get_shield_information: fn(*mut c_void, *mut ShieldInfo);
    ifx_avian_get_sensor_information: fn(*mut c_void) -> *const RawSensorInfo;
    ifx_avian_get_hp_cutoff_list: fn(*mut c_void) -> *mut c_void;
    ifx_avian_get_aaf_cutoff_list: fn(*mut c_void) -> *mut c_void;

    // Recordings
    ifx_recording_create: fn(*const c_char, c_int, c_int, i32) -> *mut c_void;
    ifx_recording_destroy: fn(*mut c_void);

    // LTR11
    ifx_ltr11_create: fn() -> *mut c_void;
    ifx_ltr11_create_by_uuid: fn(*const c_char) -> *mut c_void;
    ifx_ltr11_destroy: fn(*mut c_void);
    ifx_ltr11_get_list: fn() -> *mut c_void;
    ifx_ltr11_get_config_defaults: fn(*mut c_void, *mut Ltr11Config);
    ifx_ltr11_get_config: fn(*mut c_void, *mut Ltr11Config);
    ifx_ltr11_set_config: fn(*mut c_void, *const Ltr11Config);
    ifx_ltr11_start_acquisition: fn(*mut c_void) -> bool;
    ifx_ltr11_stop_acquisition: fn(*mut c_void) -> bool;
    ifx_ltr11_get_next_frame: fn(*mut c_void, *mut VectorC, *mut Ltr11Metadata) -> *mut VectorC;
    ifx_ltr11_get_next_frame_timeout: fn(*mut c_void, *mut VectorC, *mut Ltr11Metadata, u16) -> *mut VectorC;
    ifx_ltr11_get_sensor_information: fn(*mut c_void) -> *const RawSensorInfo;
    ifx_ltr11_get_firmware_information: fn(*mut c_void) -> *const RawFirmwareInfo;
    ifx_ltr11_get_active_mode_power: fn(*mut c_void, *const Ltr11Config) -> f32;
    ifx_ltr11_get_sampling_frequency: fn(*mut c_void, c_int) -> u32;
    ifx_ltr11_check_config: fn(*mut c_void, *const Ltr11Config) -> bool;
    ifx_ltr11_register_dump_to_file: fn(*mut c_void, *const c_char);
    ifx_ltr11_get_limits: fn(*mut c_void, *mut Ltr11ConfigLimits);
}

impl std::fmt::Debug for RadarApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadarApi")
            .field("symbols", &Self::SYMBOLS.len())
            .finish()
    }
}

unsafe fn bind_symbol<T: Copy>(library: &Library, name: &str) -> Result<T> {
    let symbol = library
        .get::<T>(name.as_bytes())
        .map_err(|_| RadarError::SymbolMissing {
            symbol: name.to_string(),
        })?;
    Ok(*symbol)
}

/// Where and under which name to look for the SDK library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Base name (`radar_sdk` resolves to `libradar_sdk.so`, `radar_sdk.dll`, ...).
    pub library_name: String,
    /// Directories tried in order.
    pub search_dirs: Vec<PathBuf>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        let mut search_dirs = Vec::new();
        if let Some(dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            search_dirs.push(dir);
        }
        if let Ok(cwd) = std::env::current_dir() {
            search_dirs.push(cwd);
        }
        Self {
            library_name: DEFAULT_LIBRARY_NAME.to_string(),
            search_dirs,
        }
    }
}

impl LoaderConfig {
    /// Defaults, with the directories from `RADAR_SDK_LIB_DIR` searched first.
    pub fn from_env() -> Self {
        Self::with_env_dirs(std::env::var_os(LIB_DIR_ENV))
    }

    fn with_env_dirs(value: Option<OsString>) -> Self {
        let mut config = Self::default();
        if let Some(value) = value {
            let mut dirs: Vec<PathBuf> = std::env::split_paths(&value)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            log::debug!("{} adds search dirs {:?}", LIB_DIR_ENV, dirs);
            dirs.append(&mut config.search_dirs);
            config.search_dirs = dirs;
        }
        config
    }

    /// Only search `dirs`.
    pub fn with_dirs(dirs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            library_name: DEFAULT_LIBRARY_NAME.to_string(),
            search_dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Platform file name of the library.
    pub fn file_name(&self) -> String {
        format!(
            "{}{}{}",
            std::env::consts::DLL_PREFIX,
            self.library_name,
            std::env::consts::DLL_SUFFIX
        )
    }

    /// Every path that will be tried, in order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let file_name = self.file_name();
        self.search_dirs.iter().map(|d| d.join(&file_name)).collect()
    }

    /// First candidate that exists on disk.
    pub fn locate(&self) -> Result<PathBuf> {
        let candidates = self.candidates();
        candidates
            .iter()
            .find(|p| p.is_file())
            .cloned()
            .ok_or_else(|| RadarError::LibraryNotFound {
                name: self.file_name(),
                searched: candidates,
            })
    }
}

/// The loaded SDK together with its bound entry points.
pub struct RadarLibrary {
    api: RadarApi,
    path: PathBuf,
    // Must outlive the function pointers in `api`.
    _library: Option<Library>,
}

impl std::fmt::Debug for RadarLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadarLibrary")
            .field("path", &self.path)
            .field("api", &self.api)
            .finish()
    }
}

impl RadarLibrary {
    /// Locate, load and bind the library described by `config`.
    pub fn load(config: &LoaderConfig) -> Result<Self> {
        let path = config.locate()?;
        let library = unsafe { Library::new(&path) }.map_err(|source| RadarError::LibraryLoad {
            path: path.clone(),
            source,
        })?;
        let api = unsafe { RadarApi::bind(&library) }?;

        let lib = Self {
            api,
            path,
            _library: Some(library),
        };
        log::info!(
            "Loaded radar SDK {} from {}",
            lib.version().unwrap_or_else(|_| "<unknown>".into()),
            lib.path.display()
        );
        Ok(lib)
    }

    #[cfg(test)]
    pub(crate) fn from_api(api: RadarApi) -> Self {
        Self {
            api,
            path: PathBuf::from("<fake>"),
            _library: None,
        }
    }

    pub fn api(&self) -> &RadarApi {
        &self.api
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and clear the native error slot of the calling thread.
    pub fn take_error(&self) -> Option<i32> {
        let code = unsafe { (self.api.ifx_error_get_and_clear)() };
        (code != 0).then_some(code)
    }

    /// Library-provided text for an error code.
    pub fn describe(&self, code: i32) -> String {
        unsafe { c_str_to_string((self.api.ifx_error_to_string)(code)) }
            .unwrap_or_else(|| format!("error 0x{code:05x}"))
    }

    /// Turn a pending native error into a `RadarError`, clearing the slot.
    pub fn check_error(&self) -> Result<()> {
        match self.take_error() {
            None => Ok(()),
            Some(code) => Err(RadarError::from_native(code, self.describe(code))),
        }
    }

    /// Run one native call and check the error slot right after it.
    pub fn checked<T>(&self, call: impl FnOnce(&RadarApi) -> T) -> Result<T> {
        let value = call(&self.api);
        self.check_error()?;
        Ok(value)
    }

    /// Like [`checked`](Self::checked) for calls returning a pointer that must not be NULL.
    pub fn checked_ptr<T>(
        &self,
        function: &'static str,
        call: impl FnOnce(&RadarApi) -> *mut T,
    ) -> Result<NonNull<T>> {
        let ptr = self.checked(call)?;
        NonNull::new(ptr).ok_or(RadarError::NullReturn { function })
    }

    /// Short version string, e.g. `3.3.1`.
    pub fn version(&self) -> Result<String> {
        let ptr = unsafe { (self.api.ifx_sdk_get_version_string)() };
        unsafe { c_str_to_string(ptr) }.ok_or(RadarError::NullReturn {
            function: "ifx_sdk_get_version_string",
        })
    }

    /// Full version string including the build revision.
    pub fn version_full(&self) -> Result<String> {
        let ptr = unsafe { (self.api.ifx_sdk_get_version_string_full)() };
        unsafe { c_str_to_string(ptr) }.ok_or(RadarError::NullReturn {
            function: "ifx_sdk_get_version_string_full",
        })
    }
}

static LIBRARY: OnceCell<Arc<RadarLibrary>> = OnceCell::new();

/// The process-wide SDK, loaded on first use with [`LoaderConfig::from_env`].
///
/// A failed load is not cached; the next call tries again.
pub fn library() -> Result<Arc<RadarLibrary>> {
    if let Some(lib) = LIBRARY.get() {
        return Ok(Arc::clone(lib));
    }
    library_with(&LoaderConfig::from_env())
}

/// Like [`library`] with an explicit config. Ignored once the library is loaded.
pub fn library_with(config: &LoaderConfig) -> Result<Arc<RadarLibrary>> {
    load_once(&LIBRARY, || RadarLibrary::load(config))
}

/// Concurrent first callers wait for a single `load`. A failed load leaves
/// `cell` empty.
fn load_once(
    cell: &OnceCell<Arc<RadarLibrary>>,
    load: impl FnOnce() -> Result<RadarLibrary>,
) -> Result<Arc<RadarLibrary>> {
    cell.get_or_try_init(|| load().map(Arc::new)).cloned()
}

/// Version string of the process-wide SDK.
pub fn sdk_version() -> Result<String> {
    library()?.version()
}

/// Full version string of the process-wide SDK.
pub fn sdk_version_full() -> Result<String> {
    library()?.version_full()
}

/// `major.minor.patch` as reported by [`sdk_version`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SdkVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SdkVersion {
    /// Parse the leading `X.Y.Z` of a version string; trailing text is ignored.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.trim().trim_start_matches('v').splitn(3, '.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let rest = parts.next()?;
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .map_or(rest, |end| &rest[..end]);
        let patch = digits.parse().ok()?;
        Some(Self {
            major,
            minor,
            patch,
        })
    }
}

impl std::fmt::Display for SdkVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
