use crate::session::SessionState;
use std::path::PathBuf;

/// Errors that can occur when talking to the radar SDK.
#[derive(Debug, thiserror::Error)]
pub enum RadarError {
    #[error("Radar SDK library '{name}' not found (searched: {searched:?})")]
    LibraryNotFound { name: String, searched: Vec<PathBuf> },

    #[error("Failed to load library '{path}': {source}")]
    LibraryLoad {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("Symbol '{symbol}' not found in radar SDK library")]
    SymbolMissing { symbol: String },

    #[error("No radar device found: {description}")]
    DeviceNotFound { code: i32, description: String },

    #[error("Port '{port}' unavailable: {description}")]
    PortUnavailable {
        port: String,
        code: i32,
        description: String,
    },

    #[error("Invalid uuid '{0}': expected 32 hexadecimal characters")]
    InvalidUuid(String),

    #[error("Invalid configuration (0x{code:05x}): {description}")]
    InvalidConfig { code: i32, description: String },

    #[error("Missing field '{0}'")]
    MissingField(String),

    #[error("Field '{field}' has the wrong type, expected {expected}")]
    FieldType {
        field: String,
        expected: &'static str,
    },

    #[error("Timeout: {description}")]
    Timeout { code: i32, description: String },

    #[error("FIFO overflow: {description}")]
    FifoOverflow { code: i32, description: String },

    #[error("EEPROM error: {description}")]
    EepromFault { code: i32, description: String },

    #[error("Invalid argument (0x{code:05x}): {description}")]
    InvalidArgument { code: i32, description: String },

    #[error("Unsupported operation (0x{code:05x}): {description}")]
    UnsupportedOperation { code: i32, description: String },

    #[error("Device error (0x{code:05x}): {description}")]
    GenericDeviceError { code: i32, description: String },

    #[error("Invalid session state: expected {expected:?}, got {actual:?}")]
    InvalidState {
        expected: SessionState,
        actual: SessionState,
    },

    #[error("{function} returned NULL without reporting an error")]
    NullReturn { function: &'static str },

    #[error("No frame received within {0:?}")]
    NoFrame(std::time::Duration),

    #[error("Frame stream stopped")]
    StreamStopped,

    #[error("Failed to spawn frame thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Buffer shape error: {0}")]
    Shape(String),
}

impl RadarError {
    /// Build the structured failure for a native error code.
    pub fn from_native(code: i32, description: impl Into<String>) -> Self {
        let description = description.into();
        match ErrorCode::from_raw(code).kind() {
            ErrorKind::DeviceNotFound => Self::DeviceNotFound { code, description },
            ErrorKind::InvalidArgument => Self::InvalidArgument { code, description },
            ErrorKind::InvalidConfig => Self::InvalidConfig { code, description },
            ErrorKind::Timeout => Self::Timeout { code, description },
            ErrorKind::FifoOverflow => Self::FifoOverflow { code, description },
            ErrorKind::Eeprom => Self::EepromFault { code, description },
            ErrorKind::Unsupported => Self::UnsupportedOperation { code, description },
            ErrorKind::Device => Self::GenericDeviceError { code, description },
        }
    }

    /// The native error code, if this failure came from the native error slot.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::DeviceNotFound { code, .. }
            | Self::PortUnavailable { code, .. }
            | Self::InvalidConfig { code, .. }
            | Self::Timeout { code, .. }
            | Self::FifoOverflow { code, .. }
            | Self::EepromFault { code, .. }
            | Self::InvalidArgument { code, .. }
            | Self::UnsupportedOperation { code, .. }
            | Self::GenericDeviceError { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Acquisition-time failures after which re-issuing the read is reasonable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::FifoOverflow { .. } | Self::NoFrame(_)
        )
    }

    /// Device-state faults that usually need the session to be closed and reopened.
    pub fn requires_reopen(&self) -> bool {
        matches!(
            self,
            Self::EepromFault { .. }
                | Self::UnsupportedOperation { .. }
                | Self::GenericDeviceError { .. }
        )
    }
}

/// Category a native error code falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DeviceNotFound,
    InvalidArgument,
    InvalidConfig,
    Timeout,
    FifoOverflow,
    Eeprom,
    Unsupported,
    Device,
}

const API_BASE: i32 = 0x0001_0000;
const DEV_BASE: i32 = 0x0001_1000;
const APP_BASE: i32 = 0x0002_0000;

/// Native error codes of the radar SDK (`ifx_Error_t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Ok,
    Error,
    ArgumentNull,
    ArgumentInvalid,
    ArgumentOutOfBounds,
    ArgumentInvalidExpectedReal,
    ArgumentInvalidExpectedComplex,
    IndexOutOfBounds,
    DimensionMismatch,
    MemoryAllocationFailed,
    InPlaceCalculationNotSupported,
    MatrixSingular,
    MatrixNotPositiveDefinite,
    NotSupported,
    Internal,
    NotPossible,
    NoDevice,
    DeviceBusy,
    CommunicationError,
    NumSamplesOutOfRange,
    RxAntennaCombinationNotAllowed,
    IfGainOutOfRange,
    SamplerateOutOfRange,
    RfOutOfRange,
    TxPowerOutOfRange,
    ChirpRateOutOfRange,
    FrameRateOutOfRange,
    NumChirpsNotAllowed,
    FrameSizeNotSupported,
    Timeout,
    FifoOverflow,
    TxAntennaModeNotAllowed,
    FirmwareVersionNotSupported,
    DeviceNotSupported,
    BasebandConfigNotAllowed,
    AdcConfigNotAllowed,
    TestSignalModeNotAllowed,
    FrameAcquisitionFailed,
    TemperatureMeasurementFailed,
    PowerMeasurementFailed,
    TxAntennaCombinationNotAllowed,
    SequencerError,
    Eeprom,
    NotConfigured,
    OpeningFile,
    FileInvalid,
    EmptyDirectory,
    EndOfFile,
    MissingInterface,
    InvalidJson,
    InvalidJsonKey,
    InvalidJsonValue,
    Unknown(i32),
}

// Declaration order of the native enum, one block per base.
const API_CODES: [ErrorCode; 15] = [
    ErrorCode::Error,
    ErrorCode::ArgumentNull,
    ErrorCode::ArgumentInvalid,
    ErrorCode::ArgumentOutOfBounds,
    ErrorCode::ArgumentInvalidExpectedReal,
    ErrorCode::ArgumentInvalidExpectedComplex,
    ErrorCode::IndexOutOfBounds,
    ErrorCode::DimensionMismatch,
    ErrorCode::MemoryAllocationFailed,
    ErrorCode::InPlaceCalculationNotSupported,
    ErrorCode::MatrixSingular,
    ErrorCode::MatrixNotPositiveDefinite,
    ErrorCode::NotSupported,
    ErrorCode::Internal,
    ErrorCode::NotPossible,
];

const DEV_CODES: [ErrorCode; 28] = [
    ErrorCode::NoDevice,
    ErrorCode::DeviceBusy,
    ErrorCode::CommunicationError,
    ErrorCode::NumSamplesOutOfRange,
    ErrorCode::RxAntennaCombinationNotAllowed,
    ErrorCode::IfGainOutOfRange,
    ErrorCode::SamplerateOutOfRange,
    ErrorCode::RfOutOfRange,
    ErrorCode::TxPowerOutOfRange,
    ErrorCode::ChirpRateOutOfRange,
    ErrorCode::FrameRateOutOfRange,
    ErrorCode::NumChirpsNotAllowed,
    ErrorCode::FrameSizeNotSupported,
    ErrorCode::Timeout,
    ErrorCode::FifoOverflow,
    ErrorCode::TxAntennaModeNotAllowed,
    ErrorCode::FirmwareVersionNotSupported,
    ErrorCode::DeviceNotSupported,
    ErrorCode::BasebandConfigNotAllowed,
    ErrorCode::AdcConfigNotAllowed,
    ErrorCode::TestSignalModeNotAllowed,
    ErrorCode::FrameAcquisitionFailed,
    ErrorCode::TemperatureMeasurementFailed,
    ErrorCode::PowerMeasurementFailed,
    ErrorCode::TxAntennaCombinationNotAllowed,
    ErrorCode::SequencerError,
    ErrorCode::Eeprom,
    ErrorCode::NotConfigured,
];

const APP_CODES: [ErrorCode; 8] = [
    ErrorCode::OpeningFile,
    ErrorCode::FileInvalid,
    ErrorCode::EmptyDirectory,
    ErrorCode::EndOfFile,
    ErrorCode::MissingInterface,
    ErrorCode::InvalidJson,
    ErrorCode::InvalidJsonKey,
    ErrorCode::InvalidJsonValue,
];

fn lookup(table: &[ErrorCode], base: i32, raw: i32) -> Option<ErrorCode> {
    let offset = usize::try_from(raw.checked_sub(base)?).ok()?;
    table.get(offset).copied()
}

impl ErrorCode {
    /// Map a raw `ifx_Error_t` value. Total: unrecognised values become `Unknown`.
    pub fn from_raw(raw: i32) -> Self {
        if raw == 0 {
            return Self::Ok;
        }
        lookup(&API_CODES, API_BASE, raw)
            .or_else(|| lookup(&DEV_CODES, DEV_BASE, raw))
            .or_else(|| lookup(&APP_CODES, APP_BASE, raw))
            .unwrap_or(Self::Unknown(raw))
    }

    /// The raw `ifx_Error_t` value.
    pub fn raw(self) -> i32 {
        if let Self::Unknown(raw) = self {
            return raw;
        }
        if self == Self::Ok {
            return 0;
        }
        for (table, base) in [
            (&API_CODES[..], API_BASE),
            (&DEV_CODES[..], DEV_BASE),
            (&APP_CODES[..], APP_BASE),
        ] {
            if let Some(i) = table.iter().position(|c| *c == self) {
                return base + i as i32;
            }
        }
        unreachable!("every named error code is listed in a code table")
    }

    /// Failure category for this code. `Ok` has no failure and is reported as `Device`
    /// only if a caller insists on building an error from it.
    pub fn kind(self) -> ErrorKind {
        use ErrorCode::*;
        match self {
            NoDevice => ErrorKind::DeviceNotFound,
            ArgumentNull
            | ArgumentInvalid
            | ArgumentOutOfBounds
            | ArgumentInvalidExpectedReal
            | ArgumentInvalidExpectedComplex
            | IndexOutOfBounds
            | DimensionMismatch => ErrorKind::InvalidArgument,
            NumSamplesOutOfRange
            | RxAntennaCombinationNotAllowed
            | IfGainOutOfRange
            | SamplerateOutOfRange
            | RfOutOfRange
            | TxPowerOutOfRange
            | ChirpRateOutOfRange
            | FrameRateOutOfRange
            | NumChirpsNotAllowed
            | FrameSizeNotSupported
            | TxAntennaModeNotAllowed
            | BasebandConfigNotAllowed
            | AdcConfigNotAllowed
            | TestSignalModeNotAllowed
            | TxAntennaCombinationNotAllowed
            | NotConfigured => ErrorKind::InvalidConfig,
            Timeout => ErrorKind::Timeout,
            FifoOverflow => ErrorKind::FifoOverflow,
            Eeprom => ErrorKind::Eeprom,
            NotSupported
            | InPlaceCalculationNotSupported
            | NotPossible
            | FirmwareVersionNotSupported
            | DeviceNotSupported => ErrorKind::Unsupported,
            Ok | Error | MemoryAllocationFailed | MatrixSingular | MatrixNotPositiveDefinite
            | Internal | DeviceBusy | CommunicationError | FrameAcquisitionFailed
            | TemperatureMeasurementFailed | PowerMeasurementFailed | SequencerError
            | OpeningFile | FileInvalid | EmptyDirectory | EndOfFile | MissingInterface
            | InvalidJson | InvalidJsonKey | InvalidJsonValue | Unknown(_) => ErrorKind::Device,
        }
    }
}
