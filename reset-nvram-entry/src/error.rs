//! Reset NVRAM entry error handling
//!
//! Every failure the driver can report maps onto a UEFI status, which is what
//! the firmware sees as the image's load status or what the picker sees as
//! the result of an entry action.

use core::fmt;

use uefi_raw::Status;

/// Driver error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryError {
    /// The image's own loaded image protocol could not be resolved
    LoadedImage(Status),

    /// The image was started without load options
    NoLoadOptions,

    /// Load options were present but could not be parsed
    MalformedLoadOptions(&'static str),

    /// Installing the boot entry protocol failed
    Registration(Status),

    /// The picker asked for entries of a specific device
    NoDeviceEntries,

    /// The provider was called before the driver finished loading
    NotConfigured,

    /// An entry action received a config it was not bound with
    InvalidActionConfig,

    /// The NVRAM reset facility reported a failure
    NvramReset(Status),

    /// Writing a firmware variable failed
    Variable(Status),
}

impl EntryError {
    /// Status reported to the firmware or the picker
    pub fn status(&self) -> Status {
        match self {
            EntryError::LoadedImage(status) => *status,
            EntryError::NoLoadOptions => Status::NOT_FOUND,
            EntryError::MalformedLoadOptions(_) => Status::INVALID_PARAMETER,
            EntryError::Registration(status) => *status,
            EntryError::NoDeviceEntries => Status::NOT_FOUND,
            EntryError::NotConfigured => Status::NOT_READY,
            EntryError::InvalidActionConfig => Status::INVALID_PARAMETER,
            EntryError::NvramReset(status) => *status,
            EntryError::Variable(status) => *status,
        }
    }

    /// Get a human-readable description of the error
    pub fn description(&self) -> &'static str {
        match self {
            EntryError::LoadedImage(_) => "Loaded image protocol unavailable",
            EntryError::NoLoadOptions => "No load options",
            EntryError::MalformedLoadOptions(msg) => msg,
            EntryError::Registration(_) => "Boot entry protocol installation failed",
            EntryError::NoDeviceEntries => "No entries for device",
            EntryError::NotConfigured => "Provider not configured",
            EntryError::InvalidActionConfig => "Invalid action config",
            EntryError::NvramReset(_) => "NVRAM reset failed",
            EntryError::Variable(_) => "Variable write failed",
        }
    }
}

impl fmt::Display for EntryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.description(), self.status())
    }
}

/// Result type used throughout the driver
pub type Result<T = ()> = core::result::Result<T, EntryError>;

/// Collapse a result into the status handed back across the ABI
pub fn into_status(result: Result) -> Status {
    match result {
        Ok(()) => Status::SUCCESS,
        Err(err) => err.status(),
    }
}
