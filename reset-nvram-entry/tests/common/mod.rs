//! Firmware fakes and log capture shared by the driver test binaries

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::sync::Once;

use boot_entry_api::{RawBootEntryProtocol, RawPickerEntry, SystemActionFn};
use log::{Level, LevelFilter, Log, Metadata, Record};
use reset_nvram_entry::driver::DriverHost;
use reset_nvram_entry::reset::{
    APPLE_BOOT_VARIABLE_GUID, RESET_NVRAM_ATTRIBUTES, RESET_NVRAM_VARIABLE_NAME,
};
use reset_nvram_entry::{EntryError, NvramResetService, PlatformReset, Result};
use uefi_raw::Status;
use uefi_raw::table::runtime::{VariableAttributes, VariableVendor};

pub fn ucs2(text: &str) -> Vec<u8> {
    text.encode_utf16()
        .chain(Some(0))
        .flat_map(u16::to_le_bytes)
        .collect()
}

/// Loaded image and protocol database of the driver image
#[derive(Default)]
pub struct FakeHost {
    pub options: Option<Vec<u8>>,
    pub lookup_failure: Option<Status>,
    pub install_failure: Option<Status>,
    pub installs: RefCell<Vec<*const RawBootEntryProtocol>>,
}

impl FakeHost {
    pub fn with_options(text: &str) -> Self {
        Self {
            options: Some(ucs2(text)),
            ..Self::default()
        }
    }
}

impl DriverHost for FakeHost {
    fn load_options(&self) -> Result<Option<Vec<u8>>> {
        match self.lookup_failure {
            Some(status) => Err(EntryError::LoadedImage(status)),
            None => Ok(self.options.clone()),
        }
    }

    fn install_boot_entry_protocol(&self, protocol: &'static RawBootEntryProtocol) -> Result {
        self.installs.borrow_mut().push(ptr::from_ref(protocol));
        match self.install_failure {
            Some(status) => Err(EntryError::Registration(status)),
            None => Ok(()),
        }
    }
}

thread_local! {
    pub static NVRAM_CALLS: RefCell<Vec<bool>> = const { RefCell::new(Vec::new()) };
    pub static NVRAM_STATUS: Cell<Status> = const { Cell::new(Status::SUCCESS) };
}

/// NVRAM reset facility recording each request
#[derive(Default)]
pub struct RecordingNvram;

impl NvramResetService for RecordingNvram {
    fn reset_nvram(&self, preserve_boot: bool) -> Result {
        NVRAM_CALLS.with(|calls| calls.borrow_mut().push(preserve_boot));
        match NVRAM_STATUS.get() {
            Status::SUCCESS => Ok(()),
            status => Err(EntryError::NvramReset(status)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    SetVariable {
        name: String,
        vendor: VariableVendor,
        attributes: VariableAttributes,
        data: Vec<u8>,
    },
    ColdReset,
}

/// Platform that records writes and unwinds instead of resetting
#[derive(Default)]
pub struct RecordingPlatform {
    pub events: RefCell<Vec<PlatformEvent>>,
    pub write_failure: Option<Status>,
}

impl PlatformReset for RecordingPlatform {
    fn set_variable(
        &self,
        name: &str,
        vendor: &VariableVendor,
        attributes: VariableAttributes,
        data: &[u8],
    ) -> Result {
        self.events.borrow_mut().push(PlatformEvent::SetVariable {
            name: name.to_string(),
            vendor: *vendor,
            attributes,
            data: data.to_vec(),
        });
        match self.write_failure {
            Some(status) => Err(EntryError::Variable(status)),
            None => Ok(()),
        }
    }

    fn reset_cold(&self) -> ! {
        self.events.borrow_mut().push(PlatformEvent::ColdReset);
        panic!("cold reset");
    }
}

pub fn reset_request() -> PlatformEvent {
    PlatformEvent::SetVariable {
        name: RESET_NVRAM_VARIABLE_NAME.to_string(),
        vendor: VariableVendor(APPLE_BOOT_VARIABLE_GUID),
        attributes: RESET_NVRAM_ATTRIBUTES,
        data: vec![1],
    }
}

pub fn expect_cold_reset(run: impl FnOnce()) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(run));
    let message = outcome.expect_err("native reset returned");
    assert_eq!(message.downcast_ref::<&str>(), Some(&"cold reset"));
}

/// Whether `entry` calls exactly `action`
pub fn bound_to(entry: &RawPickerEntry, action: SystemActionFn) -> bool {
    entry.system_action.map(|bound| bound as usize) == Some(action as usize)
}

thread_local! {
    static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

/// [`log::Log`] sink keeping each test thread's records apart
struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        RECORDS.with(|records| {
            records
                .borrow_mut()
                .push((record.level(), record.args().to_string()))
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static LOGGER_INIT: Once = Once::new();

/// Run `f` and return its value with the records it logged on this thread
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, Vec<(Level, String)>) {
    LOGGER_INIT.call_once(|| {
        log::set_logger(&LOGGER).expect("no other logger in tests");
        log::set_max_level(LevelFilter::Trace);
    });

    RECORDS.with(|records| records.borrow_mut().clear());
    let value = f();
    (value, RECORDS.with(RefCell::take))
}

/// Number of records at `level` starting with `prefix`
pub fn count_logged(records: &[(Level, String)], level: Level, prefix: &str) -> usize {
    records
        .iter()
        .filter(|(logged, message)| *logged == level && message.starts_with(prefix))
        .count()
}

pub const PRESERVE_BOOT_IGNORED: &str = "BEP: ResetNvram --preserve-boot is ignored due to --native!";
pub const ADDING_ENTRY: &str = "BEP: Adding Reset NVRAM entry";
