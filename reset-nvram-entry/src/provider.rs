//! Reset NVRAM boot entry provider
//!
//! Supplies one custom, device-independent picker entry. The entry and its
//! bound strategy are built once at load and published through
//! [`spin::Once`]; the picker reaches them through [`BOOT_ENTRY_PROTOCOL`].

use core::ffi::c_void;
use core::ptr::{self, NonNull};

use boot_entry_api::entry::{FLAVOUR_RESET_NVRAM, VOICE_OVER_RESET_NVRAM};
use boot_entry_api::protocol::AudioBaseType;
use boot_entry_api::{
    PickerContext, PickerEntry, RawBootEntryProtocol, RawPickerEntry, SystemActionFn,
};
use spin::Once;
use uefi_raw::{Handle, Status};

use crate::error::{EntryError, Result};
use crate::reset::{NvramResetService, PlatformReset, ResetAction, ResetFlags};

/// Non-null device handle passed by the picker
pub type DeviceHandle = NonNull<c_void>;

/// The Reset NVRAM picker entry, before an action is bound
pub const RESET_NVRAM_ENTRY: PickerEntry =
    PickerEntry::new(c"reset_nvram", c"Reset NVRAM", FLAVOUR_RESET_NVRAM)
        .auxiliary()
        .with_voice_over(VOICE_OVER_RESET_NVRAM, AudioBaseType::OpenCore);

/// Provider configured at load
pub static PROVIDER: Once<ResetNvramProvider> = Once::new();

/// Protocol record installed on the image handle
pub static BOOT_ENTRY_PROTOCOL: RawBootEntryProtocol = RawBootEntryProtocol::new(get_boot_entries);

/// Reset NVRAM entry provider
#[derive(Debug)]
pub struct ResetNvramProvider {
    flags: ResetFlags,
    action: &'static ResetAction,
    entries: [RawPickerEntry; 1],
}

// SAFETY: the entry array only points at `'static` strings and at `action`,
// and nothing is written after construction.
unsafe impl Send for ResetNvramProvider {}
unsafe impl Sync for ResetNvramProvider {}

impl ResetNvramProvider {
    /// Build the provider, binding `system_action` with `action` as its config
    pub fn new(flags: ResetFlags, action: &'static ResetAction, system_action: SystemActionFn) -> Self {
        let config = ptr::from_ref(action).cast_mut().cast::<c_void>();
        Self {
            flags,
            action,
            entries: [RESET_NVRAM_ENTRY.to_raw(system_action, config)],
        }
    }

    /// Build the provider with the trampoline of `action`
    pub fn bind<N, P>(flags: ResetFlags, action: &'static ResetAction) -> Self
    where
        N: NvramResetService + Default,
        P: PlatformReset + Default,
    {
        Self::new(flags, action, action.system_action::<N, P>())
    }

    /// Strategy bound to the entry
    pub fn action(&self) -> &'static ResetAction {
        self.action
    }

    /// Entries for `device`; only custom entries (no device) are provided
    pub fn boot_entries(&self, device: Option<DeviceHandle>) -> Result<&[RawPickerEntry]> {
        if device.is_some() {
            return Err(EntryError::NoDeviceEntries);
        }

        log::info!(
            "BEP: Adding Reset NVRAM entry, preserve boot {}, native {}",
            self.flags.preserve_boot(),
            self.flags.native()
        );

        Ok(&self.entries)
    }
}

/// `get_boot_entries` slot of [`BOOT_ENTRY_PROTOCOL`]
///
/// # Safety
///
/// `entries` and `num_entries` must be null or valid for writes.
pub unsafe extern "efiapi" fn get_boot_entries(
    _context: *mut PickerContext,
    device: Handle,
    entries: *mut *mut RawPickerEntry,
    num_entries: *mut usize,
) -> Status {
    let Some(provider) = PROVIDER.get() else {
        return EntryError::NotConfigured.status();
    };

    let list = match provider.boot_entries(NonNull::new(device)) {
        Ok(list) => list,
        Err(err) => return err.status(),
    };

    if entries.is_null() || num_entries.is_null() {
        return Status::INVALID_PARAMETER;
    }

    // SAFETY: both checked non-null above, validity guaranteed by the caller.
    // The picker only reads the array.
    unsafe {
        *entries = list.as_ptr().cast_mut();
        *num_entries = list.len();
    }

    Status::SUCCESS
}
