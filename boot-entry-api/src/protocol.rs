//! Boot entry provider protocol
//!
//! ABI records exchanged with the boot picker. The picker calls
//! `get_boot_entries` once per scanned device and once more with a null device
//! to collect custom entries. Entry arrays handed out by a provider stay owned
//! by the provider; the picker only reads them.

use core::ffi::{c_char, c_void};
use core::ptr;

use static_assertions::{assert_eq_size, const_assert_eq};
use uefi_raw::{Guid, Handle, Status, guid};

/// Protocol GUID the picker locates providers by
pub const BOOT_ENTRY_PROTOCOL_GUID: Guid = guid!("8ae1f9a1-9a5c-4b3e-a7d2-3c0e6f1d5b24");

/// Revision the picker checks before using a provider
pub const BOOT_ENTRY_PROTOCOL_REVISION: usize = 5;

/// Picker state handed to providers. Opaque on this side of the contract.
#[repr(C)]
pub struct PickerContext {
    _opaque: [u8; 0],
}

/// Action bound to a system entry, invoked with the entry's `action_config`.
pub type SystemActionFn = unsafe extern "C" fn(action_config: *mut c_void) -> Status;

/// Entry enumeration callback.
///
/// `device` is null when the picker asks for custom, device-independent
/// entries. Providers that have nothing for `device` return `NOT_FOUND`.
pub type GetBootEntriesFn = unsafe extern "efiapi" fn(
    context: *mut PickerContext,
    device: Handle,
    entries: *mut *mut RawPickerEntry,
    num_entries: *mut usize,
) -> Status;

/// Where the picker looks up a voice-over asset.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioBaseType {
    /// Picker's own resource directory
    OpenCore = 0,
    /// Firmware vendor voice-over bundle
    Apple = 1,
}

/// Picker entry as laid out in memory for the picker.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawPickerEntry {
    pub id: *const c_char,
    pub name: *const c_char,
    pub path: *const c_char,
    pub arguments: *const c_char,
    pub flavour: *const c_char,
    pub auxiliary: bool,
    pub tool: bool,
    pub text_mode: bool,
    pub real_path: bool,
    pub system_action: Option<SystemActionFn>,
    pub action_config: *mut c_void,
    pub audio_base_path: *const c_char,
    pub audio_base_type: AudioBaseType,
}

/// Boot entry provider protocol record.
#[repr(C)]
#[derive(Debug)]
pub struct RawBootEntryProtocol {
    pub revision: usize,
    pub get_boot_entries: GetBootEntriesFn,
    /// Reserved by the picker for per-entry customisation hooks. Always null
    /// for providers built on this crate.
    pub reserved: *const c_void,
}

// SAFETY: the record is immutable once published and only holds a function
// pointer and a null slot.
unsafe impl Sync for RawBootEntryProtocol {}

impl RawBootEntryProtocol {
    /// Create a protocol record at the current revision
    pub const fn new(get_boot_entries: GetBootEntriesFn) -> Self {
        Self {
            revision: BOOT_ENTRY_PROTOCOL_REVISION,
            get_boot_entries,
            reserved: ptr::null(),
        }
    }
}

assert_eq_size!(RawBootEntryProtocol, [usize; 3]);

#[cfg(target_pointer_width = "64")]
const_assert_eq!(size_of::<RawPickerEntry>(), 80);
