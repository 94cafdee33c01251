//! Boot entry API - Contract between the boot picker and entry providers
//!
//! The boot picker discovers additional menu items by locating every instance
//! of the boot entry provider protocol and asking it for picker entries. This
//! crate carries both sides of that contract:
//!
//! - **Protocol**: GUID, revision and the `#[repr(C)]` records the picker reads
//! - **Entry**: a safe descriptor model that lowers into the raw picker entry
//!
//! # Usage
//!
//! ```rust
//! use boot_entry_api::entry::{PickerEntry, FLAVOUR_RESET_NVRAM};
//!
//! let entry = PickerEntry::new(c"reset_nvram", c"Reset NVRAM", FLAVOUR_RESET_NVRAM);
//! assert!(entry.path.is_none());
//! ```

#![no_std]

pub mod entry;
pub mod protocol;

pub use entry::{PickerEntry, VoiceOver};
pub use protocol::{
    BOOT_ENTRY_PROTOCOL_GUID, BOOT_ENTRY_PROTOCOL_REVISION, GetBootEntriesFn, PickerContext,
    RawBootEntryProtocol, RawPickerEntry, SystemActionFn,
};
