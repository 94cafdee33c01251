//! Reset NVRAM entry - Boot picker plugin for NVRAM reset
//!
//! A UEFI driver that adds a single auxiliary "Reset NVRAM" entry to the boot
//! picker through the boot entry provider protocol. Activating the entry
//! resets NVRAM with the strategy chosen by the driver's load options:
//!
//! - no options: clear variables through the NVRAM reset facility
//! - `--preserve-boot`: as above, keeping `Boot####` and `BootOrder`
//! - `--native`: ask the firmware for its own NVRAM reset and cold reset
//!   (`--preserve-boot` is ignored with a warning)
//!
//! Everything except `firmware` is plain `no_std` logic and builds and tests
//! on the host.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod driver;
pub mod error;
pub mod options;
pub mod provider;
pub mod reset;

#[cfg(target_os = "uefi")]
pub mod firmware;

pub use driver::{DriverHost, start};
pub use error::{EntryError, Result};
pub use options::LoadOptions;
pub use provider::{BOOT_ENTRY_PROTOCOL, ResetNvramProvider};
pub use reset::{NvramResetService, PlatformReset, ResetAction, ResetFlags};
