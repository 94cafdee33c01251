//! Driver entry logic
//!
//! Runs once when the firmware starts the image:
//!
//! 1. Resolve the image's load options (fatal on failure)
//! 2. Parse them; missing options mean defaults, malformed ones are fatal
//! 3. Select the reset strategy
//! 4. Publish the provider and install the boot entry protocol
//!
//! The installation status becomes the image's load status.

use alloc::vec::Vec;

use boot_entry_api::RawBootEntryProtocol;
use spin::Once;

use crate::error::{EntryError, Result};
use crate::options::{LoadOptions, NATIVE_FLAG, PRESERVE_BOOT_FLAG};
use crate::provider::{BOOT_ENTRY_PROTOCOL, PROVIDER, ResetNvramProvider};
use crate::reset::{NvramResetService, PlatformReset, ResetAction, ResetFlags};

/// Action bound to the published entry
static ACTION: Once<ResetAction> = Once::new();

/// Firmware services needed while loading
pub trait DriverHost {
    /// Load options of this image, `None` when it was started without any.
    ///
    /// Fails with [`EntryError::LoadedImage`] when the image's loaded image
    /// protocol cannot be resolved.
    fn load_options(&self) -> Result<Option<Vec<u8>>>;

    /// Install `protocol` as the boot entry provider on this image's handle
    fn install_boot_entry_protocol(&self, protocol: &'static RawBootEntryProtocol) -> Result;
}

/// Steps 1 to 3: read the reset flags from the load options
pub fn configure<H: DriverHost>(host: &H) -> Result<ResetFlags> {
    let raw = host.load_options()?;

    let flags = match LoadOptions::parse(raw.as_deref()) {
        Ok(options) => ResetFlags::from_options(&options),
        Err(EntryError::NoLoadOptions) => ResetFlags::empty(),
        Err(err) => {
            log::error!("BEP: ResetNvram cannot parse load options - {}", err);
            return Err(err);
        }
    };

    if flags.preserve_boot_ignored() {
        log::warn!(
            "BEP: ResetNvram {} is ignored due to {}!",
            PRESERVE_BOOT_FLAG,
            NATIVE_FLAG
        );
    }

    Ok(flags)
}

/// Step 4: publish the provider for `flags` and install the protocol
pub fn install<H, N, P>(host: &H, flags: ResetFlags) -> Result
where
    H: DriverHost,
    N: NvramResetService + Default,
    P: PlatformReset + Default,
{
    let action = ACTION.call_once(|| flags.action());
    PROVIDER.call_once(|| ResetNvramProvider::bind::<N, P>(flags, action));

    let result = host
        .install_boot_entry_protocol(&BOOT_ENTRY_PROTOCOL)
        .map_err(|err| EntryError::Registration(err.status()));

    if let Err(err) = result {
        log::error!("BEP: ResetNvram cannot install boot entry protocol - {}", err);
    }
    debug_assert!(result.is_ok(), "boot entry protocol installation failed");

    result
}

/// Full driver load sequence
pub fn start<H, N, P>(host: &H) -> Result
where
    H: DriverHost,
    N: NvramResetService + Default,
    P: PlatformReset + Default,
{
    let flags = configure(host)?;
    install::<H, N, P>(host, flags)
}
