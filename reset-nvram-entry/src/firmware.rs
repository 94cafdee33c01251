//! Firmware services backed by the `uefi` crate
//!
//! The `uefi` crate may pull a different `uefi-raw` release than the rest of
//! the workspace, so statuses, vendors and attributes cross this seam by
//! value rather than by type.

use alloc::string::ToString;
use alloc::vec::Vec;
use core::ptr;

use boot_entry_api::{BOOT_ENTRY_PROTOCOL_GUID, RawBootEntryProtocol};
use log::LevelFilter;
use uefi::boot;
use uefi::proto::loaded_image::LoadedImage;
use uefi::runtime::{self, ResetType};
use uefi::{CString16, Guid};
use uefi_raw::Status;
use uefi_raw::table::runtime::{VariableAttributes, VariableVendor};

use crate::driver::{self, DriverHost};
use crate::error::{EntryError, Result, into_status};
use crate::reset::{NvramResetService, PlatformReset, is_preserved_boot_variable};

fn status_of<Data: core::fmt::Debug>(err: &uefi::Error<Data>) -> Status {
    Status(err.status().0)
}

fn firmware_vendor(vendor: &VariableVendor) -> runtime::VariableVendor {
    runtime::VariableVendor(Guid::from_bytes(vendor.0.to_bytes()))
}

/// Boot services of the running image
#[derive(Debug, Default, Clone, Copy)]
pub struct FirmwareHost;

impl DriverHost for FirmwareHost {
    fn load_options(&self) -> Result<Option<Vec<u8>>> {
        let image = boot::open_protocol_exclusive::<LoadedImage>(boot::image_handle())
            .map_err(|err| EntryError::LoadedImage(status_of(&err)))?;

        Ok(image.load_options_as_bytes().map(<[u8]>::to_vec))
    }

    fn install_boot_entry_protocol(&self, protocol: &'static RawBootEntryProtocol) -> Result {
        let guid = Guid::from_bytes(BOOT_ENTRY_PROTOCOL_GUID.to_bytes());

        // SAFETY: the record is 'static and never written after publication
        unsafe {
            boot::install_protocol_interface(
                Some(boot::image_handle()),
                &guid,
                ptr::from_ref(protocol).cast(),
            )
        }
        .map(|_| ())
        .map_err(|err| EntryError::Registration(status_of(&err)))
    }
}

/// Variable-clearing NVRAM reset
#[derive(Debug, Default, Clone, Copy)]
pub struct FirmwareNvram;

impl NvramResetService for FirmwareNvram {
    fn reset_nvram(&self, preserve_boot: bool) -> Result {
        // Collect first, deleting while walking the store restarts enumeration
        let keys = runtime::variable_keys()
            .collect::<uefi::Result<Vec<_>>>()
            .map_err(|err| EntryError::NvramReset(status_of(&err)))?;

        log::info!(
            "BEP: ResetNvram clearing {} variables, preserve boot {}",
            keys.len(),
            preserve_boot
        );

        for key in keys {
            let name = key.name.to_string();
            let vendor = VariableVendor(Guid::from_bytes(key.vendor.0.to_bytes()));

            if preserve_boot && is_preserved_boot_variable(&name, &vendor) {
                log::debug!("BEP: ResetNvram keeping {}", name);
                continue;
            }

            if let Err(err) = runtime::delete_variable(&key.name, &key.vendor) {
                log::debug!("BEP: ResetNvram cannot delete {} - {:?}", name, err.status());
            }
        }

        Ok(())
    }
}

/// Runtime services used by the native reset
#[derive(Debug, Default, Clone, Copy)]
pub struct FirmwarePlatform;

impl PlatformReset for FirmwarePlatform {
    fn set_variable(
        &self,
        name: &str,
        vendor: &VariableVendor,
        attributes: VariableAttributes,
        data: &[u8],
    ) -> Result {
        let name = CString16::try_from(name)
            .map_err(|_| EntryError::Variable(Status::INVALID_PARAMETER))?;

        runtime::set_variable(
            &name,
            &firmware_vendor(vendor),
            runtime::VariableAttributes::from_bits_retain(attributes.bits()),
            data,
        )
        .map_err(|err| EntryError::Variable(status_of(&err)))
    }

    fn reset_cold(&self) -> ! {
        runtime::reset(ResetType::COLD, uefi::Status::SUCCESS, None)
    }
}

/// Image entry: set up logging, then load the driver
pub fn driver_main() -> uefi::Status {
    if let Err(err) = uefi::helpers::init() {
        return err.status();
    }

    log::set_max_level(if cfg!(feature = "verbose_logging") {
        LevelFilter::Trace
    } else {
        LevelFilter::Info
    });

    let result = driver::start::<FirmwareHost, FirmwareNvram, FirmwarePlatform>(&FirmwareHost);
    uefi::Status(into_status(result).0)
}
