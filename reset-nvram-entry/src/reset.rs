//! NVRAM reset strategies
//!
//! Two ways of resetting NVRAM, picked once at load time:
//!
//! - **Delegated**: clear variables through an [`NvramResetService`],
//!   optionally keeping the boot list, and return to the picker
//! - **Native**: write the firmware's reset request variable and cold reset,
//!   letting supported firmware do its own (deeper) reset
//!
//! The picker invokes a strategy through the raw action pointer of the entry,
//! so each strategy also has an `extern "C"` trampoline. The trampolines
//! build their firmware services with [`Default`]; the real services are
//! stateless wrappers around boot and runtime services.

use core::ffi::c_void;

use bitflags::bitflags;
use boot_entry_api::SystemActionFn;
use uefi_raw::table::runtime::{VariableAttributes, VariableVendor};
use uefi_raw::{Guid, Status, guid};

use crate::error::{EntryError, Result, into_status};
use crate::options::{LoadOptions, NATIVE_FLAG, PRESERVE_BOOT_FLAG};

/// Vendor GUID of the boot variables honoured by Apple firmware
pub const APPLE_BOOT_VARIABLE_GUID: Guid = guid!("7c436110-ab2a-4bbb-a880-fe41995c9f82");

/// Any write to this variable requests a firmware NVRAM reset on next boot
pub const RESET_NVRAM_VARIABLE_NAME: &str = "ResetNVRam";

/// Payload written to [`RESET_NVRAM_VARIABLE_NAME`]. Size and value are not
/// interpreted by the firmware.
pub const RESET_NVRAM_TRIGGER: [u8; 1] = [1];

/// Attributes of the reset request variable
pub const RESET_NVRAM_ATTRIBUTES: VariableAttributes = VariableAttributes::NON_VOLATILE
    .union(VariableAttributes::BOOTSERVICE_ACCESS)
    .union(VariableAttributes::RUNTIME_ACCESS);

bitflags! {
    /// Reset behaviour requested through load options
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ResetFlags: u8 {
        /// Keep `Boot####` and `BootOrder` when resetting
        const PRESERVE_BOOT = 1 << 0;
        /// Use the firmware's own reset instead of clearing variables
        const NATIVE = 1 << 1;
    }
}

impl ResetFlags {
    /// Extract the recognised flags from parsed load options
    pub fn from_options(options: &LoadOptions) -> Self {
        let mut flags = Self::empty();
        flags.set(Self::PRESERVE_BOOT, options.has_var(PRESERVE_BOOT_FLAG));
        flags.set(Self::NATIVE, options.has_var(NATIVE_FLAG));
        flags
    }

    pub fn preserve_boot(&self) -> bool {
        self.contains(Self::PRESERVE_BOOT)
    }

    pub fn native(&self) -> bool {
        self.contains(Self::NATIVE)
    }

    /// Native reset cannot keep the boot list
    pub fn preserve_boot_ignored(&self) -> bool {
        self.contains(Self::PRESERVE_BOOT | Self::NATIVE)
    }

    /// Strategy bound to the picker entry
    pub fn action(&self) -> ResetAction {
        if self.native() {
            ResetAction::Native
        } else {
            ResetAction::Delegated {
                preserve_boot: self.preserve_boot(),
            }
        }
    }
}

/// Strategy bound to the Reset NVRAM entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetAction {
    /// Clear variables through the NVRAM reset facility
    Delegated { preserve_boot: bool },
    /// Request a firmware NVRAM reset and cold reset
    Native,
}

impl ResetAction {
    /// Run the strategy.
    ///
    /// Only the delegated strategy returns.
    pub fn perform<N, P>(&self, nvram: &N, platform: &P) -> Result
    where
        N: NvramResetService,
        P: PlatformReset,
    {
        match *self {
            ResetAction::Delegated { preserve_boot } => delegated_reset(nvram, preserve_boot),
            ResetAction::Native => native_reset(platform),
        }
    }

    /// Trampoline the picker calls for this strategy
    pub fn system_action<N, P>(&self) -> SystemActionFn
    where
        N: NvramResetService + Default,
        P: PlatformReset + Default,
    {
        match self {
            ResetAction::Delegated { .. } => delegated_action::<N>,
            ResetAction::Native => native_action::<P>,
        }
    }
}

/// NVRAM reset facility shared with the picker
#[cfg_attr(test, mockall::automock)]
pub trait NvramResetService {
    /// Clear NVRAM, keeping the boot list if `preserve_boot` is set
    fn reset_nvram(&self, preserve_boot: bool) -> Result;
}

/// Platform services behind the native strategy
pub trait PlatformReset {
    fn set_variable(
        &self,
        name: &str,
        vendor: &VariableVendor,
        attributes: VariableAttributes,
        data: &[u8],
    ) -> Result;

    /// Cold reset the machine
    fn reset_cold(&self) -> !;
}

/// Forward `preserve_boot` to the reset facility, status unchanged
pub fn delegated_reset<N: NvramResetService>(nvram: &N, preserve_boot: bool) -> Result {
    nvram.reset_nvram(preserve_boot)
}

/// Request a firmware NVRAM reset and cold reset.
///
/// The reset happens even when the variable write fails; the firmware then
/// simply boots normally.
pub fn native_reset<P: PlatformReset>(platform: &P) -> ! {
    let vendor = VariableVendor(APPLE_BOOT_VARIABLE_GUID);
    if let Err(err) = platform.set_variable(
        RESET_NVRAM_VARIABLE_NAME,
        &vendor,
        RESET_NVRAM_ATTRIBUTES,
        &RESET_NVRAM_TRIGGER,
    ) {
        log::warn!("BEP: ResetNvram native request failed - {}", err);
    }

    platform.reset_cold()
}

/// Variables kept by a delegated reset with `preserve_boot`
pub fn is_preserved_boot_variable(name: &str, vendor: &VariableVendor) -> bool {
    if *vendor != VariableVendor::GLOBAL_VARIABLE {
        return false;
    }

    if name == "BootOrder" {
        return true;
    }

    match name.strip_prefix("Boot") {
        Some(number) => {
            number.len() == 4 && number.chars().all(|c| matches!(c, '0'..='9' | 'A'..='F'))
        }
        None => false,
    }
}

/// Picker trampoline for [`ResetAction::Delegated`].
///
/// # Safety
///
/// `config` must be null or point at the live [`ResetAction`] the entry was
/// bound with.
pub unsafe extern "C" fn delegated_action<N>(config: *mut c_void) -> Status
where
    N: NvramResetService + Default,
{
    // SAFETY: guaranteed by the caller
    let Some(action) = (unsafe { config.cast::<ResetAction>().as_ref() }) else {
        return EntryError::InvalidActionConfig.status();
    };

    match *action {
        ResetAction::Delegated { preserve_boot } => {
            into_status(delegated_reset(&N::default(), preserve_boot))
        }
        ResetAction::Native => {
            log::error!("BEP: ResetNvram delegated action bound to native config");
            EntryError::InvalidActionConfig.status()
        }
    }
}

/// Picker trampoline for [`ResetAction::Native`]. The config is not used.
///
/// # Safety
///
/// Resets the machine; the caller must be prepared to never regain control.
pub unsafe extern "C" fn native_action<P>(_config: *mut c_void) -> Status
where
    P: PlatformReset + Default,
{
    native_reset(&P::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    struct NoPlatform;

    impl PlatformReset for NoPlatform {
        fn set_variable(
            &self,
            _name: &str,
            _vendor: &VariableVendor,
            _attributes: VariableAttributes,
            _data: &[u8],
        ) -> Result {
            panic!("native path taken");
        }

        fn reset_cold(&self) -> ! {
            panic!("native path taken");
        }
    }

    #[test]
    fn test_flag_selection() {
        let cases = [
            (ResetFlags::empty(), ResetAction::Delegated { preserve_boot: false }, false),
            (ResetFlags::PRESERVE_BOOT, ResetAction::Delegated { preserve_boot: true }, false),
            (ResetFlags::NATIVE, ResetAction::Native, false),
            (ResetFlags::all(), ResetAction::Native, true),
        ];

        for (flags, action, ignored) in cases {
            assert_eq!(flags.action(), action, "{:?}", flags);
            assert_eq!(flags.preserve_boot_ignored(), ignored, "{:?}", flags);
        }
    }

    #[test]
    fn test_flags_from_options() {
        let options = LoadOptions::parse_str("--preserve-boot --verbose").unwrap();
        assert_eq!(ResetFlags::from_options(&options), ResetFlags::PRESERVE_BOOT);

        let options = LoadOptions::parse_str("--native --preserve-boot").unwrap();
        assert_eq!(ResetFlags::from_options(&options), ResetFlags::all());
    }

    #[test]
    fn test_delegated_forwards_preserve_boot() {
        for preserve_boot in [true, false] {
            let mut nvram = MockNvramResetService::new();
            nvram
                .expect_reset_nvram()
                .with(eq(preserve_boot))
                .times(1)
                .returning(|_| Ok(()));

            let action = ResetAction::Delegated { preserve_boot };
            assert_eq!(action.perform(&nvram, &NoPlatform), Ok(()));
        }
    }

    #[test]
    fn test_delegated_failure_is_verbatim() {
        let mut nvram = MockNvramResetService::new();
        nvram
            .expect_reset_nvram()
            .with(eq(true))
            .times(1)
            .returning(|_| Err(EntryError::NvramReset(Status::WRITE_PROTECTED)));

        let result = ResetAction::Delegated { preserve_boot: true }.perform(&nvram, &NoPlatform);
        assert_eq!(result, Err(EntryError::NvramReset(Status::WRITE_PROTECTED)));
        assert_eq!(into_status(result), Status::WRITE_PROTECTED);
    }

    #[test]
    fn test_reset_variable_attributes() {
        assert!(RESET_NVRAM_ATTRIBUTES.contains(VariableAttributes::NON_VOLATILE));
        assert!(RESET_NVRAM_ATTRIBUTES.contains(VariableAttributes::BOOTSERVICE_ACCESS));
        assert!(RESET_NVRAM_ATTRIBUTES.contains(VariableAttributes::RUNTIME_ACCESS));
        assert!(!RESET_NVRAM_ATTRIBUTES.contains(VariableAttributes::APPEND_WRITE));
    }

    #[test]
    fn test_preserved_boot_variables() {
        let global = VariableVendor::GLOBAL_VARIABLE;
        assert!(is_preserved_boot_variable("BootOrder", &global));
        assert!(is_preserved_boot_variable("Boot0000", &global));
        assert!(is_preserved_boot_variable("Boot00AF", &global));
        assert!(!is_preserved_boot_variable("BootNext", &global));
        assert!(!is_preserved_boot_variable("Boot000", &global));
        assert!(!is_preserved_boot_variable("Boot0000X", &global));
        assert!(!is_preserved_boot_variable("Boot00af", &global));
        assert!(!is_preserved_boot_variable("Boot00aF", &global));
        assert!(!is_preserved_boot_variable("Lang", &global));

        let apple = VariableVendor(APPLE_BOOT_VARIABLE_GUID);
        assert!(!is_preserved_boot_variable("Boot0001", &apple));
    }
}
