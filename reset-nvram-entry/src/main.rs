//! Reset NVRAM entry driver image
//!
//! The actual entry point is `efi_main`, via the `#[entry]` macro. Host builds
//! get an empty `main` so the workspace builds and tests off-target.

#![cfg_attr(target_os = "uefi", no_std)]
#![cfg_attr(target_os = "uefi", no_main)]

#[cfg(not(target_os = "uefi"))]
fn main() {}

#[cfg(target_os = "uefi")]
#[uefi::entry]
fn efi_main() -> uefi::Status {
    reset_nvram_entry::firmware::driver_main()
}
