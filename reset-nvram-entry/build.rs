//! Reset NVRAM entry build script
//!
//! The image must stay resident after its entry point returns, so on the UEFI
//! target it is linked as a boot service driver instead of an application.

use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os == "uefi" {
        println!("cargo:rustc-link-arg-bins=/subsystem:efi_boot_service_driver");
    }
}
