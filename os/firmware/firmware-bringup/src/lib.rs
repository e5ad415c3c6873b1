//! # Board Bring-up Entry Points
//!
//! What chipset and board code calls during early init: install the debug
//! logger, find out which processor it is running on, and switch caching on
//! or off around ROM shadowing.
//!
//! ```rust,no_run
//! use firmware_bringup::{identify_boot_cpu, init_logging, with_cache_disabled};
//! use log::LevelFilter;
//!
//! let _ = init_logging(LevelFilter::Debug);
//! let _cpu = identify_boot_cpu().expect("no CPUID");
//! unsafe { with_cache_disabled(|| { /* copy ROM to shadow RAM */ }) };
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![cfg(target_arch = "x86_64")]
#![allow(unsafe_code)]

pub use firmware_cache::{CacheState, disable_cache, enable_cache};
pub use firmware_cpuid::{CpuIdentity, CpuVendor};

use firmware_cache::{CacheController, HardwareCache};
use firmware_cpuid::{NativeCpuid, cpuid_available};
use firmware_qemu::QemuLogger;
use log::{LevelFilter, SetLoggerError, info, warn};

/// Routes `log` output to the QEMU debug console.
///
/// # Errors
/// Fails if a logger is already installed.
pub fn init_logging(max_level: LevelFilter) -> Result<(), SetLoggerError> {
    QemuLogger::init(max_level)?;
    info!("debug console logging at {max_level}");
    Ok(())
}

/// Identifies the processor executing this code.
///
/// Returns `None` only if the processor does not implement `CPUID`.
#[must_use]
pub fn identify_boot_cpu() -> Option<CpuIdentity> {
    if !cpuid_available() {
        warn!("CPUID not implemented; processor cannot be identified");
        return None;
    }

    let identity = CpuIdentity::query(&NativeCpuid);
    info!("boot CPU: {identity}");
    Some(identity)
}

/// Current cache state of the running processor.
///
/// # Safety
/// Must run at CPL0.
#[must_use]
pub unsafe fn cache_state() -> CacheState {
    unsafe { CacheController::new(HardwareCache).state() }
}

/// Runs `f` with caching disabled on the running processor, restoring the
/// previous state afterwards.
///
/// # Safety
/// Must run at CPL0 from the single boot context.
pub unsafe fn with_cache_disabled<R>(f: impl FnOnce() -> R) -> R {
    unsafe { CacheController::new(HardwareCache).with_disabled(f) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firmware_cpuid::{LEAF_01H, Leaf00h, cpuid_eax};

    #[test]
    fn boot_cpu_matches_direct_decode() {
        let identity = identify_boot_cpu().expect("x86-64 always has CPUID");
        let vendor = Leaf00h::read(&NativeCpuid).vendor();
        assert_eq!(identity, CpuIdentity::decode(cpuid_eax(LEAF_01H), vendor));
    }
}
