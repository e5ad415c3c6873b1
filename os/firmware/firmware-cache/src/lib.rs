//! # Processor Cache Control
//!
//! Turns the on-die caches on and off through CR0 during firmware bring-up,
//! typically around shadowing the firmware ROM into RAM.
//!
//! ## Sequences
//!
//! ```text
//! enable:   read CR0 → clear CD|NW → write CR0
//! disable:  read CR0 → set CD → WBINVD → write CR0 → WBINVD
//! ```
//!
//! The first `WBINVD` of the disable sequence pushes dirty lines out while
//! the cache is still on; the second drops whatever was filled between the
//! read and the write. The order is fixed and nothing is logged in between.
//!
//! ## Structure
//!
//! * [`CacheBackend`] is the hardware seam: CR0 access plus the two
//!   invalidation instructions. [`HardwareCache`] is the real thing.
//! * [`CacheController`] owns a backend and implements the sequences.
//!   There is no cached state; [`CacheController::state`] reads CR0 every
//!   time.
//! * [`enable_cache`] and [`disable_cache`] run the sequences on the live
//!   processor.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod backend;
mod controller;

pub use backend::CacheBackend;
#[cfg(target_arch = "x86_64")]
pub use backend::HardwareCache;
pub use controller::{CacheController, CacheState};
pub use firmware_registers::cr0::{CACHE_DISABLE_MASK, CACHE_ENABLE_MASK, Cr0};

/// Enables caching on the running processor.
///
/// # Safety
/// Must run at CPL0. See [`CacheController::enable`].
#[cfg(target_arch = "x86_64")]
#[inline]
pub unsafe fn enable_cache() {
    unsafe { CacheController::new(HardwareCache).enable() }
}

/// Disables caching on the running processor, writing back dirty lines.
///
/// # Safety
/// Must run at CPL0. See [`CacheController::disable`].
#[cfg(target_arch = "x86_64")]
#[inline]
pub unsafe fn disable_cache() {
    unsafe { CacheController::new(HardwareCache).disable() }
}
