//! # CPU Identification for Early Firmware
//!
//! Thin access to the `CPUID` instruction plus the decoding that board and
//! chipset bring-up code needs: who made the processor and which
//! family/model/stepping it reports.
//!
//! ## Layers
//!
//! * [`cpuid`], [`cpuid_count`] and the single-register forms
//!   [`cpuid_eax`], [`cpuid_ebx`], [`cpuid_ecx`], [`cpuid_edx`] execute the
//!   instruction. Unknown leaves are passed straight to the hardware.
//! * [`CpuidSource`] is the seam between the instruction and everything that
//!   interprets its output. [`NativeCpuid`] executes the real instruction;
//!   tests hand in canned results.
//! * [`FeatureWord`] decodes `CPUID.01H:EAX`, [`VendorString`] decodes the
//!   leaf 0 vendor bytes, and [`CpuIdentity`] combines both.
//!
//! ## Example
//!
//! ```rust
//! use firmware_cpuid::{CpuIdentity, CpuVendor};
//!
//! let id = CpuIdentity::decode(0x0000_0673, CpuVendor::Intel);
//! assert_eq!((id.family, id.model, id.stepping), (6, 7, 3));
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod identity;
mod leaf00h;
mod leaf01h;
mod vendor;

pub use identity::CpuIdentity;
pub use leaf00h::{LEAF_00H, Leaf00h, VendorString};
pub use leaf01h::{FeatureWord, LEAF_01H};
pub use vendor::{CpuVendor, InvalidVendorTag};

/// The four output registers of one `CPUID` execution.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[repr(C)]
pub struct CpuidResult {
    pub eax: u32,
    pub ebx: u32,
    pub ecx: u32,
    pub edx: u32,
}

/// Anything that can answer a `CPUID` query.
///
/// The single-register methods must agree with the matching field of
/// [`cpuid`](CpuidSource::cpuid); implementations only override them to avoid
/// work, never to change the answer.
pub trait CpuidSource {
    /// Executes `CPUID` for `leaf` (sub-leaf 0) and returns all four outputs.
    fn cpuid(&self, leaf: u32) -> CpuidResult;

    #[inline]
    fn cpuid_eax(&self, leaf: u32) -> u32 {
        self.cpuid(leaf).eax
    }

    #[inline]
    fn cpuid_ebx(&self, leaf: u32) -> u32 {
        self.cpuid(leaf).ebx
    }

    #[inline]
    fn cpuid_ecx(&self, leaf: u32) -> u32 {
        self.cpuid(leaf).ecx
    }

    #[inline]
    fn cpuid_edx(&self, leaf: u32) -> u32 {
        self.cpuid(leaf).edx
    }
}

impl<T> CpuidSource for &T
where
    T: CpuidSource + ?Sized,
{
    #[inline]
    fn cpuid(&self, leaf: u32) -> CpuidResult {
        (**self).cpuid(leaf)
    }

    #[inline]
    fn cpuid_eax(&self, leaf: u32) -> u32 {
        (**self).cpuid_eax(leaf)
    }

    #[inline]
    fn cpuid_ebx(&self, leaf: u32) -> u32 {
        (**self).cpuid_ebx(leaf)
    }

    #[inline]
    fn cpuid_ecx(&self, leaf: u32) -> u32 {
        (**self).cpuid_ecx(leaf)
    }

    #[inline]
    fn cpuid_edx(&self, leaf: u32) -> u32 {
        (**self).cpuid_edx(leaf)
    }
}

/// The processor this code is running on.
#[cfg(target_arch = "x86_64")]
#[derive(Debug, Copy, Clone, Default)]
pub struct NativeCpuid;

#[cfg(target_arch = "x86_64")]
impl CpuidSource for NativeCpuid {
    #[inline]
    fn cpuid(&self, leaf: u32) -> CpuidResult {
        cpuid(leaf)
    }

    #[inline]
    fn cpuid_eax(&self, leaf: u32) -> u32 {
        cpuid_eax(leaf)
    }

    #[inline]
    fn cpuid_ebx(&self, leaf: u32) -> u32 {
        cpuid_ebx(leaf)
    }

    #[inline]
    fn cpuid_ecx(&self, leaf: u32) -> u32 {
        cpuid_ecx(leaf)
    }

    #[inline]
    fn cpuid_edx(&self, leaf: u32) -> u32 {
        cpuid_edx(leaf)
    }
}

/// Execute `CPUID` with the given leaf and sub-leaf.
///
/// RBX is reserved by the compiler, so its value is swapped through a scratch
/// register around the instruction.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
#[allow(clippy::inline_always)]
#[must_use]
pub fn cpuid_count(leaf: u32, subleaf: u32) -> CpuidResult {
    let (eax, ebx, ecx, edx): (u32, u32, u32, u32);
    // SAFETY: CPUID is part of the x86-64 baseline and only reads identification data.
    unsafe {
        core::arch::asm!(
            "mov {rbx_tmp:r}, rbx",
            "cpuid",
            "xchg {rbx_tmp:r}, rbx",
            rbx_tmp = out(reg) ebx,
            inout("eax") leaf => eax,
            inout("ecx") subleaf => ecx,
            out("edx") edx,
            options(nomem, nostack, preserves_flags),
        );
    }
    CpuidResult { eax, ebx, ecx, edx }
}

/// Execute `CPUID` with the given leaf.
#[cfg(target_arch = "x86_64")]
#[inline]
#[must_use]
pub fn cpuid(leaf: u32) -> CpuidResult {
    cpuid_count(leaf, 0)
}

/// `CPUID` returning only EAX.
#[cfg(target_arch = "x86_64")]
#[inline]
#[must_use]
pub fn cpuid_eax(leaf: u32) -> u32 {
    let eax: u32;
    // SAFETY: see `cpuid_count`.
    unsafe {
        core::arch::asm!(
            "mov {rbx_tmp:r}, rbx",
            "cpuid",
            "mov rbx, {rbx_tmp:r}",
            rbx_tmp = out(reg) _,
            inout("eax") leaf => eax,
            inout("ecx") 0u32 => _,
            out("edx") _,
            options(nomem, nostack, preserves_flags),
        );
    }
    eax
}

/// `CPUID` returning only EBX.
#[cfg(target_arch = "x86_64")]
#[inline]
#[must_use]
pub fn cpuid_ebx(leaf: u32) -> u32 {
    let ebx: u32;
    // SAFETY: see `cpuid_count`.
    unsafe {
        core::arch::asm!(
            "mov {rbx_tmp:r}, rbx",
            "cpuid",
            "xchg {rbx_tmp:r}, rbx",
            rbx_tmp = out(reg) ebx,
            inout("eax") leaf => _,
            inout("ecx") 0u32 => _,
            out("edx") _,
            options(nomem, nostack, preserves_flags),
        );
    }
    ebx
}

/// `CPUID` returning only ECX.
#[cfg(target_arch = "x86_64")]
#[inline]
#[must_use]
pub fn cpuid_ecx(leaf: u32) -> u32 {
    let ecx: u32;
    // SAFETY: see `cpuid_count`.
    unsafe {
        core::arch::asm!(
            "mov {rbx_tmp:r}, rbx",
            "cpuid",
            "mov rbx, {rbx_tmp:r}",
            rbx_tmp = out(reg) _,
            inout("eax") leaf => _,
            inout("ecx") 0u32 => ecx,
            out("edx") _,
            options(nomem, nostack, preserves_flags),
        );
    }
    ecx
}

/// `CPUID` returning only EDX.
#[cfg(target_arch = "x86_64")]
#[inline]
#[must_use]
pub fn cpuid_edx(leaf: u32) -> u32 {
    let edx: u32;
    // SAFETY: see `cpuid_count`.
    unsafe {
        core::arch::asm!(
            "mov {rbx_tmp:r}, rbx",
            "cpuid",
            "mov rbx, {rbx_tmp:r}",
            rbx_tmp = out(reg) _,
            inout("eax") leaf => _,
            inout("ecx") 0u32 => _,
            out("edx") edx,
            options(nomem, nostack, preserves_flags),
        );
    }
    edx
}

/// Whether the processor implements `CPUID`, probed via RFLAGS.ID.
///
/// Every x86-64 processor does; the probe still runs so the answer comes from
/// the hardware. RFLAGS is restored before returning.
#[cfg(target_arch = "x86_64")]
#[must_use]
pub fn cpuid_available() -> bool {
    use firmware_registers::rflags::Rflags;
    use firmware_registers::{LoadRegister, StoreRegisterUnsafe};

    let original = Rflags::load();
    let flipped = original.with_id_cpuid(!original.id_cpuid());

    // SAFETY: only the ID bit differs from the live value, and the original
    // value is written back right after.
    unsafe { flipped.store_unsafe() };
    let observed = Rflags::load();
    unsafe { original.store_unsafe() };

    let available = observed.id_cpuid() != original.id_cpuid();
    log::trace!("RFLAGS.ID toggle probe: cpuid available = {available}");
    available
}
