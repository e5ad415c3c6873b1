use bitfield_struct::bitfield;

/// CR0.CD — bit 30, cache disable.
pub const CR0_CACHE_DISABLE: u64 = 1 << 30;

/// CR0.NW — bit 29, not write-through.
pub const CR0_NOT_WRITE_THROUGH: u64 = 1 << 29;

/// AND-mask that turns caching back on by clearing CD and NW.
///
/// The low 32 bits are `0x9FFF_FFFF`; the upper half is all ones so a 64-bit
/// CR0 keeps whatever it held there.
pub const CACHE_ENABLE_MASK: u64 = !(CR0_CACHE_DISABLE | CR0_NOT_WRITE_THROUGH);

/// OR-mask that turns caching off by setting CD (`0x4000_0000`).
pub const CACHE_DISABLE_MASK: u64 = CR0_CACHE_DISABLE;

/// CR0 as seen in 64-bit mode.
///
/// Only the cache bits matter to firmware bring-up, but all architectural
/// bits are modeled so the value can be logged meaningfully. Reserved bits
/// are carried through [`Cr0::from_bits`] untouched; a read-modify-write
/// never drops bits this type does not name.
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct Cr0 {
    /// Bit 0 — PE, protected mode.
    pub pe_protection_enable: bool,

    /// Bit 1 — MP, monitor coprocessor.
    pub mp_monitor_coprocessor: bool,

    /// Bit 2 — EM, x87 emulation.
    pub em_emulation: bool,

    /// Bit 3 — TS, task switched.
    pub ts_task_switched: bool,

    /// Bit 4 — ET, extension type (hardwired to 1 on anything modern).
    pub et_extension_type: bool,

    /// Bit 5 — NE, native x87 error reporting.
    pub ne_numeric_error: bool,

    #[bits(10, default = 0)]
    _reserved_6_15: u16,

    /// Bit 16 — WP, supervisor write protect.
    pub wp_write_protect: bool,

    #[bits(default = false)]
    _reserved_17: bool,

    /// Bit 18 — AM, alignment mask.
    pub am_alignment_mask: bool,

    #[bits(10, default = 0)]
    _reserved_19_28: u16,

    /// Bit 29 — NW, not write-through.
    ///
    /// Only meaningful together with CD. Firmware clears it whenever it
    /// re-enables caching.
    pub nw_not_write_through: bool,

    /// Bit 30 — CD, cache disable.
    ///
    /// While set, the processor stops filling its caches. Lines already
    /// present stay valid until invalidated, which is why disabling is
    /// always paired with `WBINVD`.
    pub cd_cache_disable: bool,

    /// Bit 31 — PG, paging.
    pub pg_paging: bool,

    #[bits(32, default = 0)]
    _reserved_32_63: u32,
}

impl Cr0 {
    /// Applies [`CACHE_ENABLE_MASK`], clearing CD and NW and nothing else.
    #[inline]
    #[must_use]
    pub const fn with_caching_enabled(self) -> Self {
        Self::from_bits(self.into_bits() & CACHE_ENABLE_MASK)
    }

    /// Applies [`CACHE_DISABLE_MASK`], setting CD and nothing else.
    #[inline]
    #[must_use]
    pub const fn with_caching_disabled(self) -> Self {
        Self::from_bits(self.into_bits() | CACHE_DISABLE_MASK)
    }

    /// Whether CR0.CD is clear.
    #[inline]
    #[must_use]
    pub const fn caching_enabled(self) -> bool {
        !self.cd_cache_disable()
    }
}

#[cfg(all(feature = "asm", target_arch = "x86_64"))]
impl crate::LoadRegisterUnsafe for Cr0 {
    unsafe fn load_unsafe() -> Self {
        let cr0: u64;
        unsafe {
            core::arch::asm!("mov {}, cr0", out(reg) cr0, options(nomem, nostack, preserves_flags));
        }
        Self::from_bits(cr0)
    }
}

#[cfg(all(feature = "asm", target_arch = "x86_64"))]
impl crate::StoreRegisterUnsafe for Cr0 {
    unsafe fn store_unsafe(self) {
        let cr0 = self.into_bits();
        // No `nomem`: toggling CD changes how every later access behaves.
        unsafe {
            core::arch::asm!("mov cr0, {}", in(reg) cr0, options(nostack, preserves_flags));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_match_the_32bit_constants() {
        assert_eq!(CACHE_ENABLE_MASK & 0xFFFF_FFFF, 0x9FFF_FFFF);
        assert_eq!(CACHE_DISABLE_MASK, 0x4000_0000);
        assert_eq!(CACHE_ENABLE_MASK >> 32, 0xFFFF_FFFF);
    }

    #[test]
    fn named_bits_line_up_with_masks() {
        let cr0 = Cr0::new()
            .with_cd_cache_disable(true)
            .with_nw_not_write_through(true);
        assert_eq!(cr0.into_bits(), CR0_CACHE_DISABLE | CR0_NOT_WRITE_THROUGH);
    }

    #[test]
    fn enabling_keeps_reserved_bits() {
        let cr0 = Cr0::from_bits(u64::MAX).with_caching_enabled();
        assert_eq!(cr0.into_bits(), 0xFFFF_FFFF_9FFF_FFFF);
        assert!(cr0.caching_enabled());
        assert!(!cr0.nw_not_write_through());
        assert!(cr0.pg_paging());
    }

    #[test]
    fn disabling_only_touches_cd() {
        let before = Cr0::from_bits(0x8000_0011);
        let after = before.with_caching_disabled();
        assert_eq!(after.into_bits(), 0xC000_0011);
        assert!(!after.caching_enabled());
        assert!(!after.nw_not_write_through());
    }
}
