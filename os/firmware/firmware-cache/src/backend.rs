use firmware_registers::cr0::Cr0;

/// The privileged operations cache control is built from.
///
/// Each method maps 1:1 onto a single instruction. Implementations must not
/// reorder, merge or skip calls; the sequencing lives in
/// [`CacheController`](crate::CacheController).
pub trait CacheBackend {
    /// `mov reg, cr0`
    ///
    /// # Safety
    /// Requires CPL0.
    unsafe fn read_cr0(&mut self) -> Cr0;

    /// `mov cr0, reg`
    ///
    /// # Safety
    /// Requires CPL0. The value takes effect immediately; clearing PE or PG
    /// here is fatal.
    unsafe fn write_cr0(&mut self, value: Cr0);

    /// `INVD`: drop all cache contents without writing them back.
    ///
    /// # Safety
    /// Requires CPL0. Any dirty line is lost, so this is only sound before
    /// anything has been written through the cache.
    unsafe fn invd(&mut self);

    /// `WBINVD`: write back all dirty lines, then invalidate.
    ///
    /// # Safety
    /// Requires CPL0.
    unsafe fn wbinvd(&mut self);
}

impl<B> CacheBackend for &mut B
where
    B: CacheBackend + ?Sized,
{
    #[inline]
    unsafe fn read_cr0(&mut self) -> Cr0 {
        unsafe { (**self).read_cr0() }
    }

    #[inline]
    unsafe fn write_cr0(&mut self, value: Cr0) {
        unsafe { (**self).write_cr0(value) }
    }

    #[inline]
    unsafe fn invd(&mut self) {
        unsafe { (**self).invd() }
    }

    #[inline]
    unsafe fn wbinvd(&mut self) {
        unsafe { (**self).wbinvd() }
    }
}

/// The running processor.
#[cfg(target_arch = "x86_64")]
#[derive(Debug, Copy, Clone, Default)]
pub struct HardwareCache;

#[cfg(target_arch = "x86_64")]
impl CacheBackend for HardwareCache {
    #[inline]
    unsafe fn read_cr0(&mut self) -> Cr0 {
        use firmware_registers::LoadRegisterUnsafe;
        unsafe { Cr0::load_unsafe() }
    }

    #[inline]
    unsafe fn write_cr0(&mut self, value: Cr0) {
        use firmware_registers::StoreRegisterUnsafe;
        unsafe { value.store_unsafe() }
    }

    #[inline]
    unsafe fn invd(&mut self) {
        unsafe {
            core::arch::asm!("invd", options(nostack, preserves_flags));
        }
    }

    #[inline]
    unsafe fn wbinvd(&mut self) {
        unsafe {
            core::arch::asm!("wbinvd", options(nostack, preserves_flags));
        }
    }
}
