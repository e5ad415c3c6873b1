use crate::CacheBackend;
use firmware_registers::cr0::Cr0;
use log::{debug, trace};

/// Whether CR0.CD is currently clear.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CacheState {
    Enabled,
    Disabled,
}

impl From<Cr0> for CacheState {
    #[inline]
    fn from(cr0: Cr0) -> Self {
        if cr0.caching_enabled() {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }
}

/// Runs the cache enable/disable sequences against a [`CacheBackend`].
///
/// All methods are `unsafe` because they execute privileged instructions on a
/// real backend. They must only be called from the single boot context; the
/// controller does no locking.
#[derive(Debug)]
pub struct CacheController<B> {
    backend: B,
}

impl<B> CacheController<B>
where
    B: CacheBackend,
{
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    #[must_use]
    pub fn into_inner(self) -> B {
        self.backend
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Reads CR0 fresh from the backend.
    ///
    /// # Safety
    /// See [`CacheBackend::read_cr0`].
    #[inline]
    pub unsafe fn read_control(&mut self) -> Cr0 {
        unsafe { self.backend.read_cr0() }
    }

    /// Writes `value` to CR0 verbatim.
    ///
    /// # Safety
    /// See [`CacheBackend::write_cr0`].
    #[inline]
    pub unsafe fn write_control(&mut self, value: Cr0) {
        unsafe { self.backend.write_cr0(value) }
    }

    /// `INVD` — discards cache contents, dirty lines included.
    ///
    /// # Safety
    /// See [`CacheBackend::invd`].
    #[inline]
    pub unsafe fn invalidate(&mut self) {
        unsafe { self.backend.invd() }
    }

    /// `WBINVD` — writes back dirty lines, then invalidates.
    ///
    /// # Safety
    /// See [`CacheBackend::wbinvd`].
    #[inline]
    pub unsafe fn write_back_invalidate(&mut self) {
        unsafe { self.backend.wbinvd() }
    }

    /// Current cache state as reported by CR0.CD.
    ///
    /// # Safety
    /// See [`CacheBackend::read_cr0`].
    pub unsafe fn state(&mut self) -> CacheState {
        CacheState::from(unsafe { self.read_control() })
    }

    /// Clears CD and NW, leaving every other CR0 bit as it was.
    ///
    /// Nothing needs flushing: turning the cache on cannot lose data.
    ///
    /// # Safety
    /// Requires CPL0 on a real backend.
    pub unsafe fn enable(&mut self) {
        let cr0 = unsafe { self.read_control() };
        let enabled = cr0.with_caching_enabled();
        unsafe { self.write_control(enabled) };
        debug!(
            "cache enabled: CR0 {:#010x} -> {:#010x}",
            cr0.into_bits(),
            enabled.into_bits()
        );
    }

    /// Sets CD with a write-back-and-invalidate on either side of the CR0
    /// write.
    ///
    /// # Safety
    /// Requires CPL0 on a real backend. Memory must be coherent with the
    /// cache contents up to this call (no `INVD` in flight).
    pub unsafe fn disable(&mut self) {
        let cr0 = unsafe { self.read_control() };
        let disabled = cr0.with_caching_disabled();
        unsafe {
            self.write_back_invalidate();
            self.write_control(disabled);
            self.write_back_invalidate();
        }
        debug!(
            "cache disabled: CR0 {:#010x} -> {:#010x}",
            cr0.into_bits(),
            disabled.into_bits()
        );
    }

    /// Runs `f` with caching disabled.
    ///
    /// Caching is re-enabled afterwards only if it was on when this was
    /// called, so nesting is harmless.
    ///
    /// # Safety
    /// Same as [`disable`](Self::disable) and [`enable`](Self::enable).
    pub unsafe fn with_disabled<R>(&mut self, f: impl FnOnce() -> R) -> R {
        let before = unsafe { self.state() };
        trace!("entering cache-disabled section (was {before:?})");

        unsafe { self.disable() };
        let result = f();
        if before == CacheState::Enabled {
            unsafe { self.enable() };
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plain register cell; invalidation is a no-op.
    struct Cell(u64);

    impl CacheBackend for Cell {
        unsafe fn read_cr0(&mut self) -> Cr0 {
            Cr0::from_bits(self.0)
        }

        unsafe fn write_cr0(&mut self, value: Cr0) {
            self.0 = value.into_bits();
        }

        unsafe fn invd(&mut self) {}

        unsafe fn wbinvd(&mut self) {}
    }

    #[test]
    fn state_follows_cd() {
        let mut ctl = CacheController::new(Cell(0x8000_0011));
        assert_eq!(unsafe { ctl.state() }, CacheState::Enabled);

        let mut ctl = CacheController::new(Cell(0xC000_0011));
        assert_eq!(unsafe { ctl.state() }, CacheState::Disabled);
    }

    #[test]
    fn nw_alone_still_counts_as_enabled() {
        let mut ctl = CacheController::new(Cell(0x2000_0000));
        assert_eq!(unsafe { ctl.state() }, CacheState::Enabled);
        unsafe { ctl.enable() };
        assert_eq!(ctl.into_inner().0, 0);
    }

    #[test]
    fn borrowed_backend() {
        let mut cell = Cell(0x6000_0000);
        unsafe { CacheController::new(&mut cell).enable() };
        assert_eq!(cell.0, 0);
    }
}
