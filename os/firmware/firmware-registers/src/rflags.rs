use bitfield_struct::bitfield;

/// RFLAGS (the 64-bit EFLAGS).
///
/// Firmware mostly cares about [`id_cpuid`](Rflags::id_cpuid): a processor
/// that lets software flip bit 21 implements the CPUID instruction.
#[bitfield(u64, order = Lsb)]
#[derive(PartialEq, Eq)]
pub struct Rflags {
    /// Carry Flag
    pub cf_carry: bool, // 0

    /// Reads as 1.
    #[bits(default = true)]
    _always1: bool, // 1

    /// Parity Flag
    pub pf_parity: bool, // 2

    #[bits(default = false)]
    _rsvd3: bool, // 3

    /// Auxiliary carry (adjust) Flag
    pub af_adjust: bool, // 4

    #[bits(default = false)]
    _rsvd5: bool, // 5

    /// Zero Flag
    pub zf_zero: bool, // 6

    /// Sign Flag
    pub sf_sign: bool, // 7

    /// Trap Flag
    pub tf_trap: bool, // 8

    /// Interrupt Enable Flag
    pub if_interrupt_enable: bool, // 9

    /// Direction Flag
    pub df_direction: bool, // 10

    /// Overflow Flag
    pub of_overflow: bool, // 11

    /// I/O privilege level.
    #[bits(2)]
    pub iopl: u8, // 12–13

    /// Nested Task
    pub nt_nested: bool, // 14

    #[bits(default = false)]
    _rsvd15: bool, // 15

    /// Resume Flag
    pub rf_resume: bool, // 16

    /// Virtual-8086 mode.
    pub vm_virtual_8086: bool, // 17

    /// Alignment Check
    pub ac_alignment_check: bool, // 18

    /// Virtual Interrupt Flag
    pub vif_virtual_interrupt: bool, // 19

    /// Virtual Interrupt Pending
    pub vip_virtual_interrupt_pending: bool, // 20

    /// ID flag. Writable iff CPUID is implemented.
    pub id_cpuid: bool, // 21

    #[bits(42, default = 0)]
    _reserved_rest: u64,
}

#[cfg(all(feature = "asm", target_arch = "x86_64"))]
impl crate::LoadRegister for Rflags {
    #[inline]
    fn load() -> Self {
        let rflags: u64;
        unsafe {
            core::arch::asm!("pushfq", "pop {}", out(reg) rflags, options(nomem, preserves_flags));
        }
        Self::from_bits(rflags)
    }
}

/// Storing is unsafe even though `POPFQ` is legal in user mode: clearing IF
/// or setting DF/TF behind the compiler's back breaks the surrounding code.
#[cfg(all(feature = "asm", target_arch = "x86_64"))]
impl crate::StoreRegisterUnsafe for Rflags {
    #[inline]
    unsafe fn store_unsafe(self) {
        let rflags = self.into_bits();
        unsafe {
            core::arch::asm!("push {}", "popfq", in(reg) rflags, options(nomem));
        }
    }
}
