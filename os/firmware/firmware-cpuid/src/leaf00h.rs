use crate::{CpuVendor, CpuidResult, CpuidSource};
use core::fmt;

pub const LEAF_00H: u32 = 0x00;

/// CPUID.00H — highest basic leaf and vendor identification string.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Leaf00h {
    pub max_basic: u32,
    pub vendor_string: VendorString,
}

impl Leaf00h {
    #[must_use]
    pub fn read<C: CpuidSource + ?Sized>(cpu: &C) -> Self {
        Self::from(cpu.cpuid(LEAF_00H))
    }

    #[inline]
    #[must_use]
    pub const fn from(r: CpuidResult) -> Self {
        Self {
            max_basic: r.eax,
            vendor_string: VendorString::from_registers(r.ebx, r.edx, r.ecx),
        }
    }

    #[inline]
    #[must_use]
    pub const fn has_basic(&self, leaf: u32) -> bool {
        leaf <= self.max_basic
    }

    #[inline]
    #[must_use]
    pub fn vendor(&self) -> CpuVendor {
        self.vendor_string.vendor()
    }
}

/// The 12 vendor bytes, assembled in EBX, EDX, ECX order
/// (e.g. `GenuineIntel`, `AuthenticAMD`).
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct VendorString([u8; 12]);

impl VendorString {
    #[must_use]
    pub const fn from_registers(ebx: u32, edx: u32, ecx: u32) -> Self {
        let b = ebx.to_le_bytes();
        let d = edx.to_le_bytes();
        let c = ecx.to_le_bytes();
        Self([
            b[0], b[1], b[2], b[3], d[0], d[1], d[2], d[3], c[0], c[1], c[2], c[3],
        ])
    }

    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }

    #[inline]
    #[must_use]
    pub fn vendor(&self) -> CpuVendor {
        CpuVendor::from_vendor_bytes(&self.0)
    }
}

impl fmt::Debug for VendorString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VendorString({self})")
    }
}

impl fmt::Display for VendorString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = if b.is_ascii_graphic() || b == b' ' {
                char::from(b)
            } else {
                '.'
            };
            fmt::Write::write_char(f, c)?;
        }
        Ok(())
    }
}
