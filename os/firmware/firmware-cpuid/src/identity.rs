use crate::{CpuVendor, CpuidSource, FeatureWord, LEAF_01H, Leaf00h};
use core::fmt;

/// Who made the processor and which family/model/stepping it reports.
///
/// This is the record board code keeps around after bring-up. Every field
/// is decoded up front; there is no partially filled state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CpuIdentity {
    /// Effective family (base family plus extended family on the `0xF` escape).
    pub family: u8,
    pub vendor: CpuVendor,
    /// Effective model (extended model folded in from family 6 upwards).
    pub model: u8,
    pub stepping: u8,
}

impl CpuIdentity {
    /// Decodes a `CPUID.01H:EAX` feature word. The vendor comes from elsewhere,
    /// usually [`Leaf00h::vendor`].
    #[must_use]
    pub const fn decode(feature_word: u32, vendor: CpuVendor) -> Self {
        let word = FeatureWord::from_bits(feature_word);
        Self {
            family: word.family(),
            vendor,
            model: word.model(),
            stepping: word.stepping(),
        }
    }

    /// Queries leaf 0 for the vendor and leaf 1 for the feature word, then
    /// decodes both.
    ///
    /// Leaf 1 is issued even if leaf 0 claims it is unsupported; whatever the
    /// processor answers is what gets decoded.
    #[must_use]
    pub fn query<C: CpuidSource + ?Sized>(cpu: &C) -> Self {
        let leaf0 = Leaf00h::read(cpu);
        if !leaf0.has_basic(LEAF_01H) {
            log::debug!(
                "CPUID max basic leaf is {:#x}; reading leaf 1 anyway",
                leaf0.max_basic
            );
        }

        let identity = Self::decode(cpu.cpuid_eax(LEAF_01H), leaf0.vendor());
        log::debug!("{} ({})", identity, leaf0.vendor_string);
        identity
    }
}

impl fmt::Display for CpuIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} family {:#04x} model {:#04x} stepping {:#x}",
            self.vendor, self.family, self.model, self.stepping
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_keeps_supplied_vendor() {
        let id = CpuIdentity::decode(0x0000_0673, CpuVendor::Cyrix);
        assert_eq!(
            id,
            CpuIdentity {
                family: 6,
                vendor: CpuVendor::Cyrix,
                model: 7,
                stepping: 3,
            }
        );
    }

    #[test]
    fn decode_escaped_family() {
        // family 0xF + 0x04, model 0x2 | 0x1 << 4, stepping 5
        let id = CpuIdentity::decode(0x0041_0F25, CpuVendor::Amd);
        assert_eq!(id.family, 0x13);
        assert_eq!(id.model, 0x12);
        assert_eq!(id.stepping, 0x5);
    }

    #[test]
    fn display() {
        let id = CpuIdentity::decode(0x0009_06EA, CpuVendor::Intel);
        assert_eq!(id.to_string(), "Intel family 0x06 model 0x9e stepping 0xa");
    }
}
