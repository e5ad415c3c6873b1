use bitfield_struct::bitfield;

pub const LEAF_01H: u32 = 0x01;

/// CPUID.01H:EAX — version information, the "feature word".
///
/// Raw fields as laid out by the SDM; [`family`](Self::family) and
/// [`model`](Self::model) fold in the extended fields.
///
/// Reference: Intel SDM Vol. 2A, CPUID leaf 01H, EAX layout.
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct FeatureWord {
    /// Stepping ID (bits 3:0).
    #[bits(4)]
    pub stepping: u8,
    /// Base model (bits 7:4).
    #[bits(4)]
    pub base_model: u8,
    /// Base family (bits 11:8).
    #[bits(4)]
    pub base_family: u8,
    /// Processor type (bits 13:12).
    #[bits(2)]
    pub cpu_type: u8,
    #[bits(2)]
    _rsv14_15: u8,
    /// Extended model (bits 19:16).
    #[bits(4)]
    pub ext_model: u8,
    /// Extended family (bits 27:20).
    #[bits(8)]
    pub ext_family: u8,
    #[bits(4)]
    _rsv28_31: u8,
}

impl FeatureWord {
    /// Base family `0xF` escapes into the extended family field.
    pub const FAMILY_ESCAPE: u8 = 0x0F;

    /// First family whose model number is widened with the extended model.
    pub const EXTENDED_MODEL_FAMILY: u8 = 0x06;

    /// Effective family: `base + ext_family` when base is `0xF`, else base.
    ///
    /// The sum is kept in eight bits and wraps; no shipping part comes
    /// anywhere near.
    #[inline]
    #[must_use]
    pub const fn family(self) -> u8 {
        let base = self.base_family();
        if base == Self::FAMILY_ESCAPE {
            base.wrapping_add(self.ext_family())
        } else {
            base
        }
    }

    /// Effective model: `base_model | ext_model << 4` once the *effective*
    /// family is 6 or above, else just `base_model`.
    ///
    /// Decided on the family after the escape, so family `0xF + n` parts get
    /// their extended model bits too.
    #[inline]
    #[must_use]
    pub const fn model(self) -> u8 {
        let base = self.base_model();
        if self.family() >= Self::EXTENDED_MODEL_FAMILY {
            base | (self.ext_model() << 4)
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn word(ext_family: u32, ext_model: u32, family: u32, model: u32, stepping: u32) -> u32 {
        (ext_family << 20) | (ext_model << 16) | (family << 8) | (model << 4) | stepping
    }

    #[test]
    fn field_offsets() {
        let w = FeatureWord::from_bits(0x0FF3_3FFF);
        assert_eq!(w.stepping(), 0xF);
        assert_eq!(w.base_model(), 0xF);
        assert_eq!(w.base_family(), 0xF);
        assert_eq!(w.cpu_type(), 0x3);
        assert_eq!(w.ext_model(), 0x3);
        assert_eq!(w.ext_family(), 0xFF);
    }

    #[test]
    fn pentium_pro_class() {
        let w = FeatureWord::from_bits(0x0000_0673);
        assert_eq!(w.family(), 6);
        assert_eq!(w.model(), 7);
        assert_eq!(w.stepping(), 3);
    }

    #[test]
    fn family_escape_then_model_extension() {
        let w = FeatureWord::from_bits(word(0x04, 0x1, 0xF, 0x2, 0x5));
        assert_eq!(w.family(), 0x13);
        assert_eq!(w.model(), 0x12);
        assert_eq!(w.stepping(), 0x5);
    }

    #[test]
    fn ext_family_ignored_below_escape() {
        let w = FeatureWord::from_bits(word(0x0A, 0x9, 0x6, 0xE, 0xA));
        assert_eq!(w.family(), 6);
        assert_eq!(w.model(), 0x9E);
    }

    #[test]
    fn ext_model_ignored_below_family_6() {
        let w = FeatureWord::from_bits(word(0x00, 0x3, 0x5, 0x4, 0x1));
        assert_eq!(w.family(), 5);
        assert_eq!(w.model(), 0x4);
    }

    #[test]
    fn family_sum_wraps_in_eight_bits() {
        let w = FeatureWord::from_bits(word(0xFF, 0x2, 0xF, 0x1, 0x0));
        assert_eq!(w.family(), 0x0E);
        assert_eq!(w.model(), 0x21);
    }

    #[test]
    fn unescaped_families_exhaustive_over_model_fields() {
        for family in 0..=0xE_u32 {
            for model in 0..=0xF_u32 {
                for ext_model in [0x0_u32, 0x5, 0xF] {
                    let w = FeatureWord::from_bits(word(0xAB, ext_model, family, model, 0x7));
                    let f = u8::try_from(family).unwrap();
                    let m = u8::try_from(model).unwrap();
                    let em = u8::try_from(ext_model).unwrap();
                    assert_eq!(w.family(), f);
                    let expected = if f < 6 { m } else { m | (em << 4) };
                    assert_eq!(w.model(), expected);
                    assert_eq!(w.stepping(), 0x7);
                }
            }
        }
    }
}
