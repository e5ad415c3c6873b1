use core::fmt;

/// Processor vendor tag as consumed by board code.
///
/// The discriminants are fixed: `0` is invalid, `1..=10` name a vendor and
/// `0xFF` means the vendor string was not recognized.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum CpuVendor {
    #[default]
    Invalid = 0,
    Intel = 1,
    Cyrix = 2,
    Amd = 3,
    Umc = 4,
    NexGen = 5,
    Centaur = 6,
    Rise = 7,
    Transmeta = 8,
    Nsc = 9,
    Sis = 10,
    Unknown = 0xFF,
}

/// A byte that is not one of the [`CpuVendor`] discriminants.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid CPU vendor tag {0:#04x}")]
pub struct InvalidVendorTag(pub u8);

impl CpuVendor {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Invalid => "Invalid",
            Self::Intel => "Intel",
            Self::Cyrix => "Cyrix",
            Self::Amd => "AMD",
            Self::Umc => "UMC",
            Self::NexGen => "NexGen",
            Self::Centaur => "Centaur",
            Self::Rise => "Rise",
            Self::Transmeta => "Transmeta",
            Self::Nsc => "NSC",
            Self::Sis => "SiS",
            Self::Unknown => "Unknown",
        }
    }

    /// Maps a 12-byte CPUID vendor string to its tag.
    #[must_use]
    pub fn from_vendor_bytes(bytes: &[u8; 12]) -> Self {
        match bytes {
            b"GenuineIntel" => Self::Intel,
            b"CyrixInstead" => Self::Cyrix,
            b"AuthenticAMD" | b"AMDisbetter!" => Self::Amd,
            b"UMC UMC UMC " => Self::Umc,
            b"NexGenDriven" => Self::NexGen,
            b"CentaurHauls" => Self::Centaur,
            b"RiseRiseRise" => Self::Rise,
            b"GenuineTMx86" | b"TransmetaCPU" => Self::Transmeta,
            b"Geode by NSC" => Self::Nsc,
            b"SiS SiS SiS " => Self::Sis,
            _ => Self::Unknown,
        }
    }
}

impl From<CpuVendor> for u8 {
    #[inline]
    fn from(vendor: CpuVendor) -> Self {
        vendor as u8
    }
}

impl TryFrom<u8> for CpuVendor {
    type Error = InvalidVendorTag;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Ok(match tag {
            0 => Self::Invalid,
            1 => Self::Intel,
            2 => Self::Cyrix,
            3 => Self::Amd,
            4 => Self::Umc,
            5 => Self::NexGen,
            6 => Self::Centaur,
            7 => Self::Rise,
            8 => Self::Transmeta,
            9 => Self::Nsc,
            10 => Self::Sis,
            0xFF => Self::Unknown,
            other => return Err(InvalidVendorTag(other)),
        })
    }
}

impl fmt::Display for CpuVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
