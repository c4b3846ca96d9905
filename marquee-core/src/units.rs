use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Byte count for memory budgets and disk usage.
///
/// Units are base-2 (KiB, MiB, GiB). Deserializes from either a plain
/// integer or a string such as `"64MiB"`.
#[derive(
    Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "ByteSizeRepr", into = "u64")]
pub struct ByteSize(u64);

impl ByteSize {
    pub const ZERO: Self = Self(0);
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    const GIB: u64 = 1024 * 1024 * 1024;

    pub const fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    pub fn from_usize(bytes: usize) -> Self {
        Self(u64::try_from(bytes).unwrap_or(u64::MAX))
    }

    pub const fn from_kib(kib: u64) -> Self {
        Self(kib.saturating_mul(Self::KIB))
    }

    pub const fn from_mib(mib: u64) -> Self {
        Self(mib.saturating_mul(Self::MIB))
    }

    pub const fn from_gib(gib: u64) -> Self {
        Self(gib.saturating_mul(Self::GIB))
    }

    pub const fn as_bytes(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes", self.0)
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0 as f64;
        if self.0 >= Self::GIB {
            write!(f, "{:.2} GiB", bytes / Self::GIB as f64)
        } else if self.0 >= Self::MIB {
            write!(f, "{:.1} MiB", bytes / Self::MIB as f64)
        } else if self.0 >= Self::KIB {
            write!(f, "{:.1} KiB", bytes / Self::KIB as f64)
        } else {
            write!(f, "{} B", self.0)
        }
    }
}

/// Error returned when a byte size string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseByteSizeError(String);

impl fmt::Display for ParseByteSizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid byte size {:?} (expected e.g. 512KiB, 64MiB, 1GiB)", self.0)
    }
}

impl std::error::Error for ParseByteSizeError {}

impl FromStr for ByteSize {
    type Err = ParseByteSizeError;

    /// Accepts a plain byte count or a number followed by `B`, `KiB`, `MiB`
    /// or `GiB` (case-insensitive, `K`/`M`/`G` shorthands allowed).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let split = raw
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(raw.len());
        let (digits, unit) = raw.split_at(split);
        let value: u64 = digits
            .parse()
            .map_err(|_| ParseByteSizeError(s.to_string()))?;

        let multiplier = match unit.trim().to_ascii_lowercase().as_str() {
            "" | "b" => 1,
            "k" | "kb" | "kib" => Self::KIB,
            "m" | "mb" | "mib" => Self::MIB,
            "g" | "gb" | "gib" => Self::GIB,
            _ => return Err(ParseByteSizeError(s.to_string())),
        };

        value
            .checked_mul(multiplier)
            .map(Self)
            .ok_or_else(|| ParseByteSizeError(s.to_string()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ByteSizeRepr {
    Bytes(u64),
    Text(String),
}

impl TryFrom<ByteSizeRepr> for ByteSize {
    type Error = ParseByteSizeError;

    fn try_from(value: ByteSizeRepr) -> Result<Self, Self::Error> {
        match value {
            ByteSizeRepr::Bytes(bytes) => Ok(Self(bytes)),
            ByteSizeRepr::Text(text) => text.parse(),
        }
    }
}

impl From<ByteSize> for u64 {
    fn from(size: ByteSize) -> Self {
        size.0
    }
}
