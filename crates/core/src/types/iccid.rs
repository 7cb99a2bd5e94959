//! ICCID type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Iccid`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum IccidError {
    /// The input string is empty.
    #[error("ICCID cannot be empty")]
    Empty,
    /// The input has the wrong number of digits.
    #[error("ICCID should be {min}-{max} digits (got {len})")]
    BadLength {
        /// Minimum allowed digits.
        min: usize,
        /// Maximum allowed digits.
        max: usize,
        /// Length of the rejected input.
        len: usize,
    },
    /// The input contains a non-digit character.
    #[error("ICCID must contain only digits")]
    NonDigit,
}

/// An ICCID, the unique serial number of a SIM/eSIM profile.
///
/// ## Constraints
///
/// - 18 to 22 characters
/// - ASCII digits only
///
/// ## Examples
///
/// ```
/// use esim_global_core::Iccid;
///
/// assert!(Iccid::parse("8997250000012345678").is_ok());
///
/// assert!(Iccid::parse("").is_err());                 // empty
/// assert!(Iccid::parse("89972500").is_err());         // too short
/// assert!(Iccid::parse("89972500000123456x8").is_err()); // non-digit
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Iccid(String);

impl Iccid {
    /// Minimum number of digits in an ICCID.
    pub const MIN_DIGITS: usize = 18;
    /// Maximum number of digits in an ICCID.
    pub const MAX_DIGITS: usize = 22;

    /// Parse an `Iccid` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, is not 18-22 characters, or
    /// contains a character that is not an ASCII digit.
    pub fn parse(s: &str) -> Result<Self, IccidError> {
        if s.is_empty() {
            return Err(IccidError::Empty);
        }

        if s.len() < Self::MIN_DIGITS || s.len() > Self::MAX_DIGITS {
            return Err(IccidError::BadLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
                len: s.len(),
            });
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IccidError::NonDigit);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the ICCID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Iccid` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the last `n` digits, used for derived subscriber ids.
    #[must_use]
    pub fn tail(&self, n: usize) -> &str {
        let start = self.0.len().saturating_sub(n);
        self.0.get(start..).unwrap_or_default()
    }
}

impl fmt::Display for Iccid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Iccid {
    type Err = IccidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_lengths() {
        assert!(Iccid::parse("123456789012345678").is_ok()); // 18
        assert!(Iccid::parse("8997250000012345678").is_ok()); // 19
        assert!(Iccid::parse("1234567890123456789012").is_ok()); // 22
    }

    #[test]
    fn test_parse_rejects_bad_lengths() {
        assert!(Iccid::parse("12345678901234567").is_err()); // 17
        assert!(Iccid::parse("12345678901234567890123").is_err()); // 23
        assert!(Iccid::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_non_digits() {
        assert!(Iccid::parse("89972500000123456x8").is_err());
        assert!(Iccid::parse("8997 250000012345678").is_err());
    }

    #[test]
    fn test_tail() {
        let iccid = Iccid::parse("8997250000012345678").unwrap();
        assert_eq!(iccid.tail(6), "345678");
        assert_eq!(iccid.tail(100), "8997250000012345678");
    }

    #[test]
    fn test_serde_transparent() {
        let iccid = Iccid::parse("8997250000012345678").unwrap();
        let json = serde_json::to_string(&iccid).unwrap();
        assert_eq!(json, "\"8997250000012345678\"");
    }
}
