//! Identifier value types: book serial numbers, borrower ids and loan ids.
//!
//! All three share the same shape: a fixed letter prefix followed by a
//! zero-padded decimal suffix. Values are validated when constructed, so a
//! malformed identifier never reaches the record collections.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Identifier made of a letter prefix and a numeric suffix
pub trait SequentialId: Sized + Clone + Ord {
    /// Human-readable name used in error messages
    const KIND: &'static str;
    const PREFIX: char;
    /// Number of suffix digits
    const WIDTH: usize;
    /// Largest suffix the format can hold
    const MAX: u32;

    /// Build the identifier for a suffix in `1..=MAX`
    fn from_number(number: u32) -> AppResult<Self>;

    /// Numeric suffix of this identifier
    fn number(&self) -> u32;
}

static SERIAL_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^B\d{4}$").expect("valid regex"));
static BORROWER_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^A\d{4}$").expect("valid regex"));
static LOAN_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^L\d{6}$").expect("valid regex"));

macro_rules! sequential_id {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal, $prefix:literal, $width:literal, $max:literal, $re:ident, $constraints:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub const MESSAGE_CONSTRAINTS: &'static str = $constraints;

            /// Parse and validate an identifier
            pub fn new(value: &str) -> AppResult<Self> {
                let value = value.trim();
                if $re.is_match(value) {
                    Ok(Self(value.to_string()))
                } else {
                    Err(AppError::Validation(Self::MESSAGE_CONSTRAINTS.to_string()))
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl SequentialId for $name {
            const KIND: &'static str = $kind;
            const PREFIX: char = $prefix;
            const WIDTH: usize = $width;
            const MAX: u32 = $max;

            fn from_number(number: u32) -> AppResult<Self> {
                if number == 0 || number > Self::MAX {
                    return Err(AppError::Validation(format!(
                        "{} suffix {} is outside 1..={}",
                        Self::KIND,
                        number,
                        Self::MAX
                    )));
                }
                Ok(Self(format!("{}{:0width$}", Self::PREFIX, number, width = Self::WIDTH)))
            }

            fn number(&self) -> u32 {
                // The regex guarantees an ASCII prefix followed by digits only
                self.0[1..].parse().unwrap_or(0)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = AppError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(&value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

sequential_id!(
    /// Book serial number, e.g. `B0001`
    SerialNumber,
    "serial number",
    'B',
    4,
    9999,
    SERIAL_NUMBER_RE,
    "Serial numbers should start with prefix \"B\", followed by 4 digits."
);

sequential_id!(
    /// Borrower id, e.g. `A0001`
    BorrowerId,
    "borrower id",
    'A',
    4,
    9999,
    BORROWER_ID_RE,
    "Borrower ids should start with prefix \"A\", followed by 4 digits."
);

sequential_id!(
    /// Loan id, e.g. `L000001`
    LoanId,
    "loan id",
    'L',
    6,
    999_999,
    LOAN_ID_RE,
    "Loan ids should start with prefix \"L\", followed by 6 digits."
);
