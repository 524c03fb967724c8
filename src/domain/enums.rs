// src/domain/enums.rs

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a raw string is not one of an enumeration's accepted values.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownVariant {
    pub value: String,
    pub expected: &'static [&'static str],
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid value '{}'. Expected one of: {}",
            self.value,
            self.expected.join(", ")
        )
    }
}

impl std::error::Error for UnknownVariant {}

// Generates a closed enumeration whose wire value is the variant name.
// Each variant carries its display label; `ALL` keeps declaration order.
macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:expr),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            pub const NAMES: &'static [&'static str] = &[$(stringify!($variant)),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($variant) => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        value: s.to_string(),
                        expected: $name::NAMES,
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let s = value.as_str()?;
                s.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

closed_enum!(City {
    Chandigarh => "Chandigarh",
    Mohali => "Mohali",
    Zirakpur => "Zirakpur",
    Panchkula => "Panchkula",
    Other => "Other",
});

closed_enum!(
    PropertyType {
        Apartment => "Apartment",
        Villa => "Villa",
        Plot => "Plot",
        Office => "Office",
        Retail => "Retail",
    }
);

closed_enum!(Bhk {
    Studio => "Studio",
    One => "1 BHK",
    Two => "2 BHK",
    Three => "3 BHK",
    Four => "4 BHK",
});

closed_enum!(Purpose {
    Buy => "Buy",
    Rent => "Rent",
});

closed_enum!(Timeline {
    ZeroToThree => "0-3 months",
    ThreeToSix => "3-6 months",
    MoreThanSix => "More than 6 months",
    Exploring => "Exploring",
});

closed_enum!(Source {
    Website => "Website",
    Referral => "Referral",
    WalkIn => "Walk-in",
    Call => "Call",
    Other => "Other",
});

closed_enum!(Status {
    New => "New",
    Qualified => "Qualified",
    Contacted => "Contacted",
    Visited => "Visited",
    Negotiation => "Negotiation",
    Converted => "Converted",
    Dropped => "Dropped",
});

// Defaults substituted by the import schema when a column is blank.
impl Default for City {
    fn default() -> Self {
        City::Chandigarh
    }
}

impl Default for PropertyType {
    fn default() -> Self {
        PropertyType::Apartment
    }
}

impl Default for Purpose {
    fn default() -> Self {
        Purpose::Buy
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Timeline::Exploring
    }
}

impl Default for Source {
    fn default() -> Self {
        Source::Other
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::New
    }
}

impl PropertyType {
    /// Property types for which the interactive form requires a BHK value.
    pub fn requires_bhk(self) -> bool {
        matches!(self, PropertyType::Apartment | PropertyType::Villa)
    }
}
