use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Stroops per XLM. Amounts entering contract calls are scaled by this.
pub const STROOP_SCALE: i128 = 10_000_000;

/// Rental term quoted to renters, in days.
pub const RENTAL_TERM_DAYS: u32 = 3;

macro_rules! address_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

address_newtype!(WalletAddress);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarStatus {
    Available,
    Rented,
    Maintenance,
    #[serde(other)]
    Unknown,
}

/// Visual weight of a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Positive,
    Info,
    Warning,
    Neutral,
}

impl CarStatus {
    pub fn tone(self) -> StatusTone {
        match self {
            CarStatus::Available => StatusTone::Positive,
            CarStatus::Rented => StatusTone::Info,
            CarStatus::Maintenance => StatusTone::Warning,
            CarStatus::Unknown => StatusTone::Neutral,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CarStatus::Available => "AVAILABLE",
            CarStatus::Rented => "RENTED",
            CarStatus::Maintenance => "MAINTENANCE",
            CarStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for CarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Owner,
    Renter,
    #[default]
    #[serde(other)]
    Anonymous,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("admin") {
            Ok(Role::Admin)
        } else if value.eq_ignore_ascii_case("owner") {
            Ok(Role::Owner)
        } else if value.eq_ignore_ascii_case("renter") {
            Ok(Role::Renter)
        } else if value.eq_ignore_ascii_case("anonymous") || value.is_empty() {
            Ok(Role::Anonymous)
        } else {
            Err(format!("unknown role '{value}'"))
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Admin => "admin",
            Role::Owner => "owner",
            Role::Renter => "renter",
            Role::Anonymous => "anonymous",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    pub brand: String,
    pub model: String,
    pub color: String,
    pub passengers: u32,
    pub ac: bool,
    pub owner_address: WalletAddress,
    pub price_per_day: i128,
    pub status: CarStatus,
}

/// The acting wallet and the role it is viewing the fleet as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub wallet: WalletAddress,
    pub role: Role,
}

impl Session {
    pub fn new(wallet: impl Into<WalletAddress>, role: Role) -> Self {
        Self {
            wallet: wallet.into(),
            role,
        }
    }
}

impl From<String> for WalletAddress {
    fn from(value: String) -> Self {
        Self(value)
    }
}
