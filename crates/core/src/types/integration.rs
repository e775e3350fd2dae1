//! Integration selectors chosen by deployment configuration.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when an integration selector is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} integration: {value}")]
pub struct IntegrationParseError {
    /// Which selector was being parsed.
    pub kind: &'static str,
    /// The rejected value.
    pub value: String,
}

/// Electronic-commerce platform backing the e-commerce facet.
///
/// Exactly one platform is active per deployment, and only its
/// platform-specific facet is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EcommercePlatform {
    Commerce7,
    Shopify,
}

impl FromStr for EcommercePlatform {
    type Err = IntegrationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "commerce7" | "commerce_seven" | "commerceseven" => Ok(Self::Commerce7),
            "shopify" => Ok(Self::Shopify),
            _ => Err(IntegrationParseError {
                kind: "e-commerce",
                value: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for EcommercePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Commerce7 => write!(f, "Commerce7"),
            Self::Shopify => write!(f, "Shopify"),
        }
    }
}

/// Reservation platform backing the booking facet.
///
/// Platforms expose different optional reservation attributes, see
/// [`BookingPlatform::has_service_name`] and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingPlatform {
    OpenTable,
    NowBookIt,
    SevenRooms,
}

impl BookingPlatform {
    /// Platforms that report a service (sitting) name.
    #[must_use]
    pub const fn has_service_name(self) -> bool {
        matches!(self, Self::OpenTable | Self::NowBookIt)
    }

    /// Platforms that flag VIP reservations.
    #[must_use]
    pub const fn has_vip_flag(self) -> bool {
        matches!(self, Self::SevenRooms)
    }

    /// Platforms that report a reservation duration.
    #[must_use]
    pub const fn has_duration(self) -> bool {
        matches!(self, Self::SevenRooms | Self::NowBookIt)
    }
}

impl FromStr for BookingPlatform {
    type Err = IntegrationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "opentable" => Ok(Self::OpenTable),
            "nowbookit" => Ok(Self::NowBookIt),
            "sevenrooms" => Ok(Self::SevenRooms),
            _ => Err(IntegrationParseError {
                kind: "booking",
                value: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for BookingPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenTable => write!(f, "OpenTable"),
            Self::NowBookIt => write!(f, "NowBookIt"),
            Self::SevenRooms => write!(f, "SevenRooms"),
        }
    }
}
