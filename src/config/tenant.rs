//! Persisted per-tenant settings row.

use serde::{Deserialize, Deserializer, Serialize};

use crate::util::types::ChannelId;

/// Visitor timeout applied when a tenant has no stored value.
pub const DEFAULT_VISITOR_TIMEOUT_MINUTES: u64 = 30;

/// One configuration row per tenant.
///
/// Column names match the external store (`TurnipChannel`, `GeneralChannel`,
/// `Timeout`); every column is nullable and a null timeout reads as the
/// default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantSettings {
    /// Channel for priced (turnip) island announcements.
    #[serde(rename = "TurnipChannel", default)]
    pub turnip_channel: Option<ChannelId>,
    /// Channel for all other island announcements.
    #[serde(rename = "GeneralChannel", default)]
    pub general_channel: Option<ChannelId>,
    /// Minutes an active visitor may hold a slot.
    #[serde(
        rename = "Timeout",
        default = "default_timeout",
        deserialize_with = "null_as_default_timeout"
    )]
    pub timeout_minutes: u64,
}

const fn default_timeout() -> u64 {
    DEFAULT_VISITOR_TIMEOUT_MINUTES
}

fn null_as_default_timeout<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(DEFAULT_VISITOR_TIMEOUT_MINUTES))
}

impl TenantSettings {
    /// Settings with no channels and the given timeout.
    pub const fn with_timeout(timeout_minutes: u64) -> Self {
        Self {
            turnip_channel: None,
            general_channel: None,
            timeout_minutes,
        }
    }
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_VISITOR_TIMEOUT_MINUTES)
    }
}
