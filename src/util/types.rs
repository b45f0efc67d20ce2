//! Shared identifier and identity types.
//!
//! External platform objects never enter the core: users, channels and tenants
//! are reduced to stable numeric keys, and a user additionally carries the
//! display name cached at the time it was seen.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Stable platform key of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Stable platform key of a text channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

/// Stable platform key of a tenant (guild/community).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenantId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user:{}", self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channel:{}", self.0)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tenant:{}", self.0)
    }
}

/// A user key plus the display name used when rendering messages.
///
/// Equality and hashing only consider the key, so a renamed user is still the
/// same visitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// Platform key.
    pub id: UserId,
    /// Cached display name.
    pub name: String,
}

impl Identity {
    /// Build an identity from a raw key and display name.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: UserId(id),
            name: name.into(),
        }
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Identity {}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Prefix users type in front of an island id, e.g. `island042`.
pub const ISLAND_ID_PREFIX: &str = "island";

/// Short numeric identifier of an island, unique across the directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IslandId(String);

impl IslandId {
    /// Wrap an already formatted numeric id.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Resolve what a user typed (`042` or `island042`) into an id.
    ///
    /// Returns `None` when the remainder is empty or not all digits.
    pub fn from_reference(reference: &str) -> Option<Self> {
        let trimmed = reference.trim();
        let digits = trimmed.strip_prefix(ISLAND_ID_PREFIX).unwrap_or(trimmed);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self(digits.to_string()))
    }

    /// Raw digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IslandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ISLAND_ID_PREFIX}{}", self.0)
    }
}

/// Broadcast channel category a tenant routes announcements to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Priced islands (turnip sales).
    Turnip,
    /// Everything else.
    General,
}

impl ChannelKind {
    /// Category an island with the given price announces to.
    pub const fn for_price(price: Option<u32>) -> Self {
        match price {
            Some(_) => Self::Turnip,
            None => Self::General,
        }
    }
}
