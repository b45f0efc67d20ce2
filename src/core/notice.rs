//! Notification intents emitted by queue mutations.
//!
//! Mutating operations never talk to the chat platform. They return a list of
//! [`Notice`] values describing who must be told what; the service routes each
//! notice to a user or channel ([`Envelope`]) and hands it to a notifier.

use serde::{Deserialize, Serialize};

use crate::util::clock::is_sunday;
use crate::util::types::{ChannelId, ChannelKind, Identity, IslandId, TenantId, UserId};

/// Why a visitor is being sent the dodo code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmitReason {
    /// Joined straight into a free slot.
    Joined,
    /// Slid into the window after someone ahead left.
    Promoted,
    /// Window grew to include them.
    WindowGrew,
    /// Owner replaced the code.
    CodeUpdated,
    /// Visitor asked for the code again.
    Resent,
}

/// Why an island was closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// Owner closed it.
    Owner,
    /// A tenant admin closed someone else's island.
    Admin(Identity),
    /// Sweep closed it after the maximum lifetime.
    Expired,
}

/// A notification intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    /// Visitor is inside the active window and gets the code.
    Admitted {
        /// Recipient.
        visitor: Identity,
        /// Island owner.
        owner: Identity,
        /// Island.
        island: IslandId,
        /// Current dodo code.
        code: String,
        /// Trigger.
        reason: AdmitReason,
    },
    /// Owner or admin removed the visitor by position.
    RemovedByOwner {
        /// Recipient.
        visitor: Identity,
        /// Island owner.
        owner: Identity,
        /// Island.
        island: IslandId,
    },
    /// Window shrank and the visitor is waiting again.
    WindowShrank {
        /// Recipient.
        visitor: Identity,
        /// Island owner.
        owner: Identity,
        /// Island.
        island: IslandId,
        /// New 1-based position.
        position: usize,
    },
    /// Sweep evicted the visitor after the tenant's time budget.
    TurnExpired {
        /// Recipient.
        visitor: Identity,
        /// Island owner.
        owner: Identity,
        /// Island.
        island: IslandId,
        /// Minutes spent active.
        minutes: u64,
    },
    /// Island opened for joins; announced to the tenant.
    QueueOpened {
        /// Owning tenant.
        tenant: TenantId,
        /// Island owner.
        owner: Identity,
        /// Island.
        island: IslandId,
        /// Turnip price, if any.
        price: Option<u32>,
        /// Active window size.
        admission_size: u8,
    },
    /// Island closed; announced to the tenant.
    QueueClosed {
        /// Owning tenant.
        tenant: TenantId,
        /// Island owner.
        owner: Identity,
        /// Island.
        island: IslandId,
        /// Turnip price, if any.
        price: Option<u32>,
        /// Visitors still in line, in queue order.
        remaining: Vec<Identity>,
        /// Trigger.
        reason: CloseReason,
    },
    /// Private note to the owner that the sweep closed their island.
    AutoClosed {
        /// Recipient.
        owner: Identity,
        /// Island.
        island: IslandId,
        /// Lifetime limit that was hit.
        max_age_hours: u64,
    },
}

/// Where a notice has to go before channel routing is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Private message to one user.
    Direct(UserId),
    /// Tenant broadcast channel of the given category.
    Channel(TenantId, ChannelKind),
}

/// Resolved delivery target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// Private message.
    User(UserId),
    /// Channel post.
    Channel(ChannelId),
}

/// A rendered notice ready for a notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Delivery target.
    pub target: Target,
    /// Message text.
    pub text: String,
}

impl Notice {
    /// Recipient category of this notice.
    pub fn audience(&self) -> Audience {
        match self {
            Self::Admitted { visitor, .. }
            | Self::RemovedByOwner { visitor, .. }
            | Self::WindowShrank { visitor, .. }
            | Self::TurnExpired { visitor, .. } => Audience::Direct(visitor.id),
            Self::AutoClosed { owner, .. } => Audience::Direct(owner.id),
            Self::QueueOpened { tenant, price, .. } | Self::QueueClosed { tenant, price, .. } => {
                Audience::Channel(*tenant, ChannelKind::for_price(*price))
            }
        }
    }

    /// Whether this notice hands out the dodo code.
    pub const fn is_admission(&self) -> bool {
        matches!(self, Self::Admitted { .. })
    }

    /// Render the human-readable text. `prefix` is the bot command prefix.
    pub fn render(&self, prefix: &str, now_ms: u128) -> String {
        match self {
            Self::Admitted {
                visitor,
                owner,
                island,
                code,
                reason,
            } => {
                let lead = match reason {
                    AdmitReason::CodeUpdated => format!(
                        "Hello {}, {} has a new Dodo code for their island.",
                        visitor.name, owner.name
                    ),
                    AdmitReason::Resent => format!(
                        "Hello {}, here is the Dodo code for {}'s island again.",
                        visitor.name, owner.name
                    ),
                    _ => format!(
                        "Hello {}, it's your turn to go to {}'s island!",
                        visitor.name, owner.name
                    ),
                };
                format!(
                    "{lead} Use the Dodo code '{code}' to fly, and be sure to message this bot with \
                     '{prefix}leave {island}' once you are done and completely off their island."
                )
            }
            Self::RemovedByOwner {
                visitor, owner, ..
            } => format!(
                "Hello {}, {} has removed you from their island queue, most likely due to you \
                 forgetting to leave the queue after finishing up on their island.",
                visitor.name, owner.name
            ),
            Self::WindowShrank {
                visitor,
                owner,
                position,
                ..
            } => format!(
                "Hello {}, {} has reduced the number of visitors allowed on their island. You are \
                 now at position {position} and will be messaged the Dodo code again when it's \
                 your turn.",
                visitor.name, owner.name
            ),
            Self::TurnExpired {
                visitor,
                owner,
                island,
                minutes,
            } => format!(
                "Hello {}, you have been removed from {}'s island queue after {minutes} minutes \
                 so others can have a turn. Use '{prefix}join {island}' to get back in line.",
                visitor.name, owner.name
            ),
            Self::QueueOpened {
                owner,
                island,
                price,
                admission_size,
                ..
            } => match price {
                Some(price) => {
                    let action = if is_sunday(now_ms) { "buy" } else { "sell" };
                    format!(
                        "{} has a queue to visit their island to {action} turnips for {price} \
                         bells! {admission_size} visitors at a time. Use '{prefix}join {island}' \
                         to be added to the queue!",
                        owner.name
                    )
                }
                None => format!(
                    "{} has a queue to visit their island! {admission_size} visitors at a time. \
                     Use '{prefix}join {island}' to be added to the queue!",
                    owner.name
                ),
            },
            Self::QueueClosed {
                owner,
                remaining,
                reason,
                ..
            } => {
                let mut text = match reason {
                    CloseReason::Owner => format!("{} has closed their island queue.", owner.name),
                    CloseReason::Admin(admin) => {
                        format!("{} has closed {}'s island queue.", admin.name, owner.name)
                    }
                    CloseReason::Expired => format!(
                        "{}'s island queue has been closed automatically.",
                        owner.name
                    ),
                };
                if !remaining.is_empty() {
                    text.push_str(" The following users were still in line:");
                    for (i, who) in remaining.iter().enumerate() {
                        text.push_str(&format!("\n{}: {}", i + 1, who.name));
                    }
                }
                text
            }
            Self::AutoClosed {
                owner,
                island,
                max_age_hours,
            } => format!(
                "Hello {}, your island queue {island} has been open for over {max_age_hours} \
                 hours and was closed automatically. Use '{prefix}create' to open a new one.",
                owner.name
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Identity {
        Identity::new(1, "Tom")
    }

    #[test]
    fn audience_follows_price() {
        let opened = Notice::QueueOpened {
            tenant: TenantId(9),
            owner: owner(),
            island: IslandId::new("123"),
            price: Some(500),
            admission_size: 3,
        };
        assert_eq!(
            opened.audience(),
            Audience::Channel(TenantId(9), ChannelKind::Turnip)
        );
        let admitted = Notice::Admitted {
            visitor: Identity::new(2, "Isabelle"),
            owner: owner(),
            island: IslandId::new("123"),
            code: "ABCDE".into(),
            reason: AdmitReason::Joined,
        };
        assert_eq!(admitted.audience(), Audience::Direct(UserId(2)));
        assert!(admitted.is_admission());
    }

    #[test]
    fn admitted_text_carries_code_and_leave_hint() {
        let text = Notice::Admitted {
            visitor: Identity::new(2, "Isabelle"),
            owner: owner(),
            island: IslandId::new("123"),
            code: "ABCDE".into(),
            reason: AdmitReason::Promoted,
        }
        .render("!", 0);
        assert!(text.contains("'ABCDE'"));
        assert!(text.contains("!leave island123"));
    }

    #[test]
    fn closed_text_lists_remaining() {
        let text = Notice::QueueClosed {
            tenant: TenantId(9),
            owner: owner(),
            island: IslandId::new("123"),
            price: None,
            remaining: vec![Identity::new(2, "A"), Identity::new(3, "B")],
            reason: CloseReason::Owner,
        }
        .render("!", 0);
        assert!(text.starts_with("Tom has closed their island queue."));
        assert!(text.ends_with("\n1: A\n2: B"));
    }
}
