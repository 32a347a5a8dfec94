//! Access gating: decides whether a given (origin, caller) may trigger
//! work.
//!
//! Pure decision logic over read-only configuration: no side effects,
//! nothing persisted. Direct messages and group scopes deliberately use
//! opposite defaults: an empty DM allow-set denies all direct messages
//! (explicit opt-in), while empty guild/channel allow-sets permit every
//! guild/channel (opt-out model).

use std::collections::HashSet;

use crate::types::{CallerId, ChannelId, GuildId};

/// The conversational context a trigger arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginScope {
    /// A one-on-one conversation with the bot.
    DirectMessage,
    /// A channel inside a group/server.
    Guild(GuildId),
}

/// Which restriction category decided the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restriction {
    /// Decided by the direct-message caller allow-set.
    DirectMessage,
    /// Decided by the guild allow-set.
    Guild,
    /// Decided by the channel allow-set.
    Channel,
    /// No allow-set applied; everything was permitted.
    Unrestricted,
}

/// Outcome of one access check. Computed fresh per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDecision {
    pub allowed: bool,
    pub restriction: Restriction,
}

/// Configured allow-sets, loaded once at startup and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct AccessConfig {
    /// Guilds permitted to trigger work; empty means all guilds.
    pub allowed_guilds: HashSet<GuildId>,
    /// Channels permitted to trigger work; empty means all channels.
    pub allowed_channels: HashSet<ChannelId>,
    /// Callers permitted to trigger work from direct messages; empty
    /// means direct messages are denied entirely.
    pub allowed_dm_callers: HashSet<CallerId>,
}

impl AccessConfig {
    /// Decide whether `caller` may trigger work from the given scope.
    pub fn is_allowed(
        &self,
        origin: OriginScope,
        channel: ChannelId,
        caller: CallerId,
    ) -> AccessDecision {
        match origin {
            OriginScope::DirectMessage => AccessDecision {
                allowed: self.allowed_dm_callers.contains(&caller),
                restriction: Restriction::DirectMessage,
            },
            OriginScope::Guild(guild) => {
                if !self.allowed_guilds.is_empty() && !self.allowed_guilds.contains(&guild) {
                    return AccessDecision {
                        allowed: false,
                        restriction: Restriction::Guild,
                    };
                }
                if !self.allowed_channels.is_empty() && !self.allowed_channels.contains(&channel) {
                    return AccessDecision {
                        allowed: false,
                        restriction: Restriction::Channel,
                    };
                }
                let restriction = if !self.allowed_guilds.is_empty() {
                    Restriction::Guild
                } else if !self.allowed_channels.is_empty() {
                    Restriction::Channel
                } else {
                    Restriction::Unrestricted
                };
                AccessDecision {
                    allowed: true,
                    restriction,
                }
            }
        }
    }
}
