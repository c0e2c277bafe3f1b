//! The slice of Discord the bot talks to.
//!
//! Command handlers and the digest scheduler only go through [`Platform`], so
//! they can run against the serenity client in production and against an
//! in-memory double in tests.

use std::time::Duration;

use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};

/// Failure of a single Discord operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    /// The bot lacks the permission for this operation
    #[error("missing permissions")]
    Forbidden,

    #[error("{0}")]
    Other(String),
}

pub type PlatformResult<T> = Result<T, PlatformError>;

/// A message read back from channel history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostedMessage {
    pub id: MessageId,
    pub author_id: UserId,
}

#[async_trait]
pub trait Platform: Send + Sync {
    /// The bot's own user
    fn current_user_id(&self) -> UserId;

    /// Guilds the bot is currently connected to
    fn guilds(&self) -> Vec<GuildId>;

    /// Find a text or announcement channel of the guild by its exact name.
    /// `Ok(None)` means the guild has no such channel.
    async fn find_text_channel(
        &self,
        guild_id: GuildId,
        name: &str,
    ) -> PlatformResult<Option<ChannelId>>;

    /// Names of the roles the member holds in the guild
    async fn member_role_names(&self, guild_id: GuildId, user_id: UserId) -> Vec<String>;

    async fn say(&self, channel_id: ChannelId, content: &str) -> PlatformResult<MessageId>;

    /// Send a notice that deletes itself after `lifetime`
    async fn say_transient(
        &self,
        channel_id: ChannelId,
        content: &str,
        lifetime: Duration,
    ) -> PlatformResult<()>;

    /// Send an embed carrying only a description, without author attribution
    async fn send_embed(
        &self,
        channel_id: ChannelId,
        description: &str,
    ) -> PlatformResult<MessageId>;

    async fn react(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &str,
    ) -> PlatformResult<()>;

    /// Send a private message to the user
    async fn dm(&self, user_id: UserId, content: &str) -> PlatformResult<()>;

    /// Most recent messages of the channel, newest first, at most `limit`
    async fn recent_messages(
        &self,
        channel_id: ChannelId,
        limit: u8,
    ) -> PlatformResult<Vec<PostedMessage>>;

    async fn delete_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> PlatformResult<()>;
}
