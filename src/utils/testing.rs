//! In-memory [`Platform`] used by the handler and scheduler tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};

use super::msg_context::MsgContextInfo;
use super::platform::{Platform, PlatformError, PlatformResult, PostedMessage};

pub const BOT_ID: UserId = UserId::new(1);
pub const GUILD: GuildId = GuildId::new(10);
pub const SOURCE: ChannelId = ChannelId::new(100);
pub const DISPLAY: ChannelId = ChannelId::new(101);
pub const RESUME: ChannelId = ChannelId::new(102);
pub const ELSEWHERE: ChannelId = ChannelId::new(103);

/// Every outbound effect the code under test produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Say(ChannelId, String),
    Transient(ChannelId, String),
    Embed(ChannelId, MessageId, String),
    Reaction(ChannelId, MessageId, String),
    Dm(UserId, String),
    Deleted(ChannelId, MessageId),
}

pub struct MockPlatform {
    guilds: Vec<GuildId>,
    channels: HashMap<(GuildId, String), ChannelId>,
    roles: HashMap<UserId, Vec<String>>,
    history: HashMap<ChannelId, Vec<PostedMessage>>,
    delete_failures: HashMap<MessageId, PlatformError>,
    failing_history: Vec<ChannelId>,
    channel_lookup_fails: bool,
    embed_fails: bool,
    effects: Mutex<Vec<Effect>>,
    next_id: AtomicU64,
}

impl MockPlatform {
    /// One guild carrying the three default channels
    pub fn new() -> Self {
        let mut channels = HashMap::new();
        channels.insert((GUILD, "postez-vos-intentions-anonymes".to_string()), SOURCE);
        channels.insert((GUILD, "intercessio".to_string()), DISPLAY);
        channels.insert((GUILD, "général".to_string()), RESUME);
        channels.insert((GUILD, "autre".to_string()), ELSEWHERE);

        Self {
            guilds: vec![GUILD],
            channels,
            roles: HashMap::new(),
            history: HashMap::new(),
            delete_failures: HashMap::new(),
            failing_history: Vec::new(),
            channel_lookup_fails: false,
            embed_fails: false,
            effects: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1000),
        }
    }

    pub fn with_guild(mut self, guild_id: GuildId, channels: &[(&str, ChannelId)]) -> Self {
        self.guilds.push(guild_id);
        for (name, channel_id) in channels {
            self.channels.insert((guild_id, name.to_string()), *channel_id);
        }
        self
    }

    /// Register a channel under `name`; the kind (text or announcement) is irrelevant here
    pub fn with_channel(mut self, guild_id: GuildId, name: &str, channel_id: ChannelId) -> Self {
        self.channels.insert((guild_id, name.to_string()), channel_id);
        self
    }

    pub fn without_channel(mut self, name: &str) -> Self {
        self.channels.retain(|(_, channel_name), _| channel_name != name);
        self
    }

    pub fn with_roles(mut self, user_id: UserId, roles: &[&str]) -> Self {
        let roles = roles.iter().map(|r| r.to_string()).collect();
        self.roles.insert(user_id, roles);
        self
    }

    pub fn with_history(mut self, channel_id: ChannelId, messages: &[(u64, UserId)]) -> Self {
        self.history.insert(
            channel_id,
            messages
                .iter()
                .map(|(id, author_id)| PostedMessage {
                    id: MessageId::new(*id),
                    author_id: *author_id,
                })
                .collect(),
        );
        self
    }

    pub fn failing_delete(mut self, message_id: u64, error: PlatformError) -> Self {
        self.delete_failures.insert(MessageId::new(message_id), error);
        self
    }

    pub fn failing_history(mut self, channel_id: ChannelId) -> Self {
        self.failing_history.push(channel_id);
        self
    }

    /// Every channel lookup fails as if Discord were unreachable
    pub fn failing_channel_lookup(mut self) -> Self {
        self.channel_lookup_fails = true;
        self
    }

    pub fn failing_embed(mut self) -> Self {
        self.embed_fails = true;
        self
    }

    pub fn effects(&self) -> Vec<Effect> {
        self.effects.lock().unwrap().clone()
    }

    /// Effects other than deletions, which most assertions don't care about
    pub fn messages(&self) -> Vec<Effect> {
        self.effects()
            .into_iter()
            .filter(|effect| !matches!(effect, Effect::Deleted(..)))
            .collect()
    }

    pub fn deleted(&self) -> Vec<MessageId> {
        self.effects()
            .into_iter()
            .filter_map(|effect| match effect {
                Effect::Deleted(_, id) => Some(id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, effect: Effect) {
        self.effects.lock().unwrap().push(effect);
    }

    fn next_message_id(&self) -> MessageId {
        MessageId::new(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl Platform for MockPlatform {
    fn current_user_id(&self) -> UserId {
        BOT_ID
    }

    fn guilds(&self) -> Vec<GuildId> {
        self.guilds.clone()
    }

    async fn find_text_channel(
        &self,
        guild_id: GuildId,
        name: &str,
    ) -> PlatformResult<Option<ChannelId>> {
        if self.channel_lookup_fails {
            return Err(PlatformError::Other("gateway timeout".to_string()));
        }
        Ok(self.channels.get(&(guild_id, name.to_string())).copied())
    }

    async fn member_role_names(&self, _guild_id: GuildId, user_id: UserId) -> Vec<String> {
        self.roles.get(&user_id).cloned().unwrap_or_default()
    }

    async fn say(&self, channel_id: ChannelId, content: &str) -> PlatformResult<MessageId> {
        self.record(Effect::Say(channel_id, content.to_string()));
        Ok(self.next_message_id())
    }

    async fn say_transient(
        &self,
        channel_id: ChannelId,
        content: &str,
        _lifetime: Duration,
    ) -> PlatformResult<()> {
        self.record(Effect::Transient(channel_id, content.to_string()));
        Ok(())
    }

    async fn send_embed(
        &self,
        channel_id: ChannelId,
        description: &str,
    ) -> PlatformResult<MessageId> {
        if self.embed_fails {
            return Err(PlatformError::Other("embed rejected".to_string()));
        }
        let id = self.next_message_id();
        self.record(Effect::Embed(channel_id, id, description.to_string()));
        Ok(id)
    }

    async fn react(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &str,
    ) -> PlatformResult<()> {
        self.record(Effect::Reaction(channel_id, message_id, emoji.to_string()));
        Ok(())
    }

    async fn dm(&self, user_id: UserId, content: &str) -> PlatformResult<()> {
        self.record(Effect::Dm(user_id, content.to_string()));
        Ok(())
    }

    async fn recent_messages(
        &self,
        channel_id: ChannelId,
        limit: u8,
    ) -> PlatformResult<Vec<PostedMessage>> {
        if self.failing_history.contains(&channel_id) {
            return Err(PlatformError::Other("history unavailable".to_string()));
        }
        Ok(self
            .history
            .get(&channel_id)
            .map(|messages| messages.iter().take(limit as usize).copied().collect())
            .unwrap_or_default())
    }

    async fn delete_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> PlatformResult<()> {
        if let Some(err) = self.delete_failures.get(&message_id) {
            return Err(err.clone());
        }
        self.record(Effect::Deleted(channel_id, message_id));
        Ok(())
    }
}

/// A command typed by `author` in `channel` of the test guild
pub fn invocation(channel_id: ChannelId, channel_name: &str, author: u64) -> MsgContextInfo {
    MsgContextInfo {
        message_id: MessageId::new(9000 + author),
        channel_id,
        channel_name: Some(channel_name.to_string()),
        guild_id: Some(GUILD),
        author_id: UserId::new(author),
    }
}

/// A command sent to the bot in a direct message
pub fn dm_invocation(author: u64) -> MsgContextInfo {
    MsgContextInfo {
        message_id: MessageId::new(9000 + author),
        channel_id: ChannelId::new(500),
        channel_name: None,
        guild_id: None,
        author_id: UserId::new(author),
    }
}
