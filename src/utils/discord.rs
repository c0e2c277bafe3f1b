use std::sync::Arc;
use std::time::Duration;

use serenity::async_trait;
use serenity::builder::{CreateEmbed, CreateMessage, GetMessages};
use serenity::cache::Cache;
use serenity::http::{Http, HttpError};
use serenity::model::Colour;
use serenity::model::ModelError;
use serenity::model::channel::{ChannelType, ReactionType};
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};
use serenity::prelude::Context;

use super::platform::{Platform, PlatformError, PlatformResult, PostedMessage};

impl From<serenity::Error> for PlatformError {
    fn from(err: serenity::Error) -> Self {
        match &err {
            serenity::Error::Http(HttpError::UnsuccessfulRequest(response))
                if response.status_code.as_u16() == 403 =>
            {
                PlatformError::Forbidden
            }
            serenity::Error::Model(ModelError::InvalidPermissions { .. }) => {
                PlatformError::Forbidden
            }
            _ => PlatformError::Other(err.to_string()),
        }
    }
}

/// Channels people can post in: plain text and announcement channels
fn is_text_channel(kind: ChannelType) -> bool {
    matches!(kind, ChannelType::Text | ChannelType::News)
}

/// [`Platform`] backed by the serenity HTTP client and gateway cache
#[derive(Clone)]
pub struct SerenityPlatform {
    http: Arc<Http>,
    cache: Arc<Cache>,
}

impl SerenityPlatform {
    pub fn new(http: Arc<Http>, cache: Arc<Cache>) -> Self {
        Self { http, cache }
    }

    pub fn from_context(ctx: &Context) -> Self {
        Self::new(ctx.http.clone(), ctx.cache.clone())
    }
}

#[async_trait]
impl Platform for SerenityPlatform {
    fn current_user_id(&self) -> UserId {
        self.cache.current_user().id
    }

    fn guilds(&self) -> Vec<GuildId> {
        self.cache.guilds()
    }

    async fn find_text_channel(
        &self,
        guild_id: GuildId,
        name: &str,
    ) -> PlatformResult<Option<ChannelId>> {
        let channels = guild_id.channels(&self.http).await?;
        Ok(channels
            .into_values()
            .find(|channel| is_text_channel(channel.kind) && channel.name == name)
            .map(|channel| channel.id))
    }

    async fn member_role_names(&self, guild_id: GuildId, user_id: UserId) -> Vec<String> {
        let member = match guild_id.member(&self.http, user_id).await {
            Ok(member) => member,
            Err(err) => {
                tracing::error!("Failed to get member: {}", err);
                return Vec::new();
            }
        };

        match guild_id.roles(&self.http).await {
            Ok(all_roles) => all_roles
                .into_iter()
                .filter(|(role_id, _)| member.roles.contains(role_id))
                .map(|(_, role)| role.name)
                .collect(),
            Err(err) => {
                tracing::error!("Failed to fetch guild roles: {}", err);
                Vec::new()
            }
        }
    }

    async fn say(&self, channel_id: ChannelId, content: &str) -> PlatformResult<MessageId> {
        let message = channel_id.say(&self.http, content).await?;
        Ok(message.id)
    }

    async fn say_transient(
        &self,
        channel_id: ChannelId,
        content: &str,
        lifetime: Duration,
    ) -> PlatformResult<()> {
        let message = channel_id.say(&self.http, content).await?;

        let http = self.http.clone();
        tokio::spawn(async move {
            tokio::time::sleep(lifetime).await;
            if let Err(err) = channel_id.delete_message(&http, message.id).await {
                tracing::debug!("Failed to remove notice {}: {}", message.id, err);
            }
        });

        Ok(())
    }

    async fn send_embed(
        &self,
        channel_id: ChannelId,
        description: &str,
    ) -> PlatformResult<MessageId> {
        let embed = CreateEmbed::new()
            .description(description)
            .colour(Colour::BLUE);
        let message = channel_id
            .send_message(&self.http, CreateMessage::new().embed(embed))
            .await?;
        Ok(message.id)
    }

    async fn react(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &str,
    ) -> PlatformResult<()> {
        channel_id
            .create_reaction(
                &self.http,
                message_id,
                ReactionType::Unicode(emoji.to_string()),
            )
            .await?;
        Ok(())
    }

    async fn dm(&self, user_id: UserId, content: &str) -> PlatformResult<()> {
        user_id
            .direct_message(&self.http, CreateMessage::new().content(content))
            .await?;
        Ok(())
    }

    async fn recent_messages(
        &self,
        channel_id: ChannelId,
        limit: u8,
    ) -> PlatformResult<Vec<PostedMessage>> {
        tracing::debug!(channel_id = %channel_id, limit = %limit, "Fetching channel history");

        let messages = channel_id
            .messages(&self.http, GetMessages::new().limit(limit))
            .await?;

        Ok(messages
            .into_iter()
            .map(|message| PostedMessage {
                id: message.id,
                author_id: message.author.id,
            })
            .collect())
    }

    async fn delete_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> PlatformResult<()> {
        channel_id.delete_message(&self.http, message_id).await?;
        Ok(())
    }
}
