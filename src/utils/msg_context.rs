use serenity::model::channel::Message;
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};
use serenity::prelude::Context;

/// Where a command came from.
///
/// The author id is only used to answer the invoker (DM, role check); it is
/// never stored alongside an intention.
#[derive(Debug, Clone)]
pub struct MsgContextInfo {
    pub message_id: MessageId,
    pub channel_id: ChannelId,
    pub channel_name: Option<String>,
    pub guild_id: Option<GuildId>,
    pub author_id: UserId,
}

impl MsgContextInfo {
    /// Create a new MsgContextInfo from a Message
    pub async fn from_message(ctx: &Context, msg: &Message) -> Self {
        // Direct messages have no guild, and so no channel name worth checking
        let channel_name = match msg.guild_id {
            Some(_) => msg.channel_id.name(&ctx).await.ok(),
            None => None,
        };

        Self {
            message_id: msg.id,
            channel_id: msg.channel_id,
            channel_name,
            guild_id: msg.guild_id,
            author_id: msg.author.id,
        }
    }
}
