use itertools::Itertools;

use crate::msg_context::MsgContextInfo;
use crate::platform::{Platform, PlatformError};
use crate::service::Intercessio;

/// Reaction added under every republished intention
pub const PRAYER_REACTION: &str = "🙏";

/// How many messages of the intentions channel a purge looks at
const PURGE_HISTORY_LIMIT: u8 = 100;

const NO_INTENTIONS: &str = "📭 Aucune intention n'a été partagée aujourd'hui.";
const INTENTIONS_HEADER: &str = "📋 Intentions partagées aujourd'hui :";
const PERMISSION_DENIED: &str = "⛔ Tu n'as pas les permissions pour cette commande.";
const DELETE_FORBIDDEN: &str = "⚠️ Je n'ai pas la permission de supprimer certains messages.";
const PURGE_DONE: &str = "✅ Intentions du jour effacées.";
const MISSING_DISPLAY_CHANNEL: &str = "⛔ Le salon d'intentions n'existe pas.";
const DISCORD_UNAVAILABLE: &str = "⛔ Discord ne répond pas, réessaie dans un instant.";

/// Enum representing the commands the bot understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Submit an intention anonymously
    Pray(String),
    /// Receive today's intentions by DM
    Intention,
    /// Clear today's intentions and the bot's posts (admin only)
    Purge,
    Help,
}

/// Parse a message to check if it contains a command
pub fn parse_command(prefix: &str, content: &str) -> Option<Command> {
    let rest = content.trim_start().strip_prefix(prefix)?;
    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    match name {
        "prier" => Some(Command::Pray(args.to_string())),
        "intention" => Some(Command::Intention),
        "purge" => Some(Command::Purge),
        "help" => Some(Command::Help),
        _ => None,
    }
}

/// Process a command if present in the message. Returns whether one was handled.
pub async fn process_command(
    platform: &impl Platform,
    bot: &Intercessio,
    msg_ctx: &MsgContextInfo,
    content: &str,
) -> bool {
    let Some(command) = parse_command(&bot.config().prefix, content) else {
        if content.starts_with(&bot.config().prefix) {
            tracing::debug!(
                "Ignoring unknown command in channel {}",
                msg_ctx.channel_id
            );
        }
        return false;
    };

    match command {
        Command::Pray(text) => handle_pray_command(platform, bot, msg_ctx, text).await,
        Command::Intention => handle_intention_command(platform, bot, msg_ctx).await,
        Command::Purge => handle_purge_command(platform, bot, msg_ctx).await,
        Command::Help => handle_help_command(platform, bot, msg_ctx).await,
    }

    true
}

/// Bulleted list of intentions under the daily header
pub fn format_intentions(intentions: &[String]) -> String {
    let lines = intentions.iter().map(|t| format!("- {t}")).join("\n");
    format!("{INTENTIONS_HEADER}\n{lines}")
}

/// Text of the anonymous embed posted for a new intention
pub fn format_announcement(text: &str) -> String {
    format!(
        "🙏 Nouvelle intention de prière :\n> {text}\n\n\
         N'hésitez pas à porter cette intention dans votre prière."
    )
}

async fn notify_transient(
    platform: &impl Platform,
    bot: &Intercessio,
    msg_ctx: &MsgContextInfo,
    notice: &str,
) {
    if let Err(e) = platform
        .say_transient(msg_ctx.channel_id, notice, bot.config().notice_lifetime)
        .await
    {
        tracing::error!("Failed to send notice: {e}");
    }
}

async fn notify(platform: &impl Platform, msg_ctx: &MsgContextInfo, notice: &str) {
    if let Err(e) = platform.say(msg_ctx.channel_id, notice).await {
        tracing::error!("Failed to send message: {e}");
    }
}

/// Handles `prier <text>`: republish the intention anonymously
async fn handle_pray_command(
    platform: &impl Platform,
    bot: &Intercessio,
    msg_ctx: &MsgContextInfo,
    text: String,
) {
    let config = bot.config();

    if text.is_empty() {
        let prefix = &config.prefix;
        let usage = format!("⛔ Utilisation : `{prefix}prier <ton intention>`");
        notify_transient(platform, bot, msg_ctx, &usage).await;
        return;
    }

    // The original message goes away whatever happens next
    if let Err(e) = platform
        .delete_message(msg_ctx.channel_id, msg_ctx.message_id)
        .await
    {
        tracing::debug!("Could not delete submitted message: {e}");
    }

    let guild_id = match (msg_ctx.guild_id, msg_ctx.channel_name.as_deref()) {
        (Some(guild_id), Some(name)) if name == config.source_channel => guild_id,
        _ => {
            let warning = format!(
                "⛔ Merci d’utiliser cette commande uniquement dans le salon #{}.",
                config.source_channel
            );
            notify_transient(platform, bot, msg_ctx, &warning).await;
            return;
        }
    };

    if text.chars().count() > config.max_intention_length {
        let warning = format!(
            "⛔ Ton intention est trop longue (max {} caractères).",
            config.max_intention_length
        );
        notify_transient(platform, bot, msg_ctx, &warning).await;
        return;
    }

    let display_channel = match platform
        .find_text_channel(guild_id, &config.intentions_channel)
        .await
    {
        Ok(Some(channel_id)) => channel_id,
        Ok(None) => {
            tracing::warn!(
                "Intentions channel #{} not found in guild {}",
                config.intentions_channel,
                guild_id
            );
            notify_transient(platform, bot, msg_ctx, MISSING_DISPLAY_CHANNEL).await;
            return;
        }
        Err(e) => {
            tracing::error!("Failed to look up the intentions channel: {e}");
            notify_transient(platform, bot, msg_ctx, DISCORD_UNAVAILABLE).await;
            return;
        }
    };

    let announcement = format_announcement(&text);
    let count = {
        let mut state = bot.state().lock().await;
        state.add_intention(text);
        state.len()
    };
    tracing::info!("Intention received ({count} today)");

    let sent = match platform.send_embed(display_channel, &announcement).await {
        Ok(sent) => sent,
        Err(e) => {
            tracing::error!("Failed to publish intention: {e}");
            return;
        }
    };

    if let Err(e) = platform.react(display_channel, sent, PRAYER_REACTION).await {
        tracing::error!("Failed to add reaction: {e}");
    }
}

/// Handles `intention`: DM today's intentions to the requester
async fn handle_intention_command(
    platform: &impl Platform,
    bot: &Intercessio,
    msg_ctx: &MsgContextInfo,
) {
    let intentions = bot.snapshot().await;

    // Sent as a single message; past Discord's 2000 characters the send fails
    let content = if intentions.is_empty() {
        NO_INTENTIONS.to_string()
    } else {
        format_intentions(&intentions)
    };

    if let Err(e) = platform.dm(msg_ctx.author_id, &content).await {
        tracing::warn!("Failed to send intentions by DM: {e}");
    }
}

/// Handles `purge`: clear today's intentions and remove the bot's posts
async fn handle_purge_command(
    platform: &impl Platform,
    bot: &Intercessio,
    msg_ctx: &MsgContextInfo,
) {
    let config = bot.config();

    let Some(guild_id) = msg_ctx.guild_id else {
        notify(platform, msg_ctx, PERMISSION_DENIED).await;
        return;
    };

    // check admin
    let admin_role = config.admin_role.to_lowercase();
    let is_admin = platform
        .member_role_names(guild_id, msg_ctx.author_id)
        .await
        .iter()
        .any(|role| role.to_lowercase() == admin_role);
    if !is_admin {
        notify(platform, msg_ctx, PERMISSION_DENIED).await;
        return;
    }

    let cleared = {
        let mut state = bot.state().lock().await;
        let cleared = state.len();
        state.clear();
        cleared
    };
    tracing::info!("Purged {cleared} intentions");

    let display_channel = match platform
        .find_text_channel(guild_id, &config.intentions_channel)
        .await
    {
        Ok(Some(channel_id)) => channel_id,
        Ok(None) => {
            let notice = format!("⛔ Salon #{} introuvable.", config.intentions_channel);
            notify(platform, msg_ctx, &notice).await;
            return;
        }
        Err(e) => {
            tracing::error!("Failed to look up the intentions channel: {e}");
            notify(platform, msg_ctx, DISCORD_UNAVAILABLE).await;
            return;
        }
    };

    let history = match platform
        .recent_messages(display_channel, PURGE_HISTORY_LIMIT)
        .await
    {
        Ok(history) => history,
        Err(e) => {
            tracing::error!(
                "Failed to read history of #{}: {e}",
                config.intentions_channel
            );
            return;
        }
    };

    let bot_id = platform.current_user_id();
    let mut deleted = 0;
    let own_messages = history.iter().filter(|m| m.author_id == bot_id);
    for message in own_messages {
        match platform.delete_message(display_channel, message.id).await {
            Ok(()) => deleted += 1,
            Err(PlatformError::Forbidden) => notify(platform, msg_ctx, DELETE_FORBIDDEN).await,
            Err(PlatformError::Other(e)) => {
                tracing::debug!("Skipping message {}: {e}", message.id);
            }
        }
    }
    tracing::info!(
        "Deleted {deleted} bot messages from #{}",
        config.intentions_channel
    );

    notify(platform, msg_ctx, PURGE_DONE).await;
}

/// Handles `help`: list the available commands
async fn handle_help_command(
    platform: &impl Platform,
    bot: &Intercessio,
    msg_ctx: &MsgContextInfo,
) {
    let config = bot.config();
    let prefix = &config.prefix;
    let help = format!(
        "\
**Commandes**
- `{prefix}prier <texte>` : partage une intention anonyme (dans #{source}, {max} caractères max)
- `{prefix}intention` : reçois en message privé les intentions du jour
- `{prefix}purge` : efface les intentions du jour (rôle {admin})",
        source = config.source_channel,
        max = config.max_intention_length,
        admin = config.admin_role,
    );

    notify(platform, msg_ctx, &help).await;
}
