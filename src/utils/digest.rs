use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime, Timelike};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::commands::format_intentions;
use crate::platform::Platform;
use crate::service::Intercessio;

/// How often the clock is compared against the digest time
pub const DIGEST_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Start the daily digest poller. The first check runs immediately.
pub fn start_digest_scheduler<P>(platform: P, bot: Arc<Intercessio>) -> JoinHandle<()>
where
    P: Platform + 'static,
{
    let config = bot.config();
    tracing::info!(
        "Daily digest scheduled at {:02}:{:02} in #{}",
        config.digest_hour,
        config.digest_minute,
        config.resume_channel
    );

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(DIGEST_POLL_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            run_digest_tick(&platform, &bot, Local::now().naive_local()).await;
        }
    })
}

/// One poll of the digest clock. Returns whether the digest went out.
///
/// Fires only during the configured minute, at most once per calendar day, and
/// never for an empty collection. The collection itself is left untouched.
pub async fn run_digest_tick(
    platform: &impl Platform,
    bot: &Intercessio,
    now: NaiveDateTime,
) -> bool {
    let config = bot.config();
    if now.hour() != config.digest_hour || now.minute() != config.digest_minute {
        return false;
    }

    let today = now.date();
    let intentions = {
        let state = bot.state().lock().await;
        if state.digest_sent_on(today) || state.is_empty() {
            return false;
        }
        state.intentions().to_vec()
    };

    let digest = format_intentions(&intentions);
    for guild_id in platform.guilds() {
        let channel_id = match platform
            .find_text_channel(guild_id, &config.resume_channel)
            .await
        {
            Ok(Some(channel_id)) => channel_id,
            Ok(None) => {
                tracing::debug!("No #{} in guild {}", config.resume_channel, guild_id);
                continue;
            }
            Err(e) => {
                tracing::error!("Failed to look up #{}: {e}", config.resume_channel);
                continue;
            }
        };

        if let Err(e) = platform.say(channel_id, &digest).await {
            tracing::error!(
                "Failed to send daily digest to guild {}: {}",
                guild_id,
                e
            );
        }
    }

    bot.state().lock().await.mark_digest_sent(today);
    tracing::info!(
        "Daily digest sent for {} ({} intentions)",
        today,
        intentions.len()
    );

    true
}
