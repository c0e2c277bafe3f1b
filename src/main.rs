use dotenv::dotenv;
use fs2::FileExt;
use serenity::{async_trait, model::channel::Message, model::gateway::Ready, prelude::*};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use intercessio::commands::process_command;
use intercessio::config::Config;
use intercessio::digest::start_digest_scheduler;
use intercessio::discord::SerenityPlatform;
use intercessio::msg_context::MsgContextInfo;
use intercessio::service::Intercessio;
use intercessio::statics::DISCORD_TOKEN;

struct IntercessioHandler {
    bot: Arc<Intercessio>,
    digest_started: AtomicBool,
}

#[async_trait]
impl EventHandler for IntercessioHandler {
    // Event handlers are dispatched through a threadpool, and so multiple
    // events can be dispatched simultaneously.
    async fn message(&self, ctx: Context, msg: Message) {
        // Skip messages from bots
        if msg.author.bot {
            return;
        }

        if !msg.content.starts_with(&self.bot.config().prefix) {
            return;
        }

        let msg_ctx = MsgContextInfo::from_message(&ctx, &msg).await;
        let platform = SerenityPlatform::from_context(&ctx);

        process_command(&platform, &self.bot, &msg_ctx, &msg.content).await;
    }

    // Called again after a reconnect; the digest loop must only start once.
    async fn ready(&self, ctx: Context, ready: Ready) {
        tracing::info!("Intercessio connected as {}", ready.user.name);

        if self.digest_started.swap(true, Ordering::SeqCst) {
            return;
        }
        start_digest_scheduler(SerenityPlatform::from_context(&ctx), self.bot.clone());
    }
}

/// Acquire a file lock to ensure only one instance of the bot is running
fn acquire_instance_lock() -> eyre::Result<File> {
    // Create data directory if it doesn't exist
    let lock_path = Path::new("data");
    if !lock_path.exists() {
        std::fs::create_dir_all(lock_path)?;
    }

    let lock_file_path = lock_path.join("intercessio.lock");
    let file = File::create(&lock_file_path)?;

    match file.try_lock_exclusive() {
        Ok(_) => {
            tracing::info!("Successfully acquired instance lock");
            Ok(file)
        }
        Err(e) => {
            tracing::error!("Failed to acquire instance lock: already running");
            Err(eyre::eyre!(
                "Another instance of Intercessio is already running: {}",
                e
            ))
        }
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Load .env file if present
    dotenv().ok();

    // Initialize the tracing subscriber for logging
    tracing_subscriber::fmt::init();

    // Two instances would both post the daily digest
    let _lock_file = acquire_instance_lock()?;

    let config = Config::from_env()?;
    tracing::info!(
        "Accepting intentions from #{}, publishing to #{}",
        config.source_channel,
        config.intentions_channel
    );
    let bot = Arc::new(Intercessio::new(config));

    setup_shutdown_handler(bot.clone());

    // GUILDS keeps the guild list in the cache for the digest
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = create_discord_client(intents, bot).await?;

    if let Err(why) = client.start().await {
        tracing::error!("Client error: {:?}", why);
        return Err(eyre::eyre!("Client error: {:?}", why));
    }

    Ok(())
}

/// Create and configure the Discord client
async fn create_discord_client(
    intents: GatewayIntents,
    bot: Arc<Intercessio>,
) -> eyre::Result<Client> {
    let handler = IntercessioHandler {
        bot,
        digest_started: AtomicBool::new(false),
    };

    Client::builder(&**DISCORD_TOKEN, intents)
        .event_handler(handler)
        .await
        .map_err(|e| eyre::eyre!("Failed to create Discord client: {}", e))
}

/// Exit on SIGINT or SIGTERM, reporting what is lost with the process
fn setup_shutdown_handler(bot: Arc<Intercessio>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }

        let pending = bot.state().lock().await.len();
        tracing::info!(
            "Received shutdown signal, dropping {pending} intentions and shutting down."
        );

        std::process::exit(0);
    });
}
