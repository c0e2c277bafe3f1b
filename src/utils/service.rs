use tokio::sync::Mutex;

use crate::utils::config::Config;
use crate::utils::state::BotState;

/// The bot itself: configuration plus the day's intentions.
///
/// One instance is created at startup and shared through an `Arc` between the
/// event handler and the digest scheduler. The state lock is only held for
/// in-memory reads and writes, never across a Discord call.
#[derive(Debug)]
pub struct Intercessio {
    config: Config,
    state: Mutex<BotState>,
}

impl Intercessio {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: Mutex::new(BotState::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &Mutex<BotState> {
        &self.state
    }

    /// Copy of the current intentions, for formatting outside the lock
    pub async fn snapshot(&self) -> Vec<String> {
        self.state.lock().await.intentions().to_vec()
    }
}
