use std::env;
use std::str::FromStr;
use std::time::Duration;

// Defaults match the channels and role of the server the bot was written for
const DEFAULT_PREFIX: &str = "!";
const DEFAULT_INTENTIONS_CHANNEL: &str = "intercessio";
const DEFAULT_RESUME_CHANNEL: &str = "général";
const DEFAULT_SOURCE_CHANNEL: &str = "postez-vos-intentions-anonymes";
const DEFAULT_ADMIN_ROLE: &str = "Ancien";
const DEFAULT_MAX_INTENTION_LENGTH: usize = 100;
const DEFAULT_DIGEST_HOUR: u32 = 20;
const DEFAULT_DIGEST_MINUTE: u32 = 0;
const DEFAULT_NOTICE_SECONDS: u64 = 10;

/// Runtime configuration of the bot, read from `INTERCESSIO_*` variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Prefix that triggers a command, e.g. `!`
    pub prefix: String,
    /// Channel where intentions are republished anonymously
    pub intentions_channel: String,
    /// Channel that receives the daily digest in every guild
    pub resume_channel: String,
    /// Only channel from which `prier` is accepted
    pub source_channel: String,
    /// Role allowed to run `purge`, compared case-insensitively
    pub admin_role: String,
    /// Maximum intention length in characters
    pub max_intention_length: usize,
    pub digest_hour: u32,
    pub digest_minute: u32,
    /// How long warnings stay visible before the bot deletes them
    pub notice_lifetime: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            intentions_channel: DEFAULT_INTENTIONS_CHANNEL.to_string(),
            resume_channel: DEFAULT_RESUME_CHANNEL.to_string(),
            source_channel: DEFAULT_SOURCE_CHANNEL.to_string(),
            admin_role: DEFAULT_ADMIN_ROLE.to_string(),
            max_intention_length: DEFAULT_MAX_INTENTION_LENGTH,
            digest_hour: DEFAULT_DIGEST_HOUR,
            digest_minute: DEFAULT_DIGEST_MINUTE,
            notice_lifetime: Duration::from_secs(DEFAULT_NOTICE_SECONDS),
        }
    }
}

impl Config {
    /// Load the configuration from the process environment
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let defaults = Self::default();
        let text = |key: &str, default: String| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or(default)
        };

        let config = Self {
            prefix: text("INTERCESSIO_PREFIX", defaults.prefix),
            intentions_channel: text(
                "INTERCESSIO_INTENTIONS_CHANNEL",
                defaults.intentions_channel,
            ),
            resume_channel: text("INTERCESSIO_RESUME_CHANNEL", defaults.resume_channel),
            source_channel: text("INTERCESSIO_SOURCE_CHANNEL", defaults.source_channel),
            admin_role: text("INTERCESSIO_ADMIN_ROLE", defaults.admin_role),
            max_intention_length: parse_or(
                &lookup,
                "INTERCESSIO_MAX_INTENTION_LENGTH",
                defaults.max_intention_length,
            )?,
            digest_hour: parse_or(&lookup, "INTERCESSIO_DIGEST_HOUR", defaults.digest_hour)?,
            digest_minute: parse_or(&lookup, "INTERCESSIO_DIGEST_MINUTE", defaults.digest_minute)?,
            notice_lifetime: Duration::from_secs(parse_or(
                &lookup,
                "INTERCESSIO_NOTICE_SECONDS",
                DEFAULT_NOTICE_SECONDS,
            )?),
        };

        if config.digest_hour > 23 {
            return Err(eyre::eyre!(
                "INTERCESSIO_DIGEST_HOUR must be between 0 and 23, got {}",
                config.digest_hour
            ));
        }
        if config.digest_minute > 59 {
            return Err(eyre::eyre!(
                "INTERCESSIO_DIGEST_MINUTE must be between 0 and 59, got {}",
                config.digest_minute
            ));
        }

        Ok(config)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> eyre::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| eyre::eyre!("Invalid value {raw:?} for {key}: {e}")),
        _ => Ok(default),
    }
}
