use std::time::Duration;

use serenity::all::GatewayIntents;

use crate::error::{AppError, Result};

pub const RENDERER_URL: &str = "http://127.0.0.1:8080";

/// Partition key of every durable wheel record.
pub const WHEEL_PARTITION_KEY: &str = "wheel";

/// Cached wheels untouched for this long are evicted and reloaded from SQLite on next access.
pub const CACHE_IDLE_TTL_SECS: u64 = 30 * 60;

/// Upper bound on cached wheels. Least-recently-used entries go first.
pub const CACHE_CAPACITY: usize = 10_000;

/// How often the sweeper checks the cache for idle entries (seconds).
pub const CACHE_SWEEP_INTERVAL_SECS: u64 = 60;

/// Degrees added past the slice centre so the pointer does not sit on a boundary.
/// Clamped to a quarter of the slice width for wheels with many options.
pub const LANDING_OFFSET_DEG: f64 = 5.0;

/// Full turns the animation makes before settling on the selected slice.
pub const EXTRA_TURNS: u32 = 2;

/// Delays before restarting a gateway client that stopped, in milliseconds.
pub const RECONNECT_BACKOFF_MS: &[u64] = &[1_000, 2_000, 5_000, 10_000, 30_000];

/// Channel capacity for inbound command routing.
pub const CHANNEL_CAPACITY: usize = 256;

/// Interactions arrive regardless of intents. GUILDS resolves channel names.
pub const GATEWAY_INTENTS: GatewayIntents = GatewayIntents::GUILDS;

#[derive(Debug, Clone)]
pub struct Config {
    /// Bot credential (DISCORD_BOT_TOKEN)
    pub bot_token: String,
    pub log_level: String,
    /// SQLite file backing the durable wheel records (DB_PATH)
    pub db_path: String,
    pub api_port: u16,
    /// Base URL of the wheel renderer service (RENDERER_URL)
    pub renderer_url: String,
    pub renderer_timeout: Duration,
    /// Font asset directory forwarded to the renderer (FONT_DIR)
    pub font_dir: Option<String>,
    /// Commands are only accepted in channels whose name starts with this prefix.
    /// Empty disables the check (WHEEL_CHANNEL_PREFIX).
    pub channel_prefix: String,
    /// Delay between posting the spin animation and announcing the winner (SPIN_RESULT_DELAY_SECS)
    pub spin_result_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let bot_token = std::env::var("DISCORD_BOT_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::Config("DISCORD_BOT_TOKEN must be set".to_string()))?;

        Ok(Self {
            bot_token,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "wheelbot.db".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            renderer_url: std::env::var("RENDERER_URL")
                .unwrap_or_else(|_| RENDERER_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            renderer_timeout: Duration::from_secs(
                std::env::var("RENDERER_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse::<u64>()
                    .unwrap_or(60),
            ),
            font_dir: std::env::var("FONT_DIR")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            channel_prefix: std::env::var("WHEEL_CHANNEL_PREFIX")
                .unwrap_or_else(|_| "wheel".to_string())
                .trim()
                .to_string(),
            spin_result_delay: Duration::from_secs(
                std::env::var("SPIN_RESULT_DELAY_SECS")
                    .unwrap_or_else(|_| "6".to_string())
                    .parse::<u64>()
                    .unwrap_or(6),
            ),
        })
    }
}
