use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serenity::all::{Client, CommandInteraction, Context, EventHandler, Http, Interaction, Ready};
use serenity::async_trait;
use serenity::gateway::{ConnectionStage, ShardStageUpdateEvent};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::HealthState;
use crate::config::{Config, GATEWAY_INTENTS, RECONNECT_BACKOFF_MS};
use crate::error::Result;
use crate::gateway::messages;
use crate::types::CommandEvent;

/// A slash command plus what is needed to answer it.
pub struct IncomingCommand {
    pub event: CommandEvent,
    pub interaction: CommandInteraction,
    pub http: Arc<Http>,
}

/// Result of handing one item to the worker channel.
#[derive(Debug, PartialEq)]
enum Forward {
    Sent,
    Dropped,
    Closed,
}

fn forward<T>(tx: &mpsc::Sender<T>, item: T) -> Forward {
    match tx.try_send(item) {
        Ok(()) => Forward::Sent,
        Err(mpsc::error::TrySendError::Full(_)) => Forward::Dropped,
        Err(mpsc::error::TrySendError::Closed(_)) => Forward::Closed,
    }
}

/// Gateway event handler: tracks session state and forwards slash commands.
#[derive(Clone)]
pub struct WheelHandler {
    command_tx: mpsc::Sender<IncomingCommand>,
    health: Arc<HealthState>,
    commands_routed: Arc<AtomicU64>,
}

impl WheelHandler {
    pub fn new(command_tx: mpsc::Sender<IncomingCommand>, health: Arc<HealthState>) -> Self {
        Self { command_tx, health, commands_routed: Arc::new(AtomicU64::new(0)) }
    }

    fn stage_changed(&self, stage: ConnectionStage) {
        let connected = matches!(stage, ConnectionStage::Connected);
        self.health.set_gateway_connected(connected);
    }
}

#[async_trait]
impl EventHandler for WheelHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "Gateway session ready");
        self.health.set_gateway_connected(true);
    }

    async fn shard_stage_update(&self, _ctx: Context, event: ShardStageUpdateEvent) {
        debug!(shard = ?event.shard_id, old = ?event.old, new = ?event.new, "shard stage changed");
        self.stage_changed(event.new);
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(interaction) = interaction else {
            return;
        };
        let event = messages::from_interaction(&interaction);
        debug!(command = %event.command, channel = %event.channel_name, "command received");

        let command = event.command.clone();
        let incoming = IncomingCommand { event, interaction, http: Arc::clone(&ctx.http) };
        match forward(&self.command_tx, incoming) {
            Forward::Sent => {
                let routed = self.commands_routed.fetch_add(1, Ordering::Relaxed) + 1;
                if routed % 500 == 0 {
                    info!(commands = routed, "[GATEWAY] {routed} commands routed");
                }
            }
            Forward::Dropped => warn!(command = %command, "command channel full, dropping interaction"),
            Forward::Closed => error!(command = %command, "command worker gone, dropping interaction"),
        }
    }
}

/// Runs the gateway client, restarting it with backoff when it stops.
pub struct GatewayClient {
    bot_token: String,
    command_tx: mpsc::Sender<IncomingCommand>,
    health: Arc<HealthState>,
}

impl GatewayClient {
    pub fn new(bot_token: String, command_tx: mpsc::Sender<IncomingCommand>, health: Arc<HealthState>) -> Self {
        Self { bot_token, command_tx, health }
    }

    pub fn from_config(
        cfg: &Config,
        command_tx: mpsc::Sender<IncomingCommand>,
        health: Arc<HealthState>,
    ) -> Self {
        Self::new(cfg.bot_token.clone(), command_tx, health)
    }

    pub async fn run(self) {
        let mut backoff_idx = 0usize;

        loop {
            info!("Gateway client starting");
            let result = self.start_once().await;
            self.health.set_gateway_connected(false);

            if self.command_tx.is_closed() {
                info!("Command channel closed, gateway client stopping");
                return;
            }
            match result {
                Ok(()) => {
                    info!("Gateway client stopped, restarting");
                    backoff_idx = 0;
                }
                Err(e) => error!("Gateway client error: {e}"),
            }

            let delay_ms = backoff_delay_ms(backoff_idx);
            backoff_idx = (backoff_idx + 1).min(RECONNECT_BACKOFF_MS.len().saturating_sub(1));

            warn!("Gateway restarting in {delay_ms}ms");
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }

    /// Serenity resumes and reconnects the shard itself; this returns only when the client gives up.
    async fn start_once(&self) -> Result<()> {
        let handler = WheelHandler::new(self.command_tx.clone(), Arc::clone(&self.health));
        let mut client = Client::builder(&self.bot_token, GATEWAY_INTENTS)
            .event_handler(handler)
            .await?;
        client.start().await?;
        Ok(())
    }
}

fn backoff_delay_ms(idx: usize) -> u64 {
    RECONNECT_BACKOFF_MS
        .get(idx)
        .or(RECONNECT_BACKOFF_MS.last())
        .copied()
        .unwrap_or(1_000)
}
