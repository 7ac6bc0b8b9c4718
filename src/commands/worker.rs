use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::api::{HealthState, LatencyStats};
use crate::commands::{CommandDispatcher, Outcome, Responder};
use crate::db::WheelRepository;
use crate::gateway::{IncomingCommand, InteractionResponder};
use crate::render::WheelRenderer;
use crate::types::CommandEvent;

/// Consumes commands forwarded by the gateway, one task per command.
pub struct CommandWorker<R, G> {
    dispatcher: Arc<CommandDispatcher<R, G>>,
    health: Arc<HealthState>,
    latency: Arc<LatencyStats>,
    rx: mpsc::Receiver<IncomingCommand>,
}

impl<R: WheelRepository, G: WheelRenderer> CommandWorker<R, G> {
    pub fn new(
        dispatcher: Arc<CommandDispatcher<R, G>>,
        health: Arc<HealthState>,
        latency: Arc<LatencyStats>,
        rx: mpsc::Receiver<IncomingCommand>,
    ) -> Self {
        Self { dispatcher, health, latency, rx }
    }

    pub async fn run(mut self) {
        info!("Command worker started");
        while let Some(incoming) = self.rx.recv().await {
            let dispatcher = Arc::clone(&self.dispatcher);
            let health = Arc::clone(&self.health);
            let latency = Arc::clone(&self.latency);
            let IncomingCommand { event, interaction, http } = incoming;
            let responder = InteractionResponder::new(http, interaction);
            tokio::spawn(async move {
                process(&dispatcher, &health, &latency, &event, &responder).await;
            });
        }
        info!("Command channel closed, worker stopping");
    }
}

/// Acknowledge, dispatch, then record latency and health counters for one command.
pub async fn process<R, G, P>(
    dispatcher: &CommandDispatcher<R, G>,
    health: &HealthState,
    latency: &LatencyStats,
    event: &CommandEvent,
    responder: &P,
) -> Outcome
where
    R: WheelRepository,
    G: WheelRenderer,
    P: Responder,
{
    let started = Instant::now();

    let outcome = match responder.acknowledge().await {
        Ok(()) => dispatcher.handle(event, responder).await,
        Err(e) => {
            error!(command = %event.command, "could not acknowledge interaction: {e}");
            Outcome::Failed
        }
    };

    let elapsed = started.elapsed();
    latency.record(elapsed);
    health.record_command(outcome == Outcome::Failed);

    let elapsed_ms = elapsed.as_millis() as u64;
    info!(
        command = %event.command,
        user = %event.user_name,
        outcome = ?outcome,
        elapsed_ms,
        "Processed command {} in {elapsed_ms} ms",
        event.command,
    );
    outcome
}
