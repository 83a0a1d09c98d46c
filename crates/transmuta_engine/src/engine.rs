use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use rand::Rng;

use transmuta_core::ItemId;

use crate::strategy::select_strategy;
use crate::types::{ConvertRequest, EngineEvent};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Interval between synthetic progress ticks.
    pub progress_tick: Duration,
    /// Upper bound on the progress a single tick may add.
    pub max_tick_increment: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            progress_tick: Duration::from_millis(200),
            max_tick_increment: 15,
        }
    }
}

enum EngineCommand {
    Dispatch { request: ConvertRequest },
}

/// Command channel in, event channel out. A dedicated thread owns a tokio
/// runtime; every dispatched item becomes its own task, so a batch converts
/// fully in parallel with no ordering between items.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let event_tx = event_tx.clone();
                let config = config.clone();
                runtime.spawn(async move {
                    handle_command(command, config, event_tx).await;
                });
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn dispatch(&self, request: ConvertRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Dispatch { request });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks until the next event; `None` once the engine thread is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }
}

async fn handle_command(
    command: EngineCommand,
    config: EngineConfig,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Dispatch { request } => {
            let item_id = request.item_id;
            log::debug!(
                "convert item_id={} target={} bytes={}",
                item_id,
                request.target,
                request.source.len()
            );
            let _ = event_tx.send(EngineEvent::Started { item_id });

            let ticker = spawn_progress_ticker(item_id, &config, event_tx.clone());
            let result = select_strategy(&request).convert(&request).await;
            // The ticker dies exactly once, on strategy resolution, so no
            // periodic callback outlives its item.
            ticker.abort();

            match &result {
                Ok(payload) => log::debug!(
                    "item {} completed, {} bytes of {}",
                    item_id,
                    payload.bytes.len(),
                    payload.media_type
                ),
                Err(err) => log::warn!("item {} failed: {}", item_id, err),
            }
            let _ = event_tx.send(EngineEvent::Finished { item_id, result });
        }
    }
}

fn spawn_progress_ticker(
    item_id: ItemId,
    config: &EngineConfig,
    event_tx: mpsc::Sender<EngineEvent>,
) -> tokio::task::JoinHandle<()> {
    let period = config.progress_tick;
    let max_increment = config.max_tick_increment.max(1);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first interval tick resolves immediately; skip it so the
        // estimate starts moving one period after dispatch.
        interval.tick().await;
        loop {
            interval.tick().await;
            let increment = rand::rng().random_range(1..=max_increment);
            if event_tx
                .send(EngineEvent::Progress { item_id, increment })
                .is_err()
            {
                break;
            }
        }
    })
}
