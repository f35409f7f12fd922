use crate::engine::SimulationEngine;
use crate::protocol::{Event, WireCodec};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::{broadcast, Mutex};
use tracing::{error, warn};

/// Fixed simulation tick period.
pub const TICK_PERIOD_MS: u64 = 3000;

/// Wall-clock milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Periodic driver for the simulation engine.
///
/// Owns nothing but the period: each tick it takes the engine lock, runs one
/// run-to-completion step, and broadcasts the resulting deltas
/// fire-and-forget. The engine stays independently testable by calling
/// [`SimulationEngine::tick`] directly.
#[derive(Debug)]
pub struct TickDriver {
    period: Duration,
}

impl TickDriver {
    pub fn new() -> Self {
        Self {
            period: Duration::from_millis(TICK_PERIOD_MS),
        }
    }

    pub fn with_period(period: Duration) -> Self {
        Self { period }
    }

    pub async fn run(
        self,
        engine: Arc<Mutex<SimulationEngine>>,
        events_tx: broadcast::Sender<String>,
    ) {
        let codec = WireCodec::new();
        let mut interval = tokio::time::interval(self.period);

        loop {
            interval.tick().await;

            let events = {
                let mut engine_guard = engine.lock().await;
                engine_guard.tick(now_ms())
            };

            for event in events {
                if matches!(event, Event::Shutdown(_)) {
                    warn!("simulation halted: health depleted");
                }
                broadcast_event(&codec, &events_tx, &event);
            }
        }
    }
}

impl Default for TickDriver {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode and publish one event. Delivery is fire-and-forget: a send error
/// only means no subscriber is currently connected.
pub fn broadcast_event(codec: &WireCodec, events_tx: &broadcast::Sender<String>, event: &Event) {
    match codec.encode_event(event) {
        Ok(line) => {
            let _ = events_tx.send(line);
        }
        Err(e) => error!("failed to encode event: {}", e),
    }
}
