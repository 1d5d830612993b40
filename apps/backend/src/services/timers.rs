//! Background driver for time-based mutation: turn timeouts, seat
//! abandonment and the offline-session sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::game_flow::GameFlowService;
use crate::protocol::OutboundEvent;

/// Where timer-driven events go; the transport fans them out to sockets.
pub trait EventSink: Send + Sync {
    fn deliver(&self, events: Vec<OutboundEvent>);
}

impl EventSink for UnboundedSender<OutboundEvent> {
    fn deliver(&self, events: Vec<OutboundEvent>) {
        for event in events {
            if self.send(event).is_err() {
                warn!("[TIMERS] event receiver dropped");
                return;
            }
        }
    }
}

/// Tick `flow` every `interval` until `cancel` fires.
pub fn spawn_timer_driver(
    flow: Arc<GameFlowService>,
    sink: Arc<dyn EventSink>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_ms = interval.as_millis() as u64, "[TIMERS] driver started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("[TIMERS] driver stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let events = flow.tick(Instant::now().into_std());
                    if !events.is_empty() {
                        debug!(count = events.len(), "[TIMERS] delivering timer events");
                        sink.deliver(events);
                    }
                }
            }
        }
    })
}
