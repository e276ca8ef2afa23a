use super::Dispatcher;
use crate::channel::EventChannel;
use crate::config::PitchsyncConfig;
use crate::state::{MetricsSnapshot, StateStore, StoreChange};
use tokio::sync::broadcast;
use tokio::time::{sleep_until, Instant};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// One ingestion session: a store constructed on start and handed back on
/// teardown, fed by a single event loop.
pub struct Session {
    id: Uuid,
    dispatcher: Dispatcher,
}

impl Session {
    pub fn new(config: &PitchsyncConfig) -> Self {
        Self {
            id: Uuid::now_v7(),
            dispatcher: Dispatcher::new(config),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn store(&self) -> &StateStore {
        self.dispatcher.store()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Subscribe to store change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.dispatcher.store().subscribe()
    }

    /// Tear the session down, keeping the final state
    pub fn into_store(self) -> StateStore {
        self.dispatcher.into_store()
    }

    /// Consume events until the channel ends.
    ///
    /// Events and watchdog deadlines are handled on this one loop. An event
    /// already queued when a deadline elapses is taken first, but the
    /// dispatcher fires the elapsed deadline before applying it.
    pub async fn run<C: EventChannel + ?Sized>(&mut self, channel: &mut C) -> MetricsSnapshot {
        let span = info_span!("session", session_id = %self.id);

        async {
            info!("Session started");

            loop {
                let deadline = self.dispatcher.next_deadline();

                tokio::select! {
                    biased;

                    event = channel.next_event() => match event {
                        Some(event) => self.dispatcher.dispatch(event, Instant::now()),
                        None => break,
                    },

                    _ = wait_for(deadline) => {
                        self.dispatcher.expire_watchdogs(Instant::now());
                    }
                }
            }

            let metrics = self.dispatcher.metrics().snapshot();
            info!(
                total_events = metrics.total_events,
                unknown_events = metrics.unknown_events,
                "Event channel ended, session stopped"
            );
            metrics
        }
        .instrument(span)
        .await
    }
}

/// Resolve at `deadline`, or never when there is none
async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
