//! Bridge lifecycle controller - subscriber presence drives feed activation.
//!
//! ```text
//!            connect (while Idle)
//!   ┌──────┐ ─────────────────────► ┌────────┐
//!   │ Idle │                        │ Active │ ◄── connect: no-op
//!   └──────┘ ◄───────────────────── └────────┘ ◄── disconnect, count > 0: no-op
//!            disconnect, count == 0
//! ```
//!
//! Deactivation reads the channel's authoritative subscriber count at the
//! moment of the disconnect, never a local tally, so missed or duplicated
//! presence events cannot make the controller drift.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch, Mutex};

use crate::domain::bridge::LifecycleState;
use crate::domain::foundation::StateMachine;
use crate::ports::{BroadcastChannel, PresenceEvent};

use super::bridge::{Bridge, BridgeError};

/// Translates presence events into bridge start/stop calls.
///
/// The controller is the only caller of [`Bridge::start`] and
/// [`Bridge::stop`] in a running process.
pub struct LifecycleController {
    bridge: Arc<Bridge>,
    channel: Arc<dyn BroadcastChannel>,
    subscription: String,
    state: Mutex<LifecycleState>,
}

impl LifecycleController {
    pub fn new(
        bridge: Arc<Bridge>,
        channel: Arc<dyn BroadcastChannel>,
        subscription: impl Into<String>,
    ) -> Self {
        Self {
            bridge,
            channel,
            subscription: subscription.into(),
            state: Mutex::new(LifecycleState::Idle),
        }
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.lock().await
    }

    pub fn subscription(&self) -> &str {
        &self.subscription
    }

    /// Dispatch one presence event.
    pub async fn handle(&self, event: PresenceEvent) {
        match event {
            PresenceEvent::Connected => self.on_connect().await,
            PresenceEvent::Disconnected => self.on_disconnect().await,
        }
    }

    /// A subscriber connected: start the bridge if nobody was listening.
    pub async fn on_connect(&self) {
        let mut state = self.state.lock().await;
        if *state == LifecycleState::Idle {
            self.activate(&mut state).await;
        }
    }

    /// A subscriber disconnected: stop the bridge once the channel is empty.
    pub async fn on_disconnect(&self) {
        let mut state = self.state.lock().await;
        let remaining = self.channel.subscriber_count().await;
        let current = *state;

        tracing::debug!(remaining, state = %current, "Subscriber disconnected");

        if remaining == 0 && *state == LifecycleState::Active {
            self.deactivate(&mut state).await;
        }
    }

    /// Bring the state in line with the channel's current count.
    ///
    /// Used when presence notifications may have been dropped.
    pub async fn reconcile(&self) {
        let mut state = self.state.lock().await;
        let count = self.channel.subscriber_count().await;

        match (*state, count) {
            (LifecycleState::Idle, n) if n > 0 => self.activate(&mut state).await,
            (LifecycleState::Active, 0) => self.deactivate(&mut state).await,
            _ => {}
        }
    }

    /// Process presence events until `shutdown` flips to true or the
    /// presence stream closes, then stop the bridge.
    pub async fn run(
        &self,
        mut presence: broadcast::Receiver<PresenceEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        // Subscribers may have arrived before `presence` was subscribed.
        self.reconcile().await;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                event = presence.recv() => match event {
                    Ok(event) => self.handle(event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Presence events dropped, reconciling with subscriber count");
                        self.reconcile().await;
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!("Presence stream closed");
                        break;
                    }
                },
            }
        }

        let mut state = self.state.lock().await;
        if *state == LifecycleState::Active {
            self.deactivate(&mut state).await;
        }
    }

    async fn activate(&self, state: &mut LifecycleState) {
        match self.bridge.start(&self.subscription).await {
            Ok(()) => {}
            // The bridge's own guard already refused the double start; adopt
            // its view so the next disconnect can still stop it.
            Err(BridgeError::AlreadyActive { subscription }) => {
                tracing::error!(
                    subscription = %subscription,
                    "Controller was idle but bridge was already active"
                );
            }
        }
        self.transition(state, LifecycleState::Active);
    }

    async fn deactivate(&self, state: &mut LifecycleState) {
        self.bridge.stop().await;
        self.transition(state, LifecycleState::Idle);
    }

    fn transition(&self, state: &mut LifecycleState, target: LifecycleState) {
        match state.transition_to(target) {
            Ok(next) => {
                let from = *state;
                tracing::info!(
                    from = %from,
                    to = %next,
                    subscription = %self.subscription,
                    "Lifecycle transition"
                );
                *state = next;
            }
            Err(e) => tracing::error!("Lifecycle transition rejected: {}", e),
        }
    }
}
