//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor and
//! cloned into background tasks. It holds the session directory, the
//! registry of connected clients (one outbound channel per socket), the set
//! of lobby subscribers, and the persistence and rating collaborators.
//!
//! LOCK ORDER
//! ==========
//! A session gate (from `SessionDirectory::gate`) is always taken before the
//! directory mutex, never while holding it. The client registry and lobby
//! locks are leaf locks: nothing else is acquired while they are held.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, mpsc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::protocol::ServerEvent;
use crate::services::directory::SessionDirectory;
use crate::services::rating::RatingEngine;
use crate::services::store::GameStore;

/// Connected clients: socket id -> sender for outbound events.
pub type ClientRegistry = HashMap<Uuid, mpsc::Sender<ServerEvent>>;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Copy.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<Mutex<SessionDirectory>>,
    pub clients: Arc<RwLock<ClientRegistry>>,
    pub lobby: Arc<RwLock<HashSet<Uuid>>>,
    pub store: Arc<dyn GameStore>,
    pub ratings: RatingEngine,
    pub config: Arc<Config>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn GameStore>, config: Config) -> Self {
        Self {
            directory: Arc::new(Mutex::new(SessionDirectory::new())),
            clients: Arc::new(RwLock::new(HashMap::new())),
            lobby: Arc::new(RwLock::new(HashSet::new())),
            store,
            ratings: RatingEngine::new(config.rating_tau),
            config: Arc::new(config),
        }
    }

    pub async fn register_client(&self, client_id: Uuid, tx: mpsc::Sender<ServerEvent>) {
        self.clients.write().await.insert(client_id, tx);
    }

    pub async fn unregister_client(&self, client_id: Uuid) {
        self.clients.write().await.remove(&client_id);
    }

    /// Queue `event` for `client_id`. Returns false if the client is gone or
    /// its channel is full; the event is dropped in both cases.
    pub async fn send_to(&self, client_id: Uuid, event: ServerEvent) -> bool {
        let clients = self.clients.read().await;
        let Some(tx) = clients.get(&client_id) else {
            debug!(%client_id, event = event.name(), "send: client not connected");
            return false;
        };
        match tx.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!(%client_id, event = event.name(), "send: client channel full; dropping");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
