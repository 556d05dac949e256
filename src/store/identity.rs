use tracing::{debug, instrument};

use super::KeyValueStore;
use crate::domain::Actor;
use crate::error::StoreError;

/// Key under which the signed-in actor is persisted.
pub const SESSION_KEY: &str = "user";

/// Persists the current actor across restarts.
pub struct IdentityStore {
    backend: Box<dyn KeyValueStore>,
}

impl IdentityStore {
    pub fn new(backend: impl KeyValueStore) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Returns the stored actor, `None` when absent, or `CorruptSessionData`
    /// when the stored payload does not decode.
    #[instrument(skip(self))]
    pub fn load(&self) -> Result<Option<Actor>, StoreError> {
        let Some(raw) = self.backend.get(SESSION_KEY)? else {
            debug!("No stored session");
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StoreError::CorruptSessionData(e.to_string()))
    }

    #[instrument(fields(actor_id = %actor.id), skip(self, actor))]
    pub fn save(&mut self, actor: &Actor) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(actor).map_err(|e| StoreError::Encode(e.to_string()))?;
        self.backend.set(SESSION_KEY, encoded)?;
        debug!("Session persisted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.backend.remove(SESSION_KEY)?;
        debug!("Session cleared");
        Ok(())
    }
}
