// Durable session identifier
use uuid::Uuid;

use crate::errors::Result;
use crate::store::{KeyValueStore, SESSION_ID_KEY};

/// Resolves the session identifier that correlates all requests from this
/// client profile with one server-side conversation
pub struct SessionIdentity;

impl SessionIdentity {
    /// Return the stored identifier, generating and persisting one if absent
    ///
    /// An existing entry is never regenerated. A blank entry counts as absent.
    pub fn resolve(store: &dyn KeyValueStore) -> Result<String> {
        if let Some(existing) = Self::current(store)? {
            return Ok(existing);
        }

        let id = Uuid::new_v4().to_string();
        store.set(SESSION_ID_KEY, &id)?;
        tracing::info!(session_id = %id, "Created new session identifier");

        Ok(id)
    }

    /// Return the stored identifier without creating one
    pub fn current(store: &dyn KeyValueStore) -> Result<Option<String>> {
        Ok(store
            .get(SESSION_ID_KEY)?
            .filter(|id| !id.trim().is_empty()))
    }

    /// Drop the stored identifier; the next resolve creates a fresh one
    pub fn forget(store: &dyn KeyValueStore) -> Result<Option<String>> {
        let previous = Self::current(store)?;
        store.remove(SESSION_ID_KEY)?;
        Ok(previous)
    }
}
