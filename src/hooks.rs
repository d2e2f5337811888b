//! Post-create hooks.
//!
//! Side effects of chirp creation (notifications, counters, ...) hang off
//! this interface instead of an implicit event bus. Hooks run synchronously
//! after the creating transaction commits; a hook that needs to be
//! asynchronous must do its own enqueueing.

use async_trait::async_trait;

use crate::database::models::Chirp;

#[async_trait]
pub trait ChirpCreatedHook: Send + Sync {
    async fn chirp_created(&self, chirp: &Chirp);
}

/// Default hook: one structured log line per new chirp.
pub struct LogChirpCreated;

#[async_trait]
impl ChirpCreatedHook for LogChirpCreated {
    async fn chirp_created(&self, chirp: &Chirp) {
        tracing::info!(
            chirp_id = %chirp.id,
            user_id = %chirp.user_id,
            "chirp created"
        );
    }
}
