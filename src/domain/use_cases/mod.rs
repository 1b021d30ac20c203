pub mod auth;
pub mod certifications;
pub mod extractors;
pub mod projects;

use crate::media::reference::resolve_reference;
use crate::media::store::{CleanupOutcome, MediaStore};

/// Best-effort removal of a previously stored remote object. The record
/// write always proceeds regardless of what happens here; failures are
/// logged and reported, never propagated.
pub async fn cleanup_remote<M: MediaStore>(media: &M, url: &str) -> CleanupOutcome {
    let Some(reference) = resolve_reference(url) else {
        return CleanupOutcome::NothingToDelete;
    };

    match media.delete(&reference.public_id, reference.kind).await {
        Ok(()) => CleanupOutcome::Deleted,
        Err(e) => {
            tracing::warn!(
                "Failed to delete remote media {}: {}",
                reference.public_id,
                e
            );
            CleanupOutcome::Failed(e.to_string())
        }
    }
}
