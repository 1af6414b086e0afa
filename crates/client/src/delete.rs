//! Confirm-gated delete.
//!
//! Deleting a row never touches its stored image.

use thiserror::Error;
use tracing::{info, instrument};

use crate::gateway::{GatewayError, RemoteGateway, Table};
use crate::store::ListStore;

/// The remote delete failed. Displays only the generic notice; the
/// backend's message is kept as the source.
#[derive(Debug, Error)]
#[error("Failed to delete record")]
pub struct DeleteError(#[source] pub GatewayError);

/// Asks the admin whether to go ahead.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The admin said no; nothing was sent.
    Declined,
    Deleted,
}

/// Delete one row after confirmation, then refetch the store.
///
/// # Errors
///
/// Returns `DeleteError` if the backend rejects the delete. The store is not
/// refetched in that case.
#[instrument(skip_all, fields(table = ?table))]
pub async fn delete_record<G, C>(
    gateway: &G,
    store: &mut ListStore,
    confirm: &mut C,
    table: Table,
    id: impl Into<i64>,
) -> Result<DeleteOutcome, DeleteError>
where
    G: RemoteGateway,
    C: Confirm + ?Sized,
{
    if !confirm.confirm("Are you sure you want to delete this?") {
        return Ok(DeleteOutcome::Declined);
    }

    let id: i64 = id.into();
    let name = store.tables().name(table).to_owned();
    gateway.delete(&name, id).await.map_err(DeleteError)?;

    info!(table = %name, id, "Record deleted");
    store.refetch(gateway).await;

    Ok(DeleteOutcome::Deleted)
}
