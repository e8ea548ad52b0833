//! Background tasks for detail lookups.
//!
//! Lookups run on tokio so the UI stays responsive while they are pending.
//! Each task reports back through an unbounded channel:
//!
//! 1. Row activation hands the lookup to [`TaskSpawner::spawn_detail_lookup`]
//! 2. The event loop keeps rendering and handling input
//! 3. The task sends a [`DetailFetched`] message when the lookup settles
//! 4. The event loop drains the channel with `try_recv()` and passes each
//!    message to [`RowActivation::complete`](crate::activation::RowActivation::complete)

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::trace;

use crate::lookup::DetailLookup;

/// Identifies one activation's lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of a background detail lookup.
#[derive(Debug)]
pub struct DetailFetched<D> {
    pub request: RequestId,
    pub row_type: String,
    pub result: Result<D, String>,
}

/// Spawns detail lookups on the tokio runtime.
pub struct TaskSpawner<D> {
    tx: mpsc::UnboundedSender<DetailFetched<D>>,
}

impl<D: Send + 'static> TaskSpawner<D> {
    /// Create a spawner sending results through `tx`.
    pub fn new(tx: mpsc::UnboundedSender<DetailFetched<D>>) -> Self {
        Self { tx }
    }

    /// Spawn a task looking up the detail for `row`.
    pub fn spawn_detail_lookup<T>(
        &self,
        request: RequestId,
        lookup: Arc<dyn DetailLookup<T, Detail = D>>,
        row: T,
        row_type: String,
    ) where
        T: Send + Sync + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = lookup
                .lookup_detail(&row, &row_type)
                .await
                .map_err(|e| e.to_string());
            trace!(%request, ok = result.is_ok(), "Detail lookup settled");
            // The receiver is gone only when the UI has shut down
            let _ = tx.send(DetailFetched {
                request,
                row_type,
                result,
            });
        });
    }
}

impl<D> Clone for TaskSpawner<D> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

/// Create a new task channel and spawner.
///
/// The receiver should be polled in the main event loop; the spawner is
/// handed to row activation.
pub fn create_task_channel<D: Send + 'static>(
) -> (mpsc::UnboundedReceiver<DetailFetched<D>>, TaskSpawner<D>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (rx, TaskSpawner::new(tx))
}
