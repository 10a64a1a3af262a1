use thiserror::Error;

use crate::message::MessageId;

/// Structural anomalies recovered while building an index or a layout.
///
/// These are diagnostics, not failures: the producing pass repairs the
/// structure locally and keeps going, so a degraded input still renders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Anomaly {
    #[error("message {id} references missing parent {missing_parent}; promoted to root")]
    OrphanReference {
        id: MessageId,
        missing_parent: MessageId,
    },
    #[error("duplicate message id {id}; keeping the later entry")]
    DuplicateId { id: MessageId },
    #[error("edge into {id} revisits an already placed node; skipped")]
    CycleDetected { id: String },
}
