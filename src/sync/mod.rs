//! Bidirectional synchronization between field model and raw payload.

pub mod coordinator;

pub use coordinator::{SyncCoordinator, SyncOutcome, SyncState};
