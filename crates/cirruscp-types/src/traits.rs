//! Core traits for CirrusCP operations
//!
//! Small seams shared across the crates so collaborators can be swapped in
//! tests without reaching into concrete types.

use crate::TransferId;

/// Trait for cooperative cancellation of an operation
pub trait Cancellable {
    /// Request cancellation of the operation
    fn cancel(&self);

    /// Check if the operation has been cancelled
    fn is_cancelled(&self) -> bool;
}

/// Trait for identifying the transfer an object belongs to
pub trait Identifiable {
    /// Get the transfer ID
    fn transfer_id(&self) -> TransferId;
}
