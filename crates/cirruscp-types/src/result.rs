//! Result type alias for CirrusCP operations

use crate::Error;

/// Result type alias for CirrusCP operations
pub type Result<T> = std::result::Result<T, Error>;
