//! Output Budget - Response Size Limits
//!
//! Caps rows per query and bytes per tool response so a single call cannot
//! flood the client's context.
//!
//! # Defaults
//!
//! - Max response size: 1MB
//! - Max rows returned: 1,000

use super::SecurityError;

pub const DEFAULT_MAX_BYTES: usize = 1024 * 1024;
pub const DEFAULT_MAX_ROWS: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputBudget {
    max_bytes: usize,
    max_rows: usize,
}

impl OutputBudget {
    pub fn new(max_bytes: usize, max_rows: usize) -> Self {
        Self {
            max_bytes,
            max_rows: max_rows.max(1),
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// Check if a serialized response fits.
    pub fn check_size(&self, size: usize) -> Result<(), SecurityError> {
        if size > self.max_bytes {
            Err(SecurityError::OutputTooLarge {
                size,
                max: self.max_bytes,
            })
        } else {
            Ok(())
        }
    }

    /// Row count to fetch for a caller-requested limit.
    pub fn clamp_rows(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.max_rows).min(self.max_rows)
    }
}

impl Default for OutputBudget {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BYTES, DEFAULT_MAX_ROWS)
    }
}
