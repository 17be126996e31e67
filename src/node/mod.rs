//! Per-instance drivers the host calls once per animation tick.

mod follow;
mod tail;

pub use follow::ChainFollowSolver;
pub use tail::TailSolver;

use crate::error::ChainError;

/// Logs a configuration error once when it appears and once when it clears,
/// rather than every frame.
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorLatch {
    current: Option<ChainError>,
}

impl ErrorLatch {
    pub(crate) fn raise(&mut self, node: &str, err: &ChainError) {
        if self.current.as_ref() != Some(err) {
            log::warn!("{node}: passing base pose through: {err}");
            self.current = Some(err.clone());
        }
    }

    pub(crate) fn clear(&mut self, node: &str) {
        if let Some(err) = self.current.take() {
            log::info!("{node}: solving again (was: {err})");
        }
    }

    pub(crate) fn current(&self) -> Option<&ChainError> {
        self.current.as_ref()
    }
}
