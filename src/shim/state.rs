use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of a constructed shim.
///
/// `Running -> Stopped` is the only transition. `Disabled` is terminal and
/// chosen at construction when the disable flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ShimState {
    Running = 1,
    Stopped = 2,
    Disabled = 3,
}

impl ShimState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ShimState::Running,
            2 => ShimState::Stopped,
            _ => ShimState::Disabled,
        }
    }
}

pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new(state: ShimState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub(crate) fn get(&self) -> ShimState {
        ShimState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// `Running -> Stopped`. Returns false if the shim was not running.
    pub(crate) fn stop(&self) -> bool {
        self.0
            .compare_exchange(
                ShimState::Running as u8,
                ShimState::Stopped as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}
