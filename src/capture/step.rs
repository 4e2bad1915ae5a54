use std::sync::Arc;

use parking_lot::RwLock;

/// The step currently being drawn, as shown in frame overlays.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepInfo {
    /// 0 before the first instruction; overlays are only drawn for `> 0`.
    pub step_number: u32,
    pub description: String,
}

impl StepInfo {
    pub fn new(step_number: u32, description: impl Into<String>) -> Self {
        Self {
            step_number,
            description: description.into(),
        }
    }
}

/// Single-slot holder for the current [`StepInfo`].
///
/// Publishing swaps the whole value, so a reader sees either the old pair or the new pair.
#[derive(Clone, Debug, Default)]
pub struct StepSlot {
    inner: Arc<RwLock<Arc<StepInfo>>>,
}

impl StepSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, info: StepInfo) {
        let info = Arc::new(info);
        *self.inner.write() = info;
    }

    pub fn current(&self) -> Arc<StepInfo> {
        Arc::clone(&self.inner.read())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/step.rs"]
mod tests;
