//! Host selection capabilities

use para_model::SelectionRange;

/// Access to the host's active selection
pub trait SelectionAccess {
    /// The active selection, if any
    fn current_selection(&self) -> Option<SelectionRange>;

    /// Replace the selection and notify the host's listeners
    fn set_selection(&mut self, range: SelectionRange);

    /// Replace the selection without notifying anyone.
    ///
    /// Used while the engine re-establishes a range it has rebased itself.
    fn set_selection_silently(&mut self, range: SelectionRange);
}

/// In-process selection holder that counts host notifications
#[derive(Debug, Clone, Default)]
pub struct MemorySelection {
    range: Option<SelectionRange>,
    notifications: usize,
}

impl MemorySelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(range: SelectionRange) -> Self {
        Self {
            range: Some(range),
            notifications: 0,
        }
    }

    /// How many times listeners would have been notified
    pub fn notifications(&self) -> usize {
        self.notifications
    }

    pub fn clear(&mut self) {
        self.range = None;
    }
}

impl SelectionAccess for MemorySelection {
    fn current_selection(&self) -> Option<SelectionRange> {
        self.range
    }

    fn set_selection(&mut self, range: SelectionRange) {
        self.range = Some(range);
        self.notifications += 1;
    }

    fn set_selection_silently(&mut self, range: SelectionRange) {
        self.range = Some(range);
    }
}
