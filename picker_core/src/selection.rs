use std::num::NonZeroUsize;

use crate::error::PickerError;

/// Resets the selection for a freshly built list of `count` entries.
pub fn initialize(count: usize) -> Result<usize, PickerError> {
    if count == 0 {
        return Err(PickerError::InvalidCount(count));
    }
    Ok(0)
}

pub fn move_down(index: usize, count: NonZeroUsize) -> usize {
    let count = count.get();
    (index % count + 1) % count
}

pub fn move_up(index: usize, count: NonZeroUsize) -> usize {
    let count = count.get();
    (index % count + count - 1) % count
}

/// Cursor over a picker list; the index always stays inside `[0, count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    index: usize,
    count: NonZeroUsize,
}

impl Selection {
    pub fn new(count: usize) -> Result<Self, PickerError> {
        let index = initialize(count)?;
        let count = NonZeroUsize::new(count).ok_or(PickerError::InvalidCount(count))?;
        Ok(Self { index, count })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn count(&self) -> NonZeroUsize {
        self.count
    }

    pub fn next(self) -> Self {
        Self {
            index: move_down(self.index, self.count),
            ..self
        }
    }

    pub fn previous(self) -> Self {
        Self {
            index: move_up(self.index, self.count),
            ..self
        }
    }
}
