use std::{cell::RefCell, rc::Rc};

use serde::Serialize;

use crate::catalog::{PickerEntry, PickerList};

/// Text shown for the trailing cancel entry.
pub const CANCEL_LABEL: &str = "End Interaction";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibleRow {
    pub text: String,
    pub selected: bool,
}

/// What the picker surface should display after a state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibleList {
    pub rows: Vec<VisibleRow>,
}

impl VisibleList {
    pub fn selected_index(&self) -> Option<usize> {
        self.rows.iter().position(|row| row.selected)
    }

    pub fn selected_count(&self) -> usize {
        self.rows.iter().filter(|row| row.selected).count()
    }
}

pub fn entry_text(entry: &PickerEntry) -> String {
    match entry {
        PickerEntry::Interaction(option) => option.display_text(),
        PickerEntry::Cancel => CANCEL_LABEL.to_string(),
    }
}

/// Projects the list and cursor into rows; exactly the row at `selected_index` is marked.
pub fn render(list: &PickerList, selected_index: usize) -> VisibleList {
    let rows = list
        .entries()
        .iter()
        .enumerate()
        .map(|(index, entry)| VisibleRow {
            text: entry_text(entry),
            selected: index == selected_index,
        })
        .collect();
    VisibleList { rows }
}

/// UI layer the controller draws onto.
pub trait PickerSurface {
    /// Replaces the displayed rows and makes the picker visible.
    fn present(&mut self, list: &VisibleList);

    /// Clears the rows and hides the picker.
    fn hide(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SurfaceEvent {
    Present { list: VisibleList },
    Hide,
}

/// Surface that records every call; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    events: Rc<RefCell<Vec<SurfaceEvent>>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.borrow().clone()
    }

    pub fn last_presented(&self) -> Option<VisibleList> {
        self.events
            .borrow()
            .iter()
            .rev()
            .find_map(|event| match event {
                SurfaceEvent::Present { list } => Some(list.clone()),
                SurfaceEvent::Hide => None,
            })
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl PickerSurface for RecordingSurface {
    fn present(&mut self, list: &VisibleList) {
        self.events
            .borrow_mut()
            .push(SurfaceEvent::Present { list: list.clone() });
    }

    fn hide(&mut self) {
        self.events.borrow_mut().push(SurfaceEvent::Hide);
    }
}
