use std::num::NonZeroUsize;

use picker_protocol::InboundMessage;
use serde_json::Value;

use crate::bridge::HostBridge;
use crate::catalog::{normalize_payload, PickerEntry, PickerList};
use crate::config::PickerConfig;
use crate::error::PickerError;
use crate::render::{render, PickerSurface, VisibleList};
use crate::selection::Selection;

#[derive(Debug, Clone, PartialEq)]
enum PickerState {
    Hidden,
    Visible {
        list: PickerList,
        selection: Selection,
    },
}

/// Result of handling one inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Shown { entries: usize },
    Moved { index: usize },
    Started { object: i64 },
    Stopped,
    Hidden,
    /// The message had no effect in the current state.
    Ignored,
    /// A show message carried a list that could not be used.
    Rejected { reason: String },
}

/// Owns the picker state and reacts to host control messages one at a time.
pub struct PickerController<B, S> {
    max_items: NonZeroUsize,
    state: PickerState,
    bridge: B,
    surface: S,
}

impl<B: HostBridge, S: PickerSurface> PickerController<B, S> {
    pub fn new(config: PickerConfig, bridge: B, surface: S) -> Result<Self, PickerError> {
        Ok(Self {
            max_items: config.max_items_limit()?,
            state: PickerState::Hidden,
            bridge,
            surface,
        })
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.state, PickerState::Visible { .. })
    }

    pub fn selected_index(&self) -> Option<usize> {
        match &self.state {
            PickerState::Visible { selection, .. } => Some(selection.index()),
            PickerState::Hidden => None,
        }
    }

    pub fn selected_entry(&self) -> Option<&PickerEntry> {
        match &self.state {
            PickerState::Visible { list, selection } => list.get(selection.index()),
            PickerState::Hidden => None,
        }
    }

    pub fn list(&self) -> Option<&PickerList> {
        match &self.state {
            PickerState::Visible { list, .. } => Some(list),
            PickerState::Hidden => None,
        }
    }

    /// Current projection of the picker, `None` while hidden.
    pub fn visible_list(&self) -> Option<VisibleList> {
        match &self.state {
            PickerState::Visible { list, selection } => Some(render(list, selection.index())),
            PickerState::Hidden => None,
        }
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Decodes a raw `{ type, ... }` message and handles it.
    ///
    /// Messages without a usable `type` and unknown kinds are ignored.
    pub fn handle_value(&mut self, value: &Value) -> Transition {
        match InboundMessage::from_value(value) {
            Ok(Some(message)) => self.handle(message),
            Ok(None) => {
                log::debug!("ignoring unknown picker message {value}");
                Transition::Ignored
            }
            Err(err) => {
                log::warn!("ignoring undecodable picker message: {err}");
                Transition::Ignored
            }
        }
    }

    pub fn handle(&mut self, message: InboundMessage) -> Transition {
        match message {
            InboundMessage::ShowPicker { interactions } => self.show(&interactions),
            InboundMessage::HidePicker => self.hide(),
            InboundMessage::SelectNext => self.navigate(Selection::next),
            InboundMessage::SelectPrevious => self.navigate(Selection::previous),
            InboundMessage::ConfirmSelection => self.confirm(),
        }
    }

    fn show(&mut self, interactions: &Value) -> Transition {
        let built = normalize_payload(interactions, self.max_items)
            .and_then(|list| Selection::new(list.len().get()).map(|selection| (list, selection)));
        let (list, selection) = match built {
            Ok(built) => built,
            Err(err) => {
                log::warn!("picker not shown: {err}");
                return Transition::Rejected {
                    reason: err.to_string(),
                };
            }
        };

        let entries = list.len().get();
        log::info!(
            "showing interaction picker with {} interactions",
            list.interaction_count()
        );
        self.state = PickerState::Visible { list, selection };
        self.refresh();
        Transition::Shown { entries }
    }

    fn hide(&mut self) -> Transition {
        if !self.is_visible() {
            return Transition::Ignored;
        }
        self.state = PickerState::Hidden;
        self.surface.hide();
        Transition::Hidden
    }

    fn navigate(&mut self, step: fn(Selection) -> Selection) -> Transition {
        let index = match &mut self.state {
            PickerState::Visible { selection, .. } => {
                *selection = step(*selection);
                selection.index()
            }
            PickerState::Hidden => {
                log::debug!("navigation ignored while picker is hidden");
                return Transition::Ignored;
            }
        };
        self.refresh();
        Transition::Moved { index }
    }

    fn confirm(&mut self) -> Transition {
        let transition = match self.selected_entry() {
            Some(PickerEntry::Interaction(option)) => {
                log::info!(
                    "starting {} on object {}",
                    option.scenario_id,
                    option.object_handle
                );
                self.bridge.send_start(option);
                Transition::Started {
                    object: option.object_handle,
                }
            }
            Some(PickerEntry::Cancel) => {
                log::info!("stopping current interaction");
                self.bridge.send_stop();
                Transition::Stopped
            }
            None => {
                log::debug!("confirm ignored while picker is hidden");
                return Transition::Ignored;
            }
        };
        self.state = PickerState::Hidden;
        self.surface.hide();
        transition
    }

    /// Re-renders the surface, then points the marker at the selected entry.
    fn refresh(&mut self) {
        let PickerState::Visible { list, selection } = &self.state else {
            return;
        };
        let visible = render(list, selection.index());
        self.surface.present(&visible);
        if let Some(entry) = list.get(selection.index()) {
            self.bridge.send_marker_update(entry);
        }
    }
}
