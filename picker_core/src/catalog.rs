use std::num::NonZeroUsize;

use picker_protocol::{decode_interactions, HostCommand, LooseNumber, RawInteraction, StartBody};
use serde_json::Value;

use crate::error::PickerError;

/// A validated interaction the player can start.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionOption {
    pub object_handle: i64,
    pub position: [f64; 3],
    pub heading: f64,
    pub scenario_id: String,
    pub model_name: String,
    pub label: Option<String>,
}

impl InteractionOption {
    /// Validates one host record. `index` is only used in error messages.
    pub fn from_raw(index: usize, raw: &RawInteraction) -> Result<Self, PickerError> {
        let float = |field: &str, value: &Option<LooseNumber>| {
            value
                .as_ref()
                .and_then(LooseNumber::as_f64)
                .ok_or_else(|| invalid_field(index, field))
        };

        let object_handle = raw
            .object
            .as_ref()
            .and_then(LooseNumber::as_i64)
            .ok_or_else(|| invalid_field(index, "object"))?;
        let position = [
            float("x", &raw.x)?,
            float("y", &raw.y)?,
            float("z", &raw.z)?,
        ];
        let heading = float("heading", &raw.heading)?;
        let scenario_id = raw
            .scenario
            .clone()
            .ok_or_else(|| invalid_field(index, "scenario"))?;

        Ok(Self {
            object_handle,
            position,
            heading,
            scenario_id,
            model_name: raw.model_name.clone().unwrap_or_default(),
            label: raw.label.clone().filter(|label| !label.is_empty()),
        })
    }

    pub fn display_text(&self) -> String {
        match self.label.as_deref() {
            Some(label) => format!("{}: {} ({})", self.model_name, self.scenario_id, label),
            None => format!("{}: {}", self.model_name, self.scenario_id),
        }
    }

    pub fn start_command(&self) -> HostCommand {
        let [x, y, z] = self.position;
        HostCommand::Start(StartBody {
            x,
            y,
            z,
            heading: self.heading,
            scenario: self.scenario_id.clone(),
            object: self.object_handle,
        })
    }
}

fn invalid_field(index: usize, field: &str) -> PickerError {
    PickerError::MalformedPayload(format!("interaction {index}: missing or invalid `{field}`"))
}

#[derive(Debug, Clone, PartialEq)]
pub enum PickerEntry {
    Interaction(InteractionOption),
    Cancel,
}

impl PickerEntry {
    pub fn is_cancel(&self) -> bool {
        matches!(self, PickerEntry::Cancel)
    }

    pub fn object_handle(&self) -> Option<i64> {
        match self {
            PickerEntry::Interaction(option) => Some(option.object_handle),
            PickerEntry::Cancel => None,
        }
    }

    /// Marker update for this entry; the cancel entry clears the marker.
    pub fn marker_command(&self) -> HostCommand {
        HostCommand::marker(self.object_handle())
    }
}

/// Host interactions in arrival order, always terminated by [`PickerEntry::Cancel`].
#[derive(Debug, Clone, PartialEq)]
pub struct PickerList {
    entries: Vec<PickerEntry>,
}

impl PickerList {
    fn from_interactions(interactions: Vec<InteractionOption>) -> Self {
        let mut entries: Vec<PickerEntry> = interactions
            .into_iter()
            .map(PickerEntry::Interaction)
            .collect();
        entries.push(PickerEntry::Cancel);
        Self { entries }
    }

    /// Entry count including the cancel entry; never zero.
    pub fn len(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.entries.len()).unwrap_or(NonZeroUsize::MIN)
    }

    pub fn entries(&self) -> &[PickerEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&PickerEntry> {
        self.entries.get(index)
    }

    pub fn interaction_count(&self) -> usize {
        self.entries.len() - 1
    }
}

/// Keeps the first `max_items` host records in order and appends the cancel entry.
pub fn normalize(
    raw: &[RawInteraction],
    max_items: NonZeroUsize,
) -> Result<PickerList, PickerError> {
    let kept = raw.len().min(max_items.get());
    if raw.len() > kept {
        log::debug!(
            "truncating interaction list from {} to {} entries",
            raw.len(),
            kept
        );
    }
    let interactions = raw[..kept]
        .iter()
        .enumerate()
        .map(|(index, record)| InteractionOption::from_raw(index, record))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PickerList::from_interactions(interactions))
}

/// Decodes the `interactions` field of a show message and normalises it.
pub fn normalize_payload(
    payload: &Value,
    max_items: NonZeroUsize,
) -> Result<PickerList, PickerError> {
    let raw = decode_interactions(payload, max_items.get())?;
    normalize(&raw, max_items)
}
