use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ProtocolError;

/// Control message kinds the overlay reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InboundKind {
    ShowPicker,
    HidePicker,
    SelectPrevious,
    SelectNext,
    ConfirmSelection,
}

impl InboundKind {
    /// Resolves a `type` field, including the names older hosts still send.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "showPicker" | "showInteractionPicker" => Some(Self::ShowPicker),
            "hidePicker" | "hideInteractionPicker" => Some(Self::HidePicker),
            "selectPrevious" | "moveSelectionUp" => Some(Self::SelectPrevious),
            "selectNext" | "moveSelectionDown" => Some(Self::SelectNext),
            "confirmSelection" | "startInteraction" => Some(Self::ConfirmSelection),
            _ => None,
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            Self::ShowPicker => "showPicker",
            Self::HidePicker => "hidePicker",
            Self::SelectPrevious => "selectPrevious",
            Self::SelectNext => "selectNext",
            Self::ConfirmSelection => "confirmSelection",
        }
    }
}

/// A decoded host-to-overlay control message.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// `interactions` is kept raw; the overlay validates it when normalising.
    ShowPicker { interactions: Value },
    HidePicker,
    SelectPrevious,
    SelectNext,
    ConfirmSelection,
}

impl InboundMessage {
    /// Decodes a `{ type, ...payload }` object.
    ///
    /// Returns `Ok(None)` for message kinds the overlay does not handle so the
    /// caller can ignore them without treating them as errors.
    pub fn from_value(value: &Value) -> Result<Option<Self>, ProtocolError> {
        let type_name = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingMessageType)?;
        let Some(kind) = InboundKind::from_type_name(type_name) else {
            return Ok(None);
        };
        let message = match kind {
            InboundKind::ShowPicker => Self::ShowPicker {
                interactions: value.get("interactions").cloned().unwrap_or(Value::Null),
            },
            InboundKind::HidePicker => Self::HidePicker,
            InboundKind::SelectPrevious => Self::SelectPrevious,
            InboundKind::SelectNext => Self::SelectNext,
            InboundKind::ConfirmSelection => Self::ConfirmSelection,
        };
        Ok(Some(message))
    }

    pub fn kind(&self) -> InboundKind {
        match self {
            Self::ShowPicker { .. } => InboundKind::ShowPicker,
            Self::HidePicker => InboundKind::HidePicker,
            Self::SelectPrevious => InboundKind::SelectPrevious,
            Self::SelectNext => InboundKind::SelectNext,
            Self::ConfirmSelection => InboundKind::ConfirmSelection,
        }
    }

    /// Encodes the message the way a host would send it.
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert(
            "type".to_string(),
            Value::String(self.kind().type_name().to_string()),
        );
        if let Self::ShowPicker { interactions } = self {
            object.insert("interactions".to_string(), interactions.clone());
        }
        Value::Object(object)
    }
}

/// Numeric field that hosts send either as a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(serde_json::Number),
    Text(String),
}

impl LooseNumber {
    /// Finite floating-point reading of the value.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Number(number) => number.as_f64()?,
            Self::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    /// Integer reading; integral floats such as `12.0` are accepted.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(number) => number.as_i64().or_else(|| {
                number
                    .as_f64()
                    .filter(|value| value.fract() == 0.0)
                    .filter(|value| *value >= i64::MIN as f64 && *value <= i64::MAX as f64)
                    .map(|value| value as i64)
            }),
            Self::Text(text) => text.trim().parse::<i64>().ok(),
        }
    }
}

impl From<f64> for LooseNumber {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(Self::Number)
            .unwrap_or_else(|| Self::Text(value.to_string()))
    }
}

impl From<i64> for LooseNumber {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for LooseNumber {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// One interaction record as the host supplies it, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInteraction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<LooseNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<LooseNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<LooseNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<LooseNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<LooseNumber>,
}

/// Decodes the first `limit` records of the `interactions` field of a show
/// message. Records past `limit` are dropped without being inspected.
///
/// Hosts normally send the list as a JSON-encoded string; an inline array is
/// accepted as well.
pub fn decode_interactions(
    value: &Value,
    limit: usize,
) -> Result<Vec<RawInteraction>, ProtocolError> {
    let list = match value {
        Value::String(encoded) => serde_json::from_str::<Value>(encoded)?,
        Value::Array(_) => value.clone(),
        Value::Null => {
            return Err(ProtocolError::MalformedInteractions(
                "missing `interactions` field".to_string(),
            ))
        }
        other => {
            return Err(ProtocolError::MalformedInteractions(format!(
                "expected an encoded array, found {}",
                json_type_name(other)
            )))
        }
    };
    let records = match list {
        Value::Array(records) => records,
        other => {
            return Err(ProtocolError::MalformedInteractions(format!(
                "expected an array, found {}",
                json_type_name(&other)
            )))
        }
    };
    records
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, record)| {
            serde_json::from_value::<RawInteraction>(record).map_err(|err| {
                ProtocolError::MalformedInteractions(format!("interaction {index}: {err}"))
            })
        })
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Body of a marker update; `None` serialises as `null` and clears the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerBody {
    pub entity: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartBody {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub heading: f64,
    pub scenario: String,
    pub object: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopBody {}

/// Overlay-to-host request. Serialises as `{ "endpoint": ..., "body": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "endpoint", content = "body")]
pub enum HostCommand {
    #[serde(rename = "setInteractionMarker")]
    SetMarker(MarkerBody),
    #[serde(rename = "startInteraction")]
    Start(StartBody),
    #[serde(rename = "stopInteraction")]
    Stop(StopBody),
}

impl HostCommand {
    pub fn marker(entity: Option<i64>) -> Self {
        Self::SetMarker(MarkerBody { entity })
    }

    pub fn clear_marker() -> Self {
        Self::marker(None)
    }

    pub fn stop() -> Self {
        Self::Stop(StopBody {})
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::SetMarker(_) => "setInteractionMarker",
            Self::Start(_) => "startInteraction",
            Self::Stop(_) => "stopInteraction",
        }
    }

    /// JSON body sent to the endpoint.
    pub fn body(&self) -> Result<Value, ProtocolError> {
        let body = match self {
            Self::SetMarker(body) => serde_json::to_value(body)?,
            Self::Start(body) => serde_json::to_value(body)?,
            Self::Stop(body) => serde_json::to_value(body)?,
        };
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_type_names_resolve_to_current_kinds() {
        assert_eq!(
            InboundKind::from_type_name("showInteractionPicker"),
            Some(InboundKind::ShowPicker)
        );
        assert_eq!(
            InboundKind::from_type_name("moveSelectionUp"),
            Some(InboundKind::SelectPrevious)
        );
        assert_eq!(
            InboundKind::from_type_name("startInteraction"),
            Some(InboundKind::ConfirmSelection)
        );
        assert_eq!(InboundKind::from_type_name("openInventory"), None);
    }

    #[test]
    fn unknown_message_kinds_are_ignored_not_errors() {
        let decoded = InboundMessage::from_value(&json!({ "type": "toggleHud" }))
            .expect("unknown kind should decode");
        assert_eq!(decoded, None);
    }

    #[test]
    fn message_without_type_is_an_error() {
        assert!(matches!(
            InboundMessage::from_value(&json!({ "interactions": "[]" })),
            Err(ProtocolError::MissingMessageType)
        ));
    }

    #[test]
    fn show_message_keeps_raw_interactions() {
        let value = json!({ "type": "showPicker", "interactions": "[]" });
        let message = InboundMessage::from_value(&value)
            .expect("decode")
            .expect("known kind");
        assert_eq!(
            message,
            InboundMessage::ShowPicker {
                interactions: json!("[]")
            }
        );
        assert_eq!(message.to_value(), value);
    }

    #[test]
    fn interactions_decode_from_encoded_string_or_array() {
        let encoded = json!(r#"[{"modelName":"prop_bench","scenario":"SIT","x":"1.5","object":7}]"#);
        let from_string = decode_interactions(&encoded, 50).expect("string form");
        assert_eq!(from_string.len(), 1);
        assert_eq!(from_string[0].model_name.as_deref(), Some("prop_bench"));
        assert_eq!(from_string[0].x.as_ref().and_then(LooseNumber::as_f64), Some(1.5));
        assert_eq!(from_string[0].object.as_ref().and_then(LooseNumber::as_i64), Some(7));

        let inline = json!([{ "modelName": "prop_bench", "scenario": "SIT" }]);
        assert_eq!(decode_interactions(&inline, 50).expect("array form").len(), 1);
    }

    #[test]
    fn interactions_reject_non_lists() {
        assert!(decode_interactions(&Value::Null, 50).is_err());
        assert!(decode_interactions(&json!("{\"a\":1}"), 50).is_err());
        assert!(decode_interactions(&json!("not json"), 50).is_err());
        assert!(decode_interactions(&json!(12), 50).is_err());
    }

    #[test]
    fn records_past_the_limit_are_never_decoded() {
        let mut records: Vec<Value> = (0..3)
            .map(|index| json!({ "modelName": format!("prop_{index}"), "scenario": "SIT" }))
            .collect();
        records.push(json!({ "label": 5 }));
        records.push(Value::Null);
        let encoded = Value::String(Value::Array(records).to_string());

        let kept = decode_interactions(&encoded, 3).expect("bad records are out of range");
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[2].model_name.as_deref(), Some("prop_2"));

        let err = decode_interactions(&encoded, 4).unwrap_err();
        assert!(err.to_string().contains("interaction 3"), "{err}");
    }

    #[test]
    fn loose_numbers_parse_strings_and_reject_garbage() {
        assert_eq!(LooseNumber::from("  -3.25 ").as_f64(), Some(-3.25));
        assert_eq!(LooseNumber::from("NaN").as_f64(), None);
        assert_eq!(LooseNumber::from("abc").as_f64(), None);
        assert_eq!(LooseNumber::from("1024").as_i64(), Some(1024));
        assert_eq!(LooseNumber::from("10.5").as_i64(), None);
        assert_eq!(LooseNumber::from(12.0).as_i64(), Some(12));
        assert_eq!(LooseNumber::from(12.5).as_i64(), None);
    }

    #[test]
    fn commands_serialise_to_endpoint_and_body() {
        let start = HostCommand::Start(StartBody {
            x: 1.0,
            y: 2.0,
            z: 3.5,
            heading: 90.0,
            scenario: "PROP_HUMAN_SEAT_BENCH".to_string(),
            object: 4242,
        });
        assert_eq!(
            serde_json::to_value(&start).expect("start"),
            json!({
                "endpoint": "startInteraction",
                "body": {
                    "x": 1.0, "y": 2.0, "z": 3.5, "heading": 90.0,
                    "scenario": "PROP_HUMAN_SEAT_BENCH", "object": 4242
                }
            })
        );
        assert_eq!(HostCommand::stop().body().expect("stop"), json!({}));
        assert_eq!(
            HostCommand::clear_marker().body().expect("clear"),
            json!({ "entity": null })
        );
    }
}
