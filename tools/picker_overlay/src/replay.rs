use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use picker_core::{HostBridge, PickerConfig, PickerController, PickerError};
use picker_protocol::HostCommand;
use serde_json::Value;

use crate::surface::TextSurface;

/// Writes each command as a `command <json>` line.
pub struct JsonLinesBridge<W: Write> {
    out: RefCell<W>,
}

impl<W: Write> JsonLinesBridge<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }
}

impl<W: Write> HostBridge for JsonLinesBridge<W> {
    fn dispatch(&self, command: &HostCommand) -> Result<(), PickerError> {
        let json = serde_json::to_string(command)
            .map_err(|err| PickerError::TransportFailure(err.to_string()))?;
        let mut out = self.out.borrow_mut();
        writeln!(out, "command {json}")
            .and_then(|_| out.flush())
            .map_err(|err| PickerError::TransportFailure(err.to_string()))
    }
}

/// Feeds a recorded JSON-lines message log through the picker in order.
pub fn run(path: &Path, config: PickerConfig) -> Result<()> {
    let file = File::open(path)
        .with_context(|| format!("opening replay log {}", path.display()))?;
    let mut controller = PickerController::new(
        config,
        JsonLinesBridge::new(io::stdout()),
        TextSurface::new(io::stdout()),
    )?;

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("reading replay log line {line_no}"))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(message) => {
                let transition = controller.handle_value(&message);
                log::debug!("line {line_no}: {transition:?}");
            }
            Err(err) => {
                log::warn!("line {line_no}: skipping invalid json ({err})");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_written_as_prefixed_json_lines() {
        let bridge = JsonLinesBridge::new(Vec::new());
        bridge.send(HostCommand::marker(Some(9)));
        bridge.send_stop();

        let text = String::from_utf8(bridge.out.into_inner()).expect("utf8 output");
        assert_eq!(
            text,
            "command {\"endpoint\":\"setInteractionMarker\",\"body\":{\"entity\":9}}\n\
             command {\"endpoint\":\"stopInteraction\",\"body\":{}}\n"
        );
    }
}
