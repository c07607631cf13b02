use std::{cell::RefCell, rc::Rc};

use picker_protocol::HostCommand;

use crate::catalog::{InteractionOption, PickerEntry};
use crate::error::PickerError;

/// Outbound channel to the host game process.
///
/// Commands are fire-and-forget: [`HostBridge::send`] never reports failure to
/// the caller, so local picker state moves on whether or not the host received
/// the request.
pub trait HostBridge {
    /// Hands one command to the transport.
    fn dispatch(&self, command: &HostCommand) -> Result<(), PickerError>;

    fn send(&self, command: HostCommand) {
        if let Err(err) = self.dispatch(&command) {
            log::warn!("dropped {} command: {err}", command.endpoint());
        }
    }

    /// Points the in-world marker at `entry`, or clears it for the cancel entry.
    fn send_marker_update(&self, entry: &PickerEntry) {
        self.send(entry.marker_command());
    }

    fn send_start(&self, option: &InteractionOption) {
        self.send(option.start_command());
    }

    fn send_stop(&self) {
        self.send(HostCommand::stop());
    }
}

impl<T: HostBridge + ?Sized> HostBridge for Box<T> {
    fn dispatch(&self, command: &HostCommand) -> Result<(), PickerError> {
        (**self).dispatch(command)
    }
}

/// Bridge that keeps every command in memory; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingBridge {
    commands: Rc<RefCell<Vec<HostCommand>>>,
}

impl RecordingBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<HostCommand> {
        self.commands.borrow().clone()
    }

    pub fn take(&self) -> Vec<HostCommand> {
        std::mem::take(&mut *self.commands.borrow_mut())
    }
}

impl HostBridge for RecordingBridge {
    fn dispatch(&self, command: &HostCommand) -> Result<(), PickerError> {
        self.commands.borrow_mut().push(command.clone());
        Ok(())
    }
}
