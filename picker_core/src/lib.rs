//! Interaction picker: a bounded list of host-supplied interactions plus a
//! trailing cancel entry, navigated with circular wraparound and committed or
//! cancelled through fire-and-forget host commands.

pub mod bridge;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod render;
pub mod selection;

pub use bridge::{HostBridge, RecordingBridge};
pub use catalog::{normalize, InteractionOption, PickerEntry, PickerList};
pub use config::{PickerConfig, DEFAULT_MAX_ITEMS};
pub use controller::{PickerController, Transition};
pub use error::PickerError;
pub use render::{render, PickerSurface, RecordingSurface, SurfaceEvent, VisibleList, VisibleRow};
pub use selection::Selection;
