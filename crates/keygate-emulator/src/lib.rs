//! Keygate access-control device emulator.
//!
//! This crate assembles the keypad front end, the credential store and the
//! annunciator into a complete device:
//!
//! - [`EntrySequencer`]: ten keystrokes under the entry timeout
//! - [`Annunciator`]: status, success and failure indicators
//! - [`AccessController`]: one handler per interrupt, run to completion
//! - [`Simulation`]: deterministic virtual-clock harness
//! - [`DeviceRuntime`]: real-time tokio runtime with a single dispatcher

pub mod annunciator;
pub mod config;
pub mod controller;
pub mod error;
pub mod runtime;
pub mod sequencer;
pub mod simulation;
pub mod state;

pub use annunciator::{Annunciator, AnnunciatorState, StateTransition};
pub use config::DeviceConfig;
pub use controller::AccessController;
pub use error::{EmulatorError, Result};
pub use runtime::{DeviceRuntime, RuntimeController, RuntimeEvent, RuntimeHandle, TokioAlarms};
pub use sequencer::{EntrySequencer, EntrySession, SequencerEvent, SequencerState};
pub use simulation::Simulation;
pub use state::{AccessControlState, AttemptRecord};
