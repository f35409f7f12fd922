//! # Robotic Arm Telemetry Simulator
//!
//! Simulates telemetry for a single six-axis robotic arm and continuously
//! derives a health / remaining-useful-life signal, exposing both as a live
//! event feed over line-delimited JSON TCP.
//!
//! ## Features
//!
//! - **Synthetic telemetry**: fault-aware random walk over thirteen sensor
//!   channels, seeded with a plausible sinusoidal history
//! - **Health model**: instantaneous scoring plus irreversible lifetime wear;
//!   the combined minimum drives an automatic emergency shutdown
//! - **Fault injection**: six independently toggleable fault channels with a
//!   three-state severity cycle
//! - **Maintenance log**: bounded, newest-first advisory record
//! - **Event broadcasting**: snapshot on connect, deltas on every change
//!
//! ## Quick Start
//!
//! ```rust
//! use armsim::engine::SimulationEngine;
//! use armsim::scheduler::TICK_PERIOD_MS;
//!
//! let mut engine = SimulationEngine::new(0);
//! let events = engine.tick(TICK_PERIOD_MS);
//! assert_eq!(events.len(), 2); // newData + healthUpdate
//! ```
//!
//! ## Architecture
//!
//! - [`engine`] - system state, tick orchestration, command handling
//! - [`telemetry`] - frame generation and the fault-aware random walk
//! - [`health`] - instantaneous / lifetime / combined scoring
//! - [`fault`] - the fixed fault channel set and severity cycle
//! - [`maintenance`] - bounded advisory log
//! - [`protocol`] - wire commands, events, and the line codec
//! - [`scheduler`] - tick period and the async periodic driver

#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]

pub mod engine;
pub mod fault;
pub mod health;
pub mod maintenance;
pub mod protocol;
pub mod scheduler;
pub mod telemetry;

// Re-export main public types for convenience
pub use engine::SimulationEngine;
pub use fault::{FaultId, FaultMap, Severity};
pub use protocol::{Command, Event, Snapshot};
pub use telemetry::{TelemetryFrame, TelemetryGenerator};
