use crate::fault::FaultMap;
use crate::maintenance::LogEntry;
use crate::telemetry::TelemetryFrame;
use arrayvec::ArrayString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_COMMAND_SIZE: usize = 256;
// A full snapshot (20 frames + 50 log entries) serializes well under this.
pub const MAX_EVENT_SIZE: usize = 32 * 1024;

pub type CommandBuffer = ArrayString<MAX_COMMAND_SIZE>;

/// Inbound commands, one JSON object per line:
/// `{"command":"toggleFault","id":"overheating"}`. Commands carry no
/// acknowledgment; effects are observed via subsequent broadcast events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    /// `id` stays a free-form string so unrecognized identifiers can arrive
    /// and be ignored instead of failing the parse.
    ToggleFault { id: String },
    RestartSystem,
    ShutdownSystem,
}

/// Full state snapshot sent on subscriber connect and on restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub data: Vec<TelemetryFrame>,
    pub health: f64,
    pub faults: FaultMap,
    pub log: Vec<LogEntry>,
    pub halted: bool,
}

/// Outbound events, one JSON object per line:
/// `{"event":"healthUpdate","payload":97.3}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum Event {
    InitialData(Snapshot),
    NewData(TelemetryFrame),
    HealthUpdate(f64),
    FaultUpdate(FaultMap),
    LogUpdate(Vec<LogEntry>),
    Shutdown(String),
    SystemReset(Snapshot),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("invalid JSON format")]
    InvalidJson,
    #[error("message exceeds buffer size")]
    MessageTooLarge,
    #[error("serialization failed")]
    SerializationError,
}

/// Line codec with a preallocated command buffer.
#[derive(Debug)]
pub struct WireCodec {
    command_buffer: CommandBuffer,
}

impl WireCodec {
    pub fn new() -> Self {
        Self {
            command_buffer: ArrayString::new(),
        }
    }

    pub fn parse_command(&mut self, json_str: &str) -> Result<Command, ProtocolError> {
        self.command_buffer.clear();
        if json_str.len() > MAX_COMMAND_SIZE {
            return Err(ProtocolError::MessageTooLarge);
        }
        self.command_buffer.push_str(json_str);

        serde_json::from_str::<Command>(&self.command_buffer).map_err(|_| ProtocolError::InvalidJson)
    }

    pub fn encode_event(&self, event: &Event) -> Result<String, ProtocolError> {
        let json_str =
            serde_json::to_string(event).map_err(|_| ProtocolError::SerializationError)?;
        if json_str.len() > MAX_EVENT_SIZE {
            return Err(ProtocolError::MessageTooLarge);
        }
        Ok(json_str)
    }
}

impl Default for WireCodec {
    fn default() -> Self {
        Self::new()
    }
}
