use serde::{Deserialize, Serialize};

/// The closed set of fault channels on the simulated arm. Fixed at six
/// entries; unknown identifiers on the wire are ignored rather than added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FaultId {
    Overheating,
    TorqueImbalance,
    EncoderLoss,
    PowerFluctuation,
    GripperMalfunction,
    CommDelay,
}

pub const FAULT_COUNT: usize = 6;

pub const ALL_FAULTS: [FaultId; FAULT_COUNT] = [
    FaultId::Overheating,
    FaultId::TorqueImbalance,
    FaultId::EncoderLoss,
    FaultId::PowerFluctuation,
    FaultId::GripperMalfunction,
    FaultId::CommDelay,
];

impl FaultId {
    /// Parse a wire identifier. Returns `None` for anything outside the
    /// fixed set, which callers treat as a no-op command.
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "overheating" => Some(FaultId::Overheating),
            "torqueImbalance" => Some(FaultId::TorqueImbalance),
            "encoderLoss" => Some(FaultId::EncoderLoss),
            "powerFluctuation" => Some(FaultId::PowerFluctuation),
            "gripperMalfunction" => Some(FaultId::GripperMalfunction),
            "commDelay" => Some(FaultId::CommDelay),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FaultId::Overheating => "overheating",
            FaultId::TorqueImbalance => "torqueImbalance",
            FaultId::EncoderLoss => "encoderLoss",
            FaultId::PowerFluctuation => "powerFluctuation",
            FaultId::GripperMalfunction => "gripperMalfunction",
            FaultId::CommDelay => "commDelay",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Severity {
    #[default]
    #[serde(rename = "OK")]
    Ok,
    Warning,
    Critical,
}

impl Severity {
    /// Single transition rule: OK -> Warning -> Critical -> OK.
    pub fn advance(self) -> Self {
        match self {
            Severity::Ok => Severity::Warning,
            Severity::Warning => Severity::Critical,
            Severity::Critical => Severity::Ok,
        }
    }

    pub fn is_active(self) -> bool {
        self != Severity::Ok
    }
}

/// Per-channel fault severities. One field per [`FaultId`], so the set of
/// keys is fixed at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaultMap {
    pub overheating: Severity,
    pub torque_imbalance: Severity,
    pub encoder_loss: Severity,
    pub power_fluctuation: Severity,
    pub gripper_malfunction: Severity,
    pub comm_delay: Severity,
}

impl FaultMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: FaultId) -> Severity {
        match id {
            FaultId::Overheating => self.overheating,
            FaultId::TorqueImbalance => self.torque_imbalance,
            FaultId::EncoderLoss => self.encoder_loss,
            FaultId::PowerFluctuation => self.power_fluctuation,
            FaultId::GripperMalfunction => self.gripper_malfunction,
            FaultId::CommDelay => self.comm_delay,
        }
    }

    pub fn set(&mut self, id: FaultId, severity: Severity) {
        match id {
            FaultId::Overheating => self.overheating = severity,
            FaultId::TorqueImbalance => self.torque_imbalance = severity,
            FaultId::EncoderLoss => self.encoder_loss = severity,
            FaultId::PowerFluctuation => self.power_fluctuation = severity,
            FaultId::GripperMalfunction => self.gripper_malfunction = severity,
            FaultId::CommDelay => self.comm_delay = severity,
        }
    }

    /// Advance one channel through the severity cycle and return the new
    /// severity.
    pub fn toggle(&mut self, id: FaultId) -> Severity {
        let next = self.get(id).advance();
        self.set(id, next);
        next
    }

    /// Reset every channel to OK (restart semantics).
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self, id: FaultId) -> bool {
        self.get(id).is_active()
    }

    /// Count channels at a given severity, used for health penalties.
    pub fn count_at(&self, severity: Severity) -> usize {
        ALL_FAULTS
            .iter()
            .filter(|id| self.get(**id) == severity)
            .count()
    }
}
