use crate::fault::{FaultId, FaultMap};
use crate::health::{self, HealthState};
use crate::maintenance::{LogSeverity, MaintenanceLog};
use crate::protocol::{Command, Event, Snapshot};
use crate::telemetry::{TelemetryFrame, TelemetryGenerator};
use heapless::Vec;

pub const WINDOW_SIZE: usize = 20;

/// Aggregate root for the simulated device. Owned exclusively by the
/// [`SimulationEngine`]; subscribers only ever see snapshots and deltas.
#[derive(Debug)]
pub struct SystemState {
    window: Vec<TelemetryFrame, WINDOW_SIZE>,
    faults: FaultMap,
    health: HealthState,
    log: MaintenanceLog,
    halted: bool,
}

/// Single-writer, run-to-completion simulation engine.
///
/// Every state transition happens inside [`tick`](Self::tick) or
/// [`handle_command`](Self::handle_command); both return the resulting
/// state deltas as [`Event`]s for a dispatcher to broadcast, keeping the
/// engine itself transport-free and testable without real time.
#[derive(Debug)]
pub struct SimulationEngine {
    state: SystemState,
    generator: TelemetryGenerator,
}

impl SimulationEngine {
    pub fn new(now_ms: u64) -> Self {
        Self::with_generator(TelemetryGenerator::new(), now_ms)
    }

    pub fn with_seed(seed: u64, now_ms: u64) -> Self {
        Self::with_generator(TelemetryGenerator::with_seed(seed), now_ms)
    }

    fn with_generator(mut generator: TelemetryGenerator, now_ms: u64) -> Self {
        let mut window = Vec::new();
        for frame in generator.bootstrap(WINDOW_SIZE, now_ms) {
            let _ = window.push(frame);
        }

        Self {
            state: SystemState {
                window,
                faults: FaultMap::new(),
                health: HealthState::full(),
                log: MaintenanceLog::new(),
                halted: false,
            },
            generator,
        }
    }

    /// One composite simulation step. A no-op while halted: no telemetry,
    /// health, or fault state is mutated until a restart arrives.
    pub fn tick(&mut self, now_ms: u64) -> std::vec::Vec<Event> {
        if self.state.halted {
            return vec![];
        }

        let lifetime = health::decay_lifetime(self.state.health.lifetime);

        let previous = match self.state.window.last().copied() {
            Some(frame) => frame,
            None => self.generator.baseline_frame(0, now_ms),
        };
        let frame = self.generator.step(&previous, &self.state.faults, now_ms);
        self.push_frame(frame);

        let instantaneous = health::instantaneous(&frame, &self.state.faults);
        let combined = health::combine(instantaneous, lifetime);
        self.state.health = HealthState {
            instantaneous,
            lifetime,
            combined,
        };

        if combined <= 0.0 {
            self.state.halted = true;
            self.state.log.append(
                LogSeverity::Critical,
                "Emergency shutdown - health depleted",
                now_ms,
            );
            return vec![
                Event::LogUpdate(self.state.log.to_vec()),
                Event::Shutdown("Emergency shutdown - health depleted".to_string()),
            ];
        }

        vec![Event::NewData(frame), Event::HealthUpdate(combined)]
    }

    /// Apply one inbound command. Commands interleave with ticks but never
    /// overlap them; each runs to completion on the exclusive state.
    pub fn handle_command(&mut self, command: Command, now_ms: u64) -> std::vec::Vec<Event> {
        match command {
            Command::ToggleFault { id } => self.toggle_fault(&id),
            Command::RestartSystem => self.restart(now_ms),
            Command::ShutdownSystem => self.shutdown(),
        }
    }

    /// Advance one fault channel through its severity cycle. No-op while
    /// halted and for identifiers outside the fixed fault set.
    fn toggle_fault(&mut self, id: &str) -> std::vec::Vec<Event> {
        if self.state.halted {
            return vec![];
        }
        let Some(fault_id) = FaultId::parse(id) else {
            return vec![];
        };

        self.state.faults.toggle(fault_id);
        vec![Event::FaultUpdate(self.state.faults)]
    }

    /// Reinitialize the running state: clear the halt flag, restore lifetime
    /// health, reset every fault, and reseed the telemetry window. The
    /// maintenance log is deliberately preserved.
    fn restart(&mut self, now_ms: u64) -> std::vec::Vec<Event> {
        self.state.halted = false;
        self.state.faults.clear();
        self.state.health = HealthState::full();

        self.state.window.clear();
        for frame in self.generator.bootstrap(WINDOW_SIZE, now_ms) {
            let _ = self.state.window.push(frame);
        }

        vec![Event::SystemReset(self.snapshot())]
    }

    /// Manual halt, valid regardless of current state.
    fn shutdown(&mut self) -> std::vec::Vec<Event> {
        self.state.halted = true;
        vec![Event::Shutdown("System manually shutdown".to_string())]
    }

    fn push_frame(&mut self, frame: TelemetryFrame) {
        if self.state.window.is_full() {
            self.state.window.remove(0);
        }
        let _ = self.state.window.push(frame);
    }

    /// Full state copy for the `initialData` and `systemReset` payloads.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            data: self.state.window.iter().copied().collect(),
            health: self.state.health.combined,
            faults: self.state.faults,
            log: self.state.log.to_vec(),
            halted: self.state.halted,
        }
    }

    pub fn halted(&self) -> bool {
        self.state.halted
    }

    pub fn health(&self) -> HealthState {
        self.state.health
    }

    pub fn faults(&self) -> FaultMap {
        self.state.faults
    }

    pub fn window(&self) -> &[TelemetryFrame] {
        &self.state.window
    }

    pub fn log_entries(&self) -> &[crate::maintenance::LogEntry] {
        self.state.log.entries()
    }

    /// Ground-testing override: pin lifetime health to a given value so wear
    /// scenarios can be exercised without thousands of ticks.
    pub fn force_lifetime(&mut self, lifetime: f64) {
        self.state.health.lifetime = lifetime.clamp(0.0, 100.0);
    }
}
