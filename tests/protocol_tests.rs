use armsim::engine::SimulationEngine;
use armsim::fault::{FaultId, FaultMap, Severity};
use armsim::maintenance::{LogEntry, LogSeverity};
use armsim::protocol::{
    Command, Event, ProtocolError, Snapshot, WireCodec, MAX_COMMAND_SIZE, MAX_EVENT_SIZE,
};
use armsim::telemetry::TelemetryGenerator;

#[test]
fn test_parse_toggle_fault_command() {
    let mut codec = WireCodec::new();
    let command = codec
        .parse_command(r#"{"command":"toggleFault","id":"overheating"}"#)
        .unwrap();
    assert_eq!(
        command,
        Command::ToggleFault {
            id: "overheating".to_string()
        }
    );
}

#[test]
fn test_parse_restart_and_shutdown_commands() {
    let mut codec = WireCodec::new();
    assert_eq!(
        codec.parse_command(r#"{"command":"restartSystem"}"#).unwrap(),
        Command::RestartSystem
    );
    assert_eq!(
        codec.parse_command(r#"{"command":"shutdownSystem"}"#).unwrap(),
        Command::ShutdownSystem
    );
}

#[test]
fn test_unknown_fault_id_still_parses() {
    // Unknown identifiers must reach the engine (which ignores them) rather
    // than fail at the protocol layer.
    let mut codec = WireCodec::new();
    let command = codec
        .parse_command(r#"{"command":"toggleFault","id":"warpCoilBreach"}"#)
        .unwrap();
    assert_eq!(
        command,
        Command::ToggleFault {
            id: "warpCoilBreach".to_string()
        }
    );
}

#[test]
fn test_malformed_and_unknown_commands_rejected() {
    let mut codec = WireCodec::new();
    assert_eq!(
        codec.parse_command("not json"),
        Err(ProtocolError::InvalidJson)
    );
    assert_eq!(
        codec.parse_command(r#"{"command":"selfDestruct"}"#),
        Err(ProtocolError::InvalidJson)
    );
}

#[test]
fn test_oversized_command_rejected() {
    let mut codec = WireCodec::new();
    let oversized = format!(
        r#"{{"command":"toggleFault","id":"{}"}}"#,
        "x".repeat(MAX_COMMAND_SIZE)
    );
    assert_eq!(
        codec.parse_command(&oversized),
        Err(ProtocolError::MessageTooLarge)
    );
}

#[test]
fn test_event_wire_names_match_contract() {
    let codec = WireCodec::new();
    let mut generator = TelemetryGenerator::with_seed(1);
    let frame = generator.baseline_frame(0, 0);
    let snapshot = Snapshot {
        data: vec![frame],
        health: 100.0,
        faults: FaultMap::new(),
        log: vec![],
        halted: false,
    };

    let cases = [
        (Event::InitialData(snapshot.clone()), r#""event":"initialData""#),
        (Event::NewData(frame), r#""event":"newData""#),
        (Event::HealthUpdate(97.5), r#""event":"healthUpdate""#),
        (Event::FaultUpdate(FaultMap::new()), r#""event":"faultUpdate""#),
        (Event::LogUpdate(vec![]), r#""event":"logUpdate""#),
        (Event::Shutdown("reason".to_string()), r#""event":"shutdown""#),
        (Event::SystemReset(snapshot), r#""event":"systemReset""#),
    ];

    for (event, expected_tag) in cases {
        let line = codec.encode_event(&event).unwrap();
        assert!(
            line.contains(expected_tag),
            "{line} missing {expected_tag}"
        );
    }
}

#[test]
fn test_health_update_payload_is_bare_number() {
    let codec = WireCodec::new();
    let line = codec.encode_event(&Event::HealthUpdate(42.5)).unwrap();
    assert!(line.contains(r#""payload":42.5"#));
}

#[test]
fn test_events_round_trip() {
    let codec = WireCodec::new();
    let mut faults = FaultMap::new();
    faults.set(FaultId::EncoderLoss, Severity::Critical);

    let event = Event::FaultUpdate(faults);
    let line = codec.encode_event(&event).unwrap();
    let decoded: Event = serde_json::from_str(&line).unwrap();
    assert_eq!(decoded, event);

    let log = vec![LogEntry {
        id: 1,
        timestamp_ms: 123,
        severity: LogSeverity::Critical,
        message: "Emergency shutdown - health depleted".to_string(),
    }];
    let event = Event::LogUpdate(log);
    let line = codec.encode_event(&event).unwrap();
    assert!(line.contains(r#""severity":"CRITICAL""#));
    let decoded: Event = serde_json::from_str(&line).unwrap();
    assert_eq!(decoded, event);
}

#[test]
fn test_full_snapshot_fits_event_budget() {
    // Worst realistic case: full window plus a full maintenance log, built
    // by repeatedly depleting lifetime and restarting.
    let mut engine = SimulationEngine::with_seed(2, 1_000_000);
    for n in 0..60u64 {
        engine.force_lifetime(0.0);
        engine.tick(1_000_000 + n * 3000);
        engine.handle_command(Command::RestartSystem, 1_000_000 + n * 3000);
    }
    assert_eq!(engine.log_entries().len(), 50);
    let codec = WireCodec::new();
    let line = codec.encode_event(&Event::InitialData(engine.snapshot())).unwrap();
    assert!(line.len() <= MAX_EVENT_SIZE);
}
