use armsim::engine::SimulationEngine;
use armsim::protocol::{Event, WireCodec};
use armsim::scheduler::{broadcast_event, now_ms, TickDriver};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, Mutex};
use tracing::{error, info, warn};

const TCP_PORT: u16 = 4000;
const EVENT_BROADCAST_BUFFER_SIZE: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let engine = Arc::new(Mutex::new(SimulationEngine::new(now_ms())));
    let (events_tx, _) = broadcast::channel(EVENT_BROADCAST_BUFFER_SIZE);

    info!("robotic arm telemetry simulator starting");

    let driver_engine = Arc::clone(&engine);
    let driver_events_tx = events_tx.clone();
    tokio::spawn(async move {
        TickDriver::new().run(driver_engine, driver_events_tx).await;
    });

    start_tcp_server(engine, events_tx).await
}

async fn start_tcp_server(
    engine: Arc<Mutex<SimulationEngine>>,
    events_tx: broadcast::Sender<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(format!("127.0.0.1:{TCP_PORT}")).await?;
    info!("TCP server listening on port {}", TCP_PORT);

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("new subscriber connected: {}", addr);
                let client_engine = Arc::clone(&engine);
                let client_events_tx = events_tx.clone();

                tokio::spawn(async move {
                    if let Err(e) = handle_client(stream, client_engine, client_events_tx).await {
                        warn!("subscriber {} error: {}", addr, e);
                    }
                    info!("subscriber {} disconnected", addr);
                });
            }
            Err(e) => {
                error!("failed to accept connection: {}", e);
            }
        }
    }
}

async fn handle_client(
    stream: TcpStream,
    engine: Arc<Mutex<SimulationEngine>>,
    events_tx: broadcast::Sender<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (reader, writer) = stream.into_split();
    let mut buf_reader = BufReader::new(reader);
    let mut codec = WireCodec::new();
    let mut events_rx = events_tx.subscribe();

    let writer = Arc::new(Mutex::new(writer));

    // One full snapshot on connect, then deltas as they happen.
    let snapshot = {
        let engine_guard = engine.lock().await;
        engine_guard.snapshot()
    };
    let initial = codec.encode_event(&Event::InitialData(snapshot))?;
    {
        let mut writer_guard = writer.lock().await;
        writer_guard.write_all(initial.as_bytes()).await?;
        writer_guard.write_all(b"\n").await?;
    }

    // Forward broadcast deltas to this subscriber until it goes away.
    let event_writer = Arc::clone(&writer);
    let forward_task = tokio::spawn(async move {
        loop {
            match events_rx.recv().await {
                Ok(event_line) => {
                    let mut writer_guard = event_writer.lock().await;
                    if writer_guard.write_all(event_line.as_bytes()).await.is_err() {
                        break;
                    }
                    if writer_guard.write_all(b"\n").await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("subscriber lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut line = String::new();
    loop {
        line.clear();
        match buf_reader.read_line(&mut line).await {
            Ok(0) => break, // subscriber disconnected
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                process_command_line(trimmed, &mut codec, &engine, &events_tx).await;
            }
            Err(e) => {
                warn!("error reading from subscriber: {}", e);
                break;
            }
        }
    }

    forward_task.abort();
    Ok(())
}

/// Parse and apply one inbound command line. Commands have no acknowledgment
/// payload; resulting deltas go to every subscriber.
async fn process_command_line(
    trimmed: &str,
    codec: &mut WireCodec,
    engine: &Arc<Mutex<SimulationEngine>>,
    events_tx: &broadcast::Sender<String>,
) {
    match codec.parse_command(trimmed) {
        Ok(command) => {
            info!("received command: {:?}", command);
            let events = {
                let mut engine_guard = engine.lock().await;
                engine_guard.handle_command(command, now_ms())
            };
            if events.is_empty() {
                info!("command ignored (halted or unknown fault id)");
            }
            for event in events {
                broadcast_event(codec, events_tx, &event);
            }
        }
        Err(e) => {
            warn!("failed to parse command: {}", e);
        }
    }
}
