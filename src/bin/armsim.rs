use armsim::protocol::{Command, Event, Snapshot};
use clap::{App, Arg, ArgMatches, SubCommand};
use colored::*;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "4000";

const FAULT_IDS: [&str; 6] = [
    "overheating",
    "torqueImbalance",
    "encoderLoss",
    "powerFluctuation",
    "gripperMalfunction",
    "commDelay",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = App::new("armsim")
        .version("0.1.0")
        .author("Industrial Systems Engineering Team")
        .about("Robotic arm telemetry simulator - live health and fault injection client")
        .arg(
            Arg::with_name("host")
                .short("h")
                .long("host")
                .value_name("HOST")
                .help("Simulator host address")
                .takes_value(true)
                .default_value(DEFAULT_HOST)
                .global(true),
        )
        .arg(
            Arg::with_name("port")
                .short("p")
                .long("port")
                .value_name("PORT")
                .help("Simulator port")
                .takes_value(true)
                .default_value(DEFAULT_PORT)
                .global(true),
        )
        .subcommand(
            SubCommand::with_name("status")
                .about("Show the current system snapshot")
                .long_about("Connects, reads the initial snapshot, and prints combined health, fault map, halt state, and recent maintenance log entries"),
        )
        .subcommand(
            SubCommand::with_name("fault")
                .about("Advance a fault channel through OK -> Warning -> Critical -> OK")
                .arg(
                    Arg::with_name("id")
                        .help("Fault channel identifier")
                        .required(true)
                        .possible_values(&FAULT_IDS),
                ),
        )
        .subcommand(
            SubCommand::with_name("restart")
                .about("Restart the system: clear halt, reset faults and lifetime health"),
        )
        .subcommand(SubCommand::with_name("shutdown").about("Manually halt the simulation"))
        .subcommand(
            SubCommand::with_name("watch")
                .about("Stream live telemetry and health events to the terminal"),
        )
        .get_matches();

    let address = server_address(&matches);

    match matches.subcommand() {
        ("status", Some(_)) => show_status(&address).await,
        ("fault", Some(sub)) => {
            let id = sub.value_of("id").unwrap_or_default().to_string();
            send_command(&address, &Command::ToggleFault { id }).await
        }
        ("restart", Some(_)) => send_command(&address, &Command::RestartSystem).await,
        ("shutdown", Some(_)) => send_command(&address, &Command::ShutdownSystem).await,
        ("watch", Some(_)) => watch_events(&address).await,
        _ => {
            println!("{}", "No subcommand given; try `armsim watch`".yellow());
            Ok(())
        }
    }
}

fn server_address(matches: &ArgMatches) -> String {
    let host = matches.value_of("host").unwrap_or(DEFAULT_HOST);
    let port = matches.value_of("port").unwrap_or(DEFAULT_PORT);
    format!("{host}:{port}")
}

async fn connect(address: &str) -> Result<TcpStream, Box<dyn std::error::Error>> {
    let stream = TcpStream::connect(address).await.map_err(|e| {
        format!("could not connect to simulator at {address}: {e}")
    })?;
    Ok(stream)
}

/// Commands carry no acknowledgment; effects show up as broadcast events.
async fn send_command(
    address: &str,
    command: &Command,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut stream = connect(address).await?;
    let json = serde_json::to_string(command)?;
    stream.write_all(json.as_bytes()).await?;
    stream.write_all(b"\n").await?;

    println!("{} {}", "sent:".green().bold(), json);
    Ok(())
}

async fn read_initial_snapshot(
    reader: &mut BufReader<tokio::net::tcp::OwnedReadHalf>,
) -> Result<Snapshot, Box<dyn std::error::Error>> {
    let mut line = String::new();
    reader.read_line(&mut line).await?;
    match serde_json::from_str::<Event>(line.trim())? {
        Event::InitialData(snapshot) => Ok(snapshot),
        other => Err(format!("expected initialData, got {other:?}").into()),
    }
}

async fn show_status(address: &str) -> Result<(), Box<dyn std::error::Error>> {
    let stream = connect(address).await?;
    let (reader, _writer) = stream.into_split();
    let mut buf_reader = BufReader::new(reader);

    let snapshot = read_initial_snapshot(&mut buf_reader).await?;
    print_snapshot(&snapshot);
    Ok(())
}

fn print_snapshot(snapshot: &Snapshot) {
    println!("{}", "=== Robotic Arm Status ===".bold());
    println!("health:  {}", format_health(snapshot.health));
    println!(
        "state:   {}",
        if snapshot.halted {
            "HALTED".red().bold()
        } else {
            "RUNNING".green().bold()
        }
    );
    println!("window:  {} frames", snapshot.data.len());

    let faults = serde_json::to_value(snapshot.faults).unwrap_or_default();
    if let Some(map) = faults.as_object() {
        println!("faults:");
        for (id, severity) in map {
            let severity = severity.as_str().unwrap_or("?");
            println!("  {:<20} {}", id, format_severity(severity));
        }
    }

    println!("log ({} entries, newest first):", snapshot.log.len());
    for entry in snapshot.log.iter().take(5) {
        println!("  [{:?}] {}", entry.severity, entry.message);
    }
}

async fn watch_events(address: &str) -> Result<(), Box<dyn std::error::Error>> {
    let stream = connect(address).await?;
    let (reader, _writer) = stream.into_split();
    let mut buf_reader = BufReader::new(reader);

    println!("{}", "watching live events (Ctrl+C to stop)".bold());

    let mut line = String::new();
    loop {
        line.clear();
        if buf_reader.read_line(&mut line).await? == 0 {
            println!("{}", "server closed the connection".yellow());
            return Ok(());
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<Event>(trimmed) {
            Ok(event) => print_event(&event),
            Err(_) => println!("{} {}", "unparsed:".yellow(), trimmed),
        }
    }
}

fn print_event(event: &Event) {
    match event {
        Event::InitialData(snapshot) => {
            println!(
                "{} {} frames, health {}",
                "initialData".cyan().bold(),
                snapshot.data.len(),
                format_health(snapshot.health)
            );
        }
        Event::NewData(frame) => {
            println!(
                "{} temp {:>5.1}C  power {:>6.1}W  rpm {:>6.1}  anomaly {:.2}",
                "newData    ".cyan(),
                frame.motor_temp,
                frame.power,
                frame.rpm,
                frame.anomaly_score
            );
        }
        Event::HealthUpdate(health) => {
            println!("{} {}", "health     ".cyan(), format_health(*health));
        }
        Event::FaultUpdate(faults) => {
            let json = serde_json::to_string(faults).unwrap_or_default();
            println!("{} {}", "faultUpdate".yellow().bold(), json);
        }
        Event::LogUpdate(log) => {
            if let Some(newest) = log.first() {
                println!(
                    "{} [{:?}] {}",
                    "logUpdate  ".magenta(),
                    newest.severity,
                    newest.message
                );
            }
        }
        Event::Shutdown(reason) => {
            println!("{} {}", "SHUTDOWN   ".red().bold(), reason.red());
        }
        Event::SystemReset(snapshot) => {
            println!(
                "{} health {}, faults cleared",
                "systemReset".green().bold(),
                format_health(snapshot.health)
            );
        }
    }
}

fn format_health(health: f64) -> ColoredString {
    let text = format!("{health:.1}");
    if health > 70.0 {
        text.green()
    } else if health > 30.0 {
        text.yellow()
    } else {
        text.red()
    }
}

fn format_severity(severity: &str) -> ColoredString {
    match severity {
        "OK" => severity.green(),
        "Warning" => severity.yellow(),
        "Critical" => severity.red().bold(),
        _ => severity.normal(),
    }
}
