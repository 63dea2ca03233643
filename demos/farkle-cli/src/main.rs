use std::net::{IpAddr, SocketAddr};

use farkle::prelude::*;
use farkle_match::DEFAULT_TARGET;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage:
  farkle host [score] [--advertise=<ip:port>]
  farkle join <LOBBY-ID> [--host=<ip>]";

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Host {
        target: u32,
        advertise: Option<SocketAddr>,
    },
    Join {
        lobby_id: String,
        host: Option<IpAddr>,
    },
}

impl Command {
    fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self, String> {
        let mut args = args.into_iter();
        match args.next().as_deref() {
            Some("host") => {
                let mut target = DEFAULT_TARGET;
                let mut advertise = None;
                for arg in args {
                    if let Some(addr) = arg.strip_prefix("--advertise=") {
                        let addr = addr
                            .parse()
                            .map_err(|_| format!("not an ip:port address: {addr}"))?;
                        advertise = Some(addr);
                    } else {
                        target = arg.parse().map_err(|_| format!("not a score: {arg}"))?;
                    }
                }
                Ok(Self::Host { target, advertise })
            }
            Some("join") => {
                let mut lobby_id = None;
                let mut host = None;
                for arg in args {
                    if let Some(ip) = arg.strip_prefix("--host=") {
                        host = Some(ip.parse().map_err(|_| format!("not an ip address: {ip}"))?);
                    } else {
                        lobby_id = Some(arg);
                    }
                }
                let lobby_id = lobby_id.ok_or("join needs a lobby id")?;
                Ok(Self::Join { lobby_id, host })
            }
            Some(other) => Err(format!("unknown command: {other}")),
            None => Err("missing command".to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

/// Parses one line of player input: `keep X X...`, `bank X X...`, `quit`.
fn parse_choice(line: &str) -> Result<Choice, String> {
    let mut words = line.split_whitespace();
    let verb = words.next().unwrap_or_default().to_ascii_lowercase();
    if verb == "quit" || verb == "exit" {
        return Ok(Choice::Quit);
    }

    let dice = words
        .map(|w| w.parse::<u8>().map_err(|_| format!("not a die: {w}")))
        .collect::<Result<Vec<u8>, String>>()?;
    if dice.is_empty() && (verb == "keep" || verb == "bank") {
        return Err(format!("{verb} which dice? e.g. `{verb} 1 5`"));
    }
    match verb.as_str() {
        "keep" => Ok(Choice::keep(dice)),
        "bank" => Ok(Choice::bank(dice)),
        "" => Err("type keep, bank or quit".to_string()),
        other => Err(format!("unknown command: {other}")),
    }
}

/// Reads choices from stdin.
struct TerminalInput {
    lines: Lines<BufReader<Stdin>>,
}

impl TerminalInput {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl DecisionSource for TerminalInput {
    async fn decide(&mut self, prompt: &DecisionPrompt<'_>) -> Choice {
        let faces: Vec<String> = prompt.roll.iter().map(|d| format!("[{d}]")).collect();
        println!(
            "Your roll: {} | turn {} | you {} | opponent {} | target {}",
            faces.join(" "),
            prompt.turn_score,
            prompt.own_total,
            prompt.opponent_total,
            prompt.target,
        );
        loop {
            println!("keep X X... | bank X X... | quit");
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return Choice::Quit,
                Err(e) => {
                    tracing::warn!(error = %e, "stdin read failed");
                    return Choice::Quit;
                }
            };
            match parse_choice(&line) {
                Ok(choice) => return choice,
                Err(msg) => println!("{msg}"),
            }
        }
    }
}

struct Screen;

impl OutputSink for Screen {
    fn line(&mut self, text: &str) {
        println!("{text}");
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let command = match Command::parse(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(msg) => {
            eprintln!("{msg}\n{USAGE}");
            std::process::exit(2);
        }
    };

    let mut input = TerminalInput::new();
    let mut screen = Screen;
    let config = SessionConfig::default();

    let outcome = match command {
        Command::Host { target, advertise } => {
            let session = HostSession::bind(config, MatchConfig::new(target)).await?;
            println!("Hosting on {}", session.local_addr());
            println!("Lobby ID: {}", session.lobby_id(advertise));
            println!("Waiting for opponent...");
            session.run(RandomDice::new(), &mut input, &mut screen).await?
        }
        Command::Join { lobby_id, host } => {
            let addr = resolve_join_addr(&lobby_id, host)?;
            println!("Connecting to {addr}...");
            join(addr, &config, &mut input, &mut screen).await?
        }
    };

    match outcome {
        MatchOutcome::Quit => std::process::exit(0),
        MatchOutcome::Won => println!("Game over. You won!"),
        MatchOutcome::Lost => println!("Game over. You lost."),
        MatchOutcome::Disconnected => println!("Game over. The connection was lost."),
    }
    Ok(())
}
