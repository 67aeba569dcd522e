use std::error::Error;
use std::sync::Arc;

use rengo::online::{self, OnlineCoordinator};
use rengo::prelude::*;
use rengo::{JsonFileStore, SessionBroker, SessionError, telemetry};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

const SETTINGS_PATH: &str = "settings.json";

type Input = Lines<BufReader<Stdin>>;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
enum Command {
    /// Open a challenge. First half of the members plays black.
    Rengo(Vec<Mention>),
    Accept(ProposalId, Mention),
    Decline(ProposalId, Mention),
    Play(Mention, Action),
    Turn(Mention),
    Games,
    Help,
    Quit,
}

const HELP: &str = "\
commands:
  rengo <member> <member>...   challenge; first half black, second half white
  accept <id> <member>         accept challenge <id>
  decline <id> <member>        decline challenge <id>
  play <member> <move>         a coordinate (D4), pass, or resign
  turn <member>                who is to play in <member>'s game
  games                        list active games
  quit";

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("rengo", members) if !members.is_empty() => {
            Command::Rengo(members.iter().map(|m| Mention::new(*m)).collect())
        }
        ("accept", [id, member]) => Command::Accept(proposal_id(id)?, Mention::new(*member)),
        ("decline", [id, member]) => Command::Decline(proposal_id(id)?, Mention::new(*member)),
        ("play", [member, mv]) => {
            let action = Action::parse(mv).map_err(|e| e.to_string())?;
            Command::Play(Mention::new(*member), action)
        }
        ("turn", [member]) => Command::Turn(Mention::new(*member)),
        ("games", []) => Command::Games,
        ("help", _) => Command::Help,
        ("quit" | "exit", _) => Command::Quit,
        _ => return Err(format!("cannot parse `{}`; try `help`", line.trim())),
    };
    Ok(Some(command))
}

fn proposal_id(text: &str) -> Result<ProposalId, String> {
    text.trim_start_matches('#')
        .parse()
        .map(ProposalId)
        .map_err(|_| format!("`{text}` is not a challenge id"))
}

fn names(members: &[Mention]) -> String {
    members
        .iter()
        .map(Mention::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Command handling
// ---------------------------------------------------------------------------

struct Console {
    coordinator: OnlineCoordinator<JsonFileStore>,
    game_url: String,
    next_proposal: u64,
}

impl Console {
    async fn handle(&mut self, command: Command) -> Result<(), RengoError> {
        match command {
            Command::Rengo(members) => {
                self.next_proposal += 1;
                let id = ProposalId(self.next_proposal);
                let proposal = self.coordinator.propose(id, members).await?;
                let (black, white) = proposal.rosters();
                println!(
                    "challenge {id}: black {} vs white {}. everyone must `accept {} <member>`",
                    names(&black),
                    names(&white),
                    id.0
                );
            }
            Command::Accept(id, member) => match self.coordinator.accept(id, &member).await? {
                None => {
                    let waiting = self
                        .coordinator
                        .proposal(id)
                        .await
                        .map(|p| p.waiting_for().into_iter().cloned().collect::<Vec<_>>())
                        .unwrap_or_default();
                    println!("{member} accepted {id}; waiting for {}", names(&waiting));
                }
                Some(started) => self.announce(&started),
            },
            Command::Decline(id, member) => {
                self.coordinator.decline(id, &member).await?;
                println!("{member} declined; challenge {id} cancelled");
            }
            Command::Play(member, action) => {
                let report = self.coordinator.play(&member, action).await?;
                match report.outcome {
                    Outcome::Continue { next, turn } => {
                        println!("{action} played for {}; next is {next} ({turn})", report.color);
                    }
                    Outcome::Ended(ending) => {
                        println!("game {} is over: {ending}", report.game_id);
                    }
                }
            }
            Command::Turn(member) => {
                let view = self.coordinator.turn_of(&member).await?;
                println!(
                    "game {}: {} to play ({}, {} moves so far)",
                    view.game_id, view.member, view.turn, view.move_count
                );
            }
            Command::Games => {
                let games = self.coordinator.games().await;
                if games.is_empty() {
                    println!("no active games");
                }
                for game in games {
                    match self.coordinator.turn(game).await {
                        Ok(view) => println!("{}/{game}: {} to play", self.game_url, view.member),
                        Err(e) => println!("{}/{game}: {e}", self.game_url),
                    }
                }
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => {}
        }
        Ok(())
    }

    fn announce(&self, started: &GameStarted) {
        for old in &started.superseded {
            println!("game {old} was resigned to make room");
        }
        let [black, white] = &started.rosters;
        println!(
            "game on: {}/{}\n  black: {}\n  white: {}\n  {} plays first",
            self.game_url,
            started.game_id,
            names(black),
            names(white),
            started.first
        );
    }
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

async fn prompt(input: &mut Input, label: &str) -> Result<String, Box<dyn Error>> {
    let mut out = tokio::io::stdout();
    out.write_all(format!("{label}: ").as_bytes()).await?;
    out.flush().await?;
    let line = input.next_line().await?.ok_or("stdin closed")?;
    Ok(line.trim().to_string())
}

async fn load_settings(input: &mut Input) -> Result<Settings, Box<dyn Error>> {
    if let Some(settings) = Settings::load(SETTINGS_PATH)? {
        return Ok(settings);
    }
    println!("no {SETTINGS_PATH}; creating one");
    let mut settings = Settings::default();
    settings.api.client_id = prompt(input, "application client id").await?;
    settings.api.client_secret = prompt(input, "application client secret").await?;
    settings.api.realtime_url = prompt(input, "realtime endpoint (ws:// or wss:// url)").await?;
    settings.save(SETTINGS_PATH)?;
    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    telemetry::init();
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let settings = load_settings(&mut input).await?;
    let api = online::rest_client(&settings)?;
    let store = JsonFileStore::new(&settings.credentials_path);

    let broker = match SessionBroker::open(Arc::clone(&api), store) {
        Ok(broker) => broker,
        Err(SessionError::NotEnrolled) => {
            println!("no accounts enrolled yet");
            let mut logins = Vec::new();
            for color in Color::ALL {
                let username = prompt(&mut input, &format!("{color} account username")).await?;
                let password = prompt(&mut input, &format!("{color} account password")).await?;
                logins.push((color, Login::new(username, password)));
            }
            let store = JsonFileStore::new(&settings.credentials_path);
            SessionBroker::enroll(api, store, logins).await?
        }
        Err(e) => return Err(e.into()),
    };

    let coordinator = online::connect(&settings, broker).await?;
    tracing::info!("ready");
    println!("{HELP}");

    let mut console = Console {
        coordinator,
        game_url: format!("{}/game", settings.api.rest_url.trim_end_matches('/')),
        next_proposal: 0,
    };

    while let Some(line) = input.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        if let Err(e) = console.handle(command).await {
            println!("{e} ({})", e.kind());
        }
    }
    Ok(())
}
