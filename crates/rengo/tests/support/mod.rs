//! An in-memory stand-in for the game server.
//!
//! Implements all three transport traits over one shared state, logs every
//! call it receives, and has switches for the failures the coordinator must
//! survive.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use rengo::{
    ChallengeTerms, Color, Coordinator, GameController, GameId, Mention, MemoryStore, PlayerId,
    ProposalId, SessionBroker, SettleConfig, TransportError,
};
use rengo_protocol::{ChallengeId, ServerMove};
use rengo_session::{CredentialBook, PlayerCredential};
use rengo_transport::{GameApi, MoveGateway, TokenApi, TokenPair};
use tokio::time::Instant;

pub const BLACK_ID: PlayerId = PlayerId(101);
pub const WHITE_ID: PlayerId = PlayerId(202);

/// A call the fake received, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Refresh(String),
    Challenge { target: PlayerId },
    Accept(ChallengeId),
    Connect { game: GameId, player: PlayerId },
    Move { game: GameId, player: PlayerId, mv: String },
    Resign { game: GameId, player: PlayerId },
    AcceptStones { game: GameId, player: PlayerId, at: Duration },
}

#[derive(Default)]
struct State {
    valid: HashMap<String, PlayerId>,
    refreshable: HashMap<String, PlayerId>,
    challenges: HashMap<ChallengeId, GameId>,
    moves: HashMap<GameId, u32>,
    calls: Vec<Call>,
}

pub struct FakeServer {
    state: Mutex<State>,
    next_id: AtomicU64,
    started: Instant,
    /// Every gateway call fails with a timeout.
    pub gateway_down: AtomicBool,
    /// Moves are acknowledged but not counted.
    pub drop_moves: AtomicBool,
    /// Accepting a challenge returns a different game id.
    pub accept_wrong_game: AtomicBool,
    /// Resignations fail.
    pub resign_fails: AtomicBool,
    /// Stone acceptance for this account fails.
    pub stones_fail_for: Mutex<Option<PlayerId>>,
    /// Refresh grants are refused.
    pub refresh_refused: AtomicBool,
    /// How long a move submission takes.
    pub move_latency: Mutex<Duration>,
}

impl FakeServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::default(),
            next_id: AtomicU64::new(1),
            started: Instant::now(),
            gateway_down: AtomicBool::new(false),
            drop_moves: AtomicBool::new(false),
            accept_wrong_game: AtomicBool::new(false),
            resign_fails: AtomicBool::new(false),
            stones_fail_for: Mutex::new(None),
            refresh_refused: AtomicBool::new(false),
            move_latency: Mutex::new(Duration::ZERO),
        })
    }

    fn next(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn issue(&self, id: PlayerId) -> TokenPair {
        let n = self.next();
        let pair = TokenPair {
            access_token: format!("a{n}"),
            refresh_token: format!("r{n}"),
        };
        let mut state = self.state.lock().unwrap();
        state.valid.insert(pair.access_token.clone(), id);
        state.refreshable.insert(pair.refresh_token.clone(), id);
        pair
    }

    /// Invalidates every access token issued so far.
    pub fn expire_access_tokens(&self) {
        self.state.lock().unwrap().valid.clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn server_moves(&self, game: GameId) -> u32 {
        self.state.lock().unwrap().moves.get(&game).copied().unwrap_or(0)
    }

    fn log(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn check_gateway(&self, operation: &'static str) -> Result<(), TransportError> {
        if self.gateway_down.load(Ordering::SeqCst) {
            return Err(TransportError::Timeout {
                operation,
                after: Duration::from_secs(15),
            });
        }
        Ok(())
    }
}

impl TokenApi for FakeServer {
    async fn authorize(&self, _username: &str, _password: &str) -> Result<TokenPair, TransportError> {
        Ok(self.issue(BLACK_ID))
    }

    async fn refresh(&self, username: &str, refresh_token: &str) -> Result<TokenPair, TransportError> {
        self.log(Call::Refresh(username.to_string()));
        if self.refresh_refused.load(Ordering::SeqCst) {
            return Err(TransportError::Status {
                status: 400,
                body: "invalid_grant".into(),
            });
        }
        let id = self.state.lock().unwrap().refreshable.remove(refresh_token);
        match id {
            Some(id) => Ok(self.issue(id)),
            None => Err(TransportError::Status {
                status: 400,
                body: "unknown refresh token".into(),
            }),
        }
    }

    async fn validate(&self, access_token: &str) -> Result<Option<PlayerId>, TransportError> {
        Ok(self.state.lock().unwrap().valid.get(access_token).copied())
    }
}

impl GameApi for FakeServer {
    async fn challenge(
        &self,
        _access_token: &str,
        target: PlayerId,
        _terms: &ChallengeTerms,
    ) -> Result<(ChallengeId, GameId), TransportError> {
        self.log(Call::Challenge { target });
        let challenge = ChallengeId(self.next());
        let game = GameId(1000 + self.next());
        self.state.lock().unwrap().challenges.insert(challenge, game);
        Ok((challenge, game))
    }

    async fn accept_challenge(
        &self,
        _access_token: &str,
        challenge: ChallengeId,
    ) -> Result<GameId, TransportError> {
        self.log(Call::Accept(challenge));
        let game = self.state.lock().unwrap().challenges.remove(&challenge);
        let game = game.ok_or(TransportError::Status {
            status: 404,
            body: "no such challenge".into(),
        })?;
        if self.accept_wrong_game.load(Ordering::SeqCst) {
            return Ok(GameId(game.0 + 1));
        }
        Ok(game)
    }

    async fn move_count(&self, game: GameId) -> Result<u32, TransportError> {
        Ok(self.server_moves(game))
    }
}

impl MoveGateway for FakeServer {
    async fn connect_game(&self, game: GameId, player: PlayerId) -> Result<(), TransportError> {
        self.log(Call::Connect { game, player });
        Ok(())
    }

    async fn submit_move(
        &self,
        game: GameId,
        player: PlayerId,
        mv: &ServerMove,
    ) -> Result<(), TransportError> {
        self.check_gateway("game/move")?;
        let latency = *self.move_latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.log(Call::Move {
            game,
            player,
            mv: mv.as_str().to_string(),
        });
        if !self.drop_moves.load(Ordering::SeqCst) {
            *self.state.lock().unwrap().moves.entry(game).or_default() += 1;
        }
        Ok(())
    }

    async fn submit_resign(&self, game: GameId, player: PlayerId) -> Result<(), TransportError> {
        self.check_gateway("game/resign")?;
        self.log(Call::Resign { game, player });
        if self.resign_fails.load(Ordering::SeqCst) {
            return Err(TransportError::Timeout {
                operation: "game/resign",
                after: Duration::from_secs(5),
            });
        }
        Ok(())
    }

    async fn submit_stone_acceptance(
        &self,
        game: GameId,
        player: PlayerId,
        stones: &str,
    ) -> Result<(), TransportError> {
        self.check_gateway("game/removed_stones/accept")?;
        assert_eq!(stones, "", "only the empty set is ever accepted");
        self.log(Call::AcceptStones {
            game,
            player,
            at: self.started.elapsed(),
        });
        if *self.stones_fail_for.lock().unwrap() == Some(player) {
            return Err(TransportError::Refused {
                operation: "game/removed_stones/accept",
                reason: "not in stone removal phase".into(),
            });
        }
        Ok(())
    }
}

pub type TestCoordinator = Coordinator<FakeServer, MemoryStore, FakeServer>;

/// A coordinator over a fresh fake server with both accounts enrolled.
pub fn coordinator(closing_pass_enabled: bool) -> (Arc<FakeServer>, TestCoordinator) {
    let server = FakeServer::new();
    let mut book = CredentialBook::new();
    for (color, id) in [(Color::Black, BLACK_ID), (Color::White, WHITE_ID)] {
        let pair = server.issue(id);
        book.insert(
            color,
            PlayerCredential {
                name: format!("{color}-account"),
                access_token: pair.access_token,
                refresh_token: pair.refresh_token,
                id,
            },
        );
    }
    let broker = SessionBroker::open(Arc::clone(&server), MemoryStore::with_book(book))
        .expect("book is not empty");
    let controller = GameController::new(
        broker,
        Arc::clone(&server),
        ChallengeTerms::default(),
        SettleConfig::default(),
    );
    (server, Coordinator::new(controller, closing_pass_enabled))
}

pub fn m(name: &str) -> Mention {
    Mention::new(name)
}

pub fn mentions(names: &[&str]) -> Vec<Mention> {
    names.iter().map(|n| m(n)).collect()
}

/// Proposes a game for `names` and has everyone accept it.
pub async fn start(coordinator: &TestCoordinator, proposal: u64, names: &[&str]) -> GameId {
    let members = mentions(names);
    coordinator
        .propose(ProposalId(proposal), members.clone())
        .await
        .expect("proposal should open");
    let mut started = None;
    for member in &members {
        started = coordinator
            .accept(ProposalId(proposal), member)
            .await
            .expect("acceptance should succeed");
    }
    started.expect("last acceptance starts the game").game_id
}
