//! The table of active games and the member-to-game index.

use std::collections::HashMap;
use std::sync::Arc;

use rengo_protocol::{GameId, Mention};
use tokio::sync::Mutex;

use crate::{GameError, GameRecord};

/// A record behind its own lock.
///
/// Whoever acts on a game holds this lock from the turn check until the
/// record has been updated, network calls included. That serializes
/// actions per game while different games proceed in parallel.
pub type SharedRecord = Arc<Mutex<GameRecord>>;

/// Every active game, plus which member is in which game.
///
/// A member is in at most one game (key invariant). Every member of every
/// record has exactly one index entry, and removing a record removes all
/// of them.
///
/// Like the session and room managers it is a plain map owner. Callers put
/// it behind a mutex and keep that lock short: look up the record, clone
/// the `Arc`, release, then lock the record.
#[derive(Debug, Default)]
pub struct GameTable {
    games: HashMap<GameId, SharedRecord>,
    players: HashMap<Mention, GameId>,
}

impl GameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new record and indexes its members.
    ///
    /// # Errors
    /// - [`GameError::DuplicateGame`] if the id is already active
    /// - [`GameError::AlreadyInGame`] if any member is in another game
    pub fn insert(&mut self, record: GameRecord) -> Result<SharedRecord, GameError> {
        let game = record.id();
        if self.games.contains_key(&game) {
            return Err(GameError::DuplicateGame(game));
        }
        if let Some((member, existing)) = self.conflicts(record.members()).into_iter().next() {
            return Err(GameError::AlreadyInGame {
                member,
                game: existing,
            });
        }

        for member in record.members() {
            self.players.insert(member.clone(), game);
        }
        let shared = Arc::new(Mutex::new(record));
        self.games.insert(game, Arc::clone(&shared));
        tracing::info!(game_id = %game, games = self.games.len(), "game added");
        Ok(shared)
    }

    /// Drops a game and every index entry pointing at it.
    ///
    /// Returns the record if it was present.
    pub fn remove(&mut self, game: GameId) -> Option<SharedRecord> {
        let record = self.games.remove(&game)?;
        self.players.retain(|_, g| *g != game);
        tracing::info!(game_id = %game, games = self.games.len(), "game removed");
        Some(record)
    }

    /// The game `member` is currently in.
    pub fn game_of(&self, member: &Mention) -> Option<GameId> {
        self.players.get(member).copied()
    }

    pub fn get(&self, game: GameId) -> Option<SharedRecord> {
        self.games.get(&game).cloned()
    }

    /// The record of the game `member` is in.
    pub fn record_of(&self, member: &Mention) -> Result<(GameId, SharedRecord), GameError> {
        let game = self
            .game_of(member)
            .ok_or_else(|| GameError::NotInGame(member.clone()))?;
        let record = self.get(game).ok_or(GameError::NotFound(game))?;
        Ok((game, record))
    }

    /// Members of `members` that are already in a game, with that game.
    pub fn conflicts<'a>(
        &self,
        members: impl IntoIterator<Item = &'a Mention>,
    ) -> Vec<(Mention, GameId)> {
        members
            .into_iter()
            .filter_map(|m| self.game_of(m).map(|g| (m.clone(), g)))
            .collect()
    }

    pub fn game_ids(&self) -> Vec<GameId> {
        let mut ids: Vec<_> = self.games.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Number of indexed members across all games.
    pub fn member_count(&self) -> usize {
        self.players.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(name: &str) -> Mention {
        Mention::new(name)
    }

    fn record(id: u64, black: &[&str], white: &[&str]) -> GameRecord {
        GameRecord::new(
            GameId(id),
            black.iter().map(|n| m(n)).collect(),
            white.iter().map(|n| m(n)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_insert_indexes_every_member() {
        let mut table = GameTable::new();
        table.insert(record(7, &["a", "b"], &["c", "d"])).unwrap();

        for name in ["a", "b", "c", "d"] {
            assert_eq!(table.game_of(&m(name)), Some(GameId(7)));
        }
        assert_eq!(table.member_count(), 4);
        assert!(table.game_of(&m("z")).is_none());
    }

    #[test]
    fn test_insert_member_already_in_game_returns_already_in_game() {
        let mut table = GameTable::new();
        table.insert(record(1, &["a"], &["b"])).unwrap();

        let result = table.insert(record(2, &["c"], &["b"]));

        assert!(matches!(
            result,
            Err(GameError::AlreadyInGame { ref member, game: GameId(1) }) if *member == m("b")
        ));
        assert_eq!(table.len(), 1);
        assert!(table.game_of(&m("c")).is_none(), "failed insert must not index");
    }

    #[test]
    fn test_insert_duplicate_id_returns_duplicate_game() {
        let mut table = GameTable::new();
        table.insert(record(1, &["a"], &["b"])).unwrap();

        let result = table.insert(record(1, &["c"], &["d"]));

        assert!(matches!(result, Err(GameError::DuplicateGame(GameId(1)))));
    }

    #[test]
    fn test_remove_clears_all_index_entries_of_that_game_only() {
        let mut table = GameTable::new();
        table.insert(record(1, &["a", "b"], &["c", "d"])).unwrap();
        table.insert(record(2, &["e"], &["f"])).unwrap();

        assert!(table.remove(GameId(1)).is_some());

        assert_eq!(table.member_count(), 2);
        assert!(table.game_of(&m("a")).is_none());
        assert_eq!(table.game_of(&m("f")), Some(GameId(2)));
        assert!(table.remove(GameId(1)).is_none());
    }

    #[test]
    fn test_record_of_unknown_member_returns_not_in_game() {
        let table = GameTable::new();
        assert!(matches!(
            table.record_of(&m("a")),
            Err(GameError::NotInGame(_))
        ));
    }

    #[test]
    fn test_conflicts_lists_members_with_their_games() {
        let mut table = GameTable::new();
        table.insert(record(1, &["a"], &["b"])).unwrap();
        table.insert(record(2, &["c"], &["d"])).unwrap();

        let conflicts = table.conflicts(&[m("a"), m("x"), m("d")]);

        assert_eq!(conflicts, vec![(m("a"), GameId(1)), (m("d"), GameId(2))]);
    }

    #[tokio::test]
    async fn test_shared_record_is_the_same_instance() {
        let mut table = GameTable::new();
        let inserted = table.insert(record(3, &["a"], &["b"])).unwrap();

        inserted.lock().await.apply(&rengo_protocol::Action::Pass).unwrap();

        let (_, fetched) = table.record_of(&m("b")).unwrap();
        assert_eq!(fetched.lock().await.move_count(), 1);
        assert_eq!(table.game_ids(), vec![GameId(3)]);
    }
}
