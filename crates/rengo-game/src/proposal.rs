//! Proposed games waiting for every invited member to accept.
//!
//! A proposal is the *awaiting acceptance* state of a game. It lists the
//! members in order; the first half plays black, the second half white.
//! Every member has to accept before the game is created on the server,
//! and a single decline cancels the whole thing.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use rengo_protocol::Mention;
use serde::{Deserialize, Serialize};

use crate::GameError;

/// Identifies a proposal. The front-end supplies it (for a chat bot, the
/// id of the message members react to).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(pub u64);

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One proposed game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    id: ProposalId,
    members: Vec<Mention>,
    accepted: BTreeSet<Mention>,
}

impl Proposal {
    pub fn id(&self) -> ProposalId {
        self.id
    }

    /// All invited members in the order they were listed.
    pub fn members(&self) -> &[Mention] {
        &self.members
    }

    pub fn is_invited(&self, member: &Mention) -> bool {
        self.members.contains(member)
    }

    /// Members who have not accepted yet, in listing order.
    pub fn waiting_for(&self) -> Vec<&Mention> {
        self.members
            .iter()
            .filter(|m| !self.accepted.contains(*m))
            .collect()
    }

    /// `(black, white)`: the first half of the members and the second.
    pub fn rosters(&self) -> (Vec<Mention>, Vec<Mention>) {
        let (black, white) = self.members.split_at(self.members.len() / 2);
        (black.to_vec(), white.to_vec())
    }
}

/// Result of an acceptance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acceptance {
    /// Still waiting on `waiting` members.
    Pending { waiting: usize },
    /// Everyone accepted. The proposal has been taken off the board.
    Ready(Proposal),
}

/// All open proposals.
#[derive(Debug, Default)]
pub struct ChallengeBoard {
    proposals: HashMap<ProposalId, Proposal>,
}

impl ChallengeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a proposal for `members`.
    ///
    /// Checking that no member is already in a game is the caller's job,
    /// since the board does not know about games.
    ///
    /// # Errors
    /// - [`GameError::OddPlayerCount`] for an odd or zero member count
    /// - [`GameError::InvalidRoster`] if a member is listed twice
    /// - [`GameError::DuplicateProposal`] if `id` is already open
    pub fn propose(
        &mut self,
        id: ProposalId,
        members: Vec<Mention>,
    ) -> Result<&Proposal, GameError> {
        if members.is_empty() || members.len() % 2 != 0 {
            return Err(GameError::OddPlayerCount(members.len()));
        }
        if let Some(dup) = first_duplicate(&members) {
            return Err(GameError::InvalidRoster(format!(
                "{dup} is listed more than once"
            )));
        }
        if self.proposals.contains_key(&id) {
            return Err(GameError::DuplicateProposal(id));
        }

        tracing::info!(proposal = %id, players = members.len(), "challenge proposed");
        let proposal = self.proposals.entry(id).or_insert(Proposal {
            id,
            members,
            accepted: BTreeSet::new(),
        });
        Ok(proposal)
    }

    /// Records `member`'s acceptance. Accepting twice is harmless.
    pub fn accept(
        &mut self,
        id: ProposalId,
        member: &Mention,
    ) -> Result<Acceptance, GameError> {
        let proposal = self.invited(id, member)?;
        proposal.accepted.insert(member.clone());

        let waiting = proposal.waiting_for().len();
        if waiting > 0 {
            tracing::debug!(proposal = %id, %member, waiting, "challenge accepted by member");
            return Ok(Acceptance::Pending { waiting });
        }

        let ready = self
            .proposals
            .remove(&id)
            .ok_or(GameError::ProposalNotFound(id))?;
        tracing::info!(proposal = %id, "challenge accepted by everyone");
        Ok(Acceptance::Ready(ready))
    }

    /// Cancels the proposal on behalf of an invited member.
    pub fn decline(
        &mut self,
        id: ProposalId,
        member: &Mention,
    ) -> Result<Proposal, GameError> {
        self.invited(id, member)?;
        let cancelled = self
            .proposals
            .remove(&id)
            .ok_or(GameError::ProposalNotFound(id))?;
        tracing::info!(proposal = %id, %member, "challenge declined");
        Ok(cancelled)
    }

    /// Puts back a proposal that [`accept`](Self::accept) took off the
    /// board, for when its game could not be started. Acceptances are kept,
    /// so the next acceptance by any invited member retries the start.
    ///
    /// Returns `false`, dropping `proposal`, if its id is taken again.
    pub fn restore(&mut self, proposal: Proposal) -> bool {
        match self.proposals.entry(proposal.id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                tracing::info!(proposal = %proposal.id, "challenge reopened");
                slot.insert(proposal);
                true
            }
        }
    }

    pub fn get(&self, id: ProposalId) -> Option<&Proposal> {
        self.proposals.get(&id)
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    fn invited(
        &mut self,
        id: ProposalId,
        member: &Mention,
    ) -> Result<&mut Proposal, GameError> {
        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or(GameError::ProposalNotFound(id))?;
        if !proposal.is_invited(member) {
            return Err(GameError::NotInvited {
                member: member.clone(),
                proposal: id,
            });
        }
        Ok(proposal)
    }
}

/// The first member that appears a second time in `members`.
pub(crate) fn first_duplicate<'a>(
    members: impl IntoIterator<Item = &'a Mention>,
) -> Option<Mention> {
    let mut seen = HashSet::new();
    members.into_iter().find(|m| !seen.insert(*m)).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(name: &str) -> Mention {
        Mention::new(name)
    }

    fn four() -> Vec<Mention> {
        ["a", "b", "c", "d"].iter().map(|n| m(n)).collect()
    }

    #[test]
    fn test_propose_odd_count_returns_odd_player_count() {
        let mut board = ChallengeBoard::new();
        let result = board.propose(ProposalId(1), vec![m("a"), m("b"), m("c")]);
        assert!(matches!(result, Err(GameError::OddPlayerCount(3))));
        assert!(board.is_empty());
    }

    #[test]
    fn test_propose_nobody_returns_odd_player_count() {
        let mut board = ChallengeBoard::new();
        assert!(matches!(
            board.propose(ProposalId(1), vec![]),
            Err(GameError::OddPlayerCount(0))
        ));
    }

    #[test]
    fn test_propose_duplicate_member_returns_invalid_roster() {
        let mut board = ChallengeBoard::new();
        let result = board.propose(ProposalId(1), vec![m("a"), m("a")]);
        assert!(matches!(result, Err(GameError::InvalidRoster(_))));
    }

    #[test]
    fn test_propose_same_id_twice_returns_duplicate_proposal() {
        let mut board = ChallengeBoard::new();
        board.propose(ProposalId(1), four()).unwrap();
        assert!(matches!(
            board.propose(ProposalId(1), vec![m("x"), m("y")]),
            Err(GameError::DuplicateProposal(_))
        ));
    }

    #[test]
    fn test_rosters_split_first_half_black() {
        let mut board = ChallengeBoard::new();
        let proposal = board.propose(ProposalId(1), four()).unwrap();
        let (black, white) = proposal.rosters();
        assert_eq!(black, vec![m("a"), m("b")]);
        assert_eq!(white, vec![m("c"), m("d")]);
    }

    #[test]
    fn test_accept_everyone_returns_ready_and_removes_proposal() {
        let mut board = ChallengeBoard::new();
        board.propose(ProposalId(9), four()).unwrap();

        for (i, name) in ["d", "b", "a"].iter().enumerate() {
            let result = board.accept(ProposalId(9), &m(name)).unwrap();
            assert_eq!(result, Acceptance::Pending { waiting: 3 - i });
        }
        let result = board.accept(ProposalId(9), &m("c")).unwrap();

        let Acceptance::Ready(proposal) = result else {
            panic!("expected ready, got {result:?}");
        };
        assert_eq!(proposal.members(), four().as_slice());
        assert!(board.get(ProposalId(9)).is_none());
    }

    #[test]
    fn test_accept_twice_counts_once() {
        let mut board = ChallengeBoard::new();
        board.propose(ProposalId(1), four()).unwrap();
        board.accept(ProposalId(1), &m("a")).unwrap();

        let again = board.accept(ProposalId(1), &m("a")).unwrap();

        assert_eq!(again, Acceptance::Pending { waiting: 3 });
    }

    #[test]
    fn test_accept_by_outsider_returns_not_invited() {
        let mut board = ChallengeBoard::new();
        board.propose(ProposalId(1), four()).unwrap();

        let result = board.accept(ProposalId(1), &m("z"));

        assert!(matches!(result, Err(GameError::NotInvited { .. })));
        assert_eq!(board.get(ProposalId(1)).unwrap().waiting_for().len(), 4);
    }

    #[test]
    fn test_decline_by_member_cancels() {
        let mut board = ChallengeBoard::new();
        board.propose(ProposalId(1), four()).unwrap();
        board.accept(ProposalId(1), &m("a")).unwrap();

        let cancelled = board.decline(ProposalId(1), &m("c")).unwrap();

        assert_eq!(cancelled.id(), ProposalId(1));
        assert!(board.is_empty());
        assert!(matches!(
            board.accept(ProposalId(1), &m("b")),
            Err(GameError::ProposalNotFound(_))
        ));
    }

    #[test]
    fn test_decline_by_outsider_keeps_proposal() {
        let mut board = ChallengeBoard::new();
        board.propose(ProposalId(1), four()).unwrap();

        assert!(board.decline(ProposalId(1), &m("z")).is_err());
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_restore_after_ready_accepting_again_is_ready() {
        let mut board = ChallengeBoard::new();
        board.propose(ProposalId(4), vec![m("a"), m("b")]).unwrap();
        board.accept(ProposalId(4), &m("a")).unwrap();
        let Acceptance::Ready(proposal) = board.accept(ProposalId(4), &m("b")).unwrap() else {
            panic!("both accepted");
        };
        assert!(board.is_empty());

        assert!(board.restore(proposal.clone()));
        assert!(board.get(ProposalId(4)).unwrap().waiting_for().is_empty());

        let again = board.accept(ProposalId(4), &m("a")).unwrap();
        assert_eq!(again, Acceptance::Ready(proposal));
    }

    #[test]
    fn test_restore_taken_id_returns_false() {
        let mut board = ChallengeBoard::new();
        board.propose(ProposalId(4), vec![m("a"), m("b")]).unwrap();
        board.accept(ProposalId(4), &m("a")).unwrap();
        let Acceptance::Ready(old) = board.accept(ProposalId(4), &m("b")).unwrap() else {
            panic!("both accepted");
        };
        board.propose(ProposalId(4), vec![m("x"), m("y")]).unwrap();

        assert!(!board.restore(old));
        assert_eq!(board.get(ProposalId(4)).unwrap().members(), [m("x"), m("y")]);
    }
}
