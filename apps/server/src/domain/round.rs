//! The per-deal state machine: Dealing -> Bidding -> Declaring -> Playing ->
//! Scoring -> Done.
//!
//! Every mutating entry point validates phase, turn, and legality before
//! touching any state; a rejected event leaves the round exactly as it was.

use serde::{Deserialize, Serialize};

use super::cards_types::{Card, Rank, Suit};
use super::dealing::deal_hands;
use super::declarations::{
    claim_matches_detected, detect_declarations, Declaration, DeclarationKind,
};
use super::rules::{next_seat, trick_winner, valid_moves, Seat, Team, PLAYERS, TRICKS_PER_ROUND};
use super::scoring::{resolve_round, trick_points, RoundScore, RoundTally, LAST_TRICK_BONUS};
use super::seed_derivation::derive_dealing_seed;
use crate::errors::GameError;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    Dealing,
    Bidding,
    Declaring,
    Playing,
    Scoring,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedTrick {
    pub plays: Vec<(Seat, Card)>,
    pub winner: Seat,
    /// Card points of the trick; the eighth trick includes the last-trick
    /// bonus.
    pub points: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredMeld {
    pub seat: Seat,
    pub declaration: Declaration,
}

/// What a single card play produced beyond the play itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayOutcome {
    pub trick_completed: Option<CompletedTrick>,
    pub round_score: Option<RoundScore>,
}

#[derive(Debug, Clone)]
pub struct Round {
    pub number: u32,
    pub dealer: Seat,
    pub phase: RoundPhase,
    /// Seat expected to act next (bidder, declarer, or player).
    pub turn: Seat,
    /// Set once all four bidders passed; the dealer must now choose.
    pub forced_bid: bool,
    passes: u8,
    pub trump: Option<Suit>,
    pub caller: Option<Seat>,
    /// Hands as dealt, kept for persistence and replay.
    pub initial_hands: [Vec<Card>; 4],
    pub hands: [Vec<Card>; 4],
    pub current_trick: Vec<(Seat, Card)>,
    pub completed_tricks: Vec<CompletedTrick>,
    pub declarations: Vec<DeclaredMeld>,
    declared: [bool; 4],
    pub belots: Vec<Seat>,
    pub score: Option<RoundScore>,
}

impl Round {
    /// Deal a new round. Hands derive deterministically from the game seed
    /// and round number; bidding opens left of the dealer.
    pub fn deal(number: u32, dealer: Seat, game_seed: u64) -> Self {
        let hands = deal_hands(derive_dealing_seed(game_seed, number));
        Self {
            number,
            dealer,
            phase: RoundPhase::Bidding,
            turn: next_seat(dealer),
            forced_bid: false,
            passes: 0,
            trump: None,
            caller: None,
            initial_hands: hands.clone(),
            hands,
            current_trick: Vec::new(),
            completed_tricks: Vec::new(),
            declarations: Vec::new(),
            declared: [false; PLAYERS],
            belots: Vec::new(),
            score: None,
        }
    }

    pub fn first_to_act(&self) -> Seat {
        next_seat(self.dealer)
    }

    fn require_phase(&self, phase: RoundPhase) -> Result<(), GameError> {
        if self.phase != phase {
            return Err(GameError::wrong_phase(format!(
                "round {} is in {:?}, not {:?}",
                self.number, self.phase, phase
            )));
        }
        Ok(())
    }

    fn require_turn(&self, actor: Seat) -> Result<(), GameError> {
        if actor != self.turn {
            return Err(GameError::not_your_turn(format!(
                "seat {} acted, seat {} is expected",
                actor, self.turn
            )));
        }
        Ok(())
    }

    /// Choose trump. Legal for the expected bidder in the Bidding phase;
    /// moves the round into Declaring.
    pub fn bid_trump(&mut self, actor: Seat, suit: Suit) -> Result<(), GameError> {
        self.require_phase(RoundPhase::Bidding)?;
        self.require_turn(actor)?;

        self.trump = Some(suit);
        self.caller = Some(actor);
        self.phase = RoundPhase::Declaring;
        self.turn = self.first_to_act();
        Ok(())
    }

    /// Pass on choosing trump. After four passes the dealer is forced to
    /// choose; a further pass from the dealer is rejected.
    pub fn pass_trump(&mut self, actor: Seat) -> Result<(), GameError> {
        self.require_phase(RoundPhase::Bidding)?;
        self.require_turn(actor)?;
        if self.forced_bid {
            return Err(GameError::illegal_move(
                "all four passed; the dealer must choose a trump",
            ));
        }

        self.passes += 1;
        if self.passes as usize == PLAYERS {
            self.forced_bid = true;
            self.turn = self.dealer;
        } else {
            self.turn = next_seat(actor);
        }
        Ok(())
    }

    /// Announce declarations for one seat, in seating order from the
    /// dealer's left. An empty claim list is an explicit skip. Every claim is
    /// recomputed against the actual hand; belot does not ride this path.
    pub fn declare(
        &mut self,
        actor: Seat,
        claims: Vec<(DeclarationKind, Vec<Card>)>,
    ) -> Result<Vec<DeclaredMeld>, GameError> {
        self.require_phase(RoundPhase::Declaring)?;
        self.require_turn(actor)?;
        let trump = self.require_trump()?;

        let detected = detect_declarations(&self.hands[actor as usize], trump);
        let mut accepted = Vec::with_capacity(claims.len());
        for (kind, cards) in claims {
            if kind == DeclarationKind::Belot {
                return Err(GameError::illegal_move(
                    "belot is announced during play, not declared",
                ));
            }
            let claim = Declaration::new(kind, cards);
            if !claim_matches_detected(&claim, &detected) {
                return Err(GameError::illegal_move(format!(
                    "claimed {:?} does not match the hand",
                    claim.kind
                )));
            }
            if accepted.contains(&claim) {
                return Err(GameError::illegal_move("declaration claimed twice"));
            }
            accepted.push(claim);
        }

        let melds: Vec<DeclaredMeld> = accepted
            .into_iter()
            .map(|declaration| DeclaredMeld {
                seat: actor,
                declaration,
            })
            .collect();
        self.declarations.extend(melds.iter().cloned());
        self.declared[actor as usize] = true;

        if self.declared.iter().all(|&d| d) {
            self.phase = RoundPhase::Playing;
            self.turn = self.first_to_act();
        } else {
            self.turn = next_seat(actor);
        }
        Ok(melds)
    }

    /// Announce belot: the actor must still hold both the king and queen of
    /// trump, i.e. neither has been played yet, and may announce only once.
    pub fn announce_belot(&mut self, actor: Seat) -> Result<(), GameError> {
        self.require_phase(RoundPhase::Playing)?;
        let trump = self.require_trump()?;
        if self.belots.contains(&actor) {
            return Err(GameError::illegal_move("belot already announced"));
        }
        let hand = &self.hands[actor as usize];
        let king = Card::new(Rank::King, trump);
        let queen = Card::new(Rank::Queen, trump);
        if !(hand.contains(&king) && hand.contains(&queen)) {
            return Err(GameError::illegal_move(
                "belot requires holding both king and queen of trump",
            ));
        }
        self.belots.push(actor);
        Ok(())
    }

    /// Play a card. On the fourth card the trick resolves and its winner
    /// leads; after the eighth trick the round scores itself and is Done.
    pub fn play_card(&mut self, actor: Seat, card: Card) -> Result<PlayOutcome, GameError> {
        self.require_phase(RoundPhase::Playing)?;
        self.require_turn(actor)?;
        let trump = self.require_trump()?;

        let hand = &self.hands[actor as usize];
        if !hand.contains(&card) {
            return Err(GameError::illegal_move(format!(
                "card {} is not in hand",
                card.code()
            )));
        }
        let legal = valid_moves(hand, &self.current_trick, trump);
        if !legal.contains(&card) {
            return Err(GameError::illegal_move(format!(
                "card {} violates the following rules",
                card.code()
            )));
        }

        // All validations passed; mutate.
        self.hands[actor as usize].retain(|&c| c != card);
        self.current_trick.push((actor, card));

        if self.current_trick.len() < PLAYERS {
            self.turn = next_seat(actor);
            return Ok(PlayOutcome {
                trick_completed: None,
                round_score: None,
            });
        }

        let winner = trick_winner(&self.current_trick, trump).ok_or_else(|| {
            GameError::internal("completed trick has no resolvable winner")
        })?;
        let mut points = trick_points(&self.current_trick, trump);
        if self.completed_tricks.len() == TRICKS_PER_ROUND - 1 {
            points += LAST_TRICK_BONUS;
        }
        let trick = CompletedTrick {
            plays: std::mem::take(&mut self.current_trick),
            winner,
            points,
        };
        self.completed_tricks.push(trick.clone());
        self.turn = winner;

        if self.completed_tricks.len() < TRICKS_PER_ROUND {
            return Ok(PlayOutcome {
                trick_completed: Some(trick),
                round_score: None,
            });
        }

        self.phase = RoundPhase::Scoring;
        let score = resolve_round(&self.tally()?);
        self.score = Some(score.clone());
        self.phase = RoundPhase::Done;
        Ok(PlayOutcome {
            trick_completed: Some(trick),
            round_score: Some(score),
        })
    }

    /// Legal plays for a seat given the current trick; empty off-turn.
    pub fn legal_plays(&self, seat: Seat) -> Vec<Card> {
        if self.phase != RoundPhase::Playing || seat != self.turn {
            return Vec::new();
        }
        match self.trump {
            Some(trump) => valid_moves(&self.hands[seat as usize], &self.current_trick, trump),
            None => Vec::new(),
        }
    }

    /// The round's scoring input, built from completed tricks, accepted
    /// declarations, and announced belots.
    pub fn tally(&self) -> Result<RoundTally, GameError> {
        let caller = self
            .caller
            .ok_or_else(|| GameError::internal("round has no caller"))?;

        let mut points = [0u16; 2];
        let mut won = [0u8; 2];
        for trick in &self.completed_tricks {
            let team = Team::of_seat(trick.winner);
            points[team.index()] += trick.points;
            won[team.index()] += 1;
        }

        let mut declarations: [Vec<Declaration>; 2] = [Vec::new(), Vec::new()];
        for meld in &self.declarations {
            declarations[Team::of_seat(meld.seat).index()].push(meld.declaration.clone());
        }

        let mut belot_count = [0u8; 2];
        for &seat in &self.belots {
            belot_count[Team::of_seat(seat).index()] += 1;
        }

        Ok(RoundTally {
            calling_team: Team::of_seat(caller),
            trick_points: points,
            tricks_won: won,
            declarations,
            belot_count,
        })
    }

    /// Total cards tracked by the round across hands, the open trick, and
    /// completed tricks. Always 32 for a consistent round.
    pub fn cards_tracked(&self) -> usize {
        self.hands.iter().map(Vec::len).sum::<usize>()
            + self.current_trick.len()
            + self.completed_tricks.iter().map(|t| t.plays.len()).sum::<usize>()
    }

    fn require_trump(&self) -> Result<Suit, GameError> {
        self.trump
            .ok_or_else(|| GameError::internal("trump not set for this round"))
    }
}
