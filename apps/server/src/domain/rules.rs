//! Legal-move computation, trick resolution, and bidding legality.
//!
//! Everything here is pure and stateless; the round state machine calls in
//! with borrowed state and applies the results itself.

use serde::{Deserialize, Serialize};

use super::cards_logic::{base_strength, card_beats, trump_strength};
use super::cards_types::{Card, Suit};
use super::round::RoundPhase;

pub const PLAYERS: usize = 4;
pub const TRICKS_PER_ROUND: usize = 8;

/// Fixed 0-3 table position. Teams occupy seats {0,2} and {1,3}.
pub type Seat = u8;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    A,
    B,
}

impl Team {
    pub fn of_seat(seat: Seat) -> Team {
        if seat % 2 == 0 {
            Team::A
        } else {
            Team::B
        }
    }

    pub fn other(self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Team::A => 0,
            Team::B => 1,
        }
    }
}

pub fn next_seat(seat: Seat) -> Seat {
    (seat + 1) % PLAYERS as Seat
}

pub fn partner_of(seat: Seat) -> Seat {
    (seat + 2) % PLAYERS as Seat
}

pub fn same_team(a: Seat, b: Seat) -> bool {
    a % 2 == b % 2
}

/// The winning play among `trick` for an explicitly anchored led suit.
pub fn winning_play(trick: &[(Seat, Card)], lead: Suit, trump: Suit) -> Option<(Seat, Card)> {
    let mut winner = *trick.first()?;
    for &(seat, card) in &trick[1..] {
        if card_beats(card, winner.1, lead, trump) {
            winner = (seat, card);
        }
    }
    Some(winner)
}

/// The play currently winning the (possibly incomplete) trick; the led suit
/// is the suit of the first card.
pub fn current_winner(trick: &[(Seat, Card)], trump: Suit) -> Option<(Seat, Card)> {
    let &(_, lead_card) = trick.first()?;
    winning_play(trick, lead_card.suit, trump)
}

/// Winner of a trick: the highest trump if any was played, otherwise the
/// highest card of the led suit.
pub fn trick_winner(trick: &[(Seat, Card)], trump: Suit) -> Option<Seat> {
    current_winner(trick, trump).map(|(seat, _)| seat)
}

/// The cards a player may legally put on the current trick.
///
/// Precedence:
/// 1. Leading: anything.
/// 2. Holding the led suit:
///    - trump led: follow trump, overtaking the highest trump when able;
///    - a trump already controls the trick: free choice between following
///      the led suit and playing any trump;
///    - plain trick: follow the led suit, overtaking its highest card when
///      able.
/// 3. Void in the led suit:
///    - partner currently winning and no opponent trump in the trick: any
///      card;
///    - an opponent trump controls the trick: overtake it when able, else
///      any trump, else any card;
///    - otherwise trumping is mandatory when possible, else any card.
pub fn valid_moves(hand: &[Card], trick: &[(Seat, Card)], trump: Suit) -> Vec<Card> {
    if hand.is_empty() {
        return Vec::new();
    }
    let Some(&(_, lead_card)) = trick.first() else {
        return hand.to_vec();
    };
    let lead = lead_card.suit;

    let highest_trump = trick
        .iter()
        .map(|&(_, c)| c)
        .filter(|c| c.suit == trump)
        .max_by_key(|c| trump_strength(c.rank));

    let follow: Vec<Card> = hand.iter().copied().filter(|c| c.suit == lead).collect();
    if !follow.is_empty() {
        if lead == trump {
            let top = highest_trump.unwrap_or(lead_card);
            let beating: Vec<Card> = follow
                .iter()
                .copied()
                .filter(|c| trump_strength(c.rank) > trump_strength(top.rank))
                .collect();
            return if beating.is_empty() { follow } else { beating };
        }
        if highest_trump.is_some() {
            let mut moves = follow;
            moves.extend(hand.iter().copied().filter(|c| c.suit == trump));
            return moves;
        }
        let top = trick
            .iter()
            .map(|&(_, c)| c)
            .filter(|c| c.suit == lead)
            .max_by_key(|c| base_strength(c.rank))
            .unwrap_or(lead_card);
        let beating: Vec<Card> = follow
            .iter()
            .copied()
            .filter(|c| base_strength(c.rank) > base_strength(top.rank))
            .collect();
        return if beating.is_empty() { follow } else { beating };
    }

    // Void in the led suit. The actor is the next seat clockwise after the
    // last play, so partnership can be read off the trick itself.
    let actor = next_seat(trick[trick.len() - 1].0);
    let winner = match current_winner(trick, trump) {
        Some(w) => w,
        None => return hand.to_vec(),
    };
    let trumps: Vec<Card> = hand.iter().copied().filter(|c| c.suit == trump).collect();

    if same_team(winner.0, actor) {
        // No obligation to trump the partner's winning card.
        return hand.to_vec();
    }

    if winner.1.suit == trump {
        // An opponent trump controls the trick.
        let top = winner.1;
        let beating: Vec<Card> = trumps
            .iter()
            .copied()
            .filter(|c| trump_strength(c.rank) > trump_strength(top.rank))
            .collect();
        if !beating.is_empty() {
            return beating;
        }
        if !trumps.is_empty() {
            return trumps;
        }
        return hand.to_vec();
    }

    // Opponent winning without trump: trumping is mandatory when possible.
    if !trumps.is_empty() {
        return trumps;
    }
    hand.to_vec()
}

/// Bidding is legal only in the Bidding phase and only by the designated
/// actor.
pub fn legal_bid(phase: RoundPhase, actor: Seat, expected_actor: Seat) -> bool {
    phase == RoundPhase::Bidding && actor == expected_actor
}
