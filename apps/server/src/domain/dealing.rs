//! Deterministic card dealing.
//!
//! All randomness flows from a per-game seed through `seed_derivation`;
//! the shuffle itself is a seeded ChaCha8 Fisher-Yates pass so a round's
//! hands are reproducible from (game seed, round number).

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::domain::{Card, Rank, Suit};

pub const DECK_SIZE: usize = 32;
pub const HAND_SIZE: usize = 8;

/// Generate the full 32-card deck in standard order.
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card { suit, rank });
        }
    }
    deck
}

fn shuffle_with_seed(deck: &mut [Card], seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    deck.shuffle(&mut rng);
}

/// Deal four sorted hands of eight from a seeded shuffle.
pub fn deal_hands(seed: u64) -> [Vec<Card>; 4] {
    let mut deck = full_deck();
    shuffle_with_seed(&mut deck, seed);

    let mut hands: [Vec<Card>; 4] = Default::default();
    for (seat, hand_slot) in hands.iter_mut().enumerate() {
        let start = seat * HAND_SIZE;
        let mut hand = deck[start..start + HAND_SIZE].to_vec();
        hand.sort();
        *hand_slot = hand;
    }
    hands
}
