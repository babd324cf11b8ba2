//! Domain layer: pure game logic, no IO.

pub mod cards_logic;
pub mod cards_parsing;
pub mod cards_serde;
pub mod cards_types;
pub mod dealing;
pub mod declarations;
pub mod round;
pub mod rules;
pub mod scoring;
pub mod seed_derivation;

// Re-exports for ergonomics
pub use cards_logic::{card_beats, card_points, hand_has_suit};
pub use cards_parsing::try_parse_cards;
pub use cards_types::{Card, Rank, Suit};
pub use dealing::{deal_hands, full_deck, DECK_SIZE, HAND_SIZE};
pub use declarations::{detect_declarations, Declaration, DeclarationKind};
pub use round::{CompletedTrick, DeclaredMeld, PlayOutcome, Round, RoundPhase};
pub use rules::{
    legal_bid, next_seat, partner_of, trick_winner, valid_moves, winning_play, Seat, Team,
    PLAYERS, TRICKS_PER_ROUND,
};
pub use scoring::{game_winner, resolve_round, RoundScore, RoundTally};
pub use seed_derivation::{derive_dealing_seed, derive_setup_seed};
