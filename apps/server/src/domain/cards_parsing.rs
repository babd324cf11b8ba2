//! Card parsing from the persisted 2-character code (e.g., "AH", "0D").
//!
//! The ten is written `0` so every code stays two characters.

use std::str::FromStr;

use super::cards_types::{Card, Rank, Suit};
use crate::errors::GameError;

impl Card {
    /// The 2-character code used on the wire and in the store.
    pub fn code(&self) -> String {
        let rank_ch = match self.rank {
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => '0',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        };
        let suit_ch = match self.suit {
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
            Suit::Hearts => 'H',
            Suit::Spades => 'S',
        };
        format!("{rank_ch}{suit_ch}")
    }
}

impl FromStr for Card {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(rank_ch), Some(suit_ch), None) = (chars.next(), chars.next(), chars.next())
        else {
            return Err(GameError::illegal_move(format!("bad card code: {s:?}")));
        };
        let rank = match rank_ch {
            '7' => Rank::Seven,
            '8' => Rank::Eight,
            '9' => Rank::Nine,
            '0' => Rank::Ten,
            'J' => Rank::Jack,
            'Q' => Rank::Queen,
            'K' => Rank::King,
            'A' => Rank::Ace,
            _ => return Err(GameError::illegal_move(format!("bad card rank: {s:?}"))),
        };
        let suit = match suit_ch {
            'C' => Suit::Clubs,
            'D' => Suit::Diamonds,
            'H' => Suit::Hearts,
            'S' => Suit::Spades,
            _ => return Err(GameError::illegal_move(format!("bad card suit: {s:?}"))),
        };
        Ok(Card { suit, rank })
    }
}

/// Non-panicking helper to parse card codes into `Card`s.
/// Fails on the first invalid code.
pub fn try_parse_cards<I, S>(codes: I) -> Result<Vec<Card>, GameError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    codes
        .into_iter()
        .map(|s| s.as_ref().parse::<Card>())
        .collect()
}
