//! Serialization and deserialization for card types.
//!
//! Cards travel as their compact 2-character code; suits as
//! SCREAMING_SNAKE_CASE strings.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::cards_types::{Card, Suit};

impl Serialize for Suit {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = match self {
            Suit::Clubs => "CLUBS",
            Suit::Diamonds => "DIAMONDS",
            Suit::Hearts => "HEARTS",
            Suit::Spades => "SPADES",
        };
        serializer.serialize_str(s)
    }
}

impl<'de> Deserialize<'de> for Suit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "CLUBS" => Ok(Suit::Clubs),
            "DIAMONDS" => Ok(Suit::Diamonds),
            "HEARTS" => Ok(Suit::Hearts),
            "SPADES" => Ok(Suit::Spades),
            _ => Err(serde::de::Error::custom(format!("invalid suit: {s}"))),
        }
    }
}

impl Serialize for Card {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.code())
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<Card>()
            .map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cards_types::Rank;

    #[test]
    fn card_serde_roundtrip() {
        let cases = [
            (Rank::Ace, Suit::Spades, "AS"),
            (Rank::Ten, Suit::Diamonds, "0D"),
            (Rank::Seven, Suit::Hearts, "7H"),
            (Rank::Nine, Suit::Clubs, "9C"),
        ];
        for (rank, suit, code) in cases {
            let card = Card { suit, rank };
            let json = serde_json::to_string(&card).unwrap();
            assert_eq!(json, format!("\"{code}\""));
            let back: Card = serde_json::from_str(&json).unwrap();
            assert_eq!(back, card);
        }
    }

    #[test]
    fn suit_serde() {
        assert_eq!(serde_json::to_string(&Suit::Hearts).unwrap(), "\"HEARTS\"");
        assert_eq!(
            serde_json::from_str::<Suit>("\"DIAMONDS\"").unwrap(),
            Suit::Diamonds
        );
        assert!(serde_json::from_str::<Suit>("\"hearts\"").is_err());
    }

    #[test]
    fn rejects_invalid_card_tokens() {
        for tok in ["1H", "11S", "Ah", "ZZ", "", "10H"] {
            let res: Result<Card, _> = serde_json::from_str(&format!("\"{tok}\""));
            assert!(res.is_err());
        }
    }
}
