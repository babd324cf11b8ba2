//! Declaration (meld) detection from a dealt hand.
//!
//! Categories: belot (K+Q of trump), four-of-a-kind (jacks, nines, aces,
//! kings, queens), and maximal same-suit sequences of three or more in
//! natural rank order. Sub-runs inside a longer run are not scored
//! separately. A hand may carry several declarations at once.

use serde::{Deserialize, Serialize};

use super::cards_types::{Card, Rank, Suit};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Belot,
    FourJacks,
    FourNines,
    FourAces,
    FourKings,
    FourQueens,
    #[serde(rename = "sequence_3")]
    SequenceThree,
    #[serde(rename = "sequence_4")]
    SequenceFour,
    #[serde(rename = "sequence_5")]
    SequenceFive,
}

impl DeclarationKind {
    pub const fn value(self) -> u16 {
        match self {
            DeclarationKind::Belot => 20,
            DeclarationKind::FourJacks => 200,
            DeclarationKind::FourNines => 150,
            DeclarationKind::FourAces
            | DeclarationKind::FourKings
            | DeclarationKind::FourQueens => 100,
            DeclarationKind::SequenceThree => 20,
            DeclarationKind::SequenceFour => 50,
            DeclarationKind::SequenceFive => 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub kind: DeclarationKind,
    /// Exact cards covered, sorted in the crate's stable card order.
    pub cards: Vec<Card>,
    pub value: u16,
}

impl Declaration {
    pub fn new(kind: DeclarationKind, mut cards: Vec<Card>) -> Self {
        cards.sort();
        let value = kind.value();
        Self { kind, cards, value }
    }
}

/// Detect every declaration present in `hand` for the chosen trump.
pub fn detect_declarations(hand: &[Card], trump: Suit) -> Vec<Declaration> {
    let mut found = Vec::new();

    if let Some(belot) = detect_belot(hand, trump) {
        found.push(belot);
    }

    for (rank, kind) in [
        (Rank::Jack, DeclarationKind::FourJacks),
        (Rank::Nine, DeclarationKind::FourNines),
        (Rank::Ace, DeclarationKind::FourAces),
        (Rank::King, DeclarationKind::FourKings),
        (Rank::Queen, DeclarationKind::FourQueens),
    ] {
        let of_rank: Vec<Card> = hand.iter().copied().filter(|c| c.rank == rank).collect();
        if of_rank.len() == 4 {
            found.push(Declaration::new(kind, of_rank));
        }
    }

    for suit in Suit::ALL {
        found.extend(detect_sequences_in_suit(hand, suit));
    }

    found
}

fn detect_belot(hand: &[Card], trump: Suit) -> Option<Declaration> {
    let king = Card::new(Rank::King, trump);
    let queen = Card::new(Rank::Queen, trump);
    if hand.contains(&king) && hand.contains(&queen) {
        Some(Declaration::new(DeclarationKind::Belot, vec![king, queen]))
    } else {
        None
    }
}

/// Maximal runs of natural-order adjacent ranks within one suit.
fn detect_sequences_in_suit(hand: &[Card], suit: Suit) -> Vec<Declaration> {
    let mut present = [false; 8];
    for card in hand.iter().filter(|c| c.suit == suit) {
        present[card.rank as usize] = true;
    }

    let mut runs = Vec::new();
    let mut start = None;
    for i in 0..=8 {
        let here = i < 8 && present[i];
        match (start, here) {
            (None, true) => start = Some(i),
            (Some(s), false) => {
                if i - s >= 3 {
                    runs.push((s, i));
                }
                start = None;
            }
            _ => {}
        }
    }

    runs.into_iter()
        .map(|(s, e)| {
            let kind = match e - s {
                3 => DeclarationKind::SequenceThree,
                4 => DeclarationKind::SequenceFour,
                _ => DeclarationKind::SequenceFive,
            };
            let cards = (s..e).map(|i| Card::new(Rank::ALL[i], suit)).collect();
            Declaration::new(kind, cards)
        })
        .collect()
}

/// Whether a claimed declaration matches one the server detects itself.
/// The claim must name the exact cards of a detected declaration.
pub fn claim_matches_detected(claim: &Declaration, detected: &[Declaration]) -> bool {
    detected
        .iter()
        .any(|d| d.kind == claim.kind && d.cards == claim.cards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cards_parsing::try_parse_cards;

    fn detect(codes: &[&str], trump: Suit) -> Vec<Declaration> {
        let hand = try_parse_cards(codes.iter().copied()).unwrap();
        detect_declarations(&hand, trump)
    }

    #[test]
    fn four_jacks_and_spade_run_detected_together() {
        // 7S 8S 9S JD JH JS JC KH, trump hearts: four jacks (200) and the
        // 7-8-9 spade run (20); no belot since QH is absent. The spare JS
        // does not extend the spade run past the missing ten.
        let found = detect(
            &["7S", "8S", "9S", "JD", "JH", "JS", "JC", "KH"],
            Suit::Hearts,
        );
        assert_eq!(found.len(), 2);
        assert!(found
            .iter()
            .any(|d| d.kind == DeclarationKind::FourJacks && d.value == 200));
        let run = found
            .iter()
            .find(|d| d.kind == DeclarationKind::SequenceThree)
            .unwrap();
        assert_eq!(run.value, 20);
        assert_eq!(run.cards, try_parse_cards(["7S", "8S", "9S"]).unwrap());
        assert!(!found.iter().any(|d| d.kind == DeclarationKind::Belot));
        let total: u16 = found.iter().map(|d| d.value).sum();
        assert_eq!(total, 220);
    }

    #[test]
    fn belot_needs_both_king_and_queen_of_trump() {
        let found = detect(&["KH", "QH", "7S", "8D"], Suit::Hearts);
        assert!(found.iter().any(|d| d.kind == DeclarationKind::Belot));

        let found = detect(&["KH", "QS", "7S", "8D"], Suit::Hearts);
        assert!(!found.iter().any(|d| d.kind == DeclarationKind::Belot));

        // Same cards, different trump: no belot.
        let found = detect(&["KH", "QH", "7S", "8D"], Suit::Spades);
        assert!(!found.iter().any(|d| d.kind == DeclarationKind::Belot));
    }

    #[test]
    fn no_four_of_a_kind_for_sevens_eights_tens() {
        let found = detect(
            &["7S", "7H", "7D", "7C", "0S", "0H", "0D", "0C"],
            Suit::Hearts,
        );
        assert!(found
            .iter()
            .all(|d| !matches!(d.kind, DeclarationKind::FourJacks
                | DeclarationKind::FourNines
                | DeclarationKind::FourAces
                | DeclarationKind::FourKings
                | DeclarationKind::FourQueens)));
    }

    #[test]
    fn longer_runs_swallow_sub_runs() {
        // 7-8-9-0 of clubs is one four-card run, not two three-card runs.
        let found = detect(&["7C", "8C", "9C", "0C", "AD", "KH"], Suit::Hearts);
        let runs: Vec<_> = found
            .iter()
            .filter(|d| {
                matches!(
                    d.kind,
                    DeclarationKind::SequenceThree
                        | DeclarationKind::SequenceFour
                        | DeclarationKind::SequenceFive
                )
            })
            .collect();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].kind, DeclarationKind::SequenceFour);
        assert_eq!(runs[0].value, 50);
    }

    #[test]
    fn five_or_more_scores_hundred() {
        let found = detect(&["9D", "0D", "JD", "QD", "KD", "AD"], Suit::Hearts);
        let run = found
            .iter()
            .find(|d| d.kind == DeclarationKind::SequenceFive)
            .unwrap();
        assert_eq!(run.value, 100);
        assert_eq!(run.cards.len(), 6);
    }

    #[test]
    fn runs_do_not_cross_suits() {
        let found = detect(&["7S", "8S", "9D", "KH", "AH", "QC"], Suit::Hearts);
        assert!(found.is_empty());
    }

    #[test]
    fn claim_validation_requires_exact_cards() {
        let hand = try_parse_cards(["7S", "8S", "9S", "0S", "AD", "KD", "QD", "7H"]).unwrap();
        let detected = detect_declarations(&hand, Suit::Hearts);

        let full_run = Declaration::new(
            DeclarationKind::SequenceFour,
            try_parse_cards(["7S", "8S", "9S", "0S"]).unwrap(),
        );
        assert!(claim_matches_detected(&full_run, &detected));

        // Claiming only the inner three-card slice of the four-card run fails.
        let sub_run = Declaration::new(
            DeclarationKind::SequenceThree,
            try_parse_cards(["7S", "8S", "9S"]).unwrap(),
        );
        assert!(!claim_matches_detected(&sub_run, &detected));
    }
}
