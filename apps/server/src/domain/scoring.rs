//! Round and game scoring.
//!
//! Pure functions over completed-round tallies: trick points, the
//! winner-takes-all declaration comparison, the unconditional belot bonus,
//! the fall rule for the calling team, capot, and game-winner detection.

use serde::{Deserialize, Serialize};

use super::cards_logic::card_points;
use super::cards_types::{Card, Suit};
use super::declarations::Declaration;
use super::rules::{Seat, Team, TRICKS_PER_ROUND};

pub const LAST_TRICK_BONUS: u16 = 10;
pub const CAPOT_BONUS: u16 = 90;
pub const BELOT_BONUS: u16 = 20;

/// Card points of one trick.
pub fn trick_points(plays: &[(Seat, Card)], trump: Suit) -> u16 {
    plays.iter().map(|&(_, c)| card_points(c, trump)).sum()
}

/// Everything a finished round feeds into resolution.
///
/// `trick_points` are raw card points per team with the last-trick bonus
/// already credited; capot is applied here, not by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTally {
    pub calling_team: Team,
    pub trick_points: [u16; 2],
    pub tricks_won: [u8; 2],
    pub declarations: [Vec<Declaration>; 2],
    pub belot_count: [u8; 2],
}

/// The resolved outcome of one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundScore {
    pub calling_team: Team,
    /// Trick points per team, including the capot bonus when one applies.
    pub trick_points: [u16; 2],
    pub declaration_points: [u16; 2],
    pub belot_points: [u16; 2],
    pub declaration_winner: Option<Team>,
    pub capot: Option<Team>,
    pub calling_team_fell: bool,
    /// Final per-team round totals after the fall rule.
    pub totals: [u16; 2],
}

/// Compare the teams' declarations by their highest single value; the team
/// with the higher one scores the sum of all of its declarations, the other
/// team scores zero. Ties go to the calling team.
pub fn resolve_declarations(
    declarations: &[Vec<Declaration>; 2],
    calling_team: Team,
) -> (Option<Team>, [u16; 2]) {
    let best: [u16; 2] = [
        declarations[0].iter().map(|d| d.value).max().unwrap_or(0),
        declarations[1].iter().map(|d| d.value).max().unwrap_or(0),
    ];
    if best == [0, 0] {
        return (None, [0, 0]);
    }

    let winner = if best[0] > best[1] {
        Team::A
    } else if best[1] > best[0] {
        Team::B
    } else {
        calling_team
    };

    let mut points = [0u16; 2];
    points[winner.index()] = declarations[winner.index()].iter().map(|d| d.value).sum();
    (Some(winner), points)
}

/// Resolve a round: capot, declaration comparison, belot bonuses, then the
/// fall rule. If the calling team does not outscore its opponents, it scores
/// zero and the opponents take everything.
pub fn resolve_round(tally: &RoundTally) -> RoundScore {
    let mut trick_points = tally.trick_points;
    let mut capot = None;
    for team in [Team::A, Team::B] {
        if tally.tricks_won[team.index()] == TRICKS_PER_ROUND as u8 {
            trick_points[team.index()] += CAPOT_BONUS;
            capot = Some(team);
        }
    }

    let (declaration_winner, declaration_points) =
        resolve_declarations(&tally.declarations, tally.calling_team);

    let belot_points = [
        tally.belot_count[0] as u16 * BELOT_BONUS,
        tally.belot_count[1] as u16 * BELOT_BONUS,
    ];

    let raw = [
        trick_points[0] + declaration_points[0] + belot_points[0],
        trick_points[1] + declaration_points[1] + belot_points[1],
    ];

    let caller = tally.calling_team.index();
    let opponent = tally.calling_team.other().index();
    let calling_team_fell = raw[caller] <= raw[opponent];

    let mut totals = raw;
    if calling_team_fell {
        totals[opponent] = raw[caller] + raw[opponent];
        totals[caller] = 0;
    }

    RoundScore {
        calling_team: tally.calling_team,
        trick_points,
        declaration_points,
        belot_points,
        declaration_winner,
        capot,
        calling_team_fell,
        totals,
    }
}

/// Decide the game winner after a round's totals have been accumulated.
///
/// First team at or over the threshold wins. Should both cross in the same
/// round, the calling team takes the game (it necessarily crossed, having
/// scored this round).
pub fn game_winner(scores: [u32; 2], points_to_win: u32, calling_team: Team) -> Option<Team> {
    let a = scores[0] >= points_to_win;
    let b = scores[1] >= points_to_win;
    match (a, b) {
        (false, false) => None,
        (true, false) => Some(Team::A),
        (false, true) => Some(Team::B),
        (true, true) => Some(calling_team),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::declarations::DeclarationKind;

    fn decl(kind: DeclarationKind) -> Declaration {
        Declaration {
            kind,
            cards: Vec::new(),
            value: kind.value(),
        }
    }

    fn tally(calling: Team, trick_points: [u16; 2], tricks_won: [u8; 2]) -> RoundTally {
        RoundTally {
            calling_team: calling,
            trick_points,
            tricks_won,
            declarations: [Vec::new(), Vec::new()],
            belot_count: [0, 0],
        }
    }

    #[test]
    fn calling_team_falls_when_not_ahead() {
        // Caller A takes 50 against 122 (last-trick bonus included): A falls
        // and B banks all 172.
        let score = resolve_round(&tally(Team::A, [50, 122], [3, 5]));
        assert!(score.calling_team_fell);
        assert_eq!(score.totals, [0, 172]);
    }

    #[test]
    fn calling_team_keeps_points_when_ahead() {
        let score = resolve_round(&tally(Team::A, [100, 62], [5, 3]));
        assert!(!score.calling_team_fell);
        assert_eq!(score.totals, [100, 62]);
    }

    #[test]
    fn exact_tie_is_a_fall() {
        let score = resolve_round(&tally(Team::B, [81, 81], [4, 4]));
        assert!(score.calling_team_fell);
        assert_eq!(score.totals, [162, 0]);
    }

    #[test]
    fn capot_awards_ninety_to_the_sweeping_team() {
        let score = resolve_round(&tally(Team::A, [162, 0], [8, 0]));
        assert_eq!(score.capot, Some(Team::A));
        assert_eq!(score.trick_points, [252, 0]);
        assert!(!score.calling_team_fell);
        assert_eq!(score.totals, [252, 0]);
    }

    #[test]
    fn opponent_capot_still_drops_the_caller() {
        let score = resolve_round(&tally(Team::A, [0, 162], [0, 8]));
        assert_eq!(score.capot, Some(Team::B));
        assert!(score.calling_team_fell);
        assert_eq!(score.totals, [0, 252]);
    }

    #[test]
    fn declaration_winner_takes_all_their_declarations() {
        let mut t = tally(Team::A, [80, 82], [4, 4]);
        t.declarations = [
            vec![decl(DeclarationKind::FourJacks), decl(DeclarationKind::SequenceThree)],
            vec![decl(DeclarationKind::SequenceFive)],
        ];
        let score = resolve_round(&t);
        assert_eq!(score.declaration_winner, Some(Team::A));
        assert_eq!(score.declaration_points, [220, 0]);
        assert_eq!(score.totals, [300, 82]);
    }

    #[test]
    fn declaration_tie_goes_to_the_calling_team() {
        let (winner, points) = resolve_declarations(
            &[
                vec![decl(DeclarationKind::SequenceThree)],
                vec![decl(DeclarationKind::SequenceThree)],
            ],
            Team::B,
        );
        assert_eq!(winner, Some(Team::B));
        assert_eq!(points, [0, 20]);
    }

    #[test]
    fn belot_is_outside_the_declaration_comparison() {
        // B loses the declaration comparison but keeps its announced belot.
        let mut t = tally(Team::A, [90, 72], [5, 3]);
        t.declarations = [vec![decl(DeclarationKind::FourAces)], Vec::new()];
        t.belot_count = [0, 1];
        let score = resolve_round(&t);
        assert_eq!(score.declaration_points, [100, 0]);
        assert_eq!(score.belot_points, [0, 20]);
        assert_eq!(score.totals, [190, 92]);
    }

    #[test]
    fn game_winner_simple_threshold() {
        assert_eq!(game_winner([1030, 860], 1001, Team::A), Some(Team::A));
        assert_eq!(game_winner([970, 860], 1001, Team::A), None);
        assert_eq!(game_winner([600, 1002], 1001, Team::A), Some(Team::B));
    }

    #[test]
    fn both_over_threshold_favors_the_caller() {
        assert_eq!(game_winner([1010, 1050], 1001, Team::A), Some(Team::A));
        assert_eq!(game_winner([1010, 1050], 1001, Team::B), Some(Team::B));
    }
}
