//! The long-lived game aggregate: sequences rounds, owns seating, dealer
//! rotation, accumulated scores, and per-game event idempotency.
//!
//! Handlers validate first and mutate only on success; every accepted event
//! yields the deltas to persist and the broadcasts to emit, in order.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::broadcast::Topic;
use crate::config::GameOptions;
use crate::domain::{
    derive_setup_seed, game_winner, next_seat, Round, RoundScore, Seat, Team, PLAYERS,
};
use crate::errors::GameError;
use crate::protocol::state::{EndReason, GameSnapshot, GameStatus, RoundPublic};
use crate::protocol::{
    Command, DeclarationClaim, GameId, LeaveReason, RoomId, ServerEvent, UserId,
};
use crate::store::{GameDelta, GameRecord};

/// What one accepted game event produces: deltas for the store and
/// broadcasts for the Broadcaster, both in emission order.
#[derive(Debug, Default)]
pub struct GameOutcome {
    pub deltas: Vec<GameDelta>,
    pub events: Vec<(Topic, ServerEvent)>,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    pub id: GameId,
    pub created_by: UserId,
    pub options: GameOptions,
    pub status: GameStatus,
    pub seats: [UserId; 4],
    pub active: [bool; 4],
    pub dealer: Seat,
    pub scores: [u32; 2],
    pub round: Option<Round>,
    pub history: Vec<RoundScore>,
    pub winner: Option<Team>,
    pub end_reason: Option<EndReason>,
    pub room_id: Option<RoomId>,
    seed: u64,
    last_seq: u64,
}

impl GameSession {
    /// Start a game for exactly four players. Seating and the first dealer
    /// come from the seed-derived setup RNG, so a fixed deck seed fixes the
    /// whole trajectory; partners end up across from each other by seat
    /// parity.
    pub fn start(
        id: GameId,
        created_by: UserId,
        players: &[UserId],
        options: GameOptions,
        room_id: Option<RoomId>,
    ) -> Result<(Self, GameOutcome), GameError> {
        options.validate()?;
        if players.len() != PLAYERS {
            return Err(GameError::capacity(format!(
                "a game seats exactly {PLAYERS} players, got {}",
                players.len()
            )));
        }
        for (i, a) in players.iter().enumerate() {
            if players[i + 1..].contains(a) {
                return Err(GameError::conflict(format!("player {a} seated twice")));
            }
        }

        let seed = options.deck_seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = ChaCha8Rng::seed_from_u64(derive_setup_seed(seed));
        let mut shuffled = players.to_vec();
        shuffled.shuffle(&mut rng);
        let seats: [UserId; 4] = [shuffled[0], shuffled[1], shuffled[2], shuffled[3]];
        let dealer: Seat = rng.random_range(0..PLAYERS as u8);

        let session = Self::from_created(id, created_by, seats, dealer, seed, options, room_id);

        let mut outcome = GameOutcome {
            deltas: vec![GameDelta::Created {
                created_by,
                seats,
                dealer,
                seed,
                options: session.options.clone(),
            }],
            events: Vec::new(),
        };
        outcome.events.push((
            Topic::Game(id),
            ServerEvent::GameStarted {
                game: session.snapshot(),
                room_id,
            },
        ));
        session.emit_round_started(&mut outcome);

        info!(game_id = %id, dealer, "game started");
        Ok((session, outcome))
    }

    fn from_created(
        id: GameId,
        created_by: UserId,
        seats: [UserId; 4],
        dealer: Seat,
        seed: u64,
        options: GameOptions,
        room_id: Option<RoomId>,
    ) -> Self {
        let round = Round::deal(1, dealer, seed);
        Self {
            id,
            created_by,
            options,
            status: GameStatus::InProgress,
            seats,
            active: [true; 4],
            dealer,
            scores: [0, 0],
            round: Some(round),
            history: Vec::new(),
            winner: None,
            end_reason: None,
            room_id,
            seed,
            last_seq: 0,
        }
    }

    /// Rebuild a completed or in-flight game by replaying its persisted
    /// delta log. The head must be the `Created` delta.
    pub fn replay(record: &GameRecord) -> Result<Self, GameError> {
        let mut deltas = record.deltas.iter();
        let Some(GameDelta::Created {
            created_by,
            seats,
            dealer,
            seed,
            options,
        }) = deltas.next()
        else {
            return Err(GameError::internal("game record has no creation delta"));
        };
        let mut session = Self::from_created(
            uuid::Uuid::new_v4(),
            *created_by,
            *seats,
            *dealer,
            *seed,
            options.clone(),
            None,
        );

        for delta in deltas {
            match delta {
                GameDelta::TrumpPassed { seat, .. } => {
                    session.on_pass(*seat)?;
                }
                GameDelta::TrumpSelected { seat, suit, .. } => {
                    session.on_bid(*seat, *suit)?;
                }
                GameDelta::Declared {
                    seat, declarations, ..
                } => {
                    let claims: Vec<DeclarationClaim> = declarations
                        .iter()
                        .map(|d| DeclarationClaim {
                            kind: d.kind,
                            cards: d.cards.clone(),
                        })
                        .collect();
                    session.on_declare(*seat, &claims)?;
                }
                GameDelta::BelotAnnounced { seat, .. } => {
                    session.on_belot(*seat)?;
                }
                GameDelta::MovePlayed { seat, card, .. } => {
                    session.on_play(*seat, card.parse()?)?;
                }
                GameDelta::PlayerActive { seat, active } => {
                    session.active[*seat as usize] = *active;
                }
                GameDelta::Completed {
                    winner, end_reason, ..
                } => {
                    if session.status != GameStatus::Completed {
                        session.forfeit_to(*winner, *end_reason)?;
                    }
                }
                // Derived records; the replayed actions regenerate them.
                GameDelta::Created { .. }
                | GameDelta::RoundStarted { .. }
                | GameDelta::RoundCompleted { .. } => {}
            }
        }
        Ok(session)
    }

    pub fn seat_of(&self, user: UserId) -> Option<Seat> {
        self.seats.iter().position(|&u| u == user).map(|i| i as Seat)
    }

    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }

    /// Handle one client event addressed to this game.
    ///
    /// Sequence discipline: `seq` must be exactly `last_seq + 1` to apply.
    /// A retry of the last accepted event is absorbed as `DUPLICATE` with no
    /// new effects; anything older is `STALE`; a gap ahead is `CONFLICT`.
    /// Rejected events do not consume a sequence number.
    pub fn handle(
        &mut self,
        actor: UserId,
        seq: Option<u64>,
        command: &Command,
    ) -> Result<GameOutcome, GameError> {
        let seat = self
            .seat_of(actor)
            .ok_or_else(|| GameError::not_member(format!("user {actor} is not seated here")))?;

        let seq = seq.ok_or_else(|| {
            GameError::conflict("game events require a sequence number")
        })?;
        if seq == self.last_seq {
            debug!(game_id = %self.id, seq, "retry absorbed");
            return Err(GameError::duplicate(format!("event {seq} already applied")));
        }
        if seq < self.last_seq {
            return Err(GameError::stale(format!(
                "event {seq} is older than {}",
                self.last_seq
            )));
        }
        if seq > self.last_seq + 1 {
            return Err(GameError::conflict(format!(
                "sequence gap: got {seq}, expected {}",
                self.last_seq + 1
            )));
        }

        let was_inactive = !self.active[seat as usize];
        let mut outcome = match command {
            Command::BidTrump { suit } => self.on_bid(seat, *suit)?,
            Command::PassTrump => self.on_pass(seat)?,
            Command::Declare { declarations } => self.on_declare(seat, declarations)?,
            Command::AnnounceBelot => self.on_belot(seat)?,
            Command::PlayCard { card } => self.on_play(seat, *card)?,
            Command::PlayerLeft { reason } => self.on_player_left(seat, *reason)?,
            _ => {
                return Err(GameError::wrong_phase(
                    "room commands cannot target a game",
                ))
            }
        };

        // A seat heard playing again is evidently back.
        if was_inactive
            && !matches!(command, Command::PlayerLeft { .. })
            && self.status == GameStatus::InProgress
        {
            self.active[seat as usize] = true;
            outcome.deltas.push(GameDelta::PlayerActive { seat, active: true });
            outcome.events.push((
                Topic::Game(self.id),
                ServerEvent::PlayerStatus {
                    game_id: self.id,
                    seat,
                    active: true,
                },
            ));
        }

        self.last_seq = seq;
        Ok(outcome)
    }

    fn round_mut(&mut self) -> Result<&mut Round, GameError> {
        if self.status != GameStatus::InProgress {
            return Err(GameError::wrong_phase(format!(
                "game is {:?}",
                self.status
            )));
        }
        self.round
            .as_mut()
            .ok_or_else(|| GameError::internal("in-progress game has no round"))
    }

    fn on_bid(&mut self, seat: Seat, suit: crate::domain::Suit) -> Result<GameOutcome, GameError> {
        let id = self.id;
        let round = self.round_mut()?;
        round.bid_trump(seat, suit)?;
        let number = round.number;
        info!(game_id = %id, round = number, seat, suit = ?suit, "trump selected");
        Ok(GameOutcome {
            deltas: vec![GameDelta::TrumpSelected {
                round: number,
                seat,
                suit,
            }],
            events: vec![(
                Topic::Game(id),
                ServerEvent::TrumpSelected {
                    game_id: id,
                    round: number,
                    seat,
                    suit,
                },
            )],
        })
    }

    fn on_pass(&mut self, seat: Seat) -> Result<GameOutcome, GameError> {
        let id = self.id;
        let round = self.round_mut()?;
        round.pass_trump(seat)?;
        let number = round.number;
        let forced = round.forced_bid;
        debug!(game_id = %id, round = number, seat, forced, "trump passed");
        Ok(GameOutcome {
            deltas: vec![GameDelta::TrumpPassed {
                round: number,
                seat,
            }],
            events: vec![(
                Topic::Game(id),
                ServerEvent::TrumpPassed {
                    game_id: id,
                    round: number,
                    seat,
                    dealer_forced: forced,
                },
            )],
        })
    }

    fn on_declare(
        &mut self,
        seat: Seat,
        claims: &[DeclarationClaim],
    ) -> Result<GameOutcome, GameError> {
        let id = self.id;
        let round = self.round_mut()?;
        let pairs = claims
            .iter()
            .map(|c| (c.kind, c.cards.clone()))
            .collect::<Vec<_>>();
        let melds = round.declare(seat, pairs)?;
        let number = round.number;
        let declarations: Vec<_> = melds.into_iter().map(|m| m.declaration).collect();
        Ok(GameOutcome {
            deltas: vec![GameDelta::Declared {
                round: number,
                seat,
                declarations: declarations.clone(),
            }],
            events: vec![(
                Topic::Game(id),
                ServerEvent::DeclarationsAnnounced {
                    game_id: id,
                    round: number,
                    seat,
                    declarations,
                },
            )],
        })
    }

    fn on_belot(&mut self, seat: Seat) -> Result<GameOutcome, GameError> {
        let id = self.id;
        let round = self.round_mut()?;
        round.announce_belot(seat)?;
        let number = round.number;
        info!(game_id = %id, round = number, seat, "belot announced");
        Ok(GameOutcome {
            deltas: vec![GameDelta::BelotAnnounced {
                round: number,
                seat,
            }],
            events: vec![(
                Topic::Game(id),
                ServerEvent::BelotAnnounced {
                    game_id: id,
                    round: number,
                    seat,
                },
            )],
        })
    }

    fn on_play(&mut self, seat: Seat, card: crate::domain::Card) -> Result<GameOutcome, GameError> {
        let id = self.id;
        let round = self.round_mut()?;
        let number = round.number;
        let trick_no = round.completed_tricks.len() as u8;
        let order = round.current_trick.len() as u8;

        let play = round.play_card(seat, card)?;
        let next = round.turn;

        let mut outcome = GameOutcome {
            deltas: vec![GameDelta::MovePlayed {
                round: number,
                trick: trick_no,
                order,
                seat,
                card: card.code(),
            }],
            events: vec![(
                Topic::Game(id),
                ServerEvent::CardPlayed {
                    game_id: id,
                    round: number,
                    seat,
                    card,
                    next,
                },
            )],
        };

        if let Some(trick) = &play.trick_completed {
            outcome.events.push((
                Topic::Game(id),
                ServerEvent::TrickCompleted {
                    game_id: id,
                    round: number,
                    winner: trick.winner,
                    points: trick.points,
                },
            ));
        }

        if let Some(score) = play.round_score {
            self.finish_round(number, score, &mut outcome)?;
        }
        Ok(outcome)
    }

    fn finish_round(
        &mut self,
        number: u32,
        score: RoundScore,
        outcome: &mut GameOutcome,
    ) -> Result<(), GameError> {
        self.scores[0] += score.totals[0] as u32;
        self.scores[1] += score.totals[1] as u32;
        self.history.push(score.clone());
        self.round = None;

        info!(
            game_id = %self.id,
            round = number,
            totals = ?self.scores,
            fell = score.calling_team_fell,
            "round completed"
        );
        outcome.deltas.push(GameDelta::RoundCompleted {
            round: number,
            score: score.clone(),
            totals: self.scores,
        });
        outcome.events.push((
            Topic::Game(self.id),
            ServerEvent::RoundCompleted {
                game_id: self.id,
                round: number,
                scores: self.scores,
                breakdown: score.clone(),
            },
        ));

        match game_winner(self.scores, self.options.points_to_win, score.calling_team) {
            Some(winner) => {
                self.status = GameStatus::Completed;
                self.winner = Some(winner);
                self.end_reason = Some(EndReason::Completed);
                info!(game_id = %self.id, winner = ?winner, scores = ?self.scores, "game completed");
                outcome.deltas.push(GameDelta::Completed {
                    winner,
                    final_scores: self.scores,
                    end_reason: EndReason::Completed,
                });
                outcome.events.push((
                    Topic::Game(self.id),
                    ServerEvent::GameCompleted {
                        game_id: self.id,
                        winner,
                        final_scores: self.scores,
                        end_reason: EndReason::Completed,
                    },
                ));
            }
            None => {
                self.dealer = next_seat(self.dealer);
                self.round = Some(Round::deal(number + 1, self.dealer, self.seed));
                self.emit_round_started(outcome);
            }
        }
        Ok(())
    }

    fn on_player_left(
        &mut self,
        seat: Seat,
        reason: LeaveReason,
    ) -> Result<GameOutcome, GameError> {
        if self.status != GameStatus::InProgress {
            return Err(GameError::wrong_phase(format!("game is {:?}", self.status)));
        }
        match reason {
            LeaveReason::Disconnected => {
                self.active[seat as usize] = false;
                info!(game_id = %self.id, seat, "player disconnected, game paused for their turns");
                Ok(GameOutcome {
                    deltas: vec![GameDelta::PlayerActive {
                        seat,
                        active: false,
                    }],
                    events: vec![(
                        Topic::Game(self.id),
                        ServerEvent::PlayerStatus {
                            game_id: self.id,
                            seat,
                            active: false,
                        },
                    )],
                })
            }
            LeaveReason::Voluntary | LeaveReason::TimedOut => {
                let winner = Team::of_seat(seat).other();
                info!(game_id = %self.id, seat, winner = ?winner, "player left, game forfeited");
                self.forfeit_to(winner, EndReason::PlayerLeft)
            }
        }
    }

    fn forfeit_to(&mut self, winner: Team, end_reason: EndReason) -> Result<GameOutcome, GameError> {
        self.status = GameStatus::Completed;
        self.winner = Some(winner);
        self.end_reason = Some(end_reason);
        self.round = None;
        Ok(GameOutcome {
            deltas: vec![GameDelta::Completed {
                winner,
                final_scores: self.scores,
                end_reason,
            }],
            events: vec![(
                Topic::Game(self.id),
                ServerEvent::GameCompleted {
                    game_id: self.id,
                    winner,
                    final_scores: self.scores,
                    end_reason,
                },
            )],
        })
    }

    fn emit_round_started(&self, outcome: &mut GameOutcome) {
        let Some(round) = &self.round else {
            return;
        };
        outcome.deltas.push(GameDelta::RoundStarted {
            round: round.number,
            dealer: round.dealer,
            initial_hands: round.initial_hands.clone(),
        });
        outcome.events.push((
            Topic::Game(self.id),
            ServerEvent::RoundStarted {
                game_id: self.id,
                round: round.number,
                dealer: round.dealer,
                first_bidder: round.first_to_act(),
            },
        ));
        for (seat, hand) in round.hands.iter().enumerate() {
            outcome.events.push((
                Topic::User(self.seats[seat]),
                ServerEvent::HandDealt {
                    game_id: self.id,
                    round: round.number,
                    cards: hand.clone(),
                },
            ));
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            id: self.id,
            status: self.status,
            seats: self.seats,
            active: self.active,
            dealer: self.dealer,
            scores: self.scores,
            points_to_win: self.options.points_to_win,
            round: self.round.as_ref().map(|round| {
                let mut taken = [0u8; 2];
                for trick in &round.completed_tricks {
                    taken[Team::of_seat(trick.winner).index()] += 1;
                }
                RoundPublic {
                    number: round.number,
                    dealer: round.dealer,
                    phase: round.phase,
                    turn: round.turn,
                    trump: round.trump,
                    caller: round.caller,
                    current_trick: round.current_trick.clone(),
                    tricks_taken: taken,
                }
            }),
            winner: self.winner,
        }
    }

    /// Cards tracked across hands and tricks; 32 whenever a round is live.
    pub fn cards_tracked(&self) -> Option<usize> {
        self.round.as_ref().map(|r| r.cards_tracked())
    }
}
