//! The pre-game lobby aggregate: membership, readiness, chat, invitations,
//! and the hand-off into a live game.
//!
//! Rooms follow Open -> Full -> Starting -> Closed. The manager mediates
//! the Starting -> Closed transition once the game actor exists.

use std::collections::VecDeque;
use std::time::Duration;

use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::broadcast::Topic;
use crate::config::{GameOptions, ServerConfig};
use crate::errors::GameError;
use crate::protocol::state::{
    ChatEntry, InvitationStatus, InvitationView, Membership, RoomSnapshot, RoomStatus, Visibility,
};
use crate::protocol::{Command, GameId, InvitationId, RoomId, ServerEvent, UserId};
use crate::store::RoomDelta;

pub const ROOM_CAPACITY: usize = 4;

/// Index updates and cross-entity requests the manager applies after a room
/// event is persisted.
#[derive(Debug, Default)]
pub struct RoomReply {
    pub joined: Vec<UserId>,
    pub left: Vec<UserId>,
    pub closed: bool,
    pub start: Option<StartRequest>,
}

/// A validated request to turn this room into a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    pub created_by: UserId,
    pub players: Vec<UserId>,
    pub options: GameOptions,
}

#[derive(Debug, Default)]
pub struct RoomOutcome {
    pub deltas: Vec<RoomDelta>,
    pub events: Vec<(Topic, ServerEvent)>,
    pub reply: RoomReply,
}

#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub code: String,
    pub created_by: UserId,
    pub owner: UserId,
    pub visibility: Visibility,
    pub options: GameOptions,
    pub status: RoomStatus,
    /// Join order is preserved; the earliest member inherits ownership.
    pub members: Vec<Membership>,
    pub chat: VecDeque<ChatEntry>,
    pub invitations: Vec<InvitationView>,
    pub game_id: Option<GameId>,
    pub last_activity: OffsetDateTime,
    max_chat: usize,
    invitation_ttl: Duration,
}

impl Room {
    /// Create a room with its creator as the first member.
    pub fn create(
        id: RoomId,
        code: String,
        created_by: UserId,
        options: GameOptions,
        config: &ServerConfig,
        now: OffsetDateTime,
    ) -> Result<(Self, RoomOutcome), GameError> {
        options.validate()?;
        let visibility = if options.private {
            Visibility::Private
        } else {
            Visibility::Public
        };
        let mut room = Self {
            id,
            code: code.clone(),
            created_by,
            owner: created_by,
            visibility,
            options: options.clone(),
            status: RoomStatus::Open,
            members: Vec::new(),
            chat: VecDeque::new(),
            invitations: Vec::new(),
            game_id: None,
            last_activity: now,
            max_chat: config.max_chat_retained,
            invitation_ttl: config.invitation_ttl,
        };

        let mut outcome = RoomOutcome::default();
        outcome.deltas.push(RoomDelta::Created {
            code,
            created_by,
            options,
        });
        room.admit(created_by, now, &mut outcome);
        outcome.events.push((
            Topic::User(created_by),
            ServerEvent::RoomState {
                room: room.snapshot(),
            },
        ));
        room.push_room_state(&mut outcome);

        info!(room_id = %id, code = %room.code, "room created");
        Ok((room, outcome))
    }

    /// Handle one client event addressed to this room.
    pub fn handle(
        &mut self,
        actor: UserId,
        command: &Command,
        now: OffsetDateTime,
    ) -> Result<RoomOutcome, GameError> {
        let outcome = match command {
            Command::JoinRoom { .. } => self.join(actor, now),
            Command::LeaveRoom => self.leave(actor, now),
            Command::ToggleReady => self.toggle_ready(actor, now),
            Command::StartGame => self.start_game(actor),
            Command::SendMessage { body } => self.send_message(actor, body, now),
            Command::SendInvitation { to } => self.send_invitation(actor, *to, now),
            Command::RespondToInvitation { invitation, accept } => {
                self.respond_to_invitation(actor, *invitation, *accept, now)
            }
            _ => Err(GameError::wrong_phase("game commands cannot target a room")),
        }?;
        self.last_activity = now;
        Ok(outcome)
    }

    /// Confirmation from the manager that the game actor exists; the room
    /// closes and points at it.
    pub fn game_created(&mut self, game_id: GameId) -> RoomOutcome {
        self.game_id = Some(game_id);
        self.status = RoomStatus::Closed;
        let mut outcome = RoomOutcome::default();
        outcome.deltas.push(RoomDelta::GameStarted { game_id });
        outcome.deltas.push(RoomDelta::StatusChanged {
            status: RoomStatus::Closed,
        });
        outcome.reply.closed = true;
        // Closing drops the memberships; the manager deindexes them.
        outcome.reply.left = self.members.iter().map(|m| m.user).collect();
        self.push_room_state(&mut outcome);
        info!(room_id = %self.id, game_id = %game_id, "room closed into game");
        outcome
    }

    /// Flip expired pending invitations; driven by the manager's sweeper.
    pub fn expire_invitations(&mut self, now: OffsetDateTime) -> RoomOutcome {
        let mut outcome = RoomOutcome::default();
        for index in 0..self.invitations.len() {
            if self.invitations[index].status == InvitationStatus::Pending
                && self.invitation_expired(&self.invitations[index], now)
            {
                self.resolve_invitation(index, InvitationStatus::Expired, &mut outcome);
            }
        }
        outcome
    }

    /// Whether the sweeper should dispose this room.
    pub fn is_idle(&self, now: OffsetDateTime, timeout: Duration) -> bool {
        self.status != RoomStatus::Closed
            && (now - self.last_activity).whole_seconds() >= timeout.as_secs() as i64
    }

    /// Close an abandoned room.
    pub fn dispose(&mut self) -> RoomOutcome {
        self.status = RoomStatus::Closed;
        let mut outcome = RoomOutcome::default();
        outcome.deltas.push(RoomDelta::StatusChanged {
            status: RoomStatus::Closed,
        });
        outcome.reply.closed = true;
        outcome.reply.left = self.members.iter().map(|m| m.user).collect();
        self.members.clear();
        self.push_room_state(&mut outcome);
        info!(room_id = %self.id, "idle room disposed");
        outcome
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.id,
            code: self.code.clone(),
            status: self.status,
            visibility: self.visibility,
            owner: self.owner,
            points_to_win: self.options.points_to_win,
            members: self.members.clone(),
            game_id: self.game_id,
        }
    }

    fn require_open(&self) -> Result<(), GameError> {
        match self.status {
            RoomStatus::Open | RoomStatus::Full => Ok(()),
            RoomStatus::Starting | RoomStatus::Closed => {
                Err(GameError::wrong_phase(format!("room is {:?}", self.status)))
            }
        }
    }

    fn member_index(&self, user: UserId) -> Option<usize> {
        self.members.iter().position(|m| m.user == user)
    }

    fn join(&mut self, actor: UserId, now: OffsetDateTime) -> Result<RoomOutcome, GameError> {
        self.require_open()?;
        if self.member_index(actor).is_some() {
            return Err(GameError::duplicate("already a member of this room"));
        }
        if self.members.len() >= ROOM_CAPACITY {
            return Err(GameError::capacity("room is full"));
        }

        let mut outcome = RoomOutcome::default();
        if self.visibility == Visibility::Private {
            let index = self
                .invitations
                .iter()
                .position(|i| {
                    i.to == actor
                        && i.status == InvitationStatus::Pending
                        && !self.invitation_expired(i, now)
                })
                .ok_or_else(|| GameError::forbidden("private room requires an invitation"))?;
            self.resolve_invitation(index, InvitationStatus::Accepted, &mut outcome);
        }

        self.admit(actor, now, &mut outcome);
        self.push_room_state(&mut outcome);
        Ok(outcome)
    }

    /// Add a member, flip to Full at capacity, and log the join.
    fn admit(&mut self, user: UserId, now: OffsetDateTime, outcome: &mut RoomOutcome) {
        self.members.push(Membership {
            user,
            joined_at: now,
            ready: false,
        });
        outcome.deltas.push(RoomDelta::MemberJoined { user });
        outcome.reply.joined.push(user);
        if self.members.len() == ROOM_CAPACITY {
            self.status = RoomStatus::Full;
            outcome.deltas.push(RoomDelta::StatusChanged {
                status: RoomStatus::Full,
            });
        }
        self.system_message(format!("{user} joined the room"), now, outcome);
        debug!(room_id = %self.id, user = %user, members = self.members.len(), "member joined");
    }

    fn leave(&mut self, actor: UserId, now: OffsetDateTime) -> Result<RoomOutcome, GameError> {
        if self.status == RoomStatus::Closed {
            return Err(GameError::wrong_phase("room is closed"));
        }
        let index = self
            .member_index(actor)
            .ok_or_else(|| GameError::not_member("not a member of this room"))?;

        let mut outcome = RoomOutcome::default();
        self.members.remove(index);
        outcome.deltas.push(RoomDelta::MemberLeft { user: actor });
        outcome.reply.left.push(actor);

        if self.members.is_empty() {
            self.status = RoomStatus::Closed;
            outcome.deltas.push(RoomDelta::StatusChanged {
                status: RoomStatus::Closed,
            });
            outcome.reply.closed = true;
            info!(room_id = %self.id, "last member left, room disposed");
            self.push_room_state(&mut outcome);
            return Ok(outcome);
        }

        self.system_message(format!("{actor} left the room"), now, &mut outcome);
        if self.owner == actor {
            // Ownership passes to the earliest-joined remaining member.
            self.owner = self.members[0].user;
            outcome.deltas.push(RoomDelta::OwnerChanged { user: self.owner });
            self.system_message(
                format!("{} now owns the room", self.owner),
                now,
                &mut outcome,
            );
            info!(room_id = %self.id, owner = %self.owner, "ownership transferred");
        }
        if self.status == RoomStatus::Full {
            self.status = RoomStatus::Open;
            outcome.deltas.push(RoomDelta::StatusChanged {
                status: RoomStatus::Open,
            });
        }
        self.push_room_state(&mut outcome);
        Ok(outcome)
    }

    fn toggle_ready(&mut self, actor: UserId, now: OffsetDateTime) -> Result<RoomOutcome, GameError> {
        self.require_open()?;
        let index = self
            .member_index(actor)
            .ok_or_else(|| GameError::not_member("not a member of this room"))?;

        let mut outcome = RoomOutcome::default();
        self.members[index].ready = !self.members[index].ready;
        let ready = self.members[index].ready;
        outcome.deltas.push(RoomDelta::ReadyChanged {
            user: actor,
            ready,
        });
        debug!(room_id = %self.id, user = %actor, ready, at = %now, "ready toggled");
        self.push_room_state(&mut outcome);
        Ok(outcome)
    }

    fn start_game(&mut self, actor: UserId) -> Result<RoomOutcome, GameError> {
        self.require_open()?;
        if self.member_index(actor).is_none() {
            return Err(GameError::not_member("not a member of this room"));
        }
        if actor != self.owner {
            return Err(GameError::forbidden("only the owner can start the game"));
        }
        if self.members.len() != ROOM_CAPACITY {
            return Err(GameError::capacity(format!(
                "a game needs {ROOM_CAPACITY} players, room has {}",
                self.members.len()
            )));
        }
        if !self.members.iter().all(|m| m.ready) {
            return Err(GameError::conflict("all players must be ready"));
        }

        self.status = RoomStatus::Starting;
        let mut outcome = RoomOutcome::default();
        outcome.deltas.push(RoomDelta::StatusChanged {
            status: RoomStatus::Starting,
        });
        outcome.reply.start = Some(StartRequest {
            created_by: self.owner,
            players: self.members.iter().map(|m| m.user).collect(),
            options: self.options.clone(),
        });
        self.push_room_state(&mut outcome);
        info!(room_id = %self.id, "room starting a game");
        Ok(outcome)
    }

    fn send_message(
        &mut self,
        actor: UserId,
        body: &str,
        now: OffsetDateTime,
    ) -> Result<RoomOutcome, GameError> {
        if self.status == RoomStatus::Closed {
            return Err(GameError::wrong_phase("room is closed"));
        }
        if self.member_index(actor).is_none() {
            return Err(GameError::not_member("not a member of this room"));
        }
        let body = body.trim();
        if body.is_empty() {
            return Err(GameError::illegal_move("empty chat message"));
        }

        let mut outcome = RoomOutcome::default();
        self.append_chat(
            ChatEntry {
                sender: Some(actor),
                body: body.to_string(),
                sent_at: now,
            },
            &mut outcome,
        );
        Ok(outcome)
    }

    fn send_invitation(
        &mut self,
        actor: UserId,
        to: UserId,
        now: OffsetDateTime,
    ) -> Result<RoomOutcome, GameError> {
        self.require_open()?;
        if self.member_index(actor).is_none() {
            return Err(GameError::not_member("not a member of this room"));
        }
        if self.member_index(to).is_some() {
            return Err(GameError::conflict("recipient is already a member"));
        }
        if self.invitations.iter().any(|i| {
            i.to == to && i.status == InvitationStatus::Pending && !self.invitation_expired(i, now)
        }) {
            return Err(GameError::duplicate("recipient already has a pending invitation"));
        }

        let invitation = InvitationView {
            id: Uuid::new_v4(),
            room_id: self.id,
            from: actor,
            to,
            status: InvitationStatus::Pending,
            created_at: now,
        };
        self.invitations.push(invitation.clone());

        let mut outcome = RoomOutcome::default();
        outcome.deltas.push(RoomDelta::InvitationSent {
            invitation: invitation.clone(),
        });
        outcome.events.push((
            Topic::User(to),
            ServerEvent::InvitationReceived { invitation },
        ));
        info!(room_id = %self.id, from = %actor, to = %to, "invitation sent");
        Ok(outcome)
    }

    fn respond_to_invitation(
        &mut self,
        actor: UserId,
        invitation_id: InvitationId,
        accept: bool,
        now: OffsetDateTime,
    ) -> Result<RoomOutcome, GameError> {
        let index = self
            .invitations
            .iter()
            .position(|i| i.id == invitation_id)
            .ok_or_else(|| GameError::not_found("unknown invitation"))?;
        if self.invitations[index].to != actor {
            return Err(GameError::forbidden("invitation addressed to someone else"));
        }
        if self.invitations[index].status != InvitationStatus::Pending {
            return Err(GameError::conflict("invitation already resolved"));
        }

        // A late response resolves the invitation as expired; this is an
        // accepted event, not a rejection.
        if self.invitation_expired(&self.invitations[index], now) {
            let mut outcome = RoomOutcome::default();
            self.resolve_invitation(index, InvitationStatus::Expired, &mut outcome);
            return Ok(outcome);
        }

        if !accept {
            let mut outcome = RoomOutcome::default();
            self.resolve_invitation(index, InvitationStatus::Declined, &mut outcome);
            return Ok(outcome);
        }

        // Accepting joins the room, subject to the usual capacity rules.
        self.require_open()?;
        if self.members.len() >= ROOM_CAPACITY {
            return Err(GameError::capacity("room is full"));
        }
        if self.member_index(actor).is_some() {
            return Err(GameError::duplicate("already a member of this room"));
        }

        let mut outcome = RoomOutcome::default();
        self.resolve_invitation(index, InvitationStatus::Accepted, &mut outcome);
        self.admit(actor, now, &mut outcome);
        self.push_room_state(&mut outcome);
        Ok(outcome)
    }

    fn resolve_invitation(
        &mut self,
        index: usize,
        status: InvitationStatus,
        outcome: &mut RoomOutcome,
    ) {
        self.invitations[index].status = status;
        let invitation = self.invitations[index].clone();
        outcome.deltas.push(RoomDelta::InvitationResolved {
            invitation: invitation.clone(),
        });
        outcome.events.push((
            Topic::User(invitation.from),
            ServerEvent::InvitationResult {
                invitation: invitation.clone(),
            },
        ));
        outcome.events.push((
            Topic::User(invitation.to),
            ServerEvent::InvitationResult { invitation },
        ));
    }

    fn invitation_expired(&self, invitation: &InvitationView, now: OffsetDateTime) -> bool {
        (now - invitation.created_at).whole_seconds() >= self.invitation_ttl.as_secs() as i64
    }

    fn system_message(&mut self, body: String, now: OffsetDateTime, outcome: &mut RoomOutcome) {
        self.append_chat(
            ChatEntry {
                sender: None,
                body,
                sent_at: now,
            },
            outcome,
        );
    }

    /// Append to the bounded chat log, persist, and broadcast.
    fn append_chat(&mut self, entry: ChatEntry, outcome: &mut RoomOutcome) {
        self.chat.push_back(entry.clone());
        while self.chat.len() > self.max_chat {
            self.chat.pop_front();
        }
        outcome.deltas.push(RoomDelta::MessageSent {
            message: entry.clone(),
        });
        outcome.events.push((
            Topic::Room(self.id),
            ServerEvent::ChatMessage {
                room_id: self.id,
                message: entry,
            },
        ));
    }

    fn push_room_state(&self, outcome: &mut RoomOutcome) {
        outcome.events.push((
            Topic::Room(self.id),
            ServerEvent::RoomState {
                room: self.snapshot(),
            },
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn now() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    fn make_room(private: bool) -> (Room, UserId) {
        let creator = Uuid::new_v4();
        let options = GameOptions {
            private,
            ..Default::default()
        };
        let (room, _) = Room::create(
            Uuid::new_v4(),
            "AB12CD".into(),
            creator,
            options,
            &ServerConfig::default(),
            now(),
        )
        .unwrap();
        (room, creator)
    }

    fn fill_room(room: &mut Room) -> Vec<UserId> {
        let mut users = vec![room.created_by];
        while room.members.len() < ROOM_CAPACITY {
            let user = Uuid::new_v4();
            room.handle(user, &Command::JoinRoom { code: None }, now())
                .unwrap();
            users.push(user);
        }
        users
    }

    fn ready_all(room: &mut Room) {
        let users: Vec<UserId> = room.members.iter().map(|m| m.user).collect();
        for user in users {
            room.handle(user, &Command::ToggleReady, now()).unwrap();
        }
    }

    #[test]
    fn create_seats_the_creator() {
        let (room, creator) = make_room(false);
        assert_eq!(room.status, RoomStatus::Open);
        assert_eq!(room.owner, creator);
        assert_eq!(room.members.len(), 1);
    }

    #[test]
    fn room_fills_to_capacity_then_rejects() {
        let (mut room, _) = make_room(false);
        fill_room(&mut room);
        assert_eq!(room.status, RoomStatus::Full);

        let err = room
            .handle(Uuid::new_v4(), &Command::JoinRoom { code: None }, now())
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Capacity);
    }

    #[test]
    fn double_join_is_a_duplicate() {
        let (mut room, creator) = make_room(false);
        let err = room
            .handle(creator, &Command::JoinRoom { code: None }, now())
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Duplicate);
    }

    #[test]
    fn leave_empties_and_disposes() {
        let (mut room, creator) = make_room(false);
        let outcome = room.handle(creator, &Command::LeaveRoom, now()).unwrap();
        assert_eq!(room.status, RoomStatus::Closed);
        assert!(outcome.reply.closed);
    }

    #[test]
    fn ownership_transfers_to_earliest_joined() {
        let (mut room, creator) = make_room(false);
        let users = fill_room(&mut room);
        room.handle(creator, &Command::LeaveRoom, now()).unwrap();
        assert_eq!(room.owner, users[1]);
        assert_eq!(room.status, RoomStatus::Open);
        assert_eq!(room.members.len(), 3);
    }

    #[test]
    fn start_requires_owner_four_players_and_readiness() {
        let (mut room, creator) = make_room(false);
        let err = room.handle(creator, &Command::StartGame, now()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Capacity);

        let users = fill_room(&mut room);
        let err = room.handle(creator, &Command::StartGame, now()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Conflict);

        ready_all(&mut room);
        let err = room.handle(users[2], &Command::StartGame, now()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);

        let outcome = room.handle(creator, &Command::StartGame, now()).unwrap();
        assert_eq!(room.status, RoomStatus::Starting);
        let start = outcome.reply.start.unwrap();
        assert_eq!(start.players, users);

        // A second start is out of phase, exactly once semantics.
        let err = room.handle(creator, &Command::StartGame, now()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::WrongPhase);
    }

    #[test]
    fn game_created_closes_the_room() {
        let (mut room, creator) = make_room(false);
        fill_room(&mut room);
        ready_all(&mut room);
        room.handle(creator, &Command::StartGame, now()).unwrap();
        let game_id = Uuid::new_v4();
        let outcome = room.game_created(game_id);
        assert_eq!(room.status, RoomStatus::Closed);
        assert_eq!(room.game_id, Some(game_id));
        assert!(outcome.reply.closed);
    }

    #[test]
    fn private_room_requires_invitation() {
        let (mut room, creator) = make_room(true);
        let guest = Uuid::new_v4();
        let err = room
            .handle(guest, &Command::JoinRoom { code: None }, now())
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);

        room.handle(creator, &Command::SendInvitation { to: guest }, now())
            .unwrap();
        room.handle(guest, &Command::JoinRoom { code: None }, now())
            .unwrap();
        assert_eq!(room.members.len(), 2);
        assert_eq!(room.invitations[0].status, InvitationStatus::Accepted);
    }

    #[test]
    fn invitation_accept_joins_and_decline_leaves_room_unchanged() {
        let (mut room, creator) = make_room(true);
        let guest = Uuid::new_v4();
        let outcome = room
            .handle(creator, &Command::SendInvitation { to: guest }, now())
            .unwrap();
        assert!(outcome
            .events
            .iter()
            .any(|(topic, e)| matches!(e, ServerEvent::InvitationReceived { .. })
                && *topic == Topic::User(guest)));
        let invitation = room.invitations[0].id;

        // Only the recipient may respond.
        let err = room
            .handle(
                creator,
                &Command::RespondToInvitation {
                    invitation,
                    accept: true,
                },
                now(),
            )
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);

        room.handle(
            guest,
            &Command::RespondToInvitation {
                invitation,
                accept: false,
            },
            now(),
        )
        .unwrap();
        assert_eq!(room.invitations[0].status, InvitationStatus::Declined);
        assert_eq!(room.members.len(), 1);

        // A declined invitation cannot be re-used.
        let err = room
            .handle(
                guest,
                &Command::RespondToInvitation {
                    invitation,
                    accept: true,
                },
                now(),
            )
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[test]
    fn invitations_expire_after_ttl() {
        let (mut room, creator) = make_room(true);
        let guest = Uuid::new_v4();
        room.handle(creator, &Command::SendInvitation { to: guest }, now())
            .unwrap();

        let later = now() + time::Duration::seconds(86_401);
        let outcome = room.expire_invitations(later);
        assert_eq!(room.invitations[0].status, InvitationStatus::Expired);
        assert!(!outcome.deltas.is_empty());

        let err = room
            .handle(guest, &Command::JoinRoom { code: None }, later)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[test]
    fn chat_log_is_bounded() {
        let (mut room, creator) = make_room(false);
        for i in 0..250 {
            room.handle(
                creator,
                &Command::SendMessage {
                    body: format!("message {i}"),
                },
                now(),
            )
            .unwrap();
        }
        assert_eq!(room.chat.len(), 200);
        assert_eq!(room.chat.back().unwrap().body, "message 249");
    }

    #[test]
    fn chat_rejects_outsiders_and_empty_bodies() {
        let (mut room, creator) = make_room(false);
        let err = room
            .handle(
                Uuid::new_v4(),
                &Command::SendMessage { body: "hi".into() },
                now(),
            )
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotMember);

        let err = room
            .handle(
                creator,
                &Command::SendMessage { body: "   ".into() },
                now(),
            )
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::IllegalMove);
    }

    #[test]
    fn idle_rooms_are_detected_and_disposed() {
        let (mut room, _) = make_room(false);
        let timeout = Duration::from_secs(3600);
        assert!(!room.is_idle(now(), timeout));
        let later = now() + time::Duration::seconds(3601);
        assert!(room.is_idle(later, timeout));

        let outcome = room.dispose();
        assert_eq!(room.status, RoomStatus::Closed);
        assert!(outcome.reply.closed);
        assert!(room.members.is_empty());
    }
}
