//! In-memory store used by the default runtime and tests.
//!
//! Each save call takes the record's lock for the duration of the mutation,
//! which gives the per-call snapshot isolation the interface requires.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use super::{GameDelta, GameRecord, RoomDelta, RoomRecord, Store, StoreError};
use crate::protocol::{GameId, RoomId};

#[derive(Debug, Default)]
pub struct MemStore {
    games: DashMap<GameId, GameRecord>,
    rooms: DashMap<RoomId, RoomRecord>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn load_game(&self, id: GameId) -> Result<Option<GameRecord>, StoreError> {
        Ok(self.games.get(&id).map(|r| r.clone()))
    }

    async fn save_game_delta(&self, id: GameId, delta: GameDelta) -> Result<(), StoreError> {
        let mut record = self.games.entry(id).or_default();
        if matches!(delta, GameDelta::Created { .. }) && !record.deltas.is_empty() {
            return Err(StoreError::Conflict(format!(
                "game {id} already created"
            )));
        }
        debug!(game_id = %id, delta = ?delta, "game delta persisted");
        record.deltas.push(delta);
        Ok(())
    }

    async fn load_room(&self, id: RoomId) -> Result<Option<RoomRecord>, StoreError> {
        Ok(self.rooms.get(&id).map(|r| r.clone()))
    }

    async fn save_room_delta(&self, id: RoomId, delta: RoomDelta) -> Result<(), StoreError> {
        let mut record = self.rooms.entry(id).or_default();
        match &delta {
            RoomDelta::Created { code, .. } => {
                if !record.deltas.is_empty() {
                    return Err(StoreError::Conflict(format!("room {id} already created")));
                }
                record.code = code.clone();
            }
            RoomDelta::StatusChanged { status } => {
                record.closed = *status == crate::protocol::state::RoomStatus::Closed;
            }
            _ => {}
        }
        debug!(room_id = %id, delta = ?delta, "room delta persisted");
        record.deltas.push(delta);
        Ok(())
    }

    async fn find_room_by_code(&self, code: &str) -> Result<Option<RoomId>, StoreError> {
        Ok(self
            .rooms
            .iter()
            .find(|entry| !entry.closed && entry.code == code)
            .map(|entry| *entry.key()))
    }
}
