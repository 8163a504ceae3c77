//! Saving and loading: two manual slots and the failure checkpoint
//!
//! Everything goes through one versioned snapshot type; the `kind` field
//! says whether a payload is a manual save or the checkpoint a failure
//! leaves behind. Unreadable payloads are treated as absent, never as
//! errors the player has to see, and the checkpoint only comes off the
//! store once.

use crate::game::Game;
use crate::{GameError, Result};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Format version written into every snapshot.
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Key the failure funnel writes its checkpoint under.
pub const CHECKPOINT_KEY: &str = "hospital_mystery_save";

/// Minimal key-value backend the save layer runs on
pub trait StateStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// One JSON file per key under a directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading save file {}", path.display()))?;
        Ok(Some(raw))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating save directory {}", self.dir.display()))?;
        let path = self.path_for(key);
        fs::write(&path, value)
            .with_context(|| format!("writing save file {}", path.display()))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("removing save file {}", path.display()))?;
        }
        Ok(())
    }
}

/// In-memory backend, for running the engine without a filesystem
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// The two manual save slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveSlot {
    One,
    Two,
}

impl SaveSlot {
    pub const ALL: [SaveSlot; 2] = [SaveSlot::One, SaveSlot::Two];

    pub fn key(&self) -> &'static str {
        match self {
            SaveSlot::One => "hospital_mystery_save_slot_1",
            SaveSlot::Two => "hospital_mystery_save_slot_2",
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            SaveSlot::One => 1,
            SaveSlot::Two => 2,
        }
    }
}

/// What a stored payload is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotKind {
    Manual { slot: SaveSlot },
    FailureCheckpoint,
}

/// The one shape every stored game takes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: String,
    pub kind: SnapshotKind,
    pub saved_at: DateTime<Utc>,
    pub game: Game,
}

/// Summary of a slot for the load screen
#[derive(Debug, Clone)]
pub struct SlotInfo {
    pub saved_at: DateTime<Utc>,
    pub scene: String,
    pub solved: usize,
    pub risk: u8,
}

fn encode(kind: SnapshotKind, game: &Game) -> Result<String> {
    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION.to_string(),
        kind,
        saved_at: Utc::now(),
        game: game.clone(),
    };
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

fn decode(raw: &str) -> std::result::Result<Snapshot, GameError> {
    let snapshot: Snapshot =
        serde_json::from_str(raw).map_err(|err| GameError::CorruptedSave(err.to_string()))?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(GameError::CorruptedSave(format!(
            "unsupported snapshot version {}",
            snapshot.version
        )));
    }
    Ok(snapshot)
}

fn read_key(store: &dyn StateStore, key: &str) -> Option<Snapshot> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!(key, %err, "save key unreadable");
            return None;
        }
    };
    match decode(&raw) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            tracing::warn!(key, %err, "stored payload does not decode; treating as empty");
            None
        }
    }
}

/// Write the running game into a manual slot.
pub fn save_slot(game: &Game, store: &mut dyn StateStore, slot: SaveSlot) -> Result<()> {
    let payload = encode(SnapshotKind::Manual { slot }, game)?;
    store.set(slot.key(), &payload)?;
    tracing::info!(slot = slot.number(), "game saved");
    Ok(())
}

/// Load a manual slot. Anything unreadable, or the wrong kind of payload
/// under the key, reads as an empty slot.
pub fn load_slot(store: &dyn StateStore, slot: SaveSlot) -> Option<Game> {
    let snapshot = read_key(store, slot.key())?;
    match snapshot.kind {
        SnapshotKind::Manual { .. } => {
            let mut game = snapshot.game;
            game.repair_after_load();
            tracing::info!(slot = slot.number(), "game loaded");
            Some(game)
        }
        SnapshotKind::FailureCheckpoint => {
            tracing::warn!(slot = slot.number(), "slot held a checkpoint; ignoring it");
            None
        }
    }
}

/// Peek at a slot for the load screen without deserializing into play.
pub fn slot_info(store: &dyn StateStore, slot: SaveSlot) -> Option<SlotInfo> {
    let snapshot = read_key(store, slot.key())?;
    match snapshot.kind {
        SnapshotKind::Manual { .. } => Some(SlotInfo {
            saved_at: snapshot.saved_at,
            scene: snapshot.game.current_scene.name().to_string(),
            solved: snapshot.game.counted_solved(),
            risk: snapshot.game.detection_risk,
        }),
        SnapshotKind::FailureCheckpoint => None,
    }
}

pub fn delete_slot(store: &mut dyn StateStore, slot: SaveSlot) -> Result<()> {
    store.remove(slot.key())
}

/// Write the failure checkpoint. Called by the failure funnel while the
/// game still reads as in progress.
pub fn write_checkpoint(game: &Game, store: &mut dyn StateStore) -> Result<()> {
    let payload = encode(SnapshotKind::FailureCheckpoint, game)?;
    store.set(CHECKPOINT_KEY, &payload)?;
    tracing::info!("failure checkpoint written");
    Ok(())
}

/// Whether a resumable checkpoint is waiting.
pub fn has_checkpoint(store: &dyn StateStore) -> bool {
    matches!(
        read_key(store, CHECKPOINT_KEY),
        Some(Snapshot {
            kind: SnapshotKind::FailureCheckpoint,
            ..
        })
    )
}

/// Consume the checkpoint. It comes off the store whether or not it
/// decodes; a checkpoint is only ever good for one resume.
pub fn take_checkpoint(store: &mut dyn StateStore) -> Option<Game> {
    let raw = match store.get(CHECKPOINT_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!(%err, "failure checkpoint unreadable");
            return None;
        }
    };
    if let Err(err) = store.remove(CHECKPOINT_KEY) {
        tracing::warn!(%err, "failure checkpoint could not be removed");
    }
    let snapshot = match decode(&raw) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            tracing::warn!(%err, "failure checkpoint does not decode; discarded");
            return None;
        }
    };
    if !matches!(snapshot.kind, SnapshotKind::FailureCheckpoint) {
        tracing::warn!("checkpoint key held a manual save; discarded");
        return None;
    }
    let mut game = snapshot.game;
    game.repair_after_load();
    tracing::info!("failure checkpoint consumed");
    Some(game)
}

/// Drop the checkpoint without resuming it.
pub fn clear_checkpoint(store: &mut dyn StateStore) {
    if let Err(err) = store.remove(CHECKPOINT_KEY) {
        tracing::warn!(%err, "failure checkpoint could not be cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{DialogueStage, PuzzleId, SceneId, SequenceId, SequencePhase};

    fn rich_game() -> Game {
        let mut game = Game::new();
        game.solve_puzzle(PuzzleId::FloorSelection);
        game.solve_puzzle(PuzzleId::NurseCipher);
        game.detection_risk = 42;
        game.unlock_scene(SceneId::OperatingRoom);
        game.sequences
            .insert(SequenceId::NurseDeparture, SequencePhase::Completed);
        game.dialogue = DialogueStage::ToldOfProject;
        game.key_203_obtained = true;
        game.window_checked = true;
        game.fire_exit_used = true;
        game.journal.record(
            crate::data::ClueKind::NurseCipherNote,
            SceneId::Ward717.name(),
        );
        game
    }

    #[test]
    fn manual_slot_round_trips_every_field() {
        let mut store = MemoryStore::new();
        let game = rich_game();
        save_slot(&game, &mut store, SaveSlot::One).expect("save succeeds");

        let loaded = load_slot(&store, SaveSlot::One).expect("slot loads");
        let original = serde_json::to_value(&game).expect("serializable");
        let resumed = serde_json::to_value(&loaded).expect("serializable");
        assert_eq!(original, resumed);
    }

    #[test]
    fn the_two_slots_are_independent() {
        let mut store = MemoryStore::new();
        let mut first = rich_game();
        first.detection_risk = 10;
        let mut second = rich_game();
        second.detection_risk = 90;

        save_slot(&first, &mut store, SaveSlot::One).expect("save one");
        save_slot(&second, &mut store, SaveSlot::Two).expect("save two");

        assert_eq!(
            load_slot(&store, SaveSlot::One).expect("one loads").detection_risk,
            10
        );
        assert_eq!(
            load_slot(&store, SaveSlot::Two).expect("two loads").detection_risk,
            90
        );

        delete_slot(&mut store, SaveSlot::One).expect("delete");
        assert!(load_slot(&store, SaveSlot::One).is_none());
        assert!(load_slot(&store, SaveSlot::Two).is_some());
    }

    #[test]
    fn malformed_payloads_read_as_empty_slots() {
        let mut store = MemoryStore::new();
        store
            .set(SaveSlot::One.key(), "{ this is not json")
            .expect("set");
        assert!(load_slot(&store, SaveSlot::One).is_none());
        assert!(slot_info(&store, SaveSlot::One).is_none());
    }

    #[test]
    fn unknown_versions_read_as_empty_slots() {
        let mut store = MemoryStore::new();
        save_slot(&rich_game(), &mut store, SaveSlot::One).expect("save");

        let raw = store
            .get(SaveSlot::One.key())
            .expect("get")
            .expect("present");
        let mut value: serde_json::Value = serde_json::from_str(&raw).expect("parses");
        value["version"] = serde_json::Value::String("0.9".into());
        store
            .set(SaveSlot::One.key(), &value.to_string())
            .expect("set");

        assert!(load_slot(&store, SaveSlot::One).is_none());
    }

    #[test]
    fn missing_snapshot_fields_fall_back_to_defaults() {
        let mut store = MemoryStore::new();
        save_slot(&rich_game(), &mut store, SaveSlot::One).expect("save");

        let raw = store
            .get(SaveSlot::One.key())
            .expect("get")
            .expect("present");
        let mut value: serde_json::Value = serde_json::from_str(&raw).expect("parses");
        let game = value["game"].as_object_mut().expect("game object");
        game.remove("detection_risk");
        game.remove("basement_clues");
        store
            .set(SaveSlot::One.key(), &value.to_string())
            .expect("set");

        let loaded = load_slot(&store, SaveSlot::One).expect("still loads");
        assert_eq!(loaded.detection_risk, 0);
        assert!(loaded.basement_clues.is_empty());
        assert!(loaded.solved.contains(&PuzzleId::NurseCipher));
    }

    #[test]
    fn a_checkpoint_under_a_slot_key_is_ignored() {
        let mut store = MemoryStore::new();
        let payload = encode(SnapshotKind::FailureCheckpoint, &rich_game()).expect("encode");
        store.set(SaveSlot::Two.key(), &payload).expect("set");
        assert!(load_slot(&store, SaveSlot::Two).is_none());
        assert!(slot_info(&store, SaveSlot::Two).is_none());
    }

    #[test]
    fn the_checkpoint_is_good_for_exactly_one_resume() {
        let mut store = MemoryStore::new();
        write_checkpoint(&rich_game(), &mut store).expect("write");
        assert!(has_checkpoint(&store));

        let resumed = take_checkpoint(&mut store).expect("first take resumes");
        assert!(resumed.is_playing());
        assert!(!has_checkpoint(&store));
        assert!(take_checkpoint(&mut store).is_none());
    }

    #[test]
    fn a_malformed_checkpoint_is_still_consumed() {
        let mut store = MemoryStore::new();
        store.set(CHECKPOINT_KEY, "garbage").expect("set");
        assert!(take_checkpoint(&mut store).is_none());
        assert!(store.get(CHECKPOINT_KEY).expect("get").is_none());
    }

    #[test]
    fn active_sequences_replay_from_the_start_after_loading() {
        let mut store = MemoryStore::new();
        let mut game = rich_game();
        game.sequences
            .insert(SequenceId::GuardPatrol, SequencePhase::Active);
        save_slot(&game, &mut store, SaveSlot::One).expect("save");

        let loaded = load_slot(&store, SaveSlot::One).expect("loads");
        assert_eq!(
            loaded.sequence_phase(SequenceId::GuardPatrol),
            SequencePhase::NotStarted
        );
        assert_eq!(
            loaded.sequence_phase(SequenceId::NurseDeparture),
            SequencePhase::Completed
        );
    }

    #[test]
    fn slot_info_summarizes_without_resuming() {
        let mut store = MemoryStore::new();
        assert!(slot_info(&store, SaveSlot::One).is_none());

        save_slot(&rich_game(), &mut store, SaveSlot::One).expect("save");
        let info = slot_info(&store, SaveSlot::One).expect("info");
        assert_eq!(info.scene, SceneId::Lobby.name());
        assert_eq!(info.solved, 2);
        assert_eq!(info.risk, 42);
    }

    #[test]
    fn file_store_round_trips_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = FileStore::new(dir.path());

        let game = rich_game();
        save_slot(&game, &mut store, SaveSlot::One).expect("save");
        assert!(dir
            .path()
            .join(format!("{}.json", SaveSlot::One.key()))
            .exists());

        let loaded = load_slot(&store, SaveSlot::One).expect("loads");
        assert_eq!(loaded.detection_risk, game.detection_risk);

        delete_slot(&mut store, SaveSlot::One).expect("delete");
        assert!(load_slot(&store, SaveSlot::One).is_none());
        // Deleting an empty slot stays quiet.
        delete_slot(&mut store, SaveSlot::One).expect("delete again");
    }

    #[test]
    fn file_store_checkpoint_lifecycle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = FileStore::new(dir.path());
        write_checkpoint(&rich_game(), &mut store).expect("write");
        assert!(has_checkpoint(&store));
        clear_checkpoint(&mut store);
        assert!(!has_checkpoint(&store));
    }
}
