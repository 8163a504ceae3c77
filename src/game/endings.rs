//! Endings: the success rule and the single failure funnel
//!
//! Every way to lose goes through `trigger_failure`, which writes the
//! failure checkpoint while the game still reads as in progress, then
//! flips the phase. Rendering only ever sees the ending afterward.

use super::narrative::SequencePhase;
use super::puzzles::TOTAL_PUZZLES;
use super::scenes::SceneId;
use super::{EngineEvent, Game, GamePhase};
use crate::data::ClueKind;
use crate::save::{self, StateStore};
use serde::{Deserialize, Serialize};

/// How a run can end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ending {
    /// The evidence reaches daylight
    TruthRevealed,
    /// Caught by whoever still walks these corridors
    Seized,
    /// Walked into a place there was no walking out of
    WrongTurn,
}

impl Ending {
    pub fn title(&self) -> &'static str {
        match self {
            Ending::TruthRevealed => "THE TRUTH COMES OUT",
            Ending::Seized => "SEIZED IN THE DARK",
            Ending::WrongTurn => "A WRONG TURN",
        }
    }

    pub fn epitaph(&self) -> &'static str {
        match self {
            Ending::TruthRevealed => {
                "Dawn, and sirens in the parking lot at last. Director Chen is walked out past the gurneys while the X-17 files ride behind him in an evidence box. Detective Zhou stands in the rain and, for the first time tonight, breathes."
            }
            Ending::Seized => {
                "Footsteps you never heard coming. A needle's small, precise sting. Detective Zhou stays in the suburban hospital forever."
            }
            Ending::WrongTurn => {
                "The corridor was the wrong one, and the door swings shut on its own. Detective Zhou stays in the suburban hospital forever."
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Ending::TruthRevealed)
    }
}

/// Why a run failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// The detection-risk roll at or above the threshold came up bad
    RiskEscalation,
    WrongFloor(u8),
    Room401Trap,
    Ward203Door,
    ElevatorWithoutCard,
    WrongDosage,
    Miswired,
    WrongBinaryCode,
}

impl FailureReason {
    pub fn ending(&self) -> Ending {
        if self.is_wrong_turn() {
            Ending::WrongTurn
        } else {
            Ending::Seized
        }
    }

    /// Wrong-turn failures resume from the operating room; the rest keep
    /// the scene they happened in.
    pub fn is_wrong_turn(&self) -> bool {
        matches!(
            self,
            FailureReason::WrongFloor(_)
                | FailureReason::Room401Trap
                | FailureReason::Ward203Door
                | FailureReason::Miswired
        )
    }

    pub fn notice(&self) -> &'static str {
        match self {
            FailureReason::RiskEscalation => {
                "Too much noise, too many mistakes. They knew where to look for you."
            }
            FailureReason::WrongFloor(_) => "This floor was never yours to walk.",
            FailureReason::Room401Trap => {
                "Room 401 is not a room. The orderlies inside were waiting."
            }
            FailureReason::Ward203Door => {
                "You reach for the handle of 203 and the footsteps behind you stop pretending."
            }
            FailureReason::ElevatorWithoutCard => {
                "You linger in the elevator hall a moment too long."
            }
            FailureReason::WrongDosage => {
                "The mix was wrong. His screaming brings them at a run."
            }
            FailureReason::Miswired => {
                "Sparks, then darkness, then a door banging open somewhere close."
            }
            FailureReason::WrongBinaryCode => {
                "The panel flashes red twice. The third flash is a floodlight."
            }
        }
    }
}

/// The configured way to win
#[derive(Debug, Clone, Copy)]
pub enum SuccessRule {
    /// Counted puzzles solved reaches the threshold
    SolvedCount(usize),
    /// Weighted journal clues reach the threshold
    EvidenceWeight {
        weights: &'static [(ClueKind, u32)],
        threshold: u32,
    },
}

/// The rule the shipped scenario runs on
pub const ACTIVE_SUCCESS_RULE: SuccessRule = SuccessRule::SolvedCount(TOTAL_PUZZLES);

/// Single deterministic success check
pub fn success_satisfied(game: &Game, rule: &SuccessRule) -> bool {
    match rule {
        SuccessRule::SolvedCount(threshold) => game.counted_solved() >= *threshold,
        SuccessRule::EvidenceWeight { weights, threshold } => {
            let total: u32 = weights
                .iter()
                .filter(|(kind, _)| game.journal.has(*kind))
                .map(|(_, weight)| weight)
                .sum();
            total >= *threshold
        }
    }
}

/// Flip a running game to the success ending
pub fn resolve_success(game: &mut Game) {
    if !game.is_playing() {
        return;
    }
    tracing::info!(solved = game.counted_solved(), "truth revealed");
    game.phase = GamePhase::GameOver(Ending::TruthRevealed);
    game.push_event(EngineEvent::EndingReached(Ending::TruthRevealed));
}

/// The one entry point for every failure.
///
/// Order is load-bearing: the checkpoint is written from a normalized
/// image while `phase` still reads `Playing`, so the checkpoint survives
/// whatever the renderer does with the ending. A failing store write is
/// logged and the ending still happens.
pub fn trigger_failure(game: &mut Game, store: &mut dyn StateStore, reason: FailureReason) {
    if !game.is_playing() {
        return;
    }
    tracing::warn!(
        ?reason,
        scene = game.current_scene.name(),
        "failure triggered"
    );
    if let Some(seq) = game.cancel_sequence() {
        tracing::debug!(sequence = seq.name(), "sequence cut short by the ending");
    }
    let image = checkpoint_image(game, &reason);
    if let Err(err) = save::write_checkpoint(&image, store) {
        tracing::error!(%err, "failure checkpoint could not be written");
    }
    let ending = reason.ending();
    game.say(reason.notice());
    game.phase = GamePhase::GameOver(ending);
    game.push_event(EngineEvent::EndingReached(ending));
}

/// Build the game image the checkpoint stores.
///
/// Wrong-turn failures rewind to the operating room, unless they happened
/// on the second-floor landing with the intact record in hand. A
/// checkpoint that lands in the operating room starts its search over.
/// Interrupted sequences are stored as not started.
fn checkpoint_image(game: &Game, reason: &FailureReason) -> Game {
    let mut image = game.clone();
    image.phase = GamePhase::Playing;
    if reason.is_wrong_turn() {
        let keep_landing =
            image.current_scene == SceneId::Floor2Landing && image.search.clean_record;
        if !keep_landing {
            image.current_scene = SceneId::OperatingRoom;
        }
    }
    if image.current_scene == SceneId::OperatingRoom {
        image.search.reset();
    }
    for phase in image.sequences.values_mut() {
        if *phase == SequencePhase::Active {
            *phase = SequencePhase::NotStarted;
        }
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::narrative::SequenceId;
    use crate::game::SearchArea;
    use crate::save::MemoryStore;

    #[test]
    fn wrong_turn_checkpoint_rewinds_to_the_operating_room() {
        let mut game = Game::new();
        let mut store = MemoryStore::new();
        game.current_scene = SceneId::ElectricianRoom;

        trigger_failure(&mut game, &mut store, FailureReason::Miswired);

        assert_eq!(game.phase, GamePhase::GameOver(Ending::WrongTurn));
        let resumed = save::take_checkpoint(&mut store).expect("checkpoint readable");
        assert_eq!(resumed.current_scene, SceneId::OperatingRoom);
        assert!(resumed.is_playing());
    }

    #[test]
    fn landing_failure_with_clean_record_keeps_the_landing() {
        let mut game = Game::new();
        let mut store = MemoryStore::new();
        game.current_scene = SceneId::Floor2Landing;
        game.search.clean_record = true;
        game.search.record_found = true;

        trigger_failure(&mut game, &mut store, FailureReason::Ward203Door);

        let resumed = save::take_checkpoint(&mut store).expect("checkpoint readable");
        assert_eq!(resumed.current_scene, SceneId::Floor2Landing);
        assert!(resumed.search.clean_record);
    }

    #[test]
    fn seized_failures_keep_their_scene_but_reset_an_operating_search() {
        let mut game = Game::new();
        let mut store = MemoryStore::new();
        game.current_scene = SceneId::OperatingRoom;
        game.sequences
            .insert(SequenceId::NurseDeparture, SequencePhase::Completed);
        game.search.correct.push(SearchArea::InstrumentTray);
        game.search.wrong.push(SearchArea::SupplyCabinet);

        trigger_failure(&mut game, &mut store, FailureReason::RiskEscalation);

        assert_eq!(game.phase, GamePhase::GameOver(Ending::Seized));
        let resumed = save::take_checkpoint(&mut store).expect("checkpoint readable");
        assert_eq!(resumed.current_scene, SceneId::OperatingRoom);
        assert!(resumed.search.correct.is_empty());
        assert!(resumed.search.wrong.is_empty());
        // The nurse has already left in the resumed game.
        assert_eq!(
            resumed.sequence_phase(SequenceId::NurseDeparture),
            SequencePhase::Completed
        );
    }

    #[test]
    fn second_failure_does_not_overwrite_the_first_checkpoint() {
        let mut game = Game::new();
        let mut store = MemoryStore::new();
        game.current_scene = SceneId::MonitorRoom;

        trigger_failure(&mut game, &mut store, FailureReason::ElevatorWithoutCard);
        trigger_failure(&mut game, &mut store, FailureReason::RiskEscalation);

        let resumed = save::take_checkpoint(&mut store).expect("checkpoint readable");
        assert_eq!(resumed.current_scene, SceneId::MonitorRoom);
    }

    #[test]
    fn evidence_rule_counts_weighted_journal_clues() {
        let mut game = Game::new();
        let rule = SuccessRule::EvidenceWeight {
            weights: &[
                (ClueKind::ProjectCode, 2),
                (ClueKind::PatientName, 2),
                (ClueKind::ExperimentData, 3),
            ],
            threshold: 5,
        };
        assert!(!success_satisfied(&game, &rule));
        game.journal.record(ClueKind::ProjectCode, "Basement Laboratory");
        game.journal.record(ClueKind::ExperimentData, "Basement Laboratory");
        assert!(success_satisfied(&game, &rule));
    }

    #[test]
    fn count_rule_tracks_counted_puzzles_only() {
        let game = Game::new();
        assert!(!success_satisfied(&game, &ACTIVE_SUCCESS_RULE));
    }
}
