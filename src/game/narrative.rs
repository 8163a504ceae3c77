//! One-shot narrative sequences
//!
//! A sequence is an ordered script of beats: narration, audio cues, and
//! scene effects. Each runs at most once per playthrough. The sequencer
//! is driven by the host's tick; beats that wait on audio continue after
//! a timeout even if the audio never reports back.

use super::scenes::SceneId;
use serde::{Deserialize, Serialize};

/// Ticks to wait on an audio cue before giving up and continuing.
/// The host ticks roughly every 100 ms, so 50 is about five seconds.
pub const AUDIO_WAIT_TICKS: u32 = 50;

/// Every one-shot sequence in the game
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SequenceId {
    /// First entry to the operating room: a nurse leaves through the far doors
    NurseDeparture,
    /// The second-floor guard passes while the detective hides
    GuardPatrol,
    /// The patient in ward 203 comes around after the dosage
    PatientAwakening,
}

impl SequenceId {
    pub fn name(&self) -> &'static str {
        match self {
            SequenceId::NurseDeparture => "nurse departure",
            SequenceId::GuardPatrol => "guard patrol",
            SequenceId::PatientAwakening => "patient awakening",
        }
    }
}

/// Lifecycle of a one-shot sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SequencePhase {
    #[default]
    NotStarted,
    Active,
    Completed,
}

/// A single step of a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Beat {
    /// Narration line for the log
    Say(String),
    PauseBgm,
    ResumeBgm,
    /// Start an effect track, then wait for it (or the timeout)
    PlayEffect { track: String, timeout_ticks: u32 },
    Unlock(SceneId),
    /// Move the detective without going through navigation locks
    Enter(SceneId),
}

/// An ordered script belonging to one sequence
#[derive(Debug, Clone)]
pub struct BeatScript {
    pub sequence: SequenceId,
    pub beats: Vec<Beat>,
}

#[derive(Debug, Clone)]
struct Running {
    script: BeatScript,
    cursor: usize,
    wait: Option<Wait>,
}

#[derive(Debug, Clone)]
struct Wait {
    remaining_ticks: u32,
}

/// Drives at most one script at a time. Runtime state only; interrupted
/// scripts are not persisted, their sequences replay from the start.
#[derive(Debug, Default, Clone)]
pub struct Sequencer {
    running: Option<Running>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a script. Refused while another is in flight.
    pub fn start(&mut self, script: BeatScript) -> bool {
        if self.running.is_some() {
            tracing::warn!(sequence = script.sequence.name(), "sequence refused, another is active");
            return false;
        }
        tracing::info!(sequence = script.sequence.name(), "sequence started");
        self.running = Some(Running {
            script,
            cursor: 0,
            wait: None,
        });
        true
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn active_sequence(&self) -> Option<SequenceId> {
        self.running.as_ref().map(|r| r.script.sequence)
    }

    /// Drop the script mid-flight. Remaining beats never run.
    pub fn cancel(&mut self) -> Option<SequenceId> {
        let cancelled = self.running.take().map(|r| r.script.sequence);
        if let Some(seq) = cancelled {
            tracing::info!(sequence = seq.name(), "sequence cancelled");
        }
        cancelled
    }

    /// Advance the script by one host tick.
    ///
    /// Returns the beats emitted this tick, and the sequence id if the
    /// script finished. While waiting on audio, `audio_done` releases the
    /// wait early; otherwise the wait expires on its own.
    pub fn tick(&mut self, audio_done: bool) -> (Vec<Beat>, Option<SequenceId>) {
        let Some(running) = self.running.as_mut() else {
            return (Vec::new(), None);
        };

        if let Some(wait) = running.wait.as_mut() {
            if audio_done || wait.remaining_ticks == 0 {
                running.wait = None;
            } else {
                wait.remaining_ticks -= 1;
                return (Vec::new(), None);
            }
        }

        let mut emitted = Vec::new();
        while running.cursor < running.script.beats.len() {
            let beat = running.script.beats[running.cursor].clone();
            running.cursor += 1;
            let waits = matches!(beat, Beat::PlayEffect { .. });
            if let Beat::PlayEffect { timeout_ticks, .. } = &beat {
                running.wait = Some(Wait {
                    remaining_ticks: *timeout_ticks,
                });
            }
            emitted.push(beat);
            if waits {
                return (emitted, None);
            }
        }

        let finished = running.script.sequence;
        tracing::info!(sequence = finished.name(), "sequence finished");
        self.running = None;
        (emitted, Some(finished))
    }
}

/// The scripts themselves
pub mod scripts {
    use super::*;

    pub fn nurse_departure() -> BeatScript {
        BeatScript {
            sequence: SequenceId::NurseDeparture,
            beats: vec![
                Beat::Say(
                    "The far doors swing. A nurse in an old-style uniform walks out without a sound, a clipboard hugged to her chest.".to_string(),
                ),
                Beat::PlayEffect {
                    track: "door_swing".to_string(),
                    timeout_ticks: AUDIO_WAIT_TICKS,
                },
                Beat::Say(
                    "She never looks back. The clipboard left a clean rectangle in the dust on the side table.".to_string(),
                ),
            ],
        }
    }

    pub fn guard_patrol() -> BeatScript {
        BeatScript {
            sequence: SequenceId::GuardPatrol,
            beats: vec![
                Beat::Say(
                    "Footsteps on the landing below. You press into the doorway and hold your breath.".to_string(),
                ),
                Beat::PauseBgm,
                Beat::PlayEffect {
                    track: "guard_footsteps".to_string(),
                    timeout_ticks: AUDIO_WAIT_TICKS,
                },
                Beat::ResumeBgm,
                Beat::Say("The footsteps drag away toward the far stairwell.".to_string()),
                Beat::Unlock(SceneId::Floor2Landing),
                Beat::Enter(SceneId::Floor2Landing),
            ],
        }
    }

    pub fn patient_awakening() -> BeatScript {
        BeatScript {
            sequence: SequenceId::PatientAwakening,
            beats: vec![
                Beat::Say("The drip finds its rhythm. The patient's fingers twitch.".to_string()),
                Beat::PlayEffect {
                    track: "heart_monitor".to_string(),
                    timeout_ticks: AUDIO_WAIT_TICKS,
                },
                Beat::Say(
                    "Eyes open, clouded, then fixing on you with sudden focus. Cracked lips start to move.".to_string(),
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(seq: &mut Sequencer, audio_done: bool, max_ticks: u32) -> (Vec<Beat>, Option<SequenceId>) {
        let mut all = Vec::new();
        for _ in 0..max_ticks {
            let (beats, finished) = seq.tick(audio_done);
            all.extend(beats);
            if finished.is_some() {
                return (all, finished);
            }
        }
        (all, None)
    }

    #[test]
    fn script_completes_when_audio_reports_done() {
        let mut seq = Sequencer::new();
        assert!(seq.start(scripts::guard_patrol()));
        let (beats, finished) = drain(&mut seq, true, 10);
        assert_eq!(finished, Some(SequenceId::GuardPatrol));
        assert!(beats.contains(&Beat::Enter(SceneId::Floor2Landing)));
        assert!(!seq.is_running());
    }

    #[test]
    fn silent_audio_still_completes_after_timeout() {
        let mut seq = Sequencer::new();
        assert!(seq.start(scripts::guard_patrol()));
        // One tick emits up to the audio cue, then the wait must expire.
        let (_, finished) = seq.tick(false);
        assert_eq!(finished, None);
        let (beats, finished) = drain(&mut seq, false, AUDIO_WAIT_TICKS + 5);
        assert_eq!(finished, Some(SequenceId::GuardPatrol));
        assert!(beats.contains(&Beat::ResumeBgm));
    }

    #[test]
    fn second_script_refused_while_running() {
        let mut seq = Sequencer::new();
        assert!(seq.start(scripts::guard_patrol()));
        assert!(!seq.start(scripts::nurse_departure()));
        assert_eq!(seq.active_sequence(), Some(SequenceId::GuardPatrol));
    }

    #[test]
    fn cancel_discards_remaining_beats() {
        let mut seq = Sequencer::new();
        assert!(seq.start(scripts::guard_patrol()));
        let _ = seq.tick(false);
        assert_eq!(seq.cancel(), Some(SequenceId::GuardPatrol));
        assert!(!seq.is_running());
        let (beats, finished) = seq.tick(true);
        assert!(beats.is_empty());
        assert_eq!(finished, None);
    }
}
