//! The detective's clue journal
//!
//! Every discovery is recorded once, timestamped, and kept for the UI
//! and for save snapshots.

use super::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything worth writing down during the investigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClueKind {
    // Lobby and seventh floor
    FloorMapNote,
    NurseCipherNote,
    CipherKeyBack,
    WindowFigure,

    // Operating room search outcomes
    CleanNursingRecord,
    MisleadingNursingRecord,

    // Second and third floors
    GestureCode,
    Key203,
    PatientTestimony,
    DosageChart,
    ElevatorCard,
    BreakerDiagram,
    SafePhoto,
    VoiceRecorder,

    // The basement
    ProjectCode,
    PatientName,
    DateStamp,
    ExperimentData,
}

impl ClueKind {
    pub fn title(&self) -> &'static str {
        match self {
            ClueKind::FloorMapNote => "Floor map annotation",
            ClueKind::NurseCipherNote => "Nurse's cipher note",
            ClueKind::CipherKeyBack => "Writing on the note's back",
            ClueKind::WindowFigure => "Figure at the window",
            ClueKind::CleanNursingRecord => "Nursing record (intact)",
            ClueKind::MisleadingNursingRecord => "Nursing record (tampered)",
            ClueKind::GestureCode => "Hand signs on the monitor",
            ClueKind::Key203 => "Key labeled 203",
            ClueKind::PatientTestimony => "The patient's account",
            ClueKind::DosageChart => "Dosage chart",
            ClueKind::ElevatorCard => "Elevator access card",
            ClueKind::BreakerDiagram => "Breaker wiring diagram",
            ClueKind::SafePhoto => "Photo from the safe",
            ClueKind::VoiceRecorder => "Pocket recorder",
            ClueKind::ProjectCode => "Folder stamped X-17",
            ClueKind::PatientName => "Admission slip: Chen Juzi",
            ClueKind::DateStamp => "Log dated 2023-08-24",
            ClueKind::ExperimentData => "Experiment records",
        }
    }

    pub fn detail(&self) -> &'static str {
        match self {
            ClueKind::FloorMapNote => {
                "Someone circled the seventh floor on the lobby map and wrote: they never come down."
            }
            ClueKind::NurseCipherNote => {
                "A strip of paper in ward 717: ZBZCTBBMSQ. The handwriting is hurried."
            }
            ClueKind::CipherKeyBack => {
                "On the back, six faint letters: HULIBU."
            }
            ClueKind::WindowFigure => {
                "Through the window of 717, a light burns in the opposite wing. A figure stands at a monitor."
            }
            ClueKind::CleanNursingRecord => {
                "The record is complete. The missing patients were all moved to the second floor."
            }
            ClueKind::MisleadingNursingRecord => {
                "Pages are missing. What remains points to room 401 on the fourth floor."
            }
            ClueKind::GestureCode => {
                "The figure on the screen signs four shapes, over and over: 0x207D."
            }
            ClueKind::Key203 => {
                "An old brass key on a nail in the electrician's room, tagged 203."
            }
            ClueKind::PatientTestimony => {
                "The patient whispers about experiments below the hospital and a designer nobody names."
            }
            ClueKind::DosageChart => {
                "Three reagents, ratio 3:2:1, thirty milliliters in total."
            }
            ClueKind::ElevatorCard => {
                "A magnetic card fell from behind the breaker panel. It fits the lobby elevator."
            }
            ClueKind::BreakerDiagram => {
                "A faded diagram taped inside the panel door shows how the three wires cross."
            }
            ClueKind::SafePhoto => {
                "A staff photo dated 12/25. One face in the back row is circled in red ink."
            }
            ClueKind::VoiceRecorder => {
                "A pocket recorder from the safe. The playback is four flat tones: 2, 4, 7, 1."
            }
            ClueKind::ProjectCode => {
                "A folder of consent forms, every signature forged, stamped PROJECT X-17."
            }
            ClueKind::PatientName => {
                "An admission slip for Chen Juzi, age 9. No discharge date."
            }
            ClueKind::DateStamp => {
                "The last experiment log is dated 2023-08-24. After that, nothing."
            }
            ClueKind::ExperimentData => {
                "The workstation holds the full trial records. Names, dates, dosages, outcomes."
            }
        }
    }
}

/// A single journal entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clue {
    pub id: Id,
    pub kind: ClueKind,
    /// Display name of the scene where it was found
    pub found_in: String,
    pub found_at: DateTime<Utc>,
}

impl Clue {
    pub fn new(kind: ClueKind, found_in: &str) -> Self {
        Self {
            id: Id::new(),
            kind,
            found_in: found_in.to_string(),
            found_at: Utc::now(),
        }
    }

    /// One-line summary for lists
    pub fn brief(&self) -> String {
        format!("{} ({})", self.kind.title(), self.found_in)
    }
}

/// The journal itself: ordered, one entry per clue kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Journal {
    pub entries: Vec<Clue>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a clue. Returns false if this kind is already journaled.
    pub fn record(&mut self, kind: ClueKind, found_in: &str) -> bool {
        if self.has(kind) {
            return false;
        }
        tracing::debug!(clue = kind.title(), scene = found_in, "clue recorded");
        self.entries.push(Clue::new(kind, found_in));
        true
    }

    pub fn has(&self, kind: ClueKind) -> bool {
        self.entries.iter().any(|c| c.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_each_kind_once() {
        let mut journal = Journal::new();
        assert!(journal.record(ClueKind::Key203, "Electrician's Room"));
        assert!(!journal.record(ClueKind::Key203, "Electrician's Room"));
        assert_eq!(journal.len(), 1);
        assert!(journal.has(ClueKind::Key203));
        assert!(!journal.has(ClueKind::GestureCode));
    }

    #[test]
    fn brief_names_the_scene() {
        let clue = Clue::new(ClueKind::DosageChart, "Ward 203");
        assert_eq!(clue.brief(), "Dosage chart (Ward 203)");
    }
}
