//! The puzzle catalog and answer checking
//!
//! Solutions live here as data. Solve effects (unlocks, flags) are applied
//! by the state object, not by the catalog.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Puzzles counted toward the ending check. The final confirmation is a
/// gate on top of these, not one of them.
pub const TOTAL_PUZZLES: usize = 7;

/// Detection risk added for a rejected answer
pub const WRONG_ANSWER_RISK: u8 = 3;

/// Ciphertext on the nurse's note in ward 717
pub const WARD_NOTE_CIPHERTEXT: &str = "ZBZCTBBMSQ";
/// Key scrawled on the note's back
pub const WARD_NOTE_KEY: &str = "HULIBU";
/// Biliteral string flashing on the monitor-room screen
pub const MONITOR_SCREEN_TEXT: &str = "AABBB ABAAA AAABB AAABB AABAA ABBAB";

/// Required connections for the breaker box, left terminal to right
pub const BREAKER_PAIRS: [(u8, u8); 3] = [(0, 1), (1, 0), (2, 2)];

/// Binary code for the underground elevator door. A wrong full entry is
/// fatal; this never enters the solved set.
pub const UNDERGROUND_BINARY_CODE: &str = "0010000001111101";
/// Password for the basement workstation. Wrong entries are retryable.
pub const BASEMENT_COMPUTER_PASSWORD: &str = "20230824x-17chenjuzi";

/// Every puzzle in the game
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum PuzzleId {
    FloorSelection,
    NurseCipher,
    MonitorCipher,
    SafeWiring,
    MedicineDosage,
    ElevatorCode,
    BreakerWiring,
    FinalTruth,
}

impl PuzzleId {
    pub fn name(&self) -> &'static str {
        match self {
            PuzzleId::FloorSelection => "The Floor Map",
            PuzzleId::NurseCipher => "The Nurse's Note",
            PuzzleId::MonitorCipher => "The Flickering Screen",
            PuzzleId::SafeWiring => "The Director's Safe",
            PuzzleId::MedicineDosage => "The Dosage Chart",
            PuzzleId::ElevatorCode => "The Elevator Panel",
            PuzzleId::BreakerWiring => "The Breaker Box",
            PuzzleId::FinalTruth => "The Final Truth",
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            PuzzleId::FloorSelection => {
                "The lobby map is scored with fingernail marks around one floor. Which floor do they point to?"
            }
            PuzzleId::NurseCipher => {
                "The note reads ZBZCTBBMSQ. Six letters on the back: HULIBU. What was the nurse trying to say?"
            }
            PuzzleId::MonitorCipher => {
                "The screen flickers: AABBB ABAAA AAABB AAABB AABAA ABBAB. What word is buried in it?"
            }
            PuzzleId::SafeWiring => {
                "Five wires left to right: red, blue, green, yellow, purple. The sockets read blue, red, yellow, green, purple. Enter the socket order, digits joined by dashes."
            }
            PuzzleId::MedicineDosage => {
                "Three reagents in ratio 3:2:1, thirty milliliters in total. How many milliliters of reagent A?"
            }
            PuzzleId::ElevatorCode => {
                "The monitor froze at 02:13. The photo is dated 12/25. The panel wants eight digits."
            }
            PuzzleId::BreakerWiring => {
                "Three loose wires hang beside three terminals. The taped diagram shows which crosses which."
            }
            PuzzleId::FinalTruth => {
                "Three words carried you here. Join them with dashes and say them out loud."
            }
        }
    }

    /// Canonical text solution, if the puzzle takes typed input
    pub fn solution(&self) -> Option<&'static str> {
        match self {
            PuzzleId::FloorSelection => Some("7"),
            PuzzleId::NurseCipher => Some("shoushushi"),
            PuzzleId::MonitorCipher => Some("HIDDEN"),
            PuzzleId::SafeWiring => Some("2-1-4-3-5"),
            PuzzleId::MedicineDosage => Some("15"),
            PuzzleId::ElevatorCode => Some("02131225"),
            PuzzleId::BreakerWiring => None,
            PuzzleId::FinalTruth => Some("SHOUSHUSHI-HIDDEN-02131225"),
        }
    }

    /// Whether a solve counts toward the ending threshold
    pub fn counts_toward_total(&self) -> bool {
        !matches!(self, PuzzleId::FinalTruth)
    }
}

impl std::fmt::Display for PuzzleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Compare a candidate answer against a canonical solution.
///
/// All whitespace is stripped from both sides first. If the solution
/// contains a Latin letter the comparison is case-insensitive, otherwise
/// it is exact.
pub fn check_answer(candidate: &str, solution: &str) -> bool {
    let cand = strip_whitespace(candidate);
    let sol = strip_whitespace(solution);
    if sol.chars().any(|c| c.is_ascii_alphabetic()) {
        cand.eq_ignore_ascii_case(&sol)
    } else {
        cand == sol
    }
}

/// Result of evaluating a wiring panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WiringOutcome {
    /// Fewer connections than terminals; nothing happens yet
    Incomplete,
    Correct,
    /// A full set that is not exactly the required set
    Miswired,
}

/// Evaluate a set of wire connections against the required pairs.
///
/// Evaluation only happens once the panel is full. Order does not matter;
/// the made set must equal the required set exactly.
pub fn evaluate_wiring(connections: &[(u8, u8)], required: &[(u8, u8)]) -> WiringOutcome {
    if connections.len() < required.len() {
        return WiringOutcome::Incomplete;
    }
    let made: BTreeSet<(u8, u8)> = connections.iter().copied().collect();
    let wanted: BTreeSet<(u8, u8)> = required.iter().copied().collect();
    if made == wanted {
        WiringOutcome::Correct
    } else {
        WiringOutcome::Miswired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::cipher;

    #[test]
    fn letters_compare_case_insensitively() {
        assert!(check_answer("ShouShuShi", "shoushushi"));
        assert!(check_answer("hidden", "HIDDEN"));
        assert!(!check_answer("shoushush", "shoushushi"));
    }

    #[test]
    fn digits_compare_exactly_after_whitespace_strip() {
        assert!(check_answer(" 0213 1225 ", "02131225"));
        assert!(check_answer("2-1-4-3-5", "2-1-4-3-5"));
        assert!(!check_answer("2-1-4-3-6", "2-1-4-3-5"));
    }

    #[test]
    fn whitespace_inside_answers_is_ignored() {
        assert!(check_answer("shou shu shi", "shoushushi"));
        assert!(check_answer("SHOUSHUSHI - HIDDEN - 02131225", "SHOUSHUSHI-HIDDEN-02131225"));
    }

    #[test]
    fn displayed_materials_decode_to_their_solutions() {
        let vigenere = cipher::vigenere_decode(WARD_NOTE_CIPHERTEXT, WARD_NOTE_KEY);
        assert!(check_answer(&vigenere, PuzzleId::NurseCipher.solution().unwrap()));

        let bacon = cipher::bacon_decode(MONITOR_SCREEN_TEXT);
        assert_eq!(bacon, PuzzleId::MonitorCipher.solution().unwrap());
    }

    #[test]
    fn wiring_requires_a_full_panel() {
        assert_eq!(
            evaluate_wiring(&[(0, 1)], &BREAKER_PAIRS),
            WiringOutcome::Incomplete
        );
        assert_eq!(
            evaluate_wiring(&[(0, 1), (1, 0)], &BREAKER_PAIRS),
            WiringOutcome::Incomplete
        );
    }

    #[test]
    fn wiring_full_set_matches_or_fails() {
        assert_eq!(
            evaluate_wiring(&[(2, 2), (0, 1), (1, 0)], &BREAKER_PAIRS),
            WiringOutcome::Correct
        );
        assert_eq!(
            evaluate_wiring(&[(0, 0), (1, 1), (2, 2)], &BREAKER_PAIRS),
            WiringOutcome::Miswired
        );
        // A duplicate connection can never complete the required set.
        assert_eq!(
            evaluate_wiring(&[(0, 1), (0, 1), (2, 2)], &BREAKER_PAIRS),
            WiringOutcome::Miswired
        );
    }

    #[test]
    fn final_truth_does_not_count_toward_total() {
        assert!(!PuzzleId::FinalTruth.counts_toward_total());
        assert!(PuzzleId::NurseCipher.counts_toward_total());
    }
}
