//! The hospital's rooms, their locks, and how floors connect
//!
//! Locks, aliases, and floor-travel safety are data tables; the state
//! object evaluates them against its flags.

use super::puzzles::PuzzleId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// Every place the detective can stand
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SceneId {
    Lobby,
    Ward717,
    Ward203,
    OperatingRoom,
    Floor2Landing,
    Floor3Landing,
    MonitorRoom,
    DirectorOffice,
    ElectricianRoom,
    UndergroundElevator,
    Basement,
}

impl SceneId {
    pub fn name(&self) -> &'static str {
        match self {
            SceneId::Lobby => "Lobby",
            SceneId::Ward717 => "Ward 717",
            SceneId::Ward203 => "Ward 203",
            SceneId::OperatingRoom => "Operating Room",
            SceneId::Floor2Landing => "2nd Floor Landing",
            SceneId::Floor3Landing => "3rd Floor Landing",
            SceneId::MonitorRoom => "Monitor Room",
            SceneId::DirectorOffice => "Director's Office",
            SceneId::ElectricianRoom => "Electrician's Room",
            SceneId::UndergroundElevator => "Underground Elevator",
            SceneId::Basement => "Basement Laboratory",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SceneId::Lobby => {
                "Rain hammers the glass doors behind you. The reception desk is covered in dust, and a floor map hangs crooked on the wall."
            }
            SceneId::Ward717 => {
                "Ward 717. Six beds, five stripped bare. On the last one the sheets are still turned down, as if someone left in a hurry."
            }
            SceneId::Ward203 => {
                "The key turns. Ward 203 smells of antiseptic that should have faded years ago. Someone is lying in the far bed."
            }
            SceneId::OperatingRoom => {
                "The operating room. A cold lamp still burns over the table. The floor has been mopped recently, except where it hasn't."
            }
            SceneId::Floor2Landing => {
                "The second floor landing. Two doors: ward 203, and a narrow door stenciled ELECTRICIAN."
            }
            SceneId::Floor3Landing => {
                "The third floor landing. The corridor lights flicker in a slow rhythm, almost like breathing."
            }
            SceneId::MonitorRoom => {
                "Banks of monitors, all dead but one. It loops the same grainy footage over and over."
            }
            SceneId::DirectorOffice => {
                "The director's office. Diplomas on the wall, a cold cup of tea, and a steel safe behind the desk."
            }
            SceneId::ElectricianRoom => {
                "Coils of wire and fuse boxes. A nail by the door holds a single brass key."
            }
            SceneId::UndergroundElevator => {
                "A service elevator the floor map never mentioned. The panel wants a code, one switch per bit."
            }
            SceneId::Basement => {
                "The basement laboratory. Rows of gurneys, a filing wall, and a workstation still humming."
            }
        }
    }

    pub fn lock(&self) -> SceneLock {
        match self {
            SceneId::Lobby => SceneLock::Open,
            SceneId::Ward717 => SceneLock::Sealed,
            SceneId::Ward203 => SceneLock::Sealed,
            SceneId::OperatingRoom => SceneLock::Open,
            SceneId::Floor2Landing => SceneLock::Sealed,
            SceneId::Floor3Landing => SceneLock::Sealed,
            SceneId::MonitorRoom => SceneLock::Requires(PuzzleId::MonitorCipher),
            SceneId::DirectorOffice => SceneLock::Requires(PuzzleId::NurseCipher),
            SceneId::ElectricianRoom => SceneLock::Sealed,
            SceneId::UndergroundElevator => SceneLock::Sealed,
            SceneId::Basement => SceneLock::Sealed,
        }
    }
}

impl std::fmt::Display for SceneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// What it takes to walk into a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneLock {
    /// Always passable
    Open,
    /// Passable once the puzzle is solved
    Requires(PuzzleId),
    /// Passable once every listed puzzle is solved
    RequiresAll(&'static [PuzzleId]),
    /// Only passable once story flow has unlocked it
    Sealed,
}

impl SceneLock {
    pub fn permits(&self, solved: &BTreeSet<PuzzleId>) -> bool {
        match self {
            SceneLock::Open => true,
            SceneLock::Requires(p) => solved.contains(p),
            SceneLock::RequiresAll(ps) => ps.iter().all(|p| solved.contains(p)),
            SceneLock::Sealed => false,
        }
    }
}

/// Lock check for a navigation request. Membership in the unlocked set
/// always passes; the lobby is never locked.
pub fn is_unlocked(
    scene: SceneId,
    solved: &BTreeSet<PuzzleId>,
    unlocked: &BTreeSet<SceneId>,
) -> bool {
    scene == SceneId::Lobby || unlocked.contains(&scene) || scene.lock().permits(solved)
}

/// Context predicates for scene aliasing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasWhen {
    /// The ward 203 key has been obtained or already used
    KeyInPlay,
}

/// Requests for the left scene land in the right scene while the predicate
/// holds. Applied after the lock check, never before.
pub const SCENE_ALIASES: &[(SceneId, AliasWhen, SceneId)] =
    &[(SceneId::Ward717, AliasWhen::KeyInPlay, SceneId::Ward203)];

pub fn resolve_alias(requested: SceneId, key_in_play: bool) -> SceneId {
    for (from, when, to) in SCENE_ALIASES {
        if *from == requested {
            let holds = match when {
                AliasWhen::KeyInPlay => key_in_play,
            };
            if holds {
                return *to;
            }
        }
    }
    requested
}

/// Where a floor number is being entered from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorOrigin {
    /// The annotated map behind the reception desk
    LobbyMap,
    /// The fire-exit stairwell panel on the seventh floor
    FireExit,
}

impl FloorOrigin {
    /// Floors the panel accepts at all
    pub fn floor_range(&self) -> RangeInclusive<u8> {
        match self {
            FloorOrigin::LobbyMap => 2..=7,
            FloorOrigin::FireExit => 1..=6,
        }
    }
}

/// Condition under which a floor choice is safe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorPredicate {
    Always,
    /// The intact nursing record names the second floor
    CleanRecord,
    /// The tampered record pointed to the fourth floor
    MisledToFour,
}

/// What a safe floor choice leads to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorOutcome {
    /// Room picker for 701-720
    RoomPicker,
    /// Unlock and enter directly
    Enter(SceneId),
    /// The patrolled second floor; the guard sequence decides entry
    GuardedFloor2,
    /// The fourth-floor bait; every room there is a trap
    Room401Picker,
}

pub struct FloorRule {
    pub origin: FloorOrigin,
    pub floor: u8,
    pub when: FloorPredicate,
    pub outcome: FloorOutcome,
}

/// The only floor choices that do not end the run. An in-range floor with
/// no matching rule is fatal.
pub const FLOOR_RULES: &[FloorRule] = &[
    FloorRule {
        origin: FloorOrigin::LobbyMap,
        floor: 7,
        when: FloorPredicate::Always,
        outcome: FloorOutcome::RoomPicker,
    },
    FloorRule {
        origin: FloorOrigin::FireExit,
        floor: 6,
        when: FloorPredicate::Always,
        outcome: FloorOutcome::Enter(SceneId::OperatingRoom),
    },
    FloorRule {
        origin: FloorOrigin::FireExit,
        floor: 2,
        when: FloorPredicate::CleanRecord,
        outcome: FloorOutcome::GuardedFloor2,
    },
    FloorRule {
        origin: FloorOrigin::FireExit,
        floor: 4,
        when: FloorPredicate::MisledToFour,
        outcome: FloorOutcome::Room401Picker,
    },
];

/// Verdict on a floor entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorDecision {
    /// The panel rejects the number; nothing changes
    OutOfRange,
    Go(FloorOutcome),
    /// Wrong-floor ending
    Fatal,
}

pub fn decide_floor(
    origin: FloorOrigin,
    floor: u8,
    clean_record: bool,
    misled_to_four: bool,
) -> FloorDecision {
    if !origin.floor_range().contains(&floor) {
        return FloorDecision::OutOfRange;
    }
    for rule in FLOOR_RULES {
        if rule.origin != origin || rule.floor != floor {
            continue;
        }
        let holds = match rule.when {
            FloorPredicate::Always => true,
            FloorPredicate::CleanRecord => clean_record,
            FloorPredicate::MisledToFour => misled_to_four,
        };
        if holds {
            return FloorDecision::Go(rule.outcome);
        }
    }
    FloorDecision::Fatal
}

/// Room picker for the seventh floor. Only 717 opens; the rest stay dark.
pub fn pick_seventh_floor_room(room: u16) -> Option<SceneId> {
    (room == 717).then_some(SceneId::Ward717)
}

/// Background track for a scene
pub fn bgm_for(scene: SceneId, basement_unlocked: bool) -> &'static str {
    match scene {
        SceneId::Ward717 => "bgm3",
        SceneId::Basement => "bgm4",
        SceneId::UndergroundElevator if basement_unlocked => "bgm4",
        _ => "bgm1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_variants_permit_correctly() {
        let mut solved = BTreeSet::new();
        assert!(SceneLock::Open.permits(&solved));
        assert!(!SceneLock::Sealed.permits(&solved));
        assert!(!SceneLock::Requires(PuzzleId::MonitorCipher).permits(&solved));

        solved.insert(PuzzleId::MonitorCipher);
        assert!(SceneLock::Requires(PuzzleId::MonitorCipher).permits(&solved));

        let both = SceneLock::RequiresAll(&[PuzzleId::MonitorCipher, PuzzleId::NurseCipher]);
        assert!(!both.permits(&solved));
        solved.insert(PuzzleId::NurseCipher);
        assert!(both.permits(&solved));
    }

    #[test]
    fn unlocked_set_overrides_any_lock() {
        let solved = BTreeSet::new();
        let mut unlocked = BTreeSet::new();
        assert!(!is_unlocked(SceneId::Basement, &solved, &unlocked));
        unlocked.insert(SceneId::Basement);
        assert!(is_unlocked(SceneId::Basement, &solved, &unlocked));
    }

    #[test]
    fn lobby_is_never_locked() {
        assert!(is_unlocked(SceneId::Lobby, &BTreeSet::new(), &BTreeSet::new()));
    }

    #[test]
    fn ward_alias_follows_the_key() {
        assert_eq!(resolve_alias(SceneId::Ward717, false), SceneId::Ward717);
        assert_eq!(resolve_alias(SceneId::Ward717, true), SceneId::Ward203);
        assert_eq!(resolve_alias(SceneId::Lobby, true), SceneId::Lobby);
    }

    #[test]
    fn lobby_map_floors() {
        assert_eq!(
            decide_floor(FloorOrigin::LobbyMap, 7, false, false),
            FloorDecision::Go(FloorOutcome::RoomPicker)
        );
        assert_eq!(
            decide_floor(FloorOrigin::LobbyMap, 3, false, false),
            FloorDecision::Fatal
        );
        assert_eq!(
            decide_floor(FloorOrigin::LobbyMap, 1, false, false),
            FloorDecision::OutOfRange
        );
        assert_eq!(
            decide_floor(FloorOrigin::LobbyMap, 8, false, false),
            FloorDecision::OutOfRange
        );
    }

    #[test]
    fn fire_exit_floors_depend_on_the_record() {
        assert_eq!(
            decide_floor(FloorOrigin::FireExit, 6, false, false),
            FloorDecision::Go(FloorOutcome::Enter(SceneId::OperatingRoom))
        );
        assert_eq!(
            decide_floor(FloorOrigin::FireExit, 2, true, false),
            FloorDecision::Go(FloorOutcome::GuardedFloor2)
        );
        assert_eq!(
            decide_floor(FloorOrigin::FireExit, 2, false, false),
            FloorDecision::Fatal
        );
        assert_eq!(
            decide_floor(FloorOrigin::FireExit, 4, false, true),
            FloorDecision::Go(FloorOutcome::Room401Picker)
        );
        assert_eq!(
            decide_floor(FloorOrigin::FireExit, 4, false, false),
            FloorDecision::Fatal
        );
        assert_eq!(
            decide_floor(FloorOrigin::FireExit, 5, true, true),
            FloorDecision::Fatal
        );
        // The stairwell panel stops at six.
        assert_eq!(
            decide_floor(FloorOrigin::FireExit, 7, true, true),
            FloorDecision::OutOfRange
        );
    }

    #[test]
    fn only_room_717_opens() {
        assert_eq!(pick_seventh_floor_room(717), Some(SceneId::Ward717));
        assert_eq!(pick_seventh_floor_room(704), None);
    }

    #[test]
    fn bgm_tracks_the_scene() {
        assert_eq!(bgm_for(SceneId::Ward717, false), "bgm3");
        assert_eq!(bgm_for(SceneId::Basement, false), "bgm4");
        assert_eq!(bgm_for(SceneId::UndergroundElevator, false), "bgm1");
        assert_eq!(bgm_for(SceneId::UndergroundElevator, true), "bgm4");
        assert_eq!(bgm_for(SceneId::Lobby, true), "bgm1");
    }
}
