//! Main application state and rendering

use crate::game::{
    AnswerOutcome, AudioCue, BasementClue, CodeEntry, DoorOutcome, DosageOutcome,
    ElevatorRide, Ending, EngineEvent, Floor2Door, FloorEntry, FloorOrigin, Game, RoomPick,
    SceneChange, SceneId, SearchArea, SearchOutcome, WiringOutcome, PuzzleId,
    RISK_THRESHOLD, SEARCH_PICKS, TOTAL_PUZZLES,
};
use crate::save::{self, FileStore, SaveSlot};
use crate::tui::widgets::{AlertLine, EndingBox, RiskGauge};
use crate::tui::{Theme, styled_block, LOGO, HELP_TEXT, SMALL_LOGO};
use crate::tui::{create_main_layout, create_content_layout, create_main_area_layout};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use rand::rngs::ThreadRng;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap,
    },
    Frame,
};
use std::time::Duration;

/// Directory the file store writes under
const SAVE_DIR: &str = "saves";

/// Application state
pub struct App {
    pub game: Game,
    pub store: FileStore,
    pub rng: ThreadRng,
    pub theme: Theme,
    pub running: bool,
    pub show_help: bool,
    pub current_screen: Screen,
    pub menu_state: ListState,
    pub input_buffer: String,
    pub input_mode: InputMode,
    pub console: Vec<String>,
    pub command_history: Vec<String>,
    pub room_picker: Option<RoomPicker>,
    pub now_playing: Option<String>,
    pub paused_bgm: Option<String>,
    pub ending: Option<Ending>,
    pub checkpoint_waiting: bool,
    pub menu_notice: Option<String>,
    pub frame: u64,
}

/// Current screen being displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    MainMenu,
    LoadGame,
    Playing,
    Paused,
    Journal,
    Ending,
}

/// Input mode for the command prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Command,  // Typing a command
}

/// Which corridor of numbered doors the detective is facing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomPicker {
    SeventhFloor,
    FourthFloor,
}

impl App {
    pub fn new() -> Self {
        let mut menu_state = ListState::default();
        menu_state.select(Some(0));

        Self {
            game: Game::new(),
            store: FileStore::new(SAVE_DIR),
            rng: rand::rng(),
            theme: Theme::default(),
            running: true,
            show_help: false,
            current_screen: Screen::MainMenu,
            menu_state,
            input_buffer: String::new(),
            input_mode: InputMode::Normal,
            console: vec![
                "[SYSTEM] Welcome, detective. Start a night or pick up an old one.".to_string(),
            ],
            command_history: Vec::new(),
            room_picker: None,
            now_playing: None,
            paused_bgm: None,
            ending: None,
            checkpoint_waiting: false,
            menu_notice: None,
            frame: 0,
        }
    }

    /// Advance sequences and collect engine side effects. Called once per
    /// loop iteration; sequences measure time in these ticks.
    pub fn advance(&mut self) {
        if self.current_screen == Screen::Playing && self.game.is_playing() {
            self.game.tick(true);
            self.pump_engine();
        }
    }

    /// Handle keyboard input
    pub fn handle_input(&mut self) -> std::io::Result<bool> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(true);
                }

                // Handle command input mode separately
                if self.input_mode == InputMode::Command {
                    match key.code {
                        KeyCode::Enter => {
                            self.execute_command();
                            self.input_mode = InputMode::Normal;
                        }
                        KeyCode::Esc => {
                            self.input_buffer.clear();
                            self.input_mode = InputMode::Normal;
                        }
                        KeyCode::Backspace => {
                            self.input_buffer.pop();
                        }
                        KeyCode::Char(c) => {
                            self.input_buffer.push(c);
                        }
                        _ => {}
                    }
                    return Ok(true);
                }

                // Normal mode key handling
                match key.code {
                    KeyCode::Char('q') if self.current_screen == Screen::MainMenu => {
                        self.running = false;
                        return Ok(false);
                    }
                    KeyCode::Char('q') if self.current_screen == Screen::Paused => {
                        self.current_screen = Screen::MainMenu;
                        self.menu_state.select(Some(0));
                    }
                    KeyCode::Char('?') => {
                        self.show_help = !self.show_help;
                    }
                    KeyCode::Esc => {
                        if self.show_help {
                            self.show_help = false;
                        } else {
                            self.handle_escape();
                        }
                    }
                    KeyCode::Up => self.navigate_up(),
                    KeyCode::Down => self.navigate_down(),
                    KeyCode::Enter => self.handle_enter(),

                    // Command mode entry - in Playing or Paused screen
                    KeyCode::Char(':') | KeyCode::Char('/') | KeyCode::Char(';')
                        if self.current_screen == Screen::Playing || self.current_screen == Screen::Paused => {
                        self.input_mode = InputMode::Command;
                        self.input_buffer.clear();
                        self.current_screen = Screen::Playing; // Unpause if paused
                    }
                    KeyCode::Char(' ') if self.current_screen == Screen::Playing => {
                        self.input_mode = InputMode::Command;
                        self.input_buffer.clear();
                    }
                    KeyCode::Char('j') if self.current_screen == Screen::Playing => {
                        self.current_screen = Screen::Journal;
                        self.menu_state.select(Some(0));
                    }
                    KeyCode::F(5) if self.current_screen == Screen::Playing => {
                        let output = self.cmd_save(&["save", "1"]);
                        self.feed(output);
                    }
                    KeyCode::F(9) if self.current_screen == Screen::Playing => {
                        let output = self.cmd_load(&["load", "1"]);
                        self.feed(output);
                    }
                    _ => {}
                }
            }
        }
        Ok(true)
    }

    /// Execute a typed command
    fn execute_command(&mut self) {
        let cmd = self.input_buffer.trim().to_string();
        if !cmd.is_empty() {
            self.command_history.push(cmd.clone());
            let output = self.process_command(&cmd);
            self.feed(output);
        }
        self.input_buffer.clear();
        self.pump_engine();
    }

    /// Push feedback lines, keeping the buffer manageable
    fn feed(&mut self, lines: Vec<String>) {
        for line in lines {
            self.console.push(line);
        }
        while self.console.len() > 100 {
            self.console.remove(0);
        }
    }

    /// Drain engine side effects into interface state
    fn pump_engine(&mut self) {
        for event in self.game.drain_events() {
            match event {
                EngineEvent::Audio(cue) => self.apply_audio(cue),
                EngineEvent::EndingReached(ending) => {
                    self.ending = Some(ending);
                    self.checkpoint_waiting = save::has_checkpoint(&self.store);
                    self.current_screen = Screen::Ending;
                    self.input_mode = InputMode::Normal;
                    self.input_buffer.clear();
                    self.room_picker = None;
                }
            }
        }
        while self.console.len() > 100 {
            self.console.remove(0);
        }
    }

    fn apply_audio(&mut self, cue: AudioCue) {
        match cue {
            AudioCue::PlayBgm(track) => {
                self.now_playing = Some(track);
            }
            AudioCue::PauseBgm => {
                self.paused_bgm = self.now_playing.take();
            }
            AudioCue::ResumeBgm => {
                if let Some(track) = self.paused_bgm.take() {
                    self.now_playing = Some(track);
                }
            }
            AudioCue::PlayEffect(track) => {
                self.console.push(format!("[AUDIO] ♪ {}", track));
            }
        }
    }

    /// Process a command and return output lines
    fn process_command(&mut self, cmd: &str) -> Vec<String> {
        let parts: Vec<&str> = cmd.split_whitespace().collect();
        if parts.is_empty() {
            return vec![];
        }
        let verb = parts[0].to_lowercase();

        match verb.as_str() {
            "help" | "?" => vec![
                "╔══════════════════════════════════════════════════════════════╗".to_string(),
                "║                 DETECTIVE'S COMMANDS                         ║".to_string(),
                "╠══════════════════════════════════════════════════════════════╣".to_string(),
                "║  MOVEMENT:                                                   ║".to_string(),
                "║    go <place>       - Walk somewhere you know                ║".to_string(),
                "║    floor <n>        - Punch a floor (map or stair panel)     ║".to_string(),
                "║    room <n>         - Try a numbered door in a corridor      ║".to_string(),
                "║    door <which>     - Pick a door on the 2F landing          ║".to_string(),
                "║    elevator         - Ride the elevator where you stand      ║".to_string(),
                "╠──────────────────────────────────────────────────────────────╣".to_string(),
                "║  THE ROOMS:                                                  ║".to_string(),
                "║    look             - What is here and what can be done      ║".to_string(),
                "║    map / note / flip / window / screen / safe / chart        ║".to_string(),
                "║    search <area>    - Turn over part of the operating room   ║".to_string(),
                "║    record / key / breaker / talk / take <file>               ║".to_string(),
                "╠──────────────────────────────────────────────────────────────╣".to_string(),
                "║  RIDDLES:                                                    ║".to_string(),
                "║    answer <riddle> <text>  - floor, nurse, monitor, safe,    ║".to_string(),
                "║                              elevator, truth                 ║".to_string(),
                "║    wire <a-b> <a-b> <a-b>  - Reconnect the breaker lines     ║".to_string(),
                "║    mix <ml>                - Finish the bedside mix          ║".to_string(),
                "║    code <bits>             - The underground switch panel    ║".to_string(),
                "║    password <text>         - The basement workstation        ║".to_string(),
                "╠──────────────────────────────────────────────────────────────╣".to_string(),
                "║  THE CASE:                                                   ║".to_string(),
                "║    status / journal / saves                                  ║".to_string(),
                "║    save <1|2> / load <1|2> / clear                           ║".to_string(),
                "╚══════════════════════════════════════════════════════════════╝".to_string(),
            ],

            "clear" | "cls" => {
                self.console.clear();
                vec!["[SYSTEM] Console cleared.".to_string()]
            }

            "look" => self.cmd_look(),
            "status" => self.cmd_status(),
            "journal" | "clues" => self.cmd_journal(),

            "go" | "move" => self.cmd_go(&parts),
            "floor" => self.cmd_floor(&parts),
            "room" => self.cmd_room(&parts),
            "door" => self.cmd_door(&parts),
            "elevator" | "lift" => self.cmd_elevator(),

            "map" => self.cmd_map(),
            "note" => self.cmd_note(),
            "flip" => self.cmd_flip(),
            "window" => self.cmd_window(),
            "search" => self.cmd_search(&parts),
            "record" => self.cmd_record(),
            "key" => self.cmd_key(),
            "breaker" => self.cmd_breaker(),
            "wire" => self.cmd_wire(&parts),
            "chart" => self.cmd_chart(),
            "mix" => self.cmd_mix(&parts),
            "talk" => self.cmd_talk(),
            "screen" => self.cmd_screen(),
            "safe" => self.cmd_safe(),
            "code" => self.cmd_code(&parts),
            "take" => self.cmd_take(&parts),
            "password" => self.cmd_password(&parts),

            "answer" | "solve" => self.cmd_answer(&parts),

            "save" => self.cmd_save(&parts),
            "load" => self.cmd_load(&parts),
            "saves" | "slots" => self.cmd_slots(),

            _ => vec![
                format!("[ERROR] Unknown command: {}", verb),
                "[TIP] Type 'help' for the list.".to_string(),
            ],
        }
    }

    // ---- individual commands -----------------------------------------------

    fn cmd_look(&mut self) -> Vec<String> {
        let scene = self.game.current_scene;
        let mut out = vec![format!("[LOOK] {}", scene.name())];
        for hint in scene_hints(scene) {
            out.push(format!("  · {}", hint));
        }
        out
    }

    fn cmd_status(&mut self) -> Vec<String> {
        let risk = self.game.risk_level();
        vec![
            "┌─────────────────────────────────────────┐".to_string(),
            "│              CASE STATUS                │".to_string(),
            "├─────────────────────────────────────────┤".to_string(),
            format!("│ Scene:   {:<30} │", self.game.current_scene.name()),
            format!("│ Riddles: {:<30} │", format!("{} of {}", self.game.counted_solved(), TOTAL_PUZZLES)),
            format!("│ Clues:   {:<30} │", self.game.journal.len()),
            format!("│ Risk:    {:<30} │", format!("{} {} ({}%)", risk.symbol(), risk, self.game.detection_risk)),
            "└─────────────────────────────────────────┘".to_string(),
        ]
    }

    fn cmd_journal(&mut self) -> Vec<String> {
        if self.game.journal.is_empty() {
            return vec!["[JOURNAL] Empty. The hospital has told you nothing yet.".to_string()];
        }
        let mut out = vec![format!("[JOURNAL] {} clues so far:", self.game.journal.len())];
        for clue in &self.game.journal.entries {
            out.push(format!("  · {}", clue.brief()));
        }
        out.push("[TIP] Press j for the full journal view.".to_string());
        out
    }

    fn cmd_go(&mut self, parts: &[&str]) -> Vec<String> {
        if parts.len() < 2 {
            return vec!["[ERROR] Usage: go <place>".to_string()];
        }
        let Some(scene) = parse_place(parts[1]) else {
            return vec![format!("[ERROR] No place called '{}' in this building.", parts[1])];
        };
        match self.game.change_scene(scene) {
            SceneChange::Moved(s) => {
                self.room_picker = None;
                vec![format!("[MOVE] {}", s.name())]
            }
            SceneChange::Locked(s) => {
                vec![format!("[LOCKED] {} will not open for you yet.", s.name())]
            }
            SceneChange::AlreadyThere => vec!["[MOVE] You are already here.".to_string()],
            SceneChange::Ignored => vec![],
        }
    }

    fn cmd_floor(&mut self, parts: &[&str]) -> Vec<String> {
        if parts.len() < 2 {
            return vec!["[ERROR] Usage: floor <number>".to_string()];
        }
        let Ok(floor) = parts[1].parse::<u8>() else {
            return vec!["[ERROR] Floors are numbers here.".to_string()];
        };
        let origin = if self.game.current_scene == SceneId::Lobby {
            FloorOrigin::LobbyMap
        } else {
            FloorOrigin::FireExit
        };
        match self.game.enter_floor(origin, floor, &mut self.store) {
            FloorEntry::Entered(s) => {
                self.room_picker = None;
                vec![format!("[MOVE] {}", s.name())]
            }
            FloorEntry::RoomPicker => {
                self.room_picker = Some(RoomPicker::SeventhFloor);
                vec![
                    "[FLOOR] Seventh floor. Numbered doors run both ways into the dark.".to_string(),
                    "[TIP] room <number>".to_string(),
                ]
            }
            FloorEntry::Room401Picker => {
                self.room_picker = Some(RoomPicker::FourthFloor);
                vec![
                    "[FLOOR] Fourth floor. The record said 401.".to_string(),
                    "[TIP] room <number>".to_string(),
                ]
            }
            FloorEntry::PatrolStarted => {
                vec!["[WAIT] Footsteps overhead. Hold still until they pass.".to_string()]
            }
            FloorEntry::PatrolActive => {
                vec!["[WAIT] The footsteps have not passed yet.".to_string()]
            }
            FloorEntry::FatalEnding => vec![],
            FloorEntry::OutOfRange => {
                vec!["[ERROR] The panel only offers floors that exist here.".to_string()]
            }
            FloorEntry::NeedsPuzzle => vec![
                "[HINT] The directory is still gibberish. Read it right first.".to_string(),
                "[TIP] answer floor <number>".to_string(),
            ],
            FloorEntry::NotHere => {
                vec!["[ERROR] No floor panel where you stand.".to_string()]
            }
        }
    }

    fn cmd_room(&mut self, parts: &[&str]) -> Vec<String> {
        if parts.len() < 2 {
            return vec!["[ERROR] Usage: room <number>".to_string()];
        }
        let Ok(room) = parts[1].parse::<u16>() else {
            return vec!["[ERROR] Door plates carry numbers.".to_string()];
        };
        match self.room_picker {
            Some(RoomPicker::SeventhFloor) => match self.game.pick_seventh_floor_room(room) {
                RoomPick::Opened(s) => {
                    self.room_picker = None;
                    vec![format!("[MOVE] {}", s.name())]
                }
                RoomPick::Dark => vec!["[DOOR] Nothing. Try another number.".to_string()],
                RoomPick::FatalEnding | RoomPick::Ignored => {
                    self.room_picker = None;
                    vec![]
                }
            },
            Some(RoomPicker::FourthFloor) => {
                match self.game.pick_fourth_floor_room(room, &mut self.store) {
                    RoomPick::Opened(s) => {
                        self.room_picker = None;
                        vec![format!("[MOVE] {}", s.name())]
                    }
                    RoomPick::Dark => vec!["[DOOR] Locked. Try another number.".to_string()],
                    RoomPick::FatalEnding | RoomPick::Ignored => {
                        self.room_picker = None;
                        vec![]
                    }
                }
            }
            None => vec!["[ERROR] No corridor of numbered doors in front of you.".to_string()],
        }
    }

    fn cmd_door(&mut self, parts: &[&str]) -> Vec<String> {
        let door = match parts.get(1).map(|s| s.to_lowercase()).as_deref() {
            Some("ward") | Some("203") => Floor2Door::Ward203Door,
            Some("electric") | Some("electrician") => Floor2Door::ElectricianDoor,
            _ => return vec!["[ERROR] Usage: door <ward|electric>".to_string()],
        };
        match self.game.choose_floor2_door(door, &mut self.store) {
            DoorOutcome::Opened(s) => {
                self.room_picker = None;
                vec![format!("[MOVE] {}", s.name())]
            }
            DoorOutcome::FatalEnding => vec![],
            DoorOutcome::Ignored => {
                vec!["[ERROR] The two doors are off the second-floor landing.".to_string()]
            }
        }
    }

    fn cmd_elevator(&mut self) -> Vec<String> {
        let ride = match self.game.current_scene {
            SceneId::Lobby => self.game.use_lobby_elevator(),
            SceneId::MonitorRoom => self.game.ride_monitor_elevator(&mut self.store),
            _ => return vec!["[ERROR] No elevator in reach.".to_string()],
        };
        match ride {
            ElevatorRide::Descended => {
                self.room_picker = None;
                vec!["[MOVE] The cage drops below street level.".to_string()]
            }
            ElevatorRide::NeedsCode => vec![
                "[HINT] The card wakes the panel. It wants eight digits.".to_string(),
                "[TIP] answer elevator <digits>".to_string(),
            ],
            ElevatorRide::NoPower => {
                vec!["[ELEVATOR] A dead panel behind a dead button.".to_string()]
            }
            ElevatorRide::FatalEnding | ElevatorRide::Ignored => vec![],
        }
    }

    fn cmd_map(&mut self) -> Vec<String> {
        if self.game.current_scene != SceneId::Lobby {
            return vec!["[ERROR] The directory board hangs in the lobby.".to_string()];
        }
        self.game.view_floor_map();
        vec![
            "[HINT] The scrawl reads like a rail fence: split it, re-lace it.".to_string(),
            "[TIP] answer floor <number>".to_string(),
        ]
    }

    fn cmd_note(&mut self) -> Vec<String> {
        if self.game.current_scene != SceneId::Ward717 {
            return vec!["[ERROR] The note lies on the bed in ward 717.".to_string()];
        }
        self.game.read_ward_note();
        vec!["[TIP] flip - there may be more on the back.".to_string()]
    }

    fn cmd_flip(&mut self) -> Vec<String> {
        if self.game.current_scene != SceneId::Ward717 {
            return vec!["[ERROR] Nothing here to turn over.".to_string()];
        }
        self.game.flip_ward_note();
        vec![
            "[HINT] A keyword under a cipher. Vigenère reads that way.".to_string(),
            "[TIP] answer nurse <text>".to_string(),
        ]
    }

    fn cmd_window(&mut self) -> Vec<String> {
        if self.game.current_scene != SceneId::Ward717 {
            return vec!["[ERROR] The courtyard window is in ward 717.".to_string()];
        }
        if self.game.check_ward_window() {
            vec![
                "[HINT] Two shapes, long and short, in runs of five.".to_string(),
                "[TIP] answer monitor <text>".to_string(),
            ]
        } else {
            vec![]
        }
    }

    fn cmd_search(&mut self, parts: &[&str]) -> Vec<String> {
        let area = match parts.get(1).map(|s| s.to_lowercase()).as_deref() {
            Some("table") | Some("under") => SearchArea::UnderOperatingTable,
            Some("tray") | Some("instruments") => SearchArea::InstrumentTray,
            Some("bin") | Some("trash") => SearchArea::CornerTrashBin,
            Some("cabinet") | Some("supply") => SearchArea::SupplyCabinet,
            Some("shelf") | Some("medicine") => SearchArea::MedicineShelf,
            _ => {
                return vec![
                    "[ERROR] Usage: search <table|tray|bin|cabinet|shelf>".to_string(),
                ]
            }
        };
        match self.game.search_operating_area(area) {
            SearchOutcome::Found => vec![format!(
                "[SEARCH] {} of {} places turned over.",
                self.game.search.total(),
                SEARCH_PICKS
            )],
            SearchOutcome::RecordAssembled { .. } => vec![
                "[FOUND] The pages assemble into a nursing record.".to_string(),
                "[TIP] record - read it.".to_string(),
            ],
            SearchOutcome::AlreadySearched => {
                vec!["[SEARCH] You have already turned that over.".to_string()]
            }
            SearchOutcome::SearchOver => {
                vec!["[SEARCH] The room has given what it will.".to_string()]
            }
            SearchOutcome::NotReady => {
                vec!["[WAIT] Not while anyone is still in there.".to_string()]
            }
        }
    }

    fn cmd_record(&mut self) -> Vec<String> {
        if self.game.view_nursing_record() {
            vec![]
        } else {
            vec!["[ERROR] No assembled record in hand.".to_string()]
        }
    }

    fn cmd_key(&mut self) -> Vec<String> {
        if self.game.current_scene != SceneId::ElectricianRoom {
            return vec!["[ERROR] Nothing here worth pocketing.".to_string()];
        }
        if self.game.take_key_203() {
            vec!["[FOUND] The key goes in your coat pocket.".to_string()]
        } else {
            vec!["[TAKE] The nail is bare. You already have it.".to_string()]
        }
    }

    fn cmd_breaker(&mut self) -> Vec<String> {
        if self.game.current_scene != SceneId::ElectricianRoom {
            return vec!["[ERROR] The breaker panel is in the electrician's room.".to_string()];
        }
        if self.game.open_breaker_box() {
            vec![
                "[HINT] Three lines, three terminals, one diagram.".to_string(),
                "[TIP] wire <line-terminal> three times, like: wire 0-1 1-0 2-2".to_string(),
            ]
        } else {
            vec![]
        }
    }

    fn cmd_wire(&mut self, parts: &[&str]) -> Vec<String> {
        if self.game.current_scene != SceneId::ElectricianRoom {
            return vec!["[ERROR] The breaker panel is in the electrician's room.".to_string()];
        }
        let mut pairs = Vec::new();
        for token in &parts[1..] {
            let Some((a, b)) = token.split_once('-') else {
                return vec!["[ERROR] Wires pair as <line>-<terminal>, like 0-1.".to_string()];
            };
            let (Ok(a), Ok(b)) = (a.trim().parse::<u8>(), b.trim().parse::<u8>()) else {
                return vec!["[ERROR] Lines and terminals are numbered 0 to 2.".to_string()];
            };
            pairs.push((a, b));
        }
        match self.game.submit_breaker_wiring(&pairs, &mut self.store) {
            WiringOutcome::Incomplete => {
                vec!["[WIRE] Three pairs or nothing. The box waits.".to_string()]
            }
            WiringOutcome::Correct => {
                vec!["[POWER] The hum comes back. Somewhere a relay closes.".to_string()]
            }
            WiringOutcome::Miswired => vec![],
        }
    }

    fn cmd_chart(&mut self) -> Vec<String> {
        if self.game.current_scene != SceneId::Ward203 {
            return vec!["[ERROR] The dosing chart hangs in ward 203.".to_string()];
        }
        if self.game.examine_dosage_chart() {
            vec![
                "[HINT] The chart fixes the ratio. B is at 10ml; A is yours to pour.".to_string(),
                "[TIP] mix <ml>".to_string(),
            ]
        } else {
            vec!["[CHART] The mix is already made and given.".to_string()]
        }
    }

    fn cmd_mix(&mut self, parts: &[&str]) -> Vec<String> {
        let Some(amount) = parts.get(1) else {
            return vec!["[ERROR] Usage: mix <ml of component A>".to_string()];
        };
        match self.game.mix_medicine(amount, &mut self.store) {
            DosageOutcome::PatientCalmed => {
                vec!["[CALM] The straining stops. Stay with him.".to_string()]
            }
            DosageOutcome::FatalEnding => vec![],
            DosageOutcome::AlreadyDone => {
                vec!["[MIX] The drip is already running right.".to_string()]
            }
            DosageOutcome::Ignored => {
                vec!["[ERROR] The drip stand is at the bedside in ward 203.".to_string()]
            }
        }
    }

    fn cmd_talk(&mut self) -> Vec<String> {
        match self.game.advance_dialogue() {
            Some(_) => vec![],
            None => {
                if self.game.current_scene != SceneId::Ward203 {
                    vec!["[ERROR] There is nobody here to talk to.".to_string()]
                } else if !self.game.patient_awake {
                    vec!["[TALK] He is under too deep to hear you.".to_string()]
                } else {
                    vec!["[TALK] He has told you what he can.".to_string()]
                }
            }
        }
    }

    fn cmd_screen(&mut self) -> Vec<String> {
        if self.game.current_scene != SceneId::MonitorRoom {
            return vec!["[ERROR] The monitor wall is on the third floor.".to_string()];
        }
        self.game.watch_monitor_screen();
        vec!["[HINT] A timestamp and a card. Dates read both ways here.".to_string()]
    }

    fn cmd_safe(&mut self) -> Vec<String> {
        if self.game.current_scene != SceneId::DirectorOffice {
            return vec!["[ERROR] The floor safe sits in the director's office.".to_string()];
        }
        if self.game.examine_safe_contents() {
            vec!["[CLUE] Both finds are in your journal.".to_string()]
        } else {
            vec!["[TIP] answer safe <order> - the wiring under the keypad.".to_string()]
        }
    }

    fn cmd_code(&mut self, parts: &[&str]) -> Vec<String> {
        let Some(code) = parts.get(1) else {
            return vec!["[ERROR] Usage: code <sixteen bits>".to_string()];
        };
        match self.game.enter_underground_code(code, &mut self.store) {
            CodeEntry::Opened => vec![],
            CodeEntry::Incomplete => {
                vec!["[PANEL] Sixteen switches. Fewer are set. It waits.".to_string()]
            }
            CodeEntry::AlreadyOpen => {
                vec!["[PANEL] The way down already stands open.".to_string()]
            }
            CodeEntry::FatalEnding => vec![],
            CodeEntry::Ignored => {
                vec!["[ERROR] The switch panel is in the underground elevator.".to_string()]
            }
        }
    }

    fn cmd_take(&mut self, parts: &[&str]) -> Vec<String> {
        let clue = match parts.get(1).map(|s| s.to_lowercase()).as_deref() {
            Some("project") | Some("code") => BasementClue::ProjectCode,
            Some("name") | Some("patient") => BasementClue::PatientName,
            Some("date") | Some("stamp") => BasementClue::DateStamp,
            _ => return vec!["[ERROR] Usage: take <project|name|date>".to_string()],
        };
        if self.game.collect_basement_clue(clue) {
            vec!["[CLUE] Journal updated.".to_string()]
        } else {
            vec!["[TAKE] Already in your journal, or not in this room.".to_string()]
        }
    }

    fn cmd_password(&mut self, parts: &[&str]) -> Vec<String> {
        let Some(password) = parts.get(1) else {
            return vec!["[ERROR] Usage: password <text>".to_string()];
        };
        if self.game.current_scene != SceneId::Basement {
            return vec!["[ERROR] The workstation hums in the basement.".to_string()];
        }
        if self.game.unlock_basement_computer(password) {
            vec![
                "[ACCESS] The drive opens. Project X-17, all of it.".to_string(),
                "[TIP] answer truth <text> - say what happened here.".to_string(),
            ]
        } else {
            vec!["[DENIED] The screen shakes it off. Wrong passwords cost only time.".to_string()]
        }
    }

    fn cmd_answer(&mut self, parts: &[&str]) -> Vec<String> {
        if parts.len() < 3 {
            return vec![
                "[ERROR] Usage: answer <riddle> <text>".to_string(),
                "[TIP] Riddles: floor, nurse, monitor, safe, elevator, truth".to_string(),
            ];
        }
        let puzzle = match parts[1].to_lowercase().as_str() {
            "floor" => PuzzleId::FloorSelection,
            "nurse" => PuzzleId::NurseCipher,
            "monitor" => PuzzleId::MonitorCipher,
            "safe" => PuzzleId::SafeWiring,
            "elevator" => PuzzleId::ElevatorCode,
            "truth" => PuzzleId::FinalTruth,
            other => return vec![format!("[ERROR] No riddle called '{}'.", other)],
        };
        let text = parts[2..].join(" ");
        match self.game.submit_answer(puzzle, &text, &mut self.rng, &mut self.store) {
            AnswerOutcome::Accepted => vec![format!(
                "[SOLVED] It fits. {} of {} riddles down.",
                self.game.counted_solved(),
                TOTAL_PUZZLES
            )],
            AnswerOutcome::TruthConfirmed => vec![],
            AnswerOutcome::NotYet => {
                vec!["[RIDDLE] Not yet. Pieces are still missing.".to_string()]
            }
            AnswerOutcome::AlreadySolved => {
                vec!["[RIDDLE] That one is already open.".to_string()]
            }
            AnswerOutcome::Rejected { escalated: false } => vec![
                "[WRONG] It does not fit, and the building takes note.".to_string(),
            ],
            AnswerOutcome::Rejected { escalated: true } => vec![],
            AnswerOutcome::Ignored => {
                vec!["[ERROR] That riddle is not answered from here.".to_string()]
            }
        }
    }

    fn cmd_save(&mut self, parts: &[&str]) -> Vec<String> {
        let Some(slot) = parse_slot(parts.get(1).copied()) else {
            return vec!["[ERROR] Usage: save <1|2>".to_string()];
        };
        if !self.game.is_playing() {
            return vec!["[ERROR] The night is over. Nothing left to pin down.".to_string()];
        }
        match save::save_slot(&self.game, &mut self.store, slot) {
            Ok(()) => vec![format!("[SAVE] Night pinned to slot {}.", slot.number())],
            Err(err) => vec![format!("[ERROR] Save failed: {err:#}")],
        }
    }

    fn cmd_load(&mut self, parts: &[&str]) -> Vec<String> {
        let Some(slot) = parse_slot(parts.get(1).copied()) else {
            return vec!["[ERROR] Usage: load <1|2>".to_string()];
        };
        match save::load_slot(&self.store, slot) {
            Some(game) => {
                self.install_game(game);
                vec![format!("[LOAD] Slot {} restored.", slot.number())]
            }
            None => vec![format!("[LOAD] Slot {} is empty or unreadable.", slot.number())],
        }
    }

    fn cmd_slots(&mut self) -> Vec<String> {
        let mut out = vec!["[SAVES] Manual slots:".to_string()];
        for slot in SaveSlot::ALL {
            match save::slot_info(&self.store, slot) {
                Some(info) => out.push(format!(
                    "  slot {} - {} | {} riddles | risk {}% | {}",
                    slot.number(),
                    info.scene,
                    info.solved,
                    info.risk,
                    info.saved_at.format("%Y-%m-%d %H:%M UTC"),
                )),
                None => out.push(format!("  slot {} - empty", slot.number())),
            }
        }
        if save::has_checkpoint(&self.store) {
            out.push("  checkpoint - waiting (resume from the main menu)".to_string());
        }
        out
    }

    // ---- game lifecycle ----------------------------------------------------

    fn start_new_game(&mut self) {
        self.install_game(Game::new());
        self.console.clear();
        self.feed(vec![
            "═══════════════════════════════════════════════════════════".to_string(),
            "[SYSTEM] CASE FILE: PROJECT X-17".to_string(),
            "[SYSTEM] Detective Zhou. Night shift. No backup.".to_string(),
            "═══════════════════════════════════════════════════════════".to_string(),
            "".to_string(),
            "[BRIEFING] A suburban hospital, five years closed, and".to_string(),
            "[BRIEFING] tonight a light is burning on the seventh floor.".to_string(),
            "[BRIEFING] The tip names a buried research program: X-17.".to_string(),
            "".to_string(),
            "[BRIEFING] Get in, find what is left of it, and get out".to_string(),
            "[BRIEFING] before whoever kept the lights on finds you.".to_string(),
            "".to_string(),
            "[TIP] Press SPACE, : or / to enter commands".to_string(),
            "[TIP] Type 'look' to size up a room, 'help' for the list".to_string(),
            "[TIP] Press j for your journal, F5 to quick save".to_string(),
        ]);
    }

    fn resume_checkpoint(&mut self) {
        match save::take_checkpoint(&mut self.store) {
            Some(game) => {
                self.install_game(game);
                self.feed(vec![
                    "[SYSTEM] Back on your feet at the last safe moment.".to_string(),
                    "[TIP] The night remembers what you solved. It does not repeat warnings.".to_string(),
                ]);
            }
            None => {
                self.menu_notice =
                    Some("No checkpoint waiting. The night so far has been kind.".to_string());
            }
        }
    }

    /// Swap in a game and reset everything keyed to the old one
    fn install_game(&mut self, game: Game) {
        self.game = game;
        self.room_picker = None;
        self.now_playing = None;
        self.paused_bgm = None;
        self.ending = None;
        self.checkpoint_waiting = false;
        self.menu_notice = None;
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.current_screen = Screen::Playing;
        self.menu_state.select(Some(0));
        self.pump_engine();
    }

    /// Called once when the player quits. The failure checkpoint only
    /// outlives the session it was written in if the session was killed;
    /// manual slots are never touched.
    pub fn shutdown(&mut self) {
        save::clear_checkpoint(&mut self.store);
    }

    // ---- navigation --------------------------------------------------------

    fn handle_escape(&mut self) {
        match self.current_screen {
            Screen::Playing => self.current_screen = Screen::Paused,
            Screen::Paused => self.current_screen = Screen::Playing,
            Screen::Journal => self.current_screen = Screen::Playing,
            Screen::LoadGame => {
                self.current_screen = Screen::MainMenu;
                self.menu_state.select(Some(0));
                self.menu_notice = None;
            }
            Screen::Ending => {
                self.current_screen = Screen::MainMenu;
                self.menu_state.select(Some(0));
            }
            _ => {}
        }
    }

    fn navigate_up(&mut self) {
        let i = self.menu_state.selected().unwrap_or(0);
        if i > 0 {
            self.menu_state.select(Some(i - 1));
        }
    }

    fn navigate_down(&mut self) {
        let max = match self.current_screen {
            Screen::MainMenu => 4,
            Screen::LoadGame => 1,
            Screen::Journal => self.game.journal.len().saturating_sub(1),
            _ => 0,
        };
        let i = self.menu_state.selected().unwrap_or(0);
        if i < max {
            self.menu_state.select(Some(i + 1));
        }
    }

    fn handle_enter(&mut self) {
        match self.current_screen {
            Screen::MainMenu => match self.menu_state.selected() {
                Some(0) => self.start_new_game(),
                Some(1) => self.resume_checkpoint(),
                Some(2) => {
                    self.current_screen = Screen::LoadGame;
                    self.menu_state.select(Some(0));
                    self.menu_notice = None;
                }
                Some(3) => self.show_help = true,
                Some(4) => self.running = false,
                _ => {}
            },
            Screen::LoadGame => {
                let slot = match self.menu_state.selected() {
                    Some(0) => SaveSlot::One,
                    Some(1) => SaveSlot::Two,
                    _ => return,
                };
                match save::load_slot(&self.store, slot) {
                    Some(game) => {
                        self.install_game(game);
                        self.feed(vec![format!("[LOAD] Slot {} restored.", slot.number())]);
                    }
                    None => {
                        self.menu_notice = Some(format!("Slot {} is empty.", slot.number()));
                    }
                }
            }
            Screen::Ending => {
                self.current_screen = Screen::MainMenu;
                self.menu_state.select(Some(0));
            }
            _ => {}
        }
    }

    // ---- rendering ---------------------------------------------------------

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        self.frame = self.frame.wrapping_add(1);

        match self.current_screen {
            Screen::MainMenu => self.render_main_menu(frame),
            Screen::LoadGame => self.render_load_game(frame),
            Screen::Playing | Screen::Paused => self.render_game(frame),
            Screen::Journal => self.render_journal(frame),
            Screen::Ending => self.render_ending(frame),
        }

        // Overlay help if showing
        if self.show_help {
            self.render_help_overlay(frame);
        }
    }

    fn render_main_menu(&mut self, frame: &mut Frame) {
        let area = frame.area();

        // Background
        frame.render_widget(Clear, area);
        frame.render_widget(
            Block::default().style(Style::default().bg(self.theme.bg)),
            area,
        );

        let menu_height: u16 = 9;

        let menu_items = vec![
            ListItem::new("  ▶ New Investigation"),
            ListItem::new("  ▶ Resume Checkpoint"),
            ListItem::new("  ▶ Load Slot"),
            ListItem::new("  ▶ Help"),
            ListItem::new("  ▶ Quit"),
        ];
        let menu = List::new(menu_items)
            .block(styled_block("Main Menu", &self.theme))
            .highlight_style(
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            )
            .highlight_symbol("→ ");

        if area.height < 30 {
            // Compact mode - just show menu, skip big logo
            let title = Paragraph::new("═══ THE HOSPITAL MYSTERY ═══")
                .style(Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD))
                .alignment(Alignment::Center);
            frame.render_widget(title, Rect::new(0, 1, area.width, 1));

            let subtitle = Paragraph::new("A Detective Zhou Investigation")
                .style(Style::default().fg(self.theme.header))
                .alignment(Alignment::Center);
            frame.render_widget(subtitle, Rect::new(0, 2, area.width, 1));

            let menu_y = (area.height.saturating_sub(menu_height)) / 2;
            let menu_area = Rect::new(
                area.width / 4,
                menu_y.max(4),
                area.width / 2,
                menu_height.min(area.height.saturating_sub(menu_y).saturating_sub(2)),
            );
            frame.render_stateful_widget(menu, menu_area, &mut self.menu_state);

            self.render_menu_notice(frame, area, menu_y.max(4) + menu_height);
            return;
        }

        // Full logo mode for large terminals
        let logo_height = LOGO.lines().count() as u16;
        let total_height = logo_height + menu_height + 2;
        let start_y = area.height.saturating_sub(total_height) / 2;

        // Logo
        let logo_area = Rect::new(
            area.x,
            start_y,
            area.width,
            logo_height.min(area.height.saturating_sub(start_y)),
        );
        let logo = Paragraph::new(LOGO)
            .style(Style::default().fg(self.theme.accent))
            .alignment(Alignment::Center);
        frame.render_widget(logo, logo_area);

        // Menu
        let menu_y = start_y + logo_height + 1;
        let menu_area = Rect::new(
            area.width / 4,
            menu_y.min(area.height.saturating_sub(menu_height).saturating_sub(1)),
            area.width / 2,
            menu_height.min(area.height.saturating_sub(menu_y).saturating_sub(1)),
        );
        frame.render_stateful_widget(menu, menu_area, &mut self.menu_state);

        self.render_menu_notice(frame, area, menu_y + menu_height);
    }

    /// Footer line plus whatever notice the last menu action left
    fn render_menu_notice(&self, frame: &mut Frame, area: Rect, notice_y: u16) {
        if let Some(notice) = &self.menu_notice {
            if notice_y + 1 < area.height {
                let line = Paragraph::new(notice.as_str())
                    .style(Style::default().fg(self.theme.warning))
                    .alignment(Alignment::Center);
                frame.render_widget(line, Rect::new(0, notice_y, area.width, 1));
            }
        }
        if area.height > 1 {
            let footer = Paragraph::new("Press ? for help | q to quit")
                .style(Style::default().fg(self.theme.border))
                .alignment(Alignment::Center);
            frame.render_widget(
                footer,
                Rect::new(0, area.height.saturating_sub(1), area.width, 1),
            );
        }
    }

    fn render_load_game(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Clear, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(2)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        // Title
        let title = Paragraph::new("LOAD A SAVED NIGHT")
            .style(Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        frame.render_widget(title, chunks[0]);

        // Slot summaries
        let items: Vec<ListItem> = SaveSlot::ALL
            .iter()
            .map(|slot| {
                let lines = match save::slot_info(&self.store, *slot) {
                    Some(info) => vec![
                        Line::from(vec![Span::styled(
                            format!("  Slot {} - {}", slot.number(), info.scene),
                            Style::default().fg(Color::Cyan),
                        )]),
                        Line::from(vec![Span::styled(
                            format!(
                                "    {} riddles | risk {}% | saved {}",
                                info.solved,
                                info.risk,
                                info.saved_at.format("%Y-%m-%d %H:%M UTC")
                            ),
                            Style::default().fg(Color::DarkGray),
                        )]),
                    ],
                    None => vec![
                        Line::from(vec![Span::styled(
                            format!("  Slot {} - empty", slot.number()),
                            Style::default().fg(Color::DarkGray),
                        )]),
                        Line::from(""),
                    ],
                };
                ListItem::new(lines)
            })
            .collect();

        let menu = List::new(items)
            .block(styled_block("Two Slots", &self.theme))
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
            .highlight_symbol("→ ");
        frame.render_stateful_widget(menu, chunks[1], &mut self.menu_state);

        // Footer and notices
        let footer_text = if let Some(notice) = &self.menu_notice {
            notice.clone()
        } else {
            "↑/↓ to select, Enter to load, Esc to go back".to_string()
        };
        let footer = Paragraph::new(footer_text)
            .style(Style::default().fg(self.theme.border))
            .alignment(Alignment::Center);
        frame.render_widget(footer, chunks[2]);
    }

    fn render_game(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let layout = create_main_layout(area);

        // Header
        self.render_header(frame, layout[0]);

        // Content area
        let content_layout = create_content_layout(layout[1]);

        // Side panel (status/actions/journal)
        self.render_side_panel(frame, content_layout[0]);

        // Main area
        let main_layout = create_main_area_layout(content_layout[1]);

        // Narration, console, input line
        self.render_narration(frame, main_layout[0]);
        self.render_console(frame, main_layout[1]);
        self.render_input(frame, main_layout[2]);

        // Status bar
        self.render_status_bar(frame, layout[2]);

        // Pause overlay
        if self.current_screen == Screen::Paused {
            self.render_pause_overlay(frame);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let header_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(20),
                Constraint::Min(20),
                Constraint::Length(28),
            ])
            .split(area);

        // Logo
        let logo = Paragraph::new(SMALL_LOGO)
            .style(Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(self.theme.border)));
        frame.render_widget(logo, header_layout[0]);

        // Scene name
        let title = Paragraph::new(self.game.current_scene.name())
            .style(Style::default().fg(self.theme.warning))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(self.theme.border)));
        frame.render_widget(title, header_layout[1]);

        // Risk and whatever is on the speakers
        let risk = self.game.risk_level();
        let right_text = format!(
            " {} {}% | ♪ {} ",
            risk.symbol(),
            self.game.detection_risk,
            self.now_playing.as_deref().unwrap_or("silence"),
        );
        let right = Paragraph::new(right_text)
            .style(Style::default().fg(crate::tui::risk_color(&risk)))
            .alignment(Alignment::Right)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(self.theme.border)));
        frame.render_widget(right, header_layout[2]);
    }

    fn render_side_panel(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(7),   // Detective status
                Constraint::Min(8),      // Context actions
                Constraint::Length(6),   // Journal summary
            ])
            .split(area);

        // Detective status
        let status_text = vec![
            Line::from(vec![
                Span::raw("Riddles: "),
                Span::styled(
                    format!("{}/{}", self.game.counted_solved(), TOTAL_PUZZLES),
                    Style::default().fg(Color::Cyan),
                ),
            ]),
            Line::from(vec![
                Span::raw("Clues:   "),
                Span::styled(
                    format!("{}", self.game.journal.len()),
                    Style::default().fg(Color::Green),
                ),
            ]),
        ];
        let status = Paragraph::new(status_text)
            .block(styled_block("Detective Zhou", &self.theme));
        frame.render_widget(status, chunks[0]);

        // Risk gauge inside the status block, under the two lines
        if chunks[0].width > 6 && chunks[0].height >= 6 {
            let gauge_area = Rect::new(
                chunks[0].x + 2,
                chunks[0].y + 3,
                chunks[0].width - 4,
                2,
            );
            frame.render_widget(
                RiskGauge::new("Risk", self.game.detection_risk, 100)
                    .danger_threshold(RISK_THRESHOLD),
                gauge_area,
            );
        }

        // Context actions
        let actions: Vec<ListItem> = scene_hints(self.game.current_scene)
            .into_iter()
            .map(|hint| ListItem::new(format!("  {}", hint)))
            .collect();
        let action_list = List::new(actions)
            .block(styled_block("At Hand", &self.theme));
        frame.render_widget(action_list, chunks[1]);

        // Journal summary
        let last_clue = self
            .game
            .journal
            .entries
            .last()
            .map(|c| c.brief())
            .unwrap_or_else(|| "Nothing yet.".to_string());
        let journal_text = vec![
            Line::from(vec![
                Span::raw("Latest: "),
                Span::styled(last_clue, Style::default().fg(Color::Green)),
            ]),
            Line::from(""),
            Line::from(vec![Span::styled(
                "Press j for the journal",
                Style::default().fg(Color::DarkGray),
            )]),
        ];
        let journal = Paragraph::new(journal_text)
            .block(styled_block("Journal", &self.theme))
            .wrap(Wrap { trim: true });
        frame.render_widget(journal, chunks[2]);
    }

    fn render_narration(&self, frame: &mut Frame, area: Rect) {
        let visible_lines = area.height.saturating_sub(2) as usize;
        let start = self.game.log.len().saturating_sub(visible_lines);
        let lines: Vec<Line> = self.game.log[start..]
            .iter()
            .map(|line| Line::from(Span::styled(line.as_str(), Style::default().fg(self.theme.fg))))
            .collect();

        let narration = Paragraph::new(lines)
            .block(styled_block("The Night", &self.theme))
            .wrap(Wrap { trim: false });
        frame.render_widget(narration, area);
    }

    fn render_console(&self, frame: &mut Frame, area: Rect) {
        let visible_lines = area.height.saturating_sub(2) as usize;
        let start = self.console.len().saturating_sub(visible_lines);
        let lines: Vec<Line> = self.console[start..].iter().map(|line| {
            // Color code different types of output
            let (color, bold) = if line.starts_with("[ERROR]") || line.starts_with("[DENIED]") {
                (Color::Red, true)
            } else if line.starts_with("[WRONG]") || line.starts_with("[LOCKED]") {
                (Color::Red, false)
            } else if line.starts_with("[SYSTEM]") {
                (Color::Cyan, false)
            } else if line.starts_with("[BRIEFING]") {
                (Color::Yellow, false)
            } else if line.starts_with("[TIP]") || line.starts_with("[HINT]") || line.starts_with("[AUDIO]") {
                (Color::DarkGray, false)
            } else if line.starts_with("[SOLVED]")
                || line.starts_with("[FOUND]")
                || line.starts_with("[POWER]")
                || line.starts_with("[ACCESS]")
                || line.starts_with("[CALM]")
                || line.starts_with("[CLUE]")
            {
                (Color::Green, true)
            } else if line.starts_with("[SAVE]") || line.starts_with("[LOAD]") || line.starts_with("[SAVES]") {
                (Color::Blue, false)
            } else if line.starts_with("[MOVE]") {
                (Color::White, true)
            } else if line.starts_with("[WAIT]") {
                (Color::Yellow, true)
            } else if line.starts_with("[LOOK]") || line.starts_with("[JOURNAL]") {
                (Color::Magenta, false)
            } else if line.starts_with("─") || line.starts_with("═") || line.starts_with("╔")
                || line.starts_with("║") || line.starts_with("╚") || line.starts_with("╠")
                || line.starts_with("┌") || line.starts_with("│") || line.starts_with("└")
                || line.starts_with("├")
            {
                (Color::DarkGray, false)
            } else {
                (Color::White, false)
            };

            let style = if bold {
                Style::default().fg(color).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(color)
            };
            Line::from(Span::styled(line.as_str(), style))
        }).collect();

        let console = Paragraph::new(lines)
            .block(styled_block("Console", &self.theme))
            .wrap(Wrap { trim: false });
        frame.render_widget(console, area);
    }

    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let input_style = if self.input_mode == InputMode::Command {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let prompt = if self.input_mode == InputMode::Command {
            format!("zhou@hospital:~$ {}_", self.input_buffer)
        } else {
            "zhou@hospital:~$ [Press : or / to type a command]".to_string()
        };

        let input = Paragraph::new(prompt)
            .style(input_style)
            .block(Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(if self.input_mode == InputMode::Command {
                    Color::Green
                } else {
                    self.theme.border
                }))
                .title(" Command "));
        frame.render_widget(input, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let status_text = format!(
            " Detective Zhou | {} | Clues: {} | Risk: {}% | ? for help ",
            self.game.current_scene.name(),
            self.game.journal.len(),
            self.game.detection_risk,
        );
        let status = Paragraph::new(status_text)
            .style(Style::default().fg(self.theme.fg).bg(Color::DarkGray));
        frame.render_widget(status, area);

        // When the score crosses the threshold the bar carries a pulse
        if self.game.detection_risk >= RISK_THRESHOLD && area.width > 46 {
            let alert_area = Rect::new(area.x + area.width - 44, area.y, 43, 1);
            frame.render_widget(
                AlertLine::new("RISK CRITICAL - they are hunting", self.game.risk_level())
                    .blink(self.frame % 8 < 4),
                alert_area,
            );
        }
    }

    fn render_journal(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Clear, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .margin(1)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Percentage(60),
            ])
            .split(area);

        // Clue list
        let items: Vec<ListItem> = if self.game.journal.is_empty() {
            vec![ListItem::new("  The journal is empty.")]
        } else {
            self.game
                .journal
                .entries
                .iter()
                .map(|clue| ListItem::new(format!("  {}", clue.brief())))
                .collect()
        };
        let list = List::new(items)
            .block(styled_block("Clue Journal", &self.theme))
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
            .highlight_symbol("→ ");
        frame.render_stateful_widget(list, chunks[0], &mut self.menu_state);

        // Detail of the selected clue
        let detail: Vec<Line> = match self
            .menu_state
            .selected()
            .and_then(|i| self.game.journal.entries.get(i))
        {
            Some(clue) => vec![
                Line::from(vec![Span::styled(
                    clue.kind.title(),
                    Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD),
                )]),
                Line::from(""),
                Line::from(clue.kind.detail()),
                Line::from(""),
                Line::from(vec![Span::styled(
                    format!("Found in {} at {}", clue.found_in, clue.found_at.format("%H:%M:%S")),
                    Style::default().fg(Color::DarkGray),
                )]),
            ],
            None => vec![Line::from("Nothing recorded yet. Walk, look, and listen.")],
        };
        let panel = Paragraph::new(detail)
            .block(styled_block("Detail", &self.theme))
            .wrap(Wrap { trim: true });
        frame.render_widget(panel, chunks[1]);

        // Footer
        if area.height > 1 {
            let footer = Paragraph::new("↑/↓ to browse, Esc to close")
                .style(Style::default().fg(self.theme.border))
                .alignment(Alignment::Center);
            frame.render_widget(
                footer,
                Rect::new(0, area.height.saturating_sub(1), area.width, 1),
            );
        }
    }

    fn render_ending(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Clear, area);

        let Some(ending) = self.ending else {
            return;
        };

        let box_width = 64.min(area.width.saturating_sub(2));
        let inner = box_width.saturating_sub(6) as usize;

        let mut content = vec![String::new()];
        content.extend(wrap_text(ending.epitaph(), inner));
        content.push(String::new());
        content.push(format!(
            "Riddles solved: {} of {}",
            self.game.counted_solved(),
            TOTAL_PUZZLES
        ));
        content.push(format!("Clues journaled: {}", self.game.journal.len()));
        content.push(format!("Final detection risk: {}%", self.game.detection_risk));
        if self.checkpoint_waiting {
            content.push(String::new());
            content.push("A checkpoint held. Resume it from the main menu.".to_string());
        }
        content.push(String::new());
        content.push("Press Enter to return to the main menu.".to_string());

        let box_height = (content.len() as u16 + 2).min(area.height.saturating_sub(2));
        let box_area = Rect::new(
            (area.width.saturating_sub(box_width)) / 2,
            (area.height.saturating_sub(box_height)) / 2,
            box_width,
            box_height,
        );

        let border = if ending.is_success() {
            Color::Green
        } else {
            Color::Red
        };
        frame.render_widget(
            EndingBox::new(ending.title())
                .content(content)
                .border_color(border),
            box_area,
        );
    }

    fn render_pause_overlay(&self, frame: &mut Frame) {
        let area = frame.area();
        let popup_width = 40.min(area.width);
        let popup_height = 10.min(area.height);
        let popup_area = Rect::new(
            (area.width - popup_width) / 2,
            (area.height - popup_height) / 2,
            popup_width,
            popup_height,
        );

        frame.render_widget(Clear, popup_area);

        let pause_text = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("PAUSED", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            ]),
            Line::from(""),
            Line::from("The hospital waits."),
            Line::from(""),
            Line::from("Press ESC to resume"),
            Line::from("Press Q to quit to menu"),
        ];

        let pause = Paragraph::new(pause_text)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow))
                    .title(" Held Breath ")
            );
        frame.render_widget(pause, popup_area);
    }

    fn render_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();
        let popup_width = 70.min(area.width.saturating_sub(4));
        let popup_height = 28.min(area.height.saturating_sub(2));
        let popup_area = Rect::new(
            (area.width - popup_width) / 2,
            (area.height - popup_height) / 2,
            popup_width,
            popup_height,
        );

        frame.render_widget(Clear, popup_area);

        let help = Paragraph::new(HELP_TEXT)
            .style(Style::default().fg(self.theme.fg))
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(self.theme.accent)));
        frame.render_widget(help, popup_area);
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// What a room offers, for the side panel and `look`
fn scene_hints(scene: SceneId) -> Vec<&'static str> {
    match scene {
        SceneId::Lobby => vec![
            "map - the defaced directory",
            "answer floor <n> - read it right",
            "floor <n> - punch a floor",
            "elevator - the lobby cage",
        ],
        SceneId::Ward717 => vec![
            "note - the strip on the bed",
            "flip - turn it over",
            "answer nurse <text>",
            "window - the courtyard glass",
            "floor <n> - the fire exit",
        ],
        SceneId::OperatingRoom => vec![
            "search <table|tray|bin|cabinet|shelf>",
            "record - read what assembles",
            "floor <n> - the fire exit",
        ],
        SceneId::Floor2Landing => vec![
            "door <ward|electric>",
            "floor <n> - the fire exit",
        ],
        SceneId::Floor3Landing => vec![
            "go monitor - if its riddle is down",
            "go office - if its riddle fell too",
        ],
        SceneId::MonitorRoom => vec![
            "screen - the one live monitor",
            "answer elevator <digits>",
            "elevator - behind the racks",
        ],
        SceneId::DirectorOffice => vec![
            "safe - the floor safe",
            "answer safe <order>",
        ],
        SceneId::ElectricianRoom => vec![
            "key - the nail by the door",
            "breaker - the panel",
            "wire <a-b> <a-b> <a-b>",
            "go floor3 - the stairs up",
        ],
        SceneId::Ward203 => vec![
            "chart - the dosing chart",
            "mix <ml> - finish the mix",
            "talk - the man in the bed",
        ],
        SceneId::UndergroundElevator => vec![
            "code <sixteen bits>",
        ],
        SceneId::Basement => vec![
            "take <project|name|date>",
            "password <text> - the workstation",
            "answer truth <text>",
        ],
    }
}

/// Names the detective would use for rooms
fn parse_place(token: &str) -> Option<SceneId> {
    match token.to_lowercase().as_str() {
        "lobby" => Some(SceneId::Lobby),
        "717" | "ward717" => Some(SceneId::Ward717),
        "203" | "ward203" => Some(SceneId::Ward203),
        "operating" | "or" | "theatre" => Some(SceneId::OperatingRoom),
        "landing" | "floor2" => Some(SceneId::Floor2Landing),
        "floor3" | "stairs" => Some(SceneId::Floor3Landing),
        "monitor" => Some(SceneId::MonitorRoom),
        "office" | "director" => Some(SceneId::DirectorOffice),
        "electrician" => Some(SceneId::ElectricianRoom),
        "elevator" | "underground" => Some(SceneId::UndergroundElevator),
        "basement" => Some(SceneId::Basement),
        _ => None,
    }
}

fn parse_slot(token: Option<&str>) -> Option<SaveSlot> {
    match token {
        Some("1") => Some(SaveSlot::One),
        Some("2") => Some(SaveSlot::Two),
        _ => None,
    }
}

/// Greedy word wrap for the ending card
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(8);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + word.len() + 1 > width {
            lines.push(std::mem::take(&mut current));
        }
        if current.is_empty() {
            current.push_str(word);
        } else {
            current.push(' ');
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
