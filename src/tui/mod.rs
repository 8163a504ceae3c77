//! Terminal User Interface
//!
//! Console front end for the hospital investigation, built on ratatui

pub mod app;
pub mod widgets;

pub use app::App;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders},
};
use crate::data::RiskLevel;

/// Color scheme for the game
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub accent: Color,
    pub alert: Color,
    pub success: Color,
    pub warning: Color,
    pub info: Color,
    pub border: Color,
    pub header: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg: Color::Black,
            fg: Color::White,
            accent: Color::Cyan,
            alert: Color::Red,
            success: Color::Green,
            warning: Color::Yellow,
            info: Color::Blue,
            border: Color::DarkGray,
            header: Color::Magenta,
        }
    }
}

/// Get color for a detection-risk band
pub fn risk_color(level: &RiskLevel) -> Color {
    match level {
        RiskLevel::Calm => Color::Green,
        RiskLevel::Uneasy => Color::Yellow,
        RiskLevel::Exposed => Color::Red,
        RiskLevel::Hunted => Color::Magenta,
    }
}

/// Create a styled border block
pub fn styled_block<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
}

/// ASCII art logo
pub const LOGO: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║                                                                  ║
║      ██╗  ██╗            ██╗   ███████╗                          ║
║      ╚██╗██╔╝           ███║   ╚════██║                          ║
║       ╚███╔╝  █████╗    ╚██║       ██╔╝                          ║
║       ██╔██╗  ╚════╝     ██║      ██╔╝                           ║
║      ██╔╝ ██╗            ██║     ██╔╝                            ║
║      ╚═╝  ╚═╝            ╚═╝     ╚═╝                             ║
║                                                                  ║
║          T H E   H O S P I T A L   M Y S T E R Y                 ║
║                                                                  ║
║            A Detective Zhou Investigation                        ║
╚══════════════════════════════════════════════════════════════════╝
"#;

/// Smaller logo for header
pub const SMALL_LOGO: &str = " HOSPITAL MYSTERY ";

/// Help text
pub const HELP_TEXT: &str = r#"
╔═══════════════════════════════════════════════════════════════╗
║                       CONTROLS                                ║
╠═══════════════════════════════════════════════════════════════╣
║  ↑/↓  Navigate menus/lists                                    ║
║  Enter Select option / Confirm                                ║
║  Esc   Go back / Pause                                        ║
║  ?     Toggle this help                                       ║
║  q     Quit (from main menu)                                  ║
╠═══════════════════════════════════════════════════════════════╣
║                      QUICK ACTIONS                            ║
╠═══════════════════════════════════════════════════════════════╣
║  : / or SPACE   Enter command mode                            ║
║  j     Open the clue journal                                  ║
║  F5    Quick save (slot 1)                                    ║
║  F9    Quick load (slot 1)                                    ║
╠═══════════════════════════════════════════════════════════════╣
║                      COMMANDS                                 ║
╠═══════════════════════════════════════════════════════════════╣
║  look              What is here and what can be done          ║
║  go <place>        Move between rooms                         ║
║  floor <n>         Punch a floor on the map or stair panel    ║
║  answer <riddle> <text>   Try a cipher or code answer         ║
║  search <area>     Turn over part of the operating room       ║
║  status / journal / save <1|2> / load <1|2> / help            ║
╚═══════════════════════════════════════════════════════════════╝
"#;

/// Create the main layout
pub fn create_main_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),   // Header
            Constraint::Min(10),     // Main content
            Constraint::Length(1),   // Status bar
        ])
        .split(area)
        .to_vec()
}

/// Create the game content layout (left panel + main area)
pub fn create_content_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(28),  // Side panel
            Constraint::Percentage(72),  // Main area
        ])
        .split(area)
        .to_vec()
}

/// Create the main area layout (narration + console + input)
pub fn create_main_area_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),      // Narration
            Constraint::Length(8),   // Console feedback
            Constraint::Length(3),   // Input line
        ])
        .split(area)
        .to_vec()
}
