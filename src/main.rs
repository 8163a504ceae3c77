//! Hospital Mystery: The Project X-17 Investigation
//!
//! A text adventure where Detective Zhou slips into an abandoned
//! suburban hospital after dark and follows a missing-persons case
//! down to whatever Project X-17 left behind.

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use hospital_mystery::tui::App;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::fs::File;
use std::io::{self, stdout};
use tracing_subscriber::EnvFilter;

fn main() -> io::Result<()> {
    // Logs go to a file; stdout belongs to the terminal UI.
    if let Ok(file) = File::create("hospital-mystery.log") {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("hospital_mystery=info")),
            )
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app
    let mut app = App::new();

    // Main loop
    while app.running {
        // Draw
        terminal.draw(|frame| {
            app.render(frame);
        })?;

        // Handle input
        if !app.handle_input()? {
            break;
        }

        // Tick sequences and drain engine events
        app.advance();
    }

    // A quit through the menu discards the failure checkpoint
    app.shutdown();

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  The night at the hospital is over.                    ║");
    println!("║                                                        ║");
    println!("║  Some case files never really close.                   ║");
    println!("╚════════════════════════════════════════════════════════╝\n");

    Ok(())
}
