// Screen layout: panel arrangement and sizing.
//
// Every page shares the same frame:
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Main Panel (page content)                         |
// +--------------------------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+
//
// Pages subdivide the main panel themselves. The minimum terminal size is
// checked once at startup so a missing/too-small surface fails fast instead
// of rendering garbage.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Smallest terminal the dashboard renders legibly on.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 16;

/// Resolved screen areas shared by all pages.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: page tabs and the current notice.
    pub status_bar: Rect,
    /// Page content area.
    pub main: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Build the shared frame layout from the available terminal area.
pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(10),   // main panel
            Constraint::Length(1), // help bar
        ])
        .split(area);

    AppLayout {
        status_bar: vertical[0],
        main: vertical[1],
        help_bar: vertical[2],
    }
}

/// Whether a terminal of the given size can host the dashboard.
pub fn size_is_supported(width: u16, height: u16) -> bool {
    width >= MIN_WIDTH && height >= MIN_HEIGHT
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
