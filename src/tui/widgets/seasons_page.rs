// Seasons page: the season directory rendered as a card list.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::api::types::Season;
use crate::format::format_date;
use crate::tui::ViewState;

/// Badge text appended to the active season's title line.
pub const ACTIVE_BADGE: &str = "[Active]";

/// Build one season card.
///
/// The active season gets the badge and no "set active" action; every card
/// offers editing.
pub fn season_card_lines(season: &Season, selected: bool) -> Vec<Line<'static>> {
    let marker = if selected { "▸ " } else { "  " };
    let mut title = vec![Span::styled(
        format!("{marker}{}", season.name),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if season.is_active {
        title.push(Span::raw(" "));
        title.push(Span::styled(
            ACTIVE_BADGE,
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ));
    }

    let mut lines = vec![
        Line::from(title),
        Line::from(format!("    Spreadsheet Tab: {}", season.spreadsheet_tab)),
    ];
    if let Some(ref created) = season.created_at {
        lines.push(Line::from(format!("    Created: {}", format_date(created))));
    }
    if let Some(ref start) = season.start_date {
        lines.push(Line::from(format!("    Started: {}", format_date(start))));
    }
    if let Some(ref end) = season.end_date {
        lines.push(Line::from(format!("    Ended: {}", format_date(end))));
    }

    let actions = if season.is_active {
        "    e:Edit"
    } else {
        "    e:Edit  a:Set Active"
    };
    lines.push(Line::from(Span::styled(
        actions,
        Style::default().fg(Color::DarkGray),
    )));

    lines
}

/// Count how many rendered cards carry the active badge. The invariant "at
/// most one active season" is server-owned; this is what the client shows.
pub fn active_badge_count(seasons: &[Season]) -> usize {
    seasons
        .iter()
        .flat_map(|s| season_card_lines(s, false))
        .filter(|line| {
            line.spans
                .iter()
                .any(|span| span.content.as_ref() == ACTIVE_BADGE)
        })
        .count()
}

/// Render the seasons page.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Seasons ({}) ", state.seasons.len()));

    if state.seasons.is_empty() {
        let paragraph = Paragraph::new("  No seasons found. Create your first season! (n)")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let mut lines = Vec::new();
    for (idx, season) in state.seasons.iter().enumerate() {
        lines.extend(season_card_lines(season, idx == state.season_cursor));
        lines.push(Line::from(""));
    }

    // Keep the selected card in view: skip whole cards above the cursor
    // when the list outgrows the panel.
    let visible_rows = (area.height as usize).saturating_sub(2);
    let mut skip_lines = 0;
    if lines.len() > visible_rows {
        let per_card = lines.len() / state.seasons.len().max(1);
        let cursor_top = state.season_cursor * per_card;
        if cursor_top + per_card > visible_rows {
            skip_lines = cursor_top + per_card - visible_rows;
        }
    }

    let visible: Vec<Line> = lines.into_iter().skip(skip_lines).collect();
    let paragraph = Paragraph::new(visible).block(block);
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
