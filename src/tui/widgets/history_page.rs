// History page: the roll list with its season filter.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;

use crate::api::types::{Roll, Season};
use crate::format::format_date;
use crate::tui::ViewState;

/// Marker appended to list entries that already carry enrichment data.
pub const TMDB_MARKER: &str = "✓ TMDB";

/// Human-readable label for the current season filter.
pub fn filter_label(filter: Option<i64>, seasons: &[Season]) -> String {
    match filter {
        None => "All seasons".to_string(),
        Some(id) => match seasons.iter().find(|s| s.id == id) {
            Some(season) if season.is_active => format!("{} (Active)", season.name),
            Some(season) => season.name.clone(),
            None => format!("Season {id}"),
        },
    }
}

/// One list entry: date, movie, participant, and the enrichment marker.
pub fn roll_item_line(roll: &Roll, selected: bool) -> Line<'static> {
    let marker = if selected { "▸ " } else { "  " };
    let mut spans = vec![
        Span::raw(marker),
        Span::styled(
            format!("{:<12}", format_date(&roll.roll_date)),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            roll.movie_title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  ({})", roll.participant_name)),
    ];
    if roll.tmdb_data.is_some() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(TMDB_MARKER, Style::default().fg(Color::Green)));
    }
    Line::from(spans)
}

/// Render the history page: filter line on top, roll list below.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(4)])
        .split(area);

    let filter_line = Line::from(vec![
        Span::raw(" Filter: "),
        Span::styled(
            filter_label(state.season_filter, &state.seasons),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled("  (f cycles)", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(filter_line), sections[0]);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Roll History ({}) ", state.rolls.len()));

    if state.rolls.is_empty() {
        let paragraph = Paragraph::new("  No rolls found.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, sections[1]);
        return;
    }

    // Window the list so the cursor stays visible.
    let visible_rows = (sections[1].height as usize).saturating_sub(2);
    let skip = state
        .roll_cursor
        .saturating_sub(visible_rows.saturating_sub(1));

    let items: Vec<ListItem> = state
        .rolls
        .iter()
        .enumerate()
        .skip(skip)
        .take(visible_rows.max(1))
        .map(|(idx, roll)| ListItem::new(roll_item_line(roll, idx == state.roll_cursor)))
        .collect();

    frame.render_widget(List::new(items).block(block), sections[1]);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::TmdbData;

    fn season(id: i64, name: &str, is_active: bool) -> Season {
        Season {
            id,
            name: name.into(),
            spreadsheet_tab: "General".into(),
            is_active,
            start_date: None,
            end_date: None,
            created_at: None,
        }
    }

    fn roll(id: i64, enriched: bool) -> Roll {
        Roll {
            id,
            season_id: Some(3),
            movie_title: "Alien".into(),
            participant_name: "Bob".into(),
            roll_date: "2024-02-10T20:00:00".into(),
            notes: None,
            tmdb_id: None,
            tmdb_data: enriched.then(|| TmdbData {
                tmdb_id: Some(348),
                title: "Alien".into(),
                overview: None,
                release_date: None,
                poster_url: None,
                backdrop_url: None,
                vote_average: None,
                runtime: None,
                genres: vec![],
            }),
        }
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn filter_label_all_seasons_when_unset() {
        assert_eq!(filter_label(None, &[]), "All seasons");
    }

    #[test]
    fn filter_label_marks_active_season() {
        let seasons = vec![season(1, "Fall", false), season(3, "Winter", true)];
        assert_eq!(filter_label(Some(3), &seasons), "Winter (Active)");
        assert_eq!(filter_label(Some(1), &seasons), "Fall");
    }

    #[test]
    fn filter_label_degrades_for_unknown_season() {
        assert_eq!(filter_label(Some(9), &[]), "Season 9");
    }

    #[test]
    fn item_line_carries_movie_participant_and_date() {
        let text = line_text(&roll_item_line(&roll(1, false), false));
        assert!(text.contains("Alien"));
        assert!(text.contains("(Bob)"));
        assert!(text.contains("Feb 10, 2024"));
        assert!(!text.contains(TMDB_MARKER));
    }

    #[test]
    fn item_line_marks_enriched_rolls() {
        let text = line_text(&roll_item_line(&roll(1, true), false));
        assert!(text.contains(TMDB_MARKER));
    }

    #[test]
    fn render_does_not_panic_empty_and_populated() {
        let backend = ratatui::backend::TestBackend::new(80, 24);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
        state.rolls = vec![roll(1, true), roll(2, false)];
        state.roll_cursor = 1;
        state.seasons = vec![season(3, "Winter", true)];
        state.season_filter = Some(3);
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
