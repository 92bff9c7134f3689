// Roll page: active season info, eligible participants, selection mode,
// roster, and the roll result with its enrichment block.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::api::types::{RollOutcome, Season, TmdbData};
use crate::tui::widgets::roll_details::movie_details_lines;
use crate::tui::{RollMode, ViewState};

/// Label of the roll trigger; swapped while a roll request is outstanding.
pub fn roll_trigger_label(in_flight: bool) -> &'static str {
    if in_flight {
        "Rolling..."
    } else {
        "Roll (Enter)"
    }
}

/// Label of the enrichment trigger under the roll result.
pub fn enrich_label(in_flight: bool) -> &'static str {
    if in_flight {
        "Fetching..."
    } else {
        "Fetch Movie Details from TMDB"
    }
}

/// Season info block.
pub fn season_info_lines(season: &Option<Season>) -> Vec<Line<'static>> {
    match season {
        Some(s) => vec![
            Line::from(Span::styled(
                format!("Current Season: {}", s.name),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("Spreadsheet Tab: {}", s.spreadsheet_tab)),
        ],
        None => vec![Line::from(Span::styled(
            "No active season found. Create one on the Seasons page (2).",
            Style::default().fg(Color::Red),
        ))],
    }
}

/// Eligible participants summary.
pub fn eligible_lines(eligible: &[String], count: usize) -> Vec<Line<'static>> {
    if eligible.is_empty() {
        vec![Line::from(Span::styled(
            "No eligible participants remaining this season!",
            Style::default().fg(Color::Yellow),
        ))]
    } else {
        vec![
            Line::from(Span::styled(
                format!("Eligible Participants ({count})"),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(eligible.join(", ")),
        ]
    }
}

/// The participant checkbox list (custom mode) or the automatic-mode note.
pub fn selection_lines(
    mode: RollMode,
    eligible: &[String],
    checked: &[bool],
    cursor: usize,
) -> Vec<Line<'static>> {
    match mode {
        RollMode::Automatic => vec![
            Line::from("Automatic: the server picks from all"),
            Line::from("eligible participants."),
            Line::from(""),
            Line::from(Span::styled(
                "m switches to custom selection",
                Style::default().fg(Color::DarkGray),
            )),
        ],
        RollMode::Custom => {
            if eligible.is_empty() {
                return vec![Line::from(Span::styled(
                    "Nobody to select.",
                    Style::default().fg(Color::DarkGray),
                ))];
            }
            eligible
                .iter()
                .enumerate()
                .map(|(idx, name)| {
                    let ticked = checked.get(idx).copied().unwrap_or(false);
                    let box_mark = if ticked { "[x]" } else { "[ ]" };
                    let pointer = if idx == cursor { "▸" } else { " " };
                    let style = if ticked {
                        Style::default().fg(Color::Green)
                    } else {
                        Style::default()
                    };
                    Line::from(Span::styled(
                        format!("{pointer} {box_mark} {name}"),
                        style,
                    ))
                })
                .collect()
        }
    }
}

/// Season roster block.
pub fn roster_lines(roster: &[String]) -> Vec<Line<'static>> {
    if roster.is_empty() {
        vec![Line::from(Span::styled(
            "No one selected yet",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        roster
            .iter()
            .map(|name| Line::from(format!("• {name}")))
            .collect()
    }
}

/// Roll result block, with the enrichment block underneath once fetched.
pub fn result_lines(
    result: &RollOutcome,
    movie_details: Option<&TmdbData>,
    enrich_in_flight: bool,
) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            format!("Selected: {}", result.participant),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("\"{}\"", result.movie),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
    ];

    match movie_details {
        Some(data) => {
            lines.push(Line::from(""));
            lines.extend(movie_details_lines(data));
        }
        None => {
            lines.push(Line::from(Span::styled(
                format!("e: {}", enrich_label(enrich_in_flight)),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    lines
}

/// Render the roll page.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let result_height = if state.roll_result.is_some() { 12 } else { 0 };
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // season info
            Constraint::Length(3),             // eligible summary
            Constraint::Min(6),                // selection | roster
            Constraint::Length(result_height), // roll result
        ])
        .split(area);

    frame.render_widget(
        Paragraph::new(season_info_lines(&state.active_season)).block(
            Block::default().borders(Borders::ALL).title(" Season "),
        ),
        sections[0],
    );

    frame.render_widget(
        Paragraph::new(eligible_lines(&state.eligible, state.eligible_count)).block(
            Block::default().borders(Borders::ALL).title(" Eligible "),
        ),
        sections[1],
    );

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(sections[2]);

    let mode_label = match state.roll_mode {
        RollMode::Automatic => "automatic",
        RollMode::Custom => "custom",
    };
    frame.render_widget(
        Paragraph::new(selection_lines(
            state.roll_mode,
            &state.eligible,
            &state.checked,
            state.participant_cursor,
        ))
        .block(Block::default().borders(Borders::ALL).title(format!(
            " Selection: {} | {} ",
            mode_label,
            roll_trigger_label(state.roll_in_flight)
        ))),
        columns[0],
    );

    frame.render_widget(
        Paragraph::new(roster_lines(&state.roster)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Season Roster ({}) ", state.roster.len())),
        ),
        columns[1],
    );

    if let Some(ref result) = state.roll_result {
        frame.render_widget(
            Paragraph::new(result_lines(
                result,
                state.movie_details.as_ref(),
                state.enrich_in_flight,
            ))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(" Roll Result "),
            ),
            sections[3],
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn all_text(lines: &[Line]) -> Vec<String> {
        lines.iter().map(line_text).collect()
    }

    #[test]
    fn trigger_labels_swap_while_in_flight() {
        assert_eq!(roll_trigger_label(false), "Roll (Enter)");
        assert_eq!(roll_trigger_label(true), "Rolling...");
        assert_eq!(enrich_label(false), "Fetch Movie Details from TMDB");
        assert_eq!(enrich_label(true), "Fetching...");
    }

    #[test]
    fn season_info_shows_hint_without_active_season() {
        let texts = all_text(&season_info_lines(&None));
        assert!(texts[0].contains("No active season found"));
    }

    #[test]
    fn season_info_shows_name_and_tab() {
        let season = Season {
            id: 3,
            name: "Winter".into(),
            spreadsheet_tab: "Winter".into(),
            is_active: true,
            start_date: None,
            end_date: None,
            created_at: None,
        };
        let texts = all_text(&season_info_lines(&Some(season)));
        assert_eq!(texts[0], "Current Season: Winter");
        assert_eq!(texts[1], "Spreadsheet Tab: Winter");
    }

    #[test]
    fn eligible_lines_show_count_and_names() {
        let texts = all_text(&eligible_lines(
            &["Alice".to_string(), "Bob".to_string()],
            2,
        ));
        assert_eq!(texts[0], "Eligible Participants (2)");
        assert_eq!(texts[1], "Alice, Bob");
    }

    #[test]
    fn eligible_lines_empty_message() {
        let texts = all_text(&eligible_lines(&[], 0));
        assert_eq!(texts, vec!["No eligible participants remaining this season!"]);
    }

    #[test]
    fn selection_lines_custom_marks_checked_and_cursor() {
        let eligible = vec!["Alice".to_string(), "Bob".to_string()];
        let checked = vec![true, false];
        let texts = all_text(&selection_lines(RollMode::Custom, &eligible, &checked, 1));
        assert_eq!(texts[0], "  [x] Alice");
        assert_eq!(texts[1], "▸ [ ] Bob");
    }

    #[test]
    fn roster_lines_placeholder_when_empty() {
        let texts = all_text(&roster_lines(&[]));
        assert_eq!(texts, vec!["No one selected yet"]);
    }

    #[test]
    fn roster_lines_list_names() {
        let texts = all_text(&roster_lines(&["Alice".to_string(), "Bob".to_string()]));
        assert_eq!(texts, vec!["• Alice", "• Bob"]);
    }

    #[test]
    fn result_lines_offer_enrichment_until_fetched() {
        let outcome = RollOutcome {
            success: true,
            participant: "Bob".into(),
            movie: "Alien".into(),
            roll_id: 17,
            eligible_count: 4,
        };
        let texts = all_text(&result_lines(&outcome, None, false));
        assert_eq!(texts[0], "Selected: Bob");
        assert_eq!(texts[1], "\"Alien\"");
        assert!(texts[2].contains("Fetch Movie Details from TMDB"));

        let data = TmdbData {
            tmdb_id: Some(348),
            title: "Alien".into(),
            overview: None,
            release_date: Some("1979-05-25".into()),
            poster_url: None,
            backdrop_url: None,
            vote_average: Some(8.5),
            runtime: Some(117),
            genres: vec!["Horror".into()],
        };
        let texts = all_text(&result_lines(&outcome, Some(&data), false));
        assert!(texts.iter().any(|t| t == "Runtime: 117 minutes"));
        assert!(!texts.iter().any(|t| t.contains("Fetch Movie Details")));
    }

    #[test]
    fn render_does_not_panic_across_states() {
        let backend = ratatui::backend::TestBackend::new(100, 30);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();

        state.eligible = vec!["Alice".into(), "Bob".into()];
        state.eligible_count = 2;
        state.checked = vec![false, true];
        state.roll_mode = RollMode::Custom;
        state.roster = vec!["Carol".into()];
        state.roll_result = Some(RollOutcome {
            success: true,
            participant: "Bob".into(),
            movie: "Alien".into(),
            roll_id: 17,
            eligible_count: 1,
        });
        state.roll_in_flight = true;
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
