// Roll detail overlay: one roll's full record, its enrichment data (or the
// call-to-action to fetch it), and the inline notes editor.

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::api::types::{Roll, TmdbData};
use crate::format::format_date;

/// Shown in place of the metadata block when a roll has no enrichment data.
pub const NO_TMDB_PROMPT: &str =
    "No TMDB data available. Click \"Fetch TMDB Data\" to retrieve it.";

/// Label of the enrichment trigger in this overlay.
pub fn enrich_label(in_flight: bool) -> &'static str {
    if in_flight {
        "Fetching..."
    } else {
        "Fetch TMDB Data"
    }
}

/// Build the metadata block for enriched movie data.
///
/// Lines for absent fields are omitted; an empty genres list omits the
/// genres line entirely.
pub fn movie_details_lines(data: &TmdbData) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled(
        data.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    if let Some(ref url) = data.poster_url {
        lines.push(field_line("Poster", url.clone()));
    }
    if let Some(ref date) = data.release_date {
        lines.push(field_line("Release Date", date.clone()));
    }
    if let Some(runtime) = data.runtime {
        lines.push(field_line("Runtime", format!("{runtime} minutes")));
    }
    if !data.genres.is_empty() {
        lines.push(field_line("Genres", data.genres.join(", ")));
    }
    if let Some(vote) = data.vote_average {
        lines.push(field_line("Rating", format!("{vote}/10")));
    }
    if let Some(ref overview) = data.overview {
        lines.push(field_line("Overview", overview.clone()));
    }

    lines
}

/// Build the full detail body for a roll.
pub fn detail_lines(roll: &Roll) -> Vec<Line<'static>> {
    let mut lines = vec![
        field_line("Movie", roll.movie_title.clone()),
        field_line("Participant", roll.participant_name.clone()),
        field_line("Date", format_date(&roll.roll_date)),
        Line::from(""),
    ];

    match roll.tmdb_data {
        Some(ref data) => lines.extend(movie_details_lines(data)),
        None => lines.push(Line::from(Span::styled(
            NO_TMDB_PROMPT,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))),
    }

    if let Some(ref notes) = roll.notes {
        lines.push(Line::from(""));
        lines.push(field_line("Notes", notes.clone()));
    }

    lines
}

/// Render the detail overlay centered on the screen.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    roll: &Roll,
    notes_edit: Option<&str>,
    enrich_in_flight: bool,
) {
    let dialog_area = centered_percent_rect(80, 80, area);
    frame.render_widget(Clear, dialog_area);

    let mut lines = detail_lines(roll);

    if let Some(buffer) = notes_edit {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Notes> ", Style::default().fg(Color::Cyan)),
            Span::raw(buffer.to_string()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]));
    }

    lines.push(Line::from(""));
    let hints = if notes_edit.is_some() {
        "Enter:Save notes  Esc:Cancel".to_string()
    } else {
        format!("e:{}  o:Edit notes  x:Delete  Esc:Close", enrich_label(enrich_in_flight))
    };
    lines.push(Line::from(Span::styled(
        hints,
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )));

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Roll Details "),
        )
        .style(Style::default().bg(Color::Black));

    frame.render_widget(paragraph, dialog_area);
}

fn field_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{label}: "),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(value),
    ])
}

/// Compute a centered rectangle covering the given percentages of `area`.
fn centered_percent_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;

    let vertical = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .split(area);
    let horizontal = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .split(vertical[0]);

    horizontal[0]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
