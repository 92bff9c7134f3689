// Season form overlay: create or edit a season.

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::tui::{FormField, SeasonForm};

const DIALOG_WIDTH: u16 = 52;
const DIALOG_HEIGHT: u16 = 10;

/// Title reflects whether the form edits an existing season.
pub fn form_title(form: &SeasonForm) -> &'static str {
    if form.id.is_some() {
        "Edit Season"
    } else {
        "Create New Season"
    }
}

/// Build the form body: one row per field, the focused one marked.
pub fn form_lines(form: &SeasonForm) -> Vec<Line<'static>> {
    let field_row = |field: FormField, label: &str, value: String| {
        let focused = form.focus == field;
        let pointer = if focused { "▸" } else { " " };
        let value_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::raw(format!(" {pointer} {label:<16}")),
            Span::styled(value, value_style),
        ])
    };

    let checkbox = if form.is_active { "[x]" } else { "[ ]" };
    vec![
        field_row(FormField::Name, "Name:", form.name.clone()),
        field_row(
            FormField::SpreadsheetTab,
            "Spreadsheet Tab:",
            form.spreadsheet_tab.clone(),
        ),
        field_row(
            FormField::IsActive,
            "Active:",
            format!("{checkbox} (space toggles)"),
        ),
        Line::from(""),
        Line::from(Span::styled(
            " Tab:Next field  Enter:Save  Esc:Cancel",
            Style::default().fg(Color::White).add_modifier(Modifier::DIM),
        )),
    ]
}

/// Render the form overlay centered on the screen.
pub fn render(frame: &mut Frame, area: Rect, form: &SeasonForm) {
    let dialog_area = centered_rect(DIALOG_WIDTH, DIALOG_HEIGHT, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", form_title(form)));

    let paragraph = Paragraph::new(form_lines(form))
        .block(block)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width);
    let clamped_height = height.min(area.height);

    let vertical = Layout::vertical([Constraint::Length(clamped_height)])
        .flex(Flex::Center)
        .split(area);
    let horizontal = Layout::horizontal([Constraint::Length(clamped_width)])
        .flex(Flex::Center)
        .split(vertical[0]);

    horizontal[0]
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

    #[test]
    fn title_reflects_create_vs_edit() {
        let mut form = SeasonForm::new();
        assert_eq!(form_title(&form), "Create New Season");
        form.id = Some(2);
        assert_eq!(form_title(&form), "Edit Season");
    }

    #[test]
    fn form_lines_show_values_and_focus() {
        let mut form = SeasonForm::new();
        form.name = "Winter".into();
        form.spreadsheet_tab = "Winter".into();
        form.focus = FormField::SpreadsheetTab;
        let texts: Vec<String> = form_lines(&form).iter().map(line_text).collect();
        assert!(texts[0].contains("Winter"));
        assert!(!texts[0].starts_with(" ▸"));
        assert!(texts[1].starts_with(" ▸"));
    }

    #[test]
    fn checkbox_reflects_active_flag() {
        let mut form = SeasonForm::new();
        form.is_active = true;
        let texts: Vec<String> = form_lines(&form).iter().map(line_text).collect();
        assert!(texts[2].contains("[x]"));
        form.is_active = false;
        let texts: Vec<String> = form_lines(&form).iter().map(line_text).collect();
        assert!(texts[2].contains("[ ]"));
    }

    #[test]
    fn render_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(80, 24);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let form = SeasonForm::new();
        terminal
            .draw(|frame| render(frame, frame.area(), &form))
            .unwrap();
    }
}
