// Status bar widget: page tabs and the current notice.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::{Notice, NoticeLevel, PageId};
use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [tab bar] | [notice]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = vec![Span::raw(" ")];
    spans.extend(tab_spans(state.active_page));

    if let Some(ref notice) = state.notice {
        spans.push(Span::styled("| ", Style::default().fg(Color::Gray)));
        spans.push(notice_span(notice));
    }

    let paragraph =
        Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Build tab indicator spans with the active page highlighted.
/// E.g. "[1:Roll] [2:Seasons] [3:History]"
pub fn tab_spans(active: PageId) -> Vec<Span<'static>> {
    let tabs = [
        (PageId::Roll, "1:Roll"),
        (PageId::Seasons, "2:Seasons"),
        (PageId::History, "3:History"),
    ];

    let mut spans = Vec::new();
    for (page, label) in tabs {
        let style = if page == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{}]", label), style));
        spans.push(Span::raw(" "));
    }
    spans
}

/// Style a notice by its level: green for success, red for errors.
pub fn notice_span(notice: &Notice) -> Span<'static> {
    let color = match notice.level {
        NoticeLevel::Success => Color::Green,
        NoticeLevel::Error => Color::Red,
    };
    Span::styled(notice.text.clone(), Style::default().fg(color))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_spans_contain_all_pages() {
        let spans = tab_spans(PageId::Roll);
        let labels: Vec<&str> = spans
            .iter()
            .enumerate()
            .filter(|(i, _)| i % 2 == 0)
            .map(|(_, s)| s.content.as_ref())
            .collect();
        assert_eq!(labels, vec!["[1:Roll]", "[2:Seasons]", "[3:History]"]);
    }

    #[test]
    fn tab_spans_highlight_active() {
        let spans = tab_spans(PageId::Seasons);
        // 0=[1:Roll], 1=" ", 2=[2:Seasons]
        assert!(spans[2].style.add_modifier.contains(Modifier::BOLD));
        assert!(!spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn notice_span_colors_by_level() {
        let ok = notice_span(&Notice::success("Roll successful!"));
        assert_eq!(ok.style.fg, Some(Color::Green));
        let err = notice_span(&Notice::error("Error performing roll: boom"));
        assert_eq!(err.style.fg, Some(Color::Red));
    }

    #[test]
    fn render_does_not_panic_with_defaults() {
        let backend = ratatui::backend::TestBackend::new(80, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }

    #[test]
    fn render_does_not_panic_with_notice() {
        let backend = ratatui::backend::TestBackend::new(80, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.notice = Some(Notice::error("Error loading seasons: network error"));
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
