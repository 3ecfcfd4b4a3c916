use std::borrow::Cow;

use super::format::{byline, display_title, meta_line};
use super::state::AppState;
use super::{InputMode, InputState};
use crate::feed::types::{FeedItem, Source};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub const EMPTY_FEED_TEXT: &str = "No items yet. Try enabling more sources or refreshing.";

/// Draw one frame. Returns the number of rows the feed list can show.
pub fn draw(f: &mut Frame, state: &AppState, input: &InputState, spinner_frame: u8) -> u16 {
    let banner_height = if state.warning.is_some() { 1 } else { 0 };
    let prompt_height = if input.mode == InputMode::Normal { 0 } else { 1 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(banner_height),
            Constraint::Min(6),
            Constraint::Length(prompt_height),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, state, chunks[0], spinner_frame);
    if let Some(warning) = &state.warning {
        draw_warning(f, warning, chunks[1]);
    }
    draw_feed(f, state, chunks[2]);
    if input.mode != InputMode::Normal {
        draw_prompt(f, input, chunks[3]);
    }
    draw_logs(f, state, chunks[4]);
    draw_footer(f, chunks[5]);

    chunks[2].height.saturating_sub(2)
}

fn source_color(source: Source) -> Color {
    match source {
        Source::Hn => Color::Rgb(255, 102, 0),
        Source::Reddit => Color::Red,
        Source::Github => Color::Magenta,
        Source::Rss => Color::Yellow,
    }
}

fn draw_header(f: &mut Frame, state: &AppState, area: Rect, spinner_frame: u8) {
    let mut spans: Vec<Span> = vec![Span::styled(
        " VibeFeed ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];

    for (idx, source) in Source::ALL.iter().enumerate() {
        let style = if state.enabled.contains(*source) {
            Style::default().fg(source_color(*source)).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" [{}]", idx + 1), Style::default().fg(Color::Yellow)));
        spans.push(Span::styled(source.label(), style));
    }

    spans.push(Span::styled(
        format!("  page {}", state.page),
        Style::default().fg(Color::DarkGray),
    ));

    if !state.query.trim().is_empty() {
        spans.push(Span::styled(
            format!("  {}/{} match \"{}\"", state.items.len(), state.total_items, state.query.trim()),
            Style::default().fg(Color::White),
        ));
    }

    if state.loading {
        let ch = SPINNER_FRAMES[(spinner_frame as usize) % SPINNER_FRAMES.len()];
        spans.push(Span::styled(
            format!("  {} Loading vibes…", ch),
            Style::default().fg(Color::Cyan),
        ));
    }

    let block = Block::default().borders(Borders::ALL);
    let para = Paragraph::new(Line::from(spans)).block(block);
    f.render_widget(para, area);
}

fn draw_warning(f: &mut Frame, warning: &str, area: Rect) {
    let line = Line::from(Span::styled(
        format!(" ⚠ {}", warning),
        Style::default().fg(Color::Black).bg(Color::Yellow),
    ));
    f.render_widget(Paragraph::new(line), area);
}

fn card_lines(item: &FeedItem, now_ms: i64, max_width: usize) -> [Line<'static>; 5] {
    let badge = format!(" {} ", item.source.label());
    let by = byline(item, now_ms);
    let by_max = max_width.saturating_sub(badge.chars().count() + 1);

    [
        Line::from(vec![
            Span::styled(
                badge,
                Style::default().fg(Color::Black).bg(source_color(item.source)),
            ),
            Span::raw(" "),
            Span::styled(truncate_with_ellipsis(&by, by_max).into_owned(), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(Span::styled(
            truncate_with_ellipsis(display_title(item), max_width).into_owned(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            truncate_with_ellipsis(&item.url, max_width).into_owned(),
            Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
        )),
        Line::from(Span::styled(
            truncate_with_ellipsis(&meta_line(&item.meta), max_width).into_owned(),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
    ]
}

fn draw_feed(f: &mut Frame, state: &AppState, area: Rect) {
    let max_width = area.width.saturating_sub(2) as usize;
    let now_ms = chrono::Utc::now().timestamp_millis();

    let title = format!(" Feed [{} items] ", state.items.len());
    let block = Block::default().title(title).borders(Borders::ALL);

    if state.items.is_empty() {
        let text = if state.loading { "" } else { EMPTY_FEED_TEXT };
        let para = Paragraph::new(Line::from(Span::styled(
            text,
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        f.render_widget(para, area);
        return;
    }

    let lines: Vec<Line> = state
        .items
        .iter()
        .flat_map(|item| card_lines(item, now_ms, max_width))
        .collect();

    let offset = u16::try_from(state.scroll_offset).unwrap_or(u16::MAX);
    let para = Paragraph::new(lines).block(block).scroll((offset, 0));
    f.render_widget(para, area);
}

fn draw_prompt(f: &mut Frame, input: &InputState, area: Rect) {
    let label = match input.mode {
        InputMode::Search => " Search: ",
        InputMode::RssUrl => " RSS URL: ",
        InputMode::Normal => "",
    };
    let line = Line::from(vec![
        Span::styled(label, Style::default().fg(Color::Yellow)),
        Span::raw(input.buffer.clone()),
        Span::styled("█", Style::default().fg(Color::Gray)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn draw_logs(f: &mut Frame, state: &AppState, area: Rect) {
    let max_width = area.width.saturating_sub(2) as usize;
    let visible_lines = area.height.saturating_sub(2) as usize;

    let lines: Vec<Line> = state
        .logs
        .iter()
        .rev()
        .take(visible_lines)
        .map(|l| {
            let color = match l.level.as_str() {
                "ERROR" => Color::Red,
                "WARN" => Color::Yellow,
                _ => Color::DarkGray,
            };
            let prefix = format!(" {} [{}] ", l.time, l.level);
            let msg_max = max_width.saturating_sub(prefix.len());
            let msg = truncate_with_ellipsis(&l.message, msg_max);
            Line::from(vec![
                Span::styled(prefix, Style::default().fg(color)),
                Span::raw(msg.into_owned()),
            ])
        })
        .collect();

    let block = Block::default().title(" Log ").borders(Borders::ALL);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_footer(f: &mut Frame, area: Rect) {
    let key = Style::default().fg(Color::Yellow);
    let line = Line::from(vec![
        Span::styled("  [q]", key),
        Span::raw("uit  "),
        Span::styled("[r]", key),
        Span::raw("efresh  "),
        Span::styled("[1-4]", key),
        Span::raw(" sources  "),
        Span::styled("[/]", key),
        Span::raw(" search  "),
        Span::styled("[u]", key),
        Span::raw(" rss url  "),
        Span::styled("[j/k]", key),
        Span::raw(" scroll  "),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn truncate_with_ellipsis(s: &str, max_width: usize) -> Cow<'_, str> {
    let char_count = s.chars().count();
    if char_count <= max_width {
        Cow::Borrowed(s)
    } else if max_width <= 3 {
        Cow::Owned(".".repeat(max_width))
    } else {
        let end = s
            .char_indices()
            .nth(max_width - 3)
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        Cow::Owned(format!("{}...", &s[..end]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::types::ItemMeta;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("short", 10), "short");
        assert_eq!(truncate_with_ellipsis("a longer line", 8), "a lon...");
        assert_eq!(truncate_with_ellipsis("abcdef", 2), "..");
    }

    #[test]
    fn test_empty_feed_shows_hint() {
        let mut terminal = Terminal::new(TestBackend::new(90, 24)).unwrap();
        let state = AppState::new();
        let input = InputState::default();
        let mut rows = 0;
        terminal
            .draw(|f| rows = draw(f, &state, &input, 0))
            .unwrap();
        assert!(buffer_text(&terminal).contains(EMPTY_FEED_TEXT));
        assert!(rows > 0);
    }

    #[test]
    fn test_cards_and_warning_render() {
        let mut terminal = Terminal::new(TestBackend::new(90, 30)).unwrap();
        let mut state = AppState::new();
        state.warning = Some("Some sources failed to load. Try refreshing.".to_string());
        state.items = vec![FeedItem {
            id: "gh_1".to_string(),
            source: Source::Github,
            author: "octocat".to_string(),
            title: "PushEvent — octocat/hello".to_string(),
            url: "https://github.com/octocat/hello".to_string(),
            ts: 0,
            meta: ItemMeta::Github { event_type: "PushEvent".to_string() },
        }];
        let input = InputState::default();
        terminal.draw(|f| { draw(f, &state, &input, 0); }).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Some sources failed to load"));
        assert!(text.contains("GITHUB"));
        assert!(text.contains("by octocat"));
        assert!(text.contains("https://github.com/octocat/hello"));
    }
}
