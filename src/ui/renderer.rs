//! Terminal rendering: transcript pane, status line, input box.
//!
//! Rendering is a pure mapping from [`App`] state to widgets; all event
//! wiring lives in the chat loop.

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use std::time::Instant;

use crate::core::app::App;
use crate::core::message::TranscriptRole;

/// Rows consumed by chrome around the transcript pane: pane title, status
/// line, and the three-row input box.
pub const CHROME_ROWS: u16 = 5;

pub fn available_height(terminal_height: u16) -> u16 {
    terminal_height.saturating_sub(CHROME_ROWS)
}

/// Flatten the active transcript into styled display lines. User turns are
/// prefixed `You:`, assistant turns with the character's speaker name, and
/// app banners render as alerts without a speaker.
pub fn build_display_lines(app: &App) -> Vec<Line<'_>> {
    let active_id = app.session.active_character_id();
    let speaker = app.speaker_name(active_id);
    let mut lines = Vec::new();

    for msg in app.session.active_transcript() {
        match msg.role {
            TranscriptRole::User => {
                lines.push(Line::from(vec![
                    Span::styled(
                        "You: ",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(&*msg.content, Style::default().fg(Color::Cyan)),
                ]));
                lines.push(Line::from(""));
            }
            TranscriptRole::Assistant => {
                let mut first = true;
                for content_line in msg.content.lines() {
                    if first {
                        lines.push(Line::from(vec![
                            Span::styled(
                                format!("{speaker}: "),
                                Style::default()
                                    .fg(Color::Green)
                                    .add_modifier(Modifier::BOLD),
                            ),
                            Span::styled(content_line, Style::default().fg(Color::White)),
                        ]));
                        first = false;
                    } else {
                        lines.push(Line::from(Span::styled(
                            content_line,
                            Style::default().fg(Color::White),
                        )));
                    }
                }
                if first {
                    // Empty assistant content still occupies a line.
                    lines.push(Line::from(Span::styled(
                        format!("{speaker}: "),
                        Style::default()
                            .fg(Color::Green)
                            .add_modifier(Modifier::BOLD),
                    )));
                }
                lines.push(Line::from(""));
            }
            TranscriptRole::AppInfo => {
                for content_line in msg.content.lines() {
                    lines.push(Line::from(Span::styled(
                        content_line,
                        Style::default().fg(Color::DarkGray),
                    )));
                }
                lines.push(Line::from(""));
            }
            TranscriptRole::AppWarning => {
                lines.push(Line::from(Span::styled(
                    &*msg.content,
                    Style::default().fg(Color::Yellow),
                )));
                lines.push(Line::from(""));
            }
            TranscriptRole::AppError => {
                lines.push(Line::from(Span::styled(
                    format!("! {}", msg.content),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(""));
            }
        }
    }

    lines
}

pub fn display_line_count(app: &App) -> u16 {
    build_display_lines(app).len() as u16
}

pub fn max_scroll_offset(app: &App, available_height: u16) -> u16 {
    let total_lines = display_line_count(app);
    if total_lines > available_height {
        total_lines.saturating_sub(available_height)
    } else {
        0
    }
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(f.area());

    let lines = build_display_lines(app);

    let pane_height = chunks[0].height.saturating_sub(1);
    let total_lines = lines.len() as u16;
    let max_offset = if total_lines > pane_height {
        total_lines.saturating_sub(pane_height)
    } else {
        0
    };
    let scroll_offset = app.scroll_offset.min(max_offset);

    let active_id = app.session.active_character_id().to_string();
    let title = format!("Charade - {}", app.speaker_name(&active_id));

    let messages_paragraph = Paragraph::new(lines)
        .block(Block::default().title(title))
        .wrap(Wrap { trim: true })
        .scroll((scroll_offset, 0));
    f.render_widget(messages_paragraph, chunks[0]);

    // Status line: transient notice when set, key hints otherwise.
    let status = match app.active_notice(Instant::now()) {
        Some(notice) => Line::from(Span::styled(
            notice.to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        None => Line::from(Span::styled(
            "/help for commands · Ctrl+C to quit",
            Style::default().fg(Color::DarkGray),
        )),
    };
    f.render_widget(Paragraph::new(status), chunks[1]);

    let (input_title, input_style) = if app.is_sending {
        (
            "Waiting for reply…",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (
            "Type your message (Enter to send)",
            Style::default().fg(Color::Yellow),
        )
    };

    let input = Paragraph::new(app.input.as_str())
        .style(input_style)
        .block(Block::default().borders(Borders::ALL).title(input_title))
        .wrap(Wrap { trim: true });
    f.render_widget(input, chunks[2]);

    f.set_cursor_position((chunks[2].x + app.input.len() as u16 + 1, chunks[2].y + 1));
}
