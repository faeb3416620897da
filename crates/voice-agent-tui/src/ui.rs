use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use voice_agent_core::{AgentBackend, ChatEntry, Sender, CONNECTION_ERROR_TEXT};
use crate::app::App;

/// Share of the transcript width a single message may take
const BUBBLE_WIDTH_PERCENT: usize = 85;

/// Split a word wider than `width` columns into pieces that each fit
fn split_long_word(word: &str, width: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for c in word.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > width && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
            current_width = 0;
        }
        current.push(c);
        current_width += char_width;
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}

/// Wrap text to fit within a given width in terminal columns, returning multiple lines
/// Breaks on word boundaries; a word wider than a whole line is split across lines
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();

    // Keep the message's own line breaks, wrap each paragraph separately
    for paragraph in text.lines() {
        let mut current_line = String::new();
        let mut current_width = 0;

        for word in paragraph.split_whitespace() {
            let word_width = word.width();

            if word_width > width {
                if current_width > 0 {
                    lines.push(std::mem::take(&mut current_line));
                }
                let mut pieces = split_long_word(word, width);
                let last = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
                current_width = last.width();
                current_line = last;
            } else if current_width == 0 {
                current_line = word.to_string();
                current_width = word_width;
            } else if current_width + 1 + word_width <= width {
                current_line.push(' ');
                current_line.push_str(word);
                current_width += 1 + word_width;
            } else {
                lines.push(std::mem::take(&mut current_line));
                current_line = word.to_string();
                current_width = word_width;
            }
        }

        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Lay out the whole transcript as display lines for a given width.
///
/// Bot messages sit on the left under an agent label, user messages on the
/// right; a blank line separates messages.
fn transcript_lines(entries: &[ChatEntry], width: usize) -> Vec<Line<'static>> {
    let bubble_width = (width * BUBBLE_WIDTH_PERCENT / 100).max(1);
    let mut lines = Vec::new();

    for (idx, entry) in entries.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::default());
        }

        match entry.sender() {
            Sender::Bot => {
                lines.push(Line::from(Span::styled(
                    "🤖 AGENT",
                    Style::default().fg(Color::DarkGray),
                )));
                let style = if entry.text() == CONNECTION_ERROR_TEXT {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default().fg(Color::Gray)
                };
                for text in wrap_text_to_width(entry.text(), bubble_width) {
                    lines.push(Line::from(Span::styled(text, style)));
                }
            }
            Sender::User => {
                for text in wrap_text_to_width(entry.text(), bubble_width) {
                    lines.push(
                        Line::from(Span::styled(text, Style::default().fg(Color::Cyan)))
                            .alignment(Alignment::Right),
                    );
                }
            }
        }
    }

    lines
}

pub fn render<B: AgentBackend + 'static>(app: &mut App<B>, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, transcript, mic control, footer
    let [header_area, chat_area, mic_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_transcript(app, frame, chat_area);
    render_mic(app, frame, mic_area);
    render_footer(app, frame, footer_area);
}

fn render_header<B: AgentBackend + 'static>(app: &App<B>, frame: &mut Frame, area: Rect) {
    let light = if app.is_listening() {
        Span::styled(" ● ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
    } else {
        Span::styled(" ● ", Style::default().fg(Color::Green))
    };

    let title = Line::from(vec![
        light,
        Span::styled("A.I. VOICE AGENT", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);
    let status = Line::from(Span::styled("LIVE CONNECTION ", Style::default().fg(Color::Gray)))
        .alignment(Alignment::Right);

    let background = Style::default().bg(Color::DarkGray);
    frame.render_widget(Paragraph::new(title).style(background), area);
    frame.render_widget(Paragraph::new(status).style(background), area);
}

fn render_transcript<B: AgentBackend + 'static>(app: &mut App<B>, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Transcript ");
    let inner = block.inner(area);

    // Leave one column for the scrollbar
    let text_width = inner.width.saturating_sub(1) as usize;
    let lines = transcript_lines(app.controller.entries(), text_width);
    let total_lines = lines.len();
    app.update_scroll_bounds(total_lines, inner.height);

    let transcript = Paragraph::new(lines)
        .block(block)
        .scroll((app.chat_scroll, 0));
    frame.render_widget(transcript, area);

    if app.max_scroll > 0 {
        let mut scrollbar_state = ScrollbarState::new(app.max_scroll as usize)
            .position(app.chat_scroll as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            inner,
            &mut scrollbar_state,
        );
    }
}

fn render_mic<B: AgentBackend + 'static>(app: &mut App<B>, frame: &mut Frame, area: Rect) {
    app.mic_area = Some(area);

    let (label, style) = if app.is_listening() {
        let dots = ".".repeat(app.animation_frame as usize + 1);
        (
            format!("● LISTENING{:<3}", dots),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else {
        (
            "🎤  SPEAK".to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )
    };

    let border_style = if app.is_listening() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Gray)
    };

    let mic = Paragraph::new(Line::from(Span::styled(label, style)))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(border_style));
    frame.render_widget(mic, area);
}

fn render_footer<B: AgentBackend + 'static>(app: &App<B>, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let muted_style = Style::default().bg(Color::Black).fg(Color::DarkGray);

    let mut hints = if app.is_listening() {
        vec![Span::styled(" recording, please wait ", muted_style)]
    } else {
        vec![
            Span::styled(" Space ", key_style),
            Span::styled(" speak ", label_style),
        ]
    };
    hints.extend(vec![
        Span::styled(" j/k ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" G ", key_style),
        Span::styled(" latest ", label_style),
        Span::styled(" q ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    let connection = Line::from(Span::styled(
        format!("Connected to {} ", app.host_label),
        Style::default().fg(Color::DarkGray),
    ))
    .alignment(Alignment::Right);

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
    frame.render_widget(Paragraph::new(connection), area);
}
