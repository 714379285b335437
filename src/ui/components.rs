//! UI components for the TUI

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use super::controller::Notice;
use super::{App, Mode};
use crate::playback::PlaybackState;
use crate::search::Highlighted;
use crate::speech::SpeechEngine;
use crate::summary::Summary;

const HELP_IDLE: &str = " Enter summarise  q quit ";
const HELP_READY: &str =
    " r read  p pause  u resume  f faster  s stop  d download  / search  v voice  q quit ";

pub fn draw<E: SpeechEngine>(frame: &mut Frame, app: &App<E>) {
    let [input_area, summary_area, status_area, help_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    frame.render_widget(input(app), input_area);
    frame.render_widget(summary_pane(app), summary_area);
    frame.render_widget(status_bar(app), status_area);

    let help = if app.controller.summary().is_some() {
        HELP_READY
    } else {
        HELP_IDLE
    };
    frame.render_widget(
        Paragraph::new(help).style(Style::new().fg(Color::DarkGray)),
        help_area,
    );

    if let Mode::Voices { voices, selected } = &app.mode {
        let area = centered(summary_area, 60, voices.len().min(12) as u16 + 2);
        let items: Vec<ListItem> = voices
            .iter()
            .map(|voice| ListItem::new(voice.to_string()))
            .collect();
        let list = List::new(items)
            .block(Block::bordered().title(" Voice "))
            .highlight_style(Style::new().add_modifier(Modifier::REVERSED));
        let mut state = ListState::default().with_selected(Some(*selected));
        frame.render_widget(Clear, area);
        frame.render_stateful_widget(list, area, &mut state);
    }
}

fn input<E: SpeechEngine>(app: &App<E>) -> Paragraph<'_> {
    let (title, style) = match app.mode {
        Mode::Source => (" URL or file ", Style::new().fg(Color::Yellow)),
        Mode::Search => (" Search ", Style::new().fg(Color::Yellow)),
        _ => (" precis ", Style::new()),
    };
    let text = match app.mode {
        Mode::Source | Mode::Search => format!("{}_", app.input),
        _ => app.input.clone(),
    };
    Paragraph::new(text).block(Block::bordered().title(title).border_style(style))
}

fn summary_pane<E: SpeechEngine>(app: &App<E>) -> Paragraph<'static> {
    let Some(summary) = app.controller.summary() else {
        return Paragraph::new("No summary yet.")
            .block(Block::bordered().title(" Summary "))
            .style(Style::new().fg(Color::DarkGray));
    };

    let title = format!(
        " {} ",
        summary.title.as_deref().unwrap_or("Summary")
    );
    let lines = match app.controller.highlight() {
        Some(highlighted) => highlighted_lines(highlighted),
        None => summary_lines(summary),
    };
    Paragraph::new(lines)
        .block(Block::bordered().title(title))
        .wrap(Wrap { trim: true })
}

/// One line per block
pub fn summary_lines(summary: &Summary) -> Vec<Line<'static>> {
    summary
        .blocks
        .iter()
        .map(|block| Line::from(block.trim().to_string()))
        .collect()
}

/// One line per block, matches shown black on yellow
pub fn highlighted_lines(highlighted: &Highlighted) -> Vec<Line<'static>> {
    let mark = Style::new().fg(Color::Black).bg(Color::Yellow);
    highlighted
        .blocks
        .iter()
        .map(|block| {
            let spans: Vec<Span<'static>> = block
                .segments
                .iter()
                .map(|segment| {
                    if segment.matched {
                        Span::styled(segment.text.clone(), mark)
                    } else {
                        Span::raw(segment.text.clone())
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn status_bar<E: SpeechEngine>(app: &App<E>) -> Line<'static> {
    let state = app.controller.playback_state();
    let state_style = match state {
        PlaybackState::Speaking => Style::new().fg(Color::Green),
        PlaybackState::Paused => Style::new().fg(Color::Yellow),
        PlaybackState::Idle => Style::new().fg(Color::DarkGray),
    };

    let mut spans = vec![
        Span::styled(format!(" {} ", state), state_style),
        Span::raw(format!("{:.1}x ", app.controller.rate())),
        Span::raw(format!(
            "voice: {} ",
            app.controller.voice().unwrap_or("default")
        )),
    ];
    match &app.notice {
        Some(Notice::Info(message)) => spans.push(Span::raw(format!("| {}", message))),
        Some(Notice::Alert(message)) => spans.push(Span::styled(
            format!("| {}", message),
            Style::new().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        None => {}
    }
    Line::from(spans)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
