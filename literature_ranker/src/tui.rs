use crate::walkthrough::{Answer, PaperCard, Prompt};
use crate::Result;
use crossterm::event;
use crossterm::event::{KeyCode, KeyEventKind};
use ratatui::layout::Alignment;
use ratatui::style::Stylize;
use ratatui::symbols::border;
use ratatui::text::{Line, Span};
use ratatui::widgets::block::{Position, Title};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use ratatui::DefaultTerminal;
use regex::{Regex, RegexBuilder};

/// Full-screen paper card answering with single key presses.
///
/// The terminal switches to the card on the first question and is restored
/// when the prompt is dropped.
pub struct TerminalPrompt {
    terminal: Option<DefaultTerminal>,
    highlights: Option<Regex>,
}

impl TerminalPrompt {
    pub fn new(highlight_terms: Option<&str>) -> Self {
        TerminalPrompt {
            terminal: None,
            highlights: highlight_terms.and_then(highlight_regex),
        }
    }
}

impl Drop for TerminalPrompt {
    fn drop(&mut self) {
        if self.terminal.take().is_some() {
            ratatui::restore();
        }
    }
}

/// Case-insensitive alternation of every word of at least three characters.
pub fn highlight_regex(terms: &str) -> Option<Regex> {
    let words: Vec<String> = terms
        .split_whitespace()
        .filter(|word| word.chars().count() >= 3)
        .map(regex::escape)
        .collect();
    if words.is_empty() {
        return None;
    }

    let pattern = "(".to_string() + &words.join(")|(") + ")";
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .ok()
}

fn highlight(regex: Option<&Regex>, text: String) -> Vec<Span<'static>> {
    let Some(regex) = regex else {
        return vec![Span::from(text)];
    };

    let mut result = Vec::new();
    let mut index = 0;

    for capture in regex.captures_iter(&text) {
        if let Some(group) = capture.get(0) {
            let start = group.start();
            let end = group.end();

            if start > index {
                result.push(Span::from(String::from(&text[index..start])));
            }

            result.push(Span::from(String::from(&text[start..end])).red());
            index = end;
        }
    }

    if text.len() > index {
        result.push(Span::from(String::from(&text[index..])));
    }

    result
}

fn labelled(label: &'static str, regex: Option<&Regex>, text: String) -> Line<'static> {
    Line::from_iter(
        vec![Span::from(label).bold().gray().underlined()]
            .into_iter()
            .chain(highlight(regex, format!(": {}", text))),
    )
}

pub fn card_lines(card: &PaperCard<'_>, regex: Option<&Regex>) -> Vec<Line<'static>> {
    let mut lines = vec![
        format!(
            "Paper ({}/{}) - score {:.2}",
            card.position, card.total, card.paper.score
        )
        .into(),
        "".into(),
        labelled("Title", regex, card.paper.title.clone()),
        "".into(),
    ];

    if let Some(metadata) = card.metadata {
        lines.push(Line::from_iter(vec![
            Span::from("Published").bold().gray().underlined(),
            Span::from(": "),
            Span::from(metadata.date_label()).italic(),
        ]));
        lines.push("".into());
        lines.push(Line::from_iter(vec![
            Span::from("Authors").bold().gray().underlined(),
            Span::from(": "),
            Span::from(metadata.author_names()),
        ]));
        lines.push("".into());
    }

    if let Some(text) = card.description {
        lines.push(labelled("Summary", regex, text.to_string()));
    }

    lines
}

impl Prompt for TerminalPrompt {
    fn ask(&mut self, card: &PaperCard<'_>) -> Result<Answer> {
        let terminal = self.terminal.get_or_insert_with(ratatui::init);

        loop {
            let lines = card_lines(card, self.highlights.as_ref());

            terminal.draw(|frame| {
                let title = Title::from(" Reading list ".bold());
                let instructions = Title::from(Line::from(vec![
                    " Read ".into(),
                    "<Y>".blue().bold(),
                    " Unread ".into(),
                    "<N>".blue().bold(),
                    " Stop asking ".into(),
                    "<C>".blue().bold(),
                    " Quit ".into(),
                    "<Q> ".blue().bold(),
                    " Repaint ".into(),
                    "<R> ".blue().bold(),
                ]));
                let block = Block::bordered()
                    .title(title.alignment(Alignment::Center))
                    .title(
                        instructions
                            .alignment(Alignment::Center)
                            .position(Position::Bottom),
                    )
                    .border_set(border::THICK);

                Paragraph::new(lines)
                    .left_aligned()
                    .wrap(Wrap { trim: false })
                    .block(block)
                    .render(frame.area(), frame.buffer_mut());
            })?;

            if let event::Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => return Ok(Answer::Read),
                    KeyCode::Char('n') | KeyCode::Char('N') => return Ok(Answer::Unread),
                    KeyCode::Char('c') | KeyCode::Char('C') => return Ok(Answer::StopAsking),
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                        return Ok(Answer::Quit)
                    }
                    KeyCode::Char('r') => terminal.clear()?,
                    _ => {}
                }
            }
        }
    }
}
