//! Search highlighting inside a summary.

use colored::Colorize;
use regex::RegexBuilder;

use crate::summary::{escape_html, Summary};

/// A run of block text, marked when it matched the search term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub matched: bool,
}

/// One summary block split into matched and unmatched runs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HighlightedBlock {
    pub segments: Vec<Segment>,
}

impl HighlightedBlock {
    fn plain(text: &str) -> Self {
        Self {
            segments: vec![Segment {
                text: text.to_string(),
                matched: false,
            }],
        }
    }

    pub fn match_count(&self) -> usize {
        self.segments.iter().filter(|s| s.matched).count()
    }

    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Summary blocks with search matches marked
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Highlighted {
    pub term: String,
    pub blocks: Vec<HighlightedBlock>,
}

impl Highlighted {
    pub fn match_count(&self) -> usize {
        self.blocks.iter().map(HighlightedBlock::match_count).sum()
    }

    /// Blocks as `<div>` markup with matches wrapped in highlight spans
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for block in &self.blocks {
            html.push_str("<div>");
            for segment in &block.segments {
                let text = escape_html(&segment.text);
                if segment.matched {
                    html.push_str(&format!("<span class=\"highlight\">{}</span>", text));
                } else {
                    html.push_str(&text);
                }
            }
            html.push_str("</div>");
        }
        html
    }

    /// Blocks for the terminal, one per line, matches in reverse yellow
    pub fn to_terminal(&self) -> String {
        self.blocks
            .iter()
            .map(|block| {
                block
                    .segments
                    .iter()
                    .map(|segment| {
                        if segment.matched {
                            segment.text.black().on_yellow().to_string()
                        } else {
                            segment.text.clone()
                        }
                    })
                    .collect::<String>()
                    .trim()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Mark every case-insensitive occurrence of `term` in the summary.
///
/// The term is matched literally. A blank term marks nothing.
pub fn highlight(summary: &Summary, term: &str) -> Highlighted {
    let term = term.trim();
    let pattern = if term.is_empty() {
        None
    } else {
        RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build()
            .ok()
    };

    let blocks = summary
        .blocks
        .iter()
        .map(|block| match &pattern {
            Some(pattern) => {
                let mut segments = Vec::new();
                let mut last = 0;
                for m in pattern.find_iter(block) {
                    if m.start() > last {
                        segments.push(Segment {
                            text: block[last..m.start()].to_string(),
                            matched: false,
                        });
                    }
                    segments.push(Segment {
                        text: m.as_str().to_string(),
                        matched: true,
                    });
                    last = m.end();
                }
                if last < block.len() || segments.is_empty() {
                    segments.push(Segment {
                        text: block[last..].to_string(),
                        matched: false,
                    });
                }
                HighlightedBlock { segments }
            }
            None => HighlightedBlock::plain(block),
        })
        .collect();

    Highlighted {
        term: term.to_string(),
        blocks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> Summary {
        Summary::new(vec![
            "Rust is fast.".to_string(),
            " Trust the RUST compiler.".to_string(),
        ])
    }

    #[test]
    fn marks_case_insensitive_matches() {
        let highlighted = highlight(&summary(), "rust");
        assert_eq!(highlighted.match_count(), 3);
        assert_eq!(
            highlighted.to_html(),
            "<div><span class=\"highlight\">Rust</span> is fast.</div>\
             <div> T<span class=\"highlight\">rust</span> the \
             <span class=\"highlight\">RUST</span> compiler.</div>"
        );
    }

    #[test]
    fn highlighting_keeps_block_text() {
        let summary = summary();
        let highlighted = highlight(&summary, "the");
        let texts: Vec<String> = highlighted.blocks.iter().map(|b| b.text()).collect();
        assert_eq!(texts, summary.blocks);
    }

    #[test]
    fn term_is_literal() {
        let summary = Summary::new(vec!["Costs $5 (approx.) today.".to_string()]);
        let highlighted = highlight(&summary, "(approx.)");
        assert_eq!(highlighted.match_count(), 1);
        assert_eq!(highlight(&summary, ".*").match_count(), 0);
    }

    #[test]
    fn blank_term_marks_nothing() {
        let highlighted = highlight(&summary(), "   ");
        assert_eq!(highlighted.match_count(), 0);
        assert_eq!(highlighted.blocks.len(), 2);
    }

    #[test]
    fn terminal_output_has_one_line_per_block() {
        colored::control::set_override(false);
        let highlighted = highlight(&summary(), "fast");
        assert_eq!(
            highlighted.to_terminal(),
            "Rust is fast.\nTrust the RUST compiler."
        );
    }
}
