//! Extractive summarization: sentence segmentation, representative-sentence
//! selection and rendering.
//!
//! The selection keeps the first, middle and last sentences of a document and
//! then tops the summary up with randomly drawn sentences until a minimum word
//! count is reached.

use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::debug;

/// Default minimum number of words a summary aims for
pub const DEFAULT_MIN_WORDS: usize = 300;

lazy_static! {
    static ref SENTENCE: Regex = Regex::new(r"[^.!?]+[.!?]+").unwrap();
    static ref BLOCK: Selector = Selector::parse("div").unwrap();
}

/// Split raw text into sentences.
///
/// A sentence is a run of non-terminator characters followed by one or more
/// of `.`, `!` or `?`. Text after the last terminator is dropped and leading
/// whitespace is kept as part of the sentence.
pub fn segment(text: &str) -> Vec<&str> {
    SENTENCE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Number of tokens produced by splitting on single spaces.
pub fn word_count(sentence: &str) -> usize {
    sentence.split(' ').count()
}

/// Sentences picked for a summary, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection<'a> {
    sentences: Vec<&'a str>,
    words: usize,
}

impl<'a> Selection<'a> {
    /// Append a sentence unless the same text is already selected.
    /// Returns whether it was added.
    fn insert(&mut self, sentence: &'a str) -> bool {
        if self.contains(sentence) {
            return false;
        }
        self.words += word_count(sentence);
        self.sentences.push(sentence);
        true
    }

    pub fn contains(&self, sentence: &str) -> bool {
        self.sentences.iter().any(|s| *s == sentence)
    }

    pub fn sentences(&self) -> &[&'a str] {
        &self.sentences
    }

    /// Running word count of the selected sentences
    pub fn word_count(&self) -> usize {
        self.words
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

/// Pick representative sentences.
///
/// Anchors come first (start, middle when there are more than four
/// sentences, end), followed by random filler in the order it was drawn.
/// Filling stops once `min_words` is reached or every distinct sentence is
/// selected.
pub fn select<'a, R: Rng + ?Sized>(
    sentences: &[&'a str],
    min_words: usize,
    rng: &mut R,
) -> Selection<'a> {
    let total = sentences.len();
    let mut selection = Selection::default();

    if total > 0 {
        selection.insert(sentences[0]);
    }
    if total > 4 {
        selection.insert(sentences[total / 2]);
    }
    if total > 1 {
        selection.insert(sentences[total - 1]);
    }

    let distinct = sentences.iter().collect::<HashSet<_>>().len();
    while selection.word_count() < min_words && selection.len() < distinct {
        let index = rng.gen_range(0..total);
        selection.insert(sentences[index]);
    }

    debug!(
        total,
        selected = selection.len(),
        words = selection.word_count(),
        "selected summary sentences"
    );
    selection
}

/// Configured summarizer.
#[derive(Debug, Clone, Copy)]
pub struct Summarizer {
    min_words: usize,
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_WORDS)
    }
}

impl Summarizer {
    pub fn new(min_words: usize) -> Self {
        Self { min_words }
    }

    pub fn min_words(&self) -> usize {
        self.min_words
    }

    /// Segment `text` and build a summary from the selected sentences
    pub fn summarize<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> Summary {
        let sentences = segment(text);
        let selection = select(&sentences, self.min_words, rng);
        Summary::from_selection(&selection)
    }
}

/// A rendered-ready summary: an ordered list of text blocks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Summary {
    /// Page title, when known
    pub title: Option<String>,
    /// One entry per block container, in display order
    pub blocks: Vec<String>,
}

impl Summary {
    pub fn new(blocks: Vec<String>) -> Self {
        Self {
            title: None,
            blocks,
        }
    }

    pub fn from_selection(selection: &Selection<'_>) -> Self {
        Self::new(selection.sentences().iter().map(|s| s.to_string()).collect())
    }

    /// Build a summary from block markup such as `<div>..</div><div>..</div>`.
    ///
    /// Only innermost `div`s count as blocks, so a wrapping container does not
    /// repeat its children's text. Markup without any `div` becomes a single
    /// block holding its text.
    pub fn from_markup(markup: &str) -> Self {
        let fragment = Html::parse_fragment(markup);
        let mut blocks: Vec<String> = fragment
            .select(&BLOCK)
            .filter(|div| !has_nested_block(*div))
            .map(|div| div.text().collect::<String>())
            .collect();
        if blocks.is_empty() {
            let text: String = fragment.root_element().text().collect();
            if !text.trim().is_empty() {
                blocks.push(text);
            }
        }
        Self::new(blocks)
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Render every block as its own `<div>`, with no separators
    pub fn to_html(&self) -> String {
        self.blocks
            .iter()
            .map(|block| format!("<div>{}</div>", escape_html(block)))
            .collect()
    }

    /// Visible text: each block trimmed, one block per line
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|block| block.trim())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Strip rendered summary markup down to its visible text
pub fn strip_markup(markup: &str) -> String {
    Summary::from_markup(markup).plain_text()
}

fn has_nested_block(div: ElementRef<'_>) -> bool {
    div.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|element| element.value().name() == "div")
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn segment_splits_on_terminators() {
        let text = "Hello world. How are you? Great!!! Done";
        assert_eq!(
            segment(text),
            vec!["Hello world.", " How are you?", " Great!!!"]
        );
    }

    #[test]
    fn segment_drops_unterminated_tail() {
        assert!(segment("no punctuation here").is_empty());
        assert!(segment("").is_empty());
    }

    #[test]
    fn segment_returns_substrings() {
        let text = "First one. Second...\nThird? ";
        for sentence in segment(text) {
            assert!(text.contains(sentence));
        }
    }

    #[test]
    fn word_count_splits_on_spaces() {
        assert_eq!(word_count("A."), 1);
        assert_eq!(word_count("Hello, world."), 2);
        assert_eq!(word_count(" Leading space."), 3);
    }

    #[test]
    fn select_empty() {
        let selection = select(&[], 300, &mut rng());
        assert!(selection.is_empty());
        assert_eq!(selection.word_count(), 0);
    }

    #[test]
    fn select_single_sentence_once() {
        let selection = select(&["Only."], 300, &mut rng());
        assert_eq!(selection.sentences(), &["Only."]);
    }

    #[test]
    fn select_anchors_come_first() {
        let sentences = ["A.", "B.", "C.", "D.", "E."];
        let selection = select(&sentences, 300, &mut rng());
        assert_eq!(&selection.sentences()[..3], &["A.", "C.", "E."]);
        assert_eq!(selection.len(), 5);
        assert_eq!(selection.word_count(), 5);
    }

    #[test]
    fn select_stops_at_word_floor() {
        let sentences = ["one two three.", "four five six.", "seven eight.", "nine."];
        let selection = select(&sentences, 3, &mut rng());
        // first and last anchors already exceed the floor
        assert_eq!(selection.sentences(), &["one two three.", "nine."]);
    }

    #[test]
    fn select_never_duplicates() {
        let sentences = ["Same.", "Other.", "Same.", "Same.", "Last.", "Same."];
        let selection = select(&sentences, 300, &mut rng());
        let unique: HashSet<_> = selection.sentences().iter().collect();
        assert_eq!(unique.len(), selection.len());
        assert_eq!(selection.len(), 3);
    }

    #[test]
    fn select_is_deterministic_for_seed() {
        let text = "One. Two. Three. Four. Five. Six. Seven. Eight. Nine. Ten.";
        let sentences = segment(text);
        let a = select(&sentences, 8, &mut StdRng::seed_from_u64(42));
        let b = select(&sentences, 8, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn summarizer_uses_min_words() {
        let summary = Summarizer::new(1).summarize("A b. C d. E f.", &mut rng());
        assert_eq!(summary.blocks, vec!["A b.", " E f."]);
    }

    #[test]
    fn render_blocks_without_separator() {
        let summary = Summary::new(vec!["A.".into(), "B.".into()]);
        assert_eq!(summary.to_html(), "<div>A.</div><div>B.</div>");
    }

    #[test]
    fn render_escapes_markup() {
        let summary = Summary::new(vec!["1 < 2 & 3 > 2.".into()]);
        assert_eq!(summary.to_html(), "<div>1 &lt; 2 &amp; 3 &gt; 2.</div>");
    }

    #[test]
    fn strip_markup_matches_plain_text() {
        let summary = Summary::new(vec!["First.".into(), " Second <b>?".into()]);
        assert_eq!(strip_markup(&summary.to_html()), summary.plain_text());
        assert_eq!(summary.plain_text(), "First.\nSecond <b>?");
    }

    #[test]
    fn from_markup_ignores_wrapper_divs() {
        let summary = Summary::from_markup(
            r#"<div class="summary"><div>A.</div><div><div>B.</div></div></div>"#,
        );
        assert_eq!(summary.blocks, vec!["A.", "B."]);
    }

    #[test]
    fn from_markup_without_blocks() {
        let summary = Summary::from_markup("just some text");
        assert_eq!(summary.blocks, vec!["just some text"]);
        assert!(Summary::from_markup("").is_empty());
    }
}
