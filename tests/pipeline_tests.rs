//! End-to-end: HTML page -> extracted text -> summary -> markup -> summary.txt

use precis::export::{write_summary, DEFAULT_FILE_NAME};
use precis::scraper::parse_page;
use precis::summary::{segment, strip_markup};
use precis::Summarizer;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

fn article(paragraphs: usize) -> String {
    let mut html = String::from("<html><head><title>Long read</title></head><body><main><h1>Long read</h1>");
    for i in 0..paragraphs {
        html.push_str(&format!(
            "<p>Paragraph {i} opens with a claim. It then adds some supporting detail! Does it end with a question?</p>"
        ));
    }
    html.push_str("</main><footer><p>Footer text is not content.</p></footer></body></html>");
    html
}

#[test]
fn summary_of_long_page_reaches_word_floor() {
    let content = parse_page("article.html", &article(60)).unwrap();
    assert!(!content.text.contains("Footer"));

    let sentences = segment(&content.text);
    assert_eq!(sentences.len(), 180);

    let summary = Summarizer::new(300).summarize(&content.text, &mut StdRng::seed_from_u64(3));
    let words: usize = summary.blocks.iter().map(|b| b.split(' ').count()).sum();
    assert!(words >= 300);
    assert!(summary.blocks.len() < sentences.len());

    // anchors: first, middle, last
    assert_eq!(summary.blocks[0], sentences[0]);
    assert_eq!(summary.blocks[1], sentences[90]);
    assert_eq!(summary.blocks[2], sentences[179]);

    let unique: HashSet<_> = summary.blocks.iter().collect();
    assert_eq!(unique.len(), summary.blocks.len());
}

#[test]
fn short_page_includes_every_sentence() {
    let content = parse_page("short.html", &article(1)).unwrap();
    let summary = Summarizer::default().summarize(&content.text, &mut StdRng::seed_from_u64(3));
    // heading runs into the first sentence since it has no terminator
    assert_eq!(summary.blocks.len(), 3);
}

#[test]
fn same_seed_same_summary() {
    let content = parse_page("article.html", &article(40)).unwrap();
    let a = Summarizer::new(120).summarize(&content.text, &mut StdRng::seed_from_u64(11));
    let b = Summarizer::new(120).summarize(&content.text, &mut StdRng::seed_from_u64(11));
    assert_eq!(a, b);
}

#[test]
fn exported_file_matches_visible_text() {
    let content = parse_page("article.html", &article(20)).unwrap();
    let summary = Summarizer::new(80).summarize(&content.text, &mut StdRng::seed_from_u64(5));

    let dir = tempfile::tempdir().unwrap();
    let path = write_summary(dir.path(), DEFAULT_FILE_NAME, &summary).unwrap();
    let exported = std::fs::read_to_string(path).unwrap();

    assert_eq!(exported, strip_markup(&summary.to_html()));
    assert_eq!(exported.lines().count(), summary.blocks.len());
}
