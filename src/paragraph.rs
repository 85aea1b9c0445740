//! Splits raw text into paragraph nodes, one per line.
//!
//! Blank lines are kept as empty paragraphs and never merged, so
//! `"Hello\n\nWorld"` yields three paragraphs.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextRun {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub children: Vec<TextRun>,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Paragraph {
            kind: "p",
            children: vec![TextRun { text: text.into() }],
        }
    }

    pub fn text(&self) -> String {
        self.children.iter().map(|run| run.text.as_str()).collect()
    }
}

/// Every `\n` (or `\r\n`) starts a new paragraph. Empty input has none.
pub fn split_paragraphs(text: &str) -> Vec<Paragraph> {
    if text.is_empty() {
        return vec![];
    }
    text.split('\n')
        .map(|line| Paragraph::new(line.strip_suffix('\r').unwrap_or(line)))
        .collect()
}
