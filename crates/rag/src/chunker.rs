//! Deterministic paragraph chunker
//!
//! Splits sanitized article text on blank lines and re-splits any
//! paragraph that exceeds the configured ceiling. The chunker version is
//! recorded on every document version so re-chunking strategies can
//! coexist in the index.

const CHUNKER_VERSION: &str = "para-v1";

#[derive(Debug, Clone)]
pub struct Chunker {
    max_chars: usize,
}

impl Chunker {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Identifier recorded on produced versions
    pub fn version(&self) -> &'static str {
        CHUNKER_VERSION
    }

    /// Split body text into ordered chunks
    pub fn chunk(&self, body: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        for paragraph in split_paragraphs(body) {
            if paragraph.chars().count() <= self.max_chars {
                chunks.push(paragraph);
            } else {
                chunks.extend(self.split_long(&paragraph));
            }
        }
        chunks
    }

    /// Split an oversized paragraph at the character ceiling
    fn split_long(&self, paragraph: &str) -> Vec<String> {
        let chars: Vec<char> = paragraph.chars().collect();
        chars
            .chunks(self.max_chars)
            .map(|piece| piece.iter().collect::<String>().trim().to_string())
            .filter(|piece| !piece.is_empty())
            .collect()
    }
}

fn split_paragraphs(body: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = String::new();

    for line in body.lines() {
        if line.trim().is_empty() {
            if !current.trim().is_empty() {
                paragraphs.push(current.trim().to_string());
            }
            current.clear();
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }
    if !current.trim().is_empty() {
        paragraphs.push(current.trim().to_string());
    }
    paragraphs
}
