//! Incremental answer-field parser
//!
//! Consumes LLM response fragments as they arrive and emits every
//! character of the `"answer"` value as soon as it is fully decoded,
//! resolving the JSON escapes `\n \r \t \" \\` on the fly. A fragment
//! ending in a bare backslash leaves the backslash unconsumed; it is
//! re-processed with the next fragment. Once the closing quote is seen,
//! later fragments are only buffered for the final validator.

/// Bytes kept scannable behind the cursor while the key is still unseen
const KEY_LOOKBEHIND: usize = 20;

const ANSWER_KEY: &str = "\"answer\"";

#[derive(Debug, Default)]
pub struct PartialAnswerParser {
    buffer: String,
    scan_offset: usize,
    in_answer: bool,
    answer_complete: bool,
}

impl PartialAnswerParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything received so far, for the final validator
    pub fn raw(&self) -> &str {
        &self.buffer
    }

    /// Whether the closing quote of the answer value has been seen
    pub fn answer_complete(&self) -> bool {
        self.answer_complete
    }

    /// Append one fragment; returns the newly decoded answer text
    pub fn feed(&mut self, fragment: &str) -> String {
        self.buffer.push_str(fragment);
        if self.answer_complete {
            return String::new();
        }

        if !self.in_answer && !self.locate_answer_value() {
            return String::new();
        }
        self.scan_value()
    }

    /// Find `"answer"`, then `:` and the opening quote. Returns true once
    /// the cursor sits on the first value character.
    fn locate_answer_value(&mut self) -> bool {
        let Some(found) = self.buffer[self.scan_offset..].find(ANSWER_KEY) else {
            // Keep a short look-behind so a key split across fragments is
            // still found, without re-scanning the whole buffer each time.
            let mut offset = self.buffer.len().saturating_sub(KEY_LOOKBEHIND);
            while !self.buffer.is_char_boundary(offset) {
                offset -= 1;
            }
            self.scan_offset = offset;
            return false;
        };

        let key_start = self.scan_offset + found;
        let bytes = self.buffer.as_bytes();
        let mut pos = key_start + ANSWER_KEY.len();

        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= bytes.len() {
            // Separator not arrived yet; stay on the key
            self.scan_offset = key_start;
            return false;
        }
        if bytes[pos] != b':' {
            // Not the key we want (e.g. inside a string); skip past it
            self.scan_offset = key_start + ANSWER_KEY.len();
            return self.locate_answer_value();
        }
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= bytes.len() {
            self.scan_offset = key_start;
            return false;
        }
        if bytes[pos] != b'"' {
            self.scan_offset = key_start + ANSWER_KEY.len();
            return self.locate_answer_value();
        }

        self.in_answer = true;
        self.scan_offset = pos + 1;
        true
    }

    /// Decode value characters up to the end of the buffer or the closing
    /// quote
    fn scan_value(&mut self) -> String {
        let mut out = String::new();
        let tail = &self.buffer[self.scan_offset..];
        let mut consumed = 0;
        let mut escaped = false;

        let mut chars = tail.char_indices().peekable();
        while let Some((index, c)) = chars.next() {
            if escaped {
                match c {
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    '"' => out.push('"'),
                    '\\' => out.push('\\'),
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                }
                escaped = false;
                consumed = index + c.len_utf8();
            } else if c == '\\' {
                if chars.peek().is_none() {
                    // Pending backslash: leave it for the next fragment
                    self.scan_offset += index;
                    return out;
                }
                escaped = true;
                consumed = index + 1;
            } else if c == '"' {
                self.answer_complete = true;
                self.in_answer = false;
                self.scan_offset += index + 1;
                return out;
            } else {
                out.push(c);
                consumed = index + c.len_utf8();
            }
        }

        self.scan_offset += consumed;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_fragment() {
        let mut parser = PartialAnswerParser::new();
        let delta = parser.feed(r#"{"answer": "Hello", "fallback": false}"#);
        assert_eq!(delta, "Hello");
        assert!(parser.answer_complete());
    }

    #[test]
    fn test_value_split_across_fragments() {
        let mut parser = PartialAnswerParser::new();
        assert_eq!(parser.feed(r#"{"answer": "Hel"#), "Hel");
        assert_eq!(parser.feed(r#"lo""#), "lo");
        assert!(parser.answer_complete());
        assert_eq!(parser.raw(), r#"{"answer": "Hello""#);
    }

    #[test]
    fn test_key_split_across_fragments() {
        let mut parser = PartialAnswerParser::new();
        assert_eq!(parser.feed(r#"{"ans"#), "");
        assert_eq!(parser.feed(r#"wer": "Hi""#), "Hi");
        assert!(parser.answer_complete());
    }

    #[test]
    fn test_separator_split_across_fragments() {
        let mut parser = PartialAnswerParser::new();
        assert_eq!(parser.feed(r#"{"answer""#), "");
        assert_eq!(parser.feed(r#": "#), "");
        assert_eq!(parser.feed(r#""Hi"#), "Hi");
    }

    #[test]
    fn test_escapes_decoded() {
        let mut parser = PartialAnswerParser::new();
        let delta = parser.feed(r#"{"answer": "a\nb\t\"c\"\\d""#);
        assert_eq!(delta, "a\nb\t\"c\"\\d");
    }

    #[test]
    fn test_pending_backslash_not_consumed() {
        let mut parser = PartialAnswerParser::new();
        assert_eq!(parser.feed(r#"{"answer": "x\"#), "x");
        // The backslash resolves with the next fragment
        assert_eq!(parser.feed(r#"ny""#), "\ny");
        assert!(parser.answer_complete());
    }

    #[test]
    fn test_fragments_after_close_only_buffered() {
        let mut parser = PartialAnswerParser::new();
        parser.feed(r#"{"answer": "done", "#);
        assert!(parser.answer_complete());
        assert_eq!(parser.feed(r#""fallback": false}"#), "");
        assert!(parser.raw().ends_with("false}"));
    }

    #[test]
    fn test_no_answer_key_yields_nothing() {
        let mut parser = PartialAnswerParser::new();
        assert_eq!(parser.feed(r#"{"reason": "none"}"#), "");
        assert!(!parser.answer_complete());
    }

    #[test]
    fn test_multibyte_answer() {
        let mut parser = PartialAnswerParser::new();
        assert_eq!(parser.feed(r#"{"answer": "日銀が"#), "日銀が");
        assert_eq!(parser.feed(r#"金利を""#), "金利を");
        assert!(parser.answer_complete());
    }

    #[test]
    fn test_empty_answer_value() {
        let mut parser = PartialAnswerParser::new();
        assert_eq!(parser.feed(r#"{"answer": """#), "");
        assert!(parser.answer_complete());
    }
}
