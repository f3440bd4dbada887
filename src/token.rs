use unicode_segmentation::UnicodeSegmentation;

/// A single word token: a byte offset/length pair into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub start: u32,
    pub len: u32,
}

impl Token {
    pub fn slice<'a>(&self, text: &'a [u8]) -> &'a [u8] {
        &text[self.start as usize..(self.start + self.len) as usize]
    }
}

/// Segments `text` into word tokens using Unicode word-break rules,
/// truncating the input to `cap` bytes first (at a char boundary).
///
/// Only segments that contain at least one alphanumeric character are kept,
/// matching `UBRK_WORD_NONE` filtering in the word-break original this is
/// adapted from: whitespace/punctuation runs between words are dropped.
pub fn tokenize(text: &str, cap: usize) -> Vec<Token> {
    let text = truncate_to_char_boundary(text, cap);
    let mut tokens = Vec::new();
    let mut offset = 0u32;
    for word in text.split_word_bounds() {
        let len = word.len() as u32;
        if is_word(word) {
            tokens.push(Token { start: offset, len });
        }
        offset += len;
    }
    tokens
}

fn is_word(segment: &str) -> bool {
    segment.chars().any(|c| c.is_alphanumeric())
}

fn truncate_to_char_boundary(text: &str, cap: usize) -> &str {
    if text.len() <= cap {
        return text;
    }
    let mut end = cap;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace_and_punctuation() {
        let tokens = tokenize("The quick, brown fox!", 1024);
        let text = "The quick, brown fox!";
        let words: Vec<&str> = tokens
            .iter()
            .map(|t| std::str::from_utf8(t.slice(text.as_bytes())).unwrap())
            .collect();
        assert_eq!(words, vec!["The", "quick", "brown", "fox"]);
    }

    #[test]
    fn truncates_to_cap_at_char_boundary() {
        let text = "héllo wörld"; // contains multi-byte chars
        let tokens = tokenize(text, 3);
        // cap lands mid-codepoint on "é" (2 bytes at offset 1); must back off.
        for t in &tokens {
            assert!((t.start + t.len) as usize <= text.len());
        }
    }

    #[test]
    fn empty_text_has_no_tokens() {
        assert!(tokenize("", 1024).is_empty());
    }

    #[test]
    fn offsets_refer_back_to_original_bytes() {
        let text = "alpha beta";
        let tokens = tokenize(text, 1024);
        assert_eq!(tokens.len(), 2);
        assert_eq!(&text[tokens[1].start as usize..(tokens[1].start + tokens[1].len) as usize], "beta");
    }
}
