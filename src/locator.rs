//! Map a fragment of rendered preview text back to a caret offset in the
//! raw source.
//!
//! Rendering rewrites whitespace and strips markup, so the mapping is a
//! best-effort heuristic: exact normalized match first, then the first
//! distinctive word, then nothing.

/// Words this short are too common to anchor on.
const MIN_WORD_CHARS: usize = 4;

/// Collapse whitespace runs to one space, trim, and lowercase.
pub fn normalize(text: &str) -> String {
    Normalized::new(text).text
}

/// Character offset in `content` where `fragment` most plausibly starts.
///
/// Returns `None` when nothing matches or either input is blank.
pub fn find_cursor_offset(content: &str, fragment: &str) -> Option<usize> {
    let needle = normalize(fragment);
    if needle.is_empty() {
        return None;
    }
    let haystack = Normalized::new(content);

    if let Some(idx) = haystack.text.find(&needle) {
        return Some(haystack.raw_offset(idx));
    }

    needle
        .split(' ')
        .filter(|word| word.chars().count() >= MIN_WORD_CHARS)
        .find_map(|word| haystack.text.find(word))
        .map(|idx| haystack.raw_offset(idx))
}

/// Normalized text plus, for every byte of it, the char index in the
/// original string it came from.
struct Normalized {
    text: String,
    origins: Vec<usize>,
}

impl Normalized {
    fn new(raw: &str) -> Self {
        let mut text = String::with_capacity(raw.len());
        let mut origins = Vec::with_capacity(raw.len());
        let mut run_start: Option<usize> = None;

        for (char_idx, ch) in raw.chars().enumerate() {
            if ch.is_whitespace() {
                run_start.get_or_insert(char_idx);
                continue;
            }
            if let Some(start) = run_start.take()
                && !text.is_empty()
            {
                text.push(' ');
                origins.push(start);
            }
            for lower in ch.to_lowercase() {
                text.push(lower);
                origins.extend(std::iter::repeat_n(char_idx, lower.len_utf8()));
            }
        }

        Self { text, origins }
    }

    fn raw_offset(&self, byte_idx: usize) -> usize {
        self.origins.get(byte_idx).copied().unwrap_or_default()
    }
}
