//! Markdown formatting toggles for the editor toolbar.
//!
//! Every action is a pure function of `(text, selection)`: it adds its
//! markup when absent and removes it when present. Inline actions work on
//! the selection, block actions on the lines the selection touches.
//! Offsets are in chars.

/// A toolbar formatting action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatAction {
    Bold,
    Italic,
    Heading,
    List,
    Quote,
    CodeBlock,
    Link,
}

impl FormatAction {
    pub const ALL: [Self; 7] = [
        Self::Bold,
        Self::Italic,
        Self::Heading,
        Self::List,
        Self::Quote,
        Self::CodeBlock,
        Self::Link,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Bold => "Bold",
            Self::Italic => "Italic",
            Self::Heading => "Heading",
            Self::List => "List",
            Self::Quote => "Quote",
            Self::CodeBlock => "Code",
            Self::Link => "Link",
        }
    }
}

/// Result of a formatting action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub text: String,
    pub selection_start: usize,
    pub selection_end: usize,
}

/// Apply `action` to `text` with the selection `[start, end)`.
///
/// Out-of-range or reversed selections are clamped and ordered first.
pub fn apply(action: FormatAction, text: &str, start: usize, end: usize) -> TextEdit {
    let chars: Vec<char> = text.chars().collect();
    let (start, end) = {
        let a = start.min(chars.len());
        let b = end.min(chars.len());
        (a.min(b), a.max(b))
    };
    match action {
        FormatAction::Bold => toggle_emphasis(&chars, start, end, 2),
        FormatAction::Italic => toggle_emphasis(&chars, start, end, 1),
        FormatAction::Link => toggle_link(&chars, start, end),
        FormatAction::Heading => toggle_heading(&chars, start, end),
        FormatAction::List => toggle_line_prefix(&chars, start, end, "- "),
        FormatAction::Quote => toggle_line_prefix(&chars, start, end, "> "),
        FormatAction::CodeBlock => toggle_code_block(&chars, start, end),
    }
}

/// One replacement in original coordinates.
///
/// `sticky` insertions carry an offset sitting exactly at `at` along with
/// them; non-sticky ones leave it in front.
struct Splice {
    at: usize,
    remove: usize,
    insert: &'static str,
    sticky: bool,
}

impl Splice {
    const fn insert(at: usize, insert: &'static str, sticky: bool) -> Self {
        Self {
            at,
            remove: 0,
            insert,
            sticky,
        }
    }

    const fn remove(at: usize, remove: usize) -> Self {
        Self {
            at,
            remove,
            insert: "",
            sticky: false,
        }
    }
}

/// Apply non-overlapping splices (sorted by `at`) and carry the selection
/// through them.
fn splice(chars: &[char], splices: &[Splice], start: usize, end: usize) -> TextEdit {
    let mut text = String::with_capacity(chars.len() + 8);
    let mut cursor = 0;
    for s in splices {
        text.extend(&chars[cursor..s.at]);
        text.push_str(s.insert);
        cursor = s.at + s.remove;
    }
    text.extend(&chars[cursor..]);
    TextEdit {
        text,
        selection_start: map_offset(splices, start),
        selection_end: map_offset(splices, end),
    }
}

fn map_offset(splices: &[Splice], old: usize) -> usize {
    let mut shift: isize = 0;
    for s in splices {
        let inserted = s.insert.chars().count().cast_signed();
        let stays_in_front = old == s.at && (s.remove > 0 || !s.sticky);
        if old < s.at || stays_in_front {
            break;
        }
        if old <= s.at + s.remove {
            if s.remove == 0 {
                shift += inserted;
                continue;
            }
            return s.at.saturating_add_signed(shift);
        }
        shift += inserted - s.remove.cast_signed();
    }
    old.saturating_add_signed(shift)
}

fn run_before(chars: &[char], idx: usize, ch: char) -> usize {
    chars[..idx].iter().rev().take_while(|c| **c == ch).count()
}

fn run_after(chars: &[char], idx: usize, ch: char) -> usize {
    chars[idx..].iter().take_while(|c| **c == ch).count()
}

fn emphasis_present(before: usize, after: usize, width: usize) -> bool {
    if width >= 2 {
        before >= 2 && after >= 2
    } else {
        // `**bold**` is not italic; `***both***` is.
        before % 2 == 1 && after % 2 == 1
    }
}

fn marker(width: usize) -> &'static str {
    if width >= 2 { "**" } else { "*" }
}

fn toggle_emphasis(chars: &[char], start: usize, end: usize, width: usize) -> TextEdit {
    let outer_before = run_before(chars, start, '*');
    let outer_after = run_after(chars, end, '*');
    if emphasis_present(outer_before, outer_after, width) {
        return splice(
            chars,
            &[
                Splice::remove(start - width, width),
                Splice::remove(end, width),
            ],
            start,
            end,
        );
    }

    let selected = &chars[start..end];
    let inner_lead = run_after(selected, 0, '*');
    let inner_trail = run_before(selected, selected.len(), '*');
    if selected.len() >= 2 * width && emphasis_present(inner_lead, inner_trail, width) {
        return splice(
            chars,
            &[
                Splice::remove(start, width),
                Splice::remove(end - width, width),
            ],
            start,
            end,
        );
    }

    let m = marker(width);
    splice(
        chars,
        &[Splice::insert(start, m, true), Splice::insert(end, m, false)],
        start,
        end,
    )
}

fn find_seq(chars: &[char], from: usize, needle: &[char]) -> Option<usize> {
    chars
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| from + i)
}

fn toggle_link(chars: &[char], start: usize, end: usize) -> TextEdit {
    // Selection is the label of `[label](url)`.
    if start > 0 && chars[start - 1] == '[' && chars[end..].starts_with(&[']', '(']) {
        let close = chars[end + 2..]
            .iter()
            .take_while(|c| **c != '\n')
            .position(|c| *c == ')')
            .map(|i| end + 2 + i);
        if let Some(close) = close {
            return splice(
                chars,
                &[
                    Splice::remove(start - 1, 1),
                    Splice::remove(end, close + 1 - end),
                ],
                start,
                end,
            );
        }
    }

    // Selection is the whole `[label](url)`.
    let selected = &chars[start..end];
    if selected.first() == Some(&'[')
        && selected.last() == Some(&')')
        && !selected.contains(&'\n')
        && let Some(label_end) = find_seq(chars, start, &[']', '(']).filter(|i| *i < end)
    {
        let edit = splice(
            chars,
            &[
                Splice::remove(start, 1),
                Splice::remove(label_end, end - label_end),
            ],
            start,
            start,
        );
        return TextEdit {
            selection_end: label_end - 1,
            ..edit
        };
    }

    splice(
        chars,
        &[Splice::insert(start, "[", true), Splice::insert(end, "](url)", false)],
        start,
        end,
    )
}

/// `[first line start, last line end)` of the lines the selection touches.
///
/// A non-empty selection ending right after a newline does not pull in
/// the following line.
fn line_block(chars: &[char], start: usize, end: usize) -> (usize, usize) {
    let block_start = chars[..start]
        .iter()
        .rposition(|c| *c == '\n')
        .map_or(0, |i| i + 1);
    let last = if end > start && chars[end - 1] == '\n' {
        end - 1
    } else {
        end
    };
    let block_end = chars[last..]
        .iter()
        .position(|c| *c == '\n')
        .map_or(chars.len(), |i| last + i);
    (block_start, block_end.max(block_start))
}

/// `(line_start, line_end)` for each line in the block.
fn lines_in(chars: &[char], block_start: usize, block_end: usize) -> Vec<(usize, usize)> {
    let mut lines = Vec::new();
    let mut line_start = block_start;
    for (i, c) in chars[block_start..block_end].iter().enumerate() {
        if *c == '\n' {
            lines.push((line_start, block_start + i));
            line_start = block_start + i + 1;
        }
    }
    lines.push((line_start, block_end));
    lines
}

/// Lines a block action applies to: the non-blank ones, or every line when
/// all are blank.
fn target_lines(chars: &[char], start: usize, end: usize) -> Vec<(usize, usize)> {
    let (block_start, block_end) = line_block(chars, start, end);
    let lines = lines_in(chars, block_start, block_end);
    let non_blank: Vec<_> = lines
        .iter()
        .copied()
        .filter(|(s, e)| chars[*s..*e].iter().any(|c| !c.is_whitespace()))
        .collect();
    if non_blank.is_empty() { lines } else { non_blank }
}

fn toggle_line_prefix(chars: &[char], start: usize, end: usize, prefix: &'static str) -> TextEdit {
    let prefix_chars: Vec<char> = prefix.chars().collect();
    let lines = target_lines(chars, start, end);
    let all_prefixed = lines
        .iter()
        .all(|(s, e)| chars[*s..*e].starts_with(&prefix_chars));

    let splices: Vec<Splice> = if all_prefixed {
        lines
            .iter()
            .map(|(s, _)| Splice::remove(*s, prefix_chars.len()))
            .collect()
    } else {
        lines
            .iter()
            .map(|(s, _)| Splice::insert(*s, prefix, true))
            .collect()
    };
    splice(chars, &splices, start, end)
}

/// Length of an ATX heading marker (`#` run plus one space) at the start
/// of the line, if any.
fn heading_marker_len(line: &[char]) -> Option<usize> {
    let hashes = run_after(line, 0, '#');
    ((1..=6).contains(&hashes) && line.get(hashes) == Some(&' ')).then_some(hashes + 1)
}

fn toggle_heading(chars: &[char], start: usize, end: usize) -> TextEdit {
    let lines = target_lines(chars, start, end);
    let markers: Vec<Option<usize>> = lines
        .iter()
        .map(|(s, e)| heading_marker_len(&chars[*s..*e]))
        .collect();

    let splices: Vec<Splice> = if markers.iter().all(Option::is_some) {
        lines
            .iter()
            .zip(&markers)
            .map(|((s, _), len)| Splice::remove(*s, len.unwrap_or_default()))
            .collect()
    } else {
        lines
            .iter()
            .map(|(s, _)| Splice::insert(*s, "# ", true))
            .collect()
    };
    splice(chars, &splices, start, end)
}

fn is_fence(line: &[char]) -> bool {
    line.starts_with(&['`', '`', '`'])
}

fn toggle_code_block(chars: &[char], start: usize, end: usize) -> TextEdit {
    let (block_start, block_end) = line_block(chars, start, end);

    let opening = (block_start > 0).then(|| {
        let line_end = block_start - 1;
        let line_start = chars[..line_end]
            .iter()
            .rposition(|c| *c == '\n')
            .map_or(0, |i| i + 1);
        (line_start, line_end)
    });
    let closing = (block_end < chars.len()).then(|| {
        let line_start = block_end + 1;
        let line_end = chars[line_start..]
            .iter()
            .position(|c| *c == '\n')
            .map_or(chars.len(), |i| line_start + i);
        (line_start, line_end)
    });

    if let (Some((open_start, open_end)), Some((close_start, close_end))) = (opening, closing)
        && is_fence(&chars[open_start..open_end])
        && chars[close_start..close_end].iter().collect::<String>().trim() == "```"
    {
        return splice(
            chars,
            &[
                Splice::remove(open_start, block_start - open_start),
                Splice::remove(block_end, close_end - block_end),
            ],
            start,
            end,
        );
    }

    splice(
        chars,
        &[
            Splice::insert(block_start, "```\n", true),
            Splice::insert(block_end, "\n```", false),
        ],
        start,
        end,
    )
}
