use ropey::Rope;

/// Line/column of the caret, both in chars. Used for drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub line: usize,
    pub col: usize,
}

impl Cursor {
    pub const fn at(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Rope-backed editing buffer addressed by char offsets.
///
/// The caret is a char offset into the whole text. An optional anchor
/// marks the other end of a selection; moving with `extend` keeps it,
/// moving without drops it.
pub struct EditorBuffer {
    rope: Rope,
    caret: usize,
    anchor: Option<usize>,
    /// Remembered column for vertical movement.
    col_memory: usize,
}

impl EditorBuffer {
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            caret: 0,
            anchor: None,
            col_memory: 0,
        }
    }

    pub fn empty() -> Self {
        Self::from_text("")
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Content of a line without its line ending.
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let s = self.rope.line(line_idx).to_string();
        Some(s.trim_end_matches('\n').trim_end_matches('\r').to_string())
    }

    /// Char offset where a line begins; past the end clamps to the length.
    pub fn line_start(&self, line_idx: usize) -> usize {
        if line_idx >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        self.rope.line_to_char(line_idx)
    }

    /// Length of a line in chars, without its line ending.
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.chars().count())
    }

    /// Replace the whole text; the caret is clamped and the selection
    /// dropped.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.anchor = None;
        self.set_caret(self.caret);
    }

    pub const fn cursor_offset(&self) -> usize {
        self.caret
    }

    /// Place the caret at a char offset, clamped to the text.
    pub fn set_cursor_offset(&mut self, offset: usize) {
        self.anchor = None;
        self.set_caret(offset);
    }

    pub fn cursor(&self) -> Cursor {
        let line = self.rope.char_to_line(self.caret);
        Cursor::at(line, self.caret - self.rope.line_to_char(line))
    }

    /// Ordered `(start, end)` of the selection, or the caret twice.
    pub fn selection(&self) -> (usize, usize) {
        let anchor = self.anchor.unwrap_or(self.caret);
        (anchor.min(self.caret), anchor.max(self.caret))
    }

    pub fn has_selection(&self) -> bool {
        self.anchor.is_some_and(|a| a != self.caret)
    }

    /// Select `[start, end)` with the caret at `end`.
    pub fn select(&mut self, start: usize, end: usize) {
        let len = self.len_chars();
        self.anchor = Some(start.min(len));
        self.set_caret(end);
    }

    pub fn select_all(&mut self) {
        self.select(0, self.len_chars());
    }

    pub fn selected_text(&self) -> String {
        let (start, end) = self.selection();
        self.rope.slice(start..end).to_string()
    }

    /// Insert at the caret, replacing the selection if there is one.
    pub fn insert_str(&mut self, s: &str) {
        self.delete_selection();
        if s.is_empty() {
            return;
        }
        self.rope.insert(self.caret, s);
        self.set_caret(self.caret + s.chars().count());
    }

    pub fn insert_char(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        self.insert_str(ch.encode_utf8(&mut buf));
    }

    /// Split the current line at the caret (Enter key).
    pub fn split_line(&mut self) {
        self.insert_char('\n');
    }

    /// Backspace. Returns `true` if anything was removed.
    pub fn delete_back(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        if self.caret == 0 {
            return false;
        }
        self.rope.remove(self.caret - 1..self.caret);
        self.set_caret(self.caret - 1);
        true
    }

    /// Delete key. Returns `true` if anything was removed.
    pub fn delete_forward(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        if self.caret >= self.len_chars() {
            return false;
        }
        self.rope.remove(self.caret..=self.caret);
        true
    }

    fn delete_selection(&mut self) -> bool {
        let (start, end) = self.selection();
        self.anchor = None;
        if start == end {
            return false;
        }
        self.rope.remove(start..end);
        self.set_caret(start);
        true
    }

    /// Move the caret; with `extend` the selection grows instead of being
    /// dropped.
    pub fn move_cursor(&mut self, direction: Direction, extend: bool) {
        self.begin_move(extend);
        match direction {
            Direction::Left => self.set_caret(self.caret.saturating_sub(1)),
            Direction::Right => self.set_caret(self.caret + 1),
            Direction::Up => self.move_vertical(-1),
            Direction::Down => self.move_vertical(1),
        }
    }

    pub fn move_home(&mut self, extend: bool) {
        self.begin_move(extend);
        let line = self.rope.char_to_line(self.caret);
        self.set_caret(self.rope.line_to_char(line));
    }

    pub fn move_end(&mut self, extend: bool) {
        self.begin_move(extend);
        let line = self.rope.char_to_line(self.caret);
        self.set_caret(self.rope.line_to_char(line) + self.line_len(line));
    }

    pub fn move_to_start(&mut self, extend: bool) {
        self.begin_move(extend);
        self.set_caret(0);
    }

    pub fn move_to_end(&mut self, extend: bool) {
        self.begin_move(extend);
        self.set_caret(self.len_chars());
    }

    /// Ctrl+Left: to the start of the previous word.
    pub fn move_word_left(&mut self, extend: bool) {
        self.begin_move(extend);
        let mut idx = self.caret;
        while idx > 0 && !is_word_char(self.rope.char(idx - 1)) {
            idx -= 1;
        }
        while idx > 0 && is_word_char(self.rope.char(idx - 1)) {
            idx -= 1;
        }
        self.set_caret(idx);
    }

    /// Ctrl+Right: past the current word and the gap after it.
    pub fn move_word_right(&mut self, extend: bool) {
        self.begin_move(extend);
        let len = self.len_chars();
        let mut idx = self.caret;
        while idx < len && is_word_char(self.rope.char(idx)) {
            idx += 1;
        }
        while idx < len && !is_word_char(self.rope.char(idx)) {
            idx += 1;
        }
        self.set_caret(idx);
    }

    /// Place the caret at a line/column (chars), clamped.
    pub fn move_to(&mut self, line: usize, col: usize) {
        self.anchor = None;
        let line = line.min(self.line_count().saturating_sub(1));
        let col = col.min(self.line_len(line));
        self.set_caret(self.rope.line_to_char(line) + col);
    }

    fn begin_move(&mut self, extend: bool) {
        if extend {
            self.anchor.get_or_insert(self.caret);
        } else {
            self.anchor = None;
        }
    }

    fn set_caret(&mut self, offset: usize) {
        self.caret = offset.min(self.len_chars());
        self.col_memory = self.cursor().col;
    }

    fn move_vertical(&mut self, delta: isize) {
        let Cursor { line, .. } = self.cursor();
        let Some(target) = line
            .checked_add_signed(delta)
            .filter(|l| *l < self.line_count())
        else {
            return;
        };
        let memory = self.col_memory;
        self.caret = self.rope.line_to_char(target) + memory.min(self.line_len(target));
        self.col_memory = memory;
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("caret", &self.caret)
            .field("anchor", &self.anchor)
            .finish_non_exhaustive()
    }
}
