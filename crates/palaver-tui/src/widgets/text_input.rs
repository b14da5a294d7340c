//! Editable message buffer behind the input bar.

/// Content and cursor of the message being composed, plus recall of
/// previously sent messages.
///
/// The cursor is a character index, so multi-byte input never splits a
/// code point.
#[derive(Debug, Clone, Default)]
pub struct TextInputState {
    content: String,
    cursor: usize,
    /// Sent messages, oldest first.
    history: Vec<String>,
    /// Position while browsing history; `None` means editing a fresh draft.
    history_index: Option<usize>,
    /// Draft put aside while browsing history.
    saved_draft: String,
}

impl TextInputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Cursor position as a character index.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Whether the content is a recalled message rather than a fresh draft.
    pub fn is_recalling(&self) -> bool {
        self.history_index.is_some()
    }

    /// Number of display lines the content occupies (at least one).
    pub fn line_count(&self) -> usize {
        self.content.split('\n').count()
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
        self.history_index = None;
    }

    /// Take the content, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        self.history_index = None;
        std::mem::take(&mut self.content)
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_idx)
            .map_or(self.content.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn insert(&mut self, ch: char) {
        let at = self.byte_offset(self.cursor);
        self.content.insert(at, ch);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        let at = self.byte_offset(self.cursor);
        self.content.insert_str(at, s);
        self.cursor += s.chars().count();
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_offset(self.cursor);
        self.content.remove(at);
    }

    /// Delete the character under the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_offset(self.cursor);
            self.content.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_len());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Take the content and remember it for recall. Blank content is not
    /// remembered.
    pub fn submit(&mut self) -> String {
        let content = self.take();
        if !content.trim().is_empty() && self.history.last() != Some(&content) {
            self.history.push(content.clone());
        }
        self.saved_draft.clear();
        content
    }

    /// Recall the previous sent message.
    pub fn history_prev(&mut self) {
        let next = match self.history_index {
            None if self.history.is_empty() => return,
            None => {
                self.saved_draft = self.content.clone();
                self.history.len() - 1
            }
            Some(0) => return,
            Some(i) => i - 1,
        };
        self.show_history(next);
    }

    /// Step forward through recall, returning to the draft past the newest.
    pub fn history_next(&mut self) {
        match self.history_index {
            None => {}
            Some(i) if i + 1 < self.history.len() => self.show_history(i + 1),
            Some(_) => {
                self.history_index = None;
                self.content = std::mem::take(&mut self.saved_draft);
                self.cursor = self.char_len();
            }
        }
    }

    fn show_history(&mut self, index: usize) {
        self.history_index = Some(index);
        self.content = self.history[index].clone();
        self.cursor = self.char_len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_editing() {
        let mut state = TextInputState::new();
        assert!(state.is_empty());

        state.insert('H');
        state.insert('i');
        assert_eq!(state.content(), "Hi");
        assert_eq!(state.cursor(), 2);

        state.backspace();
        assert_eq!(state.content(), "H");

        state.clear();
        assert!(state.is_empty());
    }

    #[test]
    fn test_cursor_movement() {
        let mut state = TextInputState::new();
        state.insert_str("Hello");

        state.move_left();
        state.move_left();
        state.insert('X');
        assert_eq!(state.content(), "HelXlo");

        state.move_home();
        state.delete();
        assert_eq!(state.content(), "elXlo");

        state.move_end();
        assert_eq!(state.cursor(), 5);
        state.move_right();
        assert_eq!(state.cursor(), 5);
    }

    #[test]
    fn test_multibyte_editing() {
        let mut state = TextInputState::new();
        state.insert_str("Grüße");
        state.move_left();
        state.backspace();
        assert_eq!(state.content(), "Grüe");
        state.move_home();
        state.move_right();
        state.move_right();
        state.insert('ü');
        assert_eq!(state.content(), "Grüüe");
    }

    #[test]
    fn test_line_count() {
        let mut state = TextInputState::new();
        assert_eq!(state.line_count(), 1);
        state.insert_str("one\ntwo\nthree");
        assert_eq!(state.line_count(), 3);
    }

    #[test]
    fn test_history_recall() {
        let mut state = TextInputState::new();

        state.insert_str("Alice");
        assert_eq!(state.submit(), "Alice");
        assert!(state.is_empty());

        state.insert_str("50000");
        state.submit();

        state.insert_str("draft");
        state.history_prev();
        assert_eq!(state.content(), "50000");
        state.history_prev();
        assert_eq!(state.content(), "Alice");
        state.history_prev();
        assert_eq!(state.content(), "Alice");

        state.history_next();
        assert_eq!(state.content(), "50000");
        state.history_next();
        assert_eq!(state.content(), "draft");
    }

    #[test]
    fn test_blank_submit_not_recalled() {
        let mut state = TextInputState::new();
        state.insert_str("   ");
        state.submit();
        state.history_prev();
        assert!(state.is_empty());
    }
}
