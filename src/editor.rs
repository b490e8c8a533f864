/// Single-line input with a cursor, used for the draft row and for inline
/// editing of a task's text or due date. The cursor counts chars, not bytes.
#[derive(Debug, Clone, Default)]
pub struct LineEditor {
    pub content: String,
    pub cursor: usize,
}

impl LineEditor {
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let cursor = content.chars().count();
        LineEditor { content, cursor }
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    fn len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn insert_char(&mut self, c: char) {
        if self.cursor > self.len() {
            self.cursor = self.len();
        }

        let at = self.byte_index(self.cursor);
        self.content.insert(at, c);
        self.cursor += 1;
    }

    /// Backspace.
    pub fn delete_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let at = self.byte_index(self.cursor - 1);
        self.content.remove(at);
        self.cursor -= 1;
    }

    /// Delete the char under the cursor.
    pub fn delete_forward(&mut self) {
        if self.cursor >= self.len() {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.content.remove(at);
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    pub fn move_to_start_of_line(&mut self) {
        self.cursor = 0;
    }

    pub fn move_to_end_of_line(&mut self) {
        self.cursor = self.len();
    }

    pub fn set(&mut self, content: impl Into<String>) {
        *self = LineEditor::new(content);
    }

    /// Returns the content and leaves the editor empty.
    pub fn take(&mut self) -> String {
        let content = std::mem::take(&mut self.content);
        self.cursor = 0;
        content
    }

    pub fn get_content(&self) -> &str {
        &self.content
    }

    /// Splits the content around the cursor for rendering: text before, the
    /// char under the cursor (a space at end of line) and text after.
    pub fn split_at_cursor(&self) -> (String, String, String) {
        let chars: Vec<char> = self.content.chars().collect();
        let cursor = self.cursor.min(chars.len());
        let before: String = chars[..cursor].iter().collect();
        let (at, after) = if cursor < chars.len() {
            (chars[cursor].to_string(), chars[cursor + 1..].iter().collect())
        } else {
            (" ".to_string(), String::new())
        };
        (before, at, after)
    }
}
