use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub const URL_PLACEHOLDER: &str = "rtmp://example.com/live/stream";
pub const URL_CHAR_LIMIT: usize = 200;
pub const PRESET_CHAR_LIMIT: usize = 1000;

/// Used in place of an empty entry when the preset list has nothing yet.
pub const DEFAULT_PRESET: &str = "-f v4l2 -framerate 25 -video_size 1920x1080 -i /dev/video0 -f alsa -i plughw:2,0 libx264 aac -preset veryfast -maxrate 1M -bufsize 2M -pix_fmt yuv420p -b:a 96k -ar 44100";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Url,
    Preset,
}

impl InputKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::Url => "Add stream URL",
            Self::Preset => "Add stream preset",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Url => URL_PLACEHOLDER,
            Self::Preset => DEFAULT_PRESET,
        }
    }

    pub fn char_limit(self) -> usize {
        match self {
            Self::Url => URL_CHAR_LIMIT,
            Self::Preset => PRESET_CHAR_LIMIT,
        }
    }
}

/// Single-line editable text with a char-indexed insertion point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    value: String,
    cursor: usize,
    char_limit: usize,
    placeholder: &'static str,
}

impl TextField {
    #[must_use]
    pub fn new(kind: InputKind) -> Self {
        Self {
            value: String::new(),
            cursor: 0,
            char_limit: kind.char_limit(),
            placeholder: kind.placeholder(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    /// Insertion point in chars.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map_or(self.value.len(), |(offset, _)| offset)
    }

    pub fn insert(&mut self, c: char) {
        if c.is_control() || self.char_count() >= self.char_limit {
            return;
        }
        let offset = self.byte_offset(self.cursor);
        self.value.insert(offset, c);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars() {
            self.insert(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let offset = self.byte_offset(self.cursor);
        self.value.remove(offset);
    }

    pub fn delete(&mut self) {
        if self.cursor >= self.char_count() {
            return;
        }
        let offset = self.byte_offset(self.cursor);
        self.value.remove(offset);
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    pub fn clear_to_start(&mut self) {
        let offset = self.byte_offset(self.cursor);
        self.value.replace_range(..offset, "");
        self.cursor = 0;
    }

    /// Applies a standard line-editing key. Keys it does not know are ignored.
    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('a') if ctrl => self.move_home(),
            KeyCode::Char('e') if ctrl => self.move_end(),
            KeyCode::Char('u') if ctrl => self.clear_to_start(),
            KeyCode::Char(c) => {
                if ctrl || key.modifiers.contains(KeyModifiers::ALT) {
                    return;
                }
                self.insert(c);
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            _ => {}
        }
    }
}
