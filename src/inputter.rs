use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};
use tracing::trace;

/// Single line editor used by the search line and form fields.
#[derive(Default)]
pub struct Inputter {
    current_input: String,
    curser_pos: usize, // In chars, not bytes
    finished: bool,
    canceled: bool,
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct InputResult {
    pub input: String,
    pub finished: bool,
    pub canceled: bool,
    pub changed: bool,
    pub curser_pos: usize,
}

impl Inputter {
    pub fn read(&mut self, key: event::KeyEvent) -> InputResult {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => self.enter(),
            (KeyCode::Esc, _) => self.escape(),
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.left(),
            (KeyCode::Right, _) => self.right(),
            (KeyCode::Home, _) => self.home(),
            (KeyCode::End, _) => self.end(),
            (kc, km) => self.key(kc, km),
        }
    }

    /// Replace the content and move the curser behind it.
    pub fn set(&mut self, s: &str) {
        self.current_input = s.to_string();
        self.curser_pos = self.current_input.chars().count();
        self.finished = false;
        self.canceled = false;
    }

    pub fn get(&self) -> InputResult {
        self.result(false)
    }

    pub fn clear(&mut self) {
        self.canceled = false;
        self.finished = false;
        self.current_input.clear();
        self.curser_pos = 0;
    }

    fn result(&self, changed: bool) -> InputResult {
        InputResult {
            canceled: self.canceled,
            finished: self.finished,
            changed,
            input: self.current_input.clone(),
            curser_pos: self.curser_pos,
        }
    }

    fn enter(&mut self) -> InputResult {
        self.finished = true;
        self.result(false)
    }

    fn escape(&mut self) -> InputResult {
        let had_input = !self.current_input.is_empty();
        self.clear();
        self.canceled = true;
        self.finished = true;
        self.result(had_input)
    }

    fn backspace(&mut self) -> InputResult {
        if self.curser_pos == 0 {
            return self.result(false);
        }
        self.curser_pos -= 1;
        let idx = self.getbytepos();
        self.current_input.remove(idx);
        self.result(true)
    }

    fn delete(&mut self) -> InputResult {
        if self.curser_pos >= self.current_input.chars().count() {
            return self.result(false);
        }
        let idx = self.getbytepos();
        self.current_input.remove(idx);
        self.result(true)
    }

    fn left(&mut self) -> InputResult {
        self.curser_pos = self.curser_pos.saturating_sub(1);
        self.result(false)
    }

    fn right(&mut self) -> InputResult {
        if self.curser_pos < self.current_input.chars().count() {
            self.curser_pos += 1;
        }
        self.result(false)
    }

    fn home(&mut self) -> InputResult {
        self.curser_pos = 0;
        self.result(false)
    }

    fn end(&mut self) -> InputResult {
        self.curser_pos = self.current_input.chars().count();
        self.result(false)
    }

    fn key(&mut self, code: KeyCode, modifier: KeyModifiers) -> InputResult {
        if modifier.contains(KeyModifiers::CONTROL) {
            trace!("Ignoring control key {code:?}");
            return self.result(false);
        }
        match code.as_char() {
            Some(chr) => {
                let idx = self.getbytepos();
                self.current_input.insert(idx, chr);
                self.curser_pos += 1;
                self.result(true)
            }
            None => self.result(false),
        }
    }

    fn getbytepos(&self) -> usize {
        self.current_input
            .char_indices()
            .nth(self.curser_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}
