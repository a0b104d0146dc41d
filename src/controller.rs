use std::collections::HashMap;
use std::time::Duration;
use tracing::trace;

use crate::domain::{Message, TVConfig, TVError};
use crate::model::Model;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};

/// Turns terminal events into messages for the model.
///
/// Key bindings are registered with [`Controller::bind`]; events are handled
/// one at a time in the order the terminal delivers them.
pub struct Controller {
    event_poll_time: u64,
    bindings: HashMap<KeyCode, Message>,
}

impl Controller {
    pub fn new(cfg: &TVConfig) -> Self {
        let mut controller = Self {
            event_poll_time: cfg.event_poll_time,
            bindings: HashMap::new(),
        };
        controller.bind_defaults();
        controller
    }

    /// Register the message produced by pressing `key`. Replaces an earlier binding.
    pub fn bind(&mut self, key: KeyCode, message: Message) -> &mut Self {
        self.bindings.insert(key, message);
        self
    }

    fn bind_defaults(&mut self) {
        self.bind(KeyCode::Char('q'), Message::Quit)
            .bind(KeyCode::Up, Message::MoveUp)
            .bind(KeyCode::Char('k'), Message::MoveUp)
            .bind(KeyCode::Down, Message::MoveDown)
            .bind(KeyCode::Char('j'), Message::MoveDown)
            .bind(KeyCode::Left, Message::MoveLeft)
            .bind(KeyCode::Char('h'), Message::MoveLeft)
            .bind(KeyCode::Right, Message::MoveRight)
            .bind(KeyCode::Char('l'), Message::MoveRight)
            .bind(KeyCode::PageUp, Message::MovePageUp)
            .bind(KeyCode::PageDown, Message::MovePageDown)
            .bind(KeyCode::Char('g'), Message::MoveBeginning)
            .bind(KeyCode::Home, Message::MoveBeginning)
            .bind(KeyCode::Char('G'), Message::MoveEnd)
            .bind(KeyCode::End, Message::MoveEnd)
            .bind(KeyCode::Char('0'), Message::MoveToFirstColumn)
            .bind(KeyCode::Char('$'), Message::MoveToLastColumn)
            .bind(KeyCode::Char('s'), Message::SortCurrentColumn)
            .bind(KeyCode::Char('/'), Message::Search)
            .bind(KeyCode::Char('f'), Message::Filter)
            .bind(KeyCode::Char('r'), Message::ResetFilters)
            .bind(KeyCode::Char('t'), Message::ToggleTheme)
            .bind(KeyCode::Char('c'), Message::Calculator)
            .bind(KeyCode::Char('?'), Message::Help)
            .bind(KeyCode::Enter, Message::Enter)
            .bind(KeyCode::Esc, Message::Exit);
        for n in 1..=9u8 {
            self.bind(
                KeyCode::Char((b'0' + n) as char),
                Message::SortColumn(n as usize - 1),
            );
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, TVError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            match event::read()? {
                Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                    return Ok(self.handle_key(key, model.raw_keyevents()));
                }
                Event::Resize(width, height) => {
                    return Ok(Some(Message::Resize(width as usize, height as usize)));
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn handle_key(&self, key: KeyEvent, raw: bool) -> Option<Message> {
        if raw {
            return Some(Message::RawKey(key));
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Message::Quit);
        }
        let message = self.bindings.get(&key.code).cloned();
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
