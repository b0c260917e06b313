//! Presentation state and key dispatch.
//!
//! `App` holds what only the screen cares about (input buffer, selected
//! category, cursor, theme) and forwards user intents to the [`TaskStore`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::Theme;
use crate::storage::SlotStore;
use crate::task::{Category, TaskId};
use crate::task_store::TaskStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Editing,
}

#[derive(Debug)]
pub struct App<S> {
    pub store: TaskStore<S>,
    pub input: String,
    pub category: Category,
    pub selected: usize,
    pub theme: Theme,
    pub mode: Mode,
    pub should_quit: bool,
}

impl<S: SlotStore> App<S> {
    pub fn new(store: TaskStore<S>, theme: Theme, category: Category) -> Self {
        Self {
            store,
            input: String::new(),
            category,
            selected: 0,
            theme,
            mode: Mode::Normal,
            should_quit: false,
        }
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        self.store
            .tasks()
            .iter()
            .nth(self.selected)
            .map(|t| t.id.clone())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        match self.mode {
            Mode::Normal => self.handle_normal_key(key.code),
            Mode::Editing => self.handle_editing_key(key.code),
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('a') | KeyCode::Char('i') => self.mode = Mode::Editing,
            KeyCode::Tab => self.category = self.category.next(),
            KeyCode::Char('t') => self.theme = self.theme.toggled(),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.store.tasks().len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                if let Some(id) = self.selected_id() {
                    self.store.toggle_complete(&id);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_id() {
                    self.store.delete(&id);
                    self.clamp_selection();
                }
            }
            _ => {}
        }
    }

    fn handle_editing_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Enter => self.submit(),
            KeyCode::Tab => self.category = self.category.next(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
    }

    /// Adds the input as a task. The buffer is cleared only when a task was
    /// created, so blank input stays put.
    fn submit(&mut self) {
        if self.store.add(&self.input, self.category).is_some() {
            self.input.clear();
            self.selected = self.store.tasks().len() - 1;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.store.tasks().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }
}
