use chrono::{Local, NaiveDateTime};
use crossterm::event::{KeyCode, KeyEvent};
use drb_core::{ReminderView, Tracker};
use drb_storage::FileStore;
use ratatui::widgets::TableState;
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, warn};

pub struct App {
    store: FileStore,
    pub tracker: Tracker,
    pub views: Vec<ReminderView>,
    pub now: NaiveDateTime,
    pub table_state: TableState,
    pub show_help: bool,
    pub last_error: Option<String>,
    last_registry_mtime: Option<SystemTime>,
    last_status_mtime: Option<SystemTime>,
    should_quit: bool,
}

impl App {
    pub fn new(store: FileStore) -> Self {
        Self {
            store,
            tracker: Tracker::default(),
            views: Vec::new(),
            now: Local::now().naive_local(),
            table_state: TableState::default(),
            show_help: false,
            last_error: None,
            last_registry_mtime: None,
            last_status_mtime: None,
            should_quit: false,
        }
    }

    pub fn store_dir(&self) -> &Path {
        self.store.dir()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Once-per-second pass: pick up the clock, reload files that
    /// changed on disk, clear markers whose cycle rolled over, and
    /// persist when the reconcile pass touched anything.
    pub fn on_tick(&mut self) {
        self.refresh(false);
    }

    pub fn refresh(&mut self, force: bool) {
        self.now = Local::now().naive_local();
        self.reload(force);
        if self.tracker.reconcile(self.now) {
            debug!("reconcile cleared stale markers");
            self.persist_status();
        }
        self.rebuild_views();
    }

    fn reload(&mut self, force: bool) {
        let registry_mtime = mtime(&self.store.registry_path());
        let status_mtime = mtime(&self.store.status_path());
        if !force
            && registry_mtime == self.last_registry_mtime
            && status_mtime == self.last_status_mtime
        {
            return;
        }

        let registry = match self.store.load_registry() {
            Ok(registry) => registry,
            Err(err) => {
                self.set_error(format!("Failed to load reminders: {err}"));
                return;
            }
        };
        let status = match self.store.load_status() {
            Ok(status) => status,
            Err(err) => {
                self.set_error(format!("Failed to load status: {err}"));
                return;
            }
        };

        self.tracker = Tracker::new(registry, status);
        self.last_registry_mtime = registry_mtime;
        self.last_status_mtime = status_mtime;
        self.last_error = None;
    }

    fn rebuild_views(&mut self) {
        self.views = self.tracker.display_state(self.now);
        if self.views.is_empty() {
            self.table_state.select(None);
        } else {
            let selected = self.table_state.selected().unwrap_or(0);
            self.table_state
                .select(Some(selected.min(self.views.len() - 1)));
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_prev(),
            KeyCode::Char('x') | KeyCode::Char(' ') | KeyCode::Enter => self.toggle_selected(),
            KeyCode::Char('R') => self.reset_all(),
            KeyCode::Char('r') => self.refresh(true),
            KeyCode::Char('?') => self.show_help = !self.show_help,
            _ => {}
        }
    }

    fn select_next(&mut self) {
        if self.views.is_empty() {
            return;
        }
        let next = match self.table_state.selected() {
            Some(idx) if idx + 1 < self.views.len() => idx + 1,
            Some(idx) => idx,
            None => 0,
        };
        self.table_state.select(Some(next));
    }

    fn select_prev(&mut self) {
        if self.views.is_empty() {
            return;
        }
        let prev = self.table_state.selected().unwrap_or(0).saturating_sub(1);
        self.table_state.select(Some(prev));
    }

    fn toggle_selected(&mut self) {
        let Some(idx) = self.table_state.selected() else {
            return;
        };
        let Some(view) = self.views.get(idx) else {
            return;
        };
        let name = view.name.clone();
        match self.tracker.toggle(&name, self.now) {
            Ok(_) => self.persist_status(),
            Err(err) => self.set_error(err.to_string()),
        }
        self.rebuild_views();
    }

    fn reset_all(&mut self) {
        if self.tracker.reset_all() {
            self.persist_status();
        }
        self.rebuild_views();
    }

    fn persist_status(&mut self) {
        if let Err(err) = self.store.save_status(self.tracker.status()) {
            warn!("failed to save status: {err}");
            self.set_error(format!("Failed to save status: {err}"));
            return;
        }
        // Track our own write so the next tick does not reload it.
        self.last_status_mtime = mtime(&self.store.status_path());
    }

    fn set_error(&mut self, message: String) {
        self.last_error = Some(message);
    }
}

fn mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|meta| meta.modified()).ok()
}
