use crate::input::{DEFAULT_PRESET, InputKind, TextField};
use crate::selection::Selection;
use crate::store::{ConfigStore, Record};
use crate::supervisor::Supervisor;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::error::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    EditingUrl(TextField),
    EditingPreset(TextField),
}

impl Mode {
    fn editing(kind: InputKind, field: TextField) -> Self {
        match kind {
            InputKind::Url => Self::EditingUrl(field),
            InputKind::Preset => Self::EditingPreset(field),
        }
    }

    pub fn input(&self) -> Option<(InputKind, &TextField)> {
        match self {
            Self::Normal => None,
            Self::EditingUrl(field) => Some((InputKind::Url, field)),
            Self::EditingPreset(field) => Some((InputKind::Preset, field)),
        }
    }
}

/// Severity of the status line. Messages embed user data, so colour is
/// never derived from their wording.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusLevel {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    None,
    Quit,
}

/// Session state: saved lists, their selections, the input mode and the
/// supervised stream.
#[derive(Debug)]
pub struct App {
    store: ConfigStore,
    urls: Selection,
    presets: Selection,
    mode: Mode,
    supervisor: Supervisor,
    status: String,
    status_level: StatusLevel,
}

impl App {
    /// Loads the saved record, falling back to an empty one when it cannot
    /// be read.
    pub fn load(store: ConfigStore, supervisor: Supervisor) -> Self {
        match store.load() {
            Ok(record) => {
                let mut app = Self::new(store, record, supervisor);
                let loaded = format!(
                    "Loaded {} url(s) and {} preset(s).",
                    app.urls.len(),
                    app.presets.len()
                );
                app.set_status(StatusLevel::Success, loaded);
                app
            }
            Err(err) => {
                let message = error_chain(&err);
                warn!(error = %message, "using empty config");
                let mut app = Self::new(store, Record::default(), supervisor);
                app.set_status(
                    StatusLevel::Error,
                    format!("Config error, starting empty: {message}"),
                );
                app
            }
        }
    }

    pub fn new(store: ConfigStore, record: Record, supervisor: Supervisor) -> Self {
        Self {
            store,
            urls: Selection::new(record.urls),
            presets: Selection::new(record.presets),
            mode: Mode::Normal,
            supervisor,
            status: String::new(),
            status_level: StatusLevel::default(),
        }
    }

    pub fn urls(&self) -> &Selection {
        &self.urls
    }

    pub fn presets(&self) -> &Selection {
        &self.presets
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn status_level(&self) -> StatusLevel {
        self.status_level
    }

    fn set_status(&mut self, level: StatusLevel, message: impl Into<String>) {
        self.status = message.into();
        self.status_level = level;
    }

    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    pub fn record(&self) -> Record {
        Record {
            urls: self.urls.items().to_vec(),
            presets: self.presets.items().to_vec(),
        }
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> AppCommand {
        if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c'))
        {
            self.shutdown().await;
            return AppCommand::Quit;
        }

        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Normal => self.handle_normal_key(key).await,
            Mode::EditingUrl(field) => {
                self.handle_edit_key(InputKind::Url, field, key);
                AppCommand::None
            }
            Mode::EditingPreset(field) => {
                self.handle_edit_key(InputKind::Preset, field, key);
                AppCommand::None
            }
        }
    }

    /// Pasted text goes into the open input field; elsewhere it is ignored.
    pub fn handle_paste(&mut self, text: &str) {
        match &mut self.mode {
            Mode::EditingUrl(field) | Mode::EditingPreset(field) => {
                // Single-line field: flatten line breaks from the clipboard.
                field.insert_str(&text.replace(['\r', '\n'], " "));
            }
            Mode::Normal => {}
        }
    }

    async fn handle_normal_key(&mut self, key: KeyEvent) -> AppCommand {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Char('q') => {
                self.shutdown().await;
                return AppCommand::Quit;
            }
            KeyCode::Char('w' | 'W') => self.urls.move_previous(),
            KeyCode::Char('s' | 'S') => self.urls.move_next(),
            KeyCode::Up => self.presets.move_previous(),
            KeyCode::Down => self.presets.move_next(),
            KeyCode::Enter => self.confirm_selection().await,
            KeyCode::Char('A') => self.delete(InputKind::Url),
            KeyCode::Char('a') if shift => self.delete(InputKind::Url),
            KeyCode::Char('a') => self.open_input(InputKind::Url),
            KeyCode::Char('P') => self.delete(InputKind::Preset),
            KeyCode::Char('p') if shift => self.delete(InputKind::Preset),
            KeyCode::Char('p') => self.open_input(InputKind::Preset),
            _ => {}
        }
        AppCommand::None
    }

    fn handle_edit_key(&mut self, kind: InputKind, mut field: TextField, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                debug!(?kind, "input cancelled");
            }
            KeyCode::Enter => {
                if !self.commit_input(kind, field.value()) {
                    self.mode = Mode::editing(kind, field);
                }
            }
            _ => {
                field.handle_key(key);
                self.mode = Mode::editing(kind, field);
            }
        }
    }

    fn open_input(&mut self, kind: InputKind) {
        self.mode = Mode::editing(kind, TextField::new(kind));
    }

    fn list_mut(&mut self, kind: InputKind) -> &mut Selection {
        match kind {
            InputKind::Url => &mut self.urls,
            InputKind::Preset => &mut self.presets,
        }
    }

    /// Returns `false` when nothing was added and the input should stay open.
    fn commit_input(&mut self, kind: InputKind, raw: &str) -> bool {
        let value = raw.trim();
        let list = self.list_mut(kind);
        let entry = if !value.is_empty() {
            value
        } else if kind == InputKind::Preset && list.is_empty() {
            DEFAULT_PRESET
        } else {
            return false;
        };

        if !list.add(entry) {
            return false;
        }
        info!(?kind, "entry added");
        let added = match kind {
            InputKind::Url => "URL added.",
            InputKind::Preset => "Preset added.",
        };
        self.set_status(StatusLevel::Success, added);
        self.persist();
        true
    }

    fn delete(&mut self, kind: InputKind) {
        let Some(removed) = self.list_mut(kind).delete() else {
            return;
        };
        info!(?kind, "entry deleted");
        self.set_status(StatusLevel::Info, format!("Deleted {removed}"));
        self.persist();
    }

    fn persist(&mut self) {
        if let Err(err) = self.store.save(&self.record()) {
            let message = error_chain(&err);
            warn!(error = %message, "config not saved");
            self.set_status(StatusLevel::Error, format!("Failed saving config: {message}"));
        }
    }

    async fn confirm_selection(&mut self) {
        self.urls.confirm();
        self.presets.confirm();

        let (Some(url), Some(preset)) = (self.urls.confirmed_item(), self.presets.confirmed_item())
        else {
            let hint = if self.urls.is_empty() {
                "Add a stream URL first (a)."
            } else if self.presets.is_empty() {
                "Add a preset first (p)."
            } else {
                "Pick a URL and a preset."
            };
            self.set_status(StatusLevel::Info, hint);
            return;
        };
        let (url, preset) = (url.to_owned(), preset.to_owned());

        // The attempt consumes both confirmations whether or not it succeeds.
        self.urls.clear_confirmation();
        self.presets.clear_confirmation();
        self.start_stream(&url, &preset).await;
    }

    async fn start_stream(&mut self, url: &str, preset: &str) {
        match self.supervisor.start(url, preset).await {
            Ok(pid) => {
                self.set_status(StatusLevel::Success, format!("Streaming to {url} (pid {pid})"));
            }
            Err(err) => {
                let message = error_chain(&err);
                warn!(error = %message, url, "stream not started");
                self.set_status(StatusLevel::Error, format!("Failed to start stream: {message}"));
            }
        }
    }

    /// Picks up an encoder that exited without being stopped.
    pub fn poll_stream(&mut self) {
        if let Some((pid, status)) = self.supervisor.poll_exit() {
            self.set_status(
                StatusLevel::Warning,
                format!("Stream process {pid} exited ({status})"),
            );
        }
    }

    /// Stops any running stream. Safe to call more than once.
    pub async fn shutdown(&mut self) {
        if !self.supervisor.is_running() {
            return;
        }
        match self.supervisor.stop().await {
            Ok(Some(pid)) => {
                self.set_status(StatusLevel::Warning, format!("Stream process {pid} stopped"));
            }
            Ok(None) => {}
            Err(err) => warn!(error = %error_chain(&err), "stream not stopped cleanly"),
        }
    }
}

fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
