//! In-terminal file and directory browser used by the form's path fields.

use super::state::Field;
use crossterm::event::{KeyCode, KeyEvent};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerMode {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Directory mode only: pick the directory being shown
    UseThisDir,
    Parent,
    Dir(OsString),
    File(OsString),
}

impl Entry {
    pub fn label(&self) -> String {
        match self {
            Entry::UseThisDir => "[ Use this directory ]".into(),
            Entry::Parent => "../".into(),
            Entry::Dir(name) => format!("{}/", name.to_string_lossy()),
            Entry::File(name) => name.to_string_lossy().into_owned(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum PickerAction {
    None,
    Cancel,
    Chosen(PathBuf),
}

pub struct Picker {
    pub mode: PickerMode,
    pub target: Field,
    pub cwd: PathBuf,
    pub entries: Vec<Entry>,
    pub selected: usize,
    pub show_hidden: bool,
    pub error: Option<String>,
}

impl Picker {
    pub fn open(mode: PickerMode, target: Field, start: PathBuf) -> Self {
        let mut picker = Self {
            mode,
            target,
            cwd: start,
            entries: Vec::new(),
            selected: 0,
            show_hidden: false,
            error: None,
        };
        picker.refresh();
        picker
    }

    /// Re-read the current directory. Unreadable directories leave only navigation entries.
    pub fn refresh(&mut self) {
        let mut entries = Vec::new();
        if self.mode == PickerMode::Directory {
            entries.push(Entry::UseThisDir);
        }
        if self.cwd.parent().is_some() {
            entries.push(Entry::Parent);
        }

        self.error = None;
        match list_dir(&self.cwd, self.mode, self.show_hidden) {
            Ok(listed) => entries.extend(listed),
            Err(e) => self.error = Some(format!("{}: {e}", self.cwd.display())),
        }

        self.entries = entries;
        self.selected = self.selected.min(self.entries.len().saturating_sub(1));
    }

    fn change_dir(&mut self, dir: PathBuf) {
        self.cwd = dir;
        self.selected = 0;
        self.refresh();
    }

    fn go_up(&mut self) {
        if let Some(parent) = self.cwd.parent() {
            let previous = self.cwd.file_name().map(OsStr::to_os_string);
            self.change_dir(parent.to_path_buf());
            // Land on the directory we just left.
            if let Some(name) = previous {
                if let Some(i) = self.entries.iter().position(|e| *e == Entry::Dir(name.clone())) {
                    self.selected = i;
                }
            }
        }
    }

    fn step(&mut self, delta: isize) {
        if self.entries.is_empty() {
            return;
        }
        let last = self.entries.len() - 1;
        self.selected = self.selected.saturating_add_signed(delta).min(last);
    }

    fn activate(&mut self) -> PickerAction {
        match self.entries.get(self.selected).cloned() {
            Some(Entry::UseThisDir) => PickerAction::Chosen(self.cwd.clone()),
            Some(Entry::Parent) => {
                self.go_up();
                PickerAction::None
            }
            Some(Entry::Dir(name)) => {
                let dir = self.cwd.join(name);
                self.change_dir(dir);
                PickerAction::None
            }
            Some(Entry::File(name)) => PickerAction::Chosen(self.cwd.join(name)),
            None => PickerAction::None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PickerAction {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => PickerAction::Cancel,
            KeyCode::Up | KeyCode::Char('k') => {
                self.step(-1);
                PickerAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.step(1);
                PickerAction::None
            }
            KeyCode::PageUp => {
                self.step(-10);
                PickerAction::None
            }
            KeyCode::PageDown => {
                self.step(10);
                PickerAction::None
            }
            KeyCode::Home => {
                self.selected = 0;
                PickerAction::None
            }
            KeyCode::End => {
                self.selected = self.entries.len().saturating_sub(1);
                PickerAction::None
            }
            KeyCode::Enter => self.activate(),
            KeyCode::Right => match self.entries.get(self.selected) {
                Some(Entry::Dir(_)) | Some(Entry::Parent) => self.activate(),
                _ => PickerAction::None,
            },
            KeyCode::Backspace | KeyCode::Left => {
                self.go_up();
                PickerAction::None
            }
            KeyCode::Char('.') => {
                self.show_hidden = !self.show_hidden;
                self.refresh();
                PickerAction::None
            }
            _ => PickerAction::None,
        }
    }
}

fn list_dir(dir: &Path, mode: PickerMode, show_hidden: bool) -> std::io::Result<Vec<Entry>> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let Ok(entry) = entry else { continue };
        let name = entry.file_name();
        if !show_hidden && name.to_string_lossy().starts_with('.') {
            continue;
        }
        // Follow symlinks so linked directories can be entered.
        let path = entry.path();
        if path.is_dir() {
            dirs.push(name);
        } else if mode == PickerMode::File {
            files.push(name);
        }
    }
    dirs.sort_by_key(|n: &OsString| n.to_string_lossy().to_lowercase());
    files.sort_by_key(|n: &OsString| n.to_string_lossy().to_lowercase());
    Ok(dirs
        .into_iter()
        .map(Entry::Dir)
        .chain(files.into_iter().map(Entry::File))
        .collect())
}
