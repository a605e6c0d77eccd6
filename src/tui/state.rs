use super::picker::{Picker, PickerAction, PickerMode};
use super::theme::Theme;
use crate::error::InvokeError;
use crate::model::{
    default_features, parse_features, InvocationReport, JobRequest, DEFAULT_FLAVOR,
    DEFAULT_FORM_OUTPUT_STEM, DEFAULT_GLYPHS,
};
use crate::text_summary;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::{Path, PathBuf};

/// Construction-time settings for the form.
#[derive(Debug, Clone, Default)]
pub struct FormConfig {
    pub theme: Theme,
    /// Where pickers open when the field gives no better hint
    pub start_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Input,
    OutputDir,
    OutputName,
    Glyphs,
    Features,
    Flavor,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Input,
        Field::OutputDir,
        Field::OutputName,
        Field::Glyphs,
        Field::Features,
        Field::Flavor,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Input => "Source font",
            Field::OutputDir => "Output directory",
            Field::OutputName => "Output name",
            Field::Glyphs => "Characters to keep",
            Field::Features => "Layout features",
            Field::Flavor => "Font format",
        }
    }

    pub fn picker_mode(self) -> Option<PickerMode> {
        match self {
            Field::Input => Some(PickerMode::File),
            Field::OutputDir => Some(PickerMode::Directory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Field(Field),
    Optimize,
}

impl Focus {
    fn order() -> Vec<Focus> {
        Field::ALL
            .iter()
            .map(|f| Focus::Field(*f))
            .chain(std::iter::once(Focus::Optimize))
            .collect()
    }

    fn shifted(self, delta: isize) -> Focus {
        let order = Self::order();
        let len = order.len() as isize;
        let idx = order.iter().position(|f| *f == self).unwrap_or(0) as isize;
        order[(idx + delta).rem_euclid(len) as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub enum Modal {
    Alert {
        kind: AlertKind,
        title: String,
        lines: Vec<String>,
    },
    ConfirmOverwrite {
        request: JobRequest,
        yes_selected: bool,
    },
    Help,
}

/// What the event loop should do after a key press.
#[derive(Debug, PartialEq)]
pub enum Action {
    None,
    Quit,
    Run(JobRequest),
    /// Run after removing the existing output the user agreed to replace
    Replace(JobRequest),
    CopyOutputPath,
    SaveReport,
}

/// Result of validating the form on submit.
#[derive(Debug, PartialEq)]
pub enum Submission {
    Invalid(String),
    OverwritesInput(PathBuf),
    NeedsOverwrite(JobRequest),
    Ready(JobRequest),
}

pub struct FormState {
    pub config: FormConfig,
    values: [String; 6],
    /// Exact paths chosen in the pickers, used while the field still shows them
    picked: Vec<(Field, PathBuf)>,
    pub focus: Focus,
    pub modal: Option<Modal>,
    pub picker: Option<Picker>,
    pub info: String,
    pub last_report: Option<InvocationReport>,
}

impl FormState {
    pub fn new(config: FormConfig) -> Self {
        let mut state = Self {
            config,
            values: Default::default(),
            picked: Vec::new(),
            focus: Focus::Field(Field::Input),
            modal: None,
            picker: None,
            info: "Fill in the fields, then Ctrl-R or Enter on Optimize. F1 for help.".into(),
            last_report: None,
        };
        state.set(Field::OutputName, DEFAULT_FORM_OUTPUT_STEM);
        state.set(Field::Glyphs, DEFAULT_GLYPHS);
        state.set(Field::Features, &default_features().join(","));
        state.set(Field::Flavor, DEFAULT_FLAVOR);
        state
    }

    pub fn value(&self, field: Field) -> &str {
        &self.values[field as usize]
    }

    pub fn set(&mut self, field: Field, value: &str) {
        self.values[field as usize] = value.to_string();
    }

    fn value_mut(&mut self, field: Field) -> &mut String {
        &mut self.values[field as usize]
    }

    fn set_picked(&mut self, field: Field, path: PathBuf) {
        self.set(field, &path.display().to_string());
        self.picked.retain(|(f, _)| *f != field);
        self.picked.push((field, path));
    }

    /// The field as a path. A picker choice is returned as-is, so names that
    /// do not display losslessly still point at the chosen file.
    pub fn path_value(&self, field: Field) -> PathBuf {
        let value = self.value(field);
        self.picked
            .iter()
            .find(|(f, p)| *f == field && p.display().to_string() == value)
            .map(|(_, p)| p.clone())
            .unwrap_or_else(|| PathBuf::from(value))
    }

    /// Compose `dir / (name + "." + flavor)`.
    pub fn output_path(&self) -> PathBuf {
        self.path_value(Field::OutputDir).join(format!(
            "{}.{}",
            self.value(Field::OutputName),
            self.value(Field::Flavor)
        ))
    }

    /// Validate required fields and check whether the output already exists.
    pub fn submission(&self) -> Submission {
        let missing: Vec<&str> = [Field::Input, Field::OutputDir, Field::OutputName]
            .iter()
            .filter(|f| self.value(**f).trim().is_empty())
            .map(|f| f.label())
            .collect();
        if !missing.is_empty() {
            return Submission::Invalid(format!("Please fill in: {}", missing.join(", ")));
        }

        // An empty features field means no layout features at all.
        let features = self.value(Field::Features);
        let layout_features = if features.is_empty() {
            Vec::new()
        } else {
            parse_features(features)
        };

        let request = JobRequest {
            input_path: self.path_value(Field::Input),
            output_path: self.output_path(),
            glyph_set: self.value(Field::Glyphs).to_string(),
            layout_features,
            flavor: self.value(Field::Flavor).to_string(),
        };

        if request.writes_over_input() {
            Submission::OverwritesInput(request.output_path)
        } else if request.output_path.exists() {
            Submission::NeedsOverwrite(request)
        } else {
            Submission::Ready(request)
        }
    }

    pub fn submit(&mut self) -> Action {
        match self.submission() {
            Submission::Invalid(msg) => {
                self.alert(AlertKind::Warning, "Missing information", vec![msg]);
                Action::None
            }
            Submission::OverwritesInput(path) => {
                self.alert(
                    AlertKind::Warning,
                    "Output is the source font",
                    vec![
                        format!("{} is the input font.", path.display()),
                        "Choose another output name or directory.".into(),
                    ],
                );
                Action::None
            }
            Submission::NeedsOverwrite(request) => {
                self.modal = Some(Modal::ConfirmOverwrite {
                    request,
                    yes_selected: false,
                });
                Action::None
            }
            Submission::Ready(request) => Action::Run(request),
        }
    }

    /// Hand the job back for running; the invoker removes the existing
    /// output once its checks pass.
    fn accept_overwrite(&mut self, request: JobRequest) -> Action {
        self.modal = None;
        Action::Replace(request)
    }

    fn decline_overwrite(&mut self) -> Action {
        self.modal = None;
        self.info = "Cancelled: existing file kept.".into();
        Action::None
    }

    pub fn alert(&mut self, kind: AlertKind, title: &str, lines: Vec<String>) {
        self.modal = Some(Modal::Alert {
            kind,
            title: title.to_string(),
            lines,
        });
    }

    pub fn apply_outcome(&mut self, outcome: Result<InvocationReport, InvokeError>) {
        let lines = text_summary::build_outcome(&outcome).lines;
        match outcome {
            Ok(report) => {
                self.info = format!(
                    "Saved {} (Ctrl-Y copy path, Ctrl-S save report)",
                    report.output_path.display()
                );
                self.last_report = Some(report);
                self.alert(AlertKind::Info, "Success", lines);
            }
            Err(e) => {
                self.info = format!("{}.", e.title());
                self.alert(AlertKind::Error, e.title(), lines);
            }
        }
    }

    pub fn picker_start(&self, field: Field) -> PathBuf {
        let value = self.value(field);
        let hint = match field {
            Field::Input => Path::new(value).parent().map(Path::to_path_buf),
            _ => Some(PathBuf::from(value)),
        };
        hint.filter(|p| !p.as_os_str().is_empty() && p.is_dir())
            .or_else(|| self.config.start_dir.clone())
            .or_else(|| std::env::current_dir().ok())
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("/"))
    }

    fn open_picker(&mut self) {
        let Focus::Field(field) = self.focus else {
            self.info = "Pickers are available on the path fields.".into();
            return;
        };
        match field.picker_mode() {
            Some(mode) => self.picker = Some(Picker::open(mode, field, self.picker_start(field))),
            None => self.info = "Pickers are available on the path fields.".into(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        if let Some(picker) = self.picker.as_mut() {
            match picker.handle_key(key) {
                PickerAction::None => {}
                PickerAction::Cancel => self.picker = None,
                PickerAction::Chosen(path) => {
                    let target = picker.target;
                    self.picker = None;
                    // An input in a fresh form suggests its own directory for output.
                    if target == Field::Input && self.value(Field::OutputDir).is_empty() {
                        if let Some(parent) = path.parent() {
                            self.set_picked(Field::OutputDir, parent.to_path_buf());
                        }
                    }
                    self.set_picked(target, path);
                }
            }
            return Action::None;
        }

        if let Some(modal) = self.modal.take() {
            return self.handle_modal_key(modal, key);
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match (ctrl, key.code) {
            (false, KeyCode::Esc) => Action::Quit,
            (_, KeyCode::F(1)) => {
                self.modal = Some(Modal::Help);
                Action::None
            }
            (true, KeyCode::Char('r')) => self.submit(),
            (true, KeyCode::Char('o')) => {
                self.open_picker();
                Action::None
            }
            (true, KeyCode::Char('y')) => Action::CopyOutputPath,
            (true, KeyCode::Char('s')) => Action::SaveReport,
            (true, KeyCode::Char('u')) => {
                if let Focus::Field(field) = self.focus {
                    self.value_mut(field).clear();
                }
                Action::None
            }
            (_, KeyCode::Tab) | (_, KeyCode::Down) => {
                self.focus = self.focus.shifted(1);
                Action::None
            }
            (_, KeyCode::BackTab) | (_, KeyCode::Up) => {
                self.focus = self.focus.shifted(-1);
                Action::None
            }
            (false, KeyCode::Enter) => match self.focus {
                Focus::Optimize => self.submit(),
                Focus::Field(_) => {
                    self.focus = self.focus.shifted(1);
                    Action::None
                }
            },
            (false, KeyCode::Backspace) => {
                if let Focus::Field(field) = self.focus {
                    self.value_mut(field).pop();
                }
                Action::None
            }
            (false, KeyCode::Char(c)) => {
                match self.focus {
                    Focus::Field(field) => self.value_mut(field).push(c),
                    Focus::Optimize if c == '?' => self.modal = Some(Modal::Help),
                    Focus::Optimize if c == ' ' => return self.submit(),
                    Focus::Optimize => {}
                }
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_modal_key(&mut self, modal: Modal, key: KeyEvent) -> Action {
        match modal {
            Modal::Help => Action::None,
            Modal::Alert { kind, title, lines } => match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => Action::None,
                KeyCode::Char('y') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.modal = Some(Modal::Alert { kind, title, lines });
                    Action::CopyOutputPath
                }
                _ => {
                    self.modal = Some(Modal::Alert { kind, title, lines });
                    Action::None
                }
            },
            Modal::ConfirmOverwrite {
                request,
                yes_selected,
            } => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.accept_overwrite(request),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.decline_overwrite(),
                KeyCode::Enter if yes_selected => self.accept_overwrite(request),
                KeyCode::Enter => self.decline_overwrite(),
                KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
                    self.modal = Some(Modal::ConfirmOverwrite {
                        request,
                        yes_selected: !yes_selected,
                    });
                    Action::None
                }
                _ => {
                    self.modal = Some(Modal::ConfirmOverwrite {
                        request,
                        yes_selected,
                    });
                    Action::None
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn filled(dir: &Path) -> FormState {
        let input = dir.join("Foo.ttf");
        std::fs::write(&input, b"font").unwrap();
        let mut state = FormState::new(FormConfig::default());
        state.set(Field::Input, &input.display().to_string());
        state.set(Field::OutputDir, &dir.join("out").display().to_string());
        state.set(Field::OutputName, "Foo-sub");
        state
    }

    #[test]
    fn starts_with_defaults() {
        let state = FormState::new(FormConfig::default());
        assert_eq!(state.value(Field::Input), "");
        assert_eq!(state.value(Field::OutputName), "optimized_font");
        assert_eq!(state.value(Field::Features), "cv11,cv02,cv03,cv04");
        assert_eq!(state.value(Field::Flavor), "woff2");
        assert_eq!(state.value(Field::Glyphs), DEFAULT_GLYPHS);
    }

    #[test]
    fn missing_required_fields_warn_and_do_not_run() {
        let mut state = FormState::new(FormConfig::default());
        assert_eq!(state.submit(), Action::None);
        match &state.modal {
            Some(Modal::Alert { kind, lines, .. }) => {
                assert_eq!(*kind, AlertKind::Warning);
                assert!(lines[0].contains("Source font"));
                assert!(lines[0].contains("Output directory"));
            }
            other => panic!("expected warning, got {other:?}"),
        }
    }

    #[test]
    fn output_path_appends_flavor() {
        let dir = tempfile::tempdir().unwrap();
        let state = filled(dir.path());
        assert_eq!(state.output_path(), dir.path().join("out").join("Foo-sub.woff2"));
    }

    #[test]
    fn cleared_features_field_means_no_features() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = filled(dir.path());
        state.set(Field::Features, "");
        match state.submission() {
            Submission::Ready(req) => assert!(req.layout_features.is_empty()),
            other => panic!("unexpected {other:?}"),
        }

        state.set(Field::Features, "ss01,cv01");
        match state.submission() {
            Submission::Ready(req) => assert_eq!(req.layout_features, vec!["ss01", "cv01"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn declining_overwrite_keeps_file_and_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = filled(dir.path());
        let existing = state.output_path();
        std::fs::create_dir_all(existing.parent().unwrap()).unwrap();
        std::fs::write(&existing, b"keep me").unwrap();

        assert_eq!(state.handle_key(ctrl('r')), Action::None);
        assert!(matches!(state.modal, Some(Modal::ConfirmOverwrite { .. })));

        assert_eq!(state.handle_key(key(KeyCode::Char('n'))), Action::None);
        assert!(state.modal.is_none());
        assert_eq!(std::fs::read(&existing).unwrap(), b"keep me");
    }

    #[test]
    fn enter_defaults_to_no_on_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = filled(dir.path());
        let existing = state.output_path();
        std::fs::create_dir_all(existing.parent().unwrap()).unwrap();
        std::fs::write(&existing, b"keep me").unwrap();

        state.submit();
        assert_eq!(state.handle_key(key(KeyCode::Enter)), Action::None);
        assert!(existing.exists());
    }

    #[test]
    fn accepting_overwrite_asks_for_a_replacing_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = filled(dir.path());
        let existing = state.output_path();
        std::fs::create_dir_all(existing.parent().unwrap()).unwrap();
        std::fs::write(&existing, b"old").unwrap();

        state.submit();
        state.handle_key(key(KeyCode::Left));
        match state.handle_key(key(KeyCode::Enter)) {
            Action::Replace(req) => assert_eq!(req.output_path, existing),
            other => panic!("expected replace, got {other:?}"),
        }
        // Removal waits for the invoker's checks.
        assert!(existing.exists());
    }

    #[test]
    fn output_that_is_the_input_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("Foo.woff2");
        std::fs::write(&source, b"source").unwrap();
        let mut state = FormState::new(FormConfig::default());
        state.set(Field::Input, &source.display().to_string());
        state.set(Field::OutputDir, &dir.path().display().to_string());
        state.set(Field::OutputName, "Foo");

        assert_eq!(state.handle_key(ctrl('r')), Action::None);
        match &state.modal {
            Some(Modal::Alert { kind, title, .. }) => {
                assert_eq!(*kind, AlertKind::Warning);
                assert_eq!(title, "Output is the source font");
            }
            other => panic!("expected warning, got {other:?}"),
        }
        assert_eq!(state.handle_key(key(KeyCode::Char('y'))), Action::None);
        assert_eq!(std::fs::read(&source).unwrap(), b"source");
    }

    #[cfg(unix)]
    #[test]
    fn picked_paths_survive_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let odd = dir.path().join(OsStr::from_bytes(b"F\xffo.ttf"));
        std::fs::write(&odd, b"font").unwrap();
        let mut state = FormState::new(FormConfig::default());
        state.set_picked(Field::Input, odd.clone());
        state.set(Field::OutputDir, &dir.path().display().to_string());

        assert_eq!(state.path_value(Field::Input), odd);
        match state.submission() {
            Submission::Ready(req) => assert_eq!(req.input_path, odd),
            other => panic!("unexpected {other:?}"),
        }

        // Editing the field drops the picked path.
        state.set(Field::Input, "other.ttf");
        assert_eq!(state.path_value(Field::Input), PathBuf::from("other.ttf"));
    }

    #[test]
    fn typing_edits_the_focused_field() {
        let mut state = FormState::new(FormConfig::default());
        for _ in 0..5 {
            state.handle_key(key(KeyCode::Tab));
        }
        assert_eq!(state.focus, Focus::Field(Field::Flavor));
        state.handle_key(ctrl('u'));
        for c in "woff".chars() {
            state.handle_key(key(KeyCode::Char(c)));
        }
        state.handle_key(key(KeyCode::Char('x')));
        state.handle_key(key(KeyCode::Backspace));
        assert_eq!(state.value(Field::Flavor), "woff");
    }

    #[test]
    fn focus_wraps_around() {
        let mut state = FormState::new(FormConfig::default());
        state.handle_key(key(KeyCode::BackTab));
        assert_eq!(state.focus, Focus::Optimize);
        state.handle_key(key(KeyCode::Tab));
        assert_eq!(state.focus, Focus::Field(Field::Input));
    }

    #[test]
    fn enter_on_optimize_submits() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = filled(dir.path());
        state.focus = Focus::Optimize;
        assert!(matches!(state.handle_key(key(KeyCode::Enter)), Action::Run(_)));
    }

    #[test]
    fn picker_fills_the_field_and_suggests_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("A.ttf"), b"").unwrap();
        let mut state = FormState::new(FormConfig {
            start_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        });

        state.handle_key(ctrl('o'));
        assert!(state.picker.is_some());
        state.handle_key(key(KeyCode::End));
        state.handle_key(key(KeyCode::Enter));

        assert!(state.picker.is_none());
        assert_eq!(
            state.value(Field::Input),
            dir.path().join("A.ttf").display().to_string()
        );
        assert_eq!(state.value(Field::OutputDir), dir.path().display().to_string());
    }

    #[test]
    fn picker_is_only_for_path_fields() {
        let mut state = FormState::new(FormConfig::default());
        state.focus = Focus::Field(Field::Glyphs);
        state.handle_key(ctrl('o'));
        assert!(state.picker.is_none());
    }

    #[test]
    fn failure_outcome_opens_error_dialog() {
        let mut state = FormState::new(FormConfig::default());
        state.apply_outcome(Err(InvokeError::SubsetFailed {
            exit_status: 1,
            stderr: "bad font".into(),
        }));
        match &state.modal {
            Some(Modal::Alert { kind, title, lines }) => {
                assert_eq!(*kind, AlertKind::Error);
                assert_eq!(title, "Subsetting failed");
                assert!(lines.contains(&"bad font".to_string()));
            }
            other => panic!("expected error dialog, got {other:?}"),
        }
        assert!(state.last_report.is_none());
    }

    #[test]
    fn escape_and_ctrl_c_quit() {
        let mut state = FormState::new(FormConfig::default());
        assert_eq!(state.handle_key(key(KeyCode::Esc)), Action::Quit);
        assert_eq!(state.handle_key(ctrl('c')), Action::Quit);
    }
}
