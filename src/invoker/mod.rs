mod command;

pub use command::{locate_executable, CommandOutput, CommandRunner, CommandSpec, SystemRunner};

use crate::error::InvokeError;
use crate::model::{InvocationReport, InvocationResult, JobRequest};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Runs the external subsetter for one job at a time.
pub struct Invoker<R = SystemRunner> {
    runner: R,
    program: String,
    search_path: Option<OsString>,
}

impl Invoker<SystemRunner> {
    pub fn new(program: impl Into<String>) -> Self {
        Self::with_runner(program, SystemRunner)
    }
}

impl<R: CommandRunner> Invoker<R> {
    pub fn with_runner(program: impl Into<String>, runner: R) -> Self {
        Self {
            runner,
            program: program.into(),
            search_path: None,
        }
    }

    /// Search these directories instead of the process `PATH`.
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn locate(&self) -> Result<PathBuf, InvokeError> {
        locate_executable(&self.program, self.search_path.as_deref())
            .ok_or_else(|| InvokeError::ExecutableNotFound(self.program.clone()))
    }

    pub fn command_for(&self, program: PathBuf, req: &JobRequest) -> CommandSpec {
        CommandSpec {
            program,
            args: req.to_args(),
        }
    }

    /// Check everything that must hold before the subsetter can run: the
    /// input is a file, the output directory exists (created if needed) and
    /// the executable is on the search path. Returns the resolved executable.
    pub fn validate(&self, req: &JobRequest) -> Result<PathBuf, InvokeError> {
        if !req.input_path.is_file() {
            return Err(InvokeError::InputNotFound(req.input_path.clone()));
        }
        ensure_output_dir(&req.output_path)?;
        self.locate()
    }

    /// Like [`Invoker::invoke`], but first removes an existing output file.
    ///
    /// The file is only removed once [`Invoker::validate`] passes, so a job
    /// that cannot start leaves the old output in place.
    pub fn invoke_replacing(&self, req: &JobRequest) -> Result<InvocationReport, InvokeError> {
        self.validate(req)?;
        match std::fs::remove_file(&req.output_path) {
            Ok(()) => log::info!("removed existing {}", req.output_path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(InvokeError::UnexpectedError(format!(
                    "cannot remove existing {}: {e}",
                    req.output_path.display()
                )))
            }
        }
        self.invoke(req)
    }

    /// Validate the request, run the subsetter and confirm the output exists.
    ///
    /// Nothing is spawned unless the input file, the output directory and
    /// the executable all check out.
    pub fn invoke(&self, req: &JobRequest) -> Result<InvocationReport, InvokeError> {
        let program = self.validate(req)?;

        let spec = self.command_for(program, req);
        log::debug!("running {} {:?}", spec.program.display(), spec.args);

        let started = Instant::now();
        let result = self.execute(&spec)?;
        let elapsed = started.elapsed();
        log::debug!(
            "{} exited with {} after {}",
            spec.program.display(),
            result.exit_status,
            humantime::format_duration(elapsed)
        );

        if result.exit_status != 0 {
            return Err(InvokeError::SubsetFailed {
                exit_status: result.exit_status,
                stderr: result.stderr,
            });
        }

        let output_bytes = match std::fs::metadata(&req.output_path) {
            Ok(meta) if meta.is_file() => meta.len(),
            _ => return Err(InvokeError::OutputMissing(req.output_path.clone())),
        };
        log::info!(
            "wrote {} ({} bytes)",
            req.output_path.display(),
            output_bytes
        );

        Ok(InvocationReport {
            timestamp_utc: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "now".into()),
            args: spec
                .args
                .iter()
                .map(|a| a.to_string_lossy().into_owned())
                .collect(),
            program: spec.program,
            output_path: req.output_path.clone(),
            output_bytes: Some(output_bytes),
            elapsed_ms: elapsed.as_millis() as u64,
            exit_status: result.exit_status,
            stdout: result.stdout,
            stderr: result.stderr,
        })
    }

    fn execute(&self, spec: &CommandSpec) -> Result<InvocationResult, InvokeError> {
        match self.runner.run(spec) {
            Ok(out) => Ok(InvocationResult {
                exit_status: out.status_code,
                stdout: out.stdout,
                stderr: out.stderr,
            }),
            // Removed between lookup and spawn.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(InvokeError::ExecutableNotFound(self.program.clone()))
            }
            Err(e) => Err(InvokeError::UnexpectedError(e.to_string())),
        }
    }
}

fn ensure_output_dir(output_path: &Path) -> Result<(), InvokeError> {
    let dir = match output_path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => return Ok(()),
    };
    if dir.is_dir() {
        return Ok(());
    }
    log::debug!("creating output directory {}", dir.display());
    std::fs::create_dir_all(dir).map_err(|source| InvokeError::OutputDirUnavailable {
        path: dir.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Records every spec and answers with a canned result.
    ///
    /// `creates_output` makes a zero-exit run write the `--output-file` target.
    pub(crate) struct FakeRunner {
        pub seen: RefCell<Vec<CommandSpec>>,
        pub next: RefCell<Option<std::io::Result<CommandOutput>>>,
        pub creates_output: bool,
    }

    impl FakeRunner {
        pub fn succeeding() -> Self {
            Self {
                seen: RefCell::new(Vec::new()),
                next: RefCell::new(None),
                creates_output: true,
            }
        }

        pub fn with_next(result: std::io::Result<CommandOutput>) -> Self {
            Self {
                next: RefCell::new(Some(result)),
                ..Self::succeeding()
            }
        }

        pub fn spawn_count(&self) -> usize {
            self.seen.borrow().len()
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutput> {
            self.seen.borrow_mut().push(spec.clone());
            let out = self.next.borrow_mut().take().unwrap_or_else(|| {
                Ok(CommandOutput {
                    status_code: 0,
                    stdout: String::new(),
                    stderr: String::new(),
                })
            })?;
            if out.status_code == 0 && self.creates_output {
                if let Some(target) = spec
                    .args
                    .iter()
                    .find_map(|a| a.to_str()?.strip_prefix("--output-file="))
                {
                    std::fs::write(target, b"wOF2")?;
                }
            }
            Ok(out)
        }
    }

    /// A directory holding an executable named `pyftsubset`, usable as a search path.
    pub(crate) fn tool_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pyftsubset");
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        dir
    }

    impl<R> Invoker<R> {
        pub(crate) fn runner(&self) -> &R {
            &self.runner
        }
    }

    pub(crate) fn fake_invoker(runner: FakeRunner, tools: &tempfile::TempDir) -> Invoker<FakeRunner> {
        Invoker::with_runner("pyftsubset", runner).with_search_path(tools.path().as_os_str())
    }
}
