//! Line-based prompt flow.
//!
//! Asks for each parameter in turn, shows a review and runs the subsetter
//! only after the user types `yes`.

use crate::error::InvokeError;
use crate::invoker::{CommandRunner, Invoker};
use crate::model::{
    default_features, parse_features, InvocationReport, JobRequest, DEFAULT_FLAVOR,
    DEFAULT_GLYPHS, DEFAULT_OUTPUT_NAME,
};
use crate::text_summary;
use anyhow::{bail, Context, Result};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

pub(crate) enum SessionOutcome {
    Cancelled,
    Completed(Result<InvocationReport, InvokeError>),
}

pub(crate) struct Prompter<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let n = self.input.read_line(&mut line).context("read from stdin")?;
        if n == 0 {
            bail!("input closed before all parameters were entered");
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "{line}").context("write to stdout")
    }

    /// Ask once; an empty answer yields the default (or an empty string).
    pub fn ask(&mut self, prompt: &str, default: Option<&str>) -> Result<String> {
        let written = match default.filter(|d| !d.is_empty()) {
            Some(d) => write!(self.out, "{prompt} [{d}]: "),
            None => write!(self.out, "{prompt}: "),
        };
        written.context("write to stdout")?;
        self.out.flush().context("flush stdout")?;

        let value = self.read_line()?;
        if value.is_empty() {
            Ok(default.unwrap_or_default().to_string())
        } else {
            Ok(value)
        }
    }

    fn ask_input_path(&mut self) -> Result<PathBuf> {
        loop {
            let path = PathBuf::from(self.ask("Enter the full path to the source font", None)?);
            if path.is_file() {
                return Ok(path);
            }
            self.say(
                "Error: The specified file does not exist. Please check the path and try again.",
            )?;
        }
    }

    pub fn collect_request(&mut self) -> Result<JobRequest> {
        let input_path = self.ask_input_path()?;

        let default_dir = default_output_dir(&input_path);
        let output_dir = self.ask(
            "Enter the directory to save the optimized font",
            Some(&default_dir.display().to_string()),
        )?;
        let output_name = self.ask(
            "Enter the name for the optimized font",
            Some(DEFAULT_OUTPUT_NAME),
        )?;

        let glyph_set = self.ask(
            "Enter characters to keep (empty for default)",
            Some(DEFAULT_GLYPHS),
        )?;

        let features_raw = self.ask(
            "Enter layout features separated by commas (empty for default)",
            Some(&default_features().join(",")),
        )?;
        let mut layout_features = parse_features(&features_raw);
        if layout_features.is_empty() {
            layout_features = default_features();
        }

        let flavor = self.ask("Enter font format (e.g., woff2)", Some(DEFAULT_FLAVOR))?;

        Ok(JobRequest {
            input_path,
            output_path: PathBuf::from(output_dir).join(output_name),
            glyph_set,
            layout_features,
            flavor,
        })
    }

    /// True only for a literal, case-insensitive `yes`.
    pub fn confirm(&mut self) -> Result<bool> {
        write!(self.out, "\nIs everything correct? (yes/no): ").context("write to stdout")?;
        self.out.flush().context("flush stdout")?;
        Ok(self.read_line()?.to_lowercase() == "yes")
    }

    pub fn run_session<C: CommandRunner>(&mut self, invoker: &Invoker<C>) -> Result<SessionOutcome> {
        self.say("Font Optimization Program")?;
        let req = self.collect_request()?;

        self.say("")?;
        for line in text_summary::build_review(&req).lines {
            self.say(&line)?;
        }

        if !self.confirm()? {
            self.say("Operation cancelled. Run the program again to enter new data.")?;
            return Ok(SessionOutcome::Cancelled);
        }

        let outcome = invoker.invoke(&req);
        if let Err(e) = &outcome {
            log::debug!("invocation failed: {e:?}");
        }
        for line in text_summary::build_outcome(&outcome).lines {
            self.say(&line)?;
        }
        Ok(SessionOutcome::Completed(outcome))
    }
}

fn default_output_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Run the prompt flow on the process's stdin/stdout.
pub fn run<C: CommandRunner>(invoker: &Invoker<C>) -> Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut prompter = Prompter::new(stdin.lock(), stdout.lock());
    prompter.run_session(invoker)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::testing::{fake_invoker, tool_dir, FakeRunner};
    use std::io::Cursor;

    fn session(answers: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(answers.as_bytes().to_vec()), Vec::new())
    }

    fn font(dir: &Path) -> PathBuf {
        let p = dir.join("Foo.ttf");
        std::fs::write(&p, b"font").unwrap();
        p
    }

    #[test]
    fn defaults_fill_every_empty_answer() {
        let work = tempfile::tempdir().unwrap();
        let input = font(work.path());
        let mut p = session(&format!("{}\n\n\n\n\n\n", input.display()));

        let req = p.collect_request().unwrap();
        assert_eq!(req.input_path, input);
        assert_eq!(req.output_path, work.path().join(DEFAULT_OUTPUT_NAME));
        assert_eq!(req.glyph_set, DEFAULT_GLYPHS);
        assert_eq!(req.layout_features, vec!["cv11", "cv02", "cv03", "cv04"]);
        assert_eq!(req.flavor, "woff2");
    }

    #[test]
    fn reprompts_until_input_exists() {
        let work = tempfile::tempdir().unwrap();
        let input = font(work.path());
        let answers = format!(
            "{}\n{}\n{}\n/out\nFoo-sub.woff2\nABC\ncv01\nwoff\n",
            work.path().join("missing.ttf").display(),
            work.path().display(),
            input.display()
        );
        let mut p = session(&answers);

        let req = p.collect_request().unwrap();
        assert_eq!(req.input_path, input);
        assert_eq!(req.output_path, PathBuf::from("/out/Foo-sub.woff2"));
        assert_eq!(req.glyph_set, "ABC");
        assert_eq!(req.layout_features, vec!["cv01"]);
        assert_eq!(req.flavor, "woff");

        let printed = String::from_utf8(p.out).unwrap();
        assert_eq!(printed.matches("does not exist").count(), 2);
    }

    #[test]
    fn shows_bracketed_defaults() {
        let mut p = session("\n");
        assert_eq!(p.ask("Flavor", Some("woff2")).unwrap(), "woff2");
        assert_eq!(String::from_utf8(p.out).unwrap(), "Flavor [woff2]: ");
    }

    #[test]
    fn closed_input_aborts_instead_of_looping() {
        let mut p = session("");
        assert!(p.collect_request().is_err());
    }

    #[test]
    fn confirmation_accepts_only_yes() {
        for (answer, expected) in [
            ("yes\n", true),
            ("YES\n", true),
            ("Yes\r\n", true),
            ("y\n", false),
            ("no\n", false),
            (" yes\n", false),
            ("yes please\n", false),
            ("\n", false),
        ] {
            assert_eq!(session(answer).confirm().unwrap(), expected, "{answer:?}");
        }
    }

    #[test]
    fn declined_confirmation_spawns_nothing() {
        let tools = tool_dir();
        let work = tempfile::tempdir().unwrap();
        let input = font(work.path());
        let invoker = fake_invoker(FakeRunner::succeeding(), &tools);
        let mut p = session(&format!("{}\n\n\n\n\n\nno\n", input.display()));

        let outcome = p.run_session(&invoker).unwrap();
        assert!(matches!(outcome, SessionOutcome::Cancelled));
        assert!(!work.path().join(DEFAULT_OUTPUT_NAME).exists());
        let printed = String::from_utf8(p.out).unwrap();
        assert!(printed.contains("Operation cancelled"));
    }

    #[test]
    fn confirmed_session_runs_the_subsetter_once() {
        let tools = tool_dir();
        let work = tempfile::tempdir().unwrap();
        let input = font(work.path());
        let invoker = fake_invoker(FakeRunner::succeeding(), &tools);
        let answers = format!(
            "{}\n{}\nFoo-sub.woff2\nABC\ncv01\nwoff2\nyes\n",
            input.display(),
            work.path().display()
        );
        let mut p = session(&answers);

        let outcome = p.run_session(&invoker).unwrap();
        let report = match outcome {
            SessionOutcome::Completed(Ok(r)) => r,
            _ => panic!("expected a successful run"),
        };
        assert_eq!(report.output_path, work.path().join("Foo-sub.woff2"));
        assert!(report.args.contains(&"--layout-features=cv01".to_string()));

        let printed = String::from_utf8(p.out).unwrap();
        assert!(printed.contains("Font successfully saved to"));
    }
}
