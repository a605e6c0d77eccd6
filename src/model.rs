use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

/// Subsetter looked up on the search path when none is configured.
pub const DEFAULT_SUBSETTER: &str = "pyftsubset";
pub const DEFAULT_OUTPUT_NAME: &str = "optimized_font.woff2";
/// Output name pre-filled in the form; the flavor supplies the extension there.
pub const DEFAULT_FORM_OUTPUT_STEM: &str = "optimized_font";
pub const DEFAULT_FLAVOR: &str = "woff2";
pub const DEFAULT_GLYPHS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+[]{};:'\",./?<>|\\`~ ";
pub const DEFAULT_FEATURES: [&str; 4] = ["cv11", "cv02", "cv03", "cv04"];

// Flags supplied on every invocation regardless of the request.
pub const FIXED_FLAGS: [&str; 3] = ["--retain-gids", "--glyph-names", "--no-hinting"];

pub fn default_features() -> Vec<String> {
    DEFAULT_FEATURES.iter().map(|f| f.to_string()).collect()
}

/// Split a comma-separated feature list, dropping blanks and surrounding whitespace.
pub fn parse_features(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

/// One subsetting job: everything the subsetter needs for a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub glyph_set: String,
    pub layout_features: Vec<String>,
    pub flavor: String,
}

impl JobRequest {
    /// Build the subsetter argument vector (the program itself excluded).
    ///
    /// Paths are passed as raw OS strings so names that are not UTF-8 reach
    /// the subsetter unchanged.
    pub fn to_args(&self) -> Vec<OsString> {
        let mut output_file = OsString::from("--output-file=");
        output_file.push(&self.output_path);

        let mut args = vec![
            self.input_path.clone().into_os_string(),
            output_file,
            format!("--text={}", self.glyph_set).into(),
            format!("--flavor={}", self.flavor).into(),
            format!("--layout-features={}", self.layout_features.join(",")).into(),
        ];
        args.extend(FIXED_FLAGS.iter().map(OsString::from));
        args
    }

    /// True when the output path names the input file itself.
    ///
    /// Only existing files can collide; a missing input is reported later by
    /// the invoker.
    pub fn writes_over_input(&self) -> bool {
        match (
            std::fs::canonicalize(&self.input_path),
            std::fs::canonicalize(&self.output_path),
        ) {
            (Ok(input), Ok(output)) => input == output,
            _ => false,
        }
    }
}

/// Raw outcome of running the subsetter once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    pub exit_status: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Successful run, ready for presentation layers and JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationReport {
    pub timestamp_utc: String,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub output_path: PathBuf,
    #[serde(default)]
    pub output_bytes: Option<u64>,
    pub elapsed_ms: u64,
    pub exit_status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl InvocationReport {
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}
