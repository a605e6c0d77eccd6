//! Text summaries for console output.
//!
//! Formats the pre-run review of a job and the human-readable outcome of an
//! invocation. The form reuses the outcome lines inside its result dialog.

use crate::error::InvokeError;
use crate::model::{InvocationReport, JobRequest};

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Lines shown before asking for confirmation.
pub(crate) fn build_review(req: &JobRequest) -> TextSummary {
    let features = req
        .layout_features
        .iter()
        .map(|f| format!("'{f}'"))
        .collect::<Vec<_>>()
        .join(", ");
    TextSummary {
        lines: vec![
            "Please review the entered data:".into(),
            format!("Source font: {}", req.input_path.display()),
            format!(
                "Optimized font will be saved as: {}",
                req.output_path.display()
            ),
            format!("Characters to keep: {}", req.glyph_set),
            format!("Layout features: [{features}]"),
            format!("Font format: {}", req.flavor),
        ],
    }
}

/// Lines describing a finished invocation, success or failure.
pub(crate) fn build_outcome(outcome: &Result<InvocationReport, InvokeError>) -> TextSummary {
    let mut lines = Vec::new();
    match outcome {
        Ok(report) => {
            let stdout = report.stdout.trim_end();
            if !stdout.is_empty() {
                lines.extend(stdout.lines().map(str::to_string));
            }
            lines.push(format!(
                "Font successfully saved to {}",
                report.output_path.display()
            ));
            if let Some(bytes) = report.output_bytes {
                lines.push(format!(
                    "Size: {} bytes, took {}",
                    bytes,
                    humantime::format_duration(report.elapsed())
                ));
            }
        }
        Err(e @ InvokeError::SubsetFailed { .. }) => {
            lines.push("An error occurred while executing the subsetting tool:".into());
            lines.extend(e.to_string().trim_end().lines().map(str::to_string));
        }
        Err(e) => lines.push(format!("Error: {e}")),
    }
    TextSummary { lines }
}
