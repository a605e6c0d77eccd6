use super::state::FormState;
use anyhow::Result;
use std::sync::mpsc as std_mpsc;
use std::sync::OnceLock;
use std::time::Duration;

// Global clipboard manager channel - initialized once on first use
static CLIPBOARD_SENDER: OnceLock<std_mpsc::Sender<String>> = OnceLock::new();

/// Save the last report beside its font and update `state.info`.
pub fn save_report(state: &mut FormState) {
    let Some(report) = state.last_report.as_ref() else {
        state.info = "No completed run to save yet.".into();
        return;
    };
    let path = crate::storage::default_report_path(report);
    state.info = match crate::storage::export_json(&path, report) {
        Ok(()) => format!("Saved report: {}", path.display()),
        Err(e) => format!("Save failed: {e:#}"),
    };
}

/// Copy the last output path to the clipboard and update `state.info`.
pub fn copy_output_path(state: &mut FormState) {
    let Some(report) = state.last_report.as_ref() else {
        state.info = "Nothing to copy yet. Run a job first.".into();
        return;
    };
    let path = report.output_path.display().to_string();
    state.info = match copy_to_clipboard(&path) {
        Ok(()) => format!("✓ Copied to clipboard: {}", shorten(&path, 60)),
        Err(e) => format!("Clipboard copy failed: {e:#}"),
    };
}

fn shorten(s: &str, max: usize) -> String {
    let count = s.chars().count();
    if count <= max {
        return s.to_string();
    }
    let tail: String = s.chars().skip(count - (max - 3)).collect();
    format!("...{tail}")
}

/// Initialize the clipboard manager thread if not already initialized.
/// Each text gets its own clipboard instance, kept alive long enough for
/// clipboard managers to read it.
fn init_clipboard_manager() -> Result<&'static std_mpsc::Sender<String>> {
    CLIPBOARD_SENDER.get_or_init(|| {
        let (tx, rx) = std_mpsc::channel::<String>();

        std::thread::spawn(move || {
            use arboard::Clipboard;

            for text in rx {
                if let Ok(mut clipboard) = Clipboard::new() {
                    if clipboard.set_text(&text).is_ok() {
                        std::thread::sleep(Duration::from_secs(2));
                    }
                }
            }
        });

        tx
    });

    CLIPBOARD_SENDER
        .get()
        .ok_or_else(|| anyhow::anyhow!("Failed to initialize clipboard manager"))
}

/// Queue text for the clipboard without blocking the UI.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let sender = init_clipboard_manager()?;
    sender
        .send(text.to_string())
        .map_err(|_| anyhow::anyhow!("Clipboard manager channel closed"))?;
    Ok(())
}
