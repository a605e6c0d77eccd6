use super::theme::Palette;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

fn keybind(palette: &Palette, key: &'static str, pad: usize, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, palette.key()),
        Span::raw(" ".repeat(pad)),
        Span::raw(what),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame, palette: &Palette) {
    let p = Paragraph::new(vec![
        Line::from("Form:"),
        keybind(palette, "Tab / ↓", 6, "Next field"),
        keybind(palette, "S-Tab / ↑", 4, "Previous field"),
        keybind(palette, "Ctrl-U", 7, "Clear field"),
        keybind(palette, "Ctrl-O", 7, "Browse (source font / output directory)"),
        keybind(palette, "Ctrl-R", 7, "Optimize"),
        keybind(palette, "Ctrl-Y", 7, "Copy last output path"),
        keybind(palette, "Ctrl-S", 7, "Save last run report as JSON"),
        keybind(palette, "F1", 11, "Show this help"),
        keybind(palette, "Esc", 10, "Quit"),
        Line::from(""),
        Line::from("Browser:"),
        keybind(palette, "↑/↓", 10, "Navigate"),
        keybind(palette, "Enter", 8, "Open directory / choose"),
        keybind(palette, "Backspace", 4, "Parent directory"),
        keybind(palette, ".", 12, "Toggle hidden files"),
        keybind(palette, "Esc", 10, "Close"),
        Line::from(""),
        Line::from("Dialogs:"),
        keybind(palette, "y / n", 8, "Answer overwrite prompt"),
        keybind(palette, "Enter", 8, "Dismiss"),
    ])
    .style(palette.base())
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}
