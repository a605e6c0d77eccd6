mod export;
mod help;
mod picker;
mod state;
mod theme;

pub use state::FormConfig;

use crate::invoker::{CommandRunner, Invoker};
use crate::model::JobRequest;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use picker::Picker;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Terminal,
};
use state::{Action, AlertKind, Field, Focus, FormState, Modal};
use std::io;
use theme::Palette;

/// Run the form until the user quits. Each Optimize runs the subsetter once,
/// blocking the UI until it exits.
pub fn run<C: CommandRunner>(config: FormConfig, invoker: &Invoker<C>) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let mut state = FormState::new(config);
    let res = event_loop(&mut terminal, &mut state, invoker);

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();
    res
}

fn event_loop<B: Backend, C: CommandRunner>(
    terminal: &mut Terminal<B>,
    state: &mut FormState,
    invoker: &Invoker<C>,
) -> Result<()> {
    loop {
        terminal
            .draw(|f| draw(f.area(), f, state, invoker.program()))
            .ok();

        let Event::Key(k) = event::read().context("read terminal event")? else {
            continue;
        };
        if k.kind != KeyEventKind::Press {
            continue;
        }

        match state.handle_key(k) {
            Action::None => {}
            Action::Quit => return Ok(()),
            Action::Run(req) => {
                show_running(terminal, state, invoker, &req);
                run_job(state, invoker, &req, false);
            }
            Action::Replace(req) => {
                show_running(terminal, state, invoker, &req);
                run_job(state, invoker, &req, true);
            }
            Action::CopyOutputPath => export::copy_output_path(state),
            Action::SaveReport => export::save_report(state),
        }
    }
}

fn show_running<B: Backend, C: CommandRunner>(
    terminal: &mut Terminal<B>,
    state: &mut FormState,
    invoker: &Invoker<C>,
    req: &JobRequest,
) {
    state.info = format!("Optimizing {}…", req.input_path.display());
    terminal
        .draw(|f| draw(f.area(), f, state, invoker.program()))
        .ok();
}

/// Run one job and show its outcome. `replace` removes the existing output
/// once the invoker's checks pass.
fn run_job<C: CommandRunner>(
    state: &mut FormState,
    invoker: &Invoker<C>,
    req: &JobRequest,
    replace: bool,
) {
    let outcome = if replace {
        invoker.invoke_replacing(req)
    } else {
        invoker.invoke(req)
    };
    if let Err(e) = &outcome {
        log::debug!("invocation failed: {e:?}");
    }
    state.apply_outcome(outcome);
}

/// Label/value lines, wrapping long values under the label.
fn push_wrapped_kv(
    out: &mut Vec<Line<'static>>,
    label: &str,
    value: &str,
    area_width: u16,
    label_style: Style,
) {
    // Account for borders (2 chars on each side)
    let usable_width = area_width.saturating_sub(4).max(1);
    let label_text = format!("{label}:");
    let label_width = label_text.chars().count() as u16;

    let value_chars: Vec<char> = value.chars().collect();
    let mut remaining = value_chars.as_slice();
    let mut first = true;

    loop {
        let line_width = if first {
            usable_width.saturating_sub(label_width + 1).max(1)
        } else {
            usable_width.saturating_sub(2).max(1)
        };

        let chars_to_take = (remaining.len() as u16).min(line_width) as usize;
        let (line_chars, rest) = remaining.split_at(chars_to_take);
        let line_text: String = line_chars.iter().collect();

        if first {
            out.push(Line::from(vec![
                Span::styled(label_text.clone(), label_style),
                Span::raw(" "),
                Span::raw(line_text),
            ]));
            first = false;
        } else {
            out.push(Line::from(vec![Span::raw("  "), Span::raw(line_text)]));
        }

        remaining = rest;
        if remaining.is_empty() {
            break;
        }
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &FormState, program: &str) {
    let palette = state.config.theme.palette();
    f.render_widget(Block::default().style(palette.base()), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled("Subsetter: ", palette.label()),
        Span::raw(program.to_string()),
        Span::raw("   "),
        Span::styled("F1", palette.key()),
        Span::raw(" help  "),
        Span::styled("Esc", palette.key()),
        Span::raw(" quit"),
    ]))
    .style(palette.base())
    .block(Block::default().borders(Borders::ALL).title("fontsub"));
    f.render_widget(header, chunks[0]);

    draw_fields(chunks[1], f, state, &palette);

    let status = Paragraph::new(state.info.clone())
        .style(palette.base())
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, chunks[2]);

    if let Some(picker) = &state.picker {
        draw_picker(centered_rect(70, 70, area), f, picker, &palette);
    } else if let Some(modal) = &state.modal {
        draw_modal(area, f, modal, &palette);
    }
}

fn draw_fields(area: Rect, f: &mut ratatui::Frame, state: &FormState, palette: &Palette) {
    let mut lines: Vec<Line> = Vec::new();

    for field in Field::ALL {
        let focused = state.focus == Focus::Field(field);
        let mut value = state.value(field).to_string();
        let label_style = if focused {
            value.push('▏');
            palette.focused()
        } else {
            palette.label()
        };
        let label = match (focused, field.picker_mode()) {
            (true, Some(_)) => format!("{} (Ctrl-O to browse)", field.label()),
            _ => field.label().to_string(),
        };
        push_wrapped_kv(&mut lines, &label, &value, area.width, label_style);
        lines.push(Line::from(""));
    }

    let button_style = if state.focus == Focus::Optimize {
        palette.focused().add_modifier(Modifier::REVERSED)
    } else {
        palette.key()
    };
    lines.push(Line::from(Span::styled("[ Optimize ]", button_style)));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Output file: ", palette.label()),
        Span::raw(state.output_path().display().to_string()),
    ]));

    let p = Paragraph::new(lines)
        .style(palette.base())
        .block(Block::default().borders(Borders::ALL).title("Parameters"));
    f.render_widget(p, area);
}

fn draw_picker(area: Rect, f: &mut ratatui::Frame, picker: &Picker, palette: &Palette) {
    let title = match picker.mode {
        picker::PickerMode::File => format!("Choose font file: {}", picker.cwd.display()),
        picker::PickerMode::Directory => {
            format!("Choose output directory: {}", picker.cwd.display())
        }
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(area);

    let items: Vec<ListItem> = picker
        .entries
        .iter()
        .map(|e| ListItem::new(e.label()))
        .collect();
    let list = List::new(items)
        .style(palette.base())
        .highlight_style(palette.focused().add_modifier(Modifier::REVERSED))
        .block(Block::default().borders(Borders::ALL).title(title));
    let mut list_state = ListState::default().with_selected(Some(picker.selected));

    f.render_widget(Clear, area);
    f.render_stateful_widget(list, chunks[0], &mut list_state);

    let footer = match &picker.error {
        Some(e) => Line::from(Span::styled(e.clone(), Style::default().fg(palette.error))),
        None => Line::from(vec![
            Span::styled("Enter", palette.key()),
            Span::raw(" open/choose  "),
            Span::styled("Backspace", palette.key()),
            Span::raw(" up  "),
            Span::styled(".", palette.key()),
            Span::raw(" hidden  "),
            Span::styled("Esc", palette.key()),
            Span::raw(" close"),
        ]),
    };
    f.render_widget(Paragraph::new(footer).style(palette.base()), chunks[1]);
}

fn draw_modal(area: Rect, f: &mut ratatui::Frame, modal: &Modal, palette: &Palette) {
    match modal {
        Modal::Help => help::draw_help(centered_rect(70, 80, area), f, palette),
        Modal::Alert { kind, title, lines } => {
            let colour = match kind {
                AlertKind::Info => palette.success,
                AlertKind::Warning => palette.warning,
                AlertKind::Error => palette.error,
            };
            let mut body: Vec<Line> = lines.iter().map(|l| Line::from(l.clone())).collect();
            body.push(Line::from(""));
            body.push(Line::from(vec![
                Span::styled("Enter", palette.key()),
                Span::raw(" close"),
            ]));
            let p = Paragraph::new(body)
                .style(palette.base())
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(colour))
                        .title(Span::styled(title.clone(), Style::default().fg(colour))),
                );
            let popup = centered_rect(60, 40, area);
            f.render_widget(Clear, popup);
            f.render_widget(p, popup);
        }
        Modal::ConfirmOverwrite {
            request,
            yes_selected,
        } => {
            let (yes, no) = if *yes_selected {
                (palette.focused().add_modifier(Modifier::REVERSED), palette.key())
            } else {
                (palette.key(), palette.focused().add_modifier(Modifier::REVERSED))
            };
            let p = Paragraph::new(vec![
                Line::from(format!("{} already exists.", request.output_path.display())),
                Line::from("Overwrite it?"),
                Line::from(""),
                Line::from(vec![
                    Span::styled("[ Yes ]", yes),
                    Span::raw("   "),
                    Span::styled("[ No ]", no),
                ]),
            ])
            .style(palette.base())
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.warning))
                    .title("Confirm overwrite"),
            );
            let popup = centered_rect(60, 30, area);
            f.render_widget(Clear, popup);
            f.render_widget(p, popup);
        }
    }
}
