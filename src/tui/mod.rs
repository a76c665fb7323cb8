mod help;
mod picker;
mod state;

use crate::cli::Cli;
use crate::engine;
use crate::logging;
use crate::model::{self, AppEvent, StatusLevel, Task};
use crate::orchestrator::{
    run_controller, ActiveTaskCounter, ShutdownCoordinator, StatusReporter, UiCommand,
};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use picker::{PickerMode, PickerState};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs},
    Terminal,
};
use state::{Field, UiState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

const TAB_TITLES: [&str; 3] = ["Compress", "Decompress", "Logs"];
const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

type Term = Terminal<CrosstermBackend<io::Stdout>>;

pub async fn run(args: Cli) -> Result<()> {
    // Unbounded channels: worker completion must never block on the UI.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<AppEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    let counter = Arc::new(ActiveTaskCounter::new());
    let reporter = StatusReporter::new(event_tx);

    // TUI runs in a dedicated thread to keep all blocking I/O out of the
    // Tokio runtime; it is the only context that touches interface state.
    let ui_args = args.clone();
    let ui_counter = counter.clone();
    let ui_handle = std::thread::Builder::new()
        .name("ui".into())
        .spawn(move || run_threaded(ui_args, event_rx, cmd_tx, ui_counter))
        .context("spawn ui thread")?;

    let res = run_controller(reporter, cmd_rx, counter).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Release the terminal. Runs exactly once per process, guarded by the
/// shutdown coordinator at the call sites.
fn restore_terminal() {
    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
}

/// Run the TUI loop on a dedicated thread.
pub fn run_threaded(
    args: Cli,
    mut event_rx: UnboundedReceiver<AppEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
    counter: Arc<ActiveTaskCounter>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // UiState is owned by the UI thread only; no cross-thread mutation.
    let mut ui = UiState::default();
    ui.log_content = logging::read_log(&args.log_file);

    let mut shutdown = ShutdownCoordinator::new();
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    let res = loop {
        // Drain events without blocking to keep the UI responsive.
        while let Ok(ev) = event_rx.try_recv() {
            apply_event(&args, &mut ui, ev);
        }

        if last_tick.elapsed() >= tick_rate {
            if ui.busy {
                ui.spinner_frame = ui.spinner_frame.wrapping_add(1);
            }
            terminal.draw(|f| draw(f.area(), f, &ui)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                if ui.show_help {
                    ui.show_help = false;
                    continue;
                }
                if ui.picker.is_some() {
                    handle_picker_key(&mut ui, k);
                    continue;
                }
                match (k.modifiers, k.code) {
                    (_, KeyCode::Esc) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                        // Break instead of `?` so the teardown below still
                        // runs if the confirmation prompt itself fails.
                        match handle_close_request(&mut terminal, &ui, &counter, &mut shutdown, &cmd_tx)
                        {
                            Ok(true) => break Ok(()),
                            Ok(false) => {}
                            Err(e) => break Err(e),
                        }
                    }
                    (_, KeyCode::F(1)) => {
                        ui.show_help = true;
                    }
                    (_, KeyCode::Tab) => {
                        ui.tab = (ui.tab + 1) % TAB_TITLES.len();
                    }
                    (KeyModifiers::CONTROL, KeyCode::Char('o')) => {
                        if ui.busy {
                            continue;
                        }
                        open_picker(&mut ui, &args, Field::Input);
                    }
                    (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
                        if ui.busy {
                            continue;
                        }
                        open_picker(&mut ui, &args, Field::Output);
                    }
                    (_, KeyCode::Enter) => {
                        if ui.current_form().is_some() {
                            dispatch_current(&mut ui, &cmd_tx);
                        }
                    }
                    (_, KeyCode::Up) | (_, KeyCode::Down) => {
                        if let Some(form) = ui.current_form_mut() {
                            form.toggle_focus();
                        }
                    }
                    (_, KeyCode::Backspace) => {
                        if let Some(form) = ui.current_form_mut() {
                            form.focused_mut().pop();
                        }
                    }
                    (_, KeyCode::Char(c)) => {
                        if let Some(form) = ui.current_form_mut() {
                            form.focused_mut().push(c);
                        } else {
                            handle_logs_key(&args, &mut ui, c);
                        }
                    }
                    _ => {}
                }
            }
        }
    };

    // All exit paths funnel through the coordinator: the terminal is
    // released exactly once, and a duplicate invocation is caught and
    // logged as already-destroyed instead of crashing.
    let _ = shutdown.teardown(restore_terminal);
    res
}

/// Handle a close request. Returns true when the loop should exit; the
/// caller performs teardown through the coordinator on exit.
fn handle_close_request(
    terminal: &mut Term,
    ui: &UiState,
    counter: &ActiveTaskCounter,
    shutdown: &mut ShutdownCoordinator,
    cmd_tx: &UnboundedSender<UiCommand>,
) -> Result<bool> {
    info!("application closing sequence initiated");
    if counter.is_idle() {
        let _ = cmd_tx.send(UiCommand::Quit);
        return Ok(true);
    }

    warn!(
        "attempting to close application with {} active task(s)",
        counter.active()
    );
    if confirm_quit(terminal, ui)? {
        shutdown.begin_close();
        info!("user confirmed close while tasks active; shutting down");
        let _ = cmd_tx.send(UiCommand::Quit);
        Ok(true)
    } else {
        // Close request fully cancelled; no transition, no partial teardown.
        info!("user cancelled application close due to active tasks");
        Ok(false)
    }
}

/// Synchronous yes/no modal on the UI thread. Blocks until answered; worker
/// events queue in the channel meanwhile and drain afterward.
fn confirm_quit(terminal: &mut Term, ui: &UiState) -> Result<bool> {
    loop {
        terminal
            .draw(|f| {
                draw(f.area(), f, ui);
                draw_confirm(f.area(), f);
            })
            .ok();
        if let Event::Key(k) = event::read().context("read confirmation key")? {
            if k.kind != KeyEventKind::Press {
                continue;
            }
            match k.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => return Ok(true),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => return Ok(false),
                _ => {}
            }
        }
    }
}

fn apply_event(args: &Cli, ui: &mut UiState, ev: AppEvent) {
    match ev {
        AppEvent::TaskStarted { active } => {
            ui.busy = true;
            ui.active = active;
        }
        AppEvent::TaskFinished { message, idle } => {
            ui.active = ui.active.saturating_sub(1);
            if idle {
                // 0 in flight again: re-enable controls, hide the spinner.
                ui.busy = false;
            }
            ui.status = message;
        }
        AppEvent::Status(message) => ui.status = message,
        AppEvent::LogsChanged => ui.log_content = logging::read_log(&args.log_file),
    }
}

/// Validate and dispatch the current form's task. Invalid input is rejected
/// here synchronously; no command is sent and no worker is spawned.
fn dispatch_current(ui: &mut UiState, cmd_tx: &UnboundedSender<UiCommand>) {
    if ui.busy {
        ui.status = "An operation is already in progress.".into();
        return;
    }
    let Some(form) = ui.current_form() else {
        return;
    };
    let task = Task {
        kind: form.kind,
        input: PathBuf::from(form.input.trim()),
        output: PathBuf::from(form.output.trim()),
    };
    match engine::validate(&task) {
        Err(e) => {
            ui.status = e.to_string();
        }
        Ok(()) => {
            ui.status = format!("{} {}...", task.kind.verb(), model::file_name(&task.input));
            // Disable controls immediately; TaskStarted confirms shortly.
            ui.busy = true;
            let _ = cmd_tx.send(UiCommand::Dispatch(task));
        }
    }
}

fn handle_logs_key(args: &Cli, ui: &mut UiState, c: char) {
    match c {
        'r' => {
            ui.log_content = logging::read_log(&args.log_file);
            ui.status = "Logs refreshed".into();
        }
        'j' => ui.log_scroll = ui.log_scroll.saturating_add(1),
        'k' => ui.log_scroll = ui.log_scroll.saturating_sub(1),
        'g' => ui.log_scroll = 0,
        'G' => {
            let lines = ui.log_content.lines().count() as u16;
            ui.log_scroll = lines.saturating_sub(10);
        }
        'q' => {
            // Quit from the Logs tab goes through the same close path as
            // Esc; handled by re-injecting is not worth it, so just hint.
            ui.status = "Press Esc to quit".into();
        }
        '?' => ui.show_help = true,
        _ => {}
    }
}

/// Open the file picker for the focused form, mirroring the platform
/// open/save dialogs: open mode for the input, save mode (directory plus
/// editable name) for the output.
fn open_picker(ui: &mut UiState, args: &Cli, target: Field) {
    let Some(form) = ui.current_form() else {
        return;
    };
    let (mode, current) = match target {
        Field::Input => (PickerMode::Open, Path::new(&form.input)),
        Field::Output => (PickerMode::Save, Path::new(&form.output)),
    };
    let dir = current
        .parent()
        .filter(|p| !p.as_os_str().is_empty() && p.is_dir())
        .map(Path::to_path_buf)
        .or_else(|| args.start_dir.clone())
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = match mode {
        PickerMode::Open => String::new(),
        PickerMode::Save => model::file_name(current),
    };
    ui.picker = Some(PickerState::open(mode, target, dir, file_name));
}

fn handle_picker_key(ui: &mut UiState, k: KeyEvent) {
    let Some(picker) = ui.picker.as_mut() else {
        return;
    };
    match k.code {
        KeyCode::Esc => {
            // Cancelled selection is a no-op for the form.
            ui.picker = None;
        }
        KeyCode::Up => picker.move_up(),
        KeyCode::Down => picker.move_down(),
        KeyCode::Left => picker.ascend(),
        KeyCode::Right => picker.descend(),
        KeyCode::Backspace => {
            if picker.mode == PickerMode::Save {
                picker.file_name.pop();
            } else {
                picker.ascend();
            }
        }
        KeyCode::Char(c) => {
            if picker.mode == PickerMode::Save {
                picker.file_name.push(c);
            } else {
                match c {
                    'j' => picker.move_down(),
                    'k' => picker.move_up(),
                    'h' => picker.ascend(),
                    'l' => picker.descend(),
                    _ => {}
                }
            }
        }
        KeyCode::Enter => {
            if let Some(path) = picker.confirm() {
                let target = picker.target;
                ui.picker = None;
                if let Some(form) = ui.current_form_mut() {
                    match target {
                        Field::Input => {
                            info!("input file selected: {}", path.display());
                            form.apply_input_selection(&path);
                        }
                        Field::Output => {
                            info!("output file selected: {}", path.display());
                            form.output = path.display().to_string();
                        }
                    }
                }
            }
        }
        _ => {}
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, ui: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(4),
            ]
            .as_ref(),
        )
        .split(area);

    let tabs = Tabs::new(TAB_TITLES.iter().map(|t| Line::from(*t)).collect::<Vec<_>>())
        .select(ui.tab)
        .block(Block::default().borders(Borders::ALL).title("lzpack"))
        .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    match ui.tab {
        0 => draw_form(chunks[1], f, ui, &ui.compress),
        1 => draw_form(chunks[1], f, ui, &ui.decompress),
        _ => draw_logs(chunks[1], f, ui),
    }

    draw_status(chunks[2], f, ui);

    if let Some(picker) = ui.picker.as_ref() {
        draw_picker(centered_rect(area, 70, 70), f, picker);
    }
    if ui.show_help {
        help::draw_help(centered_rect(area, 60, 80), f);
    }
}

fn field_block(title: &str, focused: bool, busy: bool) -> Block<'static> {
    let style = if busy {
        Style::default().fg(Color::DarkGray)
    } else if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title.to_string())
}

fn draw_form(area: Rect, f: &mut ratatui::Frame, ui: &UiState, form: &state::FormState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(area);

    let input_title = match form.kind {
        model::TaskKind::Compress => "File to compress",
        model::TaskKind::Decompress => "File to decompress (.lzma)",
    };
    let input = Paragraph::new(form.input.as_str()).block(field_block(
        input_title,
        form.focus == Field::Input,
        ui.busy,
    ));
    f.render_widget(input, rows[0]);

    let output = Paragraph::new(form.output.as_str()).block(field_block(
        "Save as",
        form.focus == Field::Output,
        ui.busy,
    ));
    f.render_widget(output, rows[1]);

    let hint = if ui.busy {
        Line::from(Span::styled(
            "Controls disabled while an operation is running...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(vec![
            Span::styled("Enter", Style::default().fg(Color::Magenta)),
            Span::raw(" start | "),
            Span::styled("Ctrl-O", Style::default().fg(Color::Magenta)),
            Span::raw(" browse input | "),
            Span::styled("Ctrl-S", Style::default().fg(Color::Magenta)),
            Span::raw(" browse output | "),
            Span::styled("F1", Style::default().fg(Color::Magenta)),
            Span::raw(" help"),
        ])
    };
    f.render_widget(Paragraph::new(hint), rows[2]);
}

fn draw_logs(area: Rect, f: &mut ratatui::Frame, ui: &UiState) {
    let logs = Paragraph::new(ui.log_content.as_str())
        .scroll((ui.log_scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Logs (r refresh, j/k scroll)"),
        );
    f.render_widget(logs, area);
}

fn draw_status(area: Rect, f: &mut ratatui::Frame, ui: &UiState) {
    let color = match StatusLevel::classify(&ui.status) {
        StatusLevel::Error => Style::default().fg(Color::Red),
        StatusLevel::Success => Style::default().fg(Color::Green),
        StatusLevel::Neutral => Style::default(),
    };

    let mut lines = vec![Line::from(vec![
        Span::styled("Status: ", Style::default().fg(Color::Gray)),
        Span::styled(ui.status.clone(), color),
    ])];
    if ui.busy {
        let frame = SPINNER[ui.spinner_frame % SPINNER.len()];
        lines.push(Line::from(Span::styled(
            format!("{frame} {} operation(s) in progress", ui.active),
            Style::default().add_modifier(Modifier::BOLD),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Tab switch | Esc quit",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let status =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, area);
}

fn draw_picker(area: Rect, f: &mut ratatui::Frame, picker: &PickerState) {
    let title = match picker.mode {
        PickerMode::Open => "Select file",
        PickerMode::Save => "Save as",
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(inner);

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Dir: ", Style::default().fg(Color::Gray)),
            Span::raw(picker.dir.display().to_string()),
        ])),
        rows[0],
    );

    if let Some(err) = picker.error.as_ref() {
        f.render_widget(
            Paragraph::new(err.as_str()).style(Style::default().fg(Color::Red)),
            rows[1],
        );
    } else {
        // Keep the selection visible by windowing the list around it.
        let height = rows[1].height as usize;
        let offset = picker.selected.saturating_sub(height.saturating_sub(1));
        let items: Vec<ListItem> = picker
            .entries
            .iter()
            .enumerate()
            .skip(offset)
            .take(height.max(1))
            .map(|(i, entry)| {
                let name = if entry.is_dir {
                    format!("{}/", entry.name)
                } else {
                    entry.name.clone()
                };
                let style = if i == picker.selected {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else if entry.is_dir {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                };
                ListItem::new(Span::styled(name, style))
            })
            .collect();
        f.render_widget(List::new(items), rows[1]);
    }

    let footer = match picker.mode {
        PickerMode::Open => Line::from(Span::styled(
            "Enter select | Esc cancel",
            Style::default().fg(Color::DarkGray),
        )),
        PickerMode::Save => Line::from(vec![
            Span::styled("Name: ", Style::default().fg(Color::Gray)),
            Span::raw(picker.file_name.clone()),
            Span::styled(
                "  (type to edit, Enter save, Esc cancel)",
                Style::default().fg(Color::DarkGray),
            ),
        ]),
    };
    f.render_widget(Paragraph::new(footer), rows[2]);
}

fn draw_confirm(area: Rect, f: &mut ratatui::Frame) {
    let rect = centered_rect(area, 60, 20);
    let text = vec![
        Line::from("Operations are still in progress."),
        Line::from("Are you sure you want to quit? Some data might be lost"),
        Line::from("if operations are interrupted."),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(Color::Magenta)),
            Span::raw(" quit  "),
            Span::styled("n", Style::default().fg(Color::Magenta)),
            Span::raw(" keep running"),
        ]),
    ];
    let p = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Quit"));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
