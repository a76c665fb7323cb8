use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

fn key(label: &str, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(label.to_string(), Style::default().fg(Color::Magenta)),
        Span::raw(format!("  {desc}")),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        key("Esc / Ctrl-C", "Quit (asks for confirmation while tasks run)"),
        key("Tab         ", "Switch tabs"),
        key("F1          ", "Toggle this help"),
        Line::from(""),
        Line::from("Compress / Decompress tabs:"),
        key("Up/Down     ", "Switch between input and output fields"),
        key("typing      ", "Edit the focused path"),
        key("Ctrl-O      ", "Browse for the input file"),
        key("Ctrl-S      ", "Browse for the output location"),
        key("Enter       ", "Start the operation"),
        Line::from(""),
        Line::from("Logs tab:"),
        key("r           ", "Refresh"),
        key("j/k         ", "Scroll"),
        key("g / G       ", "Jump to top / bottom"),
        Line::from(""),
        Line::from("File picker:"),
        key("Up/Down     ", "Navigate"),
        key("Left/Right  ", "Parent directory / enter directory"),
        key("Enter       ", "Select"),
        key("Esc         ", "Cancel"),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}
