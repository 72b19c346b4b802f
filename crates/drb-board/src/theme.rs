use ratatui::style::{Color, Modifier, Style};

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Rgb(142, 192, 124))
    .add_modifier(Modifier::BOLD);
pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(131, 165, 152))
    .fg(Color::Black)
    .add_modifier(Modifier::BOLD);
pub const CLOCK_STYLE: Style = Style::new()
    .fg(Color::Rgb(131, 165, 152))
    .add_modifier(Modifier::BOLD);
pub const ERROR_STYLE: Style = Style::new().fg(Color::Rgb(251, 73, 52));
pub const MUTED_STYLE: Style = Style::new().fg(Color::Rgb(146, 131, 116));

pub fn zebra_row_style(index: usize) -> Style {
    let bg = if index % 2 == 0 {
        Color::Rgb(18, 20, 26)
    } else {
        Color::Rgb(24, 27, 34)
    };
    Style::new().bg(bg)
}

pub mod icons {
    pub const CHECK: &str = "x";
    pub const PENDING: &str = ".";
}

pub fn done_color(done: bool) -> Color {
    if done {
        Color::Rgb(184, 187, 38)
    } else {
        Color::Rgb(146, 131, 116)
    }
}
