use ratatui::style::{Color, Modifier, Style};

pub use crate::cli::Theme;

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub text: Color,
    pub muted: Color,
    pub key: Color,
    pub focus: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub background: Color,
}

impl Theme {
    pub fn palette(self) -> Palette {
        match self {
            Theme::Dark => Palette {
                text: Color::White,
                muted: Color::Gray,
                key: Color::Magenta,
                focus: Color::Yellow,
                success: Color::Green,
                warning: Color::Yellow,
                error: Color::Red,
                background: Color::Reset,
            },
            Theme::Light => Palette {
                text: Color::Black,
                muted: Color::DarkGray,
                key: Color::Blue,
                focus: Color::Magenta,
                success: Color::Rgb(0, 120, 0),
                warning: Color::Rgb(176, 112, 0),
                error: Color::Red,
                background: Color::White,
            },
        }
    }
}

impl Palette {
    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub fn label(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn key(&self) -> Style {
        Style::default().fg(self.key)
    }

    pub fn focused(&self) -> Style {
        Style::default().fg(self.focus).add_modifier(Modifier::BOLD)
    }
}
