use once_cell::sync::Lazy;
use ratatui::style::Color;
use std::env;

/// Detect if the terminal supports true color (24-bit RGB)
pub fn supports_true_color() -> bool {
    ["COLORTERM", "TERM"].iter().any(|var| {
        env::var(var).is_ok_and(|value| {
            let value = value.to_lowercase();
            value.contains("truecolor") || value.contains("24bit")
        })
    })
}

fn pick(rgb: u32, fallback: Color) -> Color {
    if supports_true_color() {
        Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    } else {
        fallback
    }
}

#[derive(Clone, Debug)]
pub struct SidebarPalette {
    pub background: Color,
    pub text: Color,
    pub dimmed: Color,
    pub border: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    pub active: Color,  // Current page
    pub section: Color, // Expandable entries
    pub part_title: Color,
}

// Oceanic Next colors, resolved once the terminal capabilities are known
pub static OCEANIC_NEXT: Lazy<SidebarPalette> = Lazy::new(|| SidebarPalette {
    background: Color::Reset,
    text: pick(0xC0C5CE, Color::Gray),
    dimmed: pick(0x65737E, Color::DarkGray),
    border: pick(0xA7ADBA, Color::Gray),
    selection_bg: pick(0x4F5B66, Color::DarkGray),
    selection_fg: pick(0xCDD3DE, Color::White),
    active: pick(0xEC5F67, Color::Red),
    section: pick(0x6699CC, Color::Blue),
    part_title: pick(0xC594C5, Color::Magenta),
});

impl SidebarPalette {
    // Get colors for focused/unfocused panels
    pub fn get_panel_colors(&self, is_focused: bool) -> (Color, Color) {
        if is_focused {
            (self.text, self.border)
        } else {
            (self.dimmed, self.dimmed)
        }
    }

    pub fn get_selection_colors(&self, is_focused: bool) -> (Color, Color) {
        if is_focused {
            (self.selection_bg, self.selection_fg)
        } else {
            (self.selection_bg, self.dimmed)
        }
    }
}
