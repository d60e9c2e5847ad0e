use ratatui::style::Color;

/// CPU usage at or above these percentages switches the CPU% cell colour.
const CPU_WARM: f32 = 25.0;
const CPU_HOT: f32 = 75.0;

#[derive(Debug, Clone)]
pub struct Theme {
    pub header_accent_bg: Color,
    pub header_accent_fg: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    pub status_ok: Color,
    pub status_err: Color,
    pub statusbar_bg: Color,
    pub overlay_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub accent: Color,
    pub pill_key_bg: Color,
    pub pill_key_fg: Color,
    pub pill_desc_fg: Color,
    pub surface_bg: Color,
    pub kernel_fg: Color,
    pub heat_colors: [Color; 3],
}

impl Default for Theme {
    fn default() -> Self {
        Self::detect()
    }
}

impl Theme {
    /// Honours `NO_COLOR` (https://no-color.org).
    pub fn detect() -> Self {
        match std::env::var_os("NO_COLOR") {
            Some(value) if !value.is_empty() => Self::mono(),
            _ => Self::dark(),
        }
    }

    pub fn dark() -> Self {
        Theme {
            header_accent_bg: Color::Green,
            header_accent_fg: Color::Black,
            selection_bg: Color::Rgb(49, 50, 68),
            selection_fg: Color::White,
            status_ok: Color::Green,
            status_err: Color::Red,
            statusbar_bg: Color::DarkGray,
            overlay_border: Color::DarkGray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            accent: Color::Green,
            pill_key_bg: Color::Yellow,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::DarkGray,
            kernel_fg: Color::Rgb(129, 140, 248),
            heat_colors: [
                Color::Rgb(16, 185, 129),
                Color::Rgb(249, 115, 22),
                Color::Rgb(239, 68, 68),
            ],
        }
    }

    pub fn mono() -> Self {
        Theme {
            header_accent_bg: Color::White,
            header_accent_fg: Color::Black,
            selection_bg: Color::White,
            selection_fg: Color::Black,
            status_ok: Color::White,
            status_err: Color::White,
            statusbar_bg: Color::Reset,
            overlay_border: Color::Gray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            accent: Color::White,
            pill_key_bg: Color::Gray,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::Reset,
            kernel_fg: Color::Gray,
            heat_colors: [Color::White; 3],
        }
    }

    pub fn cpu_color(&self, percent: f32) -> Color {
        if percent >= CPU_HOT {
            self.heat_colors[2]
        } else if percent >= CPU_WARM {
            self.heat_colors[1]
        } else {
            self.heat_colors[0]
        }
    }
}
