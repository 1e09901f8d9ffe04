use ratatui::style::Color;

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    pub title: Color,
    pub month_band: Color,
    pub week_band: Color,
    pub day_header: Color,
    pub today: Color,
    pub weekend: Color,
    pub hour_line: Color,
    pub overflow: Color,
    pub status_bar: Color,
    pub help_title: Color,
    pub help_section: Color,
    pub command_mode: Color,
    pub error: Color,
    pub success: Color,
}

impl Theme {
    pub fn default_theme() -> Self {
        Self {
            name: "default".to_string(),
            title: Color::Cyan,
            month_band: Color::Cyan,
            week_band: Color::Blue,
            day_header: Color::Yellow,
            today: Color::Green,
            weekend: Color::DarkGray,
            hour_line: Color::DarkGray,
            overflow: Color::Gray,
            status_bar: Color::White,
            help_title: Color::Cyan,
            help_section: Color::Yellow,
            command_mode: Color::White,
            error: Color::Red,
            success: Color::Green,
        }
    }

    pub fn gruvbox() -> Self {
        Self {
            name: "gruvbox".to_string(),
            title: Color::Rgb(251, 184, 108),
            month_band: Color::Rgb(250, 189, 47),
            week_band: Color::Rgb(131, 165, 152),
            day_header: Color::Rgb(254, 128, 25),
            today: Color::Rgb(184, 187, 38),
            weekend: Color::Rgb(146, 131, 116),
            hour_line: Color::Rgb(80, 73, 69),
            overflow: Color::Rgb(168, 153, 132),
            status_bar: Color::Rgb(235, 219, 178),
            help_title: Color::Rgb(251, 184, 108),
            help_section: Color::Rgb(254, 128, 25),
            command_mode: Color::Rgb(235, 219, 178),
            error: Color::Rgb(251, 73, 52),
            success: Color::Rgb(184, 187, 38),
        }
    }

    pub fn nord() -> Self {
        Self {
            name: "nord".to_string(),
            title: Color::Rgb(136, 192, 208),
            month_band: Color::Rgb(143, 188, 187),
            week_band: Color::Rgb(129, 161, 193),
            day_header: Color::Rgb(235, 203, 139),
            today: Color::Rgb(163, 190, 140),
            weekend: Color::Rgb(76, 86, 106),
            hour_line: Color::Rgb(59, 66, 82),
            overflow: Color::Rgb(216, 222, 233),
            status_bar: Color::Rgb(216, 222, 233),
            help_title: Color::Rgb(136, 192, 208),
            help_section: Color::Rgb(235, 203, 139),
            command_mode: Color::Rgb(216, 222, 233),
            error: Color::Rgb(191, 97, 106),
            success: Color::Rgb(163, 190, 140),
        }
    }

    pub fn get_by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "gruvbox" => Self::gruvbox(),
            "nord" => Self::nord(),
            _ => Self::default_theme(),
        }
    }

    pub fn available_themes() -> Vec<&'static str> {
        vec!["default", "gruvbox", "nord"]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}

pub fn hex_to_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
