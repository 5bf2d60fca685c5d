use ratatui::style::Color;

/// Runtime theme colors
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    // Background colors
    pub bg0: Color,
    pub bg1: Color,
    pub bg2: Color,

    // Foreground colors
    pub fg0: Color,
    pub fg1: Color,
    pub grey1: Color,
    pub grey2: Color,

    // Semantic colors
    pub accent: Color,
    pub central: Color,
    pub effect: Color,
    pub flash: Color,
    pub error: Color,
    pub info: Color,
}

impl Default for Theme {
    fn default() -> Self {
        gruvbox_dark()
    }
}

/// Load a built-in theme by name, falling back to Gruvbox Dark
pub fn load_theme(name: &str) -> Theme {
    match name.to_lowercase().as_str() {
        "gruvbox-dark" => gruvbox_dark(),
        "nord" => nord(),
        "dracula" => dracula(),
        other => {
            tracing::warn!(theme = other, "Unknown theme, using gruvbox-dark");
            gruvbox_dark()
        }
    }
}

fn gruvbox_dark() -> Theme {
    Theme {
        bg0: Color::Rgb(0x28, 0x28, 0x28),
        bg1: Color::Rgb(0x32, 0x30, 0x2f),
        bg2: Color::Rgb(0x45, 0x40, 0x3d),
        fg0: Color::Rgb(0xd4, 0xbe, 0x98),
        fg1: Color::Rgb(0xdd, 0xc7, 0xa1),
        grey1: Color::Rgb(0x92, 0x83, 0x74),
        grey2: Color::Rgb(0xa8, 0x99, 0x84),
        accent: Color::Rgb(0x89, 0xb4, 0x82),
        central: Color::Rgb(0xd8, 0xa6, 0x57),
        effect: Color::Rgb(0xd3, 0x86, 0x9b),
        flash: Color::Rgb(0xe7, 0x8a, 0x4e),
        error: Color::Rgb(0xea, 0x69, 0x62),
        info: Color::Rgb(0x7d, 0xae, 0xa3),
    }
}

fn nord() -> Theme {
    Theme {
        bg0: Color::Rgb(0x2e, 0x34, 0x40), // nord0
        bg1: Color::Rgb(0x3b, 0x42, 0x52), // nord1
        bg2: Color::Rgb(0x43, 0x4c, 0x5e), // nord2
        fg0: Color::Rgb(0xec, 0xef, 0xf4), // nord6
        fg1: Color::Rgb(0xe5, 0xe9, 0xf0), // nord5
        grey1: Color::Rgb(0x5e, 0x68, 0x7a),
        grey2: Color::Rgb(0xd8, 0xde, 0xe9), // nord4
        accent: Color::Rgb(0x8f, 0xbc, 0xbb), // nord7
        central: Color::Rgb(0xeb, 0xcb, 0x8b), // nord13
        effect: Color::Rgb(0xb4, 0x8e, 0xad), // nord15
        flash: Color::Rgb(0xd0, 0x87, 0x70), // nord12
        error: Color::Rgb(0xbf, 0x61, 0x6a), // nord11
        info: Color::Rgb(0x88, 0xc0, 0xd0), // nord8
    }
}

fn dracula() -> Theme {
    Theme {
        bg0: Color::Rgb(0x28, 0x2a, 0x36),
        bg1: Color::Rgb(0x34, 0x37, 0x46),
        bg2: Color::Rgb(0x44, 0x47, 0x5a),
        fg0: Color::Rgb(0xf8, 0xf8, 0xf2),
        fg1: Color::Rgb(0xe6, 0xe6, 0xe6),
        grey1: Color::Rgb(0x62, 0x72, 0xa4),
        grey2: Color::Rgb(0xbd, 0xc1, 0xd6),
        accent: Color::Rgb(0x50, 0xfa, 0x7b),
        central: Color::Rgb(0xf1, 0xfa, 0x8c),
        effect: Color::Rgb(0xff, 0x79, 0xc6),
        flash: Color::Rgb(0xff, 0xb8, 0x6c),
        error: Color::Rgb(0xff, 0x55, 0x55),
        info: Color::Rgb(0x8b, 0xe9, 0xfd),
    }
}

/// Mix `fg` over `bg` at `alpha` (RGB colors only)
pub fn blend(fg: Color, bg: Color, alpha: f64) -> Color {
    let alpha = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 0.0 };
    match (fg, bg) {
        (Color::Rgb(fr, fg_, fb), Color::Rgb(br, bg_, bb)) => {
            let mix = |f: u8, b: u8| (b as f64 + (f as f64 - b as f64) * alpha).round() as u8;
            Color::Rgb(mix(fr, br), mix(fg_, bg_), mix(fb, bb))
        }
        _ if alpha >= 0.5 => fg,
        _ => bg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_theme_fallback() {
        assert_eq!(load_theme("NORD"), nord());
        assert_eq!(load_theme("no-such-theme"), Theme::default());
    }

    #[test]
    fn test_blend() {
        let white = Color::Rgb(255, 255, 255);
        let black = Color::Rgb(0, 0, 0);
        assert_eq!(blend(white, black, 1.0), white);
        assert_eq!(blend(white, black, 0.0), black);
        assert_eq!(blend(white, black, 0.5), Color::Rgb(128, 128, 128));
        // Negative alpha from the far side of the ring clamps to background
        assert_eq!(blend(white, black, -0.3), black);
        assert_eq!(blend(Color::Red, Color::Black, 0.7), Color::Red);
    }
}
