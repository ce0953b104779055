//! Fixed engine theme and the ANSI helpers that use it.

use termdeck_config::schema::TerminalTheme;

const RESET: &str = "\x1b[0m";

/// An RGB color parsed from `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parse a `#rrggbb` hex string.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    /// Truecolor SGR foreground escape for this color.
    pub fn fg_escape(&self) -> String {
        format!("\x1b[38;2;{};{};{}m", self.r, self.g, self.b)
    }
}

/// Colors every engine instance is created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineTheme {
    pub background: Rgb,
    pub foreground: Rgb,
    pub cursor: Rgb,
    pub selection: Rgb,
    pub error: Rgb,
}

impl EngineTheme {
    /// Wrap `message` as a colored `[Error] ...` line.
    pub fn error_line(&self, message: &str) -> String {
        format!("{}[Error] {message}{RESET}", self.error.fg_escape())
    }
}

impl From<&TerminalTheme> for EngineTheme {
    fn from(theme: &TerminalTheme) -> Self {
        let defaults = Self::default();
        Self {
            background: Rgb::from_hex(&theme.background).unwrap_or(defaults.background),
            foreground: Rgb::from_hex(&theme.foreground).unwrap_or(defaults.foreground),
            cursor: Rgb::from_hex(&theme.cursor).unwrap_or(defaults.cursor),
            selection: Rgb::from_hex(&theme.selection).unwrap_or(defaults.selection),
            error: Rgb::from_hex(&theme.error).unwrap_or(defaults.error),
        }
    }
}

impl Default for EngineTheme {
    fn default() -> Self {
        Self {
            background: Rgb { r: 0x1e, g: 0x1e, b: 0x1e },
            foreground: Rgb { r: 0xd4, g: 0xd4, b: 0xd4 },
            cursor: Rgb { r: 0xae, g: 0xaf, b: 0xad },
            selection: Rgb { r: 0x26, g: 0x4f, b: 0x78 },
            error: Rgb { r: 0xf1, g: 0x4c, b: 0x4c },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(
            Rgb::from_hex("#ff8000"),
            Some(Rgb { r: 255, g: 128, b: 0 })
        );
        assert_eq!(Rgb::from_hex("ff8000"), None);
        assert_eq!(Rgb::from_hex("#ff80"), None);
        assert_eq!(Rgb::from_hex("#gg0000"), None);
    }

    #[test]
    fn default_theme_matches_default_config() {
        let theme = EngineTheme::from(&TerminalTheme::default());
        assert_eq!(theme, EngineTheme::default());
    }

    #[test]
    fn bad_config_colors_fall_back() {
        let config = TerminalTheme {
            error: "red".into(),
            ..Default::default()
        };
        let theme = EngineTheme::from(&config);
        assert_eq!(theme.error, EngineTheme::default().error);
    }

    #[test]
    fn error_line_is_colored_and_reset() {
        let line = EngineTheme::default().error_line("spawn failed");
        assert!(line.starts_with("\x1b[38;2;241;76;76m"));
        assert!(line.contains("[Error] spawn failed"));
        assert!(line.ends_with("\x1b[0m"));
    }
}
