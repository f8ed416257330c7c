//! Colors, icons and column widths shared by every view.

use crossterm::style::Color;

#[derive(Debug, Clone, Default)]
pub struct Theme {
    pub colors: ColorScheme,
    pub icons: Icons,
    pub layout: Layout,
}

#[derive(Debug, Clone)]
pub struct ColorScheme {
    /// Mod slugs
    pub package_name: Color,
    pub version: Color,
    /// Filenames, statuses and other secondary info
    pub secondary: Color,
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            package_name: Color::Cyan,
            version: Color::White,
            secondary: Color::DarkGrey,
            header: Color::DarkGrey,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Icons {
    pub success: &'static str,
    pub error: &'static str,
    pub warning: &'static str,
    pub info: &'static str,
    /// Download in flight
    pub active: &'static str,
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            success: "✓",
            error: "✗",
            warning: "⚠",
            info: "ℹ",
            active: "●",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub name_width: usize,
    pub version_width: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            name_width: 24,
            version_width: 18,
        }
    }
}

/// Format a duration in seconds the way summaries show it.
pub fn format_secs(secs: f64) -> String {
    if secs >= 60.0 {
        let whole = secs as u64;
        format!("{}m {:02}s", whole / 60, whole % 60)
    } else {
        format!("{secs:.2}s")
    }
}
