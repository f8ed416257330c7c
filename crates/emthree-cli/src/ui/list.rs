//! Column-aligned rendering for `emthree list`.

use crossterm::style::Stylize;

use super::theme::Theme;

/// Column headers.
pub fn list_header(theme: &Theme) -> String {
    format!(
        "  {:<nw$} {:<vw$} {}",
        "name",
        "version",
        "file",
        nw = theme.layout.name_width,
        vw = theme.layout.version_width,
    )
    .dark_grey()
    .to_string()
}

/// One manifest entry. `file` is `None` when nothing is installed for it.
pub fn list_row(theme: &Theme, name: &str, version: &str, file: Option<&str>) -> String {
    let name_part = format!("{:<width$}", name, width = theme.layout.name_width);
    let version_part = format!("{:<width$}", version, width = theme.layout.version_width);
    let file_part = match file {
        Some(f) => f.with(theme.colors.secondary),
        None => "NOT INSTALLED".with(theme.colors.warning),
    };

    format!(
        "  {} {} {}",
        name_part.with(theme.colors.package_name),
        version_part.with(theme.colors.version),
        file_part
    )
}

/// Count plus a reminder of what is tracked.
pub fn list_footer(count: usize) -> String {
    format!(
        "  {count} mod{} in manifest. Files not installed through emthree are not listed.",
        if count == 1 { "" } else { "s" }
    )
    .dark_grey()
    .to_string()
}
