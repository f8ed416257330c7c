use std::path::PathBuf;

/// Environment variable overriding the config directory.
pub const HOME_ENV: &str = "EMTHREE_HOME";

/// Returns the configuration directory, or None if no platform config dir exists.
pub fn try_emthree_home() -> Option<PathBuf> {
    if let Some(val) = std::env::var_os(HOME_ENV) {
        return Some(PathBuf::from(val));
    }
    dirs::config_dir().map(|d| d.join("emthree"))
}

/// Config file: $EMTHREE_HOME/config.toml
pub fn config_path() -> Option<PathBuf> {
    try_emthree_home().map(|h| h.join("config.toml"))
}

/// Default data directory holding the manifest.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("emthree"))
        .unwrap_or_else(|| PathBuf::from(".emthree"))
}

/// Default mod directory: the game's `mods` folder under the working directory.
pub fn default_mod_dir() -> PathBuf {
    PathBuf::from("mods")
}

/// Manifest file inside a data directory.
pub fn manifest_path(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("modlist.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_manifest_path() {
        assert_eq!(
            manifest_path(Path::new("/data/emthree")),
            Path::new("/data/emthree/modlist.json")
        );
    }
}
