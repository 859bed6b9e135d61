use std::path::{Path, PathBuf};

use releve_pdf::Branding;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_LEFT_LOGO: &str = "assets/bpm.png";
pub const DEFAULT_RIGHT_LOGO: &str = "assets/bankily.png";
const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to write settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("No configuration directory available on this platform")]
    NoConfigDir,
}

/// User choices that survive between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub left_logo: Option<PathBuf>,
    pub right_logo: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    /// Environment variable prefixes removed before launching a generator.
    pub scrubbed_env_prefixes: Option<Vec<String>>,
}

impl Settings {
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        let dirs = directories::ProjectDirs::from("com", "releve", "Releve")
            .ok_or(SettingsError::NoConfigDir)?;
        Ok(dirs.config_dir().join(SETTINGS_FILE))
    }

    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        tracing::debug!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Saved logos, falling back to the bundled `assets/` files in `base`.
    pub fn branding(&self, base: &Path) -> Branding {
        Branding::new(
            Some(self.left_logo.clone().unwrap_or_else(|| base.join(DEFAULT_LEFT_LOGO))),
            Some(self.right_logo.clone().unwrap_or_else(|| base.join(DEFAULT_RIGHT_LOGO))),
        )
    }

    pub fn output_dir(&self, base: &Path) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| base.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let s = Settings::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf/settings.toml");
        let s = Settings {
            left_logo: Some(PathBuf::from("/srv/logos/bpm.png")),
            output_dir: Some(PathBuf::from("/srv/out")),
            ..Settings::default()
        };
        s.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), s);
    }

    #[test]
    fn branding_falls_back_to_assets() {
        let base = Path::new("/opt/releve");
        let s = Settings {
            right_logo: Some(PathBuf::from("/tmp/custom.png")),
            ..Settings::default()
        };
        let b = s.branding(base);
        assert_eq!(b.left_logo, Some(base.join("assets/bpm.png")));
        assert_eq!(b.right_logo, Some(PathBuf::from("/tmp/custom.png")));
        assert_eq!(s.output_dir(base), base);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "left_logo = [").unwrap();
        assert!(matches!(Settings::load(&path), Err(SettingsError::Parse(_))));
    }
}
