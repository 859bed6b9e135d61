use std::path::Path;
use std::process::{Command, Stdio};

use releve_core::{ReportVariant, VariantKind};
use thiserror::Error;

/// Variables injected by self-contained bundlers. A child inheriting them
/// may pick up the parent's bundled libraries instead of its own.
pub const DEFAULT_SCRUBBED_PREFIXES: &[&str] = &["APPDIR", "APPIMAGE", "ARGV0", "OWD", "LD_PRELOAD", "_MEI"];

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Cannot locate the current executable: {0}")]
    CurrentExe(std::io::Error),
    #[error("Failed to start generator: {0}")]
    Spawn(std::io::Error),
}

/// One entry of the hub listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorCard {
    pub kind: VariantKind,
    pub title: &'static str,
    pub description: &'static str,
    pub details: &'static [&'static str],
}

impl GeneratorCard {
    pub fn required_column(&self) -> String {
        ReportVariant::preset(self.kind).key_column
    }
}

pub const CARDS: [GeneratorCard; 3] = [
    GeneratorCard {
        kind: VariantKind::Centres,
        title: "Multi-Centres",
        description: "Génère un rapport par centre géographique",
        details: &["Format : relevé commerçant", "Groupement par zones"],
    },
    GeneratorCard {
        kind: VariantKind::Merchants,
        title: "Multi-Commerçants",
        description: "Génère un rapport par commerçant individuel",
        details: &["Format : relevé commerçant", "Groupement par boutiques"],
    },
    GeneratorCard {
        kind: VariantKind::Agents,
        title: "Multi-Agents",
        description: "Génère un rapport par agent BANKILY",
        details: &["Format : relevé agent", "Calcul des commissions"],
    },
];

pub fn is_scrubbed<P: AsRef<str>>(name: &str, prefixes: &[P]) -> bool {
    prefixes.iter().any(|p| name.starts_with(p.as_ref()))
}

/// `<exe> generate --variant <kind> <args...>`, inheriting the environment
/// minus the scrubbed variables.
pub fn build_command<P: AsRef<str>>(
    exe: &Path,
    kind: VariantKind,
    args: &[String],
    prefixes: &[P],
) -> Command {
    let mut cmd = Command::new(exe);
    cmd.arg("generate").arg("--variant").arg(kind.as_str()).args(args);
    for (name, _) in std::env::vars_os() {
        if name.to_str().is_some_and(|n| is_scrubbed(n, prefixes)) {
            cmd.env_remove(&name);
        }
    }
    cmd
}

/// Starts the generator as an independent process and returns its pid
/// without waiting for it.
pub fn launch<P: AsRef<str>>(kind: VariantKind, args: &[String], prefixes: &[P]) -> Result<u32, LaunchError> {
    let exe = std::env::current_exe().map_err(LaunchError::CurrentExe)?;
    let child = build_command(&exe, kind, args, prefixes)
        .stdin(Stdio::null())
        .spawn()
        .map_err(LaunchError::Spawn)?;
    tracing::info!(variant = %kind, pid = child.id(), "Generator launched");
    Ok(child.id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrub_matches_bundler_prefixes() {
        for name in ["APPDIR", "APPIMAGE_EXTRACT", "LD_PRELOAD", "_MEIPASS2", "OWD", "ARGV0"] {
            assert!(is_scrubbed(name, DEFAULT_SCRUBBED_PREFIXES), "{name}");
        }
        for name in ["PATH", "LD_LIBRARY_PATH", "HOME", "MEI"] {
            assert!(!is_scrubbed(name, DEFAULT_SCRUBBED_PREFIXES), "{name}");
        }
        assert!(is_scrubbed("PYTHONHOME", &["PYTHON".to_string()]));
    }

    #[test]
    fn build_command_targets_generate() {
        let cmd = build_command(
            Path::new("/usr/bin/releve"),
            VariantKind::Agents,
            &["--input".to_string(), "x.xlsx".to_string()],
            DEFAULT_SCRUBBED_PREFIXES,
        );
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, vec!["generate", "--variant", "agents", "--input", "x.xlsx"]);
        assert!(cmd
            .get_envs()
            .filter(|(k, _)| k.to_string_lossy().starts_with("APPIMAGE"))
            .all(|(_, v)| v.is_none()));
    }

    #[test]
    fn cards_cover_every_variant() {
        let kinds: Vec<VariantKind> = CARDS.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, VariantKind::ALL.to_vec());
        assert_eq!(CARDS[2].required_column(), "CODE_AGENT");
    }
}
