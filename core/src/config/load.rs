use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Get the default mci data directory: ~/.mci
pub fn get_mci_data_dir() -> anyhow::Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".mci"))
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)?;
    let cfg = toml::from_str::<AppConfig>(&s)?;
    Ok(cfg)
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.mci/config.toml (highest)
    let mci_dir = get_mci_data_dir()?;
    let mci_config = mci_dir.join("config.toml");

    // Priority 2: ./config.toml (current directory)
    let local_config = Path::new("config.toml");

    let mut cfg = if mci_config.exists() {
        load_from_path(&mci_config)?
    } else if local_config.exists() {
        load_from_path(local_config)?
    } else {
        AppConfig::default()
    };

    if cfg
        .logging
        .directory
        .as_deref()
        .map(|s| s.trim().is_empty())
        .unwrap_or(true)
    {
        cfg.logging.directory = Some(mci_dir.join("logs").to_string_lossy().to_string());
    }

    apply_overrides(&mut cfg, |key| std::env::var(key).ok());
    Ok(cfg)
}

/// `MCI_SSH_PROGRAM` replaces the client binary unless blank;
/// `MCI_REDACT_REMOTE_COMMANDS` is on for "true" or "1" and off for anything else.
fn apply_overrides(cfg: &mut AppConfig, get: impl Fn(&str) -> Option<String>) {
    if let Some(v) = get("MCI_SSH_PROGRAM") {
        if !v.trim().is_empty() {
            cfg.remote.program = v;
        }
    }
    if let Some(v) = get("MCI_REDACT_REMOTE_COMMANDS") {
        cfg.remote.redact_command_log = v.eq_ignore_ascii_case("true") || v == "1";
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_from_path_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scheduler]\ndetect_cycles = false\n").unwrap();

        let cfg = load_from_path(&path).unwrap();
        assert!(!cfg.scheduler.detect_cycles);
    }

    #[test]
    fn load_from_path_rejects_bad_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[http_server]\nport = \"eighty\"\n").unwrap();

        assert!(load_from_path(&path).is_err());
    }

    fn overrides(pairs: &[(&str, &str)]) -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.remote.redact_command_log = true;
        apply_overrides(&mut cfg, |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        });
        cfg
    }

    #[test]
    fn ssh_program_override_ignores_blank_values() {
        let cfg = overrides(&[("MCI_SSH_PROGRAM", "/opt/bin/ssh")]);
        assert_eq!(cfg.remote.program, "/opt/bin/ssh");

        let cfg = overrides(&[("MCI_SSH_PROGRAM", "  ")]);
        assert_eq!(cfg.remote.program, "ssh");
    }

    #[test]
    fn redaction_override_accepts_true_and_one() {
        for value in ["true", "TRUE", "1"] {
            let mut cfg = AppConfig::default();
            apply_overrides(&mut cfg, |key| {
                (key == "MCI_REDACT_REMOTE_COMMANDS").then(|| value.to_string())
            });
            assert!(cfg.remote.redact_command_log, "{value}");
        }

        for value in ["false", "0", "yes", ""] {
            let cfg = overrides(&[("MCI_REDACT_REMOTE_COMMANDS", value)]);
            assert!(!cfg.remote.redact_command_log, "{value}");
        }
    }

    #[test]
    fn unset_variables_leave_config_alone() {
        let cfg = overrides(&[]);
        assert_eq!(cfg.remote.program, "ssh");
        assert!(cfg.remote.redact_command_log);
    }
}
