use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use vault_manager_vault::VaultConfig;

use crate::cli::ConnectionArgs;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct ProfileConfig {
    pub address: Option<String>,
    pub namespace: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl ProfileConfig {
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "address" => self.address = Some(value.to_string()),
            "namespace" => self.namespace = Some(value.to_string()),
            "timeout_secs" => {
                let secs = value
                    .parse()
                    .with_context(|| format!("timeout_secs must be a whole number, got \"{value}\""))?;
                self.timeout_secs = Some(secs);
            }
            other => {
                anyhow::bail!("Unknown config key: {other}. Valid keys: address, namespace, timeout_secs")
            }
        }
        Ok(())
    }
}

pub type ConfigFile = BTreeMap<String, ProfileConfig>;

fn config_dir() -> Result<PathBuf> {
    let dir = dirs::home_dir()
        .context("Cannot determine home directory")?
        .join(".vault-manager");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn load_all_from(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::new());
    }
    let content = fs::read_to_string(path)?;
    let cfg: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    Ok(cfg)
}

pub fn load_profile_from(path: &Path, profile: &str) -> Result<ProfileConfig> {
    let mut all = load_all_from(path)?;
    Ok(all.remove(profile).unwrap_or_default())
}

pub fn load_profile(profile: &str) -> Result<ProfileConfig> {
    load_profile_from(&config_path()?, profile)
}

pub fn save_profile_to(path: &Path, profile: &str, config: &ProfileConfig) -> Result<()> {
    let mut all = load_all_from(path)?;
    all.insert(profile.to_string(), config.clone());
    let content = toml::to_string_pretty(&all)?;
    fs::write(path, content)?;
    Ok(())
}

pub fn save_profile(profile: &str, config: &ProfileConfig) -> Result<()> {
    save_profile_to(&config_path()?, profile, config)
}

/// Reads the token `vault login` leaves in `~/.vault-token`, if any.
pub fn load_token_file() -> Result<Option<String>> {
    let Some(home) = dirs::home_dir() else {
        return Ok(None);
    };
    read_token_file(&home.join(".vault-token"))
}

fn read_token_file(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let token = fs::read_to_string(path)
        .with_context(|| format!("Failed to read token file: {}", path.display()))?;
    let token = token.trim();
    Ok((!token.is_empty()).then(|| token.to_string()))
}

/// Resolves connection settings: flag or env var first, then profile config.
pub fn resolve_vault_config(
    args: &ConnectionArgs,
    profile: &ProfileConfig,
    stored_token: Option<String>,
) -> Result<VaultConfig> {
    let address = args
        .address
        .clone()
        .or_else(|| profile.address.clone())
        .context(
            "No Vault address configured. Use --address, set VAULT_ADDR env var, or run: vault-manager config set address <url>",
        )?;
    let token = args
        .token
        .clone()
        .or(stored_token)
        .context("No Vault token. Use --token, set VAULT_TOKEN env var, or run: vault login")?;
    let namespace = args.namespace.clone().or_else(|| profile.namespace.clone());
    let timeout = args
        .timeout_secs
        .or(profile.timeout_secs)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    Ok(VaultConfig::new(address, token)
        .with_namespace(namespace)
        .with_timeout(Duration::from_secs(timeout)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        assert_eq!(load_profile_from(&path, "default").unwrap(), ProfileConfig::default());

        let mut prod = ProfileConfig::default();
        prod.set("address", "https://vault.prod:8200").unwrap();
        prod.set("timeout_secs", "10").unwrap();
        save_profile_to(&path, "prod", &prod).unwrap();

        let mut stage = ProfileConfig::default();
        stage.set("namespace", "team-a").unwrap();
        save_profile_to(&path, "stage", &stage).unwrap();

        assert_eq!(load_profile_from(&path, "prod").unwrap(), prod);
        assert_eq!(load_profile_from(&path, "stage").unwrap(), stage);
        assert_eq!(load_all_from(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_set_rejects_unknown_key_and_bad_timeout() {
        let mut cfg = ProfileConfig::default();
        assert!(cfg.set("token", "s.abc").is_err());
        assert!(cfg.set("timeout_secs", "soon").is_err());
        assert_eq!(cfg, ProfileConfig::default());
    }

    #[test]
    fn test_flags_override_profile() {
        let args = ConnectionArgs {
            address: Some("https://flag:8200".into()),
            token: Some("s.flag".into()),
            namespace: None,
            timeout_secs: Some(5),
        };
        let profile = ProfileConfig {
            address: Some("https://profile:8200".into()),
            namespace: Some("team-a".into()),
            timeout_secs: Some(60),
        };

        let cfg = resolve_vault_config(&args, &profile, Some("s.file".into())).unwrap();
        assert_eq!(cfg.address, "https://flag:8200");
        assert_eq!(cfg.token, "s.flag");
        assert_eq!(cfg.namespace.as_deref(), Some("team-a"));
        assert_eq!(cfg.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_profile_and_token_file_fallbacks() {
        let profile = ProfileConfig {
            address: Some("https://profile:8200".into()),
            ..ProfileConfig::default()
        };

        let cfg =
            resolve_vault_config(&ConnectionArgs::default(), &profile, Some("s.file".into()))
                .unwrap();
        assert_eq!(cfg.address, "https://profile:8200");
        assert_eq!(cfg.token, "s.file");
        assert_eq!(cfg.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_missing_address_or_token_is_an_error() {
        let err = resolve_vault_config(&ConnectionArgs::default(), &ProfileConfig::default(), None)
            .unwrap_err();
        assert!(err.to_string().contains("No Vault address"));

        let profile = ProfileConfig {
            address: Some("https://profile:8200".into()),
            ..ProfileConfig::default()
        };
        let err = resolve_vault_config(&ConnectionArgs::default(), &profile, None).unwrap_err();
        assert!(err.to_string().contains("No Vault token"));
    }

    #[test]
    fn test_token_file_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".vault-token");
        assert_eq!(read_token_file(&path).unwrap(), None);

        fs::write(&path, "s.abc123\n").unwrap();
        assert_eq!(read_token_file(&path).unwrap().as_deref(), Some("s.abc123"));

        fs::write(&path, "  \n").unwrap();
        assert_eq!(read_token_file(&path).unwrap(), None);
    }
}
