//! Persistent CLI profile configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sitesync_core::util::normalize_text_option;
use sitesync_core::ResolutionStrategy;

const CONFIG_FILE_NAME: &str = "cli-config.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliProfilesConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub active_profile: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, CliProfile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliProfile {
    /// Last successful sync per collection (Unix ms)
    #[serde(default)]
    pub last_sync: BTreeMap<String, i64>,
    /// Strategy replacing the suggested one, per collection
    #[serde(default)]
    pub strategy_overrides: BTreeMap<String, ResolutionStrategy>,
}

const fn default_config_version() -> u32 {
    1
}

pub fn default_config_path() -> Result<PathBuf, String> {
    dirs::config_dir()
        .map(|dir| dir.join("sitesync").join(CONFIG_FILE_NAME))
        .ok_or_else(|| "Failed to resolve CLI config directory".to_string())
}

/// Config path from `--config`, then `SITESYNC_CONFIG`, then the platform default
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf, String> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Some(path) = normalize_text_option(std::env::var("SITESYNC_CONFIG").ok()) {
        return Ok(PathBuf::from(path));
    }
    default_config_path()
}

pub fn normalize_profile_name(value: Option<&str>) -> Option<String> {
    normalize_text_option(value.map(str::to_string))
}

impl CliProfilesConfig {
    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self {
                version: default_config_version(),
                ..Self::default()
            });
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        let mut config = serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))?;
        config.normalize();
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
    }

    pub fn resolve_profile_name(&self, explicit: Option<&str>) -> String {
        if let Some(profile) = normalize_profile_name(explicit) {
            return profile;
        }
        if let Some(profile) =
            normalize_profile_name(std::env::var("SITESYNC_PROFILE").ok().as_deref())
        {
            return profile;
        }
        if let Some(profile) = normalize_profile_name(self.active_profile.as_deref()) {
            return profile;
        }
        "default".to_string()
    }

    pub fn profile(&self, name: &str) -> Option<&CliProfile> {
        self.profiles.get(name)
    }

    pub fn profile_mut_or_default(&mut self, name: &str) -> &mut CliProfile {
        self.profiles.entry(name.to_string()).or_default()
    }

    fn normalize(&mut self) {
        self.active_profile = normalize_profile_name(self.active_profile.as_deref());
        let profiles = std::mem::take(&mut self.profiles);
        for (name, mut profile) in profiles {
            let Some(name) = normalize_profile_name(Some(&name)) else {
                continue;
            };
            profile.normalize();
            self.profiles.insert(name, profile);
        }
    }
}

impl CliProfile {
    /// Stored last sync for `collection`, 0 when never synced
    pub fn last_sync_for(&self, collection: &str) -> i64 {
        self.last_sync.get(collection).copied().unwrap_or(0)
    }

    fn normalize(&mut self) {
        self.last_sync = normalize_keys(std::mem::take(&mut self.last_sync));
        self.strategy_overrides = normalize_keys(std::mem::take(&mut self.strategy_overrides));
    }
}

fn normalize_keys<V>(entries: BTreeMap<String, V>) -> BTreeMap<String, V> {
    entries
        .into_iter()
        .filter_map(|(key, value)| normalize_text_option(Some(key)).map(|key| (key, value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn normalize_profile_name_rejects_empty() {
        assert_eq!(normalize_profile_name(None), None);
        assert_eq!(normalize_profile_name(Some(" ")), None);
        assert_eq!(normalize_profile_name(Some(" site-a ")), Some("site-a".to_string()));
    }

    #[test]
    fn missing_config_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliProfilesConfig::load_from_path(&dir.path().join("none.json")).unwrap();
        assert_eq!(config.version, 1);
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn config_roundtrip_normalizes_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = CliProfilesConfig {
            version: 1,
            active_profile: Some(" site-a ".to_string()),
            profiles: BTreeMap::new(),
        };
        let profile = config.profile_mut_or_default(" site-a ");
        profile.last_sync.insert(" employees ".to_string(), 1_700);
        profile.last_sync.insert("  ".to_string(), 5);
        profile
            .strategy_overrides
            .insert("attendance".to_string(), ResolutionStrategy::Manual);

        config.save_to_path(&path).unwrap();
        let loaded = CliProfilesConfig::load_from_path(&path).unwrap();

        assert_eq!(loaded.active_profile.as_deref(), Some("site-a"));
        let profile = loaded.profile("site-a").unwrap();
        assert_eq!(
            profile.last_sync,
            BTreeMap::from([("employees".to_string(), 1_700)])
        );
        assert_eq!(profile.last_sync_for("employees"), 1_700);
        assert_eq!(profile.last_sync_for("clients"), 0);
        assert_eq!(
            profile.strategy_overrides.get("attendance"),
            Some(&ResolutionStrategy::Manual)
        );
    }

    #[test]
    fn invalid_strategy_in_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"{"profiles": {"default": {"strategy_overrides": {"clients": "newest"}}}}"#,
        )
        .unwrap();

        let error = CliProfilesConfig::load_from_path(&path).unwrap_err();
        assert!(error.contains("Failed to parse config"));
    }

    #[test]
    fn resolve_profile_name_prefers_explicit_then_active() {
        let config = CliProfilesConfig {
            version: 1,
            active_profile: Some("work".to_string()),
            profiles: BTreeMap::new(),
        };
        assert_eq!(config.resolve_profile_name(Some("mobile")), "mobile");
        if std::env::var_os("SITESYNC_PROFILE").is_none() {
            assert_eq!(config.resolve_profile_name(None), "work");
        }
    }

    #[test]
    fn explicit_config_path_wins() {
        let path = PathBuf::from("/tmp/sitesync-explicit.json");
        assert_eq!(resolve_config_path(Some(path.clone())).unwrap(), path);
    }
}
