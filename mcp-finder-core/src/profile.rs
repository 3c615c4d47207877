//! Login profiles for the join browser.
//!
//! A profile is a Chrome user-data-dir the operator logged into the platform
//! with (`finder-server setup-login`). Joins run in a page of that profile so
//! the platform accepts the join credential.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const PROFILES_DIR_ENV: &str = "FINDER_PROFILES_DIR";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginProfile {
    pub name: String,
    pub user_data_dir: PathBuf,
    /// Page the operator logged in at.
    pub login_url: String,
    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
    pub usage_count: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Index {
    profiles: BTreeMap<String, LoginProfile>,
}

/// Profiles stored under one directory, indexed by `profiles.json`.
///
/// Default location is the OS data dir (`~/.local/share/server-finder/profiles`
/// on Linux); `FINDER_PROFILES_DIR` overrides it.
pub struct ProfileStore {
    root: PathBuf,
}

impl ProfileStore {
    pub fn open() -> Result<Self> {
        Self::with_dir(default_root()?)
    }

    pub fn with_dir(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create profiles dir: {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn list(&self) -> Result<Vec<LoginProfile>> {
        Ok(self.load()?.profiles.into_values().collect())
    }

    pub fn get(&self, name: &str) -> Result<LoginProfile> {
        self.load()?
            .profiles
            .remove(name)
            .ok_or_else(|| anyhow::anyhow!("Profile '{}' not found", name))
    }

    /// Existing profile `name`, or a fresh one remembering `login_url`.
    pub fn get_or_create(&self, name: &str, login_url: &str) -> Result<LoginProfile> {
        validate_name(name)?;
        let mut index = self.load()?;
        if let Some(profile) = index.profiles.get(name) {
            return Ok(profile.clone());
        }

        let user_data_dir = self.root.join(name);
        std::fs::create_dir_all(&user_data_dir).with_context(|| {
            format!("Failed to create profile data dir: {}", user_data_dir.display())
        })?;

        let now = Utc::now();
        let profile = LoginProfile {
            name: name.to_string(),
            user_data_dir,
            login_url: login_url.to_string(),
            created_at: now,
            last_used: now,
            usage_count: 0,
        };
        index.profiles.insert(name.to_string(), profile.clone());
        self.save(&index)?;
        Ok(profile)
    }

    pub fn touch(&self, name: &str) -> Result<()> {
        let mut index = self.load()?;
        let profile = index
            .profiles
            .get_mut(name)
            .ok_or_else(|| anyhow::anyhow!("Profile '{}' not found", name))?;
        profile.last_used = Utc::now();
        profile.usage_count += 1;
        self.save(&index)
    }

    pub fn user_data_dir(&self, name: &str) -> Result<PathBuf> {
        Ok(self.get(name)?.user_data_dir)
    }

    fn index_path(&self) -> PathBuf {
        self.root.join("profiles.json")
    }

    fn load(&self) -> Result<Index> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(Index::default());
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn save(&self, index: &Index) -> Result<()> {
        let path = self.index_path();
        std::fs::write(&path, serde_json::to_string_pretty(index)?)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Names become directory names; keep them to one plain path component.
fn validate_name(name: &str) -> Result<()> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !ok {
        anyhow::bail!("Invalid profile name '{}': use letters, digits, '-' or '_'", name);
    }
    Ok(())
}

fn default_root() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(PROFILES_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }

    let dirs = directories::ProjectDirs::from("com", "server-finder", "server-finder")
        .context("Failed to determine data directory for this OS")?;
    Ok(dirs.data_dir().join("profiles"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (ProfileStore, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let store = ProfileStore::with_dir(tmp.path().to_path_buf()).unwrap();
        (store, tmp)
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let (store, tmp) = store();

        let first = store.get_or_create("main", "https://www.roblox.com/login").unwrap();
        assert_eq!(first.user_data_dir, tmp.path().join("main"));
        assert!(first.user_data_dir.exists());

        let second = store.get_or_create("main", "https://elsewhere").unwrap();
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.login_url, "https://www.roblox.com/login");
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_touch_counts_uses() {
        let (store, _tmp) = store();
        store.get_or_create("alt", "https://www.roblox.com/login").unwrap();

        store.touch("alt").unwrap();
        store.touch("alt").unwrap();

        assert_eq!(store.get("alt").unwrap().usage_count, 2);
    }

    #[test]
    fn test_missing_profile() {
        let (store, _tmp) = store();
        assert!(store.get("nope").is_err());
        assert!(store.touch("nope").is_err());
        assert!(store.user_data_dir("nope").is_err());
    }

    #[test]
    fn test_rejects_path_like_names() {
        let (store, _tmp) = store();
        assert!(store.get_or_create("../escape", "u").is_err());
        assert!(store.get_or_create("", "u").is_err());
    }
}
