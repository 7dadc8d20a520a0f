//! Saved API endpoints: a JSON map of profile name -> { url, tls_ca, page_size }.
//! Stored at $XDG_CONFIG_HOME/qsdash/profiles.json (fallback: the platform config dir).

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, io, path::PathBuf};

/// Name that always means "spawn the local demo API".
pub const DEMO_PROFILE: &str = "demo";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProfileEntry {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_ca: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfilesFile {
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileEntry>,
    #[serde(default)]
    pub version: u32,
}

pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("qsdash")
    } else {
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("qsdash")
    }
}

pub fn profiles_path() -> PathBuf {
    config_dir().join("profiles.json")
}

/// Missing or unreadable files load as empty; a corrupt file is logged and ignored.
pub fn load_profiles() -> ProfilesFile {
    let path = profiles_path();
    match fs::read_to_string(&path) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
            tracing::warn!("ignoring {}: {}", path.display(), e);
            ProfilesFile::default()
        }),
        Err(_) => ProfilesFile::default(),
    }
}

pub fn save_profiles(p: &ProfilesFile) -> io::Result<()> {
    let path = profiles_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_vec_pretty(p).map_err(io::Error::other)?;
    fs::write(&path, data)?;
    tracing::info!("saved profiles to {}", path.display());
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveProfile {
    /// URL given on the command line (not yet persisted).
    Direct(ProfileEntry),
    /// Loaded from an existing profile.
    Loaded(ProfileEntry),
    /// Ask the user to pick one of these names.
    PromptSelect(Vec<String>),
    /// Ask the user for the URL of a new profile with this name.
    PromptCreate(String),
    /// Nothing to connect to.
    None,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileRequest {
    pub profile_name: Option<String>,
    pub url: Option<String>,
    pub tls_ca: Option<String>,
    pub page_size: Option<u32>,
}

impl ProfileRequest {
    pub fn resolve(self, pf: &ProfilesFile) -> ResolveProfile {
        match (self.url, self.profile_name) {
            (Some(url), _) => ResolveProfile::Direct(ProfileEntry {
                url,
                tls_ca: self.tls_ca,
                page_size: self.page_size,
            }),
            (None, Some(name)) => match pf.profiles.get(&name) {
                Some(entry) => {
                    let mut entry = entry.clone();
                    // command-line values win over the stored ones
                    if self.tls_ca.is_some() {
                        entry.tls_ca = self.tls_ca;
                    }
                    if self.page_size.is_some() {
                        entry.page_size = self.page_size;
                    }
                    ResolveProfile::Loaded(entry)
                }
                None => ResolveProfile::PromptCreate(name),
            },
            (None, None) if pf.profiles.is_empty() => ResolveProfile::None,
            (None, None) => ResolveProfile::PromptSelect(pf.profiles.keys().cloned().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_with(name: &str, url: &str) -> ProfilesFile {
        let mut pf = ProfilesFile::default();
        pf.profiles.insert(
            name.into(),
            ProfileEntry {
                url: url.into(),
                tls_ca: Some("/etc/qs/ca.pem".into()),
                page_size: None,
            },
        );
        pf
    }

    #[test]
    fn url_wins_over_profile() {
        let pf = file_with("prod", "https://qs.example:8443");
        let r = ProfileRequest {
            profile_name: Some("prod".into()),
            url: Some("http://localhost:8000".into()),
            ..Default::default()
        }
        .resolve(&pf);
        assert!(matches!(r, ResolveProfile::Direct(e) if e.url == "http://localhost:8000"));
    }

    #[test]
    fn named_profile_loads_with_overrides() {
        let pf = file_with("prod", "https://qs.example:8443");
        let r = ProfileRequest {
            profile_name: Some("prod".into()),
            page_size: Some(25),
            ..Default::default()
        }
        .resolve(&pf);
        let ResolveProfile::Loaded(e) = r else {
            panic!("expected Loaded, got {r:?}");
        };
        assert_eq!(e.url, "https://qs.example:8443");
        assert_eq!(e.tls_ca.as_deref(), Some("/etc/qs/ca.pem"));
        assert_eq!(e.page_size, Some(25));
    }

    #[test]
    fn unknown_name_prompts_create_and_empty_is_none() {
        let pf = ProfilesFile::default();
        let r = ProfileRequest {
            profile_name: Some("lab".into()),
            ..Default::default()
        }
        .resolve(&pf);
        assert_eq!(r, ResolveProfile::PromptCreate("lab".into()));
        assert_eq!(ProfileRequest::default().resolve(&pf), ResolveProfile::None);
    }

    #[test]
    fn no_args_with_profiles_prompts_select() {
        let pf = file_with("prod", "https://qs.example:8443");
        assert_eq!(
            ProfileRequest::default().resolve(&pf),
            ResolveProfile::PromptSelect(vec!["prod".into()])
        );
    }
}
