use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("medidoctor"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            upload_dir: data_dir.join("uploads"),
            data_dir,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "https://*.vercel.app".to_string(),
            ],
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

/// On-disk form. A file that only moves `data_dir` moves uploads with it.
#[derive(Deserialize)]
struct SettingsFile {
    upload_dir: Option<PathBuf>,
    #[serde(flatten)]
    settings: Settings,
}

impl Settings {
    /// Defaults, then the JSON settings file, then env vars (env vars take priority)
    pub fn load() -> Result<Self> {
        let file = std::env::var("MEDIDOCTOR_CONFIG")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                let candidate = default_data_dir().join("settings.json");
                candidate.exists().then_some(candidate)
            });

        let mut settings = match file {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        let file: SettingsFile = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse settings in {:?}", path))?;

        let mut settings = file.settings;
        settings.upload_dir = file
            .upload_dir
            .unwrap_or_else(|| settings.data_dir.join("uploads"));
        Ok(settings)
    }

    /// Apply `MEDIDOCTOR_*` overrides from the given lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("MEDIDOCTOR_HOST") {
            self.host = host;
        }
        if let Some(port) = get("MEDIDOCTOR_PORT") {
            match port.trim().parse() {
                Ok(p) => self.port = p,
                Err(e) => log::warn!("Ignoring MEDIDOCTOR_PORT={:?}: {}", port, e),
            }
        }
        if let Some(dir) = get("MEDIDOCTOR_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
            if get("MEDIDOCTOR_UPLOAD_DIR").is_none() {
                self.upload_dir = self.data_dir.join("uploads");
            }
        }
        if let Some(dir) = get("MEDIDOCTOR_UPLOAD_DIR") {
            self.upload_dir = PathBuf::from(dir);
        }
        if let Some(origins) = get("MEDIDOCTOR_ALLOWED_ORIGINS") {
            self.allowed_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(limit) = get("MEDIDOCTOR_MAX_UPLOAD_BYTES") {
            match limit.trim().parse() {
                Ok(n) => self.max_upload_bytes = n,
                Err(e) => log::warn!("Ignoring MEDIDOCTOR_MAX_UPLOAD_BYTES={:?}: {}", limit, e),
            }
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("medidoctor.db")
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Exact match, or `scheme://*.suffix` wildcard match
    pub fn origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|pattern| origin_matches(pattern, origin))
    }
}

fn origin_matches(pattern: &str, origin: &str) -> bool {
    match pattern.split_once("://*.") {
        Some((scheme, suffix)) => origin
            .strip_prefix(scheme)
            .and_then(|rest| rest.strip_prefix("://"))
            .map_or(false, |host| host.ends_with(&format!(".{}", suffix))),
        None => pattern == origin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn env_overrides_win() {
        let mut settings = Settings::default();
        settings.apply_env(env(&[
            ("MEDIDOCTOR_PORT", "9100"),
            ("MEDIDOCTOR_DATA_DIR", "/tmp/md"),
            ("MEDIDOCTOR_ALLOWED_ORIGINS", "http://a.test, http://b.test"),
        ]));
        assert_eq!(settings.port, 9100);
        assert_eq!(settings.data_dir, PathBuf::from("/tmp/md"));
        assert_eq!(settings.upload_dir, PathBuf::from("/tmp/md/uploads"));
        assert_eq!(settings.db_path(), PathBuf::from("/tmp/md/medidoctor.db"));
        assert_eq!(settings.allowed_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn bad_numbers_are_ignored() {
        let mut settings = Settings::default();
        settings.apply_env(env(&[("MEDIDOCTOR_PORT", "eighty"), ("MEDIDOCTOR_MAX_UPLOAD_BYTES", "-1")]));
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn file_fills_missing_fields_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "port": 8080, "data_dir": "/srv/md" }"#).unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.upload_dir, PathBuf::from("/srv/md/uploads"));
    }

    #[test]
    fn upload_dir_only_comes_from_its_own_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        std::fs::write(&path, r#"{ "data_dir": "/srv/md", "host": "upload_dir" }"#).unwrap();
        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.upload_dir, PathBuf::from("/srv/md/uploads"));

        std::fs::write(&path, r#"{ "data_dir": "/srv/md", "upload_dir": "/mnt/scans" }"#).unwrap();
        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.upload_dir, PathBuf::from("/mnt/scans"));
        assert_eq!(settings.data_dir, PathBuf::from("/srv/md"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ port: ").unwrap();
        assert!(Settings::from_file(&path).is_err());
    }

    #[test]
    fn wildcard_origins() {
        let settings = Settings::default();
        assert!(settings.origin_allowed("http://localhost:3000"));
        assert!(settings.origin_allowed("https://medidoctor-demo.vercel.app"));
        assert!(!settings.origin_allowed("http://medidoctor-demo.vercel.app"));
        assert!(!settings.origin_allowed("https://vercel.app.evil.test"));
        assert!(!settings.origin_allowed("http://localhost:3001"));
    }
}
