#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context as _;
use sha2::{Digest as _, Sha256};

use crate::error::TaskListError;
use crate::task::model::Task;

/// String key-value persistence, one value per list instance.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&self, key: &str) -> anyhow::Result<()>;
    fn keys(&self) -> anyhow::Result<Vec<String>>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        (**self).remove(key)
    }

    fn keys(&self) -> anyhow::Result<Vec<String>> {
        (**self).keys()
    }
}

/// Serializes the collection in order as a JSON array.
pub fn encode_tasks(tasks: &[Task]) -> anyhow::Result<String> {
    let mut s = serde_json::to_string_pretty(tasks)?;
    s.push('\n');
    Ok(s)
}

/// Parses a stored collection. Anything other than an array of task records is `None`.
#[must_use]
pub fn decode_tasks(raw: &str) -> Option<Vec<Task>> {
    let serde_json::Value::Array(mut records) = serde_json::from_str::<serde_json::Value>(raw).ok()? else {
        return None;
    };
    for record in &mut records {
        // A record may carry both spellings of a field; the canonical one wins.
        if let serde_json::Value::Object(fields) = record {
            for (canonical, legacy) in [("title", "text"), ("description", "desc")] {
                if fields.contains_key(canonical) {
                    fields.remove(legacy);
                }
            }
        }
    }
    serde_json::from_value(serde_json::Value::Array(records)).ok()
}

/// One `<key>.json` file per key. The original key is kept inside a small envelope so
/// `keys()` can report it even when the file name had to be sanitized.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct Envelope {
    key: String,
    value: String,
}

impl FileStore {
    #[must_use]
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create store dir {}", self.dir.display()))
    }

    pub fn path_for(&self, key: &str) -> anyhow::Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", file_stem_for_key(key))))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let envelope: Envelope = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Some(envelope.value))
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.ensure_dir()?;
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        let envelope = Envelope {
            key: key.to_owned(),
            value: value.to_owned(),
        };
        let data = serde_json::to_vec_pretty(&envelope)?;
        std::fs::write(&tmp, &data)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e).with_context(|| {
                format!("failed to rename {} -> {}", tmp.display(), path.display())
            });
        }
        tracing::debug!(key, path = %path.display(), bytes = data.len(), "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(TaskListError::IoPath { path, source }.into()),
        }
    }

    fn keys(&self) -> anyhow::Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&self.dir).map_err(|source| TaskListError::IoPath {
            path: self.dir.clone(),
            source,
        })?;
        let mut keys = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let Ok(data) = std::fs::read_to_string(&path) else {
                continue;
            };
            let Ok(envelope) = serde_json::from_str::<Envelope>(&data) else {
                continue;
            };
            keys.push(envelope.key);
        }
        keys.sort();
        Ok(keys)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.lock()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}

fn validate_key(key: &str) -> Result<(), TaskListError> {
    if key.trim().is_empty() {
        return Err(TaskListError::InvalidStoreKey {
            key: key.to_owned(),
            msg: "must not be empty".to_owned(),
        });
    }
    if key.chars().any(char::is_control) {
        return Err(TaskListError::InvalidStoreKey {
            key: key.escape_debug().to_string(),
            msg: "must not contain control characters".to_owned(),
        });
    }
    Ok(())
}

fn file_stem_for_key(key: &str) -> String {
    let sanitized = sanitize_for_filesystem(key);
    if sanitized == key {
        return sanitized;
    }
    let base = if sanitized.is_empty() {
        "key".to_owned()
    } else {
        sanitized
    };
    format!("{base}-{}", short_hash(key))
}

fn sanitize_for_filesystem(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(
            c,
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ' '
        ) {
            out.push('_');
            continue;
        }
        out.push(c);
    }
    // Leading dots would hide the file or escape via "..".
    out.trim_start_matches('.').to_owned()
}

fn short_hash(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    let mut s = String::with_capacity(8);
    for b in &digest[..4] {
        let _ = write!(&mut s, "{b:02x}");
    }
    s
}
