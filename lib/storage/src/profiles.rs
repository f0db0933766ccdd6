// Profile and last-session persistence as JSON files
use atomicwrites::{AtomicFile, OverwriteBehavior};
use chrono::{DateTime, Utc};
use formfill_core::{Error, MappingTable, Result, UserDataRecord};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const PROFILES_FILE: &str = "profiles.json";
const SESSION_FILE: &str = "session.json";

/// A named, saved user data record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub data: UserDataRecord,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl Profile {
    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

/// User data and mappings from the most recent session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub user_data: UserDataRecord,
    #[serde(default)]
    pub mappings: MappingTable,
}

/// Profiles and session state stored under one directory
pub struct ProfileStore {
    dir: PathBuf,
    // serializes read-modify-write cycles on the profiles file
    write_lock: Mutex<()>,
}

impl ProfileStore {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// All profiles in save order
    pub fn list(&self) -> Result<Vec<Profile>> {
        Ok(read_json(&self.dir.join(PROFILES_FILE))?.unwrap_or_default())
    }

    /// Append a profile. Names need not be unique.
    pub fn save(&self, name: &str, data: UserDataRecord) -> Result<Profile> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidConfig("profile name must not be empty".to_string()));
        }

        let _guard = self.write_lock.lock();
        let mut profiles = self.list()?;
        let profile = Profile {
            name: name.to_string(),
            data,
            timestamp: Utc::now().timestamp_millis(),
        };
        profiles.push(profile.clone());
        write_json(&self.dir.join(PROFILES_FILE), &profiles)?;

        tracing::info!(name = %profile.name, total = profiles.len(), "profile saved");
        Ok(profile)
    }

    pub fn get(&self, index: usize) -> Result<Profile> {
        self.list()?
            .into_iter()
            .nth(index)
            .ok_or(Error::ProfileNotFound(index))
    }

    /// Remove a profile; later profiles shift down by one
    pub fn delete(&self, index: usize) -> Result<Profile> {
        let _guard = self.write_lock.lock();
        let mut profiles = self.list()?;
        if index >= profiles.len() {
            return Err(Error::ProfileNotFound(index));
        }
        let removed = profiles.remove(index);
        write_json(&self.dir.join(PROFILES_FILE), &profiles)?;

        tracing::info!(name = %removed.name, "profile deleted");
        Ok(removed)
    }

    pub fn save_session(&self, state: &SessionState) -> Result<()> {
        write_json(&self.dir.join(SESSION_FILE), state)
    }

    /// The last saved session, if any
    pub fn load_session(&self) -> Result<Option<SessionState>> {
        read_json(&self.dir.join(SESSION_FILE))
    }

    pub fn clear_session(&self) -> Result<()> {
        match fs::remove_file(self.dir.join(SESSION_FILE)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_vec_pretty(value)?;
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| f.write_all(&data))
        .map_err(|e| Error::Storage(format!("failed to write {}: {}", path.display(), e)))
}
