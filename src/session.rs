// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

//! Local key-value records that make up a signed-in session

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

pub const WALLET_ADDRESS_KEY: &str = "userWalletAddress";
pub const ACCESS_TOKEN_KEY: &str = "privyAccessToken";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Write several records as one unit: on failure none of them are kept
    fn set_many(&mut self, records: &[(&str, &str)]) -> Result<()> {
        let mut written: Vec<(&str, Option<String>)> = Vec::with_capacity(records.len());
        for &(key, value) in records {
            let previous = self.get(key);
            if let Err(e) = self.set(key, value) {
                for (key, previous) in written.into_iter().rev() {
                    let restored = match previous {
                        Some(value) => self.set(key, &value),
                        None => self.remove(key),
                    };
                    if let Err(rollback) = restored {
                        warn!(key, error = %rollback, "failed to roll back record");
                    }
                }
                return Err(e);
            }
            written.push((key, previous));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    records: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.records.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.records.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.records.remove(key);
        Ok(())
    }
}

/// Records persisted as a flat TOML table; every write rewrites the file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    records: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(path: &Path) -> Result<Self> {
        let records = if path.exists() {
            let contents = fs::read_to_string(path)
                .map_err(|e| Error::Store(format!("failed to read {}: {}", path.display(), e)))?;
            toml::from_str(&contents)
                .map_err(|e| Error::Store(format!("corrupt store {}: {}", path.display(), e)))?
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), records = records.len(), "opened session store");

        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }

    /// In-memory records only change once the file write has succeeded
    fn commit(&mut self, records: BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| Error::Store(e.to_string()))?;
            }
        }
        let contents = toml::to_string(&records).map_err(|e| Error::Store(e.to_string()))?;
        fs::write(&self.path, contents)
            .map_err(|e| Error::Store(format!("failed to write {}: {}", self.path.display(), e)))?;
        self.records = records;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.records.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.set_many(&[(key, value)])
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if !self.records.contains_key(key) {
            return Ok(());
        }
        let mut records = self.records.clone();
        records.remove(key);
        self.commit(records)
    }

    fn set_many(&mut self, records: &[(&str, &str)]) -> Result<()> {
        let mut updated = self.records.clone();
        for (key, value) in records {
            updated.insert(key.to_string(), value.to_string());
        }
        self.commit(updated)
    }
}

fn is_present<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> bool {
    store.get(key).map_or(false, |value| !value.is_empty())
}

/// A session exists only when both the wallet address and the access token
/// are stored.
pub fn has_session<S: KeyValueStore + ?Sized>(store: &S) -> bool {
    is_present(store, WALLET_ADDRESS_KEY) && is_present(store, ACCESS_TOKEN_KEY)
}

/// True when either session record is stored, even if the pair is incomplete
pub fn has_any_record<S: KeyValueStore + ?Sized>(store: &S) -> bool {
    store.get(WALLET_ADDRESS_KEY).is_some() || store.get(ACCESS_TOKEN_KEY).is_some()
}

pub fn sign_in<S: KeyValueStore + ?Sized>(store: &mut S, wallet_address: &str, access_token: &str) -> Result<()> {
    if wallet_address.is_empty() || access_token.is_empty() {
        return Err(Error::InvalidArgument(
            "wallet address and access token must not be empty".to_string(),
        ));
    }
    store.set_many(&[(WALLET_ADDRESS_KEY, wallet_address), (ACCESS_TOKEN_KEY, access_token)])?;
    info!(wallet = wallet_address, "session stored");
    Ok(())
}

pub fn sign_out<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<()> {
    store.remove(WALLET_ADDRESS_KEY)?;
    store.remove(ACCESS_TOKEN_KEY)?;
    info!("session cleared");
    Ok(())
}
