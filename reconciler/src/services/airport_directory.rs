//! In-memory airport alias and timezone directory
//!
//! Built from a list of entries (typically deserialized from a bundled JSON
//! dataset by the caller). Unknown codes pass through cleaned: trimmed,
//! uppercased and stripped of anything that is not alphanumeric.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ReconcilerResult;
use crate::traits::{AirportResolver, TimeZoneResolver};

/// One airport record: canonical code, alternative codes, IANA zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirportEntry {
    pub code: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
}

impl AirportEntry {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            aliases: Vec::new(),
            time_zone: None,
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn with_time_zone(mut self, zone: impl Into<String>) -> Self {
        self.time_zone = Some(zone.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct AirportDirectory {
    /// cleaned alias or code -> canonical code
    canonical: HashMap<String, String>,
    /// canonical code -> IANA zone
    time_zones: HashMap<String, String>,
}

fn clean_code(code: &str) -> String {
    code.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_uppercase()
}

impl AirportDirectory {
    pub fn new(entries: impl IntoIterator<Item = AirportEntry>) -> Self {
        let mut directory = Self::default();
        for entry in entries {
            directory.insert(entry);
        }
        directory
    }

    /// Parse a JSON array of [`AirportEntry`]
    pub fn from_json(json: &str) -> ReconcilerResult<Self> {
        let entries: Vec<AirportEntry> = serde_json::from_str(json)?;
        Ok(Self::new(entries))
    }

    /// Add or replace an entry; later aliases override earlier ones
    pub fn insert(&mut self, entry: AirportEntry) {
        let code = clean_code(&entry.code);
        if code.is_empty() {
            return;
        }
        for alias in &entry.aliases {
            let alias = clean_code(alias);
            if !alias.is_empty() {
                self.canonical.insert(alias, code.clone());
            }
        }
        self.canonical.insert(code.clone(), code.clone());
        if let Some(zone) = entry.time_zone {
            self.time_zones.insert(code, zone);
        }
    }

    pub fn len(&self) -> usize {
        self.canonical.values().collect::<std::collections::HashSet<_>>().len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}

impl AirportResolver for AirportDirectory {
    fn normalize(&self, code: &str) -> String {
        let cleaned = clean_code(code);
        match self.canonical.get(&cleaned) {
            Some(canonical) => canonical.clone(),
            None => cleaned,
        }
    }
}

impl TimeZoneResolver for AirportDirectory {
    fn time_zone(&self, code: &str) -> Option<String> {
        self.time_zones.get(&self.normalize(code)).cloned()
    }
}
