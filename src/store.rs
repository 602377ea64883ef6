use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// On-disk shape of the preference data. The whole object is rewritten on
/// every mutation, last writer wins.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedData {
    #[serde(default)]
    user_data: HashMap<u64, String>,
    #[serde(default)]
    channel_data: HashMap<i64, Vec<String>>,
}

/// Per-user timezone preferences and per-channel timezone rosters.
///
/// Every timezone string in here was produced by the resolver at write time;
/// the store never holds free-form user input. Rosters are ordered and
/// duplicate-tolerant, and a channel key stays around even once its roster
/// has been emptied.
#[derive(Debug)]
pub struct PreferenceStore {
    data: PersistedData,
    path: PathBuf,
}

impl PreferenceStore {
    /// Loads preferences from `path`, creating an empty file when none
    /// exists yet. A present-but-unreadable file is fatal; starting with
    /// silently dropped preferences is worse than not starting.
    pub fn load(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        if !path.exists() {
            let store = Self {
                data: PersistedData::default(),
                path,
            };
            store.flush()?;
            return Ok(store);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("reading preference data from {}", path.display()))?;
        let data: PersistedData = serde_json::from_str(&contents)
            .with_context(|| format!("parsing preference data in {}", path.display()))?;

        log::info!(
            "Loaded {} user preferences and {} channel rosters from {}",
            data.user_data.len(),
            data.channel_data.len(),
            path.display()
        );

        Ok(Self { data, path })
    }

    /// Writes the full store (both maps) back to disk.
    pub fn flush(&self) -> anyhow::Result<()> {
        let contents = serde_json::to_string(&self.data)?;
        fs::write(&self.path, contents)
            .with_context(|| format!("writing preference data to {}", self.path.display()))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn user_timezone(&self, user_id: u64) -> Option<&str> {
        self.data.user_data.get(&user_id).map(String::as_str)
    }

    pub fn set_user_timezone(&mut self, user_id: u64, timezone: String) {
        self.data.user_data.insert(user_id, timezone);
    }

    /// Returns whether a preference was actually removed.
    pub fn remove_user_timezone(&mut self, user_id: u64) -> bool {
        self.data.user_data.remove(&user_id).is_some()
    }

    pub fn channel_roster(&self, chat_id: i64) -> Option<&[String]> {
        self.data.channel_data.get(&chat_id).map(Vec::as_slice)
    }

    /// Appends to the channel roster, creating it on first use. Duplicates
    /// are kept as-is; the roster is a plain ordered list.
    pub fn add_channel_timezone(&mut self, chat_id: i64, timezone: String) {
        self.data
            .channel_data
            .entry(chat_id)
            .or_default()
            .push(timezone);
    }

    /// Removes every roster entry equal to `timezone` and returns how many
    /// were dropped. The channel key itself survives an emptied roster.
    pub fn remove_channel_timezone(&mut self, chat_id: i64, timezone: &str) -> usize {
        match self.data.channel_data.get_mut(&chat_id) {
            Some(roster) => {
                let before = roster.len();
                roster.retain(|entry| entry != timezone);
                before - roster.len()
            }
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> PreferenceStore {
        let path = std::env::temp_dir().join(format!("tzcast-store-{name}-{}.json", std::process::id()));
        let _ = fs::remove_file(&path);
        PreferenceStore::load(path).unwrap()
    }

    #[test]
    fn missing_file_starts_empty_and_creates_it() {
        let store = temp_store("fresh");
        assert!(store.path().exists());
        assert_eq!(store.user_timezone(1), None);
        assert_eq!(store.channel_roster(1), None);
    }

    #[test]
    fn flush_and_reload_round_trips_both_maps() {
        let mut store = temp_store("roundtrip");
        store.set_user_timezone(42, "Asia/Tokyo".to_string());
        store.add_channel_timezone(-100, "Europe/London".to_string());
        store.add_channel_timezone(-100, "Europe/London".to_string());
        store.flush().unwrap();

        let reloaded = PreferenceStore::load(store.path().to_path_buf()).unwrap();
        assert_eq!(reloaded.user_timezone(42), Some("Asia/Tokyo"));
        assert_eq!(
            reloaded.channel_roster(-100),
            Some(&["Europe/London".to_string(), "Europe/London".to_string()][..])
        );
    }

    #[test]
    fn corrupt_file_is_fatal() {
        let path = std::env::temp_dir().join(format!("tzcast-store-corrupt-{}.json", std::process::id()));
        fs::write(&path, "not json at all").unwrap();
        assert!(PreferenceStore::load(path).is_err());
    }

    #[test]
    fn duplicates_accumulate_and_removal_drops_all_of_them() {
        let mut store = temp_store("dupes");
        store.add_channel_timezone(7, "America/New_York".to_string());
        store.add_channel_timezone(7, "Europe/London".to_string());
        store.add_channel_timezone(7, "America/New_York".to_string());
        assert_eq!(store.channel_roster(7).unwrap().len(), 3);

        let removed = store.remove_channel_timezone(7, "America/New_York");
        assert_eq!(removed, 2);
        assert_eq!(
            store.channel_roster(7),
            Some(&["Europe/London".to_string()][..])
        );
    }

    #[test]
    fn emptied_roster_keeps_the_channel_key() {
        let mut store = temp_store("empty-roster");
        store.add_channel_timezone(9, "UTC".to_string());
        store.remove_channel_timezone(9, "UTC");
        assert_eq!(store.channel_roster(9), Some(&[][..]));
    }

    #[test]
    fn removing_an_absent_user_preference_reports_absence() {
        let mut store = temp_store("absent-user");
        assert!(!store.remove_user_timezone(5));
        store.set_user_timezone(5, "UTC".to_string());
        assert!(store.remove_user_timezone(5));
    }
}
