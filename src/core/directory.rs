//! Client-side cache of the server's character directory.
//!
//! The cache holds whatever the last full fetch returned, nothing more. The
//! refresh policy is an unconditional full reload: any successful mutation
//! (create, update, delete) is followed by a complete re-fetch that
//! replaces the cache wholesale rather than patching one entry. A failed
//! fetch leaves the previous contents in place; the cache is correct only
//! as of its last successful fetch.

use std::collections::HashMap;

use tracing::debug;

use crate::core::character::CharacterProfile;

pub struct DirectoryCache {
    profiles: Vec<CharacterProfile>,
    by_id: HashMap<String, usize>,
}

impl DirectoryCache {
    pub fn new() -> Self {
        Self {
            profiles: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Replace the cache contents with a freshly fetched list. Profiles are
    /// sorted by display name; records without an id are ignored (they
    /// cannot be addressed).
    pub fn replace(&mut self, mut profiles: Vec<CharacterProfile>) {
        profiles.retain(|p| p.id.is_some());
        profiles.sort_by(|a, b| a.name.cmp(&b.name));

        self.by_id.clear();
        for (idx, profile) in profiles.iter().enumerate() {
            if let Some(id) = &profile.id {
                self.by_id.insert(id.clone(), idx);
            }
        }
        debug!(count = profiles.len(), "directory cache refreshed");
        self.profiles = profiles;
    }

    /// Cached list in name order.
    pub fn profiles(&self) -> &[CharacterProfile] {
        &self.profiles
    }

    pub fn get(&self, id: &str) -> Option<&CharacterProfile> {
        self.by_id.get(id).map(|&idx| &self.profiles[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Display name for an id, if cached.
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.get(id).map(|p| p.name.as_str())
    }
}

impl Default for DirectoryCache {
    fn default() -> Self {
        Self::new()
    }
}
