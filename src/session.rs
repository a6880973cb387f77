use std::sync::Arc;

use tracing::{debug, error};

use crate::models::{LoginData, Profile, ProfileUpdate};
use crate::store::{KeyValueStore, StoreError};

pub const SESSION_KEY: &str = "vibesocial_user";
pub const AUTH_FLAG_KEY: &str = "vibesocial_auth";
pub const DIRECTORY_KEY: &str = "vibesocial_users";
pub const SEARCH_KEY: &str = "vibesocial_search_filter";

pub const DEFAULT_DISPLAY_NAME: &str = "Vibe User";

pub fn placeholder_avatar(seed: &str) -> String {
    format!("https://picsum.photos/seed/{seed}/200")
}

/// The logged-in user, mirrored into a shared key/value store.
///
/// Several `SessionStore`s over one store behave like browser tabs: whoever
/// writes last wins, and the others catch up through [`handle_storage_event`].
///
/// [`handle_storage_event`]: SessionStore::handle_storage_event
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    current: Option<Profile>,
}

impl SessionStore {
    /// Read the session blob. A blob that does not parse or has no id is no session.
    pub fn hydrate(store: Arc<dyn KeyValueStore>) -> Self {
        let current = store.get(SESSION_KEY).and_then(|raw| parse_session(&raw));
        Self { store, current }
    }

    pub fn current(&self) -> Option<&Profile> { self.current.as_ref() }

    pub fn is_authenticated(&self) -> bool { self.current.is_some() }

    pub fn login(&mut self, data: LoginData) -> Result<Profile, StoreError> {
        let avatar = data
            .avatar
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| placeholder_avatar(&data.id));
        let name = data
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());
        let profile = Profile {
            id: data.id,
            name,
            avatar,
            email: data.email,
            following: data.following.unwrap_or_default(),
            ..Profile::default()
        };
        self.store.set(AUTH_FLAG_KEY, "true")?;
        self.store.set(SESSION_KEY, &serde_json::to_string(&profile)?)?;
        self.current = Some(profile.clone());
        Ok(profile)
    }

    pub fn logout(&mut self) -> Result<(), StoreError> {
        self.current = None;
        self.store.remove(AUTH_FLAG_KEY)?;
        self.store.remove(SESSION_KEY)?;
        Ok(())
    }

    /// Replace the session blob and the same-id entry of the directory.
    /// Users missing from the directory are not added.
    pub fn update_user(&mut self, profile: Profile) -> Result<(), StoreError> {
        self.store.set(SESSION_KEY, &serde_json::to_string(&profile)?)?;
        let mut users = self.directory();
        let mut touched = false;
        for u in users.iter_mut().filter(|u| u.id == profile.id) {
            *u = profile.clone();
            touched = true;
        }
        if touched {
            self.store.set(DIRECTORY_KEY, &serde_json::to_string(&users)?)?;
        }
        self.current = Some(profile);
        Ok(())
    }

    /// Merge edited fields into the current profile. No-op without a session.
    pub fn update_profile(&mut self, upd: ProfileUpdate) -> Result<Option<Profile>, StoreError> {
        let Some(mut p) = self.current.clone() else { return Ok(None) };
        if let Some(v) = upd.name { p.name = v; }
        if let Some(v) = upd.bio { p.bio = v; }
        if let Some(v) = upd.avatar { p.avatar = v; }
        if upd.location.is_some() { p.location = upd.location; }
        if upd.website.is_some() { p.website = upd.website; }
        if upd.work.is_some() { p.work = upd.work; }
        if upd.education.is_some() { p.education = upd.education; }
        if upd.cover_photo.is_some() { p.cover_photo = upd.cover_photo; }
        self.update_user(p.clone())?;
        Ok(Some(p))
    }

    /// Follow `target_id`, or unfollow if already following. No-op without a session.
    pub fn toggle_follow(&mut self, target_id: &str) -> Result<(), StoreError> {
        let Some(mut p) = self.current.clone() else { return Ok(()) };
        if p.is_following(target_id) {
            p.following.retain(|id| id != target_id);
        } else {
            p.following.push(target_id.to_string());
        }
        self.update_user(p)
    }

    /// React to a write made elsewhere. Only the session key matters.
    pub fn handle_storage_event(&mut self, key: &str, new_value: Option<&str>) {
        if key != SESSION_KEY {
            return;
        }
        debug!(present = new_value.is_some(), "session changed in another context");
        self.current = new_value.and_then(parse_session);
    }

    pub fn directory(&self) -> Vec<Profile> {
        let Some(raw) = self.store.get(DIRECTORY_KEY) else { return Vec::new() };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            error!("failed to parse user directory: {e}");
            Vec::new()
        })
    }

    /// Add or replace a directory entry (registration).
    pub fn register_in_directory(&self, profile: &Profile) -> Result<(), StoreError> {
        let mut users = self.directory();
        users.retain(|u| u.id != profile.id);
        users.push(profile.clone());
        self.store.set(DIRECTORY_KEY, &serde_json::to_string(&users)?)
    }

    /// Directory users whose `following` contains `user_id`.
    pub fn followers_of(&self, user_id: &str) -> Vec<Profile> {
        self.directory().into_iter().filter(|u| u.is_following(user_id)).collect()
    }

    /// Directory users that `profile` follows.
    pub fn following_of(&self, profile: &Profile) -> Vec<Profile> {
        self.directory().into_iter().filter(|u| profile.is_following(&u.id)).collect()
    }

    pub fn save_search(&self, query: &str) -> Result<(), StoreError> {
        self.store.set(SEARCH_KEY, query)
    }

    pub fn last_search(&self) -> String {
        self.store.get(SEARCH_KEY).unwrap_or_default()
    }
}

fn parse_session(raw: &str) -> Option<Profile> {
    match serde_json::from_str::<Profile>(raw) {
        Ok(p) if !p.id.is_empty() => Some(p),
        Ok(_) => None,
        Err(e) => {
            error!("failed to parse session: {e}");
            None
        }
    }
}
