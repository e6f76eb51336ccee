//! User profiles.
//!
//! Profiles live at `users/{uid}`. Passwords and session tokens are the
//! identity provider's business and never reach this crate; the fields
//! kept here are what the game needs back: a display identity and the
//! furthest level reached.

use std::sync::Arc;

use serde::{Serialize, Deserialize};
use serde_json::json;
use uuid::Uuid;

use crate::game::state::now_millis;
use crate::store::{DocumentStore, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: Uuid,
    pub email: String,
    pub display_name: String,
    pub created_at: u64,
    pub last_level: u32,
}

#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn DocumentStore>,
}

fn user_path(uid: Uuid) -> String {
    format!("users/{uid}")
}

impl ProfileService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create and persist a fresh profile starting at level 1.
    pub fn create_profile(
        &self,
        email: &str,
        display_name: &str,
    ) -> Result<UserProfile, StoreError> {
        let profile = UserProfile {
            uid: Uuid::new_v4(),
            email: email.to_string(),
            display_name: display_name.to_string(),
            created_at: now_millis(),
            last_level: 1,
        };
        let doc = serde_json::to_value(&profile)
            .map_err(|e| StoreError(format!("serialize profile: {e}")))?;
        self.store.set(&user_path(profile.uid), doc)?;
        Ok(profile)
    }

    pub fn profile(&self, uid: Uuid) -> Result<Option<UserProfile>, StoreError> {
        let doc = self.store.get(&user_path(uid))?;
        Ok(doc.and_then(|value| serde_json::from_value(value).ok()))
    }

    /// Merge-patch arbitrary profile fields.
    pub fn update_profile(
        &self,
        uid: Uuid,
        fields: serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), StoreError> {
        self.store.update(&user_path(uid), fields)
    }

    /// Record a newly reached level, keeping the furthest one.
    pub fn update_last_level(&self, uid: Uuid, level: u32) -> Result<(), StoreError> {
        let current = self.profile(uid)?.map(|p| p.last_level).unwrap_or(0);
        if level > current {
            let mut fields = serde_json::Map::new();
            fields.insert("lastLevel".to_string(), json!(level));
            self.store.update(&user_path(uid), fields)?;
        }
        Ok(())
    }
}
