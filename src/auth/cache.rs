use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::users::repo_types::User;

struct CacheEntry {
    user: User,
    expires_at: Instant,
}

/// Short-TTL username → user cache that saves a database round trip on every
/// authenticated request. Entries expire on a fixed deadline regardless of
/// token expiry, so changes to a user (role, confirmed flag, avatar) can stay
/// invisible for up to one TTL. Constructed once at startup and shared
/// through `AppState`.
pub struct UserCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl UserCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, username: &str) -> Option<User> {
        {
            let entries = self.entries.read().unwrap();
            match entries.get(username) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Some(entry.user.clone())
                }
                Some(_) => {}
                None => return None,
            }
        }
        // expired; drop it so the map does not grow unbounded
        self.entries.write().unwrap().remove(username);
        None
    }

    pub fn insert(&self, user: User) {
        let entry = CacheEntry {
            expires_at: Instant::now() + self.ttl,
            user: user.clone(),
        };
        self.entries.write().unwrap().insert(user.username, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::UserRole;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn sample_user(username: &str) -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: Uuid::new_v4(),
            username: username.into(),
            email: format!("{username}@example.com"),
            password_hash: "hash".into(),
            role: UserRole::User,
            confirmed: true,
            avatar: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn hit_within_ttl() {
        let cache = UserCache::new(Duration::from_secs(60));
        let user = sample_user("jane");
        cache.insert(user.clone());
        let hit = cache.get("jane").expect("entry should be live");
        assert_eq!(hit.id, user.id);
        assert!(cache.get("nobody").is_none());
    }

    #[test]
    fn entry_expires_after_ttl() {
        let cache = UserCache::new(Duration::from_millis(10));
        cache.insert(sample_user("jane"));
        std::thread::sleep(Duration::from_millis(30));
        assert!(cache.get("jane").is_none());
    }

    /// A directory update does not touch the cache: readers keep seeing the
    /// old record until the entry's deadline passes. Eventual, not immediate,
    /// consistency.
    #[test]
    fn stale_entry_survives_out_of_band_update() {
        let cache = UserCache::new(Duration::from_millis(50));
        let mut user = sample_user("jane");
        cache.insert(user.clone());

        // avatar changed in the directory, cache not invalidated
        user.avatar = Some("https://example.com/new.png".into());

        let cached = cache.get("jane").expect("still cached");
        assert_eq!(cached.avatar, None);

        std::thread::sleep(Duration::from_millis(80));
        assert!(cache.get("jane").is_none());
    }

    #[test]
    fn insert_overwrites_existing_entry() {
        let cache = UserCache::new(Duration::from_secs(60));
        let mut user = sample_user("jane");
        cache.insert(user.clone());
        user.confirmed = false;
        cache.insert(user);
        assert!(!cache.get("jane").unwrap().confirmed);
    }
}
