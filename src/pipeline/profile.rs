use std::sync::Arc;

use tokio::sync::RwLock;

use crate::types::UserProfile;

/// Holds the active profile. Readers get an immutable snapshot, so a
/// replacement during a trigger never tears the profile the trigger is using.
#[derive(Clone, Default)]
pub struct ProfileStore {
    current: Arc<RwLock<Arc<UserProfile>>>,
}

impl ProfileStore {
    pub fn new(initial: UserProfile) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    pub async fn snapshot(&self) -> Arc<UserProfile> {
        Arc::clone(&*self.current.read().await)
    }

    pub async fn replace(&self, profile: UserProfile) {
        *self.current.write().await = Arc::new(profile);
    }
}
