use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Avatar every new profile starts with.
pub const DEFAULT_AVATAR: &str = "default.jpg";

/// Profile entity - presentation data attached 1:1 to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Reference to the stored avatar image.
    pub image: String,
}

impl Profile {
    /// Default profile created alongside a new user.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            image: DEFAULT_AVATAR.to_string(),
        }
    }
}
