use serde::Serialize;
use uuid::Uuid;

use crate::services::resolver::UserProfile;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
}

impl From<UserProfile> for UserResponse {
    fn from(p: UserProfile) -> Self {
        Self {
            id: p.id,
            email: p.email,
            username: p.username,
            firstname: p.firstname,
            lastname: p.lastname,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: Uuid,
}
