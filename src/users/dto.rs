use serde::Deserialize;

use crate::db::models::{MemberStatus, Role};

/// Profile data the web client sends on first sign-in.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoleUpdate {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: MemberStatus,
}
