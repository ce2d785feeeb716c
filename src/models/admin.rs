use serde::Serialize;

/// Administrator profile without the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Admin {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub created_at: String,
}
