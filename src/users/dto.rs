use serde::Deserialize;

/// Body of the administrative create endpoint. Creation runs through the
/// same path as self-registration, so the role clamp applies here too.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub password: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub real_name: Option<String>,
    pub role: Option<String>,
}

/// Partial update; absent fields keep their stored values.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub real_name: Option<String>,
    pub role: Option<String>,
    pub status: Option<i32>,
}
