use serde::{Deserialize, Serialize};

use crate::auth::{Identity, TokenPair};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

/// Fixture student to sign in as; defaults to the first one
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockLoginRequest {
    pub student_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: Identity,
    pub tokens: TokenPair,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    pub user: Identity,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
