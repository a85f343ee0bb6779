/// Refresh token cache key prefix
const REFRESH_TOKEN_PREFIX: &str = "refresh_token:";

/// Key holding the single honored refresh token of a user
pub fn refresh_token_key(user_id: &str) -> String {
    format!("{}{}", REFRESH_TOKEN_PREFIX, user_id)
}
