use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub bot_type: String,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}
