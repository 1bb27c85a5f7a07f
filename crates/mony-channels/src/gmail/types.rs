//! Gmail REST v1 deserialization types.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GmListResponse {
    #[serde(default)]
    pub messages: Vec<GmMessageRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GmMessageRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GmMessage {
    pub id: String,
    /// Milliseconds since the epoch, sent as a string.
    #[serde(default)]
    pub internal_date: Option<String>,
    pub payload: Option<GmPart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GmPart {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub headers: Vec<GmHeader>,
    pub body: Option<GmBody>,
    #[serde(default)]
    pub parts: Option<Vec<GmPart>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GmHeader {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GmBody {
    pub data: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GmTokenResponse {
    pub access_token: String,
}
