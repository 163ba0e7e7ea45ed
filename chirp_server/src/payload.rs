use serde::Deserialize;

use chirp_core::feed::Cursor;

/// Request for a page of a profile feed. The profile itself comes from the path.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileFeedRequest {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub cursor: Option<Cursor>,
}
