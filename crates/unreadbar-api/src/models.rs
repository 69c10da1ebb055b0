use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `team.info` -> `team`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamInfo {
    pub id: String,
    pub name: String,
}

/// One entry of `users.conversations` -> `channels`
///
/// Only the flags needed to pick a detail endpoint and pre-filter are kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_channel: bool,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default)]
    pub is_im: bool,
    #[serde(default)]
    pub is_mpim: bool,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_user_deleted: bool,
    // Absent for plain channels
    #[serde(default)]
    pub is_open: Option<bool>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub shared_team_ids: Vec<String>,
}

/// `conversations.info` / `channels.info` -> `channel`, `groups.info` -> `group`
///
/// The kind flags matter only for conversations the listing didn't classify.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_member: bool,
    #[serde(default)]
    pub is_channel: bool,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default)]
    pub is_im: bool,
    #[serde(default)]
    pub is_mpim: bool,
    #[serde(default)]
    pub is_private: bool,
    /// Unread messages that matter to the user (no join/leave noise)
    #[serde(default)]
    pub unread_count_display: u64,
    /// DM peer
    #[serde(default)]
    pub user: Option<String>,
}

/// `users.info` -> `user`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub team_id: Option<String>,
}

/// `users.prefs.get` -> `prefs`
///
/// `muted_channels` shows up as a comma separated string on most workspaces
/// and as a list on some, so it stays raw here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPrefs {
    #[serde(default)]
    pub muted_channels: Value,
}
