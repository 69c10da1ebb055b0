// Token -> workspace identity -> conversation candidates
use tracing::{debug, info};
use unreadbar_api::{ConversationSummary, TeamInfo};

use crate::{models::Workspace, transport::Requester};

/// Conversation types asked for in one listing call
const CONVERSATION_TYPES: &str = "public_channel,private_channel,mpim,im";

/// Who does this token belong to? `None` if `team.info` failed.
pub async fn resolve_workspace(req: &Requester, token: &str) -> Option<Workspace> {
    let team: TeamInfo = req.fetch("team.info", token, vec![], "team").await?;
    info!("Resolved workspace {} ({})", team.name, team.id);

    Some(Workspace {
        id: team.id,
        name: team.name,
        token: token.to_string(),
    })
}

/// Every non-archived conversation the token's user is in, up to `limit`
///
/// A failed listing is logged by the requester and reads as "no conversations".
pub async fn list_conversations(req: &Requester, token: &str, limit: u32) -> Vec<ConversationSummary> {
    let params = vec![
        ("exclude_archived", "true".to_string()),
        ("limit", limit.to_string()),
        ("types", CONVERSATION_TYPES.to_string()),
    ];

    let channels: Vec<ConversationSummary> = req
        .fetch("users.conversations", token, params, "channels")
        .await
        .unwrap_or_default();

    debug!("users.conversations returned {} candidates", channels.len());
    channels
}
