// Per-conversation detail fetch, all in flight at once
use futures::future::join_all;
use serde_json::Value;
use tracing::debug;
use unreadbar_api::{ConversationInfo, ConversationSummary};

use crate::{
    models::{Conversation, ConversationKind},
    transport::{decode_field, Requester},
};

/// Fetch full metadata for every candidate worth looking at
///
/// Deleted DM peers and closed groups are skipped up front. A conversation
/// whose detail fetch fails simply isn't in the result; the rest carry on.
/// Output keeps listing order.
pub async fn fetch_details(
    req: &Requester,
    candidates: Vec<ConversationSummary>,
    token: &str,
) -> Vec<Conversation> {
    let fetches: Vec<_> = candidates
        .into_iter()
        .map(|summary| {
            let kind = ConversationKind::classify(&summary);
            (summary, kind)
        })
        .filter(|(summary, kind)| worth_fetching(summary, *kind))
        .map(|(summary, kind)| fetch_one(req, summary, kind, token))
        .collect();

    join_all(fetches).await.into_iter().flatten().collect()
}

fn worth_fetching(summary: &ConversationSummary, kind: Option<ConversationKind>) -> bool {
    let skip = match kind {
        Some(ConversationKind::DirectMessage) => summary.is_user_deleted,
        // Groups count as closed unless the listing says they're open
        _ if summary.is_group => summary.is_open != Some(true),
        Some(ConversationKind::Group | ConversationKind::PrivateChannel) => {
            summary.is_open == Some(false)
        }
        _ => false,
    };

    if skip {
        debug!("Skipping {}: deleted peer or closed", summary.id);
    }
    !skip
}

async fn fetch_one(
    req: &Requester,
    summary: ConversationSummary,
    kind: Option<ConversationKind>,
    token: &str,
) -> Option<Conversation> {
    let method = kind.map_or("conversations.info", |k| k.info_method());
    debug!("Fetch {} for {}", method, summary.id);

    let params = vec![("channel", summary.id.clone()), ("unreads", "true".to_string())];
    let body = req.request(method, token, params).await?;

    match normalize(summary, kind, body) {
        Ok(conversation) => Some(conversation),
        Err(detail) => {
            req.errors().push(format!("{}: {}", method, detail));
            None
        }
    }
}

/// Turn a detail response into a `Conversation`
///
/// `groups.info` answers under `group`, everything else under `channel`.
/// Without a kind from the listing, the payload's own flags decide; a payload
/// with no flags at all is handled like a channel, which only counts when the
/// user is a member.
pub fn normalize(
    summary: ConversationSummary,
    kind: Option<ConversationKind>,
    mut body: Value,
) -> Result<Conversation, String> {
    let field = if body.get("group").is_some_and(|g| !g.is_null()) {
        "group"
    } else {
        "channel"
    };
    let info: ConversationInfo = decode_field(&mut body, field)?;

    let kind = kind
        .or_else(|| ConversationKind::from_info(&info))
        .unwrap_or(ConversationKind::Channel);

    let display_name = info
        .name
        .or(summary.name)
        .unwrap_or_else(|| info.id.clone());

    Ok(Conversation {
        id: info.id,
        display_name,
        kind,
        unread_count: info.unread_count_display,
        is_member: info.is_member,
        shared_workspace_ids: summary.shared_team_ids,
        peer_user: info.user.or(summary.user),
    })
}
