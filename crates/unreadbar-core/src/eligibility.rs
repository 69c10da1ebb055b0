use std::collections::HashSet;

use futures::future::join_all;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;
use unreadbar_api::{UserInfo, UserPrefs};

use crate::{
    models::{Conversation, ConversationKind, EligibleNotification, MutePreferences, Workspace},
    transport::Requester,
};

/// Read the muted conversation ids out of `prefs.muted_channels`
///
/// Accepts a comma separated string (`"C1,C2"`), a single id (`"C1"`) or a
/// list of ids (`["C1", "C2"]`). Anything else means nothing is muted.
pub fn parse_muted_ids(value: &Value) -> HashSet<String> {
    let split = |s: &str| {
        s.split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>()
    };

    match value {
        Value::String(s) => split(s).into_iter().collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .flat_map(split)
            .collect(),
        _ => HashSet::new(),
    }
}

/// Mute preferences for one workspace, fetched on first use
///
/// A failed fetch is not cached, so the next conversation asking tries again
/// and only the conversation whose fetch failed drops out.
#[derive(Default)]
pub struct MuteLookup {
    prefs: OnceCell<MutePreferences>,
}

impl MuteLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, req: &Requester, token: &str) -> Option<&MutePreferences> {
        self.prefs
            .get_or_try_init(|| async {
                let prefs: UserPrefs = req
                    .fetch("users.prefs.get", token, vec![], "prefs")
                    .await
                    .ok_or(())?;
                Ok::<_, ()>(MutePreferences {
                    muted_conversation_ids: parse_muted_ids(&prefs.muted_channels),
                })
            })
            .await
            .ok()
    }
}

/// Keep the conversations that should show up as unread
///
/// Peer lookups and mute checks for all conversations run concurrently;
/// output keeps input order.
pub async fn filter_unread(
    req: &Requester,
    conversations: Vec<Conversation>,
    workspace: &Workspace,
) -> Vec<EligibleNotification> {
    let mutes = MuteLookup::new();
    let checks: Vec<_> = conversations
        .into_iter()
        .map(|conversation| check_unread(req, conversation, workspace, &mutes))
        .collect();

    join_all(checks).await.into_iter().flatten().collect()
}

async fn check_unread(
    req: &Requester,
    conversation: Conversation,
    workspace: &Workspace,
    mutes: &MuteLookup,
) -> Option<EligibleNotification> {
    if conversation.unread_count == 0 {
        return None;
    }

    if conversation.kind == ConversationKind::DirectMessage {
        return direct_message(req, conversation, workspace).await;
    }

    if !(conversation.is_member || conversation.kind == ConversationKind::Group) {
        debug!("Ignoring {} {}: not a member", conversation.kind, conversation.id);
        return None;
    }

    let prefs = mutes.get(req, &workspace.token).await?;
    if prefs.is_muted(&conversation.id) {
        debug!("Ignoring muted {} {}", conversation.kind, conversation.id);
        return None;
    }

    let team_id = conversation
        .shared_workspace_ids
        .first()
        .cloned()
        .unwrap_or_else(|| workspace.id.clone());

    Some(EligibleNotification {
        conversation_id: conversation.id,
        name: conversation.display_name,
        kind: conversation.kind,
        unread_count: conversation.unread_count,
        team_id,
    })
}

// DMs are never muted; they only need the peer's name
async fn direct_message(
    req: &Requester,
    conversation: Conversation,
    workspace: &Workspace,
) -> Option<EligibleNotification> {
    let Some(peer) = conversation.peer_user.clone() else {
        debug!("DM {} has no peer user", conversation.id);
        return None;
    };

    let user: UserInfo = req
        .fetch("users.info", &workspace.token, vec![("user", peer)], "user")
        .await?;

    Some(EligibleNotification {
        conversation_id: conversation.id,
        name: user.name,
        kind: ConversationKind::DirectMessage,
        unread_count: conversation.unread_count,
        team_id: user.team_id.unwrap_or_else(|| workspace.id.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{ErrorLog, MockSlackTransport};
    use serde_json::json;
    use std::sync::Arc;
    use unreadbar_api::SlackError;

    fn workspace() -> Workspace {
        Workspace {
            id: "T1".into(),
            name: "Acme".into(),
            token: "xoxp-acme".into(),
        }
    }

    fn conversation(id: &str, kind: ConversationKind, unread: u64, member: bool) -> Conversation {
        Conversation {
            id: id.into(),
            display_name: format!("name-{}", id),
            kind,
            unread_count: unread,
            is_member: member,
            shared_workspace_ids: vec![],
            peer_user: (kind == ConversationKind::DirectMessage).then(|| "U2".to_string()),
        }
    }

    #[test]
    fn test_parse_muted_ids_accepts_every_encoding() {
        let expected: HashSet<String> = ["C1".to_string()].into();

        assert_eq!(parse_muted_ids(&json!("C1")), expected);
        assert_eq!(parse_muted_ids(&json!(["C1"])), expected);
        assert_eq!(parse_muted_ids(&json!("C1,")), expected);

        let many = parse_muted_ids(&json!("C1, C2,C3"));
        assert_eq!(many.len(), 3);
        assert!(many.contains("C2"));

        assert!(parse_muted_ids(&json!("")).is_empty());
        assert!(parse_muted_ids(&Value::Null).is_empty());
    }

    #[tokio::test]
    async fn test_zero_unread_needs_no_requests() {
        let mut mock = MockSlackTransport::new();
        mock.expect_call().never();

        let req = Requester::new(Arc::new(mock), ErrorLog::new());
        let conversations = vec![
            conversation("C1", ConversationKind::Channel, 0, true),
            conversation("D1", ConversationKind::DirectMessage, 0, true),
        ];

        assert!(filter_unread(&req, conversations, &workspace()).await.is_empty());
    }

    #[tokio::test]
    async fn test_muted_and_non_member_channels_drop_out() {
        let mut mock = MockSlackTransport::new();
        mock.expect_call()
            .withf(|method, _, _| method == "users.prefs.get")
            .times(1)
            .returning(|_, _, _| Ok(json!({"ok": true, "prefs": {"muted_channels": "C2"}})));

        let req = Requester::new(Arc::new(mock), ErrorLog::new());
        let conversations = vec![
            conversation("C1", ConversationKind::Channel, 3, true),
            conversation("C2", ConversationKind::Channel, 5, true),
            conversation("C3", ConversationKind::Channel, 7, false),
            conversation("G1", ConversationKind::Group, 1, false),
        ];

        let eligible = filter_unread(&req, conversations, &workspace()).await;
        let ids: Vec<_> = eligible.iter().map(|n| n.conversation_id.as_str()).collect();

        assert_eq!(ids, vec!["C1", "G1"]);
        assert_eq!(eligible[0].team_id, "T1");
        assert_eq!(eligible[0].unread_count, 3);
    }

    #[tokio::test]
    async fn test_scalar_and_list_mutes_behave_the_same() {
        for prefs in [json!({"muted_channels": "C1"}), json!({"muted_channels": ["C1"]})] {
            let mut mock = MockSlackTransport::new();
            mock.expect_call()
                .returning(move |_, _, _| Ok(json!({"ok": true, "prefs": prefs.clone()})));

            let req = Requester::new(Arc::new(mock), ErrorLog::new());
            let conversations = vec![conversation("C1", ConversationKind::Channel, 4, true)];

            assert!(filter_unread(&req, conversations, &workspace()).await.is_empty());
        }
    }

    #[tokio::test]
    async fn test_dm_uses_peer_profile_and_skips_mutes() {
        let mut mock = MockSlackTransport::new();
        mock.expect_call()
            .withf(|method, _, params| method == "users.info" && params == &vec![("user", "U2".to_string())])
            .times(1)
            .returning(|_, _, _| {
                Ok(json!({"ok": true, "user": {"id": "U2", "name": "ada", "team_id": "T7"}}))
            });
        mock.expect_call()
            .withf(|method, _, _| method == "users.prefs.get")
            .never();

        let req = Requester::new(Arc::new(mock), ErrorLog::new());
        let conversations = vec![conversation("D1", ConversationKind::DirectMessage, 2, false)];

        let eligible = filter_unread(&req, conversations, &workspace()).await;
        assert_eq!(
            eligible,
            vec![EligibleNotification {
                conversation_id: "D1".into(),
                name: "ada".into(),
                kind: ConversationKind::DirectMessage,
                unread_count: 2,
                team_id: "T7".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_failed_prefs_fetch_only_drops_that_conversation() {
        use std::sync::atomic::{AtomicU32, Ordering};

        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let mut mock = MockSlackTransport::new();
        mock.expect_call().returning(move |_, _, _| {
            // First prefs fetch fails, the retry from the next conversation works
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(SlackError::Api("ratelimited".into()))
            } else {
                Ok(json!({"ok": true, "prefs": {"muted_channels": ""}}))
            }
        });

        let errors = ErrorLog::new();
        let req = Requester::new(Arc::new(mock), errors.clone());
        let conversations = vec![
            conversation("C1", ConversationKind::Channel, 1, true),
            conversation("C2", ConversationKind::Channel, 1, true),
        ];

        let eligible = filter_unread(&req, conversations, &workspace()).await;

        assert_eq!(eligible.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(errors.entries(), vec!["users.prefs.get: ratelimited"]);
    }

    #[tokio::test]
    async fn test_failed_peer_lookup_only_drops_that_dm() {
        let mut mock = MockSlackTransport::new();
        mock.expect_call()
            .withf(|method, _, _| method == "users.info")
            .times(2)
            .returning(|_, _, params| match params[0].1.as_str() {
                "U2" => Ok(json!({"ok": true, "user": {"id": "U2", "name": "ada", "team_id": "T1"}})),
                _ => Err(SlackError::Api("user_not_found".into())),
            });

        let errors = ErrorLog::new();
        let req = Requester::new(Arc::new(mock), errors.clone());

        let mut gone = conversation("D2", ConversationKind::DirectMessage, 5, false);
        gone.peer_user = Some("U3".into());
        let conversations = vec![conversation("D1", ConversationKind::DirectMessage, 2, false), gone];

        let eligible = filter_unread(&req, conversations, &workspace()).await;
        let ids: Vec<_> = eligible.iter().map(|n| n.conversation_id.as_str()).collect();

        assert_eq!(ids, vec!["D1"]);
        assert_eq!(eligible[0].name, "ada");
        assert_eq!(errors.entries(), vec!["users.info: user_not_found"]);
    }
}
