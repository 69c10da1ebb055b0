use std::collections::HashSet;

use unreadbar_api::{ConversationInfo, ConversationSummary};

/// A Slack team one token is authorized against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub token: String,
}

/// What sort of conversation we're looking at
///
/// Slack's own responses only hint at this through a pile of `is_*` flags;
/// everything downstream matches on this instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversationKind {
    Channel,
    PrivateChannel,
    Group,
    DirectMessage,
}

impl ConversationKind {
    /// Classify a `users.conversations` entry
    ///
    /// `None` is a generic conversation: it is fetched through
    /// `conversations.info` and classified from that payload instead.
    pub fn classify(summary: &ConversationSummary) -> Option<Self> {
        Self::from_flags(
            summary.is_im,
            summary.is_channel,
            summary.is_private,
            summary.is_group || summary.is_mpim,
        )
    }

    /// Classify from a detail payload; `None` if it carries no flags either
    pub fn from_info(info: &ConversationInfo) -> Option<Self> {
        Self::from_flags(
            info.is_im,
            info.is_channel,
            info.is_private,
            info.is_group || info.is_mpim,
        )
    }

    fn from_flags(im: bool, channel: bool, private: bool, group: bool) -> Option<Self> {
        if im {
            Some(ConversationKind::DirectMessage)
        } else if channel && private {
            Some(ConversationKind::PrivateChannel)
        } else if channel {
            Some(ConversationKind::Channel)
        } else if group {
            Some(ConversationKind::Group)
        } else {
            None
        }
    }

    /// Detail endpoint for this kind
    pub fn info_method(&self) -> &'static str {
        match self {
            ConversationKind::Channel => "channels.info",
            ConversationKind::Group => "groups.info",
            ConversationKind::PrivateChannel | ConversationKind::DirectMessage => {
                "conversations.info"
            }
        }
    }

    pub fn mark_kind(&self) -> MarkKind {
        match self {
            ConversationKind::Channel => MarkKind::Channels,
            ConversationKind::PrivateChannel | ConversationKind::Group => MarkKind::Groups,
            ConversationKind::DirectMessage => MarkKind::Im,
        }
    }

    /// `@` for people, `#` for everything else
    pub fn marker(&self) -> char {
        match self {
            ConversationKind::DirectMessage => '@',
            _ => '#',
        }
    }
}

impl std::fmt::Display for ConversationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversationKind::Channel => write!(f, "channel"),
            ConversationKind::PrivateChannel => write!(f, "private channel"),
            ConversationKind::Group => write!(f, "group"),
            ConversationKind::DirectMessage => write!(f, "direct message"),
        }
    }
}

/// A conversation after its detail fetch, normalized across endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: String,
    pub display_name: String,
    pub kind: ConversationKind,
    pub unread_count: u64,
    pub is_member: bool,
    pub shared_workspace_ids: Vec<String>,
    /// DM peer user id
    pub peer_user: Option<String>,
}

/// Conversation ids the user has muted in one workspace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutePreferences {
    pub muted_conversation_ids: HashSet<String>,
}

impl MutePreferences {
    pub fn is_muted(&self, conversation_id: &str) -> bool {
        self.muted_conversation_ids.contains(conversation_id)
    }
}

/// A conversation that passed the eligibility filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibleNotification {
    pub conversation_id: String,
    /// Channel name, or the peer's user name for DMs
    pub name: String,
    pub kind: ConversationKind,
    pub unread_count: u64,
    /// Team used in the `slack://` deep link
    pub team_id: String,
}

/// The three families of `*.mark` endpoints, in "mark all" order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkKind {
    Im,
    Groups,
    Channels,
}

impl MarkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkKind::Im => "im",
            MarkKind::Groups => "groups",
            MarkKind::Channels => "channels",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "im" => Some(MarkKind::Im),
            "groups" => Some(MarkKind::Groups),
            "channels" => Some(MarkKind::Channels),
            _ => None,
        }
    }

    pub fn mark_method(&self) -> String {
        format!("{}.mark", self.as_str())
    }
}

impl std::fmt::Display for MarkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(flags: &[&str]) -> ConversationSummary {
        ConversationSummary {
            id: "C1".into(),
            is_channel: flags.contains(&"channel"),
            is_group: flags.contains(&"group"),
            is_im: flags.contains(&"im"),
            is_mpim: flags.contains(&"mpim"),
            is_private: flags.contains(&"private"),
            ..Default::default()
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(ConversationKind::classify(&summary(&["im"])), Some(ConversationKind::DirectMessage));
        assert_eq!(
            ConversationKind::classify(&summary(&["channel", "private"])),
            Some(ConversationKind::PrivateChannel)
        );
        assert_eq!(ConversationKind::classify(&summary(&["channel"])), Some(ConversationKind::Channel));
        assert_eq!(ConversationKind::classify(&summary(&["mpim"])), Some(ConversationKind::Group));
        assert_eq!(ConversationKind::classify(&summary(&["group", "mpim"])), Some(ConversationKind::Group));
        assert_eq!(ConversationKind::classify(&summary(&[])), None);
    }

    #[test]
    fn test_classify_from_detail_payload() {
        let info = |value: serde_json::Value| -> ConversationInfo { serde_json::from_value(value).unwrap() };

        assert_eq!(
            ConversationKind::from_info(&info(serde_json::json!({"id": "X1", "is_mpim": true}))),
            Some(ConversationKind::Group)
        );
        assert_eq!(
            ConversationKind::from_info(&info(serde_json::json!({"id": "X2", "is_im": true}))),
            Some(ConversationKind::DirectMessage)
        );
        assert_eq!(ConversationKind::from_info(&info(serde_json::json!({"id": "X3"}))), None);
    }

    #[test]
    fn test_info_methods() {
        assert_eq!(ConversationKind::Channel.info_method(), "channels.info");
        assert_eq!(ConversationKind::Group.info_method(), "groups.info");
        assert_eq!(ConversationKind::PrivateChannel.info_method(), "conversations.info");
        assert_eq!(ConversationKind::DirectMessage.info_method(), "conversations.info");
    }

    #[test]
    fn test_mark_kind_round_trip_and_order() {
        for kind in [MarkKind::Im, MarkKind::Groups, MarkKind::Channels] {
            assert_eq!(MarkKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(MarkKind::parse("mpim"), None);
        assert_eq!(MarkKind::Channels.mark_method(), "channels.mark");
        assert!(MarkKind::Im < MarkKind::Groups && MarkKind::Groups < MarkKind::Channels);
    }
}
