// Slack Web API client and the wire types it hands back
pub mod models;
pub mod slack;

// Re-export common types
pub use models::{ConversationInfo, ConversationSummary, TeamInfo, UserInfo, UserPrefs};
pub use slack::{Result, SlackClient, SlackError, SLACK_API_BASE};
