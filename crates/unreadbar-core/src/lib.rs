// Unread aggregation pipeline: resolve workspaces, fetch, filter, merge, render
pub mod aggregate;
pub mod config;
pub mod details;
pub mod eligibility;
pub mod error;
pub mod mark;
pub mod models;
pub mod notifier;
pub mod render;
pub mod resolver;
pub mod transport;

pub use aggregate::{AggregateReport, Aggregator, MarkAction, NotificationLine, WorkspaceReport};
pub use config::Config;
pub use error::Error;
pub use mark::{MarkOutcome, MarkRequest};
pub use models::{Conversation, ConversationKind, EligibleNotification, MarkKind, MutePreferences, Workspace};
pub use notifier::Notifier;
pub use render::{IconVariant, Renderer};
pub use transport::{ErrorLog, Requester, SlackTransport};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
