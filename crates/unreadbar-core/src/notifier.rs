// Runs the whole pipeline for every token and folds the results together
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::{
    aggregate::{AggregateReport, Aggregator},
    config::AggregationConfig,
    details::fetch_details,
    eligibility::filter_unread,
    models::{EligibleNotification, Workspace},
    resolver::{list_conversations, resolve_workspace},
    transport::{ErrorLog, Requester, SlackTransport},
};

pub const MISSING_TOKEN_MESSAGE: &str =
    "Missing Slack token: add one to the tokens list in config.toml";

/// The notification aggregation pipeline
///
/// Per token: resolve workspace -> list conversations -> fetch details ->
/// filter unread. Within a token every fan-out stage runs concurrently and
/// waits for all of its requests. Across tokens, `token_concurrency`
/// pipelines run at once (1 = strictly one after another); results are
/// merged in token order either way.
pub struct Notifier {
    transport: Arc<dyn SlackTransport>,
    token_concurrency: usize,
    conversation_limit: u32,
}

impl Notifier {
    pub fn new(transport: Arc<dyn SlackTransport>) -> Self {
        Self::from_config(transport, &AggregationConfig::default())
    }

    pub fn from_config(transport: Arc<dyn SlackTransport>, config: &AggregationConfig) -> Self {
        Self {
            transport,
            token_concurrency: config.token_concurrency.max(1),
            conversation_limit: config.conversation_limit,
        }
    }

    pub fn with_token_concurrency(mut self, token_concurrency: usize) -> Self {
        self.token_concurrency = token_concurrency.max(1);
        self
    }

    /// Poll every token and build the report
    ///
    /// Never fails: anything that went wrong is in `report.errors`.
    pub async fn run(&self, tokens: &[String]) -> AggregateReport {
        let errors = ErrorLog::new();
        let req = Requester::new(self.transport.clone(), errors.clone());

        if tokens.is_empty() {
            errors.push(MISSING_TOKEN_MESSAGE);
        }

        let req = &req;
        let results: Vec<_> = stream::iter(tokens)
            .map(move |token| self.collect_workspace(req, token))
            .buffered(self.token_concurrency)
            .collect()
            .await;

        let mut aggregator = Aggregator::new();
        for (workspace, notifications) in results.into_iter().flatten() {
            aggregator.add_workspace(workspace, notifications);
        }

        let report = aggregator.finish(errors.entries());
        info!(
            "{} workspaces, {} unread, {} errors",
            report.workspaces.len(),
            report.unread_total,
            report.errors.len()
        );
        report
    }

    async fn collect_workspace(
        &self,
        req: &Requester,
        token: &str,
    ) -> Option<(Workspace, Vec<EligibleNotification>)> {
        let workspace = resolve_workspace(req, token).await?;

        let candidates = list_conversations(req, token, self.conversation_limit).await;
        let conversations = fetch_details(req, candidates, token).await;
        let notifications = filter_unread(req, conversations, &workspace).await;

        debug!("{}: {} unread conversations", workspace.name, notifications.len());
        Some((workspace, notifications))
    }
}
