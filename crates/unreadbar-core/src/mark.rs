// "Mark as read": the host re-invokes us with --mark --token=... kind=ids
use futures::future::join_all;
use tracing::{debug, warn};

use crate::{
    models::MarkKind,
    transport::SlackTransport,
    Error, Result,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkRequest {
    pub token: String,
    pub targets: Vec<(MarkKind, Vec<String>)>,
}

impl MarkRequest {
    /// Build a request from the token flag and `kind=id1,id2` arguments
    ///
    /// Unknown kinds and malformed arguments are skipped; no token at all is
    /// an error, checked before anything touches the network.
    pub fn from_args<S: AsRef<str>>(token: Option<&str>, args: &[S]) -> Result<Self> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(Error::MissingToken)?;

        let targets = args
            .iter()
            .filter_map(|arg| {
                let (kind, ids) = arg.as_ref().split_once('=')?;
                let Some(kind) = MarkKind::parse(kind) else {
                    debug!("Ignoring mark argument {}", arg.as_ref());
                    return None;
                };
                let ids: Vec<String> = ids
                    .split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect();
                (!ids.is_empty()).then_some((kind, ids))
            })
            .collect();

        Ok(Self {
            token: token.to_string(),
            targets,
        })
    }

    /// Every `(kind, id)` pair, one mark request each
    pub fn pairs(&self) -> impl Iterator<Item = (MarkKind, &str)> + '_ {
        self.targets
            .iter()
            .flat_map(|(kind, ids)| ids.iter().map(move |id| (*kind, id.as_str())))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkOutcome {
    pub marked: Vec<String>,
    /// `"<kind>.mark (<id>): <error>"`
    pub failed: Vec<String>,
}

/// Send one `<kind>.mark` per conversation, all at once
///
/// `ts` is the read marker (unix seconds); anything posted before it counts
/// as read. One failed request never stops the others.
pub async fn mark_read(transport: &dyn SlackTransport, request: &MarkRequest, ts: i64) -> MarkOutcome {
    let calls = request.pairs().map(|(kind, id)| async move {
        let method = kind.mark_method();
        let params = vec![("channel", id.to_string()), ("ts", ts.to_string())];
        let result = transport.call(&method, &request.token, params).await;
        (method, id, result)
    });

    let mut outcome = MarkOutcome::default();
    for (method, id, result) in join_all(calls).await {
        match result {
            Ok(_) => outcome.marked.push(id.to_string()),
            Err(e) => {
                warn!("/{} ({}) failed: {}", method, id, e);
                outcome.failed.push(format!("{} ({}): {}", method, id, e));
            }
        }
    }
    outcome
}
