use std::collections::BTreeMap;

use crate::models::{ConversationKind, EligibleNotification, MarkKind, Workspace};

/// Counts above this render as "10+"
pub const COUNT_CAP: u64 = 10;

/// Names longer than this get cut and ellipsized
const NAME_MAX: usize = 15;
/// Marker + name are padded to this width so counts line up
const LABEL_WIDTH: usize = 17;

/// Badge text for a count: empty for zero, capped at "10+"
pub fn badge(count: u64) -> String {
    match count {
        0 => String::new(),
        n => cap_count(n),
    }
}

pub fn cap_count(count: u64) -> String {
    if count > COUNT_CAP {
        format!("{}+", COUNT_CAP)
    } else {
        count.to_string()
    }
}

/// Marker and name padded to a fixed width, then the count, so counts form a column
pub fn format_label(kind: ConversationKind, name: &str, count: u64) -> String {
    let mut label = format!("{}{}", kind.marker(), sanitize(name));
    if label.chars().count() > NAME_MAX {
        label = label.chars().take(NAME_MAX - 1).collect();
        label.push('…');
    }

    let width = label.chars().count();
    label.extend(std::iter::repeat(' ').take(LABEL_WIDTH.saturating_sub(width)));
    label.push_str(&cap_count(count));
    label
}

// A stray pipe would split the label from its attributes
pub(crate) fn sanitize(text: &str) -> String {
    text.replace('|', "¦")
}

/// Everything the host needs to re-run us in mark mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkAction {
    pub token: String,
    pub targets: Vec<(MarkKind, Vec<String>)>,
}

impl MarkAction {
    /// Arguments after the program path, e.g. `--mark --token=x im=D1,D2`
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["--mark".to_string(), format!("--token={}", self.token)];
        args.extend(
            self.targets
                .iter()
                .map(|(kind, ids)| format!("{}={}", kind, ids.join(","))),
        );
        args
    }
}

/// One unread conversation, ready to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationLine {
    pub label: String,
    pub href: String,
    pub mark: MarkAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceReport {
    pub workspace: Workspace,
    pub notifications: Vec<NotificationLine>,
    ids_by_kind: BTreeMap<MarkKind, Vec<String>>,
}

impl WorkspaceReport {
    fn new(workspace: Workspace) -> Self {
        Self {
            workspace,
            notifications: Vec::new(),
            ids_by_kind: BTreeMap::new(),
        }
    }

    /// Single action covering every listed conversation, im before groups before channels
    pub fn mark_all_action(&self) -> MarkAction {
        MarkAction {
            token: self.workspace.token.clone(),
            targets: self
                .ids_by_kind
                .iter()
                .map(|(kind, ids)| (*kind, ids.clone()))
                .collect(),
        }
    }
}

/// Final state of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateReport {
    /// In token order
    pub workspaces: Vec<WorkspaceReport>,
    /// Exact sum; only the rendered badge is capped
    pub unread_total: u64,
    pub errors: Vec<String>,
}

impl AggregateReport {
    pub fn has_notifications(&self) -> bool {
        self.workspaces.iter().any(|w| !w.notifications.is_empty())
    }
}

/// Folds per-workspace results into one report
///
/// Owned by whoever drives the run; workspaces are added one at a time in
/// token order, so nothing here needs locking.
#[derive(Debug, Default)]
pub struct Aggregator {
    report: AggregateReport,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_workspace(&mut self, workspace: Workspace, notifications: Vec<EligibleNotification>) {
        let mut section = WorkspaceReport::new(workspace);
        for notification in notifications {
            self.record(&mut section, notification);
        }
        self.report.workspaces.push(section);
    }

    fn record(&mut self, section: &mut WorkspaceReport, notification: EligibleNotification) {
        if notification.unread_count == 0 {
            return;
        }
        self.report.unread_total += notification.unread_count;

        let kind = notification.kind.mark_kind();
        let token = section.workspace.token.clone();

        section.notifications.push(NotificationLine {
            label: format_label(notification.kind, &notification.name, notification.unread_count),
            href: format!(
                "slack://channel?team={}&id={}",
                notification.team_id, notification.conversation_id
            ),
            mark: MarkAction {
                token,
                targets: vec![(kind, vec![notification.conversation_id.clone()])],
            },
        });

        section
            .ids_by_kind
            .entry(kind)
            .or_default()
            .push(notification.conversation_id);
    }

    pub fn finish(mut self, errors: Vec<String>) -> AggregateReport {
        self.report.errors = errors;
        self.report
    }
}
