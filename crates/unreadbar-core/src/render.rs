// Menu bar output: one `label | key=value ...` line per item
use crate::{
    aggregate::{badge, sanitize, AggregateReport, MarkAction, WorkspaceReport},
    config::DisplayConfig,
};

const SEPARATOR: &str = "---";
const MONO: &str = "font=Menlo size=13";

/// Which header icon to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconVariant {
    Unread,
    Light,
    Dark,
}

impl IconVariant {
    /// Unread icon whenever something is unread, otherwise whatever suits the menu bar
    pub fn select(unread_total: u64, dark_mode: bool) -> Self {
        match (unread_total, dark_mode) {
            (0, true) => IconVariant::Dark,
            (0, false) => IconVariant::Light,
            _ => IconVariant::Unread,
        }
    }
}

pub struct Renderer {
    /// Program the host runs for mark actions
    script: String,
    display: DisplayConfig,
}

impl Renderer {
    pub fn new(script: impl Into<String>, display: DisplayConfig) -> Self {
        Self {
            script: script.into(),
            display,
        }
    }

    pub fn render(&self, report: &AggregateReport, icon: IconVariant) -> String {
        let mut out = vec![self.header(report.unread_total, icon)];

        for section in report.workspaces.iter().filter(|s| !s.notifications.is_empty()) {
            self.workspace(section, &mut out);
        }

        if !report.has_notifications() {
            out.push(SEPARATOR.to_string());
            out.push(line("No unread Slack messages!", &["color=teal", "href=slack://open"]));
        }

        if !report.errors.is_empty() {
            out.push(SEPARATOR.to_string());
            out.push("Errors".to_string());
            for error in &report.errors {
                out.push(line(&format!("--{}", sanitize(error)), &["color=red"]));
            }
        }

        let mut text = out.join("\n");
        text.push('\n');
        text
    }

    fn header(&self, unread_total: u64, icon: IconVariant) -> String {
        let image = self.icon_attr(icon);
        let mut attrs = Vec::new();
        if unread_total > 0 {
            attrs.push(format!("color={}", self.display.badge_color));
        }
        attrs.extend(image.clone());

        // Without an icon an empty label would leave nothing in the menu bar
        let label = match (unread_total, image) {
            (0, None) => "0".to_string(),
            (n, _) => badge(n),
        };
        line(&label, &attrs)
    }

    fn workspace(&self, section: &WorkspaceReport, out: &mut Vec<String>) {
        out.push(SEPARATOR.to_string());
        out.push(line(&sanitize(&section.workspace.name), &["size=12"]));

        for notification in &section.notifications {
            out.push(line(
                &notification.label,
                &[MONO.to_string(), format!("href={}", notification.href)],
            ));

            let mut attrs = vec!["alternate=true".to_string(), MONO.to_string()];
            attrs.extend(self.action_attrs(&notification.mark));
            out.push(line("Mark as read", &attrs));
        }

        out.push(line("Mark all as read", &self.action_attrs(&section.mark_all_action())));
    }

    fn action_attrs(&self, action: &MarkAction) -> Vec<String> {
        let script = if self.script.contains(char::is_whitespace) {
            format!("\"{}\"", self.script)
        } else {
            self.script.clone()
        };

        let mut attrs = vec![format!("bash={}", script)];
        attrs.extend(
            action
                .args()
                .into_iter()
                .enumerate()
                .map(|(i, arg)| format!("param{}={}", i + 1, arg)),
        );
        attrs.push("refresh=true".to_string());
        attrs.push("terminal=false".to_string());
        attrs
    }

    fn icon_attr(&self, icon: IconVariant) -> Option<String> {
        let icons = &self.display.icons;
        let data = match icon {
            IconVariant::Unread => icons.unread.as_ref(),
            IconVariant::Light => icons.light.as_ref(),
            IconVariant::Dark => icons.dark.as_ref(),
        };
        data.map(|d| format!("image={}", d))
    }
}

fn line<S: AsRef<str>>(label: &str, attrs: &[S]) -> String {
    if attrs.is_empty() {
        return label.to_string();
    }
    let attrs: Vec<&str> = attrs.iter().map(AsRef::as_ref).collect();
    format!("{} | {}", label, attrs.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregator;
    use crate::config::IconConfig;
    use crate::models::{ConversationKind, EligibleNotification, Workspace};

    fn acme() -> Workspace {
        Workspace {
            id: "T1".into(),
            name: "Acme".into(),
            token: "xoxp-acme".into(),
        }
    }

    fn general(count: u64) -> EligibleNotification {
        EligibleNotification {
            conversation_id: "C1".into(),
            name: "general".into(),
            kind: ConversationKind::Channel,
            unread_count: count,
            team_id: "T1".into(),
        }
    }

    fn renderer() -> Renderer {
        Renderer::new("/plugins/unreadbar", DisplayConfig::default())
    }

    #[test]
    fn test_icon_variant_selection() {
        assert_eq!(IconVariant::select(0, false), IconVariant::Light);
        assert_eq!(IconVariant::select(0, true), IconVariant::Dark);
        assert_eq!(IconVariant::select(4, true), IconVariant::Unread);
    }

    #[test]
    fn test_single_channel_report() {
        let mut aggregator = Aggregator::new();
        aggregator.add_workspace(acme(), vec![general(3)]);
        let report = aggregator.finish(vec![]);

        let text = renderer().render(&report, IconVariant::Unread);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "3 | color=#e05415",
                "---",
                "Acme | size=12",
                "#general         3 | font=Menlo size=13 href=slack://channel?team=T1&id=C1",
                "Mark as read | alternate=true font=Menlo size=13 bash=/plugins/unreadbar param1=--mark param2=--token=xoxp-acme param3=channels=C1 refresh=true terminal=false",
                "Mark all as read | bash=/plugins/unreadbar param1=--mark param2=--token=xoxp-acme param3=channels=C1 refresh=true terminal=false",
            ]
        );
    }

    #[test]
    fn test_badge_caps_at_ten_plus() {
        let mut aggregator = Aggregator::new();
        aggregator.add_workspace(acme(), vec![general(15)]);
        let report = aggregator.finish(vec![]);

        let text = renderer().render(&report, IconVariant::Unread);
        assert!(text.starts_with("10+ | color=#e05415\n"));
        assert!(text.contains("#general         10+ |"));
    }

    #[test]
    fn test_empty_report_shows_no_unread_and_errors() {
        let report = Aggregator::new().finish(vec![
            "team.info: invalid_auth".to_string(),
            "team.info: token_revoked".to_string(),
        ]);

        let display = DisplayConfig {
            icons: IconConfig {
                light: Some("LIGHT".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let text = Renderer::new("/p", display).render(&report, IconVariant::Light);

        assert_eq!(
            text,
            " | image=LIGHT\n\
             ---\n\
             No unread Slack messages! | color=teal href=slack://open\n\
             ---\n\
             Errors\n\
             --team.info: invalid_auth | color=red\n\
             --team.info: token_revoked | color=red\n"
        );
    }

    #[test]
    fn test_zero_without_icon_still_shows_a_label() {
        let report = Aggregator::new().finish(vec![]);
        let text = renderer().render(&report, IconVariant::Dark);
        assert!(text.starts_with("0\n"));
    }

    #[test]
    fn test_workspaces_without_notifications_are_hidden() {
        let mut aggregator = Aggregator::new();
        aggregator.add_workspace(acme(), vec![]);
        let report = aggregator.finish(vec![]);

        let text = renderer().render(&report, IconVariant::Light);
        assert!(!text.contains("Acme"));
        assert!(text.contains("No unread Slack messages!"));
    }

    #[test]
    fn test_script_with_spaces_is_quoted() {
        let mut aggregator = Aggregator::new();
        aggregator.add_workspace(acme(), vec![general(1)]);
        let report = aggregator.finish(vec![]);

        let text = Renderer::new("/Users/me/Menu Bar/unreadbar", DisplayConfig::default())
            .render(&report, IconVariant::Unread);
        assert!(text.contains("bash=\"/Users/me/Menu Bar/unreadbar\" param1=--mark"));
    }
}
