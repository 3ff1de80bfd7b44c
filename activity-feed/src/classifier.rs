//! Turns a normalized event into display text plus link targets.
//!
//! Dispatch happens in two steps: [`rule_for`] picks the rule for an
//! [`EventType`] (an exhaustive match, so a new type cannot be forgotten),
//! and each rule then branches on the parsed [`Action`] or on a type specific
//! payload field. Classification never fails. Anything missing from the
//! payload is rendered as a placeholder instead of a broken link.

use crate::types::{ActionDescriptor, EventType, NormalizedEvent, TargetDescriptor};
use serde_json::Value;
use tracing::{debug, warn};

pub const NOT_ACCESSIBLE: &str = "(not accessible anymore)";
pub const NO_WIKI_PAGES: &str = "(wiki pages not found)";

/// `payload.action` values the classification table knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Added,
    Approved,
    Assigned,
    ChangesRequested,
    Closed,
    Created,
    Deleted,
    Edited,
    Labeled,
    Merged,
    Opened,
    Published,
    ReadyForReview,
    Reopened,
    Resolved,
    ReviewRequestRemoved,
    ReviewRequested,
    Synchronize,
    Unassigned,
    Unlabeled,
    Unresolved,
    Other(String),
}

impl Action {
    pub fn parse(action: Option<&str>) -> Self {
        let Some(action) = action else {
            return Action::Other(String::new());
        };
        match action.to_ascii_lowercase().as_str() {
            "added" => Action::Added,
            "approved" => Action::Approved,
            "assigned" => Action::Assigned,
            "changes_requested" => Action::ChangesRequested,
            "closed" => Action::Closed,
            "created" => Action::Created,
            "deleted" => Action::Deleted,
            "edited" => Action::Edited,
            "labeled" => Action::Labeled,
            "merged" => Action::Merged,
            "opened" => Action::Opened,
            "published" => Action::Published,
            "ready_for_review" => Action::ReadyForReview,
            "reopened" => Action::Reopened,
            "resolved" => Action::Resolved,
            "review_request_removed" => Action::ReviewRequestRemoved,
            "review_requested" => Action::ReviewRequested,
            // the webhook docs say "synchronize", older payloads say "synchronized"
            "synchronize" | "synchronized" => Action::Synchronize,
            "unassigned" => Action::Unassigned,
            "unlabeled" => Action::Unlabeled,
            "unresolved" => Action::Unresolved,
            _ => Action::Other(action.to_string()),
        }
    }
}

/// Everything a rule may look at while classifying one event.
pub struct Context<'a> {
    pub payload: &'a Value,
    pub action: Action,
    pub repo_full_name: &'a str,
    pub web_base_url: &'a str,
}

impl Context<'_> {
    fn str_at(&self, pointer: &str) -> Option<&str> {
        str_at(self.payload, pointer)
    }

    fn number_at(&self, pointer: &str) -> Option<u64> {
        self.payload.pointer(pointer).and_then(number)
    }

    fn web_url(&self, path: &str) -> String {
        format!("{}/{}", self.web_base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    fn repo_link(&self) -> TargetDescriptor {
        link(self.web_url(self.repo_full_name), self.repo_full_name)
    }

    fn user_link(&self, pointer: &str) -> TargetDescriptor {
        let Some(login) = self.str_at(&format!("{pointer}/login")) else {
            return placeholder();
        };
        let href = self
            .str_at(&format!("{pointer}/html_url"))
            .map(str::to_string)
            .unwrap_or_else(|| self.web_url(login));
        TargetDescriptor::Link {
            href,
            label: login.to_string(),
            title: Some(login.to_string()),
            hovercard_subject: Some(login.to_string()),
        }
    }

    fn issue_link(&self) -> TargetDescriptor {
        let Some(number) = self.number_at("/issue/number") else {
            return placeholder();
        };
        let href = self
            .str_at("/issue/html_url")
            .map(str::to_string)
            .unwrap_or_else(|| self.web_url(&format!("{}/issues/{number}", self.repo_full_name)));
        titled(href, format!("#{number}"), self.str_at("/issue/title"))
    }

    fn pull_request_link(&self) -> TargetDescriptor {
        let number = self
            .number_at("/number")
            .or_else(|| self.number_at("/pull_request/number"));
        let Some(number) = number else {
            return placeholder();
        };
        let href = self
            .str_at("/pull_request/html_url")
            .map(str::to_string)
            .unwrap_or_else(|| self.web_url(&format!("{}/pull/{number}", self.repo_full_name)));
        titled(href, format!("#{number}"), self.str_at("/pull_request/title"))
    }
}

/// One row of the classification table.
#[derive(Clone, Copy)]
pub struct Rule {
    pub text: fn(&Context) -> String,
    pub targets: fn(&Context) -> Vec<TargetDescriptor>,
}

pub fn rule_for(event_type: &EventType) -> Rule {
    match event_type {
        EventType::CommitComment => Rule { text: commit_comment_text, targets: commit_comment_targets },
        EventType::Create => Rule { text: create_text, targets: create_targets },
        EventType::Delete => Rule { text: delete_text, targets: delete_targets },
        EventType::Fork => Rule { text: fork_text, targets: fork_targets },
        EventType::Gollum => Rule { text: gollum_text, targets: gollum_targets },
        EventType::IssueComment => Rule { text: issue_comment_text, targets: issue_comment_targets },
        EventType::Issues => Rule { text: issues_text, targets: issues_targets },
        EventType::Member => Rule { text: member_text, targets: member_targets },
        EventType::Public => Rule { text: public_text, targets: no_targets },
        EventType::PullRequest => Rule { text: pull_request_text, targets: pull_request_targets },
        EventType::PullRequestReview => Rule { text: review_text, targets: review_targets },
        EventType::PullRequestReviewComment => Rule { text: review_comment_text, targets: review_targets },
        EventType::PullRequestReviewThread => Rule { text: review_thread_text, targets: review_thread_targets },
        EventType::Push => Rule { text: push_text, targets: push_targets },
        EventType::Release => Rule { text: release_text, targets: release_targets },
        EventType::Sponsorship => Rule { text: sponsorship_text, targets: sponsorship_targets },
        EventType::Watch => Rule { text: watch_text, targets: repository_targets },
        EventType::Unknown(_) => Rule { text: unknown_text, targets: repository_targets },
    }
}

#[derive(Debug, Clone)]
pub struct EventClassifier {
    web_base_url: String,
}

impl EventClassifier {
    pub fn new(web_base_url: impl Into<String>) -> Self {
        Self {
            web_base_url: web_base_url.into(),
        }
    }

    pub fn classify(&self, event: &NormalizedEvent, repo_full_name: &str) -> ActionDescriptor {
        if let EventType::Unknown(tag) = &event.event_type {
            warn!("Unknown event type {:?} (event {})", tag, event.id);
        }

        let ctx = Context {
            payload: &event.payload,
            action: Action::parse(event.action()),
            repo_full_name,
            web_base_url: &self.web_base_url,
        };
        if let Action::Other(action) = &ctx.action {
            if !action.is_empty() {
                debug!("Unrecognized action {:?} on {}", action, event.event_type);
            }
        }

        let rule = rule_for(&event.event_type);
        ActionDescriptor {
            text: (rule.text)(&ctx),
            targets: (rule.targets)(&ctx),
        }
    }
}

impl Default for EventClassifier {
    fn default() -> Self {
        Self::new(crate::types::FeedConfig::default().web_base_url)
    }
}

/// Classify with the default web base URL.
pub fn classify(event: &NormalizedEvent, repo_full_name: &str) -> ActionDescriptor {
    EventClassifier::default().classify(event, repo_full_name)
}

fn commit_comment_text(_: &Context) -> String {
    "commented on commit".to_string()
}

fn commit_comment_targets(ctx: &Context) -> Vec<TargetDescriptor> {
    let Some(commit_id) = ctx.str_at("/comment/commit_id") else {
        return vec![placeholder()];
    };
    let href = ctx
        .str_at("/comment/html_url")
        .map(str::to_string)
        .unwrap_or_else(|| ctx.web_url(&format!("{}/commit/{commit_id}", ctx.repo_full_name)));
    vec![link(href, commit_id)]
}

fn ref_kind(ctx: &Context) -> &'static str {
    if ctx.str_at("/ref_type") == Some("tag") {
        "tag"
    } else {
        "branch"
    }
}

fn create_text(ctx: &Context) -> String {
    format!("created {}", ref_kind(ctx))
}

fn create_targets(ctx: &Context) -> Vec<TargetDescriptor> {
    match ctx.str_at("/ref") {
        Some(git_ref) => vec![link(
            ctx.web_url(&format!("{}/tree/{git_ref}", ctx.repo_full_name)),
            git_ref,
        )],
        None => vec![placeholder()],
    }
}

fn delete_text(ctx: &Context) -> String {
    format!("deleted {}", ref_kind(ctx))
}

fn delete_targets(ctx: &Context) -> Vec<TargetDescriptor> {
    // a deleted ref has nothing left to link to
    match ctx.str_at("/ref") {
        Some(git_ref) => vec![text(git_ref)],
        None => vec![placeholder()],
    }
}

fn fork_text(_: &Context) -> String {
    "forked this repo as".to_string()
}

fn fork_targets(ctx: &Context) -> Vec<TargetDescriptor> {
    let Some(full_name) = ctx.str_at("/forkee/full_name").or_else(|| ctx.str_at("/full_name")) else {
        return vec![placeholder()];
    };
    let href = ctx
        .str_at("/forkee/html_url")
        .map(str::to_string)
        .unwrap_or_else(|| ctx.web_url(full_name));
    vec![link(href, full_name)]
}

fn gollum_text(_: &Context) -> String {
    "modified wiki page".to_string()
}

fn gollum_targets(ctx: &Context) -> Vec<TargetDescriptor> {
    let pages = match ctx.payload.get("pages").and_then(Value::as_array) {
        Some(pages) if !pages.is_empty() => pages,
        _ => return vec![text(NO_WIKI_PAGES)],
    };

    let mut targets = Vec::with_capacity(pages.len() * 2);
    for (index, page) in pages.iter().enumerate() {
        if index > 0 {
            targets.push(text(", "));
        }
        let name = str_at(page, "/page_name").or_else(|| str_at(page, "/title"));
        let target = match name {
            Some(name) => {
                let href = str_at(page, "/html_url")
                    .map(str::to_string)
                    .unwrap_or_else(|| ctx.web_url(&format!("{}/wiki/{name}", ctx.repo_full_name)));
                titled(href, name, str_at(page, "/title"))
            }
            None => placeholder(),
        };
        targets.push(target);
    }
    targets
}

fn issue_noun(ctx: &Context) -> &'static str {
    // comments on pull requests arrive as issue comments with a pull_request reference
    match ctx.payload.pointer("/issue/pull_request") {
        Some(Value::Null) | None => "issue",
        Some(_) => "pull request",
    }
}

fn issue_comment_text(ctx: &Context) -> String {
    let noun = issue_noun(ctx);
    match ctx.action {
        Action::Created => format!("commented on {noun}"),
        Action::Edited => format!("edited comment on {noun}"),
        Action::Deleted => format!("removed comment from {noun}"),
        _ => format!("did something with a comment on {noun}"),
    }
}

fn issue_comment_targets(ctx: &Context) -> Vec<TargetDescriptor> {
    let Some(href) = ctx.str_at("/comment/html_url") else {
        return vec![ctx.issue_link()];
    };
    let label = match ctx.number_at("/issue/number") {
        Some(number) => format!("#{number}"),
        None => "comment".to_string(),
    };
    vec![titled(href, label, ctx.str_at("/issue/title"))]
}

fn issues_text(ctx: &Context) -> String {
    let phrase = match ctx.action {
        Action::Opened => "opened issue",
        Action::Edited => "edited issue",
        Action::Closed => "closed issue",
        Action::Reopened => "reopened issue",
        Action::Assigned => "assigned issue",
        Action::Unassigned => "unassigned issue",
        Action::Labeled => "added label to issue",
        Action::Unlabeled => "removed label from issue",
        Action::Merged => "merged pull request",
        Action::ReadyForReview => "marked pull request",
        _ => "did something with issue",
    };
    phrase.to_string()
}

fn issues_targets(ctx: &Context) -> Vec<TargetDescriptor> {
    let issue = ctx.issue_link();
    match ctx.action {
        Action::Assigned | Action::Unassigned => assignment_targets(ctx, issue),
        Action::ReadyForReview => vec![issue, text("as ready for review")],
        _ => vec![issue],
    }
}

fn assignment_targets(ctx: &Context, subject: TargetDescriptor) -> Vec<TargetDescriptor> {
    let connector = match ctx.action {
        Action::Unassigned => " from user ",
        _ => " to user ",
    };
    vec![subject, text(connector), ctx.user_link("/assignee")]
}

fn member_text(ctx: &Context) -> String {
    let phrase = match ctx.action {
        Action::Added => "added new collaborator",
        Action::Edited => "changed collaborator permissions for user",
        _ => "performed some administrative action for user",
    };
    phrase.to_string()
}

fn member_targets(ctx: &Context) -> Vec<TargetDescriptor> {
    vec![ctx.user_link("/member")]
}

fn public_text(_: &Context) -> String {
    "made this repository public".to_string()
}

fn no_targets(_: &Context) -> Vec<TargetDescriptor> {
    Vec::new()
}

fn pull_request_text(ctx: &Context) -> String {
    let phrase = match ctx.action {
        Action::Opened => "opened pull request",
        Action::Edited => "edited pull request",
        Action::Closed => "closed pull request",
        Action::Reopened => "reopened pull request",
        Action::Assigned => "assigned pull request",
        Action::Unassigned => "unassigned pull request",
        Action::ReviewRequested => "requested review for pull request",
        Action::ReviewRequestRemoved => "removed request for review from pull request",
        Action::Labeled => "added label to pull request",
        Action::Unlabeled => "removed label from pull request",
        Action::Synchronize => "synchronized pull request",
        _ => "did something with pull request",
    };
    phrase.to_string()
}

fn pull_request_targets(ctx: &Context) -> Vec<TargetDescriptor> {
    let pull_request = ctx.pull_request_link();
    match ctx.action {
        Action::Assigned | Action::Unassigned => assignment_targets(ctx, pull_request),
        _ => vec![pull_request],
    }
}

fn review_text(ctx: &Context) -> String {
    let phrase = match Action::parse(ctx.str_at("/review/state")) {
        Action::ChangesRequested => "requested changes on pull request",
        Action::Approved => "approved pull request",
        _ => "reviewed pull request",
    };
    phrase.to_string()
}

fn review_comment_text(ctx: &Context) -> String {
    let phrase = match ctx.action {
        Action::Edited => "edited comment on pull request",
        _ => "commented on pull request",
    };
    phrase.to_string()
}

fn review_targets(ctx: &Context) -> Vec<TargetDescriptor> {
    let href = ctx
        .str_at("/comment/html_url")
        .or_else(|| ctx.str_at("/review/html_url"))
        .or_else(|| ctx.str_at("/pull_request/html_url"));
    match (href, ctx.number_at("/pull_request/number")) {
        (Some(href), Some(number)) => {
            vec![titled(href, format!("#{number}"), ctx.str_at("/pull_request/title"))]
        }
        (Some(href), None) => vec![titled(href, "pull request", ctx.str_at("/pull_request/title"))],
        (None, _) => vec![ctx.pull_request_link()],
    }
}

fn review_thread_text(ctx: &Context) -> String {
    let phrase = match ctx.action {
        Action::Resolved => "resolved thread",
        Action::Unresolved => "unresolved thread",
        _ => "did something with thread",
    };
    phrase.to_string()
}

fn review_thread_targets(ctx: &Context) -> Vec<TargetDescriptor> {
    vec![text("on pull request"), ctx.pull_request_link()]
}

fn push_text(_: &Context) -> String {
    "pushed to".to_string()
}

fn push_targets(ctx: &Context) -> Vec<TargetDescriptor> {
    let branch = ctx.str_at("/ref").map(|git_ref| {
        git_ref
            .strip_prefix("refs/heads/")
            .or_else(|| git_ref.strip_prefix("refs/tags/"))
            .unwrap_or(git_ref)
    })
    .filter(|branch| !branch.is_empty());
    match branch {
        Some(branch) => vec![link(
            ctx.web_url(&format!("{}/tree/{branch}", ctx.repo_full_name)),
            branch,
        )],
        None => vec![ctx.repo_link()],
    }
}

fn release_text(ctx: &Context) -> String {
    let phrase = match ctx.action {
        Action::Published => "published release",
        Action::Edited => "edited release",
        _ => "did something with release",
    };
    phrase.to_string()
}

fn release_targets(ctx: &Context) -> Vec<TargetDescriptor> {
    let label = ctx
        .str_at("/release/tag_name")
        .or_else(|| ctx.str_at("/release/name"));
    let Some(label) = label else {
        return vec![placeholder()];
    };
    let href = ctx
        .str_at("/release/html_url")
        .map(str::to_string)
        .unwrap_or_else(|| ctx.web_url(&format!("{}/releases/tag/{label}", ctx.repo_full_name)));
    vec![titled(href, label, ctx.str_at("/release/name"))]
}

fn sponsorship_text(ctx: &Context) -> String {
    let phrase = match ctx.action {
        Action::Created => "added a sponsorship",
        Action::Edited => "edited their sponsorship",
        _ => "did something with their sponsorship",
    };
    phrase.to_string()
}

fn sponsorship_targets(ctx: &Context) -> Vec<TargetDescriptor> {
    let Some(login) = ctx.str_at("/sponsorship/sponsorable/login") else {
        return vec![placeholder()];
    };
    vec![TargetDescriptor::Link {
        href: ctx.web_url(&format!("sponsors/{login}")),
        label: login.to_string(),
        title: ctx.str_at("/sponsorship/tier/name").map(str::to_string),
        hovercard_subject: Some(login.to_string()),
    }]
}

fn watch_text(_: &Context) -> String {
    "starred the repository".to_string()
}

fn unknown_text(_: &Context) -> String {
    "did something".to_string()
}

fn repository_targets(ctx: &Context) -> Vec<TargetDescriptor> {
    vec![ctx.repo_link()]
}

fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn number(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn link(href: impl Into<String>, label: impl Into<String>) -> TargetDescriptor {
    TargetDescriptor::Link {
        href: href.into(),
        label: label.into(),
        title: None,
        hovercard_subject: None,
    }
}

fn titled(href: impl Into<String>, label: impl Into<String>, title: Option<&str>) -> TargetDescriptor {
    TargetDescriptor::Link {
        href: href.into(),
        label: label.into(),
        title: title.map(str::to_string),
        hovercard_subject: None,
    }
}

fn text(value: impl Into<String>) -> TargetDescriptor {
    TargetDescriptor::Text { value: value.into() }
}

fn placeholder() -> TargetDescriptor {
    text(NOT_ACCESSIBLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_and_unknown_actions() {
        assert_eq!(Action::parse(Some("opened")), Action::Opened);
        assert_eq!(Action::parse(Some("APPROVED")), Action::Approved);
        assert_eq!(Action::parse(Some("synchronized")), Action::Synchronize);
        assert_eq!(Action::parse(Some("synchronize")), Action::Synchronize);
        assert_eq!(Action::parse(Some("pinned")), Action::Other("pinned".to_string()));
        assert_eq!(Action::parse(None), Action::Other(String::new()));
    }

    #[test]
    fn web_url_joins_without_double_slashes() {
        let payload = Value::Null;
        let ctx = Context {
            payload: &payload,
            action: Action::parse(None),
            repo_full_name: "octo/hello",
            web_base_url: "https://github.com/",
        };
        assert_eq!(ctx.web_url("octo/hello"), "https://github.com/octo/hello");
        assert_eq!(ctx.web_url("/octo"), "https://github.com/octo");
    }
}
