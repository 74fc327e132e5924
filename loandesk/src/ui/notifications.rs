//! Notification panel renderer: review queue counts and recent activity.
//!
//! Renders from `AppState.notifications`, which the 60-second poll
//! refreshes in the background. Until the first poll lands the panel shows
//! a loading placeholder; a failed poll leaves the previous snapshot on
//! screen with a warning line underneath.

use ratatui::{
    Frame,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use loandesk_core::bulk::split_reason_prefix;
use loandesk_core::types::ActionLogEntry;

use crate::app::{AppState, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

/// Renders the left panel: pending-review headline, per-status buckets,
/// then the recent-activity feed.
pub fn render_notifications(
    frame: &mut Frame,
    area: ratatui::layout::Rect,
    focus: PanelFocus,
    state: &AppState,
    theme: &Theme,
) {
    let is_focused = focus == PanelFocus::Notifications;
    let block = panel_block("Review queue", is_focused, theme);
    let inner = inner_rect(area);
    frame.render_widget(block, area);

    let snapshot = &state.notifications;
    let mut lines: Vec<Line> = Vec::new();

    if !snapshot.loaded {
        lines.push(Line::styled("  waiting for first poll…", Style::default().fg(theme.dim)));
    } else {
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {} pending review", snapshot.pending_count()),
                Style::default()
                    .fg(theme.pending_badge)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::raw(""));
        for bucket in &snapshot.buckets {
            lines.push(Line::from(vec![
                Span::styled(
                    format!(" {:<13}", bucket.status.label()),
                    Style::default().fg(theme.status_color(bucket.status)),
                ),
                Span::raw(bucket.count.to_string()),
            ]));
        }
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            " Recent activity",
            Style::default().add_modifier(Modifier::BOLD),
        ));
        for entry in &snapshot.activity {
            lines.push(Line::from(vec![
                Span::styled(
                    format!(" {} ", entry.created_at.format("%H:%M")),
                    Style::default().fg(theme.dim),
                ),
                Span::styled(
                    format!("{}: ", entry.actor),
                    Style::default().fg(theme.activity).add_modifier(Modifier::BOLD),
                ),
                Span::styled(entry.message.clone(), Style::default().fg(theme.activity)),
            ]));
        }
    }

    if let Some(error) = &state.poll_error {
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            format!(" {error}"),
            Style::default().fg(theme.modal_error),
        ));
    }

    if !state.audit.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            " This session",
            Style::default().add_modifier(Modifier::BOLD),
        ));
        for entry in &state.audit {
            lines.push(audit_line(entry, theme));
        }
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

/// One line of the local audit trail, with the reason prefix decoded back
/// out of the stored comment.
fn audit_line(entry: &ActionLogEntry, theme: &Theme) -> Line<'static> {
    let summary = match entry.kind.as_str() {
        "assign_reviewer" => format!("assigned {} app(s)", entry.application_ids.len()),
        _ => {
            let (reason, _) = split_reason_prefix(&entry.comment);
            match reason {
                Some(reason) => format!(
                    "{} ({}) × {}",
                    entry.detail.to_lowercase(),
                    reason,
                    entry.application_ids.len()
                ),
                None => format!(
                    "{} × {}",
                    entry.detail.to_lowercase(),
                    entry.application_ids.len()
                ),
            }
        }
    };
    let outcome_style = if entry.outcome == "accepted" {
        Style::default().fg(theme.selected_mark)
    } else {
        Style::default().fg(theme.modal_error)
    };
    Line::from(vec![
        Span::styled(format!(" {} ", entry.outcome), outcome_style),
        Span::styled(summary, Style::default().fg(theme.activity)),
    ])
}
