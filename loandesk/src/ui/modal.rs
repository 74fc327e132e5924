//! Bulk-action modal renderers.
//!
//! Both modals draw as a centred overlay above the panel layout using the
//! `Clear` widget, inside the same `terminal.draw()` closure as everything
//! else. The widgets are a pure projection of the core state machines in
//! `loandesk_core::bulk` — all transitions happen in the key dispatcher.

use ratatui::{
    Frame,
    layout::Constraint,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use loandesk_core::types::ReasonCode;

use crate::app::{AppState, ModalField};
use crate::theme::Theme;

/// Renders the bulk status-change modal when it is open.
pub fn render_status_modal(frame: &mut Frame, state: &AppState, theme: &Theme) {
    let Some(draft) = state.status_modal.draft() else {
        return;
    };
    let submitting = state.status_modal.is_submitting();
    let area = overlay_area(frame);
    if area.width == 0 {
        return;
    }
    frame.render_widget(Clear, area);

    let title = format!(" Change status — {} application(s) ", draft.ids.len());
    let block = Block::bordered()
        .title(title)
        .border_style(Style::default().fg(theme.border_active));

    let reason_allowed = draft
        .status
        .map(ReasonCode::allowed_for)
        .unwrap_or_default();

    let mut lines = vec![
        field_line(
            "Status",
            draft
                .status
                .map(|s| s.label().to_owned())
                .unwrap_or_else(|| "choose…".to_owned()),
            state.modal_field == ModalField::Status && !submitting,
            theme,
        ),
    ];
    if !reason_allowed.is_empty() {
        lines.push(field_line(
            "Reason",
            draft
                .reason
                .map(|r| r.label().to_owned())
                .unwrap_or_else(|| "(none)".to_owned()),
            state.modal_field == ModalField::Reason && !submitting,
            theme,
        ));
    }
    lines.push(field_line(
        "Comment",
        format!("{}▏", draft.comment),
        state.modal_field == ModalField::Comment && !submitting,
        theme,
    ));
    lines.push(Line::raw(""));

    if let Some(error) = &draft.error {
        lines.push(Line::styled(
            format!(" {error}"),
            Style::default().fg(theme.modal_error),
        ));
    }
    if submitting {
        lines.push(Line::styled(
            " Submitting batch…",
            Style::default().fg(theme.dim),
        ));
    } else {
        lines.push(Line::styled(
            " ←/→ change · Tab/↓ next field · Enter submit · Esc cancel",
            Style::default().fg(theme.dim),
        ));
    }

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

/// Renders the reviewer-assignment modal when it is open.
pub fn render_assign_modal(frame: &mut Frame, state: &AppState, theme: &Theme) {
    let Some(draft) = state.assign_modal.draft() else {
        return;
    };
    let submitting = state.assign_modal.is_submitting();
    let area = overlay_area(frame);
    if area.width == 0 {
        return;
    }
    frame.render_widget(Clear, area);

    let title = format!(" Assign reviewer — {} application(s) ", draft.ids.len());
    let block = Block::bordered()
        .title(title)
        .border_style(Style::default().fg(theme.border_active));

    let mut lines: Vec<Line> = Vec::new();
    if state.roster.is_empty() {
        lines.push(Line::styled(
            " no reviewers available",
            Style::default().fg(theme.dim),
        ));
    }
    for (idx, reviewer) in state.roster.iter().enumerate() {
        let chosen = draft.reviewer_id == reviewer.id;
        let cursor = idx == state.roster_choice && !submitting;
        let marker = if chosen { "●" } else { "○" };
        let style = if cursor {
            Style::default()
                .fg(theme.modal_field_active)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::styled(
            format!(" {} {}", marker, reviewer.name),
            style,
        ));
    }
    lines.push(Line::raw(""));

    if let Some(error) = &draft.error {
        lines.push(Line::styled(
            format!(" {error}"),
            Style::default().fg(theme.modal_error),
        ));
    }
    if submitting {
        lines.push(Line::styled(
            " Submitting batch…",
            Style::default().fg(theme.dim),
        ));
    } else {
        lines.push(Line::styled(
            " j/k choose · Enter assign · Esc cancel",
            Style::default().fg(theme.dim),
        ));
    }

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

/// Renders the quit-confirmation dialog shown when quitting would discard
/// a non-empty selection.
pub fn render_confirm_quit(frame: &mut Frame, state: &AppState, theme: &Theme) {
    if frame.area().width < 50 {
        return;
    }
    let area = frame
        .area()
        .centered(Constraint::Length(50), Constraint::Length(4));
    frame.render_widget(Clear, area);

    let block = Block::bordered()
        .title(" Quit? ")
        .border_style(Style::default().fg(theme.border_active));
    let lines = vec![
        Line::raw(format!(
            " {} selected row(s) will be discarded.",
            state.selection.count()
        )),
        Line::styled(" y to quit · n / Esc to stay", Style::default().fg(theme.dim)),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Centred overlay rect; collapses to zero width on very narrow terminals
/// so the caller can skip rendering instead of panicking on a tiny `Rect`.
fn overlay_area(frame: &Frame) -> ratatui::layout::Rect {
    if frame.area().width < 50 {
        return ratatui::layout::Rect::default();
    }
    frame
        .area()
        .centered(Constraint::Percentage(55), Constraint::Percentage(50))
}

fn field_line(label: &str, value: String, focused: bool, theme: &Theme) -> Line<'static> {
    let label_style = if focused {
        Style::default()
            .fg(theme.modal_field_active)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let marker = if focused { "▸" } else { " " };
    Line::from(vec![
        Span::styled(format!("{marker} {label:<8}"), label_style),
        Span::raw(value),
    ])
}
