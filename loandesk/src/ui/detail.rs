//! Detail panel renderer: a card for the highlighted row.

use ratatui::{
    Frame,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use loandesk_core::types::{LoanApplication, UserAccount};

use crate::app::{AppState, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

/// Renders the right panel with the highlighted row's full record, or a
/// hint line when nothing is highlighted.
pub fn render_detail(
    frame: &mut Frame,
    area: ratatui::layout::Rect,
    focus: PanelFocus,
    state: &AppState,
    theme: &Theme,
) {
    let is_focused = focus == PanelFocus::Detail;
    let block = panel_block("Detail", is_focused, theme);
    let inner = inner_rect(area);
    frame.render_widget(block, area);

    let lines = if let Some(app) = state.current_application() {
        application_lines(app, state, theme)
    } else if let Some(user) = state.current_user() {
        user_lines(user, theme)
    } else {
        vec![Line::styled("  no row highlighted", Style::default().fg(theme.dim))]
    };

    frame.render_widget(Paragraph::new(lines), inner);
}

fn field(label: &str, value: Span<'static>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<12}"), Style::default().add_modifier(Modifier::BOLD)),
        value,
    ])
}

fn application_lines(
    app: &LoanApplication,
    state: &AppState,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let mut lines = vec![
        field("id", Span::raw(app.id.clone())),
        field("applicant", Span::raw(app.applicant_name.clone())),
        field(
            "business",
            match &app.business_name {
                Some(name) => Span::raw(name.clone()),
                None => Span::styled("—", Style::default().fg(theme.dim)),
            },
        ),
        field("product", Span::raw(app.product.label())),
        field("amount", Span::raw(format!("{:.2}", app.amount))),
        field(
            "status",
            Span::styled(
                app.status.label(),
                Style::default().fg(theme.status_color(app.status)),
            ),
        ),
        field(
            "reviewer",
            match &app.reviewer {
                Some(name) => Span::raw(name.clone()),
                None => Span::styled("unassigned", Style::default().fg(theme.dim)),
            },
        ),
    ];
    if let Some(submitted) = app.submitted_at {
        lines.push(field(
            "submitted",
            Span::raw(submitted.format("%Y-%m-%d %H:%M UTC").to_string()),
        ));
    }
    lines.push(field(
        "updated",
        Span::raw(app.updated_at.format("%Y-%m-%d %H:%M UTC").to_string()),
    ));
    if state.selection.contains(&app.id) {
        lines.push(Line::styled(
            "  selected for bulk action",
            Style::default().fg(theme.selected_mark),
        ));
    }
    lines
}

fn user_lines(user: &UserAccount, theme: &Theme) -> Vec<Line<'static>> {
    vec![
        field("id", Span::raw(user.id.clone())),
        field("email", Span::raw(user.email.clone())),
        field("name", Span::raw(user.full_name.clone())),
        field("role", Span::raw(user.role.label())),
        field(
            "state",
            if user.active {
                Span::raw("active")
            } else {
                Span::styled("disabled", Style::default().fg(theme.dim))
            },
        ),
        field(
            "created",
            Span::raw(user.created_at.format("%Y-%m-%d %H:%M UTC").to_string()),
        ),
    ]
}
