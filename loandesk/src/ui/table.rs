//! Centre table renderer: one function per view, shared chrome.
//!
//! Renders from `AppState`'s list panes. Each application row shows a
//! selection mark, short id, applicant, product, amount, status badge, and
//! assigned reviewer. User rows show email, name, role, and account state.
//! When a pane has no rows the table body is a single placeholder line
//! matching the loading state, as the panes never hold stale rows.

use ratatui::{
    Frame,
    layout::Constraint,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Row, Table},
};

use loandesk_core::types::{LoanApplication, UserAccount};

use crate::app::{AppState, PanelFocus, View};
use crate::theme::Theme;
use crate::ui::layout::panel_block;

/// Renders the centre table for whichever view is active.
///
/// Uses `render_stateful_widget` so the highlight row tracks
/// `state.table_state` across fetches.
pub fn render_table(
    frame: &mut Frame,
    area: ratatui::layout::Rect,
    focus: PanelFocus,
    state: &mut AppState,
    theme: &Theme,
) {
    let is_focused = focus == PanelFocus::Table;
    let title = format!("{} ({})", state.view.title(), table_total(state));
    let block = panel_block(&title, is_focused, theme);

    let header_style = Style::default()
        .fg(theme.table_header)
        .add_modifier(Modifier::BOLD);
    let highlight = Style::default().add_modifier(Modifier::REVERSED);

    let table = match state.view {
        View::Applications => {
            let rows: Vec<Row> = if state.apps.rows().is_empty() {
                vec![placeholder_row(state.apps.loading(), 7)]
            } else {
                state
                    .apps
                    .rows()
                    .iter()
                    .map(|app| application_row(app, state, theme))
                    .collect()
            };
            Table::new(
                rows,
                [
                    Constraint::Length(4),
                    Constraint::Length(10),
                    Constraint::Fill(2),
                    Constraint::Length(8),
                    Constraint::Length(12),
                    Constraint::Length(13),
                    Constraint::Fill(1),
                ],
            )
            .header(
                Row::new(["sel", "id", "applicant", "product", "amount", "status", "reviewer"])
                    .style(header_style),
            )
        }
        View::Users => {
            let rows: Vec<Row> = if state.users.rows().is_empty() {
                vec![placeholder_row(state.users.loading(), 4)]
            } else {
                state
                    .users
                    .rows()
                    .iter()
                    .map(|user| user_row(user, theme))
                    .collect()
            };
            Table::new(
                rows,
                [
                    Constraint::Fill(2),
                    Constraint::Fill(2),
                    Constraint::Length(10),
                    Constraint::Length(8),
                ],
            )
            .header(Row::new(["email", "name", "role", "state"]).style(header_style))
        }
    }
    .block(block)
    .row_highlight_style(highlight);

    frame.render_stateful_widget(table, area, &mut state.table_state);
}

fn table_total(state: &AppState) -> u64 {
    match state.view {
        View::Applications => state.apps.meta().total,
        View::Users => state.users.meta().total,
    }
}

fn placeholder_row(loading: bool, width: usize) -> Row<'static> {
    let msg = if loading { "Loading..." } else { "No results" };
    let mut cells = vec![Cell::from(msg)];
    cells.resize_with(width, || Cell::from(""));
    Row::new(cells)
}

fn application_row<'a>(
    app: &'a LoanApplication,
    state: &AppState,
    theme: &Theme,
) -> Row<'a> {
    let mark = if state.selection.contains(&app.id) {
        Span::styled("[x]", Style::default().fg(theme.selected_mark))
    } else {
        Span::styled("[ ]", Style::default().fg(theme.dim))
    };
    let reviewer = match &app.reviewer {
        Some(name) => Span::raw(name.as_str()),
        None => Span::styled("unassigned", Style::default().fg(theme.dim)),
    };
    Row::new(vec![
        Cell::from(Line::from(mark)),
        Cell::from(app.id.as_str()),
        Cell::from(app.applicant_name.as_str()),
        Cell::from(app.product.label()),
        Cell::from(format!("{:>10.2}", app.amount)),
        Cell::from(Span::styled(
            app.status.label(),
            Style::default().fg(theme.status_color(app.status)),
        )),
        Cell::from(Line::from(reviewer)),
    ])
}

fn user_row<'a>(user: &'a UserAccount, theme: &Theme) -> Row<'a> {
    let state_cell = if user.active {
        Span::raw("active")
    } else {
        Span::styled("disabled", Style::default().fg(theme.dim))
    };
    Row::new(vec![
        Cell::from(user.email.as_str()),
        Cell::from(user.full_name.as_str()),
        Cell::from(user.role.label()),
        Cell::from(Line::from(state_cell)),
    ])
}
