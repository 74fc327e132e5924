//! UI rendering module for loandesk.
//!
//! This is the module root for `ui/`. It re-exports `render()` as the
//! single entry point called by the event loop's `terminal.draw()` closure.
//!
//! All layout arithmetic lives in `layout.rs`. The centre table lives in
//! `table.rs`, the notification panel in `notifications.rs`, the detail
//! card in `detail.rs`, and the bulk-action modals in `modal.rs`.

mod layout;
pub mod detail;
pub mod help;
pub mod keybindings;
pub mod modal;
pub mod notifications;
pub mod table;

use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::Frame;

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use layout::{compute_layout, inner_rect, render_status_bar};

/// Renders one complete frame: 3-panel layout, modals, and status bar.
///
/// Called exactly once per `AppEvent::Render` inside `terminal.draw()`.
/// This is the only location where `terminal.draw()` is called in the
/// application — never call it from anywhere else.
///
/// After computing the layout, the table viewport height and the panel
/// rects are written back into `state` so the *next* keypress and mouse
/// click can use them. The one-frame lag is imperceptible in practice.
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    // Theme background first, under everything else.
    frame.render_widget(
        Block::new().style(Style::default().bg(theme.background)),
        frame.area(),
    );

    let [left, center, right, status_bar] = compute_layout(frame);

    // Cache geometry BEFORE rendering panels so it is available for the
    // next input cycle. inner_rect() strips the 1-cell border on each side.
    state.table_viewport_height = inner_rect(center).height;
    state.panel_rects = [left, center, right];

    let focus = state.focus;

    // Left panel: review queue (skip rendering if collapsed)
    if left.width > 0 {
        notifications::render_notifications(frame, left, focus, state, theme);
    }

    // Centre panel: the applications/users table (always visible)
    table::render_table(frame, center, focus, state, theme);

    // Right panel: detail card (skip rendering if collapsed)
    if right.width > 0 {
        detail::render_detail(frame, right, focus, state, theme);
    }

    // Status bar: always visible, 1 row.
    render_status_bar(frame, status_bar, state, theme);

    // Overlays render after all panels so they sit on top. Clear is called
    // inside each renderer to erase the background.
    match state.mode {
        Mode::StatusModal => modal::render_status_modal(frame, state, theme),
        Mode::AssignModal => modal::render_assign_modal(frame, state, theme),
        Mode::HelpOverlay => help::render_help_overlay(frame, theme, state.help_scroll),
        Mode::ConfirmQuit => modal::render_confirm_quit(frame, state, theme),
        Mode::Normal | Mode::Search => {}
    }
}
