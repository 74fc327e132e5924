//! Help overlay renderer for loandesk.
//!
//! Provides `render_help_overlay()` which draws a centred modal box over
//! the existing panel layout using ratatui's `Clear` widget to erase the
//! background first. The overlay is rendered inside the same
//! `terminal.draw()` closure as all other panels.

use ratatui::{
    Frame,
    layout::Constraint,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;

/// Renders the help overlay as a centred modal on top of the 3-panel layout.
///
/// Erases the overlay area with `Clear`, then draws a bordered `Block` and
/// a `Paragraph` containing all keybinding descriptions. The paragraph
/// scrolls vertically by `help_scroll` rows for short terminals.
///
/// If the terminal is narrower than 60 columns the overlay is skipped to
/// avoid a zero-height `Rect` panic.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 60 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(80), Constraint::Percentage(80));

    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help  — j/k scroll, ? or Esc to dismiss ")
        .border_style(ratatui::style::Style::default().fg(theme.border_active));

    let help_text = build_help_text();

    frame.render_widget(
        Paragraph::new(help_text)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

/// Builds the help text as a multi-line `Text` value, grouped by section.
fn build_help_text() -> Text<'static> {
    Text::from(vec![
        Line::from("Navigation"),
        Line::from("  j / k         Move row highlight down / up"),
        Line::from("  g / G         Jump to first / last row"),
        Line::from("  Ctrl-d / u    Move half a page down / up"),
        Line::from("  H / L         Move panel focus left / right"),
        Line::from("  Tab           Switch between Applications and Users"),
        Line::from(""),
        Line::from("List"),
        Line::from("  /             Edit the search text (Enter or Esc to finish)"),
        Line::from("  f / F         Cycle / clear the status or role filter"),
        Line::from("  n / p         Next / previous page"),
        Line::from("  R             Refresh the current view now"),
        Line::from(""),
        Line::from("Selection  (Applications only)"),
        Line::from("  Space         Toggle selection of the highlighted row"),
        Line::from("  a             Select every row on this page"),
        Line::from("  u             Clear the selection"),
        Line::from(""),
        Line::from("Bulk actions  (require a non-empty selection)"),
        Line::from("  s             Change status of the selected applications"),
        Line::from("  r             Assign a reviewer to the selected applications"),
        Line::from(""),
        Line::from("Inside a modal"),
        Line::from("  Tab / Up/Down Move between fields"),
        Line::from("  Left / Right  Change the focused field's value"),
        Line::from("  Enter         Submit the batch"),
        Line::from("  Esc           Cancel without sending"),
        Line::from(""),
        Line::from("General"),
        Line::from("  ?             Open / close this help overlay"),
        Line::from("  q / Esc       Quit (confirms if a selection exists)"),
    ])
}
