//! Responsive 3-panel layout engine for loandesk.
//!
//! This module is pure layout arithmetic — no mutable application state
//! lives here. It is called inside `terminal.draw()` on every render so
//! every frame gets a fresh layout that automatically reflects the current
//! terminal size.
//!
//! # Panel geometry
//!
//! At `>= 110` columns all three panels are visible: notifications 24%,
//! table 46%, detail 30%. Below 110 columns both side panels collapse and
//! the table fills the full width. `Spacing::Overlap(1)` combined with
//! `Block::merge_borders(MergeStrategy::Fuzzy)` makes adjacent panel
//! borders share a single column and merge their junction characters.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use crate::app::{AppState, Mode};
use crate::theme::Theme;

/// Returns `[left, center, right, status_bar]` panel `Rect`s for the
/// current frame.
///
/// Called inside `terminal.draw()` on every render. The returned rects are
/// valid only for the current draw closure — never store them across frames.
pub fn compute_layout(frame: &Frame) -> [Rect; 4] {
    let term_width = frame.area().width;

    // Vertical split: main area (fills remaining height) + 1-row status bar.
    let [main_area, status_bar] =
        frame.area().layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]));

    // Horizontal split: collapse side panels when the terminal is narrow.
    let horizontal = if term_width >= 110 {
        Layout::horizontal([
            Constraint::Percentage(24),
            Constraint::Percentage(46),
            Constraint::Percentage(30),
        ])
        .spacing(Spacing::Overlap(1))
    } else {
        Layout::horizontal([
            Constraint::Length(0),
            Constraint::Fill(1),
            Constraint::Length(0),
        ])
        .spacing(Spacing::Overlap(1))
    };

    let [left, center, right] = main_area.layout(&horizontal);

    [left, center, right, status_bar]
}

/// Returns the inner `Rect` of a panel after removing the 1-cell border on
/// each side. Used to cache the table viewport height before rendering.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Builds a bordered `Block` for a panel.
///
/// Applies `BorderType::Thick` when the panel is focused and
/// `BorderType::Plain` otherwise. `MergeStrategy::Fuzzy` is required when
/// mixing `Thick` and `Plain` borders — `Exact` produces broken junctions.
pub fn panel_block<'a>(title: &'a str, is_focused: bool, theme: &'a Theme) -> Block<'a> {
    let border_style = if is_focused {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_focused { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Fuzzy)
}

/// Renders the 1-row status bar at the bottom of the terminal.
///
/// Left to right: mode indicator, active view with its page cursor,
/// selection count, a fetch spinner while a list request is in flight,
/// then any transient message. `HelpOverlay` and `ConfirmQuit` display
/// `NORMAL` — they are transient layers over normal mode.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let (mode_text, mode_fg) = match state.mode {
        Mode::Search => (" SEARCH ", theme.status_mode_search),
        Mode::StatusModal | Mode::AssignModal => (" MODAL ", theme.status_mode_modal),
        Mode::Normal | Mode::HelpOverlay | Mode::ConfirmQuit => {
            (" NORMAL ", theme.status_mode_normal)
        }
    };

    let mut spans = vec![Span::styled(
        mode_text,
        Style::default().fg(mode_fg).add_modifier(Modifier::BOLD),
    )];

    let (meta, loading) = match state.view {
        crate::app::View::Applications => (state.apps.meta(), state.apps.loading()),
        crate::app::View::Users => (state.users.meta(), state.users.loading()),
    };
    spans.push(Span::raw(format!(
        " {}  page {}/{}  {} total",
        state.view.title(),
        meta.page,
        meta.total_pages.max(1),
        meta.total
    )));

    if state.mode == Mode::Search || !state.current_search().is_empty() {
        spans.push(Span::raw(format!("  /{}", state.current_search())));
    }
    if let Some(filter) = state.current_filter() {
        spans.push(Span::raw(format!("  [{}]", filter)));
    }
    if state.selection.count() > 0 {
        spans.push(Span::styled(
            format!("  {} selected", state.selection.count()),
            Style::default().fg(theme.selected_mark),
        ));
    }
    if loading {
        spans.push(Span::styled("  fetching…", Style::default().fg(theme.dim)));
    }
    if let Some(message) = &state.status_message {
        spans.push(Span::raw("  — "));
        spans.push(Span::raw(message.clone()));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}
