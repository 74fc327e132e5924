//! Keybinding dispatcher for loandesk.
//!
//! Translates raw crossterm `KeyEvent`s into `AppState` mutations and
//! returns a `KeyAction` telling the event loop whether to continue or
//! quit. The dispatcher branches first on `state.mode` so that Search,
//! the two modals, HelpOverlay, and ConfirmQuit all have isolated handler
//! functions. Handlers that edit a list query take `now` so the debounce
//! timers are armed against the same clock the tick handler fires them with.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

use loandesk_core::types::ReasonCode;

use crate::app::{AppState, ModalField, Mode, PanelFocus};

/// Control-flow signal returned from the key dispatcher.
///
/// The event loop checks this after every keypress: `Quit` tears down the
/// terminal and exits; `Continue` immediately requests another render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Continue the event loop normally — request another render.
    Continue,
    /// Exit cleanly.
    Quit,
}

/// Dispatches a key event to the handler matching the current mode.
///
/// Mutates `state` in place and returns a `KeyAction` signalling whether
/// to continue or quit.
pub fn handle_key(key: KeyEvent, state: &mut AppState, now: Instant) -> KeyAction {
    // Any keypress retires the previous transient status message.
    state.status_message = None;

    match state.mode {
        Mode::Normal => handle_normal(key, state, now),
        Mode::Search => handle_search(key, state, now),
        Mode::StatusModal => handle_status_modal(key, state),
        Mode::AssignModal => handle_assign_modal(key, state),
        Mode::HelpOverlay => handle_help(key, state),
        Mode::ConfirmQuit => handle_confirm_quit(key, state),
    }
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

/// Handles a key event while in Normal mode: row navigation, selection,
/// paging, filters, view switching, and modal entry.
fn handle_normal(key: KeyEvent, state: &mut AppState, now: Instant) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        // Row navigation
        KeyCode::Char('j') | KeyCode::Down => state.select_next_row(),
        KeyCode::Char('k') | KeyCode::Up => state.select_prev_row(),
        KeyCode::Char('g') => state.select_first_row(),
        KeyCode::Char('G') => state.select_last_row(),
        KeyCode::Char('d') if ctrl => state.half_page_down(),
        KeyCode::Char('u') if ctrl => state.half_page_up(),

        // Panel focus
        KeyCode::Char('H') => state.focus = state.focus.prev(),
        KeyCode::Char('L') => state.focus = state.focus.next(),

        // View switching
        KeyCode::Tab => state.switch_view(),

        // Selection (applications only; the methods no-op elsewhere)
        KeyCode::Char(' ') => state.toggle_current(),
        KeyCode::Char('a') => state.select_all_visible(),
        KeyCode::Char('u') => state.clear_selection(),

        // Query editing
        KeyCode::Char('/') => state.mode = Mode::Search,
        KeyCode::Char('f') => state.cycle_filter(now),
        KeyCode::Char('F') => state.clear_filter(now),
        KeyCode::Char('n') => state.page_step(1, now),
        KeyCode::Char('p') => state.page_step(-1, now),
        KeyCode::Char('R') => state.refresh_current(),

        // Bulk actions
        KeyCode::Char('s') => state.open_status_modal(),
        KeyCode::Char('r') => state.open_assign_modal(),

        // Help overlay
        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
        }

        // Quit / confirm-quit
        KeyCode::Char('q') | KeyCode::Esc => {
            if state.selection.count() > 0 {
                state.mode = Mode::ConfirmQuit;
            } else {
                return KeyAction::Quit;
            }
        }

        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Search mode
// ---------------------------------------------------------------------------

/// Handles a key event while the search box is being edited.
///
/// Every character edit arms the pane's debounce timer; the fetch itself
/// fires from the tick handler once the input has been quiet for the
/// configured window. Enter and Esc both leave search mode — the query
/// stays as typed either way.
fn handle_search(key: KeyEvent, state: &mut AppState, now: Instant) -> KeyAction {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => state.mode = Mode::Normal,
        KeyCode::Backspace => state.search_pop(now),
        KeyCode::Char(ch) => state.search_push(ch, now),
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Status-change modal
// ---------------------------------------------------------------------------

/// Handles a key event while the bulk status-change modal is open.
///
/// While a batch is in flight all input is ignored — the request was
/// already sent once and its outcome decides the next state.
fn handle_status_modal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if state.status_modal.is_submitting() {
        return KeyAction::Continue;
    }

    let reason_available = state
        .status_modal
        .draft()
        .and_then(|d| d.status)
        .map(|s| !ReasonCode::allowed_for(s).is_empty())
        .unwrap_or(false);

    match key.code {
        KeyCode::Esc => state.cancel_modal(),
        KeyCode::Enter => state.submit_status_modal(),

        KeyCode::Tab | KeyCode::Down => {
            state.modal_field = next_field(state.modal_field, reason_available, true);
        }
        KeyCode::BackTab | KeyCode::Up => {
            state.modal_field = next_field(state.modal_field, reason_available, false);
        }

        KeyCode::Left => cycle_focused_field(state, -1),
        KeyCode::Right => cycle_focused_field(state, 1),

        KeyCode::Backspace if state.modal_field == ModalField::Comment => {
            state.status_modal.pop_comment_char();
        }
        KeyCode::Char(ch) if state.modal_field == ModalField::Comment => {
            state.status_modal.push_comment_char(ch);
        }
        // Field navigation shorthand outside the comment editor.
        KeyCode::Char('j') => {
            state.modal_field = next_field(state.modal_field, reason_available, true);
        }
        KeyCode::Char('k') => {
            state.modal_field = next_field(state.modal_field, reason_available, false);
        }
        KeyCode::Char('h') => cycle_focused_field(state, -1),
        KeyCode::Char('l') => cycle_focused_field(state, 1),

        _ => {}
    }
    KeyAction::Continue
}

/// Steps the modal field cursor, skipping the reason field when the chosen
/// status admits no reason codes.
fn next_field(field: ModalField, reason_available: bool, forward: bool) -> ModalField {
    let mut next = if forward { field.next() } else { field.prev() };
    if next == ModalField::Reason && !reason_available {
        next = if forward { next.next() } else { next.prev() };
    }
    next
}

fn cycle_focused_field(state: &mut AppState, step: i32) {
    match state.modal_field {
        ModalField::Status => state.cycle_modal_status(step),
        ModalField::Reason => state.cycle_modal_reason(step),
        ModalField::Comment => {}
    }
}

// ---------------------------------------------------------------------------
// Reviewer-assignment modal
// ---------------------------------------------------------------------------

/// Handles a key event while the reviewer-assignment modal is open.
fn handle_assign_modal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if state.assign_modal.is_submitting() {
        return KeyAction::Continue;
    }
    match key.code {
        KeyCode::Esc => state.cancel_modal(),
        KeyCode::Enter => state.submit_assign_modal(),
        KeyCode::Char('j') | KeyCode::Down => state.cycle_roster(1),
        KeyCode::Char('k') | KeyCode::Up => state.cycle_roster(-1),
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// HelpOverlay mode
// ---------------------------------------------------------------------------

/// Handles a key event while the help overlay is visible.
///
/// Any of `?`, `Esc`, or `q` dismisses the overlay and returns to Normal
/// mode. All other keys scroll or are silently ignored.
fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') => state.help_scroll = state.help_scroll.saturating_add(1),
        KeyCode::Char('k') => state.help_scroll = state.help_scroll.saturating_sub(1),
        KeyCode::Char('g') => state.help_scroll = 0,
        KeyCode::Char('G') => state.help_scroll = u16::MAX,
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.mode = Mode::Normal,
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// ConfirmQuit mode
// ---------------------------------------------------------------------------

/// Handles a key event while the quit-confirmation dialog is active.
///
/// `y` / `Y` confirms the quit. `n` / `N` / `Esc` cancels and returns to
/// Normal mode with the selection intact.
fn handle_confirm_quit(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => KeyAction::Quit,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            state.mode = Mode::Normal;
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Handles a mouse event: click-to-focus and scroll-wheel.
///
/// Left click on a panel sets focus to that panel. Scroll wheel moves the
/// table highlight (or the help overlay) by 3 rows, matching typical
/// terminal scroll speed. Mouse input is ignored while a modal is open.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) -> KeyAction {
    if matches!(state.mode, Mode::StatusModal | Mode::AssignModal | Mode::ConfirmQuit) {
        return KeyAction::Continue;
    }
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            handle_mouse_click(mouse.column, mouse.row, state)
        }
        MouseEventKind::ScrollUp => handle_mouse_scroll(state, false),
        MouseEventKind::ScrollDown => handle_mouse_scroll(state, true),
        _ => KeyAction::Continue,
    }
}

/// Sets panel focus based on the clicked screen position.
///
/// Checks each cached panel rect in `state.panel_rects`. Panels with zero
/// width are skipped so collapsed panels cannot receive focus via click.
fn handle_mouse_click(col: u16, row: u16, state: &mut AppState) -> KeyAction {
    let pos = Position { x: col, y: row };
    let [left, center, right] = state.panel_rects;

    if left.width > 0 && left.contains(pos) {
        state.focus = PanelFocus::Notifications;
    } else if center.contains(pos) {
        state.focus = PanelFocus::Table;
    } else if right.width > 0 && right.contains(pos) {
        state.focus = PanelFocus::Detail;
    }

    KeyAction::Continue
}

/// Moves the highlight 3 rows per wheel notch; scrolls the help overlay
/// instead while it is shown.
fn handle_mouse_scroll(state: &mut AppState, down: bool) -> KeyAction {
    if state.mode == Mode::HelpOverlay {
        state.help_scroll = if down {
            state.help_scroll.saturating_add(3)
        } else {
            state.help_scroll.saturating_sub(3)
        };
    } else {
        for _ in 0..3 {
            if down {
                state.select_next_row();
            } else {
                state.select_prev_row();
            }
        }
    }
    KeyAction::Continue
}
