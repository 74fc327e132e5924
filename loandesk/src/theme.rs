//! Color theme system for loandesk.
//!
//! A `Theme` holds named `ratatui::style::Color` fields covering every UI
//! surface the console renders. Two built-in themes are provided:
//!
//! - `dark` — uses ANSI 16 colors (`Color::Reset`, `Color::DarkGray`, etc.)
//!   so it works on any terminal including 256-color SSH sessions with no
//!   truecolor support.
//! - `catppuccin_mocha` — Catppuccin Mocha palette in RGB; requires truecolor.

use ratatui::style::Color;

use loandesk_core::types::ApplicationStatus;

/// All color values used across the console's UI surfaces.
///
/// Every field is a `ratatui::style::Color`. Callers use `theme.field`
/// directly inside `Style::default().fg(theme.border_active)`.
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    /// Border color for the currently focused panel.
    pub border_active: Color,
    /// Border color for unfocused panels.
    pub border_inactive: Color,

    // Table
    /// Header row of the applications/users table.
    pub table_header: Color,
    /// Selection checkbox mark for checked rows.
    pub selected_mark: Color,
    /// De-emphasised cells (unset reviewer, inactive account).
    pub dim: Color,

    // Application status colors
    pub status_draft: Color,
    pub status_submitted: Color,
    pub status_under_review: Color,
    pub status_approved: Color,
    pub status_rejected: Color,

    // Notification panel
    /// The pending-review headline count.
    pub pending_badge: Color,
    /// Activity feed text.
    pub activity: Color,

    // Modals
    /// Inline validation/submit error text.
    pub modal_error: Color,
    /// Field label of the currently focused modal field.
    pub modal_field_active: Color,

    // Status bar
    /// Status bar background.
    pub status_bar_bg: Color,
    /// Status bar foreground (general text).
    pub status_bar_fg: Color,
    /// Mode indicator color in NORMAL mode.
    pub status_mode_normal: Color,
    /// Mode indicator color in SEARCH mode.
    pub status_mode_search: Color,
    /// Mode indicator color while a modal is open.
    pub status_mode_modal: Color,

    // General
    /// Application background (used for clearing areas).
    pub background: Color,
}

impl Theme {
    /// Returns the built-in dark theme using ANSI 16 colors.
    ///
    /// Works on all terminals: 16-color, 256-color, and truecolor. Suitable
    /// as the default when no config is present or color capability is unknown.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            table_header: Color::White,
            selected_mark: Color::Green,
            dim: Color::DarkGray,

            status_draft: Color::DarkGray,
            status_submitted: Color::Yellow,
            status_under_review: Color::Cyan,
            status_approved: Color::Green,
            status_rejected: Color::Red,

            pending_badge: Color::Yellow,
            activity: Color::Reset,

            modal_error: Color::Red,
            modal_field_active: Color::Cyan,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode_normal: Color::Cyan,
            status_mode_search: Color::Green,
            status_mode_modal: Color::Yellow,

            background: Color::Reset,
        }
    }

    /// Returns the Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// Requires a truecolor terminal. Colors degrade to the nearest ANSI
    /// 256-color approximation on non-truecolor terminals; use `dark()`
    /// over SSH when fidelity matters.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        // Catppuccin Mocha palette (selected subset)
        let green = Color::Rgb(166, 227, 161);    // #a6e3a1
        let red = Color::Rgb(243, 139, 168);      // #f38ba8
        let yellow = Color::Rgb(249, 226, 175);   // #f9e2af
        let teal = Color::Rgb(148, 226, 213);     // #94e2d5
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface1 = Color::Rgb(69, 71, 90);    // #45475a
        let base = Color::Rgb(30, 30, 46);        // #1e1e2e
        let text = Color::Rgb(205, 214, 244);     // #cdd6f4
        let peach = Color::Rgb(250, 179, 135);    // #fab387

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            table_header: text,
            selected_mark: green,
            dim: overlay1,

            status_draft: overlay1,
            status_submitted: yellow,
            status_under_review: teal,
            status_approved: green,
            status_rejected: red,

            pending_badge: peach,
            activity: text,

            modal_error: red,
            modal_field_active: lavender,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode_normal: lavender,
            status_mode_search: green,
            status_mode_modal: peach,

            background: base,
        }
    }

    /// The color for an application status badge.
    pub fn status_color(&self, status: ApplicationStatus) -> Color {
        match status {
            ApplicationStatus::Draft => self.status_draft,
            ApplicationStatus::Submitted => self.status_submitted,
            ApplicationStatus::UnderReview => self.status_under_review,
            ApplicationStatus::Approved => self.status_approved,
            ApplicationStatus::Rejected => self.status_rejected,
        }
    }

    /// Resolves a theme name string to the corresponding built-in theme.
    ///
    /// Unknown names fall back to `dark()` so a typo in config never
    /// prevents startup. The fallback is logged to stderr (not a hard error).
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                eprintln!("loandesk: unknown theme '{}', falling back to 'dark'", other);
                Self::dark()
            }
        }
    }
}
