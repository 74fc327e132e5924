//! loandesk — terminal admin console for the loan origination platform.
//!
//! Entry point for the `loandesk` binary. Wires together the terminal
//! lifecycle (`tui`), unified event bus (`event`), rendering (`ui`), theme
//! and config, the background network worker (`net`), the notification
//! poll schedule, and the local session/audit store (`loandesk-core`).
//!
//! # Startup sequence (order matters)
//!
//! 1. Load config and theme — read-only, safe before terminal init.
//! 2. Create the `.loandesk` data directory and point tracing at a log
//!    file there; the terminal itself must stay free of diagnostics.
//! 3. `install_panic_hook()` — installed before `init_tui()` so the
//!    terminal is restored before the panic message prints.
//! 4. `register_sigterm()` — returns `Arc<AtomicBool>` polled in the loop.
//! 5. `init_tui()` — enters alternate screen and enables raw mode.
//! 6. Open the WAL-mode SQLite store and resolve the console session
//!    before the first frame, so the audit log has its session id from
//!    the first bulk submit.
//! 7. Spawn the event task, the network worker, and the poll schedule.
//!
//! # Shutdown
//!
//! The event loop exits only via `break`, which guarantees the poll task
//! is aborted, the session timestamp is touched, and `restore_tui()` runs
//! on every normal path. The panic hook covers the panic path.

mod app;
mod config;
mod event;
mod net;
mod theme;
mod tui;
mod ui;

use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use loandesk_core::api::ApiClient;
use loandesk_core::{db, notify};

use crate::ui::keybindings::{self, KeyAction};

/// Directory holding the local store and the log file.
const DATA_DIR: &str = ".loandesk";

/// How many of this session's bulk actions the review-queue panel shows.
const AUDIT_DEPTH: u32 = 8;

/// Points tracing at `.loandesk/loandesk.log`.
///
/// `RUST_LOG` controls the filter (default `info`). ANSI is off — the log
/// is a plain file, read with `tail -f` while the TUI owns the terminal.
fn init_tracing() -> std::io::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(format!("{DATA_DIR}/loandesk.log"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Step 1: config + theme — read-only, safe before terminal init.
    let config = config::load();
    let theme = theme::Theme::from_name(&config.theme);

    // Step 2: data directory + file-backed tracing.
    std::fs::create_dir_all(DATA_DIR)?;
    init_tracing()?;
    tracing::info!(api_url = %config.api_url, "loandesk starting");

    // Step 3: panic hook installed first — innermost hook restores terminal.
    tui::install_panic_hook();

    // Step 4: SIGTERM flag — polled in the 50ms heartbeat arm below.
    let term_flag = tui::register_sigterm();

    // Step 5: enter alternate screen and raw mode.
    let mut terminal = tui::init_tui()?;

    // Step 6: open the store and resolve the console session before the
    // first frame.
    let conn: tokio_rusqlite::Connection = db::open_db(&format!("{DATA_DIR}/loandesk.db"))
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let session = db::open_or_create_session(&conn, &config.api_url, &config.operator)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let mut state = app::AppState::new(
        config.page_size,
        Duration::from_millis(config.debounce_ms),
        session.id.clone(),
    );
    // Resume the session's audit trail so the panel is populated from
    // the first frame.
    state.audit = db::recent_actions(&conn, &session.id, AUDIT_DEPTH)
        .await
        .unwrap_or_default();

    // Step 7: event task, network worker, poll schedule.
    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let mut rx = handler.rx;

    let (net_tx, net_rx) = tokio::sync::mpsc::unbounded_channel();
    net::worker::spawn_net_worker(
        ApiClient::new(&config.api_url, &config.api_token),
        net_rx,
        handler.tx.clone(),
    );
    state.net_tx = Some(net_tx);

    // The poll schedule fires immediately on start, then every poll_secs.
    // Held as a handle so shutdown can cancel it explicitly.
    let poll_handle = {
        let tx = handler.tx.clone();
        tokio::spawn(notify::poll_loop(
            Duration::from_secs(config.poll_secs),
            move || {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(event::AppEvent::Poll);
                }
            },
        ))
    };

    // Initial applications page + reviewer roster.
    state.start();

    // Event loop — exits only via `break`, never via `?` (other than draw
    // errors, which propagate out of the loop and still reach the restore
    // below through main's return path).
    'event_loop: loop {
        tokio::select! {
            // Heartbeat: guarantees SIGTERM is checked at least every 50ms,
            // even when no crossterm/tick/render events arrive.
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(event::AppEvent::Render) => {
                        // Exactly one draw() call per Render event.
                        terminal.draw(|frame| ui::render(frame, &mut state, &theme))?;
                    }
                    Some(event::AppEvent::Key(key)) => {
                        if keybindings::handle_key(key, &mut state, Instant::now())
                            == KeyAction::Quit
                        {
                            break 'event_loop;
                        }
                    }
                    Some(event::AppEvent::Mouse(mouse)) => {
                        keybindings::handle_mouse(mouse, &mut state);
                    }
                    Some(event::AppEvent::Tick) => {
                        state.on_tick(Instant::now());
                    }
                    Some(event::AppEvent::Poll) => {
                        state.poll_notifications();
                    }
                    Some(event::AppEvent::Net(result)) => {
                        if let Some(entry) = state.apply_net(*result) {
                            // Audit writes happen off the event loop; a
                            // failed write is logged, never surfaced. After
                            // the write the trail is re-read and pushed back
                            // through the event bus for the panel.
                            let conn = conn.clone();
                            let events = handler.tx.clone();
                            let session_id = entry.session_id.clone();
                            tokio::spawn(async move {
                                if let Err(e) = db::record_bulk_action(&conn, entry).await {
                                    tracing::error!(error = %e, "audit log write failed");
                                    return;
                                }
                                match db::recent_actions(&conn, &session_id, AUDIT_DEPTH).await {
                                    Ok(actions) => {
                                        let _ = events
                                            .send(event::AppEvent::AuditRefreshed(actions));
                                    }
                                    Err(e) => {
                                        tracing::error!(error = %e, "audit log read failed");
                                    }
                                }
                            });
                        }
                    }
                    Some(event::AppEvent::AuditRefreshed(actions)) => {
                        state.audit = actions;
                    }
                    Some(event::AppEvent::Resize(_, _)) => {
                        // Handled automatically by ratatui on the next
                        // Render: frame.area() returns the new size.
                    }
                    Some(event::AppEvent::Quit) | None => break 'event_loop,
                    Some(_) => {}
                }
                // Check SIGTERM after every event too, not just on the
                // heartbeat, so quit latency is at most one event cycle.
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    // Cancel the poll schedule: no timer may outlive the console.
    poll_handle.abort();

    // Stamp the session so the next launch resumes it.
    if let Err(e) = db::touch_session(&conn, &session.id).await {
        tracing::warn!(error = %e, "failed to touch session on exit");
    }

    // Restore the terminal at the single exit point of the loop.
    tui::restore_tui()?;
    Ok(())
}
