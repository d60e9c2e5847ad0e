pub mod header;
pub mod help;
pub mod statusbar;
pub mod table;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::App;

/// Rows taken by the table's borders and column header.
const TABLE_CHROME_ROWS: u16 = 3;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    app.page_size = chunks[1].height.saturating_sub(TABLE_CHROME_ROWS).max(1) as usize;

    header::render(
        frame,
        chunks[0],
        header::HostLine {
            host: app.current_host(),
            index: app.registry.current_index(),
            total: app.registry.len(),
        },
        &app.snapshot,
        app.sort_mode,
        &app.theme,
    );

    table::render(
        frame,
        chunks[1],
        app.visible_processes(),
        app.selected_index,
        app.last_error.as_deref(),
        &app.theme,
    );

    statusbar::render(
        frame,
        chunks[2],
        statusbar::StatusContext {
            input_mode: app.input_mode,
            filter_text: &app.filter_text,
            status_message: app.status_message.as_ref(),
            poll_error: app.last_error.as_deref(),
            show_kernel_threads: app.show_kernel_threads,
            keybinds: &app.keybinds,
        },
        &app.theme,
    );

    // Help overlay, rendered last to appear on top
    if app.show_help() {
        help::render(
            frame,
            frame.area(),
            &app.help_entries(),
            app.registry.hosts(),
            app.registry.current_index(),
            &app.theme,
        );
    }
}
