use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Borders, Cell, Row, Table, TableState};

use hostop::format::{format_elapsed, format_kb, truncate_unicode};
use hostop::system::process::ProcessRecord;

use crate::ui::theme::Theme;

const HEADERS: [&str; 8] = ["PID", "PPID", "S", "NAME", "MEM", "CPU%", "TIME", "K"];
const NAME_WIDTH: u16 = 28;

pub fn render<'a>(
    frame: &mut Frame,
    area: Rect,
    processes: impl Iterator<Item = &'a ProcessRecord>,
    selected: usize,
    error: Option<&str>,
    theme: &Theme,
) {
    let header = Row::new(HEADERS.map(|h| {
        Cell::from(h).style(
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let rows: Vec<Row> = processes.map(|p| process_row(p, theme)).collect();
    let empty = rows.is_empty();

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border));
    if let Some(error) = error {
        block = block.title_bottom(Span::styled(
            format!(" {error} "),
            Style::default().fg(theme.status_err),
        ));
    }

    let table = Table::new(
        rows,
        [
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(1),
            Constraint::Min(NAME_WIDTH),
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Length(1),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(
        Style::default()
            .fg(theme.selection_fg)
            .bg(theme.selection_bg)
            .add_modifier(Modifier::BOLD),
    );

    let mut state = TableState::default().with_selected((!empty).then_some(selected));
    frame.render_stateful_widget(table, area, &mut state);
}

fn process_row<'a>(p: &ProcessRecord, theme: &Theme) -> Row<'a> {
    let name_style = if p.is_kernel {
        Style::default().fg(theme.kernel_fg)
    } else {
        Style::default().fg(theme.text_primary)
    };
    Row::new(vec![
        Cell::from(p.pid.to_string()),
        Cell::from(p.ppid.to_string()),
        Cell::from(p.state.to_string()),
        Cell::from(truncate_unicode(&p.name, 40)).style(name_style),
        Cell::from(format_kb(p.memory_kb)),
        Cell::from(format!("{:.1}", p.cpu_percent))
            .style(Style::default().fg(theme.cpu_color(p.cpu_percent))),
        Cell::from(format_elapsed(p.elapsed_secs)),
        Cell::from(if p.is_kernel { "k" } else { "" }),
    ])
    .style(Style::default().fg(theme.text_primary))
}
