use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use hostop::host::HostConfig;
use hostop::system::snapshot::Snapshot;

use crate::app::SortMode;
use crate::ui::theme::Theme;

pub struct HostLine<'a> {
    pub host: &'a HostConfig,
    pub index: usize,
    pub total: usize,
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    host: HostLine<'_>,
    snapshot: &Snapshot,
    sort_mode: SortMode,
    theme: &Theme,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_host(frame, chunks[0], &host, theme);
    render_totals(frame, chunks[1], snapshot, sort_mode, theme);
}

fn render_host(frame: &mut Frame, area: Rect, host: &HostLine<'_>, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let target = if host.host.is_local {
        host.host.address.clone()
    } else {
        format!("{}:{}", host.host.login_target(), host.host.port)
    };
    let line = Line::from(vec![
        Span::styled(
            " hostop ",
            Style::default()
                .fg(theme.header_accent_fg)
                .bg(theme.header_accent_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            host.host.name.as_str(),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" [{}/{}]", host.index + 1, host.total),
            Style::default().fg(theme.text_secondary),
        ),
        Span::styled(
            format!("  {} {target}", host.host.kind.label()),
            Style::default().fg(theme.text_secondary),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

fn render_totals(
    frame: &mut Frame,
    area: Rect,
    snapshot: &Snapshot,
    sort_mode: SortMode,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            format!(" Sort: {} ", sort_mode.label()),
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let line = Line::from(vec![
        Span::styled(
            format!(" Procs: {}", snapshot.processes.len()),
            Style::default().fg(theme.text_primary),
        ),
        Span::styled(
            format!("  Kthreads: {}", snapshot.kernel_count()),
            Style::default().fg(theme.text_secondary),
        ),
        Span::styled(
            format!("  CPU: {:.1}%", snapshot.total_cpu_percent()),
            Style::default().fg(theme.text_secondary),
        ),
        Span::styled(
            format!("  Polled: {}", poll_age(snapshot.taken_at)),
            Style::default().fg(theme.text_secondary),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

fn poll_age(taken_at: Option<Instant>) -> String {
    match taken_at {
        Some(at) => format!("{}s ago", at.elapsed().as_secs()),
        None => "never".to_string(),
    }
}
