use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{InputMode, ResolvedKeybinds, StatusMessage, key_label};
use crate::ui::theme::Theme;

pub struct StatusContext<'a> {
    pub input_mode: InputMode,
    pub filter_text: &'a str,
    pub status_message: Option<&'a StatusMessage>,
    pub poll_error: Option<&'a str>,
    pub show_kernel_threads: bool,
    pub keybinds: &'a ResolvedKeybinds,
}

pub fn render(frame: &mut Frame, area: Rect, ctx: StatusContext<'_>, theme: &Theme) {
    let bg_style = Style::default().bg(theme.statusbar_bg);

    // Action results first, then a failed poll, then the key pills
    let message = ctx
        .status_message
        .map(|status| (status.text.as_str(), status.ok))
        .or(ctx.poll_error.map(|err| (err, false)));
    if let Some((text, ok)) = message
        && ctx.input_mode != InputMode::Filter
    {
        let color = if ok { theme.status_ok } else { theme.status_err };
        let line = Line::from(Span::styled(
            format!(" {text}"),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(line).style(bg_style), area);
        return;
    }

    let kb = ctx.keybinds;
    let line = match ctx.input_mode {
        InputMode::Filter => {
            let mut spans = vec![
                Span::styled(
                    " / ",
                    Style::default()
                        .fg(theme.pill_key_fg)
                        .bg(theme.pill_key_bg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" {}", ctx.filter_text),
                    Style::default().fg(theme.pill_desc_fg),
                ),
                Span::styled("\u{2588}", Style::default().fg(theme.pill_key_bg)),
            ];
            spans.extend(pill_spans("Esc".to_string(), "Cancel", theme));
            spans.extend(pill_spans("Enter".to_string(), "Apply", theme));
            Line::from(spans)
        }
        InputMode::Normal | InputMode::Help if !ctx.filter_text.is_empty() => {
            let mut spans = vec![
                Span::styled(
                    " Filter: ",
                    Style::default()
                        .fg(theme.pill_key_bg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(ctx.filter_text.to_string(), Style::default().fg(theme.pill_desc_fg)),
            ];
            spans.extend(pill_spans("Esc".to_string(), "Clear", theme));
            spans.extend(pill_spans(key_label(kb.filter), "Edit", theme));
            Line::from(spans)
        }
        InputMode::Normal | InputMode::Help => {
            let kernel = if ctx.show_kernel_threads { "Hide kthreads" } else { "Show kthreads" };
            let mut spans = Vec::new();
            spans.extend(pill_spans(key_label(kb.quit), "Quit", theme));
            spans.extend(pill_spans(key_label(kb.next_host), "Host", theme));
            spans.extend(pill_spans(key_label(kb.pause), "Pause", theme));
            spans.extend(pill_spans(key_label(kb.resume), "Resume", theme));
            spans.extend(pill_spans(key_label(kb.kill), "Kill", theme));
            spans.extend(pill_spans(key_label(kb.restart), "Restart", theme));
            spans.extend(pill_spans(key_label(kb.filter), "Filter", theme));
            spans.extend(pill_spans(key_label(kb.cycle_sort), "Sort", theme));
            spans.extend(pill_spans(key_label(kb.toggle_kernel), kernel, theme));
            spans.extend(pill_spans(key_label(kb.help), "Help", theme));
            Line::from(spans)
        }
    };

    frame.render_widget(Paragraph::new(line).style(bg_style), area);
}

fn pill_spans<'a>(key: String, desc: &'a str, theme: &Theme) -> Vec<Span<'a>> {
    vec![
        Span::raw(" "),
        Span::styled(
            format!(" {key} "),
            Style::default()
                .fg(theme.pill_key_fg)
                .bg(theme.pill_key_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {desc}"),
            Style::default().fg(theme.pill_desc_fg).bg(theme.surface_bg),
        ),
    ]
}
