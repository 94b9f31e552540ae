//! Status bar - program, voices, backend and reverb stability

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use plinth_dsp::dsp::Stability;

use super::{EngineStatus, StaticInfo};

fn flag(name: &'static str, ok: bool) -> Span<'static> {
    let color = if ok { Color::Green } else { Color::Red };
    Span::styled(format!("{name} "), Style::default().fg(color))
}

fn stability_spans(stability: Option<Stability>) -> Vec<Span<'static>> {
    match stability {
        Some(s) => vec![
            Span::styled("stability ", Style::default().fg(Color::DarkGray)),
            flag("S", s.stable_s()),
            flag("T", s.stable_t()),
            flag("A", s.stable_a()),
            Span::styled(
                format!("Σ|a| {:.2}  ", s.sum_abs),
                Style::default().fg(Color::DarkGray),
            ),
        ],
        None => vec![Span::styled("stability n/a  ", Style::default().fg(Color::DarkGray))],
    }
}

pub fn render_status(frame: &mut Frame, area: Rect, info: &StaticInfo, status: &EngineStatus) {
    let block = Block::default().title(" plinth ").borders(Borders::ALL);

    let program = info
        .programs
        .get(status.program)
        .map_or("?", String::as_str);
    let reverb = if status.reverb_on { info.reverb_name } else { "bypassed" };

    let mut spans = vec![
        Span::styled(format!(" {program}  "), Style::default().fg(Color::Cyan)),
        Span::styled(
            format!("voices {:>3}  ", status.active_voices),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("reverb {reverb}  "),
            Style::default().fg(if status.reverb_on { Color::Green } else { Color::Yellow }),
        ),
    ];
    spans.extend(stability_spans(status.stability));
    spans.push(Span::styled(
        format!(
            "{:.1}kHz {}ch {}",
            info.sample_rate / 1000.0,
            info.channels,
            info.instruction_set
        ),
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
