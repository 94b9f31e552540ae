//! Computer keyboard to note mapping and the held-notes strip

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// One octave laid out like a piano on the bottom two letter rows
const KEYS: [char; 13] = ['z', 's', 'x', 'd', 'c', 'v', 'g', 'b', 'h', 'n', 'j', 'm', ','];
const NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

pub const LOWEST_OCTAVE: i16 = 1;
pub const HIGHEST_OCTAVE: i16 = 7;

/// Semitone offset of `key` inside the playable octave
pub fn key_to_semitone(key: char) -> Option<i16> {
    KEYS.iter().position(|&k| k == key).map(|i| i as i16)
}

pub fn note_name(pitch: i16) -> String {
    let octave = pitch.div_euclid(12) - 1;
    format!("{}{}", NAMES[pitch.rem_euclid(12) as usize], octave)
}

pub fn render_keyboard(frame: &mut Frame, area: Rect, octave: i16, held: &[i16]) {
    let block = Block::default()
        .title(format!(" Keys  octave {octave} "))
        .borders(Borders::ALL);

    let base = 12 * (octave + 1);
    let spans: Vec<Span> = KEYS
        .iter()
        .enumerate()
        .map(|(i, key)| {
            let pitch = base + i as i16;
            let style = if held.contains(&pitch) {
                Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else if NAMES[i % 12].ends_with('#') {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };
            Span::styled(format!(" {key}:{:<4}", note_name(pitch)), style)
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
