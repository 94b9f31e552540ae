//! Oscilloscope widget with level readout

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

pub struct Levels {
    pub peak: f32,
    pub rms: f32,
}

impl Levels {
    pub fn measure(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

pub fn render_waveform(frame: &mut Frame, area: Rect, buffer: &[f32]) {
    let levels = Levels::measure(buffer);
    let title = format!(" Output  peak {:.2}  rms {:.2} ", levels.peak, levels.rms);
    let color = if levels.peak >= 1.0 { Color::Red } else { Color::Cyan };
    let block = Block::default().title(title).borders(Borders::ALL);

    let scale = buffer.len().max(1) as f64;
    let data: Vec<(f64, f64)> = buffer
        .iter()
        .enumerate()
        .map(|(i, &sample)| (i as f64 / scale, sample as f64))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(Axis::default().bounds([0.0, 1.0]))
        .y_axis(
            Axis::default()
                .bounds([-1.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
