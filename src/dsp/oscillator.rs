//! Wavetable playback with linear interpolation.

/// Reads a looping table at `note_freq / base_freq` samples per sample.
///
/// The table is borrowed per call so many voices can share one set of
/// octave tables. Tables must carry one wrap sample at the end (see
/// `WaveTable`).
#[derive(Debug, Clone, Default)]
pub struct TableOscillator {
    /// Read position in table samples.
    position: f64,
    tick: f64,
    table_index: usize,
}

impl TableOscillator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.position = 0.0;
    }

    pub fn set_frequency(&mut self, note_freq: f32, base_freq: f32) {
        let tick = f64::from(note_freq) / f64::from(base_freq);
        self.tick = if tick.is_finite() { tick.max(0.0) } else { 0.0 };
    }

    pub fn tick(&self) -> f64 {
        self.tick
    }

    pub fn set_table_index(&mut self, index: usize) {
        self.table_index = index;
    }

    pub fn table_index(&self) -> usize {
        self.table_index
    }

    /// `phase` in cycles of the whole table; the integer part is dropped.
    pub fn set_phase(&mut self, phase: f32, table_len: usize) {
        let phase = f64::from(phase);
        self.position = (phase - phase.floor()) * table_len as f64;
    }

    /// `table` is `len + 1` samples, the last repeating the first.
    pub fn process(&mut self, table: &[f32]) -> f32 {
        let len = table.len().saturating_sub(1);
        if len == 0 {
            return 0.0;
        }

        let index = self.position as usize;
        let frac = (self.position - index as f64) as f32;
        let index = index.min(len - 1);
        let out = table[index] + frac * (table[index + 1] - table[index]);

        self.position += self.tick;
        if self.position >= len as f64 {
            self.position %= len as f64;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_between_samples() {
        let table = [0.0, 1.0, 0.0, -1.0, 0.0];
        let mut osc = TableOscillator::new();
        osc.set_frequency(0.5, 1.0);
        let out: Vec<f32> = (0..8).map(|_| osc.process(&table)).collect();
        assert_eq!(out, [0.0, 0.5, 1.0, 0.5, 0.0, -0.5, -1.0, -0.5]);
    }

    #[test]
    fn wraps_past_table_end() {
        let table = [1.0, 2.0, 3.0, 4.0, 1.0];
        let mut osc = TableOscillator::new();
        osc.set_frequency(3.0, 1.0);
        let out: Vec<f32> = (0..4).map(|_| osc.process(&table)).collect();
        assert_eq!(out, [1.0, 4.0, 3.0, 2.0]);
    }

    #[test]
    fn phase_sets_start_position() {
        let table = [0.0, 1.0, 2.0, 3.0, 0.0];
        let mut osc = TableOscillator::new();
        osc.set_phase(1.5, 4);
        assert_eq!(osc.process(&table), 2.0);
    }

    #[test]
    fn empty_table_is_silent() {
        let mut osc = TableOscillator::new();
        osc.set_frequency(440.0, 10.0);
        assert_eq!(osc.process(&[]), 0.0);
        assert_eq!(osc.process(&[1.0]), 0.0);
    }

    #[test]
    fn bad_frequency_stops() {
        let mut osc = TableOscillator::new();
        osc.set_frequency(440.0, 0.0);
        assert_eq!(osc.tick(), 0.0);
    }
}
