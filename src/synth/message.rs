#[cfg(feature = "rtrb")]
use rtrb::Consumer;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A note event stamped with its sample offset inside the next block.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MidiNote {
    pub is_note_on: bool,
    pub frame: u32,
    pub id: i32,
    pub pitch: i16,
    /// Semitones added to `pitch`.
    pub tuning: f32,
    pub velocity: f32,
}

impl MidiNote {
    pub fn note_on(frame: u32, id: i32, pitch: i16, tuning: f32, velocity: f32) -> Self {
        Self {
            is_note_on: true,
            frame,
            id,
            pitch,
            tuning,
            velocity,
        }
    }

    pub fn note_off(frame: u32, id: i32) -> Self {
        Self {
            is_note_on: false,
            frame,
            id,
            pitch: 0,
            tuning: 0.0,
            velocity: 0.0,
        }
    }
}

/// Events staged for the current block.
///
/// Capacity is reserved up front; pushes past it are dropped instead of
/// reallocating on the audio thread.
#[derive(Debug, Clone)]
pub struct MidiQueue {
    notes: Vec<MidiNote>,
    capacity: usize,
}

impl MidiQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            notes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Inserts in frame order, after events already queued at the same
    /// frame. Returns false when the queue is full and the note was dropped.
    pub fn push(&mut self, note: MidiNote) -> bool {
        if self.notes.len() >= self.capacity {
            return false;
        }
        let index = self.notes.partition_point(|queued| queued.frame <= note.frame);
        self.notes.insert(index, note);
        true
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.notes.len() >= self.capacity
    }

    pub fn get(&self, index: usize) -> Option<&MidiNote> {
        self.notes.get(index)
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }

    /// First frame strictly after `frame` that has an event, if any.
    pub fn next_frame_after(&self, frame: u32) -> Option<u32> {
        let index = self.notes.partition_point(|note| note.frame <= frame);
        self.notes.get(index).map(|note| note.frame)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MidiNote> {
        self.notes.iter()
    }

    /// Events at `frame`, in insertion order.
    pub fn at_frame(&self, frame: u32) -> impl Iterator<Item = MidiNote> + '_ {
        self.notes.iter().copied().filter(move |note| note.frame == frame)
    }
}

/// Source of note events produced off the audio thread.
pub trait MidiNoteReceiver {
    fn pop(&mut self) -> Option<MidiNote>;
}

#[cfg(feature = "rtrb")]
impl MidiNoteReceiver for Consumer<MidiNote> {
    fn pop(&mut self) -> Option<MidiNote> {
        Consumer::pop(self).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_keeps_frame_order() {
        let mut queue = MidiQueue::with_capacity(8);
        queue.push(MidiNote::note_on(5, 1, 60, 0.0, 1.0));
        queue.push(MidiNote::note_off(2, 9));
        queue.push(MidiNote::note_off(5, 1));
        assert_eq!(queue.iter().map(|n| n.frame).collect::<Vec<_>>(), [2, 5, 5]);

        let at_five: Vec<_> = queue.at_frame(5).collect();
        assert_eq!(at_five.len(), 2);
        assert!(at_five[0].is_note_on && !at_five[1].is_note_on);
        assert_eq!(queue.next_frame_after(2), Some(5));
        assert_eq!(queue.next_frame_after(5), None);
    }

    #[test]
    fn full_queue_drops() {
        let mut queue = MidiQueue::with_capacity(1);
        assert!(queue.push(MidiNote::note_off(0, 1)));
        assert!(!queue.push(MidiNote::note_off(0, 2)));
        assert_eq!(queue.len(), 1);
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn ring_consumer_receives() {
        let (mut tx, mut rx) = rtrb::RingBuffer::<MidiNote>::new(4);
        tx.push(MidiNote::note_on(0, 3, 64, 0.0, 0.5)).ok();
        let note = MidiNoteReceiver::pop(&mut rx);
        assert_eq!(note.map(|n| n.id), Some(3));
        assert!(MidiNoteReceiver::pop(&mut rx).is_none());
    }
}
