use crate::file::meta_event::DEFAULT_MICROSECONDS_PER_QUARTER;
use crate::file::{Event, MetaEvent, TimeSignatureValue, Track};
use log::debug;
use std::convert::TryFrom;

/// A tempo change, in microseconds per quarter note, at an absolute tick.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct TempoMapEntry {
    tick: u64,
    micros_per_quarter: u32,
}

impl TempoMapEntry {
    pub fn new(tick: u64, micros_per_quarter: u32) -> Self {
        Self {
            tick,
            micros_per_quarter,
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn micros_per_quarter(&self) -> u32 {
        self.micros_per_quarter
    }
}

/// A time signature change at an absolute tick.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct TimeSignatureEntry {
    tick: u64,
    time_signature: TimeSignatureValue,
}

impl TimeSignatureEntry {
    pub fn new(tick: u64, time_signature: TimeSignatureValue) -> Self {
        Self {
            tick,
            time_signature,
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn time_signature(&self) -> TimeSignatureValue {
        self.time_signature
    }
}

/// The tempo and time signature changes of all tracks, merged and sorted by tick. When more than
/// one change lands on the same tick, the one that comes last in file order wins.
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct TempoMap {
    tempos: Vec<TempoMapEntry>,
    time_signatures: Vec<TimeSignatureEntry>,
}

impl TempoMap {
    pub fn merge(tracks: &[Track]) -> Self {
        let mut tempos = Vec::new();
        let mut time_signatures = Vec::new();
        for event in tracks.iter().flat_map(|t| t.events()) {
            match event.event() {
                Event::Meta(MetaEvent::SetTempo(value)) => {
                    tempos.push(TempoMapEntry::new(event.tick(), value.get()))
                }
                Event::Meta(MetaEvent::TimeSignature(value)) => {
                    time_signatures.push(TimeSignatureEntry::new(event.tick(), *value))
                }
                _ => {}
            }
        }
        let tempos = last_per_tick(tempos, |e| e.tick);
        let time_signatures = last_per_tick(time_signatures, |e| e.tick);
        debug!(
            "tempo map: {} tempo changes, {} time signatures",
            tempos.len(),
            time_signatures.len()
        );
        Self {
            tempos,
            time_signatures,
        }
    }

    /// Tempo changes in tick order, at most one per tick.
    pub fn tempos(&self) -> &[TempoMapEntry] {
        &self.tempos
    }

    /// Time signature changes in tick order, at most one per tick.
    pub fn time_signatures(&self) -> &[TimeSignatureEntry] {
        &self.time_signatures
    }

    pub fn is_empty(&self) -> bool {
        self.tempos.is_empty() && self.time_signatures.is_empty()
    }

    /// The tempo in effect at `tick`. Before the first tempo change this is 120 beats per minute.
    pub fn tempo_at(&self, tick: u64) -> u32 {
        let index = self.tempos.partition_point(|e| e.tick <= tick);
        match index {
            0 => DEFAULT_MICROSECONDS_PER_QUARTER,
            i => self.tempos[i - 1].micros_per_quarter,
        }
    }

    /// The time signature in effect at `tick`. Before the first change this is 4/4.
    pub fn time_signature_at(&self, tick: u64) -> TimeSignatureValue {
        let index = self.time_signatures.partition_point(|e| e.tick <= tick);
        match index {
            0 => TimeSignatureValue::default(),
            i => self.time_signatures[i - 1].time_signature,
        }
    }

    /// Microseconds from tick zero to `tick`, following every tempo change on the way.
    pub fn micros_at(&self, tick: u64, ticks_per_quarter: u16) -> u64 {
        let mut numerator: u128 = 0;
        let mut segment_start = 0u64;
        let mut tempo = DEFAULT_MICROSECONDS_PER_QUARTER;
        for entry in self.tempos.iter().take_while(|e| e.tick < tick) {
            numerator += u128::from(entry.tick - segment_start) * u128::from(tempo);
            segment_start = entry.tick;
            tempo = entry.micros_per_quarter;
        }
        numerator += u128::from(tick - segment_start) * u128::from(tempo);
        let micros = numerator / u128::from(ticks_per_quarter.max(1));
        u64::try_from(micros).unwrap_or(u64::MAX)
    }
}

/// Stable-sorts by tick and keeps only the last entry of each tick.
fn last_per_tick<T, F: Fn(&T) -> u64>(mut entries: Vec<T>, tick: F) -> Vec<T> {
    entries.sort_by_key(|e| tick(e));
    let mut result: Vec<T> = Vec::with_capacity(entries.len());
    for entry in entries {
        match result.last_mut() {
            Some(last) if tick(last) == tick(&entry) => *last = entry,
            _ => result.push(entry),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::MicrosecondsPerQuarter;

    fn tempo(micros: u32) -> Event {
        Event::Meta(MetaEvent::SetTempo(MicrosecondsPerQuarter::new(micros)))
    }

    #[test]
    fn merge_sorts_and_last_write_wins() {
        let mut first = Track::new();
        first.push_event(0, tempo(500_000));
        first.push_event(960, tempo(400_000));
        let mut second = Track::new();
        second.push_event(480, tempo(600_000));
        second.push_event(960, tempo(300_000));
        let map = TempoMap::merge(&[first, second]);
        assert_eq!(
            &[
                TempoMapEntry::new(0, 500_000),
                TempoMapEntry::new(480, 600_000),
                TempoMapEntry::new(960, 300_000),
            ],
            map.tempos()
        );
    }

    #[test]
    fn tempo_at_uses_default_before_first_change() {
        let mut track = Track::new();
        track.push_event(100, tempo(250_000));
        let map = TempoMap::merge(&[track]);
        assert_eq!(500_000, map.tempo_at(99));
        assert_eq!(250_000, map.tempo_at(100));
        assert_eq!(250_000, map.tempo_at(10_000));
    }

    #[test]
    fn micros_follow_tempo_changes() {
        let mut track = Track::new();
        track.push_event(480, tempo(250_000));
        let map = TempoMap::merge(&[track]);
        // one quarter at 500000 then two at 250000
        assert_eq!(1_000_000, map.micros_at(480 * 3, 480));
        assert_eq!(250_000, map.micros_at(240, 480));
    }

    #[test]
    fn time_signature_default_is_four_four() {
        let map = TempoMap::default();
        let ts = map.time_signature_at(0);
        assert_eq!(4, ts.numerator());
        assert_eq!(Some(4), ts.denominator());
        assert!(map.is_empty());
    }
}
