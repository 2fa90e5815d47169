use crate::diagnostic::Diagnostic;
use crate::error::{ExportResult, TooManyTracksSnafu};
use crate::file::{Division, Header, TempoMap, Track};
use crate::scribe::{Scribe, WriteSettings};
use log::debug;
use snafu::ResultExt;
use std::convert::TryFrom;
use std::io::Write;

/// An imported MIDI file: its header, its tracks in file order, and the tempo map merged from all
/// of them. This is the only thing that outlives an import; nothing in it borrows from the bytes
/// it was decoded from.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Composition {
    header: Header,
    tracks: Vec<Track>,
    tempo_map: TempoMap,
    diagnostics: Vec<Diagnostic>,
}

impl Composition {
    /// Assemble a composition. The tempo map is built from `tracks`.
    pub fn new(header: Header, tracks: Vec<Track>) -> Self {
        let tempo_map = TempoMap::merge(&tracks);
        Self {
            header,
            tracks,
            tempo_map,
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn with_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn tracks_len(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tempo_map(&self) -> &TempoMap {
        &self.tempo_map
    }

    /// Things about the file that were odd but did not stop the import.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The time of `tick` in microseconds from the start. With a metrical division this follows
    /// the tempo map; with an SMPTE division every tick has the same length and tempo changes do
    /// not matter.
    pub fn tick_to_micros(&self, tick: u64) -> u64 {
        match self.header.division() {
            Division::QuarterNote(q) => self.tempo_map.micros_at(tick, q.get()),
            Division::Smpte(smpte) => {
                let ticks_per_second =
                    smpte.frame_rate().frames_per_second_f64() * f64::from(smpte.resolution());
                (tick as f64 * 1_000_000.0 / ticks_per_second).round() as u64
            }
        }
    }

    /// Encode as a Standard MIDI File. Each track gets an end-of-track event, whether or not it
    /// had one on import. The header always declares the number of tracks actually written.
    pub fn write<W: Write>(&self, w: W, settings: WriteSettings) -> ExportResult<()> {
        let mut scribe = Scribe::new(w, settings);
        let track_count =
            u16::try_from(self.tracks.len()).context(TooManyTracksSnafu { site: site!() })?;
        let header = Header::new(self.header.format(), track_count, self.header.division());
        header.write(&mut scribe)?;
        for (index, track) in self.tracks.iter().enumerate() {
            debug!("writing track {}", index);
            track.write(&mut scribe, index)?;
        }
        Ok(())
    }

    /// Encode as a Standard MIDI File into a new buffer.
    pub fn to_bytes(&self, settings: WriteSettings) -> ExportResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.write(&mut bytes, settings)?;
        Ok(bytes)
    }
}
