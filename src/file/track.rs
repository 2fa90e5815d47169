use crate::byte_cursor::{ByteCursor, EndSnafu};
use crate::core::Message;
use crate::diagnostic::Diagnostic;
use crate::error::{
    DeltaTooLargeSnafu, ExportResult, Result, RunningStatusBeforeFirstEventSnafu,
    TrackTooLongSnafu,
};
use crate::file::chunk::{RawChunk, MTRK};
use crate::file::event::RawEvent;
use crate::file::{Event, MetaEvent, TextKind};
use crate::scribe::{Scribe, WriteSettings};
use crate::vlq;
use crate::Text;
use log::{debug, trace};
use snafu::{OptionExt, ResultExt};
use std::convert::TryFrom;
use std::io::Write;

/// 2.3 - Track Chunks
/// The track chunks (type MTrk) are where actual song data is stored. Each track chunk is simply a
/// stream of MIDI events (and non-MIDI events), preceded by delta-time values.
///
/// Here the delta-times have already been summed up: every event carries the absolute tick at
/// which it happens, and events are kept in tick order. The end-of-track event is not stored as
/// an event, its tick is available from [`Track::end_tick`].
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct Track {
    events: Vec<TrackEvent>,
    end_tick: Option<u64>,
}

impl Track {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the track has no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The number of events in the track.
    pub fn events_len(&self) -> usize {
        self.events.len()
    }

    /// Iterator over the events in the track.
    pub fn events(&self) -> impl Iterator<Item = &TrackEvent> {
        self.events.iter()
    }

    /// The tick of the end-of-track event. `None` if the file did not have one.
    pub fn end_tick(&self) -> Option<u64> {
        self.end_tick
    }

    /// The tick of the last event, or of the end-of-track event if that is later.
    pub fn duration(&self) -> u64 {
        let last = self.events.last().map(|e| e.tick).unwrap_or(0);
        self.end_tick.map_or(last, |end| end.max(last))
    }

    /// The text of the first track name event, if there is one.
    pub fn name(&self) -> Option<&Text> {
        self.events.iter().find_map(|e| match &e.event {
            Event::Meta(MetaEvent::Text(TextKind::TrackName, text)) => Some(text),
            _ => None,
        })
    }

    /// Add an event at `tick`. It goes after any events already at or before `tick`, so events
    /// pushed out of order end up sorted while events at the same tick keep the order they were
    /// pushed in. Pushing an end-of-track event sets the end tick instead.
    pub fn push_event(&mut self, tick: u64, event: Event) {
        if event.is_end_of_track() {
            self.end_tick = Some(tick);
            return;
        }
        let index = self.events.partition_point(|e| e.tick <= tick);
        self.events.insert(index, TrackEvent { tick, event });
    }

    /// Add a channel message at `tick`.
    pub fn push_message(&mut self, tick: u64, message: Message) {
        self.push_event(tick, Event::Midi(message))
    }

    /// Decodes a track chunk. Conditions that do not stop the import are added to `diagnostics`.
    pub(crate) fn decode(
        chunk: &RawChunk<'_>,
        track: usize,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Self> {
        TrackDecoder::new(chunk, track).decode(diagnostics)
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>, track: usize) -> ExportResult<()> {
        // write the track chunk header
        w.write_all(&MTRK).context(wr!())?;

        // we need to write out all of the data first so we know its length
        let mut track_data: Vec<u8> = Vec::new();
        let mut track_scribe = Scribe::new(
            &mut track_data,
            WriteSettings {
                running_status: w.use_running_status(),
            },
        );
        let mut previous = 0u64;
        for event in self.events() {
            write_delta(&mut track_scribe, track, previous, event.tick)?;
            event.event.write(&mut track_scribe)?;
            previous = event.tick;
        }

        // every track ends with an end-of-track event, even if it was missing on import
        write_delta(&mut track_scribe, track, previous, self.duration())?;
        Event::Meta(MetaEvent::EndOfTrack).write(&mut track_scribe)?;

        // write the length of the track
        let track_length =
            u32::try_from(track_data.len()).context(TrackTooLongSnafu { site: site!() })?;
        w.write_all(&track_length.to_be_bytes()).context(wr!())?;

        // write the track data
        w.write_all(&track_data).context(wr!())?;
        Ok(())
    }
}

fn write_delta<W: Write>(
    w: &mut Scribe<W>,
    track: usize,
    previous: u64,
    tick: u64,
) -> ExportResult<()> {
    let delta = tick
        .checked_sub(previous)
        .and_then(|delta| u32::try_from(delta).ok())
        .and_then(|delta| vlq::encode_u32(delta).ok())
        .context(DeltaTooLargeSnafu {
            site: site!(),
            track,
            previous,
            tick,
        })?;
    w.write_all(&delta).context(wr!())
}

/// <MTrk event> = <delta-time> <event>, with the delta-time already added to the ticks of the
/// events before it.
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct TrackEvent {
    tick: u64,
    event: Event,
}

impl TrackEvent {
    pub fn new(tick: u64, event: Event) -> Self {
        Self { tick, event }
    }

    /// Ticks from the start of the track, in the units given by the header's division.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn event(&self) -> &Event {
        &self.event
    }
}

/// The status byte most recently seen in a track. Only channel messages set it; meta and sysex
/// events neither use nor change it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct RunningStatus(Option<u8>);

impl RunningStatus {
    pub(crate) fn get(self) -> Option<u8> {
        self.0
    }

    pub(crate) fn update(&mut self, status: u8) {
        if (0x80..=0xef).contains(&status) {
            self.0 = Some(status)
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum DecodeState {
    /// Next up is a delta-time, or the end of the chunk.
    AwaitingEvent,
    /// A delta-time has been read, next is a status byte or, with running status, a data byte.
    AwaitingStatusByte { delta: u32 },
    /// The status is known, the event's bytes follow.
    DecodingEvent { delta: u32, status: u8 },
}

/// Turns the body of one `MTrk` chunk into a [`Track`]. Reads cannot go past the chunk's declared
/// length, running status starts out unset, and ticks start at zero.
pub(crate) struct TrackDecoder<'a> {
    track: usize,
    cursor: ByteCursor<'a>,
    running_status: RunningStatus,
    tick: u64,
    state: DecodeState,
}

impl<'a> TrackDecoder<'a> {
    pub(crate) fn new(chunk: &RawChunk<'a>, track: usize) -> Self {
        Self {
            track,
            cursor: chunk.cursor(),
            running_status: RunningStatus::default(),
            tick: 0,
            state: DecodeState::AwaitingEvent,
        }
    }

    pub(crate) fn decode(mut self, diagnostics: &mut Vec<Diagnostic>) -> Result<Track> {
        debug!("decoding track {}", self.track);
        let mut out = Track::default();
        loop {
            self.state = match self.state {
                DecodeState::AwaitingEvent => {
                    if self.cursor.is_end() {
                        debug!("track {} ended without an end-of-track event", self.track);
                        diagnostics.push(Diagnostic::MissingEndOfTrack { track: self.track });
                        return Ok(out);
                    }
                    let delta = self.cursor.read_vlq().map_err(in_chunk!("MTrk"))?;
                    self.tick += u64::from(delta);
                    DecodeState::AwaitingStatusByte { delta }
                }
                DecodeState::AwaitingStatusByte { delta } => {
                    let position = self.cursor.position();
                    let byte = self
                        .cursor
                        .peek()
                        .context(EndSnafu { position })
                        .map_err(in_chunk!("MTrk"))?;
                    let status = if byte & 0x80 != 0 {
                        self.cursor.read_u8().map_err(in_chunk!("MTrk"))?;
                        self.running_status.update(byte);
                        byte
                    } else {
                        trace!("running status at {}", position);
                        self.running_status.get().context(
                            RunningStatusBeforeFirstEventSnafu {
                                site: site!(),
                                track: self.track,
                                position,
                            },
                        )?
                    };
                    DecodeState::DecodingEvent { delta, status }
                }
                DecodeState::DecodingEvent { delta, status } => {
                    let raw = RawEvent::frame(delta, status, &mut self.cursor, self.track)?;
                    let event = raw.decode(self.track)?;
                    trace!("tick {} (+{}): {:?}", self.tick, raw.delta_ticks, event);
                    if event.is_end_of_track() {
                        out.end_tick = Some(self.tick);
                        if !self.cursor.is_end() {
                            let count = self.cursor.remaining();
                            debug!(
                                "ignoring {} bytes after end-of-track in track {}",
                                count, self.track
                            );
                            diagnostics.push(Diagnostic::TrailingBytes {
                                track: self.track,
                                count,
                            });
                        }
                        debug!(
                            "track {}: {} events, ends at tick {}",
                            self.track,
                            out.events_len(),
                            self.tick
                        );
                        return Ok(out);
                    }
                    out.events.push(TrackEvent {
                        tick: self.tick,
                        event,
                    });
                    DecodeState::AwaitingEvent
                }
            };
        }
    }
}
