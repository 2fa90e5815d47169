use crate::byte_cursor::ByteCursor;
use crate::core::{Channel, PortValue};
use crate::error::{ExportResult, InvalidMetaEventSnafu, Result};
use crate::file::write_length;
use crate::scribe::Scribe;
use crate::Text;
use log::{debug, trace};
use snafu::{ensure, OptionExt, ResultExt};
use std::borrow::Cow;
use std::io::Write;

/// Meta events only exist in MIDI files. Each one is `FF <type> <len> <data>` where `len` is a
/// variable-length quantity. Types this library does not know about are kept as
/// [`MetaEvent::Other`] so that they survive a round trip.
///
/// In general, meta-events in a track which occur at the same time may occur in any order. An
/// end-of-track event must occur as the last event in the track; it is not stored as an event of
/// a [`crate::file::Track`] but as the track's end tick.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum MetaEvent {
    /// `FF 00 02 ssss` or `FF 00 00`: the number of a sequence. With a zero length the sequence's
    /// position in the file is implied.
    SequenceNumber(Option<u16>),

    /// `FF 01..0F len text`: the family of text events. The [`TextKind`] says which one.
    Text(TextKind, Text),

    /// `FF 20 01 cc`: associates a MIDI channel with all events which follow, including System
    /// Exclusive and meta-events, until the next channel event or channel prefix.
    MidiChannelPrefix(Channel),

    /// `FF 21 01 pp`: the MIDI port the track should be played on. Obsolete, but common.
    Port(PortValue),

    /// `FF 2F 00`: This event is not optional. It is included so that an exact ending point may be
    /// specified for the track.
    EndOfTrack,

    /// `FF 51 03 tttttt`: Set Tempo, in microseconds per MIDI quarter-note.
    SetTempo(MicrosecondsPerQuarter),

    /// `FF 54 05 hr mn se fr ff`: the SMPTE time at which the track chunk is supposed to start.
    SmpteOffset(SmpteOffsetValue),

    /// `FF 58 04 nn dd cc bb`: numerator, denominator as a power of two, MIDI clocks per metronome
    /// click and notated 32nd-notes per MIDI quarter note. 6/8 with a click every dotted quarter is
    /// `FF 58 04 06 03 24 08`.
    TimeSignature(TimeSignatureValue),

    /// `FF 59 02 sf mi`: sharps (positive) or flats (negative), then major (0) or minor (1).
    KeySignature(KeySignatureValue),

    /// `FF 7F len data`: sequencer-specific data, starting with a manufacturer id.
    SequencerSpecific(Vec<u8>),

    /// Any other meta event type, or a known type whose value cannot be represented, kept
    /// byte-for-byte.
    Other { meta_type: u8, data: Vec<u8> },
}

impl MetaEvent {
    /// Interprets the payload of a meta event whose framing has already been checked.
    pub(crate) fn decode(meta_type: u8, data: &[u8], track: usize) -> Result<Self> {
        let invalid = || InvalidMetaEventSnafu {
            site: site!(),
            track,
            meta_type,
            length: data.len(),
        };
        let expect_len = |len: usize| -> Result<()> {
            ensure!(data.len() == len, invalid());
            Ok(())
        };
        let event = match meta_type {
            META_SEQUENCE_NUM => {
                if data.is_empty() {
                    MetaEvent::SequenceNumber(None)
                } else {
                    expect_len(LEN_META_SEQUENCE_NUM)?;
                    MetaEvent::SequenceNumber(Some(u16::from_be_bytes([data[0], data[1]])))
                }
            }
            META_TEXT..=META_TEXT_LAST => {
                MetaEvent::Text(TextKind::from_u8(meta_type), Text::from(data))
            }
            META_CHAN_PREFIX => {
                expect_len(LEN_META_CHAN_PREFIX)?;
                if data[0] > MAX_CHANNEL {
                    // Channel::new would clamp this, keep the raw byte
                    debug!("channel prefix {} out of range in track {}", data[0], track);
                    MetaEvent::Other {
                        meta_type,
                        data: data.to_vec(),
                    }
                } else {
                    MetaEvent::MidiChannelPrefix(Channel::new(data[0]))
                }
            }
            META_PORT => {
                expect_len(LEN_META_PORT)?;
                MetaEvent::Port(PortValue::new(data[0]))
            }
            META_END_OF_TRACK => {
                expect_len(LEN_META_END_OF_TRACK)?;
                MetaEvent::EndOfTrack
            }
            META_SET_TEMPO => {
                expect_len(LEN_META_SET_TEMPO)?;
                let value = ByteCursor::new(data).read_u24().ok().context(invalid())?;
                MetaEvent::SetTempo(MicrosecondsPerQuarter::new(value))
            }
            META_SMPTE_OFFSET => {
                expect_len(LEN_META_SMPTE_OFFSET)?;
                MetaEvent::SmpteOffset(SmpteOffsetValue {
                    hr: data[0],
                    mn: data[1],
                    se: data[2],
                    fr: data[3],
                    ff: data[4],
                })
            }
            META_TIME_SIG => {
                expect_len(LEN_META_TIME_SIG)?;
                MetaEvent::TimeSignature(TimeSignatureValue {
                    numerator: data[0],
                    denominator_power: data[1],
                    clocks_per_click: data[2],
                    thirty_seconds_per_quarter: data[3],
                })
            }
            META_KEY_SIG => {
                expect_len(LEN_META_KEY_SIG)?;
                MetaEvent::KeySignature(KeySignatureValue {
                    accidentals: data[0] as i8,
                    mode: data[1],
                })
            }
            META_SEQ_SPECIFIC => MetaEvent::SequencerSpecific(data.to_vec()),
            _ => {
                trace!("keeping unknown meta event type {:#04X}", meta_type);
                MetaEvent::Other {
                    meta_type,
                    data: data.to_vec(),
                }
            }
        };
        Ok(event)
    }

    /// The type byte and the data bytes of this event as they are written to a file.
    pub(crate) fn encode(&self) -> (u8, Cow<'_, [u8]>) {
        match self {
            MetaEvent::SequenceNumber(None) => (META_SEQUENCE_NUM, Cow::Borrowed(&[][..])),
            MetaEvent::SequenceNumber(Some(n)) => {
                (META_SEQUENCE_NUM, Cow::Owned(n.to_be_bytes().to_vec()))
            }
            MetaEvent::Text(kind, text) => (kind.to_u8(), Cow::Borrowed(text.as_bytes())),
            MetaEvent::MidiChannelPrefix(channel) => {
                (META_CHAN_PREFIX, Cow::Owned(vec![channel.get()]))
            }
            MetaEvent::Port(port) => (META_PORT, Cow::Owned(vec![port.get()])),
            MetaEvent::EndOfTrack => (META_END_OF_TRACK, Cow::Borrowed(&[][..])),
            MetaEvent::SetTempo(value) => {
                // skip the first byte of the big-endian u32
                (META_SET_TEMPO, Cow::Owned(value.get().to_be_bytes()[1..].to_vec()))
            }
            MetaEvent::SmpteOffset(v) => (
                META_SMPTE_OFFSET,
                Cow::Owned(vec![v.hr, v.mn, v.se, v.fr, v.ff]),
            ),
            MetaEvent::TimeSignature(v) => (
                META_TIME_SIG,
                Cow::Owned(vec![
                    v.numerator,
                    v.denominator_power,
                    v.clocks_per_click,
                    v.thirty_seconds_per_quarter,
                ]),
            ),
            MetaEvent::KeySignature(v) => {
                (META_KEY_SIG, Cow::Owned(vec![v.accidentals as u8, v.mode]))
            }
            MetaEvent::SequencerSpecific(data) => {
                (META_SEQ_SPECIFIC, Cow::Borrowed(data.as_slice()))
            }
            MetaEvent::Other { meta_type, data } => (*meta_type, Cow::Borrowed(data.as_slice())),
        }
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>) -> ExportResult<()> {
        let (meta_type, data) = self.encode();
        w.write_all(&[0xff, meta_type]).context(wr!())?;
        write_length(w, data.len())?;
        w.write_all(&data).context(wr!())?;
        w.clear_running_status();
        Ok(())
    }
}

/// Meta event types `01` through `0F` are reserved for text events.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum TextKind {
    /// `FF 01`: Any amount of text describing anything.
    Text,
    /// `FF 02`: A copyright notice.
    Copyright,
    /// `FF 03`: The name of the sequence (format 0, or the first track of format 1) or the track.
    TrackName,
    /// `FF 04`: A description of the instrumentation to be used in that track.
    InstrumentName,
    /// `FF 05`: A lyric to be sung, generally one syllable per event.
    Lyric,
    /// `FF 06`: A rehearsal letter or section name.
    Marker,
    /// `FF 07`: A description of something happening on a film or video screen or stage.
    CuePoint,
    /// `FF 08`: Not in the 1.0 document, found [here](http://www.somascape.org/midi/tech/mfile.html).
    ProgramName,
    /// `FF 09`: Same source as `ProgramName`.
    DeviceName,
    /// `FF 0A` to `FF 0F`.
    Reserved(u8),
}

impl TextKind {
    fn from_u8(value: u8) -> Self {
        match value {
            0x01 => TextKind::Text,
            0x02 => TextKind::Copyright,
            0x03 => TextKind::TrackName,
            0x04 => TextKind::InstrumentName,
            0x05 => TextKind::Lyric,
            0x06 => TextKind::Marker,
            0x07 => TextKind::CuePoint,
            0x08 => TextKind::ProgramName,
            0x09 => TextKind::DeviceName,
            other => TextKind::Reserved(other),
        }
    }

    fn to_u8(self) -> u8 {
        match self {
            TextKind::Text => 0x01,
            TextKind::Copyright => 0x02,
            TextKind::TrackName => 0x03,
            TextKind::InstrumentName => 0x04,
            TextKind::Lyric => 0x05,
            TextKind::Marker => 0x06,
            TextKind::CuePoint => 0x07,
            TextKind::ProgramName => 0x08,
            TextKind::DeviceName => 0x09,
            TextKind::Reserved(other) => other,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct SmpteOffsetValue {
    // held as raw bytes, the hour byte also carries the frame rate in its top bits
    pub(crate) hr: u8,
    pub(crate) mn: u8,
    pub(crate) se: u8,
    pub(crate) fr: u8,
    pub(crate) ff: u8,
}

impl SmpteOffsetValue {
    pub fn new(hr: u8, mn: u8, se: u8, fr: u8, ff: u8) -> Self {
        Self { hr, mn, se, fr, ff }
    }

    pub fn hours(&self) -> u8 {
        self.hr & 0b0001_1111
    }

    pub fn minutes(&self) -> u8 {
        self.mn
    }

    pub fn seconds(&self) -> u8 {
        self.se
    }

    pub fn frames(&self) -> u8 {
        self.fr
    }

    /// Fractional frames, in 100ths of a frame.
    pub fn fractional_frames(&self) -> u8 {
        self.ff
    }
}

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct TimeSignatureValue {
    /// The upper part of a time signature. For example, in 6/8, the `numerator` is 6.
    numerator: u8,

    /// The lower part of a time signature as a power of two: 2 represents a quarter-note, 3
    /// represents an eighth-note, etc.
    denominator_power: u8,

    /// The number of MIDI clocks in a metronome click. There are 24 MIDI clocks per quarter-note.
    clocks_per_click: u8,

    /// The number of notated 32nd-notes in what MIDI thinks of as a quarter-note. This should
    /// normally be 8.
    thirty_seconds_per_quarter: u8,
}

impl Default for TimeSignatureValue {
    fn default() -> Self {
        // 4/4, clicking every quarter
        Self::new(4, 2, 24, 8)
    }
}

impl TimeSignatureValue {
    pub fn new(
        numerator: u8,
        denominator_power: u8,
        clocks_per_click: u8,
        thirty_seconds_per_quarter: u8,
    ) -> Self {
        Self {
            numerator,
            denominator_power,
            clocks_per_click,
            thirty_seconds_per_quarter,
        }
    }

    pub fn numerator(&self) -> u8 {
        self.numerator
    }

    pub fn denominator_power(&self) -> u8 {
        self.denominator_power
    }

    /// The notated denominator, `None` if the stored power of two does not fit in a `u32`.
    pub fn denominator(&self) -> Option<u32> {
        1u32.checked_shl(u32::from(self.denominator_power))
    }

    pub fn clocks_per_click(&self) -> u8 {
        self.clocks_per_click
    }

    pub fn thirty_seconds_per_quarter(&self) -> u8 {
        self.thirty_seconds_per_quarter
    }
}

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum KeyMode {
    Major,
    Minor,
}

#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct KeySignatureValue {
    /// -7 is 7 flats, +7 is 7 sharps. Kept as found, even if out of that range.
    accidentals: i8,
    mode: u8,
}

impl KeySignatureValue {
    pub fn new(accidentals: i8, mode: KeyMode) -> Self {
        Self {
            accidentals,
            mode: mode as u8,
        }
    }

    pub fn accidentals(&self) -> i8 {
        self.accidentals
    }

    pub fn mode(&self) -> KeyMode {
        match self.mode {
            1 => KeyMode::Minor,
            _ => KeyMode::Major,
        }
    }
}

pub(crate) const DEFAULT_MICROSECONDS_PER_QUARTER: u32 = 500_000;
pub(crate) const MAX_24BIT_UINT_VALUE: u32 = 16_777_215;

clamp!(
    /// In MIDI tempos are given as microseconds per quarter note, stored in three bytes, hence the
    /// odd upper-bound (16,777,215). The default tempo is 120 beats per minute, which is `500_000`
    /// microseconds per beat.
    ///
    /// # Examples
    ///
    /// ## Quarter Note at 92 Beats per Minute
    ///
    /// - that is 1 minute ÷ 92 => 0.010869565217391 minutes per beat (mpb)
    /// - 0.010869565217391 mpb * 60 seconds per minute => 0.652173913043478 seconds per beat (spb)
    /// - 0.652173913043478 spb * 1000000 => 652173.91304347803816 microseconds per beat
    MicrosecondsPerQuarter,
    u32,
    0,
    MAX_24BIT_UINT_VALUE,
    DEFAULT_MICROSECONDS_PER_QUARTER,
    pub
);

impl MicrosecondsPerQuarter {
    /// Tempo in quarter notes per minute. `None` for a zero tempo.
    pub fn quarters_per_minute(&self) -> Option<f64> {
        if self.0 == 0 {
            None
        } else {
            Some(60_000_000.0 / f64::from(self.0))
        }
    }
}

pub(crate) const META_SEQUENCE_NUM: u8 = 0x00;
pub(crate) const META_TEXT: u8 = 0x01;
pub(crate) const META_TEXT_LAST: u8 = 0x0f;
pub(crate) const META_CHAN_PREFIX: u8 = 0x20;
/// https://groups.google.com/u/2/g/comp.music.midi/c/_MIjgi-8xQQ
pub(crate) const META_PORT: u8 = 0x21;
pub(crate) const META_END_OF_TRACK: u8 = 0x2f;
pub(crate) const META_SET_TEMPO: u8 = 0x51;
pub(crate) const META_SMPTE_OFFSET: u8 = 0x54;
pub(crate) const META_TIME_SIG: u8 = 0x58;
pub(crate) const META_KEY_SIG: u8 = 0x59;
pub(crate) const META_SEQ_SPECIFIC: u8 = 0x7f;

pub(crate) const LEN_META_SEQUENCE_NUM: usize = 2;
pub(crate) const LEN_META_CHAN_PREFIX: usize = 1;
pub(crate) const LEN_META_PORT: usize = 1;
pub(crate) const LEN_META_END_OF_TRACK: usize = 0;
pub(crate) const LEN_META_SET_TEMPO: usize = 3;
pub(crate) const LEN_META_SMPTE_OFFSET: usize = 5;
pub(crate) const LEN_META_TIME_SIG: usize = 4;
pub(crate) const LEN_META_KEY_SIG: usize = 2;

/// Channels are numbered `0` through `15` on the wire.
const MAX_CHANNEL: u8 = 15;
