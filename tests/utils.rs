#![allow(dead_code)]

use log::LevelFilter;
use std::io::Write;
use std::sync::Once;

static LOGGER: Once = Once::new();

pub fn enable_logging() {
    LOGGER.call_once(logger_init)
}

fn logger_init() {
    env_logger::Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{}:{} {} [{}] - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Trace)
        .is_test(true)
        .init();
}

/// `00 FF 2F 00`: an end-of-track event with a zero delta.
pub const END_OF_TRACK: [u8; 4] = [0x00, 0xff, 0x2f, 0x00];

/// Tempo map, signatures and text at two ticks.
pub const CONDUCTOR_TRACK: &[u8] = &[
    0x00, 0xff, 0x03, 0x05, b'T', b'e', b'm', b'p', b'o', // track name
    0x00, 0xff, 0x58, 0x04, 0x04, 0x02, 0x18, 0x08, // 4/4
    0x00, 0xff, 0x59, 0x02, 0xfd, 0x00, // three flats, major
    0x00, 0xff, 0x51, 0x03, 0x07, 0xa1, 0x20, // 500000
    0x83, 0x60, 0xff, 0x51, 0x03, 0x0f, 0x42, 0x40, // 1000000 at tick 480
    0x00, 0xff, 0x06, 0x05, b'v', b'e', b'r', b's', b'e', // marker
    0x00, 0xff, 0x2f, 0x00,
];

/// One of every kind of channel message, a sysex, sequencer-specific data and a meta type nobody
/// knows about. Every event has its own status byte.
pub const BUSY_TRACK: &[u8] = &[
    0x00, 0xc0, 0x05, // program change
    0x00, 0xb0, 0x07, 0x64, // volume
    0x00, 0x90, 0x3c, 0x40, // note on
    0x60, 0x80, 0x3c, 0x40, // note off at 96
    0x00, 0xe0, 0x00, 0x40, // pitch bend center
    0x00, 0xd0, 0x30, // channel pressure
    0x00, 0xa0, 0x3c, 0x20, // poly pressure
    0x00, 0xf0, 0x05, 0x7e, 0x7f, 0x09, 0x01, 0xf7, // general midi on
    0x00, 0xff, 0x7f, 0x03, 0x00, 0x00, 0x41, // sequencer specific
    0x00, 0xff, 0x60, 0x02, 0x01, 0x02, // unknown meta type
    0x83, 0x00, 0xff, 0x2f, 0x00, // end at 480
];

/// Four notes, every status byte written out.
pub const NOTES_EXPLICIT: &[u8] = &[
    0x00, 0x90, 0x3c, 0x40, //
    0x60, 0x90, 0x3c, 0x00, //
    0x00, 0x90, 0x3e, 0x40, //
    0x60, 0x90, 0x3e, 0x00, //
    0x00, 0xff, 0x2f, 0x00,
];

/// The same four notes using running status.
pub const NOTES_RUNNING: &[u8] = &[
    0x00, 0x90, 0x3c, 0x40, //
    0x60, 0x3c, 0x00, //
    0x00, 0x3e, 0x40, //
    0x60, 0x3e, 0x00, //
    0x00, 0xff, 0x2f, 0x00,
];

/// Wraps `body` in a chunk with the given id and a big-endian length.
pub fn chunk(id: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut bytes = id.to_vec();
    bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
    bytes.extend_from_slice(body);
    bytes
}

/// Builds Standard MIDI File bytes without going through the library.
#[derive(Clone, Debug)]
pub struct SmfBuilder {
    format: u16,
    division: u16,
    declared_tracks: Option<u16>,
    chunks: Vec<Vec<u8>>,
}

impl SmfBuilder {
    pub fn new(format: u16, division: u16) -> Self {
        Self {
            format,
            division,
            declared_tracks: None,
            chunks: Vec::new(),
        }
    }

    /// Add an `MTrk` chunk with `body`.
    pub fn track(mut self, body: &[u8]) -> Self {
        self.chunks.push(chunk(b"MTrk", body));
        self
    }

    /// Add any chunk. It is not counted as a track.
    pub fn raw_chunk(mut self, id: &[u8; 4], body: &[u8]) -> Self {
        self.chunks.push(chunk(id, body));
        self
    }

    /// Declare a track count in the header other than the number of tracks added.
    pub fn declare_tracks(mut self, count: u16) -> Self {
        self.declared_tracks = Some(count);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let track_count = self.declared_tracks.unwrap_or_else(|| {
            self.chunks
                .iter()
                .filter(|c| c.starts_with(b"MTrk"))
                .count() as u16
        });
        let mut header = Vec::new();
        header.extend_from_slice(&self.format.to_be_bytes());
        header.extend_from_slice(&track_count.to_be_bytes());
        header.extend_from_slice(&self.division.to_be_bytes());
        let mut bytes = chunk(b"MThd", &header);
        for c in &self.chunks {
            bytes.extend_from_slice(c);
        }
        bytes
    }
}

/// Format 1, 480 ticks per quarter, the conductor track and the busy track.
pub fn two_track_file() -> Vec<u8> {
    SmfBuilder::new(1, 480)
        .track(CONDUCTOR_TRACK)
        .track(BUSY_TRACK)
        .build()
}
