use crate::byte_cursor::ByteError;
use crate::diagnostic::Diagnostic;
use snafu::Snafu;
use std::num::TryFromIntError;

/// The public Result type for importing.
pub type Result<T> = std::result::Result<T, ImportError>;

/// The Result type for exporting a [`crate::Composition`] back to bytes.
pub type ExportResult<T> = std::result::Result<T, ExportError>;

/// Everything that can stop an import. None of these are retried by the decoder; the first one
/// encountered is returned and any partially decoded data is dropped.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum ImportError {
    #[snafu(display("{}: Not a MIDI file, expected 'MThd' but found '{}'", site, found))]
    NotAMidiFile { site: String, found: String },

    #[snafu(display("{}: Unexpected MIDI file format {}", site, format))]
    UnexpectedFormat { site: String, format: u16 },

    #[snafu(display("{}: Invalid division value {:#06X}", site, value))]
    InvalidDivision { site: String, value: u16 },

    #[snafu(display(
        "{}: A format 0 MIDI file must have exactly one track, found {}",
        site,
        track_count
    ))]
    FormatTrackCount { site: String, track_count: u16 },

    #[snafu(display(
        "{}: Wrong length for '{}' chunk, data overruns the declared length around byte {}",
        site,
        id,
        position
    ))]
    ChunkLengthMismatch {
        site: String,
        id: String,
        position: usize,
    },

    #[snafu(display("{}: Attempt to read past MIDI file end: {}", site, source))]
    Eof { site: String, source: ByteError },

    #[snafu(display(
        "{}: Malformed variable-length quantity around byte {}",
        site,
        position
    ))]
    MalformedVlq { site: String, position: usize },

    #[snafu(display(
        "{}: Running status used for first event in track {} around byte {}",
        site,
        track,
        position
    ))]
    RunningStatusBeforeFirstEvent {
        site: String,
        track: usize,
        position: usize,
    },

    #[snafu(display(
        "{}: Channel event with status {:#04X} in track {} is truncated around byte {}",
        site,
        status,
        track,
        position
    ))]
    TruncatedChannelEvent {
        site: String,
        track: usize,
        status: u8,
        position: usize,
    },

    #[snafu(display(
        "{}: Meta event in track {} is truncated around byte {}",
        site,
        track,
        position
    ))]
    TruncatedMetaEvent {
        site: String,
        track: usize,
        position: usize,
    },

    #[snafu(display(
        "{}: System exclusive event in track {} is truncated around byte {}",
        site,
        track,
        position
    ))]
    TruncatedSysexEvent {
        site: String,
        track: usize,
        position: usize,
    },

    #[snafu(display(
        "{}: Expected a data byte in track {} but found {:#04X} around byte {}",
        site,
        track,
        byte,
        position
    ))]
    InvalidDataByte {
        site: String,
        track: usize,
        byte: u8,
        position: usize,
    },

    #[snafu(display(
        "{}: Status byte {:#04X} in track {} cannot appear in a MIDI file (around byte {})",
        site,
        status,
        track,
        position
    ))]
    UnexpectedStatus {
        site: String,
        track: usize,
        status: u8,
        position: usize,
    },

    #[snafu(display(
        "{}: Meta event {:#04X} in track {} has an invalid length of {}",
        site,
        meta_type,
        track,
        length
    ))]
    InvalidMetaEvent {
        site: String,
        track: usize,
        meta_type: u8,
        length: usize,
    },

    #[snafu(display("{}: Rejected in strict mode: {}", site, diagnostic))]
    Strict { site: String, diagnostic: Diagnostic },

    #[snafu(display("Cancelled by user"))]
    Cancelled,
}

impl ImportError {
    /// Returns `true` if the import stopped because the caller asked it to.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ImportError::Cancelled)
    }

    /// Maps a failed read inside a chunk body. Running off the end of a body that sits inside a
    /// longer file means the chunk lied about its length.
    pub(crate) fn from_chunk_read(e: ByteError, id: &str, site: String) -> Self {
        match e {
            ByteError::End { position } => ImportError::ChunkLengthMismatch {
                site,
                id: id.into(),
                position,
            },
            ByteError::VlqTooBig { position } => ImportError::MalformedVlq { site, position },
        }
    }
}

/// Everything that can go wrong while writing a [`crate::Composition`].
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum ExportError {
    #[snafu(display("{} Error while writing data: {}", site, source))]
    Io {
        site: String,
        source: std::io::Error,
    },

    #[snafu(display("{} There are too many tracks for a 16-bit uint: {}", site, source))]
    TooManyTracks {
        site: String,
        source: TryFromIntError,
    },

    #[snafu(display("{} The track is too long and overflows a u32: {}", site, source))]
    TrackTooLong {
        site: String,
        source: TryFromIntError,
    },

    #[snafu(display(
        "{} The gap between ticks {} and {} in track {} does not fit in a delta-time",
        site,
        previous,
        tick,
        track
    ))]
    DeltaTooLarge {
        site: String,
        track: usize,
        previous: u64,
        tick: u64,
    },

    #[snafu(display("{} {} bytes of event data do not fit in a length field", site, length))]
    DataTooLong { site: String, length: usize },
}

macro_rules! site {
    () => {
        format!("{}:{}", file!(), line!())
    };
}

/// Context for reads at the file level, where running out of bytes is a true end-of-file.
macro_rules! eof {
    () => {
        crate::error::EofSnafu { site: site!() }
    };
}

/// Maps a `ByteError` raised inside the body of chunk `$id`.
macro_rules! in_chunk {
    ($id:expr) => {
        |e| crate::error::ImportError::from_chunk_read(e, $id, site!())
    };
}

macro_rules! wr {
    () => {
        crate::error::IoSnafu { site: site!() }
    };
}

#[test]
fn site_test() {
    let line = line!() + 1;
    let site = site!();
    assert!(site.contains("error.rs"));
    assert!(site.contains(format!("{}", line).as_str()));
}

#[test]
fn chunk_read_end_is_length_mismatch() {
    let e = ImportError::from_chunk_read(ByteError::End { position: 40 }, "MTrk", site!());
    let message = format!("{}", e);
    assert!(matches!(e, ImportError::ChunkLengthMismatch { position: 40, .. }));
    assert!(message.contains("Wrong length for 'MTrk' chunk"));
}

#[test]
fn chunk_read_vlq_is_malformed_vlq() {
    let e = ImportError::from_chunk_read(ByteError::VlqTooBig { position: 7 }, "MTrk", site!());
    assert!(matches!(e, ImportError::MalformedVlq { position: 7, .. }));
}

#[test]
fn cancelled_has_no_site() {
    let e = ImportError::Cancelled;
    assert!(e.is_cancelled());
    assert_eq!("Cancelled by user", format!("{}", e));
}
