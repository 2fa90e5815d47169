use std::fmt::{Display, Formatter};

/// Something odd about a file that does not stop it from being imported. Diagnostics are kept on
/// the [`crate::Composition`] and, in strict mode, turned into [`crate::ImportError::Strict`].
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum Diagnostic {
    /// The track chunk ended without an end-of-track meta event.
    MissingEndOfTrack { track: usize },

    /// Bytes were left in the track chunk after its end-of-track event.
    TrailingBytes { track: usize, count: usize },

    /// A chunk with an id other than `MTrk` was skipped.
    UnknownChunk { id: String, length: usize },

    /// The `MThd` chunk was longer than six bytes, the rest was ignored.
    OversizedHeader { length: usize },

    /// Chunks were found after the number of tracks declared in the header.
    UndeclaredChunks { count: usize },
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::MissingEndOfTrack { track } => {
                write!(f, "track {} has no end-of-track event", track)
            }
            Diagnostic::TrailingBytes { track, count } => write!(
                f,
                "{} bytes after the end-of-track event of track {}",
                count, track
            ),
            Diagnostic::UnknownChunk { id, length } => {
                write!(f, "skipped unknown '{}' chunk of {} bytes", id, length)
            }
            Diagnostic::OversizedHeader { length } => {
                write!(f, "header chunk is {} bytes long, expected 6", length)
            }
            Diagnostic::UndeclaredChunks { count } => {
                write!(f, "{} chunks after the declared tracks", count)
            }
        }
    }
}

#[test]
fn display_names_the_track() {
    let d = Diagnostic::TrailingBytes { track: 2, count: 3 };
    assert_eq!("3 bytes after the end-of-track event of track 2", d.to_string());
}
