/*!
Imports Standard MIDI Files.

The bytes of a file are decoded into a [`Composition`]: the header, every track as a list of events
at absolute ticks, and a tempo map merged from all tracks. Decoding is strict about structure.
The first structural problem fails the whole import with an [`ImportError`] and no partial result.
Harmless oddities, such as a missing end-of-track event, are kept as [`Diagnostic`]s instead.

```
use smf_import::{import, CancelFlag};

let bytes = [
    b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 1, 0, 1, 0x01, 0xe0,
    b'M', b'T', b'r', b'k', 0, 0, 0, 11,
    0x00, 0xff, 0x51, 0x03, 0x07, 0xa1, 0x20,
    0x00, 0xff, 0x2f, 0x00,
];
let cancel = CancelFlag::new();
let composition = import(&bytes, &cancel, |done, total| println!("{}/{}", done, total)).unwrap();
assert_eq!(1, composition.tracks_len());
assert_eq!(500_000, composition.tempo_map().tempo_at(0));
```

An import runs on the calling thread. It can be stopped from another thread through a clone of
its [`CancelFlag`].
!*/

#[macro_use]
mod error;
#[macro_use]
mod macros;

mod byte_cursor;
mod cancel;
pub mod core;
mod diagnostic;
pub mod file;
mod import;
mod scribe;
mod text;
pub mod vlq;

pub use byte_cursor::ByteError;
pub use cancel::CancelFlag;
pub use diagnostic::Diagnostic;
pub use error::{ExportError, ExportResult, ImportError, Result};
pub use file::{Composition, TempoMap, Track, TrackEvent};
pub use import::{import, import_with, ImportSettings, ImportStage, Importer};
pub use scribe::WriteSettings;
pub use text::Text;
