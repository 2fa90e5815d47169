use crate::cancel::CancelFlag;
use crate::diagnostic::Diagnostic;
use crate::error::{CancelledSnafu, NotAMidiFileSnafu, Result, StrictSnafu};
use crate::file::chunk::{unwrap_riff, ChunkReader, MTHD, MTRK};
use crate::file::{Composition, Header, Track, HEADER_LENGTH};
use log::{debug, warn};
use snafu::{ensure, ResultExt};

/// Settings for [`import_with`].
#[derive(Copy, Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct ImportSettings {
    /// Fail with [`crate::ImportError::Strict`] on anything that would otherwise only be recorded
    /// as a [`Diagnostic`].
    pub strict: bool,
}

/// Where an [`Importer`] is, or where it stopped.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ImportStage {
    Start,
    HeaderRead,
    /// Decoding the track with this zero-based index.
    TrackLoop(usize),
    Assembling,
    Done,
    Cancelled,
    Failed,
}

/// Decode a Standard MIDI File, or an RMID file wrapping one, with the default settings.
///
/// `on_progress` is called with `(tracks_done, tracks_total)` after each track. `cancel` is
/// checked before each track and once more before the composition is assembled; if it is set the
/// import returns [`crate::ImportError::Cancelled`] and nothing that was decoded is kept.
pub fn import<F>(bytes: &[u8], cancel: &CancelFlag, on_progress: F) -> Result<Composition>
where
    F: FnMut(usize, usize),
{
    import_with(bytes, ImportSettings::default(), cancel, on_progress)
}

/// Same as [`import`] with explicit settings.
pub fn import_with<F>(
    bytes: &[u8],
    settings: ImportSettings,
    cancel: &CancelFlag,
    on_progress: F,
) -> Result<Composition>
where
    F: FnMut(usize, usize),
{
    Importer::new(settings, cancel).run(bytes, on_progress)
}

/// Drives a single import through its stages. Use [`import`] unless the final stage is of
/// interest.
#[derive(Debug)]
pub struct Importer<'a> {
    settings: ImportSettings,
    cancel: &'a CancelFlag,
    stage: ImportStage,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Importer<'a> {
    pub fn new(settings: ImportSettings, cancel: &'a CancelFlag) -> Self {
        Self {
            settings,
            cancel,
            stage: ImportStage::Start,
            diagnostics: Vec::new(),
        }
    }

    pub fn stage(&self) -> ImportStage {
        self.stage
    }

    pub fn run<F>(&mut self, bytes: &[u8], mut on_progress: F) -> Result<Composition>
    where
        F: FnMut(usize, usize),
    {
        let result = self.run_inner(bytes, &mut on_progress);
        match &result {
            Ok(_) => self.set_stage(ImportStage::Done),
            Err(e) if e.is_cancelled() => self.set_stage(ImportStage::Cancelled),
            Err(e) => {
                debug!("import failed: {}", e);
                self.set_stage(ImportStage::Failed)
            }
        }
        result
    }

    fn run_inner(
        &mut self,
        bytes: &[u8],
        on_progress: &mut dyn FnMut(usize, usize),
    ) -> Result<Composition> {
        self.diagnostics.clear();
        let bytes = unwrap_riff(bytes)?;

        // reject anything that does not start like a header chunk before trusting its length
        let prefix = &bytes[..bytes.len().min(MTHD.len())];
        ensure!(
            MTHD.starts_with(prefix),
            NotAMidiFileSnafu {
                site: site!(),
                found: String::from_utf8_lossy(prefix),
            }
        );

        let mut reader = ChunkReader::new(bytes);
        let chunk = reader.next_chunk().context(eof!())?;
        let header = Header::decode(&chunk)?;
        if chunk.len() > HEADER_LENGTH {
            self.note(Diagnostic::OversizedHeader {
                length: chunk.len(),
            })?;
        }
        self.set_stage(ImportStage::HeaderRead);

        let total = usize::from(header.track_count());
        let mut tracks = Vec::with_capacity(total);
        while tracks.len() < total {
            self.check_cancelled()?;
            let index = tracks.len();
            self.set_stage(ImportStage::TrackLoop(index));
            let chunk = reader.next_chunk().context(eof!())?;
            if !chunk.is(MTRK) {
                self.note(Diagnostic::UnknownChunk {
                    id: chunk.id_str().into_owned(),
                    length: chunk.len(),
                })?;
                continue;
            }
            let mut found = Vec::new();
            let track = Track::decode(&chunk, index, &mut found)?;
            for diagnostic in found {
                self.note(diagnostic)?;
            }
            tracks.push(track);
            on_progress(index + 1, total);
        }

        let undeclared = count_chunks(&mut reader);
        if undeclared > 0 {
            self.note(Diagnostic::UndeclaredChunks { count: undeclared })?;
        }

        self.check_cancelled()?;
        self.set_stage(ImportStage::Assembling);
        let diagnostics = std::mem::take(&mut self.diagnostics);
        Ok(Composition::new(header, tracks).with_diagnostics(diagnostics))
    }

    fn set_stage(&mut self, stage: ImportStage) {
        debug!("import stage {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    fn check_cancelled(&self) -> Result<()> {
        ensure!(!self.cancel.is_cancelled(), CancelledSnafu);
        Ok(())
    }

    /// Records a diagnostic, or fails with it in strict mode.
    fn note(&mut self, diagnostic: Diagnostic) -> Result<()> {
        ensure!(
            !self.settings.strict,
            StrictSnafu {
                site: site!(),
                diagnostic,
            }
        );
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
        Ok(())
    }
}

/// Counts the well-formed chunks left in the reader. Bytes that do not form a complete chunk are
/// ignored.
fn count_chunks(reader: &mut ChunkReader<'_>) -> usize {
    let mut count = 0;
    while !reader.is_end() {
        match reader.next_chunk() {
            Ok(chunk) => debug!("undeclared '{}' chunk after the last track", chunk.id_str()),
            Err(_) => break,
        }
        count += 1;
    }
    count
}
