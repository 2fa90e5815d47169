use crate::error::ExportResult;
use snafu::ResultExt;
use std::io::Write;

/// Settings for writing a [`crate::Composition`].
#[derive(Copy, Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct WriteSettings {
    /// Omit repeated channel status bytes.
    pub running_status: bool,
}

/// A wrapper for any `Write`, which provides a setting for running status, and allows for the
/// storing of the most recent status byte.
pub(crate) struct Scribe<W: Write> {
    w: W,
    settings: WriteSettings,
    running_status_byte: Option<u8>,
}

impl<W: Write> Write for Scribe<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.w.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.w.flush()
    }
}

impl<W: Write> Scribe<W> {
    /// Create a new `Scribe`.
    pub(crate) fn new(w: W, settings: WriteSettings) -> Self {
        Self {
            w,
            settings,
            running_status_byte: None,
        }
    }

    /// Write a status byte. If `running_status` is `true`, and the `status` byte is the same as
    /// `previous_status`, then nothing happens.
    pub(crate) fn write_status_byte(&mut self, status: u8) -> ExportResult<()> {
        match self.running_status() {
            Some(previous_status) if previous_status == status => Ok(()),
            _ => {
                write_u8!(self.w, status)?;
                self.set_running_status(status);
                Ok(())
            }
        }
    }

    /// If the `running_status` setting is true, and a previous status byte has been written, then
    /// the previous status byte is returned.
    pub(crate) fn running_status(&self) -> Option<u8> {
        if self.use_running_status() {
            self.running_status_byte
        } else {
            None
        }
    }

    pub(crate) fn set_running_status(&mut self, value: u8) {
        if self.use_running_status() {
            self.running_status_byte = Some(value)
        }
    }

    /// Sysex and meta events cancel running status for most readers, so the next channel message
    /// is written with an explicit status byte.
    pub(crate) fn clear_running_status(&mut self) {
        self.running_status_byte = None
    }

    /// Returns true if the settings are set to use `running_status`.
    pub(crate) fn use_running_status(&self) -> bool {
        self.settings.running_status
    }
}

#[test]
fn running_status_omits_repeats() {
    let mut bytes = Vec::new();
    let mut scribe = Scribe::new(
        &mut bytes,
        WriteSettings {
            running_status: true,
        },
    );
    scribe.write_status_byte(0x90).unwrap();
    scribe.write_status_byte(0x90).unwrap();
    scribe.clear_running_status();
    scribe.write_status_byte(0x90).unwrap();
    scribe.write_status_byte(0x80).unwrap();
    assert_eq!(vec![0x90, 0x90, 0x80], bytes);
}

#[test]
fn explicit_status_always_writes() {
    let mut bytes = Vec::new();
    let mut scribe = Scribe::new(&mut bytes, WriteSettings::default());
    scribe.write_status_byte(0xc0).unwrap();
    scribe.write_status_byte(0xc0).unwrap();
    assert_eq!(vec![0xc0, 0xc0], bytes);
}
