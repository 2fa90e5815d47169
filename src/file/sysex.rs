use crate::core::status_type::{FILE_SYSEX_F0, FILE_SYSEX_F7};
use crate::error::ExportResult;
use crate::file::write_length;
use crate::scribe::Scribe;
use snafu::ResultExt;
use std::io::Write;

/// A system exclusive event as stored in a file: `F0 <length> <bytes to be transmitted after F0>`
/// or `F7 <length> <all bytes to be transmitted>`. The data is kept exactly as found, including any
/// terminating `F7`.
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct SysexEvent {
    t: SysexEventType,
    data: Vec<u8>,
}

impl SysexEvent {
    pub fn new(t: SysexEventType, data: Vec<u8>) -> Self {
        Self { t, data }
    }

    pub fn event_type(&self) -> SysexEventType {
        self.t
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>) -> ExportResult<()> {
        write_u8!(w, self.t as u8)?;
        write_length(w, self.data.len())?;
        w.write_all(&self.data).context(wr!())?;
        w.clear_running_status();
        Ok(())
    }
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash, Default)]
pub enum SysexEventType {
    /// A complete message, or the first packet of a message split across several events.
    #[default]
    F0 = FILE_SYSEX_F0,
    /// A continuation packet, or an escape used to send arbitrary bytes.
    F7 = FILE_SYSEX_F7,
}

impl SysexEventType {
    pub(crate) fn from_status(status: u8) -> Option<Self> {
        match status {
            FILE_SYSEX_F0 => Some(SysexEventType::F0),
            FILE_SYSEX_F7 => Some(SysexEventType::F7),
            _ => None,
        }
    }
}

#[test]
fn write_sysex() {
    use crate::scribe::WriteSettings;
    let event = SysexEvent::new(SysexEventType::F0, vec![0x7e, 0x7f, 0x09, 0x01, 0xf7]);
    let mut bytes = Vec::new();
    let mut scribe = Scribe::new(
        &mut bytes,
        WriteSettings {
            running_status: true,
        },
    );
    scribe.write_status_byte(0x90).unwrap();
    event.write(&mut scribe).unwrap();
    assert_eq!(None, scribe.running_status());
    assert_eq!(vec![0x90, 0xf0, 0x05, 0x7e, 0x7f, 0x09, 0x01, 0xf7], bytes);
}
