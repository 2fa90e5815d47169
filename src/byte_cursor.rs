use crate::vlq::{decode_slice, CONTINUE, MAX_VLQ_BYTES};
use log::trace;
use snafu::{ensure, OptionExt, Snafu};

/// A positional reader over a borrowed byte slice. When the slice is the body of a chunk, every
/// read is bounded by the chunk's declared length rather than by the end of the file.
#[derive(Clone, Debug)]
pub(crate) struct ByteCursor<'a> {
    bytes: &'a [u8],
    offset: usize,
    /// Absolute position of `bytes[0]` within the file, used for error reporting.
    base: usize,
}

/// A failed read. Positions are absolute byte offsets into the file being imported.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ByteError {
    #[snafu(display("unexpected end reached around byte {}", position))]
    End { position: usize },

    #[snafu(display("too many bytes while reading vlq around {}", position))]
    VlqTooBig { position: usize },
}

pub(crate) type ByteResult<T> = std::result::Result<T, ByteError>;

impl<'a> ByteCursor<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self::with_base(bytes, 0)
    }

    /// Create a cursor over `bytes` which begin at absolute file position `base`.
    pub(crate) fn with_base(bytes: &'a [u8], base: usize) -> Self {
        Self {
            bytes,
            offset: 0,
            base,
        }
    }

    /// The absolute file position of the next byte to be read.
    pub(crate) fn position(&self) -> usize {
        self.base + self.offset
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    pub(crate) fn is_end(&self) -> bool {
        self.remaining() == 0
    }

    /// Get the next value without advancing the cursor.
    pub(crate) fn peek(&self) -> Option<u8> {
        self.bytes.get(self.offset).copied()
    }

    /// Get the next four values without advancing the cursor.
    pub(crate) fn peek4(&self) -> Option<[u8; 4]> {
        let slice = self.bytes.get(self.offset..self.offset + 4)?;
        let mut tag = [0u8; 4];
        tag.copy_from_slice(slice);
        Some(tag)
    }

    pub(crate) fn read_u8(&mut self) -> ByteResult<u8> {
        let byte = self.peek().context(EndSnafu {
            position: self.position(),
        })?;
        trace!("read {:#x} at position {}", byte, self.position());
        self.offset += 1;
        Ok(byte)
    }

    /// Take the next `n` bytes as a sub-slice of the underlying buffer. Nothing is consumed if
    /// fewer than `n` bytes remain.
    pub(crate) fn take_slice(&mut self, n: usize) -> ByteResult<&'a [u8]> {
        ensure!(
            n <= self.remaining(),
            EndSnafu {
                position: self.base + self.bytes.len()
            }
        );
        let bytes: &'a [u8] = self.bytes;
        let slice = &bytes[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> ByteResult<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.take_slice(N)?);
        Ok(array)
    }

    pub(crate) fn read_tag(&mut self) -> ByteResult<[u8; 4]> {
        self.read_array()
    }

    pub(crate) fn read_u16(&mut self) -> ByteResult<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub(crate) fn read_u24(&mut self) -> ByteResult<u32> {
        let [a, b, c] = self.read_array::<3>()?;
        Ok(u32::from_be_bytes([0, a, b, c]))
    }

    pub(crate) fn read_u32(&mut self) -> ByteResult<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    /// RIFF containers store their lengths little-endian.
    pub(crate) fn read_u32_le(&mut self) -> ByteResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Reads the raw bytes of a variable-length quantity. At most [`MAX_VLQ_BYTES`] bytes are
    /// consumed; if the last of them still has its continuation bit set the quantity is malformed.
    pub(crate) fn read_vlq_bytes(&mut self) -> ByteResult<&'a [u8]> {
        let start = self.offset;
        loop {
            let byte = self.read_u8()?;
            if byte & CONTINUE != CONTINUE {
                break;
            }
            ensure!(
                self.offset - start < MAX_VLQ_BYTES,
                VlqTooBigSnafu {
                    position: self.base + start
                }
            );
        }
        let bytes: &'a [u8] = self.bytes;
        Ok(&bytes[start..self.offset])
    }

    pub(crate) fn read_vlq(&mut self) -> ByteResult<u32> {
        let position = self.position();
        let bytes = self.read_vlq_bytes()?;
        // at most four bytes were read, so this cannot overflow
        let decoded = decode_slice(bytes).map_err(|_| ByteError::VlqTooBig { position })?;
        trace!("decoded vlq value {} from {} bytes", decoded, bytes.len());
        Ok(decoded)
    }
}

#[test]
fn byte_cursor_test() {
    let bytes = [0x00u8, 0x01, 0x02, 0x03, 0x04, 0x10, 0x20, 0x30, 0x40];
    let mut cursor = ByteCursor::with_base(&bytes, 100);
    assert_eq!(100, cursor.position());
    assert_eq!(Some(0x00), cursor.peek());
    assert_eq!(0x00, cursor.read_u8().unwrap());
    assert_eq!(0x0102, cursor.read_u16().unwrap());
    assert_eq!(103, cursor.position());
    assert_eq!(0x03_0410, cursor.read_u24().unwrap());
    assert_eq!(3, cursor.remaining());
    assert_eq!(&[0x20, 0x30], cursor.take_slice(2).unwrap());
    let err = cursor.read_u32().unwrap_err();
    assert!(matches!(err, ByteError::End { position: 109 }));
    // a failed read consumes nothing
    assert_eq!(0x40, cursor.read_u8().unwrap());
    assert!(cursor.is_end());
    assert!(cursor.peek().is_none());
}

#[test]
fn read_tag_and_le() {
    let bytes = *b"RIFF\x04\x00\x00\x00";
    let mut cursor = ByteCursor::new(&bytes);
    assert_eq!(Some(*b"RIFF"), cursor.peek4());
    assert_eq!(*b"RIFF", cursor.read_tag().unwrap());
    assert_eq!(4, cursor.read_u32_le().unwrap());
    assert!(cursor.peek4().is_none());
}

#[test]
fn read_vlq_values() {
    let bytes = [0x7f, 0x81, 0x00, 0xff, 0xff, 0xff, 0x7f, 0x00];
    let mut cursor = ByteCursor::new(&bytes);
    assert_eq!(0x7f, cursor.read_vlq().unwrap());
    assert_eq!(0x80, cursor.read_vlq().unwrap());
    assert_eq!(0x0fff_ffff, cursor.read_vlq().unwrap());
    assert_eq!(0, cursor.read_vlq().unwrap());
    assert!(cursor.is_end());
}

#[test]
fn read_vlq_five_bytes_is_malformed() {
    let bytes = [0x00, 0x81, 0x80, 0x80, 0x80, 0x00];
    let mut cursor = ByteCursor::with_base(&bytes, 10);
    cursor.read_u8().unwrap();
    let err = cursor.read_vlq().unwrap_err();
    assert!(matches!(err, ByteError::VlqTooBig { position: 11 }));
}

#[test]
fn read_vlq_truncated_is_end() {
    let bytes = [0x81, 0x80];
    let mut cursor = ByteCursor::new(&bytes);
    let err = cursor.read_vlq().unwrap_err();
    assert!(matches!(err, ByteError::End { position: 2 }));
}
