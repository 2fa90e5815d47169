//! Variable-length quantities, the 7-bits-per-byte big-endian integers used for delta-times and
//! event lengths in MIDI files.

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

#[derive(Debug, PartialEq)]
pub enum VlqError {
    /// The bytes ended while the continuation bit was still set.
    IncompleteNumber,
    /// The value needs more than four bytes.
    Overflow,
}

impl Display for VlqError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl Error for VlqError {}

/// 0x7f, 127: The largest 7 bit number.
const MAX_7BIT: u8 = 0b0111_1111;

/// 0x80, 128: The highest bit is set, this bit indicates that another byte follows.
pub(crate) const CONTINUE: u8 = 0b1000_0000;

/// A MIDI file never uses more than four bytes for a variable-length quantity.
pub const MAX_VLQ_BYTES: usize = 4;

/// The largest value that can be encoded in [`MAX_VLQ_BYTES`] bytes.
pub const MAX_VLQ_VALUE: u32 = 0x0fff_ffff;

/// Convert a list of numbers to a stream of bytes encoded with variable length encoding.
pub fn to_bytes(values: &[u32]) -> Result<Vec<u8>, VlqError> {
    let mut bytes = Vec::with_capacity(values.len());
    for &value in values {
        bytes.extend(encode_u32(value)?);
    }
    Ok(bytes)
}

pub(crate) fn encode_u32(mut value: u32) -> Result<Vec<u8>, VlqError> {
    if value > MAX_VLQ_VALUE {
        return Err(VlqError::Overflow);
    }
    let mut result = vec![(value & u32::from(MAX_7BIT)) as u8];
    value >>= 7;
    while value > 0 {
        // every byte but the last one carries the continuation bit
        result.push((value & u32::from(MAX_7BIT)) as u8 | CONTINUE);
        value >>= 7;
    }
    result.reverse();
    Ok(result)
}

/// Given a stream of bytes, extract all numbers which are encoded in there.
pub fn from_bytes(bytes: &[u8]) -> Result<Vec<u32>, VlqError> {
    let mut start = 0;
    let mut result = Vec::new();
    for (i, b) in bytes.iter().enumerate() {
        if b & CONTINUE == 0 {
            result.push(decode_slice(&bytes[start..=i])?);
            start = i + 1;
        }
    }
    if start != bytes.len() || result.is_empty() {
        return Err(VlqError::IncompleteNumber);
    }
    Ok(result)
}

/// Decodes exactly one quantity, which must occupy all of `bytes`.
pub(crate) fn decode_slice(bytes: &[u8]) -> Result<u32, VlqError> {
    if bytes.len() > MAX_VLQ_BYTES {
        return Err(VlqError::Overflow);
    }
    match bytes.last() {
        Some(last) if last & CONTINUE == 0 => {}
        _ => return Err(VlqError::IncompleteNumber),
    }
    Ok(bytes
        .iter()
        .fold(0u32, |acc, b| (acc << 7) | u32::from(b & MAX_7BIT)))
}

#[test]
fn to_single_byte() {
    assert_eq!(&[0x00], to_bytes(&[0x00]).unwrap().as_slice());
    assert_eq!(&[0x40], to_bytes(&[0x40]).unwrap().as_slice());
    assert_eq!(&[0x7f], to_bytes(&[0x7f]).unwrap().as_slice());
}

#[test]
fn to_double_byte() {
    assert_eq!(&[0x81, 0x00], to_bytes(&[0x80]).unwrap().as_slice());
    assert_eq!(&[0xc0, 0x00], to_bytes(&[0x2000]).unwrap().as_slice());
    assert_eq!(&[0xff, 0x7f], to_bytes(&[0x3fff]).unwrap().as_slice());
}

#[test]
fn to_quadruple_byte() {
    assert_eq!(
        &[0x81, 0x80, 0x80, 0x00],
        to_bytes(&[0x20_0000]).unwrap().as_slice()
    );
    assert_eq!(
        &[0xff, 0xff, 0xff, 0x7f],
        to_bytes(&[0x0fff_ffff]).unwrap().as_slice()
    );
}

#[test]
fn too_big_for_four_bytes() {
    assert_eq!(Err(VlqError::Overflow), to_bytes(&[0x1000_0000]));
    assert_eq!(
        Err(VlqError::Overflow),
        from_bytes(&[0x81, 0x80, 0x80, 0x80, 0x00])
    );
}

#[test]
fn from_bytes_multiple_values() {
    assert_eq!(
        Ok(vec![0x2000, 0x12_3456, 0x0fff_ffff, 0x00, 0x3fff, 0x4000]),
        from_bytes(&[
            0xc0, 0x00, 0xc8, 0xe8, 0x56, 0xff, 0xff, 0xff, 0x7f, 0x00, 0xff, 0x7f, 0x81, 0x80,
            0x00,
        ])
    );
}

#[test]
fn incomplete_byte_sequence() {
    assert_eq!(Err(VlqError::IncompleteNumber), from_bytes(&[0xff]));
    assert_eq!(Err(VlqError::IncompleteNumber), from_bytes(&[0x40, 0x80]));
    assert_eq!(Err(VlqError::IncompleteNumber), from_bytes(&[]));
}
