//! Packet headers.
//!
//! Every packet starts with a Cipher Type Byte naming the packet tag,
//! followed by the body length (see [Section 4.2 of RFC 4880]).  This
//! crate always produces new-format headers; old-format packets are
//! only ever passed through verbatim when re-emitting pre-serialized
//! raw packets.
//!
//!   [Section 4.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2

use std::io;

use crate::packet::Tag;
use crate::Result;

/// A new-format Cipher Type Byte.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CTB {
    tag: Tag,
}

impl CTB {
    /// Constructs a CTB for the given packet tag.
    pub fn new(tag: Tag) -> Self {
        CTB { tag }
    }

    /// Returns the tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Writes the CTB octet: bit 7 set, bit 6 marking the new
    /// format, the tag in the low six bits.
    pub fn serialize(&self, o: &mut dyn io::Write) -> Result<()> {
        o.write_all(&[0b1100_0000 | u8::from(self.tag)])?;
        Ok(())
    }
}

/// A packet's body length.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum BodyLength {
    /// Fully buffered body of the given length.
    Full(u32),
}

impl BodyLength {
    /// Writes the new-format length encoding: one octet below 192,
    /// two octets below 8384, five octets otherwise.
    pub fn serialize(&self, o: &mut dyn io::Write) -> Result<()> {
        match self {
            BodyLength::Full(l) => {
                let l = *l;
                if l < 192 {
                    o.write_all(&[l as u8])?;
                } else if l < 8384 {
                    let v = l - 192;
                    o.write_all(&[(v >> 8) as u8 + 192, v as u8])?;
                } else {
                    o.write_all(&[0xff])?;
                    o.write_all(&l.to_be_bytes())?;
                }
            },
        }
        Ok(())
    }

    /// Number of octets the length encoding occupies.
    pub fn serialized_len(&self) -> usize {
        match self {
            BodyLength::Full(l) =>
                if *l < 192 { 1 } else if *l < 8384 { 2 } else { 5 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(l: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        BodyLength::Full(l).serialize(&mut buf).unwrap();
        assert_eq!(buf.len(), BodyLength::Full(l).serialized_len());
        buf
    }

    #[test]
    fn one_octet_lengths() {
        assert_eq!(encode(0), [0]);
        assert_eq!(encode(63), [63]);
        assert_eq!(encode(191), [191]);
    }

    #[test]
    fn two_octet_lengths() {
        // Examples from RFC 4880, Section 4.2.3.
        assert_eq!(encode(192), [0xc0, 0x00]);
        assert_eq!(encode(1723), [0xc5, 0xfb]);
        assert_eq!(encode(8383), [0xdf, 0xff]);
    }

    #[test]
    fn five_octet_lengths() {
        assert_eq!(encode(8384), [0xff, 0x00, 0x00, 0x20, 0xc0]);
        assert_eq!(encode(100000), [0xff, 0x00, 0x01, 0x86, 0xa0]);
    }

    #[test]
    fn ctb_octet() {
        let mut buf = Vec::new();
        CTB::new(Tag::PublicKey).serialize(&mut buf).unwrap();
        assert_eq!(buf, [0xc6]);

        let mut buf = Vec::new();
        CTB::new(Tag::Signature).serialize(&mut buf).unwrap();
        assert_eq!(buf, [0xc2]);
    }
}
