//! Composable output stages.
//!
//! Packet emission layers transformations over a byte sink: hashing
//! what passes through, encrypting it, or summing it for a checksum.
//! Each stage here owns its inner writer and hands it back from
//! `finalize`, so stages unwind strictly last-in-first-out and a
//! stage cannot be finalized twice.  Dropping a stage without
//! finalizing releases its context; no stage buffers plaintext
//! beyond the call that wrote it.

use std::io;

use crate::crypto::hash::Context;
use crate::crypto::symmetric::Encryptor;
use crate::crypto::SessionKey;
use crate::types::{HashAlgorithm, SymmetricAlgorithm};
use crate::Result;

/// A stage that forwards bytes unchanged while updating a hash
/// context.
pub struct HashingWriter<W: io::Write> {
    inner: W,
    ctx: Context,
}

impl<W: io::Write> HashingWriter<W> {
    /// Creates a hashing stage over `inner`.
    pub fn new(inner: W, algo: HashAlgorithm) -> Result<Self> {
        Ok(HashingWriter {
            inner,
            ctx: algo.context()?,
        })
    }

    /// Finalizes the stage, returning the inner writer and the
    /// digest over everything written.
    pub fn finalize(self) -> (W, Vec<u8>) {
        (self.inner, self.ctx.into_digest())
    }
}

impl<W: io::Write> io::Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.ctx.update(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// A stage that encrypts bytes in OpenPGP-CFB mode before passing
/// them on.
///
/// CFB is a stream mode; a trailing partial block needs no padding,
/// so `finalize` has nothing left to flush and simply returns the
/// inner writer.
pub struct CfbWriter<W: io::Write> {
    inner: W,
    cipher: Encryptor,
}

impl<W: io::Write> CfbWriter<W> {
    /// Creates an encrypting stage over `inner`.
    pub fn new(inner: W, algo: SymmetricAlgorithm, key: &SessionKey,
               iv: &[u8])
               -> Result<Self> {
        Ok(CfbWriter {
            inner,
            cipher: Encryptor::new(algo, key, iv)?,
        })
    }

    /// Finalizes the stage, returning the inner writer.
    pub fn finalize(self) -> Result<W> {
        Ok(self.inner)
    }
}

impl<W: io::Write> io::Write for CfbWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut ciphertext = buf.to_vec();
        self.cipher.encrypt(&mut ciphertext);
        self.inner.write_all(&ciphertext)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// A stage that forwards bytes unchanged while accumulating their
/// sum modulo 65536.
pub struct Sum16Writer<W: io::Write> {
    inner: W,
    sum: u16,
}

impl<W: io::Write> Sum16Writer<W> {
    /// Creates a checksumming stage over `inner`.
    pub fn new(inner: W) -> Self {
        Sum16Writer {
            inner,
            sum: 0,
        }
    }

    /// Finalizes the stage, returning the inner writer and the
    /// checksum.
    pub fn finalize(self) -> (W, u16) {
        (self.inner, self.sum)
    }
}

impl<W: io::Write> io::Write for Sum16Writer<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        for b in &buf[..written] {
            self.sum = self.sum.wrapping_add(*b as u16);
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// A stage that counts the bytes passing through.
///
/// The packet emitters use it to cross-check the number of body
/// bytes actually produced against the precomputed body length.
pub(crate) struct CountingWriter<W: io::Write> {
    inner: W,
    written: usize,
}

impl<W: io::Write> CountingWriter<W> {
    pub(crate) fn new(inner: W) -> Self {
        CountingWriter {
            inner,
            written: 0,
        }
    }

    pub(crate) fn written(&self) -> usize {
        self.written
    }
}

impl<W: io::Write> io::Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.written += written;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn hashing_writer_forwards_and_digests() {
        let mut sink = Vec::new();
        let mut w = HashingWriter::new(&mut sink, HashAlgorithm::SHA1)
            .unwrap();
        w.write_all(b"abc").unwrap();
        let (_, digest) = w.finalize();

        assert_eq!(sink, b"abc");
        let mut ctx = HashAlgorithm::SHA1.context().unwrap();
        ctx.update(b"abc");
        assert_eq!(digest, ctx.into_digest());
    }

    #[test]
    fn sum16_writer_accumulates() {
        let mut sink = Vec::new();
        let mut w = Sum16Writer::new(&mut sink);
        w.write_all(&[0x12, 0x34]).unwrap();
        let (_, sum) = w.finalize();
        assert_eq!(sum, 0x46);
        assert_eq!(sink, [0x12, 0x34]);

        // The sum wraps.
        let mut w = Sum16Writer::new(Vec::new());
        w.write_all(&vec![0xff; 257]).unwrap();
        let (_, sum) = w.finalize();
        assert_eq!(sum, 0xffff);
    }

    #[test]
    fn cfb_writer_matches_cipher() {
        let key: SessionKey = vec![0x11; 16].into();
        let iv = [0x22; 16];
        let data: Vec<u8> = (0u8..50).collect();

        let mut sink = Vec::new();
        let mut w = CfbWriter::new(&mut sink, SymmetricAlgorithm::AES128,
                                   &key, &iv).unwrap();
        // Split writes; the keystream must carry over.
        w.write_all(&data[..7]).unwrap();
        w.write_all(&data[7..]).unwrap();
        w.finalize().unwrap();

        let mut expected = data.clone();
        let mut enc = Encryptor::new(SymmetricAlgorithm::AES128,
                                     &key, &iv).unwrap();
        enc.encrypt(&mut expected);
        assert_eq!(sink, expected);
    }

    #[test]
    fn stages_nest_lifo() {
        // Hash above cipher: the digest must cover the plaintext,
        // the sink must receive ciphertext.
        let key: SessionKey = vec![0x33; 16].into();
        let iv = [0x44; 16];
        let mut sink = Vec::new();

        let cfb = CfbWriter::new(&mut sink, SymmetricAlgorithm::AES128,
                                 &key, &iv).unwrap();
        let mut hash = HashingWriter::new(cfb, HashAlgorithm::SHA1)
            .unwrap();
        hash.write_all(b"secret mpis").unwrap();
        let (mut cfb, digest) = hash.finalize();
        cfb.write_all(&digest).unwrap();
        cfb.finalize().unwrap();

        let mut ctx = HashAlgorithm::SHA1.context().unwrap();
        ctx.update(b"secret mpis");
        assert_eq!(digest, ctx.into_digest());

        // Everything, including the digest, was encrypted.
        assert_eq!(sink.len(), b"secret mpis".len() + 20);
        assert_ne!(&sink[..11], b"secret mpis");
    }

    #[test]
    fn counting_writer_counts() {
        let mut w = CountingWriter::new(Vec::new());
        w.write_all(&[0; 42]).unwrap();
        assert_eq!(w.written(), 42);
    }
}
