//! Functionality to hash packets, and generate hashes.
//!
//! Self-signatures are computed over the canonical form of the
//! packets they bind: keys are hashed behind a `0x99` tag and a
//! two-octet length, user IDs behind a `0xB4` tag and a four-octet
//! length.  This module provides the hash contexts and the `Hash`
//! implementations producing those canonical forms.

use std::io;

use digest::DynDigest;

/// `sha1collisiondetection`'s `Sha1CD` only implements `digest::FixedOutput`
/// (not `FixedOutputReset`), so it cannot satisfy `DynDigest`'s blanket
/// impl directly. This adapter supplies `FixedOutputReset` by cloning the
/// inner state before finalizing it, which is equivalent to the
/// finalize-then-reset sequence `DynDigest::finalize_reset` performs.
#[derive(Clone, Default)]
struct Sha1CDReset(sha1collisiondetection::Sha1CD);

impl digest::Update for Sha1CDReset {
    fn update(&mut self, data: &[u8]) {
        sha1collisiondetection::digest::Update::update(&mut self.0, data);
    }
}

impl digest::OutputSizeUser for Sha1CDReset {
    type OutputSize = digest::consts::U20;
}

impl digest::HashMarker for Sha1CDReset {}

impl digest::Reset for Sha1CDReset {
    fn reset(&mut self) {
        digest::Reset::reset(&mut self.0);
    }
}

impl digest::FixedOutput for Sha1CDReset {
    fn finalize_into(self, out: &mut digest::Output<Self>) {
        digest::FixedOutput::finalize_into(self.0, out);
    }
}

impl digest::FixedOutputReset for Sha1CDReset {
    fn finalize_into_reset(&mut self, out: &mut digest::Output<Self>) {
        let state = self.0.clone();
        digest::FixedOutput::finalize_into(state, out);
        digest::Reset::reset(&mut self.0);
    }
}

use crate::packet::signature::SignatureBuilder;
use crate::packet::{Key, UserID};
use crate::serialize::MarshalInto;
use crate::types::HashAlgorithm;
use crate::Error;
use crate::Result;

/// State of a hash function.
pub struct Context {
    algo: HashAlgorithm,
    ctx: Box<dyn DynDigest>,
}

impl Context {
    /// Returns the algorithm.
    pub fn algo(&self) -> HashAlgorithm {
        self.algo
    }

    /// Size of the digest in bytes.
    pub fn digest_size(&self) -> usize {
        self.ctx.output_size()
    }

    /// Writes data into the hash function.
    pub fn update<D: AsRef<[u8]>>(&mut self, data: D) {
        self.ctx.update(data.as_ref());
    }

    /// Finalizes the hash function and returns the digest.
    pub fn into_digest(mut self) -> Vec<u8> {
        self.ctx.finalize_reset().into_vec()
    }
}

impl Clone for Context {
    fn clone(&self) -> Self {
        Context {
            algo: self.algo,
            ctx: self.ctx.box_clone(),
        }
    }
}

impl io::Write for Context {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl HashAlgorithm {
    /// Whether this crate supports the algorithm.
    pub fn is_supported(self) -> bool {
        use crate::types::HashAlgorithm::*;
        matches!(self, MD5 | SHA1 | RipeMD | SHA256 | SHA384 | SHA512 | SHA224)
    }

    /// Creates a new hash context for this algorithm.
    ///
    /// # Errors
    ///
    /// Fails with `Error::UnsupportedHashAlgorithm` for algorithms
    /// without a backing implementation.  See
    /// [`HashAlgorithm::is_supported`].
    pub fn context(self) -> Result<Context> {
        use crate::types::HashAlgorithm::*;

        let ctx: Box<dyn DynDigest> = match self {
            MD5 => Box::new(md5::Md5::default()),
            SHA1 => Box::new(Sha1CDReset::default()),
            RipeMD => Box::new(ripemd::Ripemd160::default()),
            SHA256 => Box::new(sha2::Sha256::default()),
            SHA384 => Box::new(sha2::Sha384::default()),
            SHA512 => Box::new(sha2::Sha512::default()),
            SHA224 => Box::new(sha2::Sha224::default()),
            Private(_) | Unknown(_) =>
                return Err(Error::UnsupportedHashAlgorithm(self).into()),
        };

        Ok(Context { algo: self, ctx })
    }

    /// Size of the digest produced by this algorithm in bytes.
    pub fn digest_size(self) -> Result<usize> {
        Ok(self.context()?.digest_size())
    }
}

/// Hashes OpenPGP packets and related types into a signature hash
/// context.
pub trait Hash {
    /// Updates the given hash with the canonical form of this
    /// object.
    fn hash(&self, hash: &mut Context) -> Result<()>;
}

impl Hash for Key {
    /// Updates the hash with the canonicalized key: the body behind
    /// a `0x99` tag and a two-octet length.
    fn hash(&self, hash: &mut Context) -> Result<()> {
        let body = self.to_body_vec()?;

        let mut header = [0u8; 3];
        header[0] = 0x99;
        header[1] = (body.len() >> 8) as u8;
        header[2] = body.len() as u8;

        hash.update(header);
        hash.update(&body);
        Ok(())
    }
}

impl Hash for UserID {
    /// Updates the hash with the user ID behind a `0xB4` tag and a
    /// four-octet length.
    fn hash(&self, hash: &mut Context) -> Result<()> {
        let mut header = [0u8; 5];

        header[0] = 0xB4;
        let len = self.value().len() as u32;
        header[1] = (len >> 24) as u8;
        header[2] = (len >> 16) as u8;
        header[3] = (len >> 8) as u8;
        header[4] = len as u8;

        hash.update(header);
        hash.update(self.value());
        Ok(())
    }
}

impl Hash for SignatureBuilder {
    /// Updates the hash with the signature's own contribution: the
    /// header covering the hashed subpacket area, then the v4
    /// trailer.
    fn hash(&self, hash: &mut Context) -> Result<()> {
        // A version 4 signature packet is laid out as follows:
        //
        //   version - 1 byte                    \
        //   type - 1 byte                        \
        //   pk_algo - 1 byte                      \
        //   hash_algo - 1 byte                      Included in the hash
        //   hashed_area_len - 2 bytes (big endian)/
        //   hashed_area                         _/
        //   ...                                 <- Not included in the hash
        let hashed_area = self.hashed_area().to_vec()?;

        let mut header = [0u8; 6];
        header[0] = 4;
        header[1] = self.typ().into();
        header[2] = self.pk_algo().into();
        header[3] = self.hash_algo().into();
        header[4] = (hashed_area.len() >> 8) as u8;
        header[5] = hashed_area.len() as u8;

        hash.update(header);
        hash.update(&hashed_area);

        // A version 4 signature trailer is:
        //
        //   version - 1 byte
        //   0xFF (constant) - 1 byte
        //   amount - 4 bytes (big endian)
        //
        // The amount is the number of bytes hashed from this packet,
        // i.e. the header and the hashed area, excluding the trailer
        // itself.  See RFC 4880, Section 5.2.4.
        let len = header.len() + hashed_area.len();
        let mut trailer = [0u8; 6];
        trailer[0] = 0x04;
        trailer[1] = 0xFF;
        trailer[2] = (len >> 24) as u8;
        trailer[3] = (len >> 16) as u8;
        trailer[4] = (len >> 8) as u8;
        trailer[5] = len as u8;

        hash.update(trailer);
        Ok(())
    }
}
