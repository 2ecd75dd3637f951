//! String-to-Key (S2K) specifiers.
//!
//! String-to-Key procedures convert a password into a symmetric
//! session key (see [Section 3.7 of RFC 4880]).  They are used to
//! protect secret key material.
//!
//!   [Section 3.7 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-3.7

use std::fmt;

use crate::crypto::{Password, SessionKey};
use crate::crypto::mem::Protected;
use crate::types::HashAlgorithm;
use crate::Result;

/// Number of octets in the S2K salt.
pub const SALT_SIZE: usize = 8;

/// The default number of octets an iterated S2K feeds to the hash.
///
/// This is the coded count `0xE0` decoded, a middle-of-the-road
/// value also picked by other implementations.
pub const DEFAULT_HASH_BYTES: u32 = 3_145_728;

/// A String-to-Key specifier.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
#[non_exhaustive]
pub enum S2K {
    /// Simply hashes the password.
    Simple {
        /// Hash used for key generation.
        hash: HashAlgorithm,
    },
    /// Hashes the password prefixed with a salt.
    Salted {
        /// Hash used for key generation.
        hash: HashAlgorithm,
        /// Public salt value mixed into the password.
        salt: [u8; SALT_SIZE],
    },
    /// Repeatedly hashes the password prefixed with a salt.
    Iterated {
        /// Hash used for key generation.
        hash: HashAlgorithm,
        /// Public salt value mixed into the password.
        salt: [u8; SALT_SIZE],
        /// Number of octets fed to the hash, decoded.
        ///
        /// The number of octets is not arbitrary: on the wire it is
        /// stored as a one-octet coded count, so the value here is
        /// rounded up to the next representable count when encoded.
        hash_bytes: u32,
    },
}

impl Default for S2K {
    fn default() -> Self {
        S2K::Iterated {
            hash: HashAlgorithm::SHA256,
            salt: Default::default(),
            hash_bytes: DEFAULT_HASH_BYTES,
        }
    }
}

impl S2K {
    /// Returns the one-octet specifier identifying this S2K type on
    /// the wire.
    pub fn specifier(&self) -> u8 {
        match self {
            S2K::Simple { .. } => 0,
            S2K::Salted { .. } => 1,
            S2K::Iterated { .. } => 3,
        }
    }

    /// Returns the hash algorithm used for key generation.
    pub fn hash_algo(&self) -> HashAlgorithm {
        match self {
            S2K::Simple { hash }
            | S2K::Salted { hash, .. }
            | S2K::Iterated { hash, .. } => *hash,
        }
    }

    /// Returns the salt, if this S2K type carries one.
    pub fn salt(&self) -> Option<&[u8; SALT_SIZE]> {
        match self {
            S2K::Simple { .. } => None,
            S2K::Salted { salt, .. }
            | S2K::Iterated { salt, .. } => Some(salt),
        }
    }

    /// Derives a key of the given size from a password.
    ///
    /// If the key is longer than a single digest, multiple hash
    /// contexts are run in parallel, the i-th preloaded with i zero
    /// octets, and their digests concatenated (see [Section 3.7.1.1
    /// of RFC 4880]).
    ///
    ///   [Section 3.7.1.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-3.7.1.1
    pub fn derive_key(&self, password: &Password, key_size: usize)
                      -> Result<SessionKey> {
        let digest_size = self.hash_algo().digest_size()?;
        let mut key = Protected::new(key_size);

        password.map(|password| -> Result<()> {
            for (i, chunk) in key.chunks_mut(digest_size).enumerate() {
                let mut ctx = self.hash_algo().context()?;

                // Contexts beyond the first are preloaded with a
                // growing run of zero octets.
                for _ in 0..i {
                    ctx.update([0u8]);
                }

                match self {
                    S2K::Simple { .. } => {
                        ctx.update(&password[..]);
                    },
                    S2K::Salted { salt, .. } => {
                        ctx.update(salt);
                        ctx.update(&password[..]);
                    },
                    S2K::Iterated { salt, hash_bytes, .. } => {
                        // Whole salt-plus-password repetitions are
                        // fed to the hash until at least hash_bytes
                        // octets have been consumed; a single
                        // repetition is the floor.
                        let chunk_len = salt.len() + password.len();
                        let mut hashed = 0usize;
                        loop {
                            ctx.update(salt);
                            ctx.update(&password[..]);
                            hashed += chunk_len;
                            if hashed >= *hash_bytes as usize
                                || chunk_len == 0
                            {
                                break;
                            }
                        }
                    },
                }

                let digest = ctx.into_digest();
                chunk.copy_from_slice(&digest[..chunk.len()]);
            }
            Ok(())
        })?;

        Ok(key.into())
    }

    /// Decodes the one-octet coded iteration count (see [Section
    /// 3.7.1.3 of RFC 4880]).
    ///
    ///   [Section 3.7.1.3 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-3.7.1.3
    pub fn decode_count(coded: u8) -> u32 {
        (16 + (coded as u32 & 15)) << ((coded >> 4) + 6)
    }

    /// Encodes an octet count as the smallest coded count whose
    /// decoded value is not less than `hash_bytes`.
    ///
    /// Counts beyond the largest representable value (about 65
    /// million octets) saturate at the maximum code.
    pub fn encode_count(hash_bytes: u32) -> u8 {
        for coded in 0..=255u8 {
            if Self::decode_count(coded) >= hash_bytes {
                return coded;
            }
        }
        255
    }
}

impl fmt::Display for S2K {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            S2K::Simple { hash } =>
                f.write_fmt(format_args!("Simple S2K with {}", hash)),
            S2K::Salted { hash, .. } =>
                f.write_fmt(format_args!("Salted S2K with {}", hash)),
            S2K::Iterated { hash, hash_bytes, .. } =>
                f.write_fmt(format_args!(
                    "Iterated and salted S2K with {} and {} bytes to hash",
                    hash, hash_bytes)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coded_count_roundtrip() {
        // The coded count is monotonic in both nibbles.
        assert_eq!(S2K::decode_count(0), 1024);
        assert_eq!(S2K::decode_count(0xff), 65_011_712);
        assert_eq!(S2K::decode_count(0x60), 65536);

        for coded in 0..=255u8 {
            let decoded = S2K::decode_count(coded);
            assert_eq!(S2K::encode_count(decoded), coded);
        }
    }

    #[test]
    fn encode_count_rounds_up() {
        // 65537 is not representable; the next code decodes to more.
        let coded = S2K::encode_count(65537);
        assert!(S2K::decode_count(coded) >= 65537);
        assert_eq!(S2K::encode_count(0), 0);
        assert_eq!(S2K::encode_count(u32::MAX), 255);
    }

    #[test]
    fn simple_is_plain_digest() {
        let s2k = S2K::Simple { hash: HashAlgorithm::SHA1 };
        let key = s2k.derive_key(&"password".into(), 16).unwrap();

        let mut ctx = HashAlgorithm::SHA1.context().unwrap();
        ctx.update(b"password");
        assert_eq!(&key[..], &ctx.into_digest()[..16]);
    }

    #[test]
    fn salted_prefixes_salt() {
        let salt = *b"\x01\x02\x03\x04\x05\x06\x07\x08";
        let s2k = S2K::Salted { hash: HashAlgorithm::SHA256, salt };
        let key = s2k.derive_key(&"password".into(), 32).unwrap();

        let mut ctx = HashAlgorithm::SHA256.context().unwrap();
        ctx.update(salt);
        ctx.update(b"password");
        assert_eq!(&key[..], &ctx.into_digest()[..]);
    }

    #[test]
    fn iterated_repeats_input() {
        let salt = [0xaa; 8];
        let s2k = S2K::Iterated {
            hash: HashAlgorithm::SHA256,
            salt,
            // Two repetitions of the 16-byte salt-plus-password
            // chunk reach 32 octets.
            hash_bytes: 32,
        };
        let key = s2k.derive_key(&"password".into(), 16).unwrap();

        let mut ctx = HashAlgorithm::SHA256.context().unwrap();
        for _ in 0..2 {
            ctx.update(salt);
            ctx.update(b"password");
        }
        assert_eq!(&key[..], &ctx.into_digest()[..16]);
    }

    #[test]
    fn long_key_uses_preloaded_contexts() {
        // A 48-byte key from a 20-byte digest takes three contexts.
        let s2k = S2K::Simple { hash: HashAlgorithm::SHA1 };
        let key = s2k.derive_key(&"xyzzy".into(), 48).unwrap();

        let mut expected = Vec::new();
        for i in 0..3 {
            let mut ctx = HashAlgorithm::SHA1.context().unwrap();
            ctx.update(vec![0u8; i]);
            ctx.update(b"xyzzy");
            expected.extend_from_slice(&ctx.into_digest());
        }
        assert_eq!(&key[..], &expected[..48]);
    }
}
