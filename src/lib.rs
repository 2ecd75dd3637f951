//! OpenPGP packet emission.
//!
//! This crate implements the *writing* half of the OpenPGP packet
//! format as defined by [RFC 4880]: serializing public keys, secret
//! keys, user IDs, and self-signatures into length-prefixed binary
//! packets, optionally wrapped in ASCII armor.  Secret-key material
//! can be protected with a password using the String-to-Key (S2K)
//! mechanism and a symmetric cipher in OpenPGP-CFB mode, with the
//! SHA-1 integrity hash encrypted alongside the key material.
//!
//! The crate deliberately does *not* parse packets, manage key
//! stores, or evaluate trust.  It takes already-validated in-memory
//! structures (a [`packet::Key`], a [`packet::SecretKey`], a
//! [`tsk::TransferableKey`] blob of pre-serialized packets) and
//! produces interoperable bytes.
//!
//! [RFC 4880]: https://tools.ietf.org/html/rfc4880
//!
//! # Example
//!
//! ```
//! use openpgp_emit::packet::{Key, Tag};
//! use openpgp_emit::types::PublicKeyAlgorithm;
//! use openpgp_emit::crypto::mpi;
//! # fn main() -> openpgp_emit::Result<()> {
//! let key = Key::new(1543844001, PublicKeyAlgorithm::EdDSA,
//!                    mpi::PublicKey::EdDSA {
//!                        curve: openpgp_emit::types::Curve::Ed25519,
//!                        q: mpi::MPI::new(&[0x40; 33]),
//!                    })?;
//!
//! let mut buf = Vec::new();
//! key.serialize(&mut buf, Tag::PublicKey)?;
//! assert_eq!(buf[0], 0xc6);   // new-format CTB, tag 6
//! # Ok(()) }
//! ```

#![warn(missing_docs)]

use std::fmt;

pub mod armor;
pub mod crypto;
pub mod packet;
pub mod serialize;
pub mod tsk;
pub mod types;

/// Crate result specialization.
pub type Result<T> = ::std::result::Result<T, anyhow::Error>;

#[derive(thiserror::Error, Debug, Clone)]
/// Errors returned by this crate.
///
/// Note: This enum cannot be exhaustively matched to allow future
/// extensions.
#[non_exhaustive]
pub enum Error {
    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid operation.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A malformed packet.
    #[error("Malformed packet: {0}")]
    MalformedPacket(String),

    /// Unsupported public key algorithm identifier.
    #[error("Unsupported public key algorithm: {0}")]
    UnsupportedPublicKeyAlgorithm(types::PublicKeyAlgorithm),

    /// Unsupported elliptic curve ASN.1 OID.
    #[error("Unsupported elliptic curve: {0}")]
    UnsupportedEllipticCurve(types::Curve),

    /// Unsupported symmetric key algorithm.
    #[error("Unsupported symmetric algorithm: {0}")]
    UnsupportedSymmetricAlgorithm(types::SymmetricAlgorithm),

    /// Unsupported hash algorithm identifier.
    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedHashAlgorithm(types::HashAlgorithm),

    /// Unsupported secret-key protection usage octet.
    #[error("Unsupported S2K usage: {0}")]
    UnsupportedS2KUsage(u8),

    /// Malformed MPI.
    #[error("Malformed MPI: {0}")]
    MalformedMPI(String),

    /// An underlying cryptographic primitive failed.
    #[error("Cryptographic operation failed: {0}")]
    CryptoFailure(String),
}

/// Holds a v4 fingerprint.
///
/// A fingerprint uniquely identifies a public key: the SHA-1 hash
/// over the public-key packet body prefixed by `0x99` and a two-octet
/// length (see [Section 12.2 of RFC 4880]).
///
///   [Section 12.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-12.2
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
pub struct Fingerprint([u8; 20]);

impl Fingerprint {
    /// Creates a fingerprint from 20 raw bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Fingerprint(bytes)
    }

    /// Returns the raw fingerprint bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Fingerprint")
            .field(&self.to_string())
            .finish()
    }
}

/// Holds a KeyID.
///
/// A KeyID is a fingerprint fragment: the low-order eight bytes of
/// the v4 fingerprint.  It identifies a public key, but is easy to
/// forge.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
pub struct KeyID([u8; 8]);

impl KeyID {
    /// Creates a KeyID from eight raw bytes.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        KeyID(bytes)
    }

    /// Returns the raw KeyID bytes.
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl From<&Fingerprint> for KeyID {
    fn from(fp: &Fingerprint) -> Self {
        let mut id = [0u8; 8];
        id.copy_from_slice(&fp.0[12..]);
        KeyID(id)
    }
}

impl From<Fingerprint> for KeyID {
    fn from(fp: Fingerprint) -> Self {
        (&fp).into()
    }
}

impl fmt::Display for KeyID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for KeyID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("KeyID")
            .field(&self.to_string())
            .finish()
    }
}

#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn keyid_is_fingerprint_tail() {
        let mut fp = [0u8; 20];
        for (i, b) in fp.iter_mut().enumerate() {
            *b = i as u8;
        }
        let fp = Fingerprint::from_bytes(fp);
        let id = KeyID::from(&fp);
        assert_eq!(id.as_bytes(), &[12, 13, 14, 15, 16, 17, 18, 19]);
        assert_eq!(id.to_string(), "0C0D0E0F10111213");
    }
}
