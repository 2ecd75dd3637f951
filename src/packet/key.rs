//! Public and secret key packets.
//!
//! A key packet carries the key's version, creation time, algorithm,
//! and algorithm-specific material (see [Section 5.5.2 of RFC
//! 4880]).  A secret key packet additionally carries the secret
//! MPIs, either in the clear behind a sum-16 checksum or encrypted
//! under an S2K-derived key with a SHA-1 check hash.
//!
//!   [Section 5.5.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.5.2

use crate::crypto::mpi;
use crate::crypto::s2k::S2K;
use crate::crypto::{hash::Hash, KeyPair};
use crate::types::{HashAlgorithm, PublicKeyAlgorithm, S2KUsage,
                   SymmetricAlgorithm};
use crate::Error;
use crate::Fingerprint;
use crate::KeyID;
use crate::Result;

/// Holds a public key packet body.
///
/// The same body is used for primary keys and subkeys; the packet
/// tag chosen at serialization time tells them apart.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct Key {
    /// Version of the key packet.  2, 3, and 4 are supported.
    version: u8,
    /// When the key was created, in seconds since the epoch.
    creation_time: u32,
    /// Validity period in days.  Only present in v2/v3 keys.
    days_valid: u16,
    /// Public key algorithm of this key.
    pk_algo: PublicKeyAlgorithm,
    /// The key's public material.
    mpis: mpi::PublicKey,
}

impl Key {
    /// Creates a v4 key.
    ///
    /// # Errors
    ///
    /// Fails with `Error::InvalidArgument` if the material does not
    /// belong to the given algorithm.
    pub fn new(creation_time: u32, pk_algo: PublicKeyAlgorithm,
               mpis: mpi::PublicKey)
               -> Result<Self> {
        Self::check_material(pk_algo, &mpis)?;
        Ok(Key {
            version: 4,
            creation_time,
            days_valid: 0,
            pk_algo,
            mpis,
        })
    }

    /// Creates a v3 key.
    ///
    /// v3 keys are obsolete; this constructor exists so that key
    /// bodies read from legacy blobs can be re-emitted faithfully.
    /// A `days_valid` of zero means the key never expires.
    pub fn new_v3(creation_time: u32, days_valid: u16,
                  pk_algo: PublicKeyAlgorithm, mpis: mpi::PublicKey)
                  -> Result<Self> {
        Self::check_material(pk_algo, &mpis)?;
        Ok(Key {
            version: 3,
            creation_time,
            days_valid,
            pk_algo,
            mpis,
        })
    }

    fn check_material(pk_algo: PublicKeyAlgorithm, mpis: &mpi::PublicKey)
                      -> Result<()> {
        if ! mpis.is_for(pk_algo) {
            return Err(Error::InvalidArgument(
                format!("key material does not match {}", pk_algo)).into());
        }
        Ok(())
    }

    /// Returns the version of the key packet.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Returns the key's creation time in seconds since the epoch.
    pub fn creation_time(&self) -> u32 {
        self.creation_time
    }

    /// Returns the validity period in days (v2/v3 keys only).
    pub fn days_valid(&self) -> u16 {
        self.days_valid
    }

    /// Returns the public key algorithm.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        self.pk_algo
    }

    /// Returns the key's public material.
    pub fn mpis(&self) -> &mpi::PublicKey {
        &self.mpis
    }

    /// Computes the key's v4 fingerprint: the SHA-1 hash over the
    /// canonicalized key (see [Section 12.2 of RFC 4880]).
    ///
    ///   [Section 12.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-12.2
    pub fn fingerprint(&self) -> Result<Fingerprint> {
        let mut ctx = HashAlgorithm::SHA1.context()?;
        self.hash(&mut ctx)?;
        let digest = ctx.into_digest();

        let mut fp = [0u8; 20];
        fp.copy_from_slice(&digest);
        Ok(Fingerprint::from_bytes(fp))
    }

    /// Computes the key's KeyID: the low-order eight bytes of the
    /// fingerprint.
    pub fn keyid(&self) -> Result<KeyID> {
        Ok(self.fingerprint()?.into())
    }
}

/// Describes how the secret MPIs of a [`SecretKey`] are protected.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Protection {
    pub(crate) usage: S2KUsage,
    pub(crate) sym_algo: SymmetricAlgorithm,
    pub(crate) s2k: S2K,
    pub(crate) iv: Vec<u8>,
}

impl Protection {
    /// No protection: the secret MPIs are stored in the clear,
    /// followed by a sum-16 checksum.
    pub fn unprotected() -> Self {
        Protection {
            usage: S2KUsage::Unprotected,
            sym_algo: SymmetricAlgorithm::Unencrypted,
            s2k: S2K::default(),
            iv: Vec::new(),
        }
    }

    /// Usage 254: the secret MPIs and their SHA-1 check hash are
    /// encrypted with the given cipher under an S2K-derived key.
    pub fn encrypted_and_hashed(sym_algo: SymmetricAlgorithm, s2k: S2K)
                                -> Self {
        Protection {
            usage: S2KUsage::EncryptedAndHashed,
            sym_algo,
            s2k,
            iv: Vec::new(),
        }
    }

    /// Usage 255: like usage 254, but with a sum-16 checksum instead
    /// of the check hash.
    ///
    /// This legacy form is understood for length computation, but
    /// [`SecretKey::serialize`] refuses to produce it.
    pub fn encrypted(sym_algo: SymmetricAlgorithm, s2k: S2K) -> Self {
        Protection {
            usage: S2KUsage::Encrypted,
            sym_algo,
            s2k,
            iv: Vec::new(),
        }
    }

    /// Returns the protection usage octet.
    pub fn usage(&self) -> S2KUsage {
        self.usage
    }

    /// Returns the symmetric algorithm protecting the secret MPIs.
    pub fn sym_algo(&self) -> SymmetricAlgorithm {
        self.sym_algo
    }

    /// Returns the S2K specifier.
    pub fn s2k(&self) -> &S2K {
        &self.s2k
    }

    /// Returns the initialization vector used for encryption.
    ///
    /// Empty until the key has been serialized; the IV is drawn
    /// fresh from the RNG during emission.
    pub fn iv(&self) -> &[u8] {
        &self.iv
    }
}

impl Default for Protection {
    fn default() -> Self {
        Protection::unprotected()
    }
}

/// Holds a secret key packet body.
///
/// This is a [`Key`] together with its secret material and a
/// [`Protection`] record.  The salt, IV, and integrity check values
/// are generated during serialization and stored back, so the packet
/// can be inspected after emission.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SecretKey {
    pub(crate) key: Key,
    pub(crate) secret: mpi::SecretKey,
    pub(crate) protection: Protection,
    pub(crate) checksum: Option<u16>,
    pub(crate) checkhash: Option<[u8; 20]>,
}

impl SecretKey {
    /// Creates an unprotected secret key.
    ///
    /// # Errors
    ///
    /// Fails with `Error::InvalidArgument` if the secret material
    /// does not belong to the public key's algorithm.
    pub fn new(key: Key, secret: mpi::SecretKey) -> Result<Self> {
        if ! secret.is_for(key.pk_algo()) {
            return Err(Error::InvalidArgument(
                format!("secret key material does not match {}",
                        key.pk_algo())).into());
        }
        Ok(SecretKey {
            key,
            secret,
            protection: Protection::unprotected(),
            checksum: None,
            checkhash: None,
        })
    }

    /// Sets the protection applied when the key is serialized.
    pub fn with_protection(mut self, protection: Protection) -> Self {
        self.protection = protection;
        self
    }

    /// Returns the public parts.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Returns the secret material.
    pub fn secret(&self) -> &mpi::SecretKey {
        &self.secret
    }

    /// Returns the protection record.
    pub fn protection(&self) -> &Protection {
        &self.protection
    }

    /// Returns the sum-16 checksum over the secret MPIs, once the
    /// key has been serialized unprotected.
    pub fn checksum(&self) -> Option<u16> {
        self.checksum
    }

    /// Returns the SHA-1 check hash over the secret MPIs, once the
    /// key has been serialized with usage 254.
    pub fn checkhash(&self) -> Option<&[u8; 20]> {
        self.checkhash.as_ref()
    }

    /// Converts this secret key into a [`KeyPair`] for signing.
    pub fn into_keypair(self) -> Result<KeyPair> {
        KeyPair::new(self.key, self.secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::mpi::MPI;
    use crate::types::Curve;

    pub(crate) fn rsa_key() -> Key {
        let mut n = vec![0xC0u8];
        n.resize(256, 0x17);
        Key::new(0x5A000000, PublicKeyAlgorithm::RSAEncryptSign,
                 mpi::PublicKey::RSA {
                     e: MPI::new(&[0x01, 0x00, 0x01]),
                     n: MPI::new(&n),
                 }).unwrap()
    }

    #[test]
    fn material_mismatch() {
        assert!(Key::new(0, PublicKeyAlgorithm::DSA,
                         mpi::PublicKey::RSA {
                             e: MPI::new(&[3]),
                             n: MPI::new(&[5]),
                         }).is_err());
    }

    #[test]
    fn v4_has_no_validity_period() {
        let key = rsa_key();
        assert_eq!(key.version(), 4);
        assert_eq!(key.days_valid(), 0);
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let key = rsa_key();
        assert_eq!(key.fingerprint().unwrap(), key.fingerprint().unwrap());
        let keyid = key.keyid().unwrap();
        assert_eq!(keyid.as_bytes(),
                   &key.fingerprint().unwrap().as_bytes()[12..]);
    }

    #[test]
    fn unknown_curve_has_no_fingerprint() {
        let key = Key::new(1, PublicKeyAlgorithm::ECDSA,
                           mpi::PublicKey::ECDSA {
                               curve: Curve::Unknown(vec![0x55].into()),
                               q: MPI::new(&[4, 1, 2]),
                           }).unwrap();
        assert!(key.fingerprint().is_err());
    }

    #[test]
    fn secret_key_material_mismatch() {
        let key = rsa_key();
        assert!(SecretKey::new(key, mpi::SecretKey::DSA {
            x: MPI::new(&[9]),
        }).is_err());
    }
}
