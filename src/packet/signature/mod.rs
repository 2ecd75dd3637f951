//! Types for signatures.
//!
//! This module holds the v4 signature packet, the builder assembling
//! one, and the two self-signature entry points: positive
//! certification of a user ID and subkey binding.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::crypto::hash::Hash;
use crate::crypto::{mpi, Signer};
use crate::packet::{Key, UserID};
use crate::types::{CompressionAlgorithm, HashAlgorithm, KeyFlags,
                   KeyServerPreferences, PublicKeyAlgorithm,
                   SignatureType, SymmetricAlgorithm};
use crate::Result;

pub mod subpacket;
pub use subpacket::{Subpacket, SubpacketArea, SubpacketTag, SubpacketValue};

/// Builds a signature packet.
///
/// This is the mutable version of a [`Signature`] packet.  Subpackets
/// are added to the two areas in insertion order; the builder is
/// then consumed by one of the `sign_*` methods, which closes the
/// hashed area, computes the digest over the bound material, and
/// produces the finalized, immutable packet.
#[derive(Clone, Debug)]
pub struct SignatureBuilder {
    typ: SignatureType,
    pk_algo: PublicKeyAlgorithm,
    hash_algo: HashAlgorithm,
    hashed_area: SubpacketArea,
    unhashed_area: SubpacketArea,
}

impl SignatureBuilder {
    /// Returns a new builder for a signature of the given type.
    pub fn new(typ: SignatureType) -> Self {
        SignatureBuilder {
            typ,
            pk_algo: PublicKeyAlgorithm::Unknown(0),
            hash_algo: HashAlgorithm::SHA256,
            hashed_area: SubpacketArea::new(),
            unhashed_area: SubpacketArea::new(),
        }
    }

    /// Sets the hash algorithm used to compute the signature.
    pub fn set_hash_algo(mut self, algo: HashAlgorithm) -> Self {
        self.hash_algo = algo;
        self
    }

    /// Returns the signature type.
    pub fn typ(&self) -> SignatureType {
        self.typ
    }

    /// Returns the public key algorithm.
    ///
    /// Set from the signer when the builder is signed.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        self.pk_algo
    }

    /// Returns the hash algorithm.
    pub fn hash_algo(&self) -> HashAlgorithm {
        self.hash_algo
    }

    /// Returns the hashed subpacket area.
    pub fn hashed_area(&self) -> &SubpacketArea {
        &self.hashed_area
    }

    /// Returns a mutable reference to the hashed subpacket area.
    pub fn hashed_area_mut(&mut self) -> &mut SubpacketArea {
        &mut self.hashed_area
    }

    /// Returns the unhashed subpacket area.
    pub fn unhashed_area(&self) -> &SubpacketArea {
        &self.unhashed_area
    }

    /// Returns a mutable reference to the unhashed subpacket area.
    pub fn unhashed_area_mut(&mut self) -> &mut SubpacketArea {
        &mut self.unhashed_area
    }

    /// Signs a certification over `(primary, userid)` using
    /// `signer`.
    ///
    /// The digest covers the canonicalized primary key, the user ID,
    /// and the signature's own header and hashed area.
    pub fn sign_userid_binding(self, signer: &mut dyn Signer,
                               primary: &Key, userid: &UserID)
                               -> Result<Signature> {
        let mut ctx = self.hash_algo.context()?;
        primary.hash(&mut ctx)?;
        userid.hash(&mut ctx)?;
        self.sign(signer, ctx)
    }

    /// Signs a binding over `(primary, subkey)` using `signer`.
    ///
    /// The digest covers both canonicalized keys and the signature's
    /// own header and hashed area.
    pub fn sign_subkey_binding(self, signer: &mut dyn Signer,
                               primary: &Key, subkey: &Key)
                               -> Result<Signature> {
        let mut ctx = self.hash_algo.context()?;
        primary.hash(&mut ctx)?;
        subkey.hash(&mut ctx)?;
        self.sign(signer, ctx)
    }

    fn sign(mut self, signer: &mut dyn Signer,
            mut ctx: crate::crypto::hash::Context)
            -> Result<Signature> {
        self.pk_algo = signer.public().pk_algo();

        self.hash(&mut ctx)?;
        let digest = ctx.into_digest();

        let mpis = signer.sign(self.hash_algo, &digest)?;

        Ok(Signature {
            typ: self.typ,
            pk_algo: self.pk_algo,
            hash_algo: self.hash_algo,
            hashed_area: self.hashed_area,
            unhashed_area: self.unhashed_area,
            digest_prefix: [digest[0], digest[1]],
            mpis,
        })
    }
}

/// Holds a v4 signature packet body.
///
/// Finalized and immutable; produced by [`SignatureBuilder`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Signature {
    typ: SignatureType,
    pk_algo: PublicKeyAlgorithm,
    hash_algo: HashAlgorithm,
    hashed_area: SubpacketArea,
    unhashed_area: SubpacketArea,
    digest_prefix: [u8; 2],
    mpis: mpi::Signature,
}

impl Signature {
    /// Returns the version of the signature packet.
    pub fn version(&self) -> u8 {
        4
    }

    /// Returns the signature type.
    pub fn typ(&self) -> SignatureType {
        self.typ
    }

    /// Returns the public key algorithm.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        self.pk_algo
    }

    /// Returns the hash algorithm.
    pub fn hash_algo(&self) -> HashAlgorithm {
        self.hash_algo
    }

    /// Returns the hashed subpacket area.
    pub fn hashed_area(&self) -> &SubpacketArea {
        &self.hashed_area
    }

    /// Returns the unhashed subpacket area.
    pub fn unhashed_area(&self) -> &SubpacketArea {
        &self.unhashed_area
    }

    /// Returns the left two bytes of the signed digest.
    pub fn digest_prefix(&self) -> &[u8; 2] {
        &self.digest_prefix
    }

    /// Returns the signature material.
    pub fn mpis(&self) -> &mpi::Signature {
        &self.mpis
    }
}

/// Metadata for a positive user-ID certification.
///
/// The fields mirror what a key generation front end lets the holder
/// choose; unset fields emit no subpacket.
#[derive(Clone, Debug, Default)]
pub struct CertificationOptions {
    /// The time the signature is made, in seconds since the epoch.
    /// Defaults to the current time.
    pub creation_time: Option<u32>,
    /// Validity period of the key in seconds after its creation;
    /// zero or unset means the key never expires.
    pub key_expiration: Option<u32>,
    /// How the key may be used.
    pub key_flags: Option<KeyFlags>,
    /// Whether the certified user ID is the primary one.
    pub primary: bool,
    /// The holder's preferred symmetric algorithms.
    pub preferred_symmetric_algorithms: Vec<SymmetricAlgorithm>,
    /// The holder's preferred hash algorithms.
    pub preferred_hash_algorithms: Vec<HashAlgorithm>,
    /// The holder's preferred compression algorithms.
    pub preferred_compression_algorithms: Vec<CompressionAlgorithm>,
    /// The holder's key server preferences.
    pub key_server_preferences: Option<KeyServerPreferences>,
    /// The URI of the holder's preferred key server.
    pub preferred_key_server: Option<String>,
}

/// Metadata for a subkey binding signature.
#[derive(Clone, Debug, Default)]
pub struct BindingOptions {
    /// The time the signature is made, in seconds since the epoch.
    /// Defaults to the current time.
    pub creation_time: Option<u32>,
    /// Validity period of the subkey in seconds after its creation;
    /// zero or unset means the subkey never expires.
    pub key_expiration: Option<u32>,
    /// How the subkey may be used.
    pub key_flags: Option<KeyFlags>,
}

fn now() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

/// Creates a positive certification (type 0x13) binding `userid` to
/// `primary`, signed by `signer`.
///
/// The hashed area carries, in order: the creation time, the key
/// expiration, the key flags, the primary-user-ID marker, the
/// algorithm preferences, the key server preferences and URI, and
/// the issuer's KeyID.  Absent options emit no subpacket.
pub fn certify_userid(signer: &mut dyn Signer, primary: &Key,
                      userid: &UserID, options: &CertificationOptions,
                      hash_algo: HashAlgorithm)
                      -> Result<Signature> {
    let issuer = primary.keyid()?;
    let mut builder =
        SignatureBuilder::new(SignatureType::PositiveCertification)
        .set_hash_algo(hash_algo);
    let hashed = builder.hashed_area_mut();

    hashed.add(Subpacket::new(SubpacketValue::SignatureCreationTime(
        options.creation_time.unwrap_or_else(now))))?;
    if let Some(expiry) = options.key_expiration.filter(|&e| e > 0) {
        hashed.add(Subpacket::new(
            SubpacketValue::KeyExpirationTime(expiry)))?;
    }
    if let Some(flags) = options.key_flags.filter(|f| !f.is_empty()) {
        hashed.add(Subpacket::new(SubpacketValue::KeyFlags(flags)))?;
    }
    if options.primary {
        hashed.add(Subpacket::new(SubpacketValue::PrimaryUserID(true)))?;
    }
    if ! options.preferred_symmetric_algorithms.is_empty() {
        hashed.add(Subpacket::new(
            SubpacketValue::PreferredSymmetricAlgorithms(
                options.preferred_symmetric_algorithms.clone())))?;
    }
    if ! options.preferred_hash_algorithms.is_empty() {
        hashed.add(Subpacket::new(
            SubpacketValue::PreferredHashAlgorithms(
                options.preferred_hash_algorithms.clone())))?;
    }
    if ! options.preferred_compression_algorithms.is_empty() {
        hashed.add(Subpacket::new(
            SubpacketValue::PreferredCompressionAlgorithms(
                options.preferred_compression_algorithms.clone())))?;
    }
    if let Some(prefs) = options.key_server_preferences {
        hashed.add(Subpacket::new(
            SubpacketValue::KeyServerPreferences(prefs)))?;
    }
    if let Some(uri) = &options.preferred_key_server {
        hashed.add(Subpacket::new(
            SubpacketValue::PreferredKeyServer(
                uri.as_bytes().to_vec())))?;
    }
    hashed.add(Subpacket::new(SubpacketValue::Issuer(issuer)))?;

    builder.sign_userid_binding(signer, primary, userid)
}

/// Creates a subkey binding signature (type 0x18) binding `subkey`
/// to `primary`, signed by `signer`.
///
/// The hashed area carries, in order: the creation time, the key
/// expiration, the key flags, and the issuer's KeyID.
pub fn bind_subkey(signer: &mut dyn Signer, primary: &Key, subkey: &Key,
                   options: &BindingOptions, hash_algo: HashAlgorithm)
                   -> Result<Signature> {
    let issuer = primary.keyid()?;
    let mut builder = SignatureBuilder::new(SignatureType::SubkeyBinding)
        .set_hash_algo(hash_algo);
    let hashed = builder.hashed_area_mut();

    hashed.add(Subpacket::new(SubpacketValue::SignatureCreationTime(
        options.creation_time.unwrap_or_else(now))))?;
    if let Some(expiry) = options.key_expiration.filter(|&e| e > 0) {
        hashed.add(Subpacket::new(
            SubpacketValue::KeyExpirationTime(expiry)))?;
    }
    if let Some(flags) = options.key_flags.filter(|f| !f.is_empty()) {
        hashed.add(Subpacket::new(SubpacketValue::KeyFlags(flags)))?;
    }
    hashed.add(Subpacket::new(SubpacketValue::Issuer(issuer)))?;

    builder.sign_subkey_binding(signer, primary, subkey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::asymmetric::ed25519_keypair;
    use crate::types::Curve;
    use crate::crypto::mpi::MPI;

    fn subkey() -> Key {
        Key::new(1543844100, PublicKeyAlgorithm::EdDSA,
                 mpi::PublicKey::EdDSA {
                     curve: Curve::Ed25519,
                     q: MPI::new(&[0x40; 33]),
                 }).unwrap()
    }

    #[test]
    fn certification_subpacket_order() {
        let mut pair = ed25519_keypair();
        let primary = pair.public().clone();
        let options = CertificationOptions {
            creation_time: Some(1543844200),
            key_expiration: Some(86400),
            key_flags: Some(KeyFlags::empty().set_certification(true)),
            primary: true,
            preferred_symmetric_algorithms:
                vec![SymmetricAlgorithm::AES256, SymmetricAlgorithm::AES128],
            preferred_hash_algorithms: vec![HashAlgorithm::SHA512],
            preferred_compression_algorithms:
                vec![CompressionAlgorithm::Zlib],
            key_server_preferences:
                Some(KeyServerPreferences::default().set_no_modify(true)),
            preferred_key_server:
                Some("hkps://keys.example.org".into()),
        };

        let sig = certify_userid(&mut pair, &primary,
                                 &UserID::from("Eve <eve@example.org>"),
                                 &options, HashAlgorithm::SHA256)
            .unwrap();

        assert_eq!(sig.typ(), SignatureType::PositiveCertification);
        assert_eq!(sig.pk_algo(), PublicKeyAlgorithm::EdDSA);

        let tags: Vec<_> = sig.hashed_area().iter()
            .map(|sp| sp.tag()).collect();
        assert_eq!(tags, [
            SubpacketTag::SignatureCreationTime,
            SubpacketTag::KeyExpirationTime,
            SubpacketTag::KeyFlags,
            SubpacketTag::PrimaryUserID,
            SubpacketTag::PreferredSymmetricAlgorithms,
            SubpacketTag::PreferredHashAlgorithms,
            SubpacketTag::PreferredCompressionAlgorithms,
            SubpacketTag::KeyServerPreferences,
            SubpacketTag::PreferredKeyServer,
            SubpacketTag::Issuer,
        ]);
    }

    #[test]
    fn minimal_certification_subpackets() {
        let mut pair = ed25519_keypair();
        let primary = pair.public().clone();
        let sig = certify_userid(&mut pair, &primary,
                                 &UserID::from("e@example.org"),
                                 &CertificationOptions::default(),
                                 HashAlgorithm::SHA512)
            .unwrap();

        let tags: Vec<_> = sig.hashed_area().iter()
            .map(|sp| sp.tag()).collect();
        assert_eq!(tags, [SubpacketTag::SignatureCreationTime,
                          SubpacketTag::Issuer]);

        match sig.hashed_area().lookup(SubpacketTag::Issuer)
            .unwrap().value()
        {
            SubpacketValue::Issuer(id) =>
                assert_eq!(id, &primary.keyid().unwrap()),
            _ => unreachable!(),
        }
    }

    #[test]
    fn binding_subpackets() {
        let mut pair = ed25519_keypair();
        let primary = pair.public().clone();
        let options = BindingOptions {
            creation_time: Some(1543844300),
            key_expiration: None,
            key_flags: Some(KeyFlags::empty().set_signing(true)),
        };

        let sig = bind_subkey(&mut pair, &primary, &subkey(),
                              &options, HashAlgorithm::SHA256)
            .unwrap();

        assert_eq!(sig.typ(), SignatureType::SubkeyBinding);
        let tags: Vec<_> = sig.hashed_area().iter()
            .map(|sp| sp.tag()).collect();
        assert_eq!(tags, [SubpacketTag::SignatureCreationTime,
                          SubpacketTag::KeyFlags,
                          SubpacketTag::Issuer]);
    }

    #[test]
    fn zero_expiry_emits_no_subpacket() {
        let mut pair = ed25519_keypair();
        let primary = pair.public().clone();
        let options = BindingOptions {
            creation_time: Some(1),
            key_expiration: Some(0),
            key_flags: Some(KeyFlags::empty()),
        };

        let sig = bind_subkey(&mut pair, &primary, &subkey(),
                              &options, HashAlgorithm::SHA256)
            .unwrap();
        let tags: Vec<_> = sig.hashed_area().iter()
            .map(|sp| sp.tag()).collect();
        assert_eq!(tags, [SubpacketTag::SignatureCreationTime,
                          SubpacketTag::Issuer]);
    }
}
