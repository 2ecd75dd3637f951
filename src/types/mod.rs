//! Primitive types defined by the OpenPGP wire format.
//!
//! This module provides the enumerations RFC 4880 assigns one-octet
//! identifiers to: public-key, symmetric, hash, and compression
//! algorithms, signature types, elliptic curves, and the secret-key
//! protection (S2K usage) octet.  Each type converts losslessly to
//! and from its wire representation; identifiers this crate does not
//! know are preserved in an `Unknown` variant.

use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::Error;
use crate::Result;

/// The OpenPGP public key algorithms as defined in [Section 9.1 of
/// RFC 4880].
///
///   [Section 9.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-9.1
#[derive(Clone, Copy, PartialEq, Eq, Debug, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum PublicKeyAlgorithm {
    /// RSA (Encrypt or Sign)
    RSAEncryptSign,
    /// RSA Encrypt-Only
    RSAEncrypt,
    /// RSA Sign-Only
    RSASign,
    /// Elgamal (Encrypt-Only)
    ElgamalEncrypt,
    /// DSA (Digital Signature Algorithm)
    DSA,
    /// Elliptic curve DH
    ECDH,
    /// Elliptic curve DSA
    ECDSA,
    /// "Twisted" Edwards curve DSA
    EdDSA,
    /// SM2 signature algorithm (GM/T 0003.2).
    SM2,
    /// Private algorithm identifier.
    Private(u8),
    /// Unknown algorithm identifier.
    Unknown(u8),
}

impl From<u8> for PublicKeyAlgorithm {
    fn from(u: u8) -> Self {
        use self::PublicKeyAlgorithm::*;
        match u {
            1 => RSAEncryptSign,
            2 => RSAEncrypt,
            3 => RSASign,
            16 => ElgamalEncrypt,
            17 => DSA,
            18 => ECDH,
            19 => ECDSA,
            22 => EdDSA,
            99 => SM2,
            100..=110 => Private(u),
            u => Unknown(u),
        }
    }
}

impl From<PublicKeyAlgorithm> for u8 {
    fn from(p: PublicKeyAlgorithm) -> u8 {
        use self::PublicKeyAlgorithm::*;
        match p {
            RSAEncryptSign => 1,
            RSAEncrypt => 2,
            RSASign => 3,
            ElgamalEncrypt => 16,
            DSA => 17,
            ECDH => 18,
            ECDSA => 19,
            EdDSA => 22,
            SM2 => 99,
            Private(u) => u,
            Unknown(u) => u,
        }
    }
}

impl fmt::Display for PublicKeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::PublicKeyAlgorithm::*;
        match *self {
            RSAEncryptSign => f.write_str("RSA (Encrypt or Sign)"),
            RSAEncrypt => f.write_str("RSA Encrypt-Only"),
            RSASign => f.write_str("RSA Sign-Only"),
            ElgamalEncrypt => f.write_str("Elgamal (Encrypt-Only)"),
            DSA => f.write_str("DSA (Digital Signature Algorithm)"),
            ECDSA => f.write_str("ECDSA public key algorithm"),
            ECDH => f.write_str("ECDH public key algorithm"),
            EdDSA => f.write_str("EdDSA Edwards-curve Digital Signature Algorithm"),
            SM2 => f.write_str("SM2 signature algorithm"),
            Private(u) =>
                f.write_fmt(format_args!("Private/Experimental public key algorithm {}", u)),
            Unknown(u) =>
                f.write_fmt(format_args!("Unknown public key algorithm {}", u)),
        }
    }
}

#[cfg(test)]
impl Arbitrary for PublicKeyAlgorithm {
    fn arbitrary(g: &mut Gen) -> Self {
        u8::arbitrary(g).into()
    }
}

/// Elliptic curves used in OpenPGP.
///
/// For the symmetric algorithms and the asymmetric algorithms DSA,
/// Elgamal, and RSA, the algorithm identifier fixes all parameters.
/// The EC family instead names a curve by its ASN.1 OID embedded in
/// the key material (see [RFC 6637]).
///
///   [RFC 6637]: https://tools.ietf.org/html/rfc6637
#[derive(Clone, PartialEq, Eq, Debug, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum Curve {
    /// NIST curve P-256.
    NistP256,
    /// NIST curve P-384.
    NistP384,
    /// NIST curve P-521.
    NistP521,
    /// brainpoolP256r1.
    BrainpoolP256,
    /// brainpoolP512r1.
    BrainpoolP512,
    /// D.J. Bernstein's "Twisted" Edwards curve Ed25519.
    Ed25519,
    /// D.J. Bernstein's Curve25519.
    Cv25519,
    /// SM2 recommended curve (GB/T 32918).
    Sm2P256,
    /// Unknown curve.
    Unknown(Box<[u8]>),
}

const NIST_P256_OID: &[u8] = &[0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x03, 0x01, 0x07];
const NIST_P384_OID: &[u8] = &[0x2B, 0x81, 0x04, 0x00, 0x22];
const NIST_P521_OID: &[u8] = &[0x2B, 0x81, 0x04, 0x00, 0x23];
const BRAINPOOL_P256_OID: &[u8] =
    &[0x2B, 0x24, 0x03, 0x03, 0x02, 0x08, 0x01, 0x01, 0x07];
const BRAINPOOL_P512_OID: &[u8] =
    &[0x2B, 0x24, 0x03, 0x03, 0x02, 0x08, 0x01, 0x01, 0x0D];
const ED25519_OID: &[u8] =
    &[0x2B, 0x06, 0x01, 0x04, 0x01, 0xDA, 0x47, 0x0F, 0x01];
const CV25519_OID: &[u8] =
    &[0x2B, 0x06, 0x01, 0x04, 0x01, 0x97, 0x55, 0x01, 0x05, 0x01];
const SM2_P256_OID: &[u8] = &[0x2A, 0x81, 0x1C, 0xCF, 0x55, 0x01, 0x82, 0x2D];

impl Curve {
    /// Returns the curve's ASN.1 OID, without tag and length octets.
    ///
    /// # Errors
    ///
    /// Fails with `Error::UnsupportedEllipticCurve` for unknown
    /// curves: a key referencing a curve this crate does not
    /// recognize cannot be serialized.
    pub fn oid(&self) -> Result<&[u8]> {
        use self::Curve::*;
        match self {
            NistP256 => Ok(NIST_P256_OID),
            NistP384 => Ok(NIST_P384_OID),
            NistP521 => Ok(NIST_P521_OID),
            BrainpoolP256 => Ok(BRAINPOOL_P256_OID),
            BrainpoolP512 => Ok(BRAINPOOL_P512_OID),
            Ed25519 => Ok(ED25519_OID),
            Cv25519 => Ok(CV25519_OID),
            Sm2P256 => Ok(SM2_P256_OID),
            Unknown(_) =>
                Err(Error::UnsupportedEllipticCurve(self.clone()).into()),
        }
    }

    /// Looks a curve up by its ASN.1 OID.
    pub fn from_oid(oid: &[u8]) -> Curve {
        use self::Curve::*;
        match oid {
            o if o == NIST_P256_OID => NistP256,
            o if o == NIST_P384_OID => NistP384,
            o if o == NIST_P521_OID => NistP521,
            o if o == BRAINPOOL_P256_OID => BrainpoolP256,
            o if o == BRAINPOOL_P512_OID => BrainpoolP512,
            o if o == ED25519_OID => Ed25519,
            o if o == CV25519_OID => Cv25519,
            o if o == SM2_P256_OID => Sm2P256,
            o => Unknown(o.into()),
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Curve::*;
        match self {
            NistP256 => f.write_str("NIST curve P-256"),
            NistP384 => f.write_str("NIST curve P-384"),
            NistP521 => f.write_str("NIST curve P-521"),
            BrainpoolP256 => f.write_str("brainpoolP256r1"),
            BrainpoolP512 => f.write_str("brainpoolP512r1"),
            Ed25519 => f.write_str("D.J. Bernstein's \"Twisted\" Edwards curve Ed25519"),
            Cv25519 => f.write_str("D.J. Bernstein's Curve25519"),
            Sm2P256 => f.write_str("SM2 recommended curve"),
            Unknown(oid) =>
                f.write_fmt(format_args!("Unknown curve (OID: {:?})", oid)),
        }
    }
}

/// The OpenPGP symmetric algorithms as defined in [Section 9.2 of
/// RFC 4880].
///
///   [Section 9.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-9.2
#[derive(Clone, Copy, PartialEq, Eq, Debug, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum SymmetricAlgorithm {
    /// Null encryption.
    Unencrypted,
    /// IDEA block cipher.
    IDEA,
    /// 3-Key EDE Triple-DES.
    TripleDES,
    /// CAST5/CAST128 block cipher.
    CAST5,
    /// Schneier et al. Blowfish block cipher.
    Blowfish,
    /// 10-round AES.
    AES128,
    /// 12-round AES.
    AES192,
    /// 14-round AES.
    AES256,
    /// Twofish block cipher.
    Twofish,
    /// 18 rounds of NESSIEs Camellia.
    Camellia128,
    /// 24 rounds of NESSIEs Camellia w/192 bit keys.
    Camellia192,
    /// 24 rounds of NESSIEs Camellia w/256 bit keys.
    Camellia256,
    /// Private algorithm identifier.
    Private(u8),
    /// Unknown algorithm identifier.
    Unknown(u8),
}

impl From<u8> for SymmetricAlgorithm {
    fn from(u: u8) -> Self {
        use self::SymmetricAlgorithm::*;
        match u {
            0 => Unencrypted,
            1 => IDEA,
            2 => TripleDES,
            3 => CAST5,
            4 => Blowfish,
            7 => AES128,
            8 => AES192,
            9 => AES256,
            10 => Twofish,
            11 => Camellia128,
            12 => Camellia192,
            13 => Camellia256,
            100..=110 => Private(u),
            u => Unknown(u),
        }
    }
}

impl From<SymmetricAlgorithm> for u8 {
    fn from(s: SymmetricAlgorithm) -> u8 {
        use self::SymmetricAlgorithm::*;
        match s {
            Unencrypted => 0,
            IDEA => 1,
            TripleDES => 2,
            CAST5 => 3,
            Blowfish => 4,
            AES128 => 7,
            AES192 => 8,
            AES256 => 9,
            Twofish => 10,
            Camellia128 => 11,
            Camellia192 => 12,
            Camellia256 => 13,
            Private(u) => u,
            Unknown(u) => u,
        }
    }
}

impl SymmetricAlgorithm {
    /// Length of a key for this algorithm in bytes.
    pub fn key_size(self) -> Result<usize> {
        use self::SymmetricAlgorithm::*;
        match self {
            IDEA => Ok(16),
            TripleDES => Ok(24),
            CAST5 => Ok(16),
            Blowfish => Ok(16),
            AES128 => Ok(16),
            AES192 => Ok(24),
            AES256 => Ok(32),
            Twofish => Ok(32),
            Camellia128 => Ok(16),
            Camellia192 => Ok(24),
            Camellia256 => Ok(32),
            _ => Err(Error::UnsupportedSymmetricAlgorithm(self).into()),
        }
    }

    /// Length of a block for this algorithm in bytes.
    pub fn block_size(self) -> Result<usize> {
        use self::SymmetricAlgorithm::*;
        match self {
            IDEA => Ok(8),
            TripleDES => Ok(8),
            CAST5 => Ok(8),
            Blowfish => Ok(8),
            AES128 => Ok(16),
            AES192 => Ok(16),
            AES256 => Ok(16),
            Twofish => Ok(16),
            Camellia128 => Ok(16),
            Camellia192 => Ok(16),
            Camellia256 => Ok(16),
            _ => Err(Error::UnsupportedSymmetricAlgorithm(self).into()),
        }
    }
}

impl fmt::Display for SymmetricAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::SymmetricAlgorithm::*;
        match *self {
            Unencrypted => f.write_str("Unencrypted"),
            IDEA => f.write_str("IDEA"),
            TripleDES => f.write_str("TripleDES (EDE-DES, 168 bit key derived from 192)"),
            CAST5 => f.write_str("CAST5 (128 bit key, 16 rounds)"),
            Blowfish => f.write_str("Blowfish (128 bit key, 16 rounds)"),
            AES128 => f.write_str("AES with 128-bit key"),
            AES192 => f.write_str("AES with 192-bit key"),
            AES256 => f.write_str("AES with 256-bit key"),
            Twofish => f.write_str("Twofish with 256-bit key"),
            Camellia128 => f.write_str("Camellia with 128-bit key"),
            Camellia192 => f.write_str("Camellia with 192-bit key"),
            Camellia256 => f.write_str("Camellia with 256-bit key"),
            Private(u) =>
                f.write_fmt(format_args!("Private/Experimental symmetric key algorithm {}", u)),
            Unknown(u) =>
                f.write_fmt(format_args!("Unknown symmetric key algorithm {}", u)),
        }
    }
}

#[cfg(test)]
impl Arbitrary for SymmetricAlgorithm {
    fn arbitrary(g: &mut Gen) -> Self {
        u8::arbitrary(g).into()
    }
}

/// The OpenPGP hash algorithms as defined in [Section 9.4 of RFC 4880].
///
///   [Section 9.4 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-9.4
#[derive(Clone, Copy, PartialEq, Eq, Debug, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum HashAlgorithm {
    /// Rivest et al. message digest 5.
    MD5,
    /// NIST Secure Hash Algorithm (deprecated).
    SHA1,
    /// RIPEMD-160.
    RipeMD,
    /// 256-bit version of SHA2.
    SHA256,
    /// 384-bit version of SHA2.
    SHA384,
    /// 512-bit version of SHA2.
    SHA512,
    /// 224-bit version of SHA2.
    SHA224,
    /// Private hash algorithm identifier.
    Private(u8),
    /// Unknown hash algorithm identifier.
    Unknown(u8),
}

impl From<u8> for HashAlgorithm {
    fn from(u: u8) -> Self {
        use self::HashAlgorithm::*;
        match u {
            1 => MD5,
            2 => SHA1,
            3 => RipeMD,
            8 => SHA256,
            9 => SHA384,
            10 => SHA512,
            11 => SHA224,
            100..=110 => Private(u),
            u => Unknown(u),
        }
    }
}

impl From<HashAlgorithm> for u8 {
    fn from(h: HashAlgorithm) -> u8 {
        use self::HashAlgorithm::*;
        match h {
            MD5 => 1,
            SHA1 => 2,
            RipeMD => 3,
            SHA256 => 8,
            SHA384 => 9,
            SHA512 => 10,
            SHA224 => 11,
            Private(u) => u,
            Unknown(u) => u,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::HashAlgorithm::*;
        match *self {
            MD5 => f.write_str("MD5"),
            SHA1 => f.write_str("SHA1"),
            RipeMD => f.write_str("RipeMD160"),
            SHA256 => f.write_str("SHA256"),
            SHA384 => f.write_str("SHA384"),
            SHA512 => f.write_str("SHA512"),
            SHA224 => f.write_str("SHA224"),
            Private(u) =>
                f.write_fmt(format_args!("Private/Experimental hash algorithm {}", u)),
            Unknown(u) =>
                f.write_fmt(format_args!("Unknown hash algorithm {}", u)),
        }
    }
}

#[cfg(test)]
impl Arbitrary for HashAlgorithm {
    fn arbitrary(g: &mut Gen) -> Self {
        u8::arbitrary(g).into()
    }
}

/// The OpenPGP compression algorithms as defined in [Section 9.3 of
/// RFC 4880].
///
///   [Section 9.3 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-9.3
#[derive(Clone, Copy, PartialEq, Eq, Debug, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum CompressionAlgorithm {
    /// Null compression.
    Uncompressed,
    /// DEFLATE.
    Zip,
    /// ZLIB.
    Zlib,
    /// bzip2.
    BZip2,
    /// Private compression algorithm identifier.
    Private(u8),
    /// Unknown compression algorithm identifier.
    Unknown(u8),
}

impl From<u8> for CompressionAlgorithm {
    fn from(u: u8) -> Self {
        use self::CompressionAlgorithm::*;
        match u {
            0 => Uncompressed,
            1 => Zip,
            2 => Zlib,
            3 => BZip2,
            100..=110 => Private(u),
            u => Unknown(u),
        }
    }
}

impl From<CompressionAlgorithm> for u8 {
    fn from(c: CompressionAlgorithm) -> u8 {
        use self::CompressionAlgorithm::*;
        match c {
            Uncompressed => 0,
            Zip => 1,
            Zlib => 2,
            BZip2 => 3,
            Private(u) => u,
            Unknown(u) => u,
        }
    }
}

impl fmt::Display for CompressionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::CompressionAlgorithm::*;
        match *self {
            Uncompressed => f.write_str("Uncompressed"),
            Zip => f.write_str("ZIP"),
            Zlib => f.write_str("ZLIB"),
            BZip2 => f.write_str("BZip2"),
            Private(u) =>
                f.write_fmt(format_args!("Private/Experimental compression algorithm {}", u)),
            Unknown(u) =>
                f.write_fmt(format_args!("Unknown compression algorithm {}", u)),
        }
    }
}

/// Signature types as defined in [Section 5.2.1 of RFC 4880].
///
///   [Section 5.2.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.1
#[derive(Clone, Copy, PartialEq, Eq, Debug, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum SignatureType {
    /// Signature over a binary document.
    Binary,
    /// Signature over a canonical text document.
    Text,
    /// Standalone signature.
    Standalone,
    /// Generic certification of a User ID and Public-Key packet.
    GenericCertification,
    /// Persona certification of a User ID and Public-Key packet.
    PersonaCertification,
    /// Casual certification of a User ID and Public-Key packet.
    CasualCertification,
    /// Positive certification of a User ID and Public-Key packet.
    PositiveCertification,
    /// Subkey Binding Signature.
    SubkeyBinding,
    /// Primary Key Binding Signature.
    PrimaryKeyBinding,
    /// Signature directly on a key.
    DirectKey,
    /// Key revocation signature.
    KeyRevocation,
    /// Subkey revocation signature.
    SubkeyRevocation,
    /// Certification revocation signature.
    CertificationRevocation,
    /// Timestamp signature.
    Timestamp,
    /// Third-Party Confirmation signature.
    Confirmation,
    /// Catchall.
    Unknown(u8),
}

impl From<u8> for SignatureType {
    fn from(u: u8) -> Self {
        use self::SignatureType::*;
        match u {
            0x00 => Binary,
            0x01 => Text,
            0x02 => Standalone,
            0x10 => GenericCertification,
            0x11 => PersonaCertification,
            0x12 => CasualCertification,
            0x13 => PositiveCertification,
            0x18 => SubkeyBinding,
            0x19 => PrimaryKeyBinding,
            0x1f => DirectKey,
            0x20 => KeyRevocation,
            0x28 => SubkeyRevocation,
            0x30 => CertificationRevocation,
            0x40 => Timestamp,
            0x50 => Confirmation,
            u => Unknown(u),
        }
    }
}

impl From<SignatureType> for u8 {
    fn from(t: SignatureType) -> u8 {
        use self::SignatureType::*;
        match t {
            Binary => 0x00,
            Text => 0x01,
            Standalone => 0x02,
            GenericCertification => 0x10,
            PersonaCertification => 0x11,
            CasualCertification => 0x12,
            PositiveCertification => 0x13,
            SubkeyBinding => 0x18,
            PrimaryKeyBinding => 0x19,
            DirectKey => 0x1f,
            KeyRevocation => 0x20,
            SubkeyRevocation => 0x28,
            CertificationRevocation => 0x30,
            Timestamp => 0x40,
            Confirmation => 0x50,
            Unknown(u) => u,
        }
    }
}

impl fmt::Display for SignatureType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::SignatureType::*;
        match *self {
            Binary => f.write_str("Binary"),
            Text => f.write_str("Text"),
            Standalone => f.write_str("Standalone"),
            GenericCertification => f.write_str("GenericCertification"),
            PersonaCertification => f.write_str("PersonaCertification"),
            CasualCertification => f.write_str("CasualCertification"),
            PositiveCertification => f.write_str("PositiveCertification"),
            SubkeyBinding => f.write_str("SubkeyBinding"),
            PrimaryKeyBinding => f.write_str("PrimaryKeyBinding"),
            DirectKey => f.write_str("DirectKey"),
            KeyRevocation => f.write_str("KeyRevocation"),
            SubkeyRevocation => f.write_str("SubkeyRevocation"),
            CertificationRevocation => f.write_str("CertificationRevocation"),
            Timestamp => f.write_str("Timestamp"),
            Confirmation => f.write_str("Confirmation"),
            Unknown(u) =>
                f.write_fmt(format_args!("Unknown signature type 0x{:x}", u)),
        }
    }
}

/// The secret-key protection usage octet (see [Section 5.5.3 of RFC
/// 4880]).
///
/// The octet directly preceding the secret MPIs declares how they
/// are protected: `0` for cleartext with a sum-16 checksum, `254`
/// for encryption with a SHA-1 check hash, `255` for encryption with
/// a sum-16 checksum.  Any other value is a deprecated shorthand for
/// a symmetric algorithm identifier and is not supported here.
///
///   [Section 5.5.3 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.5.3
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[non_exhaustive]
pub enum S2KUsage {
    /// The secret MPIs are stored in the clear.
    Unprotected,
    /// Encrypted, integrity protected by a sum-16 checksum (usage 255).
    Encrypted,
    /// Encrypted, integrity protected by a SHA-1 hash (usage 254).
    EncryptedAndHashed,
    /// Unknown usage octet.
    Unknown(u8),
}

impl From<u8> for S2KUsage {
    fn from(u: u8) -> Self {
        match u {
            0 => S2KUsage::Unprotected,
            255 => S2KUsage::Encrypted,
            254 => S2KUsage::EncryptedAndHashed,
            u => S2KUsage::Unknown(u),
        }
    }
}

impl From<S2KUsage> for u8 {
    fn from(u: S2KUsage) -> u8 {
        match u {
            S2KUsage::Unprotected => 0,
            S2KUsage::Encrypted => 255,
            S2KUsage::EncryptedAndHashed => 254,
            S2KUsage::Unknown(u) => u,
        }
    }
}

/// Describes how a key may be used.
///
/// Key flags are communicated in a signature subpacket (see [Section
/// 5.2.3.21 of RFC 4880]).  Only the first flag octet is modeled;
/// no flags beyond it are defined by the RFC.
///
///   [Section 5.2.3.21 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.3.21
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, Hash)]
pub struct KeyFlags(u8);

const KEY_FLAG_CERTIFY: u8 = 0x01;
const KEY_FLAG_SIGN: u8 = 0x02;
const KEY_FLAG_ENCRYPT_COMMS: u8 = 0x04;
const KEY_FLAG_ENCRYPT_STORAGE: u8 = 0x08;
const KEY_FLAG_SPLIT: u8 = 0x10;
const KEY_FLAG_AUTHENTICATE: u8 = 0x20;
const KEY_FLAG_GROUP: u8 = 0x80;

impl KeyFlags {
    /// Returns an empty key flags set.
    pub fn empty() -> Self {
        KeyFlags(0)
    }

    /// Creates key flags from the raw flag octet.
    pub fn from_bits(bits: u8) -> Self {
        KeyFlags(bits)
    }

    /// Returns the raw flag octet.
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Whether no flag is set.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// This key may be used to certify other keys.
    pub fn for_certification(&self) -> bool {
        self.0 & KEY_FLAG_CERTIFY != 0
    }

    /// Sets whether this key may be used to certify other keys.
    pub fn set_certification(mut self, v: bool) -> Self {
        self.set(KEY_FLAG_CERTIFY, v);
        self
    }

    /// This key may be used to sign data.
    pub fn for_signing(&self) -> bool {
        self.0 & KEY_FLAG_SIGN != 0
    }

    /// Sets whether this key may be used to sign data.
    pub fn set_signing(mut self, v: bool) -> Self {
        self.set(KEY_FLAG_SIGN, v);
        self
    }

    /// This key may be used to encrypt communications.
    pub fn for_transport_encryption(&self) -> bool {
        self.0 & KEY_FLAG_ENCRYPT_COMMS != 0
    }

    /// Sets whether this key may be used to encrypt communications.
    pub fn set_transport_encryption(mut self, v: bool) -> Self {
        self.set(KEY_FLAG_ENCRYPT_COMMS, v);
        self
    }

    /// This key may be used to encrypt storage.
    pub fn for_storage_encryption(&self) -> bool {
        self.0 & KEY_FLAG_ENCRYPT_STORAGE != 0
    }

    /// Sets whether this key may be used to encrypt storage.
    pub fn set_storage_encryption(mut self, v: bool) -> Self {
        self.set(KEY_FLAG_ENCRYPT_STORAGE, v);
        self
    }

    /// This key may be used for authentication.
    pub fn for_authentication(&self) -> bool {
        self.0 & KEY_FLAG_AUTHENTICATE != 0
    }

    /// Sets whether this key may be used for authentication.
    pub fn set_authentication(mut self, v: bool) -> Self {
        self.set(KEY_FLAG_AUTHENTICATE, v);
        self
    }

    /// The private component of this key may have been split.
    pub fn is_split_key(&self) -> bool {
        self.0 & KEY_FLAG_SPLIT != 0
    }

    /// The private component of this key may be in the possession of
    /// more than one person.
    pub fn is_group_key(&self) -> bool {
        self.0 & KEY_FLAG_GROUP != 0
    }

    fn set(&mut self, bit: u8, v: bool) {
        if v {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }
}

/// Describes preferences regarding key servers.
///
/// Communicated in a signature subpacket (see [Section 5.2.3.17 of
/// RFC 4880]).  The only defined bit is `no-modify`.
///
///   [Section 5.2.3.17 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.3.17
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, Hash)]
pub struct KeyServerPreferences(u8);

const KEYSERVER_PREFERENCE_NO_MODIFY: u8 = 0x80;

impl KeyServerPreferences {
    /// Creates key server preferences from the raw preference octet.
    pub fn from_bits(bits: u8) -> Self {
        KeyServerPreferences(bits)
    }

    /// Returns the raw preference octet.
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Whether the key holder requests that this key only be
    /// modified or updated by the key holder or an administrator of
    /// the key server.
    pub fn no_modify(&self) -> bool {
        self.0 & KEYSERVER_PREFERENCE_NO_MODIFY != 0
    }

    /// Sets the no-modify preference.
    pub fn set_no_modify(mut self, v: bool) -> Self {
        if v {
            self.0 |= KEYSERVER_PREFERENCE_NO_MODIFY;
        } else {
            self.0 &= !KEYSERVER_PREFERENCE_NO_MODIFY;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    quickcheck! {
        fn pk_algo_roundtrip(a: PublicKeyAlgorithm) -> bool {
            let v: u8 = a.into();
            a == PublicKeyAlgorithm::from(v)
        }
    }

    quickcheck! {
        fn symm_algo_roundtrip(a: SymmetricAlgorithm) -> bool {
            let v: u8 = a.into();
            a == SymmetricAlgorithm::from(v)
        }
    }

    quickcheck! {
        fn hash_algo_roundtrip(a: HashAlgorithm) -> bool {
            let v: u8 = a.into();
            a == HashAlgorithm::from(v)
        }
    }

    #[test]
    fn curve_oid_roundtrip() {
        for curve in [Curve::NistP256, Curve::NistP384, Curve::NistP521,
                      Curve::BrainpoolP256, Curve::BrainpoolP512,
                      Curve::Ed25519, Curve::Cv25519, Curve::Sm2P256] {
            assert_eq!(Curve::from_oid(curve.oid().unwrap()), curve);
        }
    }

    #[test]
    fn ed25519_oid() {
        assert_eq!(Curve::Ed25519.oid().unwrap(),
                   &[0x2B, 0x06, 0x01, 0x04, 0x01, 0xDA, 0x47, 0x0F, 0x01]);
    }

    #[test]
    fn unknown_curve_has_no_oid() {
        let curve = Curve::from_oid(&[0x2b, 0x00, 0x01]);
        assert!(matches!(curve, Curve::Unknown(_)));
        assert!(curve.oid().is_err());
    }

    #[test]
    fn s2k_usage_octets() {
        assert_eq!(u8::from(S2KUsage::Unprotected), 0);
        assert_eq!(u8::from(S2KUsage::EncryptedAndHashed), 254);
        assert_eq!(u8::from(S2KUsage::Encrypted), 255);
        assert_eq!(S2KUsage::from(7), S2KUsage::Unknown(7));
    }

    #[test]
    fn key_flags() {
        let flags = KeyFlags::empty()
            .set_certification(true)
            .set_signing(true);
        assert_eq!(flags.bits(), 0x03);
        assert!(flags.for_certification());
        assert!(!flags.for_authentication());
        assert!(KeyFlags::empty().is_empty());
    }
}
