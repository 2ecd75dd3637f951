//! Packet serialization.
//!
//! This module turns the packet bodies in [`crate::packet`] into
//! their RFC 4880 wire form.  Body lengths are computed up front
//! from the variable-width MPIs, the new-format header is written,
//! and the body is emitted through a counting stage that verifies
//! the precomputed length byte-for-byte; a mismatch is an internal
//! invariant violation, not a recoverable condition.

use std::io;
use std::io::Write as _;

use crate::crypto::s2k::S2K;
use crate::crypto::{self, mpi, Password};
use crate::packet::header::{BodyLength, CTB};
use crate::packet::signature::{Signature, Subpacket, SubpacketArea,
                               SubpacketValue};
use crate::packet::{Key, SecretKey, Tag, UserID};
use crate::types::{HashAlgorithm, S2KUsage};
use crate::Error;
use crate::Result;

pub mod writer;
use writer::{CfbWriter, CountingWriter, HashingWriter, Sum16Writer};

/// Serializes OpenPGP data structures into a writer.
pub trait Marshal {
    /// Writes the serialized form into `o`.
    fn serialize(&self, o: &mut dyn io::Write) -> Result<()>;
}

/// Serializes OpenPGP data structures of known length.
pub trait MarshalInto: Marshal {
    /// Computes the maximal length of the serialized representation.
    fn serialized_len(&self) -> usize;

    /// Serializes into a newly allocated vector.
    fn to_vec(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.serialized_len());
        self.serialize(&mut buf)?;
        Ok(buf)
    }
}

pub(crate) fn write_byte(o: &mut dyn io::Write, b: u8) -> Result<()> {
    o.write_all(&[b])?;
    Ok(())
}

pub(crate) fn write_be_u16(o: &mut dyn io::Write, n: u16) -> Result<()> {
    o.write_all(&n.to_be_bytes())?;
    Ok(())
}

pub(crate) fn write_be_u32(o: &mut dyn io::Write, n: u32) -> Result<()> {
    o.write_all(&n.to_be_bytes())?;
    Ok(())
}

/// Writes a new-format packet header.
fn write_header(o: &mut dyn io::Write, tag: Tag, body_len: usize)
                -> Result<()> {
    let body_len = u32::try_from(body_len)
        .map_err(|_| Error::InvalidArgument(
            format!("packet of {} bytes is not representable", body_len)))?;
    CTB::new(tag).serialize(o)?;
    BodyLength::Full(body_len).serialize(o)
}

impl Marshal for mpi::MPI {
    fn serialize(&self, o: &mut dyn io::Write) -> Result<()> {
        let bits = self.bits();
        if bits > u16::MAX as usize {
            return Err(Error::MalformedMPI(
                format!("{} bits exceed the length field", bits)).into());
        }

        write_be_u16(o, bits as u16)?;
        o.write_all(self.value())?;
        Ok(())
    }
}

impl MarshalInto for mpi::MPI {
    fn serialized_len(&self) -> usize {
        2 + self.value().len()
    }
}

impl Marshal for mpi::PublicKey {
    fn serialize(&self, o: &mut dyn io::Write) -> Result<()> {
        use crate::crypto::mpi::PublicKey::*;
        match self {
            RSA { e, n } => {
                n.serialize(o)?;
                e.serialize(o)
            },

            DSA { p, q, g, y } => {
                p.serialize(o)?;
                q.serialize(o)?;
                g.serialize(o)?;
                y.serialize(o)
            },

            Elgamal { p, g, y } => {
                p.serialize(o)?;
                g.serialize(o)?;
                y.serialize(o)
            },

            EdDSA { curve, q }
            | ECDSA { curve, q }
            | SM2 { curve, q } => {
                let oid = curve.oid()?;
                write_byte(o, oid.len() as u8)?;
                o.write_all(oid)?;
                q.serialize(o)
            },

            ECDH { curve, q, hash, sym } => {
                let oid = curve.oid()?;
                write_byte(o, oid.len() as u8)?;
                o.write_all(oid)?;
                q.serialize(o)?;
                // KDF parameters: length of the following fields,
                // the reserved format octet, then the hash and
                // key-wrap algorithms.
                write_byte(o, 3)?;
                write_byte(o, 1)?;
                write_byte(o, (*hash).into())?;
                write_byte(o, (*sym).into())
            },
        }
    }
}

impl Marshal for mpi::SecretKey {
    fn serialize(&self, o: &mut dyn io::Write) -> Result<()> {
        use crate::crypto::mpi::SecretKey::*;
        match self {
            RSA { d, p, q, u } => {
                d.serialize(o)?;
                p.serialize(o)?;
                q.serialize(o)?;
                u.serialize(o)
            },

            DSA { x } => x.serialize(o),

            Elgamal { x } => x.serialize(o),

            EdDSA { scalar }
            | ECDSA { scalar }
            | SM2 { scalar }
            | ECDH { scalar } => scalar.serialize(o),
        }
    }
}

impl Marshal for mpi::Signature {
    fn serialize(&self, o: &mut dyn io::Write) -> Result<()> {
        use crate::crypto::mpi::Signature::*;
        match self {
            RSA { s } => s.serialize(o),

            DSA { r, s }
            | EdDSA { r, s }
            | ECDSA { r, s } => {
                r.serialize(o)?;
                s.serialize(o)
            },
        }
    }
}

/// Writes the subpacket length field (see RFC 4880, Section
/// 5.2.3.1): one octet below 192, two octets below 16320, five
/// octets otherwise.
fn write_subpacket_length(o: &mut dyn io::Write, len: usize) -> Result<()> {
    if len < 192 {
        write_byte(o, len as u8)
    } else if len < 16320 {
        let v = len - 192;
        write_byte(o, (v >> 8) as u8 + 192)?;
        write_byte(o, v as u8)
    } else {
        write_byte(o, 0xff)?;
        write_be_u32(o, len as u32)
    }
}

fn subpacket_length_len(len: usize) -> usize {
    if len < 192 { 1 } else if len < 16320 { 2 } else { 5 }
}

impl Marshal for Subpacket {
    fn serialize(&self, o: &mut dyn io::Write) -> Result<()> {
        // The length includes the type octet.
        write_subpacket_length(o, 1 + self.value().body_len())?;

        let typ = u8::from(self.tag())
            | if self.critical() { 0x80 } else { 0 };
        write_byte(o, typ)?;

        use self::SubpacketValue::*;
        match self.value() {
            SignatureCreationTime(t) => write_be_u32(o, *t),
            KeyExpirationTime(t) => write_be_u32(o, *t),
            PreferredSymmetricAlgorithms(algos) => {
                for a in algos {
                    write_byte(o, (*a).into())?;
                }
                Ok(())
            },
            Issuer(id) => {
                o.write_all(id.as_bytes())?;
                Ok(())
            },
            PreferredHashAlgorithms(algos) => {
                for a in algos {
                    write_byte(o, (*a).into())?;
                }
                Ok(())
            },
            PreferredCompressionAlgorithms(algos) => {
                for a in algos {
                    write_byte(o, (*a).into())?;
                }
                Ok(())
            },
            KeyServerPreferences(prefs) => write_byte(o, prefs.bits()),
            PreferredKeyServer(uri) => {
                o.write_all(uri)?;
                Ok(())
            },
            PrimaryUserID(primary) => write_byte(o, *primary as u8),
            KeyFlags(flags) => write_byte(o, flags.bits()),
            Unknown { body, .. } => {
                o.write_all(body)?;
                Ok(())
            },
        }
    }
}

impl MarshalInto for Subpacket {
    fn serialized_len(&self) -> usize {
        let net = 1 + self.value().body_len();
        subpacket_length_len(net) + net
    }
}

impl Marshal for SubpacketArea {
    fn serialize(&self, o: &mut dyn io::Write) -> Result<()> {
        for sp in self.iter() {
            sp.serialize(o)?;
        }
        Ok(())
    }
}

impl MarshalInto for SubpacketArea {
    fn serialized_len(&self) -> usize {
        self.iter().map(|sp| sp.serialized_len()).sum()
    }
}

impl UserID {
    /// Number of octets the user-ID packet body occupies.
    pub fn body_len(&self) -> usize {
        self.value().len()
    }
}

impl Marshal for UserID {
    /// Writes the user-ID packet, including its header.
    fn serialize(&self, o: &mut dyn io::Write) -> Result<()> {
        write_header(o, Tag::UserID, self.body_len())?;
        o.write_all(self.value())?;
        Ok(())
    }
}

impl MarshalInto for UserID {
    fn serialized_len(&self) -> usize {
        let body = self.body_len();
        1 + BodyLength::Full(body as u32).serialized_len() + body
    }
}

impl Signature {
    /// Number of octets the signature packet body occupies.
    pub fn body_len(&self) -> usize {
        4   // Version, type, pk algorithm, hash algorithm.
            + 2 + self.hashed_area().serialized_len()
            + 2 + self.unhashed_area().serialized_len()
            + 2 // Digest prefix.
            + self.mpis().serialized_len()
    }

    fn serialize_body(&self, o: &mut dyn io::Write) -> Result<()> {
        write_byte(o, self.version())?;
        write_byte(o, self.typ().into())?;
        write_byte(o, self.pk_algo().into())?;
        write_byte(o, self.hash_algo().into())?;

        write_be_u16(o, self.hashed_area().serialized_len() as u16)?;
        self.hashed_area().serialize(o)?;

        write_be_u16(o, self.unhashed_area().serialized_len() as u16)?;
        self.unhashed_area().serialize(o)?;

        o.write_all(self.digest_prefix())?;
        self.mpis().serialize(o)
    }
}

impl Marshal for Signature {
    /// Writes the signature packet, including its header.
    fn serialize(&self, o: &mut dyn io::Write) -> Result<()> {
        let body_len = self.body_len();
        write_header(o, Tag::Signature, body_len)?;

        let mut counter = CountingWriter::new(o);
        self.serialize_body(&mut counter)?;
        if counter.written() != body_len {
            return Err(Error::InvalidOperation(
                format!("signature body length mismatch: \
                         predicted {}, wrote {}",
                        body_len, counter.written())).into());
        }
        Ok(())
    }
}

impl MarshalInto for Signature {
    fn serialized_len(&self) -> usize {
        let body = self.body_len();
        1 + BodyLength::Full(body as u32).serialized_len() + body
    }
}

impl Key {
    /// Number of octets the public-key packet body occupies:
    /// version, creation time, the v2/v3 validity period, the
    /// algorithm octet, and the key material.
    pub fn public_body_len(&self) -> Result<usize> {
        let version_fields = match self.version() {
            2 | 3 => 1 + 4 + 2 + 1,
            4 => 1 + 4 + 1,
            v => return Err(Error::InvalidOperation(
                format!("invalid key version {}", v)).into()),
        };
        Ok(version_fields + self.mpis().serialized_len()?)
    }

    pub(crate) fn serialize_body(&self, o: &mut dyn io::Write)
                                 -> Result<()> {
        write_byte(o, self.version())?;
        write_be_u32(o, self.creation_time())?;
        match self.version() {
            2 | 3 => write_be_u16(o, self.days_valid())?,
            4 => (),
            v => return Err(Error::InvalidOperation(
                format!("invalid key version {}", v)).into()),
        }
        write_byte(o, self.pk_algo().into())?;
        self.mpis().serialize(o)
    }

    /// Serializes the bare key body into a vector, without the
    /// packet header.
    ///
    /// This is the canonical form fingerprints and signatures are
    /// computed over.
    pub fn to_body_vec(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.public_body_len()?);
        self.serialize_body(&mut buf)?;
        Ok(buf)
    }

    /// Writes the public-key packet under the given tag.
    ///
    /// `tag` selects between a primary key packet and a subkey
    /// packet.  The body length is computed up front; nothing is
    /// written if the key cannot be serialized.
    pub fn serialize(&self, o: &mut dyn io::Write, tag: Tag) -> Result<()> {
        if tag != Tag::PublicKey && tag != Tag::PublicSubkey {
            return Err(Error::InvalidArgument(
                format!("expected a public key tag, got {}", tag)).into());
        }

        let body_len = self.public_body_len()?;
        write_header(o, tag, body_len)?;

        let mut counter = CountingWriter::new(o);
        self.serialize_body(&mut counter)?;
        if counter.written() != body_len {
            return Err(Error::InvalidOperation(
                format!("public key body length mismatch: \
                         predicted {}, wrote {}",
                        body_len, counter.written())).into());
        }
        Ok(())
    }
}

impl SecretKey {
    /// Number of octets the secret-key packet body occupies: the
    /// public body, the usage octet, the S2K parameters and IV where
    /// present, the secret MPIs, and the trailing integrity check.
    pub fn secret_body_len(&self) -> Result<usize> {
        let mut len = self.key().public_body_len()? + 1;

        match self.protection().usage() {
            S2KUsage::Unprotected => {
                len += self.secret().serialized_len();
                len += 2;   // Sum-16 checksum.
            },
            S2KUsage::Encrypted | S2KUsage::EncryptedAndHashed => {
                len += 1;   // Symmetric algorithm.
                len += 1;   // S2K specifier.
                len += 1;   // S2K hash algorithm.
                len += match self.protection().s2k() {
                    S2K::Simple { .. } => 0,
                    S2K::Salted { .. } => 8,
                    S2K::Iterated { .. } => 8 + 1,
                };
                len += self.protection().sym_algo().block_size()?;
                len += self.secret().serialized_len();
                len += match self.protection().usage() {
                    S2KUsage::EncryptedAndHashed => 20,
                    _ => 2,
                };
            },
            S2KUsage::Unknown(u) =>
                return Err(Error::UnsupportedS2KUsage(u).into()),
        }

        Ok(len)
    }

    /// Writes the secret-key packet under the given tag.
    ///
    /// `tag` selects between a primary key packet and a subkey
    /// packet.  For protected keys (`usage` 254) `password` is
    /// required: the salt and IV are drawn fresh from the RNG, the
    /// session key is derived, and the secret MPIs together with
    /// their SHA-1 check hash are encrypted in CFB mode.  The
    /// generated salt, IV, and integrity check are stored back into
    /// this key.
    pub fn serialize(&mut self, o: &mut dyn io::Write, tag: Tag,
                     password: Option<&Password>)
                     -> Result<()> {
        if tag != Tag::SecretKey && tag != Tag::SecretSubkey {
            return Err(Error::InvalidArgument(
                format!("expected a secret key tag, got {}", tag)).into());
        }
        if self.key().version() != 4 {
            return Err(Error::InvalidOperation(
                format!("cannot emit a v{} secret key",
                        self.key().version())).into());
        }

        let body_len = self.secret_body_len()?;
        write_header(o, tag, body_len)?;

        let mut counter = CountingWriter::new(o);
        self.key.serialize_body(&mut counter)?;
        write_byte(&mut counter, self.protection.usage.into())?;

        match self.protection.usage {
            S2KUsage::Unprotected => {
                let mut sum = Sum16Writer::new(&mut counter);
                self.secret.serialize(&mut sum)?;
                let (o, checksum) = sum.finalize();
                write_be_u16(o, checksum)?;
                self.checksum = Some(checksum);
            },
            S2KUsage::EncryptedAndHashed => {
                let password = password.ok_or_else(|| {
                    Error::InvalidArgument(
                        "protected key needs a password".into())
                })?;
                self.serialize_protected(&mut counter, password)?;
            },
            S2KUsage::Encrypted =>
                return Err(Error::UnsupportedS2KUsage(255).into()),
            S2KUsage::Unknown(u) =>
                return Err(Error::UnsupportedS2KUsage(u).into()),
        }

        if counter.written() != body_len {
            return Err(Error::InvalidOperation(
                format!("secret key body length mismatch: \
                         predicted {}, wrote {}",
                        body_len, counter.written())).into());
        }
        Ok(())
    }

    /// Writes everything following the usage octet of a usage-254
    /// key: the cipher and S2K header, the freshly generated salt
    /// and IV, and the CFB ciphertext of the secret MPIs and their
    /// SHA-1 check hash.
    ///
    /// The stage discipline is what guarantees the integrity
    /// semantics: the hashing stage sits above the cipher stage, so
    /// the digest is taken over plaintext, then written through the
    /// still-open cipher.
    fn serialize_protected(&mut self, o: &mut dyn io::Write,
                           password: &Password)
                           -> Result<()> {
        let sym_algo = self.protection.sym_algo;
        let key_size = sym_algo.key_size()?;
        let block_size = sym_algo.block_size()?;

        write_byte(o, sym_algo.into())?;
        write_byte(o, self.protection.s2k.specifier())?;
        write_byte(o, self.protection.s2k.hash_algo().into())?;

        match &mut self.protection.s2k {
            S2K::Simple { .. } => (),
            S2K::Salted { salt, .. }
            | S2K::Iterated { salt, .. } => {
                crypto::random(&mut salt[..]);
                o.write_all(salt)?;
            },
        }

        if let S2K::Iterated { hash_bytes, .. } = self.protection.s2k {
            write_byte(o, S2K::encode_count(hash_bytes))?;
        }

        let session_key =
            self.protection.s2k.derive_key(password, key_size)?;

        let mut iv = vec![0u8; block_size];
        crypto::random(&mut iv[..]);
        o.write_all(&iv)?;
        self.protection.iv = iv.clone();

        let cfb = CfbWriter::new(o, sym_algo, &session_key, &iv)?;
        let mut hashing = HashingWriter::new(cfb, HashAlgorithm::SHA1)?;
        self.secret.serialize(&mut hashing)?;
        let (mut cfb, digest) = hashing.finalize();
        cfb.write_all(&digest)?;
        cfb.finalize()?;

        let mut checkhash = [0u8; 20];
        checkhash.copy_from_slice(&digest);
        self.checkhash = Some(checkhash);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::mpi::MPI;
    use crate::crypto::symmetric::Decryptor;
    use crate::crypto::Signer as _;
    use crate::packet::key::Protection;
    use crate::types::{Curve, PublicKeyAlgorithm, SymmetricAlgorithm};

    fn rsa_2048_key() -> Key {
        let mut n = vec![0xC0u8];
        n.resize(256, 0x17);
        Key::new(0x5A000000, PublicKeyAlgorithm::RSAEncryptSign,
                 mpi::PublicKey::RSA {
                     e: MPI::new(&[0x01, 0x00, 0x01]),
                     n: MPI::new(&n),
                 }).unwrap()
    }

    fn dsa_key() -> Key {
        Key::new(0x3B000000, PublicKeyAlgorithm::DSA,
                 mpi::PublicKey::DSA {
                     p: MPI::new(&[0xE3; 128]),
                     q: MPI::new(&[0xC5; 20]),
                     g: MPI::new(&[0x61; 128]),
                     y: MPI::new(&[0x7D; 128]),
                 }).unwrap()
    }

    #[test]
    fn rsa_2048_pubkey_wire_format() {
        let key = rsa_2048_key();
        let mut buf = Vec::new();
        key.serialize(&mut buf, Tag::PublicKey).unwrap();

        // New-format CTB for tag 6; the 269-byte body needs the
        // two-octet length form.
        assert_eq!(buf[0], 0xC6);
        assert_eq!(&buf[1..3], &[0xC0, 0x4D]);

        // Version, creation time, algorithm.
        assert_eq!(&buf[3..9], &[0x04, 0x5A, 0x00, 0x00, 0x00, 0x01]);

        // Modulus: 2048 bits.
        assert_eq!(&buf[9..11], &[0x08, 0x00]);
        assert_eq!(buf[11], 0xC0);

        // Exponent at the tail: 17 bits, 65537.
        assert_eq!(&buf[buf.len() - 5..],
                   &[0x00, 0x11, 0x01, 0x00, 0x01]);

        assert_eq!(buf.len(), 3 + key.public_body_len().unwrap());
    }

    #[test]
    fn ed25519_pubkey_wire_format() {
        let mut point = vec![0x40];
        point.extend_from_slice(&[0xAB; 32]);
        let key = Key::new(0x5C0FFEE5, PublicKeyAlgorithm::EdDSA,
                           mpi::PublicKey::EdDSA {
                               curve: Curve::Ed25519,
                               q: MPI::new(&point),
                           }).unwrap();

        let mut buf = Vec::new();
        key.serialize(&mut buf, Tag::PublicKey).unwrap();

        let mut expected = vec![
            0xC6, 51,
            0x04, 0x5C, 0x0F, 0xFE, 0xE5,
            22,   // EdDSA.
            9,    // OID length.
            0x2B, 0x06, 0x01, 0x04, 0x01, 0xDA, 0x47, 0x0F, 0x01,
            0x01, 0x07,   // 263 bits.
            0x40,
        ];
        expected.extend_from_slice(&[0xAB; 32]);
        assert_eq!(buf, expected);
    }

    #[test]
    fn pubkey_length_parity() {
        // The length calculator and the emitter must agree for
        // every algorithm.
        let keys = [
            rsa_2048_key(),
            dsa_key(),
            Key::new(1, PublicKeyAlgorithm::ElgamalEncrypt,
                     mpi::PublicKey::Elgamal {
                         p: MPI::new(&[0xE3; 64]),
                         g: MPI::new(&[0x05]),
                         y: MPI::new(&[0x7D; 64]),
                     }).unwrap(),
            Key::new(2, PublicKeyAlgorithm::ECDSA,
                     mpi::PublicKey::ECDSA {
                         curve: Curve::NistP256,
                         q: MPI::new(&[0x04; 65]),
                     }).unwrap(),
            Key::new(3, PublicKeyAlgorithm::SM2,
                     mpi::PublicKey::SM2 {
                         curve: Curve::Sm2P256,
                         q: MPI::new(&[0x04; 65]),
                     }).unwrap(),
            Key::new(4, PublicKeyAlgorithm::ECDH,
                     mpi::PublicKey::ECDH {
                         curve: Curve::Cv25519,
                         q: MPI::new(&[0x40; 33]),
                         hash: HashAlgorithm::SHA256,
                         sym: SymmetricAlgorithm::AES128,
                     }).unwrap(),
        ];

        for key in keys {
            let body = key.to_body_vec().unwrap();
            assert_eq!(body.len(), key.public_body_len().unwrap(),
                       "length mismatch for {}", key.pk_algo());
        }
    }

    #[test]
    fn v3_key_emits_validity_period() {
        let key = Key::new_v3(0x10203040, 365,
                              PublicKeyAlgorithm::RSAEncryptSign,
                              mpi::PublicKey::RSA {
                                  e: MPI::new(&[0x03]),
                                  n: MPI::new(&[0x80; 64]),
                              }).unwrap();
        let body = key.to_body_vec().unwrap();
        assert_eq!(&body[..8],
                   &[0x03, 0x10, 0x20, 0x30, 0x40, 0x01, 0x6D, 0x01]);
        assert_eq!(body.len(), key.public_body_len().unwrap());
    }

    #[test]
    fn unknown_curve_writes_nothing() {
        let key = Key::new(1, PublicKeyAlgorithm::ECDSA,
                           mpi::PublicKey::ECDSA {
                               curve: Curve::Unknown(
                                   vec![0x2b, 0x99].into()),
                               q: MPI::new(&[0x04, 0x01]),
                           }).unwrap();

        assert!(key.public_body_len().is_err());

        let mut buf = Vec::new();
        assert!(key.serialize(&mut buf, Tag::PublicKey).is_err());
        assert!(buf.is_empty());
    }

    #[test]
    fn wrong_tag_is_rejected() {
        let key = rsa_2048_key();
        let mut buf = Vec::new();
        assert!(key.serialize(&mut buf, Tag::SecretKey).is_err());
        assert!(buf.is_empty());
    }

    #[test]
    fn userid_packet() {
        let uid = UserID::from("a@b");
        let buf = uid.to_vec().unwrap();
        assert_eq!(buf, [0xCD, 3, b'a', b'@', b'b']);
        assert_eq!(buf.len(), uid.serialized_len());
    }

    #[test]
    fn unprotected_dsa_checksum() {
        // The MPI stream of x sums to exactly 0x1234: 35 bytes of
        // 0x7F and one of 0xB7 sum to 0x1214, the two length octets
        // 0x01 0x1F add 0x20.
        let mut x = vec![0x7F; 36];
        *x.last_mut().unwrap() = 0xB7;

        let mut sk = SecretKey::new(dsa_key(), mpi::SecretKey::DSA {
            x: MPI::new(&x),
        }).unwrap();

        let mut buf = Vec::new();
        sk.serialize(&mut buf, Tag::SecretKey, None).unwrap();

        assert_eq!(&buf[buf.len() - 2..], &[0x12, 0x34]);
        assert_eq!(sk.checksum(), Some(0x1234));

        // And the checksum is the sum of the emitted MPI stream.
        let body_start = buf.len() - 2 - 2 - 36;
        let sum = buf[body_start..buf.len() - 2].iter()
            .fold(0u16, |acc, &b| acc.wrapping_add(b as u16));
        assert_eq!(sum, 0x1234);
    }

    #[test]
    fn secret_length_parity_unprotected() {
        let mut sk = SecretKey::new(dsa_key(), mpi::SecretKey::DSA {
            x: MPI::new(&[0x31; 20]),
        }).unwrap();

        let body_len = sk.secret_body_len().unwrap();
        let mut buf = Vec::new();
        sk.serialize(&mut buf, Tag::SecretKey, None).unwrap();

        // Header: CTB plus two-octet length.
        let header_len =
            1 + BodyLength::Full(body_len as u32).serialized_len();
        assert_eq!(buf.len(), header_len + body_len);
    }

    #[test]
    fn secret_length_parity_protected() {
        for s2k in [
            S2K::Simple { hash: HashAlgorithm::SHA256 },
            S2K::Salted { hash: HashAlgorithm::SHA256,
                          salt: Default::default() },
            S2K::Iterated { hash: HashAlgorithm::SHA256,
                            salt: Default::default(),
                            hash_bytes: 65536 },
        ] {
            let mut sk = SecretKey::new(dsa_key(), mpi::SecretKey::DSA {
                x: MPI::new(&[0x31; 20]),
            }).unwrap().with_protection(Protection::encrypted_and_hashed(
                SymmetricAlgorithm::AES256, s2k));

            let body_len = sk.secret_body_len().unwrap();
            let mut buf = Vec::new();
            sk.serialize(&mut buf, Tag::SecretSubkey,
                         Some(&"correct horse".into())).unwrap();

            let header_len =
                1 + BodyLength::Full(body_len as u32).serialized_len();
            assert_eq!(buf.len(), header_len + body_len);
        }
    }

    #[test]
    fn protected_rsa_checkhash_roundtrip() {
        let d = vec![0x45; 255];
        let p = vec![0x99; 128];
        let q = vec![0xAB; 128];
        let u = vec![0x5F; 127];
        let secret = mpi::SecretKey::RSA {
            d: MPI::new(&d),
            p: MPI::new(&p),
            q: MPI::new(&q),
            u: MPI::new(&u),
        };

        let mut sk = SecretKey::new(rsa_2048_key(), secret.clone())
            .unwrap()
            .with_protection(Protection::encrypted_and_hashed(
                SymmetricAlgorithm::AES128,
                S2K::Iterated {
                    hash: HashAlgorithm::SHA256,
                    salt: Default::default(),
                    hash_bytes: 65536,
                }));

        let password: Password = "password".into();
        let mut buf = Vec::new();
        sk.serialize(&mut buf, Tag::SecretKey, Some(&password)).unwrap();

        // Walk the emitted packet up to the ciphertext.
        let public_len = sk.key().public_body_len().unwrap();
        let header_len = 1 + BodyLength::Full(
            sk.secret_body_len().unwrap() as u32).serialized_len();
        let mut at = header_len + public_len;
        assert_eq!(buf[at], 254);
        at += 1;
        assert_eq!(buf[at], u8::from(SymmetricAlgorithm::AES128));
        assert_eq!(buf[at + 1], 3);     // Iterated and salted.
        assert_eq!(buf[at + 2], u8::from(HashAlgorithm::SHA256));
        at += 3;
        let salt = &buf[at..at + 8];
        assert_eq!(salt, sk.protection().s2k().salt().unwrap());
        at += 8;
        assert_eq!(S2K::decode_count(buf[at]), 65536);
        at += 1;
        let iv = buf[at..at + 16].to_vec();
        assert_eq!(&iv[..], sk.protection().iv());
        at += 16;

        // Decrypt the tail with the derived session key.
        let session_key = sk.protection().s2k()
            .derive_key(&password, 16).unwrap();
        let mut plaintext = buf[at..].to_vec();
        let mut dec = Decryptor::new(SymmetricAlgorithm::AES128,
                                     &session_key, &iv).unwrap();
        dec.decrypt(&mut plaintext);

        // The final 20 bytes are the SHA-1 of the preceding
        // plaintext MPIs.
        let mpis_len = plaintext.len() - 20;
        let mut ctx = HashAlgorithm::SHA1.context().unwrap();
        ctx.update(&plaintext[..mpis_len]);
        assert_eq!(&plaintext[mpis_len..], &ctx.into_digest()[..]);
        assert_eq!(&plaintext[mpis_len..],
                   &sk.checkhash().unwrap()[..]);

        // And the plaintext MPIs are the canonical d, p, q, u
        // stream.
        let mut expected = Vec::new();
        secret.serialize(&mut expected).unwrap();
        assert_eq!(&plaintext[..mpis_len], &expected[..]);
    }

    #[test]
    fn usage_255_computes_length_but_refuses_to_emit() {
        let mut sk = SecretKey::new(dsa_key(), mpi::SecretKey::DSA {
            x: MPI::new(&[0x31; 20]),
        }).unwrap().with_protection(Protection::encrypted(
            SymmetricAlgorithm::AES128,
            S2K::Salted { hash: HashAlgorithm::SHA1,
                          salt: Default::default() }));

        // Length: public body + usage + sym + specifier + hash +
        // salt + IV + MPIs + sum-16.
        let expected = sk.key().public_body_len().unwrap()
            + 1 + 1 + 1 + 1 + 8 + 16 + (2 + 20) + 2;
        assert_eq!(sk.secret_body_len().unwrap(), expected);

        let mut buf = Vec::new();
        let err = sk.serialize(&mut buf, Tag::SecretKey,
                               Some(&"pw".into()))
            .unwrap_err();
        match err.downcast_ref::<Error>() {
            Some(Error::UnsupportedS2KUsage(255)) => (),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn protected_key_needs_password() {
        let mut sk = SecretKey::new(dsa_key(), mpi::SecretKey::DSA {
            x: MPI::new(&[0x31; 20]),
        }).unwrap().with_protection(Protection::encrypted_and_hashed(
            SymmetricAlgorithm::AES128,
            S2K::Simple { hash: HashAlgorithm::SHA1 }));

        let mut buf = Vec::new();
        assert!(sk.serialize(&mut buf, Tag::SecretKey, None).is_err());
    }

    quickcheck::quickcheck! {
        fn mpi_roundtrip(mpi: MPI) -> bool {
            let buf = mpi.to_vec().unwrap();

            // Parse it back: a two-octet bit count followed by the
            // minimal big-endian value.
            let bits = u16::from_be_bytes([buf[0], buf[1]]) as usize;
            let value = &buf[2..];
            value.len() == (bits + 7) / 8
                && (value.is_empty() || value[0] != 0)
                && MPI::new(value) == mpi
                && mpi.bits() == bits
        }
    }

    #[test]
    fn zero_mpi_on_the_wire() {
        let buf = MPI::new(&[]).to_vec().unwrap();
        assert_eq!(buf, [0x00, 0x00]);
    }

    #[test]
    fn subpacket_wire_format() {
        let sp = Subpacket::new(
            SubpacketValue::SignatureCreationTime(0x5A17_2B01));
        assert_eq!(sp.to_vec().unwrap(),
                   [0x05, 0x02, 0x5A, 0x17, 0x2B, 0x01]);

        let sp = Subpacket::new(SubpacketValue::Issuer(
            crate::KeyID::from_bytes([1, 2, 3, 4, 5, 6, 7, 8])));
        assert_eq!(sp.to_vec().unwrap(),
                   [0x09, 0x10, 1, 2, 3, 4, 5, 6, 7, 8]);

        // The critical bit rides on the type octet.
        let sp = Subpacket::with_criticality(
            SubpacketValue::PrimaryUserID(true), true);
        assert_eq!(sp.to_vec().unwrap(), [0x02, 0x80 | 25, 0x01]);
    }

    #[test]
    fn signature_packet_wire_format() {
        use crate::crypto::asymmetric::ed25519_keypair;
        use crate::packet::signature::{certify_userid,
                                       CertificationOptions};

        let mut pair = ed25519_keypair();
        let primary = pair.public().clone();
        let sig = certify_userid(
            &mut pair, &primary, &UserID::from("x@y"),
            &CertificationOptions {
                creation_time: Some(0x5A000000),
                ..Default::default()
            },
            HashAlgorithm::SHA256).unwrap();

        let buf = sig.to_vec().unwrap();
        assert_eq!(buf.len(), sig.serialized_len());

        // CTB for tag 2, one-octet length.
        assert_eq!(buf[0], 0xC2);
        assert_eq!(buf[1] as usize, sig.body_len());

        // Version 4, type 0x13, EdDSA, SHA256.
        assert_eq!(&buf[2..6], &[0x04, 0x13, 22, 8]);

        // Hashed area: creation time and issuer subpackets.
        let hashed_len =
            u16::from_be_bytes([buf[6], buf[7]]) as usize;
        assert_eq!(hashed_len, 6 + 10);
        assert_eq!(&buf[8..14],
                   &[0x05, 0x02, 0x5A, 0x00, 0x00, 0x00]);

        // Unhashed area is empty.
        let at = 8 + hashed_len;
        assert_eq!(&buf[at..at + 2], &[0x00, 0x00]);

        // Digest prefix, then the EdDSA r and s MPIs.
        assert_eq!(&buf[at + 2..at + 4], sig.digest_prefix());
    }
}
