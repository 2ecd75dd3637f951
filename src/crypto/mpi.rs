//! Multi Precision Integers.
//!
//! An MPI is serialized as a two-octet big-endian bit count followed
//! by the minimal unsigned big-endian representation of the value
//! (see [Section 3.2 of RFC 4880]).  This module holds the `MPI`
//! type and the typed key-material unions built from it.
//!
//!   [Section 3.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-3.2

use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::types::{
    Curve,
    HashAlgorithm,
    SymmetricAlgorithm,
};
use crate::Result;

/// Holds a single MPI.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MPI {
    /// Integer value as big-endian.
    value: Box<[u8]>,
}

impl MPI {
    /// Creates a new MPI.
    ///
    /// This function takes care of leading zeros.
    pub fn new(value: &[u8]) -> Self {
        let mut leading_zeros = 0;
        for b in value {
            leading_zeros += b.leading_zeros() as usize;
            if *b != 0 {
                break;
            }
        }

        let offset = leading_zeros / 8;
        let value = Vec::from(&value[offset..]).into_boxed_slice();

        MPI {
            value,
        }
    }

    /// Returns the length of the MPI in bits.
    ///
    /// Zero has a bit length of 0.
    pub fn bits(&self) -> usize {
        self.value.len() * 8
            - self.value.get(0).map(|&b| b.leading_zeros() as usize)
                  .unwrap_or(0)
    }

    /// Returns the value of this MPI.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Number of octets the MPI occupies when serialized: two length
    /// octets plus the value.
    pub fn serialized_len(&self) -> usize {
        2 + self.value.len()
    }

    pub(crate) fn secure_memzero(&mut self) {
        unsafe {
            memsec::memzero(self.value.as_mut_ptr(), self.value.len());
        }
    }
}

impl From<Vec<u8>> for MPI {
    fn from(v: Vec<u8>) -> Self {
        Self::new(&v)
    }
}

impl fmt::Debug for MPI {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} bits:", self.bits())?;
        for b in self.value.iter() {
            write!(f, " {:02X}", b)?;
        }
        Ok(())
    }
}

#[cfg(test)]
impl Arbitrary for MPI {
    fn arbitrary(g: &mut Gen) -> Self {
        loop {
            let buf = <Vec<u8>>::arbitrary(g);

            if !buf.is_empty() && buf[0] != 0 {
                break MPI::new(&buf);
            }
        }
    }
}

/// Holds the public key material of a key packet.
///
/// Provides a typed and structured way of storing multiple MPIs (and
/// the occasional elliptic curve) in packets.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[non_exhaustive]
pub enum PublicKey {
    /// RSA public key.
    RSA {
        /// Public exponent.
        e: MPI,
        /// Public modulo N = pq.
        n: MPI,
    },

    /// NIST DSA public key.
    DSA {
        /// Prime of the ring Zp.
        p: MPI,
        /// Order of `g` in Zp.
        q: MPI,
        /// Public generator of Zp.
        g: MPI,
        /// Public key g^x mod p.
        y: MPI,
    },

    /// Elgamal public key.
    Elgamal {
        /// Prime of the ring Zp.
        p: MPI,
        /// Generator of Zp.
        g: MPI,
        /// Public key g^x mod p.
        y: MPI,
    },

    /// DJBs "Twisted" Edwards curve DSA public key.
    EdDSA {
        /// Curve we're using.  Must be curve 25519.
        curve: Curve,
        /// Public point.
        q: MPI,
    },

    /// NISTs Elliptic curve DSA public key.
    ECDSA {
        /// Curve we're using.
        curve: Curve,
        /// Public point.
        q: MPI,
    },

    /// SM2 public key.
    SM2 {
        /// Curve we're using.  Must be the SM2 recommended curve.
        curve: Curve,
        /// Public point.
        q: MPI,
    },

    /// Elliptic curve Elgamal public key.
    ECDH {
        /// Curve we're using.
        curve: Curve,
        /// Public point.
        q: MPI,
        /// Hash algorithm used for key derivation.
        hash: HashAlgorithm,
        /// Algorithm used w/the derived key.
        sym: SymmetricAlgorithm,
    },
}

impl PublicKey {
    /// Number of octets the key material occupies when serialized.
    ///
    /// # Errors
    ///
    /// Fails with `Error::UnsupportedEllipticCurve` if the material
    /// references a curve without a known OID; such material cannot
    /// be serialized at all, and the failure surfaces here, before
    /// any byte is written.
    pub fn serialized_len(&self) -> Result<usize> {
        use self::PublicKey::*;

        match self {
            RSA { e, n } =>
                Ok(n.serialized_len() + e.serialized_len()),

            DSA { p, q, g, y } =>
                Ok(p.serialized_len() + q.serialized_len() +
                   g.serialized_len() + y.serialized_len()),

            Elgamal { p, g, y } =>
                Ok(p.serialized_len() +
                   g.serialized_len() + y.serialized_len()),

            EdDSA { curve, q }
            | ECDSA { curve, q }
            | SM2 { curve, q } =>
                // One length octet plus the ASN.1 OID.
                Ok(1 + curve.oid()?.len() + q.serialized_len()),

            ECDH { curve, q, .. } =>
                // One length octet plus the ASN.1 OID, then one
                // octet length, one reserved and two algorithm
                // identifiers for the KDF parameters.
                Ok(1 + curve.oid()?.len() + q.serialized_len() + 4),
        }
    }

    /// Returns the curve, if the material is from the EC family.
    pub fn curve(&self) -> Option<&Curve> {
        use self::PublicKey::*;
        match self {
            EdDSA { curve, .. }
            | ECDSA { curve, .. }
            | SM2 { curve, .. }
            | ECDH { curve, .. } => Some(curve),
            _ => None,
        }
    }

    /// Whether this material belongs to keys of the given algorithm.
    pub fn is_for(&self, pk_algo: crate::types::PublicKeyAlgorithm) -> bool {
        use crate::types::PublicKeyAlgorithm::*;
        matches!(
            (pk_algo, self),
            (RSAEncryptSign, PublicKey::RSA { .. })
                | (RSAEncrypt, PublicKey::RSA { .. })
                | (RSASign, PublicKey::RSA { .. })
                | (DSA, PublicKey::DSA { .. })
                | (ElgamalEncrypt, PublicKey::Elgamal { .. })
                | (ECDSA, PublicKey::ECDSA { .. })
                | (EdDSA, PublicKey::EdDSA { .. })
                | (SM2, PublicKey::SM2 { .. })
                | (ECDH, PublicKey::ECDH { .. }))
    }
}

#[cfg(test)]
impl Arbitrary for PublicKey {
    fn arbitrary(g: &mut Gen) -> Self {
        use self::PublicKey::*;
        match u8::arbitrary(g) % 5 {
            0 => RSA {
                e: MPI::arbitrary(g),
                n: MPI::arbitrary(g),
            },

            1 => DSA {
                p: MPI::arbitrary(g),
                q: MPI::arbitrary(g),
                g: MPI::arbitrary(g),
                y: MPI::arbitrary(g),
            },

            2 => Elgamal {
                p: MPI::arbitrary(g),
                g: MPI::arbitrary(g),
                y: MPI::arbitrary(g),
            },

            3 => EdDSA {
                curve: Curve::Ed25519,
                q: MPI::arbitrary(g),
            },

            4 => ECDSA {
                curve: Curve::NistP256,
                q: MPI::arbitrary(g),
            },

            _ => unreachable!(),
        }
    }
}

/// Holds the secret key material of a key packet.
///
/// Provides a typed and structured way of storing multiple MPIs in
/// packets.  The material is zeroed when dropped.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[non_exhaustive]
pub enum SecretKey {
    /// RSA secret key.
    RSA {
        /// Secret exponent, inverse of e in Phi(N).
        d: MPI,
        /// Larger secret prime.
        p: MPI,
        /// Smaller secret prime.
        q: MPI,
        /// Inverse of p mod q.
        u: MPI,
    },

    /// NIST DSA secret key.
    DSA {
        /// Secret key log_g(y) in Zp.
        x: MPI,
    },

    /// Elgamal secret key.
    Elgamal {
        /// Secret key log_g(y) in Zp.
        x: MPI,
    },

    /// DJBs "Twisted" Edwards curve DSA secret key.
    EdDSA {
        /// Secret scalar.
        scalar: MPI,
    },

    /// NISTs Elliptic curve DSA secret key.
    ECDSA {
        /// Secret scalar.
        scalar: MPI,
    },

    /// SM2 secret key.
    SM2 {
        /// Secret scalar.
        scalar: MPI,
    },

    /// Elliptic curve Elgamal secret key.
    ECDH {
        /// Secret scalar.
        scalar: MPI,
    },
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        use self::SecretKey::*;
        match self {
            RSA { d, p, q, u } => {
                d.secure_memzero();
                p.secure_memzero();
                q.secure_memzero();
                u.secure_memzero();
            },
            DSA { x } =>
                x.secure_memzero(),
            Elgamal { x } =>
                x.secure_memzero(),
            EdDSA { scalar } =>
                scalar.secure_memzero(),
            ECDSA { scalar } =>
                scalar.secure_memzero(),
            SM2 { scalar } =>
                scalar.secure_memzero(),
            ECDH { scalar } =>
                scalar.secure_memzero(),
        }
    }
}

impl SecretKey {
    /// Whether this material belongs to keys of the given algorithm.
    pub fn is_for(&self, pk_algo: crate::types::PublicKeyAlgorithm) -> bool {
        use crate::types::PublicKeyAlgorithm::*;
        matches!(
            (pk_algo, self),
            (RSAEncryptSign, SecretKey::RSA { .. })
                | (RSAEncrypt, SecretKey::RSA { .. })
                | (RSASign, SecretKey::RSA { .. })
                | (DSA, SecretKey::DSA { .. })
                | (ElgamalEncrypt, SecretKey::Elgamal { .. })
                | (ECDSA, SecretKey::ECDSA { .. })
                | (EdDSA, SecretKey::EdDSA { .. })
                | (SM2, SecretKey::SM2 { .. })
                | (ECDH, SecretKey::ECDH { .. }))
    }

    /// Number of octets the secret MPIs occupy when serialized.
    pub fn serialized_len(&self) -> usize {
        use self::SecretKey::*;

        match self {
            RSA { d, p, q, u } =>
                d.serialized_len() + p.serialized_len() +
                q.serialized_len() + u.serialized_len(),

            DSA { x } => x.serialized_len(),

            Elgamal { x } => x.serialized_len(),

            EdDSA { scalar }
            | ECDSA { scalar }
            | SM2 { scalar }
            | ECDH { scalar } => scalar.serialized_len(),
        }
    }
}

#[cfg(test)]
impl Arbitrary for SecretKey {
    fn arbitrary(g: &mut Gen) -> Self {
        match u8::arbitrary(g) % 4 {
            0 => SecretKey::RSA {
                d: MPI::arbitrary(g),
                p: MPI::arbitrary(g),
                q: MPI::arbitrary(g),
                u: MPI::arbitrary(g),
            },

            1 => SecretKey::DSA {
                x: MPI::arbitrary(g),
            },

            2 => SecretKey::Elgamal {
                x: MPI::arbitrary(g),
            },

            3 => SecretKey::EdDSA {
                scalar: MPI::arbitrary(g),
            },

            _ => unreachable!(),
        }
    }
}

/// Holds the signature material of a signature packet.
///
/// Provides a typed and structured way of storing multiple MPIs in
/// packets.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[non_exhaustive]
pub enum Signature {
    /// RSA signature.
    RSA {
        /// Signature m^d mod N.
        s: MPI,
    },

    /// NIST's DSA signature.
    DSA {
        /// `r` value.
        r: MPI,
        /// `s` value.
        s: MPI,
    },

    /// DJB's "Twisted" Edwards curve DSA signature.
    EdDSA {
        /// `r` value.
        r: MPI,
        /// `s` value.
        s: MPI,
    },

    /// NIST's Elliptic curve DSA signature.
    ECDSA {
        /// `r` value.
        r: MPI,
        /// `s` value.
        s: MPI,
    },
}

impl Signature {
    /// Number of octets the signature MPIs occupy when serialized.
    pub fn serialized_len(&self) -> usize {
        use self::Signature::*;

        match self {
            RSA { s } => s.serialized_len(),

            DSA { r, s }
            | EdDSA { r, s }
            | ECDSA { r, s } => r.serialized_len() + s.serialized_len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    #[test]
    fn mpi_strips_leading_zeros() {
        let mpi = MPI::new(&[0x00, 0x00, 0x01, 0x02]);
        assert_eq!(mpi.value(), &[0x01, 0x02]);
        assert_eq!(mpi.bits(), 9);
        assert_eq!(mpi.serialized_len(), 4);
    }

    #[test]
    fn zero_mpi() {
        let mpi = MPI::new(&[0x00, 0x00]);
        assert_eq!(mpi.value(), &[]);
        assert_eq!(mpi.bits(), 0);
        assert_eq!(mpi.serialized_len(), 2);
    }

    quickcheck! {
        fn mpi_bits_exact(mpi: MPI) -> bool {
            // The bit count is the position of the highest set bit
            // plus one, and the leading octet is never zero.
            match mpi.value().first() {
                Some(&b) =>
                    mpi.bits() == (mpi.value().len() - 1) * 8
                        + (8 - b.leading_zeros() as usize),
                None => mpi.bits() == 0,
            }
        }
    }

    #[test]
    fn unknown_curve_material_has_no_len() {
        let material = PublicKey::ECDSA {
            curve: Curve::Unknown(vec![0x2b, 0x01].into()),
            q: MPI::new(&[4, 1, 2]),
        };
        assert!(material.serialized_len().is_err());
    }

    #[test]
    fn ecdh_material_len() {
        // OID (1 + 8) + point (2 + 3) + KDF parameters (4).
        let material = PublicKey::ECDH {
            curve: Curve::NistP256,
            q: MPI::new(&[4, 1, 2]),
            hash: HashAlgorithm::SHA256,
            sym: SymmetricAlgorithm::AES128,
        };
        assert_eq!(material.serialized_len().unwrap(), 9 + 5 + 4);
    }
}
