//! Asymmetric crypto operations.

use num_bigint_dig::BigUint;
use signature::hazmat::PrehashSigner;

use crate::crypto::mpi::{self, MPI};
use crate::packet::Key;
use crate::types::{Curve, HashAlgorithm};
use crate::Error;
use crate::Result;

/// Creates a signature.
///
/// This is the primitive the signature emitter drives: given the
/// digest over the canonicalized data, produce the raw signature
/// material.  [`KeyPair`] implements it for in-memory secret keys;
/// implementations backed by smartcards or agents can stand in for
/// it.
pub trait Signer {
    /// Returns a reference to the public key.
    fn public(&self) -> &Key;

    /// Signs `digest`, which was computed using `hash_algo`.
    fn sign(&mut self, hash_algo: HashAlgorithm, digest: &[u8])
            -> Result<mpi::Signature>;
}

/// A secret key and its public parts, ready for signing.
pub struct KeyPair {
    public: Key,
    secret: mpi::SecretKey,
}

impl KeyPair {
    /// Creates a new key pair.
    ///
    /// # Errors
    ///
    /// Fails with `Error::InvalidArgument` if the secret material
    /// does not belong to the public key's algorithm.
    pub fn new(public: Key, secret: mpi::SecretKey) -> Result<Self> {
        if ! secret.is_for(public.pk_algo()) {
            return Err(Error::InvalidArgument(
                format!("secret key material does not match {}",
                        public.pk_algo())).into());
        }
        Ok(KeyPair { public, secret })
    }

    /// Returns the secret key material.
    pub fn secret(&self) -> &mpi::SecretKey {
        &self.secret
    }
}

impl Signer for KeyPair {
    fn public(&self) -> &Key {
        &self.public
    }

    fn sign(&mut self, hash_algo: HashAlgorithm, digest: &[u8])
            -> Result<mpi::Signature> {
        use crate::types::PublicKeyAlgorithm::*;

        match (self.public.pk_algo(), self.public.mpis(), &self.secret) {
            (RSAEncryptSign,
             mpi::PublicKey::RSA { e, n },
             mpi::SecretKey::RSA { d, p, q, .. })
            | (RSASign,
               mpi::PublicKey::RSA { e, n },
               mpi::SecretKey::RSA { d, p, q, .. }) =>
                sign_rsa(e, n, d, p, q, hash_algo, digest),

            (DSA,
             mpi::PublicKey::DSA { p, q, g, y },
             mpi::SecretKey::DSA { x }) =>
                sign_dsa(p, q, g, y, x, digest),

            (ECDSA,
             mpi::PublicKey::ECDSA { curve, .. },
             mpi::SecretKey::ECDSA { scalar }) => match curve {
                Curve::NistP256 => sign_ecdsa_p256(scalar, digest),
                curve => Err(
                    Error::UnsupportedEllipticCurve(curve.clone()).into()),
            },

            (EdDSA,
             mpi::PublicKey::EdDSA { curve, .. },
             mpi::SecretKey::EdDSA { scalar }) => match curve {
                Curve::Ed25519 => sign_ed25519(scalar, digest),
                curve => Err(
                    Error::UnsupportedEllipticCurve(curve.clone()).into()),
            },

            (algo, _, _) =>
                Err(Error::UnsupportedPublicKeyAlgorithm(algo).into()),
        }
    }
}

fn biguint(mpi: &MPI) -> BigUint {
    BigUint::from_bytes_be(mpi.value())
}

fn sign_rsa(e: &MPI, n: &MPI, d: &MPI, p: &MPI, q: &MPI,
            hash_algo: HashAlgorithm, digest: &[u8])
            -> Result<mpi::Signature> {
    use rsa::{Pkcs1v15Sign, RsaPrivateKey};

    // RFC 4880, Section 5.2.2: the digest is wrapped in a
    // PKCS#1 v1.5 DigestInfo structure naming the hash.
    let padding = match hash_algo {
        HashAlgorithm::MD5 => Pkcs1v15Sign::new::<md5::Md5>(),
        HashAlgorithm::SHA1 =>
            Pkcs1v15Sign::new::<sha1collisiondetection::Sha1CD>(),
        HashAlgorithm::RipeMD => Pkcs1v15Sign::new::<ripemd::Ripemd160>(),
        HashAlgorithm::SHA256 => Pkcs1v15Sign::new::<sha2::Sha256>(),
        HashAlgorithm::SHA384 => Pkcs1v15Sign::new::<sha2::Sha384>(),
        HashAlgorithm::SHA512 => Pkcs1v15Sign::new::<sha2::Sha512>(),
        HashAlgorithm::SHA224 => Pkcs1v15Sign::new::<sha2::Sha224>(),
        algo =>
            return Err(Error::UnsupportedHashAlgorithm(algo).into()),
    };

    let key = RsaPrivateKey::from_components(
        biguint(n), biguint(e), biguint(d),
        vec![biguint(p), biguint(q)])
        .map_err(|e| Error::CryptoFailure(e.to_string()))?;

    let sig = key.sign(padding, digest)
        .map_err(|e| Error::CryptoFailure(e.to_string()))?;

    Ok(mpi::Signature::RSA {
        s: MPI::new(&sig),
    })
}

fn sign_dsa(p: &MPI, q: &MPI, g: &MPI, y: &MPI, x: &MPI, digest: &[u8])
            -> Result<mpi::Signature> {
    let components =
        dsa::Components::from_components(biguint(p), biguint(q), biguint(g))
        .map_err(|e| Error::CryptoFailure(e.to_string()))?;
    let verifying = dsa::VerifyingKey::from_components(components, biguint(y))
        .map_err(|e| Error::CryptoFailure(e.to_string()))?;
    let signing = dsa::SigningKey::from_components(verifying, biguint(x))
        .map_err(|e| Error::CryptoFailure(e.to_string()))?;

    let sig = signing.sign_prehash(digest)
        .map_err(|e| Error::CryptoFailure(e.to_string()))?;

    Ok(mpi::Signature::DSA {
        r: MPI::new(&sig.r().to_bytes_be()),
        s: MPI::new(&sig.s().to_bytes_be()),
    })
}

fn sign_ecdsa_p256(scalar: &MPI, digest: &[u8]) -> Result<mpi::Signature> {
    let mut secret = left_pad::<32>(scalar.value())?;
    let key = p256::ecdsa::SigningKey::from_slice(&secret);
    unsafe {
        memsec::memzero(secret.as_mut_ptr(), secret.len());
    }
    let key = key.map_err(|e| Error::CryptoFailure(e.to_string()))?;

    // ECDSA signs the raw digest; if it is longer than the curve
    // order the leftmost bits are used, which the backend handles.
    let sig: p256::ecdsa::Signature = key.sign_prehash(digest)
        .map_err(|e| Error::CryptoFailure(e.to_string()))?;
    let (r, s) = sig.split_bytes();

    Ok(mpi::Signature::ECDSA {
        r: MPI::new(r.as_slice()),
        s: MPI::new(s.as_slice()),
    })
}

fn sign_ed25519(scalar: &MPI, digest: &[u8]) -> Result<mpi::Signature> {
    use ed25519_dalek::Signer as _;

    let mut secret = left_pad::<32>(scalar.value())?;
    let key = ed25519_dalek::SigningKey::from_bytes(&secret);
    unsafe {
        memsec::memzero(secret.as_mut_ptr(), secret.len());
    }

    let sig = key.sign(digest);

    Ok(mpi::Signature::EdDSA {
        r: MPI::new(&sig.r_bytes()[..]),
        s: MPI::new(&sig.s_bytes()[..]),
    })
}

/// Pads a stripped MPI value back to its fixed width.
fn left_pad<const N: usize>(value: &[u8]) -> Result<[u8; N]> {
    if value.len() > N {
        return Err(Error::MalformedMPI(
            format!("value of {} bytes exceeds field size {}",
                    value.len(), N)).into());
    }
    let mut buf = [0u8; N];
    buf[N - value.len()..].copy_from_slice(value);
    Ok(buf)
}

/// Returns a deterministic Ed25519 key pair for the test suites.
#[cfg(test)]
pub(crate) fn ed25519_keypair() -> KeyPair {
    use crate::types::PublicKeyAlgorithm;

    // Derive the public point from a fixed secret so that the
    // pair is internally consistent.
    let secret = [7u8; 32];
    let signing = ed25519_dalek::SigningKey::from_bytes(&secret);
    let public = signing.verifying_key();

    let mut point = vec![0x40];
    point.extend_from_slice(public.as_bytes());

    let key = Key::new(1543844001, PublicKeyAlgorithm::EdDSA,
                       mpi::PublicKey::EdDSA {
                           curve: Curve::Ed25519,
                           q: MPI::new(&point),
                       }).unwrap();
    KeyPair::new(key, mpi::SecretKey::EdDSA {
        scalar: MPI::new(&secret),
    }).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::Hash;
    use crate::crypto::mpi;

    #[test]
    fn ed25519_signature_verifies() {
        use ed25519_dalek::Verifier;

        let mut pair = ed25519_keypair();
        let mut ctx = HashAlgorithm::SHA256.context().unwrap();
        ctx.update(b"data to sign");
        let digest = ctx.into_digest();

        let sig = pair.sign(HashAlgorithm::SHA256, &digest).unwrap();
        let (r, s) = match &sig {
            mpi::Signature::EdDSA { r, s } => (r, s),
            other => panic!("unexpected material: {:?}", other),
        };

        let mut raw = [0u8; 64];
        raw[32 - r.value().len()..32].copy_from_slice(r.value());
        raw[64 - s.value().len()..].copy_from_slice(s.value());
        let dalek_sig = ed25519_dalek::Signature::from_bytes(&raw);

        let point = match pair.public().mpis() {
            mpi::PublicKey::EdDSA { q, .. } => q.value(),
            _ => unreachable!(),
        };
        let verifying = ed25519_dalek::VerifyingKey::from_bytes(
            point[1..].try_into().unwrap()).unwrap();
        assert!(verifying.verify(&digest, &dalek_sig).is_ok());
    }

    #[test]
    fn mismatched_material_is_rejected() {
        let pair = ed25519_keypair();
        let public = pair.public().clone();
        assert!(KeyPair::new(public, mpi::SecretKey::DSA {
            x: MPI::new(&[1, 2, 3]),
        }).is_err());
    }

    #[test]
    fn left_pad_widths() {
        assert_eq!(left_pad::<4>(&[1, 2]).unwrap(), [0, 0, 1, 2]);
        assert!(left_pad::<2>(&[1, 2, 3]).is_err());
    }

    #[test]
    fn key_hashing_is_stable() {
        let pair = ed25519_keypair();
        let mut a = HashAlgorithm::SHA256.context().unwrap();
        let mut b = HashAlgorithm::SHA256.context().unwrap();
        pair.public().hash(&mut a).unwrap();
        pair.public().hash(&mut b).unwrap();
        assert_eq!(a.into_digest(), b.into_digest());
    }
}
