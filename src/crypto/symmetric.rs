//! Symmetric encryption in OpenPGP-CFB mode.
//!
//! Protected secret keys are encrypted in CFB mode without the
//! IV resynchronization OpenPGP applies to its data packets (see
//! [Section 13.9 of RFC 4880]); that is plain CFB over the full
//! block size, keyed by an S2K-derived session key.  The
//! encryptor and decryptor here process arbitrary-length chunks
//! statefully, so a partial trailing block needs no padding.
//!
//!   [Section 13.9 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-13.9

use cfb_mode::{BufDecryptor, BufEncryptor};
use cipher::{BlockCipher, BlockEncryptMut, KeyInit, KeyIvInit};

use crate::types::SymmetricAlgorithm;
use crate::Error;
use crate::Result;

trait CfbEncrypt {
    fn encrypt(&mut self, buf: &mut [u8]);
}

trait CfbDecrypt {
    fn decrypt(&mut self, buf: &mut [u8]);
}

impl<C: BlockCipher + BlockEncryptMut> CfbEncrypt for BufEncryptor<C> {
    fn encrypt(&mut self, buf: &mut [u8]) {
        BufEncryptor::encrypt(self, buf);
    }
}

impl<C: BlockCipher + BlockEncryptMut> CfbDecrypt for BufDecryptor<C> {
    fn decrypt(&mut self, buf: &mut [u8]) {
        BufDecryptor::decrypt(self, buf);
    }
}

fn make_encryptor<C>(key: &[u8], iv: &[u8]) -> Result<Box<dyn CfbEncrypt>>
where
    C: BlockCipher + BlockEncryptMut + KeyInit + 'static,
{
    Ok(Box::new(
        BufEncryptor::<C>::new_from_slices(key, iv)
            .map_err(|e| Error::CryptoFailure(e.to_string()))?))
}

fn make_decryptor<C>(key: &[u8], iv: &[u8]) -> Result<Box<dyn CfbDecrypt>>
where
    C: BlockCipher + BlockEncryptMut + KeyInit + 'static,
{
    Ok(Box::new(
        BufDecryptor::<C>::new_from_slices(key, iv)
            .map_err(|e| Error::CryptoFailure(e.to_string()))?))
}

/// A CFB encryption context.
///
/// Bytes fed to [`Encryptor::encrypt`] are enciphered in place and
/// the keystream position carries over between calls.
pub struct Encryptor(Box<dyn CfbEncrypt>);

impl Encryptor {
    /// Creates a CFB encryption context for the given algorithm.
    ///
    /// `key` must be `algo.key_size()` bytes, `iv` must be
    /// `algo.block_size()` bytes.
    pub fn new(algo: SymmetricAlgorithm, key: &[u8], iv: &[u8])
               -> Result<Self> {
        use crate::types::SymmetricAlgorithm::*;
        let inner = match algo {
            IDEA => make_encryptor::<idea::Idea>(key, iv)?,
            TripleDES => make_encryptor::<des::TdesEde3>(key, iv)?,
            CAST5 => make_encryptor::<cast5::Cast5>(key, iv)?,
            Blowfish => make_encryptor::<blowfish::Blowfish>(key, iv)?,
            AES128 => make_encryptor::<aes::Aes128>(key, iv)?,
            AES192 => make_encryptor::<aes::Aes192>(key, iv)?,
            AES256 => make_encryptor::<aes::Aes256>(key, iv)?,
            Twofish => make_encryptor::<twofish::Twofish>(key, iv)?,
            Camellia128 => make_encryptor::<camellia::Camellia128>(key, iv)?,
            Camellia192 => make_encryptor::<camellia::Camellia192>(key, iv)?,
            Camellia256 => make_encryptor::<camellia::Camellia256>(key, iv)?,
            _ =>
                return Err(Error::UnsupportedSymmetricAlgorithm(algo).into()),
        };
        Ok(Encryptor(inner))
    }

    /// Encrypts the given buffer in place.
    pub fn encrypt(&mut self, buf: &mut [u8]) {
        self.0.encrypt(buf);
    }
}

/// A CFB decryption context.
///
/// The inverse of [`Encryptor`].
pub struct Decryptor(Box<dyn CfbDecrypt>);

impl Decryptor {
    /// Creates a CFB decryption context for the given algorithm.
    pub fn new(algo: SymmetricAlgorithm, key: &[u8], iv: &[u8])
               -> Result<Self> {
        use crate::types::SymmetricAlgorithm::*;
        let inner = match algo {
            IDEA => make_decryptor::<idea::Idea>(key, iv)?,
            TripleDES => make_decryptor::<des::TdesEde3>(key, iv)?,
            CAST5 => make_decryptor::<cast5::Cast5>(key, iv)?,
            Blowfish => make_decryptor::<blowfish::Blowfish>(key, iv)?,
            AES128 => make_decryptor::<aes::Aes128>(key, iv)?,
            AES192 => make_decryptor::<aes::Aes192>(key, iv)?,
            AES256 => make_decryptor::<aes::Aes256>(key, iv)?,
            Twofish => make_decryptor::<twofish::Twofish>(key, iv)?,
            Camellia128 => make_decryptor::<camellia::Camellia128>(key, iv)?,
            Camellia192 => make_decryptor::<camellia::Camellia192>(key, iv)?,
            Camellia256 => make_decryptor::<camellia::Camellia256>(key, iv)?,
            _ =>
                return Err(Error::UnsupportedSymmetricAlgorithm(algo).into()),
        };
        Ok(Decryptor(inner))
    }

    /// Decrypts the given buffer in place.
    pub fn decrypt(&mut self, buf: &mut [u8]) {
        self.0.decrypt(buf);
    }
}
