//! Signature subpackets.
//!
//! Signature metadata lives in typed subpackets collected into two
//! areas, one covered by the signature's hash and one not (see
//! [Section 5.2.3.1 of RFC 4880]).
//!
//!   [Section 5.2.3.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.3.1

use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::serialize::MarshalInto;
use crate::types::{CompressionAlgorithm, HashAlgorithm, KeyFlags,
                   KeyServerPreferences, SymmetricAlgorithm};
use crate::Error;
use crate::KeyID;
use crate::Result;

/// The subpacket types as defined in [Section 5.2.3.1 of RFC 4880].
///
///   [Section 5.2.3.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.3.1
#[derive(Clone, Copy, PartialEq, Eq, Debug, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum SubpacketTag {
    /// The time the signature was made.
    SignatureCreationTime,
    /// The validity period of the signature.
    SignatureExpirationTime,
    /// Whether the certification may be exported.
    ExportableCertification,
    /// Trust signature level and amount.
    TrustSignature,
    /// A regular expression limiting a trust signature's scope.
    RegularExpression,
    /// Whether the signature is revocable.
    Revocable,
    /// The validity period of the key.
    KeyExpirationTime,
    /// Symmetric algorithm numbers that indicate which algorithms
    /// the key holder prefers to use.
    PreferredSymmetricAlgorithms,
    /// Authorizes the specified key to issue revocation signatures
    /// for this key.
    RevocationKey,
    /// The OpenPGP Key ID of the key issuing the signature.
    Issuer,
    /// A "notation" on the signature.
    NotationData,
    /// Message digest algorithm numbers that indicate which
    /// algorithms the key holder prefers to receive.
    PreferredHashAlgorithms,
    /// Compression algorithm numbers that indicate which algorithms
    /// the key holder prefers to use.
    PreferredCompressionAlgorithms,
    /// A list of flags that indicate preferences that the key holder
    /// has about how the key is handled on a key server.
    KeyServerPreferences,
    /// The URI of a key server that the key holder prefers be used
    /// for updates.
    PreferredKeyServer,
    /// A flag in a User ID's self-signature that states whether this
    /// User ID is the main User ID for this key.
    PrimaryUserID,
    /// The URI of a document that describes the policy under which
    /// the signature was issued.
    PolicyURI,
    /// A list of binary flags that hold information about a key.
    KeyFlags,
    /// The User ID that is responsible for the signature.
    SignersUserID,
    /// The reason for a revocation.
    ReasonForRevocation,
    /// The OpenPGP features a user's implementation supports.
    Features,
    /// A signature to which this signature refers.
    SignatureTarget,
    /// A complete signature packet body embedded in this signature.
    EmbeddedSignature,
    /// The fingerprint of the key issuing the signature.
    IssuerFingerprint,
    /// Reserved subpacket tag.
    Reserved(u8),
    /// Private subpacket tag.
    Private(u8),
    /// Unknown subpacket tag.
    Unknown(u8),
}

impl From<u8> for SubpacketTag {
    fn from(u: u8) -> Self {
        use self::SubpacketTag::*;
        match u {
            2 => SignatureCreationTime,
            3 => SignatureExpirationTime,
            4 => ExportableCertification,
            5 => TrustSignature,
            6 => RegularExpression,
            7 => Revocable,
            9 => KeyExpirationTime,
            11 => PreferredSymmetricAlgorithms,
            12 => RevocationKey,
            16 => Issuer,
            20 => NotationData,
            21 => PreferredHashAlgorithms,
            22 => PreferredCompressionAlgorithms,
            23 => KeyServerPreferences,
            24 => PreferredKeyServer,
            25 => PrimaryUserID,
            26 => PolicyURI,
            27 => KeyFlags,
            28 => SignersUserID,
            29 => ReasonForRevocation,
            30 => Features,
            31 => SignatureTarget,
            32 => EmbeddedSignature,
            33 => IssuerFingerprint,
            0 | 1 | 8 | 10 | 13..=15 | 17..=19 => Reserved(u),
            100..=110 => Private(u),
            u => Unknown(u),
        }
    }
}

impl From<SubpacketTag> for u8 {
    fn from(t: SubpacketTag) -> u8 {
        use self::SubpacketTag::*;
        match t {
            SignatureCreationTime => 2,
            SignatureExpirationTime => 3,
            ExportableCertification => 4,
            TrustSignature => 5,
            RegularExpression => 6,
            Revocable => 7,
            KeyExpirationTime => 9,
            PreferredSymmetricAlgorithms => 11,
            RevocationKey => 12,
            Issuer => 16,
            NotationData => 20,
            PreferredHashAlgorithms => 21,
            PreferredCompressionAlgorithms => 22,
            KeyServerPreferences => 23,
            PreferredKeyServer => 24,
            PrimaryUserID => 25,
            PolicyURI => 26,
            KeyFlags => 27,
            SignersUserID => 28,
            ReasonForRevocation => 29,
            Features => 30,
            SignatureTarget => 31,
            EmbeddedSignature => 32,
            IssuerFingerprint => 33,
            Reserved(u) => u,
            Private(u) => u,
            Unknown(u) => u,
        }
    }
}

#[cfg(test)]
impl Arbitrary for SubpacketTag {
    fn arbitrary(g: &mut Gen) -> Self {
        u8::arbitrary(g).into()
    }
}

/// The value of a signature subpacket.
///
/// Only the subpackets the self-signature emitters produce are
/// typed; anything else is carried as raw bytes.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
#[non_exhaustive]
pub enum SubpacketValue {
    /// The time the signature was made, in seconds since the epoch.
    SignatureCreationTime(u32),
    /// The validity period of the key in seconds after its creation.
    KeyExpirationTime(u32),
    /// The key holder's preferred symmetric algorithms.
    PreferredSymmetricAlgorithms(Vec<SymmetricAlgorithm>),
    /// The KeyID of the key issuing the signature.
    Issuer(KeyID),
    /// The key holder's preferred hash algorithms.
    PreferredHashAlgorithms(Vec<HashAlgorithm>),
    /// The key holder's preferred compression algorithms.
    PreferredCompressionAlgorithms(Vec<CompressionAlgorithm>),
    /// The key holder's key server preferences.
    KeyServerPreferences(KeyServerPreferences),
    /// The URI of the key holder's preferred key server.
    PreferredKeyServer(Vec<u8>),
    /// Whether the user ID carrying this signature is the primary
    /// one.
    PrimaryUserID(bool),
    /// How the signed key may be used.
    KeyFlags(KeyFlags),
    /// An uninterpreted subpacket body.
    Unknown {
        /// The subpacket's type.
        tag: SubpacketTag,
        /// The subpacket's raw body.
        body: Vec<u8>,
    },
}

impl SubpacketValue {
    /// Returns the subpacket tag for this value.
    pub fn tag(&self) -> SubpacketTag {
        use self::SubpacketValue::*;
        match self {
            SignatureCreationTime(_) => SubpacketTag::SignatureCreationTime,
            KeyExpirationTime(_) => SubpacketTag::KeyExpirationTime,
            PreferredSymmetricAlgorithms(_) =>
                SubpacketTag::PreferredSymmetricAlgorithms,
            Issuer(_) => SubpacketTag::Issuer,
            PreferredHashAlgorithms(_) =>
                SubpacketTag::PreferredHashAlgorithms,
            PreferredCompressionAlgorithms(_) =>
                SubpacketTag::PreferredCompressionAlgorithms,
            KeyServerPreferences(_) => SubpacketTag::KeyServerPreferences,
            PreferredKeyServer(_) => SubpacketTag::PreferredKeyServer,
            PrimaryUserID(_) => SubpacketTag::PrimaryUserID,
            KeyFlags(_) => SubpacketTag::KeyFlags,
            Unknown { tag, .. } => *tag,
        }
    }

    /// Number of octets the subpacket body occupies, excluding the
    /// type octet and the length header.
    pub fn body_len(&self) -> usize {
        use self::SubpacketValue::*;
        match self {
            SignatureCreationTime(_) => 4,
            KeyExpirationTime(_) => 4,
            PreferredSymmetricAlgorithms(a) => a.len(),
            Issuer(_) => 8,
            PreferredHashAlgorithms(a) => a.len(),
            PreferredCompressionAlgorithms(a) => a.len(),
            KeyServerPreferences(_) => 1,
            PreferredKeyServer(u) => u.len(),
            PrimaryUserID(_) => 1,
            KeyFlags(_) => 1,
            Unknown { body, .. } => body.len(),
        }
    }
}

/// A single signature subpacket.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct Subpacket {
    critical: bool,
    value: SubpacketValue,
}

impl Subpacket {
    /// Creates a new non-critical subpacket.
    pub fn new(value: SubpacketValue) -> Self {
        Self::with_criticality(value, false)
    }

    /// Creates a new subpacket with the given criticality.
    pub fn with_criticality(value: SubpacketValue, critical: bool) -> Self {
        Subpacket { critical, value }
    }

    /// Whether the subpacket is critical.
    pub fn critical(&self) -> bool {
        self.critical
    }

    /// Returns the subpacket's tag.
    pub fn tag(&self) -> SubpacketTag {
        self.value.tag()
    }

    /// Returns the subpacket's value.
    pub fn value(&self) -> &SubpacketValue {
        &self.value
    }
}

/// A collection of subpackets forming one of a signature's two
/// subpacket areas.
///
/// The area preserves insertion order; the order of hashed
/// subpackets is part of the signed data.
#[derive(Clone, Default, PartialEq, Eq, Debug, Hash)]
pub struct SubpacketArea {
    packets: Vec<Subpacket>,
}

impl SubpacketArea {
    /// Returns an empty subpacket area.
    pub fn new() -> Self {
        Default::default()
    }

    /// Iterates over the subpackets.
    pub fn iter(&self) -> impl Iterator<Item = &Subpacket> {
        self.packets.iter()
    }

    /// Whether the area contains no subpackets.
    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Returns the last subpacket, if any, with the specified tag.
    ///
    /// This is the recommended strategy of dealing with multiple,
    /// possibly conflicting, subpackets.  See [Section 5.2.4.1 of
    /// RFC 4880].
    ///
    ///   [Section 5.2.4.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.4.1
    pub fn lookup(&self, tag: SubpacketTag) -> Option<&Subpacket> {
        self.packets.iter().rev().find(|sp| sp.tag() == tag)
    }

    /// Adds the given subpacket.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedPacket` if adding the packet makes
    /// the subpacket area exceed the two-octet length field.
    pub fn add(&mut self, packet: Subpacket) -> Result<()> {
        if self.serialized_len() + packet.serialized_len()
            > u16::MAX as usize
        {
            return Err(Error::MalformedPacket(
                "Subpacket area exceeds maximum size".into()).into());
        }

        self.packets.push(packet);
        Ok(())
    }
}

impl<'a> IntoIterator for &'a SubpacketArea {
    type Item = &'a Subpacket;
    type IntoIter = std::slice::Iter<'a, Subpacket>;

    fn into_iter(self) -> Self::IntoIter {
        self.packets.iter()
    }
}

impl fmt::Display for SubpacketTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    quickcheck! {
        fn tag_roundtrip(tag: SubpacketTag) -> bool {
            let v: u8 = tag.into();
            tag == SubpacketTag::from(v)
        }
    }

    quickcheck! {
        fn tag_partition(tag: SubpacketTag) -> bool {
            match tag {
                SubpacketTag::Reserved(u) =>
                    (u == 0 || u == 1 || u == 8
                     || u == 10 || (13..=15).contains(&u)
                     || (17..=19).contains(&u)),
                SubpacketTag::Private(u) => (100..=110).contains(&u),
                SubpacketTag::Unknown(u) =>
                    (u > 33 && u < 100) || u > 110,
                _ => true,
            }
        }
    }

    #[test]
    fn area_preserves_order_and_looks_up_last() {
        let mut area = SubpacketArea::new();
        area.add(Subpacket::new(
            SubpacketValue::SignatureCreationTime(1))).unwrap();
        area.add(Subpacket::new(
            SubpacketValue::PrimaryUserID(true))).unwrap();
        area.add(Subpacket::new(
            SubpacketValue::SignatureCreationTime(2))).unwrap();

        let tags: Vec<_> = area.iter().map(|sp| sp.tag()).collect();
        assert_eq!(tags, [SubpacketTag::SignatureCreationTime,
                          SubpacketTag::PrimaryUserID,
                          SubpacketTag::SignatureCreationTime]);

        match area.lookup(SubpacketTag::SignatureCreationTime)
            .unwrap().value()
        {
            SubpacketValue::SignatureCreationTime(t) => assert_eq!(*t, 2),
            _ => unreachable!(),
        }
    }

    #[test]
    fn area_size_limit() {
        let mut area = SubpacketArea::new();
        for _ in 0..100 {
            let huge = Subpacket::new(SubpacketValue::Unknown {
                tag: SubpacketTag::Unknown(99),
                body: vec![0; 1000],
            });
            if area.add(huge).is_err() {
                // The area must still fit in the length field.
                assert!(area.serialized_len() <= u16::MAX as usize);
                return;
            }
        }
        panic!("area never overflowed");
    }
}
