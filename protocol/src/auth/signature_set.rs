//! The set of `(public key, signature)` pairs attached to a transaction.
//!
//! Keyed by public key: inserting a second signature for the same key
//! replaces the first, so a key can never be counted twice. Iteration is in
//! key order, independent of insertion order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::crypto::keys::{PublicKey, Signature};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureSet {
    signatures: BTreeMap<PublicKey, Signature>,
}

impl SignatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a signature. Returns the signature it replaced, if any.
    pub fn insert(&mut self, key: PublicKey, signature: Signature) -> Option<Signature> {
        self.signatures.insert(key, signature)
    }

    /// Detach the signature for `key`.
    pub fn remove(&mut self, key: &PublicKey) -> Option<Signature> {
        self.signatures.remove(key)
    }

    pub fn get(&self, key: &PublicKey) -> Option<&Signature> {
        self.signatures.get(key)
    }

    pub fn contains(&self, key: &PublicKey) -> bool {
        self.signatures.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PublicKey, &Signature)> {
        self.signatures.iter()
    }

    /// Keys whose signature verifies over `payload`. Pairs that fail
    /// verification are skipped silently.
    pub fn verified_signers<'a>(
        &'a self,
        payload: &'a [u8],
    ) -> impl Iterator<Item = &'a PublicKey> + 'a {
        self.signatures
            .iter()
            .filter(move |(key, sig)| key.verify(payload, sig))
            .map(|(key, _)| key)
    }
}

impl FromIterator<(PublicKey, Signature)> for SignatureSet {
    fn from_iter<I: IntoIterator<Item = (PublicKey, Signature)>>(iter: I) -> Self {
        Self {
            signatures: iter.into_iter().collect(),
        }
    }
}

impl Extend<(PublicKey, Signature)> for SignatureSet {
    fn extend<I: IntoIterator<Item = (PublicKey, Signature)>>(&mut self, iter: I) {
        self.signatures.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::Keypair;

    #[test]
    fn duplicate_keys_collapse() {
        let kp = Keypair::from_seed(&[1u8; 32]);
        let mut set = SignatureSet::new();
        assert!(set.insert(kp.public_key(), kp.sign(b"one")).is_none());
        assert!(set.insert(kp.public_key(), kp.sign(b"two")).is_some());
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(&kp.public_key()), Some(&kp.sign(b"two")));
    }

    #[test]
    fn only_verifying_signatures_are_reported() {
        let good = Keypair::from_seed(&[1u8; 32]);
        let bad = Keypair::from_seed(&[2u8; 32]);
        let set: SignatureSet = [
            (good.public_key(), good.sign(b"payload")),
            (bad.public_key(), bad.sign(b"something else")),
        ]
        .into_iter()
        .collect();

        let verified: Vec<_> = set.verified_signers(b"payload").copied().collect();
        assert_eq!(verified, vec![good.public_key()]);
    }

    #[test]
    fn order_insensitive() {
        let a = Keypair::from_seed(&[1u8; 32]);
        let b = Keypair::from_seed(&[2u8; 32]);
        let ab: SignatureSet = [(a.public_key(), a.sign(b"m")), (b.public_key(), b.sign(b"m"))]
            .into_iter()
            .collect();
        let ba: SignatureSet = [(b.public_key(), b.sign(b"m")), (a.public_key(), a.sign(b"m"))]
            .into_iter()
            .collect();
        assert_eq!(ab, ba);
    }

    #[test]
    fn serializes_as_key_to_signature_map() {
        let kp = Keypair::from_seed(&[3u8; 32]);
        let mut set = SignatureSet::new();
        set.insert(kp.public_key(), kp.sign(b"m"));
        let json = serde_json::to_value(&set).unwrap();
        assert!(json.get(kp.public_key().to_address()).is_some());
        let back: SignatureSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, set);
    }
}
