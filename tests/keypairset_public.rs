//! Integration tests over the public key pair set surface: generation,
//! export / derivation, chained signatures and layered encryption.

use keypairset::protocol::wire::{DecodeError, PrivateKeyMessage, PublicKeyMessage, SignatureMessage};
use keypairset::{KeyPairSetEncryptor, KeyPairSetError, KeyPairSetFactory, KeyPairSetSigner, KeyPairSetSpec};
use proptest::prelude::*;

fn generate(spec: KeyPairSetSpec) -> keypairset::KeyPairSet {
    KeyPairSetFactory::global().generate(spec).unwrap()
}

#[test]
fn exported_keys_round_trip_byte_for_byte() {
    for spec in KeyPairSetSpec::ALL {
        let generator = KeyPairSetFactory::global().generator(spec);
        let set = generator.generate().unwrap();
        let public = generator.export_public(&set).unwrap();
        let private = generator.export_private(&set).unwrap();

        assert_eq!(PublicKeyMessage::decode(&public).unwrap().encode().unwrap(), public);
        assert_eq!(PrivateKeyMessage::decode(&private).unwrap().encode().unwrap(), &private[..]);

        let again = generator.derive(&public, &private).unwrap();
        assert_eq!(again, set, "{spec}");
    }
}

#[test]
fn public_only_derivation_keeps_public_material() {
    for spec in KeyPairSetSpec::ALL {
        let generator = KeyPairSetFactory::global().generator(spec);
        let set = generator.generate().unwrap();
        let public = generator.export_public(&set).unwrap();
        let derived = KeyPairSetFactory::global().derive_public_only(&public).unwrap();
        assert!(derived.is_public_only());
        assert_eq!(derived.spec(), spec);
        for (a, b) in derived.pairs().iter().zip(set.pairs()) {
            assert_eq!(a.public_key(), b.public_key());
        }
        assert_eq!(generator.export_public(&derived).unwrap(), public);
    }
}

#[test]
fn flipping_any_signature_byte_fails_verification() {
    let set = generate(KeyPairSetSpec::Sign2);
    let mut signer = KeyPairSetSigner::for_signing(&set).unwrap();
    signer.update(b"composite message");
    let sig = signer.sign().unwrap();

    let mut verifier = KeyPairSetSigner::for_verification(&set.public_only()).unwrap();
    verifier.update(b"composite message");
    assert!(verifier.verify(&sig).unwrap());

    // Touch every signature byte of every constituent; framing and CBOR
    // headers are skipped since altering them is a decode error, not a
    // verification failure.
    let message = SignatureMessage::decode(&sig).unwrap();
    for (c, blob) in message.signatures().iter().enumerate() {
        for i in 0..blob.len() {
            let mut blobs: Vec<Vec<u8>> = message
                .signatures()
                .iter()
                .map(|b| b.as_bytes().to_vec())
                .collect();
            blobs[c][i] ^= 0x01;
            let tampered = SignatureMessage::new(KeyPairSetSpec::Sign2, blobs)
                .unwrap()
                .encode()
                .unwrap();
            verifier.update(b"composite message");
            assert!(!verifier.verify(&tampered).unwrap(), "constituent {c} byte {i}");
        }
    }
}

#[test]
fn corrupting_the_last_of_three_signatures_fails_only_that_constituent() {
    let set = generate(KeyPairSetSpec::Sign3);
    let mut signer = KeyPairSetSigner::for_signing(&set).unwrap();
    signer.update(b"three ways");
    let sig = signer.sign().unwrap();
    let message = SignatureMessage::decode(&sig).unwrap();
    assert_eq!(message.signatures().len(), 3);

    let mut blobs: Vec<Vec<u8>> = message
        .signatures()
        .iter()
        .map(|b| b.as_bytes().to_vec())
        .collect();
    blobs[2][5] ^= 0x80;
    let tampered = SignatureMessage::new(KeyPairSetSpec::Sign3, blobs)
        .unwrap()
        .encode()
        .unwrap();

    let mut verifier = KeyPairSetSigner::for_verification(&set).unwrap();
    verifier.update(b"three ways");
    assert_eq!(verifier.verify_detailed(&tampered).unwrap(), vec![true, true, false]);
    verifier.update(b"three ways");
    assert!(!verifier.verify(&tampered).unwrap());
}

#[test]
fn encryption_round_trips_and_rejects_other_kinds() {
    let set = generate(KeyPairSetSpec::Agree2);
    let mut enc = KeyPairSetEncryptor::for_encryption(&set.public_only()).unwrap();
    let ct = enc.encrypt(b"layered plaintext").unwrap();
    let mut dec = KeyPairSetEncryptor::for_decryption(&set).unwrap();
    assert_eq!(dec.decrypt(&ct).unwrap(), b"layered plaintext");

    let unified = generate(KeyPairSetSpec::Unified1);
    assert!(matches!(
        KeyPairSetEncryptor::new(KeyPairSetSpec::Agree2, &unified, keypairset::ports::CipherMode::Decrypt),
        Err(KeyPairSetError::MismatchedSpec {
            expected: KeyPairSetSpec::Agree2,
            actual: KeyPairSetSpec::Unified1,
        })
    ));
}

#[test]
fn public_key_message_with_missing_blob_is_a_decode_error() {
    let set = generate(KeyPairSetSpec::Sign3);
    let generator = KeyPairSetFactory::global().generator(KeyPairSetSpec::Sign3);
    let public = generator.export_public(&set).unwrap();
    let message = PublicKeyMessage::decode(&public).unwrap();
    let keys: Vec<Vec<u8>> = message.keys().iter().map(|k| k.as_bytes().to_vec()).collect();
    assert!(matches!(
        PublicKeyMessage::new(KeyPairSetSpec::Sign3, keys[..2].to_vec()),
        Err(KeyPairSetError::Decode(DecodeError::BlobCount { expected: 3, actual: 2 }))
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn any_message_signs_and_verifies(msg in proptest::collection::vec(any::<u8>(), 0..512)) {
        let set = generate(KeyPairSetSpec::Unified1);
        let mut signer = KeyPairSetSigner::for_signing(&set).unwrap();
        signer.update(&msg);
        let sig = signer.sign().unwrap();
        let mut verifier = KeyPairSetSigner::for_verification(&set).unwrap();
        verifier.update(&msg);
        prop_assert!(verifier.verify(&sig).unwrap());
    }

    #[test]
    fn any_plaintext_round_trips(plain in proptest::collection::vec(any::<u8>(), 0..512)) {
        let set = generate(KeyPairSetSpec::Unified1);
        let mut enc = KeyPairSetEncryptor::for_encryption(&set).unwrap();
        let mut dec = KeyPairSetEncryptor::for_decryption(&set).unwrap();
        let ct = enc.encrypt(&plain).unwrap();
        prop_assert_eq!(dec.decrypt(&ct).unwrap(), plain);
    }
}
