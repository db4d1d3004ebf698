//! Integration test: every primitive family end to end.
//!
//! Registers all families into one registry, then runs each primitive
//! through a keyset-backed roundtrip: MAC compute/verify, AEAD
//! encrypt/decrypt, and hybrid encrypt/decrypt across a rotation.

use keyloom::{
    aead, hybrid, mac, register_all, signature, Aead, BoxedAead, BoxedHybridDecrypt,
    BoxedHybridEncrypt, BoxedMac, BoxedSigner, BoxedVerifier, ErrorCode, HybridDecrypt,
    HybridEncrypt, KeysetHandle, KeysetManager, Mac, Registry, Signer, Verifier,
};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn full_registry() -> Registry {
    let registry = Registry::new();
    register_all(&registry).expect("all families should register");
    registry
}

#[test]
fn register_all_is_idempotent() {
    init_logs();
    let registry = full_registry();
    register_all(&registry).expect("second pass should be a no-op");

    // Each family still resolves after the second pass
    assert!(registry
        .get_key_manager::<BoxedSigner>(signature::ED25519_PRIVATE_KEY_TYPE_URL)
        .is_ok());
    assert!(registry
        .get_key_manager::<BoxedMac>(mac::HMAC_SHA256_KEY_TYPE_URL)
        .is_ok());
    assert!(registry
        .get_key_manager::<BoxedAead>(aead::CHACHA20_POLY1305_KEY_TYPE_URL)
        .is_ok());
    assert!(registry
        .get_key_manager::<BoxedHybridDecrypt>(hybrid::ECIES_X25519_PRIVATE_KEY_TYPE_URL)
        .is_ok());
}

#[test]
fn mac_tags_roundtrip_through_a_keyset() {
    init_logs();
    let registry = full_registry();

    let template = mac::hmac_sha256_tag128_template().expect("template should encode");
    let handle =
        KeysetHandle::generate_new(&registry, &template).expect("keyset generation");
    let mac = registry
        .wrap(handle.primitives::<BoxedMac>(&registry).unwrap())
        .expect("mac should wrap");

    let tag = mac.compute(b"ledger entry 7").expect("tag computation");
    // 5-byte prefix plus the truncated tag
    assert_eq!(tag.len(), 5 + 16);

    mac.verify(&tag, b"ledger entry 7").expect("tag should verify");
    assert!(mac.verify(&tag, b"ledger entry 8").is_err());

    let mut bent = tag.clone();
    bent[7] ^= 0x01;
    assert!(mac.verify(&bent, b"ledger entry 7").is_err());
}

#[test]
fn aead_ciphertexts_roundtrip_through_a_keyset() {
    init_logs();
    let registry = full_registry();

    let handle = KeysetHandle::generate_new(&registry, &aead::chacha20_poly1305_key_template())
        .expect("keyset generation");
    let cipher = registry
        .wrap(handle.primitives::<BoxedAead>(&registry).unwrap())
        .expect("aead should wrap");

    let ciphertext = cipher
        .encrypt(b"session state", b"session:4711")
        .expect("encryption");
    let plaintext = cipher
        .decrypt(&ciphertext, b"session:4711")
        .expect("decryption");
    assert_eq!(plaintext, b"session state");

    assert!(
        cipher.decrypt(&ciphertext, b"session:4712").is_err(),
        "associated data is part of the authentication"
    );
}

#[test]
fn hybrid_decryption_survives_rotation() {
    init_logs();
    let registry = full_registry();
    let template = hybrid::ecies_x25519_key_template();

    let mut manager = KeysetManager::new();
    manager.rotate(&registry, &template).expect("first rotate");

    // Encrypt against the first generation's public keyset
    let public_gen1 = manager
        .handle()
        .unwrap()
        .public_handle(&registry)
        .expect("public keyset");
    let encrypter_gen1 = registry
        .wrap(public_gen1.primitives::<BoxedHybridEncrypt>(&registry).unwrap())
        .expect("encrypter should wrap");
    let ciphertext = encrypter_gen1
        .encrypt(b"card token", b"recipient:acme")
        .expect("encryption");

    manager.rotate(&registry, &template).expect("second rotate");

    let decrypter = registry
        .wrap(
            manager
                .handle()
                .unwrap()
                .primitives::<BoxedHybridDecrypt>(&registry)
                .unwrap(),
        )
        .expect("decrypter should wrap");
    let plaintext = decrypter
        .decrypt(&ciphertext, b"recipient:acme")
        .expect("gen-1 ciphertext should decrypt after rotation");
    assert_eq!(plaintext, b"card token");

    assert!(
        decrypter.decrypt(&ciphertext, b"recipient:evil").is_err(),
        "context info binds the ciphertext"
    );
}

#[test]
fn families_do_not_cross_resolve() {
    init_logs();
    let registry = full_registry();

    // An HMAC keyset cannot produce signers
    let template = mac::hmac_sha256_tag128_template().expect("template should encode");
    let handle =
        KeysetHandle::generate_new(&registry, &template).expect("keyset generation");
    let err = handle.primitives::<BoxedSigner>(&registry).unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotFound);

    // Nor can a manager be fetched under the wrong primitive kind
    let err = registry
        .get_key_manager::<BoxedVerifier>(aead::CHACHA20_POLY1305_KEY_TYPE_URL)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[test]
fn one_registry_serves_all_families_at_once() {
    init_logs();
    let registry = full_registry();

    let sign_handle =
        KeysetHandle::generate_new(&registry, &signature::ed25519_key_template()).unwrap();
    let mac_handle = KeysetHandle::generate_new(
        &registry,
        &mac::hmac_sha256_tag256_template().expect("template should encode"),
    )
    .unwrap();
    let aead_handle =
        KeysetHandle::generate_new(&registry, &aead::chacha20_poly1305_key_template()).unwrap();

    let signer = registry
        .wrap(sign_handle.primitives::<BoxedSigner>(&registry).unwrap())
        .unwrap();
    let verifier = registry
        .wrap(
            sign_handle
                .public_handle(&registry)
                .unwrap()
                .primitives::<BoxedVerifier>(&registry)
                .unwrap(),
        )
        .unwrap();
    let mac = registry
        .wrap(mac_handle.primitives::<BoxedMac>(&registry).unwrap())
        .unwrap();
    let cipher = registry
        .wrap(aead_handle.primitives::<BoxedAead>(&registry).unwrap())
        .unwrap();

    let receipt = b"order 31337 paid";
    let sig = signer.sign(receipt).expect("signing");
    let tag = mac.compute(receipt).expect("tagging");
    let sealed = cipher.encrypt(receipt, b"").expect("sealing");

    verifier.verify(&sig, receipt).expect("signature verifies");
    mac.verify(&tag, receipt).expect("tag verifies");
    assert_eq!(cipher.decrypt(&sealed, b"").expect("unsealing"), receipt);
}
