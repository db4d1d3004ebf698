//! Stress: keysets with many generations of keys.
//!
//! Rotation never invalidates old output, so a long-lived keyset keeps
//! growing. These tests push key counts well past everyday sizes and
//! check that every surviving generation still verifies.

use keyloom::signature::{self, ED25519_PRIVATE_KEY_TYPE_URL};
use keyloom::{
    mac, register_all, BoxedMac, BoxedSigner, BoxedVerifier, KeyTemplate, KeysetManager, Mac,
    OutputPrefixType, Registry, Signer, Verifier,
};

fn registered() -> Registry {
    let registry = Registry::new();
    register_all(&registry).expect("registration should succeed");
    registry
}

fn signer_for(registry: &Registry, manager: &KeysetManager) -> BoxedSigner {
    let handle = manager.handle().expect("keyset should be non-empty");
    registry
        .wrap(handle.primitives::<BoxedSigner>(registry).unwrap())
        .unwrap()
}

fn verifier_for(registry: &Registry, manager: &KeysetManager) -> BoxedVerifier {
    let public = manager
        .handle()
        .expect("keyset should be non-empty")
        .public_handle(registry)
        .expect("public keyset should derive");
    registry
        .wrap(public.primitives::<BoxedVerifier>(registry).unwrap())
        .unwrap()
}

#[test]
fn stress_100_rotations_keep_every_signature_valid() {
    let registry = registered();
    let template = signature::ed25519_key_template();

    let mut manager = KeysetManager::new();
    let mut archive: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();
    for i in 0..100 {
        manager.rotate(&registry, &template).expect("rotate");
        let message = format!("generation {i}").into_bytes();
        let sig = signer_for(&registry, &manager).sign(&message).expect("sign");
        archive.push((sig, message));
    }

    assert_eq!(manager.handle().unwrap().keyset().keys.len(), 100);

    let verifier = verifier_for(&registry, &manager);
    for (i, (sig, message)) in archive.iter().enumerate() {
        verifier
            .verify(sig, message)
            .unwrap_or_else(|e| panic!("generation {i} failed to verify: {e}"));
    }
}

#[test]
fn stress_mixed_prefixes_across_60_generations() {
    let registry = registered();
    let tink = signature::ed25519_key_template();
    let raw = KeyTemplate {
        type_url: ED25519_PRIVATE_KEY_TYPE_URL.to_string(),
        value: Vec::new(),
        output_prefix_type: OutputPrefixType::Raw,
    };

    // Alternate prefixed and raw keys so the verifier has to fall
    // through the prefix index to the raw scan half the time.
    let mut manager = KeysetManager::new();
    let mut archive: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();
    for i in 0..60 {
        let template = if i % 2 == 0 { &tink } else { &raw };
        manager.rotate(&registry, template).expect("rotate");
        let message = format!("record {i}").into_bytes();
        let sig = signer_for(&registry, &manager).sign(&message).expect("sign");
        archive.push((sig, message));
    }

    let verifier = verifier_for(&registry, &manager);
    for (i, (sig, message)) in archive.iter().enumerate() {
        verifier
            .verify(sig, message)
            .unwrap_or_else(|e| panic!("record {i} failed to verify: {e}"));
        assert!(
            verifier.verify(sig, b"some other record").is_err(),
            "record {i} verified a foreign message"
        );
    }
}

#[test]
fn stress_destroying_half_a_large_keyset() {
    let registry = registered();
    let template = signature::ed25519_key_template();

    let mut manager = KeysetManager::new();
    let mut generations: Vec<(u32, Vec<u8>, Vec<u8>)> = Vec::new();
    for i in 0..40 {
        let id = manager.rotate(&registry, &template).expect("rotate");
        let message = format!("epoch {i}").into_bytes();
        let sig = signer_for(&registry, &manager).sign(&message).expect("sign");
        generations.push((id, sig, message));
    }

    // Shred the first half; the primary lives in the second half
    for (id, _, _) in &generations[..20] {
        manager.destroy(*id).expect("old keys may be destroyed");
    }

    let verifier = verifier_for(&registry, &manager);
    for (i, (_, sig, message)) in generations.iter().enumerate() {
        let verdict = verifier.verify(sig, message);
        if i < 20 {
            assert!(verdict.is_err(), "epoch {i} was destroyed but verified");
        } else {
            assert!(verdict.is_ok(), "epoch {i} is live but failed to verify");
        }
    }
}

#[test]
fn stress_64_generation_mac_keyset() {
    let registry = registered();
    let template = mac::hmac_sha256_tag128_template().expect("template should encode");

    let mut manager = KeysetManager::new();
    let mut archive: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();
    for i in 0..64 {
        manager.rotate(&registry, &template).expect("rotate");
        let mac_primitive = registry
            .wrap(
                manager
                    .handle()
                    .unwrap()
                    .primitives::<BoxedMac>(&registry)
                    .unwrap(),
            )
            .unwrap();
        let message = format!("entry {i}").into_bytes();
        let tag = mac_primitive.compute(&message).expect("compute");
        archive.push((tag, message));
    }

    let mac_primitive = registry
        .wrap(
            manager
                .handle()
                .unwrap()
                .primitives::<BoxedMac>(&registry)
                .unwrap(),
        )
        .unwrap();
    for (i, (tag, message)) in archive.iter().enumerate() {
        mac_primitive
            .verify(tag, message)
            .unwrap_or_else(|e| panic!("entry {i} failed to verify: {e}"));
    }
}
