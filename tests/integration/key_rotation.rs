//! Integration test: key rotation lifecycle.
//!
//! Walks a keyset through rotation, disable/enable, and destruction,
//! checking that verification stays transparent across generations and
//! that lifecycle rules hold at every step.

use keyloom::signature::{self, ED25519_PRIVATE_KEY_TYPE_URL};
use keyloom::{
    BoxedSigner, BoxedVerifier, ErrorCode, KeyStatus, KeysetManager, OutputPrefixType, Registry,
    Signer, Verifier,
};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn registered() -> Registry {
    let registry = Registry::new();
    signature::register(&registry).expect("registration should succeed");
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
fn rotation_keeps_old_signatures_valid() {
    init_logs();
    let registry = registered();
    let template = signature::ed25519_key_template();

    // ── Generation 1 ────────────────────────────────────────────────
    let mut manager = KeysetManager::new();
    let first_id = manager.rotate(&registry, &template).expect("first rotate");
    let sig_gen1 = signer_for(&registry, &manager)
        .sign(b"invoice 1001")
        .expect("gen-1 signing");

    // ── Generation 2 ────────────────────────────────────────────────
    let second_id = manager.rotate(&registry, &template).expect("second rotate");
    assert_ne!(first_id, second_id);
    assert_eq!(manager.handle().unwrap().keyset().primary_key_id, second_id);

    let sig_gen2 = signer_for(&registry, &manager)
        .sign(b"invoice 1002")
        .expect("gen-2 signing");

    // Both generations verify through the rotated keyset
    let verifier = verifier_for(&registry, &manager);
    verifier
        .verify(&sig_gen1, b"invoice 1001")
        .expect("gen-1 signature should still verify after rotation");
    verifier
        .verify(&sig_gen2, b"invoice 1002")
        .expect("gen-2 signature should verify");

    // Prefixes differ per key, so the ciphertexts are distinguishable
    assert_ne!(sig_gen1[..5], sig_gen2[..5]);
}

#[test]
fn disabled_key_stops_verifying_until_reenabled() {
    init_logs();
    let registry = registered();
    let template = signature::ed25519_key_template();

    let mut manager = KeysetManager::new();
    let old_id = manager.rotate(&registry, &template).expect("first rotate");
    let old_sig = signer_for(&registry, &manager)
        .sign(b"archived doc")
        .expect("signing with the first key");
    manager.rotate(&registry, &template).expect("second rotate");

    manager.disable(old_id).expect("non-primary keys may be disabled");
    assert!(
        verifier_for(&registry, &manager)
            .verify(&old_sig, b"archived doc")
            .is_err(),
        "disabled keys must not participate in verification"
    );

    manager.enable(old_id).expect("disabled keys may be re-enabled");
    verifier_for(&registry, &manager)
        .verify(&old_sig, b"archived doc")
        .expect("re-enabled key verifies again");
}

#[test]
fn destroyed_key_is_wiped_and_excluded() {
    init_logs();
    let registry = registered();
    let template = signature::ed25519_key_template();

    let mut manager = KeysetManager::new();
    let old_id = manager.rotate(&registry, &template).expect("first rotate");
    let old_sig = signer_for(&registry, &manager)
        .sign(b"to be shredded")
        .expect("signing with the first key");
    manager.rotate(&registry, &template).expect("second rotate");

    manager.destroy(old_id).expect("non-primary keys may be destroyed");

    let handle = manager.handle().unwrap();
    let destroyed = handle.keyset().key(old_id).expect("record stays in the keyset");
    assert_eq!(destroyed.status, KeyStatus::Destroyed);
    assert!(destroyed.data.value.is_empty(), "material must be wiped");

    assert!(
        verifier_for(&registry, &manager)
            .verify(&old_sig, b"to be shredded")
            .is_err(),
        "destroyed keys must not participate in verification"
    );

    // Destruction is final
    assert!(manager.enable(old_id).is_err());
    assert!(manager.destroy(old_id).is_err());
}

#[test]
fn primary_key_is_protected() {
    init_logs();
    let registry = registered();
    let template = signature::ed25519_key_template();

    let mut manager = KeysetManager::new();
    let primary_id = manager.rotate(&registry, &template).expect("rotate");
    let spare_id = manager.add_key(&registry, &template).expect("add spare");

    assert!(manager.disable(primary_id).is_err());
    assert!(manager.destroy(primary_id).is_err());

    manager.disable(spare_id).expect("spares may be disabled");
    let err = manager.set_primary(spare_id).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidArgument);

    manager.enable(spare_id).expect("re-enable the spare");
    manager.set_primary(spare_id).expect("enabled spare may become primary");
    assert_eq!(manager.handle().unwrap().keyset().primary_key_id, spare_id);
}

#[test]
fn mixed_prefix_types_verify_side_by_side() {
    init_logs();
    let registry = registered();

    let prefixes = [
        OutputPrefixType::Tink,
        OutputPrefixType::Legacy,
        OutputPrefixType::Crunchy,
        OutputPrefixType::Raw,
    ];

    let mut manager = KeysetManager::new();
    let mut archive: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();
    for (i, prefix) in prefixes.iter().enumerate() {
        let template = keyloom::KeyTemplate {
            type_url: ED25519_PRIVATE_KEY_TYPE_URL.to_string(),
            value: Vec::new(),
            output_prefix_type: *prefix,
        };
        manager.rotate(&registry, &template).expect("rotate");
        let message = format!("generation {i}").into_bytes();
        let sig = signer_for(&registry, &manager)
            .sign(&message)
            .expect("signing");
        archive.push((sig, message));
    }

    let verifier = verifier_for(&registry, &manager);
    for (sig, message) in &archive {
        verifier
            .verify(sig, message)
            .expect("every prefix format should verify through one keyset");
    }

    // Tink and legacy prefixes are 5 bytes, crunchy 4, raw none
    assert_eq!(archive[0].0.len(), 69);
    assert_eq!(archive[1].0.len(), 69);
    assert_eq!(archive[2].0.len(), 68);
    assert_eq!(archive[3].0.len(), 64);
}

#[test]
fn resuming_from_a_handle_preserves_history() {
    init_logs();
    let registry = registered();
    let template = signature::ed25519_key_template();

    let mut manager = KeysetManager::new();
    manager.rotate(&registry, &template).expect("rotate");
    let sig = signer_for(&registry, &manager)
        .sign(b"before the handoff")
        .expect("signing");

    // Hand the keyset to a fresh manager, then rotate once more
    let mut resumed = KeysetManager::from_handle(&manager.handle().unwrap());
    resumed.rotate(&registry, &template).expect("rotate after resume");

    verifier_for(&registry, &resumed)
        .verify(&sig, b"before the handoff")
        .expect("history should survive the handoff");
}
