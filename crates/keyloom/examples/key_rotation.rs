//! Key Rotation — rotate a keyset's primary without invalidating output
//! made by earlier keys.
//!
//! Run with:
//!   cargo run --example key_rotation -p keyloom

use keyloom::{
    signature, BoxedSigner, BoxedVerifier, KeysetManager, Registry, Signer, Verifier,
};

fn main() {
    let registry = Registry::new();
    signature::register(&registry).expect("signature family should register");
    let template = signature::ed25519_key_template();

    // ── 1. Start with a single-key keyset ───────────────────────────────────
    let mut manager = KeysetManager::new();
    let first_id = manager
        .rotate(&registry, &template)
        .expect("initial key generation");
    println!("Keyset created with key {first_id}");

    let signer = registry
        .wrap(
            manager
                .handle()
                .expect("keyset should be non-empty")
                .primitives::<BoxedSigner>(&registry)
                .expect("signer set should build"),
        )
        .expect("signer should wrap");
    let old_sig = signer.sign(b"contract v1").expect("signing");
    println!("Signed 'contract v1' with key {first_id}");
    println!();

    // ── 2. Rotate the primary ───────────────────────────────────────────────
    //
    // Rotation appends a fresh key and promotes it. The old key stays
    // enabled, so output it produced remains verifiable.
    let second_id = manager.rotate(&registry, &template).expect("rotation");
    println!("Rotated primary: {first_id} -> {second_id}");

    let signer = registry
        .wrap(
            manager
                .handle()
                .expect("keyset should be non-empty")
                .primitives::<BoxedSigner>(&registry)
                .expect("signer set should build"),
        )
        .expect("signer should wrap");
    let new_sig = signer.sign(b"contract v2").expect("signing");
    println!("Signed 'contract v2' with key {second_id}");
    println!();

    // ── 3. One verifier accepts both generations ────────────────────────────
    //
    // The wrapped verifier routes each signature to its key by output
    // prefix, so consumers never notice the rotation.
    let verifier = registry
        .wrap(
            manager
                .handle()
                .expect("keyset should be non-empty")
                .public_handle(&registry)
                .expect("public keyset")
                .primitives::<BoxedVerifier>(&registry)
                .expect("verifier set should build"),
        )
        .expect("verifier should wrap");
    verifier
        .verify(&old_sig, b"contract v1")
        .expect("old signature should still verify");
    verifier
        .verify(&new_sig, b"contract v2")
        .expect("new signature should verify");
    println!("Both generations verify through one keyset: confirmed");
    println!();

    // ── 4. Retire the old key ───────────────────────────────────────────────
    //
    // Disabling removes a key from use while keeping its material for a
    // possible re-enable. Destroying wipes the material for good.
    manager.disable(first_id).expect("non-primary keys may be disabled");
    let verifier = registry
        .wrap(
            manager
                .handle()
                .expect("keyset should be non-empty")
                .public_handle(&registry)
                .expect("public keyset")
                .primitives::<BoxedVerifier>(&registry)
                .expect("verifier set should build"),
        )
        .expect("verifier should wrap");
    assert!(verifier.verify(&old_sig, b"contract v1").is_err());
    println!("Disabled key {first_id}; its signatures no longer verify");

    manager.destroy(first_id).expect("disabled keys may be destroyed");
    let info = manager.handle().expect("keyset should be non-empty").info();
    for entry in &info.entries {
        println!("  [{:>10}] {:?}", entry.key_id, entry.status);
    }
    println!();

    println!("All operations completed successfully.");
}
