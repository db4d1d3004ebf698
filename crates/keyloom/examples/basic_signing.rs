//! Basic Signing — register the signature family, generate a keyset, sign
//! and verify through wrapped primitives.
//!
//! Run with:
//!   cargo run --example basic_signing -p keyloom

use keyloom::{signature, BoxedSigner, BoxedVerifier, KeysetHandle, Registry, Signer, Verifier};

fn main() {
    // ── 1. Set up a registry ────────────────────────────────────────────────
    //
    // The registry maps key type URLs to key managers and primitive kinds
    // to wrappers. Registering the signature family installs its catalogues,
    // both Ed25519 managers, and the signer/verifier wrappers.
    let registry = Registry::new();
    signature::register(&registry).expect("signature family should register");
    println!("Signature family registered");
    println!();

    // ── 2. Generate a keyset ────────────────────────────────────────────────
    //
    // A key template names the key type and the output prefix format.
    // Generation goes through the registered key manager, so callers never
    // touch key material directly.
    let handle = KeysetHandle::generate_new(&registry, &signature::ed25519_key_template())
        .expect("keyset generation should succeed");
    let info = handle.info();
    println!("Keyset generated");
    println!("  Primary key id: {}", info.primary_key_id);
    for entry in &info.entries {
        println!(
            "  [{:>10}] {} ({:?}, {:?})",
            entry.key_id, entry.type_url, entry.status, entry.output_prefix_type
        );
    }
    println!();

    // ── 3. Sign with the wrapped primitive ──────────────────────────────────
    //
    // The wrapped signer always uses the primary key and prepends its
    // output prefix, so the signature later identifies which key made it.
    let signer = registry
        .wrap(
            handle
                .primitives::<BoxedSigner>(&registry)
                .expect("signer set should build"),
        )
        .expect("signer should wrap");
    let message = b"funds transfer #20260823-042";
    let sig = signer.sign(message).expect("signing should succeed");
    println!("Message signed");
    println!("  Signature ({} bytes): {}...", sig.len(), hex::encode(&sig[..12]));
    println!("  Prefix:   {}", hex::encode(&sig[..5]));
    println!();

    // ── 4. Verify through the public keyset ─────────────────────────────────
    //
    // The public handle carries only public key material and can be handed
    // to a verifying party.
    let public_handle = handle
        .public_handle(&registry)
        .expect("public keyset should derive");
    let verifier = registry
        .wrap(
            public_handle
                .primitives::<BoxedVerifier>(&registry)
                .expect("verifier set should build"),
        )
        .expect("verifier should wrap");
    verifier
        .verify(&sig, message)
        .expect("signature should verify");
    println!("Signature verified: OK");

    // ── 5. Tampering is detected ────────────────────────────────────────────
    let tampered = b"funds transfer #20260823-043";
    assert!(verifier.verify(&sig, tampered).is_err());
    println!("Tampered message rejected: confirmed");
    println!();

    println!("All operations completed successfully.");
}
