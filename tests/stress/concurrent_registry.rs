//! Stress: the registry under concurrent registration and lookup.
//!
//! Registration is process-wide shared state, so these tests hammer it
//! from many threads at once: repeated idempotent registration, lookups
//! racing a registrar, and a shared wrapped primitive driven in parallel.

use std::sync::{Arc, Mutex};
use std::thread;

use keyloom::signature::{self, ED25519_PRIVATE_KEY_TYPE_URL};
use keyloom::{
    register_all, BoxedSigner, BoxedVerifier, KeysetHandle, Registry, Signer, Verifier,
};

#[test]
fn stress_16_threads_registering_all_families() {
    let registry = Arc::new(Registry::new());
    let failures = Arc::new(Mutex::new(Vec::new()));

    let mut handles = vec![];
    for i in 0..16 {
        let registry = Arc::clone(&registry);
        let failures = Arc::clone(&failures);
        handles.push(thread::spawn(move || {
            if let Err(e) = register_all(&registry) {
                failures.lock().unwrap().push(format!("thread {i}: {e}"));
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    let failures = failures.lock().unwrap();
    assert!(
        failures.is_empty(),
        "re-registration must stay idempotent under contention: {failures:?}"
    );
    assert!(registry
        .get_key_manager::<BoxedSigner>(ED25519_PRIVATE_KEY_TYPE_URL)
        .is_ok());
}

#[test]
fn stress_lookups_racing_a_registrar() {
    let registry = Arc::new(Registry::new());

    let registrar = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            signature::register(&registry).expect("registration should succeed");
        })
    };

    // Readers spin until the registrar's work becomes visible
    let mut readers = vec![];
    for _ in 0..8 {
        let registry = Arc::clone(&registry);
        readers.push(thread::spawn(move || {
            for _ in 0..10_000 {
                if registry
                    .get_key_manager::<BoxedSigner>(ED25519_PRIVATE_KEY_TYPE_URL)
                    .is_ok()
                {
                    return true;
                }
                thread::yield_now();
            }
            false
        }));
    }

    registrar.join().unwrap();
    for r in readers {
        assert!(
            r.join().unwrap(),
            "every reader should eventually observe the registration"
        );
    }
}

#[test]
fn stress_8_threads_signing_through_one_wrapped_pair() {
    let registry = Arc::new(Registry::new());
    signature::register(&registry).expect("registration should succeed");

    let handle = KeysetHandle::generate_new(&registry, &signature::ed25519_key_template())
        .expect("keyset generation");
    let signer: Arc<BoxedSigner> = Arc::new(
        registry
            .wrap(handle.primitives(&registry).expect("signer set"))
            .expect("signer should wrap"),
    );
    let verifier: Arc<BoxedVerifier> = Arc::new(
        registry
            .wrap(
                handle
                    .public_handle(&registry)
                    .expect("public keyset")
                    .primitives(&registry)
                    .expect("verifier set"),
            )
            .expect("verifier should wrap"),
    );

    let errors = Arc::new(Mutex::new(Vec::new()));
    let mut handles = vec![];
    for t in 0..8 {
        let signer = Arc::clone(&signer);
        let verifier = Arc::clone(&verifier);
        let errors = Arc::clone(&errors);
        handles.push(thread::spawn(move || {
            for i in 0..200 {
                let message = format!("thread {t} message {i}").into_bytes();
                match signer.sign(&message) {
                    Ok(sig) => {
                        if let Err(e) = verifier.verify(&sig, &message) {
                            errors.lock().unwrap().push(format!("verify {t}/{i}: {e}"));
                        }
                    }
                    Err(e) => errors.lock().unwrap().push(format!("sign {t}/{i}: {e}")),
                }
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    let errors = errors.lock().unwrap();
    assert!(errors.is_empty(), "all 1600 roundtrips should pass: {errors:?}");
}

#[test]
fn stress_concurrent_keyset_generation() {
    let registry = Arc::new(Registry::new());
    register_all(&registry).expect("registration should succeed");

    let mut handles = vec![];
    for _ in 0..8 {
        let registry = Arc::clone(&registry);
        handles.push(thread::spawn(move || {
            let mut ids = Vec::new();
            for _ in 0..50 {
                let handle =
                    KeysetHandle::generate_new(&registry, &signature::ed25519_key_template())
                        .expect("keyset generation under contention");
                ids.push(handle.keyset().primary_key_id);
            }
            ids
        }));
    }

    let mut all_ids = Vec::new();
    for h in handles {
        all_ids.extend(h.join().unwrap());
    }
    assert_eq!(all_ids.len(), 400);
    assert!(all_ids.iter().all(|&id| id != 0));
}
