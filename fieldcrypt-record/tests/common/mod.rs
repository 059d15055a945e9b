//! Shared test helpers for record tests.

#![allow(dead_code)]

use fieldcrypt_crypto::{CryptoResult, FieldEncryptor, KeyedEncryptor};
use fieldcrypt_model::{ClassBuilder, ReadPolicy, Registry, ScalarType};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const K1: &str = "k1-0123456789abcdef0123456789abc";
pub const K2: &str = "k2-0123456789abcdef0123456789abc";

/// Routes crate logs to the test harness output. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

pub fn keyed(material: &str) -> KeyedEncryptor {
    KeyedEncryptor::from_material(material).unwrap()
}

/// Wraps a real encryptor and counts every call.
#[derive(Debug)]
pub struct CountingEncryptor {
    inner: KeyedEncryptor,
    encrypts: AtomicUsize,
    decrypts: AtomicUsize,
}

impl CountingEncryptor {
    pub fn new(material: &str) -> Arc<Self> {
        Arc::new(Self {
            inner: keyed(material),
            encrypts: AtomicUsize::new(0),
            decrypts: AtomicUsize::new(0),
        })
    }

    pub fn encrypts(&self) -> usize {
        self.encrypts.load(Ordering::SeqCst)
    }

    pub fn decrypts(&self) -> usize {
        self.decrypts.load(Ordering::SeqCst)
    }
}

impl FieldEncryptor for CountingEncryptor {
    fn encrypt(&self, plaintext: &str) -> CryptoResult<String> {
        self.encrypts.fetch_add(1, Ordering::SeqCst);
        self.inner.encrypt(plaintext)
    }

    fn decrypt(&self, ciphertext: &str) -> CryptoResult<String> {
        self.decrypts.fetch_add(1, Ordering::SeqCst);
        self.inner.decrypt(ciphertext)
    }
}

fn person(key: Arc<dyn FieldEncryptor>) -> ClassBuilder {
    ClassBuilder::new("Person")
        .declare_cipher(key)
        .declare_fields(["ssn"])
        .declare_fields([
            ("dob", ScalarType::Date),
            ("badge", ScalarType::Integer),
            ("verified", ScalarType::Boolean),
            ("last_seen", ScalarType::DateTime),
        ])
        .columns(["name", "email"])
}

/// `Person` with a counting key, plus an `Employee` subclass and an
/// `Account` class that never declares a key.
pub fn registry_with(key: Arc<dyn FieldEncryptor>, policy: ReadPolicy) -> Registry {
    Registry::builder()
        .default_policy(policy)
        .class(person(key))
        .class(ClassBuilder::new("Employee").extends("Person"))
        .class(
            ClassBuilder::new("Account")
                .declare_fields(["token"])
                .columns(["login"]),
        )
        .build()
        .unwrap()
}

pub fn registry(key: Arc<dyn FieldEncryptor>) -> Registry {
    registry_with(key, ReadPolicy::default())
}
