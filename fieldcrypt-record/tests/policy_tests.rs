mod common;

use common::{CountingEncryptor, K1, K2, keyed, registry_with};
use fieldcrypt_crypto::FieldEncryptor;
use fieldcrypt_model::{CoercionFailure, DecryptFailure, ReadPolicy, ScalarType, Value};
use fieldcrypt_record::{EncryptedRecord, FieldState, RecordError};
use fieldcrypt_storage::MemoryStore;
use fieldcrypt_types::RecordId;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn policy(decrypt_failure: DecryptFailure, coercion_failure: CoercionFailure) -> ReadPolicy {
    ReadPolicy {
        decrypt_failure,
        coercion_failure,
    }
}

/// A stored person whose `ssn` column was sealed with the wrong key.
fn foreign_ssn(store: &MemoryStore, key: Arc<CountingEncryptor>, policy: ReadPolicy) -> EncryptedRecord {
    let registry = registry_with(key, policy);
    let class = registry.class("Person").unwrap();
    let mut person = EncryptedRecord::new(class.clone());
    person.set("ssn", "123-45-6789").unwrap();
    let id: RecordId = person.save(store).unwrap();
    store
        .update_column("Person", id, "encrypted_ssn", Some(keyed(K2).encrypt("x").unwrap()))
        .unwrap();
    EncryptedRecord::find(store, class, id).unwrap()
}

// ── Decrypt failures ─────────────────────────────────────────────

#[test]
fn absent_policy_caches_the_failure() {
    let key = CountingEncryptor::new(K1);
    let store = MemoryStore::new();
    let mut person = foreign_ssn(&store, key.clone(), ReadPolicy::default());

    assert_eq!(person.get("ssn").unwrap(), None);
    assert_eq!(person.get("ssn").unwrap(), None);
    assert_eq!(key.decrypts(), 1);
    assert_eq!(person.field_state("ssn").unwrap(), &FieldState::PlaintextLoaded(None));
}

#[test]
fn retry_policy_decrypts_again_on_next_read() {
    let key = CountingEncryptor::new(K1);
    let store = MemoryStore::new();
    let mut person = foreign_ssn(
        &store,
        key.clone(),
        policy(DecryptFailure::Retry, CoercionFailure::Absent),
    );

    assert_eq!(person.get("ssn").unwrap(), None);
    assert_eq!(person.get("ssn").unwrap(), None);
    assert_eq!(key.decrypts(), 2);
    assert_eq!(person.field_state("ssn").unwrap(), &FieldState::Unloaded);
}

#[test]
fn raise_policy_returns_decrypt_error() {
    let key = CountingEncryptor::new(K1);
    let store = MemoryStore::new();
    let mut person = foreign_ssn(&store, key, ReadPolicy::strict());

    let err = person.get("ssn").unwrap_err();
    assert!(matches!(err, RecordError::Decrypt { ref field, .. } if field == "ssn"));
    assert!(!err.is_configuration());
    assert_eq!(person.field_state("ssn").unwrap(), &FieldState::Unloaded);
}

#[test]
fn raise_policy_fails_snapshot() {
    let store = MemoryStore::new();
    let mut person = foreign_ssn(&store, CountingEncryptor::new(K1), ReadPolicy::strict());

    assert!(matches!(person.to_json(), Err(RecordError::Decrypt { .. })));
}

#[test]
fn undecryptable_previous_value_follows_policy() {
    let store = MemoryStore::new();
    let mut lenient = foreign_ssn(&store, CountingEncryptor::new(K1), ReadPolicy::default());
    lenient.set("ssn", "new").unwrap();
    assert_eq!(lenient.was("ssn").unwrap(), None);

    let mut strict = foreign_ssn(&store, CountingEncryptor::new(K1), ReadPolicy::strict());
    strict.set("ssn", "new").unwrap();
    assert!(matches!(strict.was("ssn"), Err(RecordError::Decrypt { .. })));
}

#[test]
fn overwriting_undecryptable_field_recovers() {
    let key = CountingEncryptor::new(K1);
    let store = MemoryStore::new();
    let mut person = foreign_ssn(&store, key, ReadPolicy::strict());

    person.set("ssn", "987-65-4321").unwrap();
    let id = person.save(&store).unwrap();
    person.reload(&store).unwrap();

    assert_eq!(person.id(), Some(id));
    assert_eq!(person.get("ssn").unwrap(), Some(Value::from("987-65-4321")));
}

// ── Coercion failures ────────────────────────────────────────────

#[test]
fn uncoercible_plaintext_reads_as_absent_by_default() {
    let registry = registry_with(CountingEncryptor::new(K1), ReadPolicy::default());
    let mut person = EncryptedRecord::new(registry.class("Person").unwrap());
    person.set("badge", "not a number").unwrap();
    person.set("verified", "maybe").unwrap();

    assert_eq!(person.get("badge").unwrap(), None);
    assert_eq!(person.get("verified").unwrap(), None);
    assert_eq!(
        person.before_type_cast("badge").unwrap().as_deref(),
        Some("not a number")
    );
}

#[test]
fn raise_policy_returns_coercion_error() {
    let registry = registry_with(
        CountingEncryptor::new(K1),
        policy(DecryptFailure::Absent, CoercionFailure::Raise),
    );
    let mut person = EncryptedRecord::new(registry.class("Person").unwrap());
    person.set("dob", "yesterday").unwrap();

    let err = person.get("dob").unwrap_err();
    match err {
        RecordError::Coercion { field, source } => {
            assert_eq!(field, "dob");
            assert_eq!(source.raw, "yesterday");
            assert_eq!(source.expected, ScalarType::Date);
        }
        other => panic!("expected coercion error, got {other:?}"),
    }
}

#[test]
fn string_fields_never_fail_coercion() {
    let registry = registry_with(
        CountingEncryptor::new(K1),
        policy(DecryptFailure::Raise, CoercionFailure::Raise),
    );
    let mut person = EncryptedRecord::new(registry.class("Person").unwrap());
    person.set("ssn", 42).unwrap();

    assert_eq!(person.get("ssn").unwrap(), Some(Value::from("42")));
}

// ── Configuration file ───────────────────────────────────────────

#[test]
fn config_file_supplies_key_and_policy() {
    let config = fieldcrypt_model::FieldCryptConfig::from_toml_str(
        r#"
        [read]
        decrypt_failure = "raise"

        [keys]
        Vault = "VAULT_KEY"
        "#,
    )
    .unwrap();
    let registry = fieldcrypt_model::Registry::builder()
        .class(fieldcrypt_model::ClassBuilder::new("Vault").declare_fields(["secret"]))
        .apply_config_with(&config, |var| (var == "VAULT_KEY").then(|| K2.to_string()))
        .unwrap()
        .build()
        .unwrap();
    let class = registry.class("Vault").unwrap();
    let store = MemoryStore::new();

    let mut vault = EncryptedRecord::new(class.clone());
    vault.set("secret", "hunter2").unwrap();
    let id = vault.save(&store).unwrap();
    let stored = store.load("Vault", id).unwrap();
    assert_eq!(keyed(K2).decrypt(stored.read_column("encrypted_secret").unwrap()).unwrap(), "hunter2");

    store
        .update_column("Vault", id, "encrypted_secret", Some(keyed(K1).encrypt("x").unwrap()))
        .unwrap();
    let mut loaded = EncryptedRecord::find(&store, class, id).unwrap();
    assert!(matches!(loaded.get("secret"), Err(RecordError::Decrypt { .. })));
}
