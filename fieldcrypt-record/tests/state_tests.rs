use fieldcrypt_record::{FieldState, StateTable};
use pretty_assertions::assert_eq;

#[test]
fn table_starts_unloaded() {
    let table = StateTable::unloaded(3);
    assert_eq!(table.len(), 3);
    assert!(!table.is_empty());
    assert!((0..3).all(|i| table.get(i).is_unloaded()));
    assert_eq!(table.cached(0), None);
    assert_eq!(table.pending().count(), 0);
}

#[test]
fn cached_distinguishes_absent_from_unresolved() {
    let mut table = StateTable::unloaded(2);
    table.mark_loaded(0, None);

    assert_eq!(table.cached(0), Some(None));
    assert_eq!(table.cached(1), None);
}

#[test]
fn pending_lists_fields_in_order() {
    let mut table = StateTable::unloaded(4);
    table.mark_pending(2, Some("b".to_string()));
    table.mark_pending(0, None);
    table.mark_loaded(1, Some("x".to_string()));

    let pending: Vec<(usize, Option<&str>)> = table.pending().collect();
    assert_eq!(pending, vec![(0, None), (2, Some("b"))]);
    assert!(table.is_pending(2));
    assert!(!table.is_pending(1));
}

#[test]
fn invalidation_forgets_values() {
    let mut table = StateTable::unloaded(2);
    table.mark_loaded(0, Some("a".to_string()));
    table.mark_pending(1, Some("b".to_string()));

    table.invalidate(0);
    assert_eq!(table.get(0), &FieldState::Unloaded);
    assert!(table.is_pending(1));

    table.invalidate_all();
    assert_eq!(table.get(1), &FieldState::Unloaded);
}

#[test]
fn default_state_is_unloaded() {
    assert_eq!(FieldState::default(), FieldState::Unloaded);
    assert_eq!(
        FieldState::PendingEncryption(Some("v".to_string())).cached(),
        Some(Some("v"))
    );
}
