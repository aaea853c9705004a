use super::*;

fn m(id: i64) -> Migration {
    Migration::new(id, format!("m{id}"), format!("SELECT {id};"))
}

#[test]
fn test_sorts_ascending() {
    let set = MigrationSet::new(vec![m(3), m(1), m(2)]).unwrap();
    let ids: Vec<i64> = set.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(set.last_id(), Some(3));
}

#[test]
fn test_empty_set() {
    let set = MigrationSet::new(Vec::new()).unwrap();
    assert!(set.is_empty());
    assert_eq!(set.last_id(), None);
    assert_eq!(set.after(0), None);
}

#[test]
fn test_rejects_duplicate_id() {
    let err = MigrationSet::new(vec![m(1), m(2), m(1)]).unwrap_err();
    assert!(matches!(err, CoreError::DuplicateMigrationId { id: 1 }));
    assert!(err.to_string().contains("duplicate migration id detected: 1"));
}

#[test]
fn test_rejects_negative_id() {
    let err = MigrationSet::new(vec![m(-1)]).unwrap_err();
    assert!(matches!(err, CoreError::NegativeMigrationId { id: -1 }));
    assert!(err.to_string().contains("negative"));
}

#[test]
fn test_negative_reported_before_duplicate() {
    let err = MigrationSet::new(vec![m(2), m(2), m(-5)]).unwrap_err();
    assert!(matches!(err, CoreError::NegativeMigrationId { id: -5 }));
}

#[test]
fn test_zero_id_allowed() {
    let set = MigrationSet::new(vec![m(0)]).unwrap();
    assert_eq!(set.last_id(), Some(0));
}

#[test]
fn test_after_exact_match() {
    let set = MigrationSet::new(vec![m(1), m(5), m(9)]).unwrap();
    let rest: Vec<i64> = set.after(5).unwrap().iter().map(|m| m.id).collect();
    assert_eq!(rest, vec![9]);
    assert!(set.after(9).unwrap().is_empty());
    assert_eq!(set.after(4), None);
}

#[test]
fn test_generated_has_no_sql() {
    let g = Migration::generated(7, "runtime");
    assert_eq!(g.sql, None);
    assert_eq!(g.description, "runtime");
}
