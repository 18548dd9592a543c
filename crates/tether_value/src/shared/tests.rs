use super::*;

#[test]
fn clones_share_identity_and_data() {
    let a = Shared::new(vec![1, 2]);
    let b = a.clone();
    b.write().push(3);
    assert_eq!(*a.read(), vec![1, 2, 3]);
    assert_eq!(a.id(), b.id());
    assert!(a.ptr_eq(&b));
}

#[test]
fn distinct_allocations_get_distinct_ids() {
    let a = Shared::new(0);
    let b = Shared::new(0);
    assert_ne!(a.id(), b.id());
    assert!(!a.ptr_eq(&b));
}

#[test]
fn display_guard_blocks_reentry() {
    let id = Shared::new(()).id();
    let outer = display_guard(id, || display_guard(id, || "inner"));
    assert_eq!(outer, Some(None));
}

#[test]
fn display_guard_releases_on_exit() {
    let id = Shared::new(()).id();
    assert_eq!(display_guard(id, || 1), Some(1));
    assert_eq!(display_guard(id, || 2), Some(2));
}

#[test]
fn debug_does_not_print_contents() {
    let a = Shared::new("secret");
    let rendered = format!("{a:?}");
    assert!(rendered.starts_with("Shared(#"));
    assert!(!rendered.contains("secret"));
}
