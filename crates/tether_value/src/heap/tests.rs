use super::*;

#[test]
fn clone_shares_allocation() {
    let h1 = Heap::new(vec![1, 2, 3]);
    let h2 = h1.clone();
    assert!(Heap::ptr_eq(&h1, &h2));
    assert_eq!(h1.addr(), h2.addr());
}

#[test]
fn equality_is_structural() {
    let h1 = Heap::new("tether".to_string());
    let h2 = Heap::new("tether".to_string());
    let h3 = Heap::new("rope".to_string());
    assert_eq!(h1, h2);
    assert_ne!(h1, h3);
    assert!(!Heap::ptr_eq(&h1, &h2));
}

#[test]
fn trait_objects_compare_by_address() {
    let a: Heap<dyn fmt::Debug + Send + Sync> = Heap::from_arc(Arc::new(1u8));
    let b = a.clone();
    let c: Heap<dyn fmt::Debug + Send + Sync> = Heap::from_arc(Arc::new(1u8));
    assert!(Heap::ptr_eq(&a, &b));
    assert!(!Heap::ptr_eq(&a, &c));
}
