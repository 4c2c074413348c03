use super::*;

crate::define_idx!(TestId);

#[test]
fn test_push_returns_sequential_indices() {
    let mut vec: IndexVec<TestId, i32> = IndexVec::new();
    let a = vec.push(10);
    let b = vec.push(20);
    let c = vec.push(30);

    assert_eq!(a, TestId(0));
    assert_eq!(b, TestId(1));
    assert_eq!(c, TestId(2));
    assert_eq!(vec.len(), 3);
}

#[test]
fn test_index_access() {
    let mut vec: IndexVec<TestId, &str> = IndexVec::new();
    let id = vec.push("hello");
    assert_eq!(vec[id], "hello");
    vec[id] = "world";
    assert_eq!(vec[id], "world");
}

#[test]
fn test_get_out_of_bounds() {
    let mut vec: IndexVec<TestId, i32> = IndexVec::new();
    vec.push(1);
    assert_eq!(vec.get(TestId(0)), Some(&1));
    assert_eq!(vec.get(TestId(1)), None);
}

#[test]
fn test_next_index_matches_push() {
    let mut vec: IndexVec<TestId, i32> = IndexVec::new();
    let next = vec.next_index();
    let pushed = vec.push(7);
    assert_eq!(next, pushed);
}

#[test]
fn test_iter_enumerated() {
    let mut vec: IndexVec<TestId, i32> = IndexVec::new();
    vec.push(10);
    vec.push(20);

    let pairs: Vec<_> = vec.iter_enumerated().collect();
    assert_eq!(pairs, vec![(TestId(0), &10), (TestId(1), &20)]);
}

#[test]
fn test_indices() {
    let mut vec: IndexVec<TestId, i32> = IndexVec::new();
    vec.push(1);
    vec.push(2);

    let indices: Vec<_> = vec.indices().collect();
    assert_eq!(indices, vec![TestId(0), TestId(1)]);
}

#[test]
fn test_clear_keeps_capacity() {
    let mut vec: IndexVec<TestId, i32> = IndexVec::with_capacity(8);
    vec.push(1);
    vec.push(2);
    let cap = vec.capacity();
    vec.clear();
    assert!(vec.is_empty());
    assert_eq!(vec.capacity(), cap);
}

#[test]
fn test_as_slice() {
    let mut vec: IndexVec<TestId, i32> = IndexVec::new();
    vec.push(1);
    vec.push(2);
    assert_eq!(vec.as_slice(), &[1, 2]);
}

#[test]
fn test_default_is_empty() {
    let vec: IndexVec<TestId, i32> = IndexVec::default();
    assert!(vec.is_empty());
}
