//! Structural cache keys: determinism, cycles, thread isolation

use dyntype::{shape_key, structural_key, KeyCache, RawArena, RawNode, ShapeKey};

#[test]
fn keys_are_deterministic_across_recomputation() {
    let mut arena = RawArena::new();
    let a = arena.int(1);
    let b = arena.string("x");
    let list = arena.list([a, b]);
    let first = shape_key(&arena, list, &mut KeyCache::new());
    let second = shape_key(&arena, list, &mut KeyCache::new());
    assert_eq!(first, second);
}

#[test]
fn distinct_but_equal_containers_collide() {
    let mut arena = RawArena::new();
    let build = |arena: &mut RawArena| {
        let x = arena.int(10);
        let inner = arena.list([x]);
        arena.string_map([("xs", inner)])
    };
    let first = build(&mut arena);
    let second = build(&mut arena);
    let mut cache = KeyCache::new();
    assert_eq!(
        shape_key(&arena, first, &mut cache),
        shape_key(&arena, second, &mut cache)
    );
}

#[test]
fn self_referential_list_terminates() {
    let mut arena = RawArena::new();
    let list = arena.reserve();
    arena.fill(list, RawNode::List(vec![list]));
    let key = shape_key(&arena, list, &mut KeyCache::new());
    assert!(matches!(key, ShapeKey::List(_)));
}

#[test]
fn mutually_recursive_maps_terminate() {
    let mut arena = RawArena::new();
    let a = arena.reserve();
    let b = arena.reserve();
    let ka = arena.string("next");
    let kb = arena.string("next");
    arena.fill(a, RawNode::Map(vec![(ka, b)]));
    arena.fill(b, RawNode::Map(vec![(kb, a)]));
    let key = shape_key(&arena, a, &mut KeyCache::new());
    assert!(matches!(key, ShapeKey::Map(_)));
}

#[test]
fn cross_thread_keys_differ() {
    let mut arena = RawArena::new();
    let h = arena.int(42);
    let here = structural_key(&arena, h, Some(&mut KeyCache::new()));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            std::thread::spawn(|| {
                let mut arena = RawArena::new();
                let h = arena.int(42);
                structural_key(&arena, h, Some(&mut KeyCache::new()))
            })
        })
        .collect();
    for handle in handles {
        let remote = handle.join().unwrap();
        assert_ne!(here, remote);
        // Isolation comes from the thread token, not the data.
        assert_eq!(here.shape(), remote.shape());
    }
}
