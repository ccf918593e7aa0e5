//! Rank arithmetic exercised the way the list manager uses it.

use lexlist::{
    list::ordering::{append, is_strictly_ordered, move_to_index},
    rank::{Rank, codec, midpoint, rebalance},
};
use num_bigint::BigUint;

fn rank(s: &str) -> Rank {
    Rank::parse(s).unwrap()
}

fn ceil_log26(n: usize) -> usize {
    let mut digits = 0;
    let mut capacity = 1usize;
    while capacity < n {
        capacity = capacity.saturating_mul(26);
        digits += 1;
    }
    digits
}

#[test]
fn rebalance_keeps_ranks_short() {
    for n in [1, 2, 3, 25, 26, 27, 100, 677, 1000, 5000] {
        let mut ranks: Vec<Rank> = (0..n).map(|_| Rank::first()).collect();
        rebalance(&mut ranks).unwrap();

        assert!(is_strictly_ordered(&ranks), "n={n}: {ranks:?}");
        let longest = ranks.iter().map(Rank::len).max().unwrap();
        assert!(
            longest <= ceil_log26(n) + 3,
            "n={n}: longest rank {longest} exceeds bound"
        );
        assert_eq!(ranks[0], "b");
        if n > 1 {
            assert_eq!(ranks[n - 1], "z");
        }
    }
}

#[test]
fn rebalance_fixes_collisions() {
    let mut ranks = vec![rank("m"), rank("m"), rank("m")];
    rebalance(&mut ranks).unwrap();
    assert_eq!(ranks, [rank("b"), rank("n"), rank("z")]);
}

#[test]
fn midpoint_is_numerically_between() {
    let pairs = [("b", "z"), ("b", "c"), ("yyyy", "z"), ("bn", "bo"), ("mz", "n")];
    for (low, high) in pairs {
        let mid = midpoint(&rank(low), &rank(high)).unwrap();
        assert!(rank(low) < mid && mid < rank(high), "{low} < {mid} < {high}");

        let width = mid.len().max(low.len()).max(high.len());
        let value = |r: &str| {
            let padded = format!("{r:a<width$}");
            codec::to_integer(&padded).unwrap()
        };
        assert!(value(low) < value(mid.as_str()));
        assert!(value(mid.as_str()) < value(high));
    }
}

#[test]
fn codec_round_trips_through_ranks() {
    for n in [1u64, 25, 26, 675, 676, 1_000_000, u64::MAX] {
        let value = BigUint::from(n);
        let encoded = codec::from_integer(&value);
        assert!(!encoded.starts_with('a'));
        assert_eq!(codec::to_integer(&encoded).unwrap(), value);
    }
}

#[test]
fn move_to_front_rewrites_two_ranks() {
    let mut items = vec![rank("b"), rank("m"), rank("z")];
    let to = move_to_index(&mut items, 2, 0).unwrap();

    assert_eq!(to, 0);
    assert_eq!(items[0], "b");
    assert_eq!(items[1], midpoint(&rank("b"), &rank("m")).unwrap());
    assert_eq!(items[2], "m");
}

#[test]
fn appends_shrink_the_tail_before_growing() {
    let mut items: Vec<Rank> = Vec::new();
    for _ in 0..3 {
        append(&mut items, Rank::first()).unwrap();
    }
    assert_eq!(items[0], "b");
    assert_eq!(items[2], "z");
    assert!(items[0] < items[1] && items[1] < items[2]);
}
