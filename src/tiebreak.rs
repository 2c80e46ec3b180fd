//! The single tie-break substrate shared by both counting engines: run
//! extraction over a pre-sorted sequence, and random draws without
//! replacement within a run.

use rand::Rng;
use std::ops::Range;

/// Starting at `start`, collect the longest run of consecutive elements of
/// `sorted` whose keys compare equal, and return its index range. At or past
/// the end of the slice the result is the empty range `start..start`.
pub fn equal_run<T, K, F>(sorted: &[T], start: usize, key: F) -> Range<usize>
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    if start >= sorted.len() {
        return start..start;
    }
    let anchor = key(&sorted[start]);
    let mut end = start + 1;
    while end < sorted.len() && key(&sorted[end]) == anchor {
        end += 1;
    }
    start..end
}

/// Remove and return a uniformly random element of `group`. Repeated calls
/// drain the group without replacement; an empty group yields `None`.
pub fn draw<T, R: Rng>(group: &mut Vec<T>, rng: &mut R) -> Option<T> {
    if group.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..group.len());
    Some(group.swap_remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn equal_run_finds_maximal_runs() {
        let values = [3, 3, 3, 2, 2, 1];
        assert_eq!(equal_run(&values, 0, |v| *v), 0..3);
        assert_eq!(equal_run(&values, 3, |v| *v), 3..5);
        assert_eq!(equal_run(&values, 5, |v| *v), 5..6);
    }

    #[test]
    fn equal_run_past_end_is_empty() {
        let values = [1, 2];
        assert_eq!(equal_run(&values, 2, |v| *v), 2..2);
        assert_eq!(equal_run(&values, 5, |v| *v), 5..5);
        let empty: [i32; 0] = [];
        assert_eq!(equal_run(&empty, 0, |v| *v), 0..0);
    }

    #[test]
    fn equal_run_with_key_projection() {
        let values = [("a", 5), ("b", 5), ("c", 4)];
        assert_eq!(equal_run(&values, 0, |v| v.1), 0..2);
    }

    #[test]
    fn draw_drains_without_replacement() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut group = vec![1, 2, 3, 4];
        let mut drawn = Vec::new();
        while let Some(value) = draw(&mut group, &mut rng) {
            drawn.push(value);
        }
        assert!(group.is_empty());
        drawn.sort_unstable();
        assert_eq!(drawn, vec![1, 2, 3, 4]);
        assert_eq!(draw(&mut group, &mut rng), None);
    }

    #[test]
    fn draw_is_reproducible_for_a_fixed_seed() {
        let order_a: Vec<i32> = {
            let mut rng = StdRng::seed_from_u64(7);
            let mut group = vec![10, 20, 30];
            std::iter::from_fn(|| draw(&mut group, &mut rng)).collect()
        };
        let order_b: Vec<i32> = {
            let mut rng = StdRng::seed_from_u64(7);
            let mut group = vec![10, 20, 30];
            std::iter::from_fn(|| draw(&mut group, &mut rng)).collect()
        };
        assert_eq!(order_a, order_b);
    }
}
