use rand::Rng;

/// Shuffle `items` in place with a Fisher–Yates pass.
///
/// For `i` from the last index down to 1, draws `j` uniformly from `[0, i]`
/// and swaps `i` and `j`.
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Returns a uniformly random permutation of `options`.
#[must_use]
pub fn shuffle_options<R: Rng + ?Sized>(options: &[String], rng: &mut R) -> Vec<String> {
    let mut shuffled = options.to_vec();
    fisher_yates(&mut shuffled, rng);
    shuffled
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn letters() -> Vec<String> {
        ["A", "B", "C", "D"].iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn empty_and_single_are_unchanged() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(shuffle_options(&[], &mut rng).is_empty());
        assert_eq!(shuffle_options(&["only".to_owned()], &mut rng), vec!["only"]);
    }

    #[test]
    fn same_seed_same_order() {
        let a = shuffle_options(&letters(), &mut StdRng::seed_from_u64(42));
        let b = shuffle_options(&letters(), &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn input_is_not_mutated() {
        let input = letters();
        let _ = shuffle_options(&input, &mut StdRng::seed_from_u64(1));
        assert_eq!(input, letters());
    }

    #[test]
    fn positions_are_roughly_uniform() {
        const TRIALS: usize = 40_000;
        let input = letters();
        let mut rng = StdRng::seed_from_u64(2024);
        // counts[original][position]
        let mut counts = [[0usize; 4]; 4];

        for _ in 0..TRIALS {
            let out = shuffle_options(&input, &mut rng);
            for (pos, item) in out.iter().enumerate() {
                let original = input.iter().position(|x| x == item).unwrap();
                counts[original][pos] += 1;
            }
        }

        let expected = TRIALS / 4;
        for row in counts {
            for count in row {
                let diff = count.abs_diff(expected);
                assert!(
                    diff < expected / 10,
                    "count {count} too far from {expected}"
                );
            }
        }
    }
}
