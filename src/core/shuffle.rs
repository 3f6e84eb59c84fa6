use rand::Rng;

/// Fisher-Yates shuffle into a new vector.
///
/// The caller's slice is left untouched. `rng` is injected so tests can pass
/// a seeded generator; the feed uses OS entropy unless a seed is configured.
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = items.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.gen_range(0..=i);
        shuffled.swap(i, j);
    }
    shuffled
}
