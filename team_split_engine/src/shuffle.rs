use crate::random::RandomSource;

/// Returns a shuffled copy of `items` (Fisher-Yates). The draws happen for
/// `index = len - 1` down to `1`, one per position, each picking a swap
/// partner in `0..=index`.
pub fn fisher_yates_shuffle<T, R>(items: &[T], random: &mut R) -> Vec<T>
where
    T: Clone,
    R: RandomSource + ?Sized,
{
    let mut result = items.to_vec();
    for index in (1..result.len()).rev() {
        let swap_index = random.next_index(index + 1);
        result.swap(index, swap_index);
    }
    result
}
