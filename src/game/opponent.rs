use rand::Rng;

use super::state::MAX_TAKE;

/// Stones the scripted opponent removes from a pile of `stones_remaining`.
///
/// Leaves a multiple of four whenever it can. From a multiple of four every
/// move loses against perfect play, so it draws uniformly from `1..=3` instead,
/// clamped to what is left. Returns `None` on an empty pile.
pub fn heuristic_take<R: Rng>(stones_remaining: u32, rng: &mut R) -> Option<u32> {
    if stones_remaining == 0 {
        return None;
    }
    let k = stones_remaining % (MAX_TAKE + 1);
    let take = if k != 0 {
        k
    } else {
        rng.random_range(1..=MAX_TAKE)
    };
    Some(take.min(stones_remaining))
}
