use rand::seq::SliceRandom;
use rand::Rng;

/// Returns the items in uniformly random order.
pub fn shuffle<T, R>(mut items: Vec<T>, rng: &mut R) -> Vec<T>
where
    R: Rng + ?Sized,
{
    items.shuffle(rng);
    items
}
