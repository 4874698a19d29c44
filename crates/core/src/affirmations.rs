use rand::Rng;
use rand::seq::SliceRandom;

pub const AFFIRMATIONS: [&str; 15] = [
    "You are stronger than you know.",
    "This moment will pass, and peace will return.",
    "Your feelings are valid and temporary.",
    "You have the power to heal and grow.",
    "Tomorrow is a new beginning.",
    "You are not alone in this journey.",
    "Your heart knows the way to peace.",
    "Every ending is a new beginning.",
    "You are worthy of love and happiness.",
    "Trust in your ability to overcome.",
    "You have survived 100% of your worst days.",
    "Your resilience is your superpower.",
    "Healing happens one breath at a time.",
    "You are enough, exactly as you are.",
    "This too shall pass, like clouds in the sky.",
];

pub fn pick_random_affirmation() -> &'static str {
    pick_affirmation(&mut rand::thread_rng())
}

pub fn pick_affirmation(rng: &mut impl Rng) -> &'static str {
    AFFIRMATIONS.choose(rng).copied().unwrap_or(AFFIRMATIONS[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_pick_is_from_list() {
        for _ in 0..100 {
            assert!(AFFIRMATIONS.contains(&pick_random_affirmation()));
        }
    }

    #[test]
    fn test_pick_covers_the_list() {
        let mut rng = StdRng::seed_from_u64(42);
        let seen: HashSet<&str> = (0..2000).map(|_| pick_affirmation(&mut rng)).collect();
        assert_eq!(seen.len(), AFFIRMATIONS.len());
    }
}
