use rand::Rng;
use rand::seq::SliceRandom;

const ADJECTIVES: [&str; 8] = [
    "Cosmic", "Stellar", "Nebula", "Galaxy", "Quantum", "Aurora", "Solar", "Lunar",
];

const NOUNS: [&str; 8] = [
    "Explorer",
    "Wanderer",
    "Voyager",
    "Navigator",
    "Traveler",
    "Seeker",
    "Dreamer",
    "Pioneer",
];

/// Display name such as `StellarVoyager42`, numbered 1..=999.
pub fn generate_username() -> String {
    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("Cosmic");
    let noun = NOUNS.choose(&mut rng).copied().unwrap_or("Explorer");
    let number = rng.gen_range(1..=999);
    format!("{adjective}{noun}{number}")
}
