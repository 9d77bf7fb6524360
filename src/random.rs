use rand::Rng;
use uuid::Uuid;

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Uniform draw from `[min, max]`, rounded to `places` decimals.
pub fn uniform_rounded(rng: &mut impl Rng, min: f64, max: f64, places: i32) -> f64 {
    round_to(rng.random_range(min..=max), places)
}

/// A version 4 UUID whose random bits come from `rng`, so seeded runs repeat their ids.
pub fn event_id(rng: &mut impl Rng) -> Uuid {
    uuid::Builder::from_random_bytes(rng.random()).into_uuid()
}
