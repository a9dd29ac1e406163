//! Base catch chance as a function of a species' base experience.

const EASY_EXPERIENCE: u32 = 36;
const KINK_EXPERIENCE: u32 = 255;
const HARD_EXPERIENCE: u32 = 608;

const EASY_CHANCE: f64 = 0.79;
const KINK_CHANCE: f64 = 0.30;
const HARD_CHANCE: f64 = 0.08;

/// Piecewise-linear catch chance through three anchors:
/// (36, 0.79), (255, 0.30), (608, 0.08), flat outside them.
pub fn catch_probability(base_experience: u32) -> f64 {
    if base_experience <= EASY_EXPERIENCE {
        return EASY_CHANCE;
    }
    if base_experience >= HARD_EXPERIENCE {
        return HARD_CHANCE;
    }

    let x = base_experience as f64;
    if base_experience <= KINK_EXPERIENCE {
        let t = (x - EASY_EXPERIENCE as f64) / (KINK_EXPERIENCE - EASY_EXPERIENCE) as f64;
        return EASY_CHANCE + (KINK_CHANCE - EASY_CHANCE) * t;
    }

    let t = (x - KINK_EXPERIENCE as f64) / (HARD_EXPERIENCE - KINK_EXPERIENCE) as f64;
    KINK_CHANCE + (HARD_CHANCE - KINK_CHANCE) * t
}
