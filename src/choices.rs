use std::collections::BTreeSet;

use crate::error::{GameError, Result};
use crate::random::RandomSource;

/// Draw budget for the distractor search.
pub const MAX_DISTRACTOR_DRAWS: u32 = 10_000;

/// Builds `answer_count` shuffled choices: the answer plus plausible wrong products.
pub fn generate_choices(
    correct_answer: u32,
    max_number: u32,
    answer_count: usize,
    rng: &mut impl RandomSource,
) -> Result<Vec<u32>> {
    let max_product = max_number * max_number;
    let needed = answer_count.saturating_sub(1);
    let mut wrong = BTreeSet::new();
    let mut choices = vec![correct_answer];
    let mut draws = 0;

    while wrong.len() < needed {
        if draws >= MAX_DISTRACTOR_DRAWS {
            return Err(GameError::DistractorSpaceExhausted {
                answer: correct_answer,
                max_number,
                attempts: draws,
            });
        }
        draws += 1;

        let candidate = draw_distractor(correct_answer, max_number, max_product, rng);
        if let Some(value) = validate(candidate, correct_answer, max_product) {
            if wrong.insert(value) {
                choices.push(value);
            }
        }
    }

    shuffle(&mut choices, rng);
    Ok(choices)
}

fn draw_distractor(
    correct_answer: u32,
    max_number: u32,
    max_product: u32,
    rng: &mut impl RandomSource,
) -> i64 {
    let strategy = rng.unit();

    if strategy < 0.4 {
        // Off by a little
        let offset = rng.int_inclusive(1, 8) as i64;
        let sign = if rng.unit() < 0.5 { 1 } else { -1 };
        return correct_answer as i64 + sign * offset;
    }

    if strategy < 0.7 {
        // Neighbouring fact
        let a = rng.int_inclusive(1, max_number) as i64;
        let b = rng.int_inclusive(1, max_number) as i64;
        return a * b;
    }

    rng.int_inclusive(1, max_product) as i64
}

fn validate(candidate: i64, correct_answer: u32, max_product: u32) -> Option<u32> {
    if candidate <= 0 || candidate > max_product as i64 || candidate == correct_answer as i64 {
        return None;
    }
    u32::try_from(candidate).ok()
}

/// Fisher-Yates.
pub fn shuffle<T>(items: &mut [T], rng: &mut impl RandomSource) {
    for i in (1..items.len()).rev() {
        let j = rng.int_inclusive(0, i as u32) as usize;
        items.swap(i, j);
    }
}
