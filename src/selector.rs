use log::debug;

use crate::config::MasteryConfig;
use crate::fact::Fact;
use crate::mastery::MasteryMap;
use crate::random::RandomSource;

/// Picks the next fact to practice.
///
/// Weak facts get `weak_share` of the draws (restricted to the neediest part of the
/// weak list), untested facts the next `untested_share`, and the rest is a uniform
/// review over the whole table. Empty pools fall through to the review branch.
pub fn select_next_fact(
    mastery: &MasteryMap,
    max_number: u32,
    config: &MasteryConfig,
    rng: &mut impl RandomSource,
) -> Fact {
    let needs = mastery.facts_needing_practice(max_number, config);
    let roll = rng.unit();

    if roll < config.weak_share && !needs.weak.is_empty() {
        let pool = &needs.weak[..neediest_pool_len(needs.weak.len(), config)];
        let fact = pick(pool, rng);
        debug!("weak pick {} from pool of {}", fact.key(), pool.len());
        return random_order(fact, rng);
    }

    if roll < config.weak_share + config.untested_share && !needs.untested.is_empty() {
        let fact = pick(&needs.untested, rng);
        debug!("untested pick {} of {}", fact.key(), needs.untested.len());
        return random_order(fact, rng);
    }

    let a = rng.int_inclusive(1, max_number);
    let b = rng.int_inclusive(1, max_number);
    debug!("review pick {a}x{b}");
    Fact::new(a, b)
}

/// `ceil(len / fraction)` with a floor, never more than `len`.
fn neediest_pool_len(len: usize, config: &MasteryConfig) -> usize {
    let share = len.div_ceil(config.neediest_fraction.max(1));
    share.max(config.neediest_floor).min(len)
}

fn pick(pool: &[Fact], rng: &mut impl RandomSource) -> Fact {
    let last = u32::try_from(pool.len() - 1).unwrap_or(u32::MAX);
    let index = rng.int_inclusive(0, last) as usize;
    pool[index.min(pool.len() - 1)]
}

fn random_order(fact: Fact, rng: &mut impl RandomSource) -> Fact {
    if rng.unit() < 0.5 {
        fact
    } else {
        fact.swapped()
    }
}
