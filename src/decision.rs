//! One country's turn: shrink on capital loss, tax, drift, develop, then a
//! single attack/expand/reclaim action.
//!
//! The order of draws taken from the [`RandomSource`] is part of the
//! contract; replaying a seed reproduces every outcome.

use serde::Serialize;
use tracing::{debug, info};

use crate::country::{Behaviour, CountryId, CHANCE_FLOOR, DEFENSE_CEILING};
use crate::grid::TileId;
use crate::rng::RandomSource;
use crate::tile::{Building, DEVELOPMENT_CAP};
use crate::world::World;

pub const ATTACK_COST_PER_TILE: f64 = 2.0;
pub const EXPAND_COST_PER_TILE: f64 = 4.0;
pub const RECLAIM_COST_PER_TILE: f64 = 8.0;
pub const DEVELOP_COST: f64 = 0.0;
pub const RECLAIMED_DEVELOPMENT: f64 = 2.0;

const POLICY_DRIFT: f64 = 0.05;
const STABILITY_DRIFT: f64 = 0.0005;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Attack,
    Expand,
    Reclaim,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TurnOutcome {
    pub skipped: bool,
    pub shrunk: bool,
    pub developed: bool,
    pub action: Option<Action>,
}

pub fn take_turn<R: RandomSource + ?Sized>(
    world: &mut World,
    country: CountryId,
    rng: &mut R,
) -> TurnOutcome {
    if world.country(country).owned().is_empty() {
        world.country_mut(country).size = 0;
        return TurnOutcome {
            skipped: true,
            ..TurnOutcome::default()
        };
    }

    let mut outcome = TurnOutcome::default();
    if world.capital_lost(country) {
        outcome.shrunk = shrink(world, country, rng);
    }

    collect_taxes(world, country);
    drift(&mut world.country_mut(country).behaviour, rng);
    outcome.developed = develop(world, country, rng);

    outcome.action = if attack(world, country, rng) {
        Some(Action::Attack)
    } else if expand(world, country, rng) {
        Some(Action::Expand)
    } else if reclaim(world, country) {
        Some(Action::Reclaim)
    } else {
        None
    };

    record_standing(world, country);
    outcome
}

pub fn collect_taxes(world: &mut World, country: CountryId) {
    let taxes = world.total_prosperity(country);
    world.country_mut(country).treasury += taxes;
}

/// Governmental drift of the behavioural probabilities.
pub fn drift<R: RandomSource + ?Sized>(behaviour: &mut Behaviour, rng: &mut R) {
    if rng.next_f64() > behaviour.stability {
        let mut nudge = |value: f64, ceiling: f64| {
            let delta = rng.next_f64() * (2.0 * POLICY_DRIFT) - POLICY_DRIFT;
            (value + delta).clamp(CHANCE_FLOOR, ceiling)
        };
        behaviour.growth = nudge(behaviour.growth, 1.0);
        behaviour.attack = nudge(behaviour.attack, 1.0);
        behaviour.defense = nudge(behaviour.defense, DEFENSE_CEILING);
        behaviour.develop = nudge(behaviour.develop, 1.0);
    }

    let delta = rng.next_f64() * (2.0 * STABILITY_DRIFT) - STABILITY_DRIFT;
    behaviour.stability = (behaviour.stability + delta).clamp(0.0, 1.0);
}

pub fn develop<R: RandomSource + ?Sized>(
    world: &mut World,
    country: CountryId,
    rng: &mut R,
) -> bool {
    let candidates: Vec<TileId> = world
        .country(country)
        .owned()
        .iter()
        .filter(|tile| {
            let tile = world.tile(*tile);
            tile.is_traversable() && tile.development() < DEVELOPMENT_CAP
        })
        .collect();
    if candidates.is_empty() || world.country(country).treasury < DEVELOP_COST {
        return false;
    }
    if world.country(country).behaviour.develop <= rng.next_f64() {
        return false;
    }

    let mut best = candidates[0];
    for tile in &candidates[1..] {
        if world.tile(*tile).prosperity() > world.tile(best).prosperity() {
            best = *tile;
        }
    }
    world.develop_tile(best);
    world.country_mut(country).treasury -= DEVELOP_COST;
    true
}

pub fn attack<R: RandomSource + ?Sized>(
    world: &mut World,
    country: CountryId,
    rng: &mut R,
) -> bool {
    let attacker = world.country(country);
    let cost = ATTACK_COST_PER_TILE * attacker.size as f64;
    let targets: Vec<TileId> = attacker
        .border()
        .iter()
        .filter(|tile| world.tile(*tile).owner().is_some())
        .collect();
    if targets.is_empty() || attacker.treasury < cost {
        return false;
    }
    if attacker.behaviour.attack <= rng.next_f64() {
        return false;
    }

    let Some(target) = closest_to_capital(world, country, &targets) else {
        return false;
    };
    let Some(defender_id) = world.tile(target).owner() else {
        return false;
    };

    let defender = world.country_mut(defender_id);
    let defense_cost = defender.size as f64;
    let mut defense_bonus = 0.0;
    if defender.treasury > defense_cost {
        defender.treasury -= defense_cost;
        defense_bonus = defender.behaviour.defense;
    }

    if defense_bonus + world.tile(target).development() / 8.0 < rng.next_f64() {
        world.transfer_tile(country, target);
        world.country_mut(country).treasury -= cost;
        debug!(
            attacker = world.country(country).name(),
            defender = world.country(defender_id).name(),
            tile = target.raw(),
            "attack succeeded"
        );
        report_if_defeated(world, defender_id);
        return true;
    }
    false
}

pub fn expand<R: RandomSource + ?Sized>(
    world: &mut World,
    country: CountryId,
    rng: &mut R,
) -> bool {
    let expander = world.country(country);
    let cost = EXPAND_COST_PER_TILE * expander.size as f64;
    let candidates = unclaimed_border(world, country);
    if candidates.is_empty() || expander.treasury < cost {
        return false;
    }
    if expander.behaviour.growth <= rng.next_f64() {
        return false;
    }

    let mut best = candidates[0];
    let mut best_prosperity = world.prosperity_for(best, Some(country));
    for tile in &candidates[1..] {
        let prosperity = world.prosperity_for(*tile, Some(country));
        if prosperity > best_prosperity {
            best = *tile;
            best_prosperity = prosperity;
        }
    }

    world.gain_tile(country, best);
    world.country_mut(country).treasury -= cost;
    true
}

/// Builds a dock on the nearest border tile once no free land borders the country.
pub fn reclaim(world: &mut World, country: CountryId) -> bool {
    let cost = RECLAIM_COST_PER_TILE * world.country(country).size as f64;
    if !unclaimed_border(world, country).is_empty() || world.country(country).treasury < cost {
        return false;
    }

    let border = world.country(country).border().to_vec();
    let Some(target) = closest_to_capital(world, country, &border) else {
        return false;
    };

    let previous = world.tile(target).owner();
    world.add_building(target, Building::Dock);
    world.set_development(target, RECLAIMED_DEVELOPMENT);
    world.transfer_tile(country, target);
    world.country_mut(country).treasury -= cost;
    debug!(
        country = world.country(country).name(),
        tile = target.raw(),
        "reclaimed land"
    );
    if let Some(previous) = previous.filter(|previous| *previous != country) {
        report_if_defeated(world, previous);
    }
    true
}

/// Capital-loss penalty: may release the least prosperous owned tile.
pub fn shrink<R: RandomSource + ?Sized>(
    world: &mut World,
    country: CountryId,
    rng: &mut R,
) -> bool {
    if rng.next_f64() <= world.country(country).behaviour.defense {
        return false;
    }

    let owned = world.country(country).owned().to_vec();
    let mut weakest: Option<(TileId, f64)> = None;
    for tile in owned {
        let prosperity = world.refresh_prosperity(tile);
        if weakest.map_or(true, |(_, lowest)| prosperity < lowest) {
            weakest = Some((tile, prosperity));
        }
    }

    let Some((tile, _)) = weakest else {
        return false;
    };
    world.lose_tile(country, tile);
    debug!(
        country = world.country(country).name(),
        tile = tile.raw(),
        "shrank after losing capital"
    );
    report_if_defeated(world, country);
    true
}

/// Size and the score high-water mark.
pub fn record_standing(world: &mut World, country: CountryId) {
    let total = world.total_prosperity(country);
    let entry = world.country_mut(country);
    entry.size = entry.owned().len();
    entry.score = entry.score.max(total);
}

fn report_if_defeated(world: &World, country: CountryId) {
    let country = world.country(country);
    if country.is_defeated() {
        info!(country = country.name(), date = %world.calendar(), "country defeated");
    }
}

fn unclaimed_border(world: &World, country: CountryId) -> Vec<TileId> {
    world
        .country(country)
        .border()
        .iter()
        .filter(|tile| {
            let tile = world.tile(*tile);
            tile.is_traversable() && tile.is_unclaimed()
        })
        .collect()
}

/// First tile with the minimum distance to the capital.
fn closest_to_capital(world: &World, country: CountryId, tiles: &[TileId]) -> Option<TileId> {
    tiles.iter().copied().min_by(|a, b| {
        world
            .distance_to_capital(country, *a)
            .total_cmp(&world.distance_to_capital(country, *b))
    })
}
