use anyhow::Result;
use tracing::debug;

use crate::{
    decision::{self, Action},
    engine::{System, SystemContext},
    rng::SystemRng,
    world::World,
};

pub const COUNTRIES_STREAM: &str = "countries";

/// Counts of what the countries did during one round.
#[derive(Debug, Clone, Copy, Default)]
struct RoundTally {
    turns: usize,
    skipped: usize,
    shrinks: usize,
    developments: usize,
    attacks: usize,
    expansions: usize,
    reclaims: usize,
}

/// Runs one decision round: every country's turn, in roster order.
#[derive(Debug, Default)]
pub struct CountrySystem;

impl CountrySystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for CountrySystem {
    fn name(&self) -> &str {
        COUNTRIES_STREAM
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let mut tally = RoundTally::default();
        let ids: Vec<_> = world.country_ids().collect();
        for id in ids {
            let outcome = decision::take_turn(world, id, rng);
            tally.turns += 1;
            tally.skipped += usize::from(outcome.skipped);
            tally.shrinks += usize::from(outcome.shrunk);
            tally.developments += usize::from(outcome.developed);
            match outcome.action {
                Some(Action::Attack) => tally.attacks += 1,
                Some(Action::Expand) => tally.expansions += 1,
                Some(Action::Reclaim) => tally.reclaims += 1,
                None => {}
            }
        }

        debug!(
            tick = ctx.tick,
            turns = tally.turns,
            skipped = tally.skipped,
            shrinks = tally.shrinks,
            attacks = tally.attacks,
            expansions = tally.expansions,
            reclaims = tally.reclaims,
            developments = tally.developments,
            "country round complete"
        );
        Ok(())
    }
}
