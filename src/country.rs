use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::grid::TileId;
use crate::rng::RandomSource;
use crate::terrain::{contrasting_text_color, TextColor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CountryId(usize);

impl CountryId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Insertion-ordered set of tiles. Iteration order decides "first found" ties.
#[derive(Debug, Clone, Default)]
pub struct TileSet {
    order: Vec<TileId>,
    members: HashSet<TileId>,
}

impl TileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: TileId) -> bool {
        if !self.members.insert(id) {
            return false;
        }
        self.order.push(id);
        true
    }

    pub fn remove(&mut self, id: TileId) -> bool {
        if !self.members.remove(&id) {
            return false;
        }
        self.order.retain(|member| *member != id);
        true
    }

    pub fn contains(&self, id: TileId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = TileId> + '_ {
        self.order.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<TileId> {
        self.order.clone()
    }
}

impl FromIterator<TileId> for TileSet {
    fn from_iter<I: IntoIterator<Item = TileId>>(iter: I) -> Self {
        let mut set = TileSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

pub const CHANCE_FLOOR: f64 = 0.05;
pub const DEFENSE_CEILING: f64 = 0.5;

/// Behavioural probabilities, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Behaviour {
    pub growth: f64,
    pub attack: f64,
    pub defense: f64,
    pub develop: f64,
    pub stability: f64,
}

impl Behaviour {
    /// Draws growth, attack, defense and develop in that order, then stability.
    pub fn random<R: RandomSource + ?Sized>(rng: &mut R) -> Self {
        let growth = rng.next_f64() / 2.0 + CHANCE_FLOOR;
        let attack = rng.next_f64() / 2.0 + CHANCE_FLOOR;
        let defense = rng.next_f64() / 2.0 + CHANCE_FLOOR;
        let develop = rng.next_f64() / 2.0 + CHANCE_FLOOR;
        let stability = 1.0 - rng.next_f64() / 20.0;
        Self {
            growth,
            attack,
            defense,
            develop,
            stability,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Country {
    name: String,
    color: String,
    text_color: TextColor,
    pub treasury: f64,
    pub score: f64,
    pub size: usize,
    pub(crate) capital: Option<TileId>,
    pub(crate) owned: TileSet,
    pub(crate) border: TileSet,
    pub behaviour: Behaviour,
}

impl Country {
    pub fn new(name: impl Into<String>, color: impl Into<String>, behaviour: Behaviour) -> Self {
        let color = color.into();
        Self {
            name: name.into(),
            text_color: contrasting_text_color(&color),
            color,
            treasury: 0.0,
            score: 0.0,
            size: 1,
            capital: None,
            owned: TileSet::new(),
            border: TileSet::new(),
            behaviour,
        }
    }

    pub fn random<R: RandomSource + ?Sized>(
        name: impl Into<String>,
        color: impl Into<String>,
        rng: &mut R,
    ) -> Self {
        Self::new(name, color, Behaviour::random(rng))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn text_color(&self) -> TextColor {
        self.text_color
    }

    pub fn capital(&self) -> Option<TileId> {
        self.capital
    }

    pub fn owned(&self) -> &TileSet {
        &self.owned
    }

    pub fn border(&self) -> &TileSet {
        &self.border
    }

    pub fn is_defeated(&self) -> bool {
        self.owned.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRandom;

    #[test]
    fn tile_set_keeps_insertion_order() {
        let mut set = TileSet::new();
        for raw in [5, 1, 3] {
            set.insert(TileId::from_raw(raw));
        }
        assert!(!set.insert(TileId::from_raw(1)));
        set.remove(TileId::from_raw(1));
        let order: Vec<u32> = set.iter().map(TileId::raw).collect();
        assert_eq!(order, vec![5, 3]);
        assert!(!set.contains(TileId::from_raw(1)));
    }

    #[test]
    fn random_behaviour_uses_documented_ranges() {
        let mut rng = ScriptedRandom::new([0.0, 1.0, 0.5, 0.2, 1.0]);
        let behaviour = Behaviour::random(&mut rng);
        assert!((behaviour.growth - 0.05).abs() < 1e-12);
        assert!((behaviour.attack - 0.55).abs() < 1e-12);
        assert!((behaviour.defense - 0.30).abs() < 1e-12);
        assert!((behaviour.develop - 0.15).abs() < 1e-12);
        assert!((behaviour.stability - 0.95).abs() < 1e-12);
    }

    #[test]
    fn new_country_derives_text_color() {
        let mut rng = ScriptedRandom::new(Vec::<f64>::new());
        let country = Country::random("Acturt", "#FFFFFF", &mut rng);
        assert_eq!(country.text_color(), TextColor::Black);
        assert_eq!(country.size, 1);
        assert_eq!(country.treasury, 0.0);
        assert!(country.is_defeated());
    }
}
