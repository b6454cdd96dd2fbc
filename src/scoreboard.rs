use serde::Serialize;

use crate::country::{Country, CountryId};
use crate::terrain::TextColor;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreEntry {
    pub rank: usize,
    pub id: CountryId,
    pub name: String,
    pub color: String,
    pub text_color: TextColor,
    pub score: f64,
    pub size: usize,
    pub defeated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryStatus {
    pub id: CountryId,
    pub name: String,
    pub treasury: f64,
    pub size: usize,
    pub growth: f64,
    pub attack: f64,
    pub defense: f64,
    pub develop: f64,
    pub stability: f64,
}

/// Countries ranked by score, highest first. Ties keep roster order.
pub fn standings(countries: &[Country]) -> Vec<ScoreEntry> {
    let mut order: Vec<usize> = (0..countries.len()).collect();
    order.sort_by(|a, b| countries[*b].score.total_cmp(&countries[*a].score));

    order
        .into_iter()
        .enumerate()
        .map(|(position, index)| {
            let country = &countries[index];
            ScoreEntry {
                rank: position + 1,
                id: CountryId::new(index),
                name: country.name().to_string(),
                color: country.color().to_string(),
                text_color: country.text_color(),
                score: country.score,
                size: country.size,
                defeated: country.size == 0,
            }
        })
        .collect()
}

pub fn statuses(countries: &[Country]) -> Vec<CountryStatus> {
    countries
        .iter()
        .enumerate()
        .map(|(index, country)| CountryStatus {
            id: CountryId::new(index),
            name: country.name().to_string(),
            treasury: country.treasury,
            size: country.size,
            growth: country.behaviour.growth,
            attack: country.behaviour.attack,
            defense: country.behaviour.defense,
            develop: country.behaviour.develop,
            stability: country.behaviour.stability,
        })
        .collect()
}
