//! Terrain catalog and the text-contrast helper used for country labels.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    DeepWater,
    Water,
    Beach,
    Grass,
    Hill,
    Mountain,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainInfo {
    pub name: &'static str,
    pub rank: u8,
    pub traversable: bool,
    pub prosperity_factor: f64,
    pub color: &'static str,
}

/// Indexed by elevation rank.
pub const TERRAINS: [TerrainInfo; 6] = [
    TerrainInfo {
        name: "DeepWater",
        rank: 0,
        traversable: false,
        prosperity_factor: 1.5,
        color: "#255859",
    },
    TerrainInfo {
        name: "Water",
        rank: 1,
        traversable: false,
        prosperity_factor: 1.0,
        color: "#5f999b",
    },
    TerrainInfo {
        name: "Beach",
        rank: 2,
        traversable: true,
        prosperity_factor: 3.0,
        color: "#f8cd6e",
    },
    TerrainInfo {
        name: "Grass",
        rank: 3,
        traversable: true,
        prosperity_factor: 4.0,
        color: "#899d5e",
    },
    TerrainInfo {
        name: "Hill",
        rank: 4,
        traversable: true,
        prosperity_factor: 3.0,
        color: "#76583f",
    },
    TerrainInfo {
        name: "Mountain",
        rank: 5,
        traversable: false,
        prosperity_factor: 2.0,
        color: "#dddddd",
    },
];

pub const MAX_ELEVATION: f64 = 5.0;

impl TerrainKind {
    pub const ALL: [TerrainKind; 6] = [
        TerrainKind::DeepWater,
        TerrainKind::Water,
        TerrainKind::Beach,
        TerrainKind::Grass,
        TerrainKind::Hill,
        TerrainKind::Mountain,
    ];

    pub fn info(self) -> &'static TerrainInfo {
        &TERRAINS[self as usize]
    }

    pub fn from_rank(rank: u8) -> Option<Self> {
        Self::ALL.get(rank as usize).copied()
    }

    /// Case-insensitive lookup, e.g. `"grass"` or `"DeepWater"`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Kind for a rounded elevation; out-of-range values clamp to the ends.
    pub fn from_elevation(elevation: f64) -> Self {
        let rank = elevation.round().clamp(0.0, MAX_ELEVATION) as u8;
        Self::ALL[rank as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn rank(self) -> u8 {
        self.info().rank
    }

    pub fn is_traversable(self) -> bool {
        self.info().traversable
    }

    pub fn prosperity_factor(self) -> f64 {
        self.info().prosperity_factor
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextColor {
    Black,
    White,
}

/// Foreground colour readable on top of a `#rrggbb` background.
pub fn contrasting_text_color(background: &str) -> TextColor {
    let Some((r, g, b)) = parse_hex_color(background) else {
        return TextColor::White;
    };
    let brightness = (r * 299 + g * 587 + b * 114) as f64 / 1000.0;
    if brightness > 128.0 {
        TextColor::Black
    } else {
        TextColor::White
    }
}

fn parse_hex_color(value: &str) -> Option<(u32, u32, u32)> {
    let hex = value.strip_prefix('#')?;
    if hex.len() < 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u32::from_str_radix(&hex[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
