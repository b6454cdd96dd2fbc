use tracing::debug;

use crate::calendar::Calendar;
use crate::country::{Country, CountryId, TileSet};
use crate::grid::{Grid, TileId, TilePos};
use crate::terrain::TerrainKind;
use crate::tile::{Building, OwnedContext, Tile};

/// The shared simulation state: the tile grid, the country roster and the date.
#[derive(Debug, Clone)]
pub struct World {
    grid: Grid,
    countries: Vec<Country>,
    calendar: Calendar,
}

impl World {
    /// A flat deep-water world, ready for the generator to raise terrain.
    pub fn new(width: u32, height: u32, calendar: Calendar) -> Self {
        Self::from_grid(Grid::new(width, height, 0.0), calendar)
    }

    pub fn from_grid(grid: Grid, calendar: Calendar) -> Self {
        Self {
            grid,
            countries: Vec::new(),
            calendar,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn tile(&self, id: TileId) -> &Tile {
        self.grid.tile(id)
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn calendar_mut(&mut self) -> &mut Calendar {
        &mut self.calendar
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn country_ids(&self) -> impl Iterator<Item = CountryId> {
        (0..self.countries.len()).map(CountryId::new)
    }

    pub fn country(&self, id: CountryId) -> &Country {
        &self.countries[id.index()]
    }

    pub fn country_mut(&mut self, id: CountryId) -> &mut Country {
        &mut self.countries[id.index()]
    }

    pub fn add_country(&mut self, country: Country) -> CountryId {
        self.countries.push(country);
        CountryId::new(self.countries.len() - 1)
    }

    /// Adds `country` to the roster with `capital` as its first tile.
    pub fn found_country(&mut self, country: Country, capital: TileId) -> CountryId {
        let id = self.add_country(country);
        self.country_mut(id).capital = Some(capital);
        self.transfer_tile(id, capital);
        id
    }

    /// 1 + distance from the capital, or 0 while the country has none.
    pub fn distance_to_capital(&self, country: CountryId, tile: TileId) -> f64 {
        match self.country(country).capital {
            Some(capital) => self.grid.distance(capital, tile) + 1.0,
            None => 0.0,
        }
    }

    pub fn capital_lost(&self, country: CountryId) -> bool {
        match self.country(country).capital {
            Some(capital) => self.grid.tile(capital).owner != Some(country),
            None => false,
        }
    }

    /// Neighbours of `tile` owned by `country`, counted with multiplicity.
    pub fn owned_neighbours(&self, country: CountryId, tile: TileId) -> usize {
        self.grid
            .neighbours(tile)
            .iter()
            .filter(|neighbour| self.grid.tile(**neighbour).owner == Some(country))
            .count()
    }

    /// Prosperity `tile` would have under `owner`, without storing it.
    pub fn prosperity_for(&self, tile: TileId, owner: Option<CountryId>) -> f64 {
        let context = owner.map(|country| OwnedContext {
            distance_to_capital: self.distance_to_capital(country, tile),
            owned_neighbours: self.owned_neighbours(country, tile),
        });
        self.grid.tile(tile).prosperity_with(context)
    }

    pub fn refresh_prosperity(&mut self, tile: TileId) -> f64 {
        let owner = self.grid.tile(tile).owner;
        let prosperity = self.prosperity_for(tile, owner);
        self.grid.tile_mut(tile).prosperity = prosperity;
        prosperity
    }

    /// Sum of the stored prosperity of every owned tile.
    pub fn total_prosperity(&self, country: CountryId) -> f64 {
        self.country(country)
            .owned
            .iter()
            .map(|tile| self.grid.tile(tile).prosperity)
            .sum()
    }

    pub fn set_development(&mut self, tile: TileId, development: f64) {
        self.grid.tile_mut(tile).set_development(development);
        self.refresh_prosperity(tile);
    }

    pub fn add_building(&mut self, tile: TileId, building: Building) {
        self.grid.tile_mut(tile).add_building(building);
        self.refresh_prosperity(tile);
    }

    pub(crate) fn set_elevation(&mut self, tile: TileId, elevation: f64) {
        self.grid.tile_mut(tile).set_elevation(elevation);
        self.refresh_prosperity(tile);
    }

    pub(crate) fn develop_tile(&mut self, tile: TileId) {
        self.grid.tile_mut(tile).develop();
        self.refresh_prosperity(tile);
    }

    /// Incremental gain: only the new tile's neighbours join the border.
    pub fn gain_tile(&mut self, country: CountryId, tile: TileId) {
        self.grid.tile_mut(tile).owner = Some(country);
        self.refresh_prosperity(tile);

        let grid = &self.grid;
        let entry = &mut self.countries[country.index()];
        entry.border.remove(tile);
        entry.owned.insert(tile);
        for neighbour in grid.neighbours(tile) {
            if grid.tile(*neighbour).owner != Some(country) {
                entry.border.insert(*neighbour);
            }
        }
    }

    /// Release followed by a full rescan of the country's owned and border sets.
    pub fn lose_tile(&mut self, country: CountryId, tile: TileId) {
        if self.grid.tile(tile).owner == Some(country) {
            self.grid.tile_mut(tile).owner = None;
        }
        self.refresh_prosperity(tile);
        self.country_mut(country).owned.remove(tile);
        self.refresh_country(country);
    }

    /// Gain `tile` for `country`, releasing it from any previous owner first.
    pub fn transfer_tile(&mut self, country: CountryId, tile: TileId) {
        if let Some(previous) = self.grid.tile(tile).owner {
            if previous != country {
                self.lose_tile(previous, tile);
            }
        }
        self.gain_tile(country, tile);
    }

    /// Rebuilds owned (grid order) and border sets from tile ownership.
    pub fn refresh_country(&mut self, country: CountryId) {
        let owned: TileSet = self
            .grid
            .tiles()
            .filter(|(_, tile)| tile.owner == Some(country))
            .map(|(id, _)| id)
            .collect();
        let border: TileSet = owned
            .iter()
            .flat_map(|tile| self.grid.neighbours(tile).iter().copied())
            .filter(|neighbour| !owned.contains(*neighbour))
            .collect();

        let entry = self.country_mut(country);
        entry.owned = owned;
        entry.border = border;
    }

    pub fn refresh_all(&mut self) {
        for index in 0..self.countries.len() {
            self.refresh_country(CountryId::new(index));
        }
    }

    /// Manual terraforming. Returns `false` for a position off the grid.
    pub fn paint_terrain(&mut self, pos: TilePos, kind: TerrainKind) -> bool {
        let Some(tile) = self.grid.pos_to_id(pos) else {
            return false;
        };
        self.grid.tile_mut(tile).paint(kind, kind.rank() as f64);
        self.refresh_prosperity(tile);
        if !kind.is_traversable() {
            if let Some(owner) = self.grid.tile(tile).owner {
                self.lose_tile(owner, tile);
            }
        }
        self.refresh_all();
        debug!(x = pos.x, y = pos.y, terrain = kind.name(), "terraformed tile");
        true
    }

    /// Terraforming by terrain name; unknown names are ignored.
    pub fn terraform(&mut self, pos: TilePos, kind_name: &str) -> bool {
        match TerrainKind::from_name(kind_name) {
            Some(kind) => self.paint_terrain(pos, kind),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::country::Behaviour;

    fn behaviour() -> Behaviour {
        Behaviour {
            growth: 0.5,
            attack: 0.5,
            defense: 0.5,
            develop: 0.5,
            stability: 1.0,
        }
    }

    fn grass_world(width: u32, height: u32) -> World {
        World::from_grid(Grid::new(width, height, 3.0), Calendar::default())
    }

    fn at(world: &World, x: u32, y: u32) -> TileId {
        world.grid().pos_to_id(TilePos { x, y }).unwrap()
    }

    #[test]
    fn gain_extends_border_with_new_neighbours() {
        let mut world = grass_world(5, 3);
        let capital = at(&world, 2, 1);
        let id = world.found_country(Country::new("A", "#C53030", behaviour()), capital);
        assert_eq!(world.country(id).border().len(), 4);

        let east = at(&world, 3, 1);
        world.gain_tile(id, east);
        let country = world.country(id);
        assert_eq!(country.owned().len(), 2);
        assert!(!country.border().contains(east));
        assert_eq!(country.border().len(), 6);
    }

    #[test]
    fn lose_rescans_owned_and_border() {
        let mut world = grass_world(5, 3);
        let capital = at(&world, 2, 1);
        let id = world.found_country(Country::new("A", "#C53030", behaviour()), capital);
        let east = at(&world, 3, 1);
        world.gain_tile(id, east);

        world.lose_tile(id, east);
        let country = world.country(id);
        assert_eq!(country.owned().to_vec(), vec![capital]);
        assert_eq!(country.border().len(), 4);
        assert!(world.tile(east).is_unclaimed());
    }

    #[test]
    fn transfer_releases_previous_owner() {
        let mut world = grass_world(5, 3);
        let a = world.found_country(Country::new("A", "#C53030", behaviour()), at(&world, 1, 1));
        let b = world.found_country(Country::new("B", "#3182CE", behaviour()), at(&world, 3, 1));
        let contested = at(&world, 2, 1);
        world.gain_tile(b, contested);

        world.transfer_tile(a, contested);
        assert_eq!(world.tile(contested).owner(), Some(a));
        assert!(!world.country(b).owned().contains(contested));
        assert!(world.country(b).border().contains(contested));
    }

    #[test]
    fn prosperity_uses_owner_formula() {
        let mut world = grass_world(5, 3);
        let capital = at(&world, 2, 1);
        let id = world.found_country(Country::new("A", "#C53030", behaviour()), capital);
        // 4 * 0.1 / 5 - 1/25 + 0/100
        assert!((world.tile(capital).prosperity() - 0.04).abs() < 1e-12);

        let free = at(&world, 0, 0);
        assert!((world.tile(free).prosperity() - 0.4).abs() < 1e-12);
        assert!(world.prosperity_for(free, Some(id)) < world.tile(free).prosperity());
    }

    #[test]
    fn terraforming_to_water_releases_owner() {
        let mut world = grass_world(5, 3);
        let capital = at(&world, 2, 1);
        let id = world.found_country(Country::new("A", "#C53030", behaviour()), capital);
        let east = at(&world, 3, 1);
        world.gain_tile(id, east);
        world.set_development(east, 3.0);

        assert!(world.terraform(TilePos { x: 3, y: 1 }, "water"));
        let tile = world.tile(east);
        assert_eq!(tile.terrain(), TerrainKind::Water);
        assert!(tile.is_unclaimed());
        assert_eq!(tile.development(), crate::tile::INITIAL_DEVELOPMENT);
        assert_eq!(world.country(id).owned().len(), 1);
    }

    #[test]
    fn unknown_terrain_is_a_no_op() {
        let mut world = grass_world(3, 3);
        let before = world.tile(at(&world, 1, 1)).terrain();
        assert!(!world.terraform(TilePos { x: 1, y: 1 }, "lava"));
        assert!(!world.terraform(TilePos { x: 9, y: 9 }, "grass"));
        assert_eq!(world.tile(at(&world, 1, 1)).terrain(), before);
    }

    #[test]
    fn missing_capital_means_zero_distance() {
        let mut world = grass_world(3, 3);
        let id = world.add_country(Country::new("A", "#C53030", behaviour()));
        assert_eq!(world.distance_to_capital(id, at(&world, 2, 2)), 0.0);
        assert!(!world.capital_lost(id));
    }
}
