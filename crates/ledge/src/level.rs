//! # Tile Grid
//!
//! A row-major grid of square tiles. Tile coordinates come from pixel
//! coordinates by floor division by the tile size; queries outside the grid
//! answer [`TileType::NoVal`] instead of failing.

use crate::error::{GameError, GameResult};
use crate::math::Rect;

/// Collision behavior of a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TileType {
    /// Empty space.
    #[default]
    NoVal,
    /// Blocks movement on every side.
    Solid,
    /// Kills on landing (unless standing on it with boots).
    Hazard,
}

/// One grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tile {
    /// Collision behavior.
    pub tile_type: TileType,
    /// Source rectangle in the tileset, for the renderer.
    pub sprite: Rect,
}

impl Tile {
    /// The empty tile returned for out-of-range queries.
    pub const EMPTY: Self = Self {
        tile_type: TileType::NoVal,
        sprite: Rect::new(0, 0, 0, 0),
    };

    /// A tile of the given type with no sprite.
    #[must_use]
    pub const fn of(tile_type: TileType) -> Self {
        Self {
            tile_type,
            sprite: Rect::new(0, 0, 0, 0),
        }
    }
}

/// The level's tile grid.
#[derive(Clone, Debug)]
pub struct Level {
    tiles: Vec<Tile>,
    width: usize,
    height: usize,
    tile_size: i32,
}

impl Level {
    /// Builds a level from rows of tiles.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidLevel`] if the tile size is not positive or the
    /// rows are empty or ragged.
    pub fn new(rows: Vec<Vec<Tile>>, tile_size: i32) -> GameResult<Self> {
        if tile_size <= 0 {
            return Err(GameError::InvalidLevel(format!(
                "tile size must be positive, got {tile_size}"
            )));
        }
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(GameError::InvalidLevel("level has no tiles".into()));
        }
        if let Some(row) = rows.iter().position(|row| row.len() != width) {
            return Err(GameError::InvalidLevel(format!(
                "row {row} has {} tiles, expected {width}",
                rows[row].len()
            )));
        }

        Ok(Self {
            tiles: rows.into_iter().flatten().collect(),
            width,
            height,
            tile_size,
        })
    }

    /// Builds a level from an ASCII map: `#` solid, `^` hazard, anything
    /// else empty. Used by tests and the headless demo.
    ///
    /// # Errors
    ///
    /// As [`Level::new`].
    pub fn from_ascii(map: &str, tile_size: i32) -> GameResult<Self> {
        let rows = map
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.chars()
                    .map(|c| match c {
                        '#' => Tile::of(TileType::Solid),
                        '^' => Tile::of(TileType::Hazard),
                        _ => Tile::EMPTY,
                    })
                    .collect()
            })
            .collect();
        Self::new(rows, tile_size)
    }

    /// Width in tiles.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height in tiles.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Edge length of a tile in pixels.
    #[inline]
    #[must_use]
    pub const fn tile_size(&self) -> i32 {
        self.tile_size
    }

    /// Level size in pixels.
    #[must_use]
    pub fn pixel_size(&self) -> (i32, i32) {
        (
            self.width as i32 * self.tile_size,
            self.height as i32 * self.tile_size,
        )
    }

    /// Tile coordinate containing pixel coordinate `px`.
    #[inline]
    #[must_use]
    pub const fn tile_coord(&self, px: i32) -> i32 {
        px.div_euclid(self.tile_size)
    }

    /// True if `(x, y)` is a tile of the grid.
    #[inline]
    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.slot(x, y).is_some()
    }

    fn slot(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Tile at tile coordinates `(x, y)`; [`Tile::EMPTY`] when out of range.
    #[must_use]
    pub fn tile_at(&self, x: i32, y: i32) -> Tile {
        self.slot(x, y).map_or(Tile::EMPTY, |slot| self.tiles[slot])
    }

    /// Type of the tile at `(x, y)`.
    #[inline]
    #[must_use]
    pub fn type_at(&self, x: i32, y: i32) -> TileType {
        self.tile_at(x, y).tile_type
    }

    /// Replaces the tile at `(x, y)`. Returns `false` when out of range.
    pub fn set_tile_at(&mut self, x: i32, y: i32, tile: Tile) -> bool {
        match self.slot(x, y) {
            Some(slot) => {
                self.tiles[slot] = tile;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = "
....
.#..
^^##
";

    #[test]
    fn test_from_ascii() {
        let level = Level::from_ascii(MAP, 16).unwrap();
        assert_eq!((level.width(), level.height()), (4, 3));
        assert_eq!(level.pixel_size(), (64, 48));
        assert_eq!(level.type_at(1, 1), TileType::Solid);
        assert_eq!(level.type_at(0, 2), TileType::Hazard);
        assert_eq!(level.type_at(0, 0), TileType::NoVal);
    }

    #[test]
    fn test_out_of_range_is_empty() {
        let level = Level::from_ascii(MAP, 16).unwrap();
        assert_eq!(level.type_at(-1, 0), TileType::NoVal);
        assert_eq!(level.type_at(4, 2), TileType::NoVal);
        assert_eq!(level.type_at(0, 3), TileType::NoVal);
    }

    #[test]
    fn test_tile_coord_floors() {
        let level = Level::from_ascii(MAP, 16).unwrap();
        assert_eq!(level.tile_coord(15), 0);
        assert_eq!(level.tile_coord(16), 1);
        assert_eq!(level.tile_coord(-1), -1);
    }

    #[test]
    fn test_set_tile_at() {
        let mut level = Level::from_ascii(MAP, 16).unwrap();
        assert!(level.set_tile_at(0, 0, Tile::of(TileType::Solid)));
        assert_eq!(level.type_at(0, 0), TileType::Solid);
        assert!(!level.set_tile_at(9, 9, Tile::of(TileType::Solid)));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Level::new(vec![], 16).is_err());
        assert!(Level::from_ascii("..\n.", 16).is_err());
        assert!(Level::from_ascii("..", 0).is_err());
    }
}
