use std::convert::TryFrom;

use crate::error::IntegrityError;
use crate::geometry::{check_multiple, pixels};

use super::{Grid, GridConfig};

/// Builder to configure a [`Grid`]. Sizes are validated
/// only in [`build`](GridBuilder::build).
#[derive(Clone, Debug)]
pub struct GridBuilder {
    res: f64,
    tile_size: f64,
    chunk_size: Option<f64>,
    projection: String,
}

/// Constructors
impl Grid {
    /// Start configuring a grid with the given pixel size.
    /// Tile size defaults to a single pixel; the chunk size
    /// defaults to the tile size.
    pub fn builder(res: f64) -> GridBuilder {
        GridBuilder {
            res,
            tile_size: res,
            chunk_size: None,
            projection: String::new(),
        }
    }
}

/// Builder methods to configure the parameters
impl GridBuilder {
    pub fn with_tile_size(mut self, tile_size: f64) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: f64) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    pub fn with_projection<S: Into<String>>(mut self, projection: S) -> Self {
        self.projection = projection.into();
        self
    }

    /// Validate the configuration: resolution positive,
    /// tile and chunk sizes multiples of it, and the tile an
    /// exact stack of chunks.
    pub fn build(self) -> Result<Grid, IntegrityError> {
        if !(self.res > 0.) {
            return Err(IntegrityError::Grid(format!(
                "resolution must be positive, got {}",
                self.res
            )));
        }
        let chunk_size = self.chunk_size.unwrap_or(self.tile_size);
        if !(chunk_size > 0.) || chunk_size > self.tile_size {
            return Err(IntegrityError::Grid(format!(
                "chunk size {} must be within (0, {}]",
                chunk_size, self.tile_size
            )));
        }

        check_multiple("tile size", self.tile_size, "resolution", self.res)?;
        check_multiple("chunk size", chunk_size, "resolution", self.res)?;

        let tile_pixels = pixels(self.tile_size, self.res);
        let chunk_rows = pixels(chunk_size, self.res);
        if tile_pixels % chunk_rows != 0 {
            return Err(IntegrityError::Grid(format!(
                "tile size {} is not a multiple of chunk size {}",
                self.tile_size, chunk_size
            )));
        }

        Ok(Grid {
            res: self.res,
            tile_size: self.tile_size,
            chunk_size,
            projection: self.projection,
            tile_pixels,
            chunk_rows,
            chunk_count: tile_pixels / chunk_rows,
        })
    }
}

impl TryFrom<&GridConfig> for Grid {
    type Error = IntegrityError;

    fn try_from(cfg: &GridConfig) -> Result<Self, Self::Error> {
        Grid::builder(cfg.resolution)
            .with_tile_size(cfg.tile_size)
            .with_chunk_size(cfg.chunk_size)
            .with_projection(cfg.projection.clone())
            .build()
    }
}

/// Getter methods to read the parameters of the grid
impl Grid {
    pub fn res(&self) -> f64 {
        self.res
    }
    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }
    pub fn chunk_size(&self) -> f64 {
        self.chunk_size
    }
    pub fn projection(&self) -> &str {
        &self.projection
    }

    /// Columns of a tile, which is also the columns of a
    /// chunk.
    pub fn tile_cols(&self) -> usize {
        self.tile_pixels
    }
    pub fn tile_rows(&self) -> usize {
        self.tile_pixels
    }

    pub fn chunk_cols(&self) -> usize {
        self.tile_pixels
    }
    pub fn chunk_rows(&self) -> usize {
        self.chunk_rows
    }
    pub fn chunk_cells(&self) -> usize {
        self.chunk_cols() * self.chunk_rows
    }
    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_dims() {
        let grid = Grid::builder(10.)
            .with_tile_size(3000.)
            .with_chunk_size(1000.)
            .build()
            .unwrap();
        assert_eq!(grid.chunk_cols(), 300);
        assert_eq!(grid.chunk_rows(), 100);
        assert_eq!(grid.chunk_count(), 3);
        assert_eq!(grid.tile_rows(), 300);
    }

    #[test]
    fn rejects_non_multiples() {
        assert!(Grid::builder(7.).with_tile_size(3000.).build().is_err());
        assert!(Grid::builder(10.)
            .with_tile_size(3000.)
            .with_chunk_size(995.)
            .build()
            .is_err());
        assert!(Grid::builder(10.)
            .with_tile_size(3000.)
            .with_chunk_size(700.)
            .build()
            .is_err());
        assert!(Grid::builder(0.).build().is_err());
    }

    #[test]
    fn from_config() {
        let cfg = GridConfig {
            resolution: 30.,
            tile_size: 30000.,
            chunk_size: 3000.,
            projection: "EPSG:3035".into(),
        };
        let grid = Grid::try_from(&cfg).unwrap();
        assert_eq!(grid.chunk_count(), 10);
        assert_eq!(grid.projection(), "EPSG:3035");
    }
}
