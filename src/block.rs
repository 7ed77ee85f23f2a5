//! Read one chunk of a product file into a [`Brick`].
//!
//! The file may have any resolution whose pixels align with
//! the chunk. Files at the grid resolution are copied,
//! others are resampled by the raster library (nearest
//! neighbour), or reduced with the point spread function
//! when requested and the file is finer than the grid.
//!
//! A request may also cover only a strip along one edge of
//! the chunk (see [`BlockRequest::with_partial`]); this is
//! how [`stitch`](crate::stitch) reads the borders of the
//! neighbouring chunks.

use log::debug;
use std::path::Path;

use crate::brick::{Brick, BrickMeta, SampleType};
use crate::date::Date;
use crate::error::{ArdError, ArdResult, IntegrityError};
use crate::filename::{date_ard, product_ard, sensor_ard};
use crate::geometry::{check_multiple, pixels, RES_TOLERANCE};
use crate::grid::{Grid, TileId};
use crate::psf::{reduce_psf, SCALE};
use crate::sensor::{BandSource, SensorTable};
use crate::source::{RasterOpener, RasterSource};

/// Kind of file read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArdKind {
    /// Reflectance: bands selected through the sensor table.
    Reflectance,
    /// Auxiliary ARD products (quality, cloud distance,..).
    Auxiliary,
    /// User supplied features and continuous fields.
    Feature,
    /// Processing masks.
    Mask,
}

impl ArdKind {
    /// Whether the basename follows the ARD naming scheme.
    pub fn is_ard(self) -> bool {
        matches!(self, ArdKind::Reflectance | ArdKind::Auxiliary)
    }
}

/// Bands to read for the non-reflectance kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BandSelection {
    /// Every band of the file.
    All,
    /// `count` bands starting at the 1-based `first`.
    Range { first: usize, count: usize },
}

impl BandSelection {
    pub fn single(band: usize) -> Self {
        BandSelection::Range {
            first: band,
            count: 1,
        }
    }
}

/// Parameters of [`read_block`].
#[derive(Clone, Debug)]
pub struct BlockRequest<'a> {
    path: &'a Path,
    kind: ArdKind,
    grid: &'a Grid,
    tile: TileId,
    chunk: usize,

    sensors: Option<&'a SensorTable>,
    bands: BandSelection,
    nodata: i16,
    sample: SampleType,
    psf: bool,
    partial: (f64, f64),
}

impl<'a> BlockRequest<'a> {
    /// Read all bands of `chunk` as `i16`, without PSF, with
    /// nodata `-9999`.
    pub fn new(path: &'a Path, kind: ArdKind, grid: &'a Grid, tile: TileId, chunk: usize) -> Self {
        BlockRequest {
            path,
            kind,
            grid,
            tile,
            chunk,
            sensors: None,
            bands: BandSelection::All,
            nodata: -9999,
            sample: SampleType::Short,
            psf: false,
            partial: (0., 0.),
        }
    }

    pub fn with_sensors(mut self, sensors: &'a SensorTable) -> Self {
        self.sensors = Some(sensors);
        self
    }

    /// Ignored for reflectance, whose bands are given by the
    /// sensor table.
    pub fn with_bands(mut self, bands: BandSelection) -> Self {
        self.bands = bands;
        self
    }

    pub fn with_nodata(mut self, nodata: i16) -> Self {
        self.nodata = nodata;
        self
    }

    pub fn with_sample(mut self, sample: SampleType) -> Self {
        self.sample = sample;
        self
    }

    pub fn with_psf(mut self, psf: bool) -> Self {
        self.psf = psf;
        self
    }

    /// Only read a strip of the chunk, `|x|` wide and `|y|`
    /// high (ground units). Negative extents anchor the
    /// strip at the right (bottom) edge. Extents within
    /// [`RES_TOLERANCE`] of zero keep the full chunk.
    pub fn with_partial(mut self, x: f64, y: f64) -> Self {
        self.partial = (x, y);
        self
    }

    /// The same request for another file and chunk.
    pub fn at<'b>(&self, path: &'b Path, chunk: usize) -> BlockRequest<'b>
    where
        'a: 'b,
    {
        BlockRequest {
            path,
            chunk,
            ..self.clone()
        }
    }

    pub fn path(&self) -> &Path {
        self.path
    }
    pub fn kind(&self) -> ArdKind {
        self.kind
    }
    pub fn grid(&self) -> &Grid {
        self.grid
    }
    pub fn tile(&self) -> TileId {
        self.tile
    }
    pub fn chunk(&self) -> usize {
        self.chunk
    }
    pub fn nodata(&self) -> i16 {
        self.nodata
    }
    pub fn sample(&self) -> SampleType {
        self.sample
    }

    /// Requested window as `(width, height, x_off, y_off)`
    /// in ground units relative to the tile origin.
    pub fn window(&self) -> (f64, f64, f64, f64) {
        let grid = self.grid;
        let mut width = grid.tile_size();
        let mut height = grid.chunk_size();
        let mut x_off = 0.;
        let mut y_off = self.chunk as f64 * grid.chunk_size();

        let (px, py) = self.partial;
        if px.abs() > RES_TOLERANCE {
            width = px.abs();
            if px < 0. {
                x_off = grid.tile_size() + px;
            }
        }
        if py.abs() > RES_TOLERANCE {
            height = py.abs();
            if py < 0. {
                y_off += grid.chunk_size() + py;
            }
        }
        (width, height, x_off, y_off)
    }
}

/// Fields of an ARD basename.
struct ArdName<'s> {
    date: Date,
    product: &'s str,
    sensor: usize,
}

fn parse_basename<'s>(
    basename: &'s str,
    sensors: Option<&SensorTable>,
) -> Result<ArdName<'s>, IntegrityError> {
    let fail = |field| IntegrityError::Filename {
        field,
        basename: basename.into(),
    };
    let date = date_ard(basename).ok_or_else(|| fail("date"))?;
    let product = product_ard(basename).ok_or_else(|| fail("product"))?;
    let sensor = match sensors {
        Some(table) => sensor_ard(basename, table).ok_or_else(|| fail("sensor"))?,
        None => 0,
    };
    Ok(ArdName {
        date,
        product,
        sensor,
    })
}

/// One band of the brick to be: where the values come from
/// and the spectral domain it holds (reflectance only).
type BandPlan<'t> = (BandSource, Option<&'t str>);

fn plan_bands<'t, S: RasterSource>(
    req: &BlockRequest<'t>,
    src: &S,
    sensor: usize,
) -> ArdResult<Vec<BandPlan<'t>>> {
    if req.kind == ArdKind::Reflectance {
        let table = req
            .sensors
            .ok_or_else(|| IntegrityError::NoSensorTable(req.path.display().to_string()))?;
        return Ok(table
            .brick_bands(sensor)
            .into_iter()
            .map(|(d, source)| (source, Some(table.domains()[d].as_str())))
            .collect());
    }

    let (first, count) = match req.bands {
        BandSelection::All => (1, src.band_count()),
        BandSelection::Range { first, count } => (first, count),
    };
    Ok((first..first + count)
        .map(|b| (BandSource::Disk(b), None))
        .collect())
}

/// Read the chunk (or strip) described by `req`.
///
/// Integrity violations (window or file resolution not
/// aligned with the grid, malformed ARD basename) are
/// fatal. Failing to open or read the file concerns this
/// file only.
pub fn read_block<O: RasterOpener>(opener: &O, req: &BlockRequest) -> ArdResult<Brick> {
    let grid = req.grid;
    let (width, height, x_off, y_off) = req.window();

    check_multiple("width", width, "resolution", grid.res())?;
    check_multiple("height", height, "resolution", grid.res())?;

    let basename = req
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let name = if req.kind.is_ard() {
        Some(parse_basename(basename, req.sensors)?)
    } else {
        None
    };

    let target = (pixels(width, grid.res()), pixels(height, grid.res()));

    let src = opener.open(req.path).map_err(|cause| ArdError::Open {
        path: req.path.into(),
        cause,
    })?;
    let gt = src.geo_transform().map_err(|cause| ArdError::Open {
        path: req.path.into(),
        cause,
    })?;
    let res_disc = gt[1];

    check_multiple("image width", width, "image resolution", res_disc)?;
    check_multiple("image height", height, "image resolution", res_disc)?;
    check_multiple("image y offset", y_off, "image resolution", res_disc)?;
    check_multiple("image x offset", x_off, "image resolution", res_disc)?;

    let native = (pixels(width, res_disc), pixels(height, res_disc));
    let off = (
        pixels(x_off, res_disc) as isize,
        pixels(y_off, res_disc) as isize,
    );

    let use_psf = req.psf && native.0 * native.1 > target.0 * target.1;
    let read_size = if use_psf { native } else { target };
    debug!(
        "{}: {}x{} pixels @ {:?}, res {} -> {}x{}, res {}{}",
        basename,
        native.0,
        native.1,
        off,
        res_disc,
        target.0,
        target.1,
        grid.res(),
        if use_psf { " (psf)" } else { "" }
    );

    let sensor = name.as_ref().map_or(0, |n| n.sensor);
    let plan = plan_bands(req, &src, sensor)?;

    let mut brick = Brick::allocate(plan.len(), target, req.sample);
    let mut read_buf = vec![req.nodata; read_size.0 * read_size.1];
    let mut psf_buf = if use_psf {
        vec![req.nodata; target.0 * target.1]
    } else {
        vec![]
    };

    for (b, (source, domain)) in plan.iter().enumerate() {
        let data = brick.band_mut(b).data_mut();
        match *source {
            BandSource::Synthetic => data.fill(req.nodata),
            BandSource::Disk(band) => {
                read_buf.iter_mut().for_each(|v| *v = req.nodata);
                src.read_window(band, off, native, read_size, &mut read_buf)
                    .map_err(|cause| ArdError::Read {
                        path: req.path.into(),
                        band,
                        cause,
                    })?;

                if use_psf {
                    psf_buf.iter_mut().for_each(|v| *v = req.nodata);
                    reduce_psf(&read_buf, native, &mut psf_buf, target, req.nodata)?;
                    data.assign_values(&psf_buf);
                } else {
                    data.assign_values(&read_buf);
                }
            }
        }

        let band = brick.band_mut(b);
        band.synthetic = *source == BandSource::Synthetic;
        band.nodata = req.nodata;
        band.scale = SCALE;
        if let Some(name) = &name {
            band.date = name.date;
        }
        if let (Some(table), Some(_)) = (req.sensors, &name) {
            band.sensor = table.sensors()[sensor].code.clone();
        }
        if let Some(domain) = domain {
            band.domain = domain.to_string();
            band.name = domain.to_string();
        }
    }

    let mut geo_transform = gt;
    geo_transform[1] = grid.res();
    geo_transform[5] = -grid.res();

    *brick.meta_mut() = BrickMeta {
        product: name.as_ref().map(|n| n.product.to_string()).unwrap_or_default(),
        sensor_id: sensor,
        tile: req.tile,
        chunk: req.chunk,
        chunk_count: grid.chunk_count(),
        tile_dims: (grid.tile_cols(), grid.tile_rows()),
        chunk_dims: (grid.chunk_cols(), grid.chunk_rows()),
        res: grid.res(),
        geo_transform,
        projection: grid.projection().to_string(),
        provenance: vec![req.path.to_path_buf()],
    };
    Ok(brick)
}
