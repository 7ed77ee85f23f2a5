//! In-memory raster bricks.
//!
//! A [`Brick`] holds the bands of one chunk of one product
//! file, along with the metadata needed to place the chunk
//! in the grid. Bands are stored as `(rows, cols)` arrays of
//! either `u8` or `i16` samples.

use ndarray::{s, Array2};
use std::path::PathBuf;

use crate::date::Date;
use crate::error::IntegrityError;
use crate::geometry::{transform_from_gdal, GeoTransform, PixelTransform, RasterDims};
use crate::grid::TileId;

/// Bit of the quality band flagging a pixel as unusable.
pub const QAI_OFF: i16 = 1;

/// Sample type of the bands of a brick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleType {
    /// 1-byte unsigned samples (eg. masks).
    Small,
    /// 2-byte signed samples.
    Short,
}

impl SampleType {
    pub fn size(self) -> usize {
        match self {
            SampleType::Small => 1,
            SampleType::Short => 2,
        }
    }
}

/// Pixel buffer of one band.
#[derive(Clone, Debug, PartialEq)]
pub enum BandData {
    Small(Array2<u8>),
    Short(Array2<i16>),
}

impl BandData {
    /// Band of `dims` (`(cols, rows)`) filled with `fill`;
    /// small bands take `fill` narrowed to a byte.
    pub fn filled(sample: SampleType, dims: RasterDims, fill: i16) -> Self {
        let shape = (dims.1, dims.0);
        match sample {
            SampleType::Small => BandData::Small(Array2::from_elem(shape, fill as u8)),
            SampleType::Short => BandData::Short(Array2::from_elem(shape, fill)),
        }
    }

    pub fn sample_type(&self) -> SampleType {
        match self {
            BandData::Small(_) => SampleType::Small,
            BandData::Short(_) => SampleType::Short,
        }
    }

    /// Dimensions as `(cols, rows)`.
    pub fn dims(&self) -> RasterDims {
        let (rows, cols) = match self {
            BandData::Small(a) => a.dim(),
            BandData::Short(a) => a.dim(),
        };
        (cols, rows)
    }

    /// Value at `(row, col)`, widened to `i16`.
    pub fn get(&self, row: usize, col: usize) -> i16 {
        match self {
            BandData::Small(a) => a[(row, col)] as i16,
            BandData::Short(a) => a[(row, col)],
        }
    }

    pub fn as_small(&self) -> Option<&Array2<u8>> {
        match self {
            BandData::Small(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_small_mut(&mut self) -> Option<&mut Array2<u8>> {
        match self {
            BandData::Small(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_short(&self) -> Option<&Array2<i16>> {
        match self {
            BandData::Short(a) => Some(a),
            _ => None,
        }
    }

    /// Iterate the values in row-major order, widened to
    /// `i16`.
    pub fn values(&self) -> Box<dyn Iterator<Item = i16> + '_> {
        match self {
            BandData::Small(a) => Box::new(a.iter().map(|&v| v as i16)),
            BandData::Short(a) => Box::new(a.iter().copied()),
        }
    }

    pub fn fill(&mut self, value: i16) {
        match self {
            BandData::Small(a) => a.fill(value as u8),
            BandData::Short(a) => a.fill(value),
        }
    }

    /// Overwrite the band with row-major `values`. Small
    /// bands narrow the values with `as u8`.
    pub fn assign_values(&mut self, values: &[i16]) {
        match self {
            BandData::Small(a) => a
                .iter_mut()
                .zip(values)
                .for_each(|(d, &v)| *d = v as u8),
            BandData::Short(a) => a.iter_mut().zip(values).for_each(|(d, &v)| *d = v),
        }
    }

    /// Fill the window of `dims` at `off` (`(col, row)`)
    /// with `value`.
    pub fn fill_window(&mut self, off: RasterDims, dims: RasterDims, value: i16) {
        let (c0, r0) = off;
        let window = s![r0..r0 + dims.1, c0..c0 + dims.0];
        match self {
            BandData::Small(a) => a.slice_mut(window).fill(value as u8),
            BandData::Short(a) => a.slice_mut(window).fill(value),
        }
    }

    /// Copy `src` into this band with its upper-left corner
    /// at `off` (`(col, row)`).
    pub fn paste(&mut self, src: &BandData, off: RasterDims) -> Result<(), IntegrityError> {
        let (cols, rows) = src.dims();
        let (dc, dr) = self.dims();
        if off.0 + cols > dc || off.1 + rows > dr {
            return Err(IntegrityError::Grid(format!(
                "strip of {}x{} at {:?} exceeds band of {}x{}",
                cols, rows, off, dc, dr
            )));
        }

        let window = s![off.1..off.1 + rows, off.0..off.0 + cols];
        match (self, src) {
            (BandData::Small(d), BandData::Small(s)) => d.slice_mut(window).assign(s),
            (BandData::Short(d), BandData::Short(s)) => d.slice_mut(window).assign(s),
            (d, s) => {
                return Err(IntegrityError::Grid(format!(
                    "cannot copy {:?} samples into {:?} band",
                    s.sample_type(),
                    d.sample_type()
                )))
            }
        }
        Ok(())
    }
}

/// A band and its metadata.
#[derive(Clone, Debug)]
pub struct Band {
    pub nodata: i16,
    pub scale: f64,
    pub date: Date,
    pub sensor: String,
    pub domain: String,
    pub name: String,
    /// Filled by the reader instead of read from a file.
    pub synthetic: bool,
    data: BandData,
}

impl Band {
    fn with_data(&self, data: BandData) -> Self {
        Band {
            nodata: self.nodata,
            scale: self.scale,
            date: self.date,
            sensor: self.sensor.clone(),
            domain: self.domain.clone(),
            name: self.name.clone(),
            synthetic: self.synthetic,
            data,
        }
    }

    pub fn data(&self) -> &BandData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut BandData {
        &mut self.data
    }
}

/// Metadata shared by the bands of a brick.
///
/// `tile_dims` and `chunk_dims` describe the grid the brick
/// belongs to; a padded brick has larger `chunk_dims`.
#[derive(Clone, Debug, Default)]
pub struct BrickMeta {
    pub product: String,
    pub sensor_id: usize,
    pub tile: TileId,
    pub chunk: usize,
    pub chunk_count: usize,
    pub tile_dims: RasterDims,
    pub chunk_dims: RasterDims,
    pub res: f64,
    /// Geotransform of the tile (origin of the file, pixel
    /// size of the grid).
    pub geo_transform: GeoTransform,
    pub projection: String,
    /// Paths of the files the brick was read from.
    pub provenance: Vec<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct Brick {
    meta: BrickMeta,
    dims: RasterDims,
    sample: SampleType,
    bands: Vec<Band>,
}

impl Brick {
    /// Brick of `band_count` zero-filled bands of `dims`
    /// (`(cols, rows)`).
    pub fn allocate(band_count: usize, dims: RasterDims, sample: SampleType) -> Self {
        let band = Band {
            nodata: 0,
            scale: 1.,
            date: Date::default(),
            sensor: String::new(),
            domain: String::new(),
            name: String::new(),
            synthetic: false,
            data: BandData::filled(sample, (0, 0), 0),
        };
        Brick {
            meta: BrickMeta {
                chunk_dims: dims,
                ..Default::default()
            },
            dims,
            sample,
            bands: (0..band_count)
                .map(|_| band.with_data(BandData::filled(sample, dims, 0)))
                .collect(),
        }
    }

    /// Brick with the metadata of `self` and `band_count`
    /// fresh, zero-filled bands. Band metadata is copied from
    /// the corresponding band of `self` (the last one for
    /// extra bands).
    pub fn copy_layout(&self, band_count: usize, sample: SampleType) -> Self {
        self.copy_layout_sized(band_count, self.dims, sample)
    }

    /// As [`copy_layout`](Self::copy_layout), with bands of
    /// `dims`.
    pub fn copy_layout_sized(
        &self,
        band_count: usize,
        dims: RasterDims,
        sample: SampleType,
    ) -> Self {
        let mut brick = Brick::allocate(band_count, dims, sample);
        brick.meta = self.meta.clone();
        if let Some(last) = self.bands.last() {
            for (b, band) in brick.bands.iter_mut().enumerate() {
                let src = self.bands.get(b).unwrap_or(last);
                *band = src.with_data(BandData::filled(sample, dims, 0));
            }
        }
        brick
    }

    pub fn meta(&self) -> &BrickMeta {
        &self.meta
    }
    pub fn meta_mut(&mut self) -> &mut BrickMeta {
        &mut self.meta
    }

    /// Dimensions of the bands as `(cols, rows)`.
    pub fn dims(&self) -> RasterDims {
        self.dims
    }
    pub fn cells(&self) -> usize {
        self.dims.0 * self.dims.1
    }
    pub fn sample_type(&self) -> SampleType {
        self.sample
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }
    pub fn bands(&self) -> &[Band] {
        &self.bands
    }
    pub fn band(&self, b: usize) -> &Band {
        &self.bands[b]
    }
    pub fn band_mut(&mut self, b: usize) -> &mut Band {
        &mut self.bands[b]
    }

    /// Bytes held by the pixel buffers.
    pub fn byte_size(&self) -> usize {
        self.bands.len() * self.cells() * self.sample.size()
    }

    /// Bytes held by the bands read from files.
    pub fn read_size(&self) -> usize {
        let read = self.bands.iter().filter(|b| !b.synthetic).count();
        read * self.cells() * self.sample.size()
    }

    /// Set the off bit of pixel `(row, col)` in the first
    /// (quality) band.
    pub fn set_off(&mut self, row: usize, col: usize) {
        if let Some(band) = self.bands.first_mut() {
            match &mut band.data {
                BandData::Short(a) => a[(row, col)] |= QAI_OFF,
                BandData::Small(a) => a[(row, col)] |= QAI_OFF as u8,
            }
        }
    }

    pub fn is_off(&self, row: usize, col: usize) -> bool {
        self.bands
            .first()
            .map_or(false, |band| band.data.get(row, col) & QAI_OFF != 0)
    }

    /// Append provenance entries.
    pub fn add_provenance<I: IntoIterator<Item = PathBuf>>(&mut self, paths: I) {
        self.meta.provenance.extend(paths);
    }

    /// Pixel to ground transform of the upper-left pixel of
    /// the brick's buffers, accounting for the chunk offset
    /// in the tile and any padding.
    pub fn chunk_transform(&self) -> PixelTransform {
        let meta = &self.meta;
        let pad = meta.chunk_dims.0.saturating_sub(meta.tile_dims.0) / 2;
        let chunk_rows = if meta.chunk_count > 0 {
            meta.tile_dims.1 / meta.chunk_count
        } else {
            0
        };
        let dx = -(pad as f64);
        let dy = (meta.chunk * chunk_rows) as f64 - pad as f64;
        transform_from_gdal(&meta.geo_transform)
            * PixelTransform::new(1., 0., dx, 0., 1., dy, 0., 0., 1.)
    }
}
