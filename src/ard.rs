//! Read all inputs of one chunk of a tile.
//!
//! An [`ArdReader`] reads, for a tile chunk, either every
//! acquisition selected by the configuration (reflectance
//! and the auxiliary products of each date), the features,
//! the continuous fields, or the processing mask. Files are
//! read in parallel, each by its own worker; per-file
//! failures are counted and fail the batch as a whole.

use log::{debug, error, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::block::{read_block, ArdKind, BandSelection, BlockRequest};
use crate::brick::{Brick, SampleType};
use crate::config::{HigherLevel, AOD, DST, HOT, VZN, WVP};
use crate::error::{ArdError, ArdResult, Fetch};
use crate::grid::{Grid, TileId};
use crate::listing::{list_ard, list_mask, tile_dir};
use crate::sensor::SensorTable;
use crate::source::RasterOpener;
use crate::stitch::add_blocks;

/// Nodata of reflectance and auxiliary products.
pub const ARD_NODATA: i16 = -9999;
/// Nodata of quality products.
pub const QAI_NODATA: i16 = 1;
/// Nodata of processing masks.
pub const MASK_NODATA: i16 = 255;

/// Bricks of one acquisition, feature or continuous field.
#[derive(Clone, Debug, Default)]
pub struct Ard {
    /// Reflectance (or feature values).
    pub dat: Option<Brick>,
    /// Quality assurance information.
    pub qai: Option<Brick>,
    /// Cloud distance.
    pub dst: Option<Brick>,
    /// Aerosol optical depth.
    pub aod: Option<Brick>,
    /// Haze optimized transformation.
    pub hot: Option<Brick>,
    /// View zenith angle.
    pub vzn: Option<Brick>,
    /// Water vapor.
    pub wvp: Option<Brick>,
}

impl Ard {
    pub fn bricks(&self) -> impl Iterator<Item = &Brick> {
        vec![
            &self.dat, &self.qai, &self.dst, &self.aod, &self.hot, &self.vzn, &self.wvp,
        ]
        .into_iter()
        .flatten()
    }

    /// Bytes read from files; synthetic bands are not
    /// counted.
    pub fn byte_size(&self) -> usize {
        self.bricks().map(Brick::read_size).sum()
    }
}

/// Items read by a batch reader, index aligned with the
/// inputs, and the bytes they hold.
#[derive(Debug)]
pub struct Batch<T> {
    pub items: Vec<T>,
    pub bytes: usize,
}

/// Combine the per-item results of a batch. Any error fails
/// the batch; integrity violations are returned as is.
fn collect_batch<T, F>(results: Vec<ArdResult<T>>, size: F) -> ArdResult<Batch<T>>
where
    T: Send + Sync,
    F: Fn(&T) -> usize + Sync,
{
    let (errors, bytes) = results
        .par_iter()
        .map(|r| match r {
            Ok(item) => (0, size(item)),
            Err(e) => {
                warn!("{}", e);
                (1, 0)
            }
        })
        .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1));

    if errors > 0 {
        if let Some(e) = results
            .into_iter()
            .filter_map(Result::err)
            .find(ArdError::is_fatal)
        {
            error!("{}", e);
            return Err(e);
        }
        return Err(ArdError::Batch { errors });
    }

    let items = results.into_iter().collect::<ArdResult<Vec<_>>>()?;
    Ok(Batch { items, bytes })
}

/// Zero quality brick with the layout of `dat`.
fn blank_qai(dat: &Brick) -> Brick {
    let mut qai = dat.copy_layout(1, SampleType::Short);
    let band = qai.band_mut(0);
    band.synthetic = true;
    band.nodata = QAI_NODATA;
    qai
}

/// Quality brick with the layout of `dat`, the off bit set
/// wherever `is_off` holds for any band read from a file.
pub fn flag_qai<F: Fn(i16) -> bool>(dat: &Brick, is_off: F) -> Brick {
    let mut qai = blank_qai(dat);
    let read: Vec<_> = dat.bands().iter().filter(|b| !b.synthetic).collect();
    let (cols, rows) = dat.dims();
    for i in 0..rows {
        for j in 0..cols {
            if read.iter().any(|b| is_off(b.data().get(i, j))) {
                qai.set_off(i, j);
            }
        }
    }
    qai
}

/// Reads the inputs of tile chunks.
pub struct ArdReader<'a, O> {
    opener: &'a O,
    grid: &'a Grid,
    sensors: &'a SensorTable,
    cfg: &'a HigherLevel,
}

impl<'a, O: RasterOpener> ArdReader<'a, O> {
    pub fn new(
        opener: &'a O,
        grid: &'a Grid,
        sensors: &'a SensorTable,
        cfg: &'a HigherLevel,
    ) -> Self {
        ArdReader {
            opener,
            grid,
            sensors,
            cfg,
        }
    }

    pub fn grid(&self) -> &Grid {
        self.grid
    }

    /// Read a brick, padded with its neighbours when the
    /// configuration asks for a radius.
    fn read_product(&self, req: &BlockRequest) -> ArdResult<Brick> {
        let brick = read_block(self.opener, req)?;
        if self.cfg.stitching() {
            add_blocks(self.opener, req, self.cfg.radius, brick)
        } else {
            Ok(brick)
        }
    }

    fn request<'r>(
        &'r self,
        path: &'r Path,
        kind: ArdKind,
        tile: TileId,
        chunk: usize,
    ) -> BlockRequest<'r> {
        BlockRequest::new(path, kind, self.grid, tile, chunk)
    }

    /// Read every acquisition of the tile selected by the
    /// configuration. The first reflectance brick carries
    /// the provenance of the whole batch.
    pub fn read_ard(&self, tile: TileId, chunk: usize) -> ArdResult<Fetch<Batch<Ard>>> {
        let listing = match list_ard(tile, self.sensors, self.cfg) {
            Fetch::Data(listing) => listing,
            Fetch::Empty => {
                debug!("no datasets in {}, skip", tile);
                return Ok(Fetch::Empty);
            }
        };

        let results: Vec<ArdResult<Ard>> = listing
            .entries()
            .par_iter()
            .map(|name| self.read_date(listing.dir(), name, tile, chunk))
            .collect();
        let mut batch = collect_batch(results, Ard::byte_size)?;

        let provenance: Vec<PathBuf> = batch
            .items
            .iter()
            .skip(1)
            .filter_map(|ard| ard.dat.as_ref())
            .filter_map(|dat| dat.meta().provenance.first().cloned())
            .collect();
        if let Some(first) = batch.items.first_mut().and_then(|ard| ard.dat.as_mut()) {
            first.add_provenance(provenance);
        }

        Ok(Fetch::Data(batch))
    }

    fn read_date(&self, dir: &Path, name: &str, tile: TileId, chunk: usize) -> ArdResult<Ard> {
        let products = &self.cfg.products;
        let mut ard = Ard::default();

        if products.reflectance {
            let path = dir.join(name);
            let req = self
                .request(&path, ArdKind::Reflectance, tile, chunk)
                .with_sensors(self.sensors)
                .with_nodata(ARD_NODATA)
                .with_psf(self.cfg.psf);
            ard.dat = Some(self.read_product(&req)?);
        }

        if products.quality {
            ard.qai = match self.sensors.quality_product() {
                Some(quality) => {
                    let path = self.product_path(dir, name, quality);
                    let req = self
                        .request(&path, ArdKind::Auxiliary, tile, chunk)
                        .with_sensors(self.sensors)
                        .with_bands(BandSelection::single(1))
                        .with_nodata(QAI_NODATA);
                    Some(self.read_product(&req)?)
                }
                None => ard
                    .dat
                    .as_ref()
                    .map(|dat| flag_qai(dat, |v| v == ARD_NODATA)),
            };
        }

        let auxiliary = vec![
            (products.cloud_distance, DST, &mut ard.dst),
            (products.aerosol, AOD, &mut ard.aod),
            (products.haze, HOT, &mut ard.hot),
            (products.view_zenith, VZN, &mut ard.vzn),
            (products.water_vapor, WVP, &mut ard.wvp),
        ];
        for (wanted, product, slot) in auxiliary {
            if !wanted {
                continue;
            }
            let path = self.product_path(dir, name, product);
            let req = self
                .request(&path, ArdKind::Auxiliary, tile, chunk)
                .with_sensors(self.sensors)
                .with_bands(BandSelection::single(1))
                .with_nodata(ARD_NODATA)
                .with_psf(self.cfg.psf);
            *slot = Some(self.read_product(&req)?);
        }

        Ok(ard)
    }

    /// Path of `product` of the acquisition whose main
    /// product is `name`.
    fn product_path(&self, dir: &Path, name: &str, product: &str) -> PathBuf {
        dir.join(name.replacen(self.sensors.main_product(), product, 1))
    }

    /// Read the configured features. Every feature file must
    /// exist in the tile, or there is nothing to do.
    pub fn read_features(&self, tile: TileId, chunk: usize) -> ArdResult<Fetch<Batch<Ard>>> {
        let features = &self.cfg.features;
        let dir = tile_dir(&self.cfg.lower_dir, tile);
        let paths: Vec<PathBuf> = features.iter().map(|f| dir.join(&f.basename)).collect();
        if paths.is_empty() || !self.all_exist(&paths) {
            return Ok(Fetch::Empty);
        }

        let nodata = self.cfg.feature_nodata;
        let results: Vec<ArdResult<Ard>> = features
            .par_iter()
            .zip(&paths)
            .map(|(feature, path)| {
                let req = self
                    .request(path, ArdKind::Feature, tile, chunk)
                    .with_bands(BandSelection::single(feature.band))
                    .with_nodata(nodata)
                    .with_psf(self.cfg.psf);
                let dat = self.read_product(&req)?;
                Ok(Ard {
                    qai: Some(flag_qai(&dat, |v| v == nodata)),
                    dat: Some(dat),
                    ..Default::default()
                })
            })
            .collect();

        Ok(Fetch::Data(collect_batch(results, Ard::byte_size)?))
    }

    /// Read all bands of the configured continuous fields.
    /// Every file must exist in the tile, or there is nothing
    /// to do.
    pub fn read_confield(&self, tile: TileId, chunk: usize) -> ArdResult<Fetch<Batch<Ard>>> {
        let confield = match &self.cfg.confield {
            Some(confield) => confield,
            None => return Ok(Fetch::Empty),
        };
        let dir = tile_dir(&confield.dir, tile);
        let paths: Vec<PathBuf> = confield.files.iter().map(|f| dir.join(f)).collect();
        if paths.is_empty() || !self.all_exist(&paths) {
            return Ok(Fetch::Empty);
        }

        let results: Vec<ArdResult<Ard>> = paths
            .par_iter()
            .map(|path| {
                let req = self
                    .request(path, ArdKind::Feature, tile, chunk)
                    .with_bands(BandSelection::All)
                    .with_nodata(confield.nodata);
                let dat = self.read_product(&req)?;
                Ok(Ard {
                    qai: Some(blank_qai(&dat)),
                    dat: Some(dat),
                    ..Default::default()
                })
            })
            .collect();

        Ok(Fetch::Data(collect_batch(results, Ard::byte_size)?))
    }

    fn all_exist(&self, paths: &[PathBuf]) -> bool {
        match paths.iter().find(|p| !self.opener.exists(p)) {
            Some(missing) => {
                debug!("{} does not exist, skip", missing.display());
                false
            }
            None => true,
        }
    }

    /// Read the processing mask, binarized (`1` is
    /// processed, everything else is `0`).
    ///
    /// Without a configured mask, every pixel is processed
    /// (`Data(None)`). A tile without mask file, or a chunk
    /// without any pixel to process, has nothing to do.
    pub fn read_mask(&self, tile: TileId, chunk: usize) -> ArdResult<Fetch<Option<Brick>>> {
        let mask = match &self.cfg.mask {
            Some(mask) => mask,
            None => return Ok(Fetch::Data(None)),
        };
        let listing = match list_mask(tile, mask) {
            Fetch::Data(listing) => listing,
            Fetch::Empty => {
                debug!("no mask in {}, skip", tile);
                return Ok(Fetch::Empty);
            }
        };

        let path = listing.path(0);
        let req = self
            .request(&path, ArdKind::Mask, tile, chunk)
            .with_bands(BandSelection::single(1))
            .with_nodata(MASK_NODATA)
            .with_sample(SampleType::Small);
        let mut brick = self.read_product(&req)?;

        let valid = match brick.band_mut(0).data_mut().as_small_mut() {
            Some(values) => {
                values.mapv_inplace(|v| if v == 1 { 1 } else { 0 });
                values.iter().filter(|&&v| v == 1).count()
            }
            None => 0,
        };
        if valid == 0 {
            debug!("no valid pixel in mask of chunk {} of {}, skip", chunk, tile);
            return Ok(Fetch::Empty);
        }
        Ok(Fetch::Data(Some(brick)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConField, DateRange, Feature, MaskConfig};
    use crate::date::Date;
    use crate::sensor::tests::landsat_sentinel;
    use crate::testing::{MemOpener, MemRaster};
    use std::fs::{create_dir_all, File};
    use tempdir::TempDir;

    const TILE: TileId = TileId { x: 1, y: 2 };
    const SEN2A: &str = "20180105_LEVEL2_SEN2A_BOA.tif";
    const LND08: &str = "20180612_LEVEL2_LND08_BOA.tif";

    fn grid() -> Grid {
        Grid::builder(10.)
            .with_tile_size(40.)
            .with_chunk_size(20.)
            .build()
            .unwrap()
    }

    struct Fixture {
        tmp: TempDir,
        opener: MemOpener,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                tmp: TempDir::new("ard_reader").unwrap(),
                opener: MemOpener::default(),
            }
        }

        fn root(&self) -> PathBuf {
            self.tmp.path().join("lower")
        }

        /// Create `name` in the tile directory under `root`,
        /// served with `raster`.
        fn add_in(&mut self, root: &Path, name: &str, raster: MemRaster) -> PathBuf {
            let dir = tile_dir(root, TILE);
            create_dir_all(&dir).unwrap();
            let path = dir.join(name);
            File::create(&path).unwrap();
            self.opener.insert(&path, raster);
            path
        }

        fn add(&mut self, name: &str, raster: MemRaster) -> PathBuf {
            let root = self.root();
            self.add_in(&root, name, raster)
        }

        /// Both acquisitions with their quality and cloud
        /// distance products.
        fn with_acquisitions(mut self) -> Self {
            let refl = |bands| {
                MemRaster::from_fn(10., (4, 4), bands, |b, i, j| (b * 100 + i * 4 + j) as i16)
            };
            self.add(SEN2A, refl(7));
            self.add(LND08, refl(4));
            for name in &[SEN2A, LND08] {
                self.add(&name.replace("BOA", "QAI"), MemRaster::constant(10., (4, 4), 1, 8));
                self.add(&name.replace("BOA", "DST"), MemRaster::constant(10., (4, 4), 1, 300));
            }
            self
        }

        fn config(&self) -> HigherLevel {
            HigherLevel::new(
                self.root(),
                DateRange {
                    min: Date::from_ymd(2018, 1, 1).unwrap(),
                    max: Date::from_ymd(2018, 12, 31).unwrap(),
                },
            )
        }
    }

    #[test]
    fn reads_all_acquisitions() {
        let fx = Fixture::new().with_acquisitions();
        let (grid, sensors) = (grid(), landsat_sentinel());
        let mut cfg = fx.config();
        cfg.products.cloud_distance = true;

        let reader = ArdReader::new(&fx.opener, &grid, &sensors, &cfg);
        let batch = reader.read_ard(TILE, 1).unwrap().data().unwrap();
        assert_eq!(batch.items.len(), 2);

        let first = &batch.items[0];
        let dat = first.dat.as_ref().unwrap();
        assert_eq!(dat.band_count(), 5);
        assert_eq!(dat.band(0).sensor, "SEN2A");
        assert_eq!(dat.band(4).data().get(0, 0), 700 + 8);
        assert_eq!(first.qai.as_ref().unwrap().band(0).data().get(1, 1), 8);
        assert_eq!(first.dst.as_ref().unwrap().band(0).data().get(1, 1), 300);
        assert!(first.aod.is_none());

        let second = batch.items[1].dat.as_ref().unwrap();
        assert_eq!(second.band(0).sensor, "LND08");
        assert!(second.band(3).data().values().all(|v| v == ARD_NODATA));

        let provenance: Vec<_> = dat
            .meta()
            .provenance
            .iter()
            .map(|p| p.file_name().unwrap())
            .collect();
        assert_eq!(provenance, [SEN2A, LND08]);
        assert_eq!(second.meta().provenance.len(), 1);

        let expected: usize = batch.items.iter().map(Ard::byte_size).sum();
        assert_eq!(batch.bytes, expected);
        // SEN2A: 5 + 1 + 1 bands, LND08 does not read its
        // synthetic band
        assert_eq!(batch.bytes, (7 + 6) * 8 * 2);
    }

    #[test]
    fn synthetic_quality_flags_nodata() {
        let mut fx = Fixture::new();
        fx.add(
            LND08,
            MemRaster::from_fn(10., (4, 4), 4, |b, i, j| {
                if b == 2 && i == 0 && j == 1 {
                    ARD_NODATA
                } else {
                    100
                }
            }),
        );
        let grid = grid();
        let table = landsat_sentinel();
        let sensors = SensorTable::new(
            table.domains().to_vec(),
            table.sensors().to_vec(),
            "BOA".into(),
            None,
        )
        .unwrap();
        let cfg = fx.config();

        let reader = ArdReader::new(&fx.opener, &grid, &sensors, &cfg);
        let batch = reader.read_ard(TILE, 0).unwrap().data().unwrap();
        let ard = &batch.items[0];
        let dat = ard.dat.as_ref().unwrap();
        assert!(dat.band(3).synthetic);
        assert!(dat.band(3).data().values().all(|v| v == ARD_NODATA));

        let qai = ard.qai.as_ref().unwrap();
        assert_eq!(qai.band_count(), 1);
        assert!(qai.band(0).synthetic);
        assert!(qai.is_off(0, 1));
        assert!(!qai.is_off(0, 0));
        assert!(!qai.is_off(1, 3));

        // neither the synthetic band nor the quality brick
        // were read
        assert_eq!(ard.byte_size(), 4 * 8 * 2);
    }

    #[test]
    fn synthetic_quality_without_synthetic_bands() {
        let mut fx = Fixture::new();
        fx.add(
            "20180105_LEVEL2_SEN2B_BOA.tif",
            MemRaster::from_fn(10., (4, 4), 4, |b, i, j| {
                if b == 2 && i == 0 && j == 1 {
                    ARD_NODATA
                } else {
                    100
                }
            }),
        );
        let grid = grid();
        let table = landsat_sentinel();
        let sensors = SensorTable::new(
            table.domains().to_vec(),
            table.sensors().to_vec(),
            "BOA".into(),
            None,
        )
        .unwrap();
        let cfg = fx.config();

        let reader = ArdReader::new(&fx.opener, &grid, &sensors, &cfg);
        let batch = reader.read_ard(TILE, 0).unwrap().data().unwrap();
        let qai = batch.items[0].qai.as_ref().unwrap();
        assert!(qai.is_off(0, 1));
        assert!(!qai.is_off(0, 0));
        assert!(!qai.is_off(1, 3));
    }

    #[test]
    fn missing_product_fails_batch() {
        let mut fx = Fixture::new().with_acquisitions();
        let (grid, sensors) = (grid(), landsat_sentinel());
        let mut cfg = fx.config();
        cfg.products.aerosol = true;
        fx.add(&SEN2A.replace("BOA", "AOD"), MemRaster::constant(10., (4, 4), 1, 0));

        let reader = ArdReader::new(&fx.opener, &grid, &sensors, &cfg);
        match reader.read_ard(TILE, 0) {
            Err(ArdError::Batch { errors }) => assert_eq!(errors, 1),
            other => panic!("unexpected {:?}", other.map(|f| f.is_empty())),
        }
    }

    #[test]
    fn misaligned_product_is_fatal() {
        let mut fx = Fixture::new().with_acquisitions();
        let (grid, sensors) = (grid(), landsat_sentinel());
        let mut cfg = fx.config();
        cfg.products.water_vapor = true;
        for name in &[SEN2A, LND08] {
            fx.add(&name.replace("BOA", "WVP"), MemRaster::constant(30., (2, 2), 1, 0));
        }

        let reader = ArdReader::new(&fx.opener, &grid, &sensors, &cfg);
        assert!(reader.read_ard(TILE, 0).unwrap_err().is_fatal());
    }

    #[test]
    fn empty_tile_has_nothing_to_do() {
        let fx = Fixture::new();
        let (grid, sensors) = (grid(), landsat_sentinel());
        let cfg = fx.config();
        let reader = ArdReader::new(&fx.opener, &grid, &sensors, &cfg);
        assert!(reader.read_ard(TILE, 0).unwrap().is_empty());
    }

    #[test]
    fn stitched_acquisitions() {
        let fx = Fixture::new().with_acquisitions();
        let (grid, sensors) = (grid(), landsat_sentinel());
        let mut cfg = fx.config();
        cfg.radius = 10.;

        let reader = ArdReader::new(&fx.opener, &grid, &sensors, &cfg);
        let batch = reader.read_ard(TILE, 0).unwrap().data().unwrap();
        for ard in &batch.items {
            for brick in ard.bricks() {
                assert_eq!(brick.dims(), (6, 4));
            }
            let dat = ard.dat.as_ref().unwrap();
            // no neighbouring tiles: left border is nodata,
            // below is chunk 1 of the same tile
            assert_eq!(dat.band(0).data().get(1, 0), ARD_NODATA);
            assert_eq!(dat.band(0).data().get(3, 1), 100 + 8);
        }
    }

    #[test]
    fn features() {
        let mut fx = Fixture::new();
        let (grid, sensors) = (grid(), landsat_sentinel());
        let mut cfg = fx.config();
        cfg.features = vec![
            Feature {
                basename: "NDVI.tif".into(),
                band: 2,
            },
            Feature {
                basename: "EVI.tif".into(),
                band: 1,
            },
        ];

        fx.add(
            "NDVI.tif",
            MemRaster::from_fn(10., (4, 4), 3, |b, i, j| {
                if i == 0 && j == 0 {
                    -9999
                } else {
                    b as i16
                }
            }),
        );
        {
            let reader = ArdReader::new(&fx.opener, &grid, &sensors, &cfg);
            assert!(reader.read_features(TILE, 0).unwrap().is_empty());
        }

        fx.add("EVI.tif", MemRaster::constant(10., (4, 4), 1, 5));
        let reader = ArdReader::new(&fx.opener, &grid, &sensors, &cfg);
        let batch = reader.read_features(TILE, 0).unwrap().data().unwrap();
        assert_eq!(batch.items.len(), 2);

        let ndvi = &batch.items[0];
        let dat = ndvi.dat.as_ref().unwrap();
        assert_eq!(dat.band_count(), 1);
        assert_eq!(dat.band(0).data().get(1, 1), 2);
        let qai = ndvi.qai.as_ref().unwrap();
        assert!(qai.is_off(0, 0));
        assert!(!qai.is_off(0, 1));
        assert_eq!(batch.items[1].dat.as_ref().unwrap().band(0).data().get(0, 0), 5);
        assert_eq!(batch.bytes, 2 * 8 * 2);
    }

    #[test]
    fn continuous_fields() {
        let mut fx = Fixture::new();
        let (grid, sensors) = (grid(), landsat_sentinel());
        let mut cfg = fx.config();

        let root = fx.tmp.path().join("lsp");
        fx.add_in(&root, "LSP.tif", MemRaster::constant(10., (4, 4), 3, 42));
        cfg.confield = Some(ConField {
            dir: root,
            files: vec!["LSP.tif".into()],
            nodata: -9999,
        });

        let reader = ArdReader::new(&fx.opener, &grid, &sensors, &cfg);
        let batch = reader.read_confield(TILE, 1).unwrap().data().unwrap();
        let con = &batch.items[0];
        assert_eq!(con.dat.as_ref().unwrap().band_count(), 3);
        let qai = con.qai.as_ref().unwrap();
        assert!(qai.band(0).data().values().all(|v| v == 0));
        assert_eq!(batch.bytes, 3 * 8 * 2);
    }

    #[test]
    fn processing_mask() {
        let mut fx = Fixture::new();
        let (grid, sensors) = (grid(), landsat_sentinel());
        let mut cfg = fx.config();
        {
            let reader = ArdReader::new(&fx.opener, &grid, &sensors, &cfg);
            assert!(matches!(reader.read_mask(TILE, 0), Ok(Fetch::Data(None))));
        }

        let root = fx.tmp.path().join("mask");
        cfg.mask = Some(MaskConfig {
            dir: root.clone(),
            basename: "mask.tif".into(),
        });
        {
            let reader = ArdReader::new(&fx.opener, &grid, &sensors, &cfg);
            assert!(reader.read_mask(TILE, 0).unwrap().is_empty());
        }

        // chunk 0 holds only zeros, chunk 1 a mix of values
        fx.add_in(
            &root,
            "mask.tif",
            MemRaster::from_fn(10., (4, 4), 1, |_, i, j| if i < 2 { 0 } else { (j % 3) as i16 }),
        );
        let reader = ArdReader::new(&fx.opener, &grid, &sensors, &cfg);
        assert!(reader.read_mask(TILE, 0).unwrap().is_empty());

        let mask = reader.read_mask(TILE, 1).unwrap().data().unwrap().unwrap();
        let values: Vec<i16> = mask.band(0).data().values().take(4).collect();
        assert_eq!(values, [0, 1, 0, 0]);
        assert_eq!(mask.sample_type(), SampleType::Small);
    }
}
