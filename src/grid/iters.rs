use super::{ChunkWindow, Grid};
use std::{iter::*, ops::Range};

impl<'a> IntoIterator for &'a Grid {
    type Item = ChunkWindow<'a>;
    type IntoIter = Map<Range<usize>, Box<dyn Fn(usize) -> ChunkWindow<'a> + 'a>>;

    fn into_iter(self) -> Self::IntoIter {
        let (count, func) = self.iter_mapper();
        (0..count).map(Box::new(func))
    }
}

impl Grid {
    pub(super) fn iter_mapper<'a>(&'a self) -> (usize, impl Fn(usize) -> ChunkWindow<'a> + 'a) {
        debug_assert!(
            self.chunk_rows > 0 && self.chunk_count * self.chunk_rows == self.tile_pixels,
            "Grid preconditions failed"
        );
        (self.chunk_count, move |i| (self, i, i * self.chunk_rows))
    }

    /// Create an [ `ExactSizeIterator` ] over the chunks of a
    /// tile, top to bottom.
    pub fn chunks(&self) -> impl ExactSizeIterator<Item = ChunkWindow> + '_ {
        let (count, func) = self.iter_mapper();
        (0..count).map(func)
    }
}
