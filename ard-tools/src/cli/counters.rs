use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct Counter {
    val: AtomicUsize,
}

impl Counter {
    pub fn load(&self) -> usize {
        self.val.load(Ordering::Acquire)
    }

    pub fn store(&self, val: usize) {
        self.val.store(val, Ordering::Release);
    }

    pub fn fetch_add(&self, inc: usize) -> usize {
        self.val.fetch_add(inc, Ordering::AcqRel)
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.load())
    }
}

/// Outcome counts of the chunks of a run: read, with
/// nothing to do, or failed.
#[derive(Debug)]
pub struct ChunkCounter {
    pub total: Counter,
    pub read: Counter,
    pub empty: Counter,
    pub failed: Counter,
    pub bytes: Counter,
    name: &'static str,
}

impl ChunkCounter {
    pub fn new(name: &'static str) -> Self {
        ChunkCounter {
            total: Default::default(),
            read: Default::default(),
            empty: Default::default(),
            failed: Default::default(),
            bytes: Default::default(),
            name,
        }
    }

    pub fn finished(&self) -> usize {
        self.read.load() + self.empty.load() + self.failed.load()
    }
}

impl fmt::Display for ChunkCounter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: read {}", self.name, self.read.load())?;
        let empty = self.empty.load();
        if empty > 0 {
            write!(f, " (empty {})", empty)?;
        }
        let failed = self.failed.load();
        if failed > 0 {
            write!(f, " (failed {})", failed)?;
        }
        write!(f, " of {}, {:.1} MB.", self.total.load(), megabytes(self.bytes.load()))
    }
}

fn megabytes(bytes: usize) -> f64 {
    bytes as f64 / (1024. * 1024.)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_outcomes() {
        let counter = ChunkCounter::new("chunks");
        counter.total.store(4);
        counter.read.fetch_add(2);
        counter.bytes.fetch_add(3 << 20);
        assert_eq!(counter.to_string(), "chunks: read 2 of 4, 3.0 MB.");

        counter.empty.fetch_add(1);
        counter.failed.fetch_add(1);
        assert_eq!(counter.finished(), 4);
        assert_eq!(
            counter.to_string(),
            "chunks: read 2 (empty 1) (failed 1) of 4, 3.0 MB."
        );
    }
}
