use crate::cli::*;
use ard_bricks::error::{ArdResult, Fetch};
use log::warn;
use std::sync::Arc;
use std::thread::JoinHandle;

const PROGRESS_UPDATE_MILLIS: u64 = 500;

/// Spinner counting the outcome of every chunk read by the
/// workers.
pub struct Tracker {
    progress: Arc<Progress<ChunkCounter>>,
    handle: Option<JoinHandle<()>>,
}

impl Tracker {
    pub fn new(units: &'static str, len: usize) -> Self {
        let progress = Arc::new(Progress::new(ChunkCounter::new(units)));
        progress.value.total.store(len);
        let handle = progress
            .clone()
            .spawn_auto_update_thread(std::time::Duration::from_millis(PROGRESS_UPDATE_MILLIS));
        Tracker {
            progress,
            handle: Some(handle),
        }
    }

    /// Count the outcome of one chunk, and the bytes it
    /// holds.
    pub fn record<T>(&self, res: &ArdResult<Fetch<T>>, bytes: usize) {
        let counters = &self.progress.value;
        match res {
            Ok(Fetch::Data(_)) => {
                counters.read.fetch_add(1);
                counters.bytes.fetch_add(bytes);
            }
            Ok(Fetch::Empty) => {
                counters.empty.fetch_add(1);
            }
            Err(_) => {
                counters.failed.fetch_add(1);
            }
        }
    }

    pub fn counters(&self) -> &ChunkCounter {
        &self.progress.value
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.progress.finish();
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                warn!("progress thread panicked!");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ard_bricks::error::ArdError;

    #[test]
    fn records_outcomes() {
        let tracker = Tracker::new("chunks", 3);
        tracker.record(&Ok(Fetch::Data(())), 100);
        tracker.record::<()>(&Ok(Fetch::Empty), 0);
        tracker.record::<()>(&Err(ArdError::Batch { errors: 1 }), 0);

        let counters = tracker.counters();
        assert_eq!(counters.read.load(), 1);
        assert_eq!(counters.empty.load(), 1);
        assert_eq!(counters.failed.load(), 1);
        assert_eq!(counters.bytes.load(), 100);
        assert_eq!(counters.finished(), counters.total.load());
    }
}
