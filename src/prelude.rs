pub use crate::{Error, Result};

pub use crate::ard::*;
pub use crate::block::*;
pub use crate::brick::*;
pub use crate::config::*;
pub use crate::date::*;
pub use crate::error::*;
pub use crate::geometry::*;
pub use crate::grid::*;
pub use crate::listing::*;
pub use crate::sensor::*;
pub use crate::source::*;
pub use crate::stitch::*;
