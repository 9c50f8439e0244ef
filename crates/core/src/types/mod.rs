pub mod bid;
pub mod primitives;
pub mod snapshot;

pub use bid::*;
pub use primitives::*;
pub use snapshot::*;
