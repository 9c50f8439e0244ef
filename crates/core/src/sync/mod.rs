pub mod poller;
pub mod reader;
pub mod store;

pub use poller::{Poller, PollerHandle, RefreshTrigger};
pub use reader::StateReader;
pub use store::SnapshotStore;
