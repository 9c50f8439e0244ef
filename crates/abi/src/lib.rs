pub mod auction;

pub use auction::{ISealedBidAuction, PublicKey};
