pub mod action;
pub mod status;
pub mod watch;
