pub mod plan;
pub mod sync;
pub mod watch;
