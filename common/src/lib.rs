pub mod chart;
pub mod config;
pub mod parse;
pub mod plot;
pub mod times;
pub mod util;

pub use parse::parse;
pub use times::ExecutionTimes;
