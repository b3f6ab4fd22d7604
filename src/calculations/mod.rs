pub mod coverage;
pub mod overlap;
