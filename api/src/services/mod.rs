pub mod advisory;
pub mod cache;
pub mod enrichment;
pub mod openweather;
pub mod weather;
