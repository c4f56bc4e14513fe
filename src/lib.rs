pub mod analysis;
pub mod config;
pub mod error;
pub mod market;
pub mod models;
#[cfg(test)]
pub mod test_helpers;
pub mod trading;
