// scoutshare-service/src/lib.rs
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

#[cfg(test)]
mod tests;
