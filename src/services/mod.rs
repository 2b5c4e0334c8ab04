// scoutshare-service/src/services/mod.rs
pub mod access_service;
pub mod checklist_sync;
pub mod permissions;
pub mod scouting_service;
