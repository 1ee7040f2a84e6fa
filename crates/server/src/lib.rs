//! TalentGrid server: configuration and application wiring. The binary in
//! `main.rs` runs the outbox relay and the periodic stats log; transport
//! surfaces embed [`startup::Application`].

pub mod config;
pub mod startup;
