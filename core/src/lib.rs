//! Turn engine for a deep-sea treasure hunting board game.
//!
//! Divers leave a shared submarine, explore a square map hiding bombs and treasures, and must
//! return before the oxygen runs out. Rendering, input and audio live in the host: it translates
//! clicks into [`Target`]s, feeds them to a [`Game`] and reads the state back.

#![no_std]

extern crate alloc;

pub use config::*;
pub use engine::*;
pub use entity::*;
pub use error::*;
pub use grid::*;
pub use movement::*;
pub use oxygen::*;
pub use snapshot::*;
pub use types::*;
pub use victory::*;

mod config;
mod engine;
mod entity;
mod error;
mod grid;
mod movement;
mod oxygen;
mod snapshot;
mod types;
mod victory;
