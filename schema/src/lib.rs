// Pokedex Battle Schema - Shared record definitions
// This crate holds the records the creature data service hands back, so the
// battle engine and any data source implementation agree on one shape.

pub use battle_data::*;
pub use pokemon_types::*;
pub use progression_data::*;
pub use resource::*;
pub use species_data::*;

pub mod battle_data;
pub mod pokemon_types;
pub mod progression_data;
pub mod resource;
pub mod species_data;
