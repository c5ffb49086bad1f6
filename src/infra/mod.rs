//! Инфраструктурный слой вокруг движка:
//! - генерация ID столов;
//! - RNG-реализации для движка;
//! - получатели событий;
//! - маппинги между domain/engine и API.

pub mod events;
pub mod ids;
pub mod mapping;
pub mod rng;

pub use events::*;
pub use ids::*;
pub use mapping::*;
pub use rng::*;
