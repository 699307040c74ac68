pub mod checks;
pub mod client;
pub mod model;
pub mod power;
pub mod thermal;

pub use checks::*;
pub use client::*;
pub use model::*;
pub use power::*;
pub use thermal::*;
