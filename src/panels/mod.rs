//! Concrete panel plugins

/// KLD2844B 2.8" SPI TFT panel
pub mod kld2844b;

pub use kld2844b::Kld2844b;
