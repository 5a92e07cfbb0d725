//! Cross-cutting helpers shared by the Lunchly crates and binaries.

pub mod utils;
