// Re-export model modules
mod currency;

pub use currency::*;
