pub mod actions;
mod auth_services;
mod chat;
mod clock;
mod documents;
mod portal;
mod randomness;
pub mod responses;
#[cfg(test)]
pub mod testing;
mod uploads;

pub use auth_services::*;
pub use chat::*;
pub use clock::*;
pub use documents::*;
pub use portal::*;
pub use randomness::*;
pub use uploads::*;
