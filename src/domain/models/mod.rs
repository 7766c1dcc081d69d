mod action;
mod backend;
mod document;
mod error;
mod event;
mod message;
mod notification;
mod slash_commands;
mod task;
mod user;

pub use action::*;
pub use backend::*;
pub use document::*;
pub use error::*;
pub use event::*;
pub use message::*;
pub use notification::*;
pub use slash_commands::*;
pub use task::*;
pub use user::*;
