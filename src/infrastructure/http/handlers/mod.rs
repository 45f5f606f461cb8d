//! HTTP Handlers

mod catalog;
mod live;
mod ping;
mod preview;
mod script;
mod websocket;

pub use catalog::*;
pub use live::*;
pub use ping::*;
pub use preview::*;
pub use script::*;
pub use websocket::*;
