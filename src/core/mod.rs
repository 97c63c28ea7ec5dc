//! Core shopping-assistant logic: gateway, reply interpretation, cart

pub mod cart;
pub mod color;
pub mod gateway;
pub mod interpret;
pub mod session;

pub use cart::{Cart, CartItem};
pub use gateway::ModelGateway;
pub use interpret::{interpret, ItemRequest, ParsedAction};
pub use session::Session;
