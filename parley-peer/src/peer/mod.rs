mod peer_command;
mod peer_handle;
mod peer_manager;
mod peer_observer;

pub use peer_command::*;
pub use peer_handle::*;
pub use peer_manager::*;
pub use peer_observer::*;
