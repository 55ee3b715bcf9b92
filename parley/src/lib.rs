pub use parley_core::model::{ChatPayload, RoomId, SignalMessage};

pub mod model {
    pub use parley_core::model::*;
}

pub mod utils {
    pub use parley_core::utils::*;
}

#[cfg(feature = "peer")]
pub mod peer {
    pub use parley_peer::*;
}
