mod attendance;
pub mod client;
pub mod dedup;
pub mod events;
mod session;
pub mod types;

pub use client::*;
pub use events::AuthFailureHook;
pub use types::*;
