// WebSocket command channel.
//
// All endpoint wrappers (registry, states, lovelace, automations) are
// implemented as inherent methods via separate files to keep the client
// module focused on channel mechanics.

mod automations;
mod client;
mod lovelace;
mod registry;
mod states;

pub use client::CommandSocket;
