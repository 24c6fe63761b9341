// Manager modules: shared channel plumbing around the scheduling core

mod broadcast_manager;

pub use broadcast_manager::{BroadcastChannelManager, ChannelListener};
