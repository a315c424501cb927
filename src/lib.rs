//! A small record store: a buddy-system allocator holds payload bytes and an
//! open-addressed hash index maps record ids to their handles.

pub mod arena;
pub mod buddy;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod free_lists;
pub mod hash_index;
pub mod input;
pub mod list;
pub mod logging;
pub mod output;
pub mod segment;
pub mod store;

pub use buddy::BuddyAllocator;
pub use error::{Result, StoreError};
pub use hash_index::HashIndex;
pub use segment::{Handle, Segment};
pub use store::Store;
