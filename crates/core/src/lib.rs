//! Core business logic for FixIt.

pub mod lifecycle;
pub mod memory;
pub mod policy;
pub mod services;
pub mod store;
pub mod validation;
pub mod view;

#[cfg(test)]
mod test_support;

pub use memory::MemoryStore;
pub use policy::{Action, Actor};
pub use services::*;
pub use store::{
    CategoryStore, CategoryStoreRef, ComplaintStore, ComplaintStoreRef, UserStore, UserStoreRef,
};
