//! Repository layer for database operations.

mod category;
mod complaint;
mod user;

pub use category::CategoryRepository;
pub use complaint::{ComplaintFilter, ComplaintRepository};
pub use user::UserRepository;
