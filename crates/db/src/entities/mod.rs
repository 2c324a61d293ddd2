//! Database entities.

pub mod category;
pub mod complaint;
pub mod complaint_comment;
pub mod user;

pub use category::Entity as Category;
pub use complaint::Entity as Complaint;
pub use complaint_comment::Entity as ComplaintComment;
pub use user::Entity as User;
