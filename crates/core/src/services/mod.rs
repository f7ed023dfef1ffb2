//! Business logic services.

pub mod comment;
pub mod follow;
pub mod group;
pub mod post;
pub mod user;

pub use comment::CommentService;
pub use follow::FollowService;
pub use group::GroupService;
pub use post::PostService;
pub use user::UserService;
