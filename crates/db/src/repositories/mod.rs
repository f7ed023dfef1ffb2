//! Repositories: explicit data-access functions per entity.

mod comment;
mod follow;
mod group;
mod post;
mod user;

pub use comment::CommentRepository;
pub use follow::FollowRepository;
pub use group::GroupRepository;
pub use post::PostRepository;
pub use user::UserRepository;
