//! Business logic for quill.
//!
//! Services own the domain rules: who may edit a post, what a valid
//! comment looks like, how feeds are assembled. Handlers stay thin.

pub mod authz;
pub mod forms;
pub mod services;

pub use authz::AuthzDecision;
pub use forms::{CommentForm, ImageUpload, PostForm, SignupForm};
pub use services::{
    comment::CommentService, follow::FollowService, group::GroupService, post::PostService,
    user::UserService,
};
