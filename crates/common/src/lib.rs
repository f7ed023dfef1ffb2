//! Common utilities and shared types for quill.
//!
//! This crate provides foundational components used across all quill crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Pagination**: Fixed-size page math via [`Page`] and [`clamp_page`]
//! - **Page cache**: TTL-bounded feed cache via [`PageCache`]
//! - **Storage**: Local file storage for post images
//!
//! # Example
//!
//! ```no_run
//! use quill_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod id;
pub mod page;
pub mod storage;

pub use cache::PageCache;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use page::{Page, PageQuery, clamp_page};
pub use storage::{LocalStorage, StorageBackend, StoredFile};
