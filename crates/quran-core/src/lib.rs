//! # quran-core
//!
//! Client layer for a Quran reading application: verse addressing, response
//! normalization, caching and resilient retrieval from an AlQuran.cloud style
//! content API, plus audio URL derivation and locally persisted reader state.
//!
//! ## Architecture
//!
//! - **Verse Index**: exact mapping between `(chapter, verse)` and the global
//!   verse numbers `1..=6236`
//! - **Normalizer**: single-edition and multi-edition payloads decoded into one
//!   canonical [`Verse`]/[`Chapter`] shape
//! - **Cache**: key-based memoization with time expiry
//! - **Fetcher**: per-attempt deadlines, linear-backoff retry, endpoint rotation
//! - **Client**: the public query operations composing the above
//! - **Local state**: preferences, favorites, history and notes over a
//!   key-value store
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quran_core::{ClientConfig, QuranClient};
//!
//! # async fn run() -> quran_core::Result<()> {
//! let client = QuranClient::new(ClientConfig::load()?)?;
//!
//! let verse = client.get_verse(2, 255, &["quran-uthmani", "en.asad"]).await?;
//! println!("{} {}", verse.address(), verse.translation("en.asad"));
//!
//! let results = client.search("mercy", None, "en.asad").await?;
//! println!("{} matches", results.count);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Input errors surface as-is; retrieval failures surface as
//! [`Error::Service`] carrying a user-facing message:
//!
//! ```rust,no_run
//! use quran_core::{ClientConfig, Error, QuranClient};
//!
//! # async fn run() -> quran_core::Result<()> {
//! let client = QuranClient::new(ClientConfig::default())?;
//! match client.get_chapter(115, &[]).await {
//!     Err(Error::InvalidAddress(msg)) => eprintln!("bad input: {msg}"),
//!     Err(Error::Service(kind)) => eprintln!("{}", kind.message()),
//!     Err(e) => eprintln!("{e}"),
//!     Ok(chapter) => println!("{} verses", chapter.verses.len()),
//! }
//! # Ok(())
//! # }
//! ```

/// Reciter table and audio URL derivation
pub mod audio;
/// Response cache keyed by path and sorted parameters
pub mod cache;
/// Built-in chapter and translation tables
pub mod chapters;
/// Query façade over the content API
pub mod client;
/// Client configuration from TOML and environment
pub mod config;
/// Error types and result aliases
pub mod error;
/// Deadline-bounded retrieval with retry and endpoint rotation
pub mod fetcher;
/// Upstream payload normalization
pub mod normalizer;
/// Typed reader state: preferences, favorites, history, bookmarks, notes
pub mod preferences;
/// Local key-value storage
pub mod storage;
/// Core data types
pub mod types;
/// Chapter/verse to global verse number mapping
pub mod verse_index;

// Re-export commonly used types
pub use audio::{AudioTarget, Reciter};
pub use cache::{CacheStats, RequestCache};
pub use client::QuranClient;
pub use config::{ApiConfig, AudioConfig, CacheConfig, ClientConfig};
pub use error::{Error, Result, ServiceFailure};
pub use fetcher::{EndpointState, FetchPolicy, Fetcher, HttpTransport, Transport, TransportResponse};
pub use preferences::{LocalState, Theme, UserPreferences};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use types::*;
pub use verse_index::{VerseAddress, from_global_number, to_global_number};
