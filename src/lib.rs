//! Bulk write operations for document models.
//!
//! A [`Model`](model/struct.Model.html) turns a list of domain objects into a single unordered
//! batch of writes and submits it to a store in one round trip. Each object is encoded into a
//! BSON document, a match filter is projected from a configurable set of fields, and one typed
//! write (insert, replace, update or remove, optionally upserting) is appended per object.
//!
//! ## Example
//!
//! ```no_run
//! # #[macro_use] extern crate serde_derive;
//! use bulkop::{Model, ModelOptions, MemoryStore};
//!
//! #[derive(Serialize)]
//! struct User {
//!     email: String,
//!     name: String,
//! }
//!
//! # async fn run() -> bulkop::Result<()> {
//! let options = ModelOptions::new().with_upsert_match_fields(vec!["email"]);
//! let users = Model::with_options("app.users", MemoryStore::new(), options);
//!
//! let items = vec![User { email: "a@x.com".to_owned(), name: "Ada".to_owned() }];
//! let result = users.bulk_upsert_update_one(&items, None).await?;
//! assert_eq!(result.upserted_count, 1);
//! # Ok(())
//! # }
//! # fn main() {}
//! ```
#![doc(html_root_url = "https://docs.rs/bulkop")]

pub mod apm;
pub mod bulk;
pub mod document;
pub mod error;
pub mod executor;
pub mod matching;
pub mod model;
pub mod store;

pub use apm::{BulkCompleted, BulkStarted, Listener};
pub use bulk::UnorderedBatch;
pub use bulk::options::{ModelOptions, OperationKind, WriteModel};
pub use bulk::results::BulkWriteResult;
pub use error::{Error, Result};
pub use matching::MatchFields;
pub use model::Model;
pub use store::{BulkWriteFacility, Completion, MemoryStore};
