//! Generic data-access layer
//!
//! Every content entity is served by one [`Model`] parameterized by its [`Schema`]:
//! - Schema registry: closed column enums (`#[derive(Column)]`) and table metadata
//! - Filter compiler: structured filters to a parameterized WHERE body
//! - Order compiler: structured ordering to ORDER BY terms
//! - Model façade: find/count/create/update/delete/upsert over any [`Store`]
//!
//! ```rust,ignore
//! use scriptorium::entities::user::{UserColumn, Users};
//! use scriptorium::orm::{Filter, Model};
//!
//! let users: Model<Users> = Model::new(db.clone());
//! let admin = users
//!     .find_first(&[Filter::eq(UserColumn::Username, "admin")])
//!     .await?;
//! ```

mod builder;
mod error;
mod filter;
mod model;
mod order;
mod pagination;
mod schema;
mod store;
mod value;

pub use builder::*;
pub use error::{ModelError, ModelResult};
pub use filter::*;
pub use model::{DEFAULT_LIMIT, FindOptions, Model};
pub use order::*;
pub use pagination::{Page, PageInfo};
pub use schema::*;
pub use store::{Store, TxHandle};
pub use value::{SqlValue, Values};

pub use scriptorium_macros::Column;
