//! Common Alerting Protocol documents: the RSS index, the alerts it links to,
//! and the polygons drawn from them.

pub mod schema;

mod alert;
mod index;
mod polygon;

#[cfg(test)]
pub(crate) mod fixtures;

pub use self::alert::*;
pub use self::index::*;
pub use self::polygon::*;
pub use self::schema::{Circle, LanguageTag, ValidationError};
