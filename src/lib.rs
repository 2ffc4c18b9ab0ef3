//! Gateway header transform.
//!
//! Serializes the headers of an in-flight exchange into flow variables for
//! downstream policies that only accept string-typed values:
//!
//! - Reads the stringified name lists `request.headers.names` and
//!   `response.headers.names`
//! - Looks up each `request.header.<name>` / `response.header.<name>`
//! - Writes the resulting name to value objects, JSON encoded twice, to
//!   `apic.reqHeaders` and `apic.resHeaders`
//!
//! ## Example
//!
//! ```
//! use gateway_header_transform::{decode_header_map, HeaderTransformer, VariableContext};
//!
//! let mut ctx = VariableContext::new()
//!     .with_variable("request.headers.names", "[Host, Accept]")
//!     .with_variable("request.header.Host", "example.com")
//!     .with_variable("request.header.Accept", "*/*");
//!
//! HeaderTransformer::default().apply(&mut ctx);
//!
//! let headers = decode_header_map(ctx.get("apic.reqHeaders").unwrap()).unwrap();
//! assert_eq!(headers.get("Host"), Some(Some("example.com")));
//! ```

pub mod config;
pub mod context;
pub mod transformer;

pub use config::{ConfigError, TransformConfig};
pub use context::{SnapshotError, VariableContext, VariableStore};
pub use transformer::{
    decode_header_map, encode_header_map, split_header_names, Direction, HeaderMap,
    HeaderTransformer, MissingValue, TransformError, TransformReport,
};
