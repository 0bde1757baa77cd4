//! Resolved schema model and protocol fingerprint shared by the ango compiler
//! and its code generators.
//!
//! ```
//! use ango_schema::*;
//!
//! let mut schema = Schema::new("geo");
//! schema.messages.push(Message {
//!     name: "Point".to_owned(),
//!     location: Location::new(1, 1),
//!     fields: vec![
//!         Field {
//!             name: "x".to_owned(),
//!             ty: TypeRef::Primitive(Primitive::Int32),
//!             tag: 1,
//!             modifier: Modifier::Single,
//!             location: Location::new(1, 17),
//!         },
//!     ],
//! });
//!
//! let version = fingerprint(&schema);
//! assert_eq!(version, fingerprint(&schema.clone()));
//! assert_eq!(version.as_str().len(), 16);
//! ```

pub mod fingerprint;
pub mod schema;

pub use fingerprint::*;
pub use schema::*;
