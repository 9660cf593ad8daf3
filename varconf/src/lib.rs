//! # varconf
//!
//! Typed configuration variables persisted as one JSON document.
//!
//! A configuration is a plain struct whose fields are variables. Each
//! variable is bound to one key of the JSON object, carries a default and a
//! validation rule, and tolerates malformed input by keeping its previous
//! value. Keys the struct does not declare are kept and written back.
//!
//! ## Features
//!
//! - Strings, characters, booleans and range-checked numbers
//! - Enumerations loaded by name or ordinal, saved by name
//! - Lists and maps of any element type through [`codec`]s
//! - Nested groups, including lists of records
//! - Declaration-ordered output with a configurable indent
//! - Optional timestamped backup before overwriting
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use varconf::{
//!     Config, codec,
//!     variable::{BoolVar, Container, FloatVar, ListVar, StringVar, Variable},
//! };
//!
//! struct Settings {
//!     name: StringVar,
//!     enabled: BoolVar,
//!     ratio: FloatVar,
//!     ports: ListVar<i32>,
//! }
//!
//! impl Container for Settings {
//!     fn variables(&self) -> Vec<&dyn Variable> {
//!         vec![&self.name, &self.enabled, &self.ratio, &self.ports]
//!     }
//!
//!     fn variables_mut(&mut self) -> Vec<&mut dyn Variable> {
//!         vec![&mut self.name, &mut self.enabled, &mut self.ratio, &mut self.ports]
//!     }
//! }
//!
//! let settings = Settings {
//!     name: StringVar::new("name", "Default".to_string()),
//!     enabled: BoolVar::new("enabled", true),
//!     ratio: FloatVar::bounded("ratio", 1.0, 0.0, 10.0),
//!     ports: ListVar::with_items("ports", vec![Some(6)], codec::primitive::<i32>()),
//! };
//!
//! let mut config = Config::new("config.json", settings)?;
//! config.load()?;
//! config.ratio.set(2.5);
//! config.save()?;
//! # Ok::<(), varconf::Error>(())
//! ```
//!
//! ## Modules
//!
//! - [`variable`] - Variable kinds and the [`Container`](variable::Container) trait
//! - [`codec`] - Element codecs for collections
//! - [`schema`] - Key discovery and the load/save walk
//! - [`config`] - The file-backed root controller

#[macro_use]
extern crate log;

/// Element codecs for collection variables.
pub mod codec;

/// The file-backed root controller.
pub mod config;

mod error;

pub mod schema;

/// Typed variables and the container trait.
pub mod variable;

pub use config::{Config, ConfigOptions};
pub use error::{Error, Result, SchemaError};
pub use schema::Schema;
pub use serde_json::Value;
