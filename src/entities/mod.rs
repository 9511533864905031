//! Platform entities as returned by the REST API
//!
//! These are thin serde views over the platform JSON. Only the fields the
//! SDK works with are typed.

pub mod annotation;
pub mod dataset;
pub mod item;
pub mod package;
pub mod service;

pub use annotation::Annotation;
pub use dataset::Dataset;
pub use item::Item;
pub use package::{Dpk, FunctionIO, Package, PackageFunction, PackageModule};
pub use service::{Bot, Service};
