//! Field audit derivation.
//!
//! A raw audit record goes through [`engine::adapt`] to become an
//! [`types::AdaptedView`]: the client profile, the merged attribute bag and
//! the derived sizing results. The review summary ([`report`]) and the quote
//! draft ([`quote`]) both consume that view.
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod quote;
pub mod report;
pub mod sizing;
pub mod types;
pub mod util;

pub use config::{PricingConfig, SizingConfig};
pub use engine::{adapt, route};
pub use error::AuditError;
pub use types::{AdaptedView, DerivedResults, RawAuditRecord, ServiceKind, ServiceRoute};
