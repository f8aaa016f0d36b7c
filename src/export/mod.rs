//! Serializers for the whole store and for per-profile checklists.
//!
//! All functions here are pure: they return the rendered document and leave
//! writing it anywhere to the caller.

pub mod csv;
pub mod json;
pub mod markdown;

pub use self::csv::{escape_csv_field, export_csv, export_profile_csv};
pub use self::json::export_json;
pub use self::markdown::export_profile_markdown;
