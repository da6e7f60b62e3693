//! Output formatting modules.

pub mod json;
pub mod text;

use serde::Serialize;
use sqlroute_core::Route;

pub use json::format_json;
pub use text::{format_definitions, format_list, format_routes, format_scan};

/// Routes grouped by the mode that produced them. A mode that was not run
/// is `None`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RouteReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direct: Option<Vec<Route>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<Route>>,
}
