use indexmap::IndexSet;

use super::{or_not_found, table_pairs};
use crate::catalog::AnalysisStore;
use crate::types::{Route, RouteQuery};

/// One route per endpoint pair that some procedure touches on both sides.
pub fn find_direct_routes(store: &AnalysisStore, query: &RouteQuery) -> Vec<Route> {
    let mut routes = Vec::new();
    for (source, destination) in table_pairs(store, query) {
        let procedures: IndexSet<String> = store
            .procedures()
            .using_both(&source, &destination)
            .map(|procedure| procedure.procedure_name.clone())
            .collect();
        if !procedures.is_empty() {
            routes.push(Route::direct(procedures.into_iter().collect()));
        }
    }
    or_not_found(routes)
}
