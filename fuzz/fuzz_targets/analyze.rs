#![no_main]

use libfuzzer_sys::fuzz_target;
use sqlroute_core::{
    analyze_file, find_routes, AnalysisOptions, AnalysisStore, Endpoint, FileSource, RouteQuery,
};

fuzz_target!(|data: &[u8]| {
    if let Ok(sql) = std::str::from_utf8(data) {
        let source = FileSource::new("fuzz.sql", sql);
        let mut sink = |_: &str| {};
        let analysis = analyze_file(&source, &AnalysisOptions::default(), &mut sink);
        let store = AnalysisStore::from_results(analysis.results);

        let tables = store.list_all_tables();
        if let [first, .., last] = tables.as_slice() {
            let query = RouteQuery::new(Endpoint::table(first), Endpoint::table(last))
                .with_max_paths(16);
            let _ = find_routes(&store, &query);
        }
    }
});
