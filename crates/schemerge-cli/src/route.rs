//! Per-path routing between merge strategies.

use std::path::Path;

use schemerge_core::config::RoutingSettings;

/// Which merge strategy applies to a changed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Structural block-level merge.
    Schematic,
    /// Flat record-cache union.
    FootprintCache,
    /// Take the proposed content verbatim.
    PassThrough,
}

pub fn route_for(path: &str, routing: &RoutingSettings) -> Route {
    for pattern in &routing.schematic_globs {
        match glob::Pattern::new(pattern) {
            Ok(p) if p.matches(path) => return Route::Schematic,
            Ok(_) => {}
            Err(err) => tracing::warn!(%pattern, %err, "ignoring invalid schematic glob"),
        }
    }
    let name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    if routing.cache_names.iter().any(|c| c == name) {
        return Route::FootprintCache;
    }
    Route::PassThrough
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schematics_route_by_glob() {
        let routing = RoutingSettings::default();
        assert_eq!(route_for("board.kicad_sch", &routing), Route::Schematic);
        assert_eq!(
            route_for("hw/rev2/board.kicad_sch", &routing),
            Route::Schematic
        );
    }

    #[test]
    fn test_caches_route_by_basename() {
        let routing = RoutingSettings::default();
        assert_eq!(
            route_for("lib/fp-info-cache", &routing),
            Route::FootprintCache
        );
        assert_eq!(
            route_for("fp-info-cache.txt", &routing),
            Route::FootprintCache
        );
    }

    #[test]
    fn test_everything_else_passes_through() {
        let routing = RoutingSettings::default();
        assert_eq!(route_for("README.md", &routing), Route::PassThrough);
        assert_eq!(route_for("board.kicad_pcb", &routing), Route::PassThrough);
    }
}
