use chrono_tz::{TZ_VARIANTS, Tz};

/// Display cap for search results.
pub const SEARCH_DISPLAY_LIMIT: usize = 10;

/// Resolves a free-form query to a canonical timezone.
///
/// Exact identifiers match case-sensitively. Anything else falls back to a
/// case-insensitive substring search over the catalog; only a unique hit is
/// accepted, so ambiguous queries resolve to nothing rather than guessing.
pub fn resolve(query: &str) -> Option<Tz> {
    if let Ok(tz) = query.parse::<Tz>() {
        return Some(tz);
    }

    let candidates = search(query);
    if candidates.len() == 1 {
        // The candidate is a catalog entry, so this second hop is exact.
        return candidates[0].parse::<Tz>().ok();
    }
    None
}

/// Case-insensitive substring search over all catalog identifiers.
pub fn search(query: &str) -> Vec<&'static str> {
    let query = query.to_lowercase();
    TZ_VARIANTS
        .iter()
        .map(|tz| tz.name())
        .filter(|name| name.to_lowercase().contains(&query))
        .collect()
}

/// Formats search results for display, capped at [`SEARCH_DISPLAY_LIMIT`]
/// entries with an overflow notice when more exist.
pub fn format_search_results(results: &[&str]) -> String {
    let mut reply = results
        .iter()
        .take(SEARCH_DISPLAY_LIMIT)
        .copied()
        .collect::<Vec<_>>()
        .join("\n");
    if results.len() > SEARCH_DISPLAY_LIMIT {
        reply.push_str("\nMore than 10 results, please be more specific.");
    }
    reply
}
