use crate::domain::Repo;

/// Where a query landed inside a URI. Lower tiers sort first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchTier {
    /// The query lines up with the start of the URI.
    Prefix,
    /// The query matches somewhere after the first character.
    Interior,
}

/// Turns a raw query into the needle matched against lowercase URIs.
///
/// Whitespace-separated tokens become `/`-joined path segments, so
/// `"jkl mno pqr"` and `"jkl/mno/pqr"` are the same query. Returns `None`
/// for a blank query.
pub fn normalize_query(query: &str) -> Option<String> {
    let mut needle = String::with_capacity(query.len());
    for token in query.split_whitespace() {
        let token = token.to_lowercase();
        if !needle.is_empty() && !needle.ends_with('/') && !token.starts_with('/') {
            needle.push('/');
        }
        needle.push_str(&token);
    }

    if needle.is_empty() {
        None
    } else {
        Some(needle)
    }
}

/// Substring filter a store may apply before ranking.
///
/// Only ASCII needles are pushed down: a backend's notion of lowercase can
/// differ from Rust's for other scripts, and the filter must never drop a
/// URI the ranker would accept.
pub fn storage_filter(query: &str) -> Option<String> {
    normalize_query(query).filter(|needle| needle.is_ascii())
}

/// Classifies a URI against an already normalized needle.
///
/// A needle ending in `/` only matches where the URI continues with a path
/// separator, which plain containment already guarantees.
pub fn match_tier(needle: &str, uri: &str) -> Option<MatchTier> {
    let haystack = uri.to_lowercase();
    if haystack.starts_with(needle) {
        Some(MatchTier::Prefix)
    } else if haystack.contains(needle) {
        Some(MatchTier::Interior)
    } else {
        None
    }
}

/// Narrows and orders candidates by how well their URI matches `query`.
///
/// Sorts on `(tier, original index)` so candidates in the same tier keep
/// the order they arrived in. A blank query returns the input unchanged.
pub fn rank_by_uri<T, F>(query: &str, candidates: Vec<T>, uri_of: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let Some(needle) = normalize_query(query) else {
        return candidates;
    };

    let mut ranked: Vec<(MatchTier, usize, T)> = candidates
        .into_iter()
        .enumerate()
        .filter_map(|(index, candidate)| {
            let tier = match_tier(&needle, uri_of(&candidate))?;
            Some((tier, index, candidate))
        })
        .collect();

    ranked.sort_by_key(|(tier, index, _)| (*tier, *index));
    ranked.into_iter().map(|(_, _, candidate)| candidate).collect()
}

pub fn rank_repos(query: &str, repos: Vec<Repo>) -> Vec<Repo> {
    rank_by_uri(query, repos, |repo| repo.uri())
}
