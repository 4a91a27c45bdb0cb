//! Marvin is a library for deciding whether a robots.txt file lets a
//! crawler fetch a URI, matching the rules the way Google's crawler does:
//! longest-match precedence between `Allow` and `Disallow`, `*` and `$`
//! wildcards with bounded worst-case matching, tolerant parsing of the
//! malformed files found in the wild, and percent-encoding normalisation
//! of rule patterns.
//!
//! The easiest entry points are the free functions:
//!
//! ```
//! let robots = b"User-agent: *\nDisallow: /private/\n";
//!
//! assert!(marvin::is_allowed(robots, "FerrisBot", "https://example.com/shop/index.html"));
//! assert!(!marvin::is_allowed(robots, "FerrisBot", "https://example.com/private/index.html"));
//! ```
//!
//! A [`Matcher`] can be reused across queries to avoid rebuilding state,
//! and the lower-level [`parse`] entry point drives any [`ParseHandler`]
//! for consumers that want the raw directive stream, such as the bundled
//! [`SitemapCollector`].
//!
//! The parser is total: every byte sequence yields a well-defined event
//! stream, and the decision is always a plain boolean. Fetching, caching
//! and scheduling are deliberately left to the caller.

mod matcher;
mod parse;
mod pattern;
mod sitemap;
mod uri;

pub use crate::matcher::{is_valid_user_agent_to_obey, Matcher};
pub use crate::parse::{escape_pattern, parse, ParseHandler, ParseOptions, Parser};
pub use crate::pattern::{matches, LongestMatch, MatchStrategy};
pub use crate::sitemap::SitemapCollector;
pub use crate::uri::path_params_query;

/// Returns true if `user_agent` may fetch `uri` under the rules of
/// `robots_body`. The URI should be %-encoded per RFC 3986 where strict
/// conformance matters.
pub fn is_allowed(robots_body: impl AsRef<[u8]>, user_agent: &str, uri: &str) -> bool {
    Matcher::new().one_agent_allowed_by_robots(robots_body, user_agent, uri)
}

/// Returns true if any member of `user_agents` may fetch `uri` under the
/// rules of `robots_body`: a rule in any named group takes part in the
/// decision.
pub fn are_allowed(robots_body: impl AsRef<[u8]>, user_agents: &[&str], uri: &str) -> bool {
    Matcher::new().allowed_by_robots(robots_body, user_agents, uri)
}

/// Returns the sitemap URIs declared in `robots_body`, in file order with
/// duplicates preserved.
pub fn sitemaps(robots_body: impl AsRef<[u8]>) -> Vec<String> {
    let mut collector = SitemapCollector::new();
    parse(robots_body.as_ref(), &mut collector);
    collector.into_sitemaps()
}
