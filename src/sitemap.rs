use crate::parse::{parse, ParseHandler};

/// Collects the `Sitemap:` values of a robots.txt body in the order they
/// appear, duplicates included. Sitemap lines are valid anywhere in the
/// file, so no group tracking is needed.
#[derive(Debug, Default)]
pub struct SitemapCollector {
    sitemaps: Vec<String>,
}

impl SitemapCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `robots_body` and returns the sitemap URIs found in it.
    pub fn collect(&mut self, robots_body: &[u8]) -> &[String] {
        parse(robots_body, self);
        &self.sitemaps
    }

    pub fn sitemaps(&self) -> &[String] {
        &self.sitemaps
    }

    pub fn into_sitemaps(self) -> Vec<String> {
        self.sitemaps
    }
}

impl ParseHandler for SitemapCollector {
    fn on_robots_start(&mut self) {
        self.sitemaps.clear();
    }

    fn on_sitemap(&mut self, _line: u32, value: &str) {
        self.sitemaps.push(value.to_string());
    }
}
