use crate::parse::{parse, ParseHandler};
use crate::pattern::{LongestMatch, MatchStrategy};
use crate::uri::path_params_query;

const NO_MATCH_PRIORITY: i32 = -1;

/// Instead of a boolean "some rule matched", we keep the priority of the
/// best match seen so far together with the line it came from. The priority
/// starts out negative so that matching an empty pattern (priority zero)
/// still outranks no match at all.
#[derive(Debug, Clone, Copy)]
struct Score {
    priority: i32,
    line: u32,
}

impl Score {
    fn new() -> Self {
        Self {
            priority: NO_MATCH_PRIORITY,
            line: 0,
        }
    }

    fn set(&mut self, priority: i32, line: u32) {
        self.priority = priority;
        self.line = line;
    }

    fn clear(&mut self) {
        self.set(NO_MATCH_PRIORITY, 0);
    }

    fn higher_of(a: Score, b: Score) -> Score {
        if a.priority > b.priority {
            a
        } else {
            b
        }
    }
}

/// One score per agent hierarchy: rules from `User-agent: *` groups land in
/// `global`, rules from groups naming one of the queried agents land in
/// `specific`.
#[derive(Debug, Clone, Copy)]
struct ScorePair {
    global: Score,
    specific: Score,
}

impl ScorePair {
    fn new() -> Self {
        Self {
            global: Score::new(),
            specific: Score::new(),
        }
    }

    fn clear(&mut self) {
        self.global.clear();
        self.specific.clear();
    }
}

/// Matches a robots.txt body against URIs for a set of user-agents.
///
/// The matcher scores Allow/Disallow rules with [`LongestMatch`] by
/// default, which is how Google's crawler resolves conflicting rules: given
///
/// ```text
/// Allow: /
/// Disallow: /cgi-bin
/// ```
///
/// the webmaster plainly wants everything crawled except `/cgi-bin`, so the
/// longer (more specific) pattern wins. The older first-match reading of
/// the protocol would allow everything here. A custom [`MatchStrategy`] can
/// be supplied through [`Matcher::with_strategy`].
///
/// An instance can be reused for any number of queries, but is not safe to
/// share across threads; concurrent callers should use one matcher each.
pub struct Matcher<S = LongestMatch> {
    allow: ScorePair,
    disallow: ScorePair,

    seen_global_agent: bool,
    seen_specific_agent: bool,
    ever_seen_specific_agent: bool,
    seen_separator: bool,

    // The query installed by the last allowed_by_robots() call.
    path: String,
    user_agents: Vec<String>,

    strategy: S,
}

impl Matcher<LongestMatch> {
    pub fn new() -> Self {
        Self::with_strategy(LongestMatch)
    }
}

impl Default for Matcher<LongestMatch> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: MatchStrategy> Matcher<S> {
    pub fn with_strategy(strategy: S) -> Self {
        Self {
            allow: ScorePair::new(),
            disallow: ScorePair::new(),
            seen_global_agent: false,
            seen_specific_agent: false,
            ever_seen_specific_agent: false,
            seen_separator: false,
            path: String::new(),
            user_agents: Vec::new(),
            strategy,
        }
    }

    /// Installs the next query. The path must contain only the path, params
    /// and query of the URI and must begin with a `/`.
    fn init_user_agents_and_path(&mut self, user_agents: &[&str], path: &str) {
        assert!(path.starts_with('/'), "path must begin with '/'");
        self.path = path.to_string();
        self.user_agents = user_agents.iter().map(|ua| ua.to_string()).collect();
    }

    /// Returns true if any member of `user_agents` may fetch `uri` under
    /// the rules of `robots_body`. The URI is expected to be %-encoded per
    /// RFC 3986 already; only its path, params and query take part in
    /// matching.
    pub fn allowed_by_robots(
        &mut self,
        robots_body: impl AsRef<[u8]>,
        user_agents: &[&str],
        uri: &str,
    ) -> bool {
        let path = path_params_query(uri).into_owned();
        self.init_user_agents_and_path(user_agents, &path);
        parse(robots_body.as_ref(), self);
        !self.disallow()
    }

    /// [`Matcher::allowed_by_robots`] for a single user-agent.
    pub fn one_agent_allowed_by_robots(
        &mut self,
        robots_body: impl AsRef<[u8]>,
        user_agent: &str,
        uri: &str,
    ) -> bool {
        self.allowed_by_robots(robots_body, &[user_agent], uri)
    }

    /// Returns true if the installed path is disallowed for the installed
    /// agents. A pure read of the scores accumulated by the last parse.
    fn disallow(&self) -> bool {
        if self.allow.specific.priority > 0 || self.disallow.specific.priority > 0 {
            return self.disallow.specific.priority > self.allow.specific.priority;
        }

        if self.ever_seen_specific_agent {
            // A group for our agent existed but with no rules, or only
            // empty patterns: allowed.
            return false;
        }

        if self.disallow.global.priority > 0 || self.allow.global.priority > 0 {
            return self.disallow.global.priority > self.allow.global.priority;
        }

        false
    }

    /// The line of the rule that decided the last query, for diagnostics.
    /// Zero when no rule matched.
    pub fn matching_line(&self) -> u32 {
        if self.ever_seen_specific_agent {
            Score::higher_of(self.disallow.specific, self.allow.specific).line
        } else {
            Score::higher_of(self.disallow.global, self.allow.global).line
        }
    }

    fn seen_any_agent(&self) -> bool {
        self.seen_global_agent || self.seen_specific_agent
    }
}

/// Extracts the longest prefix of `user_agent` consisting of characters
/// allowed in user-agent tokens, `[a-zA-Z_-]`.
fn extract_user_agent(user_agent: &str) -> &str {
    let end = user_agent
        .bytes()
        .position(|b| !(b.is_ascii_alphabetic() || b == b'-' || b == b'_'))
        .unwrap_or(user_agent.len());
    &user_agent[..end]
}

/// Returns true if the token is valid for matching against robots.txt
/// user-agent lines: non-empty and made up entirely of `[a-zA-Z_-]`.
pub fn is_valid_user_agent_to_obey(user_agent: &str) -> bool {
    !user_agent.is_empty() && extract_user_agent(user_agent) == user_agent
}

impl<S: MatchStrategy> ParseHandler for Matcher<S> {
    fn on_robots_start(&mut self) {
        // A new file: reset everything the previous query left behind, in
        // declaration order so it is easy to check nothing was missed.
        self.allow.clear();
        self.disallow.clear();

        self.seen_global_agent = false;
        self.seen_specific_agent = false;
        self.ever_seen_specific_agent = false;
        self.seen_separator = false;
    }

    fn on_user_agent(&mut self, _line: u32, value: &str) {
        if self.seen_separator {
            // Rules have been seen since the last agent line, so this line
            // opens a new group.
            self.seen_specific_agent = false;
            self.seen_global_agent = false;
            self.seen_separator = false;
        }

        // A '*' followed by whitespace and more characters still counts as
        // the global agent.
        let bytes = value.as_bytes();
        if bytes.first() == Some(&b'*') && (bytes.len() == 1 || bytes[1].is_ascii_whitespace()) {
            self.seen_global_agent = true;
        } else {
            let token = extract_user_agent(value);
            for agent in &self.user_agents {
                if token.eq_ignore_ascii_case(agent) {
                    self.ever_seen_specific_agent = true;
                    self.seen_specific_agent = true;
                    break;
                }
            }
        }
    }

    fn on_allow(&mut self, line: u32, value: &str) {
        if !self.seen_any_agent() {
            // The rule belongs to no group.
            return;
        }

        self.seen_separator = true;
        let priority = self.strategy.match_allow(&self.path, value);
        if priority >= 0 {
            let score = if self.seen_specific_agent {
                &mut self.allow.specific
            } else {
                assert!(self.seen_global_agent, "rule seen outside any agent group");
                &mut self.allow.global
            };
            // Strictly greater only: on equal priorities the earlier line
            // sticks, which is what lets allow win ties downstream.
            if score.priority < priority {
                score.set(priority, line);
            }
        } else {
            // A pattern ending in 'index.htm' or 'index.html' stands in for
            // the directory itself, so retry with '<dir>/$'. The synthesised
            // pattern cannot end in '/index.htm' again, bounding the
            // recursion at one level.
            if let Some(slash) = value.rfind('/') {
                if value[slash..].starts_with("/index.htm") {
                    let pattern = format!("{}$", &value[..slash + 1]);
                    self.on_allow(line, &pattern);
                }
            }
        }
    }

    fn on_disallow(&mut self, line: u32, value: &str) {
        if !self.seen_any_agent() {
            return;
        }

        self.seen_separator = true;
        let priority = self.strategy.match_disallow(&self.path, value);
        if priority >= 0 {
            let score = if self.seen_specific_agent {
                &mut self.disallow.specific
            } else {
                assert!(self.seen_global_agent, "rule seen outside any agent group");
                &mut self.disallow.global
            };
            if score.priority < priority {
                score.set(priority, line);
            }
        }
    }
}
