const EOW_BYTE: u8 = 36; // '$'
const WILDCARD_BYTE: u8 = 42; // '*'

/// Returns true if the URI path matches the rule pattern.
///
/// The pattern is anchored at the beginning of the path. `*` matches any
/// (possibly empty) run of bytes and `$` is special only as the last byte of
/// the pattern, where it anchors the match to the end of the path. Matching
/// is byte-wise and case sensitive.
///
/// Both the path and the pattern are webmaster-controlled input, so the
/// worst case has to stay acceptable: the candidate-offset scan below is
/// O(pattern × path) with a single scratch buffer, no matter how many
/// wildcards the pattern stacks up.
pub fn matches(path: &str, pattern: &str) -> bool {
    let path = path.as_bytes();
    let pattern = pattern.as_bytes();

    // pos[..numpos] is a sorted list of path offsets: the prefixes of the
    // path which can match the pattern consumed so far. If the list ever
    // runs empty the match fails; if any offset survives to the end of the
    // pattern the match succeeds.
    let mut pos = vec![0usize; path.len() + 1];
    let mut numpos = 1;

    for (i, &byte) in pattern.iter().enumerate() {
        if byte == EOW_BYTE && i + 1 == pattern.len() {
            return pos[numpos - 1] == path.len();
        }
        if byte == WILDCARD_BYTE {
            numpos = path.len() - pos[0] + 1;
            for j in 1..numpos {
                pos[j] = pos[j - 1] + 1;
            }
        } else {
            // Includes '$' anywhere but the last byte.
            let mut newnumpos = 0;
            for j in 0..numpos {
                if pos[j] < path.len() && path[pos[j]] == byte {
                    pos[newnumpos] = pos[j] + 1;
                    newnumpos += 1;
                }
            }
            numpos = newnumpos;
            if numpos == 0 {
                return false;
            }
        }
    }

    true
}

/// A strategy for scoring rule lines against the queried path. Each method
/// returns a match priority:
///
/// - negative: no match;
/// - zero: match, but treat it as if the pattern were empty;
/// - positive: match.
pub trait MatchStrategy {
    fn match_allow(&self, path: &str, pattern: &str) -> i32;
    fn match_disallow(&self, path: &str, pattern: &str) -> i32;
}

/// The default scoring strategy: the number of pattern bytes matched. Longer
/// patterns are more specific, and the most specific rule wins, which is
/// what webmasters expect from a pair like `Allow: /` + `Disallow: /cgi-bin`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongestMatch;

impl MatchStrategy for LongestMatch {
    fn match_allow(&self, path: &str, pattern: &str) -> i32 {
        if matches(path, pattern) {
            pattern.len() as i32
        } else {
            -1
        }
    }

    fn match_disallow(&self, path: &str, pattern: &str) -> i32 {
        if matches(path, pattern) {
            pattern.len() as i32
        } else {
            -1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_prefix() {
        assert!(matches("/fish", "/fish"));
        assert!(matches("/fish.html", "/fish"));
        assert!(matches("/fish/salmon.html", "/fish"));
        assert!(matches("/fishheads/yummy.html", "/fish"));
        assert!(matches("/fish.php?id=anything", "/fish"));

        assert!(!matches("/Fish.asp", "/fish"));
        assert!(!matches("/catfish", "/fish"));
        assert!(!matches("/?id=fish", "/fish"));
    }

    #[test]
    fn test_empty_pattern_matches_everything() {
        assert!(matches("/", ""));
        assert!(matches("/abc/def", ""));
        assert!(matches("", ""));
    }

    #[test]
    fn test_wildcard() {
        assert!(matches("/filename.php", "/*.php"));
        assert!(matches("/folder/filename.php", "/*.php"));
        assert!(matches("/folder/any.php.file.html", "/*.php"));
        assert!(matches("/filename.php/", "/*.php"));
        assert!(!matches("/", "/*.php"));
        assert!(!matches("/windows.PHP", "/*.php"));

        // A wildcard can match the empty run.
        assert!(matches("/foo/quz", "/foo/*/quz"));
        assert!(matches("/foo//quz", "/foo/*/quz"));
        assert!(matches("/foo/bar/quz", "/foo/*/quz"));
    }

    #[test]
    fn test_trailing_wildcard_is_redundant() {
        for path in ["/fish", "/fish.html", "/fish/salmon.html", "/catfish"] {
            assert_eq!(matches(path, "/fish"), matches(path, "/fish*"));
        }
    }

    #[test]
    fn test_end_anchor() {
        assert!(matches("/filename.php", "/*.php$"));
        assert!(matches("/folder/filename.php", "/*.php$"));
        assert!(!matches("/filename.php?parameters", "/*.php$"));
        assert!(!matches("/filename.php/", "/*.php$"));
        assert!(!matches("/filename.php5", "/*.php$"));

        assert!(matches("/", "/$"));
        assert!(!matches("/page.html", "/$"));
    }

    #[test]
    fn test_dollar_is_literal_elsewhere() {
        assert!(matches("/foo$bar", "/foo$bar"));
        assert!(!matches("/foobar", "/foo$bar"));
    }

    #[test]
    fn test_adversarial_wildcards() {
        // Stacked wildcards must not blow up; the scan stays linear in the
        // scratch buffer regardless of how pathological the pattern is.
        let path = "/a".repeat(1 << 10);
        let pattern = "/*a*a*a*a*a*a*a*a*a*a*a*a*a*a*a*a*b";
        assert!(!matches(&path, pattern));
        assert!(matches(&path, "/*a*a*a*a*a*a*a*a*a*a*a*a*a*a*a*a$"));
    }

    #[test]
    fn test_longest_match_scores() {
        let strategy = LongestMatch;
        assert_eq!(5, strategy.match_allow("/fish/salmon", "/fish"));
        assert_eq!(5, strategy.match_disallow("/fish/salmon", "/fish"));
        assert_eq!(-1, strategy.match_allow("/catfish", "/fish"));
        assert_eq!(-1, strategy.match_disallow("/catfish", "/fish"));
        // An empty pattern matches with zero priority.
        assert_eq!(0, strategy.match_allow("/anything", ""));
    }
}
