use std::borrow::Cow;

/// Extracts the path, params and query from a URI, dropping the scheme,
/// authority and fragment. The result always begins with `/`; a URI without
/// a usable path (including a fragment-only URI) yields `/`.
///
/// Rule patterns only ever describe the path side of a URI, so this is the
/// portion the matcher compares against.
pub fn path_params_query(uri: &str) -> Cow<'_, str> {
    let bytes = uri.as_bytes();

    // Initial two slashes are ignored.
    let search_start = if bytes.starts_with(b"//") { 2 } else { 0 };

    let early_path = find_first_of(bytes, b"/?;", search_start);
    let mut protocol_end = find_from(bytes, b"://", search_start);
    if let (Some(early), Some(proto)) = (early_path, protocol_end) {
        if early < proto {
            // A path, param or query before "://" means it is not a scheme.
            protocol_end = None;
        }
    }
    let scan_from = match protocol_end {
        Some(end) => end + 3,
        None => search_start,
    };

    if let Some(path_start) = find_first_of(bytes, b"/?;", scan_from) {
        let hash_pos = find_first_of(bytes, b"#", search_start);
        if let Some(hash) = hash_pos {
            if hash < path_start {
                return Cow::Borrowed("/");
            }
        }
        let path_end = hash_pos.unwrap_or(bytes.len());
        if bytes[path_start] != b'/' {
            return Cow::Owned(format!("/{}", &uri[path_start..path_end]));
        }
        return Cow::Borrowed(&uri[path_start..path_end]);
    }

    Cow::Borrowed("/")
}

fn find_first_of(haystack: &[u8], set: &[u8], from: usize) -> Option<usize> {
    haystack[from..]
        .iter()
        .position(|b| set.contains(b))
        .map(|i| i + from)
}

fn find_from(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|i| i + from)
}
