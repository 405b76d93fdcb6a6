use crate::error::Error;

/// Characters forbidden in Windows file names and their full-width stand-ins.
pub const CHAR_REPLACEMENTS: [(char, char); 9] = [
    ('<', '＜'),
    ('>', '＞'),
    (':', '：'),
    ('"', '＂'),
    ('/', '／'),
    ('\\', '＼'),
    ('|', '｜'),
    ('?', '？'),
    ('*', '＊'),
];

pub fn replace_forbidden(input: &str) -> String {
    input
        .chars()
        .map(|c| {
            CHAR_REPLACEMENTS
                .iter()
                .find(|(from, _)| *from == c)
                .map_or(c, |(_, to)| *to)
        })
        .collect()
}

// Windows rejects names ending in a dot or space.
fn trim_name(input: &str) -> &str {
    input
        .trim_start()
        .trim_end_matches(|c: char| c.is_whitespace() || c == '.')
}

/// Turn a raw title into a file-name-safe string of at most `max_length`
/// characters.
pub fn sanitize_title(title: &str, max_length: usize) -> Result<String, Error> {
    let replaced = replace_forbidden(title);
    let mut sanitized = trim_name(&replaced).to_string();

    if sanitized.chars().count() > max_length {
        let truncated: String = sanitized.chars().take(max_length).collect();
        sanitized = trim_name(&truncated).to_string();
    }

    if sanitized.is_empty() {
        return Err(Error::EmptyTitle(title.to_string()));
    }
    Ok(sanitized)
}

/// Compose `[<identifier>_]<title>[.<suffix>]` with the title cut so the whole
/// name fits in `max_length` characters. Identifier and suffix are never cut.
pub fn compose_name(
    identifier: Option<&str>,
    title: &str,
    suffix: Option<&str>,
    max_length: usize,
) -> Result<String, Error> {
    let reserved = identifier.map_or(0, |id| id.chars().count() + 1)
        + suffix.map_or(0, |s| s.chars().count() + 1);
    let sanitized = sanitize_title(title, max_length.saturating_sub(reserved))?;

    let mut name = String::with_capacity(sanitized.len() + reserved);
    if let Some(id) = identifier {
        name.push_str(id);
        name.push('_');
    }
    name.push_str(&sanitized);
    if let Some(suffix) = suffix {
        name.push('.');
        name.push_str(suffix);
    }
    Ok(name)
}
