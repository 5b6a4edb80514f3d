// Property File Parser
// Parses `key = "value"` configuration files

/// Parse property file content, invoking `handler` for each key-value pair.
///
/// Each line is `key = value`. Blank lines and lines starting with `#` are
/// skipped, a `#` outside quotes starts a trailing comment, and whitespace
/// around keys and values is trimmed. A value wrapped in double quotes is
/// unquoted and may contain `#`. Key case is preserved.
///
/// Lines without `=` are reported through `log` and skipped.
///
/// # Arguments
/// * `data` - The property file content to parse
/// * `handler` - Callback invoked with `(key, value)` for each entry
pub fn parse_propfile(data: &str, handler: &mut dyn FnMut(&str, &str)) {
    for (number, raw) in data.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, rest)) = line.split_once('=') else {
            log::warn!("line {}: key without value: {}", number + 1, line);
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            log::warn!("line {}: value without key", number + 1);
            continue;
        }

        handler(key, parse_value(rest));
    }
}

/// Value part of a line: quoted, or bare up to a trailing comment.
fn parse_value(rest: &str) -> &str {
    let rest = rest.trim_start();
    if let Some(quoted) = rest.strip_prefix('"') {
        match quoted.find('"') {
            Some(end) => return &quoted[..end],
            None => log::warn!("unterminated quote in value: {}", rest),
        }
    }

    let bare = match rest.find('#') {
        Some(hash) => &rest[..hash],
        None => rest,
    };
    bare.trim().trim_matches('"')
}

/// Collect every entry in file order.
pub fn parse_pairs(data: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    parse_propfile(data, &mut |k, v| pairs.push((k.to_string(), v.to_string())));
    pairs
}
