pub const INDENT: &str = "  ";

/// Prefixes every non-empty line of `text` with `prefix`.
pub fn prefix_lines(text: &str, prefix: &str) -> String {
    if text.is_empty() || prefix.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + prefix.len() * 4);
    for line in text.split_inclusive('\n') {
        if line != "\n" {
            out.push_str(prefix);
        }
        out.push_str(line);
    }
    out
}

pub fn indent(text: &str) -> String {
    prefix_lines(text, INDENT)
}

/// Makes sure a fragment ends with exactly one line terminator.
pub fn terminate(text: &str) -> String {
    let mut out = text.trim_end_matches('\n').to_string();
    out.push('\n');
    out
}
