//! Splitting a `.v` source file into statements.

/// Cut `source` into statements.
///
/// A statement ends at a `.` followed by whitespace or the end of input.
/// Dots inside comments (which nest) and string literals do not count, nor
/// does the last dot of a `..` run. Statements are trimmed and empty ones
/// dropped; text after the last terminator is kept as a final statement.
#[must_use]
pub fn split_statements(source: &str) -> Vec<String> {
    let chars: Vec<char> = source.chars().collect();
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut comment_depth = 0usize;
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        let prev = i.checked_sub(1).map(|p| chars[p]);
        current.push(c);

        if in_string {
            if c == '"' {
                if next == Some('"') {
                    current.push('"');
                    i += 2;
                    continue;
                }
                in_string = false;
            }
        } else if c == '(' && next == Some('*') {
            comment_depth += 1;
            current.push('*');
            i += 2;
            continue;
        } else if comment_depth > 0 {
            if c == '*' && next == Some(')') {
                comment_depth -= 1;
                current.push(')');
                i += 2;
                continue;
            }
        } else if c == '"' {
            in_string = true;
        } else if c == '.' && prev != Some('.') && next.map_or(true, char::is_whitespace) {
            push_statement(&mut statements, &current);
            current.clear();
        }

        i += 1;
    }

    push_statement(&mut statements, &current);
    statements
}

fn push_statement(statements: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        statements.push(text.to_string());
    }
}
