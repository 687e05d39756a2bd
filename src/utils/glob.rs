//! Shell-style path globbing (`*`, `?`, `[...]`) with `~` expansion.

use std::path::{Component, Path, PathBuf};

use regex::Regex;

use crate::config::expand_tilde;

fn has_wildcard(segment: &str) -> bool {
    segment.contains(['*', '?', '['])
}

/// Regex class body for the members of a `[...]` glob class. A '-' is a
/// range only between two other members; everything that regex would read
/// as class syntax (`^`, nested `[`, `&&`, `--`, `~~`) is escaped.
fn class_body(members: &[char]) -> String {
    let mut body = String::new();
    for (i, &c) in members.iter().enumerate() {
        let is_range = c == '-'
            && i > 0
            && i + 1 < members.len()
            && members[i - 1] != '-'
            && members[i + 1] != '-';
        if is_range {
            body.push('-');
            continue;
        }
        if matches!(c, '\\' | '^' | '[' | ']' | '&' | '-' | '~') {
            body.push('\\');
        }
        body.push(c);
    }
    body
}

/// Translate one path segment of a glob into an anchored regex.
fn segment_regex(segment: &str) -> Option<Regex> {
    let mut re = String::from("^");
    let mut chars = segment.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            '[' => {
                let negated = chars.peek() == Some(&'!');
                if negated {
                    chars.next();
                }
                let mut members = Vec::new();
                let mut closed = false;
                // a ']' right after the opening bracket is a member
                if chars.peek() == Some(&']') {
                    chars.next();
                    members.push(']');
                }
                for c in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    members.push(c);
                }
                if closed {
                    re.push('[');
                    if negated {
                        re.push('^');
                    }
                    re.push_str(&class_body(&members));
                    re.push(']');
                } else {
                    // unterminated class matches a literal '['
                    re.push_str(&regex::escape("["));
                    if negated {
                        re.push('!');
                    }
                    re.push_str(&regex::escape(&members.iter().collect::<String>()));
                }
            }
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }
    re.push('$');

    Regex::new(&re).ok()
}

/// Entries of `dir` whose file name matches `segment`.
/// Hidden entries only match when the segment itself starts with '.'.
fn matching_children(dir: &Path, segment: &str) -> Vec<PathBuf> {
    let Some(re) = segment_regex(segment) else {
        return Vec::new();
    };
    let read_from = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    let Ok(entries) = std::fs::read_dir(read_from) else {
        return Vec::new();
    };

    let mut matches = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.starts_with('.') && !segment.starts_with('.') {
            continue;
        }
        if re.is_match(name) {
            matches.push(dir.join(name));
        }
    }
    matches
}

/// Expand `~` in `pattern`, then return every existing path it matches,
/// sorted.
pub fn glob_paths(pattern: &str) -> Vec<PathBuf> {
    let expanded = expand_tilde(pattern);
    let mut current: Vec<PathBuf> = vec![PathBuf::new()];

    for component in expanded.components() {
        match component {
            Component::Normal(segment) => {
                let segment = segment.to_string_lossy();
                if has_wildcard(&segment) {
                    current = current
                        .iter()
                        .flat_map(|dir| matching_children(dir, &segment))
                        .collect();
                } else {
                    current = current
                        .into_iter()
                        .map(|dir| dir.join(&*segment))
                        .collect();
                }
            }
            other => {
                current = current
                    .into_iter()
                    .map(|dir| dir.join(other.as_os_str()))
                    .collect();
            }
        }
        if current.is_empty() {
            return current;
        }
    }

    let mut found: Vec<PathBuf> = current
        .into_iter()
        .filter(|p| !p.as_os_str().is_empty() && p.symlink_metadata().is_ok())
        .collect();
    found.sort();
    found
}
