//! Repository-relative path conventions shared by matrix producers and
//! consumers. Paths use `/` separators, never start with `./` internally, and
//! the repository root is the empty string (rendered as `.`).

pub const REPOSITORY_ROOT: &str = ".";

pub fn normalize_repo_path(raw: &str) -> String {
    let mut value = raw.trim().replace('\\', "/");
    while value.starts_with("./") {
        value = value[2..].to_string();
    }
    let value = value.trim_matches('/');
    if value == "." {
        return String::new();
    }
    value.to_string()
}

/// Render a normalized path for the matrix: the root becomes `.`.
pub fn display_repo_path(path: &str) -> String {
    let normalized = normalize_repo_path(path);
    if normalized.is_empty() {
        REPOSITORY_ROOT.to_string()
    } else {
        normalized
    }
}

/// `./`-prefixed form, for tools that run from the repository root and
/// would otherwise resolve bare names against their own search paths.
pub fn explicit_relative_location(path: &str) -> String {
    if path.starts_with("./") {
        return path.to_string();
    }
    let normalized = normalize_repo_path(path);
    if normalized.is_empty() {
        REPOSITORY_ROOT.to_string()
    } else {
        format!("./{normalized}")
    }
}

pub fn join_repo_path(dir: &str, file: &str) -> String {
    let dir = normalize_repo_path(dir);
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{dir}/{file}")
    }
}

/// `path` followed by each parent directory, ending with the root (`""`).
pub fn ancestors(path: &str) -> Vec<String> {
    let normalized = normalize_repo_path(path);
    let mut segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
    let mut out = Vec::with_capacity(segments.len() + 1);
    loop {
        out.push(segments.join("/"));
        if segments.pop().is_none() {
            break;
        }
    }
    out
}
