use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct Skill {
    pub id: i64,
    pub name: String,
}

/// Canonical form of a skill name: trimmed and lowercased.
pub fn normalize_skill_name(raw: &str) -> Option<String> {
    let name = raw.trim().to_lowercase();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Normalizes a batch of names, dropping blanks and collapsing duplicates
/// while keeping first-seen order.
pub fn normalize_skill_names<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(raw.len());
    for name in raw.iter().filter_map(|r| normalize_skill_name(r.as_ref())) {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_skill_name("  Python "), Some("python".to_string()));
        assert_eq!(normalize_skill_name("   "), None);
    }

    #[test]
    fn batch_collapses_duplicates_in_order() {
        let names = normalize_skill_names(&["SQL", " python", "sql ", "", "Python"]);
        assert_eq!(names, vec!["sql".to_string(), "python".to_string()]);
    }
}
