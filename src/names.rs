use std::collections::{HashMap, HashSet};

/// Hint key for a developer variable, kept apart from user variable ids.
pub fn developer_key(name: &str) -> String {
    format!("dev:{}", name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameCategory {
    Variable,
    DeveloperVariable,
    Procedure,
}

impl NameCategory {
    fn default_base(self) -> &'static str {
        match self {
            NameCategory::Variable => "var",
            NameCategory::DeveloperVariable => "dev_var",
            NameCategory::Procedure => "func",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NameTable {
    reserved: HashSet<String>,
    hints: HashMap<String, String>,
    assigned: HashMap<(NameCategory, String), String>,
    used: HashSet<String>,
}

impl NameTable {
    pub fn new<I, S>(reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reserved: reserved.into_iter().map(Into::into).collect(),
            hints: HashMap::new(),
            assigned: HashMap::new(),
            used: HashSet::new(),
        }
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }

    /// Records the human-readable name used as the base when `key` is
    /// first resolved.
    pub fn set_hint(&mut self, key: &str, hint: &str) {
        self.hints.insert(key.to_string(), hint.to_string());
    }

    /// Clears every assigned identifier. Reserved words and hints survive.
    pub fn reset(&mut self) {
        self.assigned.clear();
        self.used.clear();
    }

    /// Stable identifier for `key`; repeated calls in one pass agree.
    pub fn name_for(&mut self, key: &str, category: NameCategory) -> String {
        let lookup = (category, key.to_string());
        if let Some(name) = self.assigned.get(&lookup) {
            return name.clone();
        }
        let base = match self.hints.get(key) {
            Some(hint) => safe_name(hint, category),
            None => category.default_base().to_string(),
        };
        let name = self.claim(&base);
        log::trace!("name table: {:?} '{}' -> '{}'", category, key, name);
        self.assigned.insert(lookup, name.clone());
        name
    }

    /// Fresh identifier with no source key behind it (loop counters,
    /// hoisted bounds). Never returns a name already in use.
    pub fn distinct_name(&mut self, hint: &str, category: NameCategory) -> String {
        let base = safe_name(hint, category);
        let name = self.claim(&base);
        log::trace!("name table: distinct {:?} '{}' -> '{}'", category, hint, name);
        name
    }

    pub fn assigned_count(&self) -> usize {
        self.used.len()
    }

    fn claim(&mut self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut suffix = 2usize;
        while self.used.contains(&candidate) || self.reserved.contains(&candidate) {
            candidate = format!("{}{}", base, suffix);
            suffix += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

/// Turns arbitrary user text into something usable as an identifier.
fn safe_name(hint: &str, category: NameCategory) -> String {
    let cleaned = hint
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        return category.default_base().to_string();
    }
    if cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("my_{}", cleaned);
    }
    cleaned
}
