/// Strict, reserved and edition-2018+ keywords, plus prelude items that
/// generated code must not shadow.
const RUST_RESERVED: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try", "union",
    "Some", "None", "Ok", "Err", "Vec", "String", "Box", "Option", "Result", "main", "println",
];

#[derive(Debug, Clone)]
pub struct Dialect {
    pub name: String,
    pub reserved_words: Vec<String>,
}

impl Dialect {
    pub fn rust() -> Self {
        Self {
            name: "rust".to_string(),
            reserved_words: RUST_RESERVED.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_reserved<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved_words.extend(extra.into_iter().map(Into::into));
        self
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::rust()
    }
}

/// Instrumentation and declaration knobs. Every field is off by default.
///
/// `statement_prefix`, `statement_suffix` and `loop_trap` are statement
/// templates; `%1` inside them is replaced with the owning block's id as
/// a string literal.
#[derive(Debug, Clone, Default)]
pub struct GeneratorOptions {
    pub statement_prefix: Option<String>,
    pub statement_suffix: Option<String>,
    pub loop_trap: Option<String>,
    pub developer_variables: Vec<String>,
}

impl GeneratorOptions {
    pub fn has_instrumentation(&self) -> bool {
        self.statement_prefix.is_some() || self.statement_suffix.is_some() || self.loop_trap.is_some()
    }
}

/// Fills a statement template with the block id.
pub fn inject_id(template: &str, block_id: &str) -> String {
    let quoted = format!(
        "\"{}\"",
        block_id.replace('\\', "\\\\").replace('"', "\\\"")
    );
    template.replace("%1", &quoted)
}
