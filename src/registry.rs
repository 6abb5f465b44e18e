use crate::block::Block;
use crate::error::GenerateResult;
use crate::generator::Walker;
use crate::precedence::Precedence;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// What a rule produced for one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    Statement(String),
    /// A statement that already places the configured prefix/suffix
    /// itself; the walker passes it through unwrapped.
    Instrumented(String),
    Expression { code: String, precedence: Precedence },
}

impl Emission {
    pub fn expr(code: impl Into<String>, precedence: Precedence) -> Self {
        Emission::Expression {
            code: code.into(),
            precedence,
        }
    }

    pub fn stmt(code: impl Into<String>) -> Self {
        Emission::Statement(code.into())
    }
}

/// Renders one block type. Rules read the block and recurse into its
/// inputs through the walker; they never mutate the graph.
pub trait EmissionRule: Send + Sync {
    fn emit(&self, block: &Block, walker: &mut Walker<'_>) -> GenerateResult<Emission>;
}

struct FnRule<F>(F);

impl<F> EmissionRule for FnRule<F>
where
    F: Fn(&Block, &mut Walker<'_>) -> GenerateResult<Emission> + Send + Sync,
{
    fn emit(&self, block: &Block, walker: &mut Walker<'_>) -> GenerateResult<Emission> {
        (self.0)(block, walker)
    }
}

pub type InitHook = Arc<dyn Fn(&mut Walker<'_>) -> GenerateResult<()> + Send + Sync>;

#[derive(Clone, Default)]
pub struct Registry {
    rules: HashMap<String, Arc<dyn EmissionRule>>,
    init: Option<InitHook>,
}

impl Registry {
    /// An empty registry: every block type is unknown until registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// The Rust rule set plus the variable-declaration init hook.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::rules::register_builtins(&mut registry);
        registry
    }

    /// Later registrations for the same type replace earlier ones.
    pub fn register<R>(&mut self, block_type: &str, rule: R)
    where
        R: EmissionRule + 'static,
    {
        if self
            .rules
            .insert(block_type.to_string(), Arc::new(rule))
            .is_some()
        {
            log::debug!("registry: overriding rule for '{}'", block_type);
        }
    }

    pub fn register_fn<F>(&mut self, block_type: &str, rule: F)
    where
        F: Fn(&Block, &mut Walker<'_>) -> GenerateResult<Emission> + Send + Sync + 'static,
    {
        self.register(block_type, FnRule(rule));
    }

    pub fn lookup(&self, block_type: &str) -> Option<&Arc<dyn EmissionRule>> {
        self.rules.get(block_type)
    }

    pub fn contains(&self, block_type: &str) -> bool {
        self.rules.contains_key(block_type)
    }

    /// Registered types, sorted.
    pub fn types(&self) -> Vec<&str> {
        let mut out = self.rules.keys().map(String::as_str).collect::<Vec<_>>();
        out.sort_unstable();
        out
    }

    /// Runs once per pass before any root block is rendered.
    pub fn set_init<F>(&mut self, hook: F)
    where
        F: Fn(&mut Walker<'_>) -> GenerateResult<()> + Send + Sync + 'static,
    {
        self.init = Some(Arc::new(hook));
    }

    pub fn clear_init(&mut self) {
        self.init = None;
    }

    pub fn init_hook(&self) -> Option<&InitHook> {
        self.init.as_ref()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.types())
            .field("has_init", &self.init.is_some())
            .finish()
    }
}
