use crate::block::{Block, BlockGraph, BlockId, FieldValue};
use crate::config::{inject_id, Dialect, GeneratorOptions};
use crate::emit;
use crate::error::{GenerateError, GenerateResult};
use crate::names::{developer_key, NameCategory, NameTable};
use crate::precedence::{splice, Precedence};
use crate::registry::{Emission, Registry};
use indexmap::IndexMap;

/// Per-pass state: hoisted definitions and the name table.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub definitions: IndexMap<String, String>,
    pub names: NameTable,
}

impl GenerationContext {
    pub fn new(dialect: &Dialect) -> Self {
        let mut names = NameTable::new(dialect.reserved_words.iter().cloned());
        names.reset();
        Self {
            definitions: IndexMap::new(),
            names,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Generator {
    registry: Registry,
    dialect: Dialect,
    options: GeneratorOptions,
}

impl Generator {
    pub fn new(registry: Registry, dialect: Dialect, options: GeneratorOptions) -> Self {
        Self {
            registry,
            dialect,
            options,
        }
    }

    /// Built-in Rust rules with default options.
    pub fn rust() -> Self {
        Self::new(Registry::with_builtins(), Dialect::rust(), GeneratorOptions::default())
    }

    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Renders every root chain in order. Any error discards the whole
    /// pass.
    pub fn generate(&self, graph: &BlockGraph) -> GenerateResult<String> {
        let mut walker = Walker::new(graph, &self.registry, &self.dialect, &self.options);
        log::debug!(
            "generate: {} root block(s), {} block(s) total",
            graph.roots().len(),
            graph.len()
        );

        if let Some(init) = self.registry.init_hook() {
            init(&mut walker)?;
        }

        let mut body = String::new();
        for &root in graph.roots() {
            body.push_str(&walker.chain_to_code(Some(root))?);
        }
        Ok(walker.finish(body))
    }
}

/// Traversal state handed to every rule.
pub struct Walker<'a> {
    graph: &'a BlockGraph,
    registry: &'a Registry,
    options: &'a GeneratorOptions,
    context: GenerationContext,
    loop_depth: usize,
}

impl<'a> Walker<'a> {
    pub fn new(
        graph: &'a BlockGraph,
        registry: &'a Registry,
        dialect: &Dialect,
        options: &'a GeneratorOptions,
    ) -> Self {
        let mut context = GenerationContext::new(dialect);
        for variable in graph.variables() {
            context.names.set_hint(&variable.id, &variable.name);
        }
        for dev in &options.developer_variables {
            context.names.set_hint(&developer_key(dev), dev);
        }
        Self {
            graph,
            registry,
            options,
            context,
            loop_depth: 0,
        }
    }

    pub fn graph(&self) -> &'a BlockGraph {
        self.graph
    }

    pub fn options(&self) -> &'a GeneratorOptions {
        self.options
    }

    pub fn context(&self) -> &GenerationContext {
        &self.context
    }

    /// Renders a single block through its registered rule.
    pub fn block_to_code(&mut self, id: BlockId) -> GenerateResult<Emission> {
        let graph = self.graph;
        let block = graph.block(id);
        let rule = self
            .registry
            .lookup(&block.block_type)
            .cloned()
            .ok_or_else(|| GenerateError::UnknownBlockType {
                block_type: block.block_type.clone(),
                block_id: block.id.clone(),
            })?;
        log::trace!("emit {} ({})", block.block_type, block.id);
        match rule.emit(block, self)? {
            Emission::Statement(code) => Ok(Emission::Statement(self.wrap_statement(block, code))),
            Emission::Instrumented(code) => Ok(Emission::Statement(code)),
            expr => Ok(expr),
        }
    }

    /// Code for the expression connected at `input`, parenthesized when it
    /// binds looser than `min`. `None` when nothing usable is connected;
    /// the calling rule picks the fallback.
    pub fn value_of(
        &mut self,
        block: &Block,
        input: &str,
        min: Precedence,
    ) -> GenerateResult<Option<String>> {
        let graph = self.graph;
        let Some(child_id) = block.value_input(input) else {
            return Ok(None);
        };
        let child = graph.block(child_id);
        if child.disabled {
            return Ok(None);
        }
        match self.block_to_code(child_id)? {
            Emission::Expression { code, precedence } => {
                if code.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(splice(code, precedence, min)))
                }
            }
            Emission::Statement(_) | Emission::Instrumented(_) => Err(GenerateError::NotAnExpression {
                block_type: child.block_type.clone(),
            }),
        }
    }

    /// Like [`Walker::value_of`] but falls back to `default`.
    pub fn value_or(
        &mut self,
        block: &Block,
        input: &str,
        min: Precedence,
        default: &str,
    ) -> GenerateResult<String> {
        Ok(self
            .value_of(block, input, min)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// For rules whose input has no sensible default.
    pub fn require_value(
        &mut self,
        block: &Block,
        input: &str,
        min: Precedence,
    ) -> GenerateResult<String> {
        self.value_of(block, input, min)?
            .ok_or_else(|| GenerateError::MissingRequiredInput {
                block_type: block.block_type.clone(),
                input: input.to_string(),
            })
    }

    /// The statement chain connected at `input`, unindented. Empty when
    /// nothing is connected.
    pub fn statements_of(&mut self, block: &Block, input: &str) -> GenerateResult<String> {
        self.chain_to_code(block.statement_input(input))
    }

    /// The statement chain at `input`, indented one level for use as the
    /// body of a control structure.
    pub fn branch_of(&mut self, block: &Block, input: &str) -> GenerateResult<String> {
        Ok(emit::indent(&self.statements_of(block, input)?))
    }

    /// A loop body: indented, rendered with `break`/`continue` allowed, and
    /// passed through the configured loop trap.
    pub fn loop_branch_of(&mut self, block: &Block, input: &str) -> GenerateResult<String> {
        self.loop_depth += 1;
        let branch = self.branch_of(block, input);
        self.loop_depth -= 1;
        Ok(self.add_loop_trap(branch?, block))
    }

    /// Splices instrumentation into a loop body. No-op unless configured.
    pub fn add_loop_trap(&self, branch: String, block: &Block) -> String {
        let mut out = branch;
        if let Some(trap) = &self.options.loop_trap {
            out = emit::indent(&emit::terminate(&inject_id(trap, &block.id))) + &out;
        }
        if let Some(suffix) = self.injected_suffix(block) {
            out = emit::indent(&suffix) + &out;
        }
        if let Some(prefix) = self.injected_prefix(block) {
            out.push_str(&emit::indent(&prefix));
        }
        out
    }

    /// The configured statement prefix for `block`, one terminated line.
    pub fn injected_prefix(&self, block: &Block) -> Option<String> {
        self.options
            .statement_prefix
            .as_ref()
            .map(|prefix| emit::terminate(&inject_id(prefix, &block.id)))
    }

    pub fn injected_suffix(&self, block: &Block) -> Option<String> {
        self.options
            .statement_suffix
            .as_ref()
            .map(|suffix| emit::terminate(&inject_id(suffix, &block.id)))
    }

    pub fn in_loop(&self) -> bool {
        self.loop_depth > 0
    }

    pub fn field_text(&self, block: &Block, name: &str) -> Option<String> {
        block.field(name).map(FieldValue::as_text)
    }

    pub fn field_number(&self, block: &Block, name: &str) -> Option<f64> {
        block.field(name).and_then(FieldValue::as_number)
    }

    /// Identifier for the variable referenced by field `name`.
    pub fn variable_name(&mut self, block: &Block, name: &str) -> String {
        let key = block.variable_key(name).unwrap_or_default();
        self.context.names.name_for(&key, NameCategory::Variable)
    }

    pub fn name_for(&mut self, key: &str, category: NameCategory) -> String {
        self.context.names.name_for(key, category)
    }

    pub fn distinct_name(&mut self, hint: &str, category: NameCategory) -> String {
        self.context.names.distinct_name(hint, category)
    }

    /// Stores a fragment to prepend to the output. Writing an existing key
    /// replaces its text in place.
    pub fn add_definition(&mut self, key: &str, code: String) {
        self.context.definitions.insert(key.to_string(), code);
    }

    pub fn has_definition(&self, key: &str) -> bool {
        self.context.definitions.contains_key(key)
    }

    /// Renders a `next` chain. Expression blocks sitting in a chain are
    /// emitted as expression statements.
    fn chain_to_code(&mut self, head: Option<BlockId>) -> GenerateResult<String> {
        let graph = self.graph;
        let mut out = String::new();
        for (id, block) in graph.chain(head) {
            if block.disabled {
                continue;
            }
            match self.block_to_code(id)? {
                Emission::Statement(code) | Emission::Instrumented(code) => out.push_str(&code),
                Emission::Expression { code, .. } => {
                    out.push_str(&self.wrap_statement(block, format!("{};\n", code)));
                }
            }
        }
        Ok(out)
    }

    fn wrap_statement(&self, block: &Block, code: String) -> String {
        let mut out = self.injected_prefix(block).unwrap_or_default();
        out.push_str(&code);
        if let Some(suffix) = self.injected_suffix(block) {
            out.push_str(&suffix);
        }
        out
    }

    fn finish(self, body: String) -> String {
        let definitions = self
            .context
            .definitions
            .values()
            .map(|d| emit::terminate(d))
            .collect::<String>();
        log::debug!(
            "generate: {} definition(s), {} identifier(s) assigned",
            self.context.definitions.len(),
            self.context.names.assigned_count()
        );
        if definitions.is_empty() {
            body
        } else if body.is_empty() {
            definitions
        } else {
            format!("{}\n{}", definitions, body)
        }
    }
}
