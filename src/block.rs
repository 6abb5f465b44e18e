use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Variable { id: String },
}

impl FieldValue {
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Variable { id } => id.clone(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
            FieldValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            FieldValue::Variable { .. } => None,
        }
    }

    pub fn variable_id(&self) -> Option<&str> {
        match self {
            FieldValue::Variable { id } => Some(id),
            _ => None,
        }
    }
}

/// Renders a number the way the editor displays it: integral values
/// without a trailing `.0`.
pub fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct Block {
    pub id: String,
    pub block_type: String,
    pub fields: BTreeMap<String, FieldValue>,
    pub value_inputs: BTreeMap<String, Option<BlockId>>,
    pub statement_inputs: BTreeMap<String, Option<BlockId>>,
    pub next: Option<BlockId>,
    pub disabled: bool,
}

impl Block {
    pub fn new(id: impl Into<String>, block_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            block_type: block_type.into(),
            fields: BTreeMap::new(),
            value_inputs: BTreeMap::new(),
            statement_inputs: BTreeMap::new(),
            next: None,
            disabled: false,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Name-table key of the variable a field refers to. A plain text field
    /// names the variable by id.
    pub fn variable_key(&self, name: &str) -> Option<String> {
        self.field(name).map(|field| match field {
            FieldValue::Variable { id } => id.clone(),
            other => other.as_text(),
        })
    }

    /// The block connected to a value input, if any.
    pub fn value_input(&self, name: &str) -> Option<BlockId> {
        self.value_inputs.get(name).copied().flatten()
    }

    /// Head of the chain connected to a statement input, if any.
    pub fn statement_input(&self, name: &str) -> Option<BlockId> {
        self.statement_inputs.get(name).copied().flatten()
    }

    /// True when the input is declared on the block, connected or not.
    pub fn has_input(&self, name: &str) -> bool {
        self.value_inputs.contains_key(name) || self.statement_inputs.contains_key(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableModel {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct BlockGraph {
    blocks: Vec<Block>,
    roots: Vec<BlockId>,
    variables: Vec<VariableModel>,
}

impl BlockGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_block(&mut self, block: Block) -> BlockId {
        let id = BlockId(self.blocks.len());
        self.blocks.push(block);
        id
    }

    pub fn push_root(&mut self, id: BlockId) {
        self.roots.push(id);
    }

    pub fn roots(&self) -> &[BlockId] {
        &self.roots
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.0]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn variables(&self) -> &[VariableModel] {
        &self.variables
    }

    pub fn variable(&self, id: &str) -> Option<&VariableModel> {
        self.variables.iter().find(|v| v.id == id)
    }

    /// Registers a variable unless one with the same id already exists.
    pub fn add_variable(&mut self, id: impl Into<String>, name: impl Into<String>) {
        let id = id.into();
        if self.variable(&id).is_some() {
            return;
        }
        self.variables.push(VariableModel {
            id,
            name: name.into(),
        });
    }

    /// Iterates a statement chain starting at `head`, following `next`.
    pub fn chain(&self, head: Option<BlockId>) -> Chain<'_> {
        Chain {
            graph: self,
            current: head,
        }
    }

    /// Starts a block in this graph; finish it with [`BlockBuilder::build`].
    pub fn builder(&mut self, block_type: &str) -> BlockBuilder<'_> {
        let id = format!("b{}", self.blocks.len() + 1);
        BlockBuilder {
            graph: self,
            block: Block::new(id, block_type),
        }
    }
}

pub struct Chain<'a> {
    graph: &'a BlockGraph,
    current: Option<BlockId>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = (BlockId, &'a Block);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let block = self.graph.block(id);
        self.current = block.next;
        Some((id, block))
    }
}

/// Fluent construction of blocks, used by embedders and tests that
/// assemble graphs without going through a serialized workspace.
pub struct BlockBuilder<'a> {
    graph: &'a mut BlockGraph,
    block: Block,
}

impl<'a> BlockBuilder<'a> {
    pub fn id(mut self, id: &str) -> Self {
        self.block.id = id.to_string();
        self
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.block
            .fields
            .insert(name.to_string(), FieldValue::Text(value.to_string()));
        self
    }

    pub fn number(mut self, name: &str, value: f64) -> Self {
        self.block
            .fields
            .insert(name.to_string(), FieldValue::Number(value));
        self
    }

    pub fn var(mut self, name: &str, variable_id: &str) -> Self {
        self.block.fields.insert(
            name.to_string(),
            FieldValue::Variable {
                id: variable_id.to_string(),
            },
        );
        self
    }

    pub fn value(mut self, name: &str, child: Option<BlockId>) -> Self {
        self.block.value_inputs.insert(name.to_string(), child);
        self
    }

    pub fn statement(mut self, name: &str, head: Option<BlockId>) -> Self {
        self.block.statement_inputs.insert(name.to_string(), head);
        self
    }

    pub fn next(mut self, next: BlockId) -> Self {
        self.block.next = Some(next);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.block.disabled = true;
        self
    }

    pub fn build(self) -> BlockId {
        self.graph.add_block(self.block)
    }
}
