use crate::block::{Block, BlockGraph, BlockId, FieldValue};
use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use xmltree::{Element, XMLNode};

/// Input names that hold statement chains when a document files every
/// input under `inputs`.
const STATEMENT_INPUT_PATTERN: &str = r"^(DO\d*|ELSE|STACK|SUBSTACK\d*)$";

pub fn load_workspace_file(path: &Path) -> Result<BlockGraph> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'.", path.display()))?;
    let is_xml = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("xml"))
        .unwrap_or(false);
    if is_xml {
        load_workspace_xml(&text).with_context(|| format!("Invalid workspace XML '{}'.", path.display()))
    } else {
        load_workspace_json(&text)
            .with_context(|| format!("Invalid workspace JSON '{}'.", path.display()))
    }
}

struct Loader {
    graph: BlockGraph,
    statement_inputs: Regex,
}

impl Loader {
    fn new() -> Result<Self> {
        Ok(Self {
            graph: BlockGraph::new(),
            statement_inputs: Regex::new(STATEMENT_INPUT_PATTERN)?,
        })
    }

    fn register_variable_field(&mut self, id: &str, name: Option<&str>) {
        self.graph.add_variable(id, name.unwrap_or(id));
    }

    /// Orders top blocks the way the editor lists them: by `y`, then `x`.
    /// Blocks without coordinates keep document order after positioned ones.
    fn push_roots(&mut self, mut tops: Vec<(BlockId, Option<i64>, Option<i64>)>) {
        tops.sort_by_key(|(_, x, y)| (y.unwrap_or(i64::MAX), x.unwrap_or(i64::MAX)));
        for (id, _, _) in tops {
            self.graph.push_root(id);
        }
    }
}

pub fn load_workspace_json(text: &str) -> Result<BlockGraph> {
    let doc: Value = serde_json::from_str(text).context("Workspace is not valid JSON.")?;
    let mut loader = Loader::new()?;

    if let Some(vars) = doc.get("variables").and_then(Value::as_array) {
        for var in vars {
            let id = var
                .get("id")
                .and_then(Value::as_str)
                .ok_or_else(|| anyhow!("Variable entry missing 'id'."))?;
            let name = var.get("name").and_then(Value::as_str).unwrap_or(id);
            loader.graph.add_variable(id, name);
        }
    }

    let top_blocks = match doc.get("blocks") {
        Some(Value::Array(arr)) => arr.as_slice(),
        Some(Value::Object(obj)) => obj
            .get("blocks")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        Some(_) => bail!("'blocks' must be an array or an object with a 'blocks' array."),
        None => &[],
    };

    let mut tops = Vec::new();
    for top in top_blocks {
        let id = json_block(&mut loader, top)?;
        let x = top.get("x").and_then(Value::as_i64);
        let y = top.get("y").and_then(Value::as_i64);
        tops.push((id, x, y));
    }
    loader.push_roots(tops);
    Ok(loader.graph)
}

fn json_block(loader: &mut Loader, node: &Value) -> Result<BlockId> {
    let obj = node
        .as_object()
        .ok_or_else(|| anyhow!("Block entry must be an object."))?;
    let block_id = obj
        .get("id")
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .unwrap_or_else(|| format!("block{}", loader.graph.len() + 1));
    let block_type = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("Block '{}' missing 'type'.", block_id))?;

    let mut block = Block::new(block_id.clone(), block_type);
    block.disabled = obj.get("enabled").and_then(Value::as_bool) == Some(false)
        || obj.get("disabled").and_then(Value::as_bool) == Some(true);

    if let Some(fields) = obj.get("fields").and_then(Value::as_object) {
        for (name, value) in fields {
            let field = json_field(loader, name, value)
                .with_context(|| format!("Block '{}' field '{}'.", block_id, name))?;
            block.fields.insert(name.clone(), field);
        }
    }

    if let Some(inputs) = obj.get("inputs").and_then(Value::as_object) {
        for (name, input) in inputs {
            let child = json_connection(loader, input)
                .with_context(|| format!("Block '{}' input '{}'.", block_id, name))?;
            if loader.statement_inputs.is_match(name) {
                block.statement_inputs.insert(name.clone(), child);
            } else {
                block.value_inputs.insert(name.clone(), child);
            }
        }
    }
    if let Some(statements) = obj.get("statements").and_then(Value::as_object) {
        for (name, input) in statements {
            let child = json_connection(loader, input)
                .with_context(|| format!("Block '{}' statement '{}'.", block_id, name))?;
            block.statement_inputs.insert(name.clone(), child);
        }
    }

    if let Some(extra) = obj.get("extraState").and_then(Value::as_object) {
        apply_if_shape(&mut block, extra_count(extra, "elseIfCount"), extra_flag(extra, "hasElse"));
    }

    if let Some(next) = obj.get("next") {
        block.next = json_connection(loader, next)
            .with_context(|| format!("Block '{}' next.", block_id))?;
    }

    Ok(loader.graph.add_block(block))
}

/// A connection object: `{ "block": {...}, "shadow": {...} }`. A real block
/// wins over its shadow.
fn json_connection(loader: &mut Loader, input: &Value) -> Result<Option<BlockId>> {
    if let Some(child) = input.get("block") {
        return json_block(loader, child).map(Some);
    }
    if let Some(shadow) = input.get("shadow") {
        return json_block(loader, shadow).map(Some);
    }
    Ok(None)
}

fn json_field(loader: &mut Loader, name: &str, value: &Value) -> Result<FieldValue> {
    Ok(match value {
        Value::String(s) if name == "VAR" => {
            loader.register_variable_field(s, None);
            FieldValue::Variable { id: s.clone() }
        }
        Value::String(s) => FieldValue::Text(s.clone()),
        Value::Number(n) => FieldValue::Number(n.as_f64().unwrap_or(0.0)),
        Value::Bool(b) => FieldValue::Bool(*b),
        Value::Object(obj) => {
            let id = obj
                .get("id")
                .and_then(Value::as_str)
                .ok_or_else(|| anyhow!("Variable field missing 'id'."))?;
            loader.register_variable_field(id, obj.get("name").and_then(Value::as_str));
            FieldValue::Variable { id: id.to_string() }
        }
        Value::Null => FieldValue::Text(String::new()),
        Value::Array(_) => bail!("Array field values are not supported."),
    })
}

fn extra_count(extra: &Map<String, Value>, key: &str) -> usize {
    extra.get(key).and_then(Value::as_u64).unwrap_or(0) as usize
}

fn extra_flag(extra: &Map<String, Value>, key: &str) -> bool {
    extra.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Declares the `IFn`/`DOn`/`ELSE` inputs implied by a branching block's
/// shape, so unconnected clauses still render.
fn apply_if_shape(block: &mut Block, else_if_count: usize, has_else: bool) {
    for n in 0..=else_if_count {
        block.value_inputs.entry(format!("IF{}", n)).or_insert(None);
        block.statement_inputs.entry(format!("DO{}", n)).or_insert(None);
    }
    if has_else {
        block.statement_inputs.entry("ELSE".to_string()).or_insert(None);
    }
}

pub fn load_workspace_xml(text: &str) -> Result<BlockGraph> {
    let root = Element::parse(text.as_bytes())
        .map_err(|e| anyhow!("Workspace is not valid XML: {}.", e))?;
    let mut loader = Loader::new()?;

    if let Some(vars) = root.get_child("variables") {
        for var in child_elements(vars).filter(|e| e.name == "variable") {
            let name = element_text(var);
            let id = var.attributes.get("id").cloned().unwrap_or_else(|| name.clone());
            loader.graph.add_variable(id, name);
        }
    }

    let mut tops = Vec::new();
    for top in child_elements(&root).filter(|e| e.name == "block" || e.name == "shadow") {
        let id = xml_block(&mut loader, top)?;
        let x = top.attributes.get("x").and_then(|v| v.parse::<i64>().ok());
        let y = top.attributes.get("y").and_then(|v| v.parse::<i64>().ok());
        tops.push((id, x, y));
    }
    loader.push_roots(tops);
    Ok(loader.graph)
}

fn xml_block(loader: &mut Loader, elem: &Element) -> Result<BlockId> {
    let block_id = elem
        .attributes
        .get("id")
        .cloned()
        .unwrap_or_else(|| format!("block{}", loader.graph.len() + 1));
    let block_type = elem
        .attributes
        .get("type")
        .ok_or_else(|| anyhow!("Block '{}' missing 'type'.", block_id))?;
    let mut block = Block::new(block_id.clone(), block_type.as_str());
    block.disabled = elem
        .attributes
        .get("disabled")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    for child in child_elements(elem) {
        let name = child.attributes.get("name").cloned().unwrap_or_default();
        match child.name.as_str() {
            "field" => {
                let text = element_text(child);
                let field = if let Some(id) = child.attributes.get("id") {
                    loader.register_variable_field(id, Some(&text));
                    FieldValue::Variable { id: id.clone() }
                } else if name == "VAR" {
                    loader.register_variable_field(&text, Some(&text));
                    FieldValue::Variable { id: text }
                } else {
                    FieldValue::Text(text)
                };
                block.fields.insert(name, field);
            }
            "value" => {
                let target = xml_connection(loader, child)
                    .with_context(|| format!("Block '{}' value '{}'.", block_id, name))?;
                block.value_inputs.insert(name, target);
            }
            "statement" => {
                let target = xml_connection(loader, child)
                    .with_context(|| format!("Block '{}' statement '{}'.", block_id, name))?;
                block.statement_inputs.insert(name, target);
            }
            "next" => {
                block.next = xml_connection(loader, child)
                    .with_context(|| format!("Block '{}' next.", block_id))?;
            }
            "mutation" => {
                let else_if = child
                    .attributes
                    .get("elseif")
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(0);
                let has_else = child
                    .attributes
                    .get("else")
                    .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                    .unwrap_or(false);
                apply_if_shape(&mut block, else_if, has_else);
            }
            _ => {}
        }
    }

    Ok(loader.graph.add_block(block))
}

fn xml_connection(loader: &mut Loader, elem: &Element) -> Result<Option<BlockId>> {
    let mut shadow = None;
    for child in child_elements(elem) {
        match child.name.as_str() {
            "block" => return xml_block(loader, child).map(Some),
            "shadow" => shadow = Some(child),
            _ => {}
        }
    }
    match shadow {
        Some(s) => xml_block(loader, s).map(Some),
        None => Ok(None),
    }
}

fn child_elements(elem: &Element) -> impl Iterator<Item = &Element> {
    elem.children.iter().filter_map(XMLNode::as_element)
}

fn element_text(elem: &Element) -> String {
    elem.get_text().map(|t| t.trim().to_string()).unwrap_or_default()
}
