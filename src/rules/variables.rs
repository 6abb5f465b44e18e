use crate::block::{Block, BlockGraph, BlockId};
use crate::error::GenerateResult;
use crate::generator::Walker;
use crate::names::{developer_key, NameCategory};
use crate::precedence::Precedence;
use crate::registry::Emission;
use std::collections::HashSet;

pub const VARIABLES_DEFINITION: &str = "variables";

pub fn variables_get(block: &Block, walker: &mut Walker<'_>) -> GenerateResult<Emission> {
    let name = walker.variable_name(block, "VAR");
    Ok(Emission::expr(name, Precedence::ATOMIC))
}

/// `x = value;` with `value` defaulting to `0`.
pub fn variables_set(block: &Block, walker: &mut Walker<'_>) -> GenerateResult<Emission> {
    let value = walker.value_or(block, "VALUE", Precedence::ASSIGNMENT, "0")?;
    let name = walker.variable_name(block, "VAR");
    Ok(Emission::Statement(format!("{} = {};\n", name, value)))
}

/// Init hook: names every referenced variable up front and declares them
/// all once under [`VARIABLES_DEFINITION`].
pub fn declare_variables(walker: &mut Walker<'_>) -> GenerateResult<()> {
    let graph = walker.graph();
    let mut names = Vec::new();
    for dev in &walker.options().developer_variables {
        names.push(walker.name_for(&developer_key(dev), NameCategory::DeveloperVariable));
    }
    for id in referenced_variables(graph) {
        names.push(walker.name_for(&id, NameCategory::Variable));
    }
    match names.len() {
        0 => {}
        1 => walker.add_definition(VARIABLES_DEFINITION, format!("let mut {};", names[0])),
        _ => {
            let bindings = names
                .iter()
                .map(|n| format!("mut {}", n))
                .collect::<Vec<_>>()
                .join(", ");
            walker.add_definition(VARIABLES_DEFINITION, format!("let ({});", bindings));
        }
    }
    Ok(())
}

/// Variable ids in first-reference order over every enabled block
/// reachable from the roots.
pub fn referenced_variables(graph: &BlockGraph) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for &root in graph.roots() {
        collect_chain(graph, Some(root), &mut seen, &mut out);
    }
    out
}

fn collect_chain(
    graph: &BlockGraph,
    head: Option<BlockId>,
    seen: &mut HashSet<String>,
    out: &mut Vec<String>,
) {
    for (_, block) in graph.chain(head) {
        if block.disabled {
            continue;
        }
        for (name, field) in &block.fields {
            let key = match field.variable_id() {
                Some(id) => id.to_string(),
                None if name == "VAR" => field.as_text(),
                None => continue,
            };
            if seen.insert(key.clone()) {
                out.push(key);
            }
        }
        for child in block.value_inputs.values().flatten() {
            collect_chain(graph, Some(*child), seen, out);
        }
        for head in block.statement_inputs.values().flatten() {
            collect_chain(graph, Some(*head), seen, out);
        }
    }
}
