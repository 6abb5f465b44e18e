use crate::block::Block;
use crate::error::GenerateResult;
use crate::generator::Walker;
use crate::precedence::Precedence;
use crate::registry::Emission;

pub fn logic_boolean(block: &Block, walker: &mut Walker<'_>) -> GenerateResult<Emission> {
    let code = match walker.field_text(block, "BOOL").as_deref() {
        Some("TRUE") | Some("true") => "true",
        _ => "false",
    };
    Ok(Emission::expr(code, Precedence::ATOMIC))
}

pub fn logic_null(_block: &Block, _walker: &mut Walker<'_>) -> GenerateResult<Emission> {
    Ok(Emission::expr("None", Precedence::ATOMIC))
}

/// `!x`; an empty operand negates `true`.
pub fn logic_negate(block: &Block, walker: &mut Walker<'_>) -> GenerateResult<Emission> {
    let operand = walker.value_or(block, "BOOL", Precedence::UNARY, "true")?;
    Ok(Emission::expr(format!("!{}", operand), Precedence::UNARY))
}

/// Comparison operators are non-associative in Rust, so both operands
/// must bind tighter than a comparison. Missing operands are `0`.
pub fn logic_compare(block: &Block, walker: &mut Walker<'_>) -> GenerateResult<Emission> {
    let op = match walker.field_text(block, "OP").as_deref() {
        Some("NEQ") => "!=",
        Some("LT") => "<",
        Some("LTE") => "<=",
        Some("GT") => ">",
        Some("GTE") => ">=",
        _ => "==",
    };
    let operand = Precedence::COMPARISON.tighter();
    let a = walker.value_or(block, "A", operand, "0")?;
    let b = walker.value_or(block, "B", operand, "0")?;
    Ok(Emission::expr(
        format!("{} {} {}", a, op, b),
        Precedence::COMPARISON,
    ))
}

/// `&&` / `||`. With both operands missing the result is `false`; with one
/// missing it is replaced by the operator's identity.
pub fn logic_operation(block: &Block, walker: &mut Walker<'_>) -> GenerateResult<Emission> {
    let (op, order) = match walker.field_text(block, "OP").as_deref() {
        Some("OR") => ("||", Precedence::LOGICAL_OR),
        _ => ("&&", Precedence::LOGICAL_AND),
    };
    let a = walker.value_of(block, "A", order)?;
    let b = walker.value_of(block, "B", order.tighter())?;
    let identity = if op == "&&" { "true" } else { "false" };
    let (a, b) = match (a, b) {
        (None, None) => ("false".to_string(), "false".to_string()),
        (Some(a), None) => (a, identity.to_string()),
        (None, Some(b)) => (identity.to_string(), b),
        (Some(a), Some(b)) => (a, b),
    };
    Ok(Emission::expr(format!("{} {} {}", a, op, b), order))
}

/// `if c { a } else { b }` as an expression. Condition defaults to `false`,
/// both arms to `None`.
pub fn logic_ternary(block: &Block, walker: &mut Walker<'_>) -> GenerateResult<Emission> {
    let condition = walker.value_or(block, "IF", Precedence::NONE, "false")?;
    let then = walker.value_or(block, "THEN", Precedence::NONE, "None")?;
    let otherwise = walker.value_or(block, "ELSE", Precedence::NONE, "None")?;
    Ok(Emission::expr(
        format!("if {} {{ {} }} else {{ {} }}", condition, then, otherwise),
        Precedence::ASSIGNMENT,
    ))
}

#[cfg(test)]
mod tests {
    use crate::block::{BlockGraph, BlockId};
    use crate::rules::test_support::render;

    fn print(graph: &mut BlockGraph, value: BlockId) {
        let root = graph.builder("text_print").value("TEXT", Some(value)).build();
        graph.push_root(root);
    }

    fn number(graph: &mut BlockGraph, n: f64) -> BlockId {
        graph.builder("math_number").number("NUM", n).build()
    }

    #[test]
    fn or_inside_and_is_parenthesized() {
        let mut graph = BlockGraph::new();
        let t = graph.builder("logic_boolean").text("BOOL", "TRUE").build();
        let f = graph.builder("logic_boolean").text("BOOL", "FALSE").build();
        let or = graph
            .builder("logic_operation")
            .text("OP", "OR")
            .value("A", Some(t))
            .value("B", Some(f))
            .build();
        let t2 = graph.builder("logic_boolean").text("BOOL", "TRUE").build();
        let and = graph
            .builder("logic_operation")
            .text("OP", "AND")
            .value("A", Some(or))
            .value("B", Some(t2))
            .build();
        print(&mut graph, and);
        assert_eq!(render(&graph), "println!(\"{}\", (true || false) && true);\n");
    }

    #[test]
    fn and_inside_or_is_not_parenthesized() {
        let mut graph = BlockGraph::new();
        let t = graph.builder("logic_boolean").text("BOOL", "TRUE").build();
        let f = graph.builder("logic_boolean").text("BOOL", "FALSE").build();
        let and = graph
            .builder("logic_operation")
            .text("OP", "AND")
            .value("A", Some(t))
            .value("B", Some(f))
            .build();
        let or = graph
            .builder("logic_operation")
            .text("OP", "OR")
            .value("A", Some(and))
            .build();
        print(&mut graph, or);
        assert_eq!(render(&graph), "println!(\"{}\", true && false || false);\n");
    }

    #[test]
    fn empty_operation_is_false() {
        let mut graph = BlockGraph::new();
        let op = graph.builder("logic_operation").text("OP", "AND").build();
        print(&mut graph, op);
        assert_eq!(render(&graph), "println!(\"{}\", false && false);\n");
    }

    #[test]
    fn nested_comparison_is_parenthesized() {
        let mut graph = BlockGraph::new();
        let one = number(&mut graph, 1.0);
        let two = number(&mut graph, 2.0);
        let inner = graph
            .builder("logic_compare")
            .text("OP", "LT")
            .value("A", Some(one))
            .value("B", Some(two))
            .build();
        let t = graph.builder("logic_boolean").text("BOOL", "TRUE").build();
        let outer = graph
            .builder("logic_compare")
            .text("OP", "EQ")
            .value("A", Some(inner))
            .value("B", Some(t))
            .build();
        print(&mut graph, outer);
        assert_eq!(render(&graph), "println!(\"{}\", (1 < 2) == true);\n");
    }

    #[test]
    fn negate_defaults_to_true_operand() {
        let mut graph = BlockGraph::new();
        let neg = graph.builder("logic_negate").build();
        print(&mut graph, neg);
        assert_eq!(render(&graph), "println!(\"{}\", !true);\n");
    }

    #[test]
    fn ternary_renders_if_expression() {
        let mut graph = BlockGraph::new();
        let c = graph.builder("logic_boolean").text("BOOL", "TRUE").build();
        let a = number(&mut graph, 1.0);
        let b = number(&mut graph, 2.0);
        let ternary = graph
            .builder("logic_ternary")
            .value("IF", Some(c))
            .value("THEN", Some(a))
            .value("ELSE", Some(b))
            .build();
        print(&mut graph, ternary);
        assert_eq!(
            render(&graph),
            "println!(\"{}\", if true { 1 } else { 2 });\n"
        );
    }
}
