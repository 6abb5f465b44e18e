use crate::block::{format_number, Block};
use crate::error::GenerateResult;
use crate::generator::Walker;
use crate::precedence::Precedence;
use crate::registry::Emission;

/// Numeric literal from field `NUM`. A non-numeric field renders `0`.
pub fn math_number(block: &Block, walker: &mut Walker<'_>) -> GenerateResult<Emission> {
    let value = walker.field_number(block, "NUM").unwrap_or(0.0);
    let emission = if value.is_nan() {
        Emission::expr("f64::NAN", Precedence::ATOMIC)
    } else if value.is_infinite() {
        if value > 0.0 {
            Emission::expr("f64::INFINITY", Precedence::ATOMIC)
        } else {
            Emission::expr("-f64::INFINITY", Precedence::UNARY)
        }
    } else if value < 0.0 {
        Emission::expr(format_number(value), Precedence::UNARY)
    } else {
        Emission::expr(format_number(value), Precedence::ATOMIC)
    };
    Ok(emission)
}

/// Binary arithmetic on `A` and `B`, both defaulting to `0`.
pub fn math_arithmetic(block: &Block, walker: &mut Walker<'_>) -> GenerateResult<Emission> {
    let op = walker.field_text(block, "OP").unwrap_or_else(|| "ADD".to_string());
    if op == "POWER" {
        let a = walker.value_or(block, "A", Precedence::NONE, "0")?;
        let b = walker.value_or(block, "B", Precedence::NONE, "0")?;
        return Ok(Emission::expr(
            format!("f64::powf({}, {})", a, b),
            Precedence::CALL,
        ));
    }
    let (symbol, order) = match op.as_str() {
        "MINUS" => ("-", Precedence::ADDITIVE),
        "MULTIPLY" => ("*", Precedence::MULTIPLICATIVE),
        "DIVIDE" => ("/", Precedence::MULTIPLICATIVE),
        _ => ("+", Precedence::ADDITIVE),
    };
    let a = walker.value_or(block, "A", order, "0")?;
    let b = walker.value_or(block, "B", order.tighter(), "0")?;
    Ok(Emission::expr(format!("{} {} {}", a, symbol, b), order))
}

pub fn math_modulo(block: &Block, walker: &mut Walker<'_>) -> GenerateResult<Emission> {
    let order = Precedence::MULTIPLICATIVE;
    let dividend = walker.value_or(block, "DIVIDEND", order, "0")?;
    let divisor = walker.value_or(block, "DIVISOR", order.tighter(), "0")?;
    Ok(Emission::expr(format!("{} % {}", dividend, divisor), order))
}

/// `x += delta;` with `delta` defaulting to `0`.
pub fn math_change(block: &Block, walker: &mut Walker<'_>) -> GenerateResult<Emission> {
    let delta = walker.value_or(block, "DELTA", Precedence::ASSIGNMENT, "0")?;
    let name = walker.variable_name(block, "VAR");
    Ok(Emission::Statement(format!("{} += {};\n", name, delta)))
}

#[cfg(test)]
mod tests {
    use crate::block::{BlockGraph, BlockId};
    use crate::rules::test_support::render;

    fn number(graph: &mut BlockGraph, n: f64) -> BlockId {
        graph.builder("math_number").number("NUM", n).build()
    }

    fn arith(graph: &mut BlockGraph, op: &str, a: BlockId, b: BlockId) -> BlockId {
        graph
            .builder("math_arithmetic")
            .text("OP", op)
            .value("A", Some(a))
            .value("B", Some(b))
            .build()
    }

    fn set_x(graph: &mut BlockGraph, value: BlockId) {
        graph.add_variable("x", "x");
        let root = graph
            .builder("variables_set")
            .var("VAR", "x")
            .value("VALUE", Some(value))
            .build();
        graph.push_root(root);
    }

    #[test]
    fn sum_inside_product_gets_parens() {
        let mut graph = BlockGraph::new();
        let one = number(&mut graph, 1.0);
        let two = number(&mut graph, 2.0);
        let three = number(&mut graph, 3.0);
        let sum = arith(&mut graph, "ADD", one, two);
        let product = arith(&mut graph, "MULTIPLY", sum, three);
        set_x(&mut graph, product);
        assert_eq!(render(&graph), "let mut x;\n\nx = (1 + 2) * 3;\n");
    }

    #[test]
    fn product_inside_sum_has_no_parens() {
        let mut graph = BlockGraph::new();
        let one = number(&mut graph, 1.0);
        let two = number(&mut graph, 2.0);
        let three = number(&mut graph, 3.0);
        let product = arith(&mut graph, "MULTIPLY", two, three);
        let sum = arith(&mut graph, "ADD", one, product);
        set_x(&mut graph, sum);
        assert_eq!(render(&graph), "let mut x;\n\nx = 1 + 2 * 3;\n");
    }

    #[test]
    fn right_nested_subtraction_keeps_grouping() {
        let mut graph = BlockGraph::new();
        let one = number(&mut graph, 1.0);
        let two = number(&mut graph, 2.0);
        let three = number(&mut graph, 3.0);
        let inner = arith(&mut graph, "MINUS", two, three);
        let outer = arith(&mut graph, "MINUS", one, inner);
        set_x(&mut graph, outer);
        assert_eq!(render(&graph), "let mut x;\n\nx = 1 - (2 - 3);\n");
    }

    #[test]
    fn power_uses_function_call_form() {
        let mut graph = BlockGraph::new();
        let two = number(&mut graph, 2.0);
        let three = number(&mut graph, 3.0);
        let pow = arith(&mut graph, "POWER", two, three);
        set_x(&mut graph, pow);
        assert_eq!(render(&graph), "let mut x;\n\nx = f64::powf(2, 3);\n");
    }

    #[test]
    fn negative_literal_needs_no_parens_as_divisor() {
        let mut graph = BlockGraph::new();
        let neg = number(&mut graph, -2.0);
        let three = number(&mut graph, 3.0);
        let modulo = graph
            .builder("math_modulo")
            .value("DIVIDEND", Some(three))
            .value("DIVISOR", Some(neg))
            .build();
        set_x(&mut graph, modulo);
        assert_eq!(render(&graph), "let mut x;\n\nx = 3 % -2;\n");
    }

    #[test]
    fn change_adds_delta() {
        let mut graph = BlockGraph::new();
        graph.add_variable("n", "n");
        let five = number(&mut graph, 5.0);
        let root = graph
            .builder("math_change")
            .var("VAR", "n")
            .value("DELTA", Some(five))
            .build();
        graph.push_root(root);
        assert_eq!(render(&graph), "let mut n;\n\nn += 5;\n");
    }
}
