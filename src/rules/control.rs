use crate::block::{format_number, Block};
use crate::emit;
use crate::error::{GenerateError, GenerateResult};
use crate::generator::Walker;
use crate::names::NameCategory;
use crate::precedence::Precedence;
use crate::registry::Emission;
use regex::Regex;
use std::sync::OnceLock;

/// `if`/`else if`/`else` chain. Inputs `IF0`/`DO0`, `IF1`/`DO1`, ... and an
/// optional `ELSE`. A missing condition renders as `false`.
///
/// Places its own instrumentation: the statement prefix once before the
/// `if`, and the statement suffix at the top of every branch. With a suffix
/// configured an `else` branch is always emitted so the suffix runs on
/// every path.
pub fn controls_if(block: &Block, walker: &mut Walker<'_>) -> GenerateResult<Emission> {
    let mut code = walker.injected_prefix(block).unwrap_or_default();
    let suffix = walker.injected_suffix(block).map(|s| emit::indent(&s));
    let suffix_text = suffix.as_deref().unwrap_or("");
    let mut n = 0usize;
    loop {
        let condition = walker.value_or(block, &format!("IF{}", n), Precedence::NONE, "false")?;
        let branch = walker.branch_of(block, &format!("DO{}", n))?;
        if n > 0 {
            code.push_str(" else ");
        }
        code.push_str(&format!("if {} {{\n{}{}}}", condition, suffix_text, branch));
        n += 1;
        if !block.has_input(&format!("IF{}", n)) {
            break;
        }
    }
    if block.has_input("ELSE") || suffix.is_some() {
        let branch = walker.branch_of(block, "ELSE")?;
        code.push_str(&format!(" else {{\n{}{}}}", suffix_text, branch));
    }
    code.push('\n');
    Ok(Emission::Instrumented(code))
}

/// Counted loop. `TIMES` is either a number field or a value input; an
/// unconnected input repeats zero times. Bounds that are not a bare
/// identifier or number are evaluated once into a temporary. A literal
/// count with a fraction is truncated toward zero, so `2.5` repeats twice.
pub fn controls_repeat(block: &Block, walker: &mut Walker<'_>) -> GenerateResult<Emission> {
    let repeats = match block.field("TIMES") {
        Some(field) => format_number(
            field
                .as_number()
                .filter(|n| n.is_finite())
                .unwrap_or(0.0)
                .trunc(),
        ),
        None => {
            let code = walker.value_or(block, "TIMES", Precedence::ASSIGNMENT, "0")?;
            match code.parse::<f64>() {
                Ok(n) if n.is_finite() => format_number(n.trunc()),
                _ => code,
            }
        }
    };

    let mut code = String::new();
    let loop_var = walker.distinct_name("count", NameCategory::Variable);
    let mut end = repeats.clone();
    if !is_simple_bound(&repeats) {
        end = walker.distinct_name("repeat_end", NameCategory::Variable);
        code.push_str(&format!("let {} = {};\n", end, repeats));
    }
    let branch = walker.loop_branch_of(block, "DO")?;
    code.push_str(&format!("for {} in 0..{} {{\n{}}}\n", loop_var, end, branch));
    Ok(Emission::Statement(code))
}

/// `while` / repeat-until. Until-mode loops over the negated condition.
/// With no condition connected the loop is unconditional.
pub fn controls_while_until(block: &Block, walker: &mut Walker<'_>) -> GenerateResult<Emission> {
    let until = walker.field_text(block, "MODE").as_deref() == Some("UNTIL");
    let min = if until {
        Precedence::UNARY
    } else {
        Precedence::NONE
    };
    let condition = walker.value_of(block, "BOOL", min)?;
    let branch = walker.loop_branch_of(block, "DO")?;
    let code = match condition {
        None => format!("loop {{\n{}}}\n", branch),
        Some(cond) if until => format!("while !{} {{\n{}}}\n", cond, branch),
        Some(cond) => format!("while {} {{\n{}}}\n", cond, branch),
    };
    Ok(Emission::Statement(code))
}

/// Inclusive counting loop over a user variable. `FROM`/`TO` fall back to
/// `0`, `BY` to `1`. Literal bounds that count down iterate in reverse.
/// Any other bounds pick the direction at run time through a boxed
/// iterator; compound bounds and steps are evaluated once into temporaries.
pub fn controls_for(block: &Block, walker: &mut Walker<'_>) -> GenerateResult<Emission> {
    let var = walker.variable_name(block, "VAR");
    let operand = Precedence::RANGE.tighter();
    let from = walker.value_or(block, "FROM", operand, "0")?;
    let to = walker.value_or(block, "TO", operand, "0")?;
    let step = walker.value_or(block, "BY", Precedence::CAST, "1")?;
    let step = step.trim_start_matches('-').to_string();
    let branch = walker.loop_branch_of(block, "DO")?;

    if let (Ok(a), Ok(b)) = (from.parse::<f64>(), to.parse::<f64>()) {
        let range = if a > b {
            format!("({}..={}).rev()", to, from)
        } else {
            format!("{}..={}", from, to)
        };
        return Ok(Emission::Statement(format!(
            "for {} in {} {{\n{}}}\n",
            var,
            step_range(range, &step),
            branch
        )));
    }

    let mut code = String::new();
    let from = hoist_bound(walker, &mut code, &format!("{}_start", var), from);
    let to = hoist_bound(walker, &mut code, &format!("{}_end", var), to);
    let step = hoist_bound(walker, &mut code, &format!("{}_step", var), step);
    let range_var = walker.distinct_name(&format!("{}_range", var), NameCategory::Variable);
    code.push_str(&format!(
        "let {}: Box<dyn Iterator<Item = _>> = if {} <= {} {{ Box::new({}) }} else {{ Box::new({}) }};\n",
        range_var,
        from,
        to,
        step_range(format!("{}..={}", from, to), &step),
        step_range(format!("({}..={}).rev()", to, from), &step),
    ));
    code.push_str(&format!("for {} in {} {{\n{}}}\n", var, range_var, branch));
    Ok(Emission::Statement(code))
}

fn step_range(range: String, step: &str) -> String {
    if step == "1" {
        return range;
    }
    let range = if range.starts_with('(') {
        range
    } else {
        format!("({})", range)
    };
    format!("{}.step_by({} as usize)", range, step)
}

/// Binds a compound bound to a fresh `let` so it is evaluated once.
fn hoist_bound(walker: &mut Walker<'_>, code: &mut String, hint: &str, bound: String) -> String {
    if is_simple_bound(&bound) {
        return bound;
    }
    let name = walker.distinct_name(hint, NameCategory::Variable);
    code.push_str(&format!("let {} = {};\n", name, bound));
    name
}

/// `break` / `continue`. Outside a loop this renders a comment instead of
/// code that would not compile.
pub fn controls_flow_statements(
    block: &Block,
    walker: &mut Walker<'_>,
) -> GenerateResult<Emission> {
    let keyword = match walker.field_text(block, "FLOW").as_deref() {
        Some("BREAK") => "break",
        Some("CONTINUE") => "continue",
        _ => {
            return Err(GenerateError::MissingRequiredInput {
                block_type: block.block_type.clone(),
                input: "FLOW".to_string(),
            })
        }
    };
    if !walker.in_loop() {
        return Ok(Emission::Statement(format!(
            "// {} outside of a loop\n",
            keyword
        )));
    }
    Ok(Emission::Statement(format!("{};\n", keyword)))
}

fn is_simple_bound(code: &str) -> bool {
    static SIMPLE: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = SIMPLE.get_or_init(|| Regex::new(r"^(\w+|-?\d+(\.\d+)?([eE][-+]?\d+)?)$").ok());
    match pattern {
        Some(re) => re.is_match(code),
        None => code.parse::<f64>().is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockGraph;
    use crate::config::GeneratorOptions;
    use crate::generator::Generator;
    use crate::rules::test_support::render;

    #[test]
    fn simple_bounds_are_identifiers_and_numbers() {
        assert!(is_simple_bound("10"));
        assert!(is_simple_bound("-3"));
        assert!(is_simple_bound("2.5"));
        assert!(is_simple_bound("limit"));
        assert!(!is_simple_bound("limit + 1"));
        assert!(!is_simple_bound("f64::powf(2, 3)"));
    }

    #[test]
    fn if_without_elseif_is_a_plain_two_way_test() {
        let mut graph = BlockGraph::new();
        let cond = graph.builder("logic_boolean").text("BOOL", "TRUE").build();
        let root = graph
            .builder("controls_if")
            .value("IF0", Some(cond))
            .statement("DO0", None)
            .statement("ELSE", None)
            .build();
        graph.push_root(root);
        assert_eq!(render(&graph), "if true {\n} else {\n}\n");
    }

    #[test]
    fn missing_condition_renders_false() {
        let mut graph = BlockGraph::new();
        let root = graph.builder("controls_if").build();
        graph.push_root(root);
        assert_eq!(render(&graph), "if false {\n}\n");
    }

    #[test]
    fn while_until_negates_condition() {
        let mut graph = BlockGraph::new();
        graph.add_variable("v", "done");
        let get = graph.builder("variables_get").var("VAR", "v").build();
        let root = graph
            .builder("controls_whileUntil")
            .text("MODE", "UNTIL")
            .value("BOOL", Some(get))
            .build();
        graph.push_root(root);
        assert_eq!(render(&graph), "let mut done;\n\nwhile !done {\n}\n");
    }

    #[test]
    fn until_wraps_looser_conditions() {
        let mut graph = BlockGraph::new();
        let a = graph.builder("math_number").number("NUM", 1.0).build();
        let b = graph.builder("math_number").number("NUM", 2.0).build();
        let cmp = graph
            .builder("logic_compare")
            .text("OP", "LT")
            .value("A", Some(a))
            .value("B", Some(b))
            .build();
        let root = graph
            .builder("controls_whileUntil")
            .text("MODE", "UNTIL")
            .value("BOOL", Some(cmp))
            .build();
        graph.push_root(root);
        assert_eq!(render(&graph), "while !(1 < 2) {\n}\n");
    }

    #[test]
    fn while_without_condition_is_infinite() {
        let mut graph = BlockGraph::new();
        let brk = graph.builder("controls_flow_statements").text("FLOW", "BREAK").build();
        let root = graph
            .builder("controls_whileUntil")
            .text("MODE", "WHILE")
            .statement("DO", Some(brk))
            .build();
        graph.push_root(root);
        assert_eq!(render(&graph), "loop {\n  break;\n}\n");
    }

    #[test]
    fn flow_statement_outside_loop_is_commented() {
        let mut graph = BlockGraph::new();
        let root = graph
            .builder("controls_flow_statements")
            .text("FLOW", "CONTINUE")
            .build();
        graph.push_root(root);
        assert_eq!(render(&graph), "// continue outside of a loop\n");
    }

    #[test]
    fn for_loop_counts_down_with_literal_bounds() {
        let mut graph = BlockGraph::new();
        graph.add_variable("i", "i");
        let from = graph.builder("math_number").number("NUM", 10.0).build();
        let to = graph.builder("math_number").number("NUM", 1.0).build();
        let by = graph.builder("math_number").number("NUM", 2.0).build();
        let root = graph
            .builder("controls_for")
            .var("VAR", "i")
            .value("FROM", Some(from))
            .value("TO", Some(to))
            .value("BY", Some(by))
            .build();
        graph.push_root(root);
        assert_eq!(
            render(&graph),
            "let mut i;\n\nfor i in (1..=10).rev().step_by(2 as usize) {\n}\n"
        );
    }

    #[test]
    fn repeat_field_with_fraction_truncates() {
        let mut graph = BlockGraph::new();
        let root = graph.builder("controls_repeat").number("TIMES", 2.5).build();
        graph.push_root(root);
        assert_eq!(render(&graph), "for count in 0..2 {\n}\n");
    }

    #[test]
    fn repeat_input_with_fraction_truncates() {
        let mut graph = BlockGraph::new();
        let times = graph.builder("math_number").number("NUM", 3.7).build();
        let root = graph
            .builder("controls_repeat_ext")
            .value("TIMES", Some(times))
            .build();
        graph.push_root(root);
        assert_eq!(render(&graph), "for count in 0..3 {\n}\n");
    }

    #[test]
    fn for_loop_with_variable_bound_picks_direction_at_run_time() {
        let mut graph = BlockGraph::new();
        graph.add_variable("i", "i");
        graph.add_variable("n", "n");
        let from = graph.builder("variables_get").var("VAR", "n").build();
        let to = graph.builder("math_number").number("NUM", 1.0).build();
        let root = graph
            .builder("controls_for")
            .var("VAR", "i")
            .value("FROM", Some(from))
            .value("TO", Some(to))
            .build();
        graph.push_root(root);
        assert_eq!(
            render(&graph),
            "let (mut i, mut n);\n\n\
             let i_range: Box<dyn Iterator<Item = _>> = \
             if n <= 1 { Box::new(n..=1) } else { Box::new((1..=n).rev()) };\n\
             for i in i_range {\n}\n"
        );
    }

    #[test]
    fn for_loop_hoists_compound_bound_and_step() {
        let mut graph = BlockGraph::new();
        graph.add_variable("i", "i");
        graph.add_variable("n", "n");
        let n = graph.builder("variables_get").var("VAR", "n").build();
        let one = graph.builder("math_number").number("NUM", 1.0).build();
        let sum = graph
            .builder("math_arithmetic")
            .text("OP", "ADD")
            .value("A", Some(n))
            .value("B", Some(one))
            .build();
        let by = graph.builder("math_number").number("NUM", 2.0).build();
        let root = graph
            .builder("controls_for")
            .var("VAR", "i")
            .value("TO", Some(sum))
            .value("BY", Some(by))
            .build();
        graph.push_root(root);
        assert_eq!(
            render(&graph),
            "let (mut i, mut n);\n\n\
             let i_end = n + 1;\n\
             let i_range: Box<dyn Iterator<Item = _>> = \
             if 0 <= i_end { Box::new((0..=i_end).step_by(2 as usize)) } \
             else { Box::new((i_end..=0).rev().step_by(2 as usize)) };\n\
             for i in i_range {\n}\n"
        );
    }

    #[test]
    fn if_places_suffix_on_every_branch() {
        let mut graph = BlockGraph::new();
        let cond = graph.builder("logic_boolean").text("BOOL", "TRUE").build();
        let print = graph.builder("text_print").id("p").build();
        let root = graph
            .builder("controls_if")
            .id("i")
            .value("IF0", Some(cond))
            .statement("DO0", Some(print))
            .build();
        graph.push_root(root);
        let options = GeneratorOptions {
            statement_suffix: Some("done(%1);".to_string()),
            ..GeneratorOptions::default()
        };
        let code = Generator::rust()
            .with_options(options)
            .generate(&graph)
            .expect("generate");
        assert_eq!(
            code,
            "if true {\n  done(\"i\");\n  println!();\n  done(\"p\");\n} else {\n  done(\"i\");\n}\n"
        );
    }

    #[test]
    fn if_places_prefix_once_before_the_test() {
        let mut graph = BlockGraph::new();
        let cond = graph.builder("logic_boolean").text("BOOL", "TRUE").build();
        let print = graph.builder("text_print").id("p").build();
        let root = graph
            .builder("controls_if")
            .id("i")
            .value("IF0", Some(cond))
            .statement("DO0", Some(print))
            .build();
        graph.push_root(root);
        let options = GeneratorOptions {
            statement_prefix: Some("step(%1);".to_string()),
            ..GeneratorOptions::default()
        };
        let code = Generator::rust()
            .with_options(options)
            .generate(&graph)
            .expect("generate");
        assert_eq!(code, "step(\"i\");\nif true {\n  step(\"p\");\n  println!();\n}\n");
    }

    #[test]
    fn for_loop_with_unit_step() {
        let mut graph = BlockGraph::new();
        graph.add_variable("i", "i");
        let to = graph.builder("math_number").number("NUM", 5.0).build();
        let root = graph
            .builder("controls_for")
            .var("VAR", "i")
            .value("TO", Some(to))
            .build();
        graph.push_root(root);
        assert_eq!(render(&graph), "let mut i;\n\nfor i in 0..=5 {\n}\n");
    }
}
