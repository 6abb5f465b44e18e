use crate::block::Block;
use crate::error::GenerateResult;
use crate::generator::Walker;
use crate::precedence::Precedence;
use crate::registry::Emission;

pub fn text(block: &Block, walker: &mut Walker<'_>) -> GenerateResult<Emission> {
    let value = walker.field_text(block, "TEXT").unwrap_or_default();
    Ok(Emission::expr(quote(&value), Precedence::ATOMIC))
}

/// `println!`; with nothing connected it prints an empty line.
pub fn text_print(block: &Block, walker: &mut Walker<'_>) -> GenerateResult<Emission> {
    let code = match walker.value_of(block, "TEXT", Precedence::NONE)? {
        Some(msg) => format!("println!(\"{{}}\", {});\n", msg),
        None => "println!();\n".to_string(),
    };
    Ok(Emission::Statement(code))
}

/// Rust string literal for arbitrary text.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
