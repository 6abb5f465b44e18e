pub mod control;
pub mod logic;
pub mod math;
pub mod text;
pub mod variables;

use crate::registry::Registry;

pub fn register_builtins(registry: &mut Registry) {
    registry.register_fn("controls_if", control::controls_if);
    registry.register_fn("controls_ifelse", control::controls_if);
    registry.register_fn("controls_repeat_ext", control::controls_repeat);
    registry.register_fn("controls_repeat", control::controls_repeat);
    registry.register_fn("controls_whileUntil", control::controls_while_until);
    registry.register_fn("controls_for", control::controls_for);
    registry.register_fn("controls_flow_statements", control::controls_flow_statements);

    registry.register_fn("logic_boolean", logic::logic_boolean);
    registry.register_fn("logic_null", logic::logic_null);
    registry.register_fn("logic_negate", logic::logic_negate);
    registry.register_fn("logic_compare", logic::logic_compare);
    registry.register_fn("logic_operation", logic::logic_operation);
    registry.register_fn("logic_ternary", logic::logic_ternary);

    registry.register_fn("math_number", math::math_number);
    registry.register_fn("math_arithmetic", math::math_arithmetic);
    registry.register_fn("math_modulo", math::math_modulo);
    registry.register_fn("math_change", math::math_change);

    registry.register_fn("text", text::text);
    registry.register_fn("text_print", text::text_print);

    registry.register_fn("variables_get", variables::variables_get);
    registry.register_fn("variables_set", variables::variables_set);

    registry.set_init(variables::declare_variables);
}
