#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Precedence(pub u8);

impl Precedence {
    pub const NONE: Precedence = Precedence(0);
    pub const ASSIGNMENT: Precedence = Precedence(1);
    pub const RANGE: Precedence = Precedence(2);
    pub const LOGICAL_OR: Precedence = Precedence(3);
    pub const LOGICAL_AND: Precedence = Precedence(4);
    pub const COMPARISON: Precedence = Precedence(5);
    pub const BITWISE_OR: Precedence = Precedence(6);
    pub const BITWISE_XOR: Precedence = Precedence(7);
    pub const BITWISE_AND: Precedence = Precedence(8);
    pub const SHIFT: Precedence = Precedence(9);
    pub const ADDITIVE: Precedence = Precedence(10);
    pub const MULTIPLICATIVE: Precedence = Precedence(11);
    pub const CAST: Precedence = Precedence(12);
    pub const UNARY: Precedence = Precedence(13);
    pub const CALL: Precedence = Precedence(14);
    pub const ATOMIC: Precedence = Precedence(15);

    /// The next tighter level; used for the right operand of a
    /// left-associative operator and for both sides of a comparison.
    pub fn tighter(self) -> Precedence {
        Precedence(self.0.saturating_add(1).min(Self::ATOMIC.0))
    }
}

pub fn needs_parens(child: Precedence, min: Precedence) -> bool {
    child < min
}

pub fn splice(code: String, child: Precedence, min: Precedence) -> String {
    if needs_parens(child, min) {
        format!("({})", code)
    } else {
        code
    }
}
