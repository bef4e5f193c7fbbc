//! Worked examples shown after a wrong answer.

/// Explains how to work out `a × b`, if there is a known trick for it.
pub trait StrategyHints {
    fn explain(&self, a: u32, b: u32) -> Option<String>;
}

/// Mental-math tricks for the 2 through 12 tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiplicationStrategies;

impl StrategyHints for MultiplicationStrategies {
    fn explain(&self, a: u32, b: u32) -> Option<String> {
        let (table, other) = if (2..=12).contains(&a) {
            (a, b)
        } else if (2..=12).contains(&b) {
            (b, a)
        } else {
            return None;
        };
        Some(explain_with_table(table, other))
    }
}

/// Every worked example is written in terms of `other`, the operand being multiplied.
fn explain_with_table(table: u32, other: u32) -> String {
    let product = table * other;
    match table {
        2 => format!("Double {other}: {other} + {other} = {product}"),
        3 => format!("Triple {other}: {other} + {other} + {other} = {product}"),
        4 => format!(
            "Double twice: {other} x 2 = {}, then x 2 = {product}",
            other * 2
        ),
        5 => format!(
            "Half of x10: {other} x 10 = {}, half = {product}",
            other * 10
        ),
        6 => format!(
            "x5 plus one more: ({other} x 5) + {other} = {} + {other} = {product}",
            other * 5
        ),
        7 => format!(
            "x5 plus x2: ({other} x 5) + ({other} x 2) = {} + {} = {product}",
            other * 5,
            other * 2
        ),
        8 => format!(
            "Double three times: {other} -> {} -> {} -> {product}",
            other * 2,
            other * 4
        ),
        9 => format!(
            "x10 minus one group: {other} x 10 = {}, minus {other} = {product}",
            other * 10
        ),
        10 => format!("Add a zero: {other} becomes {product}"),
        11 => format!(
            "x10 plus one more: {other} x 10 + {other} = {} + {other} = {product}",
            other * 10
        ),
        _ => format!(
            "x10 plus x2: ({other} x 10) + ({other} x 2) = {} + {} = {product}",
            other * 10,
            other * 2
        ),
    }
}
