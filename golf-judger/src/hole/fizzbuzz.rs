use super::*;

use std::fmt::Write;

use rand::Rng;

pub const NAME: &str = "fizzbuzz";

pub fn hole() -> Hole {
    Hole::new(NAME, Sample::Generated(Box::new(sample)))
        .constant("NUM", Values::Generated(Box::new(values)))
        .trim(Trim::RightTrim)
}

fn values() -> Vec<ConstantValue> {
    let mut rng = rand::thread_rng();
    let mut values = vec![ConstantValue::Int(100), ConstantValue::Int(1000)];
    values.extend((0..8).map(|_| ConstantValue::Int(rng.gen_range(101..=999))));
    values
}

fn sample(bindings: &[Binding]) -> String {
    let num = lookup(bindings, "NUM")
        .and_then(ConstantValue::as_int)
        .unwrap_or(0);
    fizzbuzz(num)
}

pub fn fizzbuzz(num: i64) -> String {
    let mut out = String::new();
    for i in 1..=num {
        match (i % 3, i % 5) {
            (0, 0) => out.push_str("FizzBuzz\n"),
            (0, _) => out.push_str("Fizz\n"),
            (_, 0) => out.push_str("Buzz\n"),
            _ => {
                let _ = writeln!(out, "{}", i);
            }
        }
    }
    out
}
