use super::*;

use rand::seq::SliceRandom;
use rand::Rng;

pub const NAME: &str = "ucwords";

pub fn hole() -> Hole {
    Hole::new(NAME, Sample::Generated(Box::new(sample)))
        .constant("STR", Values::Generated(Box::new(values)))
        .trim(Trim::Trim)
        .disable(Capability::UpperCaseWord)
}

fn values() -> Vec<ConstantValue> {
    let mut rng = rand::thread_rng();
    let mut values = vec![ConstantValue::from("h e ll o, world!")];
    values.extend((0..9).map(|_| ConstantValue::Str(sentence(&mut rng))));
    values
}

fn word(rng: &mut impl Rng) -> String {
    let len = rng.gen_range(1..=20);
    (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
}

fn sentence(rng: &mut impl Rng) -> String {
    let len = rng.gen_range(5..=20);
    let words: Vec<String> = (0..len).map(|_| word(&mut *rng)).collect();
    let punctuation = [".", "!", "?"];
    let end = punctuation.choose(rng).copied().unwrap_or(".");
    format!("{}{}", words.join(" "), end)
}

fn sample(bindings: &[Binding]) -> String {
    let text = lookup(bindings, "STR")
        .and_then(ConstantValue::as_str)
        .unwrap_or("");
    ucwords(text)
}

/// Upper-cases the first character of every whitespace separated word.
pub fn ucwords(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if at_word_start {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0B' | '\x0C');
    }
    out
}
