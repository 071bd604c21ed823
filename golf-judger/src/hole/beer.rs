use super::*;

use std::fmt::Write;

pub const NAME: &str = "99-bottles-of-beer-on-the-wall";

pub fn hole() -> Hole {
    Hole::new(NAME, Sample::Fixed(song())).trim(Trim::Trim)
}

fn bottles(n: u32) -> String {
    format!("{} bottle{}", n, if n == 1 { "" } else { "s" })
}

pub fn song() -> String {
    let mut out = String::new();
    for n in (1..=99).rev() {
        let b = bottles(n);
        let _ = writeln!(out, "{} of beer on the wall, {} of beer.", b, b);
        if n > 1 {
            let _ = write!(
                out,
                "Take one down and pass it around, {} of beer on the wall.\n\n",
                bottles(n - 1)
            );
        } else {
            out.push_str("Go to the store and buy some more, 99 bottles of beer on the wall.");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verses() {
        let song = song();
        assert!(song.starts_with(
            "99 bottles of beer on the wall, 99 bottles of beer.\n\
             Take one down and pass it around, 98 bottles of beer on the wall.\n\n"
        ));
        assert!(song.contains(
            "2 bottles of beer on the wall, 2 bottles of beer.\n\
             Take one down and pass it around, 1 bottle of beer on the wall.\n\n\
             1 bottle of beer on the wall, 1 bottle of beer.\n"
        ));
        assert!(song.ends_with("Go to the store and buy some more, 99 bottles of beer on the wall."));
    }

    #[test]
    fn single_case() {
        assert_eq!(hole().cases().len(), 1);
    }
}
