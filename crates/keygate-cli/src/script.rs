//! Key scripts.
//!
//! One step per line, `#` starts a comment:
//!
//! ```text
//! # user 0, correct password
//! enter 1234123456
//! wait 10000
//! press 5
//! wait 150
//! release
//! DCBA654321
//! ```
//!
//! A bare line of key symbols is shorthand for `enter`.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use keygate_core::{Symbol, parse_symbols};

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Tap every key in turn.
    Enter(Vec<Symbol>),

    /// Let time pass.
    Wait(Duration),

    /// Press and hold keys.
    Press(Vec<Symbol>),

    /// Release every key.
    Release,
}

/// Parse a whole script.
pub fn parse_script(text: &str) -> Result<Vec<Step>> {
    text.lines()
        .enumerate()
        .filter_map(|(number, line)| {
            let line = line.split('#').next().unwrap_or_default().trim();
            (!line.is_empty()).then_some((number + 1, line))
        })
        .map(|(number, line)| parse_step(line).with_context(|| format!("line {number}: {line:?}")))
        .collect()
}

/// Parse a single step.
pub fn parse_step(line: &str) -> Result<Step> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        bail!("empty step");
    };
    let argument = words.next();
    if words.next().is_some() {
        bail!("too many arguments");
    }

    let step = match (command, argument) {
        ("enter", Some(keys)) => Step::Enter(parse_symbols(keys)?),
        ("press", Some(keys)) => Step::Press(parse_symbols(keys)?),
        ("release", None) => Step::Release,
        ("wait", Some(ms)) => {
            let ms: u64 = ms.parse().context("wait takes milliseconds")?;
            Step::Wait(Duration::from_millis(ms))
        }
        (keys, None) => Step::Enter(parse_symbols(keys).context("unknown step")?),
        _ => bail!("unknown step"),
    };
    Ok(step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("enter 1234", Step::Enter(parse_symbols("1234").unwrap()))]
    #[case("1234123456", Step::Enter(parse_symbols("1234123456").unwrap()))]
    #[case("press 13", Step::Press(parse_symbols("13").unwrap()))]
    #[case("release", Step::Release)]
    #[case("wait 3000", Step::Wait(Duration::from_secs(3)))]
    fn test_parse_step(#[case] line: &str, #[case] expected: Step) {
        assert_eq!(parse_step(line).unwrap(), expected);
    }

    #[rstest]
    #[case("wait")]
    #[case("wait soon")]
    #[case("enter 12G4")]
    #[case("release now")]
    #[case("enter 12 34")]
    fn test_bad_step_rejected(#[case] line: &str) {
        assert!(parse_step(line).is_err());
    }

    #[test]
    fn test_script_skips_comments_and_blanks() {
        let script = "# header\n\nenter 1234123456  # grant\nwait 100\n";
        let steps = parse_script(script).unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1], Step::Wait(Duration::from_millis(100)));
    }

    #[test]
    fn test_script_error_names_line() {
        let error = parse_script("release\nbogus step\n").unwrap_err();
        assert!(error.to_string().starts_with("line 2"));
    }
}
