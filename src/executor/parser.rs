//! Parsing of ebe and measurement helper output
//!
//! Grammar of the two figures scraped from the process streams:
//!
//! ```text
//! number     := digits [ "." digits ]
//! diagnostic := number "," number [ "%" ]     (stderr: seconds, cpu percent)
//! precision  := number "%"                    (stdout: compilation precision)
//! ```
//!
//! The diagnostic pair must fill the last non-empty stderr line on its own,
//! since the helper reports after the program's own output. The precision
//! figure may sit inside other text but must be a whole token: a sign, an
//! exponent or a second decimal point in front of it is rejected. When
//! stdout holds several precision figures the last one is used.

use regex::Regex;
use std::sync::OnceLock;

fn diagnostic_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(\d+(?:\.\d+)?),\s*(\d+(?:\.\d+)?)%?\s*$")
            .expect("Failed to compile diagnostic regex pattern")
    })
}

fn precision_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|[^\d.\-+eE])(\d+(?:\.\d+)?)%")
            .expect("Failed to compile precision regex pattern")
    })
}

fn parse_number(text: &str) -> Result<f64, String> {
    text.parse::<f64>()
        .map_err(|e| format!("'{text}' is not a number: {e}"))
}

/// Extract `(elapsed_secs, cpu_percent)` from the diagnostic stream
pub fn parse_diagnostic(stderr: &str) -> Result<(f64, f64), String> {
    let line = stderr
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| "empty diagnostic output".to_string())?;

    let caps = diagnostic_regex()
        .captures(line)
        .ok_or_else(|| format!("expected '<seconds>,<cpu>' but got {:?}", excerpt(line)))?;

    let elapsed = parse_number(&caps[1])?;
    let cpu = parse_number(&caps[2])?;
    Ok((elapsed, cpu))
}

/// Extract the compilation precision from the primary output stream
pub fn parse_precision(stdout: &str) -> Result<f64, String> {
    let caps = precision_regex()
        .captures_iter(stdout)
        .last()
        .ok_or_else(|| format!("no '<number>%' figure in {:?}", excerpt(stdout)))?;

    parse_number(&caps[1])
}

/// Tail of a stream, for error messages
fn excerpt(text: &str) -> &str {
    const MAX: usize = 200;
    let text = text.trim_end();
    if text.len() <= MAX {
        return text;
    }
    let mut start = text.len() - MAX;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_diagnostic() {
        assert_eq!(parse_diagnostic("1.23,45%\n"), Ok((1.23, 45.0)));
        assert_eq!(parse_diagnostic("0.5,199%"), Ok((0.5, 199.0)));
        assert_eq!(parse_diagnostic("2,100"), Ok((2.0, 100.0)));
    }

    #[test]
    fn test_parse_diagnostic_uses_last_pair() {
        let stderr = "warning: unused 1,2 nodes\nCommand exited\n3.50,97%\n";
        assert_eq!(parse_diagnostic(stderr), Ok((3.5, 97.0)));
    }

    #[test]
    fn test_parse_diagnostic_rejects_malformed() {
        assert!(parse_diagnostic("").is_err());
        assert!(parse_diagnostic("1.23 45%").is_err());
        assert!(parse_diagnostic("abc,def%").is_err());
        assert!(parse_diagnostic("Command terminated by signal 9").is_err());
    }

    #[test]
    fn test_parse_diagnostic_rejects_malformed_numbers() {
        for stderr in [
            "1.2.3,45%",
            "x1.5,50%",
            "-1.5,50%",
            "1e3,50%",
            "1.23,45abc",
            "1.23,45%%",
            "0.5,40%\ntimeout: killed\n",
        ] {
            assert!(parse_diagnostic(stderr).is_err(), "accepted {stderr:?}");
        }
    }

    #[test]
    fn test_parse_diagnostic_tolerates_whitespace() {
        assert_eq!(parse_diagnostic("  0.75, 88% \n\n"), Ok((0.75, 88.0)));
        assert_eq!(parse_diagnostic("run log\r\n1.00,50%\r\n"), Ok((1.0, 50.0)));
    }

    #[test]
    fn test_parse_precision_rejects_malformed_numbers() {
        for stdout in ["12.3.4%", "-5%", "+5%", "1e5%", "precision 3.%"] {
            assert!(parse_precision(stdout).is_err(), "accepted {stdout:?}");
        }
    }

    #[test]
    fn test_parse_precision_uses_last_figure() {
        assert_eq!(parse_precision("50% done\nResult: 99.5% match\n"), Ok(99.5));
        assert_eq!(parse_precision("100%"), Ok(100.0));
    }

    #[test]
    fn test_parse_precision() {
        assert_eq!(parse_precision("Result: 100.00% match"), Ok(100.0));
        assert_eq!(parse_precision("Evolution done\nPrecision: 87.5%\n"), Ok(87.5));
        assert!(parse_precision("Result: match").is_err());
    }

    #[test]
    fn test_excerpt_is_bounded() {
        let long = "é".repeat(500);
        let err = parse_precision(&long).unwrap_err();
        assert!(err.len() < 600);
    }
}
