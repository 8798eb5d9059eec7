//! Turns a test case into a [`Submission`].
//!
//! Function-call languages get a generated driver that declares the case's
//! parameters, calls the candidate's function and prints the result. Every
//! other language receives the source untouched with the input on stdin.

use crate::lang::Language;

use judgekit_protocol::common::TestCase;

use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error("unbalanced `{found}` at byte {offset} of the test input")]
    Unbalanced { found: char, offset: usize },

    #[error("unclosed `{open}` in the test input")]
    Unclosed { open: char },

    #[error("unterminated string literal starting at byte {offset} of the test input")]
    UnterminatedString { offset: usize },

    #[error("empty argument at position {index}")]
    EmptySegment { index: usize },

    #[error("invalid parameter name `{name}`")]
    InvalidName { name: String },

    #[error("missing value for parameter `{name}`")]
    EmptyValue { name: String },
}

/// Per-submission resource limits.
#[derive(Debug, Clone, PartialEq)]
pub struct Limits {
    pub cpu_time_limit: f64, // seconds
    pub memory_limit: u64,   // kilobytes
    pub wall_time_limit: Option<f64>,
}

impl Limits {
    pub fn from_config(judge: &crate::config::Judge) -> Self {
        Self {
            cpu_time_limit: judge.cpu_time_limit,
            memory_limit: judge.memory_limit,
            wall_time_limit: judge.wall_time_limit,
        }
    }
}

/// One program run on the judge. Built fresh for every test case.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub source_code: Vec<u8>,
    pub language_id: u32,
    pub stdin: Option<Vec<u8>>,
    pub limits: Limits,
}

/// A literal value as written in a test input.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(String),
    Float(String),
    Bool(bool),
    Null,
    /// `body` is the text between the quotes, escapes untouched.
    Str { quote: char, body: String },
    List(Vec<Literal>),
    /// Anything else (objects, tuples, constructor calls) is copied verbatim.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub value: Literal,
}

pub fn encode(
    source: &str,
    case: &TestCase,
    language: Language,
    limits: &Limits,
) -> Result<Submission, EncodingError> {
    let (source_code, stdin) = match language.harness() {
        Some(harness) if !harness.is_standalone(source) => {
            let params = parse_input(&case.input)?;
            let target = harness.locate(source);
            debug!(
                language = harness.lang_name(),
                function = %target.name,
                params = params.len(),
                "generating driver"
            );
            (harness.render(source, &target, &params), None)
        }
        _ => {
            let stdin = if case.input.is_empty() {
                None
            } else {
                Some(case.input.clone().into_bytes())
            };
            (source.to_owned(), stdin)
        }
    };

    Ok(Submission {
        source_code: source_code.into_bytes(),
        language_id: language.id(),
        stdin,
        limits: limits.clone(),
    })
}

/// Parses `name = literal, name = literal, ...` into an ordered parameter list.
///
/// A segment without a top-level `=` is positional and named `arg{index}`.
pub fn parse_input(input: &str) -> Result<Vec<Param>, EncodingError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    let segments = split_top_level(input, ',')?;
    let mut params = Vec::with_capacity(segments.len());

    for (index, segment) in segments.into_iter().enumerate() {
        let segment = segment.trim();
        if segment.is_empty() {
            return Err(EncodingError::EmptySegment { index });
        }

        let (name, value) = match find_top_level(segment, '=') {
            Some(pos) => {
                let name = segment[..pos].trim();
                let value = segment[pos + 1..].trim();
                if !is_identifier(name) {
                    return Err(EncodingError::InvalidName { name: name.to_owned() });
                }
                if value.is_empty() {
                    return Err(EncodingError::EmptyValue { name: name.to_owned() });
                }
                (name.to_owned(), value)
            }
            None => (format!("arg{}", index), segment),
        };

        params.push(Param {
            name,
            value: Literal::parse(value),
        });
    }

    Ok(params)
}

impl Literal {
    pub fn parse(text: &str) -> Literal {
        let text = text.trim();

        if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
            if inner.trim().is_empty() {
                return Literal::List(Vec::new());
            }
            if let Ok(items) = split_top_level(inner, ',') {
                // a trailing comma leaves one empty segment behind
                let mut items: Vec<&str> = items.into_iter().map(str::trim).collect();
                if items.last().map_or(false, |s| s.is_empty()) {
                    items.pop();
                }
                if items.iter().all(|s| !s.is_empty()) {
                    return Literal::List(items.into_iter().map(Literal::parse).collect());
                }
            }
            return Literal::Raw(text.to_owned());
        }

        for quote in ['"', '\''] {
            if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
                let body = &text[1..text.len() - 1];
                if closing_quote(body, quote).is_none() {
                    return Literal::Str {
                        quote,
                        body: body.to_owned(),
                    };
                }
            }
        }

        match text {
            "true" | "True" => return Literal::Bool(true),
            "false" | "False" => return Literal::Bool(false),
            "null" | "None" | "nil" | "nullptr" => return Literal::Null,
            _ => {}
        }

        if is_integer(text) {
            Literal::Int(text.to_owned())
        } else if text.parse::<f64>().is_ok() && text.bytes().any(|b| b.is_ascii_digit()) {
            Literal::Float(text.to_owned())
        } else {
            Literal::Raw(text.to_owned())
        }
    }

    /// The string body re-escaped for a double-quoted literal.
    pub fn double_quoted(quote: char, body: &str) -> String {
        if quote == '"' {
            return format!("\"{}\"", body);
        }
        let mut out = String::with_capacity(body.len() + 2);
        out.push('"');
        let mut chars = body.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some('\'') => out.push('\''),
                    Some(next) => {
                        out.push('\\');
                        out.push(next);
                    }
                    None => out.push_str("\\\\"),
                },
                '"' => out.push_str("\\\""),
                c => out.push(c),
            }
        }
        out.push('"');
        out
    }
}

fn is_integer(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Position of the first unescaped `quote` in `body`.
fn closing_quote(body: &str, quote: char) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some(i);
        }
    }
    None
}

/// Walks `text` tracking brackets and string literals, calling `on_top` for
/// every character at nesting depth zero outside of strings.
fn scan(text: &str, mut on_top: impl FnMut(usize, char) -> bool) -> Result<(), EncodingError> {
    let mut stack: Vec<char> = Vec::new();
    let mut string: Option<(char, usize)> = None;
    let mut escaped = false;

    for (offset, c) in text.char_indices() {
        if let Some((quote, _)) = string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                string = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => string = Some((c, offset)),
            '[' | '{' | '(' => stack.push(c),
            ']' | '}' | ')' => {
                let open = match c {
                    ']' => '[',
                    '}' => '{',
                    _ => '(',
                };
                if stack.pop() != Some(open) {
                    return Err(EncodingError::Unbalanced { found: c, offset });
                }
            }
            _ if stack.is_empty() => {
                if !on_top(offset, c) {
                    return Ok(());
                }
            }
            _ => {}
        }
    }

    if let Some((_, offset)) = string {
        return Err(EncodingError::UnterminatedString { offset });
    }
    if let Some(&open) = stack.last() {
        return Err(EncodingError::Unclosed { open });
    }
    Ok(())
}

fn split_top_level(text: &str, sep: char) -> Result<Vec<&str>, EncodingError> {
    let mut cuts = Vec::new();
    scan(text, |offset, c| {
        if c == sep {
            cuts.push(offset);
        }
        true
    })?;

    let mut parts = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for cut in cuts {
        parts.push(&text[start..cut]);
        start = cut + sep.len_utf8();
    }
    parts.push(&text[start..]);
    Ok(parts)
}

/// The first top-level `ch` that is not part of `==`, `<=`, `>=` or `!=`.
fn find_top_level(text: &str, ch: char) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut found = None;
    let scanned = scan(text, |offset, c| {
        if c != ch {
            return true;
        }
        let prev = offset.checked_sub(1).map(|i| bytes[i]);
        let next = bytes.get(offset + 1).copied();
        let compound = matches!(prev, Some(b'=' | b'<' | b'>' | b'!')) || next == Some(b'=');
        if compound {
            return true;
        }
        found = Some(offset);
        false
    });
    scanned.ok().and(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> Limits {
        Limits {
            cpu_time_limit: 2.0,
            memory_limit: 128_000,
            wall_time_limit: None,
        }
    }

    fn int(text: &str) -> Literal {
        Literal::Int(text.into())
    }

    #[test]
    fn parse_two_sum_input() {
        let params = parse_input("nums = [2,7,11,15], target = 9").unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "nums");
        assert_eq!(
            params[0].value,
            Literal::List(vec![int("2"), int("7"), int("11"), int("15")])
        );
        assert_eq!(params[1].name, "target");
        assert_eq!(params[1].value, int("9"));
    }

    #[test]
    fn nested_commas_do_not_split() {
        let params = parse_input(r#"grid = [[1,2],[3,4]], word = "a,b", pair = (1, 2)"#).unwrap();
        assert_eq!(params.len(), 3);
        assert_eq!(
            params[0].value,
            Literal::List(vec![
                Literal::List(vec![int("1"), int("2")]),
                Literal::List(vec![int("3"), int("4")]),
            ])
        );
        assert_eq!(
            params[1].value,
            Literal::Str {
                quote: '"',
                body: "a,b".into()
            }
        );
        assert_eq!(params[2].value, Literal::Raw("(1, 2)".into()));
    }

    #[test]
    fn positional_arguments() {
        let params = parse_input("[1,2,3], 4").unwrap();
        assert_eq!(params[0].name, "arg0");
        assert_eq!(params[1].name, "arg1");
        assert!(parse_input("   ").unwrap().is_empty());
    }

    #[test]
    fn scalar_literals() {
        assert_eq!(Literal::parse("True"), Literal::Bool(true));
        assert_eq!(Literal::parse("null"), Literal::Null);
        assert_eq!(Literal::parse("-3"), int("-3"));
        assert_eq!(Literal::parse("2.5"), Literal::Float("2.5".into()));
        assert_eq!(Literal::parse("[]"), Literal::List(Vec::new()));
        assert_eq!(Literal::parse("[1,2,]"), Literal::List(vec![int("1"), int("2")]));
        assert_eq!(Literal::parse("inf"), Literal::Raw("inf".into()));
    }

    #[test]
    fn comparison_is_not_assignment() {
        let params = parse_input("x == 1").unwrap();
        assert_eq!(params[0].name, "arg0");
        assert_eq!(params[0].value, Literal::Raw("x == 1".into()));
    }

    #[test]
    fn malformed_input() {
        assert!(matches!(
            parse_input("nums = [1,2"),
            Err(EncodingError::Unclosed { open: '[' })
        ));
        assert!(matches!(
            parse_input("nums = 1]"),
            Err(EncodingError::Unbalanced { found: ']', .. })
        ));
        assert!(matches!(
            parse_input("s = \"abc"),
            Err(EncodingError::UnterminatedString { .. })
        ));
        assert_eq!(parse_input("a = 1,, b = 2"), Err(EncodingError::EmptySegment { index: 1 }));
        assert_eq!(
            parse_input("1x = 2"),
            Err(EncodingError::InvalidName { name: "1x".into() })
        );
        assert_eq!(
            parse_input("target ="),
            Err(EncodingError::EmptyValue {
                name: "target".into()
            })
        );
    }

    #[test]
    fn single_quoted_to_double_quoted() {
        assert_eq!(Literal::double_quoted('\'', r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(Literal::double_quoted('\'', r"it\'s"), r#""it's""#);
        assert_eq!(Literal::double_quoted('"', "x"), r#""x""#);
    }

    #[test]
    fn stdin_languages_pass_source_through() {
        let source = "package main\nfunc main() {}\n";
        let case = TestCase::new("1", "3 4", "7");
        let submission = encode(source, &case, Language::Go, &limits()).unwrap();
        assert_eq!(submission.source_code, source.as_bytes());
        assert_eq!(submission.stdin.as_deref(), Some("3 4".as_bytes()));
        assert_eq!(submission.language_id, 60);

        let empty = TestCase::new("2", "", "");
        let submission = encode(source, &empty, Language::Go, &limits()).unwrap();
        assert!(submission.stdin.is_none());
    }

    #[test]
    fn two_sum_python_driver() {
        let source = "def twoSum(nums, target):\n    seen = {}\n    for i, n in enumerate(nums):\n        if target - n in seen:\n            return [seen[target - n], i]\n        seen[n] = i\n";
        let case = TestCase::new("1", "nums = [2,7,11,15], target = 9", "[0,1]");
        let submission = encode(source, &case, Language::Python, &limits()).unwrap();
        let code = String::from_utf8(submission.source_code).unwrap();
        assert!(code.starts_with(source));
        assert!(code.contains("nums = [2,7,11,15]"));
        assert!(code.contains("target = 9"));
        assert!(code.contains("twoSum(nums, target)"));
        assert!(submission.stdin.is_none());
        assert_eq!(submission.language_id, 71);
    }

    #[test]
    fn bad_input_is_an_encoding_error() {
        let case = TestCase::new("1", "nums = [2,7", "[0,1]");
        let err = encode("def f(nums): pass", &case, Language::Python, &limits()).unwrap_err();
        assert_eq!(err, EncodingError::Unclosed { open: '[' });
    }
}
