use crate::error::JudgeError;

use judgekit_protocol::judge0::{self, SubmissionOutput, TimeField};

/// A terminal judge response with its text fields decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionResult {
    pub status_id: u32,
    pub status_description: String,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
    pub message: Option<String>,
    pub time_seconds: Option<f64>,
    pub memory_kb: Option<u64>,
}

impl SubmissionResult {
    pub fn is_compilation_error(&self) -> bool {
        self.status_id == judge0::STATUS_COMPILATION_ERROR
    }
}

pub fn decode(raw: SubmissionOutput) -> Result<SubmissionResult, JudgeError> {
    let status = match raw.status {
        Some(status) if judge0::is_terminal(status.id) => status,
        Some(status) => {
            return Err(JudgeError::Decode(format!(
                "submission is not finished (status {})",
                status.id
            )))
        }
        None => return Err(JudgeError::Decode("response carries no status".into())),
    };

    Ok(SubmissionResult {
        status_id: status.id,
        status_description: status.description,
        stdout: decode_field("stdout", raw.stdout)?,
        stderr: decode_field("stderr", raw.stderr)?,
        compile_output: decode_field("compile_output", raw.compile_output)?,
        message: decode_field("message", raw.message)?,
        time_seconds: raw.time.as_ref().and_then(TimeField::seconds),
        memory_kb: raw.memory,
    })
}

/// Judge0 wraps long base64 output at 76 columns.
fn decode_field(name: &str, value: Option<String>) -> Result<Option<String>, JudgeError> {
    let text = match value {
        Some(text) => text,
        None => return Ok(None),
    };
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = base64::decode(&compact).map_err(|err| JudgeError::Decode(format!("{}: {}", name, err)))?;
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

/// Canonical form used for output comparison.
///
/// Line terminators are unified, whitespace runs collapse to one space,
/// whitespace next to `[ ] ( ) { } , : ;` disappears, and the result is
/// trimmed and lowercased. Applying it twice changes nothing.
pub fn normalize(text: &str) -> String {
    const TIGHT: &[char] = &['[', ']', '(', ')', '{', '}', ',', ':', ';'];

    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            let after_tight = out.chars().last().map_or(true, |prev| TIGHT.contains(&prev));
            if !after_tight && !TIGHT.contains(&c) {
                out.push(' ');
            }
            pending_space = false;
        }
        out.extend(c.to_lowercase());
    }
    out
}

pub fn outputs_match(actual: &str, expected: &str) -> bool {
    normalize(actual) == normalize(expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    use judgekit_protocol::judge0::SubmissionStatus;

    fn terminal(id: u32, description: &str) -> SubmissionOutput {
        SubmissionOutput {
            status: Some(SubmissionStatus {
                id,
                description: description.into(),
            }),
            ..SubmissionOutput::default()
        }
    }

    #[test]
    fn normalize_examples() {
        assert_eq!(normalize("  [1, 2]\n"), "[1,2]");
        assert_eq!(normalize("[1,2]"), "[1,2]");
        assert_eq!(normalize("Hello   World\r\n"), "hello world");
        assert_eq!(normalize("a\tb\n\nc"), "a b c");
        assert_eq!(normalize("{ \"a\" : 1 }"), "{\"a\":1}");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("True"), normalize("true"));
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "  [1, 2]\n",
            "Hello   World\r\n",
            "x ( y ) , z",
            "\u{00C9}T\u{00C9} 1;  2",
            "[[1, 2], [3, 4]]\n\n",
            "a , b\r\nc",
            "İ",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "sample {:?}", sample);
        }
    }

    #[test]
    fn match_ignores_layout() {
        assert!(outputs_match("[0, 1]\n", "[0,1]"));
        assert!(outputs_match("6\n", " 6"));
        assert!(!outputs_match("[1,0]", "[0,1]"));
        assert!(!outputs_match("12", "1 2"));
    }

    #[test]
    fn decode_wrapped_base64() {
        let mut raw = terminal(3, "Accepted");
        raw.stdout = Some("WzAs\nMV0K\n".into());
        raw.time = Some(TimeField::Text("0.031".into()));
        raw.memory = Some(9000);
        let result = decode(raw).unwrap();
        assert_eq!(result.stdout.as_deref(), Some("[0,1]\n"));
        assert_eq!(result.time_seconds, Some(0.031));
        assert_eq!(result.memory_kb, Some(9000));
        assert!(result.stderr.is_none());
    }

    #[test]
    fn decode_invalid_utf8_lossily() {
        let mut raw = terminal(11, "Runtime Error (NZEC)");
        raw.stderr = Some(base64::encode([0x66, 0xff, 0x6f]));
        let result = decode(raw).unwrap();
        assert_eq!(result.stderr.as_deref(), Some("f\u{fffd}o"));
    }

    #[test]
    fn decode_rejects_garbage() {
        let mut raw = terminal(3, "Accepted");
        raw.stdout = Some("not base64!".into());
        assert!(matches!(decode(raw), Err(JudgeError::Decode(_))));

        assert!(matches!(decode(terminal(2, "Processing")), Err(JudgeError::Decode(_))));
    }

    #[test]
    fn compilation_error_status() {
        let mut raw = terminal(6, "Compilation Error");
        raw.compile_output = Some(base64::encode("main.cpp:1:1: error"));
        let result = decode(raw).unwrap();
        assert!(result.is_compilation_error());
        assert_eq!(result.compile_output.as_deref(), Some("main.cpp:1:1: error"));
    }
}
