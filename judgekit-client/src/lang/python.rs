use super::*;

use once_cell::sync::Lazy;
use regex::Regex;

pub struct Python {}

static DEF: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^([ \t]*)def\s+([A-Za-z_]\w*)\s*\(").unwrap());
static SOLUTION_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^class\s+Solution\b").unwrap());

const RENDER: &str = r#"    import json as _judge_json

    def _judge_render(value):
        if isinstance(value, bool):
            return "true" if value else "false"
        if value is None:
            return "null"
        if isinstance(value, (list, tuple, dict)):
            try:
                return _judge_json.dumps(value, separators=(",", ":"), ensure_ascii=False)
            except (TypeError, ValueError):
                return str(value).replace(" ", "")
        return str(value)
"#;

fn literal(value: &Literal) -> String {
    match value {
        Literal::Int(text) | Literal::Float(text) | Literal::Raw(text) => text.clone(),
        Literal::Bool(true) => "True".into(),
        Literal::Bool(false) => "False".into(),
        Literal::Null => "None".into(),
        Literal::Str { quote, body } => format!("{q}{}{q}", body, q = quote),
        Literal::List(items) => {
            let items: Vec<String> = items.iter().map(literal).collect();
            format!("[{}]", items.join(","))
        }
    }
}

impl Harness for Python {
    fn lang_name(&self) -> &str {
        "python"
    }

    fn locate(&self, source: &str) -> Target {
        let found = DEF
            .captures_iter(source)
            .find(|caps| !caps[2].starts_with("__"));
        let caps = match found {
            Some(caps) => caps,
            None => return Target::fallback(),
        };

        let indented = !caps[1].is_empty();
        if indented && SOLUTION_CLASS.is_match(source) {
            Target {
                name: caps[2].to_owned(),
                receiver: Receiver::Instance("Solution".into()),
            }
        } else {
            Target::free(&caps[2])
        }
    }

    fn render(&self, source: &str, target: &Target, params: &[Param]) -> String {
        let mut out = String::with_capacity(source.len() + 1024);
        out.push_str(source);
        if !source.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("\n\nif __name__ == \"__main__\":\n");
        out.push_str(RENDER);
        out.push('\n');
        for param in params {
            out.push_str(&format!("    {} = {}\n", param.name, literal(&param.value)));
        }
        out.push_str(&format!(
            "    _judge_result = {}({})\n",
            target.callee(false),
            argument_list(params)
        ));
        out.push_str("    print(_judge_render(_judge_result))\n");
        out
    }
}
