use super::*;

use once_cell::sync::Lazy;
use regex::Regex;

/// Also drives TypeScript: the generated code is plain JavaScript, which `tsc` accepts.
pub struct JavaScript {}

static FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)(?:^|[^\w.$])(?:async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)\s*[(<]|(?:^|[^\w.$])(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::[^=]+)?=\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*(?::[^=]+)?=>|[A-Za-z_$][\w$]*\s*=>)",
    )
    .unwrap()
});
static SOLUTION_METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s+(?:public\s+|async\s+)?([A-Za-z_$][\w$]*)\s*\([^)]*\)\s*(?::[^{]+)?\{").unwrap()
});
static SOLUTION_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bclass\s+Solution\b").unwrap());

const KEYWORDS: &[&str] = &["if", "for", "while", "switch", "catch", "function", "return", "constructor"];

fn literal(value: &Literal) -> String {
    match value {
        Literal::Int(text) | Literal::Float(text) | Literal::Raw(text) => text.clone(),
        Literal::Bool(b) => b.to_string(),
        Literal::Null => "null".into(),
        Literal::Str { quote, body } => format!("{q}{}{q}", body, q = quote),
        Literal::List(items) => {
            let items: Vec<String> = items.iter().map(literal).collect();
            format!("[{}]", items.join(","))
        }
    }
}

impl Harness for JavaScript {
    fn lang_name(&self) -> &str {
        "javascript"
    }

    fn locate(&self, source: &str) -> Target {
        if SOLUTION_CLASS.is_match(source) {
            let method = SOLUTION_METHOD
                .captures_iter(source)
                .map(|caps| caps[1].to_owned())
                .find(|name| !KEYWORDS.contains(&name.as_str()));
            if let Some(name) = method {
                return Target {
                    name,
                    receiver: Receiver::Instance("Solution".into()),
                };
            }
        }

        FUNCTION
            .captures_iter(source)
            .find_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| Target::free(m.as_str()))
            .unwrap_or_else(Target::fallback)
    }

    fn render(&self, source: &str, target: &Target, params: &[Param]) -> String {
        let mut out = String::with_capacity(source.len() + 1024);
        out.push_str(source);
        if !source.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("\n;(() => {\n");
        out.push_str(concat!(
            "    const _judgeRender = (value) => {\n",
            "        if (typeof value === \"boolean\") return value ? \"true\" : \"false\";\n",
            "        if (value === null || value === undefined) return \"null\";\n",
            "        if (typeof value === \"object\") return JSON.stringify(value);\n",
            "        return String(value);\n",
            "    };\n",
        ));
        for param in params {
            out.push_str(&format!("    const {} = {};\n", param.name, literal(&param.value)));
        }
        out.push_str(&format!(
            "    const _judgeResult = {}({});\n",
            target.callee(true),
            argument_list(params)
        ));
        out.push_str("    console.log(_judgeRender(_judgeResult));\n");
        out.push_str("})();\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::encode::parse_input;

    fn locate(src: &str) -> Target {
        JavaScript {}.locate(src)
    }

    #[test]
    fn locate_declarations() {
        assert_eq!(locate("function twoSum(nums, target) {}"), Target::free("twoSum"));
        assert_eq!(locate("const twoSum = (nums, target) => {}"), Target::free("twoSum"));
        assert_eq!(locate("let f = async function (x) {}"), Target::free("f"));
        assert_eq!(locate("var sq = x => x * x;"), Target::free("sq"));
        assert_eq!(
            locate("function twoSum(nums: number[], target: number): number[] {}"),
            Target::free("twoSum")
        );
        assert_eq!(locate("console.log(1)"), Target::fallback());
    }

    #[test]
    fn locate_class_method() {
        let src = "class Solution {\n    constructor() {}\n    twoSum(nums, target) {\n        if (nums) {}\n    }\n}\n";
        let target = locate(src);
        assert_eq!(target.name, "twoSum");
        assert_eq!(target.callee(true), "new Solution().twoSum");
    }

    #[test]
    fn render_scopes_driver() {
        let params = parse_input("nums = [2,7,11,15], target = 9").unwrap();
        let code = JavaScript {}.render("function twoSum(a, b) {}", &Target::free("twoSum"), &params);
        assert!(code.contains("    const nums = [2,7,11,15];\n"));
        assert!(code.contains("    const target = 9;\n"));
        assert!(code.contains("const _judgeResult = twoSum(nums, target);"));
        assert!(code.trim_end().ends_with("})();"));
    }

    #[test]
    fn results_print_as_compact_json() {
        let code = JavaScript {}.render("function split(s) { return s.split(\",\"); }", &Target::free("split"), &parse_input(r#"s = "a,b""#).unwrap());
        assert!(code.contains("if (typeof value === \"object\") return JSON.stringify(value);"));
        assert!(code.contains("        return String(value);\n"));
    }
}
