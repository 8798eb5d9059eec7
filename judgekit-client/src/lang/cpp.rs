use super::*;

use once_cell::sync::Lazy;
use regex::Regex;

pub struct Cpp {}

static FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:(?:static|inline|virtual|constexpr|const|unsigned|signed)\s+)*([\w:]+(?:<[^;{}()]*>)?[\s*&]+)([A-Za-z_]\w*)\s*\(",
    )
    .unwrap()
});
static SOLUTION_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:class|struct)\s+Solution\b").unwrap());
static MAIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bint\s+main\s*\(").unwrap());

const KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "new", "delete", "else", "throw", "case", "do",
    "sizeof", "operator",
];

/// Top-level strings print as-is; everything nested prints as compact JSON.
const RENDER: &str = r#"namespace judge_driver {
template <typename T> void render(std::ostream& out, const T& value) { out << value; }
inline void render(std::ostream& out, const bool& value) { out << (value ? "true" : "false"); }
inline void render(std::ostream& out, const std::string& value) { out << value; }
template <typename T> void render(std::ostream& out, const std::vector<T>& values);
template <typename T> void render_item(std::ostream& out, const T& value) { render(out, value); }
inline void render_item(std::ostream& out, const std::string& value) {
    out << '"';
    for (char c : value) {
        switch (c) {
            case '"': out << "\\\""; break;
            case '\\': out << "\\\\"; break;
            case '\n': out << "\\n"; break;
            case '\r': out << "\\r"; break;
            case '\t': out << "\\t"; break;
            default: out << c;
        }
    }
    out << '"';
}
template <typename T> void render(std::ostream& out, const std::vector<T>& values) {
    out << '[';
    for (size_t i = 0; i < values.size(); ++i) {
        if (i) out << ',';
        render_item(out, static_cast<const T&>(values[i]));
    }
    out << ']';
}
}
"#;

fn scalar(value: &Literal, elem: &Shape) -> String {
    match value {
        Literal::Int(text) if *elem == Shape::Long => format!("{}LL", text),
        Literal::Int(text) if *elem == Shape::Float => format!("{}.0", text),
        Literal::Int(text) | Literal::Float(text) | Literal::Raw(text) => text.clone(),
        Literal::Bool(b) => b.to_string(),
        Literal::Null => "nullptr".into(),
        Literal::Str { quote, body } => Literal::double_quoted(*quote, body),
        Literal::List(items) => {
            let items: Vec<String> = items.iter().map(|item| scalar(item, elem)).collect();
            format!("{{{}}}", items.join(", "))
        }
    }
}

fn type_name(shape: &Shape) -> String {
    match shape {
        Shape::Int | Shape::Empty => "int".into(),
        Shape::Long => "long long".into(),
        Shape::Float => "double".into(),
        Shape::Bool => "bool".into(),
        Shape::Str => "string".into(),
        Shape::Array(inner) => format!("vector<{}>", type_name(inner)),
    }
}

fn declaration(param: &Param) -> String {
    match Shape::of(&param.value) {
        Some(shape) => {
            let elem = shape.element();
            let value = braced(&param.value, &elem, &scalar);
            let shape = match shape {
                Shape::Array(inner) if *inner == Shape::Empty => Shape::Array(Box::new(Shape::Int)),
                other => other,
            };
            format!("{} {} = {};", type_name(&shape), param.name, value)
        }
        None => format!("auto {} = {};", param.name, scalar(&param.value, &Shape::Empty)),
    }
}

impl Harness for Cpp {
    fn lang_name(&self) -> &str {
        "cpp"
    }

    fn is_standalone(&self, source: &str) -> bool {
        MAIN.is_match(source)
    }

    fn locate(&self, source: &str) -> Target {
        let name = FUNCTION
            .captures_iter(source)
            .filter(|caps| {
                let ty = caps[1].trim();
                let name = &caps[2];
                !KEYWORDS.contains(&ty) && !KEYWORDS.contains(&name) && name != "main" && name != "Solution"
            })
            .map(|caps| caps[2].to_owned())
            .next();

        let name = match name {
            Some(name) => name,
            None => return Target::fallback(),
        };
        if SOLUTION_CLASS.is_match(source) {
            Target {
                name,
                receiver: Receiver::Instance("Solution".into()),
            }
        } else {
            Target::free(name)
        }
    }

    fn render(&self, source: &str, target: &Target, params: &[Param]) -> String {
        let mut out = String::with_capacity(source.len() + 2048);
        out.push_str("#include <bits/stdc++.h>\nusing namespace std;\n\n");
        out.push_str(source);
        if !source.ends_with('\n') {
            out.push('\n');
        }
        out.push('\n');
        out.push_str(RENDER);
        out.push_str("\nint main() {\n");
        for param in params {
            out.push_str(&format!("    {}\n", declaration(param)));
        }
        out.push_str(&format!(
            "    auto result = {}({});\n",
            target.callee(false),
            argument_list(params)
        ));
        out.push_str("    judge_driver::render(cout, result);\n");
        out.push_str("    cout << endl;\n");
        out.push_str("    return 0;\n}\n");
        out
    }
}
