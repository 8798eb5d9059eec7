use super::*;

use once_cell::sync::Lazy;
use regex::Regex;

pub struct Java {}

static CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bclass\s+([A-Za-z_$][\w$]*)").unwrap());
static PUBLIC_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bpublic\s+((?:final\s+|abstract\s+)*class\b)").unwrap());
static METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*((?:(?:public|private|protected|static|final|synchronized)\s+)*)([\w$<>\[\],.? ]+?)\s+([A-Za-z_$][\w$]*)\s*\(",
    )
    .unwrap()
});
static MAIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bstatic\s+void\s+main\s*\(\s*String").unwrap());

const KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "new", "else", "throw", "case", "do", "try",
];

/// Top-level strings print as-is; everything nested prints as compact JSON.
const RENDER: &str = r#"    private static String render(Object value) {
        if (value instanceof CharSequence || value instanceof Character) return String.valueOf(value);
        StringBuilder out = new StringBuilder();
        renderItem(out, value);
        return out.toString();
    }

    private static void renderItem(StringBuilder out, Object value) {
        if (value == null) {
            out.append("null");
        } else if (value instanceof CharSequence || value instanceof Character) {
            out.append('"');
            for (char c : String.valueOf(value).toCharArray()) {
                switch (c) {
                    case '"': out.append("\\\""); break;
                    case '\\': out.append("\\\\"); break;
                    case '\n': out.append("\\n"); break;
                    case '\r': out.append("\\r"); break;
                    case '\t': out.append("\\t"); break;
                    default: out.append(c);
                }
            }
            out.append('"');
        } else if (value.getClass().isArray()) {
            out.append('[');
            int n = java.lang.reflect.Array.getLength(value);
            for (int i = 0; i < n; i++) {
                if (i > 0) out.append(',');
                renderItem(out, java.lang.reflect.Array.get(value, i));
            }
            out.append(']');
        } else if (value instanceof Iterable) {
            out.append('[');
            boolean first = true;
            for (Object item : (Iterable<?>) value) {
                if (!first) out.append(',');
                renderItem(out, item);
                first = false;
            }
            out.append(']');
        } else {
            out.append(value);
        }
    }

"#;

fn scalar(value: &Literal, elem: &Shape) -> String {
    match value {
        Literal::Int(text) if *elem == Shape::Long => format!("{}L", text),
        Literal::Int(text) if *elem == Shape::Float => format!("{}.0", text),
        Literal::Int(text) | Literal::Float(text) | Literal::Raw(text) => text.clone(),
        Literal::Bool(b) => b.to_string(),
        Literal::Null => "null".into(),
        Literal::Str { quote, body } => Literal::double_quoted(*quote, body),
        Literal::List(items) => {
            let items: Vec<String> = items.iter().map(|item| scalar(item, elem)).collect();
            format!("Arrays.asList({})", items.join(", "))
        }
    }
}

fn type_name(shape: &Shape) -> &'static str {
    match shape {
        Shape::Int | Shape::Empty => "int",
        Shape::Long => "long",
        Shape::Float => "double",
        Shape::Bool => "boolean",
        Shape::Str => "String",
        Shape::Array(inner) => type_name(inner),
    }
}

fn declaration(param: &Param) -> String {
    let shape = match Shape::of(&param.value) {
        Some(shape) => shape,
        None if param.value == Literal::Null => return format!("Object {} = null;", param.name),
        None => return format!("var {} = {};", param.name, scalar(&param.value, &Shape::Empty)),
    };

    let elem = shape.element();
    let dims = "[]".repeat(shape.depth());
    let ty = format!("{}{}", type_name(&elem), dims);
    if shape.depth() == 0 {
        return format!("{} {} = {};", ty, param.name, scalar(&param.value, &elem));
    }
    format!("{} {} = new {}{};", ty, param.name, ty, braced(&param.value, &elem, &scalar))
}

impl Harness for Java {
    fn lang_name(&self) -> &str {
        "java"
    }

    fn is_standalone(&self, source: &str) -> bool {
        MAIN.is_match(source)
    }

    fn locate(&self, source: &str) -> Target {
        let class = CLASS
            .captures(source)
            .map(|caps| caps[1].to_owned())
            .unwrap_or_else(|| "Solution".into());

        let method = METHOD.captures_iter(source).find(|caps| {
            let ty = caps[2].trim();
            let name = &caps[3];
            !KEYWORDS.contains(&ty) && !KEYWORDS.contains(&name) && name != "main" && name != class
        });

        match method {
            Some(caps) if caps[1].contains("static") => Target {
                name: caps[3].to_owned(),
                receiver: Receiver::Static(class),
            },
            Some(caps) => Target {
                name: caps[3].to_owned(),
                receiver: Receiver::Instance(class),
            },
            None => Target {
                name: FALLBACK_FUNCTION.into(),
                receiver: Receiver::Instance(class),
            },
        }
    }

    fn render(&self, source: &str, target: &Target, params: &[Param]) -> String {
        // Judge0 compiles `Main.java`; only the driver may be public.
        let source = PUBLIC_CLASS.replace_all(source, "$1");

        let mut out = String::with_capacity(source.len() + 2048);
        out.push_str("import java.util.*;\n\n");
        out.push_str(&source);
        if !source.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("\npublic class Main {\n");
        out.push_str(RENDER);
        out.push_str("    public static void main(String[] args) throws Exception {\n");
        for param in params {
            out.push_str(&format!("        {}\n", declaration(param)));
        }
        out.push_str(&format!(
            "        Object result = {}({});\n",
            target.callee(true),
            argument_list(params)
        ));
        out.push_str("        System.out.println(render(result));\n");
        out.push_str("    }\n}\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::encode::parse_input;

    const TWO_SUM: &str = r#"public class Solution {
    public Solution() {}

    public int[] twoSum(int[] nums, int target) {
        Map<Integer, Integer> seen = new HashMap<>();
        for (int i = 0; i < nums.length; i++) {
            if (seen.containsKey(target - nums[i])) {
                return new int[]{seen.get(target - nums[i]), i};
            }
            seen.put(nums[i], i);
        }
        return new int[0];
    }
}
"#;

    #[test]
    fn locate_instance_method() {
        let target = Java {}.locate(TWO_SUM);
        assert_eq!(target.name, "twoSum");
        assert_eq!(target.receiver, Receiver::Instance("Solution".into()));
    }

    #[test]
    fn locate_static_method() {
        let src = "class Helper {\n    static boolean isPalindrome(String s) { return true; }\n}\n";
        let target = Java {}.locate(src);
        assert_eq!(target.callee(true), "Helper.isPalindrome");
    }

    #[test]
    fn typed_declarations() {
        let params = parse_input(r#"nums = [2,7,11,15], target = 9, grid = [[1],[2,3]], s = 'hi', x = 2.5, words = ["a","b"], big = 3000000000"#).unwrap();
        let decls: Vec<String> = params.iter().map(declaration).collect();
        assert_eq!(decls[0], "int[] nums = new int[]{2, 7, 11, 15};");
        assert_eq!(decls[1], "int target = 9;");
        assert_eq!(decls[2], "int[][] grid = new int[][]{{1}, {2, 3}};");
        assert_eq!(decls[3], "String s = \"hi\";");
        assert_eq!(decls[4], "double x = 2.5;");
        assert_eq!(decls[5], "String[] words = new String[]{\"a\", \"b\"};");
        assert_eq!(decls[6], "long big = 3000000000L;");
    }

    #[test]
    fn render_demotes_public_class() {
        let target = Java {}.locate(TWO_SUM);
        let params = parse_input("nums = [3,3], target = 6").unwrap();
        let code = Java {}.render(TWO_SUM, &target, &params);
        assert!(code.starts_with("import java.util.*;"));
        assert!(code.contains("\nclass Solution {"));
        assert!(!code.contains("public class Solution"));
        assert!(code.contains("public class Main {"));
        assert!(code.contains("Object result = new Solution().twoSum(nums, target);"));
    }

    #[test]
    fn string_results_keep_their_spaces() {
        let src = "class Solution {\n    public String reverseWords(String s) {\n        return s;\n    }\n}\n";
        let target = Java {}.locate(src);
        let params = parse_input(r#"s = "the sky is blue""#).unwrap();
        let code = Java {}.render(src, &target, &params);
        assert!(code.contains("String s = \"the sky is blue\";"));
        assert!(code.contains("System.out.println(render(result));"));
        assert!(!code.contains(".replace("));
        assert!(code.contains("return String.valueOf(value);"));
    }

    #[test]
    fn nested_strings_print_as_json() {
        let src = "class Solution {\n    public String[] split(String s) {\n        return s.split(\",\");\n    }\n}\n";
        let params = parse_input(r#"s = "a,b""#).unwrap();
        let code = Java {}.render(src, &Java {}.locate(src), &params);
        // ["a","b"]: comma-separated, quoted and escaped elements
        assert!(code.contains("if (i > 0) out.append(',');"));
        assert!(code.contains("} else if (value instanceof CharSequence || value instanceof Character) {\n            out.append('\"');"));
        assert!(code.contains(r#"case '"': out.append("\\\""); break;"#));
        assert!(!code.contains("Arrays.deepToString"));
        assert!(!code.contains("Arrays.toString"));
    }

    #[test]
    fn complete_programs_are_standalone() {
        let src = "public class Main { public static void main(String[] args) {} }";
        assert!(Java {}.is_standalone(src));
        assert!(!Java {}.is_standalone(TWO_SUM));
    }
}
