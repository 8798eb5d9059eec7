pub mod cpp;
pub mod java;
pub mod javascript;
pub mod python;

use crate::encode::{Literal, Param};

use std::fmt;

/// Languages the judge is asked to run, with their Judge0 CE ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    JavaScript,
    Python,
    Java,
    Cpp,
    C,
    CSharp,
    TypeScript,
    Go,
    Rust,
    Kotlin,
    Swift,
    Ruby,
}

pub const DEFAULT_LANGUAGE: Language = Language::Python;

/// Resolves a user-supplied language name. Unknown names fall back to Python 3.
pub fn resolve(name: &str) -> Language {
    Language::from_name(name).unwrap_or(DEFAULT_LANGUAGE)
}

impl Language {
    pub fn from_name(name: &str) -> Option<Self> {
        let lang = match name.trim().to_ascii_lowercase().as_str() {
            "javascript" | "js" | "node" | "nodejs" => Language::JavaScript,
            "python" | "python3" | "py" => Language::Python,
            "java" => Language::Java,
            "cpp" | "c++" | "cxx" => Language::Cpp,
            "c" => Language::C,
            "csharp" | "c#" | "cs" => Language::CSharp,
            "typescript" | "ts" => Language::TypeScript,
            "go" | "golang" => Language::Go,
            "rust" | "rs" => Language::Rust,
            "kotlin" | "kt" => Language::Kotlin,
            "swift" => Language::Swift,
            "ruby" | "rb" => Language::Ruby,
            _ => return None,
        };
        Some(lang)
    }

    pub fn id(self) -> u32 {
        match self {
            Language::JavaScript => 63,
            Language::Python => 71,
            Language::Java => 62,
            Language::Cpp => 54,
            Language::C => 50,
            Language::CSharp => 51,
            Language::TypeScript => 74,
            Language::Go => 60,
            Language::Rust => 73,
            Language::Kotlin => 78,
            Language::Swift => 83,
            Language::Ruby => 72,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::C => "c",
            Language::CSharp => "csharp",
            Language::TypeScript => "typescript",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Kotlin => "kotlin",
            Language::Swift => "swift",
            Language::Ruby => "ruby",
        }
    }

    /// The driver generator of a function-call language, `None` for stdin languages.
    pub fn harness(self) -> Option<&'static dyn Harness> {
        static PYTHON: python::Python = python::Python {};
        static JAVASCRIPT: javascript::JavaScript = javascript::JavaScript {};
        static JAVA: java::Java = java::Java {};
        static CPP: cpp::Cpp = cpp::Cpp {};

        match self {
            Language::Python => Some(&PYTHON),
            Language::JavaScript | Language::TypeScript => Some(&JAVASCRIPT),
            Language::Java => Some(&JAVA),
            Language::Cpp => Some(&CPP),
            _ => None,
        }
    }

    pub fn uses_function_call(self) -> bool {
        self.harness().is_some()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Function name used when the candidate's function cannot be located.
pub const FALLBACK_FUNCTION: &str = "solution";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receiver {
    Free,
    /// `new Class().f(..)` / `Class().f(..)`
    Instance(String),
    /// `Class.f(..)`
    Static(String),
}

/// The function a driver calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub receiver: Receiver,
}

impl Target {
    pub fn free(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            receiver: Receiver::Free,
        }
    }

    pub fn fallback() -> Self {
        Self::free(FALLBACK_FUNCTION)
    }

    /// `receiver.name` or `name`, with `new` for instance receivers when `new_kw` is set.
    pub fn callee(&self, new_kw: bool) -> String {
        match &self.receiver {
            Receiver::Free => self.name.clone(),
            Receiver::Instance(class) if new_kw => format!("new {}().{}", class, self.name),
            Receiver::Instance(class) => format!("{}().{}", class, self.name),
            Receiver::Static(class) => format!("{}.{}", class, self.name),
        }
    }
}

pub trait Harness: Send + Sync {
    fn lang_name(&self) -> &str;

    /// Whether the source is already a complete program that reads stdin.
    fn is_standalone(&self, _source: &str) -> bool {
        false
    }

    /// Finds the function to call. Never fails: the fallback name is used instead.
    fn locate(&self, source: &str) -> Target;

    /// The complete program: candidate source followed by the generated driver.
    fn render(&self, source: &str, target: &Target, params: &[Param]) -> String;
}

fn argument_list(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The static type of a literal, as far as typed languages need it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Int,
    Long,
    Float,
    Bool,
    Str,
    /// `[]`, fits any array element type
    Empty,
    Array(Box<Shape>),
}

impl Shape {
    pub fn of(literal: &Literal) -> Option<Shape> {
        match literal {
            Literal::Int(text) => Some(if text.parse::<i32>().is_ok() {
                Shape::Int
            } else {
                Shape::Long
            }),
            Literal::Float(_) => Some(Shape::Float),
            Literal::Bool(_) => Some(Shape::Bool),
            Literal::Str { .. } => Some(Shape::Str),
            Literal::List(items) => {
                let mut elem = Shape::Empty;
                for item in items {
                    elem = Shape::unify(elem, Shape::of(item)?)?;
                }
                Some(Shape::Array(Box::new(elem)))
            }
            Literal::Null | Literal::Raw(_) => None,
        }
    }

    fn unify(a: Shape, b: Shape) -> Option<Shape> {
        use Shape::*;
        match (a, b) {
            (Empty, x) | (x, Empty) => Some(x),
            (a, b) if a == b => Some(a),
            (Int, Long) | (Long, Int) => Some(Long),
            (Int | Long, Float) | (Float, Int | Long) => Some(Float),
            (Array(a), Array(b)) => Some(Array(Box::new(Shape::unify(*a, *b)?))),
            _ => None,
        }
    }

    /// Innermost element type; an array of nothing but empty arrays holds ints.
    pub fn element(&self) -> Shape {
        match self {
            Shape::Array(inner) => inner.element(),
            Shape::Empty => Shape::Int,
            other => other.clone(),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Shape::Array(inner) => 1 + inner.depth(),
            _ => 0,
        }
    }
}

/// Renders a literal with brace-delimited arrays, as Java and C++ initializers do.
fn braced(literal: &Literal, elem: &Shape, render_scalar: &dyn Fn(&Literal, &Shape) -> String) -> String {
    match literal {
        Literal::List(items) => {
            let inner: Vec<String> = items.iter().map(|item| braced(item, elem, render_scalar)).collect();
            format!("{{{}}}", inner.join(", "))
        }
        scalar => render_scalar(scalar, elem),
    }
}
