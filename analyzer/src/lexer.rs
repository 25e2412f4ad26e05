use std::fmt::{Display, Formatter, Result};
use std::sync::OnceLock;

use regex::Regex;

pub type Span = (usize, usize);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'input> {
    pub src: &'input str,
    pub start: usize,
    pub end: usize,
    pub ty: TokenType,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenType {
    // Insignificant Whitespace
    Whitespace,

    // Literals
    // Double-quoted text. No escapes; the first closing quote ends it.
    String,
    // Single-quoted text of any length. Whether it is a valid `char` is a semantic question.
    Char,
    // Integer or decimal with a mandatory fractional part after the dot.
    Number,

    // Punctuation
    Assign,
    Delimiter,

    // Identifier-shaped text. Type keywords and `true`/`false`/`null`
    // are words too; which one a word is depends on where it sits in the line.
    Word,

    // Any single character nothing else accepts.
    Unknown,
}

/// The declared types the lexical stage accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeName {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Boolean,
    Char,
    String,
}

impl TypeName {
    pub fn from_keyword(word: &str) -> Option<TypeName> {
        let type_name = match word {
            "byte"    => Self::Byte,
            "short"   => Self::Short,
            "int"     => Self::Int,
            "long"    => Self::Long,
            "float"   => Self::Float,
            "double"  => Self::Double,
            "boolean" => Self::Boolean,
            "char"    => Self::Char,
            "String"  => Self::String,
            _ => return None,
        };
        Some(type_name)
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Byte    => "byte",
            Self::Short   => "short",
            Self::Int     => "int",
            Self::Long    => "long",
            Self::Float   => "float",
            Self::Double  => "double",
            Self::Boolean => "boolean",
            Self::Char    => "char",
            Self::String  => "String",
        }
    }
}

impl Display for TypeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.keyword())
    }
}

const LITERAL_KEYWORDS: [&str; 3] = ["true", "false", "null"];

impl<'input> Token<'input> {
    pub fn span(&self) -> Span {
        (self.start, self.end)
    }

    /// The declared type this token names, if it is a type keyword.
    pub fn type_name(&self) -> Option<TypeName> {
        match self.ty {
            TokenType::Word => TypeName::from_keyword(self.src),
            _ => None,
        }
    }

    /// Whether this token can fill the value slot of a declaration.
    pub fn is_literal(&self) -> bool {
        match self.ty {
            TokenType::String | TokenType::Char | TokenType::Number => true,
            TokenType::Word => LITERAL_KEYWORDS.contains(&self.src),
            _ => false,
        }
    }
}

/// Splits a single line into [`Token`]s.
///
/// Never fails: text no other pattern accepts comes out as
/// [`TokenType::Unknown`] tokens, one character each.
pub struct Lexer<'input> {
    src: &'input str,
    cur_pos: usize,
}

use TokenType::*;

impl<'input> Lexer<'input> {

    // The lexer tries to find these patterns in this order.
    // Registering a pattern will automatically add ^ to the beginning to ensure
    // that it grabs tokens from the beginning of the slice it's examining, so don't use ^.
    const PATTERNS: [(&'static str, TokenType); 8] = [
        (r"\s+", Whitespace),

        (r#""[^"]*""#, String), // no escapes, so `"a\"b"` is a string followed by garbage
        (r"'[^']*'",   Char),
        (r"[0-9]+(\.[0-9]+)?", Number),

        (r"=", Assign),
        (r";", Delimiter),

        (r"[A-Za-z_][A-Za-z0-9_]*", Word),

        (r"(?s).", Unknown),
    ];

    pub fn new(src: &'input str) -> Lexer<'input> {
        Lexer { src, cur_pos: 0 }
    }

    fn patterns() -> &'static [(Regex, TokenType)] {
        static PATTERNS: OnceLock<Vec<(Regex, TokenType)>> = OnceLock::new();
        PATTERNS.get_or_init(|| {
            Self::PATTERNS.iter()
                .map(|(pattern, token_type)| (Self::register_pattern(pattern), *token_type))
                .collect()
        })
    }

    fn register_pattern(pattern: &str) -> Regex {
        assert!(!pattern.starts_with('^'));
        let pattern = format!("^(?:{})", pattern);
        Regex::new(pattern.as_str()).expect("Invalid regex")
    }

    fn tail(&self) -> &'input str {
        &self.src[self.cur_pos..]
    }

    /// The tokens of the line, minus whitespace.
    pub fn significant(src: &'input str) -> impl Iterator<Item=Token<'input>> {
        Lexer::new(src).filter(|token| token.ty != Whitespace)
    }
}


impl<'input> Iterator for Lexer<'input> {
    type Item = Token<'input>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.cur_pos;
        if self.src.len() <= start {
            return None;
        }

        for (pattern, token_type) in Self::patterns() {
            if let Some(found) = pattern.find(self.tail()) {
                self.cur_pos += found.end();
                let token = Token {
                    src: found.as_str(),
                    start,
                    end: self.cur_pos,
                    ty: *token_type,
                };
                return Some(token);
            }
        }

        unreachable!("the catch-all pattern accepts any character");
    }
}
