//! Token definitions for the Asl lexer.
//!
//! Keywords and punctuation follow the Asl grammar (see the glossary in the
//! language specification): `func`, `endfunc`, `var`, `array`, `of`, the four
//! scalar type names, `if`/`while` control flow, `read`/`write` I/O, and the
//! usual arithmetic/relational/logical operator set.

use logos::Logos;

/// A single lexical token.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    // ==================== Keywords ====================
    #[token("func")]
    Func,
    #[token("endfunc")]
    EndFunc,
    #[token("var")]
    Var,
    #[token("array")]
    Array,
    #[token("of")]
    Of,
    #[token("int")]
    Int,
    #[token("float")]
    Float,
    #[token("bool")]
    Bool,
    #[token("char")]
    Char,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("if")]
    If,
    #[token("then")]
    Then,
    #[token("else")]
    Else,
    #[token("endif")]
    EndIf,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("endwhile")]
    EndWhile,
    #[token("return")]
    Return,
    #[token("read")]
    Read,
    #[token("write")]
    Write,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,

    // ==================== Punctuation ====================
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,

    // ==================== Operators ====================
    #[token(":=")]
    Assign,
    #[token("==")]
    Equal,
    #[token("!=")]
    NotEqual,
    #[token("<=")]
    Leq,
    #[token("<")]
    Lt,
    #[token(">=")]
    Geq,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Mul,
    #[token("/")]
    Div,
    #[token("%")]
    Mod,

    // ==================== Literals ====================
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r"[0-9]+", |lex| lex.slice().to_string())]
    IntVal(String),

    #[regex(r"[0-9]+\.[0-9]+", |lex| lex.slice().to_string())]
    FloatVal(String),

    #[regex(r"'([^'\\]|\\.)'", |lex| lex.slice().to_string())]
    CharVal(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| lex.slice().to_string())]
    StringVal(String),
}

impl Token {
    /// A short human-readable name used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Token::Func => "'func'",
            Token::EndFunc => "'endfunc'",
            Token::Var => "'var'",
            Token::Array => "'array'",
            Token::Of => "'of'",
            Token::Int => "'int'",
            Token::Float => "'float'",
            Token::Bool => "'bool'",
            Token::Char => "'char'",
            Token::True => "'true'",
            Token::False => "'false'",
            Token::If => "'if'",
            Token::Then => "'then'",
            Token::Else => "'else'",
            Token::EndIf => "'endif'",
            Token::While => "'while'",
            Token::Do => "'do'",
            Token::EndWhile => "'endwhile'",
            Token::Return => "'return'",
            Token::Read => "'read'",
            Token::Write => "'write'",
            Token::And => "'and'",
            Token::Or => "'or'",
            Token::Not => "'not'",
            Token::LParen => "'('",
            Token::RParen => "')'",
            Token::LBracket => "'['",
            Token::RBracket => "']'",
            Token::Comma => "','",
            Token::Semicolon => "';'",
            Token::Colon => "':'",
            Token::Assign => "':='",
            Token::Equal => "'=='",
            Token::NotEqual => "'!='",
            Token::Leq => "'<='",
            Token::Lt => "'<'",
            Token::Geq => "'>='",
            Token::Gt => "'>'",
            Token::Plus => "'+'",
            Token::Minus => "'-'",
            Token::Mul => "'*'",
            Token::Div => "'/'",
            Token::Mod => "'%'",
            Token::Ident(_) => "identifier",
            Token::IntVal(_) => "integer literal",
            Token::FloatVal(_) => "float literal",
            Token::CharVal(_) => "character literal",
            Token::StringVal(_) => "string literal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_keywords_and_operators() {
        let mut lex = Token::lexer("func endfunc := <= array of int");
        assert_eq!(lex.next(), Some(Ok(Token::Func)));
        assert_eq!(lex.next(), Some(Ok(Token::EndFunc)));
        assert_eq!(lex.next(), Some(Ok(Token::Assign)));
        assert_eq!(lex.next(), Some(Ok(Token::Leq)));
        assert_eq!(lex.next(), Some(Ok(Token::Array)));
        assert_eq!(lex.next(), Some(Ok(Token::Of)));
        assert_eq!(lex.next(), Some(Ok(Token::Int)));
    }

    #[test]
    fn lexes_literals() {
        let mut lex = Token::lexer("foo 42 3.14 'a' \"hi\\n\"");
        assert_eq!(lex.next(), Some(Ok(Token::Ident("foo".into()))));
        assert_eq!(lex.next(), Some(Ok(Token::IntVal("42".into()))));
        assert_eq!(lex.next(), Some(Ok(Token::FloatVal("3.14".into()))));
        assert_eq!(lex.next(), Some(Ok(Token::CharVal("'a'".into()))));
        assert_eq!(lex.next(), Some(Ok(Token::StringVal("\"hi\\n\"".into()))));
    }

    #[test]
    fn skips_line_comments() {
        let mut lex = Token::lexer("var // a comment\nx: int;");
        assert_eq!(lex.next(), Some(Ok(Token::Var)));
        assert_eq!(lex.next(), Some(Ok(Token::Ident("x".into()))));
    }
}
