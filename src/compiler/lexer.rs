//! This lexer tokenizes Worth.
use super::ops::{Location, Token};

/// Splits source text into located tokens.
///
/// Worth has no delimiters beyond whitespace: a token is a maximal run of
/// non-whitespace bytes. A run that parses as a signed decimal integer
/// becomes an `Int`; anything else becomes a `Word` for the builder to
/// judge. The caller has already rejected bytes above 127, so indexing by
/// byte and by character agree.
pub fn tokenize(source: &str) -> Vec<Token> {
    let bytes = source.as_bytes();
    let mut tokens: Vec<Token> = Vec::new();

    let mut line = 1;
    let mut column = 1;
    let mut i = 0;

    while i < bytes.len() {
        if is_separator(bytes[i]) {
            if bytes[i] == b'\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
            i += 1;
            continue;
        }

        let loc = Location { line, column };
        let start = i;
        while i < bytes.len() && !is_separator(bytes[i]) {
            i += 1;
            column += 1;
        }

        let lexeme = &source[start..i];
        match lexeme.parse::<i64>() {
            Ok(value) => tokens.push(Token::Int(value, loc)),
            Err(_) => tokens.push(Token::Word(lexeme.to_owned(), loc)),
        }
    }

    tokens
}

fn is_separator(b: u8) -> bool {
    match b {
        b'\t' | b'\n' | b'\x0B' | b'\x0C' | b'\x0D' | b' ' => true,
        _ => false,
    }
}
