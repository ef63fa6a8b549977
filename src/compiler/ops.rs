//! This data model describes a compiled Worth program.
//!
//! Worth source is 7-bit ASCII and whitespace-delimited. Every lexeme is
//! either a signed decimal integer, which pushes its value, or one of the
//! words below. The program operates on a single value stack.
//!
//! ```text
//! +          ; a b -> a+b
//! -          ; a b -> a-b
//! =          ; a b -> 1 if a = b, else 0
//! >          ; a b -> 1 if a > b (signed), else 0
//! dup        ; a -> a a
//! drop       ; a ->
//! dump       ; a ->            prints a as unsigned decimal plus newline
//! mem        ; -> ptr          base of the 600000 byte scratch region
//! ,          ; ptr -> byte     loads one byte
//! .          ; ptr byte ->     stores the low byte
//! if .. fi               ; runs the body when the popped value is nonzero
//! if .. else .. fi       ; two-armed variant
//! while .. do .. done    ; loops while the popped value is nonzero
//! syscall0 .. syscall6   ; num a1 .. ak -> invokes the Linux syscall
//! quit       ; exits with status 0
//! ```
//!
//! Example source file:
//!
//! ```text
//! 5 while dup 3 > do
//!     dup dump
//!     1 -
//! done drop
//! ```
//!
//! Operations refer to one another by index into the program, never by
//! reference. Branch payloads hold those indices once the builder has
//! resolved them.

use std::fmt;

/// 1-based source position of a lexeme's first byte.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// Tokens carry the lexeme value and the position it was read from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Token {
    Word(String, Location),
    Int(i64, Location),
}

impl Token {
    pub fn location(&self) -> Location {
        match self {
            Token::Word(_, loc) | Token::Int(_, loc) => *loc,
        }
    }
}

/// One opcode of the compiled program. Branch variants carry the index of
/// the operation they jump to; the builder fills those in, so a payload is
/// only meaningful after resolution.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum OpKind {
    Push(i64),
    Plus,
    Minus,
    Equal,
    Gt,
    Dup,
    Drop,
    Dump,
    Mem,
    Load,
    Store,
    If(usize),
    Else(usize),
    Fi,
    While,
    Do(usize),
    Done(usize),
    Syscall(usize),
    Quit,
}

impl OpKind {
    /// Maps a source word to its opcode. Branch payloads start at 0 and
    /// are filled in by the builder's resolution pass.
    pub fn from_word(word: &str) -> Option<OpKind> {
        use OpKind::*;
        match word {
            "+"        => Some(Plus),
            "-"        => Some(Minus),
            "="        => Some(Equal),
            ">"        => Some(Gt),
            "dup"      => Some(Dup),
            "drop"     => Some(Drop),
            "dump"     => Some(Dump),
            "mem"      => Some(Mem),
            ","        => Some(Load),
            "."        => Some(Store),
            "if"       => Some(If(0)),
            "else"     => Some(Else(0)),
            "fi"       => Some(Fi),
            "while"    => Some(While),
            "do"       => Some(Do(0)),
            "done"     => Some(Done(0)),
            "syscall0" => Some(Syscall(0)),
            "syscall1" => Some(Syscall(1)),
            "syscall2" => Some(Syscall(2)),
            "syscall3" => Some(Syscall(3)),
            "syscall4" => Some(Syscall(4)),
            "syscall5" => Some(Syscall(5)),
            "syscall6" => Some(Syscall(6)),
            "quit"     => Some(Quit),
            _ => None,
        }
    }

    /// The name written into listing comments.
    pub fn mnemonic(&self) -> String {
        use OpKind::*;
        match self {
            Push(value)    => format!("push {}", value),
            Plus           => "plus".to_owned(),
            Minus          => "minus".to_owned(),
            Equal          => "equal".to_owned(),
            Gt             => "gt".to_owned(),
            Dup            => "dup".to_owned(),
            Drop           => "drop".to_owned(),
            Dump           => "dump".to_owned(),
            Mem            => "mem".to_owned(),
            Load           => "load".to_owned(),
            Store          => "store".to_owned(),
            If(_)          => "if".to_owned(),
            Else(_)        => "else".to_owned(),
            Fi             => "fi".to_owned(),
            While          => "while".to_owned(),
            Do(_)          => "do".to_owned(),
            Done(_)        => "done".to_owned(),
            Syscall(count) => format!("syscall{}", count),
            Quit           => "quit".to_owned(),
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use OpKind::*;
        match self {
            If(target)   => write!(f, "if -> {}", target),
            Else(target) => write!(f, "else -> {}", target),
            Do(target)   => write!(f, "do -> {}", target),
            Done(target) => write!(f, "done -> {}", target),
            _ => write!(f, "{}", self.mnemonic()),
        }
    }
}

/// One element of the compiled program, at the address given by its index.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Op {
    pub kind: OpKind,
    pub loc: Location,
}
