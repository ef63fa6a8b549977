//! The Builder module takes the token stream from the lexer and converts
//! it into a resolved program: a flat, indexed list of operations whose
//! branch payloads have been back-patched to their jump targets.
use super::ops::{Location, Op, OpKind, Token};

pub struct Builder {
    tokens: Vec<Token>,
    program: Vec<Op>,
}

impl Builder {
    pub fn new(tokens: Vec<Token>) -> Self {
        let capacity = tokens.len();
        Builder { tokens, program: Vec::with_capacity(capacity) }
    }

    /// Runs the builder, consuming it and returning the resolved program.
    pub fn run(mut self) -> Result<Vec<Op>, String> {
        for token in std::mem::take(&mut self.tokens) {
            let op = Self::operation(token)?;
            self.program.push(op);
        }

        self.resolve()?;
        Ok(self.program)
    }

    /// Maps one token to its operation.
    fn operation(token: Token) -> Result<Op, String> {
        match token {
            Token::Int(value, loc) => Ok(Op { kind: OpKind::Push(value), loc }),
            Token::Word(word, loc) => match OpKind::from_word(&word) {
                Some(kind) => Ok(Op { kind, loc }),
                None => Err(format!("{}: unknown word `{}`", loc, word)),
            },
        }
    }

    /// Back-patches branch targets in a single left-to-right pass.
    ///
    /// An auxiliary stack holds the addresses of open blocks: one entry for
    /// an `if` or `else`, two for a `while ... do`. Each closer checks that
    /// what it pops is a shape it is allowed to close before patching it.
    fn resolve(&mut self) -> Result<(), String> {
        let mut blocks: Vec<usize> = Vec::new();

        for addr in 0..self.program.len() {
            let loc = self.program[addr].loc;
            match self.program[addr].kind {
                OpKind::If(_) | OpKind::While | OpKind::Do(_) => blocks.push(addr),

                // The `if` now jumps to the `else`; the `else` itself is
                // pushed for the `fi` to patch.
                OpKind::Else(_) => {
                    let open = match blocks.pop() {
                        Some(open) => open,
                        None => return Err(format!("{}: `else` without a matching `if`", loc)),
                    };
                    self.patch_branch(open, addr, "else", loc)?;
                    blocks.push(addr);
                }

                OpKind::Fi => {
                    let open = match blocks.pop() {
                        Some(open) => open,
                        None => return Err(format!("{}: `fi` without a matching `if`", loc)),
                    };
                    self.patch_branch(open, addr, "fi", loc)?;
                }

                // `done` consumes both halves of the loop: the `do` learns
                // to skip past the loop, the `done` learns where the
                // `while` head is.
                OpKind::Done(_) => {
                    let (cond, head) = match (blocks.pop(), blocks.pop()) {
                        (Some(cond), Some(head)) => (cond, head),
                        _ => return Err(format!("{}: `done` without a matching `while ... do`", loc)),
                    };
                    self.patch_do(cond, addr, loc)?;
                    let head_op = self.program[head];
                    match head_op.kind {
                        OpKind::While => {}
                        _ => return Err(format!(
                            "{}: `done` cannot close the `{}` opened at {}",
                            loc, head_op.kind.mnemonic(), head_op.loc
                        )),
                    }
                    if let OpKind::Done(target) = &mut self.program[addr].kind {
                        *target = head;
                    }
                }

                _ => {}
            }
        }

        if !blocks.is_empty() {
            return Err("unterminated while or if block".to_owned());
        }
        Ok(())
    }

    /// Writes `target` into the branch payload of the `if` or `else` at
    /// `open`. Only those two shapes may be closed by `else` or `fi`;
    /// anything else on top of the block stack is a structural error.
    /// `word` and `loc` describe the closing keyword, for diagnostics.
    fn patch_branch(&mut self, open: usize, target: usize, word: &str, loc: Location) -> Result<(), String> {
        let opened = self.program[open];
        match &mut self.program[open].kind {
            OpKind::If(slot) | OpKind::Else(slot) => {
                *slot = target;
                Ok(())
            }
            _ => Err(format!(
                "{}: `{}` cannot close the `{}` opened at {}",
                loc, word, opened.kind.mnemonic(), opened.loc
            )),
        }
    }

    /// Writes `target` into the `do` at `open`; `done` closes loops only.
    fn patch_do(&mut self, open: usize, target: usize, loc: Location) -> Result<(), String> {
        let opened = self.program[open];
        match &mut self.program[open].kind {
            OpKind::Do(slot) => {
                *slot = target;
                Ok(())
            }
            _ => Err(format!(
                "{}: `done` cannot close the `{}` opened at {}",
                loc, opened.kind.mnemonic(), opened.loc
            )),
        }
    }
}
