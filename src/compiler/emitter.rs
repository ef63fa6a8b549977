//! The Emitter module writes a resolved program out as a complete FASM
//! source file: a fixed prologue holding the `dump` routine, one constant
//! code snippet per operation, and an epilogue that exits cleanly and
//! reserves the scratch memory segment.
//!
//! Every jump target is a local label `.addr_N`, where N is the address of
//! the operation that defines it. The builder guarantees each address is
//! patched into at most one branch shape, so every label is defined once.
use std::io::{self, Write};

use super::ops::{Op, OpKind};

/// Size of the flat writable region whose base address `mem` pushes.
/// Fixed: existing Worth programs bake this capacity in.
pub const MEM_CAPACITY: usize = 600_000;

const SYSCALL_REGS: [&str; 7] = ["rax", "rdi", "rsi", "rdx", "r10", "r8", "r9"];

pub struct Emitter<W: Write> {
    out: W,
}

impl<W: Write> Emitter<W> {
    pub fn new(out: W) -> Self {
        Emitter { out }
    }

    /// Writes the complete listing for `program`, consuming the emitter.
    /// The sink is flushed before returning, so buffered writers surface
    /// their errors here rather than on drop.
    pub fn run(mut self, program: &[Op]) -> io::Result<()> {
        self.prologue()?;
        for (addr, op) in program.iter().enumerate() {
            self.operation(addr, op)?;
        }
        self.epilogue()?;
        self.out.flush()
    }

    fn prologue(&mut self) -> io::Result<()> {
        writeln!(self.out, "format ELF64 executable")?;
        writeln!(self.out, "entry _start")?;
        writeln!(self.out)?;
        writeln!(self.out, "segment readable executable")?;
        writeln!(self.out)?;
        // Prints rdi as an unsigned decimal plus newline by prepending
        // digits below rsp, then write(1, rsp, len).
        writeln!(self.out, "dump:")?;
        writeln!(self.out, "\tmov rax, rdi")?;
        writeln!(self.out, "\tmov r10, 0")?;
        writeln!(self.out, "\tdec rsp")?;
        writeln!(self.out, "\tmov byte [rsp], 10")?;
        writeln!(self.out, "\tinc r10")?;
        writeln!(self.out, ".prepend_digit:")?;
        writeln!(self.out, "\tmov rdx, 0")?;
        writeln!(self.out, "\tmov rbx, 10")?;
        writeln!(self.out, "\tdiv rbx")?;
        writeln!(self.out, "\tadd rdx, 48")?;
        writeln!(self.out, "\tdec rsp")?;
        writeln!(self.out, "\tmov [rsp], dl")?;
        writeln!(self.out, "\tinc r10")?;
        writeln!(self.out, "\tcmp rax, 0")?;
        writeln!(self.out, "\tjne .prepend_digit")?;
        writeln!(self.out, ".print_digit:")?;
        writeln!(self.out, "\tmov rax, 1")?;
        writeln!(self.out, "\tmov rdi, 1")?;
        writeln!(self.out, "\tmov rsi, rsp")?;
        writeln!(self.out, "\tmov rdx, r10")?;
        writeln!(self.out, "\tsyscall")?;
        writeln!(self.out, "\tadd rsp, r10")?;
        writeln!(self.out, "\tret")?;
        writeln!(self.out)?;
        writeln!(self.out, "_start:")
    }

    /// Writes the snippet for one operation. The value stack is the
    /// machine stack; the top of stack is the rightmost operand.
    fn operation(&mut self, addr: usize, op: &Op) -> io::Result<()> {
        use OpKind::*;
        writeln!(self.out, ";; -- {} --", op.kind.mnemonic())?;
        match op.kind {
            Push(value) => writeln!(self.out, "\tpush {}", value),

            Plus => {
                writeln!(self.out, "\tpop rdi")?;
                writeln!(self.out, "\tpop rax")?;
                writeln!(self.out, "\tadd rax, rdi")?;
                writeln!(self.out, "\tpush rax")
            }

            Minus => {
                writeln!(self.out, "\tpop rdi")?;
                writeln!(self.out, "\tpop rax")?;
                writeln!(self.out, "\tsub rax, rdi")?;
                writeln!(self.out, "\tpush rax")
            }

            Equal => {
                writeln!(self.out, "\tpop rdi")?;
                writeln!(self.out, "\tpop rdx")?;
                writeln!(self.out, "\txor rax, rax")?;
                writeln!(self.out, "\tcmp rdx, rdi")?;
                writeln!(self.out, "\tsete al")?;
                writeln!(self.out, "\tpush rax")
            }

            // Signed compare, even though dump treats values as unsigned.
            Gt => {
                writeln!(self.out, "\tpop rdi")?;
                writeln!(self.out, "\tpop rdx")?;
                writeln!(self.out, "\txor rax, rax")?;
                writeln!(self.out, "\tcmp rdx, rdi")?;
                writeln!(self.out, "\tsetg al")?;
                writeln!(self.out, "\tpush rax")
            }

            Dup => {
                writeln!(self.out, "\tpop rdi")?;
                writeln!(self.out, "\tpush rdi")?;
                writeln!(self.out, "\tpush rdi")
            }

            Drop => writeln!(self.out, "\tpop rdi"),

            Dump => {
                writeln!(self.out, "\tpop rdi")?;
                writeln!(self.out, "\tcall dump")
            }

            Mem => writeln!(self.out, "\tpush mem"),

            Load => {
                writeln!(self.out, "\tpop rax")?;
                writeln!(self.out, "\txor rdi, rdi")?;
                writeln!(self.out, "\tmov dil, [rax]")?;
                writeln!(self.out, "\tpush rdi")
            }

            Store => {
                writeln!(self.out, "\tpop rdi")?;
                writeln!(self.out, "\tpop rax")?;
                writeln!(self.out, "\tmov [rax], dil")
            }

            If(target) | Do(target) => {
                writeln!(self.out, "\tpop rdi")?;
                writeln!(self.out, "\ttest rdi, rdi")?;
                writeln!(self.out, "\tje .addr_{}", target)
            }

            // The jump lands on the label of the matching closer; this
            // operation's own label sits after the jmp, so branching here
            // enters the other arm (or leaves the loop).
            Else(target) | Done(target) => {
                writeln!(self.out, "\tjmp .addr_{}", target)?;
                writeln!(self.out, ".addr_{}:", addr)
            }

            Fi | While => writeln!(self.out, ".addr_{}:", addr),

            Syscall(count) => {
                for reg in &SYSCALL_REGS[..=count] {
                    writeln!(self.out, "\tpop {}", reg)?;
                }
                // The result in rax is not pushed back.
                writeln!(self.out, "\tsyscall")
            }

            Quit => {
                writeln!(self.out, "\tmov rax, 60")?;
                writeln!(self.out, "\tmov rdi, 0")?;
                writeln!(self.out, "\tsyscall")
            }
        }
    }

    /// Terminates with exit(0) even when the source omits `quit`, then
    /// reserves the writable scratch region.
    fn epilogue(&mut self) -> io::Result<()> {
        writeln!(self.out, "\tmov rax, 60")?;
        writeln!(self.out, "\tmov rdi, 0")?;
        writeln!(self.out, "\tsyscall")?;
        writeln!(self.out)?;
        writeln!(self.out, "segment readable writable")?;
        writeln!(self.out, "mem: rb {}", MEM_CAPACITY)
    }
}
