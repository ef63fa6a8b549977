//  tests/compile.rs
//
//  `$ cargo test` will pick this up automatically.
//
//  Each scenario compiles a Worth program through the library entry point.
//  When `fasm` is installed, the listing is also assembled and the
//  produced executable is run with its stdout asserted; otherwise the
//  execution half of the test is skipped.

mod worth {
    use std::path::PathBuf;
    use std::process::{Command, Stdio};
    use std::fs::write;
    use worthc::compile_to_fasm;

    fn fasm_available() -> bool {
        Command::new("fasm")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }

    /// Assembles and runs `source`, returning its stdout. `None` means
    /// fasm is not installed and execution was skipped.
    fn execute_code(name: &str, source: &str) -> std::io::Result<Option<String>> {
        if !fasm_available() {
            eprintln!("fasm not found - skipping execution test");
            return Ok(None);
        }

        // scratch dir under target/ so `cargo clean` wipes it
        let scratch: PathBuf = {
            let p = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("worth_exec");
            std::fs::create_dir_all(&p)?;
            p
        };

        let asm_path = scratch.join(format!("{}.s", name));
        let exe_path = scratch.join(name);
        let asm = compile_to_fasm(source).expect("compilation failed");
        write(&asm_path, asm)?;

        let ok = Command::new("fasm")
            .arg(&asm_path)
            .arg(&exe_path)
            .stdout(Stdio::null())  // throw away the assembler banner
            .status()?
            .success();
        assert!(ok, "fasm failed");

        let out = Command::new(&exe_path).current_dir(&scratch).output()?;
        assert!(out.status.success(), "executable failed with status: {}", out.status);

        Ok(Some(String::from_utf8_lossy(&out.stdout).to_string()))
    }

    #[test]
    fn addition_dumps_sum() {
        if let Some(out) = execute_code("addition", "34 35 + dump").unwrap() {
            assert_eq!(out, "69\n");
        }
    }

    #[test]
    fn subtraction_dumps_difference() {
        if let Some(out) = execute_code("subtraction", "10 2 - dump").unwrap() {
            assert_eq!(out, "8\n");
        }
    }

    #[test]
    fn dup_doubles_the_top() {
        if let Some(out) = execute_code("dup", "5 dup + dump").unwrap() {
            assert_eq!(out, "10\n");
        }
    }

    #[test]
    fn if_takes_the_then_arm() {
        if let Some(out) = execute_code("if_then", "1 if 42 dump else 99 dump fi").unwrap() {
            assert_eq!(out, "42\n");
        }
    }

    #[test]
    fn if_takes_the_else_arm() {
        if let Some(out) = execute_code("if_else", "0 if 42 dump else 99 dump fi").unwrap() {
            assert_eq!(out, "99\n");
        }
    }

    #[test]
    fn while_counts_down() {
        let src = "5 while dup 3 > do dup dump 1 - done drop";
        if let Some(out) = execute_code("countdown", src).unwrap() {
            assert_eq!(out, "5\n4\n");
        }
    }

    #[test]
    fn while_with_false_condition_never_runs() {
        // 0 > 3 is false on entry, so the body is skipped entirely.
        let src = "0 while dup 3 > do dup dump 1 + done drop";
        if let Some(out) = execute_code("skipped_loop", src).unwrap() {
            assert_eq!(out, "");
        }
    }

    #[test]
    fn memory_round_trips_a_byte() {
        if let Some(out) = execute_code("memory", "mem 72 . mem , dump").unwrap() {
            assert_eq!(out, "72\n");
        }
    }

    #[test]
    fn syscall3_writes_to_stdout() {
        // write(1, mem, 1) after storing 'W' at mem. The pop order is
        // rax, rdi, rsi, rdx, so the number goes on the stack last.
        let src = "mem 87 . 1 mem 1 1 syscall3";
        if let Some(out) = execute_code("syscall_write", src).unwrap() {
            assert_eq!(out, "W");
        }
    }

    #[test]
    fn quit_stops_execution() {
        if let Some(out) = execute_code("quit", "42 dump quit 99 dump").unwrap() {
            assert_eq!(out, "42\n");
        }
    }

    #[test]
    fn empty_source_exits_cleanly() {
        if let Some(out) = execute_code("empty", "").unwrap() {
            assert_eq!(out, "");
        }
    }

    #[test]
    fn nested_blocks_link_and_run() {
        // Prints 3 2 1, flagging the middle iteration with 77.
        let src = "3 while dup do dup dump dup 2 = if 77 dump fi 1 - done drop";
        if let Some(out) = execute_code("nested", src).unwrap() {
            assert_eq!(out, "3\n2\n77\n1\n");
        }
    }

    #[test]
    fn listing_is_deterministic() {
        let src = "5 while dup 3 > do dup dump 1 - done drop";
        assert_eq!(compile_to_fasm(src).unwrap(), compile_to_fasm(src).unwrap());
    }

    #[test]
    fn listing_has_fasm_shape() {
        let asm = compile_to_fasm("1 if 42 dump fi").unwrap();
        assert!(asm.starts_with("format ELF64 executable\n"));
        assert!(asm.contains("entry _start"));
        assert!(asm.contains("segment readable executable"));
        assert!(asm.contains("mem: rb 600000"));
    }

    #[test]
    fn structural_errors_surface_through_the_library() {
        assert!(compile_to_fasm("1 if 2 dump").unwrap_err().contains("unterminated"));
        assert!(compile_to_fasm("frobnicate").unwrap_err().starts_with("1:1:"));
    }
}
