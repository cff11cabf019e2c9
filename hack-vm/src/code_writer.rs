use std::fs::File;
use std::io::{BufWriter, Write};

// 定义一个宏来简化汇编代码的写入
macro_rules! write_asm {
    ($writer:expr, $($line:literal)*) => {
        $writer.write_all(concat!($($line, "\n"),*).as_bytes())
    };
}

#[derive(Clone, Copy)]
enum SegmentSymbol {
    Local,
    Argument,
    This,
    That,
    Temp,
    Pointer,
    Static,
    Constant,
}

impl SegmentSymbol {
    fn from_str(segment: &str) -> Option<Self> {
        match segment {
            "local" => Some(SegmentSymbol::Local),
            "argument" => Some(SegmentSymbol::Argument),
            "this" => Some(SegmentSymbol::This),
            "that" => Some(SegmentSymbol::That),
            "temp" => Some(SegmentSymbol::Temp),
            "pointer" => Some(SegmentSymbol::Pointer),
            "static" => Some(SegmentSymbol::Static),
            "constant" => Some(SegmentSymbol::Constant),
            _ => None,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            SegmentSymbol::Local => "LCL",
            SegmentSymbol::Argument => "ARG",
            SegmentSymbol::This => "THIS",
            SegmentSymbol::That => "THAT",
            SegmentSymbol::Temp => "R5",
            SegmentSymbol::Pointer => "THIS", // Special case handled separately
            SegmentSymbol::Static => "STATIC", // Special case handled separately
            SegmentSymbol::Constant => "CONSTANT", // Special case handled separately
        }
    }
}

/// Function name used for labels emitted before any `function` command has
/// been seen (bootstrap code and test files with bare arithmetic/branches).
const TOP_LEVEL_CONTEXT: &str = "Bootstrap";

pub struct CodeWriter {
    output_file: BufWriter<File>,
    label_counter: usize,
    call_counter: usize,
    filename: String,
    current_function: String,
}

impl CodeWriter {
    /// 创建一个新的CodeWriter实例，用于将汇编代码写入指定的输出文件，默认启动使用Buf占据8192字节。
    pub fn new(output_filename: &str) -> Result<Self, std::io::Error> {
        let file = File::create(output_filename)?;
        let buffered = BufWriter::with_capacity(8192, file);
        Ok(CodeWriter {
            output_file: buffered,
            label_counter: 0,
            call_counter: 0,
            filename: String::new(),
            current_function: TOP_LEVEL_CONTEXT.to_string(),
        })
    }

    #[inline]
    pub fn set_filename(&mut self, filename: &str) {
        // Extract filename without path and extension
        let name = std::path::Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Unknown");
        self.filename.clear();
        self.filename.push_str(name);
    }

    pub fn write_arithmetic(&mut self, command: &str) -> Result<(), std::io::Error> {
        writeln!(self.output_file, "// vm command:{}", command)?;

        match command {
            "add" => self.write_binary_op("D+M"),
            "sub" => self.write_binary_op("D-M"),
            "and" => self.write_binary_op("D&M"),
            "or" => self.write_binary_op("D|M"),
            "neg" => self.write_unary_op(true),
            "not" => self.write_unary_op(false),
            "eq" => self.write_comparison("JEQ"),
            "gt" => self.write_comparison("JGT"),
            "lt" => self.write_comparison("JLT"),
            _ => panic!("Unknown arithmetic command: {}", command),
        }
    }

    #[inline]
    fn write_binary_op(&mut self, operation: &str) -> Result<(), std::io::Error> {
        // Optimized: write all at once to reduce syscalls
        write!(
            self.output_file,
            "// get the top element of stack\n\
             @SP\n\
             M=M-1\n\
             A=M\n\
             D=M\n\
             // store the result temporarily\n\
             @R14\n\
             M=D\n\
             // get the top element of stack\n\
             @SP\n\
             M=M-1\n\
             A=M\n\
             D=M\n\
             // store the result temporarily\n\
             @R13\n\
             M=D\n\
             @R13\n\
             D=M\n\
             @R14\n\
             D={}\n",
            operation
        )?;

        self.write_push_d()?;
        self.output_file.write_all(b"\n")?;
        Ok(())
    }

    #[inline]
    fn write_unary_op(&mut self, is_neg: bool) -> Result<(), std::io::Error> {
        write_asm!(self.output_file,
            "// get the top element of stack"
            "@SP"
            "M=M-1"
            "A=M"
            "D=M"
        )?;

        if is_neg {
            write_asm!(self.output_file,
                "@0"
                "D=A-D"
            )?;
        } else {
            write_asm!(self.output_file, "D=!D")?;
        }

        self.write_push_d()?;
        self.output_file.write_all(b"\n")?;
        Ok(())
    }

    #[inline]
    fn write_comparison(&mut self, jump: &str) -> Result<(), std::io::Error> {
        let label_prefix = match jump {
            "JEQ" => "EQ",
            "JGT" => "GT",
            "JLT" => "LT",
            _ => jump,
        };
        let label_num = self.label_counter;
        self.label_counter += 1;

        write!(
            self.output_file,
            "// get the top element of stack\n\
             @SP\n\
             M=M-1\n\
             A=M\n\
             D=M\n\
             // store the result temporarily\n\
             @R14\n\
             M=D\n\
             // get the top element of stack\n\
             @SP\n\
             M=M-1\n\
             A=M\n\
             D=M\n\
             // store the result temporarily\n\
             @R13\n\
             M=D\n\
             @R13\n\
             D=M\n\
             @R14\n\
             D=D-M\n\
             @{}{}\n\
             D;{}\n\
             // push the value into stack\n\
             @SP\n\
             A=M\n\
             M=0\n\
             @SP\n\
             M=M+1\n\
             @END{}{}\n\
             0;JMP\n\
             ({}{})\n\
             // push the value into stack\n\
             @SP\n\
             A=M\n\
             M=-1\n\
             @SP\n\
             M=M+1\n\
             (END{}{})\n\n",
            label_prefix,
            label_num,
            jump,
            label_prefix,
            label_num,
            label_prefix,
            label_num,
            label_prefix,
            label_num
        )
    }

    pub fn write_push_pop(
        &mut self,
        command: &str,
        segment: &str,
        index: i32,
    ) -> Result<(), std::io::Error> {
        writeln!(
            self.output_file,
            "// vm command:{} {} {}",
            command, segment, index
        )?;

        if command == "push" {
            self.write_push(segment, index)?;
        } else if command == "pop" {
            self.write_pop(segment, index)?;
        }

        self.output_file.write_all(b"\n")?;
        Ok(())
    }

    #[inline]
    fn write_push(&mut self, segment: &str, index: i32) -> Result<(), std::io::Error> {
        match SegmentSymbol::from_str(segment) {
            Some(SegmentSymbol::Constant) => {
                write!(self.output_file, "@{}\nD=A\n", index)?;
                self.write_push_d()
            }
            Some(seg)
                if matches!(
                    seg,
                    SegmentSymbol::Local
                        | SegmentSymbol::Argument
                        | SegmentSymbol::This
                        | SegmentSymbol::That
                ) =>
            {
                let segment_symbol = seg.symbol();
                write!(
                    self.output_file,
                    "@{}\nD=M\n@{}\nA=D+A\nD=M\n",
                    segment_symbol, index
                )?;
                self.write_push_d()
            }
            Some(SegmentSymbol::Temp) => {
                write!(self.output_file, "@R5\nD=A\n@{}\nA=D+A\nD=M\n", index)?;
                self.write_push_d()
            }
            Some(SegmentSymbol::Pointer) => {
                write!(self.output_file, "@THIS\nD=A\n@{}\nA=D+A\nD=M\n", index)?;
                self.write_push_d()
            }
            Some(SegmentSymbol::Static) => {
                write!(self.output_file, "@{}.{}\nD=M\n", self.filename, index)?;
                self.write_push_d()
            }
            _ => panic!("Unknown segment: {}", segment),
        }
    }

    #[inline]
    fn write_pop(&mut self, segment: &str, index: i32) -> Result<(), std::io::Error> {
        match SegmentSymbol::from_str(segment) {
            Some(seg)
                if matches!(
                    seg,
                    SegmentSymbol::Local
                        | SegmentSymbol::Argument
                        | SegmentSymbol::This
                        | SegmentSymbol::That
                ) =>
            {
                let segment_symbol = seg.symbol();
                write!(
                    self.output_file,
                    "@{}\n\
                     D=M\n\
                     @{}\n\
                     D=D+A\n\
                     // store the result temporarily\n\
                     @R13\n\
                     M=D\n",
                    segment_symbol, index
                )?;

                self.write_pop_to_d()?;

                write_asm!(self.output_file,
                    "// store the top value"
                    "@R13"
                    "A=M"
                    "M=D"
                )?;
                Ok(())
            }
            Some(SegmentSymbol::Temp) => {
                write!(
                    self.output_file,
                    "@5\n\
                     D=A\n\
                     @{}\n\
                     D=D+A\n\
                     // store the result temporarily\n\
                     @R13\n\
                     M=D\n",
                    index
                )?;

                self.write_pop_to_d()?;

                write_asm!(self.output_file,
                    "// store the top value"
                    "@R13"
                    "A=M"
                    "M=D"
                )?;
                Ok(())
            }
            Some(SegmentSymbol::Pointer) => {
                write!(
                    self.output_file,
                    "@THIS\n\
                     D=A\n\
                     @{}\n\
                     D=D+A\n\
                     // store the result temporarily\n\
                     @R13\n\
                     M=D\n",
                    index
                )?;

                self.write_pop_to_d()?;

                write_asm!(self.output_file,
                    "// store the top value"
                    "@R13"
                    "A=M"
                    "M=D"
                )?;
                Ok(())
            }
            Some(SegmentSymbol::Static) => {
                self.write_pop_to_d()?;
                write!(self.output_file, "@{}.{}\nM=D\n", self.filename, index)
            }
            _ => panic!("Cannot pop to segment: {}", segment),
        }
    }

    #[inline]
    fn write_push_d(&mut self) -> Result<(), std::io::Error> {
        write_asm!(self.output_file,
            "// push the value into stack"
            "@SP"
            "A=M"
            "M=D"
            "@SP"
            "M=M+1"
        )
    }

    #[inline]
    fn write_pop_to_d(&mut self) -> Result<(), std::io::Error> {
        write_asm!(self.output_file,
            "// get the top element of stack"
            "@SP"
            "M=M-1"
            "A=M"
            "D=M"
        )
    }

    /// `label L` -> `(<function>$L)`, scoped to the enclosing function so
    /// the same label text in different functions never collides.
    pub fn write_label(&mut self, label: &str) -> Result<(), std::io::Error> {
        writeln!(self.output_file, "({}${})", self.current_function, label)
    }

    /// `goto L` -> unconditional jump to `<function>$L`.
    pub fn write_goto(&mut self, label: &str) -> Result<(), std::io::Error> {
        write!(
            self.output_file,
            "@{}${}\n0;JMP\n",
            self.current_function, label
        )
    }

    /// `if-goto L` -> pop the top of the stack, jump to `<function>$L` if
    /// it is nonzero. Uses `JNE`, not the `JGT` that a naive truthiness
    /// check might reach for (the VM's boolean encoding is -1/0, and JGT
    /// would miss the -1 case entirely).
    pub fn write_if_goto(&mut self, label: &str) -> Result<(), std::io::Error> {
        self.write_pop_to_d()?;
        write!(
            self.output_file,
            "@{}${}\nD;JNE\n",
            self.current_function, label
        )
    }

    /// `function F.g k` declares `(F.g)` and zero-initializes `k` locals.
    pub fn write_function(&mut self, name: &str, n_locals: i32) -> Result<(), std::io::Error> {
        self.current_function.clear();
        self.current_function.push_str(name);

        writeln!(self.output_file, "({name})")?;
        for _ in 0..n_locals {
            write!(self.output_file, "@0\nD=A\n")?;
            self.write_push_d()?;
        }
        Ok(())
    }

    /// `call F.g n`: save the caller's frame, reposition ARG/LCL, and jump
    /// to the callee, per the Hack function-call convention.
    pub fn write_call(&mut self, name: &str, n_args: i32) -> Result<(), std::io::Error> {
        let return_label = format!("{}$ret.{}", self.current_function, self.call_counter);
        self.call_counter += 1;

        // push returnAddr
        write!(self.output_file, "@{return_label}\nD=A\n")?;
        self.write_push_d()?;

        // push LCL, ARG, THIS, THAT
        for segment in ["LCL", "ARG", "THIS", "THAT"] {
            write!(self.output_file, "@{segment}\nD=M\n")?;
            self.write_push_d()?;
        }

        // ARG = SP - 5 - n
        write!(
            self.output_file,
            "@SP\nD=M\n@{}\nD=D-A\n@ARG\nM=D\n",
            5 + n_args
        )?;

        // LCL = SP
        write!(self.output_file, "@SP\nD=M\n@LCL\nM=D\n")?;

        // goto F.g
        write!(self.output_file, "@{name}\n0;JMP\n")?;

        writeln!(self.output_file, "({return_label})")
    }

    /// `return`: restore the caller's segments and jump back to the
    /// return address saved by `call`.
    pub fn write_return(&mut self) -> Result<(), std::io::Error> {
        // R13 = endFrame = LCL
        write!(self.output_file, "@LCL\nD=M\n@R13\nM=D\n")?;
        // R14 = retAddr = *(endFrame - 5)
        write!(self.output_file, "@5\nA=D-A\nD=M\n@R14\nM=D\n")?;

        // *ARG = pop()
        self.write_pop_to_d()?;
        write!(self.output_file, "@ARG\nA=M\nM=D\n")?;

        // SP = ARG + 1
        write!(self.output_file, "@ARG\nD=M+1\n@SP\nM=D\n")?;

        // THAT, THIS, ARG, LCL = *(endFrame-1..4), walking R13 down
        for segment in ["THAT", "THIS", "ARG", "LCL"] {
            write!(self.output_file, "@R13\nAM=M-1\nD=M\n@{segment}\nM=D\n")?;
        }

        // goto retAddr
        write!(self.output_file, "@R14\nA=M\n0;JMP\n")
    }

    /// Bootstrap code emitted once, before any translated file, when the
    /// input is a directory: `SP=256; call Sys.init 0`.
    pub fn write_init(&mut self) -> Result<(), std::io::Error> {
        writeln!(self.output_file, "// bootstrap")?;
        write!(self.output_file, "@256\nD=A\n@SP\nM=D\n")?;
        self.write_call("Sys.init", 0)
    }

    #[inline]
    pub fn close(&mut self) -> Result<(), std::io::Error> {
        self.output_file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read as _;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn temp_path(tag: &str) -> String {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir()
            .join(format!("hack_vm_code_writer_{tag}_{}_{id}.asm", std::process::id()))
            .to_string_lossy()
            .into_owned()
    }

    fn read_output(path: &str) -> String {
        let mut contents = String::new();
        File::open(path).unwrap().read_to_string(&mut contents).unwrap();
        contents
    }

    #[test]
    fn label_goto_if_goto_use_function_scoped_names() {
        let path = temp_path("labels");
        let mut cw = CodeWriter::new(&path).unwrap();
        cw.write_function("Foo.bar", 0).unwrap();
        cw.write_label("LOOP").unwrap();
        cw.write_goto("LOOP").unwrap();
        cw.write_if_goto("LOOP").unwrap();
        cw.close().unwrap();

        let output = read_output(&path);
        assert!(output.contains("(Foo.bar$LOOP)"));
        assert!(output.contains("@Foo.bar$LOOP\n0;JMP"));
        assert!(output.contains("D;JNE"));
        assert!(!output.contains("D;JGT"));
    }

    #[test]
    fn call_pushes_frame_and_jumps() {
        let path = temp_path("call");
        let mut cw = CodeWriter::new(&path).unwrap();
        cw.write_function("Main.main", 0).unwrap();
        cw.write_call("Foo.bar", 2).unwrap();
        cw.close().unwrap();

        let output = read_output(&path);
        assert!(output.contains("@Main.main$ret.0"));
        assert!(output.contains("@Foo.bar\n0;JMP"));
        assert!(output.contains("(Main.main$ret.0)"));
    }

    #[test]
    fn return_restores_segments() {
        let path = temp_path("return");
        let mut cw = CodeWriter::new(&path).unwrap();
        cw.write_return().unwrap();
        cw.close().unwrap();

        let output = read_output(&path);
        assert!(output.contains("@LCL\nD=M\n@R13\nM=D"));
        assert!(output.contains("@THAT\nM=D"));
        assert!(output.contains("@LCL\nM=D"));
    }

    #[test]
    fn init_emits_sp_256_and_calls_sys_init() {
        let path = temp_path("init");
        let mut cw = CodeWriter::new(&path).unwrap();
        cw.write_init().unwrap();
        cw.close().unwrap();

        let output = read_output(&path);
        assert!(output.contains("@256\nD=A\n@SP\nM=D"));
        assert!(output.contains("@Sys.init\n0;JMP"));
    }

    #[test]
    fn static_segment_is_scoped_to_filename() {
        let path = temp_path("static");
        let mut cw = CodeWriter::new(&path).unwrap();
        cw.set_filename("Foo.vm");
        cw.write_push_pop("push", "static", 3).unwrap();
        cw.close().unwrap();

        let output = read_output(&path);
        assert!(output.contains("@Foo.3"));
    }
}
