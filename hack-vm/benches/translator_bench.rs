//! VM Translator Benchmarks
//!
//! Measures translation throughput for arithmetic, stack access, and a
//! function with a nested call (the calling-convention hot path).

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hack_vm::{translate_file, CodeWriter};
use std::io::Write;

fn translate(vm_source: &str, tag: &str) {
    let vm_path = std::env::temp_dir().join(format!("hack_vm_bench_{tag}_{}.vm", std::process::id()));
    let asm_path = std::env::temp_dir().join(format!("hack_vm_bench_{tag}_{}.asm", std::process::id()));
    std::fs::File::create(&vm_path).unwrap().write_all(vm_source.as_bytes()).unwrap();

    let mut writer = CodeWriter::new(asm_path.to_str().unwrap()).unwrap();
    translate_file(vm_path.to_str().unwrap(), &mut writer).unwrap();
    writer.close().unwrap();
}

fn bench_arithmetic(c: &mut Criterion) {
    c.bench_function("translate_arithmetic_chain", |b| {
        b.iter(|| translate(black_box("push constant 7\npush constant 8\nadd\nneg\nnot\n"), "arith"));
    });
}

fn bench_function_call(c: &mut Criterion) {
    let source = "\
function Main.main 2
push constant 1
push constant 2
call Math.multiply 2
pop local 0
return
";
    c.bench_function("translate_function_call", |b| {
        b.iter(|| translate(black_box(source), "call"));
    });
}

criterion_group!(benches, bench_arithmetic, bench_function_call);
criterion_main!(benches);
