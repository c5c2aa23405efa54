//! Emitter integration tests: source in, instructions and text out.

use bumpalo::Bump;
use nebula_binder::{bind, BoundUnits};
use nebula_core::SourceText;
use nebula_emitter::*;
use nebula_syntax::parse_compilation_unit;
use std::rc::Rc;

fn bind_sources(sources: &[(&str, &str)]) -> BoundUnits {
    let arena = Bump::new();
    let units: Vec<_> = sources
        .iter()
        .map(|(file, text)| {
            let (unit, report) = parse_compilation_unit(&arena, Rc::new(SourceText::new(*file, *text)));
            assert!(!report.has_errors(), "parse errors in {file}: {report:?}");
            unit
        })
        .collect();
    let units = bind(&units, &[]).expect("no fatal errors");
    assert!(!units.has_errors(), "{:?}", units.report);
    units
}

/// Helper: emit a single `main.nebula` unit.
fn emit(text: &str) -> Assembly {
    let units = bind_sources(&[("main.nebula", text)]);
    Emitter::default().emit(&units.programs[0]).unwrap()
}

fn opcodes(assembly: &Assembly, function: &str) -> Vec<Opcode> {
    assembly
        .method(function)
        .unwrap()
        .instructions
        .iter()
        .map(|i| i.opcode)
        .collect()
}

fn contains_sequence(haystack: &[Opcode], needle: &[Opcode]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

const POINT_PROGRAM: &str =
    "bundle Point { int x; int y; } func int main() { int a = 0; while (a <= 3) { a = a + 1; } return a; }";

#[test]
fn test_point_program_text() {
    let text = emit(POINT_PROGRAM).to_text().unwrap();
    let expected = "\
# >> nebula - Version 1.0.0 <<

.namespace \"main\"

.bundle Point ( int x , int y )
.func int main (  )
{
.locals [ int ]
0000 ldc_i4 0
0001 stloc 0
0002 ldloc 0
0003 ldc_i4 3
0004 cgt
0005 ldc_i4_0
0006 ceq
0007 brfalse 15
0008 ldloc 0
0009 ldc_i4 1
000A add
000B dup
000C stloc 0
000D pop
000E br 2
000F ldloc 0
0010 ret
}

";
    assert_eq!(text, expected);
}

#[test]
fn test_not_equals_pattern() {
    let assembly = emit("func bool differ(int a, int b) { return a != b; }");
    assert_eq!(
        opcodes(&assembly, "differ"),
        vec![Opcode::LdArg, Opcode::LdArg, Opcode::Ceq, Opcode::LdcI4_0, Opcode::Ceq, Opcode::Ret]
    );
}

#[test]
fn test_comparison_patterns() {
    let assembly = emit("func bool at_least(int a, int b) { return a >= b; }");
    assert!(contains_sequence(
        &opcodes(&assembly, "at_least"),
        &[Opcode::Clt, Opcode::LdcI4_0, Opcode::Ceq]
    ));
}

#[test]
fn test_string_concat_merges_constants() {
    let assembly = emit("func string greet(string s) { return \"a\" + \"b\" + s; }");
    let method = assembly.method("greet").unwrap();
    let addstr: Vec<_> = method
        .instructions
        .iter()
        .filter(|i| i.opcode == Opcode::AddStr)
        .collect();
    assert_eq!(addstr.len(), 1);
    assert_eq!(addstr[0].operand, Operand::Int(2));
    assert_eq!(method.instructions[0].operand, Operand::String("ab".into()));
}

#[test]
fn test_constant_string_is_folded() {
    let assembly = emit("func string name() { return \"ne\" + \"bula\"; }");
    assert_eq!(opcodes(&assembly, "name"), vec![Opcode::LdcS, Opcode::Ret]);
}

#[test]
fn test_unary_patterns() {
    let assembly = emit("func bool flip(bool b) { return !b; } func int inv(int a) { return ~-a; }");
    assert_eq!(
        opcodes(&assembly, "flip"),
        vec![Opcode::LdArg, Opcode::LdcI4_0, Opcode::Ceq, Opcode::Ret]
    );
    assert_eq!(
        opcodes(&assembly, "inv"),
        vec![Opcode::LdArg, Opcode::Neg, Opcode::Not, Opcode::Ret]
    );
}

#[test]
fn test_locals_get_slots_in_declaration_order() {
    let assembly = emit("func void main(int p, int q) { int a = q; string b; bool c = true; }");
    let method = assembly.method("main").unwrap();
    let names: Vec<_> = method.locals.iter().map(|l| (l.name.as_str(), l.index)).collect();
    assert_eq!(names, vec![("a", 0), ("b", 1), ("c", 2)]);
    assert_eq!(method.instructions[0], Instruction::new(Opcode::LdArg, Operand::Slot(1), method.instructions[0].span));
    assert_eq!(method.instructions.last().map(|i| i.opcode), Some(Opcode::Ret));
}

#[test]
fn test_labels_are_resolved() {
    let assembly = emit(
        "func int count(int n) { int total = 0; for (int i = 0; i < n; i += 1) { if (i == 2) { continue; } total += i; } return total; }",
    );
    let method = assembly.method("count").unwrap();
    let len = method.instructions.len() as i32;
    for instruction in &method.instructions {
        if instruction.opcode.is_branch() {
            let Operand::Int(target) = instruction.operand else {
                panic!("unresolved branch {instruction:?}");
            };
            assert!((0..=len).contains(&target));
        }
    }
}

#[test]
fn test_if_else_branches() {
    let assembly = emit("func int pick(bool b) { if (b) { return 1; } else { return 2; } }");
    let method = assembly.method("pick").unwrap();
    let ops = opcodes(&assembly, "pick");
    assert_eq!(
        ops,
        vec![
            Opcode::LdArg,
            Opcode::BrFalse,
            Opcode::LdcI4,
            Opcode::Ret,
            Opcode::Br,
            Opcode::LdcI4,
            Opcode::Ret
        ]
    );
    assert_eq!(method.instructions[1].operand, Operand::Int(5));
    assert_eq!(method.instructions[4].operand, Operand::Int(7));
    assert_eq!(method.instructions[4].span, None);
}

#[test]
fn test_call_results_are_popped() {
    let assembly = emit("func int one() { return 1; } func void nothing() { } func void main() { one(); nothing(); async nothing(); }");
    assert_eq!(
        opcodes(&assembly, "main"),
        vec![Opcode::Call, Opcode::Pop, Opcode::Call, Opcode::CallT, Opcode::Ret]
    );
}

#[test]
fn test_bundle_fields() {
    let assembly = emit("bundle Point { int x; int y; } func int main(Point q) { Point p = 0; p.y = q.x; return p.y; }");
    let method = assembly.method("main").unwrap();
    let rendered: Vec<_> = method
        .instructions
        .iter()
        .map(|i| format!("{} {}", i.opcode, i.format_arguments().unwrap()).trim_end().to_string())
        .collect();
    assert_eq!(
        rendered,
        ["ld_b Point", "stloc 0", "ldbarg 0 0", "dup", "stbloc 0 1", "pop", "ldbloc 0 1", "ret"]
    );
}

#[test]
fn test_cross_namespace_references() {
    let util = "namespace \"util\"; bundle Pair { int a; } func int one() { return 1; }";
    let main = "namespace \"main\"; import \"util\"; func int main() { util::Pair p = 0; return util::one(); }";
    let units = bind_sources(&[("util.nebula", util), ("main.nebula", main)]);
    let assembly = Emitter::default().emit(&units.programs[1]).unwrap();
    let method = assembly.method("main").unwrap();
    assert_eq!(
        method.instructions[0],
        Instruction::new(
            Opcode::LdB,
            Operand::Names(vec!["util".into(), "Pair".into()]),
            method.instructions[0].span
        )
    );
    let call = method.instructions.iter().find(|i| i.opcode == Opcode::Call).unwrap();
    assert_eq!(call.operand, Operand::Names(vec!["util".into(), "one".into()]));
}

#[test]
fn test_wait_and_notify() {
    let assembly = emit("bundle Ev { } func void main() { Ev e = 0; wait 5; e waittill \"go\"; e notify \"go\"; }");
    let ops = opcodes(&assembly, "main");
    assert!(contains_sequence(&ops, &[Opcode::LdcI4, Opcode::Wait]));
    assert!(contains_sequence(&ops, &[Opcode::LdLoc, Opcode::LdcS, Opcode::WaitN]));
    assert!(contains_sequence(&ops, &[Opcode::LdLoc, Opcode::LdcS, Opcode::Notify]));
}

#[test]
fn test_arrays() {
    let assembly = emit("func int main() { int[,] grid; grid[1, 2] = 7; return grid[1, 2]; }");
    let method = assembly.method("main").unwrap();
    assert_eq!(
        method.instructions[0].operand,
        Operand::Names(vec!["int".into(), "2".into()])
    );
    let ops = opcodes(&assembly, "main");
    assert!(contains_sequence(&ops, &[Opcode::LdcI4, Opcode::StElem, Opcode::Pop]));
    assert!(contains_sequence(&ops, &[Opcode::LdcI4, Opcode::LdElem, Opcode::Ret]));
    assert!(assembly.to_text().unwrap().contains(".locals [ int[,] ]"));
}

#[test]
fn test_casts_emit_convtype() {
    let assembly = emit("func string show(int n) { return string(n); }");
    let method = assembly.method("show").unwrap();
    assert_eq!(method.instructions[1].operand, Operand::Type("string".into()));
}

// ============================================================================
// Debug document
// ============================================================================

const TWO_FUNCTIONS: &str = "namespace \"game\";
native int random(int max);
bundle Point { int x; int y; }

func int roll(int sides) {
    int value = random(sides);
    return value + 1;
}

func void start() autoexec {
    Point p = 0;
    p.x = roll(6);
}
";

#[test]
fn test_debug_document_contents() {
    let units = bind_sources(&[("game.nebula", TWO_FUNCTIONS)]);
    let debug = Emitter::default().emit(&units.programs[0]).unwrap().debug_file();

    assert_eq!(debug.namespace, "game");
    assert_eq!(debug.original_file_name, "game.nebula");
    assert_eq!(debug.md5_hash, debug::md5_hex(TWO_FUNCTIONS));
    assert!(debug.native_functions.contains("random"));
    assert_eq!(debug.bundles["Point"].fields.len(), 2);

    let roll = &debug.functions["roll"];
    assert_eq!(roll.line_number, 4);
    assert_eq!(roll.end_line_number, 7);
    assert_eq!(roll.parameters[0].name, "sides");
    assert_eq!(roll.local_variables[0].name, "value");
    assert_eq!(roll.line_starting_opcode_index.get(&5), Some(&0));
    assert_eq!(roll.line_starting_opcode_index.get(&6), Some(&3));
    assert_eq!(roll.statements.first(), Some(&0));

    let start = &debug.functions["start"];
    assert_eq!(start.local_variables[0].source_namespace.as_deref(), Some("game"));
    assert_eq!(start.local_variables[0].source_type.as_deref(), Some("Point"));
}

#[test]
fn test_debug_document_round_trip() {
    let units = bind_sources(&[("game.nebula", TWO_FUNCTIONS)]);
    let debug = Emitter::default().emit(&units.programs[0]).unwrap().debug_file();
    let first = debug.to_json();
    let reparsed = DebugFile::from_json(&first).unwrap();
    assert_eq!(reparsed, debug);
    assert_eq!(reparsed.to_json(), first);
}
