use parse_js::parse;
use parse_js::parse_with_options;
use parse_js::symbol::ScopeTree;
use parse_js::symbol::Symbol;
use parse_js::symbol::SymbolKind;
use parse_js::ParseOptions;
use parse_js::Program;

fn symbols_named<'a>(program: &'a Program, name: &str) -> Vec<&'a Symbol> {
  program
    .symbols
    .iter()
    .filter(|(_, s)| s.name == name)
    .map(|(_, s)| s)
    .collect()
}

#[test]
fn var_in_nested_block_binds_sibling_references() {
  // A `var` in a nested block hoists to the function, so a sibling
  // function's reference must bind to it rather than stay free.
  let program = parse("(() => {\n  function a() {\n    b();\n  }\n  {\n    var b = () => {};\n  }\n  a();\n})();").unwrap();
  let bs = symbols_named(&program, "b");
  assert_eq!(bs.len(), 1);
  assert_eq!(bs[0].kind, SymbolKind::Hoisted);
  assert_eq!(bs[0].use_count, 1);
}

#[test]
fn unresolved_references_share_one_unbound_symbol() {
  let program = parse("console.log(1);\nconsole.warn(2);").unwrap();
  let consoles = symbols_named(&program, "console");
  assert_eq!(consoles.len(), 1);
  assert_eq!(consoles[0].kind, SymbolKind::Unbound);
  assert_eq!(consoles[0].use_count, 2);
}

#[test]
fn let_shadowing_creates_distinct_symbols() {
  let program = parse("let x = 1;\n{\n  let x = 2;\n  x;\n}\nx;").unwrap();
  let xs = symbols_named(&program, "x");
  assert_eq!(xs.len(), 2);
  let counts: Vec<u32> = xs.iter().map(|s| s.use_count).collect();
  assert_eq!(counts.iter().sum::<u32>(), 2);
}

#[test]
fn with_pins_crossing_references_only() {
  let program = parse(
    "(() => {\n  let local = 1;\n  let outer = 2;\n  with ({}) {\n    var hoisted = 4;\n    let inner = 5;\n    inner++;\n    outer++;\n  }\n  local++;\n})();",
  )
  .unwrap();
  // `outer` is referenced through the with scope and `hoisted` is
  // declared through it; both are pinned.
  assert!(symbols_named(&program, "outer")[0].must_keep_name);
  assert!(symbols_named(&program, "hoisted")[0].must_keep_name);
  // Bindings that never cross the with boundary stay renamable.
  assert!(!symbols_named(&program, "inner")[0].must_keep_name);
  assert!(!symbols_named(&program, "local")[0].must_keep_name);
}

#[test]
fn direct_eval_taints_the_enclosing_chain() {
  let program = parse("function t() {\n  function inner() { eval('x'); }\n}").unwrap();
  assert!(program.scopes.get(ScopeTree::MODULE).eval_tainted);
  let tainted = program
    .scopes
    .pre_order()
    .iter()
    .filter(|&&id| program.scopes.get(id).eval_tainted)
    .count();
  // inner's body, inner's args, t's body, t's args, module.
  assert_eq!(tainted, 5);
}

#[test]
fn indirect_eval_does_not_taint() {
  let program = parse("function t() { (0, eval)('x'); }").unwrap();
  assert!(!program.scopes.get(ScopeTree::MODULE).eval_tainted);
}

#[test]
fn shadowed_eval_does_not_taint() {
  let program = parse("function t(eval) { eval('x'); }").unwrap();
  assert!(!program.scopes.get(ScopeTree::MODULE).eval_tainted);
}

#[test]
fn var_arguments_merges_with_the_implicit_binding() {
  let program = parse("function f(x = arguments) { var arguments; return arguments; }").unwrap();
  let args = symbols_named(&program, "arguments");
  assert_eq!(args.len(), 1);
  assert_eq!(args[0].kind, SymbolKind::Arguments);
  assert!(args[0].must_keep_name);
}

#[test]
fn arrow_functions_have_no_arguments_binding() {
  let program = parse("const f = () => { var arguments; return arguments; };").unwrap();
  let args = symbols_named(&program, "arguments");
  assert_eq!(args.len(), 1);
  assert_eq!(args[0].kind, SymbolKind::Hoisted);
}

#[test]
fn var_merges_with_parameter() {
  let program = parse("function f(x) { var x = 1; return x; }").unwrap();
  let xs = symbols_named(&program, "x");
  assert_eq!(xs.len(), 1);
}

#[test]
fn exports_and_module_references_are_counted_when_bundling() {
  let options = ParseOptions {
    is_bundling: true,
    ..ParseOptions::default()
  };
  let program = parse_with_options("exports.a = 1;\nmodule.exports = 2;", &options).unwrap();
  assert!(program.uses_exports_object());
  assert!(program.uses_module_object());

  let program = parse_with_options("console.log(1);", &options).unwrap();
  assert!(!program.uses_exports_object());
  assert!(!program.uses_module_object());
}

#[test]
fn function_expression_name_binds_inside_itself() {
  let program = parse("const f = function g() { return g; };").unwrap();
  let gs = symbols_named(&program, "g");
  assert_eq!(gs.len(), 1);
  assert_eq!(gs[0].use_count, 1);
  assert_eq!(gs[0].kind, SymbolKind::Declared);
}

#[test]
fn catch_parameter_scopes() {
  let program = parse("try {} catch (e) { e; }\nlet e = 1;").unwrap();
  let es = symbols_named(&program, "e");
  assert_eq!(es.len(), 2);
}

#[test]
fn inherited_marks_are_recorded_for_nested_references() {
  let program = parse("let x = 1;\nfunction f() { return x; }").unwrap();
  let (x_id, _) = program
    .symbols
    .iter()
    .find(|(_, s)| s.name == "x")
    .unwrap();
  // Every scope between the reference and the module scope inherits x.
  let inheriting = program
    .scopes
    .pre_order()
    .iter()
    .filter(|&&id| program.scopes.get(id).inherited.contains(&x_id))
    .count();
  assert_eq!(inheriting, 2); // f's args and body scopes
}
