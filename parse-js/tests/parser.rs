use parse_js::ast::*;
use parse_js::parse;
use parse_js::parse_with_options;
use parse_js::Dialect;
use parse_js::ExportsKind;
use parse_js::ImportKind;
use parse_js::ParseOptions;

fn bundling() -> ParseOptions {
  ParseOptions {
    is_bundling: true,
    ..ParseOptions::default()
  }
}

fn jsx() -> ParseOptions {
  ParseOptions {
    dialect: Dialect::Jsx,
    ..ParseOptions::default()
  }
}

#[test]
fn parses_statement_kinds() {
  let program = parse(
    "var a = 1;\nlet b;\nconst c = a + b;\nfunction f(x, y = 2) { return x + y; }\nclass K extends f {}\nif (a) b++; else --c;\nwhile (a) break;\ndo { continue; } while (a);\nfor (let i = 0; i < 10; i++) f(i);\nfor (const k in a) f(k);\nfor (const v of a) f(v);\ntry { f(); } catch (e) { throw e; } finally { f(); }\nswitch (a) { case 1: break; default: f(); }\nouter: for (;;) break outer;\ndebugger;",
  )
  .unwrap();
  assert_eq!(program.top_level.stmts.len(), 15);
  assert!(matches!(program.top_level.stmts[0], Stmt::VarDecl(_)));
  assert!(matches!(program.top_level.stmts[4], Stmt::ClassDecl(_)));
  assert!(matches!(program.top_level.stmts[13], Stmt::Labeled(_)));
}

#[test]
fn asi_separates_statements() {
  let program = parse("a\nb\nc").unwrap();
  assert_eq!(program.top_level.stmts.len(), 3);
}

#[test]
fn missing_semicolon_without_newline_is_an_error() {
  assert!(parse("a b").is_err());
}

#[test]
fn arrows_and_parenthesized_expressions() {
  let program = parse("(a, b) => a + b;\n(a + b);\nx => x;\nasync x => x;\nasync (a) => a;").unwrap();
  let Stmt::Expr(first) = &program.top_level.stmts[0] else {
    panic!("expected expression statement");
  };
  assert!(matches!(first.expr, Expr::Arrow(_)));
  let Stmt::Expr(second) = &program.top_level.stmts[1] else {
    panic!("expected expression statement");
  };
  assert!(matches!(second.expr, Expr::Binary(_)));
  let Stmt::Expr(third) = &program.top_level.stmts[2] else {
    panic!("expected expression statement");
  };
  assert!(matches!(third.expr, Expr::Arrow(_)));
  for stmt in &program.top_level.stmts[3..] {
    let Stmt::Expr(stmt) = stmt else {
      panic!("expected expression statement");
    };
    let Expr::Arrow(func) = &stmt.expr else {
      panic!("expected arrow");
    };
    assert!(func.is_async);
  }
}

#[test]
fn arrow_body_may_not_follow_line_terminator() {
  assert!(parse("(a, b)\n=> a").is_err());
}

#[test]
fn exponentiation_is_right_associative() {
  let program = parse("a ** b ** c").unwrap();
  let Stmt::Expr(stmt) = &program.top_level.stmts[0] else {
    panic!("expected expression statement");
  };
  let Expr::Binary(outer) = &stmt.expr else {
    panic!("expected binary");
  };
  assert_eq!(outer.op, BinaryOp::Exp);
  assert!(matches!(outer.right, Expr::Binary(_)));
  assert!(matches!(outer.left, Expr::Id(_)));
}

#[test]
fn static_require_creates_an_import_record() {
  let program = parse_with_options("const x = require('./y');", &bundling()).unwrap();
  assert_eq!(program.import_records.len(), 1);
  assert_eq!(program.import_records[0].kind, ImportKind::Require);
  assert_eq!(program.import_records[0].specifier, "./y");
  assert!(program.diagnostics.is_empty());
}

#[test]
fn template_require_without_substitution_is_static() {
  let program = parse_with_options("require(`./y`);", &bundling()).unwrap();
  assert_eq!(program.import_records.len(), 1);
  assert_eq!(program.import_records[0].specifier, "./y");
}

#[test]
fn non_literal_require_is_diagnosed() {
  let program = parse_with_options("require(foo);\nrequire('a' + 'b');", &bundling()).unwrap();
  assert_eq!(program.import_records.len(), 0);
  assert_eq!(program.diagnostics.len(), 2);
  assert!(program.diagnostics[0]
    .message
    .contains("The argument to require() must be a string literal"));
}

#[test]
fn indirect_require_is_diagnosed_outside_try() {
  let program = parse_with_options("const r = require;", &bundling()).unwrap();
  assert_eq!(program.diagnostics.len(), 1);
  assert!(program.diagnostics[0]
    .message
    .contains("\"require\" must not be called indirectly"));
}

#[test]
fn indirect_require_inside_try_becomes_null() {
  let program = parse_with_options("try { var r = require; } catch (e) {}", &bundling()).unwrap();
  assert!(program.diagnostics.is_empty());
  let Stmt::Try(try_stmt) = &program.top_level.stmts[0] else {
    panic!("expected try");
  };
  let Stmt::VarDecl(decl) = &try_stmt.block.stmts[0] else {
    panic!("expected var decl");
  };
  assert!(matches!(decl.decls[0].init, Some(Expr::Null(_))));
}

#[test]
fn typeof_require_is_the_function_string() {
  let program = parse_with_options("console.log(typeof require);", &bundling()).unwrap();
  let Stmt::Expr(stmt) = &program.top_level.stmts[0] else {
    panic!("expected expression statement");
  };
  let Expr::Call(call) = &stmt.expr else {
    panic!("expected call");
  };
  let Expr::Str(s) = &call.args[0] else {
    panic!("expected string literal, got {:?}", call.args[0]);
  };
  assert_eq!(s.value, "function");
}

#[test]
fn typeof_require_is_untouched_without_bundling() {
  let program = parse("console.log(typeof require);").unwrap();
  let Stmt::Expr(stmt) = &program.top_level.stmts[0] else {
    panic!("expected expression statement");
  };
  let Expr::Call(call) = &stmt.expr else {
    panic!("expected call");
  };
  assert!(matches!(call.args[0], Expr::Unary(_)));
}

#[test]
fn dynamic_import_records_and_diagnostics() {
  let program = parse_with_options("import('./a');\nimport(foo);", &bundling()).unwrap();
  assert_eq!(program.import_records.len(), 1);
  assert_eq!(program.import_records[0].kind, ImportKind::Dynamic);
  assert_eq!(program.diagnostics.len(), 1);
  assert!(program.diagnostics[0]
    .message
    .contains("The argument to import() must be a string literal"));
}

#[test]
fn top_level_return_requires_bundling() {
  let program = parse_with_options("if (x) return;", &bundling()).unwrap();
  assert!(program.has_top_level_return);
  assert_eq!(program.exports_kind, ExportsKind::CommonJs);
  assert!(parse("if (x) return;").is_err());
}

#[test]
fn return_inside_arrow_is_not_top_level() {
  let program = parse_with_options("const f = () => { return 1; };", &bundling()).unwrap();
  assert!(!program.has_top_level_return);
}

#[test]
fn module_this_is_detected_only_at_the_top_level() {
  let program = parse_with_options("console.log(this);", &bundling()).unwrap();
  assert!(program.has_module_this);
  let program = parse_with_options("function f() { return this; }", &bundling()).unwrap();
  assert!(!program.has_module_this);
  // Arrows inherit the module `this`.
  let program = parse_with_options("const f = (x = this) => this;", &bundling()).unwrap();
  assert!(program.has_module_this);
  // Class fields and methods have their own `this`.
  let program =
    parse_with_options("class A { x = this; m() { return this; } }", &bundling()).unwrap();
  assert!(!program.has_module_this);
}

#[test]
fn exports_kind_inference() {
  assert_eq!(
    parse_with_options("import 'x';", &bundling()).unwrap().exports_kind,
    ExportsKind::Esm
  );
  assert_eq!(
    parse_with_options("exports.a = 1;", &bundling()).unwrap().exports_kind,
    ExportsKind::CommonJs
  );
  assert_eq!(
    parse_with_options("module.exports = 1;", &bundling()).unwrap().exports_kind,
    ExportsKind::CommonJs
  );
  assert_eq!(
    parse_with_options("console.log(1);", &bundling()).unwrap().exports_kind,
    ExportsKind::None
  );
}

#[test]
fn export_forms_populate_named_exports() {
  let program = parse_with_options(
    "export default 123;\nexport var v = 1;\nexport function fn() {}\nexport class K {}\nexport {v as w};\nexport {x as y} from './z';\nexport * from './a';\nexport * as ns from './b';",
    &bundling(),
  )
  .unwrap();
  let keys: Vec<&str> = program.named_exports.keys().map(|k| k.as_str()).collect();
  assert_eq!(keys, vec!["K", "default", "fn", "ns", "v", "w", "y"]);
  assert_eq!(program.export_stars.len(), 1);
  assert!(matches!(
    program.named_exports["y"],
    parse_js::NamedExport::ReExport { .. }
  ));
  assert!(matches!(
    program.named_exports["ns"],
    parse_js::NamedExport::NamespaceReExport { .. }
  ));
}

#[test]
fn export_default_named_function_is_hoisted_and_exported() {
  let program = parse_with_options("export default function foo() {}", &bundling()).unwrap();
  assert!(matches!(program.top_level.stmts[0], Stmt::FuncDecl(_)));
  assert!(program.named_exports.contains_key("default"));
}

#[test]
fn import_forms_populate_named_imports() {
  let program = parse_with_options(
    "import def from './a';\nimport * as ns from './b';\nimport {x, y as z} from './c';\nimport './d';",
    &bundling(),
  )
  .unwrap();
  assert_eq!(program.import_records.len(), 4);
  assert_eq!(program.named_imports.len(), 4);
  let aliases: Vec<Option<&str>> = program
    .named_imports
    .values()
    .map(|i| i.alias.as_deref())
    .collect();
  assert!(aliases.contains(&Some("default")));
  assert!(aliases.contains(&None));
  assert!(aliases.contains(&Some("x")));
  assert!(aliases.contains(&Some("y")));
}

#[test]
fn jsx_lowers_to_factory_calls() {
  let program = parse_with_options("let a = <div x={1} y/>;", &jsx()).unwrap();
  let Stmt::VarDecl(decl) = &program.top_level.stmts[0] else {
    panic!("expected var decl");
  };
  let Some(Expr::Call(call)) = &decl.decls[0].init else {
    panic!("expected call");
  };
  let Expr::Member(member) = &call.callee else {
    panic!("expected member callee");
  };
  assert_eq!(member.prop, "createElement");
  let Expr::Str(tag) = &call.args[0] else {
    panic!("expected string tag");
  };
  assert_eq!(tag.value, "div");
  let Expr::Object(props) = &call.args[1] else {
    panic!("expected props object");
  };
  assert_eq!(props.props.len(), 2);
}

#[test]
fn jsx_fragment_and_children() {
  let program = parse_with_options("let a = <>fragment</>;", &jsx()).unwrap();
  let Stmt::VarDecl(decl) = &program.top_level.stmts[0] else {
    panic!("expected var decl");
  };
  let Some(Expr::Call(call)) = &decl.decls[0].init else {
    panic!("expected call");
  };
  // Tag, null props, one text child.
  assert_eq!(call.args.len(), 3);
  assert!(matches!(call.args[1], Expr::Null(_)));
  let Expr::Str(text) = &call.args[2] else {
    panic!("expected text child");
  };
  assert_eq!(text.value, "fragment");
}

#[test]
fn jsx_nested_elements_and_mismatched_tags() {
  let program = parse_with_options("let a = <div><span>x</span>{y}</div>;", &jsx()).unwrap();
  let Stmt::VarDecl(decl) = &program.top_level.stmts[0] else {
    panic!("expected var decl");
  };
  let Some(Expr::Call(call)) = &decl.decls[0].init else {
    panic!("expected call");
  };
  assert_eq!(call.args.len(), 4);
  assert!(parse_with_options("let a = <div></span>;", &jsx()).is_err());
}

#[test]
fn typescript_annotations_are_erased() {
  let options = ParseOptions {
    dialect: Dialect::Ts,
    ..ParseOptions::default()
  };
  let program = parse_with_options(
    "let x: number = 1;\ninterface I { a: string; b(): void }\ntype T = A | B<C>;\nfunction f(a: string, b?: number): void {}\nclass K implements I { private a: string = 'x'; m(v: T): T { return v; } }\ndeclare const ambient: number;",
    &options,
  )
  .unwrap();
  // interface/type/declare erase to nothing.
  let real: Vec<&Stmt> = program
    .top_level
    .stmts
    .iter()
    .filter(|s| !matches!(s, Stmt::Empty(_)))
    .collect();
  assert_eq!(real.len(), 3);
}

#[test]
fn typescript_enum_is_unsupported() {
  let options = ParseOptions {
    dialect: Dialect::Ts,
    ..ParseOptions::default()
  };
  assert!(parse_with_options("enum E { A, B }", &options).is_err());
}

#[test]
fn hashbang_is_preserved() {
  let program = parse("#!/usr/bin/env node\nconsole.log(1);").unwrap();
  assert_eq!(
    program.top_level.hashbang.as_deref(),
    Some("#!/usr/bin/env node")
  );
  assert_eq!(program.top_level.stmts.len(), 1);
}

#[test]
fn optional_chaining_and_nullish_coalescing() {
  let program = parse("a?.b?.(c) ?? d;").unwrap();
  let Stmt::Expr(stmt) = &program.top_level.stmts[0] else {
    panic!("expected expression statement");
  };
  let Expr::Binary(binary) = &stmt.expr else {
    panic!("expected binary");
  };
  assert_eq!(binary.op, BinaryOp::Coalesce);
}

#[test]
fn regex_vs_division() {
  let program = parse("let r = /a[/]b/g;\nlet d = x / y / z;").unwrap();
  let Stmt::VarDecl(decl) = &program.top_level.stmts[0] else {
    panic!("expected var decl");
  };
  assert!(matches!(decl.decls[0].init, Some(Expr::Regex(..))));
  let Stmt::VarDecl(decl) = &program.top_level.stmts[1] else {
    panic!("expected var decl");
  };
  assert!(matches!(decl.decls[0].init, Some(Expr::Binary(_))));
}

#[test]
fn destructuring_patterns() {
  let program = parse("const {a, b: {c}, d = 1, ...rest} = obj;\nconst [x, , y, ...zs] = arr;")
    .unwrap();
  let Stmt::VarDecl(decl) = &program.top_level.stmts[0] else {
    panic!("expected var decl");
  };
  let Pat::Object(object) = &decl.decls[0].pat else {
    panic!("expected object pattern");
  };
  assert_eq!(object.props.len(), 3);
  assert!(object.rest.is_some());
  let Stmt::VarDecl(decl) = &program.top_level.stmts[1] else {
    panic!("expected var decl");
  };
  let Pat::Array(array) = &decl.decls[0].pat else {
    panic!("expected array pattern");
  };
  assert_eq!(array.items.len(), 3);
  assert!(array.items[1].is_none());
  assert!(array.rest.is_some());
}
