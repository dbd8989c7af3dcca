use diagnostics::Severity;
use parse_js::ast::*;
use parse_js::parse_with_options;
use parse_js::Dialect;
use parse_js::ParseOptions;
use parse_js::Target;

fn options(target: Target) -> ParseOptions {
  ParseOptions {
    target,
    ..ParseOptions::default()
  }
}

fn first_expr(program: &parse_js::Program) -> &Expr {
  let Stmt::Expr(stmt) = &program.top_level.stmts[0] else {
    panic!("expected expression statement, got {:?}", program.top_level.stmts[0]);
  };
  &stmt.expr
}

fn callee_name<'a>(program: &'a parse_js::Program, expr: &'a Expr) -> &'a str {
  let Expr::Call(call) = expr else {
    panic!("expected call, got {:?}", expr);
  };
  let Expr::Id(id) = &call.callee else {
    panic!("expected identifier callee");
  };
  &program.symbols.get(id.symbol.unwrap()).name
}

#[test]
fn exponent_lowers_below_es2017() {
  let program = parse_with_options("a ** b;", &options(Target::Es2015)).unwrap();
  assert_eq!(callee_name(&program, first_expr(&program)), "__pow");
  let warnings: Vec<_> = program
    .diagnostics
    .iter()
    .filter(|d| d.severity == Severity::Warning)
    .collect();
  assert_eq!(warnings.len(), 1);
  assert_eq!(
    warnings[0].message,
    "This syntax is from ES2016 and is not available in ES2015"
  );
}

#[test]
fn exponent_is_kept_at_es2017() {
  let program = parse_with_options("a ** b;", &options(Target::Es2017)).unwrap();
  assert!(matches!(first_expr(&program), Expr::Binary(_)));
  assert!(program.diagnostics.is_empty());
}

#[test]
fn nested_exponents_lower_inside_out() {
  let program = parse_with_options("a ** b ** c;", &options(Target::Es2015)).unwrap();
  let Expr::Call(outer) = first_expr(&program) else {
    panic!("expected call");
  };
  assert!(matches!(&outer.args[1], Expr::Call(_)));
}

#[test]
fn exponent_assignment_to_identifier() {
  let program = parse_with_options("a **= b;", &options(Target::Es2015)).unwrap();
  let Expr::Assign(assign) = first_expr(&program) else {
    panic!("expected assignment");
  };
  assert_eq!(assign.op, AssignOp::Assign);
  assert!(matches!(assign.target, Expr::Id(_)));
  assert_eq!(callee_name(&program, &assign.value), "__pow");
}

#[test]
fn exponent_assignment_captures_evaluated_objects() {
  let program = parse_with_options("a().b **= c;", &options(Target::Es2015)).unwrap();
  // The temp declaration is inserted first; the rewritten statement
  // follows.
  let Stmt::VarDecl(decl) = &program.top_level.stmts[0] else {
    panic!("expected a temp var decl first, got {:?}", program.top_level.stmts[0]);
  };
  assert_eq!(decl.mode, VarDeclMode::Var);
  let Pat::Id(temp) = &decl.decls[0].pat else {
    panic!("expected identifier temp");
  };
  assert_eq!(temp.name, "_a");
  let Stmt::Expr(stmt) = &program.top_level.stmts[1] else {
    panic!("expected expression statement");
  };
  // Target became `(_a = a()).b`.
  let Expr::Assign(assign) = &stmt.expr else {
    panic!("expected assignment");
  };
  let Expr::Member(member) = &assign.target else {
    panic!("expected member target");
  };
  assert!(matches!(member.obj, Expr::Assign(_)));
}

#[test]
fn simple_member_exponent_assignment_needs_no_temp() {
  let program = parse_with_options("a.b **= c;", &options(Target::Es2015)).unwrap();
  // No temp declaration was inserted.
  assert_eq!(program.top_level.stmts.len(), 1);
  let Expr::Assign(assign) = first_expr(&program) else {
    panic!("expected assignment");
  };
  let Expr::Member(member) = &assign.target else {
    panic!("expected member target");
  };
  assert!(matches!(member.obj, Expr::Id(_)));
}

#[test]
fn object_spread_lowers_below_es2018() {
  let program = parse_with_options("let t = {...a, b: 1, ...c};", &options(Target::Es2017)).unwrap();
  let Stmt::VarDecl(decl) = &program.top_level.stmts[0] else {
    panic!("expected var decl");
  };
  let Some(init) = &decl.decls[0].init else {
    panic!("expected initializer");
  };
  // __assign(__assign(__assign({}, a), {b: 1}), c)
  assert_eq!(callee_name(&program, init), "__assign");
  let warnings: Vec<_> = program
    .diagnostics
    .iter()
    .filter(|d| d.severity == Severity::Warning)
    .collect();
  assert_eq!(warnings.len(), 1);
  assert_eq!(
    warnings[0].message,
    "This syntax is from ES2018 and is not available in ES2017"
  );
}

#[test]
fn object_spread_is_kept_at_es2018() {
  let program = parse_with_options("let t = {...a};", &options(Target::Es2018)).unwrap();
  let Stmt::VarDecl(decl) = &program.top_level.stmts[0] else {
    panic!("expected var decl");
  };
  assert!(matches!(decl.decls[0].init, Some(Expr::Object(_))));
}

#[test]
fn jsx_spread_attributes_lower_with_object_spread() {
  let options = ParseOptions {
    dialect: Dialect::Jsx,
    target: Target::Es2017,
    ..ParseOptions::default()
  };
  let program = parse_with_options("let a = <div {...p} q/>;", &options).unwrap();
  let Stmt::VarDecl(decl) = &program.top_level.stmts[0] else {
    panic!("expected var decl");
  };
  let Some(Expr::Call(call)) = &decl.decls[0].init else {
    panic!("expected factory call");
  };
  // The props argument became an __assign chain.
  assert_eq!(callee_name(&program, &call.args[1]), "__assign");
}

#[test]
fn optional_catch_binding_gains_a_parameter() {
  let program = parse_with_options("try {} catch {}", &options(Target::Es2018)).unwrap();
  let Stmt::Try(try_stmt) = &program.top_level.stmts[0] else {
    panic!("expected try");
  };
  let catch = try_stmt.catch.as_ref().unwrap();
  assert!(catch.param.is_some());
}

#[test]
fn optional_catch_binding_is_kept_at_es2020() {
  let program = parse_with_options("try {} catch {}", &options(Target::Es2020)).unwrap();
  let Stmt::Try(try_stmt) = &program.top_level.stmts[0] else {
    panic!("expected try");
  };
  assert!(try_stmt.catch.as_ref().unwrap().param.is_none());
}

#[test]
fn nullish_coalescing_warns_below_es2020() {
  let program = parse_with_options("a ?? b;", &options(Target::Es2015)).unwrap();
  assert!(program
    .diagnostics
    .iter()
    .any(|d| d.message == "This syntax is from ES2020 and is not available in ES2015"));
}

#[test]
fn temps_are_scoped_to_the_enclosing_function() {
  let program =
    parse_with_options("function f() { a().b **= c; }", &options(Target::Es2015)).unwrap();
  // The temp declaration lands inside f, not at the top level.
  let Stmt::FuncDecl(decl) = &program.top_level.stmts[0] else {
    panic!("expected function decl");
  };
  let FuncBody::Block(stmts) = &decl.func.body else {
    panic!("expected block body");
  };
  assert!(matches!(stmts[0], Stmt::VarDecl(_)));
  assert_eq!(program.top_level.stmts.len(), 1);
}
