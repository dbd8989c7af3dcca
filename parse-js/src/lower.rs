//! Target lowering.
//!
//! Runs after binding so synthesized identifiers can be given fresh
//! symbols that are invisible to name lookup. Three lowerings are
//! supported: exponentiation to `__pow` (below ES2017, with temporaries
//! capturing member objects/indices that have object identity), object
//! spread to `__assign` (below ES2018), and the optional catch binding
//! (below ES2020 targets that predate it). Syntax newer than the target
//! that cannot be lowered only warns.

use crate::ast::*;
use crate::symbol::ScopeId;
use crate::symbol::SymbolId;
use crate::symbol::SymbolKind;
use crate::ParseDiagnostic;
use crate::ParseOptions;
use crate::Program;
use crate::Target;
use diagnostics::Loc;
use diagnostics::Severity;

pub(crate) fn lower(program: &mut Program, options: &ParseOptions) {
  let mut lowerer = Lowerer {
    program,
    target: options.target,
    sinks: Vec::new(),
    warned: Warned::default(),
    warnings: Vec::new(),
  };
  lowerer.run();
}

#[derive(Default)]
struct Warned {
  exponent: bool,
  object_spread: bool,
  optional_catch: bool,
  es2020: bool,
}

struct TempSink {
  scope: ScopeId,
  temps: Vec<SymbolId>,
  counter: u32,
}

struct Lowerer<'a> {
  program: &'a mut Program,
  target: Target,
  sinks: Vec<TempSink>,
  warned: Warned,
  warnings: Vec<ParseDiagnostic>,
}

fn temp_name(counter: u32) -> String {
  let letter = (b'a' + (counter % 26) as u8) as char;
  let round = counter / 26;
  if round == 0 {
    format!("_{}", letter)
  } else {
    format!("_{}{}", letter, round + 1)
  }
}

impl<'a> Lowerer<'a> {
  fn lowers_exponent(&self) -> bool {
    self.target < Target::Es2017
  }

  fn lowers_object_spread(&self) -> bool {
    self.target < Target::Es2018
  }

  fn lowers_optional_catch(&self) -> bool {
    self.target < Target::Es2020
  }

  fn warn_once(&mut self, flag: fn(&mut Warned) -> &mut bool, loc: Loc, version: &str) {
    if !std::mem::replace(flag(&mut self.warned), true) {
      self.warnings.push(ParseDiagnostic {
        loc,
        severity: Severity::Warning,
        message: format!(
          "This syntax is from {} and is not available in {}",
          version,
          self.target.as_str()
        ),
      });
    }
  }

  fn run(&mut self) {
    self.sinks.push(TempSink {
      scope: crate::symbol::ScopeTree::MODULE,
      temps: Vec::new(),
      counter: 0,
    });
    let mut stmts = std::mem::take(&mut self.program.top_level.stmts);
    for stmt in &mut stmts {
      self.lower_stmt(stmt);
    }
    let sink = self.sinks.pop().expect("module sink");
    if !sink.temps.is_empty() {
      stmts.insert(0, self.temp_decl_stmt(&sink));
    }
    self.program.top_level.stmts = stmts;
    self.program.diagnostics.append(&mut self.warnings);
  }

  fn temp_decl_stmt(&mut self, sink: &TempSink) -> Stmt {
    let loc = Loc(0, 0);
    let decls = sink
      .temps
      .iter()
      .map(|&symbol| {
        let name = self.program.symbols.get(symbol).name.clone();
        let mut ident = Ident::new(loc, name);
        ident.symbol = Some(symbol);
        VarDeclarator {
          pat: Pat::Id(ident),
          init: None,
        }
      })
      .collect();
    Stmt::VarDecl(VarDeclStmt {
      loc,
      mode: VarDeclMode::Var,
      decls,
    })
  }

  fn make_temp(&mut self, loc: Loc) -> Ident {
    let sink = self.sinks.last_mut().expect("a sink is always active");
    let name = temp_name(sink.counter);
    sink.counter += 1;
    let symbol = self.program.symbols.create(&name, SymbolKind::Hoisted);
    self.program.symbols.get_mut(symbol).generated = true;
    self.program.symbols.get_mut(symbol).use_count += 2;
    let sink = self.sinks.last_mut().expect("a sink is always active");
    sink.temps.push(symbol);
    self
      .program
      .scopes
      .get_mut(sink.scope)
      .generated
      .push(symbol);
    let mut ident = Ident::new(loc, name);
    ident.symbol = Some(symbol);
    ident
  }

  fn unbound_helper(&mut self, name: &str, loc: Loc) -> Expr {
    let symbol = self.program.symbols.unbound(name);
    self.program.symbols.get_mut(symbol).use_count += 1;
    let mut ident = Ident::new(loc, name);
    ident.symbol = Some(symbol);
    Expr::Id(ident)
  }

  fn pow_call(&mut self, loc: Loc, base: Expr, exponent: Expr) -> Expr {
    let callee = self.unbound_helper("__pow", loc);
    Expr::Call(Box::new(CallExpr {
      loc,
      callee,
      args: vec![base, exponent],
      optional: false,
    }))
  }

  fn assign_call(&mut self, loc: Loc, target: Expr, source: Expr) -> Expr {
    let callee = self.unbound_helper("__assign", loc);
    Expr::Call(Box::new(CallExpr {
      loc,
      callee,
      args: vec![target, source],
      optional: false,
    }))
  }

  // ----------------------------------------------------------------------
  // Walkers
  // ----------------------------------------------------------------------

  fn lower_stmt(&mut self, stmt: &mut Stmt) {
    match stmt {
      Stmt::Block(block) => {
        for stmt in &mut block.stmts {
          self.lower_stmt(stmt);
        }
      }
      Stmt::VarDecl(decl) => self.lower_var_decl(decl),
      Stmt::FuncDecl(decl) => self.lower_func(&mut decl.func),
      Stmt::ClassDecl(decl) => self.lower_class(&mut decl.class),
      Stmt::Expr(stmt) => self.lower_expr(&mut stmt.expr),
      Stmt::If(stmt) => {
        self.lower_expr(&mut stmt.test);
        self.lower_stmt(&mut stmt.cons);
        if let Some(alt) = &mut stmt.alt {
          self.lower_stmt(alt);
        }
      }
      Stmt::For(stmt) => {
        match &mut stmt.init {
          ForInit::None => {}
          ForInit::VarDecl(decl) => self.lower_var_decl(decl),
          ForInit::Expr(expr) => self.lower_expr(expr),
        }
        if let Some(test) = &mut stmt.test {
          self.lower_expr(test);
        }
        if let Some(update) = &mut stmt.update {
          self.lower_expr(update);
        }
        self.lower_stmt(&mut stmt.body);
      }
      Stmt::ForInOf(stmt) => {
        match &mut stmt.left {
          ForHead::VarDecl(_, pat) => self.lower_pat(pat),
          ForHead::Target(expr) => self.lower_expr(expr),
        }
        self.lower_expr(&mut stmt.right);
        self.lower_stmt(&mut stmt.body);
      }
      Stmt::While(stmt) => {
        self.lower_expr(&mut stmt.test);
        self.lower_stmt(&mut stmt.body);
      }
      Stmt::DoWhile(stmt) => {
        self.lower_stmt(&mut stmt.body);
        self.lower_expr(&mut stmt.test);
      }
      Stmt::Return(stmt) => {
        if let Some(value) = &mut stmt.value {
          self.lower_expr(value);
        }
      }
      Stmt::Throw(stmt) => self.lower_expr(&mut stmt.value),
      Stmt::Try(stmt) => {
        for stmt in &mut stmt.block.stmts {
          self.lower_stmt(stmt);
        }
        if let Some(catch) = &mut stmt.catch {
          if catch.param.is_none() && self.lowers_optional_catch() {
            self.warn_once(|w| &mut w.optional_catch, catch.loc, "ES2019");
            let scope = catch.scope.expect("binder ran");
            let symbol = self.program.symbols.create("e", SymbolKind::Declared);
            self.program.symbols.get_mut(symbol).generated = true;
            self.program.scopes.get_mut(scope).generated.push(symbol);
            let mut ident = Ident::new(catch.loc, "e");
            ident.symbol = Some(symbol);
            catch.param = Some(Pat::Id(ident));
          }
          for stmt in &mut catch.body.stmts {
            self.lower_stmt(stmt);
          }
        }
        if let Some(finally) = &mut stmt.finally {
          for stmt in &mut finally.stmts {
            self.lower_stmt(stmt);
          }
        }
      }
      Stmt::Switch(stmt) => {
        self.lower_expr(&mut stmt.discriminant);
        for case in &mut stmt.cases {
          if let Some(test) = &mut case.test {
            self.lower_expr(test);
          }
          for stmt in &mut case.body {
            self.lower_stmt(stmt);
          }
        }
      }
      Stmt::Break(_) | Stmt::Continue(_) | Stmt::Debugger(_) | Stmt::Empty(_) => {}
      Stmt::Labeled(stmt) => self.lower_stmt(&mut stmt.body),
      Stmt::With(stmt) => {
        self.lower_expr(&mut stmt.object);
        self.lower_stmt(&mut stmt.body);
      }
      Stmt::Import(_) | Stmt::ExportNamed(_) | Stmt::ExportStar(_) => {}
      Stmt::ExportDefault(stmt) => self.lower_expr(&mut stmt.expr),
      Stmt::ExportDecl(stmt) => self.lower_stmt(&mut stmt.decl),
    }
  }

  fn lower_var_decl(&mut self, decl: &mut VarDeclStmt) {
    for declarator in &mut decl.decls {
      self.lower_pat(&mut declarator.pat);
      if let Some(init) = &mut declarator.init {
        self.lower_expr(init);
      }
    }
  }

  fn lower_pat(&mut self, pat: &mut Pat) {
    match pat {
      Pat::Id(_) => {}
      Pat::Array(array) => {
        for item in array.items.iter_mut().flatten() {
          self.lower_pat(item);
        }
        if let Some(rest) = &mut array.rest {
          self.lower_pat(rest);
        }
      }
      Pat::Object(object) => {
        for prop in &mut object.props {
          if let PropKey::Computed(expr) = &mut prop.key {
            self.lower_expr(expr);
          }
          self.lower_pat(&mut prop.value);
        }
        if let Some(rest) = &mut object.rest {
          self.lower_pat(rest);
        }
      }
      Pat::Assign(assign) => {
        self.lower_pat(&mut assign.pat);
        self.lower_expr(&mut assign.default);
      }
    }
  }

  fn lower_func(&mut self, func: &mut Func) {
    for param in &mut func.params {
      self.lower_pat(&mut param.pat);
    }
    match &mut func.body {
      FuncBody::Block(stmts) => {
        let scope = func
          .body_scope
          .expect("block-bodied functions have a body scope");
        self.sinks.push(TempSink {
          scope,
          temps: Vec::new(),
          counter: 0,
        });
        for stmt in stmts.iter_mut() {
          self.lower_stmt(stmt);
        }
        let sink = self.sinks.pop().expect("pushed above");
        if !sink.temps.is_empty() {
          stmts.insert(0, self.temp_decl_stmt(&sink));
        }
      }
      FuncBody::Expr(expr) => self.lower_expr(expr),
    }
  }

  fn lower_class(&mut self, class: &mut Class) {
    if let Some(extends) = &mut class.extends {
      self.lower_expr(extends);
    }
    for member in &mut class.members {
      match member {
        ClassMember::Method { key, func, .. } => {
          if let PropKey::Computed(expr) = key {
            self.lower_expr(expr);
          }
          self.lower_func(func);
        }
        ClassMember::Field { key, value, .. } => {
          if let PropKey::Computed(expr) = key {
            self.lower_expr(expr);
          }
          if let Some(value) = value {
            self.lower_expr(value);
          }
        }
      }
    }
  }

  fn lower_expr(&mut self, expr: &mut Expr) {
    // Children first, so nested rewrites are already in place.
    match expr {
      Expr::Id(_)
      | Expr::This(_)
      | Expr::ModuleThis(_)
      | Expr::Null(_)
      | Expr::Undefined(_)
      | Expr::Bool(..)
      | Expr::Num(_)
      | Expr::BigInt(..)
      | Expr::Str(_)
      | Expr::Regex(..)
      | Expr::Require(_) => {}
      Expr::Template(template) => {
        for (expr, _) in &mut template.parts {
          self.lower_expr(expr);
        }
      }
      Expr::Array(array) => {
        for item in array.items.iter_mut().flatten() {
          self.lower_expr(item);
        }
      }
      Expr::Object(object) => {
        for prop in &mut object.props {
          match prop {
            ObjectLitProp::KeyValue { key, value } => {
              if let PropKey::Computed(expr) = key {
                self.lower_expr(expr);
              }
              self.lower_expr(value);
            }
            ObjectLitProp::Shorthand(_) => {}
            ObjectLitProp::Method(method) => {
              if let PropKey::Computed(expr) = &mut method.key {
                self.lower_expr(expr);
              }
              self.lower_func(&mut method.func);
            }
            ObjectLitProp::Spread(expr) => self.lower_expr(expr),
          }
        }
      }
      Expr::Function(func_expr) => self.lower_func(&mut func_expr.func),
      Expr::Arrow(func) => self.lower_func(func),
      Expr::Class(class_expr) => self.lower_class(&mut class_expr.class),
      Expr::Unary(unary) => self.lower_expr(&mut unary.expr),
      Expr::Update(update) => self.lower_expr(&mut update.expr),
      Expr::Binary(binary) => {
        self.lower_expr(&mut binary.left);
        self.lower_expr(&mut binary.right);
        if matches!(binary.op, BinaryOp::Coalesce) && self.target < Target::Es2020 {
          self.warn_once(|w| &mut w.es2020, binary.loc, "ES2020");
        }
      }
      Expr::Assign(assign) => {
        self.lower_expr(&mut assign.target);
        self.lower_expr(&mut assign.value);
      }
      Expr::Cond(cond) => {
        self.lower_expr(&mut cond.test);
        self.lower_expr(&mut cond.cons);
        self.lower_expr(&mut cond.alt);
      }
      Expr::Seq(seq) => {
        for expr in &mut seq.exprs {
          self.lower_expr(expr);
        }
      }
      Expr::Call(call) => {
        self.lower_expr(&mut call.callee);
        for arg in &mut call.args {
          self.lower_expr(arg);
        }
      }
      Expr::New(new) => {
        self.lower_expr(&mut new.callee);
        for arg in &mut new.args {
          self.lower_expr(arg);
        }
      }
      Expr::Member(member) => self.lower_expr(&mut member.obj),
      Expr::Index(index) => {
        self.lower_expr(&mut index.obj);
        self.lower_expr(&mut index.index);
      }
      Expr::Spread(spread) => self.lower_expr(&mut spread.expr),
      Expr::DynamicImport(import) => {
        if let Some(arg) = &mut import.arg {
          self.lower_expr(arg);
        }
      }
      Expr::Await(await_expr) => self.lower_expr(&mut await_expr.expr),
      Expr::Yield(yield_expr) => {
        if let Some(expr) = &mut yield_expr.expr {
          self.lower_expr(expr);
        }
      }
    }

    // Rewrites on the node itself.
    let placeholder = Expr::Null(Loc(0, 0));
    match expr {
      Expr::Binary(binary) if binary.op == BinaryOp::Exp && self.lowers_exponent() => {
        self.warn_once(|w| &mut w.exponent, binary.loc, "ES2016");
        let Expr::Binary(binary) = std::mem::replace(expr, placeholder) else {
          unreachable!();
        };
        *expr = self.pow_call(binary.loc, binary.left, binary.right);
      }
      Expr::Assign(assign) if assign.op == AssignOp::Exp && self.lowers_exponent() => {
        self.warn_once(|w| &mut w.exponent, assign.loc, "ES2016");
        let Expr::Assign(assign) = std::mem::replace(expr, placeholder) else {
          unreachable!();
        };
        *expr = self.lower_exp_assign(*assign);
      }
      Expr::Object(object)
        if self.lowers_object_spread()
          && object
            .props
            .iter()
            .any(|p| matches!(p, ObjectLitProp::Spread(_))) =>
      {
        self.warn_once(|w| &mut w.object_spread, object.loc, "ES2018");
        let Expr::Object(object) = std::mem::replace(expr, placeholder) else {
          unreachable!();
        };
        *expr = self.lower_object_spread(object);
      }
      _ => {}
    }
  }

  /// `a **= b` becomes `a = __pow(a, b)`, capturing member objects and
  /// computed keys into temporaries when re-evaluation could be observed.
  fn lower_exp_assign(&mut self, assign: AssignExpr) -> Expr {
    let loc = assign.loc;
    match assign.target {
      Expr::Id(ident) => {
        let read = Expr::Id(ident.clone());
        let value = self.pow_call(loc, read, assign.value);
        Expr::Assign(Box::new(AssignExpr {
          loc,
          op: AssignOp::Assign,
          target: Expr::Id(ident),
          value,
        }))
      }
      Expr::Member(member) => {
        let (obj_target, obj_read) = self.capture(loc, member.obj);
        let read = Expr::Member(Box::new(MemberExpr {
          loc,
          obj: obj_read,
          prop: member.prop.clone(),
          optional: false,
        }));
        let value = self.pow_call(loc, read, assign.value);
        Expr::Assign(Box::new(AssignExpr {
          loc,
          op: AssignOp::Assign,
          target: Expr::Member(Box::new(MemberExpr {
            loc,
            obj: obj_target,
            prop: member.prop,
            optional: false,
          })),
          value,
        }))
      }
      Expr::Index(index) => {
        let (obj_target, obj_read) = self.capture(loc, index.obj);
        let (index_target, index_read) = self.capture(loc, index.index);
        let read = Expr::Index(Box::new(IndexExpr {
          loc,
          obj: obj_read,
          index: index_read,
          optional: false,
        }));
        let value = self.pow_call(loc, read, assign.value);
        Expr::Assign(Box::new(AssignExpr {
          loc,
          op: AssignOp::Assign,
          target: Expr::Index(Box::new(IndexExpr {
            loc,
            obj: obj_target,
            index: index_target,
            optional: false,
          })),
          value,
        }))
      }
      other => {
        // Nothing sensible to do; keep the already-lowered value.
        let value = self.pow_call(loc, duplicate_simple(&other).unwrap_or(Expr::Null(loc)), assign.value);
        Expr::Assign(Box::new(AssignExpr {
          loc,
          op: AssignOp::Assign,
          target: other,
          value,
        }))
      }
    }
  }

  /// Returns `(target_expr, read_expr)`: either two references to the
  /// original (safe to re-evaluate) or `(_t = original, _t)`.
  fn capture(&mut self, loc: Loc, expr: Expr) -> (Expr, Expr) {
    if let Some(dup) = duplicate_simple(&expr) {
      return (expr, dup);
    }
    let temp = self.make_temp(loc);
    let read = Expr::Id(temp.clone());
    let target = Expr::Assign(Box::new(AssignExpr {
      loc,
      op: AssignOp::Assign,
      target: Expr::Id(temp),
      value: expr,
    }));
    (target, read)
  }

  fn lower_object_spread(&mut self, object: ObjectLit) -> Expr {
    let loc = object.loc;
    let mut acc: Option<Expr> = None;
    let mut pending: Vec<ObjectLitProp> = Vec::new();

    let flush = |this: &mut Self, acc: &mut Option<Expr>, pending: &mut Vec<ObjectLitProp>| {
      if pending.is_empty() && acc.is_some() {
        return;
      }
      let chunk = Expr::Object(ObjectLit {
        loc,
        props: std::mem::take(pending),
      });
      *acc = Some(match acc.take() {
        None => chunk,
        Some(prev) => this.assign_call(loc, prev, chunk),
      });
    };

    for prop in object.props {
      match prop {
        ObjectLitProp::Spread(spread) => {
          flush(self, &mut acc, &mut pending);
          let prev = acc.take().expect("flush always seeds the accumulator");
          acc = Some(self.assign_call(loc, prev, spread));
        }
        other => pending.push(other),
      }
    }
    if !pending.is_empty() {
      flush(self, &mut acc, &mut pending);
    }
    acc.unwrap_or(Expr::Object(ObjectLit {
      loc,
      props: Vec::new(),
    }))
  }
}

/// A second reference to an expression whose re-evaluation is unobservable.
fn duplicate_simple(expr: &Expr) -> Option<Expr> {
  Some(match expr {
    Expr::Id(ident) => Expr::Id(ident.clone()),
    Expr::This(loc) => Expr::This(*loc),
    Expr::ModuleThis(loc) => Expr::ModuleThis(*loc),
    Expr::Null(loc) => Expr::Null(*loc),
    Expr::Undefined(loc) => Expr::Undefined(*loc),
    Expr::Bool(loc, value) => Expr::Bool(*loc, *value),
    Expr::Num(num) => Expr::Num(num.clone()),
    Expr::Str(s) => Expr::Str(s.clone()),
    Expr::BigInt(loc, raw) => Expr::BigInt(*loc, raw.clone()),
    _ => return None,
  })
}
