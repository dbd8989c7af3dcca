//! Scope and symbol binding.
//!
//! Two full walks over the AST: the declare pass creates the scope tree and
//! declares every binding (honoring `var`/function hoisting), and the
//! resolve pass binds identifier references, counts uses, records
//! inherited-through marks for the renamer, pins symbols whose references
//! cross a `with` scope, and taints scope chains containing direct `eval`.

use crate::ast::*;
use crate::parse::ParseOutput;
use crate::symbol::*;
use crate::ExportsKind;
use crate::NamedExport;
use crate::NamedImport;
use crate::ParseOptions;
use crate::Program;
use std::collections::BTreeMap;

pub(crate) fn bind(output: ParseOutput, options: &ParseOptions) -> Program {
  let mut binder = Binder {
    symbols: SymbolTable::new(options.source_index),
    scopes: ScopeTree::new(),
    named_imports: BTreeMap::new(),
    named_exports: BTreeMap::new(),
    export_stars: Vec::new(),
    exports_symbol: None,
    module_symbol: None,
  };

  if options.is_bundling {
    let exports = binder.symbols.create("exports", SymbolKind::Hoisted);
    let module = binder.symbols.create("module", SymbolKind::Hoisted);
    let members = &mut binder.scopes.get_mut(ScopeTree::MODULE).members;
    members.insert("exports".into(), exports);
    members.insert("module".into(), module);
    binder.exports_symbol = Some(exports);
    binder.module_symbol = Some(module);
  }

  let ParseOutput {
    mut top_level,
    import_records,
    diagnostics,
    has_module_this,
    has_top_level_return,
    has_esm_syntax,
  } = output;

  for stmt in &mut top_level.stmts {
    binder.declare_stmt(stmt, ScopeTree::MODULE);
  }
  for stmt in &mut top_level.stmts {
    binder.resolve_stmt(stmt, ScopeTree::MODULE);
  }

  let exports_kind = if has_esm_syntax {
    ExportsKind::Esm
  } else if binder.uses_commonjs_objects() || has_top_level_return || has_module_this {
    ExportsKind::CommonJs
  } else {
    ExportsKind::None
  };
  if exports_kind == ExportsKind::CommonJs && has_module_this {
    if let Some(exports) = binder.exports_symbol {
      binder.symbols.get_mut(exports).use_count += 1;
    }
  }

  Program {
    source_index: options.source_index,
    top_level,
    symbols: binder.symbols,
    scopes: binder.scopes,
    import_records,
    named_imports: binder.named_imports,
    named_exports: binder.named_exports,
    export_stars: binder.export_stars,
    exports_kind,
    has_top_level_return,
    has_module_this,
    exports_symbol: binder.exports_symbol,
    module_symbol: binder.module_symbol,
    diagnostics,
  }
}

struct Binder {
  symbols: SymbolTable,
  scopes: ScopeTree,
  named_imports: BTreeMap<SymbolId, NamedImport>,
  named_exports: BTreeMap<String, NamedExport>,
  export_stars: Vec<u32>,
  exports_symbol: Option<SymbolId>,
  module_symbol: Option<SymbolId>,
}

impl Binder {
  fn uses_commonjs_objects(&self) -> bool {
    let used = |id: Option<SymbolId>| {
      id.map(|s| self.symbols.get(s).use_count > 0)
        .unwrap_or(false)
    };
    used(self.exports_symbol) || used(self.module_symbol)
  }

  // ----------------------------------------------------------------------
  // Declarations
  // ----------------------------------------------------------------------

  /// Declare `name`, merging with an existing binding of the same name in
  /// the target scope (redeclaration, `var`/param interplay).
  fn declare(&mut self, scope: ScopeId, name: &str, kind: SymbolKind, hoisted: bool) -> SymbolId {
    let target = if hoisted {
      self.scopes.hoist_target(scope)
    } else {
      scope
    };

    if hoisted {
      // Pin bindings whose declaration crosses a `with` scope.
      let mut crosses_with = false;
      let mut cur = scope;
      while cur != target {
        if self.scopes.get(cur).kind == ScopeKind::With {
          crosses_with = true;
        }
        cur = self.scopes.get(cur).parent.expect("hoist target is an ancestor");
      }

      if let Some(&existing) = self.scopes.get(target).members.get(name) {
        if crosses_with {
          self.symbols.get_mut(existing).must_keep_name = true;
        }
        return existing;
      }
      // `var x` merges with a parameter or `arguments` named `x`.
      if self.scopes.get(target).kind == ScopeKind::FunctionBody {
        let args_scope = self.scopes.get(target).parent.expect("body has args scope");
        if let Some(&existing) = self.scopes.get(args_scope).members.get(name) {
          return existing;
        }
      }
      let id = self.symbols.create(name, kind);
      if crosses_with {
        self.symbols.get_mut(id).must_keep_name = true;
      }
      self.scopes.get_mut(target).members.insert(name.into(), id);
      return id;
    }

    if let Some(&existing) = self.scopes.get(target).members.get(name) {
      return existing;
    }
    let id = self.symbols.create(name, kind);
    self.scopes.get_mut(target).members.insert(name.into(), id);
    id
  }

  fn declare_stmt(&mut self, stmt: &mut Stmt, scope: ScopeId) {
    match stmt {
      Stmt::Block(block) => {
        let inner = self.scopes.add(scope, ScopeKind::Block);
        block.scope = Some(inner);
        for stmt in &mut block.stmts {
          self.declare_stmt(stmt, inner);
        }
      }
      Stmt::VarDecl(decl) => self.declare_var_decl(decl, scope),
      Stmt::FuncDecl(decl) => {
        let id = self.declare(scope, &decl.name.name, SymbolKind::HoistedFunction, true);
        decl.name.symbol = Some(id);
        self.declare_func(&mut decl.func, scope);
      }
      Stmt::ClassDecl(decl) => {
        let id = self.declare(scope, &decl.name.name, SymbolKind::Declared, false);
        decl.name.symbol = Some(id);
        self.declare_class(&mut decl.class, scope);
      }
      Stmt::Expr(stmt) => self.declare_expr(&mut stmt.expr, scope),
      Stmt::If(stmt) => {
        self.declare_expr(&mut stmt.test, scope);
        self.declare_stmt(&mut stmt.cons, scope);
        if let Some(alt) = &mut stmt.alt {
          self.declare_stmt(alt, scope);
        }
      }
      Stmt::For(stmt) => {
        let inner = self.scopes.add(scope, ScopeKind::Block);
        stmt.scope = Some(inner);
        match &mut stmt.init {
          ForInit::None => {}
          ForInit::VarDecl(decl) => self.declare_var_decl(decl, inner),
          ForInit::Expr(expr) => self.declare_expr(expr, inner),
        }
        if let Some(test) = &mut stmt.test {
          self.declare_expr(test, inner);
        }
        if let Some(update) = &mut stmt.update {
          self.declare_expr(update, inner);
        }
        self.declare_stmt(&mut stmt.body, inner);
      }
      Stmt::ForInOf(stmt) => {
        let inner = self.scopes.add(scope, ScopeKind::Block);
        stmt.scope = Some(inner);
        match &mut stmt.left {
          ForHead::VarDecl(mode, pat) => {
            let hoisted = *mode == VarDeclMode::Var;
            let kind = if hoisted {
              SymbolKind::Hoisted
            } else {
              SymbolKind::Declared
            };
            self.declare_pat(pat, kind, hoisted, inner);
          }
          ForHead::Target(expr) => self.declare_expr(expr, inner),
        }
        self.declare_expr(&mut stmt.right, inner);
        self.declare_stmt(&mut stmt.body, inner);
      }
      Stmt::While(stmt) => {
        self.declare_expr(&mut stmt.test, scope);
        self.declare_stmt(&mut stmt.body, scope);
      }
      Stmt::DoWhile(stmt) => {
        self.declare_stmt(&mut stmt.body, scope);
        self.declare_expr(&mut stmt.test, scope);
      }
      Stmt::Return(stmt) => {
        if let Some(value) = &mut stmt.value {
          self.declare_expr(value, scope);
        }
      }
      Stmt::Throw(stmt) => self.declare_expr(&mut stmt.value, scope),
      Stmt::Try(stmt) => {
        self.declare_block(&mut stmt.block, scope);
        if let Some(catch) = &mut stmt.catch {
          let catch_scope = self.scopes.add(scope, ScopeKind::Block);
          catch.scope = Some(catch_scope);
          if let Some(param) = &mut catch.param {
            self.declare_pat(param, SymbolKind::Declared, false, catch_scope);
          }
          self.declare_block(&mut catch.body, catch_scope);
        }
        if let Some(finally) = &mut stmt.finally {
          self.declare_block(finally, scope);
        }
      }
      Stmt::Switch(stmt) => {
        self.declare_expr(&mut stmt.discriminant, scope);
        let inner = self.scopes.add(scope, ScopeKind::Block);
        stmt.scope = Some(inner);
        for case in &mut stmt.cases {
          if let Some(test) = &mut case.test {
            self.declare_expr(test, inner);
          }
          for stmt in &mut case.body {
            self.declare_stmt(stmt, inner);
          }
        }
      }
      Stmt::Break(_) | Stmt::Continue(_) | Stmt::Debugger(_) | Stmt::Empty(_) => {}
      Stmt::Labeled(stmt) => self.declare_stmt(&mut stmt.body, scope),
      Stmt::With(stmt) => {
        self.declare_expr(&mut stmt.object, scope);
        let inner = self.scopes.add(scope, ScopeKind::With);
        stmt.scope = Some(inner);
        self.declare_stmt(&mut stmt.body, inner);
      }
      Stmt::Import(stmt) => {
        if let Some(default) = &mut stmt.default {
          let id = self.declare(ScopeTree::MODULE, &default.name, SymbolKind::Import, false);
          default.symbol = Some(id);
          self.named_imports.insert(id, NamedImport {
            record: stmt.record,
            alias: Some("default".into()),
            loc: default.loc,
          });
        }
        if let Some(star) = &mut stmt.star {
          let id = self.declare(ScopeTree::MODULE, &star.name, SymbolKind::Import, false);
          star.symbol = Some(id);
          self.named_imports.insert(id, NamedImport {
            record: stmt.record,
            alias: None,
            loc: star.loc,
          });
        }
        for name in &mut stmt.names {
          let id = self.declare(ScopeTree::MODULE, &name.local.name, SymbolKind::Import, false);
          name.local.symbol = Some(id);
          self.named_imports.insert(id, NamedImport {
            record: stmt.record,
            alias: Some(name.exported.clone()),
            loc: name.local.loc,
          });
        }
      }
      Stmt::ExportNamed(stmt) => {
        if let Some(record) = stmt.record {
          for name in &stmt.names {
            self.named_exports.insert(name.exported.clone(), NamedExport::ReExport {
              record,
              source_name: name.orig.name.clone(),
            });
          }
        }
        // Local export lists are resolved in the resolve pass.
      }
      Stmt::ExportStar(stmt) => match &stmt.alias {
        Some(alias) => {
          self
            .named_exports
            .insert(alias.clone(), NamedExport::NamespaceReExport {
              record: stmt.record,
            });
        }
        None => self.export_stars.push(stmt.record),
      },
      Stmt::ExportDefault(stmt) => {
        let id = self.declare(ScopeTree::MODULE, "default", SymbolKind::Declared, false);
        stmt.symbol = Some(id);
        self
          .named_exports
          .insert("default".into(), NamedExport::Local(id));
        self.declare_expr(&mut stmt.expr, scope);
      }
      Stmt::ExportDecl(stmt) => {
        self.declare_stmt(&mut stmt.decl, scope);
        let mut exported = Vec::new();
        collect_decl_names(&stmt.decl, &mut exported);
        for (name, symbol) in exported {
          self.named_exports.insert(name, NamedExport::Local(symbol));
        }
      }
    }
  }

  fn declare_block(&mut self, block: &mut BlockStmt, scope: ScopeId) {
    let inner = self.scopes.add(scope, ScopeKind::Block);
    block.scope = Some(inner);
    for stmt in &mut block.stmts {
      self.declare_stmt(stmt, inner);
    }
  }

  fn declare_var_decl(&mut self, decl: &mut VarDeclStmt, scope: ScopeId) {
    let hoisted = decl.mode == VarDeclMode::Var;
    let kind = if hoisted {
      SymbolKind::Hoisted
    } else {
      SymbolKind::Declared
    };
    for declarator in &mut decl.decls {
      self.declare_pat(&mut declarator.pat, kind, hoisted, scope);
      if let Some(init) = &mut declarator.init {
        self.declare_expr(init, scope);
      }
    }
  }

  fn declare_pat(&mut self, pat: &mut Pat, kind: SymbolKind, hoisted: bool, scope: ScopeId) {
    match pat {
      Pat::Id(ident) => {
        let id = self.declare(scope, &ident.name, kind, hoisted);
        ident.symbol = Some(id);
      }
      Pat::Array(array) => {
        for item in array.items.iter_mut().flatten() {
          self.declare_pat(item, kind, hoisted, scope);
        }
        if let Some(rest) = &mut array.rest {
          self.declare_pat(rest, kind, hoisted, scope);
        }
      }
      Pat::Object(object) => {
        for prop in &mut object.props {
          if let PropKey::Computed(expr) = &mut prop.key {
            self.declare_expr(expr, scope);
          }
          self.declare_pat(&mut prop.value, kind, hoisted, scope);
        }
        if let Some(rest) = &mut object.rest {
          self.declare_pat(rest, kind, hoisted, scope);
        }
      }
      Pat::Assign(assign) => {
        self.declare_pat(&mut assign.pat, kind, hoisted, scope);
        self.declare_expr(&mut assign.default, scope);
      }
    }
  }

  fn declare_func(&mut self, func: &mut Func, scope: ScopeId) {
    let args_scope = self.scopes.add(scope, ScopeKind::FunctionArgs);
    self.scopes.get_mut(args_scope).is_arrow = func.is_arrow;
    func.args_scope = Some(args_scope);
    if !func.is_arrow {
      let arguments = self.symbols.create("arguments", SymbolKind::Arguments);
      self.symbols.get_mut(arguments).must_keep_name = true;
      self
        .scopes
        .get_mut(args_scope)
        .members
        .insert("arguments".into(), arguments);
    }
    for param in &mut func.params {
      self.declare_pat(&mut param.pat, SymbolKind::Declared, false, args_scope);
    }
    match &mut func.body {
      FuncBody::Block(stmts) => {
        let body_scope = self.scopes.add(args_scope, ScopeKind::FunctionBody);
        func.body_scope = Some(body_scope);
        for stmt in stmts {
          self.declare_stmt(stmt, body_scope);
        }
      }
      FuncBody::Expr(expr) => {
        func.body_scope = None;
        self.declare_expr(expr, args_scope);
      }
    }
  }

  fn declare_class(&mut self, class: &mut Class, scope: ScopeId) {
    if let Some(extends) = &mut class.extends {
      self.declare_expr(extends, scope);
    }
    for member in &mut class.members {
      match member {
        ClassMember::Method { key, func, .. } => {
          if let PropKey::Computed(expr) = key {
            self.declare_expr(expr, scope);
          }
          self.declare_func(func, scope);
        }
        ClassMember::Field { key, value, .. } => {
          if let PropKey::Computed(expr) = key {
            self.declare_expr(expr, scope);
          }
          if let Some(value) = value {
            self.declare_expr(value, scope);
          }
        }
      }
    }
  }

  fn declare_expr(&mut self, expr: &mut Expr, scope: ScopeId) {
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
          self.declare_expr(expr, scope);
        }
      }
      Expr::Array(array) => {
        for item in array.items.iter_mut().flatten() {
          self.declare_expr(item, scope);
        }
      }
      Expr::Object(object) => {
        for prop in &mut object.props {
          match prop {
            ObjectLitProp::KeyValue { key, value } => {
              if let PropKey::Computed(expr) = key {
                self.declare_expr(expr, scope);
              }
              self.declare_expr(value, scope);
            }
            ObjectLitProp::Shorthand(_) => {}
            ObjectLitProp::Method(method) => {
              if let PropKey::Computed(expr) = &mut method.key {
                self.declare_expr(expr, scope);
              }
              self.declare_func(&mut method.func, scope);
            }
            ObjectLitProp::Spread(expr) => self.declare_expr(expr, scope),
          }
        }
      }
      Expr::Function(func_expr) => {
        self.declare_func(&mut func_expr.func, scope);
        if let Some(name) = &mut func_expr.name {
          let args_scope = func_expr.func.args_scope.expect("scope was just created");
          let id = self.declare(args_scope, &name.name, SymbolKind::Declared, false);
          name.symbol = Some(id);
        }
      }
      Expr::Arrow(func) => self.declare_func(func, scope),
      Expr::Class(class_expr) => self.declare_class(&mut class_expr.class, scope),
      Expr::Unary(unary) => self.declare_expr(&mut unary.expr, scope),
      Expr::Update(update) => self.declare_expr(&mut update.expr, scope),
      Expr::Binary(binary) => {
        self.declare_expr(&mut binary.left, scope);
        self.declare_expr(&mut binary.right, scope);
      }
      Expr::Assign(assign) => {
        self.declare_expr(&mut assign.target, scope);
        self.declare_expr(&mut assign.value, scope);
      }
      Expr::Cond(cond) => {
        self.declare_expr(&mut cond.test, scope);
        self.declare_expr(&mut cond.cons, scope);
        self.declare_expr(&mut cond.alt, scope);
      }
      Expr::Seq(seq) => {
        for expr in &mut seq.exprs {
          self.declare_expr(expr, scope);
        }
      }
      Expr::Call(call) => {
        self.declare_expr(&mut call.callee, scope);
        for arg in &mut call.args {
          self.declare_expr(arg, scope);
        }
      }
      Expr::New(new) => {
        self.declare_expr(&mut new.callee, scope);
        for arg in &mut new.args {
          self.declare_expr(arg, scope);
        }
      }
      Expr::Member(member) => self.declare_expr(&mut member.obj, scope),
      Expr::Index(index) => {
        self.declare_expr(&mut index.obj, scope);
        self.declare_expr(&mut index.index, scope);
      }
      Expr::Spread(spread) => self.declare_expr(&mut spread.expr, scope),
      Expr::DynamicImport(import) => {
        if let Some(arg) = &mut import.arg {
          self.declare_expr(arg, scope);
        }
      }
      Expr::Await(await_expr) => self.declare_expr(&mut await_expr.expr, scope),
      Expr::Yield(yield_expr) => {
        if let Some(expr) = &mut yield_expr.expr {
          self.declare_expr(expr, scope);
        }
      }
    }
  }

  // ----------------------------------------------------------------------
  // Reference resolution
  // ----------------------------------------------------------------------

  fn resolve_ref(&mut self, ident: &mut Ident, scope: ScopeId) {
    if ident.symbol.is_some() {
      // Declaration site; already bound.
      return;
    }
    match self.scopes.lookup(scope, &ident.name) {
      Some((decl_scope, symbol)) => {
        ident.symbol = Some(symbol);
        self.symbols.get_mut(symbol).use_count += 1;
        let mut crosses_with = false;
        let mut cur = scope;
        while cur != decl_scope {
          let s = self.scopes.get_mut(cur);
          if s.kind == ScopeKind::With {
            crosses_with = true;
          }
          s.inherited.insert(symbol);
          cur = s.parent.expect("declaring scope is an ancestor");
        }
        if crosses_with {
          self.symbols.get_mut(symbol).must_keep_name = true;
        }
      }
      None => {
        let symbol = self.symbols.unbound(&ident.name);
        self.symbols.get_mut(symbol).use_count += 1;
        ident.symbol = Some(symbol);
        // Free names are inherited by every enclosing scope so renaming
        // never captures them.
        let mut cur = Some(scope);
        while let Some(id) = cur {
          let s = self.scopes.get_mut(id);
          s.inherited.insert(symbol);
          cur = s.parent;
        }
      }
    }
  }

  fn taint_eval_chain(&mut self, scope: ScopeId) {
    let mut cur = Some(scope);
    while let Some(id) = cur {
      let s = self.scopes.get_mut(id);
      s.eval_tainted = true;
      cur = s.parent;
    }
  }

  fn resolve_stmt(&mut self, stmt: &mut Stmt, scope: ScopeId) {
    match stmt {
      Stmt::Block(block) => {
        let inner = block.scope.expect("declare pass ran");
        for stmt in &mut block.stmts {
          self.resolve_stmt(stmt, inner);
        }
      }
      Stmt::VarDecl(decl) => {
        for declarator in &mut decl.decls {
          self.resolve_pat(&mut declarator.pat, scope);
          if let Some(init) = &mut declarator.init {
            self.resolve_expr(init, scope);
          }
        }
      }
      Stmt::FuncDecl(decl) => self.resolve_func(&mut decl.func, scope),
      Stmt::ClassDecl(decl) => self.resolve_class(&mut decl.class, scope),
      Stmt::Expr(stmt) => self.resolve_expr(&mut stmt.expr, scope),
      Stmt::If(stmt) => {
        self.resolve_expr(&mut stmt.test, scope);
        self.resolve_stmt(&mut stmt.cons, scope);
        if let Some(alt) = &mut stmt.alt {
          self.resolve_stmt(alt, scope);
        }
      }
      Stmt::For(stmt) => {
        let inner = stmt.scope.expect("declare pass ran");
        match &mut stmt.init {
          ForInit::None => {}
          ForInit::VarDecl(decl) => {
            for declarator in &mut decl.decls {
              self.resolve_pat(&mut declarator.pat, inner);
              if let Some(init) = &mut declarator.init {
                self.resolve_expr(init, inner);
              }
            }
          }
          ForInit::Expr(expr) => self.resolve_expr(expr, inner),
        }
        if let Some(test) = &mut stmt.test {
          self.resolve_expr(test, inner);
        }
        if let Some(update) = &mut stmt.update {
          self.resolve_expr(update, inner);
        }
        self.resolve_stmt(&mut stmt.body, inner);
      }
      Stmt::ForInOf(stmt) => {
        let inner = stmt.scope.expect("declare pass ran");
        match &mut stmt.left {
          ForHead::VarDecl(_, pat) => self.resolve_pat(pat, inner),
          ForHead::Target(expr) => self.resolve_expr(expr, inner),
        }
        self.resolve_expr(&mut stmt.right, inner);
        self.resolve_stmt(&mut stmt.body, inner);
      }
      Stmt::While(stmt) => {
        self.resolve_expr(&mut stmt.test, scope);
        self.resolve_stmt(&mut stmt.body, scope);
      }
      Stmt::DoWhile(stmt) => {
        self.resolve_stmt(&mut stmt.body, scope);
        self.resolve_expr(&mut stmt.test, scope);
      }
      Stmt::Return(stmt) => {
        if let Some(value) = &mut stmt.value {
          self.resolve_expr(value, scope);
        }
      }
      Stmt::Throw(stmt) => self.resolve_expr(&mut stmt.value, scope),
      Stmt::Try(stmt) => {
        self.resolve_block(&mut stmt.block);
        if let Some(catch) = &mut stmt.catch {
          let catch_scope = catch.scope.expect("declare pass ran");
          if let Some(param) = &mut catch.param {
            self.resolve_pat(param, catch_scope);
          }
          self.resolve_block(&mut catch.body);
        }
        if let Some(finally) = &mut stmt.finally {
          self.resolve_block(finally);
        }
      }
      Stmt::Switch(stmt) => {
        self.resolve_expr(&mut stmt.discriminant, scope);
        let inner = stmt.scope.expect("declare pass ran");
        for case in &mut stmt.cases {
          if let Some(test) = &mut case.test {
            self.resolve_expr(test, inner);
          }
          for stmt in &mut case.body {
            self.resolve_stmt(stmt, inner);
          }
        }
      }
      Stmt::Break(_) | Stmt::Continue(_) | Stmt::Debugger(_) | Stmt::Empty(_) => {}
      Stmt::Labeled(stmt) => self.resolve_stmt(&mut stmt.body, scope),
      Stmt::With(stmt) => {
        self.resolve_expr(&mut stmt.object, scope);
        let inner = stmt.scope.expect("declare pass ran");
        self.resolve_stmt(&mut stmt.body, inner);
      }
      Stmt::Import(_) => {}
      Stmt::ExportNamed(stmt) => {
        if stmt.record.is_none() {
          for name in &mut stmt.names {
            self.resolve_ref(&mut name.orig, scope);
            if let Some(symbol) = name.orig.symbol {
              self
                .named_exports
                .insert(name.exported.clone(), NamedExport::Local(symbol));
            }
          }
        }
      }
      Stmt::ExportStar(_) => {}
      Stmt::ExportDefault(stmt) => self.resolve_expr(&mut stmt.expr, scope),
      Stmt::ExportDecl(stmt) => self.resolve_stmt(&mut stmt.decl, scope),
    }
  }

  fn resolve_block(&mut self, block: &mut BlockStmt) {
    let inner = block.scope.expect("declare pass ran");
    for stmt in &mut block.stmts {
      self.resolve_stmt(stmt, inner);
    }
  }

  fn resolve_pat(&mut self, pat: &mut Pat, scope: ScopeId) {
    match pat {
      Pat::Id(_) => {}
      Pat::Array(array) => {
        for item in array.items.iter_mut().flatten() {
          self.resolve_pat(item, scope);
        }
        if let Some(rest) = &mut array.rest {
          self.resolve_pat(rest, scope);
        }
      }
      Pat::Object(object) => {
        for prop in &mut object.props {
          if let PropKey::Computed(expr) = &mut prop.key {
            self.resolve_expr(expr, scope);
          }
          self.resolve_pat(&mut prop.value, scope);
        }
        if let Some(rest) = &mut object.rest {
          self.resolve_pat(rest, scope);
        }
      }
      Pat::Assign(assign) => {
        self.resolve_pat(&mut assign.pat, scope);
        self.resolve_expr(&mut assign.default, scope);
      }
    }
  }

  fn resolve_func(&mut self, func: &mut Func, _scope: ScopeId) {
    let args_scope = func.args_scope.expect("declare pass ran");
    for param in &mut func.params {
      self.resolve_pat(&mut param.pat, args_scope);
    }
    match &mut func.body {
      FuncBody::Block(stmts) => {
        let body_scope = func.body_scope.expect("declare pass ran");
        for stmt in stmts {
          self.resolve_stmt(stmt, body_scope);
        }
      }
      FuncBody::Expr(expr) => self.resolve_expr(expr, args_scope),
    }
  }

  fn resolve_class(&mut self, class: &mut Class, scope: ScopeId) {
    if let Some(extends) = &mut class.extends {
      self.resolve_expr(extends, scope);
    }
    for member in &mut class.members {
      match member {
        ClassMember::Method { key, func, .. } => {
          if let PropKey::Computed(expr) = key {
            self.resolve_expr(expr, scope);
          }
          self.resolve_func(func, scope);
        }
        ClassMember::Field { key, value, .. } => {
          if let PropKey::Computed(expr) = key {
            self.resolve_expr(expr, scope);
          }
          if let Some(value) = value {
            self.resolve_expr(value, scope);
          }
        }
      }
    }
  }

  fn resolve_expr(&mut self, expr: &mut Expr, scope: ScopeId) {
    match expr {
      Expr::Id(ident) => self.resolve_ref(ident, scope),
      Expr::This(_)
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
          self.resolve_expr(expr, scope);
        }
      }
      Expr::Array(array) => {
        for item in array.items.iter_mut().flatten() {
          self.resolve_expr(item, scope);
        }
      }
      Expr::Object(object) => {
        for prop in &mut object.props {
          match prop {
            ObjectLitProp::KeyValue { key, value } => {
              if let PropKey::Computed(expr) = key {
                self.resolve_expr(expr, scope);
              }
              self.resolve_expr(value, scope);
            }
            ObjectLitProp::Shorthand(ident) => self.resolve_ref(ident, scope),
            ObjectLitProp::Method(method) => {
              if let PropKey::Computed(expr) = &mut method.key {
                self.resolve_expr(expr, scope);
              }
              self.resolve_func(&mut method.func, scope);
            }
            ObjectLitProp::Spread(expr) => self.resolve_expr(expr, scope),
          }
        }
      }
      Expr::Function(func_expr) => self.resolve_func(&mut func_expr.func, scope),
      Expr::Arrow(func) => self.resolve_func(func, scope),
      Expr::Class(class_expr) => self.resolve_class(&mut class_expr.class, scope),
      Expr::Unary(unary) => self.resolve_expr(&mut unary.expr, scope),
      Expr::Update(update) => self.resolve_expr(&mut update.expr, scope),
      Expr::Binary(binary) => {
        self.resolve_expr(&mut binary.left, scope);
        self.resolve_expr(&mut binary.right, scope);
      }
      Expr::Assign(assign) => {
        self.resolve_expr(&mut assign.target, scope);
        self.resolve_expr(&mut assign.value, scope);
      }
      Expr::Cond(cond) => {
        self.resolve_expr(&mut cond.test, scope);
        self.resolve_expr(&mut cond.cons, scope);
        self.resolve_expr(&mut cond.alt, scope);
      }
      Expr::Seq(seq) => {
        for expr in &mut seq.exprs {
          self.resolve_expr(expr, scope);
        }
      }
      Expr::Call(call) => {
        self.resolve_expr(&mut call.callee, scope);
        for arg in &mut call.args {
          self.resolve_expr(arg, scope);
        }
        // Direct eval: a call of the free identifier `eval`.
        if let Expr::Id(id) = &call.callee {
          if id.name == "eval" {
            if let Some(symbol) = id.symbol {
              if self.symbols.get(symbol).kind == SymbolKind::Unbound {
                self.taint_eval_chain(scope);
              }
            }
          }
        }
      }
      Expr::New(new) => {
        self.resolve_expr(&mut new.callee, scope);
        for arg in &mut new.args {
          self.resolve_expr(arg, scope);
        }
      }
      Expr::Member(member) => self.resolve_expr(&mut member.obj, scope),
      Expr::Index(index) => {
        self.resolve_expr(&mut index.obj, scope);
        self.resolve_expr(&mut index.index, scope);
      }
      Expr::Spread(spread) => self.resolve_expr(&mut spread.expr, scope),
      Expr::DynamicImport(import) => {
        if let Some(arg) = &mut import.arg {
          self.resolve_expr(arg, scope);
        }
      }
      Expr::Await(await_expr) => self.resolve_expr(&mut await_expr.expr, scope),
      Expr::Yield(yield_expr) => {
        if let Some(expr) = &mut yield_expr.expr {
          self.resolve_expr(expr, scope);
        }
      }
    }
  }
}

fn collect_decl_names(stmt: &Stmt, out: &mut Vec<(String, SymbolId)>) {
  match stmt {
    Stmt::VarDecl(decl) => {
      for declarator in &decl.decls {
        collect_pat_names(&declarator.pat, out);
      }
    }
    Stmt::FuncDecl(decl) => {
      if let Some(symbol) = decl.name.symbol {
        out.push((decl.name.name.clone(), symbol));
      }
    }
    Stmt::ClassDecl(decl) => {
      if let Some(symbol) = decl.name.symbol {
        out.push((decl.name.name.clone(), symbol));
      }
    }
    _ => {}
  }
}

fn collect_pat_names(pat: &Pat, out: &mut Vec<(String, SymbolId)>) {
  match pat {
    Pat::Id(ident) => {
      if let Some(symbol) = ident.symbol {
        out.push((ident.name.clone(), symbol));
      }
    }
    Pat::Array(array) => {
      for item in array.items.iter().flatten() {
        collect_pat_names(item, out);
      }
      if let Some(rest) = &array.rest {
        collect_pat_names(rest, out);
      }
    }
    Pat::Object(object) => {
      for prop in &object.props {
        collect_pat_names(&prop.value, out);
      }
      if let Some(rest) = &object.rest {
        collect_pat_names(rest, out);
      }
    }
    Pat::Assign(assign) => collect_pat_names(&assign.pat, out),
  }
}
