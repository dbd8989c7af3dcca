//! Output printing.
//!
//! Walks the linked, renamed module graph and emits JavaScript in two
//! whitespace modes (pretty with two-space indents, or minified). The
//! printer decides structure only: wrapper closures, the `bootstrap`
//! dispatch, interop constants, namespace objects, and the runtime
//! prelude. Identifier spelling comes entirely from the rename map.

use crate::graph::ModuleGraph;
use crate::graph::SourceIndex;
use crate::link::ExportTarget;
use crate::link::LinkOutput;
use crate::rename::RenameMap;
use crate::runtime;
use crate::sourcemap::line_starts;
use crate::sourcemap::offset_to_line_col;
use crate::sourcemap::Mapping;
use ahash::AHashMap;
use ahash::AHashSet;
use diagnostics::Loc;
use parse_js::ast::*;
use parse_js::symbol::Ref;
use parse_js::symbol::SymbolId;
use parse_js::ExportsKind;

// Precedence levels; an expression parenthesizes itself when its own
// level is below what the context requires.
const L_SEQ: u8 = 1;
const L_ASSIGN: u8 = 2;
const L_COND: u8 = 3;
const L_COALESCE: u8 = 4;
const L_OR: u8 = 5;
const L_AND: u8 = 6;
const L_BIT_OR: u8 = 7;
const L_BIT_XOR: u8 = 8;
const L_BIT_AND: u8 = 9;
const L_EQUALITY: u8 = 10;
const L_RELATIONAL: u8 = 11;
const L_SHIFT: u8 = 12;
const L_ADD: u8 = 13;
const L_MUL: u8 = 14;
const L_EXP: u8 = 15;
const L_UNARY: u8 = 16;
const L_POSTFIX: u8 = 17;
const L_CALL: u8 = 18;
const L_PRIMARY: u8 = 19;

fn binary_level(op: BinaryOp) -> u8 {
  match op {
    BinaryOp::Coalesce => L_COALESCE,
    BinaryOp::Or => L_OR,
    BinaryOp::And => L_AND,
    BinaryOp::BitOr => L_BIT_OR,
    BinaryOp::BitXor => L_BIT_XOR,
    BinaryOp::BitAnd => L_BIT_AND,
    BinaryOp::Eq | BinaryOp::Ne | BinaryOp::StrictEq | BinaryOp::StrictNe => L_EQUALITY,
    BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge | BinaryOp::In
    | BinaryOp::Instanceof => L_RELATIONAL,
    BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => L_SHIFT,
    BinaryOp::Add | BinaryOp::Sub => L_ADD,
    BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => L_MUL,
    BinaryOp::Exp => L_EXP,
  }
}

/// Quote a string for JS output: double quotes, standard escapes.
pub fn quote_js_string(value: &str) -> String {
  let mut out = String::with_capacity(value.len() + 2);
  out.push('"');
  for c in value.chars() {
    match c {
      '"' => out.push_str("\\\""),
      '\\' => out.push_str("\\\\"),
      '\n' => out.push_str("\\n"),
      '\r' => out.push_str("\\r"),
      '\t' => out.push_str("\\t"),
      '\u{8}' => out.push_str("\\b"),
      '\u{c}' => out.push_str("\\f"),
      '\u{b}' => out.push_str("\\v"),
      '\0' => out.push_str("\\0"),
      c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
      c => out.push(c),
    }
  }
  out.push('"');
  out
}

fn escape_template_chunk(chunk: &str) -> String {
  let mut out = String::with_capacity(chunk.len());
  let mut chars = chunk.chars().peekable();
  while let Some(c) = chars.next() {
    match c {
      '`' => out.push_str("\\`"),
      '\\' => out.push_str("\\\\"),
      '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
      c => out.push(c),
    }
  }
  out
}

fn is_valid_ident(name: &str) -> bool {
  let mut chars = name.chars();
  match chars.next() {
    Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
    _ => return false,
  }
  chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[derive(Clone, Copy)]
pub struct PrintOptions {
  pub minify_whitespace: bool,
  pub minify_syntax: bool,
  pub omit_runtime: bool,
  pub collect_mappings: bool,
}

pub struct PrintResult {
  pub code: String,
  pub mappings: Vec<Mapping>,
  /// Paths of sources referenced by the mappings, in first-use order.
  pub map_sources: Vec<SourceIndex>,
}

pub fn print_bundle(
  graph: &ModuleGraph,
  link: &LinkOutput,
  map: &RenameMap,
  options: PrintOptions,
  entry: SourceIndex,
) -> PrintResult {
  let mut printer = Printer::new(graph, Some(link), map, options);
  printer.emit_entry(entry);
  printer.finish()
}

/// Non-bundle mode: one module, import/export statements preserved.
pub fn print_single_module(
  graph: &ModuleGraph,
  map: &RenameMap,
  options: PrintOptions,
  index: SourceIndex,
) -> PrintResult {
  let mut printer = Printer::new(graph, None, map, options);
  printer.current_module = index;
  if let Some(hashbang) = &graph.modules[index as usize].top_level.hashbang {
    printer.w(hashbang);
    printer.w("\n");
  }
  for stmt in &graph.modules[index as usize].top_level.stmts {
    printer.emit_stmt(stmt, 0);
  }
  printer.finish()
}

struct Printer<'a> {
  graph: &'a ModuleGraph,
  link: Option<&'a LinkOutput>,
  map: &'a RenameMap,
  options: PrintOptions,
  out: String,
  line: u32,
  col: u32,
  mappings: Vec<Mapping>,
  map_sources: Vec<SourceIndex>,
  map_source_ids: AHashMap<SourceIndex, u32>,
  line_starts: AHashMap<SourceIndex, Vec<usize>>,
  current_module: SourceIndex,
  bootstrap: bool,
}

impl<'a> Printer<'a> {
  fn new(
    graph: &'a ModuleGraph,
    link: Option<&'a LinkOutput>,
    map: &'a RenameMap,
    options: PrintOptions,
  ) -> Self {
    Self {
      graph,
      link,
      map,
      options,
      out: String::new(),
      line: 0,
      col: 0,
      mappings: Vec::new(),
      map_sources: Vec::new(),
      map_source_ids: AHashMap::new(),
      line_starts: AHashMap::new(),
      current_module: 0,
      bootstrap: false,
    }
  }

  fn finish(self) -> PrintResult {
    PrintResult {
      code: self.out,
      mappings: self.mappings,
      map_sources: self.map_sources,
    }
  }

  // ---- low-level writing ----

  fn w(&mut self, text: &str) {
    for c in text.chars() {
      if c == '\n' {
        self.line += 1;
        self.col = 0;
      } else {
        self.col += 1;
      }
    }
    self.out.push_str(text);
  }

  fn nl(&mut self) {
    if !self.options.minify_whitespace {
      self.w("\n");
    }
  }

  fn sp(&mut self) {
    if !self.options.minify_whitespace {
      self.w(" ");
    }
  }

  fn ind(&mut self, indent: usize) {
    if !self.options.minify_whitespace {
      for _ in 0..indent {
        self.w("  ");
      }
    }
  }

  fn add_mapping(&mut self, loc: Loc) {
    if !self.options.collect_mappings || loc == Loc(0, 0) {
      return;
    }
    let source = self.current_module;
    let map_id = match self.map_source_ids.get(&source) {
      Some(&id) => id,
      None => {
        let id = self.map_sources.len() as u32;
        self.map_sources.push(source);
        self.map_source_ids.insert(source, id);
        self
          .line_starts
          .insert(source, line_starts(&self.graph.sources[source as usize].contents));
        id
      }
    };
    let starts = &self.line_starts[&source];
    let (src_line, src_col) = offset_to_line_col(starts, loc.0);
    self.mappings.push(Mapping {
      gen_line: self.line,
      gen_col: self.col,
      source: map_id,
      src_line,
      src_col,
    });
  }

  // ---- names ----

  fn final_name(&self, r: Ref) -> String {
    self.map.name_of(&self.graph.modules, r).to_string()
  }

  fn local_ref(&self, symbol: SymbolId) -> Ref {
    self.graph.modules[self.current_module as usize]
      .symbols
      .ref_of(symbol)
  }

  /// Print a symbol reference, expanding namespace aliases.
  fn symbol_text(&self, r: Ref) -> String {
    let canonical = crate::graph::follow_read(&self.graph.modules, r);
    let symbol = self.graph.modules[canonical.source as usize]
      .symbols
      .get(canonical.symbol);
    match &symbol.namespace_alias {
      Some(alias) => format!(
        "{}.{}",
        self.map.name_of(&self.graph.modules, alias.namespace),
        alias.alias
      ),
      None => self.final_name(canonical),
    }
  }

  fn helper_name(&self, helper: &str) -> String {
    if let Some(runtime_index) = self.graph.runtime {
      let runtime = &self.graph.modules[runtime_index as usize];
      if let Some(&sym) = runtime
        .scopes
        .get(parse_js::symbol::ScopeTree::MODULE)
        .members
        .get(helper)
      {
        return self.final_name(runtime.symbols.ref_of(sym));
      }
    }
    helper.to_string()
  }

  fn meta(&self, index: SourceIndex) -> &'a crate::link::ModuleMeta {
    let link: &'a LinkOutput = self.link.expect("bundle mode");
    &link.metas[index as usize]
  }

  // ---- bundle assembly ----

  fn emit_entry(&mut self, entry: SourceIndex) {
    let link = self.link.expect("bundle mode");
    self.bootstrap = link.bootstrap_entries.contains(&entry);

    if let Some(hashbang) = &self.graph.modules[entry as usize].top_level.hashbang {
      let text = hashbang.clone();
      self.w(&text);
      self.w("\n");
      if !self.options.minify_whitespace {
        self.w("\n");
      }
    }

    let mut wrote_any = false;
    if !self.options.omit_runtime {
      wrote_any = self.emit_runtime_prelude();
    }

    let order = self.post_order(entry);
    if self.bootstrap {
      if wrote_any {
        self.nl();
      }
      self.emit_bootstrap(entry, &order);
    } else {
      for &index in &order {
        if !self.options.minify_whitespace && wrote_any {
          self.w("\n");
        }
        wrote_any = true;
        self.emit_module_inline(index);
      }
    }
  }

  fn post_order(&self, entry: SourceIndex) -> Vec<SourceIndex> {
    let mut visited = AHashSet::new();
    let mut out = Vec::new();
    self.visit_post_order(entry, &mut visited, &mut out);
    out
  }

  fn visit_post_order(
    &self,
    index: SourceIndex,
    visited: &mut AHashSet<SourceIndex>,
    out: &mut Vec<SourceIndex>,
  ) {
    if Some(index) == self.graph.runtime || !visited.insert(index) {
      return;
    }
    for record in &self.graph.modules[index as usize].import_records {
      if let Some(target) = record.source_index {
        self.visit_post_order(target, visited, out);
      }
    }
    out.push(index);
  }

  fn emit_runtime_prelude(&mut self) -> bool {
    let Some(runtime_index) = self.graph.runtime else {
      return false;
    };
    let link = self.link.expect("bundle mode");
    if link.helpers.is_empty() {
      return false;
    }
    let needed = runtime::closure(&link.helpers);
    self.current_module = runtime_index;
    let graph = self.graph;
    let module = &graph.modules[runtime_index as usize];
    let mut wrote = false;
    for stmt in &module.top_level.stmts {
      let inner = match stmt {
        Stmt::ExportDecl(decl) => decl.decl.as_ref(),
        other => other,
      };
      let declared = match inner {
        Stmt::VarDecl(decl) => match &decl.decls[0].pat {
          Pat::Id(ident) => Some(ident.name.clone()),
          _ => None,
        },
        _ => None,
      };
      let keep = declared
        .as_deref()
        .map(|name| needed.contains(name))
        .unwrap_or(false);
      if keep {
        self.emit_stmt(inner, 0);
        wrote = true;
      }
    }
    wrote
  }

  fn emit_module_inline(&mut self, index: SourceIndex) {
    self.current_module = index;
    if !self.options.minify_whitespace {
      let path = self.graph.sources[index as usize].abs_path.clone();
      self.w("// ");
      self.w(&path);
      self.w("\n");
    }
    if self.meta(index).is_wrapped {
      self.emit_wrapper_decl(index, 0);
    } else {
      self.emit_module_body(index, 0);
    }
  }

  /// `var require_foo = __commonJS((exports, module) => { ... });`
  fn emit_wrapper_decl(&mut self, index: SourceIndex, indent: usize) {
    let wrapper = self
      .meta(index)
      .wrapper_symbol
      .expect("wrapped modules have a wrapper symbol");
    let wrapper_name = self.final_name(self.graph.modules[index as usize].symbols.ref_of(wrapper));
    let common_js = self.helper_name("__commonJS");
    self.ind(indent);
    self.w("var ");
    self.w(&wrapper_name);
    self.sp();
    self.w("=");
    self.sp();
    self.w(&common_js);
    self.w("(");
    self.emit_wrapper_params(index);
    self.sp();
    self.w("=>");
    self.sp();
    self.w("{");
    self.nl();
    self.emit_module_body(index, indent + 1);
    self.ind(indent);
    self.w("});");
    self.nl();
  }

  fn emit_wrapper_params(&mut self, index: SourceIndex) {
    let graph = self.graph;
    let module = &graph.modules[index as usize];
    let meta = self.meta(index);
    let uses_module = module.uses_module_object();
    let uses_exports =
      module.uses_exports_object() || (meta.needs_namespace_object && meta.is_wrapped);
    let exports_name = module
      .exports_symbol
      .map(|s| self.final_name(module.symbols.ref_of(s)));
    let module_name = module
      .module_symbol
      .map(|s| self.final_name(module.symbols.ref_of(s)));
    self.w("(");
    if uses_module {
      self.w(exports_name.as_deref().unwrap_or("exports"));
      self.w(",");
      self.sp();
      self.w(module_name.as_deref().unwrap_or("module"));
    } else if uses_exports {
      self.w(exports_name.as_deref().unwrap_or("exports"));
    }
    self.w(")");
  }

  /// Interop constants, namespace object, then statements.
  fn emit_module_body(&mut self, index: SourceIndex, indent: usize) {
    self.current_module = index;
    if self.meta(index).needs_namespace_object {
      self.emit_namespace_object(index, indent);
    }
    let graph = self.graph;
    for stmt in &graph.modules[index as usize].top_level.stmts {
      self.emit_bundled_stmt(stmt, indent);
    }
  }

  fn emit_namespace_object(&mut self, index: SourceIndex, indent: usize) {
    let meta = self.meta(index);
    let ns = meta
      .namespace_symbol
      .expect("namespace objects have a symbol");
    let ns_name = self.final_name(self.graph.modules[index as usize].symbols.ref_of(ns));
    let export_helper = self.helper_name("__export");
    let is_wrapped = meta.is_wrapped;

    if !is_wrapped {
      self.ind(indent);
      self.w("var ");
      self.w(&ns_name);
      self.sp();
      self.w("=");
      self.sp();
      self.w("{};");
      self.nl();
    }
    let exports: Vec<(String, ExportTarget)> = self
      .meta(index)
      .resolved_exports
      .iter()
      .map(|(k, v)| (k.clone(), v.clone()))
      .collect();
    if exports.is_empty() {
      return;
    }
    self.ind(indent);
    self.w(&export_helper);
    self.w("(");
    self.w(&ns_name);
    self.w(",");
    self.sp();
    self.w("{");
    self.nl();
    for (i, (name, target)) in exports.iter().enumerate() {
      self.ind(indent + 1);
      if is_valid_ident(name) {
        self.w(name);
      } else {
        let quoted = quote_js_string(name);
        self.w(&quoted);
      }
      self.w(":");
      self.sp();
      self.w("()");
      self.sp();
      self.w("=>");
      self.sp();
      let text = self.export_target_text(index, target);
      self.w(&text);
      if i + 1 < exports.len() {
        self.w(",");
      }
      self.nl();
    }
    self.ind(indent);
    self.w("});");
    self.nl();
  }

  fn export_target_text(&self, index: SourceIndex, target: &ExportTarget) -> String {
    match target {
      ExportTarget::Sym(r) => self.symbol_text(*r),
      ExportTarget::NsMember(ns, member) => {
        format!("{}.{}", self.map.name_of(&self.graph.modules, *ns), member)
      }
      ExportTarget::Namespace(ns_module) => {
        if *ns_module == index {
          // `export * as ns from '<self>'`: the module's own namespace,
          // which is the exports object when wrapped.
          let module = &self.graph.modules[index as usize];
          let meta = self.meta(index);
          let self_ns = if meta.is_wrapped {
            module.exports_symbol
          } else {
            meta.namespace_symbol
          };
          self_ns
            .map(|s| self.final_name(module.symbols.ref_of(s)))
            .unwrap_or_else(|| "exports".to_string())
        } else {
          let module = &self.graph.modules[*ns_module as usize];
          let ns = self.link.expect("bundle mode").metas[*ns_module as usize]
            .namespace_symbol
            .expect("namespace target has a symbol");
          self.final_name(module.symbols.ref_of(ns))
        }
      }
    }
  }

  /// The text of a call that evaluates a record's module at a require
  /// site (also used inside interop constants).
  fn require_call_text(&self, record_index: u32) -> String {
    let record =
      &self.graph.modules[self.current_module as usize].import_records[record_index as usize];
    if record.is_external {
      return format!("require({})", quote_js_string(&record.specifier));
    }
    let Some(target) = record.source_index else {
      return format!("require({})", quote_js_string(&record.specifier));
    };
    if self.bootstrap {
      return format!("{}({})", self.helper_name("__require"), target);
    }
    let meta = &self.link.expect("bundle mode").metas[target as usize];
    if meta.is_wrapped {
      let wrapper = meta.wrapper_symbol.expect("wrapped module");
      let module = &self.graph.modules[target as usize];
      format!("{}()", self.final_name(module.symbols.ref_of(wrapper)))
    } else {
      // `require()` of an inline ESM module evaluates to its namespace.
      let ns = meta.namespace_symbol.expect("namespace was synthesized");
      let module = &self.graph.modules[target as usize];
      self.final_name(module.symbols.ref_of(ns))
    }
  }

  fn emit_interop_const(&mut self, record_index: u32, indent: usize) {
    let meta = &self.link.expect("bundle mode").metas[self.current_module as usize];
    let Some(interop) = meta.interop.iter().find(|i| i.record == record_index) else {
      return;
    };
    let ns_name = self.final_name(self.local_ref(interop.namespace_symbol));
    let to_module = self.helper_name("__toModule");
    let call = self.require_call_text(record_index);
    self.ind(indent);
    self.w("const ");
    self.w(&ns_name);
    self.sp();
    self.w("=");
    self.sp();
    self.w(&to_module);
    self.w("(");
    self.w(&call);
    self.w(");");
    self.nl();
  }

  /// Statement emission with bundle-mode import/export rewriting.
  fn emit_bundled_stmt(&mut self, stmt: &Stmt, indent: usize) {
    match stmt {
      Stmt::Import(import) => self.emit_interop_const(import.record, indent),
      Stmt::ExportNamed(export) => {
        if let Some(record) = export.record {
          self.emit_interop_const(record, indent);
        }
      }
      Stmt::ExportStar(export) => {
        if export.alias.is_some() {
          self.emit_interop_const(export.record, indent);
        }
      }
      Stmt::ExportDecl(export) => self.emit_stmt(&export.decl, indent),
      Stmt::ExportDefault(export) => {
        let symbol = export.symbol.expect("binder ran");
        let name = self.final_name(self.local_ref(symbol));
        self.add_mapping(export.loc);
        self.ind(indent);
        self.w("const ");
        self.w(&name);
        self.sp();
        self.w("=");
        self.sp();
        self.emit_expr(&export.expr, L_ASSIGN, false);
        self.w(";");
        self.nl();
      }
      other => self.emit_stmt(other, indent),
    }
  }

  fn emit_bootstrap(&mut self, entry: SourceIndex, order: &[SourceIndex]) {
    let bootstrap_name = self.helper_name("bootstrap");
    self.w(&bootstrap_name);
    self.w("({");
    self.nl();

    let keyed: Vec<SourceIndex> = order
      .iter()
      .copied()
      .filter(|&m| m != entry && self.meta(m).is_wrapped)
      .chain(std::iter::once(entry))
      .collect();

    for (i, &index) in keyed.iter().enumerate() {
      self.current_module = index;
      self.ind(1);
      self.w(&index.to_string());
      self.emit_wrapper_params(index);
      self.sp();
      self.w("{");
      self.nl();
      if index == entry {
        // Inline dependencies merge into the entry's function.
        for &inline in order {
          if inline == entry || self.meta(inline).is_wrapped {
            continue;
          }
          self.current_module = inline;
          if !self.options.minify_whitespace {
            let path = self.graph.sources[inline as usize].abs_path.clone();
            self.ind(2);
            self.w("// ");
            self.w(&path);
            self.w("\n");
          }
          self.emit_module_body(inline, 2);
          self.nl();
        }
        self.current_module = entry;
        if !self.options.minify_whitespace {
          let path = self.graph.sources[entry as usize].abs_path.clone();
          self.ind(2);
          self.w("// ");
          self.w(&path);
          self.w("\n");
        }
        self.emit_module_body(entry, 2);
      } else {
        if !self.options.minify_whitespace {
          let path = self.graph.sources[index as usize].abs_path.clone();
          self.ind(2);
          self.w("// ");
          self.w(&path);
          self.w("\n");
        }
        self.emit_module_body(index, 2);
      }
      self.ind(1);
      self.w("}");
      if i + 1 < keyed.len() {
        self.w(",");
      }
      self.nl();
    }

    self.w("},");
    self.sp();
    self.w(&entry.to_string());
    self.w(");");
    self.nl();
  }

  // ---- statements ----

  fn emit_stmt(&mut self, stmt: &Stmt, indent: usize) {
    match stmt {
      Stmt::Empty(_) => {}
      Stmt::Block(block) => {
        self.ind(indent);
        self.w("{");
        self.nl();
        for stmt in &block.stmts {
          self.emit_inner_stmt(stmt, indent + 1);
        }
        self.ind(indent);
        self.w("}");
        self.nl();
      }
      Stmt::VarDecl(decl) => {
        self.add_mapping(decl.loc);
        self.ind(indent);
        self.emit_var_decl_inner(decl);
        self.w(";");
        self.nl();
      }
      Stmt::FuncDecl(decl) => {
        self.add_mapping(decl.loc);
        self.ind(indent);
        let name = self.ident_text(&decl.name);
        self.emit_func_keyword_and_name(&decl.func, Some(&name));
        self.emit_func_tail(&decl.func, indent);
        self.nl();
      }
      Stmt::ClassDecl(decl) => {
        self.add_mapping(decl.loc);
        self.ind(indent);
        self.w("class ");
        let name = self.ident_text(&decl.name);
        self.w(&name);
        self.emit_class_tail(&decl.class, indent);
        self.nl();
      }
      Stmt::Expr(stmt) => {
        self.add_mapping(stmt.loc);
        self.ind(indent);
        self.emit_expr(&stmt.expr, L_SEQ, true);
        self.w(";");
        self.nl();
      }
      Stmt::If(stmt) => {
        self.add_mapping(stmt.loc);
        self.ind(indent);
        self.emit_if(stmt, indent);
      }
      Stmt::For(stmt) => {
        self.add_mapping(stmt.loc);
        self.ind(indent);
        self.w("for");
        self.sp();
        self.w("(");
        match &stmt.init {
          ForInit::None => {}
          ForInit::VarDecl(decl) => self.emit_var_decl_inner(decl),
          ForInit::Expr(expr) => self.emit_expr(expr, L_SEQ, false),
        }
        self.w(";");
        if let Some(test) = &stmt.test {
          self.sp();
          self.emit_expr(test, L_SEQ, false);
        }
        self.w(";");
        if let Some(update) = &stmt.update {
          self.sp();
          self.emit_expr(update, L_SEQ, false);
        }
        self.w(")");
        self.emit_nested_body(&stmt.body, indent);
      }
      Stmt::ForInOf(stmt) => {
        self.add_mapping(stmt.loc);
        self.ind(indent);
        self.w("for");
        self.sp();
        self.w("(");
        match &stmt.left {
          ForHead::VarDecl(mode, pat) => {
            self.w(mode.as_str());
            self.w(" ");
            self.emit_pat(pat);
          }
          ForHead::Target(expr) => self.emit_expr(expr, L_CALL, false),
        }
        self.w(if stmt.is_of { " of " } else { " in " });
        self.emit_expr(&stmt.right, L_ASSIGN, false);
        self.w(")");
        self.emit_nested_body(&stmt.body, indent);
      }
      Stmt::While(stmt) => {
        self.add_mapping(stmt.loc);
        self.ind(indent);
        self.w("while");
        self.sp();
        self.w("(");
        self.emit_expr(&stmt.test, L_SEQ, false);
        self.w(")");
        self.emit_nested_body(&stmt.body, indent);
      }
      Stmt::DoWhile(stmt) => {
        self.add_mapping(stmt.loc);
        self.ind(indent);
        self.w("do");
        match stmt.body.as_ref() {
          Stmt::Block(_) => {
            self.sp();
            self.emit_braced_body(&stmt.body, indent);
            self.sp();
          }
          other => {
            if self.options.minify_whitespace {
              self.w(" ");
            } else {
              self.nl();
            }
            self.emit_inner_stmt(other, indent + 1);
            self.ind(indent);
          }
        }
        self.w("while");
        self.sp();
        self.w("(");
        self.emit_expr(&stmt.test, L_SEQ, false);
        self.w(");");
        self.nl();
      }
      Stmt::Return(stmt) => {
        self.add_mapping(stmt.loc);
        self.ind(indent);
        match &stmt.value {
          Some(value) => {
            self.w("return ");
            self.emit_expr(value, L_SEQ, false);
            self.w(";");
          }
          None => self.w("return;"),
        }
        self.nl();
      }
      Stmt::Throw(stmt) => {
        self.add_mapping(stmt.loc);
        self.ind(indent);
        self.w("throw ");
        self.emit_expr(&stmt.value, L_SEQ, false);
        self.w(";");
        self.nl();
      }
      Stmt::Try(stmt) => {
        self.add_mapping(stmt.loc);
        self.ind(indent);
        self.w("try");
        self.sp();
        self.w("{");
        self.nl();
        for inner in &stmt.block.stmts {
          self.emit_inner_stmt(inner, indent + 1);
        }
        self.ind(indent);
        self.w("}");
        if let Some(catch) = &stmt.catch {
          self.sp();
          self.w("catch");
          if let Some(param) = &catch.param {
            self.sp();
            self.w("(");
            self.emit_pat(param);
            self.w(")");
          }
          self.sp();
          self.w("{");
          self.nl();
          for inner in &catch.body.stmts {
            self.emit_inner_stmt(inner, indent + 1);
          }
          self.ind(indent);
          self.w("}");
        }
        if let Some(finally) = &stmt.finally {
          self.sp();
          self.w("finally");
          self.sp();
          self.w("{");
          self.nl();
          for inner in &finally.stmts {
            self.emit_inner_stmt(inner, indent + 1);
          }
          self.ind(indent);
          self.w("}");
        }
        self.nl();
      }
      Stmt::Switch(stmt) => {
        self.add_mapping(stmt.loc);
        self.ind(indent);
        self.w("switch");
        self.sp();
        self.w("(");
        self.emit_expr(&stmt.discriminant, L_SEQ, false);
        self.w(")");
        self.sp();
        self.w("{");
        self.nl();
        for case in &stmt.cases {
          self.ind(indent + 1);
          match &case.test {
            Some(test) => {
              self.w("case ");
              self.emit_expr(test, L_SEQ, false);
              self.w(":");
            }
            None => self.w("default:"),
          }
          self.nl();
          for inner in &case.body {
            self.emit_inner_stmt(inner, indent + 2);
          }
        }
        self.ind(indent);
        self.w("}");
        self.nl();
      }
      Stmt::Break(stmt) => {
        self.add_mapping(stmt.loc);
        self.ind(indent);
        match &stmt.label {
          Some(label) => {
            self.w("break ");
            self.w(label);
            self.w(";");
          }
          None => self.w("break;"),
        }
        self.nl();
      }
      Stmt::Continue(stmt) => {
        self.add_mapping(stmt.loc);
        self.ind(indent);
        match &stmt.label {
          Some(label) => {
            self.w("continue ");
            self.w(label);
            self.w(";");
          }
          None => self.w("continue;"),
        }
        self.nl();
      }
      Stmt::Labeled(stmt) => {
        self.add_mapping(stmt.loc);
        self.ind(indent);
        self.w(&stmt.label);
        self.w(":");
        self.emit_nested_body(&stmt.body, indent);
      }
      Stmt::With(stmt) => {
        self.add_mapping(stmt.loc);
        self.ind(indent);
        self.w("with");
        self.sp();
        self.w("(");
        self.emit_expr(&stmt.object, L_SEQ, false);
        self.w(")");
        self.emit_nested_body(&stmt.body, indent);
      }
      Stmt::Debugger(loc) => {
        self.add_mapping(*loc);
        self.ind(indent);
        self.w("debugger;");
        self.nl();
      }
      Stmt::Import(stmt) => self.emit_import_stmt(stmt, indent),
      Stmt::ExportNamed(stmt) => self.emit_export_named_stmt(stmt, indent),
      Stmt::ExportStar(stmt) => {
        self.add_mapping(stmt.loc);
        self.ind(indent);
        self.w("export *");
        if let Some(alias) = &stmt.alias {
          self.w(" as ");
          self.w(alias);
        }
        self.w(" from ");
        let spec = self.record_specifier(stmt.record);
        self.w(&spec);
        self.w(";");
        self.nl();
      }
      Stmt::ExportDefault(stmt) => {
        self.add_mapping(stmt.loc);
        self.ind(indent);
        self.w("export default ");
        self.emit_expr(&stmt.expr, L_ASSIGN, false);
        self.w(";");
        self.nl();
      }
      Stmt::ExportDecl(stmt) => {
        self.add_mapping(stmt.loc);
        self.ind(indent);
        self.w("export ");
        self.emit_stmt_unindented(&stmt.decl, indent);
      }
    }
  }

  /// Inner statements of blocks: in bundle mode they still need
  /// import/export rewriting (imports are module-level only, so plain
  /// emission is fine for nested statements).
  fn emit_inner_stmt(&mut self, stmt: &Stmt, indent: usize) {
    self.emit_stmt(stmt, indent);
  }

  /// Emit a statement whose leading indentation was already written.
  fn emit_stmt_unindented(&mut self, stmt: &Stmt, indent: usize) {
    match stmt {
      Stmt::VarDecl(decl) => {
        self.emit_var_decl_inner(decl);
        self.w(";");
        self.nl();
      }
      Stmt::FuncDecl(decl) => {
        let name = self.ident_text(&decl.name);
        self.emit_func_keyword_and_name(&decl.func, Some(&name));
        self.emit_func_tail(&decl.func, indent);
        self.nl();
      }
      Stmt::ClassDecl(decl) => {
        self.w("class ");
        let name = self.ident_text(&decl.name);
        self.w(&name);
        self.emit_class_tail(&decl.class, indent);
        self.nl();
      }
      other => self.emit_stmt(other, indent),
    }
  }

  fn emit_if(&mut self, stmt: &IfStmt, indent: usize) {
    self.w("if");
    self.sp();
    self.w("(");
    self.emit_expr(&stmt.test, L_SEQ, false);
    self.w(")");
    let cons_is_block = matches!(stmt.cons.as_ref(), Stmt::Block(_));
    if cons_is_block {
      self.sp();
      self.emit_braced_body(&stmt.cons, indent);
    } else {
      self.nl();
      self.emit_inner_stmt(&stmt.cons, indent + 1);
    }
    match &stmt.alt {
      None => {
        if cons_is_block {
          self.nl();
        }
      }
      Some(alt) => {
        if cons_is_block {
          self.sp();
        } else {
          self.ind(indent);
        }
        self.w("else");
        match alt.as_ref() {
          Stmt::If(nested) => {
            self.w(" ");
            self.emit_if(nested, indent);
          }
          Stmt::Block(_) => {
            self.sp();
            self.emit_braced_body(alt, indent);
            self.nl();
          }
          other => {
            if self.options.minify_whitespace {
              self.w(" ");
            } else {
              self.nl();
            }
            self.emit_inner_stmt(other, indent + 1);
          }
        }
      }
    }
  }

  /// `{ ... }` written inline (no leading indent, no trailing newline).
  fn emit_braced_body(&mut self, stmt: &Stmt, indent: usize) {
    let Stmt::Block(block) = stmt else {
      unreachable!("caller checked for a block");
    };
    self.w("{");
    self.nl();
    for inner in &block.stmts {
      self.emit_inner_stmt(inner, indent + 1);
    }
    self.ind(indent);
    self.w("}");
  }

  /// Single-statement or block body of `if`/`for`/`while`/`with`/labels.
  fn emit_nested_body(&mut self, body: &Stmt, indent: usize) {
    match body {
      Stmt::Block(_) => {
        self.sp();
        self.emit_braced_body(body, indent);
        self.nl();
      }
      Stmt::Empty(_) => {
        self.w(";");
        self.nl();
      }
      other => {
        self.nl();
        self.emit_inner_stmt(other, indent + 1);
      }
    }
  }

  fn emit_var_decl_inner(&mut self, decl: &VarDeclStmt) {
    self.w(decl.mode.as_str());
    self.w(" ");
    for (i, declarator) in decl.decls.iter().enumerate() {
      if i > 0 {
        self.w(",");
        self.sp();
      }
      self.emit_pat(&declarator.pat);
      if let Some(init) = &declarator.init {
        self.sp();
        self.w("=");
        self.sp();
        self.emit_expr(init, L_ASSIGN, false);
      }
    }
  }

  fn emit_import_stmt(&mut self, stmt: &ImportStmt, indent: usize) {
    self.add_mapping(stmt.loc);
    self.ind(indent);
    self.w("import ");
    let mut wrote_clause = false;
    if let Some(default) = &stmt.default {
      let name = self.ident_text(default);
      self.w(&name);
      wrote_clause = true;
    }
    if let Some(star) = &stmt.star {
      if wrote_clause {
        self.w(",");
        self.sp();
      }
      self.w("* as ");
      let name = self.ident_text(star);
      self.w(&name);
      wrote_clause = true;
    }
    if !stmt.names.is_empty() {
      if wrote_clause {
        self.w(",");
        self.sp();
      }
      self.w("{");
      for (i, name) in stmt.names.iter().enumerate() {
        if i > 0 {
          self.w(",");
          self.sp();
        }
        let local = self.ident_text(&name.local);
        if name.exported == local {
          self.w(&local);
        } else {
          self.w(&name.exported);
          self.w(" as ");
          self.w(&local);
        }
      }
      self.w("}");
      wrote_clause = true;
    }
    if wrote_clause {
      self.w(" from ");
    }
    let spec = self.record_specifier(stmt.record);
    self.w(&spec);
    self.w(";");
    self.nl();
  }

  fn emit_export_named_stmt(&mut self, stmt: &ExportNamedStmt, indent: usize) {
    self.add_mapping(stmt.loc);
    self.ind(indent);
    self.w("export {");
    for (i, name) in stmt.names.iter().enumerate() {
      if i > 0 {
        self.w(",");
        self.sp();
      }
      let orig = if stmt.record.is_some() {
        stmt.names[i].orig.name.clone()
      } else {
        self.ident_text(&name.orig)
      };
      self.w(&orig);
      if name.exported != orig {
        self.w(" as ");
        self.w(&name.exported);
      }
    }
    self.w("}");
    if let Some(record) = stmt.record {
      self.w(" from ");
      let spec = self.record_specifier(record);
      self.w(&spec);
    }
    self.w(";");
    self.nl();
  }

  fn record_specifier(&self, record: u32) -> String {
    let record =
      &self.graph.modules[self.current_module as usize].import_records[record as usize];
    quote_js_string(&record.specifier)
  }

  // ---- functions, classes, patterns ----

  fn ident_text(&self, ident: &Ident) -> String {
    match ident.symbol {
      Some(symbol) => self.symbol_text(self.local_ref(symbol)),
      None => ident.name.clone(),
    }
  }

  fn emit_func_keyword_and_name(&mut self, func: &Func, name: Option<&str>) {
    if func.is_async {
      self.w("async ");
    }
    self.w("function");
    if func.is_generator {
      self.w("*");
    }
    if let Some(name) = name {
      self.w(" ");
      self.w(name);
    }
  }

  fn emit_func_tail(&mut self, func: &Func, indent: usize) {
    self.w("(");
    self.emit_params(&func.params);
    self.w(")");
    self.sp();
    self.w("{");
    self.nl();
    if let FuncBody::Block(stmts) = &func.body {
      for stmt in stmts {
        self.emit_inner_stmt(stmt, indent + 1);
      }
    }
    self.ind(indent);
    self.w("}");
  }

  fn emit_params(&mut self, params: &[Param]) {
    for (i, param) in params.iter().enumerate() {
      if i > 0 {
        self.w(",");
        self.sp();
      }
      if param.is_rest {
        self.w("...");
      }
      self.emit_pat(&param.pat);
    }
  }

  fn emit_arrow(&mut self, func: &Func, indent: usize) {
    if func.is_async {
      self.w("async ");
    }
    self.w("(");
    self.emit_params(&func.params);
    self.w(")");
    self.sp();
    self.w("=>");
    self.sp();
    match &func.body {
      FuncBody::Block(stmts) => {
        self.w("{");
        self.nl();
        for stmt in stmts {
          self.emit_inner_stmt(stmt, indent + 1);
        }
        self.ind(indent);
        self.w("}");
      }
      FuncBody::Expr(expr) => {
        let needs_parens = matches!(expr.as_ref(), Expr::Object(_) | Expr::Seq(_));
        if needs_parens {
          self.w("(");
        }
        self.emit_expr(expr, L_ASSIGN, false);
        if needs_parens {
          self.w(")");
        }
      }
    }
  }

  fn emit_class_tail(&mut self, class: &Class, indent: usize) {
    if let Some(extends) = &class.extends {
      self.w(" extends ");
      self.emit_expr(extends, L_CALL, false);
    }
    self.sp();
    self.w("{");
    self.nl();
    for member in &class.members {
      self.ind(indent + 1);
      match member {
        ClassMember::Method {
          is_static,
          kind,
          key,
          func,
        } => {
          if *is_static {
            self.w("static ");
          }
          match kind {
            MethodKind::Get => self.w("get "),
            MethodKind::Set => self.w("set "),
            MethodKind::Normal => {
              if func.is_async {
                self.w("async ");
              }
              if func.is_generator {
                self.w("*");
              }
            }
          }
          self.emit_prop_key(key);
          self.emit_func_tail(func, indent + 1);
          self.nl();
        }
        ClassMember::Field {
          is_static,
          key,
          value,
        } => {
          if *is_static {
            self.w("static ");
          }
          self.emit_prop_key(key);
          if let Some(value) = value {
            self.sp();
            self.w("=");
            self.sp();
            self.emit_expr(value, L_ASSIGN, false);
          }
          self.w(";");
          self.nl();
        }
      }
    }
    self.ind(indent);
    self.w("}");
  }

  fn emit_prop_key(&mut self, key: &PropKey) {
    match key {
      PropKey::Ident(name) => self.w(&name.clone()),
      PropKey::Str(s) => {
        let quoted = quote_js_string(&s.value);
        self.w(&quoted);
      }
      PropKey::Num(n) => {
        let raw = n.raw.clone();
        self.w(&raw);
      }
      PropKey::Computed(expr) => {
        self.w("[");
        self.emit_expr(expr, L_ASSIGN, false);
        self.w("]");
      }
    }
  }

  fn emit_pat(&mut self, pat: &Pat) {
    match pat {
      Pat::Id(ident) => {
        self.add_mapping(ident.loc);
        let name = self.ident_text(ident);
        self.w(&name);
      }
      Pat::Array(array) => {
        self.w("[");
        for (i, item) in array.items.iter().enumerate() {
          if i > 0 {
            self.w(",");
            self.sp();
          }
          if let Some(item) = item {
            self.emit_pat(item);
          }
        }
        if let Some(rest) = &array.rest {
          if !array.items.is_empty() {
            self.w(",");
            self.sp();
          }
          self.w("...");
          self.emit_pat(rest);
        }
        self.w("]");
      }
      Pat::Object(object) => {
        self.w("{");
        for (i, prop) in object.props.iter().enumerate() {
          if i > 0 {
            self.w(",");
            self.sp();
          }
          self.emit_object_pat_prop(prop);
        }
        if let Some(rest) = &object.rest {
          if !object.props.is_empty() {
            self.w(",");
            self.sp();
          }
          self.w("...");
          self.emit_pat(rest);
        }
        self.w("}");
      }
      Pat::Assign(assign) => {
        self.emit_pat(&assign.pat);
        self.sp();
        self.w("=");
        self.sp();
        self.emit_expr(&assign.default, L_ASSIGN, false);
      }
    }
  }

  fn emit_object_pat_prop(&mut self, prop: &ObjectPatProp) {
    // Shorthand survives only while the binding still matches the key.
    if prop.shorthand {
      if let PropKey::Ident(key) = &prop.key {
        match &prop.value {
          Pat::Id(ident) => {
            let name = self.ident_text(ident);
            if &name == key {
              self.w(&name);
              return;
            }
          }
          Pat::Assign(assign) => {
            if let Pat::Id(ident) = &assign.pat {
              let name = self.ident_text(ident);
              if &name == key {
                self.w(&name);
                self.sp();
                self.w("=");
                self.sp();
                self.emit_expr(&assign.default, L_ASSIGN, false);
                return;
              }
            }
          }
          _ => {}
        }
      }
    }
    self.emit_prop_key(&prop.key);
    self.w(":");
    self.sp();
    self.emit_pat(&prop.value);
  }

  // ---- expressions ----

  fn emit_expr(&mut self, expr: &Expr, required: u8, stmt_start: bool) {
    let level = self.expr_level(expr);
    let force_parens = stmt_start
      && matches!(
        expr,
        Expr::Object(_) | Expr::Function(_) | Expr::Class(_)
      );
    let parens = level < required || force_parens;
    if parens {
      self.w("(");
    }
    let inner_stmt_start = stmt_start && !parens;
    self.emit_expr_inner(expr, inner_stmt_start);
    if parens {
      self.w(")");
    }
  }

  fn expr_level(&self, expr: &Expr) -> u8 {
    match expr {
      Expr::Seq(_) => L_SEQ,
      Expr::Assign(_) | Expr::Arrow(_) | Expr::Yield(_) => L_ASSIGN,
      Expr::Cond(_) => L_COND,
      Expr::Binary(binary) => binary_level(binary.op),
      Expr::Unary(_) | Expr::Await(_) => L_UNARY,
      Expr::Update(update) => {
        if update.prefix {
          L_UNARY
        } else {
          L_POSTFIX
        }
      }
      Expr::Call(_) | Expr::Member(_) | Expr::Index(_) | Expr::New(_) => L_CALL,
      Expr::Undefined(_) => L_UNARY, // prints as `void 0`
      Expr::DynamicImport(_) | Expr::Require(_) => L_CALL,
      Expr::Bool(..) if self.options.minify_syntax => L_UNARY, // `!0`
      _ => L_PRIMARY,
    }
  }

  fn emit_expr_inner(&mut self, expr: &Expr, stmt_start: bool) {
    match expr {
      Expr::Id(ident) => {
        self.add_mapping(ident.loc);
        let name = self.ident_text(ident);
        self.w(&name);
      }
      Expr::This(loc) => {
        self.add_mapping(*loc);
        self.w("this");
      }
      Expr::ModuleThis(loc) => {
        self.add_mapping(*loc);
        let module = &self.graph.modules[self.current_module as usize];
        if module.exports_kind == ExportsKind::CommonJs {
          let text = module
            .exports_symbol
            .map(|s| self.symbol_text(module.symbols.ref_of(s)))
            .unwrap_or_else(|| "exports".to_string());
          self.w(&text);
        } else {
          self.w("void 0");
        }
      }
      Expr::Null(loc) => {
        self.add_mapping(*loc);
        self.w("null");
      }
      Expr::Undefined(loc) => {
        self.add_mapping(*loc);
        self.w("void 0");
      }
      Expr::Bool(loc, value) => {
        self.add_mapping(*loc);
        if self.options.minify_syntax {
          self.w(if *value { "!0" } else { "!1" });
        } else {
          self.w(if *value { "true" } else { "false" });
        }
      }
      Expr::Num(num) => {
        self.add_mapping(num.loc);
        let raw = num.raw.clone();
        self.w(&raw);
      }
      Expr::BigInt(loc, raw) => {
        self.add_mapping(*loc);
        let raw = raw.clone();
        self.w(&raw);
      }
      Expr::Str(s) => {
        self.add_mapping(s.loc);
        let quoted = quote_js_string(&s.value);
        self.w(&quoted);
      }
      Expr::Regex(loc, raw) => {
        self.add_mapping(*loc);
        let raw = raw.clone();
        self.w(&raw);
      }
      Expr::Template(template) => {
        self.add_mapping(template.loc);
        self.w("`");
        let head = escape_template_chunk(&template.head);
        self.w(&head);
        for (expr, chunk) in &template.parts {
          self.w("${");
          self.emit_expr(expr, L_SEQ, false);
          self.w("}");
          let chunk = escape_template_chunk(chunk);
          self.w(&chunk);
        }
        self.w("`");
      }
      Expr::Array(array) => {
        self.add_mapping(array.loc);
        self.w("[");
        for (i, item) in array.items.iter().enumerate() {
          if i > 0 {
            self.w(",");
            if item.is_some() {
              self.sp();
            }
          }
          if let Some(item) = item {
            self.emit_expr(item, L_ASSIGN, false);
          }
        }
        self.w("]");
      }
      Expr::Object(object) => self.emit_object_literal(object),
      Expr::Function(func_expr) => {
        self.add_mapping(func_expr.loc);
        let name = func_expr.name.as_ref().map(|n| self.ident_text(n));
        self.emit_func_keyword_and_name(&func_expr.func, name.as_deref());
        let indent = self.current_indent();
        self.emit_func_tail(&func_expr.func, indent);
      }
      Expr::Arrow(func) => {
        self.add_mapping(func.loc);
        let indent = self.current_indent();
        self.emit_arrow(func, indent);
      }
      Expr::Class(class_expr) => {
        self.add_mapping(class_expr.loc);
        self.w("class");
        if let Some(name) = &class_expr.name {
          self.w(" ");
          let name = self.ident_text(name);
          self.w(&name);
        }
        let indent = self.current_indent();
        self.emit_class_tail(&class_expr.class, indent);
      }
      Expr::Unary(unary) => {
        self.add_mapping(unary.loc);
        let op = unary.op.as_str();
        self.w(op);
        if matches!(
          unary.op,
          UnaryOp::Typeof | UnaryOp::Void | UnaryOp::Delete
        ) {
          self.w(" ");
        } else if sign_needs_space(unary.op, &unary.expr) {
          // `- -a` must not lex as `--a`.
          self.w(" ");
        }
        self.emit_expr(&unary.expr, L_UNARY, false);
      }
      Expr::Update(update) => {
        self.add_mapping(update.loc);
        let op = if update.inc { "++" } else { "--" };
        if update.prefix {
          self.w(op);
          self.emit_expr(&update.expr, L_UNARY, false);
        } else {
          self.emit_expr(&update.expr, L_CALL, stmt_start);
          self.w(op);
        }
      }
      Expr::Binary(binary) => {
        let level = binary_level(binary.op);
        let (left_min, right_min) = match binary.op {
          BinaryOp::Exp => (level + 1, level),
          BinaryOp::Coalesce => (L_BIT_OR, L_BIT_OR),
          _ => (level, level + 1),
        };
        self.emit_expr(&binary.left, left_min, stmt_start);
        if matches!(binary.op, BinaryOp::In | BinaryOp::Instanceof) {
          self.w(" ");
          self.w(binary.op.as_str());
          self.w(" ");
        } else {
          self.sp();
          self.w(binary.op.as_str());
          self.sp();
          // `a+ +b` must not collapse to `a++b`.
          if self.options.minify_whitespace && binary_sign_clash(binary.op, &binary.right) {
            self.w(" ");
          }
        }
        self.emit_expr(&binary.right, right_min, false);
      }
      Expr::Assign(assign) => {
        self.emit_expr(&assign.target, L_CALL, stmt_start);
        self.sp();
        self.w(assign.op.as_str());
        self.sp();
        self.emit_expr(&assign.value, L_ASSIGN, false);
      }
      Expr::Cond(cond) => {
        self.emit_expr(&cond.test, L_COALESCE, stmt_start);
        self.sp();
        self.w("?");
        self.sp();
        self.emit_expr(&cond.cons, L_ASSIGN, false);
        self.sp();
        self.w(":");
        self.sp();
        self.emit_expr(&cond.alt, L_ASSIGN, false);
      }
      Expr::Seq(seq) => {
        for (i, expr) in seq.exprs.iter().enumerate() {
          if i > 0 {
            self.w(",");
            self.sp();
          }
          self.emit_expr(expr, L_ASSIGN, stmt_start && i == 0);
        }
      }
      Expr::Call(call) => {
        self.add_mapping(call.loc);
        let callee_needs_parens = matches!(call.callee, Expr::Arrow(_));
        if callee_needs_parens {
          self.w("(");
          self.emit_expr_inner(&call.callee, false);
          self.w(")");
        } else {
          self.emit_expr(&call.callee, L_CALL, stmt_start);
        }
        if call.optional {
          self.w("?.");
        }
        self.w("(");
        for (i, arg) in call.args.iter().enumerate() {
          if i > 0 {
            self.w(",");
            self.sp();
          }
          match arg {
            Expr::Spread(spread) => {
              self.w("...");
              self.emit_expr(&spread.expr, L_ASSIGN, false);
            }
            other => self.emit_expr(other, L_ASSIGN, false),
          }
        }
        self.w(")");
      }
      Expr::New(new) => {
        self.add_mapping(new.loc);
        self.w("new ");
        let callee_has_call = contains_call(&new.callee);
        if callee_has_call {
          self.w("(");
          self.emit_expr_inner(&new.callee, false);
          self.w(")");
        } else {
          self.emit_expr(&new.callee, L_CALL, false);
        }
        self.w("(");
        for (i, arg) in new.args.iter().enumerate() {
          if i > 0 {
            self.w(",");
            self.sp();
          }
          self.emit_expr(arg, L_ASSIGN, false);
        }
        self.w(")");
      }
      Expr::Member(member) => {
        let obj_needs_parens = matches!(member.obj, Expr::Num(_));
        if obj_needs_parens {
          self.w("(");
          self.emit_expr_inner(&member.obj, false);
          self.w(")");
        } else {
          self.emit_expr(&member.obj, L_CALL, stmt_start);
        }
        self.w(if member.optional { "?." } else { "." });
        self.w(&member.prop.clone());
      }
      Expr::Index(index) => {
        self.emit_expr(&index.obj, L_CALL, stmt_start);
        if index.optional {
          self.w("?.");
        }
        self.w("[");
        self.emit_expr(&index.index, L_SEQ, false);
        self.w("]");
      }
      Expr::Spread(spread) => {
        // Only valid in calls/arrays/objects, which handle it; keep a
        // sensible fallback.
        self.w("...");
        self.emit_expr(&spread.expr, L_ASSIGN, false);
      }
      Expr::Require(require) => {
        self.add_mapping(require.loc);
        let text = if self.link.is_some() {
          self.require_call_text(require.record)
        } else {
          let record = &self.graph.modules[self.current_module as usize].import_records
            [require.record as usize];
          format!("require({})", quote_js_string(&record.specifier))
        };
        self.w(&text);
      }
      Expr::DynamicImport(import) => {
        self.add_mapping(import.loc);
        self.emit_dynamic_import(import);
      }
      Expr::Await(await_expr) => {
        self.add_mapping(await_expr.loc);
        self.w("await ");
        self.emit_expr(&await_expr.expr, L_UNARY, false);
      }
      Expr::Yield(yield_expr) => {
        self.add_mapping(yield_expr.loc);
        self.w("yield");
        if yield_expr.delegate {
          self.w("*");
        }
        if let Some(expr) = &yield_expr.expr {
          self.w(" ");
          self.emit_expr(expr, L_ASSIGN, false);
        }
      }
    }
  }

  fn emit_dynamic_import(&mut self, import: &DynamicImportExpr) {
    let Some(record_index) = import.record else {
      self.w("import(");
      if let Some(arg) = &import.arg {
        self.emit_expr(arg, L_ASSIGN, false);
      }
      self.w(")");
      return;
    };
    let record = &self.graph.modules[self.current_module as usize].import_records
      [record_index as usize];
    let unlinked = self.link.is_none() || (record.source_index.is_none() && !record.is_external);
    if unlinked {
      let spec = quote_js_string(&record.specifier);
      self.w("import(");
      self.w(&spec);
      self.w(")");
      return;
    }

    let inner = if self.bootstrap && !record.is_external {
      format!(
        "{}({})",
        self.helper_name("__import"),
        record.source_index.expect("resolved above")
      )
    } else {
      format!(
        "{}({})",
        self.helper_name("__toModule"),
        self.require_call_text(record_index)
      )
    };
    self.w("Promise.resolve().then(()");
    self.sp();
    self.w("=>");
    self.sp();
    self.w(&inner);
    self.w(")");
  }

  fn emit_object_literal(&mut self, object: &ObjectLit) {
    self.add_mapping(object.loc);
    if object.props.is_empty() {
      self.w("{}");
      return;
    }
    let indent = self.current_indent();
    self.w("{");
    self.nl();
    for (i, prop) in object.props.iter().enumerate() {
      self.ind(indent + 1);
      match prop {
        ObjectLitProp::KeyValue { key, value } => {
          self.emit_prop_key(key);
          self.w(":");
          self.sp();
          self.emit_expr(value, L_ASSIGN, false);
        }
        ObjectLitProp::Shorthand(ident) => {
          let name = self.ident_text(ident);
          if name == ident.name {
            self.w(&name);
          } else {
            self.w(&ident.name.clone());
            self.w(":");
            self.sp();
            self.w(&name);
          }
        }
        ObjectLitProp::Method(method) => {
          match method.kind {
            MethodKind::Get => self.w("get "),
            MethodKind::Set => self.w("set "),
            MethodKind::Normal => {
              if method.func.is_async {
                self.w("async ");
              }
              if method.func.is_generator {
                self.w("*");
              }
            }
          }
          self.emit_prop_key(&method.key);
          self.emit_func_tail(&method.func, indent + 1);
        }
        ObjectLitProp::Spread(expr) => {
          self.w("...");
          self.emit_expr(expr, L_ASSIGN, false);
        }
      }
      if i + 1 < object.props.len() {
        self.w(",");
      }
      self.nl();
    }
    self.ind(indent);
    self.w("}");
  }

  /// Indentation level inferred from the current column (pretty mode
  /// writes two spaces per level and expressions never start a line).
  fn current_indent(&self) -> usize {
    let mut indent = 0;
    let line_start = self.out.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line = &self.out[line_start..];
    let mut spaces = 0;
    for c in line.chars() {
      if c == ' ' {
        spaces += 1;
      } else {
        break;
      }
    }
    indent += spaces / 2;
    indent
  }
}

fn binary_sign_clash(op: BinaryOp, right: &Expr) -> bool {
  match op {
    BinaryOp::Add => matches!(right, Expr::Unary(inner) if inner.op == UnaryOp::Pos)
      || matches!(right, Expr::Update(update) if update.prefix && update.inc),
    BinaryOp::Sub => matches!(right, Expr::Unary(inner) if inner.op == UnaryOp::Neg)
      || matches!(right, Expr::Update(update) if update.prefix && !update.inc),
    _ => false,
  }
}

fn sign_needs_space(op: UnaryOp, operand: &Expr) -> bool {
  match op {
    UnaryOp::Neg => matches!(
      operand,
      Expr::Unary(inner) if inner.op == UnaryOp::Neg
    ) || matches!(operand, Expr::Update(update) if update.prefix && !update.inc),
    UnaryOp::Pos => matches!(
      operand,
      Expr::Unary(inner) if inner.op == UnaryOp::Pos
    ) || matches!(operand, Expr::Update(update) if update.prefix && update.inc),
    _ => false,
  }
}

fn contains_call(expr: &Expr) -> bool {
  match expr {
    Expr::Call(_) => true,
    Expr::Member(member) => contains_call(&member.obj),
    Expr::Index(index) => contains_call(&index.obj),
    _ => false,
  }
}
