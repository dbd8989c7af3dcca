//! JavaScript/TypeScript/JSX frontend for the bundler.
//!
//! [`parse_with_options`] runs three passes over a single source file:
//! recursive-descent parsing, scope/symbol binding, and target lowering.
//! The result is a [`Program`]: the AST plus the per-file scope tree,
//! symbol table, and import/export records the linker consumes.

use crate::ast::TopLevel;
use crate::bind::bind;
use crate::error::SyntaxResult;
use crate::lex::Lexer;
use crate::lower::lower;
use crate::parse::Parser;
use crate::symbol::ScopeTree;
use crate::symbol::SymbolId;
use crate::symbol::SymbolTable;
use diagnostics::Severity;
use std::collections::BTreeMap;

pub use diagnostics::Loc;

pub mod ast;
mod bind;
pub mod error;
pub mod lex;
mod lower;
mod parse;
pub mod symbol;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dialect {
  Js,
  Jsx,
  Ts,
  Tsx,
}

impl Dialect {
  pub fn jsx(&self) -> bool {
    matches!(self, Dialect::Jsx | Dialect::Tsx)
  }

  pub fn typescript(&self) -> bool {
    matches!(self, Dialect::Ts | Dialect::Tsx)
  }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Target {
  Es2015,
  Es2017,
  Es2018,
  Es2020,
  EsNext,
}

impl Target {
  pub const fn as_str(&self) -> &'static str {
    match self {
      Target::Es2015 => "ES2015",
      Target::Es2017 => "ES2017",
      Target::Es2018 => "ES2018",
      Target::Es2020 => "ES2020",
      Target::EsNext => "ESNext",
    }
  }
}

#[derive(Clone, Debug)]
pub struct ParseOptions {
  pub source_index: u32,
  pub dialect: Dialect,
  pub target: Target,
  pub is_bundling: bool,
  /// JSX factory as member-expression parts, e.g. `["React", "createElement"]`.
  pub jsx_factory: Vec<String>,
  pub jsx_fragment: Vec<String>,
}

impl Default for ParseOptions {
  fn default() -> Self {
    Self {
      source_index: 0,
      dialect: Dialect::Js,
      target: Target::EsNext,
      is_bundling: false,
      jsx_factory: vec!["React".into(), "createElement".into()],
      jsx_fragment: vec!["React".into(), "Fragment".into()],
    }
  }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ImportKind {
  /// `import ... from` or `export ... from`.
  Stmt,
  /// Static `require(...)`.
  Require,
  /// `import(...)`.
  Dynamic,
}

#[derive(Clone, Debug)]
pub struct ImportRecord {
  pub kind: ImportKind,
  pub specifier: String,
  pub loc: Loc,
  /// Filled in by the scan phase.
  pub source_index: Option<u32>,
  /// The specifier is kept verbatim in the output (Node platform or a
  /// declared external).
  pub is_external: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum ExportsKind {
  None,
  Esm,
  CommonJs,
}

/// One ESM import binding: `local` is keyed in [`Program::named_imports`].
#[derive(Clone, Debug)]
pub struct NamedImport {
  pub record: u32,
  /// `None` for a star import.
  pub alias: Option<String>,
  pub loc: Loc,
}

#[derive(Clone, Debug)]
pub enum NamedExport {
  Local(SymbolId),
  ReExport { record: u32, source_name: String },
  NamespaceReExport { record: u32 },
}

#[derive(Clone, Debug)]
pub struct ParseDiagnostic {
  pub loc: Loc,
  pub severity: Severity,
  pub message: String,
}

#[derive(Debug)]
pub struct Program {
  pub source_index: u32,
  pub top_level: TopLevel,
  pub symbols: SymbolTable,
  pub scopes: ScopeTree,
  pub import_records: Vec<ImportRecord>,
  pub named_imports: BTreeMap<SymbolId, NamedImport>,
  pub named_exports: BTreeMap<String, NamedExport>,
  /// Record indices of `export * from` without an alias.
  pub export_stars: Vec<u32>,
  pub exports_kind: ExportsKind,
  pub has_top_level_return: bool,
  pub has_module_this: bool,
  /// Declared when bundling; references force CommonJS.
  pub exports_symbol: Option<SymbolId>,
  pub module_symbol: Option<SymbolId>,
  /// Non-fatal diagnostics gathered during parse/bind/lower.
  pub diagnostics: Vec<ParseDiagnostic>,
}

impl Program {
  pub fn uses_exports_object(&self) -> bool {
    self
      .exports_symbol
      .map(|s| self.symbols.get(s).use_count > 0)
      .unwrap_or(false)
  }

  pub fn uses_module_object(&self) -> bool {
    self
      .module_symbol
      .map(|s| self.symbols.get(s).use_count > 0)
      .unwrap_or(false)
  }
}

pub fn parse(source: &str) -> SyntaxResult<Program> {
  parse_with_options(source, &ParseOptions::default())
}

pub fn parse_with_options(source: &str, options: &ParseOptions) -> SyntaxResult<Program> {
  let lexer = Lexer::new(source);
  let mut parser = Parser::new(lexer, options.clone());
  let output = parser.parse_top_level()?;
  let mut program = bind(output, options);
  lower(&mut program, options);
  Ok(program)
}
