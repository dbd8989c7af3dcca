//! Recursive-descent parser.
//!
//! The parser owns the lexer and a single lookahead token. Ambiguous
//! constructs (arrow parameters, regex vs division, template
//! substitutions, JSX) are handled by snapshotting the lexer offset and
//! re-lexing. Statement lists are produced through `parse_module_item` so
//! that one source construct may expand to more than one statement
//! (e.g. `export default function foo() {}`).

mod expr;
mod ts;

use crate::ast::*;
use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::Lexer;
use crate::lex::Token;
use crate::lex::TT;
use crate::ImportKind;
use crate::ImportRecord;
use crate::ParseDiagnostic;
use crate::ParseOptions;
use diagnostics::Loc;
use diagnostics::Severity;

pub struct ParseOutput {
  pub top_level: TopLevel,
  pub import_records: Vec<ImportRecord>,
  pub diagnostics: Vec<ParseDiagnostic>,
  pub has_module_this: bool,
  pub has_top_level_return: bool,
  pub has_esm_syntax: bool,
}

pub struct Parser<'a> {
  pub(crate) lexer: Lexer<'a>,
  pub(crate) tok: Token,
  pub(crate) options: ParseOptions,
  pub(crate) records: Vec<ImportRecord>,
  pub(crate) diagnostics: Vec<ParseDiagnostic>,
  /// Non-arrow function nesting depth (class members included).
  pub(crate) fn_depth: u32,
  /// Arrow function nesting depth; counts toward `return` legality but not
  /// `this` classification.
  pub(crate) arrow_depth: u32,
  pub(crate) try_depth: u32,
  pub(crate) typeof_depth: u32,
  /// Disallow the `in` operator (for-statement heads).
  pub(crate) no_in: bool,
  pub(crate) has_module_this: bool,
  pub(crate) has_top_level_return: bool,
  pub(crate) has_esm_syntax: bool,
}

pub(crate) struct Snapshot {
  pos: usize,
  tok: Token,
  records: usize,
  diagnostics: usize,
  has_module_this: bool,
  has_top_level_return: bool,
  has_esm_syntax: bool,
}

impl<'a> Parser<'a> {
  pub fn new(lexer: Lexer<'a>, options: ParseOptions) -> Self {
    Self {
      lexer,
      tok: Token {
        tt: TT::Eof,
        loc: Loc(0, 0),
        newline_before: false,
        value: String::new(),
      },
      options,
      records: Vec::new(),
      diagnostics: Vec::new(),
      fn_depth: 0,
      arrow_depth: 0,
      try_depth: 0,
      typeof_depth: 0,
      no_in: false,
      has_module_this: false,
      has_top_level_return: false,
      has_esm_syntax: false,
    }
  }

  pub(crate) fn bump(&mut self) -> SyntaxResult<()> {
    self.tok = self.lexer.next_token()?;
    Ok(())
  }

  pub(crate) fn at(&self, tt: TT) -> bool {
    self.tok.tt == tt
  }

  pub(crate) fn at_kw(&self, kw: &str) -> bool {
    self.tok.tt == TT::Ident && self.tok.value == kw
  }

  pub(crate) fn eat(&mut self, tt: TT) -> SyntaxResult<bool> {
    if self.at(tt) {
      self.bump()?;
      Ok(true)
    } else {
      Ok(false)
    }
  }

  pub(crate) fn eat_kw(&mut self, kw: &str) -> SyntaxResult<bool> {
    if self.at_kw(kw) {
      self.bump()?;
      Ok(true)
    } else {
      Ok(false)
    }
  }

  pub(crate) fn expect(&mut self, tt: TT, what: &'static str) -> SyntaxResult<Token> {
    if self.tok.tt != tt {
      return Err(self.unexpected(what));
    }
    let tok = self.tok.clone();
    self.bump()?;
    Ok(tok)
  }

  pub(crate) fn expect_kw(&mut self, kw: &'static str) -> SyntaxResult<()> {
    if !self.at_kw(kw) {
      return Err(self.unexpected(kw));
    }
    self.bump()
  }

  /// Any word token, keywords included (needed for `import {default as x}`).
  pub(crate) fn expect_name(&mut self) -> SyntaxResult<Ident> {
    if self.tok.tt != TT::Ident {
      return Err(self.unexpected("identifier"));
    }
    let ident = Ident::new(self.tok.loc, self.tok.value.clone());
    self.bump()?;
    Ok(ident)
  }

  pub(crate) fn unexpected(&self, what: &'static str) -> SyntaxError {
    if self.tok.tt == TT::Eof {
      SyntaxError::new(SyntaxErrorType::UnexpectedEnd, self.tok.loc)
    } else {
      SyntaxError::new(SyntaxErrorType::ExpectedToken(what), self.tok.loc)
    }
  }

  /// Automatic semicolon insertion at statement end.
  pub(crate) fn semicolon(&mut self) -> SyntaxResult<()> {
    if self.at(TT::Semicolon) {
      self.bump()?;
      Ok(())
    } else if self.at(TT::BraceClose) || self.at(TT::Eof) || self.tok.newline_before {
      Ok(())
    } else {
      Err(self.unexpected(";"))
    }
  }

  pub(crate) fn snapshot(&self) -> Snapshot {
    Snapshot {
      pos: self.lexer.pos(),
      tok: self.tok.clone(),
      records: self.records.len(),
      diagnostics: self.diagnostics.len(),
      has_module_this: self.has_module_this,
      has_top_level_return: self.has_top_level_return,
      has_esm_syntax: self.has_esm_syntax,
    }
  }

  pub(crate) fn restore(&mut self, snapshot: Snapshot) {
    self.lexer.set_pos(snapshot.pos);
    self.tok = snapshot.tok;
    self.records.truncate(snapshot.records);
    self.diagnostics.truncate(snapshot.diagnostics);
    self.has_module_this = snapshot.has_module_this;
    self.has_top_level_return = snapshot.has_top_level_return;
    self.has_esm_syntax = snapshot.has_esm_syntax;
  }

  /// Push the lookahead token back into the lexer (for raw-mode scans).
  pub(crate) fn unlex(&mut self) {
    self.lexer.set_pos(self.tok.loc.0);
  }

  pub(crate) fn add_record(&mut self, kind: ImportKind, specifier: String, loc: Loc) -> u32 {
    let index = self.records.len() as u32;
    self.records.push(ImportRecord {
      kind,
      specifier,
      loc,
      source_index: None,
      is_external: false,
    });
    index
  }

  pub(crate) fn add_error(&mut self, loc: Loc, message: impl Into<String>) {
    self.diagnostics.push(ParseDiagnostic {
      loc,
      severity: Severity::Error,
      message: message.into(),
    });
  }

  // ----------------------------------------------------------------------
  // Top level and statements
  // ----------------------------------------------------------------------

  pub fn parse_top_level(&mut self) -> SyntaxResult<ParseOutput> {
    let hashbang = self.lexer.take_hashbang();
    self.bump()?;
    let mut stmts = Vec::new();
    while !self.at(TT::Eof) {
      self.parse_module_item(&mut stmts)?;
    }
    Ok(ParseOutput {
      top_level: TopLevel { hashbang, stmts },
      import_records: std::mem::take(&mut self.records),
      diagnostics: std::mem::take(&mut self.diagnostics),
      has_module_this: self.has_module_this,
      has_top_level_return: self.has_top_level_return,
      has_esm_syntax: self.has_esm_syntax,
    })
  }

  fn parse_module_item(&mut self, out: &mut Vec<Stmt>) -> SyntaxResult<()> {
    if self.at_kw("import") && !self.import_is_expression()? {
      out.push(self.parse_import_stmt()?);
      return Ok(());
    }
    if self.at_kw("export") {
      return self.parse_export_stmt(out);
    }
    let stmt = self.parse_stmt()?;
    out.push(stmt);
    Ok(())
  }

  /// `import(` and `import.meta` are expressions, not declarations.
  fn import_is_expression(&mut self) -> SyntaxResult<bool> {
    let snapshot = self.snapshot();
    self.bump()?;
    let result = self.at(TT::ParenOpen) || self.at(TT::Dot);
    self.restore(snapshot);
    Ok(result)
  }

  pub(crate) fn parse_stmt(&mut self) -> SyntaxResult<Stmt> {
    match self.tok.tt {
      TT::BraceOpen => Ok(Stmt::Block(self.parse_block()?)),
      TT::Semicolon => {
        let loc = self.tok.loc;
        self.bump()?;
        Ok(Stmt::Empty(loc))
      }
      TT::Ident => self.parse_word_stmt(),
      _ => self.parse_expr_stmt(),
    }
  }

  fn parse_word_stmt(&mut self) -> SyntaxResult<Stmt> {
    match self.tok.value.as_str() {
      "var" | "const" => self.parse_var_decl_stmt(),
      "let" => {
        // `let` is contextual; only a declaration when a binding follows.
        let snapshot = self.snapshot();
        self.bump()?;
        let is_decl = matches!(self.tok.tt, TT::Ident | TT::BracketOpen | TT::BraceOpen);
        self.restore(snapshot);
        if is_decl {
          self.parse_var_decl_stmt()
        } else {
          self.parse_expr_stmt()
        }
      }
      "function" => {
        let stmt = self.parse_func_decl(false)?;
        Ok(Stmt::FuncDecl(stmt))
      }
      "async" => {
        let snapshot = self.snapshot();
        self.bump()?;
        if self.at_kw("function") && !self.tok.newline_before {
          let stmt = self.parse_func_decl(true)?;
          Ok(Stmt::FuncDecl(stmt))
        } else {
          self.restore(snapshot);
          self.parse_expr_stmt()
        }
      }
      "class" => {
        let stmt = self.parse_class_decl()?;
        Ok(Stmt::ClassDecl(stmt))
      }
      "if" => self.parse_if_stmt(),
      "for" => self.parse_for_stmt(),
      "while" => self.parse_while_stmt(),
      "do" => self.parse_do_while_stmt(),
      "return" => self.parse_return_stmt(),
      "throw" => self.parse_throw_stmt(),
      "try" => self.parse_try_stmt(),
      "switch" => self.parse_switch_stmt(),
      "break" | "continue" => self.parse_jump_stmt(),
      "with" => self.parse_with_stmt(),
      "debugger" => {
        let loc = self.tok.loc;
        self.bump()?;
        self.semicolon()?;
        Ok(Stmt::Debugger(loc))
      }
      "interface" | "type" | "declare" | "namespace" | "enum" | "abstract" | "module"
        if self.options.dialect.typescript() =>
      {
        self.parse_ts_stmt()
      }
      _ => {
        // Labeled statement?
        let snapshot = self.snapshot();
        let label = self.tok.value.clone();
        let loc = self.tok.loc;
        self.bump()?;
        if self.at(TT::Colon) {
          self.bump()?;
          let body = self.parse_stmt()?;
          Ok(Stmt::Labeled(LabeledStmt {
            loc,
            label,
            body: Box::new(body),
          }))
        } else {
          self.restore(snapshot);
          self.parse_expr_stmt()
        }
      }
    }
  }

  pub(crate) fn parse_block(&mut self) -> SyntaxResult<BlockStmt> {
    let start = self.expect(TT::BraceOpen, "{")?.loc;
    let mut stmts = Vec::new();
    while !self.at(TT::BraceClose) {
      if self.at(TT::Eof) {
        return Err(self.unexpected("}"));
      }
      let stmt = self.parse_stmt()?;
      stmts.push(stmt);
    }
    let end = self.expect(TT::BraceClose, "}")?.loc;
    Ok(BlockStmt {
      loc: start.extend(end),
      scope: None,
      stmts,
    })
  }

  fn parse_expr_stmt(&mut self) -> SyntaxResult<Stmt> {
    let expr = self.parse_expr()?;
    let loc = expr.loc();
    self.semicolon()?;
    Ok(Stmt::Expr(ExprStmt { loc, expr }))
  }

  fn parse_var_decl_stmt(&mut self) -> SyntaxResult<Stmt> {
    let decl = self.parse_var_decl()?;
    self.semicolon()?;
    Ok(Stmt::VarDecl(decl))
  }

  pub(crate) fn parse_var_decl(&mut self) -> SyntaxResult<VarDeclStmt> {
    let loc = self.tok.loc;
    let mode = match self.tok.value.as_str() {
      "var" => VarDeclMode::Var,
      "let" => VarDeclMode::Let,
      "const" => VarDeclMode::Const,
      _ => return Err(self.unexpected("variable declaration")),
    };
    self.bump()?;
    let mut decls = Vec::new();
    loop {
      let pat = self.parse_pat()?;
      self.skip_type_annotation()?;
      let init = if self.eat(TT::Eq)? {
        Some(self.parse_assign()?)
      } else {
        None
      };
      decls.push(VarDeclarator { pat, init });
      if !self.eat(TT::Comma)? {
        break;
      }
    }
    Ok(VarDeclStmt { loc, mode, decls })
  }

  fn parse_if_stmt(&mut self) -> SyntaxResult<Stmt> {
    let loc = self.tok.loc;
    self.bump()?;
    self.expect(TT::ParenOpen, "(")?;
    let test = self.parse_expr()?;
    self.expect(TT::ParenClose, ")")?;
    let cons = Box::new(self.parse_stmt()?);
    let alt = if self.eat_kw("else")? {
      Some(Box::new(self.parse_stmt()?))
    } else {
      None
    };
    Ok(Stmt::If(IfStmt {
      loc,
      test,
      cons,
      alt,
    }))
  }

  fn parse_for_stmt(&mut self) -> SyntaxResult<Stmt> {
    let loc = self.tok.loc;
    self.bump()?;
    self.expect(TT::ParenOpen, "(")?;

    // Empty initializer.
    if self.eat(TT::Semicolon)? {
      return self.parse_c_style_for(loc, ForInit::None);
    }

    if matches!(self.tok.value.as_str(), "var" | "let" | "const") && self.tok.tt == TT::Ident {
      let decl_loc = self.tok.loc;
      let mode = match self.tok.value.as_str() {
        "var" => VarDeclMode::Var,
        "let" => VarDeclMode::Let,
        _ => VarDeclMode::Const,
      };
      self.bump()?;
      let pat = self.parse_pat()?;
      self.skip_type_annotation()?;
      if self.at_kw("in") || self.at_kw("of") {
        let is_of = self.tok.value == "of";
        self.bump()?;
        return self.parse_for_in_of(loc, is_of, ForHead::VarDecl(mode, pat));
      }
      let mut decls = Vec::new();
      let init = if self.eat(TT::Eq)? {
        self.no_in = true;
        let init = self.parse_assign();
        self.no_in = false;
        Some(init?)
      } else {
        None
      };
      decls.push(VarDeclarator { pat, init });
      while self.eat(TT::Comma)? {
        let pat = self.parse_pat()?;
        self.skip_type_annotation()?;
        let init = if self.eat(TT::Eq)? {
          self.no_in = true;
          let init = self.parse_assign();
          self.no_in = false;
          Some(init?)
        } else {
          None
        };
        decls.push(VarDeclarator { pat, init });
      }
      self.expect(TT::Semicolon, ";")?;
      return self.parse_c_style_for(loc, ForInit::VarDecl(VarDeclStmt {
        loc: decl_loc,
        mode,
        decls,
      }));
    }

    self.no_in = true;
    let first = self.parse_expr();
    self.no_in = false;
    let first = first?;
    if self.at_kw("in") || self.at_kw("of") {
      let is_of = self.tok.value == "of";
      self.bump()?;
      return self.parse_for_in_of(loc, is_of, ForHead::Target(first));
    }
    self.expect(TT::Semicolon, ";")?;
    self.parse_c_style_for(loc, ForInit::Expr(first))
  }

  fn parse_c_style_for(&mut self, loc: Loc, init: ForInit) -> SyntaxResult<Stmt> {
    let test = if self.at(TT::Semicolon) {
      None
    } else {
      Some(self.parse_expr()?)
    };
    self.expect(TT::Semicolon, ";")?;
    let update = if self.at(TT::ParenClose) {
      None
    } else {
      Some(self.parse_expr()?)
    };
    self.expect(TT::ParenClose, ")")?;
    let body = Box::new(self.parse_stmt()?);
    Ok(Stmt::For(Box::new(ForStmt {
      loc,
      scope: None,
      init,
      test,
      update,
      body,
    })))
  }

  fn parse_for_in_of(&mut self, loc: Loc, is_of: bool, left: ForHead) -> SyntaxResult<Stmt> {
    let right = self.parse_assign()?;
    self.expect(TT::ParenClose, ")")?;
    let body = Box::new(self.parse_stmt()?);
    Ok(Stmt::ForInOf(Box::new(ForInOfStmt {
      loc,
      scope: None,
      is_of,
      left,
      right,
      body,
    })))
  }

  fn parse_while_stmt(&mut self) -> SyntaxResult<Stmt> {
    let loc = self.tok.loc;
    self.bump()?;
    self.expect(TT::ParenOpen, "(")?;
    let test = self.parse_expr()?;
    self.expect(TT::ParenClose, ")")?;
    let body = Box::new(self.parse_stmt()?);
    Ok(Stmt::While(Box::new(WhileStmt { loc, test, body })))
  }

  fn parse_do_while_stmt(&mut self) -> SyntaxResult<Stmt> {
    let loc = self.tok.loc;
    self.bump()?;
    let body = Box::new(self.parse_stmt()?);
    self.expect_kw("while")?;
    self.expect(TT::ParenOpen, "(")?;
    let test = self.parse_expr()?;
    self.expect(TT::ParenClose, ")")?;
    // The trailing semicolon after do-while is optional.
    if self.at(TT::Semicolon) {
      self.bump()?;
    }
    Ok(Stmt::DoWhile(Box::new(DoWhileStmt { loc, body, test })))
  }

  fn parse_return_stmt(&mut self) -> SyntaxResult<Stmt> {
    let loc = self.tok.loc;
    if self.fn_depth == 0 && self.arrow_depth == 0 {
      if self.options.is_bundling {
        self.has_top_level_return = true;
      } else {
        return Err(SyntaxError::new(SyntaxErrorType::ReturnOutsideFunction, loc));
      }
    }
    self.bump()?;
    let value = if self.at(TT::Semicolon)
      || self.at(TT::BraceClose)
      || self.at(TT::Eof)
      || self.tok.newline_before
    {
      None
    } else {
      Some(self.parse_expr()?)
    };
    self.semicolon()?;
    Ok(Stmt::Return(ReturnStmt { loc, value }))
  }

  fn parse_throw_stmt(&mut self) -> SyntaxResult<Stmt> {
    let loc = self.tok.loc;
    self.bump()?;
    let value = self.parse_expr()?;
    self.semicolon()?;
    Ok(Stmt::Throw(ThrowStmt { loc, value }))
  }

  fn parse_try_stmt(&mut self) -> SyntaxResult<Stmt> {
    let loc = self.tok.loc;
    self.bump()?;
    self.try_depth += 1;
    let block = self.parse_block();
    self.try_depth -= 1;
    let block = block?;
    let catch = if self.at_kw("catch") {
      let catch_loc = self.tok.loc;
      self.bump()?;
      let param = if self.eat(TT::ParenOpen)? {
        let pat = self.parse_pat()?;
        self.skip_type_annotation()?;
        self.expect(TT::ParenClose, ")")?;
        Some(pat)
      } else {
        None
      };
      let body = self.parse_block()?;
      Some(CatchClause {
        loc: catch_loc,
        scope: None,
        param,
        body,
      })
    } else {
      None
    };
    let finally = if self.eat_kw("finally")? {
      Some(self.parse_block()?)
    } else {
      None
    };
    if catch.is_none() && finally.is_none() {
      return Err(SyntaxError::new(
        SyntaxErrorType::TryStatementHasNoCatchOrFinally,
        loc,
      ));
    }
    Ok(Stmt::Try(Box::new(TryStmt {
      loc,
      block,
      catch,
      finally,
    })))
  }

  fn parse_switch_stmt(&mut self) -> SyntaxResult<Stmt> {
    let loc = self.tok.loc;
    self.bump()?;
    self.expect(TT::ParenOpen, "(")?;
    let discriminant = self.parse_expr()?;
    self.expect(TT::ParenClose, ")")?;
    self.expect(TT::BraceOpen, "{")?;
    let mut cases = Vec::new();
    while !self.at(TT::BraceClose) {
      let test = if self.eat_kw("case")? {
        let test = self.parse_expr()?;
        Some(test)
      } else {
        self.expect_kw("default")?;
        None
      };
      self.expect(TT::Colon, ":")?;
      let mut body = Vec::new();
      while !self.at(TT::BraceClose) && !self.at_kw("case") && !self.at_kw("default") {
        body.push(self.parse_stmt()?);
      }
      cases.push(SwitchCase { test, body });
    }
    self.expect(TT::BraceClose, "}")?;
    Ok(Stmt::Switch(SwitchStmt {
      loc,
      scope: None,
      discriminant,
      cases,
    }))
  }

  fn parse_jump_stmt(&mut self) -> SyntaxResult<Stmt> {
    let loc = self.tok.loc;
    let is_break = self.tok.value == "break";
    self.bump()?;
    let label = if self.tok.tt == TT::Ident && !self.tok.newline_before {
      let label = self.tok.value.clone();
      self.bump()?;
      Some(label)
    } else {
      None
    };
    self.semicolon()?;
    let stmt = JumpStmt { loc, label };
    Ok(if is_break {
      Stmt::Break(stmt)
    } else {
      Stmt::Continue(stmt)
    })
  }

  fn parse_with_stmt(&mut self) -> SyntaxResult<Stmt> {
    let loc = self.tok.loc;
    self.bump()?;
    self.expect(TT::ParenOpen, "(")?;
    let object = self.parse_expr()?;
    self.expect(TT::ParenClose, ")")?;
    let body = Box::new(self.parse_stmt()?);
    Ok(Stmt::With(Box::new(WithStmt {
      loc,
      scope: None,
      object,
      body,
    })))
  }

  // ----------------------------------------------------------------------
  // Imports and exports
  // ----------------------------------------------------------------------

  fn parse_import_stmt(&mut self) -> SyntaxResult<Stmt> {
    let loc = self.tok.loc;
    self.bump()?;
    self.has_esm_syntax = true;

    // `import type ...` is erased.
    if self.options.dialect.typescript() && self.at_kw("type") {
      let snapshot = self.snapshot();
      self.bump()?;
      if self.tok.tt == TT::Ident || self.at(TT::BraceOpen) || self.at(TT::Star) {
        self.skip_rest_of_import()?;
        return Ok(Stmt::Empty(loc));
      }
      self.restore(snapshot);
    }

    let mut default = None;
    let mut star = None;
    let mut names = Vec::new();

    if self.at(TT::Str) {
      let specifier = self.tok.value.clone();
      let spec_loc = self.tok.loc;
      self.bump()?;
      self.semicolon()?;
      let record = self.add_record(ImportKind::Stmt, specifier, spec_loc);
      return Ok(Stmt::Import(ImportStmt {
        loc,
        record,
        default,
        star,
        names,
      }));
    }

    if self.tok.tt == TT::Ident && !self.at_kw("from") {
      default = Some(self.expect_name()?);
      if self.eat(TT::Comma)? {
        self.parse_import_clause_tail(&mut star, &mut names)?;
      }
    } else {
      self.parse_import_clause_tail(&mut star, &mut names)?;
    }

    self.expect_kw("from")?;
    if self.tok.tt != TT::Str {
      return Err(self.unexpected("module specifier"));
    }
    let specifier = self.tok.value.clone();
    let spec_loc = self.tok.loc;
    self.bump()?;
    self.semicolon()?;
    let record = self.add_record(ImportKind::Stmt, specifier, spec_loc);
    Ok(Stmt::Import(ImportStmt {
      loc,
      record,
      default,
      star,
      names,
    }))
  }

  fn parse_import_clause_tail(
    &mut self,
    star: &mut Option<Ident>,
    names: &mut Vec<ImportName>,
  ) -> SyntaxResult<()> {
    if self.eat(TT::Star)? {
      self.expect_kw("as")?;
      *star = Some(self.expect_name()?);
      return Ok(());
    }
    self.expect(TT::BraceOpen, "{")?;
    while !self.at(TT::BraceClose) {
      let exported = self.expect_name()?;
      let local = if self.eat_kw("as")? {
        self.expect_name()?
      } else {
        exported.clone()
      };
      names.push(ImportName {
        exported: exported.name,
        local,
      });
      if !self.eat(TT::Comma)? {
        break;
      }
    }
    self.expect(TT::BraceClose, "}")?;
    Ok(())
  }

  fn skip_rest_of_import(&mut self) -> SyntaxResult<()> {
    while !self.at(TT::Eof) && !self.at(TT::Semicolon) {
      if self.at(TT::Str) {
        self.bump()?;
        break;
      }
      self.bump()?;
    }
    if self.at(TT::Semicolon) {
      self.bump()?;
    }
    Ok(())
  }

  fn parse_export_stmt(&mut self, out: &mut Vec<Stmt>) -> SyntaxResult<()> {
    let loc = self.tok.loc;
    self.bump()?;
    self.has_esm_syntax = true;

    if self.options.dialect.typescript()
      && (self.at_kw("interface") || self.at_kw("declare") || self.at_kw("abstract"))
    {
      let stmt = self.parse_ts_stmt()?;
      out.push(stmt);
      return Ok(());
    }
    if self.options.dialect.typescript() && self.at_kw("type") {
      let snapshot = self.snapshot();
      self.bump()?;
      if self.at(TT::BraceOpen) || self.tok.tt == TT::Ident {
        self.skip_rest_of_import()?;
        out.push(Stmt::Empty(loc));
        return Ok(());
      }
      self.restore(snapshot);
    }

    if self.eat(TT::Star)? {
      let alias = if self.eat_kw("as")? {
        Some(self.expect_name()?.name)
      } else {
        None
      };
      self.expect_kw("from")?;
      if self.tok.tt != TT::Str {
        return Err(self.unexpected("module specifier"));
      }
      let specifier = self.tok.value.clone();
      let spec_loc = self.tok.loc;
      self.bump()?;
      self.semicolon()?;
      let record = self.add_record(ImportKind::Stmt, specifier, spec_loc);
      out.push(Stmt::ExportStar(ExportStarStmt { loc, record, alias }));
      return Ok(());
    }

    if self.at(TT::BraceOpen) {
      self.bump()?;
      let mut names = Vec::new();
      while !self.at(TT::BraceClose) {
        let orig = self.expect_name()?;
        let exported = if self.eat_kw("as")? {
          self.expect_name()?.name
        } else {
          orig.name.clone()
        };
        names.push(ExportName { orig, exported });
        if !self.eat(TT::Comma)? {
          break;
        }
      }
      self.expect(TT::BraceClose, "}")?;
      let record = if self.eat_kw("from")? {
        if self.tok.tt != TT::Str {
          return Err(self.unexpected("module specifier"));
        }
        let specifier = self.tok.value.clone();
        let spec_loc = self.tok.loc;
        self.bump()?;
        Some(self.add_record(ImportKind::Stmt, specifier, spec_loc))
      } else {
        None
      };
      self.semicolon()?;
      out.push(Stmt::ExportNamed(ExportNamedStmt { loc, record, names }));
      return Ok(());
    }

    if self.eat_kw("default")? {
      // A named function or class declaration is both hoisted and exported.
      let named_decl = if self.at_kw("function") || (self.at_kw("async") && !self.tok.newline_before)
      {
        let snapshot = self.snapshot();
        let is_async = self.eat_kw("async")?;
        if self.at_kw("function") {
          let snapshot2 = self.snapshot();
          self.bump()?;
          self.eat(TT::Star)?;
          let named = self.tok.tt == TT::Ident;
          self.restore(snapshot2);
          if named {
            let decl = self.parse_func_decl(is_async)?;
            Some((decl.name.clone(), Stmt::FuncDecl(decl)))
          } else {
            self.restore(snapshot);
            None
          }
        } else {
          self.restore(snapshot);
          None
        }
      } else if self.at_kw("class") {
        let snapshot = self.snapshot();
        self.bump()?;
        let named = self.tok.tt == TT::Ident && !self.at_kw("extends");
        self.restore(snapshot);
        if named {
          let decl = self.parse_class_decl()?;
          Some((decl.name.clone(), Stmt::ClassDecl(decl)))
        } else {
          None
        }
      } else {
        None
      };

      match named_decl {
        Some((name, decl)) => {
          out.push(decl);
          out.push(Stmt::ExportNamed(ExportNamedStmt {
            loc,
            record: None,
            names: vec![ExportName {
              orig: name,
              exported: "default".into(),
            }],
          }));
        }
        None => {
          let expr = self.parse_assign()?;
          self.semicolon()?;
          out.push(Stmt::ExportDefault(ExportDefaultStmt {
            loc,
            expr,
            symbol: None,
          }));
        }
      }
      return Ok(());
    }

    // `export <declaration>`.
    let decl = match self.tok.value.as_str() {
      "var" | "let" | "const" => self.parse_var_decl_stmt()?,
      "function" => Stmt::FuncDecl(self.parse_func_decl(false)?),
      "async" => {
        self.bump()?;
        Stmt::FuncDecl(self.parse_func_decl(true)?)
      }
      "class" => Stmt::ClassDecl(self.parse_class_decl()?),
      _ => return Err(self.unexpected("export declaration")),
    };
    out.push(Stmt::ExportDecl(ExportDeclStmt {
      loc,
      decl: Box::new(decl),
    }));
    Ok(())
  }

  // ----------------------------------------------------------------------
  // Functions, classes, patterns
  // ----------------------------------------------------------------------

  fn parse_func_decl(&mut self, is_async: bool) -> SyntaxResult<FuncDeclStmt> {
    let loc = self.tok.loc;
    self.expect_kw("function")?;
    let is_generator = self.eat(TT::Star)?;
    let name = self.expect_name()?;
    let func = self.parse_func_rest(loc, is_async, is_generator)?;
    Ok(FuncDeclStmt { loc, name, func })
  }

  /// Parameters, optional return type, and body of a non-arrow function.
  pub(crate) fn parse_func_rest(
    &mut self,
    loc: Loc,
    is_async: bool,
    is_generator: bool,
  ) -> SyntaxResult<Func> {
    self.skip_type_params()?;
    let params = self.parse_params()?;
    self.skip_return_type()?;
    self.fn_depth += 1;
    let body = self.parse_block();
    self.fn_depth -= 1;
    let body = body?;
    Ok(Func {
      loc,
      is_arrow: false,
      is_async,
      is_generator,
      params,
      body: FuncBody::Block(body.stmts),
      args_scope: None,
      body_scope: None,
    })
  }

  pub(crate) fn parse_params(&mut self) -> SyntaxResult<Vec<Param>> {
    self.expect(TT::ParenOpen, "(")?;
    let mut params = Vec::new();
    while !self.at(TT::ParenClose) {
      let is_rest = self.eat(TT::DotDotDot)?;
      let pat = self.parse_pat_with_default()?;
      params.push(Param { pat, is_rest });
      if !self.eat(TT::Comma)? {
        break;
      }
    }
    self.expect(TT::ParenClose, ")")?;
    Ok(params)
  }

  /// A binding pattern with optional TS annotations and default value.
  pub(crate) fn parse_pat_with_default(&mut self) -> SyntaxResult<Pat> {
    let pat = self.parse_pat()?;
    if self.options.dialect.typescript() {
      // Optional marker.
      self.eat(TT::Question)?;
    }
    self.skip_type_annotation()?;
    if self.eat(TT::Eq)? {
      let default = self.parse_assign()?;
      return Ok(Pat::Assign(Box::new(AssignPat { pat, default })));
    }
    Ok(pat)
  }

  pub(crate) fn parse_pat(&mut self) -> SyntaxResult<Pat> {
    match self.tok.tt {
      TT::Ident => {
        let ident = self.expect_name()?;
        if self.options.dialect.typescript() {
          // Definite assignment marker (`let x!: T`).
          self.eat(TT::Exclaim)?;
        }
        Ok(Pat::Id(ident))
      }
      TT::BracketOpen => {
        let loc = self.tok.loc;
        self.bump()?;
        let mut items = Vec::new();
        let mut rest = None;
        while !self.at(TT::BracketClose) {
          if self.at(TT::Comma) {
            self.bump()?;
            items.push(None);
            continue;
          }
          if self.eat(TT::DotDotDot)? {
            rest = Some(Box::new(self.parse_pat()?));
            break;
          }
          items.push(Some(self.parse_pat_with_default()?));
          if !self.eat(TT::Comma)? {
            break;
          }
        }
        let end = self.expect(TT::BracketClose, "]")?.loc;
        Ok(Pat::Array(ArrayPat {
          loc: loc.extend(end),
          items,
          rest,
        }))
      }
      TT::BraceOpen => {
        let loc = self.tok.loc;
        self.bump()?;
        let mut props = Vec::new();
        let mut rest = None;
        while !self.at(TT::BraceClose) {
          if self.eat(TT::DotDotDot)? {
            rest = Some(Box::new(self.parse_pat()?));
            break;
          }
          let key = self.parse_prop_key()?;
          if self.eat(TT::Colon)? {
            let value = self.parse_pat_with_default()?;
            props.push(ObjectPatProp {
              key,
              value,
              shorthand: false,
            });
          } else {
            let PropKey::Ident(ref name) = key else {
              return Err(self.unexpected(":"));
            };
            let mut value = Pat::Id(Ident::new(loc, name.clone()));
            if self.eat(TT::Eq)? {
              let default = self.parse_assign()?;
              value = Pat::Assign(Box::new(AssignPat {
                pat: value,
                default,
              }));
            }
            props.push(ObjectPatProp {
              key,
              value,
              shorthand: true,
            });
          }
          if !self.eat(TT::Comma)? {
            break;
          }
        }
        let end = self.expect(TT::BraceClose, "}")?.loc;
        Ok(Pat::Object(ObjectPat {
          loc: loc.extend(end),
          props,
          rest,
        }))
      }
      _ => Err(self.unexpected("binding pattern")),
    }
  }

  pub(crate) fn parse_prop_key(&mut self) -> SyntaxResult<PropKey> {
    match self.tok.tt {
      TT::Ident => {
        let name = self.tok.value.clone();
        self.bump()?;
        Ok(PropKey::Ident(name))
      }
      TT::Str => {
        let lit = StrLit {
          loc: self.tok.loc,
          value: self.tok.value.clone(),
        };
        self.bump()?;
        Ok(PropKey::Str(lit))
      }
      TT::Num => {
        let raw = self.tok.value.clone();
        let value = crate::lex::parse_number(&raw).ok_or_else(|| {
          SyntaxError::new(SyntaxErrorType::MalformedLiteralNumber, self.tok.loc)
        })?;
        let lit = NumLit {
          loc: self.tok.loc,
          raw,
          value,
        };
        self.bump()?;
        Ok(PropKey::Num(lit))
      }
      TT::BracketOpen => {
        self.bump()?;
        let expr = self.parse_assign()?;
        self.expect(TT::BracketClose, "]")?;
        Ok(PropKey::Computed(Box::new(expr)))
      }
      _ => Err(self.unexpected("property key")),
    }
  }

  fn parse_class_decl(&mut self) -> SyntaxResult<ClassDeclStmt> {
    let loc = self.tok.loc;
    self.expect_kw("class")?;
    let name = self.expect_name()?;
    let class = self.parse_class_rest(loc)?;
    Ok(ClassDeclStmt { loc, name, class })
  }

  pub(crate) fn parse_class_rest(&mut self, loc: Loc) -> SyntaxResult<Class> {
    self.skip_type_params()?;
    let extends = if self.eat_kw("extends")? {
      let expr = self.parse_lhs_expr()?;
      self.skip_type_args()?;
      Some(Box::new(expr))
    } else {
      None
    };
    if self.options.dialect.typescript() && self.at_kw("implements") {
      self.bump()?;
      loop {
        self.expect_name()?;
        self.skip_type_args()?;
        if !self.eat(TT::Comma)? {
          break;
        }
      }
    }
    self.expect(TT::BraceOpen, "{")?;
    let mut members = Vec::new();
    while !self.at(TT::BraceClose) {
      if self.eat(TT::Semicolon)? {
        continue;
      }
      members.push(self.parse_class_member()?);
    }
    let end = self.expect(TT::BraceClose, "}")?.loc;
    Ok(Class {
      loc: loc.extend(end),
      extends,
      members,
    })
  }

  fn parse_class_member(&mut self) -> SyntaxResult<ClassMember> {
    if self.options.dialect.typescript() {
      while matches!(
        self.tok.value.as_str(),
        "public" | "private" | "protected" | "readonly" | "declare" | "abstract"
      ) && self.tok.tt == TT::Ident
      {
        let snapshot = self.snapshot();
        self.bump()?;
        // A modifier must be followed by another member token, not `(` / `=`.
        if self.at(TT::ParenOpen) || self.at(TT::Eq) || self.at(TT::Semicolon) {
          self.restore(snapshot);
          break;
        }
      }
    }
    let mut is_static = false;
    if self.at_kw("static") {
      let snapshot = self.snapshot();
      self.bump()?;
      if self.at(TT::ParenOpen) || self.at(TT::Eq) {
        self.restore(snapshot);
      } else {
        is_static = true;
      }
    }

    let mut kind = MethodKind::Normal;
    let mut is_async = false;
    let mut is_generator = false;
    if self.at_kw("get") || self.at_kw("set") {
      let accessor = self.tok.value.clone();
      let snapshot = self.snapshot();
      self.bump()?;
      if self.at(TT::ParenOpen) || self.at(TT::Eq) || self.at(TT::Semicolon) {
        self.restore(snapshot);
      } else {
        kind = if accessor == "get" {
          MethodKind::Get
        } else {
          MethodKind::Set
        };
      }
    } else if self.at_kw("async") {
      let snapshot = self.snapshot();
      self.bump()?;
      if self.at(TT::ParenOpen) || self.at(TT::Eq) || self.tok.newline_before {
        self.restore(snapshot);
      } else {
        is_async = true;
      }
    }
    if self.eat(TT::Star)? {
      is_generator = true;
    }

    let key_loc = self.tok.loc;
    let key = self.parse_prop_key()?;
    if self.options.dialect.typescript() {
      self.eat(TT::Question)?;
      self.eat(TT::Exclaim)?;
    }
    if self.at(TT::ParenOpen) || self.at(TT::Lt) {
      let func = {
        self.skip_type_params()?;
        let params = self.parse_params()?;
        self.skip_return_type()?;
        self.fn_depth += 1;
        let body = self.parse_block();
        self.fn_depth -= 1;
        let body = body?;
        Func {
          loc: key_loc,
          is_arrow: false,
          is_async,
          is_generator,
          params,
          body: FuncBody::Block(body.stmts),
          args_scope: None,
          body_scope: None,
        }
      };
      return Ok(ClassMember::Method {
        is_static,
        kind,
        key,
        func,
      });
    }

    self.skip_type_annotation()?;
    let value = if self.eat(TT::Eq)? {
      // Field initializers see the instance, not the module.
      self.fn_depth += 1;
      let value = self.parse_assign();
      self.fn_depth -= 1;
      Some(value?)
    } else {
      None
    };
    self.semicolon()?;
    Ok(ClassMember::Field {
      is_static,
      key,
      value,
    })
  }
}
