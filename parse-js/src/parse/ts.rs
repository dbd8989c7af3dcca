//! TypeScript erasure.
//!
//! Types never reach the AST: annotations are skipped at parse time with a
//! tolerant, bracket-balanced scanner. Enums, namespaces, and decorators
//! are outside the supported subset and fail with an explicit error.

use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::TT;
use crate::ast::Stmt;
use crate::parse::Parser;

impl<'a> Parser<'a> {
  /// `: T` after a binding, parameter, or class field.
  pub(crate) fn skip_type_annotation(&mut self) -> SyntaxResult<()> {
    if !self.options.dialect.typescript() {
      return Ok(());
    }
    if self.eat(TT::Colon)? {
      self.skip_type(true)?;
    }
    Ok(())
  }

  /// `: T` before a function body; `=>` is not consumed here so arrow
  /// bodies are left intact (function-typed return types must be
  /// parenthesized).
  pub(crate) fn skip_return_type(&mut self) -> SyntaxResult<()> {
    if !self.options.dialect.typescript() {
      return Ok(());
    }
    if self.eat(TT::Colon)? {
      self.skip_type(false)?;
    }
    Ok(())
  }

  pub(crate) fn skip_type_params(&mut self) -> SyntaxResult<()> {
    if !self.options.dialect.typescript() {
      return Ok(());
    }
    self.skip_type_args()
  }

  /// Skip a balanced `<...>` group if present. `>>`/`>>>` tokens close
  /// multiple levels.
  pub(crate) fn skip_type_args(&mut self) -> SyntaxResult<()> {
    if !self.options.dialect.typescript() || !self.at(TT::Lt) {
      return Ok(());
    }
    let mut depth: i32 = 0;
    loop {
      match self.tok.tt {
        TT::Eof => return Err(self.unexpected(">")),
        TT::Lt | TT::Shl => depth += if self.tok.tt == TT::Shl { 2 } else { 1 },
        TT::Gt => depth -= 1,
        TT::Shr => depth -= 2,
        TT::UShr => depth -= 3,
        _ => {}
      }
      self.bump()?;
      if depth <= 0 {
        return Ok(());
      }
    }
  }

  fn skip_type(&mut self, allow_arrow: bool) -> SyntaxResult<()> {
    self.skip_type_atom()?;
    loop {
      match self.tok.tt {
        TT::Bar | TT::Amp => {
          self.bump()?;
          self.skip_type_atom()?;
        }
        TT::Dot => {
          self.bump()?;
          self.expect_name()?;
        }
        TT::BracketOpen => {
          self.bump()?;
          if !self.at(TT::BracketClose) {
            self.skip_type(true)?;
          }
          self.expect(TT::BracketClose, "]")?;
        }
        TT::Lt => self.skip_type_args()?,
        TT::Arrow if allow_arrow => {
          self.bump()?;
          self.skip_type(allow_arrow)?;
        }
        TT::Ident if self.tok.value == "is" => {
          self.bump()?;
          self.skip_type(allow_arrow)?;
        }
        TT::Ident if self.tok.value == "extends" => {
          // Conditional type.
          self.bump()?;
          self.skip_type(false)?;
          self.expect(TT::Question, "?")?;
          self.skip_type(true)?;
          self.expect(TT::Colon, ":")?;
          self.skip_type(true)?;
        }
        _ => return Ok(()),
      }
    }
  }

  fn skip_type_atom(&mut self) -> SyntaxResult<()> {
    match self.tok.tt {
      TT::ParenOpen => self.skip_balanced(TT::ParenOpen, TT::ParenClose),
      TT::BraceOpen => self.skip_balanced(TT::BraceOpen, TT::BraceClose),
      TT::BracketOpen => self.skip_balanced(TT::BracketOpen, TT::BracketClose),
      TT::Str | TT::Num | TT::BigInt => self.bump(),
      TT::Minus => {
        self.bump()?;
        self.expect(TT::Num, "number")?;
        Ok(())
      }
      TT::Ident => match self.tok.value.as_str() {
        "typeof" | "keyof" | "readonly" | "infer" | "unique" => {
          self.bump()?;
          self.skip_type_atom()
        }
        "new" => {
          self.bump()?;
          self.skip_balanced(TT::ParenOpen, TT::ParenClose)?;
          self.expect(TT::Arrow, "=>")?;
          self.skip_type(true)
        }
        _ => {
          self.bump()?;
          Ok(())
        }
      },
      _ => Err(self.unexpected("type")),
    }
  }

  fn skip_balanced(&mut self, open: TT, close: TT) -> SyntaxResult<()> {
    let mut depth = 0usize;
    loop {
      if self.at(TT::Eof) {
        return Err(self.unexpected("matching close bracket"));
      }
      if self.at(open) {
        depth += 1;
      } else if self.at(close) {
        depth -= 1;
      }
      self.bump()?;
      if depth == 0 {
        return Ok(());
      }
    }
  }

  /// A statement starting with a TS declaration keyword. Falls back to an
  /// expression statement when the keyword is used as a plain identifier.
  pub(crate) fn parse_ts_stmt(&mut self) -> SyntaxResult<Stmt> {
    let loc = self.tok.loc;
    let word = self.tok.value.clone();
    let snapshot = self.snapshot();
    self.bump()?;
    match word.as_str() {
      "interface" => {
        if self.tok.tt != TT::Ident || self.tok.newline_before {
          self.restore(snapshot);
          return self.parse_expr_stmt();
        }
        self.expect_name()?;
        self.skip_type_params()?;
        if self.eat_kw("extends")? {
          loop {
            self.skip_type(false)?;
            if !self.eat(TT::Comma)? {
              break;
            }
          }
        }
        self.skip_balanced(TT::BraceOpen, TT::BraceClose)?;
        Ok(Stmt::Empty(loc))
      }
      "type" => {
        if self.tok.tt != TT::Ident || self.tok.newline_before {
          self.restore(snapshot);
          return self.parse_expr_stmt();
        }
        self.expect_name()?;
        self.skip_type_params()?;
        self.expect(TT::Eq, "=")?;
        self.skip_type(true)?;
        self.semicolon()?;
        Ok(Stmt::Empty(loc))
      }
      "declare" => {
        let next_is_decl = self.tok.tt == TT::Ident
          && matches!(
            self.tok.value.as_str(),
            "const" | "let" | "var" | "function" | "class" | "module" | "namespace" | "global"
              | "abstract" | "enum" | "interface" | "type"
          );
        if !next_is_decl {
          self.restore(snapshot);
          return self.parse_expr_stmt();
        }
        self.skip_ts_declaration()?;
        Ok(Stmt::Empty(loc))
      }
      "abstract" => {
        if self.at_kw("class") {
          let stmt = self.parse_stmt()?;
          Ok(stmt)
        } else {
          self.restore(snapshot);
          self.parse_expr_stmt()
        }
      }
      "enum" | "namespace" | "module" => {
        let is_decl = (self.tok.tt == TT::Ident || self.tok.tt == TT::Str)
          && !self.tok.newline_before
          && word != "module";
        let is_module_decl = word == "module" && self.tok.tt == TT::Str;
        if is_decl || is_module_decl {
          Err(SyntaxError::new(
            SyntaxErrorType::UnsupportedSyntax("TypeScript enum/namespace"),
            loc,
          ))
        } else {
          self.restore(snapshot);
          self.parse_expr_stmt()
        }
      }
      _ => {
        self.restore(snapshot);
        self.parse_expr_stmt()
      }
    }
  }

  /// Consume one ambient declaration without interpreting it.
  fn skip_ts_declaration(&mut self) -> SyntaxResult<()> {
    let mut depth = 0usize;
    loop {
      match self.tok.tt {
        TT::Eof => return Ok(()),
        TT::BraceOpen => {
          depth += 1;
          self.bump()?;
        }
        TT::BraceClose => {
          depth -= 1;
          self.bump()?;
          if depth == 0 {
            return Ok(());
          }
        }
        TT::Semicolon if depth == 0 => {
          self.bump()?;
          return Ok(());
        }
        _ => {
          if depth == 0 && self.tok.newline_before {
            return Ok(());
          }
          self.bump()?;
        }
      }
    }
  }
}
