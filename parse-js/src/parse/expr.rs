//! Expression parsing, arrow-function disambiguation, and JSX lowering.
//!
//! JSX elements are lowered to factory calls during parsing, before
//! binding, so factory identifiers participate in scope resolution like
//! any other reference.

use crate::ast::*;
use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::parse_number;
use crate::lex::TT;
use crate::parse::Parser;
use crate::ImportKind;
use diagnostics::Loc;

/// `(precedence, op, right associative)`; higher binds tighter.
fn binary_info(tt: TT, word: &str, no_in: bool) -> Option<(u8, BinaryOp, bool)> {
  Some(match tt {
    TT::QuestionQuestion => (1, BinaryOp::Coalesce, false),
    TT::BarBar => (2, BinaryOp::Or, false),
    TT::AmpAmp => (3, BinaryOp::And, false),
    TT::Bar => (4, BinaryOp::BitOr, false),
    TT::Caret => (5, BinaryOp::BitXor, false),
    TT::Amp => (6, BinaryOp::BitAnd, false),
    TT::EqEq => (7, BinaryOp::Eq, false),
    TT::NotEq => (7, BinaryOp::Ne, false),
    TT::EqEqEq => (7, BinaryOp::StrictEq, false),
    TT::NotEqEq => (7, BinaryOp::StrictNe, false),
    TT::Lt => (8, BinaryOp::Lt, false),
    TT::Gt => (8, BinaryOp::Gt, false),
    TT::Le => (8, BinaryOp::Le, false),
    TT::Ge => (8, BinaryOp::Ge, false),
    TT::Ident if word == "instanceof" => (8, BinaryOp::Instanceof, false),
    TT::Ident if word == "in" && !no_in => (8, BinaryOp::In, false),
    TT::Shl => (9, BinaryOp::Shl, false),
    TT::Shr => (9, BinaryOp::Shr, false),
    TT::UShr => (9, BinaryOp::UShr, false),
    TT::Plus => (10, BinaryOp::Add, false),
    TT::Minus => (10, BinaryOp::Sub, false),
    TT::Star => (11, BinaryOp::Mul, false),
    TT::Slash => (11, BinaryOp::Div, false),
    TT::Percent => (11, BinaryOp::Mod, false),
    TT::StarStar => (12, BinaryOp::Exp, true),
    _ => return None,
  })
}

fn assign_info(tt: TT) -> Option<AssignOp> {
  Some(match tt {
    TT::Eq => AssignOp::Assign,
    TT::PlusEq => AssignOp::Add,
    TT::MinusEq => AssignOp::Sub,
    TT::StarEq => AssignOp::Mul,
    TT::SlashEq => AssignOp::Div,
    TT::PercentEq => AssignOp::Mod,
    TT::StarStarEq => AssignOp::Exp,
    TT::ShlEq => AssignOp::Shl,
    TT::ShrEq => AssignOp::Shr,
    TT::UShrEq => AssignOp::UShr,
    TT::AmpEq => AssignOp::BitAnd,
    TT::BarEq => AssignOp::BitOr,
    TT::CaretEq => AssignOp::BitXor,
    TT::AmpAmpEq => AssignOp::And,
    TT::BarBarEq => AssignOp::Or,
    TT::QuestionQuestionEq => AssignOp::Coalesce,
    _ => None?,
  })
}

impl<'a> Parser<'a> {
  /// Sequence (comma) level.
  pub(crate) fn parse_expr(&mut self) -> SyntaxResult<Expr> {
    let first = self.parse_assign()?;
    if !self.at(TT::Comma) {
      return Ok(first);
    }
    let loc = first.loc();
    let mut exprs = vec![first];
    while self.eat(TT::Comma)? {
      exprs.push(self.parse_assign()?);
    }
    let loc = loc.extend(exprs.last().unwrap().loc());
    Ok(Expr::Seq(SeqExpr { loc, exprs }))
  }

  pub(crate) fn parse_assign(&mut self) -> SyntaxResult<Expr> {
    if self.at_kw("yield") {
      return self.parse_yield();
    }
    if let Some(arrow) = self.try_parse_any_arrow()? {
      return Ok(arrow);
    }

    let expr = self.parse_cond()?;
    if let Some(op) = assign_info(self.tok.tt) {
      match expr {
        Expr::Id(_) | Expr::Member(_) | Expr::Index(_) => {}
        _ => {
          return Err(SyntaxError::new(
            SyntaxErrorType::InvalidAssignmentTarget,
            expr.loc(),
          ))
        }
      }
      self.bump()?;
      let value = self.parse_assign()?;
      let loc = expr.loc().extend(value.loc());
      return Ok(Expr::Assign(Box::new(AssignExpr {
        loc,
        op,
        target: expr,
        value,
      })));
    }
    Ok(expr)
  }

  fn parse_yield(&mut self) -> SyntaxResult<Expr> {
    let loc = self.tok.loc;
    self.bump()?;
    let delegate = self.eat(TT::Star)?;
    let has_operand = !(self.at(TT::Semicolon)
      || self.at(TT::ParenClose)
      || self.at(TT::BracketClose)
      || self.at(TT::BraceClose)
      || self.at(TT::Comma)
      || self.at(TT::Colon)
      || self.at(TT::Eof)
      || self.tok.newline_before);
    let expr = if has_operand || delegate {
      Some(self.parse_assign()?)
    } else {
      None
    };
    Ok(Expr::Yield(Box::new(YieldExpr {
      loc,
      delegate,
      expr,
    })))
  }

  fn try_parse_any_arrow(&mut self) -> SyntaxResult<Option<Expr>> {
    if self.at_kw("async") {
      let snapshot = self.snapshot();
      let loc = self.tok.loc;
      self.bump()?;
      if self.tok.tt == TT::Ident && !self.tok.newline_before && !self.at_kw("function") {
        let param = Ident::new(self.tok.loc, self.tok.value.clone());
        self.bump()?;
        if self.at(TT::Arrow) && !self.tok.newline_before {
          self.bump()?;
          let arrow = self.parse_arrow_body(loc, vec![Param {
            pat: Pat::Id(param),
            is_rest: false,
          }], true)?;
          return Ok(Some(arrow));
        }
      } else if self.at(TT::ParenOpen) && !self.tok.newline_before {
        match self.try_parse_paren_arrow(loc, true)? {
          Some(arrow) => return Ok(Some(arrow)),
          None => {
            self.restore(snapshot);
            return Ok(None);
          }
        }
      }
      self.restore(snapshot);
      return Ok(None);
    }

    if self.tok.tt == TT::Ident
      && !matches!(
        self.tok.value.as_str(),
        "this" | "true" | "false" | "null" | "undefined" | "function" | "class" | "new"
          | "typeof" | "void" | "delete" | "await" | "import"
      )
    {
      let snapshot = self.snapshot();
      let loc = self.tok.loc;
      let param = Ident::new(self.tok.loc, self.tok.value.clone());
      self.bump()?;
      if self.at(TT::Arrow) && !self.tok.newline_before {
        self.bump()?;
        let arrow = self.parse_arrow_body(loc, vec![Param {
          pat: Pat::Id(param),
          is_rest: false,
        }], false)?;
        return Ok(Some(arrow));
      }
      self.restore(snapshot);
      return Ok(None);
    }

    if self.at(TT::ParenOpen) {
      let loc = self.tok.loc;
      return self.try_parse_paren_arrow(loc, false);
    }
    Ok(None)
  }

  /// Attempt `(params) [: T] => body`; `None` means "not an arrow" and the
  /// parser state is restored.
  fn try_parse_paren_arrow(&mut self, loc: Loc, is_async: bool) -> SyntaxResult<Option<Expr>> {
    let snapshot = self.snapshot();
    let attempt = (|| -> SyntaxResult<Vec<Param>> {
      let params = self.parse_params()?;
      self.skip_return_type()?;
      if !self.at(TT::Arrow) {
        return Err(self.unexpected("=>"));
      }
      if self.tok.newline_before {
        return Err(SyntaxError::new(
          SyntaxErrorType::LineTerminatorAfterArrowFunctionParameters,
          self.tok.loc,
        ));
      }
      Ok(params)
    })();
    match attempt {
      Ok(params) => {
        self.bump()?; // `=>`
        let arrow = self.parse_arrow_body(loc, params, is_async)?;
        Ok(Some(arrow))
      }
      Err(_) => {
        self.restore(snapshot);
        Ok(None)
      }
    }
  }

  fn parse_arrow_body(
    &mut self,
    loc: Loc,
    params: Vec<Param>,
    is_async: bool,
  ) -> SyntaxResult<Expr> {
    self.arrow_depth += 1;
    let body = if self.at(TT::BraceOpen) {
      self.parse_block().map(|block| FuncBody::Block(block.stmts))
    } else {
      self.parse_assign().map(|expr| FuncBody::Expr(Box::new(expr)))
    };
    self.arrow_depth -= 1;
    let body = body?;
    Ok(Expr::Arrow(Box::new(Func {
      loc,
      is_arrow: true,
      is_async,
      is_generator: false,
      params,
      body,
      args_scope: None,
      body_scope: None,
    })))
  }

  fn parse_cond(&mut self) -> SyntaxResult<Expr> {
    let test = self.parse_binary(1)?;
    if !self.eat(TT::Question)? {
      return Ok(test);
    }
    let cons = self.parse_assign()?;
    self.expect(TT::Colon, ":")?;
    let alt = self.parse_assign()?;
    let loc = test.loc().extend(alt.loc());
    Ok(Expr::Cond(Box::new(CondExpr {
      loc,
      test,
      cons,
      alt,
    })))
  }

  fn parse_binary(&mut self, min_prec: u8) -> SyntaxResult<Expr> {
    let mut left = self.parse_unary()?;
    loop {
      let Some((prec, op, right_assoc)) = binary_info(self.tok.tt, &self.tok.value, self.no_in)
      else {
        return Ok(left);
      };
      if prec < min_prec {
        return Ok(left);
      }
      self.bump()?;
      let next_min = if right_assoc { prec } else { prec + 1 };
      let right = self.parse_binary(next_min)?;
      let loc = left.loc().extend(right.loc());
      left = Expr::Binary(Box::new(BinaryExpr {
        loc,
        op,
        left,
        right,
      }));
    }
  }

  fn parse_unary(&mut self) -> SyntaxResult<Expr> {
    let loc = self.tok.loc;
    let op = match self.tok.tt {
      TT::Exclaim => Some(UnaryOp::Not),
      TT::Tilde => Some(UnaryOp::BitNot),
      TT::Plus => Some(UnaryOp::Pos),
      TT::Minus => Some(UnaryOp::Neg),
      TT::Ident => match self.tok.value.as_str() {
        "typeof" => {
          self.bump()?;
          self.typeof_depth += 1;
          let operand = self.parse_unary();
          self.typeof_depth -= 1;
          let operand = operand?;
          // When bundling, `require` exists: `typeof require` is constant.
          if self.options.is_bundling {
            if let Expr::Id(id) = &operand {
              if id.name == "require" {
                return Ok(Expr::Str(StrLit {
                  loc: loc.extend(operand.loc()),
                  value: "function".into(),
                }));
              }
            }
          }
          return Ok(Expr::Unary(Box::new(UnaryExpr {
            loc: loc.extend(operand.loc()),
            op: UnaryOp::Typeof,
            expr: operand,
          })));
        }
        "void" => Some(UnaryOp::Void),
        "delete" => Some(UnaryOp::Delete),
        "await" => {
          self.bump()?;
          let operand = self.parse_unary()?;
          return Ok(Expr::Await(Box::new(AwaitExpr {
            loc: loc.extend(operand.loc()),
            expr: operand,
          })));
        }
        _ => None,
      },
      TT::PlusPlus | TT::MinusMinus => {
        let inc = self.tok.tt == TT::PlusPlus;
        self.bump()?;
        let operand = self.parse_unary()?;
        return Ok(Expr::Update(Box::new(UpdateExpr {
          loc: loc.extend(operand.loc()),
          prefix: true,
          inc,
          expr: operand,
        })));
      }
      _ => None,
    };
    if let Some(op) = op {
      self.bump()?;
      let operand = self.parse_unary()?;
      return Ok(Expr::Unary(Box::new(UnaryExpr {
        loc: loc.extend(operand.loc()),
        op,
        expr: operand,
      })));
    }
    self.parse_postfix()
  }

  fn parse_postfix(&mut self) -> SyntaxResult<Expr> {
    let expr = self.parse_lhs_expr()?;
    if (self.at(TT::PlusPlus) || self.at(TT::MinusMinus)) && !self.tok.newline_before {
      let inc = self.at(TT::PlusPlus);
      let loc = expr.loc().extend(self.tok.loc);
      self.bump()?;
      return Ok(Expr::Update(Box::new(UpdateExpr {
        loc,
        prefix: false,
        inc,
        expr,
      })));
    }
    Ok(expr)
  }

  pub(crate) fn parse_lhs_expr(&mut self) -> SyntaxResult<Expr> {
    let primary = self.parse_primary()?;
    self.parse_call_chain(primary, true)
  }

  fn parse_call_chain(&mut self, mut expr: Expr, allow_call: bool) -> SyntaxResult<Expr> {
    loop {
      match self.tok.tt {
        TT::Dot => {
          self.bump()?;
          let prop = self.expect_name()?;
          let loc = expr.loc().extend(prop.loc);
          expr = Expr::Member(Box::new(MemberExpr {
            loc,
            obj: expr,
            prop: prop.name,
            optional: false,
          }));
        }
        TT::QuestionDot => {
          self.bump()?;
          if self.at(TT::ParenOpen) && allow_call {
            let (args, end) = self.parse_args()?;
            let loc = expr.loc().extend(end);
            expr = Expr::Call(Box::new(CallExpr {
              loc,
              callee: expr,
              args,
              optional: true,
            }));
          } else if self.at(TT::BracketOpen) {
            self.bump()?;
            let index = self.parse_expr()?;
            let end = self.expect(TT::BracketClose, "]")?.loc;
            let loc = expr.loc().extend(end);
            expr = Expr::Index(Box::new(IndexExpr {
              loc,
              obj: expr,
              index,
              optional: true,
            }));
          } else {
            let prop = self.expect_name()?;
            let loc = expr.loc().extend(prop.loc);
            expr = Expr::Member(Box::new(MemberExpr {
              loc,
              obj: expr,
              prop: prop.name,
              optional: true,
            }));
          }
        }
        TT::BracketOpen => {
          self.bump()?;
          let index = self.parse_expr()?;
          let end = self.expect(TT::BracketClose, "]")?.loc;
          let loc = expr.loc().extend(end);
          expr = Expr::Index(Box::new(IndexExpr {
            loc,
            obj: expr,
            index,
            optional: false,
          }));
        }
        TT::ParenOpen if allow_call => {
          // Static `require("...")` becomes an import record.
          let is_require = matches!(&expr, Expr::Id(id) if id.name == "require")
            && self.options.is_bundling;
          let (args, end) = self.parse_args()?;
          let loc = expr.loc().extend(end);
          if is_require {
            match args.len() {
              1 => {
                if let Some(specifier) = static_string(&args[0]) {
                  let record = self.add_record(ImportKind::Require, specifier, loc);
                  expr = Expr::Require(RequireExpr { loc, record });
                  continue;
                }
                self.add_error(loc, "The argument to require() must be a string literal");
              }
              _ => {
                self.add_error(loc, "The argument to require() must be a string literal");
              }
            }
          }
          expr = Expr::Call(Box::new(CallExpr {
            loc,
            callee: expr,
            args,
            optional: false,
          }));
        }
        TT::TemplateComplete | TT::TemplateHead => {
          return Err(SyntaxError::new(
            SyntaxErrorType::UnsupportedSyntax("Tagged template literal"),
            self.tok.loc,
          ));
        }
        TT::Exclaim
          if self.options.dialect.typescript() && !self.tok.newline_before =>
        {
          // Non-null assertion.
          self.bump()?;
        }
        _ => return Ok(expr),
      }
    }
  }

  fn parse_args(&mut self) -> SyntaxResult<(Vec<Expr>, Loc)> {
    self.expect(TT::ParenOpen, "(")?;
    let mut args = Vec::new();
    while !self.at(TT::ParenClose) {
      if self.at(TT::DotDotDot) {
        let loc = self.tok.loc;
        self.bump()?;
        let expr = self.parse_assign()?;
        args.push(Expr::Spread(Box::new(SpreadExpr {
          loc: loc.extend(expr.loc()),
          expr,
        })));
      } else {
        args.push(self.parse_assign()?);
      }
      if !self.eat(TT::Comma)? {
        break;
      }
    }
    let end = self.expect(TT::ParenClose, ")")?.loc;
    Ok((args, end))
  }

  fn parse_new(&mut self) -> SyntaxResult<Expr> {
    let loc = self.tok.loc;
    self.bump()?;
    if self.at(TT::Dot) {
      return Err(SyntaxError::new(
        SyntaxErrorType::UnsupportedSyntax("new.target"),
        loc,
      ));
    }
    let primary = self.parse_primary()?;
    let callee = self.parse_call_chain(primary, false)?;
    let (args, end) = if self.at(TT::ParenOpen) {
      self.parse_args()?
    } else {
      (Vec::new(), callee.loc())
    };
    let new = Expr::New(Box::new(NewExpr {
      loc: loc.extend(end),
      callee,
      args,
    }));
    self.parse_call_chain(new, true)
  }

  fn parse_primary(&mut self) -> SyntaxResult<Expr> {
    let loc = self.tok.loc;
    match self.tok.tt {
      TT::ParenOpen => {
        self.bump()?;
        let expr = self.parse_expr()?;
        self.expect(TT::ParenClose, ")")?;
        Ok(expr)
      }
      TT::BracketOpen => self.parse_array_literal(),
      TT::BraceOpen => self.parse_object_literal(),
      TT::Str => {
        let lit = StrLit {
          loc,
          value: self.tok.value.clone(),
        };
        self.bump()?;
        Ok(Expr::Str(lit))
      }
      TT::Num => {
        let raw = self.tok.value.clone();
        let value = parse_number(&raw)
          .ok_or_else(|| SyntaxError::new(SyntaxErrorType::MalformedLiteralNumber, loc))?;
        self.bump()?;
        Ok(Expr::Num(NumLit { loc, raw, value }))
      }
      TT::BigInt => {
        let raw = self.tok.value.clone();
        self.bump()?;
        Ok(Expr::BigInt(loc, raw))
      }
      TT::TemplateComplete => {
        let head = self.tok.value.clone();
        self.bump()?;
        Ok(Expr::Template(TemplateLit {
          loc,
          head,
          parts: Vec::new(),
        }))
      }
      TT::TemplateHead => self.parse_template(loc),
      TT::Slash | TT::SlashEq => {
        let tok = self.lexer.relex_regex(loc.0)?;
        let raw = tok.value.clone();
        let regex_loc = tok.loc;
        self.tok = tok;
        self.bump()?;
        Ok(Expr::Regex(regex_loc, raw))
      }
      TT::Lt if self.options.dialect.jsx() => self.parse_jsx_element(),
      TT::Ident => self.parse_word_primary(),
      _ => Err(SyntaxError::new(
        SyntaxErrorType::UnexpectedToken(self.tok.value.clone()),
        loc,
      )),
    }
  }

  fn parse_template(&mut self, loc: Loc) -> SyntaxResult<Expr> {
    let head = self.tok.value.clone();
    self.bump()?;
    let mut parts = Vec::new();
    loop {
      let expr = self.parse_expr()?;
      if !self.at(TT::BraceClose) {
        return Err(self.unexpected("}"));
      }
      let chunk = self.lexer.lex_template(self.tok.loc.0, false, false)?;
      let done = chunk.tt == TT::TemplateComplete;
      parts.push((expr, chunk.value));
      self.bump()?;
      if done {
        let end = chunk.loc;
        return Ok(Expr::Template(TemplateLit {
          loc: loc.extend(end),
          head,
          parts,
        }));
      }
    }
  }

  fn parse_word_primary(&mut self) -> SyntaxResult<Expr> {
    let loc = self.tok.loc;
    match self.tok.value.as_str() {
      "this" => {
        self.bump()?;
        if self.fn_depth == 0 && self.options.is_bundling {
          self.has_module_this = true;
          Ok(Expr::ModuleThis(loc))
        } else {
          Ok(Expr::This(loc))
        }
      }
      "true" | "false" => {
        let value = self.tok.value == "true";
        self.bump()?;
        Ok(Expr::Bool(loc, value))
      }
      "null" => {
        self.bump()?;
        Ok(Expr::Null(loc))
      }
      "undefined" => {
        self.bump()?;
        Ok(Expr::Undefined(loc))
      }
      "function" => {
        self.bump()?;
        let is_generator = self.eat(TT::Star)?;
        let name = if self.tok.tt == TT::Ident {
          Some(self.expect_name()?)
        } else {
          None
        };
        let func = self.parse_func_rest(loc, false, is_generator)?;
        Ok(Expr::Function(Box::new(FuncExpr { loc, name, func })))
      }
      "async" => {
        // `try_parse_any_arrow` already rejected arrows; this is either an
        // async function expression or a plain identifier.
        let snapshot = self.snapshot();
        self.bump()?;
        if self.at_kw("function") && !self.tok.newline_before {
          self.bump()?;
          let is_generator = self.eat(TT::Star)?;
          let name = if self.tok.tt == TT::Ident {
            Some(self.expect_name()?)
          } else {
            None
          };
          let func = self.parse_func_rest(loc, true, is_generator)?;
          Ok(Expr::Function(Box::new(FuncExpr { loc, name, func })))
        } else {
          self.restore(snapshot);
          self.bump()?;
          Ok(Expr::Id(Ident::new(loc, "async")))
        }
      }
      "class" => {
        self.bump()?;
        let name = if self.tok.tt == TT::Ident && !self.at_kw("extends") {
          Some(self.expect_name()?)
        } else {
          None
        };
        let class = self.parse_class_rest(loc)?;
        Ok(Expr::Class(Box::new(ClassExpr { loc, name, class })))
      }
      "new" => self.parse_new(),
      "import" => {
        self.bump()?;
        if self.at(TT::Dot) {
          return Err(SyntaxError::new(
            SyntaxErrorType::UnsupportedSyntax("import.meta"),
            loc,
          ));
        }
        let (args, end) = self.parse_args()?;
        let loc = loc.extend(end);
        if args.len() == 1 {
          if let Some(specifier) = static_string(&args[0]) {
            let record = self.add_record(ImportKind::Dynamic, specifier, loc);
            return Ok(Expr::DynamicImport(Box::new(DynamicImportExpr {
              loc,
              record: Some(record),
              arg: None,
            })));
          }
        }
        self.add_error(loc, "The argument to import() must be a string literal");
        Ok(Expr::DynamicImport(Box::new(DynamicImportExpr {
          loc,
          record: None,
          arg: args.into_iter().next(),
        })))
      }
      "require" if self.options.is_bundling => {
        self.bump()?;
        if self.at(TT::ParenOpen) || self.typeof_depth > 0 {
          // The call chain or `typeof` handles it.
          return Ok(Expr::Id(Ident::new(loc, "require")));
        }
        if self.try_depth > 0 {
          // Feature-detection workaround: a bare `require` reference in a
          // `try` block quietly becomes `null`.
          return Ok(Expr::Null(loc));
        }
        self.add_error(loc, "\"require\" must not be called indirectly");
        Ok(Expr::Id(Ident::new(loc, "require")))
      }
      _ => {
        let name = self.tok.value.clone();
        self.bump()?;
        Ok(Expr::Id(Ident::new(loc, name)))
      }
    }
  }

  fn parse_array_literal(&mut self) -> SyntaxResult<Expr> {
    let loc = self.tok.loc;
    self.bump()?;
    let mut items = Vec::new();
    while !self.at(TT::BracketClose) {
      if self.at(TT::Comma) {
        self.bump()?;
        items.push(None);
        continue;
      }
      if self.at(TT::DotDotDot) {
        let spread_loc = self.tok.loc;
        self.bump()?;
        let expr = self.parse_assign()?;
        items.push(Some(Expr::Spread(Box::new(SpreadExpr {
          loc: spread_loc.extend(expr.loc()),
          expr,
        }))));
      } else {
        items.push(Some(self.parse_assign()?));
      }
      if !self.eat(TT::Comma)? {
        break;
      }
    }
    let end = self.expect(TT::BracketClose, "]")?.loc;
    Ok(Expr::Array(ArrayLit {
      loc: loc.extend(end),
      items,
    }))
  }

  fn parse_object_literal(&mut self) -> SyntaxResult<Expr> {
    let loc = self.tok.loc;
    self.bump()?;
    let mut props = Vec::new();
    while !self.at(TT::BraceClose) {
      props.push(self.parse_object_prop()?);
      if !self.eat(TT::Comma)? {
        break;
      }
    }
    let end = self.expect(TT::BraceClose, "}")?.loc;
    Ok(Expr::Object(ObjectLit {
      loc: loc.extend(end),
      props,
    }))
  }

  fn parse_object_prop(&mut self) -> SyntaxResult<ObjectLitProp> {
    if self.at(TT::DotDotDot) {
      self.bump()?;
      let expr = self.parse_assign()?;
      return Ok(ObjectLitProp::Spread(expr));
    }

    let mut kind = MethodKind::Normal;
    let mut is_async = false;
    if self.at_kw("get") || self.at_kw("set") {
      let accessor = self.tok.value.clone();
      let snapshot = self.snapshot();
      self.bump()?;
      if matches!(
        self.tok.tt,
        TT::Ident | TT::Str | TT::Num | TT::BracketOpen
      ) {
        kind = if accessor == "get" {
          MethodKind::Get
        } else {
          MethodKind::Set
        };
      } else {
        self.restore(snapshot);
      }
    } else if self.at_kw("async") {
      let snapshot = self.snapshot();
      self.bump()?;
      if matches!(
        self.tok.tt,
        TT::Ident | TT::Str | TT::Num | TT::BracketOpen | TT::Star
      ) && !self.tok.newline_before
      {
        is_async = true;
      } else {
        self.restore(snapshot);
      }
    }
    let is_generator = self.eat(TT::Star)?;

    let key_loc = self.tok.loc;
    let key = self.parse_prop_key()?;

    if self.at(TT::ParenOpen) || (kind != MethodKind::Normal) || is_async || is_generator {
      let params = self.parse_params()?;
      self.skip_return_type()?;
      self.fn_depth += 1;
      let body = self.parse_block();
      self.fn_depth -= 1;
      let body = body?;
      return Ok(ObjectLitProp::Method(ObjectMethod {
        kind,
        key,
        func: Func {
          loc: key_loc,
          is_arrow: false,
          is_async,
          is_generator,
          params,
          body: FuncBody::Block(body.stmts),
          args_scope: None,
          body_scope: None,
        },
      }));
    }

    if self.eat(TT::Colon)? {
      let value = self.parse_assign()?;
      return Ok(ObjectLitProp::KeyValue { key, value });
    }

    match key {
      PropKey::Ident(name) => Ok(ObjectLitProp::Shorthand(Ident::new(key_loc, name))),
      _ => Err(self.unexpected(":")),
    }
  }

  // ----------------------------------------------------------------------
  // JSX
  // ----------------------------------------------------------------------

  fn parse_jsx_element(&mut self) -> SyntaxResult<Expr> {
    let loc = self.tok.loc;
    // Lookahead is the `<`; the lexer is positioned right after it.
    let element = self.parse_jsx_after_lt(loc)?;
    self.bump()?;
    Ok(element)
  }

  /// Parse an element whose `<` has already been consumed.
  fn parse_jsx_after_lt(&mut self, loc: Loc) -> SyntaxResult<Expr> {
    self.lexer.jsx_skip_ws();

    // Fragment: `<>children</>`.
    if self.lexer.jsx_eat(b'>') {
      let children = self.parse_jsx_children(loc, None)?;
      let tag = member_chain(loc, &self.options.jsx_fragment.clone());
      return Ok(self.jsx_factory_call(loc, tag, Vec::new(), children));
    }

    let mut parts = Vec::new();
    match self.lexer.jsx_name() {
      Some(name) => parts.push(name),
      None => {
        return Err(SyntaxError::new(
          SyntaxErrorType::ExpectedSyntax("JSX element name"),
          Loc(self.lexer.pos(), self.lexer.pos()),
        ))
      }
    }
    while self.lexer.jsx_eat(b'.') {
      match self.lexer.jsx_name() {
        Some(name) => parts.push(name),
        None => {
          return Err(SyntaxError::new(
            SyntaxErrorType::ExpectedSyntax("JSX member name"),
            Loc(self.lexer.pos(), self.lexer.pos()),
          ))
        }
      }
    }
    let full_name = parts.join(".");

    let mut attrs: Vec<ObjectLitProp> = Vec::new();
    let children;
    loop {
      self.lexer.jsx_skip_ws();
      if self.lexer.jsx_eat(b'/') {
        if !self.lexer.jsx_eat(b'>') {
          return Err(SyntaxError::new(
            SyntaxErrorType::ExpectedToken(">"),
            Loc(self.lexer.pos(), self.lexer.pos()),
          ));
        }
        children = Vec::new();
        break;
      }
      if self.lexer.jsx_eat(b'>') {
        children = self.parse_jsx_children(loc, Some(&full_name))?;
        break;
      }
      if self.lexer.jsx_peek() == b'{' {
        // Spread attribute.
        self.bump()?;
        self.expect(TT::BraceOpen, "{")?;
        self.expect(TT::DotDotDot, "...")?;
        let expr = self.parse_assign()?;
        self.jsx_close_brace()?;
        attrs.push(ObjectLitProp::Spread(expr));
        continue;
      }
      let Some(attr_name) = self.lexer.jsx_name() else {
        return Err(SyntaxError::new(
          SyntaxErrorType::ExpectedSyntax("JSX attribute"),
          Loc(self.lexer.pos(), self.lexer.pos()),
        ));
      };
      let key = if attr_name.contains('-') {
        PropKey::Str(StrLit {
          loc,
          value: attr_name,
        })
      } else {
        PropKey::Ident(attr_name)
      };
      self.lexer.jsx_skip_ws();
      let value = if self.lexer.jsx_eat(b'=') {
        self.lexer.jsx_skip_ws();
        match self.lexer.jsx_peek() {
          b'"' | b'\'' => {
            let value = self.lexer.jsx_string().ok_or_else(|| {
              SyntaxError::new(
                SyntaxErrorType::ExpectedSyntax("JSX attribute value"),
                Loc(self.lexer.pos(), self.lexer.pos()),
              )
            })?;
            Expr::Str(StrLit { loc, value })
          }
          b'{' => {
            self.bump()?;
            self.expect(TT::BraceOpen, "{")?;
            let expr = self.parse_assign()?;
            self.jsx_close_brace()?;
            expr
          }
          _ => {
            return Err(SyntaxError::new(
              SyntaxErrorType::ExpectedSyntax("JSX attribute value"),
              Loc(self.lexer.pos(), self.lexer.pos()),
            ))
          }
        }
      } else {
        Expr::Bool(loc, true)
      };
      attrs.push(ObjectLitProp::KeyValue { key, value });
    }

    let tag = if parts.len() == 1 && is_intrinsic_tag(&parts[0]) {
      Expr::Str(StrLit {
        loc,
        value: parts.into_iter().next().unwrap(),
      })
    } else {
      member_chain(loc, &parts)
    };
    Ok(self.jsx_factory_call(loc, tag, attrs, children))
  }

  /// After an expression inside JSX braces, step back to raw scanning.
  fn jsx_close_brace(&mut self) -> SyntaxResult<()> {
    if !self.at(TT::BraceClose) {
      return Err(self.unexpected("}"));
    }
    self.unlex();
    self.lexer.jsx_eat(b'}');
    Ok(())
  }

  fn parse_jsx_children(
    &mut self,
    loc: Loc,
    expected_name: Option<&str>,
  ) -> SyntaxResult<Vec<Expr>> {
    let mut children = Vec::new();
    loop {
      if self.lexer.pos() >= self.lexer.source().len() {
        return Err(SyntaxError::new(
          SyntaxErrorType::UnexpectedEnd,
          Loc(self.lexer.pos(), self.lexer.pos()),
        ));
      }
      let text = self.lexer.jsx_text();
      if !text.is_empty() {
        children.push(Expr::Str(StrLit { loc, value: text }));
      }
      if self.lexer.jsx_peek() == b'{' {
        self.bump()?;
        self.expect(TT::BraceOpen, "{")?;
        if self.at(TT::BraceClose) {
          // `{}` is an empty expression container.
          self.unlex();
          self.lexer.jsx_eat(b'}');
          continue;
        }
        let expr = self.parse_assign()?;
        self.jsx_close_brace()?;
        children.push(expr);
        continue;
      }
      if self.lexer.jsx_eat(b'<') {
        if self.lexer.jsx_eat(b'/') {
          self.lexer.jsx_skip_ws();
          let mut close_parts = Vec::new();
          while let Some(name) = self.lexer.jsx_name() {
            close_parts.push(name);
            if !self.lexer.jsx_eat(b'.') {
              break;
            }
          }
          let close_name = close_parts.join(".");
          self.lexer.jsx_skip_ws();
          if !self.lexer.jsx_eat(b'>') {
            return Err(SyntaxError::new(
              SyntaxErrorType::ExpectedToken(">"),
              Loc(self.lexer.pos(), self.lexer.pos()),
            ));
          }
          let matches = match expected_name {
            Some(name) => close_name == name,
            None => close_name.is_empty(),
          };
          if !matches {
            return Err(SyntaxError::new(
              SyntaxErrorType::JsxClosingTagMismatch,
              loc,
            ));
          }
          return Ok(children);
        }
        let child = self.parse_jsx_after_lt(loc)?;
        children.push(child);
        continue;
      }
    }
  }

  fn jsx_factory_call(
    &mut self,
    loc: Loc,
    tag: Expr,
    attrs: Vec<ObjectLitProp>,
    children: Vec<Expr>,
  ) -> Expr {
    let props = if attrs.is_empty() {
      Expr::Null(loc)
    } else {
      Expr::Object(ObjectLit { loc, props: attrs })
    };
    let mut args = vec![tag, props];
    args.extend(children);
    let callee = member_chain(loc, &self.options.jsx_factory.clone());
    Expr::Call(Box::new(CallExpr {
      loc,
      callee,
      args,
      optional: false,
    }))
  }
}

fn is_intrinsic_tag(name: &str) -> bool {
  name
    .chars()
    .next()
    .map(|c| c.is_ascii_lowercase())
    .unwrap_or(false)
    || name.contains('-')
}

fn member_chain(loc: Loc, parts: &[String]) -> Expr {
  let mut expr = Expr::Id(Ident::new(loc, parts[0].clone()));
  for part in &parts[1..] {
    expr = Expr::Member(Box::new(MemberExpr {
      loc,
      obj: expr,
      prop: part.clone(),
      optional: false,
    }));
  }
  expr
}

fn static_string(expr: &Expr) -> Option<String> {
  match expr {
    Expr::Str(s) => Some(s.value.clone()),
    Expr::Template(t) if t.parts.is_empty() => Some(t.head.clone()),
    _ => None,
  }
}
