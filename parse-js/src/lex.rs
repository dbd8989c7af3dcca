//! Hand-written lexer.
//!
//! The lexer is offset-based and restartable: the parser may snapshot its
//! position and re-lex, which is how `/` vs regex, template substitutions,
//! and JSX text are handled without a token buffer. Keywords are lexed as
//! [`TT::Ident`]; the parser compares the token text.

use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use diagnostics::Loc;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TT {
  Eof,
  Ident,
  Num,
  BigInt,
  Str,
  Regex,
  /// Entire template with no substitutions, or a closing chunk.
  TemplateComplete,
  /// Template chunk ending in `${`.
  TemplateHead,
  ParenOpen,
  ParenClose,
  BracketOpen,
  BracketClose,
  BraceOpen,
  BraceClose,
  Semicolon,
  Comma,
  Dot,
  DotDotDot,
  Arrow,
  Question,
  QuestionDot,
  QuestionQuestion,
  QuestionQuestionEq,
  Colon,
  Plus,
  Minus,
  Star,
  StarStar,
  Slash,
  Percent,
  Amp,
  AmpAmp,
  Bar,
  BarBar,
  Caret,
  Tilde,
  Exclaim,
  Lt,
  Gt,
  Le,
  Ge,
  EqEq,
  EqEqEq,
  NotEq,
  NotEqEq,
  Shl,
  Shr,
  UShr,
  PlusPlus,
  MinusMinus,
  Eq,
  PlusEq,
  MinusEq,
  StarEq,
  StarStarEq,
  SlashEq,
  PercentEq,
  ShlEq,
  ShrEq,
  UShrEq,
  AmpEq,
  BarEq,
  CaretEq,
  AmpAmpEq,
  BarBarEq,
}

#[derive(Clone, Debug)]
pub struct Token {
  pub tt: TT,
  pub loc: Loc,
  pub newline_before: bool,
  /// Ident text, cooked string/template chunk, number/bigint/regex raw.
  pub value: String,
}

impl Token {
  fn new(tt: TT, loc: Loc, newline_before: bool) -> Self {
    Self {
      tt,
      loc,
      newline_before,
      value: String::new(),
    }
  }
}

pub struct Lexer<'a> {
  source: &'a str,
  pos: usize,
}

fn is_ident_start(b: u8) -> bool {
  b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
  b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

impl<'a> Lexer<'a> {
  pub fn new(source: &'a str) -> Self {
    Self { source, pos: 0 }
  }

  pub fn source(&self) -> &'a str {
    self.source
  }

  pub fn pos(&self) -> usize {
    self.pos
  }

  pub fn set_pos(&mut self, pos: usize) {
    self.pos = pos;
  }

  fn bytes(&self) -> &'a [u8] {
    self.source.as_bytes()
  }

  fn peek_at(&self, offset: usize) -> u8 {
    *self.bytes().get(self.pos + offset).unwrap_or(&0)
  }

  fn peek(&self) -> u8 {
    self.peek_at(0)
  }

  /// Consume a `#!` line if the source starts with one.
  pub fn take_hashbang(&mut self) -> Option<String> {
    if self.pos == 0 && self.source.starts_with("#!") {
      let end = self
        .source
        .find('\n')
        .unwrap_or(self.source.len());
      let line = self.source[..end].to_string();
      self.pos = end;
      Some(line)
    } else {
      None
    }
  }

  /// Skip whitespace and comments; true if a line terminator was crossed.
  fn skip_trivia(&mut self) -> bool {
    let mut newline = false;
    loop {
      match self.peek() {
        b' ' | b'\t' | b'\r' | 0x0c | 0x0b => self.pos += 1,
        b'\n' => {
          newline = true;
          self.pos += 1;
        }
        b'/' if self.peek_at(1) == b'/' => {
          while self.pos < self.source.len() && self.peek() != b'\n' {
            self.pos += 1;
          }
        }
        b'/' if self.peek_at(1) == b'*' => {
          self.pos += 2;
          while self.pos < self.source.len() {
            if self.peek() == b'\n' {
              newline = true;
            }
            if self.peek() == b'*' && self.peek_at(1) == b'/' {
              self.pos += 2;
              break;
            }
            self.pos += 1;
          }
        }
        _ => return newline,
      }
    }
  }

  pub fn next_token(&mut self) -> SyntaxResult<Token> {
    let newline_before = self.skip_trivia();
    let start = self.pos;
    if self.pos >= self.source.len() {
      return Ok(Token::new(TT::Eof, Loc(start, start), newline_before));
    }
    let b = self.peek();

    if is_ident_start(b) {
      while is_ident_continue(self.peek()) {
        self.pos += 1;
      }
      let mut tok = Token::new(TT::Ident, Loc(start, self.pos), newline_before);
      tok.value = self.source[start..self.pos].to_string();
      return Ok(tok);
    }

    if b.is_ascii_digit() || (b == b'.' && self.peek_at(1).is_ascii_digit()) {
      return self.lex_number(start, newline_before);
    }

    match b {
      b'"' | b'\'' => self.lex_string(start, newline_before),
      b'`' => self.lex_template(start, newline_before, true),
      _ => self.lex_punct(start, newline_before),
    }
  }

  fn lex_number(&mut self, start: usize, newline_before: bool) -> SyntaxResult<Token> {
    let bytes = self.bytes();
    if self.peek() == b'0' && matches!(self.peek_at(1), b'x' | b'X' | b'o' | b'O' | b'b' | b'B') {
      self.pos += 2;
      while self.peek().is_ascii_alphanumeric() {
        self.pos += 1;
      }
    } else {
      while self.peek().is_ascii_digit() {
        self.pos += 1;
      }
      if self.peek() == b'.' {
        self.pos += 1;
        while self.peek().is_ascii_digit() {
          self.pos += 1;
        }
      }
      if matches!(self.peek(), b'e' | b'E') {
        let mut ahead = self.pos + 1;
        if matches!(*bytes.get(ahead).unwrap_or(&0), b'+' | b'-') {
          ahead += 1;
        }
        if bytes.get(ahead).map_or(false, |c| c.is_ascii_digit()) {
          self.pos = ahead;
          while self.peek().is_ascii_digit() {
            self.pos += 1;
          }
        }
      }
    }
    let tt = if self.peek() == b'n' {
      self.pos += 1;
      TT::BigInt
    } else {
      TT::Num
    };
    if is_ident_start(self.peek()) {
      return Err(SyntaxError::new(
        SyntaxErrorType::MalformedLiteralNumber,
        Loc(start, self.pos + 1),
      ));
    }
    let mut tok = Token::new(tt, Loc(start, self.pos), newline_before);
    tok.value = self.source[start..self.pos].to_string();
    Ok(tok)
  }

  fn lex_string(&mut self, start: usize, newline_before: bool) -> SyntaxResult<Token> {
    let quote = self.peek();
    self.pos += 1;
    let mut value = String::new();
    loop {
      if self.pos >= self.source.len() {
        return Err(SyntaxError::new(
          SyntaxErrorType::UnexpectedEnd,
          Loc(start, self.pos),
        ));
      }
      let b = self.peek();
      if b == quote {
        self.pos += 1;
        break;
      }
      if b == b'\n' {
        return Err(SyntaxError::new(
          SyntaxErrorType::LineTerminatorInString,
          Loc(start, self.pos),
        ));
      }
      if b == b'\\' {
        self.lex_escape(&mut value)?;
      } else {
        let c = self.source[self.pos..].chars().next().unwrap();
        value.push(c);
        self.pos += c.len_utf8();
      }
    }
    let mut tok = Token::new(TT::Str, Loc(start, self.pos), newline_before);
    tok.value = value;
    Ok(tok)
  }

  fn lex_escape(&mut self, value: &mut String) -> SyntaxResult<()> {
    let esc_start = self.pos;
    self.pos += 1;
    let b = self.peek();
    self.pos += 1;
    match b {
      b'n' => value.push('\n'),
      b't' => value.push('\t'),
      b'r' => value.push('\r'),
      b'b' => value.push('\u{8}'),
      b'f' => value.push('\u{c}'),
      b'v' => value.push('\u{b}'),
      b'0' if !self.peek().is_ascii_digit() => value.push('\0'),
      b'\n' => {}
      b'\r' => {
        if self.peek() == b'\n' {
          self.pos += 1;
        }
      }
      b'x' => {
        let hex = self.source.get(self.pos..self.pos + 2).ok_or_else(|| {
          SyntaxError::new(SyntaxErrorType::InvalidCharacterEscape, Loc(esc_start, self.pos))
        })?;
        let code = u32::from_str_radix(hex, 16).map_err(|_| {
          SyntaxError::new(SyntaxErrorType::InvalidCharacterEscape, Loc(esc_start, self.pos))
        })?;
        value.push(char::from_u32(code).unwrap_or('\u{fffd}'));
        self.pos += 2;
      }
      b'u' => {
        if self.peek() == b'{' {
          self.pos += 1;
          let close = self.source[self.pos..].find('}').ok_or_else(|| {
            SyntaxError::new(SyntaxErrorType::InvalidCharacterEscape, Loc(esc_start, self.pos))
          })?;
          let hex = &self.source[self.pos..self.pos + close];
          let code = u32::from_str_radix(hex, 16).map_err(|_| {
            SyntaxError::new(SyntaxErrorType::InvalidCharacterEscape, Loc(esc_start, self.pos))
          })?;
          value.push(char::from_u32(code).unwrap_or('\u{fffd}'));
          self.pos += close + 1;
        } else {
          let hex = self.source.get(self.pos..self.pos + 4).ok_or_else(|| {
            SyntaxError::new(SyntaxErrorType::InvalidCharacterEscape, Loc(esc_start, self.pos))
          })?;
          let code = u32::from_str_radix(hex, 16).map_err(|_| {
            SyntaxError::new(SyntaxErrorType::InvalidCharacterEscape, Loc(esc_start, self.pos))
          })?;
          value.push(char::from_u32(code).unwrap_or('\u{fffd}'));
          self.pos += 4;
        }
      }
      _ => {
        // Identity escape; keep the escaped character.
        let c = self.source[esc_start + 1..].chars().next().ok_or_else(|| {
          SyntaxError::new(SyntaxErrorType::UnexpectedEnd, Loc(esc_start, self.pos))
        })?;
        self.pos = esc_start + 1 + c.len_utf8();
        value.push(c);
      }
    }
    Ok(())
  }

  /// Lex one template chunk starting at `` ` `` (when `initial`) or at the
  /// `}` ending a substitution. Returns `TemplateComplete` when the chunk
  /// ends the template and `TemplateHead` when it ends with `${`.
  pub fn lex_template(
    &mut self,
    start: usize,
    newline_before: bool,
    initial: bool,
  ) -> SyntaxResult<Token> {
    self.pos = start;
    debug_assert!(initial == (self.peek() == b'`'));
    self.pos += 1; // Skip ` or }.
    let mut value = String::new();
    loop {
      if self.pos >= self.source.len() {
        return Err(SyntaxError::new(
          SyntaxErrorType::UnterminatedTemplate,
          Loc(start, self.pos),
        ));
      }
      match self.peek() {
        b'`' => {
          self.pos += 1;
          let mut tok = Token::new(TT::TemplateComplete, Loc(start, self.pos), newline_before);
          tok.value = value;
          return Ok(tok);
        }
        b'$' if self.peek_at(1) == b'{' => {
          self.pos += 2;
          let mut tok = Token::new(TT::TemplateHead, Loc(start, self.pos), newline_before);
          tok.value = value;
          return Ok(tok);
        }
        b'\\' => self.lex_escape(&mut value)?,
        _ => {
          let c = self.source[self.pos..].chars().next().unwrap();
          value.push(c);
          self.pos += c.len_utf8();
        }
      }
    }
  }

  /// Re-lex a `/` or `/=` token at `start` as a regex literal.
  pub fn relex_regex(&mut self, start: usize) -> SyntaxResult<Token> {
    self.pos = start + 1;
    let mut in_class = false;
    loop {
      if self.pos >= self.source.len() || self.peek() == b'\n' {
        return Err(SyntaxError::new(
          SyntaxErrorType::UnterminatedRegex,
          Loc(start, self.pos),
        ));
      }
      match self.peek() {
        b'\\' => self.pos += 2,
        b'[' => {
          in_class = true;
          self.pos += 1;
        }
        b']' => {
          in_class = false;
          self.pos += 1;
        }
        b'/' if !in_class => {
          self.pos += 1;
          break;
        }
        _ => self.pos += 1,
      }
    }
    while is_ident_continue(self.peek()) {
      self.pos += 1;
    }
    let mut tok = Token::new(TT::Regex, Loc(start, self.pos), false);
    tok.value = self.source[start..self.pos].to_string();
    Ok(tok)
  }

  fn lex_punct(&mut self, start: usize, newline_before: bool) -> SyntaxResult<Token> {
    let rest = &self.source[self.pos..];
    // Longest match first.
    static PUNCTS: &[(&str, TT)] = &[
      (">>>=", TT::UShrEq),
      ("...", TT::DotDotDot),
      ("===", TT::EqEqEq),
      ("!==", TT::NotEqEq),
      ("**=", TT::StarStarEq),
      ("<<=", TT::ShlEq),
      (">>=", TT::ShrEq),
      (">>>", TT::UShr),
      ("&&=", TT::AmpAmpEq),
      ("||=", TT::BarBarEq),
      ("??=", TT::QuestionQuestionEq),
      ("=>", TT::Arrow),
      ("==", TT::EqEq),
      ("!=", TT::NotEq),
      ("<=", TT::Le),
      (">=", TT::Ge),
      ("<<", TT::Shl),
      (">>", TT::Shr),
      ("&&", TT::AmpAmp),
      ("||", TT::BarBar),
      ("??", TT::QuestionQuestion),
      ("?.", TT::QuestionDot),
      ("**", TT::StarStar),
      ("++", TT::PlusPlus),
      ("--", TT::MinusMinus),
      ("+=", TT::PlusEq),
      ("-=", TT::MinusEq),
      ("*=", TT::StarEq),
      ("/=", TT::SlashEq),
      ("%=", TT::PercentEq),
      ("&=", TT::AmpEq),
      ("|=", TT::BarEq),
      ("^=", TT::CaretEq),
      ("(", TT::ParenOpen),
      (")", TT::ParenClose),
      ("[", TT::BracketOpen),
      ("]", TT::BracketClose),
      ("{", TT::BraceOpen),
      ("}", TT::BraceClose),
      (";", TT::Semicolon),
      (",", TT::Comma),
      (".", TT::Dot),
      ("?", TT::Question),
      (":", TT::Colon),
      ("+", TT::Plus),
      ("-", TT::Minus),
      ("*", TT::Star),
      ("/", TT::Slash),
      ("%", TT::Percent),
      ("&", TT::Amp),
      ("|", TT::Bar),
      ("^", TT::Caret),
      ("~", TT::Tilde),
      ("!", TT::Exclaim),
      ("<", TT::Lt),
      (">", TT::Gt),
      ("=", TT::Eq),
    ];
    for (text, tt) in PUNCTS {
      if rest.starts_with(text) {
        // `?.5` is a conditional with a number, not optional chaining.
        if *tt == TT::QuestionDot && self.peek_at(2).is_ascii_digit() {
          continue;
        }
        self.pos += text.len();
        return Ok(Token::new(*tt, Loc(start, self.pos), newline_before));
      }
    }
    let c = self.source[self.pos..].chars().next().unwrap();
    Err(SyntaxError::new(
      SyntaxErrorType::UnexpectedToken(c.to_string()),
      Loc(start, start + c.len_utf8()),
    ))
  }

  // ---- JSX raw scanning helpers (driven by the parser) ----

  pub fn jsx_skip_ws(&mut self) {
    while matches!(self.peek(), b' ' | b'\t' | b'\r' | b'\n') {
      self.pos += 1;
    }
  }

  pub fn jsx_peek(&self) -> u8 {
    self.peek()
  }

  pub fn jsx_eat(&mut self, b: u8) -> bool {
    if self.peek() == b {
      self.pos += 1;
      true
    } else {
      false
    }
  }

  /// Scan a JSX name (`div`, `my-tag`, `Foo`), without member access.
  pub fn jsx_name(&mut self) -> Option<String> {
    if !is_ident_start(self.peek()) {
      return None;
    }
    let start = self.pos;
    while is_ident_continue(self.peek()) || self.peek() == b'-' {
      self.pos += 1;
    }
    Some(self.source[start..self.pos].to_string())
  }

  /// A JSX attribute string (no escape processing). Assumes the current
  /// byte is the opening quote.
  pub fn jsx_string(&mut self) -> Option<String> {
    let quote = self.peek();
    if quote != b'"' && quote != b'\'' {
      return None;
    }
    self.pos += 1;
    let start = self.pos;
    while self.pos < self.source.len() && self.peek() != quote {
      self.pos += 1;
    }
    if self.pos >= self.source.len() {
      return None;
    }
    let value = self.source[start..self.pos].to_string();
    self.pos += 1;
    Some(value)
  }

  /// Raw text up to the next `<` or `{`, with JSX whitespace collapsing.
  pub fn jsx_text(&mut self) -> String {
    let start = self.pos;
    while self.pos < self.source.len() && !matches!(self.peek(), b'<' | b'{') {
      self.pos += 1;
    }
    collapse_jsx_text(&self.source[start..self.pos])
  }
}

/// Whitespace runs containing a newline collapse away at the edges and to a
/// single space in the interior, matching JSX semantics.
fn collapse_jsx_text(raw: &str) -> String {
  let mut pieces: Vec<&str> = Vec::new();
  for (i, line) in raw.split('\n').enumerate() {
    let trimmed = if i == 0 { line.trim_end() } else { line.trim() };
    if i == 0 {
      pieces.push(trimmed);
    } else if !trimmed.is_empty() {
      pieces.push(trimmed);
    }
  }
  let joined = pieces
    .into_iter()
    .filter(|p| !p.is_empty())
    .collect::<Vec<_>>()
    .join(" ");
  if !raw.contains('\n') {
    raw.to_string()
  } else {
    joined
  }
}

/// Parse a numeric literal's value from its raw text.
pub fn parse_number(raw: &str) -> Option<f64> {
  let lower = raw.to_ascii_lowercase();
  if let Some(hex) = lower.strip_prefix("0x") {
    return u128::from_str_radix(hex, 16).ok().map(|v| v as f64);
  }
  if let Some(oct) = lower.strip_prefix("0o") {
    return u128::from_str_radix(oct, 8).ok().map(|v| v as f64);
  }
  if let Some(bin) = lower.strip_prefix("0b") {
    return u128::from_str_radix(bin, 2).ok().map(|v| v as f64);
  }
  lower.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn lex_all(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut out = Vec::new();
    loop {
      let tok = lexer.next_token().unwrap();
      let done = tok.tt == TT::Eof;
      out.push(tok);
      if done {
        break;
      }
    }
    out
  }

  #[test]
  fn lexes_idents_and_puncts() {
    let toks = lex_all("const x = a ** b;");
    let tts: Vec<TT> = toks.iter().map(|t| t.tt).collect();
    assert_eq!(tts, vec![
      TT::Ident,
      TT::Ident,
      TT::Eq,
      TT::Ident,
      TT::StarStar,
      TT::Ident,
      TT::Semicolon,
      TT::Eof,
    ]);
    assert_eq!(toks[0].value, "const");
  }

  #[test]
  fn tracks_newline_before() {
    let toks = lex_all("a\nb // c\nd /* x\ny */ e");
    assert!(!toks[0].newline_before);
    assert!(toks[1].newline_before);
    assert!(toks[2].newline_before);
    assert!(toks[3].newline_before);
  }

  #[test]
  fn cooks_string_escapes() {
    let toks = lex_all(r#"'a\nbA\x41\q'"#);
    assert_eq!(toks[0].tt, TT::Str);
    assert_eq!(toks[0].value, "a\nbAAq");
  }

  #[test]
  fn lexes_numbers() {
    let toks = lex_all("123 1.5 .5 0xff 1e3 12n");
    assert_eq!(toks[0].value, "123");
    assert_eq!(toks[2].value, ".5");
    assert_eq!(parse_number(&toks[3].value), Some(255.0));
    assert_eq!(parse_number(&toks[4].value), Some(1000.0));
    assert_eq!(toks[5].tt, TT::BigInt);
  }

  #[test]
  fn template_chunks() {
    let mut lexer = Lexer::new("`a${x}b`");
    let head = lexer.next_token().unwrap();
    assert_eq!(head.tt, TT::TemplateHead);
    assert_eq!(head.value, "a");
    let x = lexer.next_token().unwrap();
    assert_eq!(x.tt, TT::Ident);
    let brace = lexer.next_token().unwrap();
    assert_eq!(brace.tt, TT::BraceClose);
    let tail = lexer.lex_template(brace.loc.0, false, false).unwrap();
    assert_eq!(tail.tt, TT::TemplateComplete);
    assert_eq!(tail.value, "b");
  }

  #[test]
  fn relex_regex_handles_classes() {
    let mut lexer = Lexer::new("/a[/]b/gi");
    let slash = lexer.next_token().unwrap();
    assert_eq!(slash.tt, TT::Slash);
    let regex = lexer.relex_regex(slash.loc.0).unwrap();
    assert_eq!(regex.tt, TT::Regex);
    assert_eq!(regex.value, "/a[/]b/gi");
  }

  #[test]
  fn takes_hashbang() {
    let mut lexer = Lexer::new("#!/usr/bin/env node\nlet x");
    assert_eq!(lexer.take_hashbang().as_deref(), Some("#!/usr/bin/env node"));
    let tok = lexer.next_token().unwrap();
    assert_eq!(tok.value, "let");
  }
}
