use diagnostics::Diagnostic;
use diagnostics::Loc;
use std::error::Error;
use std::fmt;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;

/// A stable classification of syntax errors produced by the parser.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum SyntaxErrorType {
  ExpectedSyntax(&'static str),
  ExpectedToken(&'static str),
  InvalidAssignmentTarget,
  InvalidCharacterEscape,
  JsxClosingTagMismatch,
  LineTerminatorAfterArrowFunctionParameters,
  LineTerminatorInString,
  MalformedLiteralNumber,
  ReturnOutsideFunction,
  TryStatementHasNoCatchOrFinally,
  UnexpectedEnd,
  UnexpectedToken(String),
  UnsupportedSyntax(&'static str),
  UnterminatedRegex,
  UnterminatedTemplate,
}

impl SyntaxErrorType {
  pub fn message(&self) -> String {
    match self {
      SyntaxErrorType::ExpectedSyntax(expected) => format!("Expected {}", expected),
      SyntaxErrorType::ExpectedToken(token) => format!("Expected \"{}\"", token),
      SyntaxErrorType::InvalidAssignmentTarget => "Invalid assignment target".into(),
      SyntaxErrorType::InvalidCharacterEscape => "Invalid character escape".into(),
      SyntaxErrorType::JsxClosingTagMismatch => {
        "JSX closing tag does not match opening tag".into()
      }
      SyntaxErrorType::LineTerminatorAfterArrowFunctionParameters => {
        "Line terminator not allowed after arrow function parameters".into()
      }
      SyntaxErrorType::LineTerminatorInString => {
        "Line terminator not allowed in string literal".into()
      }
      SyntaxErrorType::MalformedLiteralNumber => "Malformed number literal".into(),
      SyntaxErrorType::ReturnOutsideFunction => "Return statement outside a function".into(),
      SyntaxErrorType::TryStatementHasNoCatchOrFinally => {
        "Try statement requires a catch or finally block".into()
      }
      SyntaxErrorType::UnexpectedEnd => "Unexpected end of input".into(),
      SyntaxErrorType::UnexpectedToken(token) => format!("Unexpected \"{}\"", token),
      SyntaxErrorType::UnsupportedSyntax(what) => format!("{} is not supported", what),
      SyntaxErrorType::UnterminatedRegex => "Unterminated regular expression".into(),
      SyntaxErrorType::UnterminatedTemplate => "Unterminated template literal".into(),
    }
  }
}

#[derive(Clone)]
pub struct SyntaxError {
  pub typ: SyntaxErrorType,
  pub loc: Loc,
}

impl SyntaxError {
  pub fn new(typ: SyntaxErrorType, loc: Loc) -> SyntaxError {
    SyntaxError { typ, loc }
  }

  /// Convert into a user-facing [`Diagnostic`] attributed to `path`.
  pub fn to_diagnostic(&self, path: &str) -> Diagnostic {
    Diagnostic::error(path, self.loc, self.typ.message())
  }
}

impl Debug for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{} around loc [{}:{}]", self, self.loc.0, self.loc.1)
  }
}

impl Display for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    f.write_str(&self.typ.message())
  }
}

impl Error for SyntaxError {}

pub type SyntaxResult<T> = Result<T, SyntaxError>;
