//! AST node types.
//!
//! Nodes are plain structs with public fields. Identifier nodes carry the
//! [`SymbolId`] the binder resolved them to; scope-introducing nodes carry
//! the [`ScopeId`] the binder created for them so later passes can walk the
//! tree without re-running name resolution.

use crate::symbol::ScopeId;
use crate::symbol::SymbolId;
use diagnostics::Loc;

#[derive(Debug)]
pub struct TopLevel {
  pub hashbang: Option<String>,
  pub stmts: Vec<Stmt>,
}

#[derive(Clone, Debug)]
pub struct Ident {
  pub loc: Loc,
  pub name: String,
  pub symbol: Option<SymbolId>,
}

impl Ident {
  pub fn new(loc: Loc, name: impl Into<String>) -> Self {
    Self {
      loc,
      name: name.into(),
      symbol: None,
    }
  }
}

#[derive(Clone, Debug)]
pub struct StrLit {
  pub loc: Loc,
  pub value: String,
}

#[derive(Clone, Debug)]
pub struct NumLit {
  pub loc: Loc,
  pub raw: String,
  pub value: f64,
}

// ------------------------------------------------------------------------
// Statements
// ------------------------------------------------------------------------

#[derive(Debug)]
pub enum Stmt {
  Block(BlockStmt),
  VarDecl(VarDeclStmt),
  FuncDecl(FuncDeclStmt),
  ClassDecl(ClassDeclStmt),
  Expr(ExprStmt),
  If(IfStmt),
  For(Box<ForStmt>),
  ForInOf(Box<ForInOfStmt>),
  While(Box<WhileStmt>),
  DoWhile(Box<DoWhileStmt>),
  Return(ReturnStmt),
  Throw(ThrowStmt),
  Try(Box<TryStmt>),
  Switch(SwitchStmt),
  Break(JumpStmt),
  Continue(JumpStmt),
  Labeled(LabeledStmt),
  With(Box<WithStmt>),
  Debugger(Loc),
  Empty(Loc),
  Import(ImportStmt),
  ExportNamed(ExportNamedStmt),
  ExportStar(ExportStarStmt),
  ExportDefault(ExportDefaultStmt),
  ExportDecl(ExportDeclStmt),
}

#[derive(Debug)]
pub struct BlockStmt {
  pub loc: Loc,
  pub scope: Option<ScopeId>,
  pub stmts: Vec<Stmt>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VarDeclMode {
  Var,
  Let,
  Const,
}

impl VarDeclMode {
  pub const fn as_str(&self) -> &'static str {
    match self {
      VarDeclMode::Var => "var",
      VarDeclMode::Let => "let",
      VarDeclMode::Const => "const",
    }
  }
}

#[derive(Debug)]
pub struct VarDeclStmt {
  pub loc: Loc,
  pub mode: VarDeclMode,
  pub decls: Vec<VarDeclarator>,
}

#[derive(Debug)]
pub struct VarDeclarator {
  pub pat: Pat,
  pub init: Option<Expr>,
}

#[derive(Debug)]
pub struct FuncDeclStmt {
  pub loc: Loc,
  pub name: Ident,
  pub func: Func,
}

#[derive(Debug)]
pub struct ClassDeclStmt {
  pub loc: Loc,
  pub name: Ident,
  pub class: Class,
}

#[derive(Debug)]
pub struct ExprStmt {
  pub loc: Loc,
  pub expr: Expr,
}

#[derive(Debug)]
pub struct IfStmt {
  pub loc: Loc,
  pub test: Expr,
  pub cons: Box<Stmt>,
  pub alt: Option<Box<Stmt>>,
}

#[derive(Debug)]
pub enum ForInit {
  None,
  VarDecl(VarDeclStmt),
  Expr(Expr),
}

#[derive(Debug)]
pub struct ForStmt {
  pub loc: Loc,
  pub scope: Option<ScopeId>,
  pub init: ForInit,
  pub test: Option<Expr>,
  pub update: Option<Expr>,
  pub body: Box<Stmt>,
}

#[derive(Debug)]
pub enum ForHead {
  VarDecl(VarDeclMode, Pat),
  Target(Expr),
}

#[derive(Debug)]
pub struct ForInOfStmt {
  pub loc: Loc,
  pub scope: Option<ScopeId>,
  pub is_of: bool,
  pub left: ForHead,
  pub right: Expr,
  pub body: Box<Stmt>,
}

#[derive(Debug)]
pub struct WhileStmt {
  pub loc: Loc,
  pub test: Expr,
  pub body: Box<Stmt>,
}

#[derive(Debug)]
pub struct DoWhileStmt {
  pub loc: Loc,
  pub body: Box<Stmt>,
  pub test: Expr,
}

#[derive(Debug)]
pub struct ReturnStmt {
  pub loc: Loc,
  pub value: Option<Expr>,
}

#[derive(Debug)]
pub struct ThrowStmt {
  pub loc: Loc,
  pub value: Expr,
}

#[derive(Debug)]
pub struct TryStmt {
  pub loc: Loc,
  pub block: BlockStmt,
  pub catch: Option<CatchClause>,
  pub finally: Option<BlockStmt>,
}

#[derive(Debug)]
pub struct CatchClause {
  pub loc: Loc,
  pub scope: Option<ScopeId>,
  pub param: Option<Pat>,
  pub body: BlockStmt,
}

#[derive(Debug)]
pub struct SwitchStmt {
  pub loc: Loc,
  pub scope: Option<ScopeId>,
  pub discriminant: Expr,
  pub cases: Vec<SwitchCase>,
}

#[derive(Debug)]
pub struct SwitchCase {
  pub test: Option<Expr>,
  pub body: Vec<Stmt>,
}

#[derive(Debug)]
pub struct JumpStmt {
  pub loc: Loc,
  pub label: Option<String>,
}

#[derive(Debug)]
pub struct LabeledStmt {
  pub loc: Loc,
  pub label: String,
  pub body: Box<Stmt>,
}

#[derive(Debug)]
pub struct WithStmt {
  pub loc: Loc,
  pub scope: Option<ScopeId>,
  pub object: Expr,
  pub body: Box<Stmt>,
}

#[derive(Debug)]
pub struct ImportStmt {
  pub loc: Loc,
  pub record: u32,
  pub default: Option<Ident>,
  pub star: Option<Ident>,
  pub names: Vec<ImportName>,
}

#[derive(Debug)]
pub struct ImportName {
  /// Name in the exporting module.
  pub exported: String,
  pub local: Ident,
}

#[derive(Debug)]
pub struct ExportNamedStmt {
  pub loc: Loc,
  /// `Some` for `export {..} from '..'`.
  pub record: Option<u32>,
  pub names: Vec<ExportName>,
}

#[derive(Debug)]
pub struct ExportName {
  /// Local binding (record is `None`) or source-module name (record is
  /// `Some`; the symbol stays unresolved).
  pub orig: Ident,
  pub exported: String,
}

#[derive(Debug)]
pub struct ExportStarStmt {
  pub loc: Loc,
  pub record: u32,
  /// `Some` for `export * as ns from '..'`.
  pub alias: Option<String>,
}

#[derive(Debug)]
pub struct ExportDefaultStmt {
  pub loc: Loc,
  pub expr: Expr,
  /// Symbol named `default` bound to the expression's value.
  pub symbol: Option<SymbolId>,
}

#[derive(Debug)]
pub struct ExportDeclStmt {
  pub loc: Loc,
  pub decl: Box<Stmt>,
}

// ------------------------------------------------------------------------
// Patterns
// ------------------------------------------------------------------------

#[derive(Debug)]
pub enum Pat {
  Id(Ident),
  Array(ArrayPat),
  Object(ObjectPat),
  Assign(Box<AssignPat>),
}

#[derive(Debug)]
pub struct ArrayPat {
  pub loc: Loc,
  pub items: Vec<Option<Pat>>,
  pub rest: Option<Box<Pat>>,
}

#[derive(Debug)]
pub struct ObjectPat {
  pub loc: Loc,
  pub props: Vec<ObjectPatProp>,
  pub rest: Option<Box<Pat>>,
}

#[derive(Debug)]
pub struct ObjectPatProp {
  pub key: PropKey,
  pub value: Pat,
  pub shorthand: bool,
}

#[derive(Debug)]
pub struct AssignPat {
  pub pat: Pat,
  pub default: Expr,
}

#[derive(Debug)]
pub enum PropKey {
  Ident(String),
  Str(StrLit),
  Num(NumLit),
  Computed(Box<Expr>),
}

// ------------------------------------------------------------------------
// Expressions
// ------------------------------------------------------------------------

#[derive(Debug)]
pub enum Expr {
  Id(Ident),
  This(Loc),
  /// Top-level `this` of a bundled module; prints as the module's exports
  /// object when the module is CommonJS, `void 0` when it is ESM.
  ModuleThis(Loc),
  Null(Loc),
  Undefined(Loc),
  Bool(Loc, bool),
  Num(NumLit),
  BigInt(Loc, String),
  Str(StrLit),
  Regex(Loc, String),
  Template(TemplateLit),
  Array(ArrayLit),
  Object(ObjectLit),
  Function(Box<FuncExpr>),
  Arrow(Box<Func>),
  Class(Box<ClassExpr>),
  Unary(Box<UnaryExpr>),
  Update(Box<UpdateExpr>),
  Binary(Box<BinaryExpr>),
  Assign(Box<AssignExpr>),
  Cond(Box<CondExpr>),
  Seq(SeqExpr),
  Call(Box<CallExpr>),
  New(Box<NewExpr>),
  Member(Box<MemberExpr>),
  Index(Box<IndexExpr>),
  Spread(Box<SpreadExpr>),
  Require(RequireExpr),
  DynamicImport(Box<DynamicImportExpr>),
  Await(Box<AwaitExpr>),
  Yield(Box<YieldExpr>),
}

impl Expr {
  pub fn loc(&self) -> Loc {
    match self {
      Expr::Id(x) => x.loc,
      Expr::This(loc)
      | Expr::ModuleThis(loc)
      | Expr::Null(loc)
      | Expr::Undefined(loc)
      | Expr::Bool(loc, _)
      | Expr::BigInt(loc, _)
      | Expr::Regex(loc, _) => *loc,
      Expr::Num(x) => x.loc,
      Expr::Str(x) => x.loc,
      Expr::Template(x) => x.loc,
      Expr::Array(x) => x.loc,
      Expr::Object(x) => x.loc,
      Expr::Function(x) => x.loc,
      Expr::Arrow(x) => x.loc,
      Expr::Class(x) => x.loc,
      Expr::Unary(x) => x.loc,
      Expr::Update(x) => x.loc,
      Expr::Binary(x) => x.loc,
      Expr::Assign(x) => x.loc,
      Expr::Cond(x) => x.loc,
      Expr::Seq(x) => x.loc,
      Expr::Call(x) => x.loc,
      Expr::New(x) => x.loc,
      Expr::Member(x) => x.loc,
      Expr::Index(x) => x.loc,
      Expr::Spread(x) => x.loc,
      Expr::Require(x) => x.loc,
      Expr::DynamicImport(x) => x.loc,
      Expr::Await(x) => x.loc,
      Expr::Yield(x) => x.loc,
    }
  }
}

#[derive(Debug)]
pub struct TemplateLit {
  pub loc: Loc,
  pub head: String,
  /// `(substitution, following chunk)` pairs.
  pub parts: Vec<(Expr, String)>,
}

#[derive(Debug)]
pub struct ArrayLit {
  pub loc: Loc,
  /// `None` is an elision hole.
  pub items: Vec<Option<Expr>>,
}

#[derive(Debug)]
pub struct ObjectLit {
  pub loc: Loc,
  pub props: Vec<ObjectLitProp>,
}

#[derive(Debug)]
pub enum ObjectLitProp {
  KeyValue { key: PropKey, value: Expr },
  Shorthand(Ident),
  Method(ObjectMethod),
  Spread(Expr),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MethodKind {
  Normal,
  Get,
  Set,
}

#[derive(Debug)]
pub struct ObjectMethod {
  pub kind: MethodKind,
  pub key: PropKey,
  pub func: Func,
}

#[derive(Debug)]
pub struct FuncExpr {
  pub loc: Loc,
  pub name: Option<Ident>,
  pub func: Func,
}

#[derive(Debug)]
pub struct ClassExpr {
  pub loc: Loc,
  pub name: Option<Ident>,
  pub class: Class,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UnaryOp {
  Typeof,
  Void,
  Delete,
  Not,
  BitNot,
  Neg,
  Pos,
}

impl UnaryOp {
  pub const fn as_str(&self) -> &'static str {
    match self {
      UnaryOp::Typeof => "typeof",
      UnaryOp::Void => "void",
      UnaryOp::Delete => "delete",
      UnaryOp::Not => "!",
      UnaryOp::BitNot => "~",
      UnaryOp::Neg => "-",
      UnaryOp::Pos => "+",
    }
  }
}

#[derive(Debug)]
pub struct UnaryExpr {
  pub loc: Loc,
  pub op: UnaryOp,
  pub expr: Expr,
}

#[derive(Debug)]
pub struct UpdateExpr {
  pub loc: Loc,
  pub prefix: bool,
  pub inc: bool,
  pub expr: Expr,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
  Mod,
  Exp,
  Lt,
  Gt,
  Le,
  Ge,
  Eq,
  Ne,
  StrictEq,
  StrictNe,
  Shl,
  Shr,
  UShr,
  BitAnd,
  BitOr,
  BitXor,
  In,
  Instanceof,
  And,
  Or,
  Coalesce,
}

impl BinaryOp {
  pub const fn as_str(&self) -> &'static str {
    match self {
      BinaryOp::Add => "+",
      BinaryOp::Sub => "-",
      BinaryOp::Mul => "*",
      BinaryOp::Div => "/",
      BinaryOp::Mod => "%",
      BinaryOp::Exp => "**",
      BinaryOp::Lt => "<",
      BinaryOp::Gt => ">",
      BinaryOp::Le => "<=",
      BinaryOp::Ge => ">=",
      BinaryOp::Eq => "==",
      BinaryOp::Ne => "!=",
      BinaryOp::StrictEq => "===",
      BinaryOp::StrictNe => "!==",
      BinaryOp::Shl => "<<",
      BinaryOp::Shr => ">>",
      BinaryOp::UShr => ">>>",
      BinaryOp::BitAnd => "&",
      BinaryOp::BitOr => "|",
      BinaryOp::BitXor => "^",
      BinaryOp::In => "in",
      BinaryOp::Instanceof => "instanceof",
      BinaryOp::And => "&&",
      BinaryOp::Or => "||",
      BinaryOp::Coalesce => "??",
    }
  }
}

#[derive(Debug)]
pub struct BinaryExpr {
  pub loc: Loc,
  pub op: BinaryOp,
  pub left: Expr,
  pub right: Expr,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AssignOp {
  Assign,
  Add,
  Sub,
  Mul,
  Div,
  Mod,
  Exp,
  Shl,
  Shr,
  UShr,
  BitAnd,
  BitOr,
  BitXor,
  And,
  Or,
  Coalesce,
}

impl AssignOp {
  pub const fn as_str(&self) -> &'static str {
    match self {
      AssignOp::Assign => "=",
      AssignOp::Add => "+=",
      AssignOp::Sub => "-=",
      AssignOp::Mul => "*=",
      AssignOp::Div => "/=",
      AssignOp::Mod => "%=",
      AssignOp::Exp => "**=",
      AssignOp::Shl => "<<=",
      AssignOp::Shr => ">>=",
      AssignOp::UShr => ">>>=",
      AssignOp::BitAnd => "&=",
      AssignOp::BitOr => "|=",
      AssignOp::BitXor => "^=",
      AssignOp::And => "&&=",
      AssignOp::Or => "||=",
      AssignOp::Coalesce => "??=",
    }
  }
}

#[derive(Debug)]
pub struct AssignExpr {
  pub loc: Loc,
  pub op: AssignOp,
  pub target: Expr,
  pub value: Expr,
}

#[derive(Debug)]
pub struct CondExpr {
  pub loc: Loc,
  pub test: Expr,
  pub cons: Expr,
  pub alt: Expr,
}

#[derive(Debug)]
pub struct SeqExpr {
  pub loc: Loc,
  pub exprs: Vec<Expr>,
}

#[derive(Debug)]
pub struct CallExpr {
  pub loc: Loc,
  pub callee: Expr,
  pub args: Vec<Expr>,
  pub optional: bool,
}

#[derive(Debug)]
pub struct NewExpr {
  pub loc: Loc,
  pub callee: Expr,
  pub args: Vec<Expr>,
}

#[derive(Debug)]
pub struct MemberExpr {
  pub loc: Loc,
  pub obj: Expr,
  pub prop: String,
  pub optional: bool,
}

#[derive(Debug)]
pub struct IndexExpr {
  pub loc: Loc,
  pub obj: Expr,
  pub index: Expr,
  pub optional: bool,
}

#[derive(Debug)]
pub struct SpreadExpr {
  pub loc: Loc,
  pub expr: Expr,
}

#[derive(Debug)]
pub struct RequireExpr {
  pub loc: Loc,
  pub record: u32,
}

#[derive(Debug)]
pub struct DynamicImportExpr {
  pub loc: Loc,
  /// `Some` when the argument was a string literal.
  pub record: Option<u32>,
  /// `Some` when it was not (printed verbatim).
  pub arg: Option<Expr>,
}

#[derive(Debug)]
pub struct AwaitExpr {
  pub loc: Loc,
  pub expr: Expr,
}

#[derive(Debug)]
pub struct YieldExpr {
  pub loc: Loc,
  pub delegate: bool,
  pub expr: Option<Expr>,
}

// ------------------------------------------------------------------------
// Functions and classes
// ------------------------------------------------------------------------

#[derive(Debug)]
pub struct Func {
  pub loc: Loc,
  pub is_arrow: bool,
  pub is_async: bool,
  pub is_generator: bool,
  pub params: Vec<Param>,
  pub body: FuncBody,
  pub args_scope: Option<ScopeId>,
  pub body_scope: Option<ScopeId>,
}

#[derive(Debug)]
pub struct Param {
  pub pat: Pat,
  pub is_rest: bool,
}

#[derive(Debug)]
pub enum FuncBody {
  Block(Vec<Stmt>),
  Expr(Box<Expr>),
}

#[derive(Debug)]
pub struct Class {
  pub loc: Loc,
  pub extends: Option<Box<Expr>>,
  pub members: Vec<ClassMember>,
}

#[derive(Debug)]
pub enum ClassMember {
  Method {
    is_static: bool,
    kind: MethodKind,
    key: PropKey,
    func: Func,
  },
  Field {
    is_static: bool,
    key: PropKey,
    value: Option<Expr>,
  },
}
