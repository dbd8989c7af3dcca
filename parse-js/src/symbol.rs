//! Symbols and lexical scopes.
//!
//! Every module owns one [`SymbolTable`] and one [`ScopeTree`]. Cross-module
//! identity is a [`Ref`] (source index plus symbol index); the linker unions
//! symbols across modules by setting [`Symbol::link`], and name resolution
//! follows link chains to the canonical symbol. Link chains are acyclic by
//! construction (the linker only ever links an import binding to a symbol in
//! another module's table).

use ahash::AHashMap;
use ahash::AHashSet;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

/// A symbol in a specific module's table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct Ref {
  pub source: u32,
  pub symbol: SymbolId,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SymbolKind {
  /// A free reference that resolved to no declaration (e.g. `console`).
  Unbound,
  /// `var` binding.
  Hoisted,
  /// Function declaration (hoisted like `var`).
  HoistedFunction,
  /// `let`, `const`, `class`, catch parameter, function expression name.
  Declared,
  /// ESM import binding.
  Import,
  /// The implicit `arguments` object of a non-arrow function.
  Arguments,
}

/// Directs the printer to emit `<namespace>.<alias>` instead of the symbol
/// itself. Used for named imports from CommonJS modules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamespaceAlias {
  pub namespace: Ref,
  pub alias: String,
}

#[derive(Clone, Debug)]
pub struct Symbol {
  pub name: String,
  pub kind: SymbolKind,
  pub use_count: u32,
  /// Union-find forwarding pointer; the chain terminus is canonical.
  pub link: Option<Ref>,
  pub namespace_alias: Option<NamespaceAlias>,
  /// Renaming would change observable behavior (`with` crossing,
  /// `arguments`, eval-reachable bindings are handled via scope taint).
  pub must_keep_name: bool,
  /// Synthesized by lowering or linking; always renamed away from any
  /// colliding visible name.
  pub generated: bool,
}

impl Symbol {
  pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
    Self {
      name: name.into(),
      kind,
      use_count: 0,
      link: None,
      namespace_alias: None,
      must_keep_name: false,
      generated: false,
    }
  }
}

#[derive(Debug)]
pub struct SymbolTable {
  pub source: u32,
  symbols: Vec<Symbol>,
  unbound: AHashMap<String, SymbolId>,
}

impl SymbolTable {
  pub fn new(source: u32) -> Self {
    Self {
      source,
      symbols: Vec::new(),
      unbound: AHashMap::new(),
    }
  }

  pub fn create(&mut self, name: impl Into<String>, kind: SymbolKind) -> SymbolId {
    let id = SymbolId(self.symbols.len() as u32);
    self.symbols.push(Symbol::new(name, kind));
    id
  }

  /// One shared `Unbound` symbol per free name.
  pub fn unbound(&mut self, name: &str) -> SymbolId {
    if let Some(&id) = self.unbound.get(name) {
      return id;
    }
    let id = self.create(name, SymbolKind::Unbound);
    self.unbound.insert(name.to_string(), id);
    id
  }

  pub fn get(&self, id: SymbolId) -> &Symbol {
    &self.symbols[id.0 as usize]
  }

  pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
    &mut self.symbols[id.0 as usize]
  }

  pub fn ref_of(&self, id: SymbolId) -> Ref {
    Ref {
      source: self.source,
      symbol: id,
    }
  }

  pub fn len(&self) -> usize {
    self.symbols.len()
  }

  pub fn is_empty(&self) -> bool {
    self.symbols.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
    self
      .symbols
      .iter()
      .enumerate()
      .map(|(i, s)| (SymbolId(i as u32), s))
  }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ScopeKind {
  Module,
  /// Holds parameters and the implicit `arguments`; parent of the body.
  FunctionArgs,
  /// Hoisting target for `var` and function declarations.
  FunctionBody,
  Block,
  With,
}

#[derive(Debug)]
pub struct Scope {
  pub kind: ScopeKind,
  pub parent: Option<ScopeId>,
  pub children: Vec<ScopeId>,
  pub members: AHashMap<String, SymbolId>,
  /// Symbols synthesized by lowering that print inside this scope but are
  /// invisible to name lookup.
  pub generated: Vec<SymbolId>,
  /// Module-local symbols declared in an enclosing scope and referenced
  /// from this scope or one of its descendants.
  pub inherited: AHashSet<SymbolId>,
  pub is_arrow: bool,
  /// A direct `eval` call occurs in this scope or one nested below it, so
  /// every binding declared here is observable by evaluated code.
  pub eval_tainted: bool,
}

#[derive(Debug)]
pub struct ScopeTree {
  scopes: Vec<Scope>,
}

impl ScopeTree {
  pub const MODULE: ScopeId = ScopeId(0);

  pub fn new() -> Self {
    Self {
      scopes: vec![Scope {
        kind: ScopeKind::Module,
        parent: None,
        children: Vec::new(),
        members: AHashMap::new(),
        generated: Vec::new(),
        inherited: AHashSet::new(),
        is_arrow: false,
        eval_tainted: false,
      }],
    }
  }

  pub fn add(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
    let id = ScopeId(self.scopes.len() as u32);
    self.scopes.push(Scope {
      kind,
      parent: Some(parent),
      children: Vec::new(),
      members: AHashMap::new(),
      generated: Vec::new(),
      inherited: AHashSet::new(),
      is_arrow: false,
      eval_tainted: false,
    });
    self.scopes[parent.0 as usize].children.push(id);
    id
  }

  pub fn get(&self, id: ScopeId) -> &Scope {
    &self.scopes[id.0 as usize]
  }

  pub fn get_mut(&mut self, id: ScopeId) -> &mut Scope {
    &mut self.scopes[id.0 as usize]
  }

  pub fn len(&self) -> usize {
    self.scopes.len()
  }

  pub fn is_empty(&self) -> bool {
    false
  }

  /// The nearest enclosing scope (including `from`) that `var` and function
  /// declarations bind in.
  pub fn hoist_target(&self, from: ScopeId) -> ScopeId {
    let mut cur = from;
    loop {
      let scope = self.get(cur);
      match scope.kind {
        ScopeKind::Module | ScopeKind::FunctionBody => return cur,
        _ => cur = scope.parent.expect("non-root scope has a parent"),
      }
    }
  }

  /// Resolve `name` starting at `from`, returning the declaring scope too.
  pub fn lookup(&self, from: ScopeId, name: &str) -> Option<(ScopeId, SymbolId)> {
    let mut cur = Some(from);
    while let Some(id) = cur {
      let scope = self.get(id);
      if let Some(&symbol) = scope.members.get(name) {
        return Some((id, symbol));
      }
      cur = scope.parent;
    }
    None
  }

  /// Pre-order traversal ids (parents before children).
  pub fn pre_order(&self) -> Vec<ScopeId> {
    let mut out = Vec::with_capacity(self.scopes.len());
    let mut stack = vec![Self::MODULE];
    while let Some(id) = stack.pop() {
      out.push(id);
      let scope = self.get(id);
      for &child in scope.children.iter().rev() {
        stack.push(child);
      }
    }
    out
  }
}

impl Default for ScopeTree {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hoist_target_skips_blocks_and_with() {
    let mut tree = ScopeTree::new();
    let args = tree.add(ScopeTree::MODULE, ScopeKind::FunctionArgs);
    let body = tree.add(args, ScopeKind::FunctionBody);
    let block = tree.add(body, ScopeKind::Block);
    let with = tree.add(block, ScopeKind::With);
    assert_eq!(tree.hoist_target(with), body);
    assert_eq!(tree.hoist_target(block), body);
    assert_eq!(tree.hoist_target(ScopeTree::MODULE), ScopeTree::MODULE);
  }

  #[test]
  fn lookup_walks_parents() {
    let mut tree = ScopeTree::new();
    let mut table = SymbolTable::new(0);
    let sym = table.create("x", SymbolKind::Declared);
    tree
      .get_mut(ScopeTree::MODULE)
      .members
      .insert("x".into(), sym);
    let block = tree.add(ScopeTree::MODULE, ScopeKind::Block);
    assert_eq!(tree.lookup(block, "x"), Some((ScopeTree::MODULE, sym)));
    assert_eq!(tree.lookup(block, "y"), None);
  }

  #[test]
  fn unbound_symbols_are_shared_per_name() {
    let mut table = SymbolTable::new(3);
    let a = table.unbound("console");
    let b = table.unbound("console");
    assert_eq!(a, b);
    assert_eq!(table.get(a).kind, SymbolKind::Unbound);
    assert_eq!(table.ref_of(a).source, 3);
  }
}
