//! The renamer.
//!
//! Flattens every module's top-level scope into one output scope, renames
//! to avoid collisions (numeric suffixes), and optionally minifies
//! identifiers with a per-scope base-54 generator ordered by use count.
//! Symbols pinned by `with` crossings, `arguments`, or direct-eval taint
//! keep their names; the machinery here only has to stay out of their way.

use crate::graph::follow_read;
use crate::graph::ModuleGraph;
use crate::graph::SourceIndex;
use crate::link::LinkOutput;
use ahash::AHashMap;
use ahash::AHashSet;
use parse_js::symbol::Ref;
use parse_js::symbol::ScopeId;
use parse_js::symbol::ScopeTree;
use parse_js::symbol::SymbolId;
use parse_js::symbol::SymbolKind;
use parse_js::Program;
use parse_js::Target;

pub struct RenameMap {
  names: AHashMap<Ref, String>,
}

impl RenameMap {
  /// Final printable name for a symbol reference. Follows link chains to
  /// the canonical symbol; namespace-aliased symbols are the printer's
  /// business and never reach this map.
  pub fn name_of<'a>(&'a self, modules: &'a [Program], r: Ref) -> &'a str {
    let canonical = follow_read(modules, r);
    match self.names.get(&canonical) {
      Some(name) => name,
      None => &modules[canonical.source as usize]
        .symbols
        .get(canonical.symbol)
        .name,
    }
  }

  fn insert(&mut self, r: Ref, name: String) {
    self.names.insert(r, name);
  }
}

/// The reserved-word set is the union across supported targets plus the
/// magic identifiers; a name the generator may never produce.
pub fn reserved_names(target: Target) -> AHashSet<&'static str> {
  let mut set: AHashSet<&'static str> = [
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield", "eval",
    "arguments", "undefined", "NaN", "Infinity",
  ]
  .into_iter()
  .collect();
  if target >= Target::Es2017 {
    set.insert("async");
  }
  set
}

struct NameGenerator {
  counter: usize,
}

impl NameGenerator {
  const FIRST: &'static [u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ$_";
  const REST: &'static [u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ$_0123456789";

  fn new() -> Self {
    Self { counter: 0 }
  }

  fn next_name(&mut self, taken: &dyn Fn(&str) -> bool) -> String {
    loop {
      let name = Self::encode(self.counter);
      self.counter += 1;
      if !taken(&name) {
        return name;
      }
    }
  }

  fn encode(mut n: usize) -> String {
    let mut out = Vec::new();
    out.push(Self::FIRST[n % Self::FIRST.len()]);
    n /= Self::FIRST.len();
    let mut rest = Vec::new();
    while n > 0 {
      rest.push(Self::REST[(n - 1) % Self::REST.len()]);
      n = (n - 1) / Self::REST.len();
    }
    rest.reverse();
    out.extend(rest);
    String::from_utf8(out).expect("alphabet is ASCII")
  }
}

/// Append numeric suffixes until the candidate is free.
fn suffixed(base: &str, taken: &dyn Fn(&str) -> bool) -> String {
  if !taken(base) {
    return base.to_string();
  }
  let mut i = 2usize;
  loop {
    let candidate = format!("{}{}", base, i);
    if !taken(&candidate) {
      return candidate;
    }
    i += 1;
  }
}

pub struct RenameOptions {
  pub minify: bool,
  pub target: Target,
  /// Restrict renaming to one module (non-bundle mode: every output file
  /// is renamed independently).
  pub only: Option<SourceIndex>,
}

pub fn rename(graph: &ModuleGraph, link: &LinkOutput, options: &RenameOptions) -> RenameMap {
  let mut map = RenameMap {
    names: AHashMap::new(),
  };
  let reserved = reserved_names(options.target);
  let included =
    |index: usize| options.only.is_none() || options.only == Some(index as SourceIndex);
  let unbound_names = collect_unbound_names(graph);

  // ----- Top scope: merged module scopes -----

  // Runtime symbols only claim names when their statements will print.
  let printed_helpers = crate::runtime::closure(&link.helpers);

  let mut claimants: Vec<Claimant> = Vec::new();
  for (index, module) in graph.modules.iter().enumerate() {
    if !included(index) {
      continue;
    }
    let is_runtime = Some(index as SourceIndex) == graph.runtime;
    let in_top_scope = if options.minify {
      // Wrapped module bodies live inside closures and are renamed
      // per-closure below.
      is_runtime || !link.metas[index].is_wrapped
    } else {
      true
    };
    if !in_top_scope {
      continue;
    }
    let before = claimants.len();
    collect_scope_claimants(graph, index as SourceIndex, ScopeTree::MODULE, &mut claimants);
    if is_runtime {
      let kept: Vec<Claimant> = claimants
        .drain(before..)
        .filter(|c| printed_helpers.contains(&c.name))
        .collect();
      claimants.extend(kept);
    }
  }

  let mut assigned: AHashSet<String> = AHashSet::new();
  let top_taken = |assigned: &AHashSet<String>, name: &str| {
    reserved.contains(name) || unbound_names.contains(name) || assigned.contains(name)
  };

  if options.minify {
    claimants.sort_by(|a, b| {
      (b.use_count, a.r.source, a.r.symbol).cmp(&(a.use_count, b.r.source, b.r.symbol))
    });
    let mut generator = NameGenerator::new();
    for claimant in &claimants {
      if claimant.pinned {
        assigned.insert(claimant.name.clone());
        continue;
      }
      let name = generator.next_name(&|name| top_taken(&assigned, name));
      assigned.insert(name.clone());
      map.insert(claimant.r, name);
    }
  } else {
    // Group by original name; the highest-priority claimant keeps it.
    let mut groups: AHashMap<&str, Vec<&Claimant>> = AHashMap::new();
    for claimant in &claimants {
      groups
        .entry(claimant.name.as_str())
        .or_default()
        .push(claimant);
    }
    let mut names: Vec<&&str> = groups.keys().collect::<Vec<_>>();
    names.sort();
    let names: Vec<String> = names.into_iter().map(|s| s.to_string()).collect();
    for name in names {
      let mut group = groups.remove(name.as_str()).expect("key from map");
      group.sort_by(|a, b| {
        let a_key = (
          !a.is_runtime,
          !a.pinned,
          u32::MAX - a.use_count,
          a.r.source,
          a.r.symbol,
        );
        let b_key = (
          !b.is_runtime,
          !b.pinned,
          u32::MAX - b.use_count,
          b.r.source,
          b.r.symbol,
        );
        a_key.cmp(&b_key)
      });
      for claimant in group {
        if claimant.pinned {
          assigned.insert(claimant.name.clone());
          continue;
        }
        let final_name = suffixed(&name, &|candidate| top_taken(&assigned, candidate));
        assigned.insert(final_name.clone());
        map.insert(claimant.r, final_name);
      }
    }
  }

  // Names the printer injects into arbitrary scopes (helper calls,
  // wrapper calls, namespace reads) are protected everywhere below.
  let mut protected: AHashSet<String> = AHashSet::new();
  if let Some(runtime_index) = graph.runtime {
    let runtime = &graph.modules[runtime_index as usize];
    for (_, &sym) in runtime.scopes.get(ScopeTree::MODULE).members.iter() {
      protected.insert(
        map
          .name_of(&graph.modules, runtime.symbols.ref_of(sym))
          .to_string(),
      );
    }
  }
  for (index, meta) in link.metas.iter().enumerate() {
    let module = &graph.modules[index];
    if let Some(wrapper) = meta.wrapper_symbol {
      protected.insert(
        map
          .name_of(&graph.modules, module.symbols.ref_of(wrapper))
          .to_string(),
      );
    }
    if !meta.is_wrapped {
      if let Some(ns) = meta.namespace_symbol {
        protected.insert(
          map
            .name_of(&graph.modules, module.symbols.ref_of(ns))
            .to_string(),
        );
      }
    }
  }

  // ----- Nested scopes, per module -----

  for (index, module) in graph.modules.iter().enumerate() {
    if !included(index) {
      continue;
    }
    let meta = &link.metas[index];
    let minify_closure =
      options.minify && meta.is_wrapped && Some(index as SourceIndex) != graph.runtime;
    if minify_closure {
      rename_wrapped_closure(graph, index as SourceIndex, &mut map, &reserved, &protected);
    }
    for scope_id in module.scopes.pre_order() {
      if scope_id == ScopeTree::MODULE {
        continue;
      }
      rename_scope(
        graph,
        index as SourceIndex,
        scope_id,
        options.minify,
        &mut map,
        &reserved,
        &protected,
      );
    }
  }

  map
}

struct Claimant {
  r: Ref,
  name: String,
  use_count: u32,
  pinned: bool,
  is_runtime: bool,
}

fn collect_unbound_names(graph: &ModuleGraph) -> AHashSet<String> {
  let mut out = AHashSet::new();
  for module in &graph.modules {
    for (_, symbol) in module.symbols.iter() {
      if symbol.kind == SymbolKind::Unbound && symbol.use_count > 0 {
        out.insert(symbol.name.clone());
      }
    }
  }
  out
}

/// Does this symbol print under its own name at all?
fn claims_a_name(module: &Program, id: SymbolId) -> bool {
  let symbol = module.symbols.get(id);
  symbol.link.is_none()
    && symbol.namespace_alias.is_none()
    && symbol.kind != SymbolKind::Unbound
    && symbol.kind != SymbolKind::Arguments
}

fn collect_scope_claimants(
  graph: &ModuleGraph,
  source: SourceIndex,
  scope_id: ScopeId,
  out: &mut Vec<Claimant>,
) {
  let module = &graph.modules[source as usize];
  let scope = module.scopes.get(scope_id);
  let is_runtime = Some(source) == graph.runtime;
  let exempt = [module.exports_symbol, module.module_symbol];

  let mut ids: Vec<SymbolId> = scope.members.values().copied().collect();
  ids.extend(scope.generated.iter().copied());
  ids.sort();
  ids.dedup();
  for id in ids {
    if exempt.contains(&Some(id)) {
      continue;
    }
    if !claims_a_name(module, id) {
      continue;
    }
    let symbol = module.symbols.get(id);
    out.push(Claimant {
      r: module.symbols.ref_of(id),
      name: symbol.name.clone(),
      use_count: symbol.use_count,
      pinned: symbol.must_keep_name || scope.eval_tainted,
      is_runtime,
    });
  }
}

/// Final names of outer symbols referenced from within this scope.
fn inherited_finals(
  graph: &ModuleGraph,
  map: &RenameMap,
  source: SourceIndex,
  scope_id: ScopeId,
) -> AHashSet<String> {
  let module = &graph.modules[source as usize];
  let mut out = AHashSet::new();
  for &sym in &module.scopes.get(scope_id).inherited {
    let canonical = follow_read(&graph.modules, module.symbols.ref_of(sym));
    let symbol = &graph.modules[canonical.source as usize]
      .symbols
      .get(canonical.symbol);
    match &symbol.namespace_alias {
      Some(alias) => {
        out.insert(map.name_of(&graph.modules, alias.namespace).to_string());
      }
      None => {
        out.insert(map.name_of(&graph.modules, canonical).to_string());
      }
    }
  }
  out
}

/// Member final names of this scope and all ancestors; generated symbols
/// must not shadow anything visible to them.
fn visible_member_finals(
  graph: &ModuleGraph,
  map: &RenameMap,
  source: SourceIndex,
  scope_id: ScopeId,
) -> AHashSet<String> {
  let module = &graph.modules[source as usize];
  let mut out = AHashSet::new();
  let mut cur = Some(scope_id);
  while let Some(id) = cur {
    let scope = module.scopes.get(id);
    for &sym in scope.members.values() {
      out.insert(
        map
          .name_of(&graph.modules, module.symbols.ref_of(sym))
          .to_string(),
      );
    }
    cur = scope.parent;
  }
  out
}

fn rename_scope(
  graph: &ModuleGraph,
  source: SourceIndex,
  scope_id: ScopeId,
  minify: bool,
  map: &mut RenameMap,
  reserved: &AHashSet<&'static str>,
  protected: &AHashSet<String>,
) {
  let module = &graph.modules[source as usize];
  let scope = module.scopes.get(scope_id);
  if scope.eval_tainted {
    return;
  }

  let forbidden = inherited_finals(graph, map, source, scope_id);

  let mut ids: Vec<SymbolId> = scope.members.values().copied().collect();
  ids.extend(scope.generated.iter().copied());
  ids.sort();
  ids.dedup();

  let mut local_assigned: AHashSet<String> = AHashSet::new();
  // Pinned names are off limits for everything else in the scope.
  for &id in &ids {
    let symbol = module.symbols.get(id);
    if symbol.must_keep_name || symbol.kind == SymbolKind::Arguments {
      local_assigned.insert(symbol.name.clone());
    }
  }

  if minify {
    let mut order: Vec<SymbolId> = ids
      .iter()
      .copied()
      .filter(|&id| claims_a_name(module, id) && !module.symbols.get(id).must_keep_name)
      .collect();
    order.sort_by(|&a, &b| {
      let (ua, ub) = (module.symbols.get(a).use_count, module.symbols.get(b).use_count);
      (ub, a).cmp(&(ua, b))
    });
    let mut generator = NameGenerator::new();
    for id in order {
      let taken = |name: &str| {
        reserved.contains(name)
          || protected.contains(name)
          || forbidden.contains(name)
          || local_assigned.contains(name)
      };
      let name = generator.next_name(&taken);
      local_assigned.insert(name.clone());
      map.insert(module.symbols.ref_of(id), name);
    }
    return;
  }

  for id in ids {
    if !claims_a_name(module, id) {
      continue;
    }
    let symbol = module.symbols.get(id);
    if symbol.must_keep_name {
      continue;
    }
    let extra_visible = if symbol.generated {
      Some(visible_member_finals(graph, map, source, scope_id))
    } else {
      None
    };
    let taken = |name: &str| {
      reserved.contains(name)
        || protected.contains(name)
        || forbidden.contains(name)
        || local_assigned.contains(name)
        || extra_visible
          .as_ref()
          .map(|v| v.contains(name))
          .unwrap_or(false)
    };
    let final_name = suffixed(&symbol.name, &taken);
    local_assigned.insert(final_name.clone());
    if final_name != symbol.name {
      map.insert(module.symbols.ref_of(id), final_name);
    }
  }
}

/// Minify mode: a wrapped module's top-level symbols (and its
/// `exports`/`module` parameters) are renamed within its closure.
fn rename_wrapped_closure(
  graph: &ModuleGraph,
  source: SourceIndex,
  map: &mut RenameMap,
  reserved: &AHashSet<&'static str>,
  protected: &AHashSet<String>,
) {
  let module = &graph.modules[source as usize];
  if module.scopes.get(ScopeTree::MODULE).eval_tainted {
    return;
  }

  // Final names of everything from outside this module referenced within.
  let mut forbidden: AHashSet<String> = AHashSet::new();
  for (id, symbol) in module.symbols.iter() {
    if symbol.kind == SymbolKind::Unbound && symbol.use_count > 0 {
      forbidden.insert(symbol.name.clone());
    }
    if symbol.link.is_some() {
      forbidden.insert(map.name_of(&graph.modules, module.symbols.ref_of(id)).to_string());
    }
    if let Some(alias) = &symbol.namespace_alias {
      forbidden.insert(map.name_of(&graph.modules, alias.namespace).to_string());
    }
  }

  let mut generator = NameGenerator::new();
  let mut local_assigned: AHashSet<String> = AHashSet::new();
  let mut assign = |map: &mut RenameMap, local_assigned: &mut AHashSet<String>,
                    generator: &mut NameGenerator, id: SymbolId| {
    let taken = |name: &str| {
      reserved.contains(name)
        || protected.contains(name)
        || forbidden.contains(name)
        || local_assigned.contains(name)
    };
    let name = generator.next_name(&taken);
    local_assigned.insert(name.clone());
    map.insert(module.symbols.ref_of(id), name);
  };

  // Parameters first, then module-level symbols by use count.
  if let Some(exports) = module.exports_symbol {
    assign(map, &mut local_assigned, &mut generator, exports);
  }
  if let Some(module_sym) = module.module_symbol {
    assign(map, &mut local_assigned, &mut generator, module_sym);
  }

  let scope = module.scopes.get(ScopeTree::MODULE);
  let mut ids: Vec<SymbolId> = scope.members.values().copied().collect();
  ids.extend(scope.generated.iter().copied());
  ids.sort();
  ids.dedup();
  let exempt = [module.exports_symbol, module.module_symbol];
  let mut order: Vec<SymbolId> = ids
    .into_iter()
    .filter(|&id| {
      !exempt.contains(&Some(id))
        && claims_a_name(module, id)
        && !module.symbols.get(id).must_keep_name
    })
    .collect();
  order.sort_by(|&a, &b| {
    let (ua, ub) = (module.symbols.get(a).use_count, module.symbols.get(b).use_count);
    (ub, a).cmp(&(ua, b))
  });
  for id in order {
    assign(map, &mut local_assigned, &mut generator, id);
  }
}
