//! The linker.
//!
//! Resolves every import site to a defining symbol across the module
//! graph, decides which modules are wrapped in deferred-execution
//! closures, synthesizes namespace objects and CommonJS interop
//! bindings, detects export cycles, and records which runtime helpers
//! the bundle needs. Wrap state grows monotonically: a module never
//! becomes unwrapped once a condition forces wrapping.

use crate::fs;
use crate::graph::ModuleGraph;
use crate::graph::SourceIndex;
use crate::runtime;
use ahash::AHashSet;
use diagnostics::DeferLog;
use parse_js::symbol::Ref;
use parse_js::symbol::SymbolId;
use parse_js::symbol::SymbolKind;
use parse_js::ExportsKind;
use parse_js::ImportKind;
use parse_js::NamedExport;
use std::collections::BTreeMap;
use tracing::debug;

/// Where an exported name ultimately points.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ExportTarget {
  /// A concrete symbol (possibly carrying a namespace alias).
  Sym(Ref),
  /// A member read off a namespace object (CommonJS interop).
  NsMember(Ref, String),
  /// The namespace object of an inline ESM module.
  Namespace(SourceIndex),
}

#[derive(Clone, Debug)]
pub struct InteropRecord {
  pub record: u32,
  pub namespace_symbol: SymbolId,
}

#[derive(Default, Debug)]
pub struct ModuleMeta {
  pub is_wrapped: bool,
  /// `require_<base>`, in this module's own table (inline output mode).
  pub wrapper_symbol: Option<SymbolId>,
  /// Namespace object symbol. For wrapped modules this is the module's
  /// `exports` symbol; for inline ESM it is a synthesized `var`.
  pub namespace_symbol: Option<SymbolId>,
  /// Print a namespace object (`__export`) for this module.
  pub needs_namespace_object: bool,
  /// Effective ESM exports including `export *` closure, sorted by name.
  pub resolved_exports: BTreeMap<String, ExportTarget>,
  /// Interop statements this module (as importer) prints before its body:
  /// `const <ns> = __toModule(<require>)`, one per import record.
  pub interop: Vec<InteropRecord>,
}

pub struct LinkOutput {
  pub metas: Vec<ModuleMeta>,
  pub helpers: AHashSet<String>,
  /// Entries that must be emitted through the `bootstrap` dispatch.
  pub bootstrap_entries: AHashSet<SourceIndex>,
}

enum Lookup {
  Found(ExportTarget),
  NotFound,
  Cycle,
}

pub fn link(graph: &mut ModuleGraph, log: &DeferLog) -> LinkOutput {
  let mut linker = Linker {
    graph,
    metas: Vec::new(),
    helpers: AHashSet::new(),
    log,
  };
  linker.run()
}

struct Linker<'a> {
  graph: &'a mut ModuleGraph,
  metas: Vec<ModuleMeta>,
  helpers: AHashSet<String>,
  log: &'a DeferLog,
}

impl<'a> Linker<'a> {
  fn run(mut self) -> LinkOutput {
    let count = self.graph.modules.len();
    self.metas = (0..count).map(|_| ModuleMeta::default()).collect();

    self.compute_wrapped_modules();
    self.create_wrapper_symbols();
    self.check_export_stars();
    self.create_stmt_interops();
    self.resolve_module_exports();
    self.bind_imports();
    self.attach_namespace_needs();
    self.link_lowering_helpers();

    let bootstrap_entries = self.decide_bootstrap();
    self.record_helper_needs(&bootstrap_entries);

    debug!(
      wrapped = self.metas.iter().filter(|m| m.is_wrapped).count(),
      helpers = self.helpers.len(),
      "link complete"
    );

    LinkOutput {
      metas: self.metas,
      helpers: self.helpers,
      bootstrap_entries,
    }
  }

  fn is_runtime(&self, index: SourceIndex) -> bool {
    self.graph.runtime == Some(index)
  }

  /// Spec wrap conditions, run to a (monotone) fixpoint.
  fn compute_wrapped_modules(&mut self) {
    for index in 0..self.graph.modules.len() {
      if self.is_runtime(index as SourceIndex) {
        continue;
      }
      let module = &self.graph.modules[index];
      // Entries with exports need their own exports object, so they wrap
      // (and are emitted through `bootstrap`).
      let entry_with_exports = self.graph.entries.contains(&(index as SourceIndex))
        && (!module.named_exports.is_empty() || !module.export_stars.is_empty());
      let wrap = module.exports_kind == ExportsKind::CommonJs
        || module.uses_exports_object()
        || module.uses_module_object()
        || module.has_top_level_return
        || module.has_module_this
        || entry_with_exports;
      self.metas[index].is_wrapped = wrap;
    }

    loop {
      let mut changed = false;
      for index in 0..self.graph.modules.len() {
        for record in &self.graph.modules[index].import_records {
          let Some(target) = record.source_index else {
            continue;
          };
          if record.kind == ImportKind::Dynamic && !self.metas[target as usize].is_wrapped {
            self.metas[target as usize].is_wrapped = true;
            changed = true;
          }
        }
      }
      if !changed {
        break;
      }
    }

    // Promotion is monotone: None -> CommonJS when forced to wrap.
    for index in 0..self.graph.modules.len() {
      if self.metas[index].is_wrapped
        && self.graph.modules[index].exports_kind == ExportsKind::None
      {
        self.graph.modules[index].exports_kind = ExportsKind::CommonJs;
      }
    }
  }

  fn create_wrapper_symbols(&mut self) {
    for index in 0..self.graph.modules.len() {
      if !self.metas[index].is_wrapped {
        continue;
      }
      let base = sanitize_ident(fs::base_without_ext(&self.graph.sources[index].abs_path));
      let name = format!("require_{}", base);
      let module = &mut self.graph.modules[index];
      let symbol = module.symbols.create(&name, SymbolKind::Hoisted);
      module.symbols.get_mut(symbol).generated = true;
      module
        .scopes
        .get_mut(parse_js::symbol::ScopeTree::MODULE)
        .generated
        .push(symbol);
      self.metas[index].wrapper_symbol = Some(symbol);

      // Wrapped modules expose themselves through their exports object.
      self.metas[index].namespace_symbol = module.exports_symbol;
    }
  }

  fn check_export_stars(&mut self) {
    for index in 0..self.graph.modules.len() {
      let path = self.graph.sources[index].abs_path.clone();
      let stars: Vec<(u32, diagnostics::Loc)> = self.graph.modules[index]
        .export_stars
        .iter()
        .map(|&record| {
          let r = &self.graph.modules[index].import_records[record as usize];
          (record, r.loc)
        })
        .collect();
      for (record, loc) in stars {
        let r = &self.graph.modules[index].import_records[record as usize];
        if r.source_index == Some(index as SourceIndex) {
          continue; // `export * from <self>` is a no-op.
        }
        let target_is_cjs = r.is_external
          || r
            .source_index
            .map(|t| self.graph.modules[t as usize].exports_kind == ExportsKind::CommonJs)
            .unwrap_or(false);
        if target_is_cjs {
          self.log.add_error(
            &path,
            loc,
            "Wildcard exports are not supported for this module",
          );
        }
      }
    }
  }

  /// Effective exports for every module with ESM exports.
  fn resolve_module_exports(&mut self) {
    for index in 0..self.graph.modules.len() {
      if self.is_runtime(index as SourceIndex) {
        continue;
      }
      let names: Vec<String> = self.graph.modules[index].named_exports.keys().cloned().collect();
      let path = self.graph.sources[index].abs_path.clone();
      for name in names {
        let entry = self.graph.modules[index].named_exports.get(&name).cloned();
        let Some(entry) = entry else { continue };
        let mut visited = AHashSet::new();
        visited.insert((index as SourceIndex, name.clone()));
        let (result, cited_name) = match &entry {
          NamedExport::Local(sym) => (
            Lookup::Found(ExportTarget::Sym(Ref {
              source: index as SourceIndex,
              symbol: *sym,
            })),
            name.clone(),
          ),
          NamedExport::ReExport {
            record,
            source_name,
          } => (
            self.lookup_through_record(index as SourceIndex, *record, source_name, &mut visited),
            source_name.clone(),
          ),
          NamedExport::NamespaceReExport { record } => (
            self.lookup_namespace_of_record(index as SourceIndex, *record),
            name.clone(),
          ),
        };
        match result {
          Lookup::Found(target) => {
            self.metas[index].resolved_exports.insert(name, target);
          }
          Lookup::NotFound => {
            self.log.add_error(
              &path,
              diagnostics::Loc::NONE,
              format!("No matching export for import {:?}", cited_name),
            );
          }
          Lookup::Cycle => {
            self.log.add_error(
              &path,
              diagnostics::Loc::NONE,
              format!("Detected cycle while resolving import {:?}", cited_name),
            );
          }
        }
      }

      // Star re-exports contribute names not shadowed by explicit exports.
      let star_names = self.collect_star_names(index as SourceIndex);
      for name in star_names {
        if self.metas[index].resolved_exports.contains_key(&name)
          || self.graph.modules[index].named_exports.contains_key(&name)
        {
          continue;
        }
        let mut visited = AHashSet::new();
        visited.insert((index as SourceIndex, name.clone()));
        if let Lookup::Found(target) =
          self.lookup_through_stars(index as SourceIndex, &name, &mut visited)
        {
          self.metas[index].resolved_exports.insert(name, target);
        }
      }
    }
  }

  /// All names reachable through `export *` chains (excluding `default`).
  fn collect_star_names(&self, index: SourceIndex) -> Vec<String> {
    let mut out = AHashSet::new();
    let mut visited = AHashSet::new();
    self.collect_star_names_into(index, &mut visited, &mut out, true);
    let mut names: Vec<String> = out.into_iter().collect();
    names.sort();
    names
  }

  fn collect_star_names_into(
    &self,
    index: SourceIndex,
    visited: &mut AHashSet<SourceIndex>,
    out: &mut AHashSet<String>,
    is_root: bool,
  ) {
    if !visited.insert(index) {
      return;
    }
    if !is_root {
      for name in self.graph.modules[index as usize].named_exports.keys() {
        if name != "default" {
          out.insert(name.clone());
        }
      }
    }
    for &record in &self.graph.modules[index as usize].export_stars {
      let r = &self.graph.modules[index as usize].import_records[record as usize];
      if let Some(target) = r.source_index {
        if !self.metas[target as usize].is_wrapped
          && self.graph.modules[target as usize].exports_kind != ExportsKind::CommonJs
        {
          self.collect_star_names_into(target, visited, out, false);
        }
      }
    }
  }

  /// Every import/export statement whose target goes through interop gets
  /// its `__toModule` constant up front, in record order. This also covers
  /// side-effect-only imports of CommonJS and external modules, which have
  /// no bindings but must still evaluate the target.
  fn create_stmt_interops(&mut self) {
    for index in 0..self.graph.modules.len() {
      let records: Vec<u32> = (0..self.graph.modules[index].import_records.len() as u32).collect();
      for record in records {
        let r = &self.graph.modules[index].import_records[record as usize];
        if r.kind != ImportKind::Stmt {
          continue;
        }
        let needs_interop = r.is_external
          || r
            .source_index
            .map(|t| t != index as SourceIndex && self.target_uses_interop(t))
            .unwrap_or(false);
        if needs_interop {
          self.ensure_interop(index as SourceIndex, record);
        }
      }
    }
  }

  fn record_target(&self, importer: SourceIndex, record: u32) -> (Option<SourceIndex>, bool) {
    let r = &self.graph.modules[importer as usize].import_records[record as usize];
    (r.source_index, r.is_external)
  }

  fn target_uses_interop(&self, target: SourceIndex) -> bool {
    self.metas[target as usize].is_wrapped
      || self.graph.modules[target as usize].exports_kind == ExportsKind::CommonJs
  }

  /// The exports of a non-CommonJS module resolve statically even when
  /// the module is wrapped, so cycles and missing names are diagnosed;
  /// only the resulting *value* goes through the interop object.
  fn target_resolves_statically(&self, target: SourceIndex) -> bool {
    self.graph.modules[target as usize].exports_kind != ExportsKind::CommonJs
  }

  fn interop_member(&mut self, importer: SourceIndex, record: u32, name: &str) -> Lookup {
    let ns = self.ensure_interop(importer, record);
    Lookup::Found(ExportTarget::NsMember(
      Ref {
        source: importer,
        symbol: ns,
      },
      name.to_string(),
    ))
  }

  fn lookup_through_record(
    &mut self,
    importer: SourceIndex,
    record: u32,
    name: &str,
    visited: &mut AHashSet<(SourceIndex, String)>,
  ) -> Lookup {
    let (target, is_external) = self.record_target(importer, record);
    if is_external {
      return self.interop_member(importer, record, name);
    }
    let Some(target) = target else {
      return Lookup::NotFound;
    };
    if target == importer {
      return self.lookup_export(target, name, visited);
    }
    if !self.target_resolves_statically(target) {
      return self.interop_member(importer, record, name);
    }
    match self.lookup_export(target, name, visited) {
      Lookup::Found(found) => {
        if self.metas[target as usize].is_wrapped {
          // Statically valid, but the value lives behind the wrapper.
          self.interop_member(importer, record, name)
        } else {
          Lookup::Found(found)
        }
      }
      other => other,
    }
  }

  fn lookup_namespace_of_record(&mut self, importer: SourceIndex, record: u32) -> Lookup {
    let (target, is_external) = self.record_target(importer, record);
    if is_external {
      let ns = self.ensure_interop(importer, record);
      return Lookup::Found(ExportTarget::Sym(Ref {
        source: importer,
        symbol: ns,
      }));
    }
    let Some(target) = target else {
      return Lookup::NotFound;
    };
    if target == importer {
      return Lookup::Found(ExportTarget::Namespace(target));
    }
    if self.target_uses_interop(target) {
      let ns = self.ensure_interop(importer, record);
      return Lookup::Found(ExportTarget::Sym(Ref {
        source: importer,
        symbol: ns,
      }));
    }
    self.ensure_namespace(target);
    Lookup::Found(ExportTarget::Namespace(target))
  }

  fn lookup_export(
    &mut self,
    module: SourceIndex,
    name: &str,
    visited: &mut AHashSet<(SourceIndex, String)>,
  ) -> Lookup {
    if !visited.insert((module, name.to_string())) {
      return Lookup::Cycle;
    }
    let entry = self.graph.modules[module as usize].named_exports.get(name).cloned();
    match entry {
      Some(NamedExport::Local(sym)) => Lookup::Found(ExportTarget::Sym(Ref {
        source: module,
        symbol: sym,
      })),
      Some(NamedExport::ReExport {
        record,
        source_name,
      }) => self.lookup_through_record(module, record, &source_name, visited),
      Some(NamedExport::NamespaceReExport { record }) => {
        self.lookup_namespace_of_record(module, record)
      }
      None => self.lookup_through_stars(module, name, visited),
    }
  }

  fn lookup_through_stars(
    &mut self,
    module: SourceIndex,
    name: &str,
    visited: &mut AHashSet<(SourceIndex, String)>,
  ) -> Lookup {
    let stars = self.graph.modules[module as usize].export_stars.clone();
    for record in stars {
      let (target, is_external) = self.record_target(module, record);
      if is_external {
        continue; // Diagnosed by check_export_stars.
      }
      let Some(target) = target else { continue };
      if target == module {
        continue; // `export * from <self>` completes nothing.
      }
      if self.target_uses_interop(target) {
        continue; // Diagnosed by check_export_stars.
      }
      match self.lookup_export(target, name, visited) {
        Lookup::Found(found) => return Lookup::Found(found),
        // A cyclic star chain cannot provide the name; keep looking.
        Lookup::Cycle | Lookup::NotFound => {}
      }
    }
    Lookup::NotFound
  }

  /// `const <ns> = __toModule(<require>)` in the importing module.
  fn ensure_interop(&mut self, importer: SourceIndex, record: u32) -> SymbolId {
    if let Some(existing) = self.metas[importer as usize]
      .interop
      .iter()
      .find(|i| i.record == record)
    {
      return existing.namespace_symbol;
    }
    let r = &self.graph.modules[importer as usize].import_records[record as usize];
    let base = match r.source_index {
      Some(target) => fs::base_without_ext(&self.graph.sources[target as usize].abs_path).to_string(),
      None => r.specifier.clone(),
    };
    let name = sanitize_ident(&base);
    let module = &mut self.graph.modules[importer as usize];
    let symbol = module.symbols.create(&name, SymbolKind::Hoisted);
    {
      let sym = module.symbols.get_mut(symbol);
      sym.generated = true;
      sym.use_count += 1;
    }
    module
      .scopes
      .get_mut(parse_js::symbol::ScopeTree::MODULE)
      .generated
      .push(symbol);
    self.metas[importer as usize].interop.push(InteropRecord {
      record,
      namespace_symbol: symbol,
    });
    symbol
  }

  /// Bind every named import to its defining symbol (or namespace alias).
  fn bind_imports(&mut self) {
    for index in 0..self.graph.modules.len() {
      let path = self.graph.sources[index].abs_path.clone();
      let imports: Vec<(SymbolId, u32, Option<String>, diagnostics::Loc)> = self.graph.modules
        [index]
        .named_imports
        .iter()
        .map(|(&local, import)| (local, import.record, import.alias.clone(), import.loc))
        .collect();

      for (local, record, alias, loc) in imports {
        let (target, is_external) = self.record_target(index as SourceIndex, record);
        let dynamic_interop = is_external
          || target
            .map(|t| !self.target_resolves_statically(t))
            .unwrap_or(false);

        if dynamic_interop {
          // CommonJS or external: member reads resolve at runtime.
          let ns = self.ensure_interop(index as SourceIndex, record);
          let ns_ref = Ref {
            source: index as SourceIndex,
            symbol: ns,
          };
          let module = &mut self.graph.modules[index];
          match alias {
            None => module.symbols.get_mut(local).link = Some(ns_ref),
            Some(alias) => {
              module.symbols.get_mut(local).namespace_alias =
                Some(parse_js::symbol::NamespaceAlias {
                  namespace: ns_ref,
                  alias,
                });
            }
          }
          continue;
        }

        let Some(target) = target else {
          continue; // Unresolved; the scan already reported it.
        };
        let target_wrapped = self.metas[target as usize].is_wrapped;

        match alias {
          None => {
            if target_wrapped {
              let ns = self.ensure_interop(index as SourceIndex, record);
              self.graph.modules[index].symbols.get_mut(local).link = Some(Ref {
                source: index as SourceIndex,
                symbol: ns,
              });
            } else {
              let ns = self.ensure_namespace(target);
              self.graph.modules[index].symbols.get_mut(local).link = Some(Ref {
                source: target,
                symbol: ns,
              });
            }
          }
          Some(alias) => {
            let mut visited = AHashSet::new();
            let result = self.lookup_export(target, &alias, &mut visited);
            match result {
              Lookup::Found(_) if target_wrapped => {
                // Statically valid, but the value lives behind the
                // wrapper's exports object.
                let ns = self.ensure_interop(index as SourceIndex, record);
                self.graph.modules[index].symbols.get_mut(local).namespace_alias =
                  Some(parse_js::symbol::NamespaceAlias {
                    namespace: Ref {
                      source: index as SourceIndex,
                      symbol: ns,
                    },
                    alias,
                  });
              }
              Lookup::Found(ExportTarget::Sym(r)) => {
                self.graph.modules[index].symbols.get_mut(local).link = Some(r);
              }
              Lookup::Found(ExportTarget::NsMember(ns, member)) => {
                self.graph.modules[index].symbols.get_mut(local).namespace_alias =
                  Some(parse_js::symbol::NamespaceAlias {
                    namespace: ns,
                    alias: member,
                  });
              }
              Lookup::Found(ExportTarget::Namespace(ns_module)) => {
                let ns = self.ensure_namespace(ns_module);
                self.graph.modules[index].symbols.get_mut(local).link = Some(Ref {
                  source: ns_module,
                  symbol: ns,
                });
              }
              Lookup::NotFound => {
                self.log.add_error(
                  &path,
                  loc,
                  format!("No matching export for import {:?}", alias),
                );
              }
              Lookup::Cycle => {
                self.log.add_error(
                  &path,
                  loc,
                  format!("Detected cycle while resolving import {:?}", alias),
                );
              }
            }
          }
        }
      }
    }
  }

  /// Namespace object symbol for an inline ESM module (or the exports
  /// object of a wrapped one).
  fn ensure_namespace(&mut self, index: SourceIndex) -> SymbolId {
    if let Some(ns) = self.metas[index as usize].namespace_symbol {
      self.metas[index as usize].needs_namespace_object = true;
      return ns;
    }
    let base = sanitize_ident(fs::base_without_ext(&self.graph.sources[index as usize].abs_path));
    let module = &mut self.graph.modules[index as usize];
    let symbol = module.symbols.create(&base, SymbolKind::Hoisted);
    {
      let sym = module.symbols.get_mut(symbol);
      sym.generated = true;
      sym.use_count += 1;
    }
    module
      .scopes
      .get_mut(parse_js::symbol::ScopeTree::MODULE)
      .generated
      .push(symbol);
    self.metas[index as usize].namespace_symbol = Some(symbol);
    self.metas[index as usize].needs_namespace_object = true;
    symbol
  }

  /// Modules whose namespace object must exist even without a star import:
  /// `require()` of inline ESM, and wrapped modules with ESM exports.
  fn attach_namespace_needs(&mut self) {
    for index in 0..self.graph.modules.len() {
      let records: Vec<(u32, ImportKind)> = self.graph.modules[index]
        .import_records
        .iter()
        .enumerate()
        .map(|(i, r)| (i as u32, r.kind))
        .collect();
      for (record, kind) in records {
        if kind != ImportKind::Require && kind != ImportKind::Dynamic {
          continue;
        }
        let (target, is_external) = self.record_target(index as SourceIndex, record);
        if is_external {
          continue;
        }
        let Some(target) = target else { continue };
        if !self.target_uses_interop(target) {
          self.ensure_namespace(target);
        }
      }
    }

    for index in 0..self.graph.modules.len() {
      if self.is_runtime(index as SourceIndex) {
        continue;
      }
      let wrapped = self.metas[index].is_wrapped;
      let has_esm_exports = !self.metas[index].resolved_exports.is_empty();
      if wrapped && has_esm_exports {
        self.metas[index].needs_namespace_object = true;
      }
    }
  }

  /// Point unbound `__pow`/`__assign` (and friends) at the runtime.
  fn link_lowering_helpers(&mut self) {
    let Some(runtime_index) = self.graph.runtime else {
      return;
    };
    let runtime_members: Vec<(String, SymbolId)> = self.graph.modules[runtime_index as usize]
      .scopes
      .get(parse_js::symbol::ScopeTree::MODULE)
      .members
      .iter()
      .map(|(name, &sym)| (name.clone(), sym))
      .collect();

    for index in 0..self.graph.modules.len() {
      if self.is_runtime(index as SourceIndex) {
        continue;
      }
      let unbound: Vec<(SymbolId, String, u32)> = self.graph.modules[index]
        .symbols
        .iter()
        .filter(|(_, s)| {
          s.kind == SymbolKind::Unbound && s.use_count > 0 && runtime::is_helper_name(&s.name)
        })
        .map(|(id, s)| (id, s.name.clone(), s.use_count))
        .collect();
      for (id, name, use_count) in unbound {
        let Some((_, runtime_sym)) = runtime_members.iter().find(|(n, _)| *n == name) else {
          continue;
        };
        self.graph.modules[index].symbols.get_mut(id).link = Some(Ref {
          source: runtime_index,
          symbol: *runtime_sym,
        });
        self.graph.modules[runtime_index as usize]
          .symbols
          .get_mut(*runtime_sym)
          .use_count += use_count;
        self.helpers.insert(name);
      }
    }
  }

  /// An entry is emitted through `bootstrap` exactly when it wraps.
  fn decide_bootstrap(&self) -> AHashSet<SourceIndex> {
    self
      .graph
      .entries
      .iter()
      .copied()
      .filter(|&entry| self.metas[entry as usize].is_wrapped)
      .collect()
  }

  fn record_helper_needs(&mut self, bootstrap_entries: &AHashSet<SourceIndex>) {
    let any_bootstrap = !bootstrap_entries.is_empty();
    let any_inline_entry = self
      .graph
      .entries
      .iter()
      .any(|e| !bootstrap_entries.contains(e));
    let any_wrapped = self
      .metas
      .iter()
      .enumerate()
      .any(|(i, m)| m.is_wrapped && Some(i as SourceIndex) != self.graph.runtime);
    let any_interop = self.metas.iter().any(|m| !m.interop.is_empty());
    let any_namespace = self.metas.iter().any(|m| m.needs_namespace_object);
    let any_dynamic = self.graph.modules.iter().flat_map(|m| &m.import_records).any(|r| {
      r.kind == ImportKind::Dynamic && (r.source_index.is_some() || r.is_external)
    });

    if any_bootstrap {
      self.helpers.insert("bootstrap".into());
      self.helpers.insert("__require".into());
    }
    if any_wrapped && any_inline_entry {
      self.helpers.insert("__commonJS".into());
    }
    if any_interop || any_dynamic {
      self.helpers.insert("__toModule".into());
    }
    if any_namespace {
      self.helpers.insert("__export".into());
    }
    if any_dynamic && any_bootstrap {
      self.helpers.insert("__import".into());
    }

    // Keep helper use counts roughly proportional for the minifier.
    if let Some(runtime_index) = self.graph.runtime {
      let names: Vec<String> = self.helpers.iter().cloned().collect();
      for name in names {
        if let Some(&sym) = self.graph.modules[runtime_index as usize]
          .scopes
          .get(parse_js::symbol::ScopeTree::MODULE)
          .members
          .get(&name)
        {
          self.graph.modules[runtime_index as usize]
            .symbols
            .get_mut(sym)
            .use_count += 1;
        }
      }
    }
  }
}

/// Turn a file basename into a plausible identifier.
pub fn sanitize_ident(name: &str) -> String {
  let mut out = String::new();
  for c in name.chars() {
    if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
      out.push(c);
    } else {
      out.push('_');
    }
  }
  if out.is_empty() || out.chars().next().unwrap().is_ascii_digit() {
    out.insert(0, '_');
  }
  out
}
