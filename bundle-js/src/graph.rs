//! The module graph.
//!
//! Sources and modules live in parallel vectors indexed by [`SourceIndex`];
//! edges are indices, never references, so the graph is trivially
//! shareable across phases. Symbol identity across modules is a
//! [`Ref`]; [`follow`] resolves a union-find link chain to its canonical
//! symbol with path compression.

use crate::loader::Loader;
use parse_js::symbol::Ref;
use parse_js::Program;

pub type SourceIndex = u32;

#[derive(Debug)]
pub struct Source {
  pub index: SourceIndex,
  pub abs_path: String,
  pub contents: String,
  pub loader: Loader,
  pub is_entry: bool,
}

pub struct ModuleGraph {
  pub sources: Vec<Source>,
  /// Parallel to `sources`; a failed parse holds an empty placeholder so
  /// indices stay aligned.
  pub modules: Vec<Program>,
  pub entries: Vec<SourceIndex>,
  /// The synthesized runtime module (bundle mode only).
  pub runtime: Option<SourceIndex>,
}

impl ModuleGraph {
  pub fn module(&self, index: SourceIndex) -> &Program {
    &self.modules[index as usize]
  }

  pub fn source(&self, index: SourceIndex) -> &Source {
    &self.sources[index as usize]
  }
}

/// Follow a link chain to its canonical symbol, compressing the path.
pub fn follow(modules: &mut [Program], r: Ref) -> Ref {
  let link = modules[r.source as usize].symbols.get(r.symbol).link;
  match link {
    None => r,
    Some(next) => {
      let root = follow(modules, next);
      if Some(root) != link {
        modules[r.source as usize].symbols.get_mut(r.symbol).link = Some(root);
      }
      root
    }
  }
}

/// Read-only variant for phases after linking.
pub fn follow_read(modules: &[Program], mut r: Ref) -> Ref {
  loop {
    match modules[r.source as usize].symbols.get(r.symbol).link {
      None => return r,
      Some(next) => r = next,
    }
  }
}
