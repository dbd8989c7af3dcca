//! The bundler core.
//!
//! [`bundle`] drives the phased pipeline: scan (resolve + parse, in
//! parallel), link (single-threaded, whole-graph), rename, and print.
//! Each phase runs to completion for diagnostic coverage; the pipeline
//! stops after the first phase that reported an error. Output is
//! byte-deterministic for identical inputs and options.

use crate::fs::FileSystem;
use crate::graph::SourceIndex;
use crate::link::LinkOutput;
use crate::link::ModuleMeta;
use crate::loader::default_extension_loaders;
use crate::loader::Loader;
use crate::print::PrintOptions;
use crate::rename::rename;
use crate::rename::RenameOptions;
use crate::resolver::ResolveOptions;
use crate::resolver::Resolver;
use crate::sourcemap::build_source_map;
use ahash::AHashMap;
use ahash::AHashSet;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use diagnostics::DeferLog;
use parse_js::Target;
use tracing::debug;

pub mod fs;
pub mod graph;
pub mod link;
pub mod loader;
pub mod print;
pub mod rename;
pub mod resolver;
pub mod runtime;
pub mod scan;
pub mod sourcemap;

pub use parse_js::Target as TargetLevel;
pub use resolver::Platform;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SourceMapMode {
  None,
  /// `//# sourceMappingURL=<out>.map` comment plus a `.map` file.
  Linked,
  /// Base64 data URL appended to the output.
  Inline,
  /// `.map` file only.
  External,
}

#[derive(Clone)]
pub struct BundleOptions {
  pub is_bundling: bool,
  pub abs_output_file: Option<String>,
  pub abs_output_dir: Option<String>,
  pub minify_whitespace: bool,
  pub minify_identifiers: bool,
  pub minify_syntax: bool,
  pub source_map: SourceMapMode,
  /// Suppress the runtime prelude (snapshot tests).
  pub omit_runtime: bool,
  pub target: Target,
  pub jsx_factory: Vec<String>,
  pub jsx_fragment: Vec<String>,
  pub extension_to_loader: AHashMap<String, Loader>,
}

impl Default for BundleOptions {
  fn default() -> Self {
    Self {
      is_bundling: false,
      abs_output_file: None,
      abs_output_dir: None,
      minify_whitespace: false,
      minify_identifiers: false,
      minify_syntax: false,
      source_map: SourceMapMode::None,
      omit_runtime: false,
      target: Target::EsNext,
      jsx_factory: vec!["React".into(), "createElement".into()],
      jsx_fragment: vec!["React".into(), "Fragment".into()],
      extension_to_loader: default_extension_loaders(),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputFile {
  pub abs_path: String,
  pub contents: String,
}

impl LinkOutput {
  fn empty(module_count: usize) -> Self {
    Self {
      metas: (0..module_count).map(|_| ModuleMeta::default()).collect(),
      helpers: AHashSet::new(),
      bootstrap_entries: AHashSet::new(),
    }
  }
}

pub fn bundle(
  file_system: &dyn FileSystem,
  log: &DeferLog,
  entry_paths: &[String],
  resolve_options: &ResolveOptions,
  options: &BundleOptions,
) -> Vec<OutputFile> {
  let resolver = Resolver::new(
    file_system,
    log,
    resolve_options.clone(),
    options.extension_to_loader.clone(),
  );

  let mut graph = scan::scan(file_system, &resolver, log, entry_paths, options);
  if log.has_errors() {
    return Vec::new();
  }
  debug!(sources = graph.sources.len(), "scan complete");

  let link_output = if options.is_bundling {
    let output = link::link(&mut graph, log);
    if log.has_errors() {
      return Vec::new();
    }
    output
  } else {
    LinkOutput::empty(graph.modules.len())
  };

  let print_options = PrintOptions {
    minify_whitespace: options.minify_whitespace,
    minify_syntax: options.minify_syntax,
    omit_runtime: options.omit_runtime,
    collect_mappings: options.source_map != SourceMapMode::None,
  };

  let mut outputs = Vec::new();
  let entries = graph.entries.clone();
  for &entry in &entries {
    let rename_map = rename(&graph, &link_output, &RenameOptions {
      minify: options.minify_identifiers,
      target: options.target,
      only: if options.is_bundling {
        None
      } else {
        Some(entry)
      },
    });

    let result = if options.is_bundling {
      print::print_bundle(&graph, &link_output, &rename_map, print_options, entry)
    } else {
      print::print_single_module(&graph, &rename_map, print_options, entry)
    };

    let out_path = output_path_for(&graph.sources[entry as usize].abs_path, options, &entries);
    let mut code = result.code;

    if options.source_map != SourceMapMode::None {
      let sources: Vec<String> = result
        .map_sources
        .iter()
        .map(|&s| graph.sources[s as usize].abs_path.clone())
        .collect();
      let contents: Vec<String> = result
        .map_sources
        .iter()
        .map(|&s| graph.sources[s as usize].contents.clone())
        .collect();
      let map_json = build_source_map(&sources, &contents, &result.mappings);
      match options.source_map {
        SourceMapMode::Linked => {
          code.push_str(&format!(
            "//# sourceMappingURL={}.map\n",
            fs::base(&out_path)
          ));
          outputs.push(OutputFile {
            abs_path: format!("{}.map", out_path),
            contents: map_json,
          });
        }
        SourceMapMode::Inline => {
          code.push_str(&format!(
            "//# sourceMappingURL=data:application/json;base64,{}\n",
            STANDARD.encode(map_json.as_bytes())
          ));
        }
        SourceMapMode::External => {
          outputs.push(OutputFile {
            abs_path: format!("{}.map", out_path),
            contents: map_json,
          });
        }
        SourceMapMode::None => unreachable!(),
      }
    }

    outputs.push(OutputFile {
      abs_path: out_path,
      contents: code,
    });
  }

  outputs.sort_by(|a, b| a.abs_path.cmp(&b.abs_path));
  outputs
}

fn output_path_for(entry_path: &str, options: &BundleOptions, entries: &[SourceIndex]) -> String {
  if let Some(file) = &options.abs_output_file {
    if entries.len() == 1 {
      return file.clone();
    }
  }
  let dir = options
    .abs_output_dir
    .clone()
    .or_else(|| {
      options
        .abs_output_file
        .as_deref()
        .map(fs::dir)
    })
    .unwrap_or_else(|| fs::dir(entry_path));
  format!("{}/{}.js", dir, fs::base_without_ext(entry_path))
}
