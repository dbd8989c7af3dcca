//! Scan phase: breadth-first crawl from the entry points.
//!
//! Each wave parses newly discovered sources in parallel with rayon, then
//! resolves their import records on the coordinating thread in source
//! order, so `SourceIndex` assignment (and therefore all output) is
//! deterministic regardless of worker scheduling. Errors never abort the
//! scan; it runs to a fixpoint to produce the maximal diagnostic set.

use crate::fs;
use crate::fs::FileSystem;
use crate::graph::ModuleGraph;
use crate::graph::Source;
use crate::graph::SourceIndex;
use crate::loader::disabled_source;
use crate::loader::synthesize_source;
use crate::loader::Loader;
use crate::resolver::Resolved;
use crate::resolver::Resolver;
use crate::runtime;
use crate::BundleOptions;
use ahash::AHashMap;
use diagnostics::DeferLog;
use diagnostics::Loc;
use parse_js::ParseOptions;
use parse_js::Program;
use parse_js::Target;
use rayon::prelude::*;
use tracing::debug;

pub fn scan(
  fs: &dyn FileSystem,
  resolver: &Resolver,
  log: &DeferLog,
  entry_paths: &[String],
  options: &BundleOptions,
) -> ModuleGraph {
  let mut sources: Vec<Source> = Vec::new();
  let mut modules: Vec<Program> = Vec::new();
  let mut visited: AHashMap<String, SourceIndex> = AHashMap::new();
  let mut entries: Vec<SourceIndex> = Vec::new();
  let mut runtime_index = None;

  if options.is_bundling {
    let index = add_source(
      &mut sources,
      &mut visited,
      runtime::RUNTIME_PATH.to_string(),
      runtime::runtime_source().to_string(),
      Loader::Js,
      false,
    );
    runtime_index = Some(index);
  }

  for entry in entry_paths {
    match resolver.resolve("/", entry) {
      Resolved::Resolved { abs_path, loader } => {
        let index = ensure_file_source(
          fs,
          log,
          &mut sources,
          &mut visited,
          abs_path,
          loader,
          entry,
          Loc::NONE,
        );
        if let Some(index) = index {
          sources[index as usize].is_entry = true;
          entries.push(index);
        }
      }
      Resolved::External | Resolved::Disabled { .. } => {
        log.add_error(entry, Loc::NONE, format!("Could not resolve {:?}", entry));
      }
      Resolved::Unresolved { message } => {
        log.add_error(entry, Loc::NONE, message);
      }
    }
  }

  let mut next_unparsed = 0usize;
  while next_unparsed < sources.len() {
    let wave_start = next_unparsed;
    let wave_end = sources.len();
    debug!(wave_start, wave_end, "parsing wave");

    let parsed: Vec<_> = sources[wave_start..wave_end]
      .par_iter()
      .map(|source| {
        let parse_options = parse_options_for(source, options, runtime_index);
        parse_js::parse_with_options(&source.contents, &parse_options)
      })
      .collect();

    for (offset, result) in parsed.into_iter().enumerate() {
      let index = wave_start + offset;
      let path = sources[index].abs_path.clone();
      match result {
        Ok(program) => {
          for diagnostic in &program.diagnostics {
            log.add(diagnostics::Diagnostic::new(
              diagnostic.severity,
              &path,
              diagnostic.loc,
              diagnostic.message.clone(),
            ));
          }
          modules.push(program);
        }
        Err(err) => {
          log.add(err.to_diagnostic(&path));
          let placeholder = parse_js::parse_with_options("", &ParseOptions {
            source_index: index as u32,
            ..ParseOptions::default()
          })
          .expect("empty source always parses");
          modules.push(placeholder);
        }
      }
    }
    next_unparsed = wave_end;

    if !options.is_bundling {
      continue;
    }

    for index in wave_start..wave_end {
      let importer_path = sources[index].abs_path.clone();
      let importer_dir = fs::dir(&importer_path);
      for record_index in 0..modules[index].import_records.len() {
        let (specifier, loc) = {
          let record = &modules[index].import_records[record_index];
          (record.specifier.clone(), record.loc)
        };
        match resolver.resolve(&importer_dir, &specifier) {
          Resolved::Resolved { abs_path, loader } => {
            let target = ensure_file_source(
              fs,
              log,
              &mut sources,
              &mut visited,
              abs_path,
              loader,
              &importer_path,
              loc,
            );
            modules[index].import_records[record_index].source_index = target;
          }
          Resolved::External => {
            modules[index].import_records[record_index].is_external = true;
          }
          Resolved::Disabled { abs_path } => {
            let target = add_or_get_source(
              &mut sources,
              &mut visited,
              abs_path,
              disabled_source(),
              Loader::Js,
            );
            modules[index].import_records[record_index].source_index = Some(target);
          }
          Resolved::Unresolved { message } => {
            log.add_error(&importer_path, loc, message);
          }
        }
      }
    }
  }

  ModuleGraph {
    sources,
    modules,
    entries,
    runtime: runtime_index,
  }
}

fn parse_options_for(
  source: &Source,
  options: &BundleOptions,
  runtime_index: Option<SourceIndex>,
) -> ParseOptions {
  let is_runtime = runtime_index == Some(source.index);
  ParseOptions {
    source_index: source.index,
    dialect: source.loader.dialect(),
    target: if is_runtime {
      Target::EsNext
    } else {
      options.target
    },
    is_bundling: options.is_bundling && !is_runtime,
    jsx_factory: options.jsx_factory.clone(),
    jsx_fragment: options.jsx_fragment.clone(),
  }
}

fn add_source(
  sources: &mut Vec<Source>,
  visited: &mut AHashMap<String, SourceIndex>,
  abs_path: String,
  contents: String,
  loader: Loader,
  is_entry: bool,
) -> SourceIndex {
  let index = sources.len() as SourceIndex;
  visited.insert(abs_path.clone(), index);
  sources.push(Source {
    index,
    abs_path,
    contents,
    loader,
    is_entry,
  });
  index
}

fn add_or_get_source(
  sources: &mut Vec<Source>,
  visited: &mut AHashMap<String, SourceIndex>,
  abs_path: String,
  contents: String,
  loader: Loader,
) -> SourceIndex {
  if let Some(&index) = visited.get(&abs_path) {
    return index;
  }
  add_source(sources, visited, abs_path, contents, loader, false)
}

#[allow(clippy::too_many_arguments)]
fn ensure_file_source(
  fs: &dyn FileSystem,
  log: &DeferLog,
  sources: &mut Vec<Source>,
  visited: &mut AHashMap<String, SourceIndex>,
  abs_path: String,
  loader: Loader,
  importer_path: &str,
  loc: Loc,
) -> Option<SourceIndex> {
  if let Some(&index) = visited.get(&abs_path) {
    return Some(index);
  }
  let Some(raw) = fs.read_file(&abs_path) else {
    log.add_error(
      importer_path,
      loc,
      format!("Could not read file: {}", abs_path),
    );
    return None;
  };
  let contents = if loader.is_synthetic() {
    match synthesize_source(loader, &raw, &abs_path) {
      Ok(contents) => contents,
      Err(message) => {
        log.add_error(&abs_path, Loc::NONE, message);
        return None;
      }
    }
  } else {
    match String::from_utf8(raw) {
      Ok(text) => text,
      Err(_) => {
        log.add_error(&abs_path, Loc::NONE, "File is not valid UTF-8");
        return None;
      }
    }
  };
  Some(add_source(sources, visited, abs_path, contents, loader, false))
}
