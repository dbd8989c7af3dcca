use anyhow::Context;
use bundle_js::fs::OsFs;
use bundle_js::loader::Loader;
use bundle_js::resolver::Platform;
use bundle_js::resolver::ResolveOptions;
use bundle_js::BundleOptions;
use bundle_js::SourceMapMode;
use clap::Parser;
use clap::ValueEnum;
use diagnostics::render::render_located;
use diagnostics::DeferLog;
use diagnostics::Severity;
use bundle_js::TargetLevel as Target;
use std::collections::HashMap;
use std::io::Write;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bundle-js", about = "JavaScript/TypeScript/JSX bundler")]
struct Cli {
  /// Entry point source files.
  #[arg(required = true)]
  entries: Vec<String>,

  /// Bundle dependencies into the output (otherwise each entry is
  /// emitted alone, preserving its imports).
  #[arg(long)]
  bundle: bool,

  /// Output file (single entry).
  #[arg(long)]
  outfile: Option<String>,

  /// Output directory (one file per entry).
  #[arg(long)]
  outdir: Option<String>,

  /// Shorthand for all three `--minify-*` flags.
  #[arg(long)]
  minify: bool,

  #[arg(long)]
  minify_whitespace: bool,

  #[arg(long)]
  minify_identifiers: bool,

  #[arg(long)]
  minify_syntax: bool,

  #[arg(long, value_enum, default_value_t = SourceMapArg::None)]
  sourcemap: SourceMapArg,

  #[arg(long, value_enum, default_value_t = PlatformArg::Browser)]
  platform: PlatformArg,

  #[arg(long, value_enum, default_value_t = TargetArg::Esnext)]
  target: TargetArg,

  /// Extension-to-loader overrides, e.g. `.png=base64`.
  #[arg(long = "loader", value_name = "EXT=LOADER")]
  loaders: Vec<String>,

  /// JSX factory expression (default `React.createElement`).
  #[arg(long)]
  jsx_factory: Option<String>,

  /// JSX fragment expression (default `React.Fragment`).
  #[arg(long)]
  jsx_fragment: Option<String>,

  /// Module names to keep external to the bundle.
  #[arg(long = "external", value_name = "NAME")]
  externals: Vec<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SourceMapArg {
  None,
  Inline,
  Linked,
  External,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PlatformArg {
  Browser,
  Node,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TargetArg {
  Es2015,
  Es2017,
  Es2018,
  Es2020,
  Esnext,
}

fn absolute_path(path: &str) -> anyhow::Result<String> {
  if path.starts_with('/') {
    return Ok(bundle_js::fs::normalize(path));
  }
  let cwd = std::env::current_dir().context("could not determine working directory")?;
  let cwd = cwd.to_string_lossy().replace('\\', "/");
  Ok(bundle_js::fs::join(&cwd, path))
}

fn run() -> anyhow::Result<i32> {
  let args = Cli::parse();

  let mut options = BundleOptions {
    is_bundling: args.bundle,
    minify_whitespace: args.minify || args.minify_whitespace,
    minify_identifiers: args.minify || args.minify_identifiers,
    minify_syntax: args.minify || args.minify_syntax,
    source_map: match args.sourcemap {
      SourceMapArg::None => SourceMapMode::None,
      SourceMapArg::Inline => SourceMapMode::Inline,
      SourceMapArg::Linked => SourceMapMode::Linked,
      SourceMapArg::External => SourceMapMode::External,
    },
    target: match args.target {
      TargetArg::Es2015 => Target::Es2015,
      TargetArg::Es2017 => Target::Es2017,
      TargetArg::Es2018 => Target::Es2018,
      TargetArg::Es2020 => Target::Es2020,
      TargetArg::Esnext => Target::EsNext,
    },
    ..BundleOptions::default()
  };
  if let Some(outfile) = &args.outfile {
    options.abs_output_file = Some(absolute_path(outfile)?);
  }
  if let Some(outdir) = &args.outdir {
    options.abs_output_dir = Some(absolute_path(outdir)?);
  }
  if let Some(factory) = &args.jsx_factory {
    options.jsx_factory = factory.split('.').map(|s| s.to_string()).collect();
  }
  if let Some(fragment) = &args.jsx_fragment {
    options.jsx_fragment = fragment.split('.').map(|s| s.to_string()).collect();
  }
  for entry in &args.loaders {
    let (ext, loader) = entry
      .split_once('=')
      .with_context(|| format!("invalid --loader value: {}", entry))?;
    let loader = Loader::from_name(loader)
      .with_context(|| format!("unknown loader name: {}", loader))?;
    options.extension_to_loader.insert(ext.to_string(), loader);
  }

  let resolve_options = ResolveOptions {
    platform: match args.platform {
      PlatformArg::Browser => Platform::Browser,
      PlatformArg::Node => Platform::Node,
    },
    externals: args.externals.iter().cloned().collect(),
    ..ResolveOptions::default()
  };

  let entries = args
    .entries
    .iter()
    .map(|e| absolute_path(e))
    .collect::<anyhow::Result<Vec<_>>>()?;

  let log = DeferLog::new();
  let outputs = bundle_js::bundle(&OsFs, &log, &entries, &resolve_options, &options);

  let diagnostics = log.drain();
  if !diagnostics.is_empty() {
    let mut source_cache: HashMap<String, Option<String>> = HashMap::new();
    for diagnostic in &diagnostics {
      let text = source_cache
        .entry(diagnostic.path.clone())
        .or_insert_with(|| std::fs::read_to_string(&diagnostic.path).ok());
      eprintln!("{}", render_located(diagnostic, text.as_deref()));
    }
    if diagnostics.iter().any(|d| d.severity == Severity::Error) {
      return Ok(1);
    }
  }

  if args.outfile.is_none() && args.outdir.is_none() {
    let mut stdout = std::io::stdout();
    for output in &outputs {
      stdout.write_all(output.contents.as_bytes())?;
    }
    return Ok(0);
  }

  for output in &outputs {
    let path = std::path::Path::new(&output.abs_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .with_context(|| format!("could not create directory {}", parent.display()))?;
    }
    std::fs::write(path, output.contents.as_bytes())
      .with_context(|| format!("could not write {}", output.abs_path))?;
  }
  Ok(0)
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  match run() {
    Ok(code) => process::exit(code),
    Err(err) => {
      eprintln!("bundle-js: internal error: {:#}", err);
      process::exit(2);
    }
  }
}
