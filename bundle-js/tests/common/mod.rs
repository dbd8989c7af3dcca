use bundle_js::fs::MockFs;
use bundle_js::resolver::ResolveOptions;
use bundle_js::BundleOptions;
use bundle_js::OutputFile;
use diagnostics::render::render_terse;
use diagnostics::DeferLog;

pub struct Bundled {
  pub outputs: Vec<OutputFile>,
  pub log: Vec<String>,
}

impl Bundled {
  pub fn output(&self, abs_path: &str) -> &str {
    &self
      .outputs
      .iter()
      .find(|o| o.abs_path == abs_path)
      .unwrap_or_else(|| panic!("no output named {}; log: {:#?}", abs_path, self.log))
      .contents
  }
}

/// Run the bundler over an in-memory filesystem. Defaults match the
/// snapshot tests: bundling on, runtime omitted, output at `/out.js`.
pub fn bundled(
  files: &[(&str, &str)],
  entries: &[&str],
  configure: impl FnOnce(&mut BundleOptions, &mut ResolveOptions),
) -> Bundled {
  let fs = MockFs::new(files.iter().map(|(path, contents)| (*path, *contents)));
  let mut options = BundleOptions {
    is_bundling: true,
    abs_output_file: Some("/out.js".to_string()),
    omit_runtime: true,
    ..BundleOptions::default()
  };
  let mut resolve_options = ResolveOptions::default();
  configure(&mut options, &mut resolve_options);
  let entry_paths: Vec<String> = entries.iter().map(|e| e.to_string()).collect();
  let log = DeferLog::new();
  let outputs = bundle_js::bundle(&fs, &log, &entry_paths, &resolve_options, &options);
  Bundled {
    outputs,
    log: log.drain().iter().map(render_terse).collect(),
  }
}

pub fn expect_clean(bundled: &Bundled) {
  assert!(
    bundled.log.is_empty(),
    "unexpected diagnostics: {:#?}",
    bundled.log
  );
}
