use bundle_js::fs::MockFs;
use bundle_js::loader::default_extension_loaders;
use bundle_js::loader::Loader;
use bundle_js::resolver::Platform;
use bundle_js::resolver::Resolved;
use bundle_js::resolver::ResolveOptions;
use bundle_js::resolver::Resolver;
use diagnostics::DeferLog;

fn resolver_for<'a>(
  fs: &'a MockFs,
  log: &'a DeferLog,
  platform: Platform,
) -> Resolver<'a> {
  Resolver::new(
    fs,
    log,
    ResolveOptions {
      platform,
      ..ResolveOptions::default()
    },
    default_extension_loaders(),
  )
}

fn resolved_path(result: Resolved) -> String {
  match result {
    Resolved::Resolved { abs_path, .. } => abs_path,
    other => panic!("expected a resolved path, got {:?}", other),
  }
}

#[test]
fn relative_paths_probe_extensions_in_order() {
  let fs = MockFs::new([("/a.ts", ""), ("/a.js", ""), ("/b.js", "")]);
  let log = DeferLog::new();
  let resolver = resolver_for(&fs, &log, Platform::Browser);
  // `.ts` outranks `.js` in the default order.
  assert_eq!(resolved_path(resolver.resolve("/", "./a")), "/a.ts");
  assert_eq!(resolved_path(resolver.resolve("/", "./b")), "/b.js");
  // An exact match wins over probing.
  assert_eq!(resolved_path(resolver.resolve("/", "./a.js")), "/a.js");
}

#[test]
fn resolution_is_idempotent() {
  let fs = MockFs::new([("/x/a.js", ""), ("/x/dir/index.js", "")]);
  let log = DeferLog::new();
  let resolver = resolver_for(&fs, &log, Platform::Browser);
  let first = resolver.resolve("/x", "./dir");
  let second = resolver.resolve("/x", "./dir");
  assert_eq!(first, second);
  assert_eq!(resolved_path(first), "/x/dir/index.js");
}

#[test]
fn loaders_come_from_the_extension_table() {
  let fs = MockFs::new([("/a.json", "{}"), ("/b.tsx", "")]);
  let log = DeferLog::new();
  let resolver = resolver_for(&fs, &log, Platform::Browser);
  match resolver.resolve("/", "./a.json") {
    Resolved::Resolved { loader, .. } => assert_eq!(loader, Loader::Json),
    other => panic!("unexpected {:?}", other),
  }
  match resolver.resolve("/", "./b") {
    Resolved::Resolved { loader, .. } => assert_eq!(loader, Loader::Tsx),
    other => panic!("unexpected {:?}", other),
  }
}

#[test]
fn node_modules_walk_goes_upward() {
  let fs = MockFs::new([
    ("/proj/node_modules/dep/index.js", ""),
    ("/proj/src/deep/file.js", ""),
  ]);
  let log = DeferLog::new();
  let resolver = resolver_for(&fs, &log, Platform::Browser);
  assert_eq!(
    resolved_path(resolver.resolve("/proj/src/deep", "dep")),
    "/proj/node_modules/dep/index.js"
  );
}

#[test]
fn package_subpaths_resolve_inside_the_package() {
  let fs = MockFs::new([("/node_modules/pkg/lib/util.js", "")]);
  let log = DeferLog::new();
  let resolver = resolver_for(&fs, &log, Platform::Browser);
  assert_eq!(
    resolved_path(resolver.resolve("/src", "pkg/lib/util")),
    "/node_modules/pkg/lib/util.js"
  );
}

#[test]
fn package_json_main_field() {
  let fs = MockFs::new([
    ("/node_modules/pkg/package.json", r#"{"main": "./lib/entry.js"}"#),
    ("/node_modules/pkg/lib/entry.js", ""),
    ("/node_modules/pkg/index.js", ""),
  ]);
  let log = DeferLog::new();
  let resolver = resolver_for(&fs, &log, Platform::Browser);
  assert_eq!(
    resolved_path(resolver.resolve("/", "pkg")),
    "/node_modules/pkg/lib/entry.js"
  );
}

#[test]
fn module_field_outranks_main() {
  let fs = MockFs::new([
    (
      "/node_modules/pkg/package.json",
      r#"{"main": "./main.js", "module": "./module.js"}"#,
    ),
    ("/node_modules/pkg/main.js", ""),
    ("/node_modules/pkg/module.js", ""),
  ]);
  let log = DeferLog::new();
  let resolver = resolver_for(&fs, &log, Platform::Node);
  assert_eq!(
    resolved_path(resolver.resolve("/", "pkg")),
    "/node_modules/pkg/module.js"
  );
}

#[test]
fn browser_string_field_outranks_module_on_browser() {
  let fs = MockFs::new([
    (
      "/node_modules/pkg/package.json",
      r#"{"main": "./main.js", "module": "./module.js", "browser": "./browser.js"}"#,
    ),
    ("/node_modules/pkg/main.js", ""),
    ("/node_modules/pkg/module.js", ""),
    ("/node_modules/pkg/browser.js", ""),
  ]);
  let log = DeferLog::new();
  let browser = resolver_for(&fs, &log, Platform::Browser);
  assert_eq!(
    resolved_path(browser.resolve("/", "pkg")),
    "/node_modules/pkg/browser.js"
  );
  let node = resolver_for(&fs, &log, Platform::Node);
  assert_eq!(
    resolved_path(node.resolve("/", "pkg")),
    "/node_modules/pkg/module.js"
  );
}

#[test]
fn missing_main_falls_back_to_index() {
  let fs = MockFs::new([
    ("/node_modules/pkg/package.json", r#"{"name": "pkg"}"#),
    ("/node_modules/pkg/index.js", ""),
  ]);
  let log = DeferLog::new();
  let resolver = resolver_for(&fs, &log, Platform::Browser);
  assert_eq!(
    resolved_path(resolver.resolve("/", "pkg")),
    "/node_modules/pkg/index.js"
  );
}

#[test]
fn browser_map_remaps_a_relative_file_to_a_package() {
  let fs = MockFs::new([
    (
      "/node_modules/demo-pkg/package.json",
      r#"{"main": "./main.js", "browser": {"./util.js": "util-browser"}}"#,
    ),
    ("/node_modules/demo-pkg/main.js", ""),
    ("/node_modules/demo-pkg/util.js", ""),
    ("/node_modules/util-browser/index.js", ""),
  ]);
  let log = DeferLog::new();
  let resolver = resolver_for(&fs, &log, Platform::Browser);
  // Resolving the package installs the remap.
  assert_eq!(
    resolved_path(resolver.resolve("/", "demo-pkg")),
    "/node_modules/demo-pkg/main.js"
  );
  // A later resolve inside the package follows the map.
  assert_eq!(
    resolved_path(resolver.resolve("/node_modules/demo-pkg", "./util")),
    "/node_modules/util-browser/index.js"
  );
}

#[test]
fn browser_map_remaps_relative_to_relative() {
  let fs = MockFs::new([
    (
      "/node_modules/demo-pkg/package.json",
      r#"{"main": "./main.js", "browser": {"./util.js": "./util-browser.js"}}"#,
    ),
    ("/node_modules/demo-pkg/main.js", ""),
    ("/node_modules/demo-pkg/util.js", ""),
    ("/node_modules/demo-pkg/util-browser.js", ""),
  ]);
  let log = DeferLog::new();
  let resolver = resolver_for(&fs, &log, Platform::Browser);
  resolver.resolve("/", "demo-pkg");
  assert_eq!(
    resolved_path(resolver.resolve("/node_modules/demo-pkg", "./util")),
    "/node_modules/demo-pkg/util-browser.js"
  );
}

#[test]
fn browser_map_disables_modules() {
  let fs = MockFs::new([
    (
      "/node_modules/demo-pkg/package.json",
      r#"{"main": "./main.js", "browser": {"./util-node.js": false}}"#,
    ),
    ("/node_modules/demo-pkg/main.js", ""),
    ("/node_modules/demo-pkg/util-node.js", ""),
  ]);
  let log = DeferLog::new();
  let resolver = resolver_for(&fs, &log, Platform::Browser);
  resolver.resolve("/", "demo-pkg");
  match resolver.resolve("/node_modules/demo-pkg", "./util-node") {
    Resolved::Disabled { abs_path } => {
      assert_eq!(abs_path, "/node_modules/demo-pkg/util-node.js");
    }
    other => panic!("expected disabled, got {:?}", other),
  }
}

#[test]
fn browser_maps_are_ignored_on_node() {
  let fs = MockFs::new([
    (
      "/node_modules/demo-pkg/package.json",
      r#"{"main": "./main.js", "browser": {"./util.js": false}}"#,
    ),
    ("/node_modules/demo-pkg/main.js", ""),
    ("/node_modules/demo-pkg/util.js", ""),
  ]);
  let log = DeferLog::new();
  let resolver = resolver_for(&fs, &log, Platform::Node);
  resolver.resolve("/", "demo-pkg");
  assert_eq!(
    resolved_path(resolver.resolve("/node_modules/demo-pkg", "./util")),
    "/node_modules/demo-pkg/util.js"
  );
}

#[test]
fn tsconfig_base_url_with_comments_and_trailing_commas() {
  let fs = MockFs::new([
    (
      "/proj/tsconfig.json",
      "{\n  // tolerant\n  \"compilerOptions\": {\n    \"baseUrl\": \".\",\n  },\n}",
    ),
    ("/proj/lib/util.js", ""),
    ("/proj/app/entry.js", ""),
  ]);
  let log = DeferLog::new();
  let resolver = resolver_for(&fs, &log, Platform::Browser);
  assert_eq!(
    resolved_path(resolver.resolve("/proj/app", "lib/util")),
    "/proj/lib/util.js"
  );
  assert!(log.is_empty());
}

#[test]
fn declared_externals_stay_external() {
  let fs = MockFs::new([("/entry.js", "")]);
  let log = DeferLog::new();
  let resolver = Resolver::new(
    &fs,
    &log,
    ResolveOptions {
      platform: Platform::Browser,
      externals: ["electron".to_string()].into_iter().collect(),
      ..ResolveOptions::default()
    },
    default_extension_loaders(),
  );
  assert_eq!(resolver.resolve("/", "electron"), Resolved::External);
}

#[test]
fn unknown_packages_are_external_on_node_only() {
  let fs = MockFs::new([("/entry.js", "")]);
  let log = DeferLog::new();
  let node = resolver_for(&fs, &log, Platform::Node);
  assert_eq!(node.resolve("/", "fs"), Resolved::External);
  let browser = resolver_for(&fs, &log, Platform::Browser);
  assert_eq!(browser.resolve("/", "fs"), Resolved::Unresolved {
    message: "Could not resolve \"fs\"".to_string(),
  });
}

#[test]
fn dot_specifier_resolves_the_importer_directory() {
  let fs = MockFs::new([("/pkg/index.js", ""), ("/pkg/entry.js", "")]);
  let log = DeferLog::new();
  let resolver = resolver_for(&fs, &log, Platform::Browser);
  assert_eq!(resolved_path(resolver.resolve("/pkg", ".")), "/pkg/index.js");
}
