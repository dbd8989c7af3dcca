mod common;

use common::bundled;

#[test]
fn export_cycle_within_one_module() {
  let result = bundled(
    &[(
      "/entry.js",
      "export {a as b} from './entry';\nexport {b as c} from './entry';\nexport {c as d} from './entry';\nexport {d as a} from './entry';\n",
    )],
    &["/entry.js"],
    |_, _| {},
  );
  assert!(result.outputs.is_empty());
  assert_eq!(result.log, vec![
    "/entry.js: error: Detected cycle while resolving import \"a\"",
    "/entry.js: error: Detected cycle while resolving import \"b\"",
    "/entry.js: error: Detected cycle while resolving import \"c\"",
    "/entry.js: error: Detected cycle while resolving import \"d\"",
  ]);
}

#[test]
fn export_cycle_across_two_modules() {
  let result = bundled(
    &[
      (
        "/entry.js",
        "export {a as b} from './foo';\nexport {c as d} from './foo';\n",
      ),
      (
        "/foo.js",
        "export {b as c} from './entry';\nexport {d as a} from './entry';\n",
      ),
    ],
    &["/entry.js"],
    |_, _| {},
  );
  assert!(result.outputs.is_empty());
  assert_eq!(result.log, vec![
    "/entry.js: error: Detected cycle while resolving import \"a\"",
    "/entry.js: error: Detected cycle while resolving import \"c\"",
    "/foo.js: error: Detected cycle while resolving import \"b\"",
    "/foo.js: error: Detected cycle while resolving import \"d\"",
  ]);
}

#[test]
fn missing_esm_exports_are_errors() {
  let result = bundled(
    &[
      (
        "/entry.js",
        "import fn, {x as a, y as b} from './foo';\nconsole.log(fn(a, b));\n",
      ),
      ("/foo.js", "export const x = 132;\n"),
    ],
    &["/entry.js"],
    |_, _| {},
  );
  assert!(result.outputs.is_empty());
  assert_eq!(result.log, vec![
    "/entry.js: error: No matching export for import \"default\"",
    "/entry.js: error: No matching export for import \"y\"",
  ]);
}

#[test]
fn wildcard_export_of_commonjs_is_an_error() {
  let result = bundled(
    &[
      ("/entry.js", "export * from './foo';\n"),
      ("/foo.js", "exports.x = 1;\n"),
    ],
    &["/entry.js"],
    |_, _| {},
  );
  assert!(result.outputs.is_empty());
  assert_eq!(result.log, vec![
    "/entry.js: error: Wildcard exports are not supported for this module",
  ]);
}

#[test]
fn wildcard_export_of_an_external_module_is_an_error() {
  let result = bundled(
    &[("/entry.js", "export * from 'fs';\n")],
    &["/entry.js"],
    |_, resolve| {
      resolve.platform = bundle_js::resolver::Platform::Node;
    },
  );
  assert!(result.outputs.is_empty());
  assert_eq!(result.log, vec![
    "/entry.js: error: Wildcard exports are not supported for this module",
  ]);
}

#[test]
fn indirect_require_is_a_scan_error() {
  let result = bundled(
    &[("/entry.js", "const aliased = require;\naliased('foo');\n")],
    &["/entry.js"],
    |_, _| {},
  );
  assert!(result.outputs.is_empty());
  assert_eq!(result.log, vec![
    "/entry.js: error: \"require\" must not be called indirectly",
  ]);
}

#[test]
fn indirect_require_in_try_is_tolerated() {
  let result = bundled(
    &[(
      "/entry.js",
      "let r;\ntry {\n  r = require;\n} catch (e) {\n}\nconsole.log(r);\n",
    )],
    &["/entry.js"],
    |_, _| {},
  );
  assert!(result.log.is_empty(), "log: {:#?}", result.log);
  assert_eq!(
    result.output("/out.js"),
    "// /entry.js\nlet r;\ntry {\n  r = null;\n} catch (e) {\n}\nconsole.log(r);\n"
  );
}

#[test]
fn non_literal_require_and_import_arguments() {
  let result = bundled(
    &[(
      "/entry.js",
      "require(foo);\nrequire(`part${x}`);\nimport(bar);\n",
    )],
    &["/entry.js"],
    |_, _| {},
  );
  assert!(result.outputs.is_empty());
  assert_eq!(result.log, vec![
    "/entry.js: error: The argument to require() must be a string literal",
    "/entry.js: error: The argument to require() must be a string literal",
    "/entry.js: error: The argument to import() must be a string literal",
  ]);
}

#[test]
fn unresolved_relative_import() {
  let result = bundled(
    &[("/entry.js", "import './missing';\n")],
    &["/entry.js"],
    |_, _| {},
  );
  assert!(result.outputs.is_empty());
  assert_eq!(result.log, vec![
    "/entry.js: error: Could not resolve \"./missing\"",
  ]);
}

#[test]
fn browser_platform_cannot_resolve_node_builtins() {
  let result = bundled(
    &[("/entry.js", "console.log(require('fs'));\n")],
    &["/entry.js"],
    |_, _| {},
  );
  assert!(result.outputs.is_empty());
  assert_eq!(result.log, vec!["/entry.js: error: Could not resolve \"fs\""]);
}

#[test]
fn unsupported_extension_is_a_resolve_error() {
  let result = bundled(
    &[
      ("/entry.js", "console.log(require('./data'));\n"),
      ("/data", "some bytes"),
    ],
    &["/entry.js"],
    |_, _| {},
  );
  assert!(result.outputs.is_empty());
  assert_eq!(result.log, vec![
    "/entry.js: error: File extension not supported: /data",
  ]);
}

#[test]
fn scan_reports_all_errors_before_stopping() {
  // Two independent resolution failures in two files both surface.
  let result = bundled(
    &[
      ("/entry.js", "import './a';\nimport './missing1';\n"),
      ("/a.js", "import './missing2';\n"),
    ],
    &["/entry.js"],
    |_, _| {},
  );
  assert!(result.outputs.is_empty());
  assert_eq!(result.log, vec![
    "/a.js: error: Could not resolve \"./missing2\"",
    "/entry.js: error: Could not resolve \"./missing1\"",
  ]);
}

#[test]
fn package_json_strictness_errors() {
  let result = bundled(
    &[
      ("/src/entry.js", "import fn from 'demo-pkg';\nconsole.log(fn());\n"),
      (
        "/node_modules/demo-pkg/package.json",
        "{\n  // comment\n  \"main\": \"index.js\"\n}",
      ),
      ("/node_modules/demo-pkg/index.js", "module.exports = 1;\n"),
    ],
    &["/src/entry.js"],
    |_, _| {},
  );
  assert_eq!(result.log, vec![
    "/node_modules/demo-pkg/package.json: error: JSON does not support comments",
  ]);
}

#[test]
fn package_json_trailing_comma_error() {
  let result = bundled(
    &[
      ("/src/entry.js", "import fn from 'demo-pkg';\n"),
      (
        "/node_modules/demo-pkg/package.json",
        "{\n  \"a\": 1,\n  \"b\": 2,\n}",
      ),
      ("/node_modules/demo-pkg/index.js", "module.exports = 1;\n"),
    ],
    &["/src/entry.js"],
    |_, _| {},
  );
  assert_eq!(result.log, vec![
    "/node_modules/demo-pkg/package.json: error: JSON does not support trailing commas",
  ]);
}
