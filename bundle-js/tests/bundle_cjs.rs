mod common;

use common::bundled;
use common::expect_clean;

#[test]
fn simple_commonjs_require() {
  let result = bundled(
    &[
      (
        "/entry.js",
        "const fn = require('./foo');\nconsole.log(fn());\n",
      ),
      (
        "/foo.js",
        "module.exports = function() {\n  return 123;\n};\n",
      ),
    ],
    &["/entry.js"],
    |_, _| {},
  );
  expect_clean(&result);
  assert_eq!(
    result.output("/out.js"),
    concat!(
      "// /foo.js\n",
      "var require_foo = __commonJS((exports, module) => {\n",
      "  module.exports = function() {\n",
      "    return 123;\n",
      "  };\n",
      "});\n",
      "\n",
      "// /entry.js\n",
      "const fn = require_foo();\n",
      "console.log(fn());\n",
    )
  );
}

#[test]
fn require_is_recognized_in_nested_scopes() {
  let result = bundled(
    &[
      (
        "/entry.js",
        "function nestedScope() {\n  const fn = require('./foo');\n  console.log(fn());\n}\nnestedScope();\n",
      ),
      (
        "/foo.js",
        "module.exports = function() {\n  return 123;\n};\n",
      ),
    ],
    &["/entry.js"],
    |_, _| {},
  );
  expect_clean(&result);
  assert_eq!(
    result.output("/out.js"),
    concat!(
      "// /foo.js\n",
      "var require_foo = __commonJS((exports, module) => {\n",
      "  module.exports = function() {\n",
      "    return 123;\n",
      "  };\n",
      "});\n",
      "\n",
      "// /entry.js\n",
      "function nestedScope() {\n",
      "  const fn = require_foo();\n",
      "  console.log(fn());\n",
      "}\n",
      "nestedScope();\n",
    )
  );
}

#[test]
fn es6_import_of_commonjs_goes_through_to_module() {
  let result = bundled(
    &[
      (
        "/entry.js",
        "import {fn} from './foo';\nconsole.log(fn());\n",
      ),
      ("/foo.js", "exports.fn = function() {\n  return 123;\n};\n"),
    ],
    &["/entry.js"],
    |_, _| {},
  );
  expect_clean(&result);
  assert_eq!(
    result.output("/out.js"),
    concat!(
      "// /foo.js\n",
      "var require_foo = __commonJS((exports) => {\n",
      "  exports.fn = function() {\n",
      "    return 123;\n",
      "  };\n",
      "});\n",
      "\n",
      "// /entry.js\n",
      "const foo = __toModule(require_foo());\n",
      "console.log(foo.fn());\n",
    )
  );
}

#[test]
fn missing_named_imports_from_commonjs_read_members() {
  // No diagnostics: a CommonJS target resolves member reads at runtime.
  let result = bundled(
    &[
      (
        "/entry.js",
        "import fn, {x as a, y as b} from './foo';\nconsole.log(fn(a, b));\n",
      ),
      ("/foo.js", "exports.x = 132;\n"),
    ],
    &["/entry.js"],
    |_, _| {},
  );
  expect_clean(&result);
  assert_eq!(
    result.output("/out.js"),
    concat!(
      "// /foo.js\n",
      "var require_foo = __commonJS((exports) => {\n",
      "  exports.x = 132;\n",
      "});\n",
      "\n",
      "// /entry.js\n",
      "const foo = __toModule(require_foo());\n",
      "console.log(foo.default(foo.x, foo.y));\n",
    )
  );
}

#[test]
fn require_of_an_esm_module_uses_its_namespace() {
  let result = bundled(
    &[
      (
        "/entry.js",
        "const {fn} = require('./foo');\nconsole.log(fn());\n",
      ),
      ("/foo.js", "export function fn() {\n  return 123;\n}\n"),
    ],
    &["/entry.js"],
    |_, _| {},
  );
  expect_clean(&result);
  // The entry's destructured `fn` wins the name; the module's function
  // is renamed.
  assert_eq!(
    result.output("/out.js"),
    concat!(
      "// /foo.js\n",
      "var foo = {};\n",
      "__export(foo, {\n",
      "  fn: () => fn2\n",
      "});\n",
      "function fn2() {\n",
      "  return 123;\n",
      "}\n",
      "\n",
      "// /entry.js\n",
      "const {fn} = foo;\n",
      "console.log(fn());\n",
    )
  );
}

#[test]
fn require_json_synthesizes_a_commonjs_module() {
  let result = bundled(
    &[
      ("/entry.js", "console.log(require('./test.json'));\n"),
      ("/test.json", "{\"a\": true, \"b\": 123, \"c\": [null]}"),
    ],
    &["/entry.js"],
    |_, _| {},
  );
  expect_clean(&result);
  assert_eq!(
    result.output("/out.js"),
    concat!(
      "// /test.json\n",
      "var require_test = __commonJS((exports, module) => {\n",
      "  module.exports = {\n",
      "    a: true,\n",
      "    b: 123,\n",
      "    c: [null]\n",
      "  };\n",
      "});\n",
      "\n",
      "// /entry.js\n",
      "console.log(require_test());\n",
    )
  );
}

#[test]
fn require_txt_uses_the_text_loader() {
  let result = bundled(
    &[
      ("/entry.js", "console.log(require('./test.txt'));\n"),
      ("/test.txt", "This is a test."),
    ],
    &["/entry.js"],
    |options, _| {
      options
        .extension_to_loader
        .insert(".txt".to_string(), bundle_js::loader::Loader::Text);
    },
  );
  expect_clean(&result);
  assert_eq!(
    result.output("/out.js"),
    concat!(
      "// /test.txt\n",
      "var require_test = __commonJS((exports, module) => {\n",
      "  module.exports = \"This is a test.\";\n",
      "});\n",
      "\n",
      "// /entry.js\n",
      "console.log(require_test());\n",
    )
  );
}

#[test]
fn base64_and_dataurl_loaders() {
  let result = bundled(
    &[
      (
        "/entry.js",
        "console.log(require('./a.bin'), require('./b.svg'));\n",
      ),
      ("/a.bin", "ab"),
      ("/b.svg", "<svg/>"),
    ],
    &["/entry.js"],
    |options, _| {
      options
        .extension_to_loader
        .insert(".bin".to_string(), bundle_js::loader::Loader::Base64);
      options
        .extension_to_loader
        .insert(".svg".to_string(), bundle_js::loader::Loader::DataUrl);
    },
  );
  expect_clean(&result);
  let out = result.output("/out.js");
  assert!(out.contains("module.exports = \"YWI=\";"));
  assert!(out.contains("module.exports = \"data:image/svg+xml;base64,"));
}

#[test]
fn typeof_require_is_constant_when_bundling() {
  let result = bundled(
    &[("/entry.js", "console.log(typeof require);\n")],
    &["/entry.js"],
    |_, _| {},
  );
  expect_clean(&result);
  assert_eq!(
    result.output("/out.js"),
    "// /entry.js\nconsole.log(\"function\");\n"
  );
}

#[test]
fn top_level_this_becomes_the_exports_object() {
  let result = bundled(
    &[("/entry.js", "console.log(this);\n")],
    &["/entry.js"],
    |_, _| {},
  );
  expect_clean(&result);
  assert_eq!(
    result.output("/out.js"),
    "bootstrap({\n  1(exports) {\n    // /entry.js\n    console.log(exports);\n  }\n}, 1);\n"
  );
}

#[test]
fn top_level_return_forces_a_wrapper() {
  let result = bundled(
    &[
      (
        "/entry.js",
        "import {foo} from './foo';\nfoo();\n",
      ),
      (
        "/foo.js",
        "if (Math.random() < 0.5) return;\nexport function foo() {}\n",
      ),
    ],
    &["/entry.js"],
    |_, _| {},
  );
  expect_clean(&result);
  assert_eq!(
    result.output("/out.js"),
    concat!(
      "// /foo.js\n",
      "var require_foo = __commonJS((exports) => {\n",
      "  __export(exports, {\n",
      "    foo: () => foo2\n",
      "  });\n",
      "  if (Math.random() < 0.5)\n",
      "    return;\n",
      "  function foo2() {\n",
      "  }\n",
      "});\n",
      "\n",
      "// /entry.js\n",
      "const foo = __toModule(require_foo());\n",
      "foo.foo();\n",
    )
  );
}

#[test]
fn node_platform_externals_stay_require_calls() {
  let result = bundled(
    &[("/entry.js", "return require('fs');\n")],
    &["/entry.js"],
    |_, resolve| {
      resolve.platform = bundle_js::resolver::Platform::Node;
    },
  );
  expect_clean(&result);
  assert_eq!(
    result.output("/out.js"),
    "bootstrap({\n  1() {\n    // /entry.js\n    return require(\"fs\");\n  }\n}, 1);\n"
  );
}

#[test]
fn external_imports_get_interop_per_statement() {
  let result = bundled(
    &[(
      "/entry.js",
      "import 'fs';\nimport * as fs from 'fs';\nimport defaultValue from 'fs';\nimport {readFileSync} from 'fs';\nconsole.log(fs, readFileSync, defaultValue);\n",
    )],
    &["/entry.js"],
    |_, resolve| {
      resolve.platform = bundle_js::resolver::Platform::Node;
    },
  );
  expect_clean(&result);
  assert_eq!(
    result.output("/out.js"),
    concat!(
      "// /entry.js\n",
      "const fs = __toModule(require(\"fs\"));\n",
      "const fs2 = __toModule(require(\"fs\"));\n",
      "const fs3 = __toModule(require(\"fs\"));\n",
      "const fs4 = __toModule(require(\"fs\"));\n",
      "console.log(fs2, fs4.readFileSync, fs3.default);\n",
    )
  );
}

#[test]
fn dynamic_import_defers_execution() {
  let result = bundled(
    &[
      ("/entry.js", "import('./foo').then(ns => ns.fn());\n"),
      ("/foo.js", "export function fn() {}\n"),
    ],
    &["/entry.js"],
    |_, _| {},
  );
  expect_clean(&result);
  assert_eq!(
    result.output("/out.js"),
    concat!(
      "// /foo.js\n",
      "var require_foo = __commonJS((exports) => {\n",
      "  __export(exports, {\n",
      "    fn: () => fn\n",
      "  });\n",
      "  function fn() {\n",
      "  }\n",
      "});\n",
      "\n",
      "// /entry.js\n",
      "Promise.resolve().then(() => __toModule(require_foo())).then((ns) => ns.fn());\n",
    )
  );
}
