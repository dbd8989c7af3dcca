mod common;

use common::bundled;
use common::expect_clean;

#[test]
fn simple_es6_imports_inline() {
  let result = bundled(
    &[
      ("/entry.js", "import {fn} from './foo';\nconsole.log(fn());\n"),
      ("/foo.js", "export function fn() {\n  return 123;\n}\n"),
    ],
    &["/entry.js"],
    |_, _| {},
  );
  expect_clean(&result);
  assert_eq!(
    result.output("/out.js"),
    "// /foo.js\nfunction fn() {\n  return 123;\n}\n\n// /entry.js\nconsole.log(fn());\n"
  );
}

#[test]
fn export_chain_resolves_to_the_defining_symbol() {
  let result = bundled(
    &[
      ("/entry.js", "export {b as a} from './foo';\n"),
      ("/foo.js", "export {c as b} from './bar';\n"),
      ("/bar.js", "export const c = 123;\n"),
    ],
    &["/entry.js"],
    |_, _| {},
  );
  expect_clean(&result);
  assert_eq!(
    result.output("/out.js"),
    "bootstrap({\n  1(exports) {\n    // /bar.js\n    const c = 123;\n\n    // /foo.js\n\n    // /entry.js\n    __export(exports, {\n      a: () => c\n    });\n  }\n}, 1);\n"
  );
}

#[test]
fn export_forms_emit_through_bootstrap() {
  let result = bundled(
    &[
      (
        "/entry.js",
        "export default 123;\nexport var v = 234;\nexport {Class as C};\nexport function Fn() {}\nexport class Class {}\nexport * from './a';\nexport * as b from './b';\n",
      ),
      ("/a.js", "export const abc = undefined;\n"),
      ("/b.js", "export const xyz = null;\n"),
    ],
    &["/entry.js"],
    |_, _| {},
  );
  expect_clean(&result);
  assert_eq!(
    result.output("/out.js"),
    concat!(
      "bootstrap({\n",
      "  1(exports) {\n",
      "    // /a.js\n",
      "    const abc = void 0;\n",
      "\n",
      "    // /b.js\n",
      "    var b = {};\n",
      "    __export(b, {\n",
      "      xyz: () => xyz\n",
      "    });\n",
      "    const xyz = null;\n",
      "\n",
      "    // /entry.js\n",
      "    __export(exports, {\n",
      "      C: () => Class,\n",
      "      Class: () => Class,\n",
      "      Fn: () => Fn,\n",
      "      abc: () => abc,\n",
      "      b: () => b,\n",
      "      default: () => default2,\n",
      "      v: () => v\n",
      "    });\n",
      "    const default2 = 123;\n",
      "    var v = 234;\n",
      "    function Fn() {\n",
      "    }\n",
      "    class Class {\n",
      "    }\n",
      "  }\n",
      "}, 1);\n",
    )
  );
}

#[test]
fn export_self_namespace_reuses_the_exports_object() {
  let result = bundled(
    &[(
      "/entry.js",
      "export const foo = 123;\nexport * as ns from './entry';\n",
    )],
    &["/entry.js"],
    |_, _| {},
  );
  expect_clean(&result);
  assert_eq!(
    result.output("/out.js"),
    "bootstrap({\n  1(exports) {\n    // /entry.js\n    __export(exports, {\n      foo: () => foo,\n      ns: () => exports\n    });\n    const foo = 123;\n  }\n}, 1);\n"
  );
}

#[test]
fn export_star_from_self_is_a_no_op() {
  let result = bundled(
    &[(
      "/entry.js",
      "export const foo = 123;\nexport * from './entry';\n",
    )],
    &["/entry.js"],
    |_, _| {},
  );
  expect_clean(&result);
  assert_eq!(
    result.output("/out.js"),
    "bootstrap({\n  1(exports) {\n    // /entry.js\n    __export(exports, {\n      foo: () => foo\n    });\n    const foo = 123;\n  }\n}, 1);\n"
  );
}

#[test]
fn namespace_import_synthesizes_an_object() {
  let result = bundled(
    &[
      (
        "/entry.js",
        "import * as ns from './foo';\nconsole.log(ns.fn());\n",
      ),
      ("/foo.js", "export function fn() {}\n"),
    ],
    &["/entry.js"],
    |_, _| {},
  );
  expect_clean(&result);
  assert_eq!(
    result.output("/out.js"),
    "// /foo.js\nvar foo = {};\n__export(foo, {\n  fn: () => fn\n});\nfunction fn() {\n}\n\n// /entry.js\nconsole.log(foo.fn());\n"
  );
}

#[test]
fn hashbang_of_the_entry_survives() {
  let result = bundled(
    &[
      (
        "/entry.js",
        "#!/usr/bin/env a\nimport {code} from './code';\nprocess.exit(code);\n",
      ),
      ("/code.js", "#!/usr/bin/env b\nexport const code = 0;\n"),
    ],
    &["/entry.js"],
    |_, _| {},
  );
  expect_clean(&result);
  assert_eq!(
    result.output("/out.js"),
    "#!/usr/bin/env a\n\n// /code.js\nconst code = 0;\n\n// /entry.js\nprocess.exit(code);\n"
  );
}

#[test]
fn jsx_imports_bind_to_esm_exports() {
  let result = bundled(
    &[
      (
        "/entry.jsx",
        "import {elem, frag} from './custom-react';\nconsole.log(<div/>, <>fragment</>);\n",
      ),
      (
        "/custom-react.js",
        "export function elem() {}\nexport function frag() {}\n",
      ),
    ],
    &["/entry.jsx"],
    |options, _| {
      options.jsx_factory = vec!["elem".to_string()];
      options.jsx_fragment = vec!["frag".to_string()];
    },
  );
  expect_clean(&result);
  assert_eq!(
    result.output("/out.js"),
    "// /custom-react.js\nfunction elem() {\n}\nfunction frag() {\n}\n\n// /entry.jsx\nconsole.log(elem(\"div\", null), elem(frag, null, \"fragment\"));\n"
  );
}

#[test]
fn import_bindings_are_renamed_with_their_definitions() {
  // The same original name in two modules gets a deterministic suffix.
  let result = bundled(
    &[
      (
        "/entry.js",
        "import {value} from './a';\nconst value2 = 1;\nconsole.log(value, value2);\n",
      ),
      ("/a.js", "export const value = 2;\n"),
    ],
    &["/entry.js"],
    |_, _| {},
  );
  expect_clean(&result);
  // `value` has one use from the entry; the entry's own `value2` keeps
  // its name and the import resolves to the canonical symbol.
  assert_eq!(
    result.output("/out.js"),
    "// /a.js\nconst value = 2;\n\n// /entry.js\nconst value2 = 1;\nconsole.log(value, value2);\n"
  );
}

#[test]
fn multiple_entries_share_the_graph() {
  let result = bundled(
    &[
      ("/one.js", "import {shared} from './shared';\nconsole.log(shared, 1);\n"),
      ("/two.js", "import {shared} from './shared';\nconsole.log(shared, 2);\n"),
      ("/shared.js", "export const shared = 'x';\n"),
    ],
    &["/one.js", "/two.js"],
    |options, _| {
      options.abs_output_file = None;
      options.abs_output_dir = Some("/out".to_string());
    },
  );
  expect_clean(&result);
  assert_eq!(
    result.output("/out/one.js"),
    "// /shared.js\nconst shared = \"x\";\n\n// /one.js\nconsole.log(shared, 1);\n"
  );
  assert_eq!(
    result.output("/out/two.js"),
    "// /shared.js\nconst shared = \"x\";\n\n// /two.js\nconsole.log(shared, 2);\n"
  );
}
