//! Snapshot tests for whole-module translation.
//!
//! Each case translates a small Python module and pins the TypeScript text.
//! Run `cargo insta review` to update snapshots after intentional changes.

use pyts_transpile::{translate, translate_with, FallbackKind, TranslateOptions};

fn ts(source: &str) -> String {
    translate(source).expect("translation failed").text
}

// ============================================================================
// Declarations - where `let` goes
// ============================================================================

mod declarations {
    use super::*;

    #[test]
    fn straight_line_assignment() {
        insta::assert_snapshot!(ts("x = 1\nx = x + 1\n"), @r###"
        let x = 1;
        x = (x + 1);
        "###);
    }

    #[test]
    fn branch_assignment_is_predeclared() {
        insta::assert_snapshot!(ts("if c:\n    x = 1\nelse:\n    x = 2\nprint(x)\n"), @r###"
        import { print } from "@pyts/runtime";

        let x;
        if (c) {
          x = 1;
        } else {
          x = 2;
        }
        print(x);
        "###);
    }

    #[test]
    fn function_branch_assignment_is_predeclared() {
        let source = "def f(c):\n    if c:\n        y = 1\n    else:\n        y = 2\n    return y\n";
        insta::assert_snapshot!(ts(source), @r###"
        function f(c) {
          let y;
          if (c) {
            y = 1;
          } else {
            y = 2;
          }
          return y;
        }
        "###);
    }

    #[test]
    fn function_local_shadows_module_name() {
        insta::assert_snapshot!(ts("x = 0\ndef f():\n    x = 5\n    return x\n"), @r###"
        let x = 0;
        function f() {
          let x = 5;
          return x;
        }
        "###);
    }

    #[test]
    fn name_bound_in_loop_body_is_declared_before_the_loop() {
        insta::assert_snapshot!(ts("for i in range(3):\n    total = i\nprint(total)\n"), @r###"
        import { print, range } from "@pyts/runtime";

        let total;
        for (let i of range(3)) {
          total = i;
        }
        print(total);
        "###);
    }

    #[test]
    fn destructuring_declares_only_new_names() {
        let text = ts("a = 1\na, b = f()\n");
        assert!(text.contains("let b;\n"), "{text}");
        assert!(!text.contains("let a;"), "{text}");
        assert!(text.contains("] = f();"), "{text}");
    }

    #[test]
    fn loop_variable() {
        insta::assert_snapshot!(ts("for i in range(3):\n    print(i)\n"), @r###"
        import { print, range } from "@pyts/runtime";

        for (let i of range(3)) {
          print(i);
        }
        "###);
    }

    #[test]
    fn loop_else_runs_without_break() {
        let source = "for x in xs:\n    if x:\n        break\nelse:\n    print(\"none\")\n";
        insta::assert_snapshot!(ts(source), @r###"
        import { print } from "@pyts/runtime";

        let __noBreak0 = true;
        for (let x of xs) {
          if (x) {
            __noBreak0 = false;
            break;
          }
        }
        if (__noBreak0) {
          print("none");
        }
        "###);
    }
}

// ============================================================================
// Operators - runtime primitives where semantics diverge
// ============================================================================

mod operators {
    use super::*;

    #[test]
    fn floor_division_imports_its_primitive() {
        insta::assert_snapshot!(ts("x = 7 // 2\n"), @r###"
        import { floordiv } from "@pyts/runtime";

        let x = floordiv(7, 2);
        "###);
    }

    #[test]
    fn chained_comparison_evaluates_middle_once() {
        insta::assert_snapshot!(ts("ok = 0 < f() < 10\n"), @r###"
        let __cmp0;
        let ok = ((0 < (__cmp0 = f())) && (__cmp0 < 10));
        "###);
    }

    #[test]
    fn negative_index_and_slice() {
        insta::assert_snapshot!(ts("last = xs[-1]\nhead = xs[:2]\n"), @r###"
        import { at, slice } from "@pyts/runtime";

        let last = at(xs, -1);
        let head = slice(xs, undefined, 2, undefined);
        "###);
    }

    #[test]
    fn any_negated_index_counts_from_the_end() {
        let result = translate("a = xs[-n]\nb = xs[-(1)]\nxs[-k] = 0\n").unwrap();
        let text = result.text;
        assert!(text.contains("let a = at(xs, -n);"), "{text}");
        assert!(text.contains("let b = at(xs, -"), "{text}");
        assert!(text.contains("xs[xs.length - k] = 0;"), "{text}");
        assert_eq!(result.required, vec!["at"]);
    }

    #[test]
    fn membership_uses_is_in() {
        let result = translate("found = k in d\n").unwrap();
        assert!(result.text.contains("let found = isIn(k, d);"));
        assert_eq!(result.required, vec!["isIn"]);
    }

    #[test]
    fn no_primitives_no_prologue() {
        let result = translate("x = 1 + 2\n").unwrap();
        assert!(result.required.is_empty());
        assert!(!result.text.contains("import"));
    }
}

// ============================================================================
// Functions and calls
// ============================================================================

mod functions {
    use super::*;

    #[test]
    fn keyword_only_parameters_become_options_object() {
        let source = "def f(a, *, b, c=10):\n    return a + b + c\n\nf(1, b=2)\n";
        insta::assert_snapshot!(ts(source), @r###"
        function f(a, { b, c = 10 }: { b: any; c?: any }) {
          return ((a + b) + c);
        }
        f(1, { b: 2 });
        "###);
    }

    #[test]
    fn generator_argument_is_lazy() {
        let result = translate("total = sum(x for x in xs)\n").unwrap();
        assert!(
            result
                .text
                .contains("sum((function* () { for (const x of xs) { yield x; } })())"),
            "{}",
            result.text
        );
        assert_eq!(result.required, vec!["sum"]);
    }

    #[test]
    fn list_comprehension_is_a_method_chain() {
        insta::assert_snapshot!(ts("ys = [x * 2 for x in xs if x > 0]\n"), @"let ys = xs.filter((x) => (x > 0)).map((x) => (x * 2));");
    }

    #[test]
    fn fstring_is_a_template_literal() {
        insta::assert_snapshot!(ts("msg = f\"hi {name}!\"\n"), @r###"
        import { str } from "@pyts/runtime";

        let msg = `hi ${str(name)}!`;
        "###);
    }

    #[test]
    fn nested_import_is_hoisted() {
        let result = translate("def load():\n    import json\n    return json\n").unwrap();
        assert_eq!(result.hoisted_imports, vec!["import * as json from \"json\";"]);
        assert!(result.text.starts_with("import * as json from \"json\";\n\nfunction load() {"));
    }
}

// ============================================================================
// Classes
// ============================================================================

mod classes {
    use super::*;

    #[test]
    fn plain_class_with_constructor() {
        let source = "class Counter:\n    def __init__(self, start):\n        self.count = start\n\n    def bump(self):\n        self.count += 1\n        return self.count\n\nc = Counter(1)\n";
        insta::assert_snapshot!(ts(source), @r###"
        class Counter {
          count: number;
          constructor(start) {
            this.count = start;
          }
          bump() {
            this.count += 1;
            return this.count;
          }
        }
        let c = new Counter(1);
        "###);
    }

    #[test]
    fn dataclass_gets_a_constructor() {
        let source = "from dataclasses import dataclass\n\n@dataclass\nclass Point:\n    x: int\n    y: int = 0\n\np = Point(1, y=2)\n";
        insta::assert_snapshot!(ts(source), @r###"
        class Point {
          x: number;
          y: number;
          constructor(x: number, y: number = 0) {
            this.x = x;
            this.y = y;
          }
        }
        let p = new Point(1, 2);
        "###);
    }

    #[test]
    fn class_level_fields_take_modifiers() {
        let source = "from typing import ClassVar, Final\n\nclass C:\n    \"\"\"A counter.\"\"\"\n    count: ClassVar[int] = 0\n    name: Final[str] = \"x\"\n";
        insta::assert_snapshot!(ts(source), @r###"
        /** A counter. */
        class C {
          static count: number = 0;
          readonly name: string = "x";
        }
        "###);
    }

    #[test]
    fn method_docstring_is_not_emitted_as_code() {
        let source = "class P:\n    def area(self):\n        \"\"\"Area.\"\"\"\n        return 1\n";
        let text = ts(source);
        assert!(text.contains("/** Area. */"), "{text}");
        assert!(!text.contains("\"Area.\";"), "{text}");
        assert!(!text.contains("\"\"\""), "{text}");
    }
}

// ============================================================================
// Exceptions
// ============================================================================

mod exceptions {
    use super::*;

    #[test]
    fn typed_handler_rethrows_the_rest() {
        let result = translate("try:\n    risky()\nexcept ValueError as e:\n    print(e)\n").unwrap();
        let text = result.text;
        assert!(text.contains("} catch (e) {"), "{text}");
        assert!(text.contains("if (e instanceof ValueError) {"), "{text}");
        assert!(text.contains("throw e;"), "{text}");
        assert_eq!(result.required, vec!["ValueError", "print"]);
    }

    #[test]
    fn bare_raise_outside_handler() {
        let text = ts("raise\n");
        assert!(text.contains("throw new RuntimeError(\"No active exception to reraise\");"));
    }
}

// ============================================================================
// Fallbacks and determinism
// ============================================================================

mod fallbacks {
    use super::*;

    #[test]
    fn unsupported_statement_is_recorded() {
        let options = TranslateOptions {
            diagnostics: true,
            ..TranslateOptions::default()
        };
        let source = "match x:\n    case 1:\n        pass\n";
        let result = translate_with(source, &options).unwrap();
        assert!(result.text.starts_with("match x:"));
        let [diagnostic] = result.diagnostics.as_slice() else {
            panic!("expected one diagnostic, got {:?}", result.diagnostics);
        };
        assert_eq!(diagnostic.kind, FallbackKind::Unsupported);
        assert_eq!(diagnostic.node_kind, "match_statement");
        assert_eq!((diagnostic.line, diagnostic.column), (1, 1));
    }

    #[test]
    fn passthrough_keeps_wide_whitespace_intact() {
        let source = "def f(x):\n    match x:\n        case 1:\n            y = \"\"\"a\n  \u{3000}b\"\"\"\n";
        let result = translate(source).unwrap();
        assert!(result.text.contains("\u{3000}b\"\"\""), "{}", result.text);
    }

    #[test]
    fn diagnostics_off_by_default() {
        let result = translate("match x:\n    case 1:\n        pass\n").unwrap();
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn translation_is_deterministic() {
        let source = "from typing import TypeVar\nT = TypeVar(\"T\")\nU = TypeVar(\"U\")\ndef pair(a: T, b: U) -> list[T | U]:\n    return [a, b]\n";
        let first = ts(source);
        for _ in 0..5 {
            assert_eq!(ts(source), first);
        }
        assert!(first.contains("function pair<T, U>("), "{first}");
    }
}
