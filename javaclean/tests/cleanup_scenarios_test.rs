//! End-to-end fix aggregation over sources that mix transformation families.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use javaclean::config::{BraceStyle, CleanUpOptions};
use javaclean::fixer::FixAggregator;
use javaclean::test_utils::parse;

fn run(source: &str, options: &CleanUpOptions) -> String {
    let tree = parse(source).expect("should parse");
    let result = FixAggregator::new().compute(&tree, options);
    result.realize(source).expect("should realize")
}

#[test]
fn test_indexed_loop_becomes_element_loop() {
    let options = CleanUpOptions {
        convert_indexed_loops: true,
        ..CleanUpOptions::default()
    };
    let source = "int[] arr = new int[10];\n\
                  for (int i = 0; i < arr.length; i++) { System.out.println(arr[i]); }";
    assert_eq!(
        run(source, &options),
        "int[] arr = new int[10];\n\
         for (int element : arr) { System.out.println(element); }"
    );
}

#[test]
fn test_brace_removal() {
    let options = CleanUpOptions {
        control_statement_braces: Some(BraceStyle::Never),
        ..CleanUpOptions::default()
    };
    assert_eq!(run("if (b) { foo(); }", &options), "if (b) foo();");
}

#[test]
fn test_brace_addition() {
    let options = CleanUpOptions {
        control_statement_braces: Some(BraceStyle::Always),
        ..CleanUpOptions::default()
    };
    assert_eq!(run("if (b) foo();", &options), "if (b) { foo(); }");
}

#[test]
fn test_literal_concat_merges() {
    let options = CleanUpOptions {
        merge_string_concat: true,
        ..CleanUpOptions::default()
    };
    assert_eq!(
        run("String s = \"a\" + \"b\" + \"c\";", &options),
        "String s = \"abc\";"
    );
}

#[test]
fn test_families_compose_without_conflicts() {
    // The element-loop family consumes the whole loop, so the brace family
    // must leave the converted body alone while still fixing the if below.
    let options = CleanUpOptions {
        control_statement_braces: Some(BraceStyle::Never),
        convert_indexed_loops: true,
        merge_string_concat: true,
        ..CleanUpOptions::default()
    };
    let source = "int[] arr = new int[10];\n\
                  for (int i = 0; i < arr.length; i++) { use(arr[i]); }\n\
                  if (b) { foo(); }\n\
                  String s = \"a\" + \"b\";";
    assert_eq!(
        run(source, &options),
        "int[] arr = new int[10];\n\
         for (int element : arr) { use(element); }\n\
         if (b) foo();\n\
         String s = \"ab\";"
    );
}

#[test]
fn test_disabled_options_change_nothing() {
    let source = "if (b) { foo(); }\nString s = \"a\" + \"b\";";
    let tree = parse(source).expect("should parse");
    let result = FixAggregator::new().compute(&tree, &CleanUpOptions::default());
    assert!(result.is_empty());
    assert_eq!(result.realize(source).expect("should realize"), source);
}

#[test]
fn test_fix_labels_and_previews() {
    let options = CleanUpOptions {
        merge_string_concat: true,
        ..CleanUpOptions::default()
    };
    let source = "String s = \"a\" + \"b\";";
    let tree = parse(source).expect("should parse");
    let result = FixAggregator::new().compute(&tree, &options);
    assert_eq!(result.fixes.len(), 1);
    assert_eq!(result.fixes[0].label, "Merge string concatenation");
    let previews = result.previews(source);
    assert_eq!(previews.len(), 1);
    assert_eq!(previews[0].before, "\"a\" + \"b\"");
    assert_eq!(previews[0].after, "\"ab\"");
}

#[test]
fn test_parser_recovered_regions_are_skipped() {
    let options = CleanUpOptions {
        control_statement_braces: Some(BraceStyle::Never),
        ..CleanUpOptions::default()
    };
    let source = "#garbage; if (b) { foo(); }";
    assert_eq!(run(source, &options), "#garbage; if (b) foo();");
}
