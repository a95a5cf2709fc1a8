//! Indexed-loop conversion: accepted shapes and soundness rejections.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use javaclean::config::CleanUpOptions;
use javaclean::fixer::FixAggregator;
use javaclean::test_utils::parse;

fn options() -> CleanUpOptions {
    CleanUpOptions {
        convert_indexed_loops: true,
        ..CleanUpOptions::default()
    }
}

fn run(source: &str) -> String {
    let tree = parse(source).expect("should parse");
    let result = FixAggregator::new().compute(&tree, &options());
    result.realize(source).expect("should realize")
}

#[test]
fn test_array_loop_converts() {
    let source = "int[] arr = new int[10];\n\
                  for (int i = 0; i < arr.length; i++) { use(arr[i]); }";
    assert_eq!(
        run(source),
        "int[] arr = new int[10];\nfor (int element : arr) { use(element); }"
    );
}

#[test]
fn test_update_variants_convert() {
    let pre = "int[] arr = new int[10];\n\
               for (int i = 0; i < arr.length; ++i) { use(arr[i]); }";
    let compound = "int[] arr = new int[10];\n\
                    for (int i = 0; i < arr.length; i += 1) { use(arr[i]); }";
    let expected = "int[] arr = new int[10];\nfor (int element : arr) { use(element); }";
    assert_eq!(run(pre), expected);
    assert_eq!(run(compound), expected);
}

#[test]
fn test_flipped_bound_comparison_converts() {
    let source = "int[] arr = new int[10];\n\
                  for (int i = 0; arr.length > i; i++) { use(arr[i]); }";
    assert_eq!(
        run(source),
        "int[] arr = new int[10];\nfor (int element : arr) { use(element); }"
    );
}

#[test]
fn test_collection_loop_with_cached_size_converts() {
    let source = "java.util.List<String> names = x;\n\
                  for (int i = 0, n = names.size(); i < n; i++) { use(names.get(i)); }";
    assert_eq!(
        run(source),
        "java.util.List<String> names = x;\nfor (String name : names) { use(name); }"
    );
}

#[test]
fn test_first_statement_element_declaration_is_reused() {
    let source = "int[] arr = new int[10];\n\
                  for (int i = 0; i < arr.length; i++) { int v = arr[i]; use(v); }";
    assert_eq!(
        run(source),
        "int[] arr = new int[10];\nfor (int v : arr) { use(v); }"
    );
}

#[test]
fn test_element_write_is_rejected() {
    let source = "int[] arr = new int[10];\n\
                  for (int i = 0; i < arr.length; i++) { arr[i] = 0; }";
    assert_eq!(run(source), source);
}

#[test]
fn test_index_arithmetic_is_rejected() {
    let source = "int[] arr = new int[10];\n\
                  for (int i = 0; i < arr.length; i++) { use(arr[i + 1]); }";
    assert_eq!(run(source), source);
}

#[test]
fn test_continue_in_body_is_rejected() {
    let source = "int[] arr = new int[10];\n\
                  for (int i = 0; i < arr.length; i++) { if (b) continue; use(arr[i]); }";
    assert_eq!(run(source), source);
}

#[test]
fn test_bare_index_use_is_rejected() {
    let source = "int[] arr = new int[10];\n\
                  for (int i = 0; i < arr.length; i++) { use(i); }";
    assert_eq!(run(source), source);
}

#[test]
fn test_descending_loop_is_rejected() {
    let source = "int[] arr = new int[10];\n\
                  for (int i = 0; i < arr.length; i--) { use(arr[i]); }";
    assert_eq!(run(source), source);
}

#[test]
fn test_unrelated_receiver_method_is_rejected() {
    let source = "java.util.List<String> names = x;\n\
                  for (int i = 0; i < names.size(); i++) { names.remove(i); }";
    assert_eq!(run(source), source);
}

#[test]
fn test_fresh_name_carries_a_linked_proposal_group() {
    let source = "java.util.List<String> names = x;\n\
                  for (int i = 0; i < names.size(); i++) { use(names.get(i)); }";
    let tree = parse(source).expect("should parse");
    let result = FixAggregator::new().compute(&tree, &options());
    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].first(), Some("name"));
}

#[test]
fn test_reused_declaration_proposes_no_group() {
    let source = "int[] arr = new int[10];\n\
                  for (int i = 0; i < arr.length; i++) { int v = arr[i]; use(v); }";
    let tree = parse(source).expect("should parse");
    let result = FixAggregator::new().compute(&tree, &options());
    assert!(result.groups.is_empty());
}
