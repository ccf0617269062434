//! Integration tests for Doxgraph
//!
//! These tests run the extractor, builder and resolver together over real
//! files on disk, and drive the CLI binary.

use doxgraph_core::{DiagnosticKind, SymbolKey, SymbolKind, load_graph, outline, render_outline, save_graph};
use doxgraph_indexer::{Coordinator, IndexerConfig, extract_files};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const A_CPP: &str = r#"/**
 * \brief Root namespace of the example project
 *
 */
namespace my_project {

/**
 * \defgroup a Group A
 * \brief The A group
 * @{
 */

/**
 * \brief A struct
 */
struct MyStruct {

    /**
     * \brief A method
     */
    void method();
};

/**
 * \brief A function inside the group
 */
void f();

/**
 * @}
 */

} // namespace my_project


/**
 * \defgroup b Group B
 */

/**
 * \ingroup b
 * \brief A function
 */
void function_outside_group();
"#;

const EXAMPLE_HPP: &str = r#"///
/// \file
/// \author Jon Doe (jon@example.com)
/// \brief Example doxygen header
/// \version 0.1
/// \date 2023-03-23
///
/// \copyright Copyright (c) 2023 Advanced Micro Devices Inc.

#include "example1.hpp"

///
/// \brief A namespace
namespace example {

///
/// \brief Example class
class Example {
public:
    ///
    /// \brief This is a method taking no arguments
    void method();

    ///
    /// \brief Example method taking parameters
    /// \param param The parameter
    /// \return description of the return value
    int method2(int param);
protected:
    ///
    /// \brief This is a protected static member
    static int static_member;
private:
    ///
    /// \brief This is a private static method
    static void static_method();
};

///
/// \brief Example class 2 to showcase class hierarchies
class Example2 : public Example {};

///
/// \brief Example of a template function
///
/// \tparam T Template parameter
/// \param a parameter
template <typename T>
void template_fun(T a);

} // namespace example

///
/// \brief A function in the global scope
///
void freestanding_function();

///
/// \defgroup group1 First Group
/// @{

///
/// \brief A struct
///
struct struct_in_group_1 {};

///
/// @}

///
/// \defgroup group2 Second Group

///
/// \brief An enumeration
/// \ingroup group2
enum Enum {
    Value1 = 1,  ///< First Enumerator
    Value2 = 17, ///< Second Enum
    Undocumented // Undocumented
};
"#;

fn fixture_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("A.cpp"), A_CPP).unwrap();
    std::fs::write(dir.path().join("example.hpp"), EXAMPLE_HPP).unwrap();
    std::fs::write(dir.path().join("README.md"), "not a source file\n").unwrap();
    dir
}

fn fixture_files(root: &Path) -> Vec<PathBuf> {
    vec![root.join("A.cpp"), root.join("example.hpp")]
}

fn doxgraph() -> Command {
    Command::new(env!("CARGO_BIN_EXE_doxgraph"))
}

#[test]
fn test_full_pipeline() {
    let dir = fixture_dir();
    let config = IndexerConfig::default();
    let units = extract_files(&fixture_files(dir.path()), &config).unwrap();
    let resolved = Coordinator::new(config).run(&units);

    assert!(resolved.diagnostics().is_empty(), "{:?}", resolved.diagnostics());

    let outlines = outline(&resolved, 50);
    insta::assert_snapshot!(render_outline(&outlines).trim_end(), @r"
a (Group A)
  struct my_project::MyStruct
  method my_project::MyStruct::method
  function my_project::f
b (Group B)
  function function_outside_group
group1 (First Group)
  struct struct_in_group_1
group2 (Second Group)
  enum Enum
");

    let example = SymbolKey::new("example::Example", SymbolKind::Class);
    let members: Vec<SymbolKind> = resolved.children(&example).iter().map(|s| s.kind()).collect();
    assert_eq!(
        members,
        vec![
            SymbolKind::Method,
            SymbolKind::Method,
            SymbolKind::StaticField,
            SymbolKind::StaticMethod,
        ]
    );
    assert_eq!(resolved.derived(&example)[0].qualified_name(), "example::Example2");

    let template = resolved.symbol("example::template_fun", SymbolKind::Template).unwrap();
    assert_eq!(template.template_params[0].text.as_deref(), Some("Template parameter"));
    assert_eq!(template.param("a").unwrap().text, "parameter");

    let value2 = resolved.symbol("Enum::Value2", SymbolKind::Enumerator).unwrap();
    assert_eq!(value2.brief, "Second Enum");
    let undocumented = resolved.symbol("Enum::Undocumented", SymbolKind::Enumerator).unwrap();
    assert!(undocumented.brief.is_empty());

    let file = resolved.symbol("example.hpp", SymbolKind::File).unwrap();
    assert_eq!(file.metadata.version.as_deref(), Some("0.1"));
}

#[test]
fn test_concatenated_mode_matches_for_balanced_units() {
    let dir = fixture_dir();
    let config = IndexerConfig {
        parallel: false,
        ..IndexerConfig::default()
    };
    let units = extract_files(&fixture_files(dir.path()), &config).unwrap();
    let coordinator = Coordinator::new(config);

    let per_unit = coordinator.run_per_unit(&units);
    let concatenated = coordinator.run_concatenated(&units);
    assert_eq!(
        render_outline(&outline(&per_unit, 50)),
        render_outline(&outline(&concatenated, 50))
    );
}

#[test]
fn test_snapshot_round_trip() {
    let dir = fixture_dir();
    let config = IndexerConfig::default();
    let units = extract_files(&fixture_files(dir.path()), &config).unwrap();
    let resolved = Coordinator::new(config).run(&units);

    assert!(load_graph(dir.path()).unwrap().is_none());
    let path = save_graph(&resolved, dir.path()).unwrap();
    assert!(path.exists());

    let snapshot = load_graph(dir.path()).unwrap().unwrap();
    assert_eq!(snapshot.symbols.len(), resolved.symbol_count());
    assert_eq!(snapshot.groups.len(), 4);

    let record = snapshot
        .symbols
        .iter()
        .find(|r| r.symbol.key.qualified_name == "my_project::MyStruct")
        .unwrap();
    assert_eq!(record.parent, Some(SymbolKey::new("my_project", SymbolKind::Namespace)));
    assert_eq!(record.children.len(), 1);
}

#[test]
fn test_cli_outline() {
    let dir = fixture_dir();
    let output = doxgraph()
        .args(["--root"])
        .arg(dir.path())
        .arg("outline")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("a (Group A)\n"));
    assert!(stdout.contains("group2 (Second Group)\n  enum Enum\n"));
}

#[test]
fn test_cli_check_reports_imbalance() {
    let dir = fixture_dir();
    std::fs::write(
        dir.path().join("broken.hpp"),
        "/// \\defgroup open Open\n/// @{\n\n/// \\brief Inside\nvoid inside();\n",
    )
    .unwrap();

    let output = doxgraph()
        .args(["--root"])
        .arg(dir.path())
        .arg("check")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&DiagnosticKind::ScopeImbalance.to_string()));
    assert!(stdout.contains("broken.hpp:2"));
}

#[test]
fn test_cli_build_with_config() {
    let dir = fixture_dir();
    std::fs::write(
        dir.path().join("doxgraph.toml"),
        "implicit_membership = \"top-level\"\n",
    )
    .unwrap();

    let output = doxgraph()
        .args(["--root"])
        .arg(dir.path())
        .args(["build", "--save"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("4 groups"));
    assert!(dir.path().join(".doxgraph").join("graph.json").exists());
}

#[test]
fn test_cli_version() {
    let output = doxgraph().arg("version").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Doxgraph v"));
}
