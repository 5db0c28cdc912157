use pretty_assertions::assert_eq;
use std::fs;
use swagger2proto_generator::ProtoTreeGenerator;
use swagger2proto_parser::{FsDocumentLoader, GenerateOptions, SwaggerParser};

#[test]
fn test_generates_tree_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("commons")).unwrap();
    fs::write(
        dir.path().join("people.yaml"),
        r#"
swagger: "2.0"
info: {title: People}
definitions:
  Person:
    properties:
      name: {$ref: "commons/name.yaml"}
"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("commons/name.yaml"),
        r#"
type: object
properties:
  first: {type: string}
  last: {type: string}
"#,
    )
    .unwrap();

    let root = SwaggerParser::from_file(dir.path().join("people.yaml"))
        .unwrap()
        .into_definition();
    let generator =
        ProtoTreeGenerator::new(FsDocumentLoader::new(dir.path()), GenerateOptions::default())
            .unwrap();
    let tree = generator.generate(&root, "people.proto").unwrap();

    assert_eq!(
        tree.files["people.proto"],
        "syntax = \"proto3\";\n\npackage people;\n\nimport \"commons/name.proto\";\n\nmessage Person {\n    commons.Name name = 1;\n}\n"
    );
    assert_eq!(
        tree.files["commons/name.proto"],
        "syntax = \"proto3\";\n\npackage commons;\n\nmessage Name {\n    string first = 1;\n    string last = 2;\n}\n"
    );
    assert!(tree.skipped.is_empty());
}
