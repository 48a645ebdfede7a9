use treespec_core::{Error, Settings, StructureDefinition, Tag};

fn compile(src: &str) -> StructureDefinition {
    StructureDefinition::compile(src, &Settings::default()).unwrap()
}

#[test]
fn golden_nest_root_and_child_limits() {
    let def = compile(r#"<app><lib nest="{R,2}{R.*,1}"/></app>"#);
    let mut session = def.session("/srv/site");

    // no sub-path used
    assert_eq!(
        session.validate_directory("app/lib").unwrap(),
        Tag::Other("lib".into())
    );

    session.validate_directory("app/lib/a").unwrap();
    session.validate_directory("app/lib/b").unwrap();
    assert!(matches!(
        session.validate_directory("app/lib/c"),
        Err(Error::TooManyChildren { limit: 2, .. })
    ));

    session.validate_directory("app/lib/a/x").unwrap();
    assert!(matches!(
        session.validate_directory("app/lib/a/y"),
        Err(Error::TooManyChildren { limit: 1, .. })
    ));

    // the second first-level directory has its own budget
    session.validate_directory("app/lib/b/x").unwrap();
}

#[test]
fn golden_positions_without_rule_are_not_allowed() {
    let def = compile(r#"<app><lib nest="{R,2}{R.*,1}"/></app>"#);
    let mut session = def.session("/srv/site");

    session.validate_directory("app/lib/a").unwrap();
    session.validate_directory("app/lib/a/x").unwrap();

    match session.validate_directory("app/lib/a/x/deep") {
        Err(Error::ChildNotAllowed { path, position }) => {
            assert_eq!(path, "app/lib/a/x/deep");
            assert_eq!(position, "0.0.0");
        }
        other => panic!("expected ChildNotAllowed, got {other:?}"),
    }
}

#[test]
fn golden_rejected_nest_paths_are_rolled_back() {
    let def = compile(r#"<app><lib nest="{R,2}{R.*,1}"/></app>"#);
    let mut session = def.session("/srv/site");

    session.validate_directory("app/lib/a").unwrap();
    session.validate_directory("app/lib/b").unwrap();
    assert!(session.validate_directory("app/lib/c").is_err());
    assert!(session.validate_directory("app/lib/c").is_err());

    session.validate_directory("app/lib/a").unwrap();
    session.validate_directory("app/lib/b").unwrap();

    let root = session.siblings().node("_D0C0_D1C0", &[]).unwrap();
    assert_eq!(root.names().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn golden_shorthand_forbids_grandchildren() {
    let def = compile(r#"<app><lib nest="2"/></app>"#);
    let mut session = def.session("/srv/site");

    session.validate_directory("app/lib/a").unwrap();
    assert!(matches!(
        session.validate_directory("app/lib/a/b"),
        Err(Error::TooManyChildren { limit: 0, .. })
    ));
}

#[test]
fn golden_specific_ordinal_rules() {
    // the first directory may hold three children, the others one
    let def = compile(r#"<app><lib nest="{R,3}{R.0,3}{R.*,1}"/></app>"#);
    let mut session = def.session("/srv/site");

    session.validate_directory("app/lib/first").unwrap();
    session.validate_directory("app/lib/second").unwrap();

    for child in ["x", "y", "z"] {
        session
            .validate_directory(format!("app/lib/first/{child}"))
            .unwrap();
    }
    session.validate_directory("app/lib/second/x").unwrap();
    assert!(session.validate_directory("app/lib/second/y").is_err());
}

#[test]
fn golden_files_inside_nested_paths() {
    let def = compile(r#"<app><lib nest="{R,2}{R.*,1}"/></app>"#);
    let mut session = def.session("/srv/site");

    let meta = session.validate_file("app/lib/a/x/mod.rs").unwrap();
    assert_eq!(meta.node_name, "lib");
    assert_eq!(meta.file_name, "mod");
}
