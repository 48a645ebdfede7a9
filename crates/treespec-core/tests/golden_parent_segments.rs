use treespec_core::{Error, Settings, StructureDefinition, Tag};

const DEFINITION: &str = r#"
<app>
    <lib nest="2"/>
    <controller continue="3"/>
</app>
"#;

fn assert_outside(result: Result<impl std::fmt::Debug, Error>) {
    match result {
        Err(Error::NotPartOfStructure { .. }) => {}
        other => panic!("expected NotPartOfStructure, got {other:?}"),
    }
}

#[test]
fn golden_parent_directory_is_never_a_sibling() {
    let def = StructureDefinition::compile(DEFINITION, &Settings::default()).unwrap();
    let mut session = def.session("/srv/site");

    assert_outside(session.validate_directory("app/.."));
    assert_outside(session.validate_directory("/srv/site/app/.."));
    assert_outside(session.validate_directory(r"app\.."));
    assert!(session.directories_of(&Tag::Controller).is_empty());
    assert!(session.siblings().node("_D0C0_D1C1", &[]).is_none());
}

#[test]
fn golden_nest_paths_cannot_climb_out() {
    let def = StructureDefinition::compile(DEFINITION, &Settings::default()).unwrap();
    let mut session = def.session("/srv/site");

    assert_outside(session.validate_directory("app/lib/../../etc"));
    assert_outside(session.validate_directory("app/lib/a/.."));
    assert!(session.siblings().node("_D0C0_D1C0", &[]).is_none());

    assert_outside(session.validate_file("app/lib/../../../etc/x.rs"));
    assert_outside(session.validate_file("app/../x.rs"));
}

#[test]
fn golden_dotted_names_are_still_names() {
    let def = StructureDefinition::compile(DEFINITION, &Settings::default()).unwrap();
    let mut session = def.session("/srv/site");

    assert_eq!(session.validate_directory("app/v1.2").unwrap(), Tag::Controller);
    assert_eq!(session.validate_directory("app/./lib/..a").unwrap(), Tag::Other("lib".into()));
    assert_eq!(session.validate_file("app/lib/a/mod.rs").unwrap().node_name, "lib");
}
