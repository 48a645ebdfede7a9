use std::path::Path;

use treespec_core::{Error, Settings, StructureDefinition, Tag};

fn compile(src: &str) -> StructureDefinition {
    StructureDefinition::compile(src, &Settings::default()).unwrap()
}

#[test]
fn golden_limit_admits_exactly_n_names() {
    let def = compile(r#"<app><module continue="3"/></app>"#);
    let mut session = def.session("/srv/site");

    for name in ["blog", "shop", "forum"] {
        let tag = session.validate_directory(format!("app/{name}")).unwrap();
        assert_eq!(tag, Tag::Other("module".into()));
    }

    match session.validate_directory("app/wiki") {
        Err(Error::TooManySiblings {
            limit,
            actual_names,
            ..
        }) => {
            assert_eq!(limit, 3);
            assert_eq!(actual_names, vec!["blog", "shop", "forum", "wiki"]);
        }
        other => panic!("expected TooManySiblings, got {other:?}"),
    }
}

#[test]
fn golden_revalidation_does_not_count_twice() {
    let def = compile(r#"<app><module continue="2"/></app>"#);
    let mut session = def.session("/srv/site");

    session.validate_directory("app/blog").unwrap();
    session.validate_directory("app/blog").unwrap();
    session.validate_directory("app/blog/").unwrap();
    session.validate_directory("app/shop").unwrap();
    session.validate_directory("app/shop").unwrap();

    assert!(matches!(
        session.validate_directory("app/wiki"),
        Err(Error::TooManySiblings { .. })
    ));
}

#[test]
fn golden_rejected_name_is_not_remembered() {
    let def = compile(r#"<app><module continue="2"/></app>"#);
    let mut session = def.session("/srv/site");

    session.validate_directory("app/blog").unwrap();
    session.validate_directory("app/shop").unwrap();
    assert!(session.validate_directory("app/wiki").is_err());
    assert!(session.validate_directory("app/news").is_err());

    // known names stay valid after rejections
    session.validate_directory("app/blog").unwrap();
    session.validate_directory("app/shop").unwrap();

    let names: Vec<&str> = session
        .siblings()
        .node("_D0C0_D1C0", &[])
        .unwrap()
        .names()
        .collect();
    assert_eq!(names, vec!["blog", "shop"]);
}

#[test]
fn golden_continue_one_uses_default_limit() {
    let def = compile(r#"<app><module continue="1"/></app>"#);
    let mut session = def.session("/srv/site");

    for i in 0..5 {
        session.validate_directory(format!("app/m{i}")).unwrap();
    }
    assert!(matches!(
        session.validate_directory("app/m5"),
        Err(Error::TooManySiblings { limit: 5, .. })
    ));
}

#[test]
fn golden_descendants_count_their_continue_ancestor() {
    let def = compile(
        r#"<app>
            <module continue="2">
                <src/>
            </module>
        </app>"#,
    );
    let mut session = def.session("/srv/site").with_filesystem(|_: &Path| true);

    session.validate_directory("app/blog/src").unwrap();
    session.validate_directory("app/shop/src").unwrap();
    assert!(matches!(
        session.validate_directory("app/wiki/src"),
        Err(Error::TooManySiblings { .. })
    ));
    assert!(session.validate_file("app/blog/src/lib.rs").is_ok());
}

#[test]
fn golden_sessions_do_not_share_siblings() {
    let def = compile(r#"<app><module continue="1"/></app>"#);

    let mut first = def.session("/srv/site");
    for i in 0..5 {
        first.validate_directory(format!("app/m{i}")).unwrap();
    }

    let mut second = def.session("/srv/site");
    second.validate_directory("app/other").unwrap();
    assert!(first.validate_directory("app/other").is_err());
}
