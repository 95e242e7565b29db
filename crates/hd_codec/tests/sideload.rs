use hd_codec::derive::Resource;
use hd_codec::document::{Node, PrimaryData, RelationData};
use hd_codec::include::IncludeTree;
use hd_codec::{Marshaler, Nullable, SchemaRegistry, Unmarshaler};
use serde_json::json;

#[derive(Resource, Default, Debug, Clone, PartialEq)]
struct Person {
    #[resource("primary,people")]
    id: u64,
    #[resource("attr,name")]
    name: String,
}

#[derive(Resource, Default, Debug, Clone, PartialEq)]
struct Comment {
    #[resource("primary,comments")]
    id: u64,
    #[resource("attr,body")]
    body: String,
    #[resource("relation,author")]
    author: Option<Person>,
}

#[derive(Resource, Default, Debug, Clone, PartialEq)]
struct Article {
    #[resource("primary,articles")]
    id: u64,
    #[resource("attr,title")]
    title: String,
    #[resource("relation,author")]
    author: Nullable<Person>,
    #[resource("relation,comments")]
    comments: Vec<Comment>,
}

fn ada() -> Person {
    Person {
        id: 1,
        name: "Ada".into(),
    }
}

fn article() -> Article {
    Article {
        id: 100,
        title: "Engines".into(),
        author: Nullable::Value(ada()),
        comments: vec![
            Comment {
                id: 10,
                body: "First".into(),
                author: Some(ada()),
            },
            Comment {
                id: 11,
                body: "Second".into(),
                author: Some(ada()),
            },
        ],
    }
}

fn included_keys(nodes: &[Node]) -> Vec<(String, String)> {
    nodes
        .iter()
        .map(|node| (node.ty.clone(), node.id.clone().unwrap_or_default()))
        .collect()
}

fn key(ty: &str, id: &str) -> (String, String) {
    (ty.to_owned(), id.to_owned())
}

#[test]
fn nested_include_paths_are_deduplicated() {
    let registry = SchemaRegistry::new();
    let mut article = article();

    let payload = Marshaler::new(&registry)
        .with_include(IncludeTree::parse("author,comments.author"))
        .marshal_one(&mut article)
        .unwrap();

    assert_eq!(
        included_keys(&payload.included),
        [key("people", "1"), key("comments", "10"), key("comments", "11")]
    );

    let PrimaryData::One(Some(node)) = &payload.data else {
        panic!("expected a single primary node");
    };
    assert_eq!(
        node.relationships["author"].data,
        Some(RelationData::One(Some(Node::reference("people", "1"))))
    );
    assert_eq!(
        node.relationships["comments"].data,
        Some(RelationData::Many(vec![
            Node::reference("comments", "10"),
            Node::reference("comments", "11"),
        ]))
    );

    let decoded: Article = Unmarshaler::new(&registry).unmarshal_one(&payload).unwrap();
    assert_eq!(decoded, article);
}

#[test]
fn only_named_paths_are_sideloaded() {
    let registry = SchemaRegistry::new();
    let mut article = article();

    let payload = Marshaler::new(&registry)
        .with_include(IncludeTree::parse("comments"))
        .marshal_one(&mut article)
        .unwrap();

    assert_eq!(
        included_keys(&payload.included),
        [key("comments", "10"), key("comments", "11")]
    );
    // The comments' own authors are referenced but not sideloaded.
    for comment in &payload.included {
        assert_eq!(
            comment.relationships["author"].data,
            Some(RelationData::One(Some(Node::reference("people", "1"))))
        );
    }

    // Unresolved references populate only the key.
    let decoded: Article = Unmarshaler::new(&registry).unmarshal_one(&payload).unwrap();
    assert_eq!(decoded.author, Nullable::Value(Person { id: 1, name: String::new() }));
    assert_eq!(decoded.comments[0].body, "First");
    assert_eq!(decoded.comments[0].author, Some(Person { id: 1, name: String::new() }));
}

#[test]
fn nothing_included_by_default() {
    let registry = SchemaRegistry::new();
    let payload = Marshaler::new(&registry).marshal_one(&mut article()).unwrap();
    assert!(payload.included.is_empty());

    let value = serde_json::to_value(&payload).unwrap();
    assert_eq!(
        value["data"]["relationships"]["author"],
        json!({"data": {"id": "1", "type": "people"}})
    );
    assert!(value.get("included").is_none());
}

#[test]
fn include_all_reaches_every_depth() {
    let registry = SchemaRegistry::new();
    let payload = Marshaler::new(&registry)
        .with_include(IncludeTree::all())
        .marshal_one(&mut article())
        .unwrap();
    assert_eq!(
        included_keys(&payload.included),
        [key("people", "1"), key("comments", "10"), key("comments", "11")]
    );
}

#[test]
fn embedded_mode_inlines_related_nodes() {
    let registry = SchemaRegistry::new();
    let mut article = article();

    let payload = Marshaler::new(&registry)
        .embedded()
        .with_include(IncludeTree::parse("author"))
        .marshal_one(&mut article)
        .unwrap();
    assert!(payload.included.is_empty());

    let value = serde_json::to_value(&payload).unwrap();
    assert_eq!(
        value["data"]["relationships"]["author"]["data"],
        json!({"id": "1", "type": "people", "attributes": {"name": "Ada"}})
    );
    assert_eq!(
        value["data"]["relationships"]["comments"]["data"][1]["relationships"]["author"]["data"]
            ["attributes"]["name"],
        "Ada"
    );

    let decoded: Article = Unmarshaler::new(&registry).unmarshal_one(&payload).unwrap();
    assert_eq!(decoded, article);
}

#[test]
fn absent_and_null_relations() {
    let registry = SchemaRegistry::new();
    let marshaler = Marshaler::new(&registry);
    let unmarshaler = Unmarshaler::new(&registry);

    let mut absent = Article {
        id: 1,
        ..Article::default()
    };
    let payload = marshaler.marshal_one(&mut absent).unwrap();
    let value = serde_json::to_value(&payload).unwrap();
    assert!(value["data"]["relationships"].get("author").is_none());
    assert_eq!(value["data"]["relationships"]["comments"], json!({"data": []}));
    let decoded: Article = unmarshaler.unmarshal_one(&payload).unwrap();
    assert!(decoded.author.is_absent());

    let mut null = Article {
        id: 1,
        author: Nullable::Null,
        ..Article::default()
    };
    let payload = marshaler.marshal_one(&mut null).unwrap();
    let value = serde_json::to_value(&payload).unwrap();
    assert_eq!(value["data"]["relationships"]["author"], json!({"data": null}));
    let decoded: Article = unmarshaler.unmarshal_one(&payload).unwrap();
    assert!(decoded.author.is_null());
}

#[test]
fn collections_share_included() {
    let registry = SchemaRegistry::new();
    let mut comments = vec![
        Comment {
            id: 1,
            body: "a".into(),
            author: Some(ada()),
        },
        Comment {
            id: 2,
            body: "b".into(),
            author: Some(ada()),
        },
        Comment {
            id: 3,
            body: "c".into(),
            author: None,
        },
    ];

    let payload = Marshaler::new(&registry)
        .with_include(IncludeTree::parse("author"))
        .marshal_many(&mut comments)
        .unwrap();
    assert_eq!(included_keys(&payload.included), [key("people", "1")]);

    let decoded: Vec<Comment> = Unmarshaler::new(&registry).unmarshal_many(&payload).unwrap();
    assert_eq!(decoded, comments);
}

#[test]
fn related_node_equal_to_primary_is_not_included() {
    #[derive(Resource, Default, Debug, Clone, PartialEq)]
    struct Employee {
        #[resource("primary,employees")]
        id: u64,
        #[resource("relation,manager")]
        manager: Option<Box<Employee>>,
    }

    let registry = SchemaRegistry::new();
    let mut employees = vec![
        Employee {
            id: 1,
            manager: None,
        },
        Employee {
            id: 2,
            manager: Some(Box::new(Employee {
                id: 1,
                manager: None,
            })),
        },
    ];

    let payload = Marshaler::new(&registry)
        .with_include(IncludeTree::parse("manager"))
        .marshal_many(&mut employees)
        .unwrap();
    assert!(payload.included.is_empty());

    let decoded: Vec<Employee> = Unmarshaler::new(&registry).unmarshal_many(&payload).unwrap();
    assert_eq!(decoded[1].manager.as_deref().map(|m| m.id), Some(1));
}
