use hd_codec::derive::{Choice, Resource};
use hd_codec::document::Payload;
use hd_codec::include::IncludeTree;
use hd_codec::{CodecError, Marshaler, SchemaRegistry, Unmarshaler};
use serde_json::json;

#[derive(Resource, Default, Debug, Clone, PartialEq)]
struct Image {
    #[resource("primary,images")]
    id: String,
    #[resource("attr,src")]
    src: String,
}

#[derive(Resource, Default, Debug, Clone, PartialEq)]
struct Video {
    #[resource("primary,videos")]
    id: String,
    #[resource("attr,seconds")]
    seconds: u32,
}

#[derive(Choice, Default, Debug, Clone, PartialEq)]
struct Media {
    image: Option<Image>,
    video: Option<Box<Video>>,
}

#[derive(Resource, Default, Debug, Clone, PartialEq)]
struct Post {
    #[resource("primary,posts")]
    id: u64,
    #[resource("poly_relation,cover")]
    cover: Option<Media>,
    #[resource("poly_relation,gallery")]
    gallery: Vec<Media>,
}

fn image(id: &str) -> Media {
    Media {
        image: Some(Image {
            id: id.into(),
            src: format!("/{id}.png"),
        }),
        video: None,
    }
}

fn video(id: &str) -> Media {
    Media {
        image: None,
        video: Some(Box::new(Video {
            id: id.into(),
            seconds: 42,
        })),
    }
}

#[test]
fn candidates_round_trip() {
    let registry = SchemaRegistry::new();
    let mut post = Post {
        id: 1,
        cover: Some(image("a")),
        gallery: vec![video("b"), image("c")],
    };

    let payload = Marshaler::new(&registry)
        .with_include(IncludeTree::parse("cover,gallery"))
        .marshal_one(&mut post)
        .unwrap();

    let value = serde_json::to_value(&payload).unwrap();
    assert_eq!(
        value["data"]["relationships"],
        json!({
            "cover": {"data": {"id": "a", "type": "images"}},
            "gallery": {"data": [
                {"id": "b", "type": "videos"},
                {"id": "c", "type": "images"},
            ]},
        })
    );
    assert_eq!(payload.included.len(), 3);

    let decoded: Post = Unmarshaler::new(&registry).unmarshal_one(&payload).unwrap();
    assert_eq!(decoded, post);
}

#[test]
fn empty_choice_is_null() {
    let registry = SchemaRegistry::new();
    let mut post = Post {
        id: 1,
        cover: Some(Media::default()),
        gallery: vec![Media::default(), image("c")],
    };

    let value = serde_json::to_value(Marshaler::new(&registry).marshal_one(&mut post).unwrap())
        .unwrap();
    assert_eq!(value["data"]["relationships"]["cover"], json!({"data": null}));
    assert_eq!(
        value["data"]["relationships"]["gallery"],
        json!({"data": [{"id": "c", "type": "images"}]})
    );
}

#[test]
fn more_than_one_candidate_is_an_error() {
    let registry = SchemaRegistry::new();
    let mut both = image("a");
    both.video = video("b").video;
    let mut post = Post {
        id: 1,
        cover: Some(both),
        gallery: Vec::new(),
    };

    let err = Marshaler::new(&registry).marshal_one(&mut post).unwrap_err();
    assert!(
        matches!(&err, CodecError::AmbiguousChoice { populated, .. } if populated.len() == 2),
        "unexpected error: {err}"
    );
}

#[test]
fn unknown_types_are_skipped() {
    let registry = SchemaRegistry::new();
    let payload: Payload = serde_json::from_value(json!({
        "data": {
            "id": "1",
            "type": "posts",
            "relationships": {
                "cover": {"data": {"id": "x", "type": "audio"}},
                "gallery": {"data": [
                    {"id": "y", "type": "audio"},
                    {"id": "b", "type": "videos"},
                ]},
            },
        },
        "included": [
            {"id": "b", "type": "videos", "attributes": {"seconds": 7}},
        ],
    }))
    .unwrap();

    let decoded: Post = Unmarshaler::new(&registry).unmarshal_one(&payload).unwrap();
    assert_eq!(decoded.cover, None);
    assert_eq!(
        decoded.gallery,
        vec![Media {
            image: None,
            video: Some(Box::new(Video {
                id: "b".into(),
                seconds: 7,
            })),
        }]
    );
}
