//! Weaving descriptors into executable schemas.

use async_graphql::{value, Request, Value};
use futures_util::StreamExt;
use graphql_weaver::{
    Field, InterfaceType, MetaType, ObjectType, Resolver, SchemaWeaver, Silk, WeaveError,
};
use pretty_assertions::assert_eq;

fn hello() -> Resolver {
    Resolver::new().field(
        "hello",
        Field::query(Silk::string()).resolve(|_req| async { Ok(Value::from("hi")) }),
    )
}

#[tokio::test]
async fn arguments_are_decoded_through_their_silks() {
    let by = Silk::int().with_parse(|value| {
        let positive = matches!(&value, Value::Number(n) if n.as_i64().is_some_and(|v| v > 0));
        if positive {
            Ok(value)
        } else {
            Err("must be positive".to_string())
        }
    });

    let schema = SchemaWeaver::new()
        .add_resolver(Resolver::new().field(
            "bump",
            Field::query(Silk::int()).argument("by", by).resolve(|req| async move {
                let by = match req.arg("by") {
                    Value::Number(n) => n.as_i64().unwrap_or(0),
                    _ => 0,
                };
                Ok(Value::from(by * 2))
            }),
        ))
        .weave()
        .unwrap();

    let ok = schema.execute(Request::new("{ bump(by: 3) }")).await;
    assert!(ok.errors.is_empty(), "{:?}", ok.errors);
    assert_eq!(ok.data.into_json().unwrap(), serde_json::json!({"bump": 6}));

    let rejected = schema.execute(Request::new("{ bump(by: -1) }")).await;
    assert_eq!(rejected.errors.len(), 1);
    assert_eq!(
        rejected.errors[0].message,
        "invalid value for argument by: must be positive"
    );
}

#[tokio::test]
async fn object_silk_inputs_spread_into_arguments() {
    let giraffe_input = Silk::object(
        ObjectType::new("GiraffeInput").field("name", MetaType::non_null(MetaType::string())),
    );

    let schema = SchemaWeaver::new()
        .add_resolver(hello())
        .add_resolver(Resolver::new().field(
            "createGiraffe",
            Field::mutation(Silk::string())
                .input(giraffe_input)
                .resolve(|req| async move { Ok(req.arg("name")) }),
        ))
        .weave()
        .unwrap();

    // The object's fields are spread into individual arguments; the
    // converted input type itself never surfaces in the schema.
    assert!(schema.sdl().contains("createGiraffe(name: String!)"));
    assert!(!schema.sdl().contains("input GiraffeInput"));

    let response = schema
        .execute(Request::new("mutation { createGiraffe(name: \"Lily\") }"))
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        serde_json::json!({"createGiraffe": "Lily"})
    );
}

#[tokio::test]
async fn serialize_hooks_encode_resolved_values() {
    let shouting = Silk::string().with_serialize(|value| match value {
        Value::String(s) => Ok(Value::from(s.to_uppercase())),
        other => Ok(other),
    });

    let schema = SchemaWeaver::new()
        .add_resolver(Resolver::new().field(
            "hello",
            Field::query(shouting).resolve(|_req| async { Ok(Value::from("quiet")) }),
        ))
        .weave()
        .unwrap();

    let response = schema.execute(Request::new("{ hello }")).await;
    assert!(response.errors.is_empty());
    assert_eq!(
        response.data.into_json().unwrap(),
        serde_json::json!({"hello": "QUIET"})
    );
}

#[tokio::test]
async fn interfaces_resolve_to_concrete_types() {
    let animal = Silk::interface(
        InterfaceType::new("Animal").field("name", MetaType::non_null(MetaType::string())),
    );
    let giraffe = Silk::object(
        ObjectType::new("Giraffe")
            .field("name", MetaType::non_null(MetaType::string()))
            .implement("Animal"),
    );

    let schema = SchemaWeaver::new()
        .add_resolver(
            Resolver::new()
                .field(
                    "animal",
                    Field::query(animal).resolve(|_req| async {
                        Ok(value!({ "__typename": "Giraffe", "name": "Lily" }))
                    }),
                )
                .field(
                    "giraffe",
                    Field::query(giraffe)
                        .resolve(|_req| async { Ok(value!({ "name": "Rose" })) }),
                ),
        )
        .weave()
        .unwrap();

    let response = schema
        .execute(Request::new("{ animal { __typename name } }"))
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        serde_json::json!({"animal": {"__typename": "Giraffe", "name": "Lily"}})
    );
}

#[tokio::test]
async fn subscriptions_stream_resolved_values() {
    let schema = SchemaWeaver::new()
        .add_resolver(hello())
        .add_resolver(Resolver::new().field(
            "countdown",
            Field::subscription(Silk::int()).subscribe(|_req| async {
                Ok(futures_util::stream::iter([
                    Ok(Value::from(3)),
                    Ok(Value::from(2)),
                    Ok(Value::from(1)),
                ]))
            }),
        ))
        .weave()
        .unwrap();

    let mut stream = schema.execute_stream(Request::new("subscription { countdown }"));
    let mut seen = Vec::new();
    while let Some(response) = stream.next().await {
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        seen.push(response.data.into_json().unwrap());
    }

    assert_eq!(
        seen,
        vec![
            serde_json::json!({"countdown": 3}),
            serde_json::json!({"countdown": 2}),
            serde_json::json!({"countdown": 1}),
        ]
    );
}

#[tokio::test]
async fn renamed_roots_appear_in_the_sdl() {
    let schema = SchemaWeaver::new()
        .merge_config(serde_json::json!({"queryTypeName": "Root"}))
        .unwrap()
        .add_resolver(hello())
        .weave()
        .unwrap();

    assert!(schema.sdl().contains("type Root"));
}

#[test]
fn duplicate_query_fields_abort_the_weave() {
    let err = SchemaWeaver::new()
        .add_resolver(hello())
        .add_resolver(hello())
        .weave()
        .unwrap_err();

    assert_eq!(err.to_string(), "Field Query.hello is defined more than once");
}

#[test]
fn duplicate_fields_on_a_type_abort_the_weave() {
    let node = Silk::object(ObjectType::new("Node").field("value", MetaType::int()));

    let err = SchemaWeaver::new()
        .add_resolver(hello())
        .add_resolver(
            Resolver::of(node.clone())
                .field(
                    "next",
                    Field::on_type(node.clone()).resolve(|_req| async { Ok(Value::Null) }),
                )
                .field(
                    "next",
                    Field::on_type(node).resolve(|_req| async { Ok(Value::Null) }),
                ),
        )
        .weave()
        .unwrap_err();

    assert_eq!(err.to_string(), "Field Node.next is defined more than once");
}

#[test]
fn scalar_silks_cannot_stand_in_input_position() {
    let err = SchemaWeaver::new()
        .add_resolver(Resolver::new().field(
            "hello",
            Field::query(Silk::string())
                .input(Silk::string())
                .resolve(|_req| async { Ok(Value::Null) }),
        ))
        .weave()
        .unwrap_err();

    assert_eq!(err.to_string(), "Cannot convert String to input type");
}

#[test]
fn distinct_input_definitions_cannot_share_a_name() {
    let first = Silk::object(ObjectType::new("GiraffeInput").field("name", MetaType::string()));
    let second = Silk::object(ObjectType::new("GiraffeInput").field("age", MetaType::int()));

    let err = SchemaWeaver::new()
        .add_resolver(
            Resolver::new()
                .field(
                    "createGiraffe",
                    Field::mutation(Silk::string())
                        .input(first)
                        .resolve(|_req| async { Ok(Value::Null) }),
                )
                .field(
                    "replaceGiraffe",
                    Field::mutation(Silk::string())
                        .input(second)
                        .resolve(|_req| async { Ok(Value::Null) }),
                ),
        )
        .weave()
        .unwrap_err();

    assert_eq!(err.to_string(), "Input Type GiraffeInput already exists");
}

#[test]
fn conflicting_type_definitions_abort_the_weave() {
    let first = Silk::object(ObjectType::new("Giraffe").field("name", MetaType::string()));
    let second = Silk::object(ObjectType::new("Giraffe").field("age", MetaType::int()));

    let err = SchemaWeaver::new()
        .add_resolver(
            Resolver::new()
                .field(
                    "a",
                    Field::query(first).resolve(|_req| async { Ok(Value::Null) }),
                )
                .field(
                    "b",
                    Field::query(second).resolve(|_req| async { Ok(Value::Null) }),
                ),
        )
        .weave()
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Type Giraffe is registered twice with different definitions"
    );
}

#[test]
fn type_fields_need_a_parent_resolver() {
    let node = Silk::object(ObjectType::new("Node").field("value", MetaType::int()));

    let err = SchemaWeaver::new()
        .add_resolver(Resolver::new().field(
            "next",
            Field::on_type(node).resolve(|_req| async { Ok(Value::Null) }),
        ))
        .weave()
        .unwrap_err();

    assert!(matches!(err, WeaveError::OrphanField(name) if name == "next"));
}

#[test]
fn resolver_parents_must_be_composite_types() {
    let err = SchemaWeaver::new()
        .add_resolver(Resolver::of(Silk::string()).field(
            "next",
            Field::on_type(Silk::string()).resolve(|_req| async { Ok(Value::Null) }),
        ))
        .weave()
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Resolver parent must be an object or interface type, got scalar"
    );
}

#[test]
fn subscriptions_need_a_subscribe_function() {
    let err = SchemaWeaver::new()
        .add_resolver(hello())
        .add_resolver(
            Resolver::new().field("countdown", Field::subscription(Silk::int())),
        )
        .weave()
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Subscription field countdown has no subscribe function"
    );
}

#[test]
fn queries_need_a_resolve_function() {
    let err = SchemaWeaver::new()
        .add_resolver(Resolver::new().field("hello", Field::query(Silk::string())))
        .weave()
        .unwrap_err();

    assert_eq!(err.to_string(), "Field Query.hello has no resolve function");
}
