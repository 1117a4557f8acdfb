use rowbind::mapper::from_fn;
use rowbind::{
    Entity, LowerKeyMap, MapMapper, Mapper, MapperConfig, MapperContext, PropertyMapper, PropertyProcessor, QueryResult,
    ReaderRegistry, RowCursor, RowSource, Value,
};
use std::sync::Arc;

#[derive(Debug, Default, PartialEq, Entity)]
struct Greeting {
    id: i32,
    name1: String,
    name2: String,
}

#[derive(Debug, Default, PartialEq, Entity)]
struct Account {
    user_id: Option<i64>,
    #[property(name = "mail")]
    email_address: Option<String>,
    #[property(skip)]
    password: Option<String>,
    active: Option<bool>,
    score: f64,
}

fn greetings() -> QueryResult {
    QueryResult::from_labels(
        ["id", "name1", "name2"],
        vec![
            vec![Value::Integer(1), Value::Text("h1".into()), Value::Text("test1".into())],
            vec![Value::Integer(2), Value::Text("h2".into()), Value::Text("test2".into())],
        ],
    )
}

fn account_processor() -> PropertyProcessor<Account> {
    PropertyProcessor::with_registry(&ReaderRegistry::new(), &MapperConfig::default())
}

#[test]
fn test_end_to_end_rows_in_order() {
    let mapper = PropertyMapper::<Greeting>::instance().unwrap();
    let rows = mapper.map_result(&greetings()).unwrap();

    assert_eq!(
        rows,
        vec![
            Greeting {
                id: 1,
                name1: "h1".into(),
                name2: "test1".into()
            },
            Greeting {
                id: 2,
                name1: "h2".into(),
                name2: "test2".into()
            },
        ]
    );
}

#[test]
fn test_global_mapper_is_cached() {
    let first = PropertyMapper::<Greeting>::instance().unwrap();
    let second = MapperContext::global().property_mapper::<Greeting>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_map_one_walks_the_cursor() {
    let result = greetings();
    let mut cursor = result.cursor();
    let mapper = PropertyMapper::<Greeting>::with_registry(&ReaderRegistry::new(), &MapperConfig::default());

    assert_eq!(mapper.map_one(&mut cursor).unwrap().map(|g| g.id), Some(1));
    assert_eq!(mapper.map_all(&mut cursor).unwrap().len(), 1);
    assert!(mapper.map_one(&mut cursor).unwrap().is_none());
    assert!(!cursor.advance().unwrap());
}

#[test]
fn test_empty_result_maps_to_nothing() {
    let mapper = PropertyMapper::<Greeting>::with_registry(&ReaderRegistry::new(), &MapperConfig::default());
    let empty = QueryResult::from_labels(["id"], Vec::new());

    assert!(mapper.map_result(&empty).unwrap().is_empty());
    assert!(mapper.map_one(&mut empty.cursor()).unwrap().is_none());
}

#[test]
fn test_property_label_matching() {
    let p = account_processor();

    for label in ["userId", "USERID", "user_id", "USER_ID"] {
        assert!(p.contains(label), "{label} should match userId");
    }
    assert!(!p.contains("user-id"));
    assert!(p.contains("MAIL"));
    assert!(!p.contains("emailAddress"));
    assert!(!p.contains("password"));
}

#[test]
fn test_extra_column_leaves_field_unset() {
    let result = QueryResult::from_labels(
        ["USER_ID", "password", "nickname"],
        vec![vec![
            Value::Integer(5),
            Value::Text("secret".into()),
            Value::Text("five".into()),
        ]],
    );
    let mapper = PropertyMapper::<Account>::with_registry(&ReaderRegistry::new(), &MapperConfig::default());

    let accounts = mapper.map_result(&result).unwrap();
    assert_eq!(
        accounts,
        vec![Account {
            user_id: Some(5),
            ..Default::default()
        }]
    );
}

#[test]
fn test_nullable_primitives_keep_null() {
    let result = QueryResult::from_labels(
        ["user_id", "active", "score"],
        vec![
            vec![Value::Null, Value::Null, Value::Null],
            vec![Value::Integer(0), Value::Boolean(false), Value::Float(1.5)],
        ],
    );
    let mapper = PropertyMapper::<Account>::with_registry(&ReaderRegistry::new(), &MapperConfig::default());

    let accounts = mapper.map_result(&result).unwrap();
    assert_eq!(accounts[0].user_id, None);
    assert_eq!(accounts[0].active, None);
    assert_eq!(accounts[0].score, 0.0);
    assert_eq!(accounts[1].user_id, Some(0));
    assert_eq!(accounts[1].active, Some(false));
    assert_eq!(accounts[1].score, 1.5);
}

#[test]
fn test_round_trip_through_property() {
    let p = account_processor();
    let mut account = Account::default();

    assert!(p.write_value(&mut account, "mail", Some("a@b.c".to_string())).unwrap());
    assert_eq!(
        p.read_as::<Option<String>>(&account, "mail").unwrap(),
        Some(Some("a@b.c".to_string()))
    );
    assert!(!p.write_value(&mut account, "password", Some("x".to_string())).unwrap());
    assert_eq!(account.password, None);
}

#[test]
fn test_map_mapper_keys_by_lower_label() {
    let rows: Vec<LowerKeyMap<Value>> = MapMapper.map_result(&greetings()).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("NAME1"), Some(&Value::Text("h2".into())));
    assert!(rows[0].contains_key("Id"));
}

#[test]
fn test_closure_mapper() {
    let pairs = from_fn(|row, _columns| Ok((row.get_i32(0)?, row.get_string(2)?)));
    let out = pairs.map_result(&greetings()).unwrap();

    assert_eq!(
        out,
        vec![(1, Some("test1".to_string())), (2, Some("test2".to_string()))]
    );
}
