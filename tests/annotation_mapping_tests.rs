use rowbind::{
    AnnotationMapper, AnnotationProcessor, CodedEnum, ConstructionKind, Entity, MapError, Mapper, MapperConfig,
    QueryResult, ReaderRegistry, Value,
};

#[derive(Debug, Clone, Copy, PartialEq, CodedEnum)]
enum Gender {
    #[code(1, "male")]
    Male,
    #[code(2, "female")]
    Female,
    #[code(9)]
    Other,
}

#[derive(Debug, Default, PartialEq, Entity)]
struct Address {
    #[column("zipCode")]
    zip: Option<String>,
    #[column("prefecture_code")]
    code: i32,
}

#[derive(Debug, Default, PartialEq, Entity)]
struct Member {
    #[column("user_id")]
    id: Option<i64>,
    #[column("user_name")]
    name: Option<String>,
    #[column("gender")]
    gender: Option<Gender>,
    #[nest("address")]
    address: Option<Address>,
    note: Option<String>,
}

#[derive(Debug, Default, Entity)]
struct Chain {
    #[column("id")]
    id: i32,
    #[nest("next")]
    next: Option<Box<Chain>>,
}

#[derive(Debug, Default, Entity)]
struct Parent {
    #[nest("child")]
    child: Option<Child>,
}

#[derive(Debug, Default, Entity)]
struct Child {
    #[nest("grandchild")]
    grandchild: Option<Grandchild>,
}

#[derive(Debug, Default, Entity)]
struct Grandchild {
    #[nest("parent")]
    parent: Option<Box<Parent>>,
}

#[derive(Debug, Default, PartialEq, Entity)]
struct Audit {
    #[column("created_by")]
    created_by: Option<String>,
}

#[derive(Debug, Default, PartialEq, Entity)]
struct Post {
    #[column("post_id")]
    id: i64,
    #[base]
    audit: Audit,
}

#[derive(Debug, Entity)]
#[entity(constructor = Counter::start)]
struct Counter {
    #[column("n")]
    n: i32,
    started: bool,
}

impl Counter {
    fn start() -> Result<Self, String> {
        Ok(Counter { n: 0, started: true })
    }
}

#[derive(Debug, Entity)]
#[entity(constructor = Broken::create)]
struct Broken {
    #[column("n")]
    n: i32,
}

impl Broken {
    fn create() -> Result<Self, String> {
        Err("no connection".to_string())
    }
}

#[derive(Debug, Entity)]
#[entity(no_constructor)]
struct Frozen {
    #[column("n")]
    n: i32,
}

#[derive(Debug, Entity)]
#[entity(private)]
struct Sealed {
    #[column("n")]
    n: i32,
}

#[derive(Debug, Default, Entity)]
struct Temperature {
    #[column(name = "celsius", get = Temperature::celsius, set = Temperature::set_celsius)]
    kelvin: f64,
}

impl Temperature {
    fn celsius(&self) -> f64 {
        self.kelvin - 273.15
    }

    fn set_celsius(&mut self, celsius: f64) {
        self.kelvin = celsius + 273.15;
    }
}

fn mapper<T: Entity>() -> Result<AnnotationMapper<T>, MapError> {
    AnnotationMapper::with_registry(&ReaderRegistry::new(), &MapperConfig::default())
}

fn processor<T: Entity>() -> Result<AnnotationProcessor<T>, MapError> {
    AnnotationProcessor::with_registry(&ReaderRegistry::new(), &MapperConfig::default())
}

#[test]
fn test_maps_nested_and_coded_columns() {
    let result = QueryResult::from_labels(
        ["user_id", "USER_NAME", "gender", "address$zipCode", "address$prefecture_code"],
        vec![
            vec![
                Value::Integer(10),
                Value::Text("Ann".into()),
                Value::Integer(2),
                Value::Text("100-0001".into()),
                Value::Integer(13),
            ],
            vec![
                Value::Null,
                Value::Null,
                Value::Integer(7),
                Value::Null,
                Value::Null,
            ],
        ],
    );

    let members = mapper::<Member>().unwrap().map_result(&result).unwrap();
    assert_eq!(members.len(), 2);

    assert_eq!(
        members[0],
        Member {
            id: Some(10),
            name: Some("Ann".into()),
            gender: Some(Gender::Female),
            address: Some(Address {
                zip: Some("100-0001".into()),
                code: 13,
            }),
            note: None,
        }
    );

    // NULL into a nullable primitive stays None, unknown code resolves to None,
    // NULL into a strict primitive becomes zero.
    assert_eq!(members[1].id, None);
    assert_eq!(members[1].gender, None);
    assert_eq!(
        members[1].address,
        Some(Address { zip: None, code: 0 })
    );
}

#[test]
fn test_extra_columns_are_ignored() {
    let result = QueryResult::from_labels(
        ["user_id", "note", "address", "unknown$zipCode", "address$zipCode$x"],
        vec![vec![
            Value::Integer(1),
            Value::Text("hidden".into()),
            Value::Text("x".into()),
            Value::Text("y".into()),
            Value::Text("z".into()),
        ]],
    );

    let members = mapper::<Member>().unwrap().map_result(&result).unwrap();
    assert_eq!(
        members,
        vec![Member {
            id: Some(1),
            ..Default::default()
        }]
    );
}

#[test]
fn test_path_resolution() {
    let p = processor::<Member>().unwrap();

    let leaf = p.resolve("address$zipCode").unwrap();
    assert_eq!(leaf.field().field_name(), "zip");
    assert_eq!(leaf.field().declaring_type(), "Address");
    assert!(p.resolve("address").is_none());
    assert!(!p.contains("note"));
    assert!(p.contains("Address$ZipCode"));
}

#[test]
fn test_nested_read_then_write_then_read() {
    let p = processor::<Member>().unwrap();
    let mut member = p.new_instance().unwrap();

    assert_eq!(p.read_as::<Option<String>>(&member, "address$zipCode").unwrap(), None);
    assert!(member.address.is_none());

    p.write_value(&mut member, "address$zipCode", Some("060-0000".to_string()))
        .unwrap();
    assert!(member.address.is_some());
    assert_eq!(
        p.read_as::<Option<String>>(&member, "address$zipCode").unwrap(),
        Some(Some("060-0000".to_string()))
    );
}

#[test]
fn test_round_trip_through_leaf() {
    let p = processor::<Member>().unwrap();
    let mut member = Member::default();

    p.write_value(&mut member, "gender", Some(Gender::Other)).unwrap();
    assert_eq!(
        p.read_as::<Option<Gender>>(&member, "gender").unwrap(),
        Some(Some(Gender::Other))
    );
    assert_eq!(Gender::Other.label(), "Other");
    assert_eq!(Gender::from_code(1), Some(Gender::Male));
}

#[test]
fn test_self_nesting_fails_at_build() {
    let err = mapper::<Chain>().unwrap_err();
    assert!(matches!(err, MapError::Cycle { .. }));
}

#[test]
fn test_transitive_nesting_fails_at_build() {
    match processor::<Parent>().unwrap_err() {
        MapError::Cycle { type_name, path } => {
            assert_eq!(type_name, "Grandchild");
            assert_eq!(path, "child$grandchild$parent");
        }
        other => panic!("expected a cycle error, got {other}"),
    }
}

#[test]
fn test_base_fields_are_bound() {
    let result = QueryResult::from_labels(
        ["post_id", "created_by"],
        vec![vec![Value::Integer(3), Value::Text("admin".into())]],
    );

    let posts = mapper::<Post>().unwrap().map_result(&result).unwrap();
    assert_eq!(
        posts,
        vec![Post {
            id: 3,
            audit: Audit {
                created_by: Some("admin".into())
            },
        }]
    );
}

#[test]
fn test_custom_constructor_and_accessors() {
    let result = QueryResult::from_labels(["n"], vec![vec![Value::Integer(4)]]);
    let counters = mapper::<Counter>().unwrap().map_result(&result).unwrap();
    assert_eq!(counters[0].n, 4);
    assert!(counters[0].started);

    let result = QueryResult::from_labels(["celsius"], vec![vec![Value::Float(20.0)]]);
    let temps = mapper::<Temperature>().unwrap().map_result(&result).unwrap();
    assert!((temps[0].kelvin - 293.15).abs() < 1e-9);

    let p = processor::<Temperature>().unwrap();
    let celsius = p.read_as::<f64>(&temps[0], "celsius").unwrap().unwrap();
    assert!((celsius - 20.0).abs() < 1e-9);
}

#[test]
fn test_construction_failures_are_distinguished() {
    let result = QueryResult::from_labels(["n"], vec![vec![Value::Integer(1)]]);

    let kind = |err: MapError| err.construction_kind();
    assert_eq!(
        kind(mapper::<Frozen>().unwrap().map_result(&result).unwrap_err()),
        Some(ConstructionKind::NotFound)
    );
    assert_eq!(
        kind(mapper::<Sealed>().unwrap().map_result(&result).unwrap_err()),
        Some(ConstructionKind::Inaccessible)
    );

    let err = mapper::<Broken>().unwrap().map_result(&result).unwrap_err();
    assert_eq!(err.construction_kind(), Some(ConstructionKind::Failed));
    assert!(err.to_string().contains("no connection"));
}

#[test]
fn test_conversion_error_surfaces() {
    let result = QueryResult::from_labels(["post_id"], vec![vec![Value::Text("abc".into())]]);
    let err = mapper::<Post>().unwrap().map_result(&result).unwrap_err();
    assert!(matches!(err, MapError::Conversion { ordinal: 0, .. }));
}

#[test]
fn test_custom_delimiter() {
    let config = MapperConfig::new().path_delimiter('.');
    let p = AnnotationProcessor::<Member>::with_registry(&ReaderRegistry::new(), &config).unwrap();
    assert!(p.contains("address.zipCode"));
    assert!(!p.contains("address$zipCode"));
}
