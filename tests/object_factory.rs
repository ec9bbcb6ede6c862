/// Object factory integration tests
///
/// Constructor and method activation driven by named values, positional
/// values, container services and defaults.

use ferrous_activator::{
    Arguments, DiError, Hooks, ObjectFactory, Resolver, ServiceCollection, ServiceDescriptor, Signature,
    TypeCatalog, TypeDef, TypeKey, Unresolvable, Value,
};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

// ===== Test Types =====

struct Int {
    value: AtomicI32,
}

impl Int {
    fn new(value: i32) -> Self {
        Self { value: AtomicI32::new(value) }
    }

    fn get(&self) -> i32 {
        self.value.load(Ordering::SeqCst)
    }
}

trait Fake: Send + Sync {
    fn value(&self) -> i32;
}

struct FakeA;
impl Fake for FakeA {
    fn value(&self) -> i32 {
        1
    }
}

struct TakeArguments {
    fake_value: i32,
    int_value: i32,
    matched: String,
    test_int: i32,
    test_b: i32,
}

struct MethodTests;

struct StaticObject;
struct AbstractObject;

#[derive(Default)]
struct StructObject {
    value: i32,
}

struct GenericObject<T> {
    value: T,
}

#[derive(Default)]
enum EnumTest {
    #[default]
    A,
}

fn describe(types: &mut TypeCatalog) {
    types
        .register(TypeDef::interface::<dyn Fake>())
        .register(
            TypeDef::class::<FakeA>()
                .constructor(Signature::new(), |_| Ok(FakeA))
                .implements::<dyn Fake>(|a| a as Arc<dyn Fake>),
        )
        .register(
            TypeDef::class::<Int>()
                .constructor(Signature::new().param_or("value", 0i32), |args| Ok(Int::new(args.cloned(0)?)))
                .method("change", Signature::new().param::<i32>("value"), |this: &Int, args| {
                    let value: i32 = args.cloned(0)?;
                    this.value.store(value, Ordering::SeqCst);
                    Ok(value)
                })
                .method("try_throw", Signature::new(), |_: &Int, _| -> Result<(), DiError> {
                    Err(DiError::invocation("content defined"))
                })
                .method("optional_parameters", Signature::new().variadic::<Value>("param"), |_: &Int, args| {
                    Ok(format!("objects: {}", args.array::<Value>(0)?.len()))
                }),
        )
        .register(TypeDef::class::<TakeArguments>().constructor(
            Signature::new()
                .param::<dyn Fake>("fake")
                .param::<Int>("val")
                .param::<String>("match")
                .param_or("testint", 0i32)
                .param_or("testb", 1i32),
            |args| {
                Ok(TakeArguments {
                    fake_value: args.get_trait::<dyn Fake>(0)?.value(),
                    int_value: args.get::<Int>(1)?.get(),
                    matched: args.cloned(2)?,
                    test_int: args.cloned(3)?,
                    test_b: args.cloned(4)?,
                })
            },
        ))
        .register(
            TypeDef::class::<MethodTests>()
                .constructor(Signature::new(), |_| Ok(MethodTests))
                .method("array_size", Signature::new().param::<Box<[i32]>>("array"), |_: &MethodTests, args| {
                    Ok(args.array::<i32>(0)?.len() as i32)
                })
                .method("array_sum", Signature::new().param::<Box<[i32]>>("array"), |_: &MethodTests, args| {
                    Ok(args.array::<i32>(0)?.iter().sum::<i32>())
                })
                .method("list_size", Signature::new().param::<Vec<i32>>("list"), |_: &MethodTests, args| {
                    Ok(args.list::<i32>(0)?.len() as i32)
                })
                .method("list_sum", Signature::new().param::<Vec<i32>>("list"), |_: &MethodTests, args| {
                    Ok(args.list::<i32>(0)?.iter().sum::<i32>())
                }),
        )
        .register(TypeDef::class::<StaticObject>())
        .register(TypeDef::abstract_class::<AbstractObject>())
        .register(TypeDef::enumeration::<EnumTest>())
        .register(TypeDef::opaque::<fn()>())
        .register(
            TypeDef::value_type::<StructObject>()
                .constructor(Signature::new().param_or("value", 10i32), |args| Ok(StructObject { value: args.cloned(0)? })),
        )
        .register(
            TypeDef::class::<GenericObject<i32>>()
                .constructor(Signature::new().param_or("value", 0i32), |args| Ok(GenericObject { value: args.cloned(0)? })),
        )
        .register(
            TypeDef::class::<GenericObject<f64>>()
                .constructor(Signature::new().param_or("value", 0f64), |args| Ok(GenericObject { value: args.cloned(0)? })),
        );
}

fn provider() -> ferrous_activator::ServiceProvider {
    let mut services = ServiceCollection::new();
    describe(services.types_mut());
    services.add(ServiceDescriptor::singleton_factory(|_| Ok(Int::new(10))), false);
    services.add(ServiceDescriptor::singleton::<dyn Fake, FakeA>(), false);
    services.build()
}

fn factory() -> ObjectFactory {
    let mut catalog = TypeCatalog::new();
    describe(&mut catalog);
    ObjectFactory::new(catalog, Hooks::new())
}

fn invoke_i32(factory: &ObjectFactory, target: &Value, method: &str, args: Arguments) -> i32 {
    factory
        .invoke_method(target, method, &args, None)
        .unwrap()
        .and_then(|v| v.cloned::<i32>())
        .unwrap()
}

fn fields(made: &TakeArguments) -> (i32, i32, &str, i32, i32) {
    (made.fake_value, made.int_value, made.matched.as_str(), made.test_int, made.test_b)
}

// ===== Construction =====

#[test]
fn test_create_with_defaults_only() {
    let made = factory().create_instance(TypeKey::of::<Int>(), &Arguments::new(), None).unwrap();
    assert_eq!(made.downcast_ref::<Int>().unwrap().get(), 0);
}

#[test]
fn test_positional_values_and_services() {
    let sp = provider();

    let made = sp.create::<TakeArguments>(&Arguments::new().arg("match").arg(4).arg(0)).unwrap();
    assert_eq!(fields(&made), (1, 10, "match", 4, 0));

    let made = sp.create::<TakeArguments>(&Arguments::new().arg("match").arg(4)).unwrap();
    assert_eq!(fields(&made), (1, 10, "match", 4, 1));
}

#[test]
fn test_named_values_take_precedence() {
    let sp = provider();

    let made = sp
        .create::<TakeArguments>(&Arguments::new().named("match", "test_match").arg(4).arg(0))
        .unwrap();
    assert_eq!(fields(&made), (1, 10, "test_match", 4, 0));

    let made = sp
        .create::<TakeArguments>(&Arguments::new().named("match", "test_match").named("testb", 10))
        .unwrap();
    assert_eq!(fields(&made), (1, 10, "test_match", 0, 10));

    let made = sp
        .create::<TakeArguments>(
            &Arguments::new()
                .named("match", "test_match")
                .named("testb", 10)
                .arg("match")
                .arg(4)
                .arg(5),
        )
        .unwrap();
    assert_eq!(fields(&made), (1, 10, "test_match", 4, 10));
}

#[test]
fn test_unresolvable_kinds_fail_before_matching() {
    let sp = provider();
    let reason_of = |key: TypeKey| match sp.create_instance(key, &Arguments::new().arg(10)) {
        Err(DiError::Unresolvable { reason, .. }) => Some(reason),
        _ => None,
    };

    assert_eq!(reason_of(TypeKey::of::<dyn Fake>()), Some(Unresolvable::Interface));
    assert_eq!(reason_of(TypeKey::of::<AbstractObject>()), Some(Unresolvable::Abstract));
    assert_eq!(reason_of(TypeKey::of::<EnumTest>()), Some(Unresolvable::Enum));
    assert_eq!(reason_of(TypeKey::of::<Box<[i32]>>()), Some(Unresolvable::Array));
    assert_eq!(reason_of(TypeKey::of::<fn()>()), Some(Unresolvable::NonInstantiable));
    assert_eq!(reason_of(TypeKey::of::<Vec<u8>>()), None);
}

#[test]
fn test_distinct_unresolvable_messages() {
    let sp = provider();
    let messages: Vec<String> = [
        TypeKey::of::<dyn Fake>(),
        TypeKey::of::<AbstractObject>(),
        TypeKey::of::<EnumTest>(),
        TypeKey::of::<Box<[i32]>>(),
    ]
    .into_iter()
    .map(|key| sp.create_instance(key, &Arguments::new()).unwrap_err().to_string())
    .collect();

    assert!(messages[0].starts_with("cannot create instance of interface"));
    assert!(messages[1].starts_with("cannot create instance of abstract class"));
    assert!(messages[2].starts_with("cannot create instance of enum type"));
    assert!(messages[3].starts_with("cannot create instance of array"));
}

#[test]
fn test_no_public_constructor() {
    let sp = provider();
    let err = sp.create_instance(TypeKey::of::<StaticObject>(), &Arguments::new().arg(10)).unwrap_err();
    assert!(matches!(err, DiError::NoMatchingConstructor(_)));
}

#[test]
fn test_generics_structs_and_primitives() {
    let sp = provider();

    assert_eq!(sp.create::<GenericObject<i32>>(&Arguments::new().arg(10)).unwrap().value, 10);
    assert_eq!(sp.create::<GenericObject<f64>>(&Arguments::new()).unwrap().value, 0.0);
    assert_eq!(sp.create::<StructObject>(&Arguments::new().arg(5)).unwrap().value, 5);
    assert_eq!(sp.create::<StructObject>(&Arguments::new()).unwrap().value, 10);
    assert_eq!(*sp.create::<i32>(&Arguments::new().arg(5)).unwrap(), 5);
}

#[test]
fn test_primitive_from_convertible_input() {
    let sp = provider();
    assert_eq!(*sp.create::<i64>(&Arguments::new().arg("42")).unwrap(), 42);
    assert_eq!(*sp.create::<u8>(&Arguments::new().named("VALUE", 7i32)).unwrap(), 7);
    assert!(matches!(
        sp.create::<u8>(&Arguments::new().arg("not a number")),
        Err(DiError::NoMatchingConstructor(_))
    ));
}

// ===== Methods =====

#[test]
fn test_invoke_method() {
    let factory = factory();
    let target = factory.create_instance(TypeKey::of::<Int>(), &Arguments::new(), None).unwrap();

    assert_eq!(invoke_i32(&factory, &target, "change", Arguments::new().arg(10)), 10);
    assert_eq!(target.downcast_ref::<Int>().unwrap().get(), 10);

    let err = factory
        .invoke_method(&target, "try_throw", &Arguments::new(), None)
        .unwrap_err();
    assert_eq!(err.to_string(), "content defined");
    assert!(err.user_error().is_some());

    let ret = factory
        .invoke_method(
            &target,
            "optional_parameters",
            &Arguments::new().arg("str").arg(1).arg(2).arg(3).arg(4),
            None,
        )
        .unwrap()
        .and_then(|v| v.cloned::<String>());
    assert_eq!(ret.as_deref(), Some("objects: 5"));
}

#[test]
fn test_unknown_method() {
    let factory = factory();
    let target = Value::new(MethodTests);
    let err = factory.invoke_method(&target, "missing", &Arguments::new(), None).unwrap_err();
    assert!(matches!(err, DiError::NoMatchingMethod { .. }));
}

#[test]
fn test_array_parameters() {
    let factory = factory();
    let obj = Value::new(MethodTests);

    assert_eq!(invoke_i32(&factory, &obj, "array_size", Arguments::new()), 0);
    assert_eq!(invoke_i32(&factory, &obj, "array_sum", Arguments::new()), 0);

    let numbers = || Arguments::new().arg(Value::array(vec![1, 2, 3]));
    assert_eq!(invoke_i32(&factory, &obj, "array_size", numbers()), 3);
    assert_eq!(invoke_i32(&factory, &obj, "array_sum", numbers()), 6);

    let named = || Arguments::new().named("array", Value::array(vec![1, 2, 3]));
    assert_eq!(invoke_i32(&factory, &obj, "array_size", named()), 3);
    assert_eq!(invoke_i32(&factory, &obj, "array_sum", named()), 6);

    let scalar = || Arguments::new().named("array", 10);
    assert_eq!(invoke_i32(&factory, &obj, "array_size", scalar()), 1);
    assert_eq!(invoke_i32(&factory, &obj, "array_sum", scalar()), 10);
}

#[test]
fn test_list_parameters() {
    let factory = factory();
    let obj = Value::new(MethodTests);

    assert_eq!(invoke_i32(&factory, &obj, "list_size", Arguments::new()), 0);
    assert_eq!(invoke_i32(&factory, &obj, "list_sum", Arguments::new()), 0);

    let positional = || Arguments::new().arg(Value::array(vec![1, 2, 3]));
    assert_eq!(invoke_i32(&factory, &obj, "list_size", positional()), 3);
    assert_eq!(invoke_i32(&factory, &obj, "list_sum", positional()), 6);

    let both = || {
        Arguments::new()
            .named("list", vec![1, 2, 3])
            .named("array", vec![1, 2, 3])
    };
    assert_eq!(invoke_i32(&factory, &obj, "list_size", both()), 3);
    assert_eq!(invoke_i32(&factory, &obj, "list_sum", both()), 6);
    assert_eq!(invoke_i32(&factory, &obj, "array_size", both()), 3);
    assert_eq!(invoke_i32(&factory, &obj, "array_sum", both()), 6);

    let scalar = || Arguments::new().named("list", 10);
    assert_eq!(invoke_i32(&factory, &obj, "list_size", scalar()), 1);
    assert_eq!(invoke_i32(&factory, &obj, "list_sum", scalar()), 10);

    let texts = || Arguments::new().named("list", Value::array(vec!["1".to_string(), "2".into(), "3".into(), "a".into()]));
    assert_eq!(invoke_i32(&factory, &obj, "list_size", texts()), 3);
    assert_eq!(invoke_i32(&factory, &obj, "list_sum", texts()), 6);
}
