#![no_main]

use ferrous_activator::{Arguments, Resolver, ServiceCollection, Signature, TypeDef, Value};
use libfuzzer_sys::fuzz_target;

struct Target {
    text: String,
    count: i32,
    ratio: f64,
    items: Box<[i64]>,
}

fn input(tag: u8, bytes: &[u8]) -> Value {
    let text = String::from_utf8_lossy(bytes).into_owned();
    let number = bytes.iter().fold(0i64, |acc, b| acc.wrapping_mul(31).wrapping_add(*b as i64));
    match tag % 7 {
        0 => Value::from(text),
        1 => Value::from(number),
        2 => Value::from(number as i32),
        3 => Value::from(number as f64 / 7.0),
        4 => Value::from(number % 2 == 0),
        5 => Value::array(vec![number, -number]),
        _ => Value::list(bytes.iter().map(|b| *b as i64).collect::<Vec<_>>()),
    }
}

const NAMES: [&str; 6] = ["text", "COUNT", "ratio", "items", "value", "missing"];

fuzz_target!(|data: &[u8]| {
    let mut services = ServiceCollection::new();
    services.register_type(
        TypeDef::class::<Target>()
            .constructor(
                Signature::new()
                    .param::<String>("text")
                    .param_or("count", 1i32)
                    .param::<f64>("ratio")
                    .param::<Box<[i64]>>("items"),
                |args| {
                    Ok(Target {
                        text: args.cloned(0)?,
                        count: args.cloned(1)?,
                        ratio: args.cloned(2)?,
                        items: args.array::<i64>(3)?.into_boxed_slice(),
                    })
                },
            )
            .constructor(Signature::new().variadic::<Value>("rest"), |args| {
                Ok(Target {
                    text: String::new(),
                    count: args.array::<Value>(0)?.len() as i32,
                    ratio: 0.0,
                    items: Box::new([]),
                })
            }),
    );
    let provider = services.build();

    // Each chunk: [tag, name selector, len, bytes...]
    let mut args = Arguments::new();
    let mut rest = data;
    while rest.len() >= 3 {
        let (tag, selector, len) = (rest[0], rest[1], rest[2] as usize % 16);
        let end = (3 + len).min(rest.len());
        let value = input(tag, &rest[3..end]);
        args = if selector % 3 == 0 {
            args.named(NAMES[selector as usize % NAMES.len()], value)
        } else {
            args.arg(value)
        };
        rest = &rest[end..];
    }

    // Activation either succeeds or reports an error; it never panics
    if let Ok(target) = provider.create::<Target>(&args) {
        let _ = (target.text.len(), target.count, target.ratio, target.items.len());
    }
    for primitive in [0u8, 1, 2, 3] {
        let _ = provider.create_instance(input(primitive, &[]).type_key(), &args);
    }
});
