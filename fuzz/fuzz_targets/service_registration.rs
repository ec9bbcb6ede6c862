#![no_main]

use ferrous_activator::{Resolver, ServiceCollection, ServiceDescriptor};
use libfuzzer_sys::fuzz_target;

struct A(u8);
struct B(u8);
struct C(u8);

fuzz_target!(|data: &[u8]| {
    let mut services = ServiceCollection::new();

    // Each byte: low bits pick the service, next bits the lifetime, high bit replace
    for byte in data.iter().take(64) {
        let replace = byte & 0x80 != 0;
        let value = *byte;
        let descriptor = match (byte & 0x3, (byte >> 2) & 0x3) {
            (0, 0) => ServiceDescriptor::singleton_factory(move |_| Ok(A(value))),
            (0, 1) => ServiceDescriptor::scoped_factory(move |_| Ok(A(value))),
            (0, _) => ServiceDescriptor::transient_factory(move |_| Ok(A(value))),
            (1, 0) => ServiceDescriptor::instance(B(value)),
            (1, _) => ServiceDescriptor::scoped_factory(move |r| Ok(B(r.get::<A>()?.0))),
            (2, _) => ServiceDescriptor::transient_factory(move |r| Ok(C(r.get::<B>()?.0))),
            _ => ServiceDescriptor::transient_factory(move |r| Ok(A(r.get::<C>()?.0))),
        };
        services.add(descriptor, replace);
    }

    let provider = services.build();
    let scope = provider.create_scope();
    let _ = scope.get::<A>();
    let _ = scope.get::<B>();
    let _ = scope.get::<C>();
    let _ = provider.get::<A>();
    let _ = scope.dispose();
    let _ = provider.dispose();
});
