use crate::{
    interface, markers, Arguments, Bindings, Constructor, DefaultProvider,
    InjectError, InjectResult, Lazy, Method, Parameter, ResolutionContext,
    Resolvable, Service, StaticField, Svc, TypeDescriptor, TypeMetadata,
    TypeRegistry,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

fn provider(registry: TypeRegistry) -> DefaultProvider {
    DefaultProvider::builder().registry(registry).build()
}

#[derive(Debug)]
struct Config {
    name: String,
}

#[test]
fn constant_binding_is_returned_as_is() {
    let config = Svc::new(Config {
        name: "bound".to_owned(),
    });
    let mut bindings = Bindings::builder();
    bindings.bind(config.clone());
    let provider = DefaultProvider::builder()
        .bindings(bindings.build())
        .build();

    for _ in 0..3 {
        let resolved: Svc<Config> = provider.get().unwrap().unwrap();
        assert!(Svc::ptr_eq(&config, &resolved));
        assert_eq!("bound", resolved.name);
    }
}

#[test]
fn later_merged_binding_wins() {
    let mut first = Bindings::builder();
    first.bind(Svc::new(Config {
        name: "first".to_owned(),
    }));
    let mut second = Bindings::builder();
    second.bind(Svc::new(Config {
        name: "second".to_owned(),
    }));

    let provider = DefaultProvider::builder()
        .bindings(first.build().merged(second.build()))
        .build();
    let config: Svc<Config> = provider.get().unwrap().unwrap();
    assert_eq!("second", config.name);
}

struct Node {
    next: Option<Svc<Node>>,
}

fn node_provider(parameter: Parameter) -> DefaultProvider {
    let mut registry = TypeRegistry::new();
    registry.register(
        TypeMetadata::concrete::<Node>().constructor(
            Constructor::new(|args| Ok(Node { next: args.value(0)? }))
                .param(parameter),
        ),
    );
    provider(registry)
}

#[test]
fn direct_self_dependency_is_cyclic() {
    let provider = node_provider(Parameter::of::<Node>());
    match provider.get::<Node>() {
        Err(InjectError::CyclicDependency { descriptor, cycle })
            if descriptor == TypeDescriptor::of::<Node>() =>
        {
            assert_eq!(
                vec![TypeDescriptor::of::<Node>(), TypeDescriptor::of::<Node>()],
                cycle
            );
        }
        Err(error) => panic!("unexpected error: {}", error),
        Ok(_) => unreachable!("a cyclic type should not be created"),
    }

    // The failed request must not leave the type marked as in flight.
    match provider.get::<Node>() {
        Err(InjectError::CyclicDependency { cycle, .. }) => {
            assert_eq!(2, cycle.len());
        }
        Err(error) => panic!("unexpected error: {}", error),
        Ok(_) => unreachable!("a cyclic type should not be created"),
    }
}

#[test]
fn absence_tolerant_self_dependency_resolves() {
    for parameter in [Parameter::optional::<Node>(), Parameter::nullable::<Node>()] {
        let provider = node_provider(parameter);
        let node = provider.get::<Node>().unwrap().unwrap();
        assert!(node.next.is_none());
    }
}

fn assert_cycle<T: ?Sized + Resolvable>(
    provider: &DefaultProvider,
    expected: &[TypeDescriptor],
) {
    match provider.get::<T>() {
        Err(InjectError::CyclicDependency { descriptor, cycle }) => {
            assert_eq!(TypeDescriptor::of::<T>(), descriptor);
            assert_eq!(expected, cycle.as_slice());
        }
        Err(error) => panic!("unexpected error: {}", error),
        Ok(_) => unreachable!("a cyclic type should not be created"),
    }
}

struct Left;
struct Right;

#[test]
fn indirect_constructor_cycle_reports_path() {
    let mut registry = TypeRegistry::new();
    registry
        .register(
            TypeMetadata::concrete::<Left>().constructor(
                Constructor::new(|args| {
                    args.value::<Right>(0)?;
                    Ok(Left)
                })
                .param(Parameter::of::<Right>()),
            ),
        )
        .register(
            TypeMetadata::concrete::<Right>().constructor(
                Constructor::new(|args| {
                    args.value::<Left>(0)?;
                    Ok(Right)
                })
                .param(Parameter::of::<Left>()),
            ),
        );
    let provider = provider(registry);

    let left = TypeDescriptor::of::<Left>();
    let right = TypeDescriptor::of::<Right>();
    assert_cycle::<Left>(&provider, &[left, right, left]);
    assert_cycle::<Right>(&provider, &[right, left, right]);
}

trait Socket: Service {}
interface!(Socket);

struct Plug;
impl Socket for Plug {}

#[test]
fn cycle_through_alias_binding_is_detected() {
    let mut registry = TypeRegistry::new();
    registry.register(
        TypeMetadata::concrete::<Plug>()
            .implements::<dyn Socket>()
            .constructor(
                Constructor::new(|args| {
                    args.value::<dyn Socket>(0)?;
                    Ok(Plug)
                })
                .param(Parameter::of::<dyn Socket>()),
            ),
    );
    let mut bindings = Bindings::builder();
    bindings.bind_alias::<dyn Socket, Plug>();
    let provider = DefaultProvider::builder()
        .registry(registry)
        .bindings(bindings.build())
        .build();

    let socket = TypeDescriptor::of::<dyn Socket>();
    assert_cycle::<dyn Socket>(
        &provider,
        &[socket, TypeDescriptor::of::<Plug>(), socket],
    );
}

struct Head;
struct Tail;

#[test]
fn cycle_through_factory_binding_is_detected() {
    let mut registry = TypeRegistry::new();
    registry.register(
        TypeMetadata::concrete::<Tail>().constructor(
            Constructor::new(|args| {
                args.value::<Head>(0)?;
                Ok(Tail)
            })
            .param(Parameter::of::<Head>()),
        ),
    );
    let mut bindings = Bindings::builder();
    bindings.bind_factory(
        |provider: &DefaultProvider, context: &ResolutionContext| {
            provider.get_in::<Tail>(context)?;
            Ok(Some(Svc::new(Head)))
        },
    );
    let provider = DefaultProvider::builder()
        .registry(registry)
        .bindings(bindings.build())
        .build();

    let head = TypeDescriptor::of::<Head>();
    assert_cycle::<Head>(&provider, &[head, TypeDescriptor::of::<Tail>(), head]);
}

struct Seed;

#[test]
fn cycle_through_factory_method_parameter_is_detected() {
    let mut registry = TypeRegistry::new();
    registry.register(
        TypeMetadata::concrete::<Seed>().method(
            Method::factory("grow", |args: &Arguments| {
                args.value::<Seed>(0)?;
                Ok(Svc::new(Seed))
            })
            .param(Parameter::of::<Seed>())
            .marker(markers::DEFAULT),
        ),
    );
    let provider = provider(registry);

    let seed = TypeDescriptor::of::<Seed>();
    assert_cycle::<Seed>(&provider, &[seed, seed]);
}

struct Chain {
    next: Lazy<Chain>,
}

#[test]
fn lazy_self_dependency_resolves() {
    let mut registry = TypeRegistry::new();
    registry.register(
        TypeMetadata::concrete::<Chain>().constructor(
            Constructor::new(|args| Ok(Chain { next: args.lazy(0)? }))
                .param(Parameter::lazy::<Chain>()),
        ),
    );
    let provider = provider(registry);

    let chain = provider.get::<Chain>().unwrap().unwrap();
    let next = chain.next.get().unwrap().unwrap();
    assert!(!Svc::ptr_eq(&chain, &next));
    assert!(next.next.get().unwrap().is_some());
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Color {
    Red,
    Green,
}

#[test]
fn enum_defaults() {
    let mut registry = TypeRegistry::new();
    registry.register(
        TypeMetadata::enumeration::<Color>()
            .member("Red", Color::Red)
            .default_member("Green", Color::Green),
    );
    assert_eq!(Some(Color::Green), provider(registry).get::<Color>().unwrap().map(|c| *c));

    let mut registry = TypeRegistry::new();
    registry.register(
        TypeMetadata::enumeration::<Color>()
            .member("Red", Color::Red)
            .member("Green", Color::Green),
    );
    assert_eq!(Some(Color::Red), provider(registry).get::<Color>().unwrap().map(|c| *c));

    let mut registry = TypeRegistry::new();
    registry.register(TypeMetadata::enumeration::<Color>());
    assert!(provider(registry).get::<Color>().unwrap().is_none());
}

trait Greeter: Service {
    fn greet(&self, name: &str) -> String {
        format!("Hello: {}", name)
    }
}

trait Farewell: Greeter {
    #[allow(dead_code)]
    fn farewell(&self) -> String;
}

interface!(Greeter);
interface!(Farewell);

#[derive(Default)]
struct PlainGreeter;

impl Greeter for PlainGreeter {}

const GREET: &str = "fn greet(&self, name: &str) -> String";
const FAREWELL: &str = "fn farewell(&self) -> String";

#[test]
fn default_interface_is_synthesized() {
    let mut registry = TypeRegistry::new();
    registry.register(
        TypeMetadata::interface::<dyn Greeter>()
            .marker(markers::DEFAULT_INTERFACE)
            .default_method(GREET)
            .synthesized_by::<PlainGreeter>(),
    );

    let greeter = provider(registry).get::<dyn Greeter>().unwrap().unwrap();
    assert_eq!("Hello: there", greeter.greet("there"));
}

#[test]
fn interface_with_abstract_method_is_not_synthesized() {
    let mut registry = TypeRegistry::new();
    registry
        .register(
            TypeMetadata::interface::<dyn Greeter>()
                .marker(markers::DEFAULT_INTERFACE)
                .default_method(GREET),
        )
        .register(
            TypeMetadata::interface::<dyn Farewell>()
                .marker(markers::DEFAULT_INTERFACE)
                .extends::<dyn Greeter>()
                .abstract_method(FAREWELL),
        );

    match provider(registry).get::<dyn Farewell>() {
        Err(InjectError::NonDefaultInterface {
            descriptor,
            methods,
        }) if descriptor == TypeDescriptor::of::<dyn Farewell>() => {
            assert_eq!(1, methods.len());
            assert_eq!(
                Some(&TypeDescriptor::of::<dyn Farewell>()),
                methods.get(FAREWELL)
            );
        }
        Err(error) => panic!("unexpected error: {}", error),
        Ok(_) => unreachable!("the interface should not be synthesized"),
    }
}

struct Pair;

#[test]
fn ambiguous_constructors_resolve_to_null() {
    let mut registry = TypeRegistry::new();
    registry.register(
        TypeMetadata::concrete::<Pair>()
            .constructor(
                Constructor::new(|_| Ok(Pair)).param(Parameter::of::<u8>()),
            )
            .constructor(
                Constructor::new(|_| Ok(Pair)).param(Parameter::of::<u16>()),
            ),
    );

    let resolved: InjectResult<Option<Svc<Pair>>> = provider(registry).get();
    assert!(resolved.unwrap().is_none());
}

trait Storage: Service {}
interface!(Storage);

struct Repository {
    boxed: Option<Svc<dyn Storage>>,
    plain: Option<Svc<dyn Storage>>,
}

fn repository_provider(plain: Parameter) -> DefaultProvider {
    let mut registry = TypeRegistry::new();
    registry
        .register(TypeMetadata::interface::<dyn Storage>())
        .register(
            TypeMetadata::concrete::<Repository>().constructor(
                Constructor::new(|args| {
                    Ok(Repository {
                        boxed: args.value(0)?,
                        plain: args.value(1)?,
                    })
                })
                .param(Parameter::optional::<dyn Storage>())
                .param(plain),
            ),
        );
    provider(registry)
}

#[test]
fn absence_tolerant_parameters_swallow_failures() {
    let provider = repository_provider(Parameter::nullable::<dyn Storage>());
    let repository = provider.get::<Repository>().unwrap().unwrap();
    assert!(repository.boxed.is_none());
    assert!(repository.plain.is_none());
}

#[test]
fn plain_parameter_failures_propagate() {
    let provider = repository_provider(Parameter::of::<dyn Storage>());
    match provider.get::<Repository>() {
        Err(InjectError::AbstractClassCreation { descriptor })
            if descriptor == TypeDescriptor::of::<dyn Storage>() => {}
        Err(error) => panic!("unexpected error: {}", error),
        Ok(_) => unreachable!("the repository should not be created"),
    }
}

struct Ticket(usize);

#[test]
fn factory_method_runs_on_each_request() {
    let issued = Svc::new(AtomicUsize::new(0));
    let counter = issued.clone();
    let mut registry = TypeRegistry::new();
    registry.register(
        TypeMetadata::concrete::<Ticket>().method(
            Method::factory("next", move |_| {
                Ok(Svc::new(Ticket(counter.fetch_add(1, Ordering::SeqCst) + 1)))
            })
            .marker(markers::DEFAULT),
        ),
    );
    let provider = provider(registry);

    assert_eq!(1, provider.get::<Ticket>().unwrap().unwrap().0);
    assert_eq!(2, provider.get::<Ticket>().unwrap().unwrap().0);
    assert_eq!(2, issued.load(Ordering::SeqCst));
}

#[test]
fn factory_method_parameters_are_resolved() {
    let mut registry = TypeRegistry::new();
    registry.register(
        TypeMetadata::concrete::<Config>().method(
            Method::factory("named", |args: &Arguments| {
                let provider: Option<Svc<DefaultProvider>> = args.value(0)?;
                let length = args.value::<usize>(1)?.map_or(0, |v| *v);
                Ok(Svc::new(Config {
                    name: format!("{}:{}", provider.is_some(), length),
                }))
            })
            .param(Parameter::of::<DefaultProvider>())
            .param(Parameter::of::<usize>())
            .marker(markers::DEFAULT),
        ),
    );

    let config = provider(registry).get::<Config>().unwrap().unwrap();
    assert_eq!("true:0", config.name);
}

#[test]
fn optional_factory_may_return_null() {
    let mut registry = TypeRegistry::new();
    registry.register(
        TypeMetadata::concrete::<Ticket>().method(
            Method::optional_factory::<Ticket, _>("none", |_| Ok(None))
                .marker(markers::DEFAULT),
        ),
    );
    assert!(provider(registry).get::<Ticket>().unwrap().is_none());
}

#[test]
fn singleton_field_is_shared() {
    let mut registry = TypeRegistry::new();
    registry.register(
        TypeMetadata::concrete::<Config>()
            .static_field(StaticField::new(
                "UNMARKED",
                Svc::new(Config {
                    name: "unmarked".to_owned(),
                }),
            ))
            .static_field(
                StaticField::new(
                    "INSTANCE",
                    Svc::new(Config {
                        name: "instance".to_owned(),
                    }),
                )
                .marker(markers::DEFAULT),
            ),
    );
    let provider = provider(registry);

    let first = provider.get::<Config>().unwrap().unwrap();
    let second = provider.get::<Config>().unwrap().unwrap();
    assert_eq!("instance", first.name);
    assert!(Svc::ptr_eq(&first, &second));
}

#[test]
fn lazy_field_is_computed_on_read() {
    let mut registry = TypeRegistry::new();
    registry.register(
        TypeMetadata::concrete::<Ticket>().static_field(
            StaticField::lazy("LATEST", || Ok(Some(Svc::new(Ticket(7)))))
                .marker(markers::DEFAULT),
        ),
    );
    assert_eq!(7, provider(registry).get::<Ticket>().unwrap().unwrap().0);
}

trait Lifecycle: Service {
    fn record(&self, step: &'static str);
}

interface!(Lifecycle);

#[derive(Default)]
struct Component {
    steps: Mutex<Vec<&'static str>>,
}

impl Lifecycle for Component {
    fn record(&self, step: &'static str) {
        self.steps.lock().unwrap().push(step);
    }
}

#[test]
fn post_construct_hooks_run_supertypes_first() {
    let mut registry = TypeRegistry::new();
    registry
        .register(TypeMetadata::interface::<dyn Lifecycle>().method(
            Method::post_construct::<dyn Lifecycle, _>("start", |value| {
                value.record("lifecycle");
                Ok(())
            }),
        ))
        .register(
            TypeMetadata::concrete::<Component>()
                .implements::<dyn Lifecycle>()
                .constructor(Constructor::new(|_| Ok(Component::default())))
                .method(
                    Method::post_construct("init", |value: &Component| {
                        value.record("component");
                        Ok(())
                    })
                    .private(),
                )
                .method(Method::instance("ignored", |value: &Component| {
                    value.record("ignored");
                    Ok(())
                })),
        );

    let component = provider(registry).get::<Component>().unwrap().unwrap();
    assert_eq!(
        vec!["lifecycle", "component"],
        *component.steps.lock().unwrap()
    );
}

#[derive(Debug)]
struct Broken;

#[test]
fn constructor_errors_are_wrapped() {
    let mut registry = TypeRegistry::new();
    registry.register(
        TypeMetadata::concrete::<Broken>()
            .constructor(Constructor::new(|_| -> Result<Broken, _> { Err("broken".into()) })),
    );

    match provider(registry).get::<Broken>() {
        Err(InjectError::DefaultCreation { descriptor, inner })
            if descriptor == TypeDescriptor::of::<Broken>() =>
        {
            assert_eq!("broken", inner.to_string());
        }
        Err(error) => panic!("unexpected error: {}", error),
        Ok(_) => unreachable!("the constructor should fail"),
    }
}

#[test]
fn inject_errors_from_constructors_pass_through() {
    let mut registry = TypeRegistry::new();
    registry.register(
        TypeMetadata::concrete::<Broken>().constructor(
            Constructor::new(|args| {
                args.lazy::<u8>(0)?;
                Ok(Broken)
            })
            .param(Parameter::of::<u8>()),
        ),
    );

    match provider(registry).get::<Broken>() {
        Err(InjectError::InvalidArgument { descriptor, index: 0 })
            if descriptor == TypeDescriptor::of::<u8>() => {}
        Err(error) => panic!("unexpected error: {}", error),
        Ok(_) => unreachable!("the argument should be rejected"),
    }
}

#[test]
fn concurrent_requests_share_supplier() {
    let built = Svc::new(AtomicUsize::new(0));
    let counter = built.clone();
    let mut registry = TypeRegistry::new();
    registry.register(TypeMetadata::concrete::<Ticket>().constructor(
        Constructor::new(move |_| {
            Ok(Ticket(counter.fetch_add(1, Ordering::SeqCst)))
        }),
    ));
    let provider = provider(registry);

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..16 {
                    assert!(provider.get::<Ticket>().unwrap().is_some());
                }
            });
        }
    });

    assert_eq!(8 * 16, built.load(Ordering::SeqCst));
}
