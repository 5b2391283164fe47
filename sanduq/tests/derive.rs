use sanduq::prelude::*;
use std::sync::Arc;

trait Transport: Send + Sync {
    fn name(&self) -> &'static str;
}

struct Smtp;

impl Transport for Smtp {
    fn name(&self) -> &'static str {
        "smtp"
    }
}

#[derive(Injectable)]
struct Clock;

#[derive(Injectable)]
struct Outbox {
    clock: Arc<Clock>,
    #[inject(default)]
    capacity: usize,
}

#[derive(Injectable)]
struct Mailer {
    outbox: Arc<Outbox>,
    transport: Arc<dyn Transport>,
    #[inject(default = String::from("noreply@example.org"))]
    sender: String,
    port: u16,
}

#[derive(Injectable)]
#[injectable(manual, factory = "Pool::with_workers")]
struct Pool {
    size: usize,
}

impl Pool {
    fn with_workers() -> Callable {
        Callable::new(
            "Pool::with_workers",
            vec![Parameter::value("workers").with_default(2usize)],
            |mut args| Ok(Pool { size: args.value::<usize>()? * 10 }),
        )
    }
}

fn container() -> Container {
    Container::builder()
        .register::<Clock>()
        .register::<Outbox>()
        .register::<Mailer>()
        .register::<Pool>()
        .factory(
            Identifier::of::<Arc<dyn Transport>>(),
            Callable::from_fn("smtp", || Ok(Arc::new(Smtp) as Arc<dyn Transport>)),
        )
        .build()
        .unwrap()
}

#[test]
fn derived_parameters_follow_field_order() {
    let names: Vec<&str> = Mailer::parameters().iter().map(Parameter::name).collect();
    assert_eq!(names, vec!["outbox", "transport", "sender", "port"]);
    assert!(Mailer::parameters()[0].is_service());
    assert!(!Mailer::parameters()[3].is_service());
}

#[test]
fn unit_struct_has_no_parameters() {
    assert!(Clock::parameters().is_empty());
    assert!(container().make::<Clock>().is_ok());
}

#[test]
fn derived_class_is_autowired() {
    let container = container();

    let mailer = container.make_with::<Mailer>(args! { "port" => 587u16 }).unwrap();

    assert_eq!(mailer.sender, "noreply@example.org");
    assert_eq!(mailer.port, 587);
    assert_eq!(mailer.transport.name(), "smtp");
    assert_eq!(mailer.outbox.capacity, 0);

    let clock = container.make::<Clock>().unwrap();
    assert!(Arc::ptr_eq(&mailer.outbox.clock, &clock));
}

#[test]
fn named_arguments_override_defaults() {
    let container = container();

    let mailer = container
        .make_new::<Mailer>(args! { "port" => 25u16, "sender" => String::from("ops@example.org") })
        .unwrap();

    assert_eq!(mailer.sender, "ops@example.org");
    assert_eq!(mailer.port, 25);
}

#[test]
fn missing_required_field() {
    let container = container();

    assert!(matches!(
        container.make::<Mailer>(),
        Err(SanduqError::ParamMissing { parameter: "port", .. })
    ));
    assert!(!container.has_instance(Identifier::of::<Mailer>()));
}

#[test]
fn prebuilt_trait_object_short_circuits() {
    struct Fake;
    impl Transport for Fake {
        fn name(&self) -> &'static str {
            "fake"
        }
    }

    let container = container();
    let outbox = container.make::<Outbox>().unwrap();
    let transport: Arc<dyn Transport> = Arc::new(Fake);

    let mailer = container
        .make_new::<Mailer>(
            Args::positional()
                .push_arc(outbox.clone())
                .push(transport)
                .push(String::from("test@example.org"))
                .push(1025u16),
        )
        .unwrap();

    assert_eq!(mailer.transport.name(), "fake");
    assert!(Arc::ptr_eq(&mailer.outbox, &outbox));
    assert_eq!(mailer.sender, "test@example.org");
}

#[test]
fn factory_attribute_is_used() {
    let container = container();

    assert_eq!(container.make::<Pool>().unwrap().size, 20);
    assert_eq!(container.make_new::<Pool>(args![3usize]).unwrap().size, 30);
}

#[test]
fn derived_types_are_discovered() {
    let discovered: Vec<Identifier> = sanduq::discovered_classes()
        .map(|class| class.identifier().clone())
        .collect();

    assert!(discovered.contains(&Identifier::of::<Clock>()));
    assert!(discovered.contains(&Identifier::of::<Mailer>()));
    // opted out
    assert!(!discovered.contains(&Identifier::of::<Pool>()));
}
