use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use datadict::prelude::*;
use datadict::{fields_of, on_attach, snapshot, NdArray};

#[derive(Serialize)]
struct Drift {
    length: f64,
    aperture: f64,
}

const LENGTH: Field<f64> = Field::new("length");

#[test]
fn test_listing_shows_prototype_and_array_shapes() {
    let ctx = Context::new();
    let defaults = Rc::new(RefCell::new(datadict! { "name" => "defaults" }));
    let pixels = NdArray::new(vec![2, 3], vec![0.0; 6]).unwrap();
    let screen = ctx
        .builder()
        .kind("Screen")
        .prototype(defaults)
        .set("name", "s1")
        .set("pixels", Value::object(pixels))
        .set("_scratch", 1)
        .build();

    let expected = [
        format!("<Screen {} _proto=<DataDict \"defaults\">", screen.id()),
        format!("  {:<25} = s1", "name"),
        format!("  {:<25} = <array float64[2, 3]> >", "pixels"),
    ]
    .join("\n");
    assert_eq!(format!("{:#}", screen), expected);
    assert_eq!(screen.to_string(), "<Screen \"s1\">");
}

#[test]
fn test_assignment_hook_can_write_siblings() {
    let mut d = DataDict::new();
    d.set(
        "length",
        on_attach(Value::from(2.0), |d, key| d.set(format!("{}_unit", key), "m")),
    )
    .unwrap();

    assert_eq!(d.get("length").unwrap(), Value::from(2.0));
    assert_eq!(d.get("length_unit").unwrap(), Value::from("m"));
    assert_eq!(d.keys(), vec!["length", "length_unit"]);
}

#[test]
fn test_struct_seeded_object_with_typed_fields() {
    let ctx = Context::new();
    let drift = Drift {
        length: 1.5,
        aperture: 0.02,
    };
    let mut obj = ctx.builder().kind("Drift").source(fields_of(&drift).unwrap()).build_obj();

    assert_eq!(LENGTH.get(&obj).unwrap(), 1.5);
    LENGTH.set(&mut obj, 3.0).unwrap();
    assert_eq!(obj.evaluate("length / aperture").unwrap(), Value::from(150.0));
    assert_eq!(obj.get_as::<f64>("aperture").unwrap(), 0.02);

    obj.set("half", Value::object(Link::new("length"))).unwrap();
    assert_eq!(
        snapshot(&obj).unwrap(),
        serde_json::json!({"aperture": 0.02, "length": 3.0, "half": 3.0})
    );
}

#[test]
fn test_unregistered_subscriber_stops_hearing() {
    let hub = Rc::new(EventDispatcher::new());
    let count = Rc::new(RefCell::new(0));
    let c = count.clone();
    let sub = hub.register_fn(CHANGESTATE, move |_| {
        *c.borrow_mut() += 1;
        Ok(())
    });

    let mut d = Context::with_dispatcher(hub.clone()).dict();
    d.set("a", 1).unwrap();
    assert_eq!(hub.unregister(CHANGESTATE, &sub), 1);
    d.set("a", 2).unwrap();
    assert_eq!(*count.borrow(), 1);
    assert_eq!(hub.subscriptions(CHANGESTATE), 0);
}
