use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{json, Value};
use stocked::{
    observer, MappingProxy, ProxiedStock, ProxyMap, ProxyMapSource, Pxth, SetStateAction, Stock,
    StockApi, StockError, StockProxy,
};

fn p(text: &str) -> Pxth {
    Pxth::parse(text).unwrap()
}

fn truck_proxy() -> MappingProxy {
    let source = ProxyMapSource::from_json(&json!({
        "info": {
            "truckNo": "truck.plate_no",
            "trailerNo": "trailer.plate_no",
        },
        "owner": {
            "companyName": "company",
            "contacts": [{
                "name": "contact_name",
                "contactId": "contact_id",
                "contactInfo": {
                    "email": "contact_email",
                    "phone": "contact_phone",
                },
            }],
        },
    }))
    .unwrap();
    let mut proxy = MappingProxy::new(&source, p("truck"));
    proxy.activate();
    proxy
}

fn raw_truck() -> Value {
    json!({
        "truck": {"plate_no": "AAA222"},
        "trailer": {"plate_no": "AAA111"},
        "company": "Hello World",
        "contact_name": "Bill Bill",
        "contact_id": 0,
        "contact_email": "bill.bill@mail.loc",
        "contact_phone": "+333 333 333",
    })
}

fn proxied_truck() -> (Stock, ProxiedStock<Stock>) {
    let stock = Stock::new(raw_truck());
    let proxied = ProxiedStock::new(stock.clone(), Some(Rc::new(truck_proxy()))).unwrap();
    (stock, proxied)
}

#[test]
fn normal_path_matrix() {
    let proxy = truck_proxy();
    let cases = [
        ("truck.info.truckNo", "truck.plate_no"),
        ("truck.owner.contacts[0].contactInfo.email", "contact_email"),
        ("truck.info", ""),
        ("truck.owner.contacts[0]", ""),
        ("truck.owner.contacts[0].contactInfo", ""),
        ("truck", ""),
        ("truck.info.truckNo.length", "truck.plate_no.length"),
    ];
    for (logical, real) in cases {
        assert_eq!(proxy.get_normal_path(&p(logical)).unwrap(), p(real), "{logical}");
    }
}

#[test]
fn composite_reads_reassemble() {
    let (_, proxied) = proxied_truck();
    assert_eq!(
        proxied.get_value(&p("truck.owner.contacts[0]")).unwrap(),
        json!({
            "name": "Bill Bill",
            "contactId": 0,
            "contactInfo": {"email": "bill.bill@mail.loc", "phone": "+333 333 333"},
        })
    );
    assert_eq!(
        proxied.get_value(&p("truck.info")).unwrap(),
        json!({"truckNo": "AAA222", "trailerNo": "AAA111"})
    );
    assert_eq!(
        proxied.get_value(&p("truck.owner.contacts")).unwrap(),
        json!([{
            "name": "Bill Bill",
            "contactId": 0,
            "contactInfo": {"email": "bill.bill@mail.loc", "phone": "+333 333 333"},
        }])
    );
}

#[test]
fn round_trip_exact_composite_and_drill_through() {
    let (stock, proxied) = proxied_truck();

    proxied.set_value(&p("truck.info.truckNo"), json!("NEW222").into()).unwrap();
    assert_eq!(proxied.get_value(&p("truck.info.truckNo")).unwrap(), json!("NEW222"));
    assert_eq!(stock.get_value(&p("truck.plate_no")), json!("NEW222"));

    let contact = json!({
        "name": "Ann",
        "contactId": 7,
        "contactInfo": {"email": "ann@mail.loc", "phone": "+1"},
    });
    proxied.set_value(&p("truck.owner.contacts[0]"), contact.clone().into()).unwrap();
    assert_eq!(proxied.get_value(&p("truck.owner.contacts[0]")).unwrap(), contact);
    assert_eq!(stock.get_value(&p("contact_id")), json!(7));

    let nested = json!({"parts": ["AAA", "111"]});
    proxied.set_value(&p("truck.info.trailerNo"), json!({}).into()).unwrap();
    proxied.set_value(&p("truck.info.trailerNo.detail"), nested.clone().into()).unwrap();
    assert_eq!(proxied.get_value(&p("truck.info.trailerNo.detail")).unwrap(), nested);
    assert_eq!(stock.get_value(&p("trailer.plate_no.detail.parts[1]")), json!("111"));
}

#[test]
fn composite_write_with_missing_slice_writes_null() {
    let (stock, proxied) = proxied_truck();
    proxied
        .set_value(&p("truck.info"), json!({"truckNo": "ONLY"}).into())
        .unwrap();
    assert_eq!(stock.get_value(&p("truck.plate_no")), json!("ONLY"));
    assert_eq!(stock.get_value(&p("trailer.plate_no")), Value::Null);
}

#[test]
fn composite_updater_sees_logical_value() {
    let (stock, proxied) = proxied_truck();
    proxied
        .set_value(
            &p("truck.info"),
            SetStateAction::update(|info| {
                let plate = format!("{}-X", info["truckNo"].as_str().unwrap_or_default());
                let mut info = info.clone();
                info["truckNo"] = json!(plate);
                info
            }),
        )
        .unwrap();
    assert_eq!(stock.get_value(&p("truck.plate_no")), json!("AAA222-X"));
    assert_eq!(stock.get_value(&p("trailer.plate_no")), json!("AAA111"));
}

#[test]
fn inverse_law_for_exact_entries() {
    let proxy = truck_proxy();
    for (logical, real) in proxy.map().iter() {
        let absolute = proxy.path().join(logical);
        assert_eq!(proxy.get_proxied_path(real).unwrap(), absolute);
        assert_eq!(proxy.get_normal_path(&absolute).unwrap(), *real);
    }
    assert_eq!(
        proxy.get_proxied_path(&Pxth::root()),
        Err(StockError::NoInverseMapping { path: Pxth::root() })
    );
}

#[test]
fn composite_watch_fires_for_each_leaf_write() {
    let (_, proxied) = proxied_truck();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let subscription = proxied
        .watch(&p("truck.info"), observer(move |info: &Value| sink.borrow_mut().push(info.clone())))
        .unwrap();

    proxied
        .set_value(&p("truck.info"), json!({"truckNo": "T", "trailerNo": "R"}).into())
        .unwrap();

    assert_eq!(
        *seen.borrow(),
        vec![
            json!({"truckNo": "T", "trailerNo": "AAA111"}),
            json!({"truckNo": "T", "trailerNo": "R"}),
        ]
    );
    subscription.unsubscribe().unwrap();
}

#[test]
fn unmapped_logical_path_fails() {
    let (_, proxied) = proxied_truck();
    assert_eq!(
        proxied.get_value(&p("truck.driver")),
        Err(StockError::PathNotMapped { path: p("truck.driver") })
    );
    assert_eq!(
        proxied.set_value(&p("truck.driver.name"), json!("x").into()),
        Err(StockError::PathNotMapped { path: p("truck.driver.name") })
    );
}

#[test]
fn maps_compare_by_content() {
    let a: ProxyMap = [(p("x"), p("a")), (p("y"), p("b"))].into_iter().collect();
    let b: ProxyMap = [(p("y"), p("b")), (p("x"), p("a"))].into_iter().collect();
    let c: ProxyMap = [(p("x"), p("a"))].into_iter().collect();
    assert_eq!(a, b);
    assert_ne!(a, c);
}
