//! Parent links, scopes, computed properties, and the virtual binding.

use propkit::{
    enumerate_display, get, serialize_entries, set, Describe, Field, Flags, Reflect, Table,
    TableBuilder, TableCell, Value,
};

#[derive(Default)]
struct Device {
    id: i32,
    alias: String,
}

impl Describe for Device {
    fn table() -> &'static Table {
        static TABLE: TableCell = TableCell::new();
        TABLE.get_or_build(|| {
            TableBuilder::<Device>::named("Device")
                .field(Field::value("Id", |d: &Device| &d.id, |d: &mut Device| &mut d.id))
                .field(
                    Field::value(
                        "Alias",
                        |d: &Device| &d.alias,
                        |d: &mut Device| &mut d.alias,
                    )
                    .rename("DisplayName"),
                )
                .build()
        })
    }
}

/// Composes a `Device` the way a derived class would: the parent's table
/// becomes a sub-scope named after the parent.
#[derive(Default)]
struct Amplifier {
    device: Device,
    watts: i32,
    bands: [f32; 3],
}

impl Describe for Amplifier {
    fn table() -> &'static Table {
        static TABLE: TableCell = TableCell::new();
        TABLE.get_or_build(|| {
            TableBuilder::<Amplifier>::named("Amplifier")
                .field(Field::parent(
                    |a: &Amplifier| &a.device,
                    |a: &mut Amplifier| &mut a.device,
                ))
                .field(
                    Field::computed(
                        "Watts",
                        |a: &Amplifier| a.watts,
                        |a: &mut Amplifier, v| {
                            if v < 0 {
                                return false;
                            }
                            a.watts = v;
                            true
                        },
                    )
                    .meta("unit", "W"),
                )
                .field(Field::computed_list(
                    "Bands",
                    |a: &Amplifier| a.bands.len() as u64,
                    |a: &Amplifier, i| a.bands.get(i as usize).copied(),
                    |a: &mut Amplifier, i, v| match a.bands.get_mut(i as usize) {
                        Some(slot) => {
                            *slot = v;
                            true
                        }
                        None => false,
                    },
                ))
                .field(Field::scope("Safety", |scope| {
                    scope.field(
                        Field::computed(
                            "Fused",
                            |a: &Amplifier| a.watts > 100,
                            |_a: &mut Amplifier, _v| false,
                        )
                        .flags(Flags::READ_ONLY),
                    )
                }))
                .build()
        })
    }
}

impl Reflect for Amplifier {
    fn property_table(&self) -> &'static Table {
        Self::table()
    }
}

impl Reflect for Device {
    fn property_table(&self) -> &'static Table {
        Self::table()
    }
}

/// Holds any `Reflect` implementor - the virtual binding.
#[derive(Default)]
struct Slot {
    payload: Option<Box<dyn Reflect>>,
}

impl Describe for Slot {
    fn table() -> &'static Table {
        static TABLE: TableCell = TableCell::new();
        TABLE.get_or_build(|| {
            TableBuilder::<Slot>::named("Slot")
                .field(Field::owned_dyn(
                    "Payload",
                    |s: &Slot| s.payload.as_deref(),
                    |s: &mut Slot| s.payload.as_deref_mut(),
                ))
                .build()
        })
    }
}

#[test]
fn parent_link_paths_go_through_the_parent_name() {
    let mut amp = Amplifier::default();
    let table = Amplifier::table();

    assert!(set(table, &mut amp, "Amplifier/Device/Id", &Value::Int(12)));
    assert_eq!(amp.device.id, 12);
    assert_eq!(
        get(table, &amp, "Amplifier/Device/Id"),
        Some(Value::Int(12))
    );
}

#[test]
fn renamed_fields_resolve_under_the_new_name_only() {
    let mut amp = Amplifier::default();
    let table = Amplifier::table();

    assert!(set(
        table,
        &mut amp,
        "Amplifier/Device/DisplayName",
        &Value::from("left stack"),
    ));
    assert_eq!(amp.device.alias, "left stack");
    assert_eq!(get(table, &amp, "Amplifier/Device/Alias"), None);
}

#[test]
fn computed_setter_can_reject() {
    let mut amp = Amplifier::default();
    let table = Amplifier::table();

    assert!(!set(table, &mut amp, "Amplifier/Watts", &Value::Int(-3)));
    assert!(set(table, &mut amp, "Amplifier/Watts", &Value::Int(80)));
    assert_eq!(get(table, &amp, "Amplifier/Watts"), Some(Value::Int(80)));
}

#[test]
fn computed_list_is_addressable_but_fixed_size() {
    let mut amp = Amplifier::default();
    let table = Amplifier::table();

    assert_eq!(get(table, &amp, "Amplifier/Bands[]"), Some(Value::Int(3)));
    assert!(set(table, &mut amp, "Amplifier/Bands[1]", &Value::Float(0.7)));
    assert_eq!(amp.bands[1], 0.7);
    assert!(!set(table, &mut amp, "Amplifier/Bands[9]", &Value::Float(0.7)));

    // WriteCount is a no-op for the fixed list.
    assert!(set(table, &mut amp, "Amplifier/Bands[]", &Value::Int(9)));
    assert_eq!(get(table, &amp, "Amplifier/Bands[]"), Some(Value::Int(3)));
}

#[test]
fn scope_fields_address_the_same_instance() {
    let mut amp = Amplifier::default();
    amp.watts = 150;
    let table = Amplifier::table();

    assert_eq!(
        get(table, &amp, "Amplifier/Safety/Fused"),
        Some(Value::Bool(true))
    );
    assert!(!set(
        table,
        &mut amp,
        "Amplifier/Safety/Fused",
        &Value::Bool(false),
    ));
}

#[test]
fn display_walk_headers_cover_parent_and_scope() {
    let amp = Amplifier::default();
    let mut scopes = Vec::new();
    enumerate_display(Amplifier::table(), &amp, |visit| {
        if visit.flags.contains(Flags::SCOPE) {
            scopes.push(visit.path.to_string());
        }
    });
    assert!(scopes.contains(&"Amplifier/Device".to_string()));
    assert!(scopes.contains(&"Amplifier/Safety".to_string()));
    assert!(scopes.contains(&"Amplifier/Bands[]".to_string()));
}

#[test]
fn help_and_meta_surface_through_the_walk() {
    let amp = Amplifier::default();
    let mut unit = None;
    enumerate_display(Amplifier::table(), &amp, |visit| {
        if visit.path == "Amplifier/Watts" {
            let user = visit.table.user(visit.entry_index);
            unit = user.meta().get("unit").cloned();
        }
    });
    assert_eq!(unit.as_deref(), Some("W"));
}

#[test]
fn virtual_binding_resolves_through_the_instance() {
    let mut slot = Slot::default();
    let table = Slot::table();

    // Empty slot: the subtree is silently empty.
    assert_eq!(serialize_entries(table, &slot).len(), 0);
    assert_eq!(get(table, &slot, "Slot/Payload/Id"), None);

    slot.payload = Some(Box::new(Device {
        id: 4,
        alias: "probe".to_string(),
    }));
    assert_eq!(get(table, &slot, "Slot/Payload/Id"), Some(Value::Int(4)));
    assert!(set(table, &mut slot, "Slot/Payload/Id", &Value::Int(5)));

    // Swap the payload type: the same field now exposes a different schema.
    slot.payload = Some(Box::new(Amplifier::default()));
    assert_eq!(get(table, &slot, "Slot/Payload/Id"), None);
    assert_eq!(
        get(table, &slot, "Slot/Payload/Watts"),
        Some(Value::Int(0))
    );
}
