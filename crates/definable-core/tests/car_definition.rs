//! End-to-end exercise of the definition machinery through a small
//! consumer type, plus the bundled argument-assignment client.

use std::sync::{Arc, OnceLock};

use parking_lot::{Mutex, RwLock};

use definable_core::arguments::{assign_argument, Argument, ArgumentOptions, ArgumentSet};
use definable_core::{
    Definable, DefinableExt, DefineBase, DefineError, DefineResult, DefinitionScope,
    TypeDictionary,
};

struct Door;

#[derive(Default)]
struct Car {
    base: DefineBase<Car>,
    make: RwLock<String>,
    model: RwLock<String>,
    doors: Mutex<Vec<Door>>,
}

impl Car {
    fn make(&self) -> DefineResult<String> {
        self.ensure_defined()?;
        Ok(self.make.read().clone())
    }

    fn model(&self) -> DefineResult<String> {
        self.ensure_defined()?;
        Ok(self.model.read().clone())
    }

    fn door_count(&self) -> DefineResult<usize> {
        self.ensure_defined()?;
        Ok(self.doors.lock().len())
    }
}

static CAR_DICTIONARY: OnceLock<Arc<TypeDictionary<Car>>> = OnceLock::new();

impl Definable for Car {
    fn define_base(&self) -> &DefineBase<Self> {
        &self.base
    }

    fn dictionary() -> Arc<TypeDictionary<Self>> {
        CAR_DICTIONARY
            .get_or_init(|| {
                let dict = TypeDictionary::new("Car");
                dict.register_attribute("make", |car: &Car, v: String| *car.make.write() = v);
                dict.register_attribute("model", |car: &Car, v: String| *car.model.write() = v);
                dict.register_with("doors", |car: &Car, value| {
                    let count = value.downcast_for::<usize>("doors")?;
                    let mut doors = car.doors.lock();
                    for _ in 0..count {
                        doors.push(Door);
                    }
                    Ok(())
                });
                // A key contributed from outside the type, landing in metadata.
                dict.register_metadata_key("all_wheel_drive");
                Arc::new(dict)
            })
            .clone()
    }
}

#[test]
fn car_definition_resolves_on_first_read() {
    let car = Car::define()
        .set("make", "Subaru".to_string())
        .block(|d: &DefinitionScope<Car>| {
            d.set("model", "Baja".to_string())?;
            d.set("doors", 4usize)
        })
        .build()
        .unwrap();

    assert!(car.define_base().is_pending());

    assert_eq!(car.make().unwrap(), "Subaru");
    assert!(car.define_base().is_resolved());
    assert_eq!(car.model().unwrap(), "Baja");
    assert_eq!(car.door_count().unwrap(), 4);
}

#[test]
fn metadata_key_round_trips_through_definition() {
    let car = Car::define()
        .set("make", "Subaru".to_string())
        .set("all_wheel_drive", true)
        .build()
        .unwrap();

    let metadata = car.metadata().unwrap();
    assert_eq!(metadata.get::<bool>("all_wheel_drive"), Some(&true));
    // The metadata key did not touch the car's real fields.
    assert_eq!(car.model().unwrap(), "");
}

#[test]
fn wrong_value_type_reports_the_key() {
    let car = Car::define()
        .block(|d: &DefinitionScope<Car>| d.set("doors", "four".to_string()))
        .build()
        .unwrap();

    let err = car.door_count().unwrap_err();
    assert!(matches!(
        err,
        DefineError::ValueTypeMismatch { ref key, .. } if key == "doors"
    ));
    // Failure still resolves; subsequent reads see the partial state.
    assert_eq!(car.door_count().unwrap(), 0);
}

#[test]
fn ancestor_dictionary_keys_are_usable_through_the_chain() {
    #[derive(Default)]
    struct Truck {
        base: DefineBase<Truck>,
        make: RwLock<String>,
        bed_length: RwLock<u32>,
    }

    static TRUCK_DICTIONARY: OnceLock<Arc<TypeDictionary<Truck>>> = OnceLock::new();

    impl Definable for Truck {
        fn define_base(&self) -> &DefineBase<Self> {
            &self.base
        }

        fn dictionary() -> Arc<TypeDictionary<Self>> {
            TRUCK_DICTIONARY
                .get_or_init(|| {
                    let vehicle = Arc::new(TypeDictionary::<Truck>::new("Vehicle"));
                    vehicle.register_attribute("make", |t: &Truck, v: String| {
                        *t.make.write() = v
                    });

                    let truck = TypeDictionary::with_parent("Truck", vehicle);
                    truck.register_attribute("bed_length", |t: &Truck, v: u32| {
                        *t.bed_length.write() = v
                    });
                    Arc::new(truck)
                })
                .clone()
        }
    }

    let truck = Truck::define()
        .set("make", "Ford".to_string())
        .set("bed_length", 96u32)
        .build()
        .unwrap();

    truck.ensure_defined().unwrap();
    assert_eq!(*truck.make.read(), "Ford");
    assert_eq!(*truck.bed_length.read(), 96);
}

#[test]
fn argument_assignment_end_to_end() {
    let arguments = ArgumentSet::new();

    assign_argument(
        &arguments,
        "limit",
        ArgumentOptions {
            value_type: Some("Int".to_string()),
            default_value: Some(Arc::new(25i64)),
            ..Default::default()
        },
    )
    .unwrap();

    assign_argument(
        &arguments,
        "query",
        ArgumentOptions {
            block: Some(Box::new(|d: &DefinitionScope<Argument>| {
                d.set("value_type", "String".to_string())?;
                d.set("description", "search terms".to_string())
            })),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(arguments.names(), vec!["limit", "query"]);

    let limit = arguments.get("limit").unwrap();
    assert_eq!(limit.default_value::<i64>().unwrap(), Some(25));

    let query = arguments.get("query").unwrap();
    assert!(query.define_base().is_pending());
    assert_eq!(query.value_type().unwrap().as_deref(), Some("String"));
    assert_eq!(query.description().unwrap().as_deref(), Some("search terms"));
    assert!(!query.has_default().unwrap());
}
