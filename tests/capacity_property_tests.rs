//! Property-based tests for the capacity invariants
//!
//! Ticket and soda counters are cumulative per key. Whatever sequence of
//! requests arrives, the committed counter must never pass the theatre's
//! configured capacity, and a rejected request must leave it untouched.

use proptest::prelude::*;
use theatre_inventory::{
    Engine, EngineConfig, EngineError, SledStore,
    gate::ScriptedRandom,
    ledger,
    records::{ShowRecord, SodaRecord, TicketRecord},
    response::Detail,
};

// PROPERTY TEST STRATEGIES

/// Screen capacities across the full u8 range
fn capacity_strategy() -> impl Strategy<Value = u8> {
    1u8..=255
}

/// Sale requests, including non-positive and oversized ones
fn sales_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(-3i64..=120, 1..25)
}

fn args(raw: String) -> Vec<String> {
    vec![raw]
}

fn theatre_with(store: &SledStore, engine: &mut Engine, seats: u8, maxsoda: u8) {
    let theatre = format!(r#"{{"thid":"T1","maxsoda":{maxsoda},"sph":{{"SC1":{seats}}}}}"#);
    engine.submit(store, "athd", &args(theatre)).unwrap();
    let show =
        r#"{"moviename":"Lucy","screen":"SC1","thid":"T1","showcode":["1","2","3","4"]}"#;
    engine.submit(store, "asd", &args(show.to_string())).unwrap();
}

fn committed<R: theatre_inventory::records::Record>(store: &SledStore, key: &str) -> Option<R> {
    let mut txn = store.begin();
    ledger::read(&mut txn, key).unwrap()
}

// PROPERTY TESTS
proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: the accepted sales for one show slot never add up past its capacity
    ///
    /// A model total is tracked alongside the engine. Each request is accepted
    /// exactly when the model says it fits, and the stored counters always
    /// equal the model with popcorn and water following tickets.
    #[test]
    fn prop_sales_never_exceed_capacity(
        capacity in capacity_strategy(),
        sales in sales_strategy()
    ) {
        let store = SledStore::temporary().unwrap();
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        theatre_with(&store, &mut engine, capacity, 0);

        let mut model: i64 = 0;
        for count in sales {
            let raw = format!(r#"{{"thid":"T1","screen":"SC1","showcode":"3","ticketsold":{count}}}"#);
            let result = engine.submit(&store, "sell", &args(raw));

            if count <= 0 {
                prop_assert!(matches!(result, Err(EngineError::InvalidQuantity(_))));
            } else if model + count > i64::from(capacity) {
                prop_assert!(matches!(result, Err(EngineError::CapacityExceeded { .. })), "expected CapacityExceeded");
            } else {
                model += count;
                let response = result.unwrap();
                prop_assert_eq!(response.detail, Detail::Tickets(model as u8));
            }

            let stored = committed::<TicketRecord>(&store, "T1SC13");
            let total = stored.as_ref().map_or(0, |t| i64::from(t.ticketsold));
            prop_assert_eq!(total, model);
            prop_assert!(total <= i64::from(capacity));
            if let Some(ticket) = stored {
                prop_assert_eq!(ticket.pcsold, ticket.ticketsold);
                prop_assert_eq!(ticket.watersold, ticket.ticketsold);
            }
        }
    }

    /// Property: the soda counter never passes the daily cap, whatever the gate decides
    #[test]
    fn prop_soda_never_exceeds_daily_cap(
        maxsoda in 0u8..=20,
        draws in prop::collection::vec(any::<bool>(), 1..40)
    ) {
        let store = SledStore::temporary().unwrap();
        let mut engine = Engine::with_random(EngineConfig::default(), ScriptedRandom::new(draws.clone()));
        theatre_with(&store, &mut engine, 10, maxsoda);

        let mut model: u8 = 0;
        for admitted in draws {
            let raw = r#"{"thid":"T1","inventoryid":"ES13"}"#.to_string();
            let result = engine.submit(&store, "exs", &args(raw));

            if !admitted {
                prop_assert!(matches!(result, Err(EngineError::NotEligible(_))));
            } else if model == maxsoda {
                prop_assert!(matches!(result, Err(EngineError::CapacityExceeded { .. })), "expected CapacityExceeded");
            } else {
                model += 1;
                prop_assert_eq!(result.unwrap().detail, Detail::Soda(1));
            }

            let stored = committed::<SodaRecord>(&store, "T1ES13").map_or(0, |s| s.soda);
            prop_assert_eq!(stored, model);
            prop_assert!(stored <= maxsoda);
        }
    }

    /// Property: re-listing a screen any number of times leaves one record with the first cts
    #[test]
    fn prop_show_relisting_replaces(
        movies in prop::collection::vec("[A-Za-z]{1,12}", 1..6)
    ) {
        let store = SledStore::temporary().unwrap();
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        theatre_with(&store, &mut engine, 50, 0);
        let first = committed::<ShowRecord>(&store, "T1SC1").unwrap();

        for movie in &movies {
            let raw = format!(r#"{{"moviename":"{movie}","screen":"SC1","thid":"T1","showcode":["1","2","3","4"]}}"#);
            prop_assert!(engine.submit(&store, "asd", &args(raw)).is_ok());
        }

        let last = committed::<ShowRecord>(&store, "T1SC1").unwrap();
        prop_assert_eq!(&last.moviename, movies.last().unwrap());
        prop_assert_eq!(last.cts, first.cts);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: registering the same theatre id twice always fails
    #[test]
    fn prop_duplicate_theatre_always_rejected(
        thid in "[A-Za-z0-9]{1,16}",
        seats in capacity_strategy()
    ) {
        let store = SledStore::temporary().unwrap();
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        let raw = format!(r#"{{"thid":"{thid}","maxsoda":3,"sph":{{"SC1":{seats}}}}}"#);

        prop_assert!(engine.submit(&store, "athd", &args(raw.clone())).is_ok());
        prop_assert!(matches!(
            engine.submit(&store, "athd", &args(raw)),
            Err(EngineError::AlreadyExists(_))
        ));
    }
}
