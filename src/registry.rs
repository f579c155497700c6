//! Theatre and show registration.
use super::error::EngineError;
use super::ledger::{self, LedgerStub};
use super::payload::{ShowPayload, TheatrePayload};
use super::records::{Record, ShowRecord, TheatreRecord, keys};
use super::response::Response;

pub fn load_theatre<S: LedgerStub + ?Sized>(
    stub: &mut S,
    thid: &str,
) -> Result<TheatreRecord, EngineError> {
    ledger::read(stub, &keys::theatre(thid))?.ok_or_else(|| EngineError::NotFound {
        what: "Theatre details",
        data: thid.to_string(),
    })
}

pub fn load_show<S: LedgerStub + ?Sized>(
    stub: &mut S,
    thid: &str,
    screen: &str,
) -> Result<ShowRecord, EngineError> {
    let key = keys::show(thid, screen);
    ledger::read(stub, &key)?.ok_or(EngineError::NotFound {
        what: "Show details",
        data: key,
    })
}

/// Registers a theatre. Registering the same id twice is an error.
pub fn create_theatre<S: LedgerStub + ?Sized>(
    stub: &mut S,
    payload: TheatrePayload,
) -> Result<Response, EngineError> {
    let key = keys::theatre(&payload.thid);

    if stub.get_state(&key)?.is_some_and(|value| !value.is_empty()) {
        tracing::error!(thid = %payload.thid, "theatre details already added");
        return Err(EngineError::AlreadyExists(payload.thid));
    }

    let record = TheatreRecord::new(
        payload.thid,
        payload.sph,
        payload.maxsoda,
        stub.tx_timestamp(),
    );
    ledger::write(stub, &key, &record)?;

    tracing::info!(thid = %record.thid, screens = record.sph.len(), "theatre details added");
    Ok(Response::new(stub.tx_id(), "Add Theatre Details Success"))
}

/// Lists a movie on a screen, replacing any existing listing for that screen.
///
/// A replacement keeps the original `cts`. Only a first listing checks the
/// screen against the theatre's capacity map.
pub fn upsert_show<S: LedgerStub + ?Sized>(
    stub: &mut S,
    payload: ShowPayload,
) -> Result<Response, EngineError> {
    let theatre = load_theatre(stub, &payload.thid)?;
    let key = keys::show(&payload.thid, &payload.screen);
    let now = stub.tx_timestamp();

    let cts = match ledger::read::<ShowRecord, _>(stub, &key)? {
        Some(existing) => {
            tracing::info!(thid = %payload.thid, screen = %payload.screen, "replacing show details");
            existing.cts
        }
        None => {
            if !theatre.has_screen(&payload.screen) {
                tracing::error!(thid = %payload.thid, screen = %payload.screen, "unknown screen");
                return Err(EngineError::InvalidScreen(payload.screen));
            }
            now
        }
    };

    let record = ShowRecord::new(
        payload.thid,
        payload.screen,
        payload.moviename,
        payload.showcode,
        cts,
        now,
    );
    ledger::write(stub, &key, &record)?;

    tracing::info!(thid = %record.thid, screen = %record.screen, movie = %record.moviename, "show details added");
    Ok(Response::new(stub.tx_id(), "Add Show Detail Success"))
}

/// Lazily decodes the show listings a selector matches.
///
/// Empty values and records of other kinds are skipped. A cursor that yields
/// no show at all is reported as `NotFound`.
pub fn query_shows<'a, S: LedgerStub + ?Sized>(
    stub: &'a S,
    selector: &str,
) -> Result<impl Iterator<Item = Result<ShowRecord, EngineError>> + use<'a, S>, EngineError> {
    let cursor = stub
        .get_query_result(selector)
        .map_err(|source| EngineError::QueryFailed {
            selector: selector.to_string(),
            source,
        })?;

    let mut shows = cursor
        .filter_map(|hit| match hit {
            Err(e) => Some(Err(EngineError::from(e))),
            Ok(hit) if hit.value.is_empty() => None,
            Ok(hit) => ShowRecord::decode_if_kind(&hit.key, &hit.value)
                .map_err(EngineError::from)
                .transpose(),
        })
        .peekable();

    if shows.peek().is_none() {
        return Err(EngineError::NotFound {
            what: "Show details",
            data: selector.to_string(),
        });
    }
    Ok(shows)
}
