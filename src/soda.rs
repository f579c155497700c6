//! Water-for-soda exchange against a theatre's daily soda cap.
use super::error::EngineError;
use super::gate::RandomSource;
use super::ledger::{self, LedgerStub};
use super::payload::SodaPayload;
use super::records::{SodaRecord, keys};
use super::registry;
use super::response::{Detail, Response};

/// Exchanges one water for one soda if the caller passes the admission draw.
///
/// The draw happens before any ledger read, so a rejected caller leaves no
/// trace in the read set.
pub fn exchange<S: LedgerStub + ?Sized>(
    stub: &mut S,
    random: &mut dyn RandomSource,
    payload: SodaPayload,
) -> Result<Response, EngineError> {
    if !random.next_bool() {
        tracing::info!(thid = %payload.thid, "soda exchange not eligible");
        return Err(EngineError::NotEligible(payload.inventoryid));
    }

    let theatre = registry::load_theatre(stub, &payload.thid)?;
    let key = keys::soda(&payload.thid, &payload.inventoryid);
    let prior = ledger::read::<SodaRecord, _>(stub, &key)?;
    let sold = prior.as_ref().map_or(0, |inventory| inventory.soda);

    let total = match sold.checked_add(1) {
        Some(total) if total <= theatre.maxsoda => total,
        _ => {
            tracing::error!(%key, sold, max = theatre.maxsoda, "enough soda not available");
            return Err(EngineError::CapacityExceeded {
                resource: "soda",
                data: key,
            });
        }
    };

    let now = stub.tx_timestamp();
    let cts = prior.map_or(now, |inventory| inventory.cts);
    let record = SodaRecord::new(payload.thid, payload.inventoryid, total, cts, now);
    ledger::write(stub, &key, &record)?;

    tracing::info!(%key, total, "soda exchanged");
    Ok(Response::with_detail(
        stub.tx_id(),
        "Soda exchange successfull",
        Detail::Soda(1),
    ))
}
