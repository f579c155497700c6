//! Ticket sales against a screen's seat capacity.
//!
//! Per (theatre, screen, showcode) key a show moves from unsold to partially
//! sold to sold out; there is no way back.
use super::error::EngineError;
use super::ledger::{self, LedgerStub};
use super::payload::SellPayload;
use super::records::{TicketRecord, keys};
use super::registry;
use super::response::{Detail, Response};

/// Sells `ticketsold` seats, bundling one popcorn and one water per seat.
///
/// The capacity check is cumulative over every earlier sale for the key.
pub fn sell<S: LedgerStub + ?Sized>(
    stub: &mut S,
    payload: SellPayload,
) -> Result<Response, EngineError> {
    let show = registry::load_show(stub, &payload.thid, &payload.screen)?;

    if payload.ticketsold <= 0 {
        tracing::error!(requested = payload.ticketsold, "non-positive ticket count");
        return Err(EngineError::InvalidQuantity(payload.ticketsold));
    }

    let theatre = registry::load_theatre(stub, &payload.thid)?;
    let capacity = theatre
        .capacity(&payload.screen)
        .ok_or_else(|| EngineError::InvalidScreen(payload.screen.clone()))?;

    let key = keys::ticket(&payload.thid, &payload.screen, &payload.showcode);
    let prior = ledger::read::<TicketRecord, _>(stub, &key)?;
    let sold = prior.as_ref().map_or(0, |ticket| ticket.ticketsold);

    let total = i64::from(sold)
        .checked_add(payload.ticketsold)
        .and_then(|total| u8::try_from(total).ok());
    let total = match total {
        Some(total) if total <= capacity => total,
        _ => {
            tracing::error!(%key, sold, requested = payload.ticketsold, capacity, "enough tickets not available");
            return Err(EngineError::CapacityExceeded {
                resource: "tickets",
                data: key,
            });
        }
    };

    let now = stub.tx_timestamp();
    let cts = prior.map_or(now, |ticket| ticket.cts);
    let record = TicketRecord::sold(
        payload.thid,
        payload.screen,
        payload.showcode,
        show.moviename,
        total,
        cts,
        now,
    );
    ledger::write(stub, &key, &record)?;

    tracing::info!(%key, total, capacity, "tickets sold");
    Ok(Response::with_detail(
        stub.tx_id(),
        "Sell ticket successfull",
        Detail::Tickets(total),
    ))
}
