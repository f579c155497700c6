//! Routes an operation name and its JSON argument to a handler.
use super::config::{ConfigError, EngineConfig};
use super::error::EngineError;
use super::gate::{RandomSource, ThreadRandom};
use super::ledger::LedgerStub;
use super::payload::{self, SellPayload, ShowPayload, SodaPayload, TheatrePayload};
use super::registry;
use super::response::{Detail, PeerResponse, Response};
use super::soda;
use super::store::SledStore;
use super::tickets;
use std::str::FromStr;

/// Operation names accepted by [`Engine::invoke`].
pub const OPERATIONS: [&str; 5] = ["asd", "athd", "exs", "gss", "sell"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AddShow,
    AddTheatre,
    ExchangeSoda,
    GetShows,
    Sell,
}

impl FromStr for Operation {
    type Err = EngineError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "asd" => Ok(Operation::AddShow),
            "athd" => Ok(Operation::AddTheatre),
            "exs" => Ok(Operation::ExchangeSoda),
            "gss" => Ok(Operation::GetShows),
            "sell" => Ok(Operation::Sell),
            other => Err(EngineError::UnknownOperation(other.to_string())),
        }
    }
}

pub struct Engine {
    config: EngineConfig,
    random: Box<dyn RandomSource>,
}

impl Engine {
    /// Validates `config` and draws soda admissions from the thread RNG.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let random = ThreadRandom::new(&config.soda)?;
        Ok(Self::with_random(config, random))
    }

    /// Engine whose soda admission gate draws from `random`.
    pub fn with_random(config: EngineConfig, random: impl RandomSource + 'static) -> Self {
        Self {
            config,
            random: Box::new(random),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Instantiate hook. Touches no state.
    pub fn init(&self) -> PeerResponse {
        tracing::info!("theatre inventory engine initialised");
        PeerResponse {
            status: PeerResponse::OK,
            message: String::new(),
            payload: Vec::new(),
        }
    }

    /// Runs one operation against the ledger view in `stub`.
    pub fn invoke<S: LedgerStub + ?Sized>(
        &mut self,
        stub: &mut S,
        function: &str,
        args: &[String],
    ) -> Result<Response, EngineError> {
        tracing::info!(function, trxnid = stub.tx_id(), "invoked");

        let operation = function.parse::<Operation>().inspect_err(|_| {
            tracing::error!(function, "unknown function invoked");
        })?;

        let [arg] = args else {
            tracing::error!(function, count = args.len(), "incorrect number of arguments");
            return Err(EngineError::InvalidArgumentCount(args.len()));
        };

        let case = self.config.keys.case;
        match operation {
            Operation::AddTheatre => {
                registry::create_theatre(stub, payload::decode::<TheatrePayload>(arg, case)?)
            }
            Operation::AddShow => {
                registry::upsert_show(stub, payload::decode::<ShowPayload>(arg, case)?)
            }
            Operation::GetShows => {
                serde_json::from_str::<serde_json::Value>(arg).map_err(|e| {
                    EngineError::InvalidPayload {
                        data: arg.clone(),
                        reason: e.to_string(),
                    }
                })?;
                let records = registry::query_shows(&*stub, arg)?.collect::<Result<Vec<_>, _>>()?;
                Ok(Response::with_detail(
                    stub.tx_id(),
                    "Get Show Details Success",
                    Detail::Shows(records),
                ))
            }
            Operation::Sell => tickets::sell(stub, payload::decode::<SellPayload>(arg, case)?),
            Operation::ExchangeSoda => soda::exchange(
                stub,
                self.random.as_mut(),
                payload::decode::<SodaPayload>(arg, case)?,
            ),
        }
    }

    /// Runs one operation in its own sled transaction, committing only on success.
    pub fn submit(
        &mut self,
        store: &SledStore,
        function: &str,
        args: &[String],
    ) -> Result<Response, EngineError> {
        let mut txn = store.begin();
        let response = self.invoke(&mut txn, function, args)?;
        txn.commit()?;
        Ok(response)
    }

    /// Like [`Engine::submit`] but answers with a peer response.
    pub fn handle(&mut self, store: &SledStore, function: &str, args: &[String]) -> PeerResponse {
        PeerResponse::from(&self.submit(store, function, args))
    }
}
