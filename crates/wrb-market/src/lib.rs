//! Market data adapters: CoinGecko spot prices and Etherscan balances.
//!
//! Both implement the `wrb-core` lookup ports over plain HTTP GET requests.
//! No retries and no caching; every failure maps to `Error::LookupFailed`.

pub mod coingecko;
pub mod etherscan;

pub use coingecko::CoinGeckoClient;
pub use etherscan::EtherscanClient;
