/// Collector module
///
/// This module groups all logic responsible for:
/// - Owning each coin's RPC transport and switches (`coin`)
/// - Building the immutable set of coins at startup (`registry`)
/// - Fanning a scrape out across coins and joining it (`runner`)
///
/// Design notes:
/// - Payload-to-sample mapping MUST NOT live here (see `translate`)
/// - Nothing here keeps state between scrapes
pub mod coin;
pub mod registry;
pub mod runner;

#[cfg(test)]
pub mod testutil;
