pub mod coingecko;
pub mod coinmarketcap;
pub mod yahoo;
