pub mod csv_provider;
pub mod mock;
pub mod price_provider;
pub mod yahoofinance;
