pub mod analysis_service;
pub mod indicators;
pub mod price_service;
pub mod series_cache;
pub mod signal_service;
