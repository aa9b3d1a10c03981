pub mod bybit;
pub mod messages;
pub mod traits;
