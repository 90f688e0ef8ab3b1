//! Currency swap widget logic

pub mod config;
pub mod form;
pub mod log;
pub mod rates;
pub mod record;
pub mod selector;
pub mod validation;

// Re-export main types for cleaner imports
pub use form::{FormController, FormState, Phase, Side, SubmitError};
pub use rates::RateMatrix;
pub use record::CurrencyRecord;
pub use selector::{BoundaryBus, ControlId, CurrencyOption, CurrencySelector, IconResolver};
pub use validation::AmountError;
