pub mod aggregate;
pub mod labor;

pub use aggregate::{as_ds_step, AggregateOutcome};
pub use labor::{rates_at, LaborRates};
