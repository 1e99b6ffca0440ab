pub mod period;

pub use period::PeriodAgent;
