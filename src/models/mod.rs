pub mod charge;
pub mod period;
pub mod report;
pub mod returns;

pub use charge::{ChargeElement, ChargeVersion, Loss, Purpose, Season};
pub use period::{AbstractionPeriod, DateRange};
pub use report::{BatchError, ElementError, MatchReport, MatchResult};
pub use returns::{Frequency, QuantityUnit, Return, ReturnLine, ReturnStatus};
