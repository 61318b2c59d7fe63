pub mod decimal;
pub mod matcher;
pub mod period;
pub mod purpose;
pub mod status;

pub use decimal::{divide_half_up, round_half_up, DecimalAccumulator, Fraction, QUANTITY_SCALE};
pub use matcher::{match_volumes, VolumeMatcher};
pub use period::{expand_window, line_overlap, share_line, LineOverlap};
pub use purpose::{purpose_covers, return_covers};
pub use status::{classify, relevant_returns, ClassificationSummary, Completeness};
