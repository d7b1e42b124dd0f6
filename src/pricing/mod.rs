//! Pricing engine for ship maintenance work.
//!
//! Paint/cleaning items are priced from the catalog through an ordered ratio
//! chain; pipe work is priced from the pipe table with its own cost model.
//! Everything here is a pure function of its inputs.

pub mod breakdown;
pub mod calculators;
pub mod engine;
pub mod modifiers;
pub mod pipes;
pub mod requests;
pub mod responses;
pub mod services;

// Re-export commonly used items
pub use breakdown::{pipe_breakdown, work_breakdown};
pub use calculators::{format_comma, round_area, round_money};
pub use engine::{apply_ratios, price_line};
pub use pipes::price_pipe;
pub use requests::{PaintingModifiers, PipeSelection, SiteCondition, WorkSelection};
pub use responses::{
    AppliedRatio, BreakdownMultiplier, LineSource, PipeBreakdownDetail, PriceBreakdown,
    PricedRow, WorkGroup,
};
pub use services::{price_marks, price_work};
