//! # Integration Flows
//!
//! - **submission_flows**: subscription and polling submissions end to end
//! - **pagination_flows**: paging, fallback, and full listings

pub mod pagination_flows;
pub mod submission_flows;
