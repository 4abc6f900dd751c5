//! Side-effecting steps: resolving and staging products, building artifacts,
//! and running a whole order.

mod fulfill;
mod package;
mod resolve;

pub use fulfill::OrderFulfillment;
pub use package::{build_artifact, deliver_plan};
pub use resolve::{ResourceResolver, stage};
