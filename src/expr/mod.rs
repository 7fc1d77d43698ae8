pub mod cond;
pub mod order;
mod template;

pub use cond::{Condition, Conditions, Conjunction, Where};
pub use order::{IntoOrder, Order, OrderExpr, Ordering};
