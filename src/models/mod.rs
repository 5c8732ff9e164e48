pub mod item;
pub mod money;

pub use item::*;
pub use money::{money, parse_price, MAX_PRICE_CENTS};
