pub mod buyer;
pub mod diff;
pub mod enums;
pub mod history;
pub mod normalize;
