pub mod default;
pub mod encode;
pub mod model;
