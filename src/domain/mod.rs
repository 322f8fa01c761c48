pub mod enhance;
pub mod health;
pub mod session;
