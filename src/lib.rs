pub mod collision;
pub mod compute;
pub mod entities;
