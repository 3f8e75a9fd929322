pub mod attachment;
pub mod guards;
