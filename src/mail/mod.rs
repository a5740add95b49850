pub mod decoders;
pub mod extract;
pub mod gmail;
pub mod message;
