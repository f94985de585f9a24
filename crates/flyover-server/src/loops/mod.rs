//! Background loops for the flyover server.

pub mod cleanup_loop;
