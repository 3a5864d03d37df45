//! Types shared between the admin frontend and the services it talks to.

pub mod domain;
pub mod shared;
