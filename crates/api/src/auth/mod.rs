//! Access-token handling. Tokens are issued by the external auth service;
//! this server only validates them.

pub mod jwt;
