// Authentication: credentials, session ledger, bearer-token gate

pub mod audit_logger;
pub mod auth_middleware;
pub mod credentials;
pub mod token_ledger;
