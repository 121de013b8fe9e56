// External infrastructure: Postgres document store

pub mod pg_store;
