// server/src/web/mod.rs
pub mod handlers;
pub mod routes;

#[cfg(test)]
pub(crate) mod test_support;
