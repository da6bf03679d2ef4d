pub mod backend_client;
pub mod chart;
pub mod polling;
pub mod session;
pub mod upload;

#[cfg(test)]
pub(crate) mod testing;
