//! End-to-end scenarios run against in-memory links.

#[cfg(test)]
mod discovery;
#[cfg(test)]
mod ota;
#[cfg(test)]
mod utils;
