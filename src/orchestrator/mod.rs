//! Run lifecycle orchestration.
//!
//! This module owns the single active run: starting it, cancelling it on reset or
//! restart, and reporting its outcome back to presentation layers.

mod controller;

pub(crate) use controller::RunController;
