//! Shared fixtures for muster-store unit tests.
