//! Integration tests for Kibitz
//!
//! `agent_tests` drives the scheduler with scripted in-memory gateways;
//! `gateway_tests` runs the HTTP gateways against wiremock servers.

mod config_tests;
mod gateway_tests;
