//! # CAPI Installer Test Harness
//!
//! Shared configuration and helpers for the managed OpenShift deployment test
//! suite built on Cluster API.
//!
//! ## Overview
//!
//! The test suite validates that a management cluster (Kind or an external
//! MCE-managed cluster) can deploy a managed OpenShift workload cluster
//! through Cluster API providers:
//!
//! - **ARO HCP** on Azure via CAPZ and Azure Service Operator
//! - **ROSA HCP** on AWS via CAPA
//!
//! This crate provides the pieces every test phase shares:
//!
//! 1. **Configuration** - [`config::HarnessConfig`] resolves environment
//!    variables, the deployment-state file of a previous run, and compiled-in
//!    defaults into one immutable process-wide configuration
//! 2. **Provider model** - [`provider::InfraProvider`] describes each
//!    provider's controllers, webhooks, credential secrets, charts, and
//!    required tooling
//! 3. **Manifest parsing** - [`manifest`] reads authoritative resource names
//!    back from the generated `aro.yaml` and kubeconfig files
//! 4. **Cleanup** - [`cleanup`] finds and deletes leftover Azure resources
//!    from failed runs (also shipped as the `cleanup-azure-resources` binary)
//!
//! Test phases run as separate processes driven by make targets, so anything
//! that must be stable across phases (repository checkout location, workload
//! cluster namespace) is resolved deterministically or persisted to disk.

pub mod cleanup;
pub mod config;
pub mod constants;
pub mod manifest;
pub mod provider;

pub use config::{HarnessConfig, ValueSource};
pub use provider::{InfraProvider, ProviderKind};
