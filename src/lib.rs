//! Payroll Period Run Engine
//!
//! This crate runs payroll for a closed date window: it aggregates each
//! employee's attendance, overtime and reimbursements, computes a payslip
//! per employee, persists the payslips and locks the period, all as one
//! atomic step. Storage is reached through the ports in [`storage`], with
//! in-memory and SQLite adapters provided.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod storage;
