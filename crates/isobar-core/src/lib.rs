//! # Isobar Core Library
//!
//! A library for locating the cell volume that reproduces a target pressure at a
//! given temperature, by repeatedly running VASP molecular dynamics at trial
//! volumes and bisecting on the averaged external pressure.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless parsers for the simulator's
//!   output artifacts (`OUTCAR`, `OSZICAR`), structure-file I/O (`POSCAR`), and the
//!   bounded artifact-polling primitive with an injectable sleep dependency.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer owns a single trial: input
//!   staging through the [`engine::simulator::Simulator`] collaborator, execution,
//!   output parsing, artifact archiving, and the append-only trial record.
//!
//! - **[`workflows`]: The Public API.** The highest-level, user-facing layer. It
//!   ties the `engine` and `core` together into the bisection search and returns an
//!   explicit [`workflows::search::SearchOutcome`] rather than leaking any
//!   intermediate state.

pub mod core;
pub mod engine;
pub mod workflows;
