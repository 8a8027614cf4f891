//! Speech-corpus importer.
//!
//! Downloads a corpus archive, converts every sample to 16 kHz / 16-bit /
//! mono WAV, drops samples whose duration does not fit their transcript, and
//! writes seeded `train_full` / `train` / `dev` / `test` manifests.
//!
//! | module       | role                                                  |
//! |--------------|-------------------------------------------------------|
//! | [`config`]   | TOML settings and default paths                       |
//! | [`fetch`]    | skip-if-present download and ZIP extraction           |
//! | [`corpus`]   | corpus index and the pluggable `CorpusSource`         |
//! | [`audio`]    | canonical format, toolkit, idempotent normalizer      |
//! | [`pipeline`] | per-sample evaluation and the parallel driver         |
//! | [`manifest`] | rows, deterministic split, CSV output                 |
//! | [`import`]   | end-to-end orchestration and the run report           |

pub mod audio;
pub mod config;
pub mod corpus;
pub mod fetch;
pub mod import;
pub mod manifest;
pub mod pipeline;
