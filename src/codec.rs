//! Bidirectional data exchange with the stored procedure endpoint.
//!
//! Outbound, [`encode`] turns a [`ParameterSet`](crate::models::ParameterSet)
//! into the delimited request string the endpoint binds parameters from.
//! Inbound, [`decode`] turns a multi-table dataset payload into a
//! [`StoredProcedureResult`], and [`decode_status`] reads the pipe-delimited
//! triad returned by simple write operations.
//!
//! # Conventions
//!
//! ```text
//! request   ApplicationCode=COMMON&Title=Q dp_Amp A
//! dataset   {"dataset": [[{"Field": "value", ...}, ...], ...]}
//! status    id_or_flag|code|message
//! ```
//!
//! Both response conventions can carry an in-band error. The dataset form
//! uses an `ErrorMessage` field on the first row of the first table; the
//! status form uses position 0. Either one surfaces as
//! [`ProcedureError::RemoteProcedure`](crate::error::ProcedureError).
//!
//! All functions here are pure and synchronous.

mod dataset;
mod encoder;
mod infer;
mod lookup;
mod payload;
mod status;

pub use dataset::{decode, decode_value, StoredProcedureResult, ERROR_FIELD};
pub use encoder::{encode, escape_value};
pub use infer::infer;
pub use lookup::as_key_value;
pub use payload::{RawField, RawNode, RawResponsePayload, RawRow, RawTable};
pub use status::{decode_status, new_id_failure, zero_flag_failure};
