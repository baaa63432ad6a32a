//! Computation over a built [crate::network::EvidenceGraph] and its
//! [crate::network::ParameterStore]. Nothing here mutates either.

pub mod probability;
pub mod truth_table;

pub use probability::{calc_prior, sigmoid};
pub use truth_table::{
    table_for_component, tables_by_component, ComponentReport, TableLimits, TableOutcome,
    TruthRow, TruthTable, MAX_TABLE_INPUTS,
};
