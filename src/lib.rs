pub mod clauses;
pub mod error;
pub mod expression;
pub mod naming;
pub mod tseitin;

#[cfg(feature = "graphviz")]
pub mod render_impls;
pub mod truth_table;

pub use clauses::{extract, Clause, ClauseList};
pub use error::{Error, Result};
pub use expression::{Literal, Node};
pub use naming::NamingAuthority;
pub use tseitin::{to_cnf, Cnf, Encoding, TseitinTransform};
