//! The uniform variable handle and its supporting pieces.

mod any_variable;
mod mapper;
mod var_id;
mod var_ref;

pub use any_variable::AnyVariable;
pub use mapper::Mapper;
pub use var_id::VarId;
pub use var_ref::MappedVar;
pub use var_ref::VarRef;
