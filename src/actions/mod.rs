//! Action runners.
//!
//! Template actions (`copy`, `replace`, `migrate`) and schema actions
//! (`create`, `import`) are both processed strictly in file order, one at a
//! time. Sequential execution is part of the contract: it is what allows a
//! later action to reference content created by an earlier one, and it keeps
//! backend side effects (like collection item order) deterministic.

pub mod importers;
pub mod mutators;
pub mod schema;
pub mod template;
