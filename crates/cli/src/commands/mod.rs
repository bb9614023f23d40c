pub(crate) mod catalog;
pub(crate) mod diagnose;
pub(crate) mod explain;
pub(crate) mod validate;
