mod compare;
mod run;
mod suite;
mod summary;


pub(crate) use compare::run_compare;
pub(crate) use run::run_single;
pub(crate) use suite::run_suite;
