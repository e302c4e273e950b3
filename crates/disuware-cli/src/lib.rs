//! # disuware-cli
//!
//! The command surface of disuware:
//!
//! - `disuware run <configFile>` discovers, links and starts every module
//! - `disuware list [--linked] [--dependencies] <configFile>` prints the
//!   modules a configuration would pick up
//!
//! Module code is compiled in; [`builtin_catalog`] holds every entry point
//! shipped with this binary.

pub mod commands;
pub mod printer;

use disuware_runtime::ModuleCatalog;

/// Catalog of the entry points compiled into the `disuware` binary.
pub fn builtin_catalog() -> ModuleCatalog {
    let mut catalog = ModuleCatalog::new();
    module_consoledicts::register(&mut catalog);
    catalog
}
