//! Plain-text module listings.

use disuware_runtime::ModuleDescriptor;
use std::io::{self, Write};

/// Write one `- interface@version` line per module, in the given order.
///
/// With `with_dependencies`, each module line is followed by one
/// `|- interface@range` line per requirement, in manifest order.
pub fn print_modules<W: Write>(
    out: &mut W,
    modules: &[ModuleDescriptor],
    with_dependencies: bool,
) -> io::Result<()> {
    for module in modules {
        writeln!(out, "- {module}")?;

        if with_dependencies {
            for requirement in &module.requires {
                writeln!(out, "|- {requirement}")?;
            }
        }
    }

    Ok(())
}
